//! Typeweaver Core Library
//!
//! Post-processing for OpenAPI driven code generators: a registry of external
//! types built from declarative mappings, and rewriters that substitute those
//! types into the model and operation graphs parsed from a schema.
//!
//! The usual entry point is [`GenerationSession`]: it builds the
//! [`TypeRegistry`] once, adapts each schema document into graphs and runs
//! [`rewrite_models`] and [`rewrite_operations`] over them.

pub mod adapter;
pub mod config;
pub mod error;
pub mod extensions;
pub mod generate;
pub mod graph;
pub mod mapping;
pub mod naming;
pub mod openapi;
pub mod rewrite;
pub mod session;
pub mod utils;

pub use crate::{
    config::{Config, DateLibrary, GenerationOptions},
    error::{Error, Result},
    generate::{generate, GenerateTarget},
    mapping::{DataTypeMapping, TypeDescriptor, TypeRegistry, TypeRegistryBuilder},
    naming::NamePolicy,
    openapi::OpenApiContext,
    rewrite::{group_operations, resolve_type, rewrite_models, rewrite_operations, RewriteOptions},
    session::{GenerationSession, ProcessedSchema},
};
