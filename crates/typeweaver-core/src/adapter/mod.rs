//! Builds [`ModelGraph`] and [`ApiGraph`] values from a loaded schema document.
//!
//! The graphs come out with target types already mapped (`integer/int64` is
//! `Long`, `$ref`s are model class names, arrays are `List<...>`) and every
//! vendor extension preserved, ready for the rewriters.

pub mod models;
pub mod operations;
pub mod types;

use crate::config::DateLibrary;
use crate::graph::{ApiGraph, ModelGraph};
use crate::naming::NamePolicy;
use crate::openapi::OpenApiContext;

pub use types::TypeMapper;

/// Graph builder over one schema document
#[derive(Debug, Clone)]
pub struct SchemaAdapter<'a> {
    context: &'a OpenApiContext,
    types: TypeMapper<'a>,
    names: &'a NamePolicy,
}

impl<'a> SchemaAdapter<'a> {
    pub fn new(context: &'a OpenApiContext, date_library: DateLibrary, names: &'a NamePolicy) -> Self {
        Self {
            context,
            types: TypeMapper::new(date_library, names),
            names,
        }
    }

    /// Model graph of the document's named schemas
    pub fn models(&self) -> crate::Result<ModelGraph> {
        models::build(self)
    }

    /// Operation graph of the document's paths
    pub fn operations(&self) -> crate::Result<ApiGraph> {
        operations::build(self)
    }
}
