//! Superclass, symbolic type and generic rewriting of models

use log::debug;

use super::instantiate;
use crate::extensions::{self, X_SUPER_CLASS_TEMPLATE_ARGS, X_TYPE_TEMPLATE_ARGS};
use crate::graph::{ModelGraph, ModelNode, PropertyNode};
use crate::mapping::TypeRegistry;
use crate::Error;

/// Rewrite every model of `graph` against `registry`.
///
/// Each model is rewritten atomically: its new parent, properties and imports
/// are computed first and only committed when every lookup succeeded.
///
/// # Errors
///
/// - [`Error::UnresolvedAlias`](crate::Error::UnresolvedAlias) when a superclass
///   or symbolic property type is not registered
/// - [`Error::Schema`](crate::Error::Schema) when an extension is malformed
pub fn rewrite_models(graph: &mut ModelGraph, registry: &TypeRegistry) -> crate::Result<()> {
    for model in &mut graph.models {
        rewrite_model(model, registry)?;
    }
    Ok(())
}

fn rewrite_model(model: &mut ModelNode, registry: &TypeRegistry) -> crate::Result<()> {
    let mut imports = Vec::new();

    let parent = match extensions::superclass(&model.vendor_extensions, &model.name)? {
        Some(alias) => {
            let descriptor = registry.require(&alias, &model.name)?;
            imports.push(descriptor.fully_qualified_name.clone());
            let arguments = extensions::template_arguments(
                &model.vendor_extensions,
                X_SUPER_CLASS_TEMPLATE_ARGS,
                &model.name,
            )?
            .unwrap_or_default();
            Some(instantiate(
                &descriptor.simple_name,
                &arguments,
                registry,
                &mut imports,
            ))
        }
        None => None,
    };

    let mut properties = model.properties.clone();
    for property in &mut properties {
        let entity = format!("{}.{}", model.name, property.name);
        rewrite_property(property, &entity, registry, &mut imports)?;
    }

    if let Some(parent) = parent {
        debug!("{} extends {}", model.name, parent);
        model.parent = Some(parent);
    }
    model.properties = properties;
    model.imports.extend(imports);
    Ok(())
}

/// Resolves one property in place, elements of containers first
pub(super) fn rewrite_property(
    property: &mut PropertyNode,
    entity: &str,
    registry: &TypeRegistry,
    imports: &mut Vec<String>,
) -> crate::Result<()> {
    if let Some(items) = property.items.as_deref_mut() {
        rewrite_property(items, &format!("{entity}[]"), registry, imports)?;
    }
    if let (Some(kind), Some(items)) = (property.container, property.items.as_deref()) {
        property.base_type = items.base_type.clone();
        property.resolved_type = kind.wrap(&items.resolved_type);
    }

    let symbolic = extensions::symbolic_type(
        &property.declared_type,
        property.format.as_deref(),
        &property.vendor_extensions,
        entity,
    )?;
    if let Some(alias) = symbolic {
        let descriptor = registry.require(&alias, entity)?;
        imports.push(descriptor.fully_qualified_name.clone());
        debug!("{} resolved {} -> {}", entity, alias, descriptor.fully_qualified_name);
        property.resolved_type = descriptor.simple_name.clone();
        property.base_type = alias;
    } else if !property.is_container() {
        if let Some(descriptor) = registry.get(&property.base_type) {
            imports.push(descriptor.fully_qualified_name.clone());
            property.resolved_type = descriptor.simple_name.clone();
        }
    }

    if let Some(arguments) =
        extensions::template_arguments(&property.vendor_extensions, X_TYPE_TEMPLATE_ARGS, entity)?
    {
        if property.is_container() {
            return Err(Error::schema(format!(
                "{X_TYPE_TEMPLATE_ARGS} of {entity} cannot apply to a container; set it on the element"
            )));
        }
        let base = match registry.get(&property.base_type) {
            Some(descriptor) => {
                imports.push(descriptor.fully_qualified_name.clone());
                descriptor.simple_name.clone()
            }
            None => raw_type(&property.resolved_type).to_string(),
        };
        let rendered = instantiate(&base, &arguments, registry, imports);
        debug!("{} instantiated as {}", entity, rendered);
        property.is_generic = true;
        property.template_arguments = arguments;
        property.base_type = rendered.clone();
        property.resolved_type = rendered;
    }
    Ok(())
}

/// `Page<X>` -> `Page`
fn raw_type(type_name: &str) -> &str {
    type_name
        .split_once('<')
        .map_or(type_name, |(raw, _)| raw)
        .trim()
}
