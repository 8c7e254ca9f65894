//! Custom attributes the back end understands.
//!
//! Each attribute is described by one schema record; every property is a
//! `{position, name, parse, default}` entry and all reads go through [`lookup`].

use strata_core::{Attribute, MethodDef, Program};

use crate::diagnostics::{DiagnosticKind, Diagnostics};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    Str(String),
    Bool(bool),
}

impl AttrValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            Self::Bool(_) => None,
        }
    }
}

pub type ParseFn = fn(&str) -> Result<AttrValue, String>;

#[derive(Debug)]
pub struct PropertySpec {
    /// Positional index, if the property may be given positionally.
    pub position: Option<usize>,
    pub name: &'static str,
    pub parse: ParseFn,
    pub default: Option<&'static str>,
}

#[derive(Debug)]
pub struct AttributeSchema {
    pub name: &'static str,
    pub properties: &'static [PropertySpec],
}

pub const FORCE_INLINE: AttributeSchema = AttributeSchema {
    name: "ForceInline",
    properties: &[],
};

pub const NEEDS_REFLECTION: AttributeSchema = AttributeSchema {
    name: "NeedsReflection",
    properties: &[],
};

pub const IMPORT: AttributeSchema = AttributeSchema {
    name: "Import",
    properties: &[
        PropertySpec {
            position: Some(0),
            name: "name",
            parse: parse_name,
            default: None,
        },
        PropertySpec {
            position: Some(1),
            name: "module",
            parse: parse_name,
            default: Some("global"),
        },
    ],
};

pub const EXPORT: AttributeSchema = AttributeSchema {
    name: "Export",
    properties: &[PropertySpec {
        position: Some(0),
        name: "name",
        parse: parse_name,
        default: None,
    }],
};

pub const SCHEMAS: &[AttributeSchema] = &[FORCE_INLINE, NEEDS_REFLECTION, IMPORT, EXPORT];

fn parse_name(text: &str) -> Result<AttrValue, String> {
    let text = text.trim();
    if text.is_empty() {
        return Err("expected a non-empty name".into());
    }
    Ok(AttrValue::Str(text.to_owned()))
}

pub fn schema(name: &str) -> Option<&'static AttributeSchema> {
    SCHEMAS.iter().find(|s| s.name == name)
}

/// Read one property of an attribute instance.
///
/// Named arguments win over positional ones; the default applies when neither is given.
/// `Ok(None)` means the property is absent and has no default.
pub fn lookup(
    schema: &AttributeSchema,
    attribute: &Attribute,
    property: &str,
) -> Result<Option<AttrValue>, String> {
    let Some(spec) = schema.properties.iter().find(|p| p.name == property) else {
        return Err(format!("`{}` has no property `{property}`", schema.name));
    };

    let text = attribute
        .named
        .get(spec.name)
        .map(String::as_str)
        .or_else(|| spec.position.and_then(|i| attribute.args.get(i)).map(String::as_str))
        .or(spec.default);

    text.map(spec.parse).transpose()
}

/// First attribute on `method` matching `schema`.
pub fn find<'m>(method: &'m MethodDef, schema: &AttributeSchema) -> Option<&'m Attribute> {
    method.attributes.iter().find(|a| a.name == schema.name)
}

pub fn has(method: &MethodDef, schema: &AttributeSchema) -> bool {
    find(method, schema).is_some()
}

fn read_str(method: &MethodDef, schema: &AttributeSchema, property: &str) -> Option<String> {
    let attribute = find(method, schema)?;
    let value = lookup(schema, attribute, property).ok()??;
    value.as_str().map(str::to_owned)
}

/// `(module, name)` of an imported method.
pub fn import_of(method: &MethodDef) -> Option<(String, String)> {
    find(method, &IMPORT)?;
    let name = read_str(method, &IMPORT, "name").unwrap_or_else(|| method.short_name.clone());
    let module = read_str(method, &IMPORT, "module")?;
    Some((module, name))
}

/// Public name of an exported method.
pub fn export_name(method: &MethodDef) -> Option<String> {
    find(method, &EXPORT)?;
    Some(read_str(method, &EXPORT, "name").unwrap_or_else(|| method.short_name.clone()))
}

/// Report unknown properties and unparsable values on known attributes.
///
/// Unknown attributes are ignored: they belong to other tools.
pub fn validate(program: &Program, diags: &mut Diagnostics) {
    for asm in program.assemblies() {
        for ty in asm.types() {
            for method in ty.methods() {
                for attribute in &method.attributes {
                    if let Some(schema) = schema(&attribute.name) {
                        validate_one(method, schema, attribute, diags);
                    }
                }
            }
        }
    }
}

fn validate_one(
    method: &MethodDef,
    schema: &AttributeSchema,
    attribute: &Attribute,
    diags: &mut Diagnostics,
) {
    let positional = schema
        .properties
        .iter()
        .filter(|p| p.position.is_some())
        .count();
    if attribute.args.len() > positional {
        diags
            .report(DiagnosticKind::UnknownAttributeProperty)
            .message(format!(
                "`{}` on `{}` takes {positional} positional argument(s), found {}",
                schema.name,
                method.name,
                attribute.args.len()
            ))
            .emit();
    }

    for key in attribute.named.keys() {
        if !schema.properties.iter().any(|p| p.name == key.as_str()) {
            diags
                .report(DiagnosticKind::UnknownAttributeProperty)
                .message(format!("`{}.{key}` on `{}`", schema.name, method.name))
                .emit();
        }
    }

    for spec in schema.properties {
        if let Err(reason) = lookup(schema, attribute, spec.name) {
            diags
                .report(DiagnosticKind::InvalidAttributeValue)
                .message(format!(
                    "`{}.{}` on `{}`: {reason}",
                    schema.name, spec.name, method.name
                ))
                .emit();
        }
    }
}
