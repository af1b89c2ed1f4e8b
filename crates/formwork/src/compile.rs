//! The schema compiler.
//!
//! One recursive pass over a field list yields both the structural
//! validation [`Schema`] and the default value tree. Fields carrying a
//! visibility condition are loosened to [`Schema::Any`] here; the
//! [`ConditionalOverlay`](crate::ConditionalOverlay) validates them later,
//! and only while their condition holds.

use std::collections::HashSet;

use serde_json::{Map, Value};
use tracing::debug;

use crate::field::{Field, FieldVariant};
use crate::issues::Issue;
use crate::path::FieldPath;
use crate::rule::{Rule, RuleOutcome, expected, required_or_type};
use crate::{FormError, Result};

// -----------------------------------------------------------------------------
// Schema
// -----------------------------------------------------------------------------

/// A structural validation schema.
#[derive(Debug, Clone)]
pub enum Schema {
    /// Accepts anything, including nothing.
    Any,
    /// A leaf rule.
    Rule(Rule),
    /// An object with known keys, in declaration order. Unknown keys are
    /// dropped from the output.
    Object(Vec<(String, Schema)>),
    /// A list whose items all follow one schema.
    List(Box<Schema>),
}

impl Schema {
    /// Checks `value` and returns the shaped output or every issue found,
    /// each attached to its path relative to `value`.
    pub fn parse(&self, value: Option<&Value>) -> RuleOutcome {
        match self {
            Self::Any => Ok(value.cloned()),
            Self::Rule(rule) => rule.parse(value),
            Self::Object(keys) => {
                let Some(Value::Object(map)) = value else {
                    return Err(required_or_type(value, expected("object", value)));
                };
                let mut output = Map::new();
                let mut issues: Vec<Issue> = Vec::new();
                for (key, schema) in keys {
                    match schema.parse(map.get(key)) {
                        Ok(Some(parsed)) => {
                            output.insert(key.clone(), parsed);
                        }
                        Ok(None) => {}
                        Err(found) => {
                            let prefix = FieldPath::root().child(key.as_str());
                            issues.extend(found.into_iter().map(|issue| issue.under(&prefix)));
                        }
                    }
                }
                if issues.is_empty() {
                    Ok(Some(Value::Object(output)))
                } else {
                    Err(issues)
                }
            }
            Self::List(item) => {
                let Some(Value::Array(items)) = value else {
                    return Err(required_or_type(value, expected("array", value)));
                };
                let mut output = Vec::with_capacity(items.len());
                let mut issues: Vec<Issue> = Vec::new();
                for (index, element) in items.iter().enumerate() {
                    match item.parse(Some(element)) {
                        Ok(parsed) => output.push(parsed.unwrap_or(Value::Null)),
                        Err(found) => {
                            let prefix = FieldPath::root().index(index);
                            issues.extend(found.into_iter().map(|issue| issue.under(&prefix)));
                        }
                    }
                }
                if issues.is_empty() {
                    Ok(Some(Value::Array(output)))
                } else {
                    Err(issues)
                }
            }
        }
    }

    /// Returns the schema of the object key `key`, if this is an object.
    pub fn key(&self, key: &str) -> Option<&Schema> {
        match self {
            Self::Object(keys) => keys.iter().find(|(k, _)| k == key).map(|(_, s)| s),
            _ => None,
        }
    }
}

// -----------------------------------------------------------------------------
// Compiler
// -----------------------------------------------------------------------------

/// The output of [`compile`].
#[derive(Debug, Clone)]
pub struct CompiledForm {
    /// Structural schema of the whole value tree.
    pub schema: Schema,
    /// Default value tree.
    pub defaults: Value,
}

/// Compiles a field list into its structural schema and default values.
///
/// # Errors
///
/// Returns [`FormError::InvalidFieldName`] for a field whose name is empty,
/// contains a `.` or is all digits, and [`FormError::DuplicateField`] when two fields of one scope share a
/// name.
pub fn compile(fields: &[Field]) -> Result<CompiledForm> {
    let (schema, defaults) = compile_scope(fields, &FieldPath::root())?;
    debug!(fields = fields.len(), "compiled form schema");
    Ok(CompiledForm {
        schema,
        defaults: Value::Object(defaults),
    })
}

fn compile_scope(fields: &[Field], scope: &FieldPath) -> Result<(Schema, Map<String, Value>)> {
    let mut keys = Vec::with_capacity(fields.len());
    let mut defaults = Map::new();
    let mut seen = HashSet::new();

    for field in fields {
        let name = field.name();
        if name.is_empty() {
            return Err(FormError::InvalidFieldName(scope_label(scope)));
        }
        let path = scope.child(name);
        if !is_path_safe(name) {
            return Err(FormError::InvalidFieldName(path.to_string()));
        }
        if !seen.insert(name) {
            return Err(FormError::DuplicateField(path.to_string()));
        }

        let (schema, default) = compile_field(field, &path)?;
        let schema = if field.get_condition().is_some() {
            Schema::Any
        } else {
            schema
        };
        keys.push((name.to_string(), schema));
        if !field.is_hidden() {
            defaults.insert(name.to_string(), default);
        }
    }

    Ok((Schema::Object(keys), defaults))
}

// Schema and default of one field, ignoring the field's own condition.
fn compile_field(field: &Field, path: &FieldPath) -> Result<(Schema, Value)> {
    match field.variant() {
        FieldVariant::Leaf(leaf) => {
            let schema = leaf.rule.clone().map_or(Schema::Any, Schema::Rule);
            Ok((schema, leaf_default(leaf.value.as_ref())))
        }
        FieldVariant::Group { fields, .. } => {
            let (schema, defaults) = compile_scope(fields, path)?;
            Ok((schema, Value::Object(defaults)))
        }
        FieldVariant::Array { fields, .. } => {
            let (item, defaults) = compile_scope(fields, path)?;
            Ok((
                Schema::List(Box::new(item)),
                Value::Array(vec![Value::Object(defaults)]),
            ))
        }
    }
}

/// The structural schema of one field as if it carried no condition.
pub(crate) fn structural(field: &Field) -> Result<Schema> {
    compile_field(field, &FieldPath::root().child(field.name())).map(|(schema, _)| schema)
}

// A name must read back as the same single key segment of a dotted path.
fn is_path_safe(name: &str) -> bool {
    !name.contains('.') && !name.bytes().all(|b| b.is_ascii_digit())
}

fn scope_label(scope: &FieldPath) -> String {
    if scope.is_empty() {
        "(root)".to_string()
    } else {
        scope.to_string()
    }
}

fn leaf_default(value: Option<&Value>) -> Value {
    match value {
        None | Some(Value::Null) => Value::String(String::new()),
        Some(value) => value.clone(),
    }
}

/// Derives the default value object of a field list.
///
/// Hidden fields are left out, groups become nested objects, arrays are
/// seeded with one default item and leaves take their declared value or
/// the empty string.
pub fn default_values(fields: &[Field]) -> Value {
    let defaults = fields
        .iter()
        .filter(|field| !field.is_hidden())
        .map(|field| (field.name().to_string(), default_of(field)))
        .collect();
    Value::Object(defaults)
}

/// Derives the default value of one field.
pub(crate) fn default_of(field: &Field) -> Value {
    match field.variant() {
        FieldVariant::Leaf(leaf) => leaf_default(leaf.value.as_ref()),
        FieldVariant::Group { fields, .. } => default_values(fields),
        FieldVariant::Array { fields, .. } => Value::Array(vec![default_values(fields)]),
    }
}
