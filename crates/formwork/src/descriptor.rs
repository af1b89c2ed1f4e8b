//! Form descriptions as documents.
//!
//! A form delivered by a server (or kept in a file) is a JSON or YAML
//! document shaped like this:
//!
//! ```json
//! {
//!   "title": "User Information",
//!   "layouts": { "cols": 2 },
//!   "fields": [
//!     { "name": "firstName", "label": "First Name", "type": "text",
//!       "required": true, "validation": { "type": "string", "min": 1 } },
//!     { "name": "address", "label": "Address", "type": "group",
//!       "layout": { "colSpan": 2 }, "layouts": { "cols": 3 },
//!       "fields": [ { "name": "state", "label": "State", "type": "text" } ] }
//!   ]
//! }
//! ```
//!
//! Conditions are written declaratively (see [`Condition`]); closure
//! conditions, closure rules and change hooks only exist for forms built in
//! code.

use serde::Deserialize;
use serde_json::Value;

use crate::condition::Condition;
use crate::detail::FormDetail;
use crate::field::{Constraints, Field, InputKind, SelectOption};
use crate::layout::Columns;
use crate::rule::Rule;
use crate::{FormError, Result};

/// Column count of a form, group or array (`layouts`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GridLayout {
    /// Number of columns children flow into.
    #[serde(default)]
    pub cols: Columns,
}

/// Column span of a field (`layout`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpanLayout {
    /// Number of parent columns spanned.
    #[serde(default)]
    pub col_span: Columns,
}

/// A whole form document.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormDescriptor {
    /// Form title.
    pub title: String,
    /// Form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Top-level fields.
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
    /// Top-level column count; two when missing.
    #[serde(default)]
    pub layouts: Option<GridLayout>,
}

/// One field of a form document.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    /// Field name.
    pub name: String,
    /// Field label.
    #[serde(default)]
    pub label: String,
    /// `group`, `array`, or an input kind tag.
    #[serde(rename = "type")]
    pub kind: String,
    /// Help text.
    #[serde(default)]
    pub description: Option<String>,
    /// Shows a required marker.
    #[serde(default)]
    pub required: bool,
    /// Placeholder text.
    #[serde(default)]
    pub placeholder: Option<String>,
    /// Column span.
    #[serde(default)]
    pub layout: Option<SpanLayout>,
    /// Hides the field unconditionally.
    #[serde(default)]
    pub hidden: bool,
    /// Visibility condition.
    #[serde(default)]
    pub condition: Option<Condition>,
    /// Validation rule (leaves only).
    #[serde(default)]
    pub validation: Option<Rule>,
    /// Initial value (leaves only).
    #[serde(default)]
    pub value: Option<Value>,
    /// Choices (option-based leaves only).
    #[serde(default)]
    pub options: Vec<SelectOption>,
    /// Kind-specific settings (`min`, `max`, `step`, `accept`, `multiple`,
    /// `maxSize`, `showTime`, `output`).
    #[serde(flatten)]
    pub constraints: Constraints,
    /// Children (groups and arrays only).
    #[serde(default)]
    pub fields: Option<Vec<FieldDescriptor>>,
    /// A group flagged as an array is read as an array.
    #[serde(default)]
    pub is_array: bool,
    /// Column count of a group's or array's own grid.
    #[serde(default)]
    pub layouts: Option<GridLayout>,
}

impl TryFrom<FieldDescriptor> for Field {
    type Error = FormError;

    fn try_from(descriptor: FieldDescriptor) -> Result<Self> {
        let FieldDescriptor {
            name,
            label,
            kind,
            description,
            required,
            placeholder,
            layout,
            hidden,
            condition,
            validation,
            value,
            options,
            constraints,
            fields,
            is_array,
            layouts,
        } = descriptor;

        let mut field = match kind.as_str() {
            "group" | "array" => {
                if validation.is_some() || value.is_some() {
                    return Err(FormError::descriptor(format!(
                        "{kind} field '{name}' cannot carry a validation rule or a value"
                    )));
                }
                let children = fields
                    .unwrap_or_default()
                    .into_iter()
                    .map(Field::try_from)
                    .collect::<Result<Vec<_>>>()?;
                let cols = layouts.unwrap_or_default().cols;
                let container = if kind == "array" || is_array {
                    Field::array(name, label, children)
                } else {
                    Field::group(name, label, children)
                };
                container.cols(i64::from(cols.get()))
            }
            tag => {
                let kind = InputKind::from_tag(tag).ok_or_else(|| {
                    FormError::descriptor(format!("unknown field type '{tag}' for '{name}'"))
                })?;
                if fields.is_some() {
                    return Err(FormError::descriptor(format!(
                        "{kind} field '{name}' cannot have child fields"
                    )));
                }
                if !options.is_empty() && !kind.has_options() {
                    return Err(FormError::descriptor(format!(
                        "{kind} field '{name}' does not take options"
                    )));
                }
                let mut leaf = Field::leaf(kind, name, label)
                    .options(options)
                    .constraints(constraints);
                if let Some(rule) = validation {
                    leaf = leaf.rule(rule);
                }
                if let Some(value) = value {
                    leaf = leaf.value(value);
                }
                leaf
            }
        };

        if let Some(description) = description {
            field = field.description(description);
        }
        if required {
            field = field.required();
        }
        if let Some(placeholder) = placeholder {
            field = field.placeholder(placeholder);
        }
        if let Some(layout) = layout {
            field = field.col_span(i64::from(layout.col_span.get()));
        }
        if hidden {
            field = field.hidden();
        }
        if let Some(condition) = condition {
            field = field.condition(condition);
        }
        Ok(field)
    }
}

impl TryFrom<FormDescriptor> for FormDetail {
    type Error = FormError;

    fn try_from(descriptor: FormDescriptor) -> Result<Self> {
        let fields = descriptor
            .fields
            .into_iter()
            .map(Field::try_from)
            .collect::<Result<Vec<_>>>()?;
        let mut detail = FormDetail::new(descriptor.title, fields);
        if let Some(description) = descriptor.description {
            detail = detail.description(description);
        }
        if let Some(layouts) = descriptor.layouts {
            detail = detail.cols(i64::from(layouts.cols.get()));
        }
        Ok(detail)
    }
}

impl FormDetail {
    /// Reads a form from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::Descriptor`] if the document is malformed.
    pub fn from_json(text: &str) -> Result<Self> {
        let descriptor: FormDescriptor =
            serde_json::from_str(text).map_err(|err| FormError::descriptor(err.to_string()))?;
        descriptor.try_into()
    }

    /// Reads a form from an already parsed JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::Descriptor`] if the value is malformed.
    pub fn from_value(value: Value) -> Result<Self> {
        let descriptor: FormDescriptor =
            serde_json::from_value(value).map_err(|err| FormError::descriptor(err.to_string()))?;
        descriptor.try_into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{DateOutput, FieldVariant};
    use crate::path::FieldPath;
    use serde_json::json;

    fn path(text: &str) -> FieldPath {
        FieldPath::parse(text).unwrap()
    }

    #[test]
    fn test_read_full_form() {
        let detail = FormDetail::from_value(json!({
            "title": "User Information",
            "description": "Tell us about yourself",
            "layouts": {"cols": 3},
            "fields": [
                {"name": "firstName", "label": "First Name", "type": "text", "required": true,
                 "validation": {"type": "string", "min": 1, "message": "First name is required"}},
                {"name": "maritalStatus", "label": "Marital Status", "type": "select",
                 "options": [{"label": "Single", "value": "single"}, {"label": "Married", "value": "married"}]},
                {"name": "spouseName", "label": "Spouse", "type": "text",
                 "condition": {"op": "equals", "field": "maritalStatus", "value": "married"}},
                {"name": "dob", "label": "Birth date", "type": "date", "showTime": true, "output": "iso"},
                {"name": "address", "label": "Address", "type": "group",
                 "layout": {"colSpan": 2}, "layouts": {"cols": "3"},
                 "fields": [{"name": "state", "label": "State", "type": "text"}]},
                {"name": "skills", "label": "Skills", "type": "array",
                 "fields": [{"name": "skillName", "label": "Skill", "type": "text"}]}
            ]
        }))
        .unwrap();

        assert_eq!(detail.get_title(), "User Information");
        assert_eq!(detail.get_cols().get(), 3);
        assert_eq!(detail.fields().len(), 6);

        let spouse = detail.field_at(&path("spouseName")).unwrap();
        assert!(spouse.get_condition().is_some());

        let dob = detail.field_at(&path("dob")).unwrap().as_leaf().unwrap();
        assert!(dob.constraints.show_time);
        assert_eq!(dob.constraints.output, DateOutput::Iso);

        let address = detail.field_at(&path("address")).unwrap();
        assert_eq!(address.get_col_span().get(), 2);
        assert_eq!(address.get_cols().get(), 3);
        assert!(matches!(
            detail.field_at(&path("skills")).unwrap().variant(),
            FieldVariant::Array { .. }
        ));
    }

    #[test]
    fn test_default_columns() {
        let detail = FormDetail::from_json(r#"{"title": "T", "fields": []}"#).unwrap();
        assert_eq!(detail.get_cols().get(), 2);
        let detail = FormDetail::from_json(r#"{"title": "T", "layouts": {"cols": 13}}"#).unwrap();
        assert_eq!(detail.get_cols().get(), 1);
    }

    #[test]
    fn test_group_flagged_as_array() {
        let detail = FormDetail::from_value(json!({
            "title": "T",
            "fields": [{"name": "phones", "label": "Phones", "type": "group", "isArray": true,
                        "fields": [{"name": "number", "label": "Number", "type": "tel"}]}]
        }))
        .unwrap();
        assert!(detail.fields()[0].is_array());
    }

    #[test]
    fn test_malformed_documents() {
        let err = FormDetail::from_value(json!({
            "title": "T",
            "fields": [{"name": "x", "label": "X", "type": "slider"}]
        }))
        .unwrap_err();
        assert!(err.to_string().contains("unknown field type 'slider'"));

        let err = FormDetail::from_value(json!({
            "title": "T",
            "fields": [{"name": "g", "label": "G", "type": "group",
                        "validation": {"type": "string"}, "fields": []}]
        }))
        .unwrap_err();
        assert!(err.is_schema_error());

        let err = FormDetail::from_value(json!({
            "title": "T",
            "fields": [{"name": "t", "label": "T", "type": "text", "fields": []}]
        }))
        .unwrap_err();
        assert!(matches!(err, FormError::Descriptor(_)));

        let err = FormDetail::from_value(json!({
            "title": "T",
            "fields": [{"name": "age", "label": "Age", "type": "number",
                        "options": [{"label": "One", "value": "1"}]}]
        }))
        .unwrap_err();
        assert!(err.to_string().contains("number field 'age' does not take options"));

        assert!(FormDetail::from_json("{").is_err());
    }
}
