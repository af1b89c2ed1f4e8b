//! The field schema model.
//!
//! A form is a tree of [`Field`]s. Every field carries the same base
//! attributes (name, label, layout span, visibility condition, change hook)
//! and one of three shapes:
//!
//! - a **leaf** bound to one value and one input control,
//! - a **group** representing a fixed nested object,
//! - an **array** representing a variable-length list of objects.
//!
//! Fields are built with a chained builder API:
//!
//! ```rust
//! use formwork::{Field, Rule};
//!
//! let address = Field::group("address", "Address", vec![
//!     Field::text("addressLine1", "Address Line 1")
//!         .required()
//!         .rule(Rule::string().min(1).message("Address Line 1 is required"))
//!         .col_span(3),
//!     Field::number("pincode", "Pincode")
//!         .rule(Rule::number().coerce().int().min(100000.0).max(999999.0)),
//! ])
//! .cols(3)
//! .col_span(2);
//!
//! assert!(address.is_group());
//! assert_eq!(address.children().len(), 2);
//! ```

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::condition::Condition;
use crate::detail::FormDetail;
use crate::layout::Columns;
use crate::rule::Rule;

// -----------------------------------------------------------------------------
// InputKind
// -----------------------------------------------------------------------------

/// The control a leaf field is edited with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InputKind {
    Text,
    Email,
    Password,
    Number,
    Textarea,
    Select,
    Checkbox,
    Radio,
    Date,
    DatetimeLocal,
    Time,
    File,
    Multiselect,
    Range,
    Color,
    Url,
    Tel,
    Search,
    Combobox,
}

impl InputKind {
    /// Every kind, in declaration order.
    pub const ALL: [InputKind; 19] = [
        Self::Text,
        Self::Email,
        Self::Password,
        Self::Number,
        Self::Textarea,
        Self::Select,
        Self::Checkbox,
        Self::Radio,
        Self::Date,
        Self::DatetimeLocal,
        Self::Time,
        Self::File,
        Self::Multiselect,
        Self::Range,
        Self::Color,
        Self::Url,
        Self::Tel,
        Self::Search,
        Self::Combobox,
    ];

    /// Returns the kind tag as written in form descriptions.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Email => "email",
            Self::Password => "password",
            Self::Number => "number",
            Self::Textarea => "textarea",
            Self::Select => "select",
            Self::Checkbox => "checkbox",
            Self::Radio => "radio",
            Self::Date => "date",
            Self::DatetimeLocal => "datetime-local",
            Self::Time => "time",
            Self::File => "file",
            Self::Multiselect => "multiselect",
            Self::Range => "range",
            Self::Color => "color",
            Self::Url => "url",
            Self::Tel => "tel",
            Self::Search => "search",
            Self::Combobox => "combobox",
        }
    }

    /// Parses a kind tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == tag)
    }

    /// Returns true for kinds whose raw input is coerced to a number.
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Number | Self::Range)
    }

    /// Returns true for kinds that pick from an option list.
    pub fn has_options(self) -> bool {
        matches!(
            self,
            Self::Select | Self::Radio | Self::Multiselect | Self::Combobox
        )
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// -----------------------------------------------------------------------------
// Options & constraints
// -----------------------------------------------------------------------------

/// One choice of a select, radio, multiselect or combobox field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    /// Text shown to the user.
    pub label: String,
    /// Value written to the form.
    pub value: String,
}

impl SelectOption {
    /// Creates an option.
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// How a date field writes its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateOutput {
    /// `yyyy-MM-dd`, or `yyyy-MM-ddTHH:MM` when time is shown.
    #[default]
    #[serde(alias = "date")]
    String,
    /// RFC 3339 (ISO 8601) timestamp.
    Iso,
}

/// Kind-specific control settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Constraints {
    /// Lower bound of a range control.
    pub min: Option<f64>,
    /// Upper bound of a range control.
    pub max: Option<f64>,
    /// Step of a range control.
    pub step: Option<f64>,
    /// Accepted file extensions and media types, comma separated.
    pub accept: Option<String>,
    /// Whether a file control takes several files.
    pub multiple: bool,
    /// Largest accepted file in bytes; larger files are dropped on input.
    pub max_size: Option<u64>,
    /// Whether a date control also captures the time of day.
    pub show_time: bool,
    /// How a date control writes its value.
    pub output: DateOutput,
}

// -----------------------------------------------------------------------------
// Change hook
// -----------------------------------------------------------------------------

type HookFn = dyn Fn(&Value, &Value, &FormDetail) -> FormDetail + Send + Sync;

/// A change hook: `(new value, previous value, current form) -> next form`.
///
/// The hook must be pure. The engine replaces its whole form description with
/// whatever the hook returns, which is how one answer can add, remove or
/// relabel other fields.
#[derive(Clone)]
pub struct OnChange(Arc<HookFn>);

impl OnChange {
    /// Wraps a hook function.
    pub fn new<F>(hook: F) -> Self
    where
        F: Fn(&Value, &Value, &FormDetail) -> FormDetail + Send + Sync + 'static,
    {
        Self(Arc::new(hook))
    }

    /// Invokes the hook.
    pub fn call(&self, value: &Value, previous: &Value, detail: &FormDetail) -> FormDetail {
        (self.0)(value, previous, detail)
    }
}

impl fmt::Debug for OnChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OnChange(..)")
    }
}

// -----------------------------------------------------------------------------
// Field
// -----------------------------------------------------------------------------

/// A leaf field's own attributes.
#[derive(Debug, Clone)]
pub struct LeafField {
    /// Which control edits the value.
    pub kind: InputKind,
    /// Validation rule; a leaf without one passes its value through.
    pub rule: Option<Rule>,
    /// Initial value.
    pub value: Option<Value>,
    /// Choices for option-based kinds.
    pub options: Vec<SelectOption>,
    /// Kind-specific control settings.
    pub constraints: Constraints,
}

/// The shape-specific part of a [`Field`].
#[derive(Debug, Clone)]
pub enum FieldVariant {
    /// A single value edited by one control.
    Leaf(LeafField),
    /// A nested object; children flow into `cols` columns.
    Group {
        /// Child fields, in display order.
        fields: Vec<Field>,
        /// Column count of the group's own grid.
        cols: Columns,
    },
    /// A list of objects shaped by `fields`; items flow into `cols` columns.
    Array {
        /// Shape of one item, in display order.
        fields: Vec<Field>,
        /// Column count of each item's grid.
        cols: Columns,
    },
}

/// One node of the field schema.
#[derive(Debug, Clone)]
pub struct Field {
    name: String,
    label: String,
    description: Option<String>,
    required: bool,
    placeholder: Option<String>,
    col_span: Columns,
    hidden: bool,
    condition: Option<Condition>,
    on_change: Option<OnChange>,
    variant: FieldVariant,
}

impl Field {
    fn with_variant(name: impl Into<String>, label: impl Into<String>, variant: FieldVariant) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            description: None,
            required: false,
            placeholder: None,
            col_span: Columns::ONE,
            hidden: false,
            condition: None,
            on_change: None,
            variant,
        }
    }

    /// Creates a leaf field of the given kind.
    pub fn leaf(kind: InputKind, name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::with_variant(
            name,
            label,
            FieldVariant::Leaf(LeafField {
                kind,
                rule: None,
                value: None,
                options: Vec::new(),
                constraints: Constraints::default(),
            }),
        )
    }

    /// Creates a text field.
    pub fn text(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::leaf(InputKind::Text, name, label)
    }

    /// Creates an email field.
    pub fn email(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::leaf(InputKind::Email, name, label)
    }

    /// Creates a number field.
    pub fn number(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::leaf(InputKind::Number, name, label)
    }

    /// Creates a select field.
    pub fn select(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::leaf(InputKind::Select, name, label)
    }

    /// Creates a checkbox field.
    pub fn checkbox(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::leaf(InputKind::Checkbox, name, label)
    }

    /// Creates a date field.
    pub fn date(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::leaf(InputKind::Date, name, label)
    }

    /// Creates a group field.
    pub fn group(name: impl Into<String>, label: impl Into<String>, fields: Vec<Field>) -> Self {
        Self::with_variant(
            name,
            label,
            FieldVariant::Group {
                fields,
                cols: Columns::ONE,
            },
        )
    }

    /// Creates an array field whose items are shaped by `fields`.
    pub fn array(name: impl Into<String>, label: impl Into<String>, fields: Vec<Field>) -> Self {
        Self::with_variant(
            name,
            label,
            FieldVariant::Array {
                fields,
                cols: Columns::ONE,
            },
        )
    }

    // -------------------------------------------------------------------------
    // Builder
    // -------------------------------------------------------------------------

    /// Sets the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Marks the field as required (display only; the rule decides validity).
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets the placeholder.
    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Sets the grid column span.
    pub fn col_span(mut self, span: i64) -> Self {
        self.col_span = Columns::new(span);
        self
    }

    /// Hides the field unconditionally.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Shows the field only while `condition` holds.
    pub fn condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Shows the field only while `predicate` holds for the whole value tree.
    pub fn when<F>(self, predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.condition(Condition::when(predicate))
    }

    /// Sets the change hook.
    pub fn on_change<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Value, &Value, &FormDetail) -> FormDetail + Send + Sync + 'static,
    {
        self.on_change = Some(OnChange::new(hook));
        self
    }

    /// Sets the column count of a group or array. Ignored for leaves.
    pub fn cols(mut self, count: i64) -> Self {
        match &mut self.variant {
            FieldVariant::Group { cols, .. } | FieldVariant::Array { cols, .. } => {
                *cols = Columns::new(count);
            }
            FieldVariant::Leaf(_) => {}
        }
        self
    }

    /// Relabels the field.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    fn leaf_mut(&mut self) -> Option<&mut LeafField> {
        match &mut self.variant {
            FieldVariant::Leaf(leaf) => Some(leaf),
            _ => None,
        }
    }

    /// Sets the validation rule of a leaf. Ignored for groups and arrays.
    pub fn rule(mut self, rule: impl Into<Rule>) -> Self {
        if let Some(leaf) = self.leaf_mut() {
            leaf.rule = Some(rule.into());
        }
        self
    }

    /// Sets the initial value of a leaf. Ignored for groups and arrays.
    pub fn value(mut self, value: impl Into<Value>) -> Self {
        if let Some(leaf) = self.leaf_mut() {
            leaf.value = Some(value.into());
        }
        self
    }

    /// Adds one option to a leaf.
    pub fn option(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        if let Some(leaf) = self.leaf_mut() {
            leaf.options.push(SelectOption::new(label, value));
        }
        self
    }

    /// Replaces the options of a leaf.
    pub fn options(mut self, options: Vec<SelectOption>) -> Self {
        if let Some(leaf) = self.leaf_mut() {
            leaf.options = options;
        }
        self
    }

    /// Replaces the kind-specific settings of a leaf.
    pub fn constraints(mut self, constraints: Constraints) -> Self {
        if let Some(leaf) = self.leaf_mut() {
            leaf.constraints = constraints;
        }
        self
    }

    /// Sets the bounds and step of a range or number control.
    pub fn range(mut self, min: f64, max: f64, step: f64) -> Self {
        if let Some(leaf) = self.leaf_mut() {
            leaf.constraints.min = Some(min);
            leaf.constraints.max = Some(max);
            leaf.constraints.step = Some(step);
        }
        self
    }

    /// Restricts the files a file control takes.
    pub fn accept(mut self, accept: impl Into<String>, max_size: Option<u64>, multiple: bool) -> Self {
        if let Some(leaf) = self.leaf_mut() {
            leaf.constraints.accept = Some(accept.into());
            leaf.constraints.max_size = max_size;
            leaf.constraints.multiple = multiple;
        }
        self
    }

    /// Makes a date control capture the time of day as well.
    pub fn show_time(mut self) -> Self {
        if let Some(leaf) = self.leaf_mut() {
            leaf.constraints.show_time = true;
        }
        self
    }

    /// Replaces the children of a group or array. Ignored for leaves.
    pub fn fields(mut self, children: Vec<Field>) -> Self {
        match &mut self.variant {
            FieldVariant::Group { fields, .. } | FieldVariant::Array { fields, .. } => {
                *fields = children;
            }
            FieldVariant::Leaf(_) => {}
        }
        self
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Returns the name, unique within the parent scope.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the label.
    pub fn get_label(&self) -> &str {
        &self.label
    }

    /// Returns the description.
    pub fn get_description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns true if the field is marked required.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Returns the placeholder.
    pub fn get_placeholder(&self) -> Option<&str> {
        self.placeholder.as_deref()
    }

    /// Returns the grid column span.
    pub fn get_col_span(&self) -> Columns {
        self.col_span
    }

    /// Returns true if the field is hidden unconditionally.
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Returns the visibility condition.
    pub fn get_condition(&self) -> Option<&Condition> {
        self.condition.as_ref()
    }

    /// Returns the change hook.
    pub fn get_on_change(&self) -> Option<&OnChange> {
        self.on_change.as_ref()
    }

    /// Returns the shape-specific part.
    pub fn variant(&self) -> &FieldVariant {
        &self.variant
    }

    /// Returns the leaf attributes, if this is a leaf.
    pub fn as_leaf(&self) -> Option<&LeafField> {
        match &self.variant {
            FieldVariant::Leaf(leaf) => Some(leaf),
            _ => None,
        }
    }

    /// Returns the children of a group or array (empty for leaves).
    pub fn children(&self) -> &[Field] {
        match &self.variant {
            FieldVariant::Group { fields, .. } | FieldVariant::Array { fields, .. } => fields,
            FieldVariant::Leaf(_) => &[],
        }
    }

    /// Returns the column count of a group or array (one for leaves).
    pub fn get_cols(&self) -> Columns {
        match &self.variant {
            FieldVariant::Group { cols, .. } | FieldVariant::Array { cols, .. } => *cols,
            FieldVariant::Leaf(_) => Columns::ONE,
        }
    }

    /// Returns true for leaves.
    pub fn is_leaf(&self) -> bool {
        matches!(self.variant, FieldVariant::Leaf(_))
    }

    /// Returns true for groups.
    pub fn is_group(&self) -> bool {
        matches!(self.variant, FieldVariant::Group { .. })
    }

    /// Returns true for arrays.
    pub fn is_array(&self) -> bool {
        matches!(self.variant, FieldVariant::Array { .. })
    }

    /// Returns true if the field is visible for the given value tree:
    /// not hidden, and its condition (if any) holds.
    pub fn is_visible(&self, values: &Value) -> bool {
        !self.hidden && self.condition_holds(values)
    }

    /// Returns true if the field has no condition or its condition holds.
    pub fn condition_holds(&self, values: &Value) -> bool {
        self.condition
            .as_ref()
            .is_none_or(|condition| condition.evaluate(values))
    }
}
