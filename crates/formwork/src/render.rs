//! The render engine.
//!
//! Rendering has two halves. [`sync_visibility`] walks the field tree
//! against the live state and keeps the registered set in line with each
//! field's condition: hidden fields are unregistered (their values and
//! errors dropped), visible leaves are registered with their default.
//! [`render`] then turns the settled tree into a [`RenderTree`] that any
//! front end can draw: one [`Control`] per visible leaf, nested nodes for
//! groups and array items, and the grid hints for each of them.

use serde::Serialize;
use serde_json::Value;

use crate::Result;
use crate::compile::default_of;
use crate::detail::FormDetail;
use crate::engine::FileMeta;
use crate::field::{Field, FieldVariant, InputKind, LeafField, SelectOption};
use crate::layout::Columns;
use crate::path::FieldPath;
use crate::state::FormState;

// -----------------------------------------------------------------------------
// Render tree
// -----------------------------------------------------------------------------

/// A rendered form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderTree {
    /// Form title.
    pub title: String,
    /// Form description.
    pub description: Option<String>,
    /// Column count of the top-level grid.
    pub cols: Columns,
    /// Top-level nodes in display order.
    pub nodes: Vec<RenderNode>,
}

impl RenderTree {
    /// Finds the node rendered for `path`.
    pub fn find(&self, path: &FieldPath) -> Option<&RenderNode> {
        find_in(&self.nodes, path)
    }

    /// Returns every rendered control in display order.
    pub fn controls(&self) -> Vec<&ControlNode> {
        let mut controls = Vec::new();
        collect_controls(&self.nodes, &mut controls);
        controls
    }
}

fn find_in<'a>(nodes: &'a [RenderNode], path: &FieldPath) -> Option<&'a RenderNode> {
    for node in nodes {
        if node.path() == path {
            return Some(node);
        }
        if !path.starts_with(node.path()) {
            continue;
        }
        let found = match node {
            RenderNode::Control(_) => None,
            RenderNode::Group(group) => find_in(&group.children, path),
            RenderNode::Array(array) => array
                .items
                .iter()
                .find_map(|item| find_in(&item.children, path)),
        };
        if found.is_some() {
            return found;
        }
    }
    None
}

fn collect_controls<'a>(nodes: &'a [RenderNode], out: &mut Vec<&'a ControlNode>) {
    for node in nodes {
        match node {
            RenderNode::Control(control) => out.push(control),
            RenderNode::Group(group) => collect_controls(&group.children, out),
            RenderNode::Array(array) => {
                for item in &array.items {
                    collect_controls(&item.children, out);
                }
            }
        }
    }
}

/// One rendered field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum RenderNode {
    /// A leaf field with its control.
    Control(ControlNode),
    /// A labeled container of nested fields.
    Group(GroupNode),
    /// A repeated container with add and remove actions.
    Array(ArrayNode),
}

impl RenderNode {
    /// Returns the value path of the node.
    pub fn path(&self) -> &FieldPath {
        match self {
            Self::Control(node) => &node.path,
            Self::Group(node) => &node.path,
            Self::Array(node) => &node.path,
        }
    }

    /// Returns the label of the node.
    pub fn label(&self) -> &str {
        match self {
            Self::Control(node) => &node.label,
            Self::Group(node) => &node.label,
            Self::Array(node) => &node.label,
        }
    }

    /// Returns the number of grid columns the node spans.
    pub fn col_span(&self) -> Columns {
        match self {
            Self::Control(node) => node.col_span,
            Self::Group(node) => node.col_span,
            Self::Array(node) => node.col_span,
        }
    }
}

/// A rendered leaf field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlNode {
    /// Value path.
    pub path: FieldPath,
    /// Label.
    pub label: String,
    /// Help text.
    pub description: Option<String>,
    /// Whether a required marker is shown.
    pub required: bool,
    /// Grid columns spanned.
    pub col_span: Columns,
    /// First error message for this field, if any.
    pub error: Option<String>,
    /// The input control.
    pub control: Control,
}

/// A rendered group field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupNode {
    /// Value path of the nested object.
    pub path: FieldPath,
    /// Heading.
    pub label: String,
    /// Help text.
    pub description: Option<String>,
    /// Grid columns spanned in the parent grid.
    pub col_span: Columns,
    /// Column count of the group's own grid.
    pub cols: Columns,
    /// Nested nodes.
    pub children: Vec<RenderNode>,
}

/// A rendered array field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArrayNode {
    /// Value path of the list.
    pub path: FieldPath,
    /// Heading.
    pub label: String,
    /// Help text.
    pub description: Option<String>,
    /// Grid columns spanned in the parent grid.
    pub col_span: Columns,
    /// Column count of each item's grid.
    pub cols: Columns,
    /// One entry per current item, each with its own remove action.
    pub items: Vec<ArrayItemNode>,
    /// Caption of the add action.
    pub add_label: String,
}

/// One item of a rendered array.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArrayItemNode {
    /// Position in the list.
    pub index: usize,
    /// Value path of the item (`<array>.<index>`).
    pub path: FieldPath,
    /// The item's nodes.
    pub children: Vec<RenderNode>,
}

/// The control drawn for a leaf, with its current state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "control", rename_all = "snake_case")]
pub enum Control {
    /// A single-line input (`text`, `email`, `password`, `number`, `url`,
    /// `tel`, `search`, `time`, `color`).
    Input {
        /// HTML-style input type.
        input_type: InputKind,
        /// Current text; empty when the value is missing.
        value: String,
        /// Placeholder text.
        placeholder: Option<String>,
    },
    /// A multi-line input.
    Textarea {
        /// Current text.
        value: String,
        /// Placeholder text.
        placeholder: Option<String>,
    },
    /// A drop-down of options.
    Select {
        /// Available options.
        options: Vec<SelectOption>,
        /// Currently chosen value.
        selected: Option<String>,
        /// Placeholder text.
        placeholder: Option<String>,
    },
    /// A checkbox.
    Checkbox {
        /// Whether the box is ticked.
        checked: bool,
    },
    /// A radio group.
    Radio {
        /// Available options.
        options: Vec<SelectOption>,
        /// Currently chosen value.
        selected: Option<String>,
    },
    /// A date (or date and time) picker.
    DatePicker {
        /// Current value as written in the form.
        value: String,
        /// Whether time of day is captured.
        show_time: bool,
    },
    /// A file picker.
    FileUpload {
        /// Files currently held.
        files: Vec<FileMeta>,
        /// Accepted extensions and media types.
        accept: Option<String>,
        /// Whether several files are taken.
        multiple: bool,
        /// Largest accepted file in bytes.
        max_size: Option<u64>,
    },
    /// A multi-choice list.
    MultiSelect {
        /// Available options.
        options: Vec<SelectOption>,
        /// Currently chosen values.
        selected: Vec<String>,
        /// Placeholder text.
        placeholder: Option<String>,
    },
    /// A searchable single-choice list.
    Combobox {
        /// Available options.
        options: Vec<SelectOption>,
        /// Currently chosen value.
        selected: Option<String>,
        /// Placeholder text.
        placeholder: Option<String>,
    },
    /// A slider.
    Slider {
        /// Current position, if a number is held.
        value: Option<f64>,
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
        /// Step.
        step: f64,
    },
}

// -----------------------------------------------------------------------------
// Visibility
// -----------------------------------------------------------------------------

/// Runs one visibility pass over `fields` and returns true if the state
/// changed.
///
/// Conditions are evaluated against the value tree as it was at the start
/// of the pass; callers repeat the pass until it reports no change.
///
/// # Errors
///
/// Returns [`FormError::InvalidPath`](crate::FormError::InvalidPath) if a
/// default cannot be written into the current value tree.
pub fn sync_visibility(fields: &[Field], state: &mut FormState) -> Result<bool> {
    let values = state.values().clone();
    sync_scope(fields, &FieldPath::root(), &values, state)
}

fn sync_scope(
    fields: &[Field],
    scope: &FieldPath,
    values: &Value,
    state: &mut FormState,
) -> Result<bool> {
    let mut changed = false;
    for field in fields {
        let path = scope.child(field.name());

        if !field.is_visible(values) {
            let had_value = state.value(&path).is_some();
            changed |= state.unregister(&path) || had_value;
            continue;
        }

        match field.variant() {
            FieldVariant::Leaf(_) => {
                changed |= state.register(&path, default_of(field))?;
            }
            FieldVariant::Group { fields, .. } => {
                changed |= sync_scope(fields, &path, values, state)?;
            }
            FieldVariant::Array { fields, .. } => {
                changed |= state.ensure_value(&path, default_of(field))?;
                let count = item_count(state.value(&path));
                for index in 0..count {
                    changed |= sync_scope(fields, &path.index(index), values, state)?;
                }
            }
        }
    }
    Ok(changed)
}

fn item_count(value: Option<&Value>) -> usize {
    value.and_then(Value::as_array).map_or(0, Vec::len)
}

// -----------------------------------------------------------------------------
// Rendering
// -----------------------------------------------------------------------------

/// Renders the visible fields of `detail` with the values and errors held
/// in `state`.
pub fn render(detail: &FormDetail, state: &FormState) -> RenderTree {
    RenderTree {
        title: detail.get_title().to_string(),
        description: detail.get_description().map(str::to_string),
        cols: detail.get_cols(),
        nodes: render_scope(detail.fields(), &FieldPath::root(), state),
    }
}

fn render_scope(fields: &[Field], scope: &FieldPath, state: &FormState) -> Vec<RenderNode> {
    fields
        .iter()
        .filter(|field| field.is_visible(state.values()))
        .map(|field| render_field(field, scope.child(field.name()), state))
        .collect()
}

fn render_field(field: &Field, path: FieldPath, state: &FormState) -> RenderNode {
    let label = field.get_label().to_string();
    let description = field.get_description().map(str::to_string);
    let col_span = field.get_col_span();

    match field.variant() {
        FieldVariant::Leaf(leaf) => RenderNode::Control(ControlNode {
            error: state.error(&path).map(str::to_string),
            control: control_for(leaf, field.get_placeholder(), state.value(&path)),
            required: field.is_required(),
            path,
            label,
            description,
            col_span,
        }),
        FieldVariant::Group { fields, cols } => RenderNode::Group(GroupNode {
            children: render_scope(fields, &path, state),
            cols: *cols,
            path,
            label,
            description,
            col_span,
        }),
        FieldVariant::Array { fields, cols } => {
            let items = (0..item_count(state.value(&path)))
                .map(|index| {
                    let item_path = path.index(index);
                    ArrayItemNode {
                        index,
                        children: render_scope(fields, &item_path, state),
                        path: item_path,
                    }
                })
                .collect();
            RenderNode::Array(ArrayNode {
                add_label: format!("Add {label}"),
                items,
                cols: *cols,
                path,
                label,
                description,
                col_span,
            })
        }
    }
}

fn control_for(leaf: &LeafField, placeholder: Option<&str>, value: Option<&Value>) -> Control {
    let placeholder = placeholder.map(str::to_string);
    let options = || leaf.options.clone();
    let constraints = &leaf.constraints;

    match leaf.kind {
        InputKind::Text
        | InputKind::Email
        | InputKind::Password
        | InputKind::Number
        | InputKind::Url
        | InputKind::Tel
        | InputKind::Search
        | InputKind::Time
        | InputKind::Color => Control::Input {
            input_type: leaf.kind,
            value: display_text(value),
            placeholder,
        },
        InputKind::Textarea => Control::Textarea {
            value: display_text(value),
            placeholder,
        },
        InputKind::Select => Control::Select {
            options: options(),
            selected: chosen(value),
            placeholder,
        },
        InputKind::Checkbox => Control::Checkbox {
            checked: value.and_then(Value::as_bool).unwrap_or(false),
        },
        InputKind::Radio => Control::Radio {
            options: options(),
            selected: chosen(value),
        },
        InputKind::Date => Control::DatePicker {
            value: display_text(value),
            show_time: constraints.show_time,
        },
        InputKind::DatetimeLocal => Control::DatePicker {
            value: display_text(value),
            show_time: true,
        },
        InputKind::File => Control::FileUpload {
            files: value
                .and_then(Value::as_array)
                .map(|items| {
                    items
                        .iter()
                        .filter_map(|item| serde_json::from_value(item.clone()).ok())
                        .collect()
                })
                .unwrap_or_default(),
            accept: constraints.accept.clone(),
            multiple: constraints.multiple,
            max_size: constraints.max_size,
        },
        InputKind::Multiselect => Control::MultiSelect {
            options: options(),
            selected: value
                .and_then(Value::as_array)
                .map(|items| items.iter().map(|v| display_text(Some(v))).collect())
                .unwrap_or_default(),
            placeholder,
        },
        InputKind::Combobox => Control::Combobox {
            options: options(),
            selected: chosen(value),
            placeholder,
        },
        InputKind::Range => Control::Slider {
            value: value.and_then(Value::as_f64),
            min: constraints.min.unwrap_or(0.0),
            max: constraints.max.unwrap_or(100.0),
            step: constraints.step.unwrap_or(1.0),
        },
    }
}

// Text shown in a controlled input; a missing value shows as empty.
fn display_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

fn chosen(value: Option<&Value>) -> Option<String> {
    Some(display_text(value)).filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::Condition;
    use serde_json::json;

    fn path(text: &str) -> FieldPath {
        FieldPath::parse(text).unwrap()
    }

    fn settle(fields: &[Field], state: &mut FormState) {
        while sync_visibility(fields, state).unwrap() {}
    }

    fn marital() -> FormDetail {
        FormDetail::new(
            "User",
            vec![
                Field::select("maritalStatus", "Marital Status")
                    .option("Single", "single")
                    .option("Married", "married")
                    .value("single"),
                Field::text("spouseName", "Spouse's Name")
                    .condition(Condition::equals("maritalStatus", "married")),
            ],
        )
    }

    #[test]
    fn test_hidden_by_condition_is_not_rendered_or_registered() {
        let detail = marital();
        let mut state = FormState::new(json!({"maritalStatus": "single", "spouseName": ""}));
        settle(detail.fields(), &mut state);

        assert!(!state.is_registered(&path("spouseName")));
        assert!(state.value(&path("spouseName")).is_none());
        let tree = render(&detail, &state);
        assert!(tree.find(&path("spouseName")).is_none());
        assert!(tree.find(&path("maritalStatus")).is_some());
    }

    #[test]
    fn test_becoming_visible_registers_with_default() {
        let detail = marital();
        let mut state = FormState::new(json!({"maritalStatus": "married"}));
        settle(detail.fields(), &mut state);
        assert!(state.is_registered(&path("spouseName")));
        assert_eq!(state.value(&path("spouseName")), Some(&json!("")));
    }

    #[test]
    fn test_unconditionally_hidden_field() {
        let detail = FormDetail::new("X", vec![Field::text("id", "Id").hidden()]);
        let mut state = FormState::new(json!({}));
        settle(detail.fields(), &mut state);
        assert!(render(&detail, &state).nodes.is_empty());
        assert_eq!(state.registered().count(), 0);
    }

    #[test]
    fn test_group_and_array_paths() {
        let detail = FormDetail::new(
            "Profile",
            vec![
                Field::group("address", "Address", vec![Field::text("state", "State")]).cols(3),
                Field::array("skills", "Skills", vec![Field::text("skillName", "Skill")]).cols(2),
            ],
        );
        let mut state = FormState::new(json!({
            "address": {"state": "KA"},
            "skills": [{"skillName": "a"}, {"skillName": "b"}],
        }));
        settle(detail.fields(), &mut state);

        let tree = render(&detail, &state);
        let Some(RenderNode::Group(group)) = tree.find(&path("address")) else {
            panic!("address should render as a group");
        };
        assert_eq!(group.cols.get(), 3);
        assert_eq!(group.children[0].path(), &path("address.state"));

        let Some(RenderNode::Array(array)) = tree.find(&path("skills")) else {
            panic!("skills should render as an array");
        };
        assert_eq!(array.items.len(), 2);
        assert_eq!(array.add_label, "Add Skills");
        assert_eq!(array.items[1].children[0].path(), &path("skills.1.skillName"));

        let Some(RenderNode::Control(control)) = tree.find(&path("skills.1.skillName")) else {
            panic!("item leaf should render");
        };
        assert_eq!(
            control.control,
            Control::Input {
                input_type: InputKind::Text,
                value: "b".into(),
                placeholder: None,
            }
        );
    }

    #[test]
    fn test_every_kind_renders() {
        let fields: Vec<Field> = InputKind::ALL
            .into_iter()
            .map(|kind| Field::leaf(kind, kind.as_str(), kind.as_str()))
            .collect();
        let detail = FormDetail::new("All", fields);
        let mut state = FormState::new(json!({}));
        settle(detail.fields(), &mut state);
        assert_eq!(render(&detail, &state).controls().len(), InputKind::ALL.len());
    }

    #[test]
    fn test_control_states() {
        let leaf = |field: Field| field.as_leaf().cloned().unwrap();

        let slider = control_for(
            &leaf(Field::leaf(InputKind::Range, "r", "R").range(0.0, 10.0, 0.5)),
            None,
            Some(&json!(4.5)),
        );
        assert_eq!(
            slider,
            Control::Slider { value: Some(4.5), min: 0.0, max: 10.0, step: 0.5 }
        );

        let number = control_for(&leaf(Field::number("n", "N")), None, None);
        assert!(matches!(number, Control::Input { ref value, .. } if value.is_empty()));

        let checkbox = control_for(&leaf(Field::checkbox("c", "C")), None, Some(&json!(true)));
        assert_eq!(checkbox, Control::Checkbox { checked: true });

        let select = control_for(&leaf(Field::select("s", "S")), None, Some(&json!("")));
        assert!(matches!(select, Control::Select { selected: None, .. }));
    }

    #[test]
    fn test_error_is_attached_to_control() {
        use crate::issues::{Issue, IssueCode, ValidationErrors};

        let detail = FormDetail::new("X", vec![Field::text("name", "Name").required()]);
        let mut state = FormState::new(json!({}));
        settle(detail.fields(), &mut state);
        state.set_errors(ValidationErrors::from(vec![
            Issue::new(IssueCode::Required, "Name is required").under(&path("name")),
        ]));

        let tree = render(&detail, &state);
        let controls = tree.controls();
        assert_eq!(controls[0].error.as_deref(), Some("Name is required"));
        assert!(controls[0].required);
    }
}
