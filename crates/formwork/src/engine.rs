//! The form engine.
//!
//! [`FormEngine`] hosts one live form. It owns the active [`FormDetail`],
//! its compiled schema and conditional overlay, the live [`FormState`] and
//! the submit and detail-change callbacks, and runs every interaction in the
//! same order:
//!
//! 1. the input is coerced for the field's kind and written to the state,
//! 2. visibility is settled (hidden fields unregistered, shown ones
//!    registered with their default),
//! 3. change hooks of fields whose value moved are invoked, each returning
//!    the next form detail, which replaces the active one.
//!
//! ```rust
//! use formwork::{Field, FieldInput, FieldPath, FormDetail, FormEngine, Rule};
//!
//! let detail = FormDetail::new("Survey", vec![
//!     Field::number("age", "Age").rule(Rule::number().int().min(18.0)),
//! ]);
//! let mut engine = FormEngine::new(detail)?;
//! let age = FieldPath::parse("age")?;
//!
//! engine.input(&age, FieldInput::text("42"))?;
//! assert_eq!(engine.submit().unwrap(), serde_json::json!({"age": 42}));
//! # Ok::<(), formwork::FormError>(())
//! ```

use std::collections::BTreeMap;
use std::fmt;

use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::compile::{CompiledForm, compile, default_values};
use crate::detail::FormDetail;
use crate::field::{DateOutput, Field, FieldVariant, InputKind, LeafField, OnChange};
use crate::issues::ValidationErrors;
use crate::overlay::ConditionalOverlay;
use crate::path::FieldPath;
use crate::render::{RenderTree, render, sync_visibility};
use crate::rule::{number_value, parse_date_time};
use crate::state::{FormState, shift};
use crate::{FormError, Result};

/// Visibility passes allowed before settling gives up.
const MAX_SETTLE_PASSES: usize = 16;

// -----------------------------------------------------------------------------
// Inputs
// -----------------------------------------------------------------------------

/// Description of one uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMeta {
    /// File name.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// Media type.
    #[serde(rename = "type", default)]
    pub mime: String,
}

impl FileMeta {
    /// Creates a file description.
    pub fn new(name: impl Into<String>, size: u64, mime: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size,
            mime: mime.into(),
        }
    }

    fn to_value(&self) -> Value {
        json!({"name": self.name, "size": self.size, "type": self.mime})
    }
}

/// A raw user input, as a control produces it.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldInput {
    /// Typed text (text-like, numeric and date controls; also accepted by
    /// single-choice controls).
    Text(String),
    /// A checkbox state.
    Toggle(bool),
    /// A single choice.
    Choice(String),
    /// Several choices.
    Choices(Vec<String>),
    /// Picked files.
    Files(Vec<FileMeta>),
    /// Empties the field, leaving its value undefined.
    Clear,
}

impl FieldInput {
    /// Typed text.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// A single choice.
    pub fn choice(value: impl Into<String>) -> Self {
        Self::Choice(value.into())
    }

    /// Several choices.
    pub fn choices<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        Self::Choices(values.into_iter().map(Into::into).collect())
    }

    /// A checkbox state.
    pub fn toggle(checked: bool) -> Self {
        Self::Toggle(checked)
    }
}

// -----------------------------------------------------------------------------
// Errors
// -----------------------------------------------------------------------------

/// Why a submission did not go through.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubmitError {
    /// At least one active field failed validation; nothing was submitted.
    #[error("{0}")]
    Invalid(#[from] ValidationErrors),

    /// The submit callback refused the payload.
    #[error("submission rejected: {0}")]
    Rejected(String),
}

impl SubmitError {
    /// Returns true if validation blocked the submission.
    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid(_))
    }

    /// Returns true if the submit callback refused the payload.
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }

    /// Returns the validation errors, if validation blocked the submission.
    pub fn errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Invalid(errors) => Some(errors),
            Self::Rejected(_) => None,
        }
    }
}

// -----------------------------------------------------------------------------
// Engine
// -----------------------------------------------------------------------------

type SubmitHandler = Box<dyn FnMut(&Value) -> std::result::Result<(), String>>;
type DetailListener = Box<dyn FnMut(&FormDetail)>;

/// Hosts one live form.
pub struct FormEngine {
    detail: FormDetail,
    compiled: CompiledForm,
    overlay: ConditionalOverlay,
    state: FormState,
    observed: BTreeMap<FieldPath, Value>,
    on_submit: Option<SubmitHandler>,
    on_detail_change: Option<DetailListener>,
    notice: Option<String>,
}

impl fmt::Debug for FormEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormEngine")
            .field("title", &self.detail.get_title())
            .field("state", &self.state)
            .field("notice", &self.notice)
            .finish()
    }
}

impl FormEngine {
    /// Compiles `detail` and mounts it with its default values.
    ///
    /// Change hooks do not run on mount.
    ///
    /// # Errors
    ///
    /// Returns a schema error ([`FormError::DuplicateField`],
    /// [`FormError::InvalidFieldName`]) if the field list is malformed.
    pub fn new(detail: FormDetail) -> Result<Self> {
        let compiled = compile(detail.fields())?;
        let overlay = ConditionalOverlay::collect(detail.fields())?;
        let state = FormState::new(compiled.defaults.clone());
        let mut engine = Self {
            detail,
            compiled,
            overlay,
            state,
            observed: BTreeMap::new(),
            on_submit: None,
            on_detail_change: None,
            notice: None,
        };
        engine.settle()?;
        engine.observed = engine.snapshot();
        Ok(engine)
    }

    /// Sets the callback receiving validated payloads. Returning `Err`
    /// rejects the submission and shows the message as a notice.
    pub fn on_submit<F>(mut self, handler: F) -> Self
    where
        F: FnMut(&Value) -> std::result::Result<(), String> + 'static,
    {
        self.on_submit = Some(Box::new(handler));
        self
    }

    /// Sets the callback told about every form detail replacement.
    pub fn on_detail_change<F>(mut self, listener: F) -> Self
    where
        F: FnMut(&FormDetail) + 'static,
    {
        self.on_detail_change = Some(Box::new(listener));
        self
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Returns the active form detail.
    pub fn detail(&self) -> &FormDetail {
        &self.detail
    }

    /// Returns the compiled schema and defaults of the active detail.
    pub fn compiled(&self) -> &CompiledForm {
        &self.compiled
    }

    /// Returns the live state.
    pub fn state(&self) -> &FormState {
        &self.state
    }

    /// Returns the current value tree.
    pub fn values(&self) -> &Value {
        self.state.values()
    }

    /// Returns the errors of the last validation, minus those cleared by
    /// later edits.
    pub fn errors(&self) -> &ValidationErrors {
        self.state.errors()
    }

    /// Returns the screen-level notice left by a rejected submission.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Dismisses the notice.
    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// Renders the form as it currently stands.
    pub fn render(&self) -> RenderTree {
        render(&self.detail, &self.state)
    }

    // -------------------------------------------------------------------------
    // Interaction
    // -------------------------------------------------------------------------

    /// Writes a user input to the leaf at `path`.
    ///
    /// Numeric kinds parse the text (unparseable text leaves the value
    /// undefined); date kinds normalise it; file kinds drop oversized files
    /// and keep only the first one unless several are allowed.
    ///
    /// # Errors
    ///
    /// - [`FormError::UnknownField`] if no field lives at `path`
    /// - [`FormError::NotALeaf`] if the field is a group or an array
    /// - [`FormError::Inactive`] if the field is currently hidden
    /// - [`FormError::InputMismatch`] if the input does not fit the kind
    pub fn input(&mut self, path: &FieldPath, input: FieldInput) -> Result<()> {
        let value = {
            let field = self
                .detail
                .field_at(path)
                .ok_or_else(|| FormError::UnknownField(path.to_string()))?;
            let leaf = field
                .as_leaf()
                .ok_or_else(|| FormError::NotALeaf(path.to_string()))?;
            if !self.state.is_registered(path) {
                return Err(FormError::Inactive(path.to_string()));
            }
            coerce(leaf, path, input)?
        };

        match value {
            Some(value) => self.state.set_value(path, value)?,
            None => {
                self.state.clear_value(path);
            }
        }
        self.after_write()
    }

    /// Appends a freshly defaulted item to the array at `path` and returns
    /// its index.
    ///
    /// # Errors
    ///
    /// - [`FormError::UnknownField`] if no field lives at `path`
    /// - [`FormError::NotAnArray`] if the field is not an array
    /// - [`FormError::Inactive`] if the array is currently hidden
    pub fn append(&mut self, path: &FieldPath) -> Result<usize> {
        let item = default_values(self.array_at(path)?.children());
        if self.state.value(path).is_none() {
            return Err(FormError::Inactive(path.to_string()));
        }
        let index = self.state.append_item(path, item)?;
        debug!(path = %path, index, "appended array item");
        self.after_write()?;
        Ok(index)
    }

    /// Removes item `index` of the array at `path`; later items move down.
    ///
    /// # Errors
    ///
    /// - [`FormError::UnknownField`] if no field lives at `path`
    /// - [`FormError::NotAnArray`] if the field is not an array
    /// - [`FormError::InvalidPath`] if `index` is out of range
    pub fn remove(&mut self, path: &FieldPath, index: usize) -> Result<Value> {
        self.array_at(path)?;
        let removed = self.state.remove_item(path, index)?;
        self.observed = std::mem::take(&mut self.observed)
            .into_iter()
            .filter_map(|(p, v)| shift(&p, path, index).map(|p| (p, v)))
            .collect();
        debug!(path = %path, index, "removed array item");
        self.after_write()?;
        Ok(removed)
    }

    /// Replaces the form's values with `values` merged over the defaults,
    /// then settles visibility. Change hooks do not run.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::InvalidPath`] if a default cannot be written.
    pub fn load(&mut self, values: &Value) -> Result<()> {
        let merged = merge_values(self.detail.fields(), &self.compiled.defaults, values);
        self.state = FormState::new(merged);
        self.settle()?;
        self.observed = self.snapshot();
        Ok(())
    }

    /// Resets the form to its defaults.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::InvalidPath`] if a default cannot be written.
    pub fn reset(&mut self) -> Result<()> {
        self.state = FormState::new(self.compiled.defaults.clone());
        self.notice = None;
        self.settle()?;
        self.observed = self.snapshot();
        Ok(())
    }

    /// Replaces the active form detail.
    ///
    /// When the field list itself changed, the form is recompiled and the
    /// current values are merged over the new defaults: values whose field
    /// survives are kept, new fields start from their default.
    ///
    /// # Errors
    ///
    /// Returns a schema error if the new field list is malformed; the active
    /// detail is left untouched in that case.
    pub fn replace_detail(&mut self, next: FormDetail) -> Result<()> {
        if !next.same_fields(&self.detail) {
            let compiled = compile(next.fields())?;
            let overlay = ConditionalOverlay::collect(next.fields())?;
            let merged = merge_values(next.fields(), &compiled.defaults, self.state.values());
            debug!(
                fields = next.fields().len(),
                conditional = overlay.len(),
                "recompiled form after field list change"
            );
            self.compiled = compiled;
            self.overlay = overlay;
            self.state = FormState::new(merged);
        }
        self.detail = next;
        self.settle()?;
        if let Some(listener) = self.on_detail_change.as_mut() {
            listener(&self.detail);
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Validation
    // -------------------------------------------------------------------------

    /// Validates the active fields and returns the payload that would be
    /// submitted.
    ///
    /// The structural schema and the conditional overlay both run; their
    /// issues are merged and stored in the state for display. Values of
    /// inactive conditional fields never appear in the payload.
    pub fn validate(&mut self) -> std::result::Result<Value, ValidationErrors> {
        if let Err(err) = self.settle() {
            warn!(error = %err, "visibility pass failed before validation");
        }

        let values = self.state.values().clone();
        let (mut output, mut errors) = match self.compiled.schema.parse(Some(&values)) {
            Ok(output) => (
                output.unwrap_or_else(|| Value::Object(Map::new())),
                ValidationErrors::new(),
            ),
            Err(issues) => (values.clone(), ValidationErrors::from(issues)),
        };
        self.overlay.apply(&values, &mut output, &mut errors);
        self.state.set_errors(errors.clone());

        if errors.is_empty() {
            Ok(output)
        } else {
            debug!(issues = errors.len(), "form validation failed");
            Err(errors)
        }
    }

    /// Validates the form and hands the payload to the submit callback.
    ///
    /// A rejected submission leaves a notice and keeps every value, so the
    /// form stays open and editable.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::Invalid`] if validation fails and
    /// [`SubmitError::Rejected`] if the callback refuses the payload.
    pub fn submit(&mut self) -> std::result::Result<Value, SubmitError> {
        let payload = self.validate()?;
        self.notice = None;
        info!(title = self.detail.get_title(), "submitting form");

        if let Some(handler) = self.on_submit.as_mut() {
            if let Err(reason) = handler(&payload) {
                warn!(reason = %reason, "form submission rejected");
                self.notice = Some(reason.clone());
                return Err(SubmitError::Rejected(reason));
            }
        }
        Ok(payload)
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn array_at(&self, path: &FieldPath) -> Result<&Field> {
        let field = self
            .detail
            .field_at(path)
            .ok_or_else(|| FormError::UnknownField(path.to_string()))?;
        if field.is_array() {
            Ok(field)
        } else {
            Err(FormError::NotAnArray(path.to_string()))
        }
    }

    fn settle(&mut self) -> Result<()> {
        for _ in 0..MAX_SETTLE_PASSES {
            if !sync_visibility(self.detail.fields(), &mut self.state)? {
                return Ok(());
            }
        }
        warn!(
            passes = MAX_SETTLE_PASSES,
            "field visibility did not settle; conditions may depend on each other"
        );
        Ok(())
    }

    fn after_write(&mut self) -> Result<()> {
        self.settle()?;

        let current = self.snapshot();
        let mut changes = Vec::new();
        collect_hooks(self.detail.fields(), &FieldPath::root(), self.state.values(), &mut |path, hook| {
            let value = current.get(path).cloned().unwrap_or(Value::Null);
            let previous = self.observed.get(path).cloned().unwrap_or(Value::Null);
            if value != previous {
                changes.push((path.clone(), hook.clone(), value, previous));
            }
        });
        self.observed = current;

        if changes.is_empty() {
            return Ok(());
        }
        for (path, hook, value, previous) in changes {
            let next = hook.call(&value, &previous, &self.detail);
            debug!(path = %path, "change hook replaced form detail");
            self.replace_detail(next)?;
        }
        self.observed = self.snapshot();
        Ok(())
    }

    // Current values of every field that declares a change hook.
    fn snapshot(&self) -> BTreeMap<FieldPath, Value> {
        let mut observed = BTreeMap::new();
        let values = self.state.values();
        collect_hooks(self.detail.fields(), &FieldPath::root(), values, &mut |path, _| {
            observed.insert(path.clone(), path.lookup(values).cloned().unwrap_or(Value::Null));
        });
        observed
    }
}

// Calls `visit` for every concrete path of a field with a change hook,
// expanding array items present in `values`.
fn collect_hooks(
    fields: &[Field],
    scope: &FieldPath,
    values: &Value,
    visit: &mut dyn FnMut(&FieldPath, &OnChange),
) {
    for field in fields {
        let path = scope.child(field.name());
        if let Some(hook) = field.get_on_change() {
            visit(&path, hook);
        }
        match field.variant() {
            FieldVariant::Leaf(_) => {}
            FieldVariant::Group { fields, .. } => collect_hooks(fields, &path, values, visit),
            FieldVariant::Array { fields, .. } => {
                let count = path.lookup(values).and_then(Value::as_array).map_or(0, Vec::len);
                for index in 0..count {
                    collect_hooks(fields, &path.index(index), values, visit);
                }
            }
        }
    }
}

// Keeps every current value whose field still exists; everything else comes
// from `defaults`.
fn merge_values(fields: &[Field], defaults: &Value, current: &Value) -> Value {
    let mut merged = Map::new();
    for field in fields {
        let name = field.name();
        let Some(default) = defaults.get(name) else {
            continue;
        };
        let value = match (field.variant(), current.get(name)) {
            (FieldVariant::Leaf(_), Some(existing)) => existing.clone(),
            (FieldVariant::Group { fields, .. }, Some(existing @ Value::Object(_))) => {
                merge_values(fields, default, existing)
            }
            (FieldVariant::Array { fields, .. }, Some(Value::Array(items))) => {
                let template = default_values(fields);
                Value::Array(
                    items
                        .iter()
                        .map(|item| merge_values(fields, &template, item))
                        .collect(),
                )
            }
            _ => default.clone(),
        };
        merged.insert(name.to_string(), value);
    }
    Value::Object(merged)
}

// Turns a raw input into the value stored for a leaf; `None` leaves the
// value undefined.
fn coerce(leaf: &LeafField, path: &FieldPath, input: FieldInput) -> Result<Option<Value>> {
    let mismatch = || FormError::InputMismatch {
        path: path.to_string(),
        kind: leaf.kind.to_string(),
    };
    if input == FieldInput::Clear {
        return Ok(None);
    }

    let constraints = &leaf.constraints;
    if leaf.kind.is_numeric() {
        return match input {
            FieldInput::Text(text) => Ok(text
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(number_value)),
            _ => Err(mismatch()),
        };
    }
    match leaf.kind {
        // Numeric kinds return above.
        InputKind::Number | InputKind::Range => Err(mismatch()),
        InputKind::Text
        | InputKind::Email
        | InputKind::Password
        | InputKind::Textarea
        | InputKind::Url
        | InputKind::Tel
        | InputKind::Search
        | InputKind::Time
        | InputKind::Color => match input {
            FieldInput::Text(text) => Ok(Some(Value::String(text))),
            _ => Err(mismatch()),
        },
        InputKind::Checkbox => match input {
            FieldInput::Toggle(checked) => Ok(Some(Value::Bool(checked))),
            _ => Err(mismatch()),
        },
        InputKind::Select | InputKind::Radio | InputKind::Combobox => match input {
            FieldInput::Choice(choice) | FieldInput::Text(choice) => Ok(Some(Value::String(choice))),
            _ => Err(mismatch()),
        },
        InputKind::Multiselect => match input {
            FieldInput::Choices(choices) => Ok(Some(Value::Array(
                choices.into_iter().map(Value::String).collect(),
            ))),
            _ => Err(mismatch()),
        },
        InputKind::Date | InputKind::DatetimeLocal => match input {
            FieldInput::Text(text) => {
                let show_time = constraints.show_time || leaf.kind == InputKind::DatetimeLocal;
                Ok(Some(Value::String(normalize_date(&text, show_time, constraints.output))))
            }
            _ => Err(mismatch()),
        },
        InputKind::File => match input {
            FieldInput::Files(files) => {
                let picked = files.len();
                let mut kept: Vec<FileMeta> = files
                    .into_iter()
                    .filter(|file| constraints.max_size.is_none_or(|max| file.size <= max))
                    .collect();
                if !constraints.multiple {
                    kept.truncate(1);
                }
                if kept.len() != picked {
                    debug!(path = %path, picked, kept = kept.len(), "dropped picked files");
                }
                Ok(Some(Value::Array(kept.iter().map(FileMeta::to_value).collect())))
            }
            _ => Err(mismatch()),
        },
    }
}

// Writes a picked date the way the control is configured to; text that is
// not a date is kept as typed so validation can report it.
fn normalize_date(text: &str, show_time: bool, output: DateOutput) -> String {
    let Some(at) = parse_date_time(text) else {
        return text.to_string();
    };
    match output {
        DateOutput::Iso => at.and_utc().to_rfc3339_opts(SecondsFormat::Secs, true),
        DateOutput::String if show_time => at.format("%Y-%m-%dT%H:%M").to_string(),
        DateOutput::String => at.format("%Y-%m-%d").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::Condition;
    use crate::field::Constraints;
    use crate::rule::Rule;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn path(text: &str) -> FieldPath {
        FieldPath::parse(text).unwrap()
    }

    fn engine(fields: Vec<Field>) -> FormEngine {
        FormEngine::new(FormDetail::new("Test", fields)).unwrap()
    }

    mod coerce_tests {
        use super::*;

        #[test]
        fn test_number_input() {
            let mut engine = engine(vec![Field::number("age", "Age")]);
            engine.input(&path("age"), FieldInput::text("42")).unwrap();
            assert_eq!(engine.values()["age"], json!(42));

            engine.input(&path("age"), FieldInput::text("4.5")).unwrap();
            assert_eq!(engine.values()["age"], json!(4.5));

            engine.input(&path("age"), FieldInput::text("abc")).unwrap();
            assert!(engine.state().value(&path("age")).is_none());
        }

        #[test]
        fn test_range_input_is_numeric() {
            let mut engine = engine(vec![
                Field::leaf(InputKind::Range, "volume", "Volume").range(0.0, 10.0, 0.5),
            ]);
            engine.input(&path("volume"), FieldInput::text(" 7.5 ")).unwrap();
            assert_eq!(engine.values()["volume"], json!(7.5));

            let err = engine
                .input(&path("volume"), FieldInput::toggle(true))
                .unwrap_err();
            assert!(matches!(err, FormError::InputMismatch { .. }));
        }

        #[test]
        fn test_text_input_passes_through() {
            let mut engine = engine(vec![Field::text("name", "Name")]);
            engine.input(&path("name"), FieldInput::text("  Ada ")).unwrap();
            assert_eq!(engine.values()["name"], json!("  Ada "));
        }

        #[test]
        fn test_mismatched_input() {
            let mut engine = engine(vec![Field::checkbox("terms", "Terms")]);
            let err = engine.input(&path("terms"), FieldInput::text("yes")).unwrap_err();
            assert!(matches!(err, FormError::InputMismatch { .. }));
            engine.input(&path("terms"), FieldInput::toggle(true)).unwrap();
            assert_eq!(engine.values()["terms"], json!(true));
        }

        #[test]
        fn test_date_input() {
            let mut engine = engine(vec![
                Field::date("dob", "Birth date"),
                Field::date("meeting", "Meeting").show_time(),
                Field::date("iso", "Iso").constraints(Constraints {
                    output: DateOutput::Iso,
                    ..Constraints::default()
                }),
            ]);
            engine.input(&path("dob"), FieldInput::text("1990-05-17T10:30")).unwrap();
            engine.input(&path("meeting"), FieldInput::text("2024-01-02 09:15")).unwrap();
            engine.input(&path("iso"), FieldInput::text("2024-01-02")).unwrap();
            assert_eq!(engine.values()["dob"], json!("1990-05-17"));
            assert_eq!(engine.values()["meeting"], json!("2024-01-02T09:15"));
            assert_eq!(engine.values()["iso"], json!("2024-01-02T00:00:00Z"));

            engine.input(&path("dob"), FieldInput::text("soon")).unwrap();
            assert_eq!(engine.values()["dob"], json!("soon"));
        }

        #[test]
        fn test_file_input() {
            let mut engine = engine(vec![
                Field::leaf(InputKind::File, "resume", "Resume").accept(".pdf", Some(1_000), false),
                Field::leaf(InputKind::File, "photos", "Photos").accept("image/*", None, true),
            ]);
            engine
                .input(
                    &path("resume"),
                    FieldInput::Files(vec![
                        FileMeta::new("big.pdf", 5_000, "application/pdf"),
                        FileMeta::new("a.pdf", 10, "application/pdf"),
                        FileMeta::new("b.pdf", 20, "application/pdf"),
                    ]),
                )
                .unwrap();
            assert_eq!(
                engine.values()["resume"],
                json!([{"name": "a.pdf", "size": 10, "type": "application/pdf"}])
            );

            engine
                .input(
                    &path("photos"),
                    FieldInput::Files(vec![
                        FileMeta::new("a.png", 1, "image/png"),
                        FileMeta::new("b.png", 2, "image/png"),
                    ]),
                )
                .unwrap();
            assert_eq!(engine.values()["photos"].as_array().unwrap().len(), 2);
        }

        #[test]
        fn test_multiselect_input() {
            let mut engine = engine(vec![Field::leaf(InputKind::Multiselect, "langs", "Languages")]);
            engine.input(&path("langs"), FieldInput::choices(["en", "hi"])).unwrap();
            assert_eq!(engine.values()["langs"], json!(["en", "hi"]));
        }
    }

    #[test]
    fn test_input_errors() {
        let mut engine = engine(vec![
            Field::group("address", "Address", vec![Field::text("state", "State")]),
            Field::text("spouse", "Spouse").condition(Condition::truthy("married")),
        ]);
        assert!(matches!(
            engine.input(&path("nope"), FieldInput::text("x")),
            Err(FormError::UnknownField(_))
        ));
        assert!(matches!(
            engine.input(&path("address"), FieldInput::text("x")),
            Err(FormError::NotALeaf(_))
        ));
        assert!(matches!(
            engine.input(&path("spouse"), FieldInput::text("x")),
            Err(FormError::Inactive(_))
        ));
        assert!(matches!(engine.append(&path("address")), Err(FormError::NotAnArray(_))));
    }

    #[test]
    fn test_hook_runs_once_per_change_and_not_on_mount() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let seen = Rc::clone(&calls);
        let detail = FormDetail::new(
            "Hooks",
            vec![Field::text("name", "Name").on_change(|_, _, detail| detail.clone())],
        );
        let mut engine = FormEngine::new(detail)
            .unwrap()
            .on_detail_change(move |detail| seen.borrow_mut().push(detail.get_title().to_string()));
        assert!(calls.borrow().is_empty());

        engine.input(&path("name"), FieldInput::text("A")).unwrap();
        engine.input(&path("name"), FieldInput::text("A")).unwrap();
        engine.input(&path("name"), FieldInput::text("B")).unwrap();
        assert_eq!(calls.borrow().len(), 2);
    }

    #[test]
    fn test_hook_receives_new_and_previous_values() {
        let pairs = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&pairs);
        let detail = FormDetail::new(
            "Hooks",
            vec![Field::select("plan", "Plan").value("free").on_change(|new, prev, detail| {
                detail.clone().title(format!("{prev} -> {new}"))
            })],
        );
        let mut engine = FormEngine::new(detail)
            .unwrap()
            .on_detail_change(move |detail| sink.borrow_mut().push(detail.get_title().to_string()));

        engine.input(&path("plan"), FieldInput::choice("pro")).unwrap();
        assert_eq!(pairs.borrow().as_slice(), ["\"free\" -> \"pro\""]);
        assert_eq!(engine.detail().get_title(), "\"free\" -> \"pro\"");
    }

    #[test]
    fn test_replace_detail_merges_values() {
        let mut engine = engine(vec![Field::text("name", "Name"), Field::text("city", "City")]);
        engine.input(&path("name"), FieldInput::text("Ada")).unwrap();

        let next = engine
            .detail()
            .with_fields(vec![Field::text("name", "Name"), Field::text("zip", "Zip").value("000")]);
        engine.replace_detail(next).unwrap();
        assert_eq!(engine.values(), &json!({"name": "Ada", "zip": "000"}));
        assert!(engine.state().is_registered(&path("zip")));
    }

    #[test]
    fn test_replace_detail_rejects_bad_schema() {
        let mut engine = engine(vec![Field::text("name", "Name")]);
        let next = engine
            .detail()
            .with_fields(vec![Field::text("a", "A"), Field::text("a", "A")]);
        assert!(engine.replace_detail(next).is_err());
        assert_eq!(engine.detail().fields().len(), 1);
    }

    #[test]
    fn test_rejected_submit_keeps_values() {
        let mut engine = engine(vec![Field::text("name", "Name").rule(Rule::string().min(1))])
            .on_submit(|_| Err("server unavailable".to_string()));
        engine.input(&path("name"), FieldInput::text("Ada")).unwrap();

        let err = engine.submit().unwrap_err();
        assert!(err.is_rejected());
        assert_eq!(engine.notice(), Some("server unavailable"));
        assert_eq!(engine.values()["name"], json!("Ada"));

        engine.dismiss_notice();
        assert!(engine.notice().is_none());
    }

    #[test]
    fn test_invalid_submit_does_not_call_handler() {
        let called = Rc::new(RefCell::new(false));
        let flag = Rc::clone(&called);
        let mut engine = engine(vec![Field::text("name", "Name").rule(Rule::string().min(1))])
            .on_submit(move |_| {
                *flag.borrow_mut() = true;
                Ok(())
            });

        let err = engine.submit().unwrap_err();
        assert!(err.is_invalid());
        assert!(!*called.borrow());
        assert!(engine.state().error(&path("name")).is_some());
    }

    #[test]
    fn test_load_and_reset() {
        let mut engine = engine(vec![Field::text("name", "Name"), Field::text("city", "City")]);
        engine.load(&json!({"name": "Ada", "extra": true})).unwrap();
        assert_eq!(engine.values(), &json!({"name": "Ada", "city": ""}));

        engine.reset().unwrap();
        assert_eq!(engine.values(), &json!({"name": "", "city": ""}));
    }

    #[test]
    fn test_merge_values_keeps_array_items() {
        let fields = vec![Field::array(
            "skills",
            "Skills",
            vec![Field::text("skillName", "Skill"), Field::number("level", "Level").value(1)],
        )];
        let defaults = default_values(&fields);
        let merged = merge_values(
            &fields,
            &defaults,
            &json!({"skills": [{"skillName": "a"}, {"skillName": "b", "level": 3}]}),
        );
        assert_eq!(
            merged,
            json!({"skills": [{"skillName": "a", "level": 1}, {"skillName": "b", "level": 3}]})
        );
    }
}
