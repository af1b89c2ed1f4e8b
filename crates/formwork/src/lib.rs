#![forbid(unsafe_code)]
// Allow pedantic lints for early-stage API ergonomics.
#![allow(clippy::nursery)]
#![allow(clippy::pedantic)]

//! # Formwork
//!
//! A headless engine for schema-driven forms.
//!
//! A form is described declaratively as a [`FormDetail`]: typed leaf fields,
//! nested groups, repeated arrays, each with a validation [`Rule`], a layout
//! hint, an optional visibility [`Condition`] and an optional change hook.
//! From that description Formwork derives:
//! - A structural validation [`Schema`] and a default value tree
//! - A conditional overlay that validates fields only while they are visible
//! - A render tree with one control per field, kept in sync with the live
//!   [`FormState`] (hidden fields are unregistered, never submitted)
//! - Grid layout information for any front end
//!
//! ## Example
//!
//! ```rust
//! use formwork::{Condition, Field, FieldInput, FieldPath, FormDetail, FormEngine, Rule};
//!
//! let detail = FormDetail::new(
//!     "User Information",
//!     vec![
//!         Field::select("maritalStatus", "Marital Status")
//!             .option("Single", "single")
//!             .option("Married", "married")
//!             .rule(Rule::string().min(1).message("Marital status is required")),
//!         Field::text("spouseName", "Spouse's Name")
//!             .rule(Rule::string().min(1).message("Spouse's name is required"))
//!             .condition(Condition::equals("maritalStatus", "married")),
//!     ],
//! );
//!
//! let mut engine = FormEngine::new(detail)?;
//! engine.input(&FieldPath::parse("maritalStatus")?, FieldInput::choice("married"))?;
//!
//! let errors = engine.validate().unwrap_err();
//! assert_eq!(errors.first(&FieldPath::parse("spouseName")?), Some("Spouse's name is required"));
//! # Ok::<(), formwork::FormError>(())
//! ```

pub mod compile;
pub mod condition;
pub mod descriptor;
pub mod detail;
pub mod engine;
pub mod field;
pub mod issues;
pub mod layout;
pub mod overlay;
pub mod path;
pub mod render;
pub mod rule;
pub mod state;

use thiserror::Error;

pub use compile::{CompiledForm, Schema, compile, default_values};
pub use condition::Condition;
pub use descriptor::{FieldDescriptor, FormDescriptor};
pub use detail::FormDetail;
pub use engine::{FieldInput, FileMeta, FormEngine, SubmitError};
pub use field::{
    Constraints, DateOutput, Field, FieldVariant, InputKind, LeafField, OnChange, SelectOption,
};
pub use issues::{Issue, IssueCode, ValidationErrors};
pub use layout::{Columns, Placement, place};
pub use overlay::ConditionalOverlay;
pub use path::{FieldPath, PathSegment};
pub use render::{ArrayItemNode, ArrayNode, Control, ControlNode, GroupNode, RenderNode, RenderTree};
pub use rule::Rule;
pub use state::FormState;

// -----------------------------------------------------------------------------
// Errors
// -----------------------------------------------------------------------------

/// Errors raised by the form engine.
///
/// These are programmer errors: a malformed path, a name collision in the
/// field schema, or an input that does not fit the addressed field. User
/// input that fails validation is never a `FormError`; it is reported as
/// [`ValidationErrors`] and only blocks submission.
///
/// # Recovery Strategies
///
/// | Error Variant | Recovery Strategy |
/// |--------------|-------------------|
/// | [`InvalidPath`](FormError::InvalidPath) | Fix the path literal or the value tree shape |
/// | [`DuplicateField`](FormError::DuplicateField) | Rename one of the colliding fields |
/// | [`InvalidFieldName`](FormError::InvalidFieldName) | Give the field a non-empty name without `.` that is not all digits |
/// | [`UnknownField`](FormError::UnknownField) | Address an existing field |
/// | [`Inactive`](FormError::Inactive) | Wait until the field's condition holds |
/// | [`Descriptor`](FormError::Descriptor) | Fix the form description document |
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    /// A path could not be parsed or does not fit the value tree.
    #[error("invalid path '{path}': {reason}")]
    InvalidPath {
        /// The offending path, as written.
        path: String,
        /// Why the path was rejected.
        reason: String,
    },

    /// Two fields in the same scope share a name.
    #[error("duplicate field '{0}'")]
    DuplicateField(String),

    /// A field name is empty, contains a `.` or is all digits.
    #[error("invalid field name at '{0}'")]
    InvalidFieldName(String),

    /// No field exists at the given path.
    #[error("unknown field '{0}'")]
    UnknownField(String),

    /// The path addresses a group or array where a leaf was expected.
    #[error("field '{0}' is not a leaf field")]
    NotALeaf(String),

    /// The path addresses something other than an array field.
    #[error("field '{0}' is not an array field")]
    NotAnArray(String),

    /// The input variant does not fit the field kind.
    #[error("input for '{path}' does not fit a {kind} field")]
    InputMismatch {
        /// Path of the addressed field.
        path: String,
        /// Kind tag of the addressed field.
        kind: String,
    },

    /// The field is currently hidden by its condition and not registered.
    #[error("field '{0}' is not active")]
    Inactive(String),

    /// A form description document could not be read.
    #[error("invalid form description: {0}")]
    Descriptor(String),
}

impl FormError {
    /// Creates an invalid path error.
    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Creates a descriptor error with the given message.
    pub fn descriptor(message: impl Into<String>) -> Self {
        Self::Descriptor(message.into())
    }

    /// Returns true if this error comes from the field schema itself
    /// rather than from a call against it.
    pub fn is_schema_error(&self) -> bool {
        matches!(
            self,
            Self::DuplicateField(_) | Self::InvalidFieldName(_) | Self::Descriptor(_)
        )
    }

    /// Returns true if this error was raised for a path argument.
    pub fn is_path_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidPath { .. } | Self::UnknownField(_) | Self::NotALeaf(_) | Self::NotAnArray(_)
        )
    }
}

/// A specialized [`Result`] type for form operations.
pub type Result<T> = std::result::Result<T, FormError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_error_display() {
        let err = FormError::DuplicateField("address.state".into());
        assert_eq!(format!("{err}"), "duplicate field 'address.state'");

        let err = FormError::invalid_path("a..b", "empty segment");
        assert_eq!(format!("{err}"), "invalid path 'a..b': empty segment");
    }

    #[test]
    fn test_form_error_predicates() {
        assert!(FormError::DuplicateField("x".into()).is_schema_error());
        assert!(FormError::descriptor("bad").is_schema_error());
        assert!(!FormError::Inactive("x".into()).is_schema_error());

        assert!(FormError::UnknownField("x".into()).is_path_error());
        assert!(FormError::invalid_path("", "empty").is_path_error());
        assert!(!FormError::Inactive("x".into()).is_path_error());
    }
}
