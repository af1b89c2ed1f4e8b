//! Visibility conditions.
//!
//! A [`Condition`] decides whether a field is shown (and therefore
//! registered and validated). It always sees the whole current value tree,
//! not just the field's own scope.

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use crate::path::FieldPath;

type Predicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// A pure function of the whole form value tree.
#[derive(Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Condition {
    /// The value at `field` equals `value`.
    Equals {
        /// Path of the value to compare.
        field: FieldPath,
        /// Expected value.
        value: Value,
    },
    /// The value at `field` differs from `value` (or is missing).
    NotEquals {
        /// Path of the value to compare.
        field: FieldPath,
        /// Value that must not be present.
        value: Value,
    },
    /// The value at `field` is one of `values`.
    OneOf {
        /// Path of the value to compare.
        field: FieldPath,
        /// Accepted values.
        values: Vec<Value>,
    },
    /// The value at `field` is truthy.
    Truthy {
        /// Path of the value to test.
        field: FieldPath,
    },
    /// Every condition holds.
    All {
        /// Conditions to combine.
        conditions: Vec<Condition>,
    },
    /// At least one condition holds.
    Any {
        /// Conditions to combine.
        conditions: Vec<Condition>,
    },
    /// The condition does not hold.
    Not {
        /// Condition to negate.
        condition: Box<Condition>,
    },
    /// A closure. Not available in form descriptions.
    #[serde(skip)]
    Predicate(Predicate),
}

impl Condition {
    /// A condition backed by a closure over the whole value tree.
    pub fn when<F>(predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self::Predicate(Arc::new(predicate))
    }

    /// Holds when the value at `field` (a dotted path) equals `value`.
    pub fn equals(field: &str, value: impl Into<Value>) -> Self {
        Self::Equals {
            field: literal_path(field),
            value: value.into(),
        }
    }

    /// Holds when the value at `field` is one of `values`.
    pub fn one_of<V: Into<Value>>(field: &str, values: impl IntoIterator<Item = V>) -> Self {
        Self::OneOf {
            field: literal_path(field),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Holds when the value at `field` is truthy.
    pub fn truthy(field: &str) -> Self {
        Self::Truthy {
            field: literal_path(field),
        }
    }

    /// Negates this condition.
    pub fn negate(self) -> Self {
        Self::Not {
            condition: Box::new(self),
        }
    }

    /// Evaluates the condition against the whole value tree.
    pub fn evaluate(&self, values: &Value) -> bool {
        match self {
            Self::Equals { field, value } => field.lookup(values) == Some(value),
            Self::NotEquals { field, value } => field.lookup(values) != Some(value),
            Self::OneOf { field, values: options } => field
                .lookup(values)
                .is_some_and(|found| options.contains(found)),
            Self::Truthy { field } => is_truthy(field.lookup(values)),
            Self::All { conditions } => conditions.iter().all(|c| c.evaluate(values)),
            Self::Any { conditions } => conditions.iter().any(|c| c.evaluate(values)),
            Self::Not { condition } => !condition.evaluate(values),
            Self::Predicate(predicate) => predicate(values),
        }
    }
}

// Text that does not parse as a dotted path is taken as a single key.
fn literal_path(field: &str) -> FieldPath {
    FieldPath::parse(field).unwrap_or_else(|_| FieldPath::root().child(field))
}

/// Truthiness of a form value: missing, null, false, empty text, zero and
/// empty lists are false.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(_)) => true,
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equals { field, value } => write!(f, "{field} == {value}"),
            Self::NotEquals { field, value } => write!(f, "{field} != {value}"),
            Self::OneOf { field, values } => write!(f, "{field} in {values:?}"),
            Self::Truthy { field } => write!(f, "truthy({field})"),
            Self::All { conditions } => f.debug_tuple("All").field(conditions).finish(),
            Self::Any { conditions } => f.debug_tuple("Any").field(conditions).finish(),
            Self::Not { condition } => write!(f, "!({condition:?})"),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}
