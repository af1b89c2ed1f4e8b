//! Live form state.
//!
//! [`FormState`] holds the current value tree together with per-path
//! errors, the set of registered (visible) leaf paths and the set of paths
//! the user has edited. Only registered paths take part in a submission;
//! unregistering a path drops everything held for it.

use std::collections::BTreeSet;

use serde_json::Value;
use tracing::trace;

use crate::issues::ValidationErrors;
use crate::path::{FieldPath, PathSegment};
use crate::{FormError, Result};

/// Values, errors, registrations and touched marks of one form instance.
#[derive(Debug, Clone, Default)]
pub struct FormState {
    values: Value,
    errors: ValidationErrors,
    registered: BTreeSet<FieldPath>,
    touched: BTreeSet<FieldPath>,
}

impl FormState {
    /// Creates a state holding `defaults` with nothing registered.
    pub fn new(defaults: Value) -> Self {
        Self {
            values: defaults,
            ..Self::default()
        }
    }

    // -------------------------------------------------------------------------
    // Values
    // -------------------------------------------------------------------------

    /// Returns the whole value tree.
    pub fn values(&self) -> &Value {
        &self.values
    }

    /// Returns the value at `path`.
    pub fn value(&self, path: &FieldPath) -> Option<&Value> {
        path.lookup(&self.values)
    }

    /// Writes a value, marks the path touched and clears its errors.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::InvalidPath`] if the path does not fit the tree.
    pub fn set_value(&mut self, path: &FieldPath, value: Value) -> Result<()> {
        path.assign(&mut self.values, value)?;
        self.touched.insert(path.clone());
        self.errors.clear_under(path);
        Ok(())
    }

    /// Removes the value at `path`, leaving it undefined.
    pub fn clear_value(&mut self, path: &FieldPath) -> Option<Value> {
        self.touched.insert(path.clone());
        self.errors.clear_under(path);
        path.remove(&mut self.values)
    }

    /// Writes `default` at `path` if it holds no value yet, without marking
    /// anything touched. Returns true if a value was written.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::InvalidPath`] if the default cannot be written.
    pub fn ensure_value(&mut self, path: &FieldPath, default: Value) -> Result<bool> {
        if self.value(path).is_some() {
            return Ok(false);
        }
        path.assign(&mut self.values, default)?;
        Ok(true)
    }

    // -------------------------------------------------------------------------
    // Registration
    // -------------------------------------------------------------------------

    /// Registers a path, writing `default` if it holds no value yet.
    ///
    /// Returns false if the path was already registered.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::InvalidPath`] if the default cannot be written.
    pub fn register(&mut self, path: &FieldPath, default: Value) -> Result<bool> {
        if self.registered.contains(path) {
            return Ok(false);
        }
        if self.value(path).is_none() {
            path.assign(&mut self.values, default)?;
        }
        self.registered.insert(path.clone());
        trace!(path = %path, "registered field");
        Ok(true)
    }

    /// Unregisters a path and everything below it, dropping their values,
    /// errors and touched marks.
    ///
    /// Returns true if anything was registered there.
    pub fn unregister(&mut self, path: &FieldPath) -> bool {
        let before = self.registered.len();
        self.registered.retain(|p| !p.starts_with(path));
        let removed = self.registered.len() != before;

        self.touched.retain(|p| !p.starts_with(path));
        self.errors.clear_under(path);
        path.remove(&mut self.values);
        if removed {
            trace!(path = %path, "unregistered field");
        }
        removed
    }

    /// Returns true if `path` is registered.
    pub fn is_registered(&self, path: &FieldPath) -> bool {
        self.registered.contains(path)
    }

    /// Iterates over the registered paths in order.
    pub fn registered(&self) -> impl Iterator<Item = &FieldPath> {
        self.registered.iter()
    }

    /// Returns true if the user has edited `path`.
    pub fn is_touched(&self, path: &FieldPath) -> bool {
        self.touched.contains(path)
    }

    // -------------------------------------------------------------------------
    // Errors
    // -------------------------------------------------------------------------

    /// Returns the current errors.
    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// Returns the first error message at `path`.
    pub fn error(&self, path: &FieldPath) -> Option<&str> {
        self.errors.first(path)
    }

    /// Replaces the current errors.
    pub fn set_errors(&mut self, errors: ValidationErrors) {
        self.errors = errors;
    }

    // -------------------------------------------------------------------------
    // Arrays
    // -------------------------------------------------------------------------

    /// Appends `item` to the array at `path` and returns its index.
    /// A missing array is created.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::NotAnArray`] if something other than an array
    /// lives at `path`.
    pub fn append_item(&mut self, path: &FieldPath, item: Value) -> Result<usize> {
        match path.lookup_mut(&mut self.values) {
            Some(Value::Array(items)) => {
                items.push(item);
                Ok(items.len() - 1)
            }
            None | Some(Value::Null) => {
                path.assign(&mut self.values, Value::Array(vec![item]))?;
                Ok(0)
            }
            Some(_) => Err(FormError::NotAnArray(path.to_string())),
        }
    }

    /// Removes item `index` of the array at `path`.
    ///
    /// Registrations, touched marks and errors of later items move down by
    /// one; those of the removed item are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::NotAnArray`] if no array lives at `path` and
    /// [`FormError::InvalidPath`] if `index` is out of range.
    pub fn remove_item(&mut self, path: &FieldPath, index: usize) -> Result<Value> {
        let Some(Value::Array(items)) = path.lookup_mut(&mut self.values) else {
            return Err(FormError::NotAnArray(path.to_string()));
        };
        if index >= items.len() {
            return Err(FormError::invalid_path(
                path.index(index).to_string(),
                format!("index {index} past end of array of {}", items.len()),
            ));
        }
        let removed = items.remove(index);

        self.registered = std::mem::take(&mut self.registered)
            .into_iter()
            .filter_map(|p| shift(&p, path, index))
            .collect();
        self.touched = std::mem::take(&mut self.touched)
            .into_iter()
            .filter_map(|p| shift(&p, path, index))
            .collect();
        self.errors.remap(|p| shift(p, path, index));

        Ok(removed)
    }
}

// Renumbers `path` after item `removed` of `array` was deleted.
pub(crate) fn shift(path: &FieldPath, array: &FieldPath, removed: usize) -> Option<FieldPath> {
    let Some(rest) = path.strip_prefix(array) else {
        return Some(path.clone());
    };
    match rest.segments().split_first() {
        Some((PathSegment::Index(i), _)) if *i == removed => None,
        Some((PathSegment::Index(i), tail)) if *i > removed => Some(
            array
                .index(i - 1)
                .join(&FieldPath::from_segments(tail.iter().cloned())),
        ),
        _ => Some(path.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issues::{Issue, IssueCode};
    use serde_json::json;

    fn path(text: &str) -> FieldPath {
        FieldPath::parse(text).unwrap()
    }

    #[test]
    fn test_register_writes_default_once() {
        let mut state = FormState::new(json!({}));
        assert!(state.register(&path("name"), json!("")).unwrap());
        assert!(!state.register(&path("name"), json!("other")).unwrap());
        assert_eq!(state.value(&path("name")), Some(&json!("")));

        let mut state = FormState::new(json!({"name": "Ada"}));
        state.register(&path("name"), json!("")).unwrap();
        assert_eq!(state.value(&path("name")), Some(&json!("Ada")));
    }

    #[test]
    fn test_set_value_clears_errors() {
        let mut state = FormState::new(json!({"name": ""}));
        state.set_errors(ValidationErrors::from(vec![
            Issue::new(IssueCode::Required, "Required").under(&path("name")),
        ]));
        assert_eq!(state.error(&path("name")), Some("Required"));

        state.set_value(&path("name"), json!("Ada")).unwrap();
        assert!(state.error(&path("name")).is_none());
        assert!(state.is_touched(&path("name")));
    }

    #[test]
    fn test_unregister_drops_everything() {
        let mut state = FormState::new(json!({"spouse": {"name": "Sam", "age": 30}}));
        state.register(&path("spouse.name"), json!("")).unwrap();
        state.register(&path("spouse.age"), json!("")).unwrap();
        state.set_value(&path("spouse.name"), json!("Kim")).unwrap();
        state.set_errors(ValidationErrors::from(vec![
            Issue::new(IssueCode::TooSmall, "too small").under(&path("spouse.age")),
        ]));

        assert!(state.unregister(&path("spouse")));
        assert!(state.value(&path("spouse")).is_none());
        assert!(!state.is_registered(&path("spouse.name")));
        assert!(!state.is_touched(&path("spouse.name")));
        assert!(state.errors().is_empty());
        assert!(!state.unregister(&path("spouse")));
    }

    #[test]
    fn test_append_item() {
        let mut state = FormState::new(json!({"skills": [{"skillName": "a"}]}));
        let index = state.append_item(&path("skills"), json!({"skillName": ""})).unwrap();
        assert_eq!(index, 1);

        let index = state.append_item(&path("tags"), json!("x")).unwrap();
        assert_eq!(index, 0);
        assert_eq!(state.value(&path("tags")), Some(&json!(["x"])));

        let err = state.append_item(&path("skills.0.skillName"), json!(1)).unwrap_err();
        assert!(matches!(err, FormError::NotAnArray(_)));
    }

    #[test]
    fn test_remove_item_renumbers() {
        let mut state = FormState::new(json!({
            "skills": [{"skillName": "a"}, {"skillName": "b"}, {"skillName": "c"}]
        }));
        for i in 0..3 {
            state.register(&path(&format!("skills.{i}.skillName")), json!("")).unwrap();
        }
        state.set_value(&path("skills.2.skillName"), json!("c2")).unwrap();
        state.set_errors(ValidationErrors::from(vec![
            Issue::new(IssueCode::Required, "first").under(&path("skills.0.skillName")),
            Issue::new(IssueCode::Required, "second").under(&path("skills.1.skillName")),
        ]));

        let removed = state.remove_item(&path("skills"), 0).unwrap();
        assert_eq!(removed, json!({"skillName": "a"}));
        assert_eq!(
            state.values(),
            &json!({"skills": [{"skillName": "b"}, {"skillName": "c2"}]})
        );

        let registered: Vec<String> = state.registered().map(ToString::to_string).collect();
        assert_eq!(registered, vec!["skills.0.skillName", "skills.1.skillName"]);
        assert!(state.is_touched(&path("skills.1.skillName")));
        assert_eq!(state.error(&path("skills.0.skillName")), Some("second"));
        assert_eq!(state.errors().len(), 1);
    }

    #[test]
    fn test_remove_item_out_of_range() {
        let mut state = FormState::new(json!({"skills": []}));
        assert!(state.remove_item(&path("skills"), 0).is_err());
        assert!(matches!(
            state.remove_item(&path("missing"), 0),
            Err(FormError::NotAnArray(_))
        ));
    }
}
