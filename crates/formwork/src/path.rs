//! Field paths.
//!
//! A [`FieldPath`] locates a value inside the form's value tree as an ordered
//! list of segments: object keys and array indices. Paths are kept as
//! segments rather than dotted strings so that a field name containing a dot
//! can never be confused with nesting. The dotted form is only used for
//! display and for parsing paths typed by a human.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::{FormError, Result};

/// One step of a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathSegment {
    /// An object key (a field name).
    Key(String),
    /// A position inside an array.
    Index(usize),
}

impl PathSegment {
    /// Returns the key if this is a key segment.
    pub fn as_key(&self) -> Option<&str> {
        match self {
            Self::Key(key) => Some(key),
            Self::Index(_) => None,
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(key),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        Self::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// The ordered chain of names and indices locating a field from the form root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldPath {
    segments: Vec<PathSegment>,
}

impl FieldPath {
    /// The empty path, addressing the whole value tree.
    pub fn root() -> Self {
        Self::default()
    }

    /// Creates a path from segments.
    pub fn from_segments(segments: impl IntoIterator<Item = PathSegment>) -> Self {
        Self {
            segments: segments.into_iter().collect(),
        }
    }

    /// Parses a dotted path such as `skills.0.skillName`.
    ///
    /// All-digit segments become array indices.
    pub fn parse(text: &str) -> Result<Self> {
        if text.is_empty() {
            return Ok(Self::root());
        }
        let mut segments = Vec::new();
        for part in text.split('.') {
            if part.is_empty() {
                return Err(FormError::invalid_path(text, "empty segment"));
            }
            if part.bytes().all(|b| b.is_ascii_digit()) {
                let index = part
                    .parse::<usize>()
                    .map_err(|_| FormError::invalid_path(text, "index out of range"))?;
                segments.push(PathSegment::Index(index));
            } else {
                segments.push(PathSegment::Key(part.to_string()));
            }
        }
        Ok(Self { segments })
    }

    /// Returns a new path with a key appended.
    pub fn child(&self, key: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.segments.push(PathSegment::Key(key.into()));
        next
    }

    /// Returns a new path with an array index appended.
    pub fn index(&self, index: usize) -> Self {
        let mut next = self.clone();
        next.segments.push(PathSegment::Index(index));
        next
    }

    /// Returns the concatenation of this path and `other`.
    pub fn join(&self, other: &FieldPath) -> Self {
        let mut next = self.clone();
        next.segments.extend(other.segments.iter().cloned());
        next
    }

    /// Returns the segments of this path.
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Returns the number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns true for the root path.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the path without its last segment.
    pub fn parent(&self) -> Option<Self> {
        if self.segments.is_empty() {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// Returns true if `prefix` is a (non-strict) prefix of this path.
    pub fn starts_with(&self, prefix: &FieldPath) -> bool {
        self.segments.starts_with(&prefix.segments)
    }

    /// Returns the remainder of this path after `prefix`.
    pub fn strip_prefix(&self, prefix: &FieldPath) -> Option<Self> {
        self.segments.strip_prefix(prefix.segments.as_slice()).map(|rest| Self {
            segments: rest.to_vec(),
        })
    }

    /// Finds the value at this path.
    pub fn lookup<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        let mut current = root;
        for segment in &self.segments {
            current = match (segment, current) {
                (PathSegment::Key(key), Value::Object(map)) => map.get(key)?,
                (PathSegment::Index(index), Value::Array(items)) => items.get(*index)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Finds the value at this path for mutation.
    pub fn lookup_mut<'a>(&self, root: &'a mut Value) -> Option<&'a mut Value> {
        let mut current = root;
        for segment in &self.segments {
            current = match (segment, current) {
                (PathSegment::Key(key), Value::Object(map)) => map.get_mut(key)?,
                (PathSegment::Index(index), Value::Array(items)) => items.get_mut(*index)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Writes `value` at this path.
    ///
    /// Missing intermediate objects are created (a null on the way counts as
    /// missing). Array elements are never created: an index must already
    /// exist. Descending through a scalar is an error.
    pub fn assign(&self, root: &mut Value, value: Value) -> Result<()> {
        let Some((last, init)) = self.segments.split_last() else {
            *root = value;
            return Ok(());
        };

        let mut current = root;
        for segment in init {
            if current.is_null() {
                *current = Value::Object(Map::new());
            }
            current = match (segment, current) {
                (PathSegment::Key(key), Value::Object(map)) => map
                    .entry(key.clone())
                    .or_insert_with(|| Value::Object(Map::new())),
                (PathSegment::Index(index), Value::Array(items)) => {
                    let len = items.len();
                    items.get_mut(*index).ok_or_else(|| {
                        FormError::invalid_path(
                            self.to_string(),
                            format!("index {index} past end of array of {len}"),
                        )
                    })?
                }
                _ => {
                    return Err(FormError::invalid_path(
                        self.to_string(),
                        format!("cannot descend into '{segment}'"),
                    ));
                }
            };
        }

        if current.is_null() {
            *current = Value::Object(Map::new());
        }
        match (last, current) {
            (PathSegment::Key(key), Value::Object(map)) => {
                map.insert(key.clone(), value);
                Ok(())
            }
            (PathSegment::Index(index), Value::Array(items)) => match items.get_mut(*index) {
                Some(slot) => {
                    *slot = value;
                    Ok(())
                }
                None => Err(FormError::invalid_path(
                    self.to_string(),
                    format!("index {index} past end of array of {}", items.len()),
                )),
            },
            _ => Err(FormError::invalid_path(
                self.to_string(),
                format!("cannot write '{last}' into a scalar"),
            )),
        }
    }

    /// Removes and returns the value at this path.
    ///
    /// Removing an array index deletes the element; later elements shift down.
    pub fn remove(&self, root: &mut Value) -> Option<Value> {
        let (last, init) = self.segments.split_last()?;
        let parent = Self::from_segments(init.iter().cloned()).lookup_mut(root)?;
        match (last, parent) {
            (PathSegment::Key(key), Value::Object(map)) => map.remove(key),
            (PathSegment::Index(index), Value::Array(items)) if *index < items.len() => {
                Some(items.remove(*index))
            }
            _ => None,
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl FromStr for FieldPath {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl<S: Into<PathSegment>> FromIterator<S> for FieldPath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::from_segments(iter.into_iter().map(Into::into))
    }
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FieldPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_and_display() {
        let path = FieldPath::parse("skills.0.skillName").unwrap();
        assert_eq!(
            path.segments(),
            &[
                PathSegment::Key("skills".into()),
                PathSegment::Index(0),
                PathSegment::Key("skillName".into()),
            ]
        );
        assert_eq!(path.to_string(), "skills.0.skillName");
        assert!(FieldPath::parse("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_empty_segment() {
        let err = FieldPath::parse("address..line").unwrap_err();
        assert!(matches!(err, FormError::InvalidPath { .. }));
        assert!(FieldPath::parse(".a").is_err());
        assert!(FieldPath::parse("a.").is_err());
    }

    #[test]
    fn test_key_with_dot_stays_one_segment() {
        let path = FieldPath::root().child("a.b");
        assert_eq!(path.len(), 1);
        let value = json!({"a.b": 1, "a": {"b": 2}});
        assert_eq!(path.lookup(&value), Some(&json!(1)));
    }

    #[test]
    fn test_lookup() {
        let value = json!({"address": {"state": "KA"}, "skills": [{"skillName": "rust"}]});
        let state = FieldPath::parse("address.state").unwrap();
        assert_eq!(state.lookup(&value), Some(&json!("KA")));
        let skill = FieldPath::parse("skills.0.skillName").unwrap();
        assert_eq!(skill.lookup(&value), Some(&json!("rust")));
        let missing = FieldPath::parse("skills.3.skillName").unwrap();
        assert_eq!(missing.lookup(&value), None);
    }

    #[test]
    fn test_assign_creates_intermediate_objects() {
        let mut value = json!({});
        FieldPath::parse("address.state")
            .unwrap()
            .assign(&mut value, json!("KA"))
            .unwrap();
        assert_eq!(value, json!({"address": {"state": "KA"}}));
    }

    #[test]
    fn test_assign_refuses_past_end_of_array() {
        let mut value = json!({"skills": []});
        let err = FieldPath::parse("skills.0.skillName")
            .unwrap()
            .assign(&mut value, json!("rust"))
            .unwrap_err();
        assert!(matches!(err, FormError::InvalidPath { .. }));
    }

    #[test]
    fn test_assign_refuses_scalar_descent() {
        let mut value = json!({"name": "x"});
        let result = FieldPath::parse("name.first")
            .unwrap()
            .assign(&mut value, json!("y"));
        assert!(result.is_err());
        assert_eq!(value, json!({"name": "x"}));
    }

    #[test]
    fn test_remove_index_shifts_elements() {
        let mut value = json!({"skills": [{"n": "a"}, {"n": "b"}]});
        let removed = FieldPath::parse("skills.0").unwrap().remove(&mut value);
        assert_eq!(removed, Some(json!({"n": "a"})));
        assert_eq!(value, json!({"skills": [{"n": "b"}]}));
    }

    #[test]
    fn test_strip_prefix() {
        let path = FieldPath::parse("skills.1.level").unwrap();
        let prefix = FieldPath::parse("skills").unwrap();
        assert!(path.starts_with(&prefix));
        assert_eq!(
            path.strip_prefix(&prefix).unwrap().to_string(),
            "1.level"
        );
        assert_eq!(path.parent().unwrap().to_string(), "skills.1");
    }
}
