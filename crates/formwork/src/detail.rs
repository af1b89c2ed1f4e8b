//! The form description.

use std::sync::Arc;

use crate::field::Field;
use crate::layout::Columns;
use crate::path::{FieldPath, PathSegment};
use crate::{FormError, Result};

/// A whole form: title, description, top-level column count and the field
/// list.
///
/// The field list is shared. Cloning a detail is cheap, and two details
/// carry the same field list only when one was cloned from the other
/// without touching its fields (see [`FormDetail::same_fields`]). Every
/// edit returns a new detail.
#[derive(Debug, Clone)]
pub struct FormDetail {
    title: String,
    description: Option<String>,
    cols: Columns,
    fields: Arc<[Field]>,
}

impl FormDetail {
    /// Creates a two-column form.
    pub fn new(title: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            title: title.into(),
            description: None,
            cols: Columns::new(2),
            fields: fields.into(),
        }
    }

    /// Sets the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the top-level column count.
    pub fn cols(mut self, count: i64) -> Self {
        self.cols = Columns::new(count);
        self
    }

    /// Sets the title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Returns the title.
    pub fn get_title(&self) -> &str {
        &self.title
    }

    /// Returns the description.
    pub fn get_description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the top-level column count.
    pub fn get_cols(&self) -> Columns {
        self.cols
    }

    /// Returns the top-level fields.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Returns true if both details carry the very same field list.
    pub fn same_fields(&self, other: &FormDetail) -> bool {
        Arc::ptr_eq(&self.fields, &other.fields)
    }

    /// Returns a copy with the field list replaced.
    pub fn with_fields(&self, fields: Vec<Field>) -> Self {
        Self {
            fields: fields.into(),
            ..self.clone()
        }
    }

    /// Returns a copy with `field` appended at the top level.
    pub fn push_field(&self, field: Field) -> Self {
        let mut fields = self.fields.to_vec();
        fields.push(field);
        self.with_fields(fields)
    }

    /// Returns a copy with the field at `path` rewritten by `edit`.
    ///
    /// Index segments (array item positions) are skipped, so
    /// `skills.0.level` and `skills.level` address the same schema field.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::UnknownField`] if no field lives at `path`.
    pub fn update_field(&self, path: &FieldPath, edit: impl FnOnce(Field) -> Field) -> Result<Self> {
        let names = schema_names(path);
        let mut fields = self.fields.to_vec();
        let mut edit = Some(edit);
        if !rewrite(&mut fields, &names, &mut |field| {
            edit.take().map_or(Some(field.clone()), |edit| Some(edit(field.clone())))
        }) {
            return Err(FormError::UnknownField(path.to_string()));
        }
        Ok(self.with_fields(fields))
    }

    /// Returns a copy without the field at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::UnknownField`] if no field lives at `path`.
    pub fn remove_field(&self, path: &FieldPath) -> Result<Self> {
        let names = schema_names(path);
        let mut fields = self.fields.to_vec();
        if !rewrite(&mut fields, &names, &mut |_| None) {
            return Err(FormError::UnknownField(path.to_string()));
        }
        Ok(self.with_fields(fields))
    }

    /// Finds the field at `path`, skipping index segments.
    pub fn field_at(&self, path: &FieldPath) -> Option<&Field> {
        find_field(&self.fields, path)
    }
}

/// Finds the field at `path` in `fields`, skipping index segments.
pub(crate) fn find_field<'a>(fields: &'a [Field], path: &FieldPath) -> Option<&'a Field> {
    let names = schema_names(path);
    let (last, parents) = names.split_last()?;
    let mut scope = fields;
    for name in parents {
        scope = scope.iter().find(|f| f.name() == *name)?.children();
    }
    scope.iter().find(|f| f.name() == *last)
}

fn schema_names(path: &FieldPath) -> Vec<&str> {
    path.segments().iter().filter_map(PathSegment::as_key).collect()
}

// Applies `edit` to the field named by `names`; `None` removes it.
fn rewrite(
    fields: &mut Vec<Field>,
    names: &[&str],
    edit: &mut dyn FnMut(&Field) -> Option<Field>,
) -> bool {
    let Some((first, rest)) = names.split_first() else {
        return false;
    };
    let Some(position) = fields.iter().position(|f| f.name() == *first) else {
        return false;
    };

    if rest.is_empty() {
        match edit(&fields[position]) {
            Some(next) => fields[position] = next,
            None => {
                fields.remove(position);
            }
        }
        return true;
    }

    let parent = &fields[position];
    if parent.is_leaf() {
        return false;
    }
    let mut children = parent.children().to_vec();
    if !rewrite(&mut children, rest, edit) {
        return false;
    }
    fields[position] = parent.clone().fields(children);
    true
}
