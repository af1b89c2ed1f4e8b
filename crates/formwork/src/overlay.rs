//! The conditional validation overlay.
//!
//! The compiler loosens every field that carries a visibility condition.
//! The overlay picks those fields back up: at validation time it evaluates
//! each condition against the whole value tree and validates the field only
//! while its condition (and the condition of every conditional ancestor)
//! holds. Inactive fields are dropped from the output instead.
//!
//! Conditional fields inside array items are covered too: one entry expands
//! to every existing item of the enclosing arrays.

use serde_json::Value;
use tracing::trace;

use crate::compile::{Schema, structural};
use crate::condition::Condition;
use crate::field::Field;
use crate::issues::ValidationErrors;
use crate::path::FieldPath;
use crate::Result;

#[derive(Debug, Clone)]
enum Step {
    Key(String),
    EachItem,
}

#[derive(Debug, Clone)]
struct Entry {
    pattern: Vec<Step>,
    conditions: Vec<Condition>,
    schema: Schema,
}

/// Validation rules for conditional fields, applied on top of the
/// structural schema.
#[derive(Debug, Clone, Default)]
pub struct ConditionalOverlay {
    entries: Vec<Entry>,
}

impl ConditionalOverlay {
    /// Collects every conditional field of a field list, parents first.
    ///
    /// # Errors
    ///
    /// Fails on the same schema errors as [`compile`](crate::compile).
    pub fn collect(fields: &[Field]) -> Result<Self> {
        let mut entries = Vec::new();
        collect_scope(fields, &[], &[], &mut entries)?;
        Ok(Self { entries })
    }

    /// Returns the number of conditional fields.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the form has no conditional fields.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the concrete paths of the conditional fields for a value tree,
    /// with array items expanded.
    pub fn paths(&self, values: &Value) -> Vec<FieldPath> {
        self.entries
            .iter()
            .flat_map(|entry| expand(&entry.pattern, values))
            .collect()
    }

    /// Validates the conditional fields of `values`.
    ///
    /// Active fields are parsed with their own schema and written back into
    /// `output`; their issues are added to `errors` at the field's exact
    /// path. Inactive fields are removed from `output` and never produce
    /// issues.
    pub fn apply(&self, values: &Value, output: &mut Value, errors: &mut ValidationErrors) {
        for entry in &self.entries {
            let active = entry.conditions.iter().all(|c| c.evaluate(values));
            for path in expand(&entry.pattern, values) {
                if !active {
                    if output_has(output, &path) {
                        trace!(path = %path, "dropping inactive conditional value");
                    }
                    path.remove(output);
                    continue;
                }
                match entry.schema.parse(path.lookup(values)) {
                    Ok(Some(parsed)) => {
                        if let Err(err) = path.assign(output, parsed) {
                            trace!(path = %path, error = %err, "conditional output not written");
                        }
                    }
                    Ok(None) => {
                        path.remove(output);
                    }
                    Err(issues) => errors.extend_under(&path, issues),
                }
            }
        }
    }
}

fn output_has(output: &Value, path: &FieldPath) -> bool {
    path.lookup(output).is_some()
}

fn collect_scope(
    fields: &[Field],
    prefix: &[Step],
    inherited: &[Condition],
    entries: &mut Vec<Entry>,
) -> Result<()> {
    for field in fields {
        let mut pattern = prefix.to_vec();
        pattern.push(Step::Key(field.name().to_string()));

        let mut conditions = inherited.to_vec();
        if let Some(condition) = field.get_condition() {
            conditions.push(condition.clone());
            entries.push(Entry {
                pattern: pattern.clone(),
                conditions: conditions.clone(),
                schema: structural(field)?,
            });
        }

        if field.is_array() {
            pattern.push(Step::EachItem);
        }
        if !field.is_leaf() {
            collect_scope(field.children(), &pattern, &conditions, entries)?;
        }
    }
    Ok(())
}

// Concrete paths matching a pattern, expanding each array step over the
// items currently present in `values`.
fn expand(pattern: &[Step], values: &Value) -> Vec<FieldPath> {
    let mut paths = vec![FieldPath::root()];
    for step in pattern {
        paths = match step {
            Step::Key(key) => paths.into_iter().map(|p| p.child(key.as_str())).collect(),
            Step::EachItem => paths
                .into_iter()
                .flat_map(|p| {
                    let count = p.lookup(values).and_then(Value::as_array).map_or(0, Vec::len);
                    (0..count).map(move |i| p.index(i))
                })
                .collect(),
        };
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::compile;
    use crate::rule::Rule;
    use serde_json::json;

    fn path(text: &str) -> FieldPath {
        FieldPath::parse(text).unwrap()
    }

    fn validate(fields: &[Field], values: &Value) -> (Value, ValidationErrors) {
        let compiled = compile(fields).unwrap();
        let overlay = ConditionalOverlay::collect(fields).unwrap();
        let (mut output, mut errors) = match compiled.schema.parse(Some(values)) {
            Ok(output) => (output.unwrap_or_default(), ValidationErrors::new()),
            Err(issues) => (values.clone(), ValidationErrors::from(issues)),
        };
        overlay.apply(values, &mut output, &mut errors);
        (output, errors)
    }

    fn marital_fields() -> Vec<Field> {
        vec![
            Field::select("maritalStatus", "Marital Status"),
            Field::text("spouseName", "Spouse")
                .rule(Rule::string().min(1).message("Spouse's name is required"))
                .condition(Condition::equals("maritalStatus", "married")),
        ]
    }

    #[test]
    fn test_inactive_field_is_skipped_and_dropped() {
        let (output, errors) = validate(
            &marital_fields(),
            &json!({"maritalStatus": "single", "spouseName": "stale"}),
        );
        assert!(errors.is_empty());
        assert_eq!(output, json!({"maritalStatus": "single"}));
    }

    #[test]
    fn test_active_field_is_validated() {
        let (_, errors) = validate(
            &marital_fields(),
            &json!({"maritalStatus": "married", "spouseName": ""}),
        );
        assert_eq!(errors.first(&path("spouseName")), Some("Spouse's name is required"));

        let (output, errors) = validate(
            &marital_fields(),
            &json!({"maritalStatus": "married", "spouseName": "Sam"}),
        );
        assert!(errors.is_empty());
        assert_eq!(output["spouseName"], "Sam");
    }

    #[test]
    fn test_conditional_leaf_inside_array_items() {
        let fields = vec![Field::array(
            "skills",
            "Skills",
            vec![
                Field::text("skillName", "Skill"),
                Field::number("years", "Years")
                    .rule(Rule::number().min(1.0))
                    .when(|values| values["trackYears"] == json!(true)),
            ],
        )];
        let overlay = ConditionalOverlay::collect(&fields).unwrap();
        assert_eq!(overlay.len(), 1);

        let values = json!({
            "trackYears": true,
            "skills": [{"skillName": "a", "years": 3}, {"skillName": "b", "years": 0}],
        });
        assert_eq!(
            overlay.paths(&values),
            vec![path("skills.0.years"), path("skills.1.years")]
        );
        let (_, errors) = validate(&fields, &values);
        assert_eq!(errors.paths(), vec![&path("skills.1.years")]);
    }

    #[test]
    fn test_conditional_group_uses_structural_schema() {
        let fields = vec![
            Field::checkbox("employed", "Employed"),
            Field::group(
                "employer",
                "Employer",
                vec![Field::text("company", "Company").rule(Rule::string().min(2))],
            )
            .condition(Condition::truthy("employed")),
        ];

        let (_, errors) = validate(&fields, &json!({"employed": true, "employer": {"company": "x"}}));
        assert_eq!(errors.paths(), vec![&path("employer.company")]);

        let (output, errors) = validate(&fields, &json!({"employed": false, "employer": {"company": "x"}}));
        assert!(errors.is_empty());
        assert_eq!(output, json!({"employed": false}));
    }

    #[test]
    fn test_nested_conditions_accumulate() {
        let fields = vec![
            Field::checkbox("a", "A"),
            Field::checkbox("b", "B"),
            Field::group(
                "outer",
                "Outer",
                vec![Field::text("inner", "Inner")
                    .rule(Rule::string().min(1))
                    .condition(Condition::truthy("b"))],
            )
            .condition(Condition::truthy("a")),
        ];
        let values = json!({"a": false, "b": true, "outer": {"inner": ""}});
        let (output, errors) = validate(&fields, &values);
        assert!(errors.is_empty());
        assert!(output.get("outer").is_none());

        let values = json!({"a": true, "b": true, "outer": {"inner": ""}});
        let (_, errors) = validate(&fields, &values);
        assert_eq!(errors.paths(), vec![&path("outer.inner")]);
    }
}
