//! Input scripts for `formwork replay`.
//!
//! One step per line:
//!
//! ```text
//! # comments and blank lines are skipped
//! set firstName Ada
//! set maritalStatus "married"
//! set newsletter true
//! set interests ["rust", "forms"]
//! clear nickname
//! add skills
//! set skills.1.skillName Go
//! remove skills 0
//! ```
//!
//! The value of `set` is read as JSON when it parses as JSON and as plain
//! text otherwise.

use anyhow::{Context, Result, anyhow, bail};
use formwork::{FieldInput, FieldPath, FileMeta, FormEngine};
use serde_json::Value;
use tracing::info;

/// One scripted interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Write an input to a leaf.
    Set {
        /// Target leaf.
        path: FieldPath,
        /// What the user typed or picked.
        input: FieldInput,
    },
    /// Append an item to an array.
    Add {
        /// Target array.
        path: FieldPath,
    },
    /// Remove an item from an array.
    Remove {
        /// Target array.
        path: FieldPath,
        /// Position of the item.
        index: usize,
    },
}

/// Parses a whole script.
///
/// # Errors
///
/// Returns an error naming the first malformed line.
pub fn parse_script(text: &str) -> Result<Vec<Step>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(number, line)| {
            parse_step(line.trim()).with_context(|| format!("line {}: {line}", number + 1))
        })
        .collect()
}

fn parse_step(line: &str) -> Result<Step> {
    let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();
    let (target, argument) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
    let argument = argument.trim();
    if target.is_empty() {
        bail!("missing field path");
    }
    let path = FieldPath::parse(target)?;

    match verb {
        "set" => Ok(Step::Set {
            path,
            input: input_from(argument)?,
        }),
        "clear" => Ok(Step::Set {
            path,
            input: FieldInput::Clear,
        }),
        "add" => Ok(Step::Add { path }),
        "remove" => {
            let index = argument
                .parse()
                .map_err(|_| anyhow!("expected an item index, found '{argument}'"))?;
            Ok(Step::Remove { path, index })
        }
        other => bail!("unknown step '{other}'"),
    }
}

fn input_from(raw: &str) -> Result<FieldInput> {
    let Ok(value) = serde_json::from_str::<Value>(raw) else {
        return Ok(FieldInput::text(raw));
    };
    Ok(match value {
        Value::Null => FieldInput::Clear,
        Value::Bool(checked) => FieldInput::toggle(checked),
        Value::Number(n) => FieldInput::text(n.to_string()),
        Value::String(text) => FieldInput::Text(text),
        Value::Array(items) if items.iter().all(Value::is_object) && !items.is_empty() => {
            let files: Vec<FileMeta> = serde_json::from_value(Value::Array(items))
                .context("expected a list of files with name, size and type")?;
            FieldInput::Files(files)
        }
        Value::Array(items) => FieldInput::choices(items.iter().map(|item| match item {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        })),
        Value::Object(_) => bail!("objects are not a field input"),
    })
}

/// Applies every step to `engine`, stopping at the first failure.
///
/// # Errors
///
/// Returns an error naming the step that the engine refused.
pub fn apply(engine: &mut FormEngine, steps: &[Step]) -> Result<()> {
    for (number, step) in steps.iter().enumerate() {
        let outcome = match step {
            Step::Set { path, input } => engine.input(path, input.clone()),
            Step::Add { path } => engine.append(path).map(drop),
            Step::Remove { path, index } => engine.remove(path, *index).map(drop),
        };
        outcome.with_context(|| format!("step {} failed", number + 1))?;
        info!(step = number + 1, ?step, "applied step");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(text: &str) -> FieldPath {
        FieldPath::parse(text).unwrap()
    }

    #[test]
    fn test_parse_steps() {
        let steps = parse_script(
            "# a comment\n\nset firstName Ada Lovelace\nset age 36\nadd skills\nremove skills 0\nclear nickname\n",
        )
        .unwrap();

        assert_eq!(
            steps,
            vec![
                Step::Set {
                    path: path("firstName"),
                    input: FieldInput::text("Ada Lovelace"),
                },
                Step::Set {
                    path: path("age"),
                    input: FieldInput::text("36"),
                },
                Step::Add {
                    path: path("skills")
                },
                Step::Remove {
                    path: path("skills"),
                    index: 0
                },
                Step::Set {
                    path: path("nickname"),
                    input: FieldInput::Clear,
                },
            ]
        );
    }

    #[test]
    fn test_json_inputs() {
        assert_eq!(input_from("true").unwrap(), FieldInput::toggle(true));
        assert_eq!(input_from("\"married\"").unwrap(), FieldInput::text("married"));
        assert_eq!(input_from("null").unwrap(), FieldInput::Clear);
        assert_eq!(input_from("").unwrap(), FieldInput::text(""));
        assert_eq!(
            input_from(r#"["rust", "go"]"#).unwrap(),
            FieldInput::choices(["rust", "go"])
        );
        assert_eq!(
            input_from(r#"[{"name": "cv.pdf", "size": 1024, "type": "application/pdf"}]"#).unwrap(),
            FieldInput::Files(vec![FileMeta::new("cv.pdf", 1024, "application/pdf")])
        );
        assert!(input_from(r#"{"a": 1}"#).is_err());
    }

    #[test]
    fn test_malformed_lines_name_their_number() {
        let err = parse_script("set a 1\njump b\n").unwrap_err();
        assert!(format!("{err:#}").contains("line 2: jump b"));

        let err = parse_script("remove skills first").unwrap_err();
        assert!(format!("{err:#}").contains("expected an item index"));

        assert!(parse_script("add").is_err());
    }
}
