//! Reading form descriptions and value files from disk.
//!
//! Files ending in `.yaml` or `.yml` are read as YAML, everything else as
//! JSON.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use formwork::{FormDescriptor, FormDetail};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

/// Loads a form description.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid JSON or YAML,
/// or describes a malformed form.
pub fn load_form(path: &Path) -> Result<FormDetail> {
    let descriptor: FormDescriptor = read_document(path)?;
    let detail = FormDetail::try_from(descriptor)
        .with_context(|| format!("invalid form description in {}", path.display()))?;
    debug!(
        path = %path.display(),
        title = detail.get_title(),
        fields = detail.fields().len(),
        "loaded form"
    );
    Ok(detail)
}

/// Loads a value tree (a payload or a set of initial values).
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_values(path: &Path) -> Result<Value> {
    read_document(path)
}

fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    if is_yaml(path) {
        serde_yaml::from_str(&text)
            .with_context(|| format!("failed to parse YAML in {}", path.display()))
    } else {
        serde_json::from_str(&text)
            .with_context(|| format!("failed to parse JSON in {}", path.display()))
    }
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_json_form() {
        let file = write_temp(
            ".json",
            r#"{"title": "Contact", "fields": [{"name": "email", "label": "Email", "type": "email"}]}"#,
        );
        let detail = load_form(file.path()).unwrap();
        assert_eq!(detail.get_title(), "Contact");
        assert_eq!(detail.fields().len(), 1);
    }

    #[test]
    fn test_load_yaml_form() {
        let file = write_temp(
            ".yaml",
            "title: Contact\nlayouts:\n  cols: 3\nfields:\n  - name: phone\n    label: Phone\n    type: tel\n    layout:\n      colSpan: 2\n",
        );
        let detail = load_form(file.path()).unwrap();
        assert_eq!(detail.get_cols().get(), 3);
        assert_eq!(detail.fields()[0].get_col_span().get(), 2);
    }

    #[test]
    fn test_load_reports_path() {
        let file = write_temp(".json", "{ not json");
        let err = load_form(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("failed to parse JSON"));

        let err = load_form(Path::new("/definitely/missing.json")).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }

    #[test]
    fn test_load_rejects_unknown_kind() {
        let file = write_temp(
            ".yml",
            "title: T\nfields:\n  - name: x\n    label: X\n    type: hologram\n",
        );
        let err = load_form(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("unknown field type 'hologram'"));
    }

    #[test]
    fn test_is_yaml() {
        assert!(is_yaml(Path::new("form.yaml")));
        assert!(is_yaml(Path::new("form.YML")));
        assert!(!is_yaml(Path::new("form.json")));
        assert!(!is_yaml(Path::new("form")));
    }
}
