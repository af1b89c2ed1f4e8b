//! Leaf validation rules.
//!
//! A [`Rule`] checks the value of one leaf field and produces its output
//! value (coerced where the rule asks for it). Values arrive as
//! `Option<&Value>`: `None` is a field that holds nothing at all, which is
//! different from an explicit `null`.
//!
//! Rules are plain data so they can be shipped inside a form description;
//! [`Rule::custom`] adds a closure check for forms built in code.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::issues::{Issue, IssueCode};
use crate::path::FieldPath;

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
        .expect("email pattern compiles")
});

static URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://[^\s/?#]+[^\s]*$").expect("url pattern compiles")
});

/// The result of running a rule: the output value (`None` stays undefined)
/// or the issues found.
pub type RuleOutcome = Result<Option<Value>, Vec<Issue>>;

// -----------------------------------------------------------------------------
// Rule
// -----------------------------------------------------------------------------

/// A validation rule for a leaf field.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Rule {
    /// Accepts anything, including nothing.
    Any,
    /// Text with optional length, format and pattern checks.
    String(StringRule),
    /// A number, optionally coerced from text.
    Number(NumberRule),
    /// A boolean.
    Boolean(BooleanRule),
    /// A calendar date, or date and time, written as text.
    Date(DateRule),
    /// One of a fixed set of strings.
    Enum(EnumRule),
    /// A list of values, each checked by an item rule.
    List(ListRule),
    /// A list of uploaded file descriptions.
    Files(FileRule),
    /// Accepts nothing at all; otherwise defers to `inner`.
    Optional {
        /// The rule applied when a value is present.
        inner: Box<Rule>,
    },
    /// Accepts `null`; otherwise defers to `inner`.
    Nullable {
        /// The rule applied to non-null values.
        inner: Box<Rule>,
    },
    /// A closure check. Not available in form descriptions.
    #[serde(skip)]
    Custom(CustomRule),
}

impl Rule {
    /// A rule that accepts anything.
    pub fn any() -> Self {
        Self::Any
    }

    /// Starts a text rule.
    pub fn string() -> StringRule {
        StringRule::default()
    }

    /// Starts a number rule.
    pub fn number() -> NumberRule {
        NumberRule::default()
    }

    /// Starts a boolean rule.
    pub fn boolean() -> BooleanRule {
        BooleanRule::default()
    }

    /// Starts a date rule.
    pub fn date() -> DateRule {
        DateRule::default()
    }

    /// Starts a rule accepting one of `values`.
    pub fn one_of<S: Into<String>>(values: impl IntoIterator<Item = S>) -> EnumRule {
        EnumRule {
            values: values.into_iter().map(Into::into).collect(),
            message: None,
        }
    }

    /// Starts a list rule checking every item with `item`.
    pub fn list(item: impl Into<Rule>) -> ListRule {
        ListRule {
            item: Some(Box::new(item.into())),
            ..ListRule::default()
        }
    }

    /// Starts a file list rule.
    pub fn files() -> FileRule {
        FileRule::default()
    }

    /// A rule backed by a closure. `Err` carries the message to show.
    pub fn custom<F>(check: F) -> Self
    where
        F: Fn(Option<&Value>) -> Result<(), String> + Send + Sync + 'static,
    {
        Self::Custom(CustomRule(Arc::new(check)))
    }

    /// Wraps this rule so that a missing value passes.
    pub fn optional(self) -> Self {
        Self::Optional {
            inner: Box::new(self),
        }
    }

    /// Wraps this rule so that `null` passes.
    pub fn nullable(self) -> Self {
        Self::Nullable {
            inner: Box::new(self),
        }
    }

    /// Checks `value` and returns its output value or the issues found.
    pub fn parse(&self, value: Option<&Value>) -> RuleOutcome {
        match self {
            Self::Any => Ok(value.cloned()),
            Self::String(rule) => rule.parse(value),
            Self::Number(rule) => rule.parse(value),
            Self::Boolean(rule) => rule.parse(value),
            Self::Date(rule) => rule.parse(value),
            Self::Enum(rule) => rule.parse(value),
            Self::List(rule) => rule.parse(value),
            Self::Files(rule) => rule.parse(value),
            Self::Optional { inner } => match value {
                None => Ok(None),
                Some(_) => inner.parse(value),
            },
            Self::Nullable { inner } => match value {
                Some(Value::Null) => Ok(Some(Value::Null)),
                _ => inner.parse(value),
            },
            Self::Custom(rule) => match (rule.0)(value) {
                Ok(()) => Ok(value.cloned()),
                Err(message) => Err(vec![Issue::new(IssueCode::Custom, message)]),
            },
        }
    }

    /// Returns true if the value passes.
    pub fn accepts(&self, value: Option<&Value>) -> bool {
        self.parse(value).is_ok()
    }
}

/// A closure check wrapped for use in a [`Rule`].
#[derive(Clone)]
pub struct CustomRule(Arc<dyn Fn(Option<&Value>) -> Result<(), String> + Send + Sync>);

impl fmt::Debug for CustomRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomRule(..)")
    }
}

macro_rules! rule_variant {
    ($($ty:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Rule {
                fn from(rule: $ty) -> Self {
                    Self::$variant(rule)
                }
            }

            impl $ty {
                /// Wraps this rule so that a missing value passes.
                pub fn optional(self) -> Rule {
                    Rule::from(self).optional()
                }

                /// Wraps this rule so that `null` passes.
                pub fn nullable(self) -> Rule {
                    Rule::from(self).nullable()
                }

                /// Sets the message reported by every check of this rule.
                pub fn message(mut self, message: impl Into<String>) -> Self {
                    self.message = Some(message.into());
                    self
                }

                fn say(&self, default: impl FnOnce() -> String) -> String {
                    self.message.clone().unwrap_or_else(default)
                }
            }
        )*
    };
}

rule_variant! {
    StringRule => String,
    NumberRule => Number,
    BooleanRule => Boolean,
    DateRule => Date,
    EnumRule => Enum,
    ListRule => List,
    FileRule => Files,
}

fn type_name(value: Option<&Value>) -> &'static str {
    match value {
        None => "undefined",
        Some(Value::Null) => "null",
        Some(Value::Bool(_)) => "boolean",
        Some(Value::Number(_)) => "number",
        Some(Value::String(_)) => "string",
        Some(Value::Array(_)) => "array",
        Some(Value::Object(_)) => "object",
    }
}

pub(crate) fn expected(expected: &str, value: Option<&Value>) -> String {
    format!("expected {expected}, received {}", type_name(value))
}

pub(crate) fn required_or_type(value: Option<&Value>, message: String) -> Vec<Issue> {
    let code = if value.is_none() {
        IssueCode::Required
    } else {
        IssueCode::InvalidType
    };
    vec![Issue::new(code, message)]
}

fn finish(issues: Vec<Issue>, output: Value) -> RuleOutcome {
    if issues.is_empty() {
        Ok(Some(output))
    } else {
        Err(issues)
    }
}

// -----------------------------------------------------------------------------
// String
// -----------------------------------------------------------------------------

/// Well-known text formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StringFormat {
    /// An email address.
    Email,
    /// An absolute URL with a scheme.
    Url,
}

/// A compiled regular expression usable in rule descriptions.
#[derive(Debug, Clone)]
pub struct Pattern(Regex);

impl Pattern {
    /// Returns the compiled expression.
    pub fn regex(&self) -> &Regex {
        &self.0
    }
}

impl From<Regex> for Pattern {
    fn from(regex: Regex) -> Self {
        Self(regex)
    }
}

impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let source = String::deserialize(deserializer)?;
        Regex::new(&source)
            .map(Self)
            .map_err(serde::de::Error::custom)
    }
}

/// Text checks.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StringRule {
    /// Minimum length in characters.
    pub min: Option<usize>,
    /// Maximum length in characters.
    pub max: Option<usize>,
    /// Required format.
    pub format: Option<StringFormat>,
    /// Required pattern.
    pub pattern: Option<Pattern>,
    /// Message overriding every default message.
    pub message: Option<String>,
}

impl StringRule {
    /// Requires at least `min` characters.
    pub fn min(mut self, min: usize) -> Self {
        self.min = Some(min);
        self
    }

    /// Allows at most `max` characters.
    pub fn max(mut self, max: usize) -> Self {
        self.max = Some(max);
        self
    }

    /// Requires an email address.
    pub fn email(mut self) -> Self {
        self.format = Some(StringFormat::Email);
        self
    }

    /// Requires an absolute URL.
    pub fn url(mut self) -> Self {
        self.format = Some(StringFormat::Url);
        self
    }

    /// Requires a match of `regex`.
    pub fn pattern(mut self, regex: Regex) -> Self {
        self.pattern = Some(Pattern(regex));
        self
    }

    fn parse(&self, value: Option<&Value>) -> RuleOutcome {
        let Some(Value::String(text)) = value else {
            return Err(required_or_type(
                value,
                self.say(|| expected("string", value)),
            ));
        };

        let mut issues = Vec::new();
        let len = text.chars().count();
        if let Some(min) = self.min {
            if len < min {
                issues.push(Issue::new(
                    IssueCode::TooSmall,
                    self.say(|| format!("must contain at least {min} character(s)")),
                ));
            }
        }
        if let Some(max) = self.max {
            if len > max {
                issues.push(Issue::new(
                    IssueCode::TooBig,
                    self.say(|| format!("must contain at most {max} character(s)")),
                ));
            }
        }
        match self.format {
            Some(StringFormat::Email) if !EMAIL.is_match(text) => issues.push(Issue::new(
                IssueCode::InvalidFormat,
                self.say(|| "invalid email address".to_string()),
            )),
            Some(StringFormat::Url) if !URL.is_match(text) => issues.push(Issue::new(
                IssueCode::InvalidFormat,
                self.say(|| "invalid url".to_string()),
            )),
            _ => {}
        }
        if let Some(pattern) = &self.pattern {
            if !pattern.0.is_match(text) {
                issues.push(Issue::new(
                    IssueCode::InvalidFormat,
                    self.say(|| format!("must match {}", pattern.0.as_str())),
                ));
            }
        }

        finish(issues, Value::String(text.clone()))
    }
}

// -----------------------------------------------------------------------------
// Number
// -----------------------------------------------------------------------------

/// Number checks.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NumberRule {
    /// Accept numeric text and convert it.
    pub coerce: bool,
    /// Require a whole number.
    pub int: bool,
    /// Inclusive lower bound.
    pub min: Option<f64>,
    /// Inclusive upper bound.
    pub max: Option<f64>,
    /// Message overriding every default message.
    pub message: Option<String>,
}

impl NumberRule {
    /// Accepts numeric text and converts it.
    pub fn coerce(mut self) -> Self {
        self.coerce = true;
        self
    }

    /// Requires a whole number.
    pub fn int(mut self) -> Self {
        self.int = true;
        self
    }

    /// Sets the inclusive lower bound.
    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    /// Sets the inclusive upper bound.
    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    fn parse(&self, value: Option<&Value>) -> RuleOutcome {
        let number = match value {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(text)) if self.coerce => {
                text.trim().parse::<f64>().ok().filter(|f| f.is_finite())
            }
            _ => None,
        };
        let Some(number) = number else {
            return Err(required_or_type(
                value,
                self.say(|| expected("number", value)),
            ));
        };

        let mut issues = Vec::new();
        if self.int && number.fract() != 0.0 {
            issues.push(Issue::new(
                IssueCode::InvalidType,
                self.say(|| "expected integer, received float".to_string()),
            ));
        }
        if let Some(min) = self.min {
            if number < min {
                issues.push(Issue::new(
                    IssueCode::TooSmall,
                    self.say(|| format!("must be at least {min}")),
                ));
            }
        }
        if let Some(max) = self.max {
            if number > max {
                issues.push(Issue::new(
                    IssueCode::TooBig,
                    self.say(|| format!("must be at most {max}")),
                ));
            }
        }

        finish(issues, number_value(number))
    }
}

/// Converts a float into a JSON number, preferring an integer representation.
pub(crate) fn number_value(number: f64) -> Value {
    const EXACT: f64 = 9_007_199_254_740_992.0;
    if number.fract() == 0.0 && number.abs() < EXACT {
        Value::from(number as i64)
    } else {
        serde_json::Number::from_f64(number).map_or(Value::Null, Value::Number)
    }
}

// -----------------------------------------------------------------------------
// Boolean
// -----------------------------------------------------------------------------

/// Boolean checks.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BooleanRule {
    /// Require `true` (terms acceptance and the like).
    pub accepted: bool,
    /// Message overriding every default message.
    pub message: Option<String>,
}

impl BooleanRule {
    /// Requires the value to be `true`.
    pub fn accepted(mut self) -> Self {
        self.accepted = true;
        self
    }

    fn parse(&self, value: Option<&Value>) -> RuleOutcome {
        match value {
            Some(Value::Bool(false)) if self.accepted => Err(vec![Issue::new(
                IssueCode::InvalidOption,
                self.say(|| "must be accepted".to_string()),
            )]),
            Some(Value::Bool(b)) => Ok(Some(Value::Bool(*b))),
            _ => Err(required_or_type(
                value,
                self.say(|| expected("boolean", value)),
            )),
        }
    }
}

// -----------------------------------------------------------------------------
// Date
// -----------------------------------------------------------------------------

/// Parses a date or date-time written as `yyyy-MM-dd`, `yyyy-MM-ddTHH:MM`,
/// `yyyy-MM-ddTHH:MM:SS` or RFC 3339.
pub(crate) fn parse_date_time(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    for format in ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(at) = NaiveDateTime::parse_from_str(text, format) {
            return Some(at);
        }
    }
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|at| at.naive_local())
}

/// Whole years elapsed from `born` to `today`.
pub(crate) fn age_on(born: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - born.year();
    if (today.month(), today.day()) < (born.month(), born.day()) {
        age -= 1;
    }
    age
}

/// Date checks.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DateRule {
    /// Require a date strictly before today.
    pub past: bool,
    /// Minimum age in whole years as of today.
    pub min_age: Option<u32>,
    /// Maximum age in whole years as of today.
    pub max_age: Option<u32>,
    /// Message overriding every default message.
    pub message: Option<String>,
}

impl DateRule {
    /// Requires a date strictly before today.
    pub fn past(mut self) -> Self {
        self.past = true;
        self
    }

    /// Requires an age between `min` and `max` whole years, inclusive.
    pub fn age_between(mut self, min: u32, max: u32) -> Self {
        self.min_age = Some(min);
        self.max_age = Some(max);
        self
    }

    fn parse(&self, value: Option<&Value>) -> RuleOutcome {
        self.parse_on(value, Local::now().date_naive())
    }

    fn parse_on(&self, value: Option<&Value>, today: NaiveDate) -> RuleOutcome {
        let parsed = match value {
            Some(Value::String(text)) => parse_date_time(text),
            _ => None,
        };
        let Some(at) = parsed else {
            return Err(required_or_type(value, self.say(|| expected("date", value))));
        };
        let date = at.date();

        let mut issues = Vec::new();
        if self.past && date >= today {
            issues.push(Issue::new(
                IssueCode::TooBig,
                self.say(|| "must be in the past".to_string()),
            ));
        }
        let age = age_on(date, today);
        if let Some(min) = self.min_age {
            if age < min as i32 {
                issues.push(Issue::new(
                    IssueCode::TooSmall,
                    self.say(|| format!("age must be at least {min} years")),
                ));
            }
        }
        if let Some(max) = self.max_age {
            if age > max as i32 {
                issues.push(Issue::new(
                    IssueCode::TooBig,
                    self.say(|| format!("age must be at most {max} years")),
                ));
            }
        }

        finish(issues, value.cloned().unwrap_or(Value::Null))
    }
}

// -----------------------------------------------------------------------------
// Enum
// -----------------------------------------------------------------------------

/// One-of checks.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EnumRule {
    /// Allowed values.
    pub values: Vec<String>,
    /// Message overriding every default message.
    pub message: Option<String>,
}

impl EnumRule {
    fn parse(&self, value: Option<&Value>) -> RuleOutcome {
        match value {
            Some(Value::String(text)) if self.values.contains(text) => {
                Ok(Some(Value::String(text.clone())))
            }
            Some(Value::String(_)) => Err(vec![Issue::new(
                IssueCode::InvalidOption,
                self.say(|| {
                    let options: Vec<String> =
                        self.values.iter().map(|v| format!("\"{v}\"")).collect();
                    format!("expected one of {}", options.join(" | "))
                }),
            )]),
            _ => Err(required_or_type(
                value,
                self.say(|| expected("string", value)),
            )),
        }
    }
}

// -----------------------------------------------------------------------------
// List
// -----------------------------------------------------------------------------

/// List checks.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListRule {
    /// Rule applied to every item; items pass unchecked without one.
    pub item: Option<Box<Rule>>,
    /// Minimum number of items.
    pub min: Option<usize>,
    /// Maximum number of items.
    pub max: Option<usize>,
    /// Message overriding every default message.
    pub message: Option<String>,
}

impl ListRule {
    /// Requires at least `min` items.
    pub fn min(mut self, min: usize) -> Self {
        self.min = Some(min);
        self
    }

    /// Allows at most `max` items.
    pub fn max(mut self, max: usize) -> Self {
        self.max = Some(max);
        self
    }

    fn parse(&self, value: Option<&Value>) -> RuleOutcome {
        let Some(Value::Array(items)) = value else {
            return Err(required_or_type(value, self.say(|| expected("array", value))));
        };

        let mut issues = Vec::new();
        if let Some(min) = self.min {
            if items.len() < min {
                issues.push(Issue::new(
                    IssueCode::TooSmall,
                    self.say(|| format!("must contain at least {min} item(s)")),
                ));
            }
        }
        if let Some(max) = self.max {
            if items.len() > max {
                issues.push(Issue::new(
                    IssueCode::TooBig,
                    self.say(|| format!("must contain at most {max} item(s)")),
                ));
            }
        }

        let mut output = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let parsed = match &self.item {
                Some(rule) => rule.parse(Some(item)),
                None => Ok(Some(item.clone())),
            };
            match parsed {
                Ok(value) => output.push(value.unwrap_or(Value::Null)),
                Err(found) => {
                    let at = FieldPath::root().index(index);
                    issues.extend(found.into_iter().map(|issue| issue.under(&at)));
                }
            }
        }

        finish(issues, Value::Array(output))
    }
}

// -----------------------------------------------------------------------------
// Files
// -----------------------------------------------------------------------------

/// Returns true if a file named `name` with media type `mime` matches an
/// `accept` list such as `.pdf,image/*`. An empty list accepts everything.
pub(crate) fn accepts_file(accept: &str, name: &str, mime: &str) -> bool {
    let tokens: Vec<&str> = accept
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect();
    if tokens.is_empty() {
        return true;
    }
    let name = name.to_ascii_lowercase();
    let mime = mime.to_ascii_lowercase();
    tokens.iter().any(|token| {
        let token = token.to_ascii_lowercase();
        if token.starts_with('.') {
            name.ends_with(&token)
        } else if let Some(family) = token.strip_suffix("/*") {
            mime.split('/').next() == Some(family)
        } else {
            mime == token
        }
    })
}

/// Checks on a list of uploaded file descriptions
/// (`{"name": ..., "size": ..., "type": ...}`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FileRule {
    /// Minimum number of files.
    pub min: Option<usize>,
    /// Maximum number of files.
    pub max: Option<usize>,
    /// Maximum size of each file in bytes.
    pub max_size: Option<u64>,
    /// Accepted extensions and media types, comma separated.
    pub accept: Option<String>,
    /// Message overriding every default message.
    pub message: Option<String>,
}

impl FileRule {
    /// Requires at least `min` files.
    pub fn min(mut self, min: usize) -> Self {
        self.min = Some(min);
        self
    }

    /// Allows at most `max` files.
    pub fn max(mut self, max: usize) -> Self {
        self.max = Some(max);
        self
    }

    /// Limits the size of each file.
    pub fn max_size(mut self, bytes: u64) -> Self {
        self.max_size = Some(bytes);
        self
    }

    /// Restricts extensions and media types.
    pub fn accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = Some(accept.into());
        self
    }

    fn parse(&self, value: Option<&Value>) -> RuleOutcome {
        let Some(Value::Array(files)) = value else {
            return Err(required_or_type(
                value,
                self.say(|| expected("file list", value)),
            ));
        };

        let mut issues = Vec::new();
        if let Some(min) = self.min {
            if files.len() < min {
                issues.push(Issue::new(
                    IssueCode::TooSmall,
                    self.say(|| format!("must contain at least {min} file(s)")),
                ));
            }
        }
        if let Some(max) = self.max {
            if files.len() > max {
                issues.push(Issue::new(
                    IssueCode::TooBig,
                    self.say(|| format!("must contain at most {max} file(s)")),
                ));
            }
        }

        for (index, file) in files.iter().enumerate() {
            let at = FieldPath::root().index(index);
            let Value::Object(meta) = file else {
                issues.push(
                    Issue::new(
                        IssueCode::InvalidType,
                        self.say(|| expected("file", Some(file))),
                    )
                    .under(&at),
                );
                continue;
            };
            let name = meta.get("name").and_then(Value::as_str).unwrap_or_default();
            let mime = meta.get("type").and_then(Value::as_str).unwrap_or_default();
            let size = meta.get("size").and_then(Value::as_u64).unwrap_or(0);

            if let Some(limit) = self.max_size {
                if size > limit {
                    issues.push(
                        Issue::new(
                            IssueCode::TooBig,
                            self.say(|| format!("file exceeds {limit} bytes")),
                        )
                        .under(&at),
                    );
                }
            }
            if let Some(accept) = &self.accept {
                if !accepts_file(accept, name, mime) {
                    issues.push(
                        Issue::new(
                            IssueCode::InvalidFormat,
                            self.say(|| format!("file type not accepted: {name}")),
                        )
                        .under(&at),
                    );
                }
            }
        }

        finish(issues, Value::Array(files.clone()))
    }
}
