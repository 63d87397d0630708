//! Validation rule engine
//!
//! Each column accumulates named constraint rules through a fluent
//! registration surface; rules are evaluated against a candidate record
//! before persistence. Failures accumulate as `ValidationError`s, never
//! as panics or control flow.

use std::collections::BTreeMap;
use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::types::ColumnType;

/// Validation pass mode
///
/// Update mode waives `required` rules so partial updates never fail on
/// absent fields; create and save passes run in `Create` mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    Create,
    Update,
}

/// One failed constraint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Table the failing record belongs to
    #[serde(rename = "tableName")]
    pub table_name: String,
    /// Column the rule was registered on
    #[serde(rename = "columnName")]
    pub column_name: String,
    /// The offending value
    pub value: Value,
    /// Canonical rule name
    pub rule: String,
    /// Arguments the rule was registered with (`true` for bare flags)
    pub args: Value,
}

impl ValidationError {
    pub(crate) fn new(table_name: &str, column_name: &str, value: Value, rule: &Rule) -> Self {
        Self {
            table_name: table_name.to_string(),
            column_name: column_name.to_string(),
            value,
            rule: rule.name().to_string(),
            args: rule.args(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{} failed rule '{}' for value {}",
            self.table_name, self.column_name, self.rule, self.value
        )
    }
}

/// A single registered constraint
#[derive(Debug, Clone)]
pub enum Rule {
    /// Value must be present and non-null
    Required,
    /// Value must match the column type's checking rules
    Type(ColumnType),
    /// String length lower bound (in characters)
    MinLength(usize),
    /// String length upper bound (in characters)
    MaxLength(usize),
    /// String must match the pattern
    Matches(Regex),
    /// Value must be one of the listed values
    OneOf(Vec<Value>),
}

impl Rule {
    /// Canonical rule name; re-registering the same name overwrites
    pub fn name(&self) -> &'static str {
        match self {
            Rule::Required => "required",
            Rule::Type(column_type) => column_type.name(),
            Rule::MinLength(_) => "min_length",
            Rule::MaxLength(_) => "max_length",
            Rule::Matches(_) => "matches",
            Rule::OneOf(_) => "one_of",
        }
    }

    /// Arguments the rule was registered with, for error reporting
    pub fn args(&self) -> Value {
        match self {
            Rule::Required | Rule::Type(_) => Value::Bool(true),
            Rule::MinLength(n) | Rule::MaxLength(n) => json!(n),
            Rule::Matches(pattern) => json!(pattern.as_str()),
            Rule::OneOf(values) => Value::Array(values.clone()),
        }
    }

    /// Whether the value satisfies this rule
    ///
    /// Null satisfies every rule except `required`; emptiness is handled
    /// by the caller's required/mode logic so a missing column yields
    /// exactly one error.
    pub fn matches(&self, value: &Value) -> bool {
        if value.is_null() {
            return !matches!(self, Rule::Required);
        }

        match self {
            Rule::Required => true,
            Rule::Type(column_type) => column_type.check_value(value).is_ok(),
            Rule::MinLength(n) => value
                .as_str()
                .is_none_or(|s| s.chars().count() >= *n),
            Rule::MaxLength(n) => value
                .as_str()
                .is_none_or(|s| s.chars().count() <= *n),
            Rule::Matches(pattern) => value.as_str().is_none_or(|s| pattern.is_match(s)),
            Rule::OneOf(values) => values.contains(value),
        }
    }
}

/// The rules registered for one column, keyed by canonical rule name
#[derive(Debug, Clone, Default)]
pub struct ColumnValidation {
    rules: BTreeMap<String, Rule>,
}

impl ColumnValidation {
    pub(crate) fn insert(&mut self, rule: Rule) {
        self.rules.insert(rule.name().to_string(), rule);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.rules.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.values()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Fluent rule-registration surface returned by `Model::validates`
///
/// Every rule method records the rule and returns the surface for
/// chaining; registering a rule name twice overwrites the earlier one.
pub struct ColumnRules<'a> {
    validation: &'a mut ColumnValidation,
}

impl<'a> ColumnRules<'a> {
    pub(crate) fn new(validation: &'a mut ColumnValidation) -> Self {
        Self { validation }
    }

    fn rule(self, rule: Rule) -> Self {
        self.validation.insert(rule);
        self
    }

    pub fn required(self) -> Self {
        self.rule(Rule::Required)
    }

    pub fn string(self) -> Self {
        self.rule(Rule::Type(ColumnType::String))
    }

    pub fn integer(self) -> Self {
        self.rule(Rule::Type(ColumnType::Integer))
    }

    pub fn decimal(self) -> Self {
        self.rule(Rule::Type(ColumnType::Decimal))
    }

    pub fn boolean(self) -> Self {
        self.rule(Rule::Type(ColumnType::Boolean))
    }

    pub fn datetime(self) -> Self {
        self.rule(Rule::Type(ColumnType::Datetime))
    }

    pub fn json(self) -> Self {
        self.rule(Rule::Type(ColumnType::Json))
    }

    /// Register the type rule for an arbitrary column type
    pub fn of_type(self, column_type: ColumnType) -> Self {
        self.rule(Rule::Type(column_type))
    }

    pub fn min_length(self, n: usize) -> Self {
        self.rule(Rule::MinLength(n))
    }

    pub fn max_length(self, n: usize) -> Self {
        self.rule(Rule::MaxLength(n))
    }

    /// Register a pattern rule; compile the pattern with `Regex::new`
    pub fn matches(self, pattern: Regex) -> Self {
        self.rule(Rule::Matches(pattern))
    }

    pub fn one_of<I, V>(self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.rule(Rule::OneOf(values.into_iter().map(Into::into).collect()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_fails_only_on_null() {
        assert!(!Rule::Required.matches(&Value::Null));
        assert!(Rule::Required.matches(&json!("")));
        assert!(Rule::Required.matches(&json!(0)));
    }

    #[test]
    fn test_type_rules_accept_null() {
        assert!(Rule::Type(ColumnType::String).matches(&Value::Null));
        assert!(Rule::Type(ColumnType::Integer).matches(&Value::Null));
    }

    #[test]
    fn test_type_rule_matching() {
        let rule = Rule::Type(ColumnType::Integer);
        assert!(rule.matches(&json!(3)));
        assert!(rule.matches(&json!("3")));
        assert!(!rule.matches(&json!("abc")));
    }

    #[test]
    fn test_length_rules() {
        assert!(Rule::MinLength(3).matches(&json!("abc")));
        assert!(!Rule::MinLength(3).matches(&json!("ab")));
        assert!(Rule::MaxLength(3).matches(&json!("abc")));
        assert!(!Rule::MaxLength(3).matches(&json!("abcd")));
        // non-strings are the type rule's concern
        assert!(Rule::MaxLength(1).matches(&json!(12345)));
    }

    #[test]
    fn test_matches_rule() {
        let rule = Rule::Matches(Regex::new(r"^[a-z]+$").unwrap());
        assert!(rule.matches(&json!("abc")));
        assert!(!rule.matches(&json!("ABC")));
    }

    #[test]
    fn test_one_of_rule() {
        let rule = Rule::OneOf(vec![json!("a"), json!("b")]);
        assert!(rule.matches(&json!("a")));
        assert!(!rule.matches(&json!("c")));
    }

    #[test]
    fn test_fluent_registration_chains() {
        let mut validation = ColumnValidation::default();
        ColumnRules::new(&mut validation)
            .required()
            .string()
            .max_length(255);

        assert_eq!(validation.len(), 3);
        assert!(validation.contains("required"));
        assert!(validation.contains("string"));
        assert!(validation.contains("max_length"));
    }

    #[test]
    fn test_reregistration_last_write_wins() {
        let mut validation = ColumnValidation::default();
        ColumnRules::new(&mut validation).max_length(5);
        ColumnRules::new(&mut validation).max_length(10);

        assert_eq!(validation.len(), 1);
        match validation.get("max_length") {
            Some(Rule::MaxLength(n)) => assert_eq!(*n, 10),
            other => panic!("unexpected rule: {:?}", other),
        }
    }

    #[test]
    fn test_validation_error_fields() {
        let error = ValidationError::new("items", "title", Value::Null, &Rule::Required);
        assert_eq!(error.table_name, "items");
        assert_eq!(error.column_name, "title");
        assert_eq!(error.rule, "required");
        assert_eq!(error.args, json!(true));
        assert_eq!(error.value, Value::Null);
    }

    #[test]
    fn test_validation_error_display() {
        let error = ValidationError::new("items", "count", json!("abc"), &Rule::Type(ColumnType::Integer));
        let text = error.to_string();
        assert!(text.contains("items.count"));
        assert!(text.contains("integer"));
    }

    #[test]
    fn test_rule_args_reporting() {
        assert_eq!(Rule::MinLength(2).args(), json!(2));
        let rule = Rule::Matches(Regex::new("^a").unwrap());
        assert_eq!(rule.args(), json!("^a"));
        assert_eq!(
            Rule::OneOf(vec![json!(1), json!(2)]).args(),
            json!([1, 2])
        );
    }
}
