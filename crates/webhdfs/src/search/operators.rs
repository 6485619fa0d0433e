//! Operator registry: comparison tokens mapped to binary predicates.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::error::{Result, WebhdfsError};

use super::keys::{KeyField, SearchKey, ValueKind};
use super::operand::Operand;
use super::registry::Registry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchOperator {
    Gt,
    Lt,
    Ge,
    Le,
    Eq,
    Regex,
    Glob,
}

/// Operand after validation against its key and operator.
#[derive(Debug, Clone)]
pub enum Comparand {
    Number(i64),
    Text(String),
    Regex(Regex),
    Glob(glob::Pattern),
}

impl fmt::Display for Comparand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
            Self::Regex(pattern) => f.write_str(pattern.as_str()),
            Self::Glob(pattern) => f.write_str(pattern.as_str()),
        }
    }
}

/// Registry value for an operator.
#[derive(Clone, Copy)]
pub struct OperatorSpec {
    pub token: &'static str,
    predicate: fn(&Value, &Comparand) -> bool,
}

impl OperatorSpec {
    /// Applies the predicate to a record field value.
    pub fn apply(&self, field: &Value, comparand: &Comparand) -> bool {
        (self.predicate)(field, comparand)
    }
}

impl fmt::Debug for OperatorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperatorSpec")
            .field("token", &self.token)
            .finish()
    }
}

/// The process-wide operator registry.
pub static SEARCH_OPERATORS: LazyLock<Registry<SearchOperator, OperatorSpec>> =
    LazyLock::new(|| {
        fn spec(token: &'static str, predicate: fn(&Value, &Comparand) -> bool) -> OperatorSpec {
            OperatorSpec { token, predicate }
        }
        Registry::from_entries(
            "search operators",
            vec![
                (SearchOperator::Gt, spec(">", greater_than)),
                (SearchOperator::Lt, spec("<", less_than)),
                (SearchOperator::Ge, spec(">=", greater_or_equal)),
                (SearchOperator::Le, spec("<=", less_or_equal)),
                (SearchOperator::Eq, spec("=", equal)),
                (SearchOperator::Regex, spec("regex", regex_search)),
                (SearchOperator::Glob, spec("glob", glob_match)),
            ],
        )
    });

impl SearchOperator {
    pub const ALL: [SearchOperator; 7] = [
        Self::Gt,
        Self::Lt,
        Self::Ge,
        Self::Le,
        Self::Eq,
        Self::Regex,
        Self::Glob,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Ge => ">=",
            Self::Le => "<=",
            Self::Eq => "=",
            Self::Regex => "regex",
            Self::Glob => "glob",
        }
    }

    pub fn is_ordering(self) -> bool {
        matches!(self, Self::Gt | Self::Lt | Self::Ge | Self::Le)
    }

    pub fn is_pattern(self) -> bool {
        matches!(self, Self::Regex | Self::Glob)
    }

    /// Validates `operand` for `key` and prepares it for evaluation.
    pub fn compile(self, key: SearchKey, field: &KeyField, operand: Operand) -> Result<Comparand> {
        let invalid = |message: String| WebhdfsError::InvalidOperand {
            key: key.to_string(),
            operator: self.to_string(),
            message,
        };

        if self.is_ordering() && field.kind != ValueKind::Number {
            return Err(invalid(format!("{key} is not a numeric attribute")));
        }
        if self.is_pattern() && field.kind != ValueKind::Text {
            return Err(invalid(format!("{key} is not a text attribute")));
        }
        if operand.kind() != field.kind {
            return Err(invalid(format!(
                "expected a {} operand, got {operand:?}",
                kind_name(field.kind)
            )));
        }

        match (self, operand) {
            (Self::Regex, Operand::Text(pattern)) => {
                let pattern = if pattern.is_empty() { ".*" } else { pattern.as_str() };
                Regex::new(pattern)
                    .map(Comparand::Regex)
                    .map_err(|error| invalid(error.to_string()))
            }
            (Self::Glob, Operand::Text(pattern)) => {
                let pattern = if pattern.is_empty() { "*" } else { pattern.as_str() };
                glob::Pattern::new(pattern)
                    .map(Comparand::Glob)
                    .map_err(|error| invalid(error.to_string()))
            }
            (_, Operand::Number(value)) => Ok(Comparand::Number(value)),
            (_, Operand::Text(value)) => Ok(Comparand::Text(value)),
        }
    }
}

impl FromStr for SearchOperator {
    type Err = WebhdfsError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim() {
            ">" => Ok(Self::Gt),
            "<" => Ok(Self::Lt),
            ">=" => Ok(Self::Ge),
            "<=" => Ok(Self::Le),
            "=" | "==" => Ok(Self::Eq),
            other if other.eq_ignore_ascii_case("regex") => Ok(Self::Regex),
            other if other.eq_ignore_ascii_case("glob") => Ok(Self::Glob),
            other => Err(WebhdfsError::InvalidOperator(other.to_string())),
        }
    }
}

impl fmt::Display for SearchOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn kind_name(kind: ValueKind) -> &'static str {
    match kind {
        ValueKind::Number => "numeric",
        ValueKind::Text => "text",
    }
}

fn compare_numbers(field: &Value, comparand: &Comparand) -> Option<Ordering> {
    let Comparand::Number(right) = comparand else {
        return None;
    };
    if let Some(left) = field.as_i64() {
        return Some(left.cmp(right));
    }
    field.as_f64()?.partial_cmp(&(*right as f64))
}

fn greater_than(field: &Value, comparand: &Comparand) -> bool {
    compare_numbers(field, comparand) == Some(Ordering::Greater)
}

fn less_than(field: &Value, comparand: &Comparand) -> bool {
    compare_numbers(field, comparand) == Some(Ordering::Less)
}

fn greater_or_equal(field: &Value, comparand: &Comparand) -> bool {
    matches!(
        compare_numbers(field, comparand),
        Some(Ordering::Greater | Ordering::Equal)
    )
}

fn less_or_equal(field: &Value, comparand: &Comparand) -> bool {
    matches!(
        compare_numbers(field, comparand),
        Some(Ordering::Less | Ordering::Equal)
    )
}

fn equal(field: &Value, comparand: &Comparand) -> bool {
    match comparand {
        Comparand::Number(_) => compare_numbers(field, comparand) == Some(Ordering::Equal),
        Comparand::Text(right) => field.as_str() == Some(right.as_str()),
        Comparand::Regex(_) | Comparand::Glob(_) => false,
    }
}

/// Unanchored search, like `re.search`.
fn regex_search(field: &Value, comparand: &Comparand) -> bool {
    match (field.as_str(), comparand) {
        (Some(text), Comparand::Regex(pattern)) => pattern.is_match(text),
        _ => false,
    }
}

/// Whole-string shell-style match.
fn glob_match(field: &Value, comparand: &Comparand) -> bool {
    match (field.as_str(), comparand) {
        (Some(text), Comparand::Glob(pattern)) => pattern.matches(text),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::keys::SEARCH_KEYS;
    use serde_json::json;

    fn compile(
        key: SearchKey,
        operator: SearchOperator,
        operand: impl Into<Operand>,
    ) -> Result<Comparand> {
        let field = SEARCH_KEYS.get(&key)?;
        operator.compile(key, field, operand.into())
    }

    fn apply(operator: SearchOperator, field: Value, comparand: &Comparand) -> bool {
        SEARCH_OPERATORS.get(&operator).unwrap().apply(&field, comparand)
    }

    #[test]
    fn every_operator_is_registered() {
        for operator in SearchOperator::ALL {
            let spec = SEARCH_OPERATORS.get(&operator).unwrap();
            assert_eq!(spec.token, operator.as_str());
            assert_eq!(spec.token.parse::<SearchOperator>().unwrap(), operator);
        }
    }

    #[test]
    fn operator_registry_rejects_writes() {
        let spec = *SEARCH_OPERATORS.get(&SearchOperator::Eq).unwrap();
        let error = SEARCH_OPERATORS.try_insert(SearchOperator::Eq, spec).unwrap_err();
        assert!(matches!(error, WebhdfsError::ImmutableRegistry(_)));
    }

    #[test]
    fn unknown_operator_token_fails() {
        let error = "!=".parse::<SearchOperator>().unwrap_err();
        assert!(matches!(error, WebhdfsError::InvalidOperator(token) if token == "!="));
    }

    #[test]
    fn numeric_comparisons() {
        let hundred = compile(SearchKey::Size, SearchOperator::Gt, 100).unwrap();
        assert!(apply(SearchOperator::Gt, json!(101), &hundred));
        assert!(!apply(SearchOperator::Gt, json!(100), &hundred));
        assert!(apply(SearchOperator::Ge, json!(100), &hundred));
        assert!(apply(SearchOperator::Lt, json!(99), &hundred));
        assert!(apply(SearchOperator::Le, json!(100), &hundred));
        assert!(apply(SearchOperator::Eq, json!(100), &hundred));
        assert!(!apply(SearchOperator::Gt, json!("101"), &hundred));
    }

    #[test]
    fn regex_is_an_unanchored_search() {
        let pattern = compile(SearchKey::Path, SearchOperator::Regex, "(.dat|.csv|.txt)$").unwrap();
        assert!(apply(SearchOperator::Regex, json!("part-0001.csv"), &pattern));
        assert!(!apply(SearchOperator::Regex, json!("part-0001.parquet"), &pattern));

        let anywhere = compile(SearchKey::Path, SearchOperator::Regex, "log").unwrap();
        assert!(apply(SearchOperator::Regex, json!("promo_log_2020"), &anywhere));
    }

    #[test]
    fn glob_matches_whole_name() {
        let pattern = compile(SearchKey::Path, SearchOperator::Glob, "*.csv").unwrap();
        assert!(apply(SearchOperator::Glob, json!("a.csv"), &pattern));
        assert!(!apply(SearchOperator::Glob, json!("a.csv.bak"), &pattern));
    }

    #[test]
    fn empty_patterns_match_everything() {
        let regex = compile(SearchKey::Path, SearchOperator::Regex, "").unwrap();
        let glob = compile(SearchKey::Path, SearchOperator::Glob, "").unwrap();
        assert!(apply(SearchOperator::Regex, json!("anything"), &regex));
        assert!(apply(SearchOperator::Glob, json!("anything"), &glob));
    }

    #[test]
    fn incompatible_operands_fail_at_compile_time() {
        let ordering_on_text = compile(SearchKey::Owner, SearchOperator::Gt, "hdfs");
        assert!(matches!(ordering_on_text, Err(WebhdfsError::InvalidOperand { .. })));

        let pattern_on_number = compile(SearchKey::Size, SearchOperator::Regex, "1.*");
        assert!(matches!(pattern_on_number, Err(WebhdfsError::InvalidOperand { .. })));

        let text_for_number = compile(SearchKey::Size, SearchOperator::Eq, "100");
        assert!(matches!(text_for_number, Err(WebhdfsError::InvalidOperand { .. })));

        let bad_regex = compile(SearchKey::Path, SearchOperator::Regex, "(unclosed");
        assert!(matches!(bad_regex, Err(WebhdfsError::InvalidOperand { .. })));
    }

    #[test]
    fn text_equality() {
        let owner = compile(SearchKey::Owner, SearchOperator::Eq, "hdfs").unwrap();
        assert!(apply(SearchOperator::Eq, json!("hdfs"), &owner));
        assert!(!apply(SearchOperator::Eq, json!("yarn"), &owner));
        assert!(!apply(SearchOperator::Eq, json!(null), &owner));
    }
}
