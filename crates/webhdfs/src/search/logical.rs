//! Logical-operator registry: `and` / `or` and their precedence.
//!
//! Precedence is recorded for completeness; the postfix evaluator never
//! consults it because token order already fixes evaluation order.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::error::{Result, WebhdfsError};

use super::registry::Registry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOperator {
    And,
    Or,
}

pub static LOGICAL_OPERATORS: LazyLock<Registry<LogicalOperator, u8>> = LazyLock::new(|| {
    Registry::from_entries(
        "logical operators",
        vec![(LogicalOperator::And, 1), (LogicalOperator::Or, 2)],
    )
});

impl LogicalOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
        }
    }

    pub fn precedence(self) -> Result<u8> {
        LOGICAL_OPERATORS.get(&self).copied()
    }

    pub fn apply(self, left: bool, right: bool) -> bool {
        match self {
            Self::And => left && right,
            Self::Or => left || right,
        }
    }
}

impl FromStr for LogicalOperator {
    type Err = WebhdfsError;

    fn from_str(value: &str) -> Result<Self> {
        let candidate = value.trim();
        LOGICAL_OPERATORS
            .keys()
            .copied()
            .find(|operator| candidate.eq_ignore_ascii_case(operator.as_str()))
            .ok_or_else(|| WebhdfsError::InvalidToken(candidate.to_string()))
    }
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precedence_table() {
        assert_eq!(LogicalOperator::And.precedence().unwrap(), 1);
        assert_eq!(LogicalOperator::Or.precedence().unwrap(), 2);
    }

    #[test]
    fn parses_tokens_case_insensitively() {
        assert_eq!("and".parse::<LogicalOperator>().unwrap(), LogicalOperator::And);
        assert_eq!(" OR ".parse::<LogicalOperator>().unwrap(), LogicalOperator::Or);
        let error = "xor".parse::<LogicalOperator>().unwrap_err();
        assert!(matches!(error, WebhdfsError::InvalidToken(token) if token == "xor"));
    }

    #[test]
    fn logical_registry_rejects_writes() {
        let error = LOGICAL_OPERATORS
            .try_insert(LogicalOperator::And, 9)
            .unwrap_err();
        assert!(matches!(error, WebhdfsError::ImmutableRegistry(_)));
        assert_eq!(LogicalOperator::And.precedence().unwrap(), 1);
    }

    #[test]
    fn apply_truth_tables() {
        for (left, right) in [(false, false), (false, true), (true, false), (true, true)] {
            assert_eq!(LogicalOperator::And.apply(left, right), left && right);
            assert_eq!(LogicalOperator::Or.apply(left, right), left || right);
        }
    }
}
