//! Postfix lists of search expressions joined by `and` / `or`.

use std::fmt;

use crate::error::{Result, WebhdfsError};
use crate::types::MetadataRecord;

use super::expression::{IntoSearchKey, IntoSearchOperator, SearchExpression};
use super::logical::LogicalOperator;
use super::operand::Operand;

#[derive(Debug, Clone)]
pub enum SearchToken {
    Expression(SearchExpression),
    Logical(LogicalOperator),
}

impl fmt::Display for SearchToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expression(expression) => write!(f, "{expression}"),
            Self::Logical(operator) => write!(f, "{operator}"),
        }
    }
}

/// Anything that can be appended to a [`SearchExpressionList`].
pub trait IntoSearchToken {
    fn into_search_token(self) -> Result<SearchToken>;
}

impl IntoSearchToken for SearchToken {
    fn into_search_token(self) -> Result<SearchToken> {
        Ok(self)
    }
}

impl IntoSearchToken for SearchExpression {
    fn into_search_token(self) -> Result<SearchToken> {
        Ok(SearchToken::Expression(self))
    }
}

impl IntoSearchToken for LogicalOperator {
    fn into_search_token(self) -> Result<SearchToken> {
        Ok(SearchToken::Logical(self))
    }
}

impl IntoSearchToken for &str {
    fn into_search_token(self) -> Result<SearchToken> {
        self.parse().map(SearchToken::Logical)
    }
}

/// Tokens in postfix order. Well-formedness is only checked by [`evaluate`].
///
/// [`evaluate`]: SearchExpressionList::evaluate
#[derive(Debug, Clone, Default)]
pub struct SearchExpressionList {
    tokens: Vec<SearchToken>,
}

impl SearchExpressionList {
    pub fn new() -> Self {
        Self::default()
    }

    /// A list holding a single expression.
    pub fn single(expression: SearchExpression) -> Self {
        Self {
            tokens: vec![SearchToken::Expression(expression)],
        }
    }

    pub fn add(&mut self, token: impl IntoSearchToken) -> Result<&mut Self> {
        self.tokens.push(token.into_search_token()?);
        Ok(self)
    }

    /// Consuming variant of [`add`](Self::add) for builder chains.
    pub fn with(mut self, token: impl IntoSearchToken) -> Result<Self> {
        self.add(token)?;
        Ok(self)
    }

    pub fn tokens(&self) -> &[SearchToken] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Reduces the postfix token list to one boolean for `record`.
    pub fn evaluate(&self, record: &MetadataRecord) -> Result<bool> {
        let mut stack: Vec<bool> = Vec::with_capacity(self.tokens.len());
        for token in &self.tokens {
            match token {
                SearchToken::Expression(expression) => stack.push(expression.evaluate(record)),
                SearchToken::Logical(operator) => {
                    let (Some(right), Some(left)) = (stack.pop(), stack.pop()) else {
                        return Err(WebhdfsError::MalformedExpression(format!(
                            "'{operator}' needs two operands in [{self}]"
                        )));
                    };
                    stack.push(operator.apply(left, right));
                }
            }
        }

        match stack.as_slice() {
            [result] => Ok(*result),
            [] => Err(WebhdfsError::MalformedExpression(
                "empty search expression".to_string(),
            )),
            rest => Err(WebhdfsError::MalformedExpression(format!(
                "{} results left unjoined in [{self}]",
                rest.len()
            ))),
        }
    }
}

impl From<SearchExpression> for SearchExpressionList {
    fn from(expression: SearchExpression) -> Self {
        Self::single(expression)
    }
}

impl fmt::Display for SearchExpressionList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, token) in self.tokens.iter().enumerate() {
            if index > 0 {
                f.write_str(",")?;
            }
            write!(f, "{token}")?;
        }
        Ok(())
    }
}

/// Builds a one-expression list, ready to be extended with [`combine`].
pub fn build_expression(
    key: impl IntoSearchKey,
    operator: impl IntoSearchOperator,
    value: impl Into<Operand>,
) -> Result<SearchExpressionList> {
    SearchExpression::new(key, operator, value).map(SearchExpressionList::single)
}

/// Appends `token` to `list`.
pub fn combine(
    list: SearchExpressionList,
    token: impl IntoSearchToken,
) -> Result<SearchExpressionList> {
    list.with(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(length: i64, owner: &str) -> MetadataRecord {
        MetadataRecord::from_value(json!({
            "pathSuffix": "part-0000",
            "type": "FILE",
            "length": length,
            "owner": owner,
            "modificationTime": 1_361_834_700_000_i64
        }))
        .unwrap()
    }

    fn big() -> SearchExpression {
        SearchExpression::new("size", ">", 100).unwrap()
    }

    fn hdfs() -> SearchExpression {
        SearchExpression::new("owner", "=", "hdfs").unwrap()
    }

    #[test]
    fn and_or_match_their_operands() {
        let and = SearchExpressionList::single(big())
            .with(hdfs())
            .and_then(|list| list.with("and"))
            .unwrap();
        let or = SearchExpressionList::single(big())
            .with(hdfs())
            .and_then(|list| list.with("or"))
            .unwrap();

        for (length, owner) in [(50, "yarn"), (50, "hdfs"), (500, "yarn"), (500, "hdfs")] {
            let sample = record(length, owner);
            let left = big().evaluate(&sample);
            let right = hdfs().evaluate(&sample);
            assert_eq!(and.evaluate(&sample).unwrap(), left && right);
            assert_eq!(or.evaluate(&sample).unwrap(), left || right);
        }
    }

    #[test]
    fn insufficient_operands_is_malformed() {
        let list = SearchExpressionList::single(big()).with("and").unwrap();
        let error = list.evaluate(&record(500, "hdfs")).unwrap_err();
        assert!(matches!(error, WebhdfsError::MalformedExpression(_)));
    }

    #[test]
    fn leftover_operands_are_malformed() {
        let list = SearchExpressionList::single(big()).with(hdfs()).unwrap();
        let error = list.evaluate(&record(500, "hdfs")).unwrap_err();
        assert!(matches!(error, WebhdfsError::MalformedExpression(_)));
    }

    #[test]
    fn empty_list_is_malformed() {
        let error = SearchExpressionList::new().evaluate(&record(1, "hdfs")).unwrap_err();
        assert!(matches!(error, WebhdfsError::MalformedExpression(_)));
    }

    #[test]
    fn add_rejects_unknown_tokens() {
        let mut list = SearchExpressionList::single(big());
        let error = list.add("xor").unwrap_err();
        assert!(matches!(error, WebhdfsError::InvalidToken(_)));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn nested_postfix_groups() {
        // size > 100 and (owner = hdfs or owner = yarn)
        let yarn = SearchExpression::new("owner", "=", "yarn").unwrap();
        let list = build_expression("size", ">", 100)
            .and_then(|list| combine(list, hdfs()))
            .and_then(|list| combine(list, yarn))
            .and_then(|list| combine(list, "or"))
            .and_then(|list| combine(list, "and"))
            .unwrap();

        assert!(list.evaluate(&record(500, "yarn")).unwrap());
        assert!(!list.evaluate(&record(500, "mapred")).unwrap());
        assert!(!list.evaluate(&record(50, "hdfs")).unwrap());
    }

    #[test]
    fn display_joins_tokens() {
        let list = build_expression("owner", "=", "hdfs")
            .and_then(|list| combine(list, big()))
            .and_then(|list| combine(list, "or"))
            .unwrap();
        assert_eq!(list.to_string(), "owner,=,hdfs,size,>,100,or");
    }
}
