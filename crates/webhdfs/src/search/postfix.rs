//! Text form of a postfix search expression list.
//!
//! Tokens are separated by whitespace and read left to right:
//!
//! ```text
//! size>1g owner=hdfs and path:regex:"\.(csv|txt)$" or
//! ```
//!
//! A comparison is written `key<op>value` (`>`, `<`, `>=`, `<=`, `=`) and a
//! pattern test `key:regex:PATTERN` or `key:glob:PATTERN`. Double quotes
//! group characters, including whitespace, into the current token. `and` and
//! `or` combine the two preceding results; there is no precedence and no
//! parentheses.

use crate::error::{Result, WebhdfsError};

use super::expression::SearchExpression;
use super::expression_list::{SearchExpressionList, SearchToken};
use super::logical::LogicalOperator;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Word {
    text: String,
    position: usize,
}

/// Parses a postfix filter string into an expression list.
///
/// Only syntax is checked here; operand balance is checked on evaluation.
pub fn parse_postfix(input: &str) -> Result<SearchExpressionList> {
    let mut list = SearchExpressionList::new();
    for word in split_words(input)? {
        list.add(parse_word(&word)?)?;
    }
    if list.is_empty() {
        return Err(WebhdfsError::MissingArgument(
            "search expression is empty".to_string(),
        ));
    }
    Ok(list)
}

fn parse_word(word: &Word) -> Result<SearchToken> {
    let text = word.text.as_str();
    if let Ok(operator) = text.parse::<LogicalOperator>() {
        return Ok(SearchToken::Logical(operator));
    }

    let comparison_at = text.find(['<', '>', '=']);
    let colon_at = text.find(':');
    let pattern_form = match (colon_at, comparison_at) {
        (Some(colon), Some(comparison)) => colon < comparison,
        (Some(_), None) => true,
        _ => false,
    };
    if let Some((key, rest)) = text.split_once(':').filter(|_| pattern_form) {
        let (operator, value) = rest.split_once(':').ok_or_else(|| {
            WebhdfsError::InvalidToken(format!(
                "expected key:operator:value near byte {}: {text}",
                word.position
            ))
        })?;
        return SearchExpression::parse(key, operator, value).map(SearchToken::Expression);
    }

    let start = comparison_at.ok_or_else(|| {
        WebhdfsError::InvalidToken(format!("{text} (near byte {})", word.position))
    })?;
    let end = text[start..]
        .find(|ch: char| !matches!(ch, '<' | '>' | '='))
        .map_or(text.len(), |offset| start + offset);
    let (key, operator, value) = (&text[..start], &text[start..end], &text[end..]);
    if key.is_empty() {
        return Err(WebhdfsError::InvalidToken(format!(
            "missing key near byte {}: {text}",
            word.position
        )));
    }
    SearchExpression::parse(key, operator, value).map(SearchToken::Expression)
}

fn split_words(input: &str) -> Result<Vec<Word>> {
    let mut words = Vec::new();
    let mut current: Option<Word> = None;
    let mut quote_start: Option<usize> = None;

    for (position, ch) in input.char_indices() {
        if ch == '"' {
            quote_start = match quote_start {
                Some(_) => None,
                None => Some(position),
            };
            current.get_or_insert_with(|| Word {
                text: String::new(),
                position,
            });
            continue;
        }
        if ch.is_whitespace() && quote_start.is_none() {
            words.extend(current.take());
            continue;
        }
        current
            .get_or_insert_with(|| Word {
                text: String::new(),
                position,
            })
            .text
            .push(ch);
    }

    if let Some(position) = quote_start {
        return Err(WebhdfsError::InvalidToken(format!(
            "unterminated quote starting at byte {position}"
        )));
    }
    words.extend(current);
    Ok(words)
}
