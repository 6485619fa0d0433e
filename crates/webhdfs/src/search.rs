//! Structured search over WebHDFS metadata records.
//!
//! This module provides:
//! - Immutable registries for keys, comparison operators and logical operators
//! - Search expressions binding a key, an operator and a validated operand
//! - Postfix expression lists and their text form

mod expression;
mod expression_list;
mod keys;
mod logical;
mod operand;
mod operators;
mod postfix;
mod registry;

pub use expression::{IntoSearchKey, IntoSearchOperator, SearchExpression};
pub use expression_list::{
    build_expression, combine, IntoSearchToken, SearchExpressionList, SearchToken,
};
pub use keys::{KeyField, SearchKey, ValueKind, SEARCH_KEYS};
pub use logical::{LogicalOperator, LOGICAL_OPERATORS};
pub use operand::{parse_size_literal, parse_time_literal, Operand};
pub use operators::{Comparand, OperatorSpec, SearchOperator, SEARCH_OPERATORS};
pub use postfix::parse_postfix;
pub use registry::{Registry, RegistryBuilder};
