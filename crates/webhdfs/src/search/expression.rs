use std::fmt;

use crate::error::{Result, WebhdfsError};
use crate::types::MetadataRecord;

use super::keys::{KeyField, SearchKey, SEARCH_KEYS};
use super::operand::Operand;
use super::operators::{Comparand, OperatorSpec, SearchOperator, SEARCH_OPERATORS};
use super::registry::Registry;

/// Accepts a typed key or one of its names (`"owner"`, `"raw_size"`).
pub trait IntoSearchKey {
    fn into_search_key(self) -> Result<SearchKey>;
}

impl IntoSearchKey for SearchKey {
    fn into_search_key(self) -> Result<SearchKey> {
        Ok(self)
    }
}

impl IntoSearchKey for &str {
    fn into_search_key(self) -> Result<SearchKey> {
        self.parse()
    }
}

impl IntoSearchKey for &String {
    fn into_search_key(self) -> Result<SearchKey> {
        self.parse()
    }
}

/// Accepts a typed operator or its token (`">="`, `"glob"`).
pub trait IntoSearchOperator {
    fn into_search_operator(self) -> Result<SearchOperator>;
}

impl IntoSearchOperator for SearchOperator {
    fn into_search_operator(self) -> Result<SearchOperator> {
        Ok(self)
    }
}

impl IntoSearchOperator for &str {
    fn into_search_operator(self) -> Result<SearchOperator> {
        self.parse()
    }
}

impl IntoSearchOperator for &String {
    fn into_search_operator(self) -> Result<SearchOperator> {
        self.parse()
    }
}

/// One `key operator operand` test against a metadata record.
#[derive(Debug, Clone)]
pub struct SearchExpression {
    key: SearchKey,
    operator: SearchOperator,
    field: KeyField,
    spec: OperatorSpec,
    comparand: Comparand,
}

impl SearchExpression {
    /// Builds an expression against the process-wide registries.
    pub fn new(
        key: impl IntoSearchKey,
        operator: impl IntoSearchOperator,
        operand: impl Into<Operand>,
    ) -> Result<Self> {
        Self::with_registries(&SEARCH_KEYS, &SEARCH_OPERATORS, key, operator, operand)
    }

    /// Builds an expression from a raw operand string, parsed for the key's kind.
    ///
    /// `size > 1g` and `mtime >= 2013-02-25` go through here.
    pub fn parse(
        key: impl IntoSearchKey,
        operator: impl IntoSearchOperator,
        raw: &str,
    ) -> Result<Self> {
        let key = key.into_search_key()?;
        let operand = Operand::parse_for(key, raw)?;
        Self::new(key, operator, operand)
    }

    pub fn with_registries(
        keys: &Registry<SearchKey, KeyField>,
        operators: &Registry<SearchOperator, OperatorSpec>,
        key: impl IntoSearchKey,
        operator: impl IntoSearchOperator,
        operand: impl Into<Operand>,
    ) -> Result<Self> {
        let key = key.into_search_key()?;
        let operator = operator.into_search_operator()?;
        let field = *keys
            .get(&key)
            .map_err(|_| WebhdfsError::InvalidKey(key.to_string()))?;
        let spec = *operators
            .get(&operator)
            .map_err(|_| WebhdfsError::InvalidOperator(operator.to_string()))?;
        let comparand = operator.compile(key, &field, operand.into())?;
        Ok(Self {
            key,
            operator,
            field,
            spec,
            comparand,
        })
    }

    pub fn key(&self) -> SearchKey {
        self.key
    }

    pub fn operator(&self) -> SearchOperator {
        self.operator
    }

    pub fn comparand(&self) -> &Comparand {
        &self.comparand
    }

    /// Wire field the expression reads from a record.
    pub fn wire_field(&self) -> &'static str {
        self.field.wire_name
    }

    /// Applies the predicate to the record's field. Absent fields never match.
    pub fn evaluate(&self, record: &MetadataRecord) -> bool {
        record
            .get(self.field.wire_name)
            .is_some_and(|value| self.spec.apply(value, &self.comparand))
    }
}

impl fmt::Display for SearchExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.key, self.spec.token, self.comparand)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::keys::ValueKind;
    use serde_json::json;

    fn file(name: &str, length: i64, owner: &str) -> MetadataRecord {
        MetadataRecord::from_value(json!({
            "pathSuffix": name,
            "type": "FILE",
            "length": length,
            "owner": owner,
            "replication": 3,
            "modificationTime": 1_361_834_700_000_i64
        }))
        .unwrap()
    }

    #[test]
    fn accepts_names_and_typed_values() {
        let by_name = SearchExpression::new("size", ">", 1_073_741_824_i64).unwrap();
        let typed =
            SearchExpression::new(SearchKey::Size, SearchOperator::Gt, 1_073_741_824_i64).unwrap();
        assert_eq!(by_name.key(), typed.key());
        assert_eq!(by_name.operator(), typed.operator());
        assert_eq!(by_name.wire_field(), "length");
    }

    #[test]
    fn rejects_unknown_key_and_operator() {
        let bad_key = SearchExpression::new("group", "=", "hadoop").unwrap_err();
        assert!(matches!(bad_key, WebhdfsError::InvalidKey(_)));

        let bad_operator = SearchExpression::new("owner", "~", "hdfs").unwrap_err();
        assert!(matches!(bad_operator, WebhdfsError::InvalidOperator(_)));
    }

    #[test]
    fn evaluates_against_wire_fields() {
        let big = SearchExpression::new("size", ">=", 200).unwrap();
        assert!(big.evaluate(&file("b", 200, "hdfs")));
        assert!(!big.evaluate(&file("a", 100, "hdfs")));

        let csv = SearchExpression::new("path", "regex", "(.dat|.csv|.txt)$").unwrap();
        assert!(csv.evaluate(&file("events.csv", 1, "hdfs")));
        assert!(!csv.evaluate(&file("events.orc", 1, "hdfs")));
    }

    #[test]
    fn evaluation_is_pure() {
        let owner = SearchExpression::new("owner", "glob", "rpr*").unwrap();
        let record = file("a", 1, "rprasad");
        let first = owner.evaluate(&record);
        let second = owner.evaluate(&record);
        assert!(first);
        assert_eq!(first, second);
    }

    #[test]
    fn missing_field_does_not_match() {
        let raw = SearchExpression::new("raw_size", ">", 0).unwrap();
        assert!(!raw.evaluate(&file("a", 100, "hdfs")));
    }

    #[test]
    fn parse_reads_literals_for_the_key() {
        let big = SearchExpression::parse("size", ">", "1k").unwrap();
        assert!(big.evaluate(&file("a", 2048, "hdfs")));
        assert!(!big.evaluate(&file("a", 1000, "hdfs")));

        let recent = SearchExpression::parse("mtime", ">", "2013-02-25T23:23:23").unwrap();
        assert!(recent.evaluate(&file("a", 1, "hdfs")));
    }

    #[test]
    fn custom_registries_are_honoured() {
        let keys = Registry::builder("owner only")
            .register(
                SearchKey::Owner,
                KeyField {
                    wire_name: "owner",
                    kind: ValueKind::Text,
                },
            )
            .unwrap()
            .build();
        let error =
            SearchExpression::with_registries(&keys, &SEARCH_OPERATORS, "size", ">", 1).unwrap_err();
        assert!(matches!(error, WebhdfsError::InvalidKey(key) if key == "size"));

        let operators = Registry::builder("equality only")
            .register(
                SearchOperator::Eq,
                *SEARCH_OPERATORS.get(&SearchOperator::Eq).unwrap(),
            )
            .unwrap()
            .build();
        let error = SearchExpression::with_registries(&keys, &operators, "owner", "regex", "h.*")
            .unwrap_err();
        assert!(matches!(error, WebhdfsError::InvalidOperator(op) if op == "regex"));

        let owner =
            SearchExpression::with_registries(&keys, &SEARCH_OPERATORS, "owner", "=", "hdfs")
                .unwrap();
        assert!(owner.evaluate(&file("a", 1, "hdfs")));
    }

    #[test]
    fn display_lists_key_operator_and_operand() {
        let expression = SearchExpression::new("owner", "=", "hdfs").unwrap();
        assert_eq!(expression.to_string(), "owner,=,hdfs");
    }
}
