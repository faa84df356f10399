mod compare;
mod condition;

pub use compare::*;
pub use condition::*;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Boolean connective of a filter node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "&'static str")]
pub enum FilterType {
    /// A no-op node, never compiled.
    #[default]
    Unspecified,
    And,
    Or,
}

impl FilterType {
    pub fn as_str(self) -> &'static str {
        match self {
            FilterType::Unspecified => "UNSPECIFIED",
            FilterType::And => "AND",
            FilterType::Or => "OR",
        }
    }
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for FilterType {
    fn from(s: String) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "AND" | "&&" => FilterType::And,
            "OR" | "||" => FilterType::Or,
            _ => FilterType::Unspecified,
        }
    }
}

impl From<FilterType> for &'static str {
    fn from(t: FilterType) -> Self {
        t.as_str()
    }
}

/// The canonical, dialect independent filter tree every input syntax
/// converges to.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FilterExpression {
    #[serde(rename = "type", default)]
    pub kind: FilterType,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub groups: Vec<FilterExpression>,
}

impl FilterExpression {
    pub fn and(conditions: Vec<Condition>) -> Self {
        Self {
            kind: FilterType::And,
            conditions,
            groups: Vec::new(),
        }
    }

    pub fn or(conditions: Vec<Condition>) -> Self {
        Self {
            kind: FilterType::Or,
            conditions,
            groups: Vec::new(),
        }
    }

    pub fn with_group(mut self, group: FilterExpression) -> Self {
        self.groups.push(group);
        self
    }

    pub fn push_condition(&mut self, condition: Condition) {
        self.conditions.push(condition);
    }

    pub fn push_group(&mut self, group: FilterExpression) {
        self.groups.push(group);
    }

    /// Unspecified nodes and nodes without any conditions in their subtree
    /// compile to nothing.
    pub fn is_empty(&self) -> bool {
        self.kind == FilterType::Unspecified
            || (self.conditions.is_empty() && self.groups.iter().all(FilterExpression::is_empty))
    }

    /// Depth-first iteration over every condition in the tree, including
    /// conditions of unspecified nodes.
    pub fn conditions_recursive(&self) -> Box<dyn Iterator<Item = &Condition> + '_> {
        Box::new(
            self.conditions
                .iter()
                .chain(self.groups.iter().flat_map(FilterExpression::conditions_recursive)),
        )
    }

    /// Rewrites every field name in the tree.
    pub fn map_fields(&mut self, f: &mut dyn FnMut(&str) -> String) {
        for condition in self.conditions.iter_mut() {
            condition.field = f(&condition.field);
        }

        for group in self.groups.iter_mut() {
            group.map_fields(f);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use query_value::QueryValue;

    #[test]
    fn deserializes_the_canonical_shape() {
        let expr: FilterExpression = serde_json::from_str(
            r#"{
                "type": "and",
                "conditions": [{ "field": "A", "op": "eq", "value": 1 }],
                "groups": [{
                    "type": "OR",
                    "conditions": [
                        { "field": "B", "op": "=", "value": 2 },
                        { "field": "meta", "op": "icontains", "value": "x", "jsonPath": "a.b" }
                    ]
                }]
            }"#,
        )
        .unwrap();

        let expected = FilterExpression::and(vec!["A".equals(1)]).with_group(FilterExpression::or(vec![
            "B".equals(2),
            "meta".insensitive_contains("x").json_path("a.b"),
        ]));

        assert_eq!(expected, expr);
    }

    #[test]
    fn missing_type_is_unspecified() {
        let expr: FilterExpression = serde_json::from_str(r#"{ "conditions": [] }"#).unwrap();

        assert_eq!(FilterType::Unspecified, expr.kind);
        assert!(expr.is_empty());
    }

    #[test]
    fn emptiness_looks_through_groups() {
        let expr = FilterExpression::and(vec![]).with_group(FilterExpression::or(vec![]));
        assert!(expr.is_empty());

        let expr = FilterExpression::and(vec![]).with_group(FilterExpression::or(vec!["a".is_null()]));
        assert!(!expr.is_empty());
    }

    #[test]
    fn map_fields_walks_the_tree() {
        let mut expr = FilterExpression::and(vec!["firstName".equals("tom")])
            .with_group(FilterExpression::or(vec!["lastName".equals(QueryValue::Null)]));

        expr.map_fields(&mut |f| f.to_uppercase());

        let fields: Vec<_> = expr.conditions_recursive().map(|c| c.field.as_str()).collect();
        assert_eq!(vec!["FIRSTNAME", "LASTNAME"], fields);
    }
}
