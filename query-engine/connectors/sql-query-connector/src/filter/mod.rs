//! Compilation of the canonical filter tree into SQL predicates.

mod visitor;

pub use visitor::FilterVisitor;

use query_structure::QueryValue;

/// A rendered fragment and the parameters bound to its placeholders, in
/// order.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub sql: String,
    pub params: Vec<QueryValue>,
}

impl Predicate {
    pub fn new(sql: impl Into<String>, params: Vec<QueryValue>) -> Self {
        Self { sql: sql.into(), params }
    }
}

/// Tree structures and leaves for condition building.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionTree {
    /// `(left_expression AND right_expression)`
    And(Vec<ConditionTree>),
    /// `(left_expression OR right_expression)`
    Or(Vec<ConditionTree>),
    /// A single expression leaf
    Single(Predicate),
    /// A leaf that does nothing to the condition, `1=1`
    NoCondition,
    /// A leaf that cancels the condition, `1=0`
    NegativeCondition,
}

impl ConditionTree {
    pub fn is_empty(&self) -> bool {
        matches!(self, ConditionTree::NoCondition)
    }

    /// The entries a builder appends to its predicate list. The parts of a
    /// top-level AND become separate entries. Anything else is one entry.
    pub fn into_entries(self) -> Vec<Predicate> {
        match self {
            ConditionTree::NoCondition => Vec::new(),
            ConditionTree::And(parts) => parts.into_iter().map(|part| part.render(true)).collect(),
            ConditionTree::Or(parts) if parts.len() > 1 => vec![ConditionTree::Or(parts).render(true)],
            ConditionTree::Or(parts) => parts.into_iter().map(|part| part.render(true)).collect(),
            tree => vec![tree.render(false)],
        }
    }

    /// Renders the tree into one fragment. Nested groups of more than one
    /// part are parenthesized.
    pub fn render(self, nested: bool) -> Predicate {
        let (parts, connective) = match self {
            ConditionTree::Single(predicate) => return predicate,
            ConditionTree::NoCondition => return Predicate::new("1 = 1", Vec::new()),
            ConditionTree::NegativeCondition => return Predicate::new("1 = 0", Vec::new()),
            ConditionTree::And(parts) => (parts, " AND "),
            ConditionTree::Or(parts) => (parts, " OR "),
        };

        let wrap = nested && parts.len() > 1;
        let mut sql = Vec::with_capacity(parts.len());
        let mut params = Vec::new();

        for part in parts {
            let rendered = part.render(true);

            sql.push(rendered.sql);
            params.extend(rendered.params);
        }

        let sql = sql.join(connective);

        if wrap {
            Predicate::new(format!("({sql})"), params)
        } else {
            Predicate::new(sql, params)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn leaf(sql: &str, value: i64) -> ConditionTree {
        ConditionTree::Single(Predicate::new(sql, vec![QueryValue::Int(value)]))
    }

    #[test]
    fn top_level_and_parts_are_separate_entries() {
        let tree = ConditionTree::And(vec![
            leaf("a = ?", 1),
            ConditionTree::Or(vec![leaf("b = ?", 2), leaf("c = ?", 3)]),
        ]);

        let entries = tree.into_entries();

        assert_eq!(2, entries.len());
        assert_eq!("a = ?", entries[0].sql);
        assert_eq!("(b = ? OR c = ?)", entries[1].sql);
        assert_eq!(vec![QueryValue::Int(2), QueryValue::Int(3)], entries[1].params);
    }

    #[test]
    fn single_part_groups_are_not_wrapped() {
        let tree = ConditionTree::Or(vec![ConditionTree::And(vec![leaf("a = ?", 1)])]);
        assert_eq!(vec![Predicate::new("a = ?", vec![QueryValue::Int(1)])], tree.into_entries());
    }

    #[test]
    fn negative_condition() {
        assert_eq!("1 = 0", ConditionTree::NegativeCondition.render(false).sql);
    }
}
