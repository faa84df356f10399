use super::Condition;
use crate::Operator;
use query_value::QueryValue;

/// Comparing methods building conditions from a field name. The pattern
/// methods carry a prefix so they never collide with `str`'s own methods.
///
/// ```
/// # use query_structure::*;
/// let cond = "name".equals("tom");
///
/// assert_eq!("name", cond.field);
/// assert_eq!(Operator::Equals, cond.op);
/// ```
pub trait FieldCompare {
    fn equals<T>(self, val: T) -> Condition
    where
        T: Into<QueryValue>;

    fn not_equals<T>(self, val: T) -> Condition
    where
        T: Into<QueryValue>;

    fn greater_than<T>(self, val: T) -> Condition
    where
        T: Into<QueryValue>;

    fn greater_than_or_equals<T>(self, val: T) -> Condition
    where
        T: Into<QueryValue>;

    fn less_than<T>(self, val: T) -> Condition
    where
        T: Into<QueryValue>;

    fn less_than_or_equals<T>(self, val: T) -> Condition
    where
        T: Into<QueryValue>;

    fn is_in<T>(self, vals: Vec<T>) -> Condition
    where
        T: Into<QueryValue>;

    fn not_in<T>(self, vals: Vec<T>) -> Condition
    where
        T: Into<QueryValue>;

    fn between<T>(self, vals: Vec<T>) -> Condition
    where
        T: Into<QueryValue>;

    fn text_contains<T>(self, val: T) -> Condition
    where
        T: Into<QueryValue>;

    fn insensitive_contains<T>(self, val: T) -> Condition
    where
        T: Into<QueryValue>;

    fn text_starts_with<T>(self, val: T) -> Condition
    where
        T: Into<QueryValue>;

    fn text_ends_with<T>(self, val: T) -> Condition
    where
        T: Into<QueryValue>;

    fn regex_matches<T>(self, pattern: T) -> Condition
    where
        T: Into<QueryValue>;

    fn is_null(self) -> Condition;

    fn is_not_null(self) -> Condition;
}

impl<S> FieldCompare for S
where
    S: Into<String>,
{
    fn equals<T>(self, val: T) -> Condition
    where
        T: Into<QueryValue>,
    {
        Condition::new(self, Operator::Equals, val)
    }

    fn not_equals<T>(self, val: T) -> Condition
    where
        T: Into<QueryValue>,
    {
        Condition::new(self, Operator::NotEquals, val)
    }

    fn greater_than<T>(self, val: T) -> Condition
    where
        T: Into<QueryValue>,
    {
        Condition::new(self, Operator::GreaterThan, val)
    }

    fn greater_than_or_equals<T>(self, val: T) -> Condition
    where
        T: Into<QueryValue>,
    {
        Condition::new(self, Operator::GreaterThanOrEquals, val)
    }

    fn less_than<T>(self, val: T) -> Condition
    where
        T: Into<QueryValue>,
    {
        Condition::new(self, Operator::LessThan, val)
    }

    fn less_than_or_equals<T>(self, val: T) -> Condition
    where
        T: Into<QueryValue>,
    {
        Condition::new(self, Operator::LessThanOrEquals, val)
    }

    fn is_in<T>(self, vals: Vec<T>) -> Condition
    where
        T: Into<QueryValue>,
    {
        Condition::with_values(self, Operator::In, vals)
    }

    fn not_in<T>(self, vals: Vec<T>) -> Condition
    where
        T: Into<QueryValue>,
    {
        Condition::with_values(self, Operator::NotIn, vals)
    }

    fn between<T>(self, vals: Vec<T>) -> Condition
    where
        T: Into<QueryValue>,
    {
        Condition::with_values(self, Operator::Between, vals)
    }

    fn text_contains<T>(self, val: T) -> Condition
    where
        T: Into<QueryValue>,
    {
        Condition::new(self, Operator::Contains, val)
    }

    fn insensitive_contains<T>(self, val: T) -> Condition
    where
        T: Into<QueryValue>,
    {
        Condition::new(self, Operator::InsensitiveContains, val)
    }

    fn text_starts_with<T>(self, val: T) -> Condition
    where
        T: Into<QueryValue>,
    {
        Condition::new(self, Operator::StartsWith, val)
    }

    fn text_ends_with<T>(self, val: T) -> Condition
    where
        T: Into<QueryValue>,
    {
        Condition::new(self, Operator::EndsWith, val)
    }

    fn regex_matches<T>(self, pattern: T) -> Condition
    where
        T: Into<QueryValue>,
    {
        Condition::new(self, Operator::Regexp, pattern)
    }

    fn is_null(self) -> Condition {
        Condition::nullary(self, Operator::IsNull)
    }

    fn is_not_null(self) -> Condition {
        Condition::nullary(self, Operator::IsNotNull)
    }
}
