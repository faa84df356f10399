use crate::{is_safe_identifier, FilterExpression, OrderBy};
use heck::ToSnakeCase;
use itertools::Itertools;

/// Maps API field names onto storage field names before compilation.
pub trait FieldNameMapper {
    fn map_field(&self, field: &str) -> String;

    fn map_filter(&self, filter: &mut FilterExpression) {
        filter.map_fields(&mut |field| self.map_field(field));
    }

    fn map_order_by(&self, order_by: &mut [OrderBy]) {
        for entry in order_by.iter_mut() {
            entry.field = self.map_field(&entry.field);
        }
    }

    fn map_fields(&self, fields: &mut [String]) {
        for field in fields.iter_mut() {
            *field = self.map_field(field);
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityMapper;

impl FieldNameMapper for IdentityMapper {
    fn map_field(&self, field: &str) -> String {
        field.to_owned()
    }
}

/// `createdAt` → `created_at`, applied per dotted segment. Names outside
/// the identifier allow-list are left as they are, so the compilers still
/// reject them.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnakeCaseMapper;

impl FieldNameMapper for SnakeCaseMapper {
    fn map_field(&self, field: &str) -> String {
        if !is_safe_identifier(field) {
            return field.to_owned();
        }

        field
            .split('.')
            .map(|segment| segment.to_snake_case())
            .join(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FieldCompare;
    use pretty_assertions::assert_eq;

    #[test]
    fn snake_cases_each_segment() {
        assert_eq!("created_at", SnakeCaseMapper.map_field("createdAt"));
        assert_eq!("user_meta.home_address", SnakeCaseMapper.map_field("userMeta.homeAddress"));
        assert_eq!("id", SnakeCaseMapper.map_field("ID"));
    }

    #[test]
    fn unsafe_names_are_not_rewritten() {
        assert_eq!("name; DROP TABLE users", SnakeCaseMapper.map_field("name; DROP TABLE users"));
        assert_eq!("name, password", SnakeCaseMapper.map_field("name, password"));
        assert_eq!("userId ", SnakeCaseMapper.map_field("userId "));
    }

    #[test]
    fn maps_filters_and_orderings() {
        let mut filter = FilterExpression::and(vec!["firstName".equals("tom")]);
        let mut order_by = vec![OrderBy::desc("createdAt")];

        SnakeCaseMapper.map_filter(&mut filter);
        SnakeCaseMapper.map_order_by(&mut order_by);

        assert_eq!("first_name", filter.conditions[0].field);
        assert_eq!(vec![OrderBy::desc("created_at")], order_by);
    }
}
