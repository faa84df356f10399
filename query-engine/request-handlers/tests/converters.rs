use expect_test::expect;
use indoc::indoc;
use pretty_assertions::assert_eq;
use query_structure::{Condition, DatePart, FieldCompare, FilterExpression, Operator, QueryValue};
use request_handlers::{expression, map_syntax, structured, ParseError};

fn nested_expected() -> FilterExpression {
    FilterExpression::and(vec!["a".equals(1)]).with_group(FilterExpression::or(vec!["b".equals(2), "c".equals(3)]))
}

#[test]
fn all_surfaces_converge_to_the_same_tree() {
    let from_expression = expression::parse("a = 1 AND (b = 2 OR c = 3)").unwrap();
    let from_map = map_syntax::parse(Some(r#"{"a": 1}"#), Some(r#"{"b": 2, "c__eq": 3}"#)).unwrap();
    let from_json = structured::from_json(indoc! {r#"
        {
            "type": "AND",
            "conditions": [{ "field": "a", "op": "=", "value": 1 }],
            "groups": [{
                "type": "OR",
                "conditions": [
                    { "field": "b", "op": "eq", "value": 2 },
                    { "field": "c", "op": "equals", "value": 3 }
                ]
            }]
        }
    "#})
    .unwrap();

    assert_eq!(nested_expected(), from_expression);
    assert_eq!(nested_expected(), from_map);
    assert_eq!(nested_expected(), from_json);
}

#[test]
fn same_connective_chains_are_flattened() {
    let filter = expression::parse("a = 1 AND b = 2 AND (c = 3 AND d = 4)").unwrap();

    assert_eq!(
        FilterExpression::and(vec!["a".equals(1), "b".equals(2), "c".equals(3), "d".equals(4)]),
        filter
    );
}

#[test]
fn infix_operators() {
    let filter = expression::parse(indoc! {r#"
        status IN ('a', 'b')
        && kind NOT IN (1, 2)
        && age BETWEEN 18 AND 65
        && deleted_at IS NULL
        && meta.address.city <> "Berlin"
        && score >= -1.5
    "#})
    .unwrap();

    let expected = FilterExpression::and(vec![
        "status".is_in(vec!["a", "b"]),
        "kind".not_in(vec![1, 2]),
        "age".between(vec![18, 65]),
        "deleted_at".is_null(),
        "meta".not_equals("Berlin").json_path("address.city"),
        "score".greater_than_or_equals(-1.5),
    ]);

    assert_eq!(expected, filter);
}

#[test]
fn function_call_comparisons() {
    let filter = expression::parse("or(icontains(name, 'tom'), startswith(email, \"tom@\"), isnull(phone))").unwrap();

    let expected = FilterExpression::or(vec![
        "name".insensitive_contains("tom"),
        "email".text_starts_with("tom@"),
        "phone".is_null(),
    ]);

    assert_eq!(expected, filter);
}

#[test]
fn date_part_calls_on_the_left() {
    let filter = expression::parse("year(created_at) = 2020 AND weekday(created_at) IN (6, 7)").unwrap();

    let expected = FilterExpression::and(vec![
        "created_at".equals(2020).date_part(DatePart::Year),
        "created_at".is_in(vec![6, 7]).date_part(DatePart::WeekDay),
    ]);

    assert_eq!(expected, filter);
}

#[test]
fn literals() {
    let filter = expression::parse(r#"a = 'it\'s' OR b = true OR c = null OR d = 10 OR e = "x\ty""#).unwrap();

    let expected = FilterExpression::or(vec![
        "a".equals("it's"),
        "b".equals(true),
        Condition::new("c", Operator::Equals, QueryValue::Null),
        "d".equals(10),
        "e".equals("x\ty"),
    ]);

    assert_eq!(expected, filter);
}

#[test]
fn expression_tree_rendering() {
    let tree = expression::parse_tree("(a = 1 OR b LIKE '%x%') AND c.d NOT IN ('y')").unwrap();

    let expected = expect![[r#"and(or(eq(a, 1), CONTAINS(b, "x")), nin(c.d, "y"))"#]];
    expected.assert_eq(&tree.to_string());
}

#[test]
fn syntax_errors_carry_a_position() {
    let err = expression::parse("a = 1 AND (b = 2").unwrap_err();

    match err {
        ParseError::InvalidExpression(message) => assert!(message.contains("1:"), "{message}"),
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn non_field_left_sides_are_unsupported() {
    assert!(matches!(expression::parse("1 = a"), Err(ParseError::Unsupported(_))));
    assert!(matches!(expression::parse("a = b"), Err(ParseError::Unsupported(_))));
    assert!(matches!(expression::parse("frob(a, 1)"), Err(ParseError::Unsupported(_))));
}

#[test]
fn map_or_payload_per_object() {
    let filter = map_syntax::parse(
        Some(r#"[{"a": 1}, {"b__in": "x,y"}]"#),
        Some(r#"[{"c": 1, "d": 2}, {"e__isnull": true}]"#),
    )
    .unwrap();

    let expected = FilterExpression::and(vec!["a".equals(1), Condition::new("b", Operator::In, "x,y")])
        .with_group(FilterExpression::or(vec!["c".equals(1), "d".equals(2)]))
        .with_group(FilterExpression::or(vec!["e".is_null()]));

    assert_eq!(expected, filter);
}
