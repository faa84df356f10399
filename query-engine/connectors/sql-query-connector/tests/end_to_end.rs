use expect_test::expect;
use pretty_assertions::assert_eq;
use query_structure::{
    pagination::{PagePaginator, TokenPaginator},
    Condition, FieldCompare, FilterExpression, Operator, OrderBy, Paginate, QueryValue, SkipPolicy,
};
use sql_query_connector::{ClickHouse, Mysql, Postgres, Select, Sqlite};

#[test]
fn single_equality() {
    let mut select = Select::<Sqlite>::from_table("users");
    select
        .filter(&FilterExpression::and(vec!["name".equals("tom")]), SkipPolicy::Lenient)
        .unwrap();

    let (sql, params) = select.where_clause();

    assert_eq!("name = ?", sql);
    assert_eq!(vec![QueryValue::from("tom")], params);
}

#[test]
fn json_array_in_list() {
    let mut select = Select::<Mysql>::from_table("users");
    select
        .filter(
            &FilterExpression::and(vec![Condition::new("status", Operator::In, r#"["a","b"]"#)]),
            SkipPolicy::Lenient,
        )
        .unwrap();

    let (sql, params) = select.where_clause();

    assert_eq!("status IN (?, ?)", sql);
    assert_eq!(vec![QueryValue::from("a"), QueryValue::from("b")], params);
}

#[test]
fn nested_or_group() {
    let filter = FilterExpression::and(vec!["A".equals(1)]).with_group(FilterExpression::or(vec!["B".equals(2), "C".equals(3)]));

    let mut select = Select::<Sqlite>::from_table("t");
    select.filter(&filter, SkipPolicy::Lenient).unwrap();

    let (sql, params) = select.where_clause();

    assert_eq!("A = ? AND (B = ? OR C = ?)", sql);
    assert_eq!(vec![QueryValue::from(1), QueryValue::from(2), QueryValue::from(3)], params);
}

#[test]
fn cursor_token_page() {
    let mut paginator = TokenPaginator::new();
    paginator.set_token("eyJsYXN0X2lkIjo0Mn0=").set_size(10);

    let mut select = Select::<Sqlite>::from_table("users");
    select.paginate(paginator.into_window()).unwrap();

    let (sql, params) = select.build().unwrap();

    assert_eq!("SELECT * FROM users WHERE id > ? LIMIT 10", sql);
    assert_eq!(vec![QueryValue::Int(42)], params);
}

#[test]
fn undecodable_tokens_fall_back_to_a_limit() {
    let mut paginator = TokenPaginator::new();
    paginator.set_token("not a token").set_size(10);

    let mut select = Select::<Sqlite>::from_table("users");
    select.paginate(paginator.into_window()).unwrap();

    assert_eq!(
        ("SELECT * FROM users LIMIT 10".to_string(), vec![]),
        select.build().unwrap()
    );
}

#[test]
fn top_level_or_is_one_entry() {
    let filter = FilterExpression::or(vec!["a".equals(1), "b".equals(2)]);

    let mut select = Select::<Postgres>::from_table("t");
    select
        .filter(&filter, SkipPolicy::Lenient)
        .unwrap()
        .so_that_raw("deleted_at IS NULL", vec![])
        .unwrap();

    assert_eq!(
        "SELECT * FROM t WHERE (a = $1 OR b = $2) AND deleted_at IS NULL",
        select.build().unwrap().0
    );
}

#[test]
fn postgres_statement() {
    let filter = FilterExpression::and(vec![
        "status".is_in(vec!["active", "trial"]),
        Condition::new("email", Operator::InsensitiveContains, "@example"),
        "meta.plan.tier".greater_than_or_equals(2),
        "created_at".between(vec!["2024-01-01", "2024-12-31"]),
    ])
    .with_group(FilterExpression::or(vec!["deleted_at".is_null(), "restored".equals(true)]));

    let mut paginator = PagePaginator::new();
    paginator.set_page(3).set_size(25);

    let mut select = Select::<Postgres>::from_table("accounts");
    select
        .columns(["id", "email"])
        .filter(&filter, SkipPolicy::Strict)
        .unwrap()
        .order_by(&[OrderBy::desc("created_at"), OrderBy::asc("id")], SkipPolicy::Strict)
        .unwrap()
        .paginate(paginator.into_window())
        .unwrap();

    let (sql, params) = select.build().unwrap();

    let expected = expect![[r#"SELECT id, email FROM accounts WHERE status IN ($1, $2) AND email ILIKE $3 ESCAPE '\' AND meta->'plan'->>'tier' >= $4 AND created_at BETWEEN $5 AND $6 AND (deleted_at IS NULL OR restored = $7) ORDER BY created_at DESC, id ASC LIMIT 25 OFFSET 50"#]];
    expected.assert_eq(&sql);
    assert_eq!(7, params.len());
    assert_eq!(QueryValue::from("%@example%"), params[2]);
}

#[test]
fn clickhouse_statement() {
    let filter = FilterExpression::and(vec![
        "event".not_in(Vec::<String>::new()),
        "payload.tags.0".equals("beta"),
        Condition::new("ts", Operator::Equals, "6").date_part(query_structure::DatePart::Month),
    ]);

    let mut select = Select::<ClickHouse>::from_table("events");
    select.filter(&filter, SkipPolicy::Lenient).unwrap().limit_by(1, ["user_id"]);

    let (sql, params) = select.build().unwrap();

    let expected = expect![[r#"SELECT * FROM events WHERE JSONExtractString(payload, 'tags', 1) = ? AND toMonth(ts) = ? LIMIT 1 BY user_id"#]];
    expected.assert_eq(&sql);
    assert_eq!(vec![QueryValue::from("beta"), QueryValue::Int(6)], params);
}

#[test]
fn skipped_conditions_do_not_break_the_rest() {
    let filter = FilterExpression::and(vec!["name; DROP TABLE users".equals(1), "age".less_than(30)]);

    let mut select = Select::<Mysql>::from_table("users");
    select.filter(&filter, SkipPolicy::Lenient).unwrap();

    assert_eq!(("age < ?".to_string(), vec![QueryValue::from(30)]), select.where_clause());
    assert!(select.filter(&filter, SkipPolicy::Strict).is_err());
}
