//! Normalization + reduction tests.

use super::*;
use crate::clause::count_placeholders;
use crate::dialect::Dialect;
use crate::{fields, values};
use chrono::NaiveDate;

fn build(input: impl Into<Input>) -> Built {
    normalize_and_reduce(input, Vec::new(), false, &Config::new())
}

fn build_with(input: impl Into<Input>, cfg: &Config) -> Built {
    normalize_and_reduce(input, Vec::new(), false, cfg)
}

fn strict() -> Config {
    Config::new().with_strict(true)
}

fn assert_parity(built: &Built) {
    let placeholders = count_placeholders(&built.sql);
    assert_eq!(
        placeholders,
        built.values.len(),
        "placeholder/value mismatch in {:?}",
        built.sql
    );
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ==================== Polarity ====================

#[test]
fn mapping_keys_join_with_and() {
    let built = build(fields! { "a" => 1, "b" => 2 });
    assert_eq!(built.sql, r#"("a" = ? AND "b" = ?)"#);
    assert_eq!(built.values, values![1, 2]);
    assert!(built.error.is_none());
}

#[test]
fn list_items_join_with_or() {
    let built = build(vec![fields! { "a" => 1 }, fields! { "b" => 2 }]);
    assert_eq!(built.sql, r#"(("a" = ?) OR ("b" = ?))"#);
    assert_eq!(built.values, values![1, 2]);
}

#[test]
fn nested_list_is_its_own_or_group() {
    let input = Input::any([
        Input::from(vec![fields! { "a" => 1 }, fields! { "b" => 2 }]),
        fields! { "c" => 3 }.into(),
    ]);
    let built = build(input);
    assert_eq!(built.sql, r#"((("a" = ?) OR ("b" = ?)) OR ("c" = ?))"#);
    assert_eq!(built.values, values![1, 2, 3]);
}

#[test]
fn explicit_and_group_is_parenthesized() {
    let node = Node::and([fields! { "a" => 1 }, fields! { "b" => 2 }]);
    assert_eq!(build(node).sql, r#"(("a" = ?) AND ("b" = ?))"#);
}

#[test]
fn bare_and_group_skips_outer_parentheses() {
    let mut node = Node::bare();
    node.push_child(Node::fields(fields! { "a" => 1 }));
    node.push_child(Node::raw("b > ?", values![2]));
    let built = build(node.clone());
    assert_eq!(built.sql, r#"("a" = ?) AND (b > ?)"#);

    let built = build(node.negated());
    assert_eq!(built.sql, r#"NOT (("a" = ?) AND (b > ?))"#);
}

// ==================== Negation ====================

#[test]
fn negation_wraps_instead_of_distributing() {
    let built = normalize_and_reduce(fields! { "a" => 1, "b" => 2 }, vec![], true, &Config::new());
    assert_eq!(built.sql, r#"NOT ("a" = ? AND "b" = ?)"#);
    assert_eq!(built.values, values![1, 2]);
}

#[test]
fn negated_raw_text() {
    let built = normalize_and_reduce("a = 1", vec![], true, &Config::new());
    assert_eq!(built.sql, "NOT (a = 1)");
}

#[test]
fn negated_list() {
    let built = normalize_and_reduce(
        vec![fields! { "a" => 1 }, fields! { "b" => 2 }],
        vec![],
        true,
        &Config::new(),
    );
    assert_eq!(built.sql, r#"NOT (("a" = ?) OR ("b" = ?))"#);
}

#[test]
fn prebuilt_node_keeps_its_own_negation() {
    let node = Node::raw("a = 1", vec![]);
    let built = normalize_and_reduce(node, vec![], true, &Config::new());
    assert_eq!(built.sql, "(a = 1)");
}

// ==================== Operator inference ====================

#[test]
fn null_infers_is_null() {
    let built = build(fields! { "deleted_at" => Value::Null });
    assert_eq!(built.sql, r#"("deleted_at" IS NULL)"#);
    assert!(built.values.is_empty());
}

#[test]
fn list_infers_in() {
    let built = build(fields! { "id" => vec![1, 2, 3] });
    assert_eq!(built.sql, r#"("id" IN (?))"#);
    assert_eq!(built.values, vec![Value::from(vec![1, 2, 3])]);
}

#[test]
fn scalar_infers_equality() {
    let built = build(fields! { "name" => "Gopher" });
    assert_eq!(built.sql, r#"("name" = ?)"#);
    assert_eq!(built.values, values!["Gopher"]);
}

#[test]
fn explicit_isnull_false() {
    let built = build(fields! { "deleted_at__isnull" => false });
    assert_eq!(built.sql, r#"("deleted_at" IS NOT NULL)"#);
}

// ==================== Raw fragments ====================

#[test]
fn raw_fragment_passthrough() {
    let built = build(Input::raw("x > ? AND y < ?", values![1, 2]));
    assert_eq!(built.sql, "(x > ? AND y < ?)");
    assert_eq!(built.values, values![1, 2]);
}

#[test]
fn raw_text_with_separate_values() {
    let built = normalize_and_reduce(
        "name = ? and budget >= ?",
        values!["Go", 2000],
        false,
        &Config::new(),
    );
    assert_eq!(built.sql, "(name = ? and budget >= ?)");
    assert_eq!(built.values, values!["Go", 2000]);
}

#[test]
fn mixed_list_of_mappings_and_raw() {
    let input = Input::any([
        Input::from(fields! { "name" => "Gopher" }),
        fields! { "budget__gte" => 3000 }.into(),
        Input::raw("date between ? and ?", values!["2019-04-17", "2019-04-18"]),
    ]);
    let built = build(input);
    assert_eq!(
        built.sql,
        r#"(("name" = ?) OR ("budget" >= ?) OR (date between ? and ?))"#
    );
    assert_eq!(built.values, values!["Gopher", 3000, "2019-04-17", "2019-04-18"]);
}

#[test]
fn json_input_uses_same_dispatch() {
    let input: Input = serde_json::json!([
        {"name": "Gopher"},
        ["date between ? and ?", "2019-04-17", "2019-04-18"]
    ])
    .into();
    let built = build(input);
    assert_eq!(built.sql, r#"(("name" = ?) OR (date between ? and ?))"#);
    assert_eq!(built.values, values!["Gopher", "2019-04-17", "2019-04-18"]);
}

#[test]
fn raw_fragment_with_wrong_value_count_is_dropped_when_lenient() {
    let input = Input::any([
        Input::raw("x > ? AND y < ?", values![1]),
        fields! { "a" => 1 }.into(),
    ]);
    let built = build(input);
    assert_eq!(built.sql, r#"(("a" = ?))"#);
    assert_eq!(built.values, values![1]);
    assert!(built.error.is_none());

    let built = normalize_and_reduce("a = ? AND b = ?", values![1], false, &Config::new());
    assert_eq!(built, Built::default());
}

#[test]
fn raw_fragment_with_wrong_value_count_fails_when_strict() {
    let built = normalize_and_reduce("a = ? AND b = ?", values![1], false, &strict());
    assert_eq!(
        built.error,
        Some(WhereError::invalid_with("a = ? AND b = ?", values![1]))
    );
    assert_eq!(built.sql, "");

    let built = build_with(
        Input::any([
            Input::from(fields! { "a" => 1 }),
            Input::raw("x > ?", values![1, 2]),
        ]),
        &strict(),
    );
    assert_eq!(built.error, Some(WhereError::invalid_with("x > ?", values![1, 2])));
    assert_eq!(built.sql, r#"(("a" = ?))"#);
    assert_parity(&built);
}

#[test]
fn hook_raw_output_is_checked_too() {
    let cfg = Config::new().with_custom_condition("q", |_, v, _| {
        Some(Input::raw("a = ? OR b = ?", vec![v.clone()]))
    });
    let built = build_with(fields! { "q" => 1, "c" => 2 }, &cfg);
    assert_eq!(built.sql, r#"("c" = ?)"#);
}

// ==================== Strict vs lenient ====================

#[test]
fn unknown_operator_is_dropped_when_lenient() {
    let built = build(fields! { "a__nope" => 1, "b" => 2 });
    assert_eq!(built.sql, r#"("b" = ?)"#);
    assert_eq!(built.values, values![2]);
    assert!(built.error.is_none());
}

#[test]
fn unknown_operator_fails_when_strict() {
    let built = build_with(fields! { "a__nope" => 1, "b" => 2 }, &strict());
    assert_eq!(
        built.error,
        Some(WhereError::invalid_with("a__nope", values![1]))
    );
    assert_eq!(built.sql, "");
    assert!(built.values.is_empty());
}

#[test]
fn strict_failure_keeps_earlier_siblings() {
    let built = build_with(fields! { "b" => 2, "a__nope" => 1, "c" => 3 }, &strict());
    assert!(built.error.is_some());
    assert_eq!(built.sql, r#"("b" = ?)"#);
    assert_eq!(built.values, values![2]);
    assert_parity(&built);
}

#[test]
fn invalid_list_item_lenient_and_strict() {
    let input = Input::any([
        Input::from(fields! { "a" => 1 }),
        Value::Int(5).into(),
        fields! { "b" => 2 }.into(),
    ]);

    let built = build(input.clone());
    assert_eq!(built.sql, r#"(("a" = ?) OR ("b" = ?))"#);
    assert!(built.error.is_none());

    let built = build_with(input, &strict());
    assert_eq!(built.error, Some(WhereError::invalid(Value::Int(5))));
    assert_eq!(built.sql, r#"(("a" = ?))"#);
    assert_parity(&built);
}

#[test]
fn invalid_top_level_input() {
    let built = build(Value::Int(1));
    assert_eq!(built, Built::default());

    let built = build_with(Value::Int(1), &strict());
    assert!(built.error.as_ref().is_some_and(WhereError::is_invalid_condition));
    assert!(built.into_result().is_err());
}

// ==================== Scenarios ====================

#[test]
fn amount_and_status() {
    let cfg = Config::new().with_sorted_keys(true);
    let built = build_with(fields! { "status" => "active", "amount__gte" => 1000 }, &cfg);
    assert_eq!(built.sql, r#"("amount" >= ? AND "status" = ?)"#);
    assert_eq!(built.values, values![1000, "active"]);

    // Insertion order when sorting is off.
    let built = build(fields! { "status" => "active", "amount__gte" => 1000 });
    assert_eq!(built.sql, r#"("status" = ? AND "amount" >= ?)"#);
    assert_eq!(built.values, values!["active", 1000]);
}

#[test]
fn range_with_dates() {
    let built = build(fields! { "created__between" => vec![date(2019, 4, 17), date(2019, 4, 18)] });
    assert_eq!(built.sql, r#"("created" BETWEEN ? AND ?)"#);
    assert_eq!(built.values, values!["2019-04-17", "2019-04-18"]);
}

#[test]
fn range_with_too_few_endpoints_contributes_nothing() {
    let built = build(fields! { "created__between" => vec![date(2019, 4, 17)] });
    assert_eq!(built, Built::default());

    let built = build(fields! { "created__between" => vec![date(2019, 4, 17)], "a" => 1 });
    assert_eq!(built.sql, r#"("a" = ?)"#);
}

#[test]
fn date_between_truncates() {
    let from = date(2019, 4, 17).and_hms_opt(10, 0, 0).unwrap();
    let to = date(2019, 4, 18).and_hms_opt(23, 0, 0).unwrap();
    let built = build(fields! { "created__datebetween" => Value::List(vec![from.into(), to.into()]) });
    assert_eq!(built.sql, r#"(DATE("created") BETWEEN ? AND ?)"#);
    assert_eq!(built.values, values!["2019-04-17", "2019-04-18"]);
}

// ==================== Empty pruning ====================

#[test]
fn empty_inputs_reduce_to_nothing() {
    assert_eq!(build(Fields::new()), Built::default());
    assert_eq!(build(Input::List(vec![])), Built::default());
    assert_eq!(build(""), Built::default());
    assert_eq!(build(Node::bare()), Built::default());
}

#[test]
fn deeply_nested_empties_are_pruned() {
    let inner = Node::or([
        Input::from(Fields::new()),
        Input::List(vec![]),
        Node::and(Vec::<Input>::new()).negated().into(),
    ]);
    let tree = Node::and([
        Input::from(inner.negated()),
        Input::List(vec![Input::List(vec![Input::from(Fields::new())])]),
        Node::raw("", values![1]).into(),
        fields! { "x__between" => vec![1] }.into(),
    ])
    .negated();
    assert_eq!(build(tree), Built::default());
}

#[test]
fn empty_siblings_leave_no_stray_operators() {
    let input = Input::any([
        Input::from(Fields::new()),
        fields! { "a" => 1 }.into(),
        Input::List(vec![]),
    ]);
    let built = build(input);
    assert_eq!(built.sql, r#"(("a" = ?))"#);
}

// ==================== Hooks ====================

fn search_config() -> Config {
    Config::new()
        .with_custom_condition("search", |_, value, _| {
            let term = value.clone();
            Some(Input::from(vec![
                fields! { "name__icontains" => term.clone() },
                fields! { "email__icontains" => term },
            ]))
        })
        .with_custom_condition("skip", |_, _, _| None)
        .with_custom_condition("broken", |_, value, _| Some(Input::Value(value.clone())))
}

#[test]
fn custom_condition_output_is_normalized() {
    let built = build_with(fields! { "active" => true, "search" => "bob" }, &search_config());
    assert_eq!(
        built.sql,
        r#"("active" = ? AND ((LOWER("name") LIKE LOWER(?)) OR (LOWER("email") LIKE LOWER(?))))"#
    );
    assert_eq!(built.values, values![true, "%bob%", "%bob%"]);
}

#[test]
fn custom_condition_none_drops_key() {
    let built = build_with(fields! { "skip" => 1, "a" => 1 }, &search_config());
    assert_eq!(built.sql, r#"("a" = ?)"#);
}

#[test]
fn custom_condition_invalid_output() {
    let cfg = search_config();
    let built = build_with(fields! { "broken" => 7, "a" => 1 }, &cfg);
    assert_eq!(built.sql, r#"("a" = ?)"#);

    let built = build_with(fields! { "broken" => 7, "a" => 1 }, &cfg.with_strict(true));
    assert_eq!(built.error, Some(WhereError::invalid(Value::Int(7))));
}

#[test]
fn custom_condition_sees_config() {
    let cfg = Config::new()
        .with_table("t")
        .with_custom_condition("q", |_, v, cfg| {
            Some(Input::raw(
                format!("{} = ?", crate::ident::resolve_column("x", cfg)),
                vec![v.clone()],
            ))
        });
    let built = build_with(fields! { "q" => 1 }, &cfg);
    assert_eq!(built.sql, r#"(("t"."x" = ?))"#);
}

// ==================== Resolution context ====================

#[test]
fn table_and_aliases() {
    let cfg = Config::new()
        .with_table("users")
        .with_column_alias("bname", "bar.name");
    let built = build_with(fields! { "name" => "a", "bname" => "b" }, &cfg);
    assert_eq!(built.sql, r#"("users"."name" = ? AND "bar"."name" = ?)"#);
}

#[test]
fn mysql_quoting() {
    let cfg = Config::new().with_dialect(Dialect::MySql);
    let built = build_with(fields! { "a__lte" => 1 }, &cfg);
    assert_eq!(built.sql, "(`a` <= ?)");
}

#[test]
fn custom_separator() {
    let cfg = Config::new().with_separator("::");
    let built = build_with(fields! { "age::gt" => 3, "a__b" => 1 }, &cfg);
    assert_eq!(built.sql, r#"("age" > ? AND "a__b" = ?)"#);
}

#[test]
fn extra_key_segments_are_ignored() {
    let at = date(2019, 4, 17).and_hms_opt(10, 0, 0).unwrap();
    let built = build(fields! { "created__date__x" => at, "age__gt__or__lt" => 3 });
    assert_eq!(built.sql, r#"(DATE("created") = ? AND "age" > ?)"#);
    assert_eq!(built.values, values!["2019-04-17", 3]);
}

#[test]
fn question_mark_in_key_keeps_parity() {
    let built = build(fields! { "a?b" => 1, "c" => 2 });
    assert_eq!(built.sql, r#"("a?b" = ? AND "c" = ?)"#);
    assert_parity(&built);
}

#[test]
fn custom_operator_in_registry() {
    let ops = crate::OperatorRegistry::builtin().with("regex", crate::Operator::symbol("~"));
    let cfg = Config::new().with_operators(ops);
    let built = build_with(fields! { "name__regex" => "^a" }, &cfg);
    assert_eq!(built.sql, r#"("name" ~ ?)"#);
}

// ==================== Invariants ====================

#[test]
fn placeholder_parity_across_shapes() {
    let cfg = search_config().with_table("t");
    let inputs: Vec<Input> = vec![
        fields! { "a" => 1, "b__in" => vec![1, 2], "c" => Value::Null, "d__between" => vec![1, 9] }.into(),
        fields! { "search" => "x", "e__istartswith" => "y", "f__isnull" => false }.into(),
        Input::any([
            Input::raw("x = ? OR y = ?", values![1, 2]),
            fields! { "g__date" => date(2020, 1, 1) }.into(),
            Input::from("plain = 1"),
        ]),
        Node::and([Input::from(fields! { "h" => 1 }), Node::raw("", vec![]).into()])
            .negated()
            .into(),
    ];
    for input in inputs {
        let built = build_with(input, &cfg);
        assert!(built.error.is_none());
        assert_parity(&built);
    }
}

#[test]
fn config_and_trees_are_thread_safe() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Config>();
    assert_send_sync::<Node>();
    assert_send_sync::<Input>();

    let cfg = search_config();
    let tree = Input::from(vec![fields! { "a" => 1 }, fields! { "search" => "q" }]);
    let (cfg, tree) = (&cfg, &tree);
    std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| s.spawn(move || build_with(tree.clone(), cfg)))
            .collect();
        for h in handles {
            let built = h.join().unwrap();
            assert_eq!(built.values.len(), 3);
        }
    });
}
