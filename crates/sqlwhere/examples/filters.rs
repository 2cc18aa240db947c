//! Building WHERE clauses from filter shapes
//!
//! Run with: cargo run --example filters -p sqlwhere

use sqlwhere::{Config, Dialect, Input, fields, values, where_, with_config};

fn main() {
    // A mapping: every key is ANDed.
    let plan = where_(fields! { "status" => "active", "amount__gte" => 1000 }, vec![]);
    println!("{}  {:?}", plan.sql(), plan.values());

    // A list: every item is ORed. Raw fragments carry their own values.
    let plan = where_(
        Input::any([
            Input::from(fields! { "name__icontains" => "go" }),
            Input::raw("created_at BETWEEN ? AND ?", values!["2024-01-01", "2024-12-31"]),
        ]),
        vec![],
    );
    println!("{}  {:?}", plan.sql(), plan.values());

    // Chaining, with a table prefix and PostgreSQL placeholders.
    let plan = with_config(Config::new().with_table("orders"))
        .and(fields! { "customer_id__in" => vec![1, 2, 3] }, vec![])
        .not(fields! { "deleted_at" => sqlwhere::Value::Null }, vec![])
        .or("priority > ?", values![5]);
    println!("WHERE {}", plan.to_numbered_sql());

    // A search box expanded by a custom condition.
    let cfg = Config::new()
        .with_dialect(Dialect::MySql)
        .with_custom_condition("q", |_, v, _| {
            Some(Input::from(vec![
                fields! { "title__icontains" => v.clone() },
                fields! { "body__icontains" => v.clone() },
            ]))
        });
    let plan = with_config(cfg).and(fields! { "q" => "rust", "published" => true }, vec![]);
    println!("{}  {:?}", plan.sql(), plan.values());

    // Strict mode reports unknown operators.
    let plan = with_config(Config::new().with_strict(true))
        .and(fields! { "age__older_than" => 30 }, vec![]);
    if let Some(err) = plan.error() {
        println!("error: {err}");
    }
}
