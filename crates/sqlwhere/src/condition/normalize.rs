use super::input::Input;
use super::node::Node;
use crate::clause::count_placeholders;
use crate::error::{WhereError, WhereResult};
use crate::value::Value;

/// Turn an input shape into a condition node.
///
/// `values` only binds a bare text fragment; a raw fragment given in list form
/// carries its own values. `negate` is applied to the node being created and is
/// ignored for an already built [`Input::Node`].
///
/// Lists are not normalized eagerly: their items are resolved one by one when
/// the resulting [`Node::Or`] is reduced, so one bad item can be skipped
/// without losing its siblings.
///
/// A raw fragment whose `?` count differs from the number of its values is
/// invalid.
pub fn normalize(input: Input, values: Vec<Value>, negate: bool) -> WhereResult<Node> {
    let node = match input {
        Input::Node(node) => return Ok(node),
        Input::Fields(fields) => Node::Map {
            fields,
            negated: negate,
        },
        Input::List(items) => match split_raw(items) {
            Ok((sql, values)) => return raw(sql, values, negate),
            Err(children) => Node::Or {
                children,
                negated: negate,
            },
        },
        Input::Text(sql) | Input::Value(Value::Text(sql)) => return raw(sql, values, negate),
        other => return Err(rejected(other, values)),
    };
    Ok(node)
}

fn raw(sql: String, values: Vec<Value>, negated: bool) -> WhereResult<Node> {
    if count_placeholders(&sql) != values.len() {
        return Err(rejected(sql, values));
    }
    Ok(Node::Raw {
        sql,
        values,
        negated,
    })
}

fn rejected(input: impl Into<Input>, values: Vec<Value>) -> WhereError {
    if values.is_empty() {
        WhereError::invalid(input)
    } else {
        WhereError::invalid_with(input, values)
    }
}

/// Split `[text, value, ...]` into a raw fragment and its values, or give the
/// items back when the list is not shaped like one.
fn split_raw(items: Vec<Input>) -> Result<(String, Vec<Value>), Vec<Input>> {
    let is_raw = items.len() >= 2
        && items[0].as_text().is_some()
        && items[1..].iter().all(Input::is_plain_value);
    if !is_raw {
        return Err(items);
    }

    let mut iter = items.into_iter();
    let sql = iter
        .next()
        .and_then(Input::into_value)
        .map(|v| match v {
            Value::Text(s) => s,
            other => other.to_string(),
        })
        .unwrap_or_default();
    let values = iter.filter_map(Input::into_value).collect();
    Ok((sql, values))
}
