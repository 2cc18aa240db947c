//! Caller-facing condition shapes.

use super::node::Node;
use crate::value::Value;
use std::collections::{BTreeMap, HashMap};

/// An ordered set of `key => value` conditions, joined with AND.
///
/// Keys are either a column (`"status"`) or a column and an operator name
/// joined by the configured separator (`"amount__gte"`). Insertion order is
/// kept; inserting an existing key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields {
    entries: Vec<(String, Value)>,
}

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a condition, builder style.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Add a condition, returning the previous value for the key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Fields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = Fields::new();
        for (k, v) in iter {
            fields.insert(k, v);
        }
        fields
    }
}

impl<K: Into<String>, V: Into<Value>> From<HashMap<K, V>> for Fields {
    fn from(map: HashMap<K, V>) -> Self {
        map.into_iter().collect()
    }
}

impl<K: Into<String>, V: Into<Value>> From<BTreeMap<K, V>> for Fields {
    fn from(map: BTreeMap<K, V>) -> Self {
        map.into_iter().collect()
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for Fields {
    fn from(map: serde_json::Map<String, serde_json::Value>) -> Self {
        map.into_iter().collect()
    }
}

impl IntoIterator for Fields {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Build [`Fields`] from `key => value` pairs.
///
/// ```ignore
/// let f = sqlwhere::fields! { "budget__gte" => 1000, "name" => "Gopher" };
/// ```
#[macro_export]
macro_rules! fields {
    () => {
        $crate::Fields::new()
    };
    ($($k:expr => $v:expr),+ $(,)?) => {{
        let mut fields = $crate::Fields::new();
        $( fields.insert($k, $v); )+
        fields
    }};
}

/// Any shape accepted as a condition.
///
/// Shapes are dispatched in this order:
///
/// 1. [`Input::Node`] is used as-is.
/// 2. [`Input::Fields`] becomes an AND-joined mapping.
/// 3. [`Input::List`] of two or more items whose first item is text and whose
///    other items are plain values is a raw fragment with its own values,
///    e.g. `["x > ? AND y < ?", 1, 2]`.
/// 4. Any other [`Input::List`] is OR-joined, each item a condition of its own.
/// 5. Text is a raw fragment bound to the separately supplied values.
/// 6. Other values are invalid.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Fields(Fields),
    List(Vec<Input>),
    Text(String),
    Node(Node),
    Value(Value),
}

impl Input {
    /// A raw fragment carrying its own values, in list form.
    pub fn raw(sql: impl Into<String>, values: Vec<Value>) -> Self {
        let mut items = Vec::with_capacity(values.len() + 1);
        items.push(Input::Text(sql.into()));
        items.extend(values.into_iter().map(Input::Value));
        Input::List(items)
    }

    /// An OR-joined list of conditions.
    pub fn any<I: Into<Input>>(items: impl IntoIterator<Item = I>) -> Self {
        Input::List(items.into_iter().map(Into::into).collect())
    }

    /// Borrow the text of a text-shaped input.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Input::Text(s) | Input::Value(Value::Text(s)) => Some(s),
            _ => None,
        }
    }

    /// Whether this input is a plain value (text or scalar) rather than a
    /// condition shape.
    pub(crate) fn is_plain_value(&self) -> bool {
        matches!(self, Input::Text(_) | Input::Value(_))
    }

    pub(crate) fn into_value(self) -> Option<Value> {
        match self {
            Input::Text(s) => Some(Value::Text(s)),
            Input::Value(v) => Some(v),
            _ => None,
        }
    }
}

impl From<Fields> for Input {
    fn from(f: Fields) -> Self {
        Input::Fields(f)
    }
}

impl From<Vec<Fields>> for Input {
    fn from(list: Vec<Fields>) -> Self {
        Input::List(list.into_iter().map(Input::Fields).collect())
    }
}

impl From<Vec<Input>> for Input {
    fn from(list: Vec<Input>) -> Self {
        Input::List(list)
    }
}

impl From<&str> for Input {
    fn from(s: &str) -> Self {
        Input::Text(s.to_string())
    }
}

impl From<String> for Input {
    fn from(s: String) -> Self {
        Input::Text(s)
    }
}

impl From<Node> for Input {
    fn from(n: Node) -> Self {
        Input::Node(n)
    }
}

impl From<Value> for Input {
    fn from(v: Value) -> Self {
        Input::Value(v)
    }
}

impl From<serde_json::Value> for Input {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Object(map) => Input::Fields(map.into()),
            serde_json::Value::Array(items) => {
                Input::List(items.into_iter().map(Input::from).collect())
            }
            serde_json::Value::String(s) => Input::Text(s),
            other => Input::Value(other.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_keep_insertion_order_and_replace_in_place() {
        let mut f = fields! { "b" => 1, "a" => 2 };
        assert_eq!(f.insert("b", 3), Some(Value::Int(1)));
        assert_eq!(f.keys().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(f.get("b"), Some(&Value::Int(3)));
        assert_eq!(f.remove("a"), Some(Value::Int(2)));
        assert_eq!(f.len(), 1);
    }

    #[test]
    fn raw_input_shape() {
        let input = Input::raw("x > ?", vec![Value::Int(1)]);
        assert_eq!(
            input,
            Input::List(vec![Input::Text("x > ?".into()), Input::Value(Value::Int(1))])
        );
    }

    #[test]
    fn json_input() {
        let input = Input::from(serde_json::json!([
            {"name": "Gopher"},
            ["date between ? and ?", "2019-04-17", "2019-04-18"]
        ]));
        let Input::List(items) = input else {
            panic!("expected list");
        };
        assert!(matches!(&items[0], Input::Fields(f) if f.get("name") == Some(&Value::from("Gopher"))));
        assert_eq!(items[1].clone(), Input::List(vec![
            Input::Text("date between ? and ?".into()),
            Input::Text("2019-04-17".into()),
            Input::Text("2019-04-18".into()),
        ]));
    }

    #[test]
    fn text_detection() {
        assert_eq!(Input::from("a").as_text(), Some("a"));
        assert_eq!(Input::Value(Value::from("b")).as_text(), Some("b"));
        assert_eq!(Input::Value(Value::Int(1)).as_text(), None);
    }
}
