use super::input::{Fields, Input};
use crate::value::Value;

/// A normalized condition tree node.
///
/// Negation is fixed at construction. It wraps the grouped result
/// (`NOT (...)`) rather than being pushed down into the children.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Children joined with AND.
    ///
    /// A `bare` group that is not negated is rendered without outer
    /// parentheses; this is only used for the top-level accumulator of a
    /// [`Plan`](crate::Plan).
    And {
        children: Vec<Input>,
        bare: bool,
        negated: bool,
    },
    /// Children joined with OR, always parenthesized.
    Or { children: Vec<Input>, negated: bool },
    /// `key => value` conditions joined with AND.
    Map { fields: Fields, negated: bool },
    /// A literal SQL fragment and the values for its `?` placeholders.
    Raw {
        sql: String,
        values: Vec<Value>,
        negated: bool,
    },
}

impl Node {
    /// An AND group.
    pub fn and<I: Into<Input>>(children: impl IntoIterator<Item = I>) -> Self {
        Node::And {
            children: children.into_iter().map(Into::into).collect(),
            bare: false,
            negated: false,
        }
    }

    /// An empty AND group rendered without outer parentheses.
    pub fn bare() -> Self {
        Node::And {
            children: Vec::new(),
            bare: true,
            negated: false,
        }
    }

    /// An OR group.
    pub fn or<I: Into<Input>>(children: impl IntoIterator<Item = I>) -> Self {
        Node::Or {
            children: children.into_iter().map(Into::into).collect(),
            negated: false,
        }
    }

    /// A mapping of `key => value` conditions.
    pub fn fields(fields: Fields) -> Self {
        Node::Map {
            fields,
            negated: false,
        }
    }

    /// A raw SQL fragment with its values.
    pub fn raw(sql: impl Into<String>, values: Vec<Value>) -> Self {
        Node::Raw {
            sql: sql.into(),
            values,
            negated: false,
        }
    }

    /// Return the node with its negation flag set.
    pub fn negated(mut self) -> Self {
        match &mut self {
            Node::And { negated, .. }
            | Node::Or { negated, .. }
            | Node::Map { negated, .. }
            | Node::Raw { negated, .. } => *negated = true,
        }
        self
    }

    pub fn is_negated(&self) -> bool {
        match self {
            Node::And { negated, .. }
            | Node::Or { negated, .. }
            | Node::Map { negated, .. }
            | Node::Raw { negated, .. } => *negated,
        }
    }

    /// Append a child to an AND group. Other variants are left untouched.
    pub(crate) fn push_child(&mut self, child: Node) {
        if let Node::And { children, .. } = self {
            children.push(Input::Node(child));
        }
    }

    /// Number of direct children (mapping entries for `Map`, 0 for `Raw`).
    pub fn len(&self) -> usize {
        match self {
            Node::And { children, .. } | Node::Or { children, .. } => children.len(),
            Node::Map { fields, .. } => fields.len(),
            Node::Raw { .. } => 0,
        }
    }

    /// Whether the node has nothing to render before any resolution happens.
    pub fn is_empty(&self) -> bool {
        match self {
            Node::Raw { sql, .. } => sql.is_empty(),
            _ => self.len() == 0,
        }
    }
}
