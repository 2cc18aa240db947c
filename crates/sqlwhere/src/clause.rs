//! Built SQL fragments and their bound values.

use crate::value::Value;
use tokio_postgres::types::ToSql;

/// A SQL fragment with positional `?` placeholders and the values bound to
/// them, index for index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Clause {
    pub sql: String,
    pub values: Vec<Value>,
}

impl Clause {
    /// Create a clause from SQL and its values.
    pub fn new(sql: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            values,
        }
    }

    /// The empty clause: contributes nothing to any join.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }

    /// Wrap in parentheses and optionally prefix with `NOT`. Empty stays empty.
    pub(crate) fn grouped(mut self, negated: bool) -> Self {
        if self.sql.is_empty() {
            return self;
        }
        self.sql = if negated {
            format!("NOT ({})", self.sql)
        } else {
            format!("({})", self.sql)
        };
        self
    }

    /// The clause with PostgreSQL `$n` placeholders, numbered from
    /// `offset + 1`, and the parameters to bind to them.
    ///
    /// See [`number_placeholders`].
    pub fn numbered(&self, offset: usize) -> Clause {
        number_placeholders(&self.sql, &self.values, offset)
    }

    /// Render the clause with PostgreSQL `$n` placeholders instead of `?`.
    pub fn to_numbered_sql(&self) -> String {
        self.numbered(0).sql
    }

    /// Get parameter references for tokio-postgres.
    ///
    /// Call this on the [`numbered`](Clause::numbered) clause when the values
    /// contain lists.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.values
            .iter()
            .map(|v| v as &(dyn ToSql + Sync))
            .collect()
    }
}

/// Fragments joined with a boolean keyword, skipping empty ones.
#[derive(Debug, Default)]
pub(crate) struct Joiner {
    parts: Vec<String>,
    values: Vec<Value>,
}

impl Joiner {
    pub(crate) fn push(&mut self, clause: Clause) {
        if clause.is_empty() {
            return;
        }
        self.parts.push(clause.sql);
        self.values.extend(clause.values);
    }

    pub(crate) fn join(self, sep: &str) -> Clause {
        Clause {
            sql: self.parts.join(sep),
            values: self.values,
        }
    }
}

const QUOTES: [char; 3] = ['"', '`', '\''];

/// Count the `?` placeholders outside quoted identifiers and string literals.
pub fn count_placeholders(sql: &str) -> usize {
    let mut quote: Option<char> = None;
    let mut count = 0;
    for ch in sql.chars() {
        match quote {
            Some(q) if ch == q => quote = None,
            Some(_) => {}
            None if QUOTES.contains(&ch) => quote = Some(ch),
            None if ch == '?' => count += 1,
            None => {}
        }
    }
    count
}

fn push_param(out: &mut String, idx: usize) {
    out.push('$');
    out.push_str(&idx.to_string());
}

/// Replace `?` placeholders with `$n`, numbering from `offset + 1`.
///
/// A `?` inside a quoted span (`"..."`, `` `...` ``, `'...'`) is not a
/// placeholder, and `?`s beyond the number of values are left as they are.
/// A list bound to a parenthesized `(?)` is expanded into one parameter per
/// item, `IN ($1, $2, $3)`; an empty list renders `(NULL)`. Other lists are
/// bound as a single array parameter.
pub fn number_placeholders(sql: &str, values: &[Value], offset: usize) -> Clause {
    let chars: Vec<char> = sql.chars().collect();
    let mut out = String::with_capacity(sql.len() + 8);
    let mut params = Vec::with_capacity(values.len());
    let mut pending = values.iter();
    let mut quote: Option<char> = None;

    for (i, &ch) in chars.iter().enumerate() {
        if let Some(q) = quote {
            if ch == q {
                quote = None;
            }
            out.push(ch);
            continue;
        }
        if QUOTES.contains(&ch) {
            quote = Some(ch);
            out.push(ch);
            continue;
        }
        let value = if ch == '?' { pending.next() } else { None };
        let Some(value) = value else {
            out.push(ch);
            continue;
        };

        let parenthesized = i > 0 && chars[i - 1] == '(' && chars.get(i + 1) == Some(&')');
        match value {
            Value::List(items) if parenthesized => {
                if items.is_empty() {
                    out.push_str("NULL");
                }
                for (n, item) in items.iter().enumerate() {
                    if n > 0 {
                        out.push_str(", ");
                    }
                    params.push(item.clone());
                    push_param(&mut out, offset + params.len());
                }
            }
            other => {
                params.push(other.clone());
                push_param(&mut out, offset + params.len());
            }
        }
    }
    Clause::new(out, params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grouped_wraps_and_negates() {
        let c = Clause::new("a = ?", vec![Value::Int(1)]);
        assert_eq!(c.clone().grouped(false).sql, "(a = ?)");
        assert_eq!(c.grouped(true).sql, "NOT (a = ?)");
    }

    #[test]
    fn grouped_empty_stays_empty() {
        assert_eq!(Clause::empty().grouped(true), Clause::empty());
    }

    #[test]
    fn joiner_skips_empty_fragments() {
        let mut j = Joiner::default();
        j.push(Clause::empty());
        j.push(Clause::new("a = ?", vec![Value::Int(1)]));
        j.push(Clause::empty());
        j.push(Clause::new("b IS NULL", vec![]));
        let c = j.join(" OR ");
        assert_eq!(c.sql, "a = ? OR b IS NULL");
        assert_eq!(c.values, vec![Value::Int(1)]);
    }

    #[test]
    fn numbered_placeholders() {
        let c = Clause::new("(a = ? AND b > ?)", vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(c.to_numbered_sql(), "(a = $1 AND b > $2)");
        assert_eq!(c.numbered(3).sql, "(a = $4 AND b > $5)");
        assert_eq!(c.params_ref().len(), 2);
    }

    #[test]
    fn numbering_skips_quoted_spans() {
        let c = Clause::new(
            r#"("a?b" = ? AND `c?` = ? AND d <> '?')"#,
            vec![Value::Int(1), Value::Int(2)],
        );
        assert_eq!(count_placeholders(&c.sql), 2);
        let n = c.numbered(0);
        assert_eq!(n.sql, r#"("a?b" = $1 AND `c?` = $2 AND d <> '?')"#);
        assert_eq!(n.values, vec![Value::Int(1), Value::Int(2)]);
    }

    #[test]
    fn numbering_stops_at_value_count() {
        let n = number_placeholders("a = ? AND b = ?", &[Value::Int(1)], 0);
        assert_eq!(n.sql, "a = $1 AND b = ?");
    }

    #[test]
    fn parenthesized_lists_expand() {
        let c = Clause::new(
            "a IN (?) AND b = ? AND c && ?",
            vec![Value::from(vec![1, 2, 3]), Value::Int(4), Value::from(vec!["x"])],
        );
        let n = c.numbered(0);
        assert_eq!(n.sql, "a IN ($1, $2, $3) AND b = $4 AND c && $5");
        assert_eq!(
            n.values,
            vec![Value::Int(1), Value::Int(2), Value::Int(3), Value::Int(4), Value::from(vec!["x"])]
        );
        assert_eq!(n.params_ref().len(), 5);
    }

    #[test]
    fn empty_list_expands_to_null() {
        let n = number_placeholders("a IN (?)", &[Value::List(vec![])], 0);
        assert_eq!(n.sql, "a IN (NULL)");
        assert!(n.values.is_empty());
    }
}
