use super::input::{Fields, Input};
use super::node::Node;
use super::normalize::normalize;
use crate::clause::{Clause, Joiner, count_placeholders};
use crate::config::Config;
use crate::error::WhereError;
use crate::ident::resolve_column;
use crate::value::Value;
use thiserror::Error;

/// A strict-mode failure, together with the clause built before it happened.
///
/// The partial clause is always well formed: balanced parentheses and one
/// value per placeholder.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{error}")]
pub struct Halted {
    pub partial: Clause,
    #[source]
    pub error: WhereError,
}

/// Apply `f` to the clause, or to the partial clause of a failure.
fn finish(result: Result<Clause, Halted>, f: impl Fn(Clause) -> Clause) -> Result<Clause, Halted> {
    match result {
        Ok(clause) => Ok(f(clause)),
        Err(Halted { partial, error }) => Err(Halted {
            partial: f(partial),
            error,
        }),
    }
}

/// Surface `error` in strict mode, otherwise drop the fragment.
fn skip_or_halt(error: WhereError, cfg: &Config) -> Result<Clause, Halted> {
    if cfg.strict {
        return Err(Halted {
            partial: Clause::empty(),
            error,
        });
    }
    #[cfg(feature = "tracing")]
    tracing::debug!(target: "sqlwhere", %error, "skipping invalid condition");
    #[cfg(not(feature = "tracing"))]
    let _ = error;
    Ok(Clause::empty())
}

impl Node {
    /// Render the node into a clause.
    ///
    /// Empty children are pruned at every level, so a tree with nothing to
    /// render yields an empty clause rather than `()` or `NOT ()`.
    pub fn reduce(&self, cfg: &Config) -> Result<Clause, Halted> {
        match self {
            Node::And {
                children,
                bare,
                negated,
            } => {
                let group = !*bare || *negated;
                finish(reduce_list(children, " AND ", cfg), |c| {
                    if group { c.grouped(*negated) } else { c }
                })
            }
            Node::Or { children, negated } => {
                finish(reduce_list(children, " OR ", cfg), |c| c.grouped(*negated))
            }
            Node::Map { fields, negated } => {
                finish(reduce_fields(fields, cfg), |c| c.grouped(*negated))
            }
            Node::Raw {
                sql,
                values,
                negated,
            } => {
                if sql.is_empty() {
                    return Ok(Clause::empty());
                }
                if count_placeholders(sql) != values.len() {
                    let error = WhereError::invalid_with(sql.as_str(), values.clone());
                    return skip_or_halt(error, cfg);
                }
                Ok(Clause::new(sql.clone(), values.clone()).grouped(*negated))
            }
        }
    }
}

/// Reduce a list item: built nodes directly, anything else after normalizing.
fn reduce_input(input: &Input, cfg: &Config) -> Result<Clause, Halted> {
    match input {
        Input::Node(node) => node.reduce(cfg),
        other => match normalize(other.clone(), Vec::new(), false) {
            Ok(node) => node.reduce(cfg),
            Err(error) => skip_or_halt(error, cfg),
        },
    }
}

fn reduce_list(children: &[Input], sep: &str, cfg: &Config) -> Result<Clause, Halted> {
    let mut joiner = Joiner::default();
    for child in children {
        match reduce_input(child, cfg) {
            Ok(clause) => joiner.push(clause),
            Err(Halted { partial, error }) => {
                joiner.push(partial);
                return Err(Halted {
                    partial: joiner.join(sep),
                    error,
                });
            }
        }
    }
    Ok(joiner.join(sep))
}

/// AND-join every `key => value` pair, without the outer parentheses.
fn reduce_fields(fields: &Fields, cfg: &Config) -> Result<Clause, Halted> {
    let mut entries: Vec<(&str, &Value)> = fields.iter().collect();
    if cfg.sort_keys {
        entries.sort_by(|a, b| a.0.cmp(b.0));
    }

    let mut joiner = Joiner::default();
    for (key, value) in entries {
        match reduce_pair(key, value, cfg) {
            Ok(clause) => joiner.push(clause),
            Err(Halted { partial, error }) => {
                joiner.push(partial);
                return Err(Halted {
                    partial: joiner.join(" AND "),
                    error,
                });
            }
        }
    }
    Ok(joiner.join(" AND "))
}

/// Split `column<sep>operator[<sep>...]`. The operator part is optional and
/// anything after it is ignored.
fn split_key<'a>(key: &'a str, sep: &str) -> (&'a str, Option<&'a str>) {
    if sep.is_empty() {
        return (key, None);
    }
    let mut parts = key.split(sep);
    let column = parts.next().unwrap_or(key);
    (column, parts.next())
}

fn reduce_pair(key: &str, value: &Value, cfg: &Config) -> Result<Clause, Halted> {
    if let Some(hook) = cfg.custom_conditions.get(key) {
        let Some(input) = hook(key, value, cfg) else {
            return Ok(Clause::empty());
        };
        return match normalize(input, Vec::new(), false) {
            Ok(node) => node.reduce(cfg),
            Err(error) => skip_or_halt(error, cfg),
        };
    }

    let (column, op_name) = split_key(key, &cfg.separator);
    let operator = match op_name {
        Some(name) => cfg.operators.get(name),
        None => cfg.operators.infer(value),
    };
    match operator {
        Some(op) => Ok(op.build(&resolve_column(column, cfg), value, cfg)),
        None => skip_or_halt(WhereError::invalid_with(key, vec![value.clone()]), cfg),
    }
}
