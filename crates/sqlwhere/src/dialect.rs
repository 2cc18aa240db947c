//! SQL dialects and their identifier quoting rules.

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// The SQL dialect used to quote identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// PostgreSQL: `"name"`.
    #[default]
    #[serde(alias = "postgresql", alias = "pg")]
    Postgres,
    /// MySQL / MariaDB: `` `name` ``.
    #[serde(alias = "mariadb")]
    MySql,
    /// SQLite: `"name"`.
    #[serde(alias = "sqlite3")]
    Sqlite,
}

impl Dialect {
    /// Short lowercase name of the dialect.
    pub fn name(self) -> &'static str {
        match self {
            Dialect::Postgres => "postgres",
            Dialect::MySql => "mysql",
            Dialect::Sqlite => "sqlite",
        }
    }

    fn quote_char(self) -> char {
        match self {
            Dialect::Postgres | Dialect::Sqlite => '"',
            Dialect::MySql => '`',
        }
    }

    /// Quote an identifier.
    ///
    /// Input is cut at the first NUL. Embedded quote characters are doubled and
    /// each dot-separated segment is quoted on its own, so `a.b` becomes
    /// `"a"."b"`.
    pub fn quote_identifier(self, name: &str) -> String {
        let name = match name.find('\0') {
            Some(end) => &name[..end],
            None => name,
        };
        let q = self.quote_char();
        let mut out = String::with_capacity(name.len() + 2);
        out.push(q);
        for ch in name.chars() {
            match ch {
                c if c == q => {
                    out.push(q);
                    out.push(q);
                }
                '.' => {
                    out.push(q);
                    out.push('.');
                    out.push(q);
                }
                c => out.push(c),
            }
        }
        out.push(q);
        out
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Dialect::Postgres),
            "mysql" | "mariadb" => Ok(Dialect::MySql),
            "sqlite" | "sqlite3" => Ok(Dialect::Sqlite),
            other => Err(format!("unknown dialect: {other}")),
        }
    }
}
