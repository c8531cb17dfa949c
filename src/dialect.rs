//! Dialect profiles.
//!
//! A connection resolves to one of a fixed set of dialects by matching its
//! driver type name against a static table. Each dialect owns a row in the
//! profile table: parameter marker, identity retrieval, identifier quoting.
//! Unrecognized drivers fall back to [`Dialect::Default`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MapperError;
use crate::executor::Connection;

/// Supported SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    MsSql,
    MySql,
    Oracle,
    #[default]
    Default,
}

/// How the row of a freshly inserted identity is fetched back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityFetch {
    /// No suffix; the caller retrieves identities separately.
    None,
    ScopeIdentity,
    LastInsertId,
}

impl IdentityFetch {
    pub const fn function(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::ScopeIdentity => Some("SCOPE_IDENTITY()"),
            Self::LastInsertId => Some("LAST_INSERT_ID()"),
        }
    }
}

/// Identifier quoting style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quoting {
    None,
    Brackets,
    Backticks,
    DoubleQuotes,
}

/// Naming and identity rules for one database family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialectProfile {
    pub dialect: Dialect,
    pub marker: char,
    pub identity: IdentityFetch,
    pub quoting: Quoting,
}

static PROFILES: [DialectProfile; 4] = [
    DialectProfile {
        dialect: Dialect::MsSql,
        marker: '@',
        identity: IdentityFetch::ScopeIdentity,
        quoting: Quoting::None,
    },
    DialectProfile {
        dialect: Dialect::MySql,
        marker: '?',
        identity: IdentityFetch::LastInsertId,
        quoting: Quoting::None,
    },
    DialectProfile {
        dialect: Dialect::Oracle,
        marker: ':',
        identity: IdentityFetch::None,
        quoting: Quoting::None,
    },
    DialectProfile {
        dialect: Dialect::Default,
        marker: '@',
        identity: IdentityFetch::None,
        quoting: Quoting::None,
    },
];

/// How a driver type name is tested against a pattern.
#[derive(Debug, Clone, Copy)]
enum DriverMatch {
    /// Anywhere in the name.
    Fragment(&'static str),
    /// Equal to the last `.` or `::` separated segment.
    TypeName(&'static str),
}

impl DriverMatch {
    fn matches(self, lowered: &str) -> bool {
        match self {
            Self::Fragment(fragment) => lowered.contains(fragment),
            Self::TypeName(name) => last_segment(lowered) == name,
        }
    }
}

fn last_segment(type_name: &str) -> &str {
    type_name
        .rsplit(|c: char| c == '.' || c == ':')
        .next()
        .unwrap_or(type_name)
}

/// Driver name patterns, matched case-insensitively in order.
/// MySQL comes first since its driver names also end in "SqlConnection".
static DRIVER_PATTERNS: &[(DriverMatch, Dialect)] = &[
    (DriverMatch::Fragment("mysql"), Dialect::MySql),
    (DriverMatch::Fragment("mariadb"), Dialect::MySql),
    (DriverMatch::Fragment("oracle"), Dialect::Oracle),
    (DriverMatch::TypeName("sqlconnection"), Dialect::MsSql),
    (DriverMatch::Fragment("sqlserver"), Dialect::MsSql),
    (DriverMatch::Fragment("mssql"), Dialect::MsSql),
    (DriverMatch::Fragment("tiberius"), Dialect::MsSql),
];

impl Dialect {
    pub const ALL: [Dialect; 4] = [Self::MsSql, Self::MySql, Self::Oracle, Self::Default];

    pub fn profile(self) -> &'static DialectProfile {
        match self {
            Self::MsSql => &PROFILES[0],
            Self::MySql => &PROFILES[1],
            Self::Oracle => &PROFILES[2],
            Self::Default => &PROFILES[3],
        }
    }

    /// Classify a driver type name. Never fails.
    pub fn resolve(type_name: &str) -> Self {
        let lowered = type_name.to_ascii_lowercase();
        match DRIVER_PATTERNS
            .iter()
            .find(|(pattern, _)| pattern.matches(&lowered))
        {
            Some((_, dialect)) => *dialect,
            None => {
                tracing::debug!("No dialect for driver '{}', using default", type_name);
                Self::Default
            }
        }
    }

    /// Classify a connection URL by its scheme.
    pub fn from_url(url: &str) -> Self {
        let scheme = url.split(':').next().unwrap_or_default();
        match scheme.to_ascii_lowercase().as_str() {
            "mysql" | "mariadb" => Self::MySql,
            "mssql" | "sqlserver" => Self::MsSql,
            "oracle" => Self::Oracle,
            _ => Self::Default,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MsSql => "mssql",
            Self::MySql => "mysql",
            Self::Oracle => "oracle",
            Self::Default => "default",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = MapperError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                MapperError::Config(format!(
                    "Unknown dialect '{s}'. Expected: mssql, mysql, oracle, or default"
                ))
            })
    }
}

impl DialectProfile {
    /// Parameter name for SET and VALUES placeholders: `<marker><Field>`.
    pub fn param_name(&self, field: &str) -> String {
        format!("{}{}", self.marker, field)
    }

    /// Parameter name for WHERE placeholders: `<marker>p<Field>`.
    pub fn where_param_name(&self, field: &str) -> String {
        format!("{}p{}", self.marker, field)
    }

    pub fn quote(&self, identifier: &str) -> String {
        match self.quoting {
            Quoting::None => identifier.to_string(),
            Quoting::Brackets => format!("[{}]", identifier.replace(']', "]]")),
            Quoting::Backticks => format!("`{}`", identifier.replace('`', "``")),
            Quoting::DoubleQuotes => format!("\"{}\"", identifier.replace('"', "\"\"")),
        }
    }

    /// Statement appended to an INSERT to read the new row back, if this
    /// dialect has one.
    pub fn identity_suffix(&self, columns: &str, table: &str, identity: &str) -> Option<String> {
        let function = self.identity.function()?;
        Some(format!(
            ";SELECT {columns} FROM {table} WHERE {identity} = {function};"
        ))
    }
}

/// Resolve the dialect of a live connection from its driver type name.
pub fn resolve_dialect(connection: &dyn Connection) -> Dialect {
    Dialect::resolve(connection.type_name())
}
