//! SQL compiler.
//!
//! Combines an [`EntityDescriptor`], a dialect profile and optional filters
//! into statement text. Generated field lists always follow descriptor
//! order; WHERE and SET clauses follow the order of the list that drives
//! them.
//!
//! ```
//! use sqlweave::prelude::*;
//!
//! let desc = EntityDescriptor::from_schema(
//!     &EntitySchema::new("Activity").member::<i32>("Id").member::<String>("Name"),
//! );
//! let compiler = SqlCompiler::new(Dialect::MySql);
//! let stmt = compiler.delete(&desc, &Parameters::new().with("Id", 3));
//! assert_eq!(stmt.sql, "DELETE FROM Activity WHERE Id=?pId");
//! ```

pub mod delete;
pub mod filter;
pub mod insert;
pub mod select;
pub mod update;

use crate::descriptor::EntityDescriptor;
use crate::dialect::{Dialect, DialectProfile, Quoting};
use crate::params::{Filters, Parameters, Statement};

/// Statement builder bound to one dialect profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SqlCompiler {
    profile: DialectProfile,
}

impl Default for SqlCompiler {
    fn default() -> Self {
        Self::new(Dialect::Default)
    }
}

impl SqlCompiler {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            profile: *dialect.profile(),
        }
    }

    /// Override the profile's identifier quoting.
    pub fn with_quoting(mut self, quoting: Quoting) -> Self {
        self.profile.quoting = quoting;
        self
    }

    pub fn dialect(&self) -> Dialect {
        self.profile.dialect
    }

    pub fn profile(&self) -> &DialectProfile {
        &self.profile
    }

    /// `SELECT f1, f2 FROM table`
    pub fn select(&self, desc: &EntityDescriptor) -> Statement {
        Statement::new(select::build_select(desc, &self.profile))
    }

    /// ` WHERE a=1 AND b is null`, or empty for no filters.
    pub fn where_inline(&self, filters: &Filters) -> String {
        filter::build_where_inline(filters, &self.profile)
    }

    /// ` WHERE a=@pa AND b=@pb` with bindings, or empty for no parameters.
    pub fn where_params(&self, params: &Parameters) -> Statement {
        filter::build_where_params(params, &self.profile)
    }

    pub fn select_where_inline(&self, desc: &EntityDescriptor, filters: &Filters) -> Statement {
        let mut stmt = self.select(desc);
        stmt.sql.push_str(&self.where_inline(filters));
        log_statement("select", &stmt);
        stmt
    }

    pub fn select_where(&self, desc: &EntityDescriptor, params: &Parameters) -> Statement {
        let mut stmt = self.select(desc);
        stmt.append(self.where_params(params));
        log_statement("select", &stmt);
        stmt
    }

    /// INSERT for every descriptor field except the identity field and any
    /// field already named in `explicit`. The identity falls back to the
    /// descriptor's flagged field when `identity` is `None`.
    pub fn insert(
        &self,
        desc: &EntityDescriptor,
        identity: Option<&str>,
        explicit: Option<&Parameters>,
    ) -> Statement {
        let identity = identity.or_else(|| desc.identity().map(|f| f.name.as_str()));
        let stmt = insert::build_insert(desc, &self.profile, identity, explicit);
        log_statement("insert", &stmt);
        stmt
    }

    /// UPDATE over `set` fields (all fields when `None`). Without `filter`
    /// every row is updated.
    pub fn update(
        &self,
        desc: &EntityDescriptor,
        set: Option<&Parameters>,
        filter: Option<&Parameters>,
    ) -> Statement {
        let stmt = update::build_update(desc, &self.profile, set, filter);
        log_statement("update", &stmt);
        stmt
    }

    pub fn delete(&self, desc: &EntityDescriptor, filter: &Parameters) -> Statement {
        let stmt = delete::build_delete(desc, &self.profile, filter);
        log_statement("delete", &stmt);
        stmt
    }
}

/// Comma-joined, quoted column list.
pub(crate) fn column_list(columns: &[&str], profile: &DialectProfile) -> String {
    columns
        .iter()
        .map(|c| profile.quote(c))
        .collect::<Vec<_>>()
        .join(", ")
}

fn log_statement(kind: &str, stmt: &Statement) {
    tracing::debug!("Compiled {} ({} bindings): {}", kind, stmt.params.len(), stmt.sql);
}
