//! # sqlweave
//!
//! > **Records in, SQL out.**
//!
//! sqlweave compiles typed record descriptions and filter criteria into SQL
//! text for several database dialects, without a query-building DSL.
//!
//! ## Quick Example
//!
//! ```
//! use sqlweave::prelude::*;
//!
//! struct Activity;
//!
//! impl Entity for Activity {
//!     fn schema() -> EntitySchema {
//!         EntitySchema::new("Activity")
//!             .member::<i32>("Id")
//!             .member::<String>("Name")
//!             .member::<Vec<String>>("Tags")
//!     }
//! }
//!
//! let desc = describe::<Activity>();
//! let sql = SqlCompiler::new(Dialect::MsSql);
//!
//! assert_eq!(sql.select(&desc).sql, "SELECT Id, Name FROM Activity");
//! assert_eq!(
//!     sql.where_params(&Parameters::new().with("Id", 3)).sql,
//!     " WHERE Id=@pId"
//! );
//! ```
//!
//! ## Dialects
//!
//! | Dialect   | Marker | Where name | Identity read-back     |
//! |-----------|--------|------------|------------------------|
//! | `mssql`   | `@`    | `@pField`  | `SCOPE_IDENTITY()`     |
//! | `mysql`   | `?`    | `?pField`  | `LAST_INSERT_ID()`     |
//! | `oracle`  | `:`    | `:pField`  | none                   |
//! | `default` | `@`    | `@pField`  | none                   |

pub mod compiler;
pub mod config;
pub mod descriptor;
pub mod dialect;
pub mod driver;
pub mod error;
pub mod executor;
pub mod literal;
pub mod params;
pub mod schema;
pub mod value;

pub use descriptor::{describe, table_name};
pub use dialect::resolve_dialect;

pub mod prelude {
    pub use crate::compiler::SqlCompiler;
    pub use crate::descriptor::{EntityDescriptor, FieldDescriptor, describe, table_name};
    pub use crate::dialect::{Dialect, DialectProfile, Quoting, resolve_dialect};
    pub use crate::error::*;
    pub use crate::executor::{Command, Connection, ConnectionState, FromRow, Row, Session};
    pub use crate::literal::to_literal;
    pub use crate::params::{Filters, Parameter, Parameters, Statement};
    pub use crate::schema::{ColumnType, Entity, EntitySchema, FieldKind, Member, MemberKind};
    pub use crate::value::Value;
}
