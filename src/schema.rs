//! Record schemas.
//!
//! A record type describes its declared members once, in declaration order,
//! through the [`Entity`] trait. Each member carries a [`MemberKind`] tag, and
//! [`ColumnType`] derives that tag from the Rust type so generic wrappers can
//! resolve their type argument at compile time.
//!
//! ```
//! use sqlweave::schema::{ColumnType, Entity, EntitySchema, MemberKind};
//!
//! struct Tag {
//!     id: i32,
//!     label: String,
//!     aliases: Vec<String>,
//! }
//!
//! impl Entity for Tag {
//!     fn schema() -> EntitySchema {
//!         EntitySchema::new("Tag")
//!             .member::<i32>("Id")
//!             .member::<String>("Label")
//!             .member::<Vec<String>>("Aliases")
//!     }
//! }
//!
//! assert_eq!(<Vec<String>>::KIND, MemberKind::Sequence);
//! ```

use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::MapperResult;
use crate::value::Value;

/// Value-kind tag of a persisted field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    String,
    Boolean,
    Numeric,
    #[serde(rename = "datetime")]
    DateTime,
    #[serde(rename = "nullable_datetime")]
    NullableDateTime,
    Enum,
    OtherScalar,
}

/// Declared shape of a record member, persisted or not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    String,
    Boolean,
    Numeric,
    #[serde(rename = "datetime")]
    DateTime,
    #[serde(rename = "nullable_datetime")]
    NullableDateTime,
    Enum,
    OtherScalar,
    /// A reference type other than string.
    Class,
    Interface,
    Array,
    /// Anything iterable as a sequence of items.
    Sequence,
    /// The record's own type parameter at the given position.
    Generic(usize),
}

impl MemberKind {
    /// The field kind for supported scalars, `None` for everything else.
    pub const fn field_kind(self) -> Option<FieldKind> {
        match self {
            Self::String => Some(FieldKind::String),
            Self::Boolean => Some(FieldKind::Boolean),
            Self::Numeric => Some(FieldKind::Numeric),
            Self::DateTime => Some(FieldKind::DateTime),
            Self::NullableDateTime => Some(FieldKind::NullableDateTime),
            Self::Enum => Some(FieldKind::Enum),
            Self::OtherScalar => Some(FieldKind::OtherScalar),
            Self::Class | Self::Interface | Self::Array | Self::Sequence | Self::Generic(_) => None,
        }
    }

    /// Resolve against the type arguments bound at the call site.
    pub fn resolve(self, arguments: &[TypeArgument]) -> Option<FieldKind> {
        match self {
            Self::Generic(index) => arguments.get(index).and_then(|arg| arg.kind.field_kind()),
            kind => kind.field_kind(),
        }
    }

    /// Kind of the same type wrapped in `Option`.
    pub const fn nullable(self) -> Self {
        match self {
            Self::DateTime => Self::NullableDateTime,
            other => other,
        }
    }
}

/// One declared member of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub name: String,
    pub kind: MemberKind,
    /// Kept in the descriptor but left out of every generated field list.
    #[serde(default)]
    pub ignored: bool,
}

impl Member {
    pub fn new(name: impl Into<String>, kind: MemberKind) -> Self {
        Self {
            name: name.into(),
            kind,
            ignored: false,
        }
    }

    /// Member whose kind is derived from its Rust type.
    pub fn of<T: ColumnType + ?Sized>(name: impl Into<String>) -> Self {
        Self::new(name, T::KIND)
    }

    pub fn ignored(mut self) -> Self {
        self.ignored = true;
        self
    }
}

/// A concrete type bound to one of the record's type parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeArgument {
    pub name: String,
    pub kind: MemberKind,
}

impl TypeArgument {
    pub fn of<T: ColumnType + ?Sized>() -> Self {
        Self {
            name: T::type_name().to_string(),
            kind: T::KIND,
        }
    }
}

/// Registration-time description of a record type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySchema {
    pub name: String,
    #[serde(default)]
    pub type_arguments: Vec<TypeArgument>,
    #[serde(default)]
    pub members: Vec<Member>,
}

impl EntitySchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_arguments: Vec::new(),
            members: Vec::new(),
        }
    }

    /// Declare a member typed `T`.
    pub fn member<T: ColumnType + ?Sized>(self, name: impl Into<String>) -> Self {
        self.with(Member::of::<T>(name))
    }

    /// Declare a member with an explicit kind.
    pub fn member_kind(self, name: impl Into<String>, kind: MemberKind) -> Self {
        self.with(Member::new(name, kind))
    }

    pub fn with(mut self, member: Member) -> Self {
        self.members.push(member);
        self
    }

    /// Bind the next type parameter to `T`.
    pub fn type_argument<T: ColumnType + ?Sized>(mut self) -> Self {
        self.type_arguments.push(TypeArgument::of::<T>());
        self
    }

    /// Parse a schema from TOML text.
    ///
    /// ```toml
    /// name = "Activity"
    ///
    /// [[members]]
    /// name = "Id"
    /// kind = "numeric"
    /// ```
    pub fn from_toml(text: &str) -> MapperResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load a TOML schema file.
    pub fn load(path: impl AsRef<Path>) -> MapperResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }
}

/// A persistable record.
pub trait Entity {
    /// Declared members in declaration order.
    fn schema() -> EntitySchema;

    /// Current member values, used to bind insert and update parameters.
    fn values(&self) -> Vec<(&'static str, Value)> {
        Vec::new()
    }
}

/// Maps a Rust type to the member kind it declares.
pub trait ColumnType {
    const KIND: MemberKind;

    /// Unqualified type name, used when the type is a wrapper's argument.
    fn type_name() -> &'static str {
        short_type_name(std::any::type_name::<Self>())
    }
}

fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

macro_rules! column_types {
    ($kind:expr => $($ty:ty),+ $(,)?) => {
        $(impl ColumnType for $ty {
            const KIND: MemberKind = $kind;
        })+
    };
}

column_types!(MemberKind::String => String, str);
column_types!(MemberKind::Boolean => bool);
column_types!(MemberKind::Numeric => i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);
column_types!(MemberKind::DateTime => NaiveDateTime, NaiveDate, DateTime<Utc>);
column_types!(MemberKind::OtherScalar => char);

impl<T: ColumnType> ColumnType for Option<T> {
    const KIND: MemberKind = T::KIND.nullable();
}

impl<T> ColumnType for Vec<T> {
    const KIND: MemberKind = MemberKind::Sequence;
}

impl<T> ColumnType for [T] {
    const KIND: MemberKind = MemberKind::Sequence;
}

impl<T, const N: usize> ColumnType for [T; N] {
    const KIND: MemberKind = MemberKind::Array;
}

impl<T: ColumnType + ?Sized> ColumnType for Box<T> {
    const KIND: MemberKind = MemberKind::Class;
}
