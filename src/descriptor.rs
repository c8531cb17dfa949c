//! Entity descriptors: the ordered, filtered field list of a record type.
//!
//! Members are kept in declaration order when their kind is a supported
//! scalar. Collections, arrays, classes and interfaces are skipped without
//! any diagnostic, as are generic members bound to a non-scalar argument.

use crate::schema::{Entity, EntitySchema, FieldKind};

/// Metadata for one persisted field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    /// Position among all declared members, skipped ones included.
    pub ordinal: usize,
    pub kind: FieldKind,
    /// Set per operation by the caller.
    pub identity: bool,
    pub ignored: bool,
}

/// Ordered field descriptors plus the resolved table name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDescriptor {
    table: String,
    fields: Vec<FieldDescriptor>,
}

impl EntityDescriptor {
    pub fn from_schema(schema: &EntitySchema) -> Self {
        let fields = schema
            .members
            .iter()
            .enumerate()
            .filter_map(|(ordinal, member)| {
                let kind = member.kind.resolve(&schema.type_arguments)?;
                Some(FieldDescriptor {
                    name: member.name.clone(),
                    ordinal,
                    kind,
                    identity: false,
                    ignored: member.ignored,
                })
            })
            .collect();

        Self {
            table: resolve_table_name(schema),
            fields,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Every retained field, ignored ones included.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Names that take part in generated SQL, in declaration order.
    pub fn columns(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| !f.ignored)
            .map(|f| f.name.as_str())
            .collect()
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Flag `name` as the identity field for the coming operation.
    pub fn with_identity(mut self, name: &str) -> Self {
        for field in &mut self.fields {
            field.identity = field.name == name;
        }
        self
    }

    pub fn identity(&self) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.identity)
    }
}

/// Table name for a schema: the wrapped argument's name for single-argument
/// generic wrappers, the type's own name otherwise.
pub fn resolve_table_name(schema: &EntitySchema) -> String {
    match schema.type_arguments.as_slice() {
        [only] => only.name.clone(),
        _ => schema.name.clone(),
    }
}

/// Describe a record type.
pub fn describe<T: Entity>() -> EntityDescriptor {
    EntityDescriptor::from_schema(&T::schema())
}

/// Resolved table name of a record type.
pub fn table_name<T: Entity>() -> String {
    resolve_table_name(&T::schema())
}
