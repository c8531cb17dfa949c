//! Statement execution.
//!
//! The physical connection is an external collaborator behind the
//! [`Connection`] trait. This module only guarantees that a statement never
//! runs on a connection that could not first be brought to an open state,
//! and turns result rows back into records through [`FromRow`].

use std::fmt;

use crate::compiler::SqlCompiler;
use crate::descriptor::{EntityDescriptor, describe};
use crate::dialect::Dialect;
use crate::error::{MapperError, MapperResult};
use crate::params::{Filters, Parameter, Parameters, Statement};
use crate::schema::Entity;
use crate::value::{FromValue, Value, decode};

/// Observable state of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Closed,
    Open,
    Connecting,
    Executing,
    Fetching,
    Broken,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A database connection owned by the caller.
pub trait Connection {
    /// Driver type name used for dialect resolution.
    fn type_name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    fn state(&self) -> ConnectionState;

    fn open(&mut self) -> MapperResult<()>;

    /// Run a statement and return the number of affected rows.
    fn execute(&mut self, statement: &Statement) -> MapperResult<u64>;

    /// Run a statement and return every result row.
    fn query(&mut self, statement: &Statement) -> MapperResult<Vec<Row>>;
}

/// One result row: column names and values in column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<(String, Value)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(column, value);
        self
    }

    pub fn push(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.columns.push((column.into(), value.into()));
    }

    /// Column lookup, case-insensitive like most drivers.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(column))
            .map(|(_, value)| value)
    }

    pub fn try_get<T: FromValue>(&self, column: &str) -> MapperResult<T> {
        let value = self
            .get(column)
            .ok_or_else(|| MapperError::decode(column, "no such column"))?;
        decode(column, value)
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Builds a record from a result row.
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> MapperResult<Self>;
}

impl FromRow for Row {
    fn from_row(row: &Row) -> MapperResult<Self> {
        Ok(row.clone())
    }
}

/// Shape of a command handed to the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommandKind {
    #[default]
    Text,
    StoredProcedure,
}

/// A compiled statement plus how to run it.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub statement: Statement,
    pub kind: CommandKind,
}

impl Command {
    pub fn text(statement: Statement) -> Self {
        Self {
            statement,
            kind: CommandKind::Text,
        }
    }

    pub fn procedure(name: impl Into<String>, params: Vec<Parameter>) -> Self {
        Self {
            statement: Statement {
                sql: name.into(),
                params,
            },
            kind: CommandKind::StoredProcedure,
        }
    }
}

/// Open a closed connection; pass an open one through; fail otherwise.
pub fn ensure_open<C: Connection + ?Sized>(connection: &mut C) -> MapperResult<()> {
    match connection.state() {
        ConnectionState::Open => Ok(()),
        ConnectionState::Closed => {
            tracing::info!("Opening {} connection", connection.type_name());
            connection.open()
        }
        state => Err(MapperError::InvalidState { state }),
    }
}

fn prepare<'a, C: Connection + ?Sized>(
    connection: &mut C,
    command: &'a Command,
) -> MapperResult<&'a Statement> {
    if command.kind == CommandKind::StoredProcedure {
        return Err(MapperError::NotImplemented("stored procedure commands"));
    }
    ensure_open(connection)?;
    tracing::debug!("Executing: {}", command.statement.sql);
    Ok(&command.statement)
}

/// Run a command, returning the affected row count.
pub fn execute<C: Connection + ?Sized>(connection: &mut C, command: &Command) -> MapperResult<u64> {
    let statement = prepare(connection, command)?;
    connection.execute(statement)
}

/// Run a command, returning every row.
pub fn query<C: Connection + ?Sized>(connection: &mut C, command: &Command) -> MapperResult<Vec<Row>> {
    let statement = prepare(connection, command)?;
    connection.query(statement)
}

/// Run a command expected to yield at most one row.
pub fn query_single<C: Connection + ?Sized>(
    connection: &mut C,
    command: &Command,
) -> MapperResult<Option<Row>> {
    let mut rows = query(connection, command)?;
    match rows.len() {
        0 => Ok(None),
        1 => Ok(rows.pop()),
        n => Err(MapperError::ambiguous(n)),
    }
}

/// Record-level operations over one connection.
pub struct Session<'c, C: Connection + ?Sized> {
    connection: &'c mut C,
    compiler: SqlCompiler,
}

impl<'c, C: Connection + ?Sized> Session<'c, C> {
    /// Session whose dialect is resolved from the connection's driver name.
    pub fn new(connection: &'c mut C) -> Self {
        let dialect = Dialect::resolve(connection.type_name());
        Self::with_dialect(connection, dialect)
    }

    pub fn with_dialect(connection: &'c mut C, dialect: Dialect) -> Self {
        Self {
            connection,
            compiler: SqlCompiler::new(dialect),
        }
    }

    pub fn compiler(&self) -> &SqlCompiler {
        &self.compiler
    }

    pub fn dialect(&self) -> Dialect {
        self.compiler.dialect()
    }

    pub fn get_all<T: Entity + FromRow>(&mut self) -> MapperResult<Vec<T>> {
        let stmt = self.compiler.select(&describe::<T>());
        self.fetch(stmt)
    }

    pub fn get_where_inline<T: Entity + FromRow>(&mut self, filters: &Filters) -> MapperResult<Vec<T>> {
        let stmt = self.compiler.select_where_inline(&describe::<T>(), filters);
        self.fetch(stmt)
    }

    pub fn get_where<T: Entity + FromRow>(&mut self, params: &Parameters) -> MapperResult<Vec<T>> {
        let stmt = self.compiler.select_where(&describe::<T>(), params);
        self.fetch(stmt)
    }

    /// `Ok(None)` when nothing matches; an error when several rows do.
    pub fn get_single<T: Entity + FromRow>(&mut self, params: &Parameters) -> MapperResult<Option<T>> {
        let stmt = self.compiler.select_where(&describe::<T>(), params);
        query_single(&mut *self.connection, &Command::text(stmt))?
            .map(|row| T::from_row(&row))
            .transpose()
    }

    /// Insert a record. With an identity field on a dialect that reads the
    /// new row back, that row is returned.
    pub fn insert<T: Entity + FromRow>(
        &mut self,
        record: &T,
        identity: Option<&str>,
    ) -> MapperResult<Option<T>> {
        let desc = describe::<T>();
        let mut stmt = self.compiler.insert(&desc, identity, None);
        let columns: Vec<&str> = desc
            .columns()
            .into_iter()
            .filter(|c| Some(*c) != identity)
            .collect();
        bind_record(&mut stmt, &self.compiler, &columns, &record.values());

        let reads_back = identity.is_some() && self.compiler.profile().identity.function().is_some();
        if reads_back {
            query_single(&mut *self.connection, &Command::text(stmt))?
                .map(|row| T::from_row(&row))
                .transpose()
        } else {
            execute(&mut *self.connection, &Command::text(stmt))?;
            Ok(None)
        }
    }

    /// Update every field of a record, matching rows on `key` fields.
    /// An empty key updates every row.
    pub fn update<T: Entity>(&mut self, record: &T, key: &[&str]) -> MapperResult<u64> {
        let desc = describe::<T>();
        let values = record.values();
        let filter: Parameters = key
            .iter()
            .map(|field| (*field, lookup(&values, field)))
            .collect();

        let mut stmt = self.compiler.update(&desc, None, Some(&filter));
        let mut set = Statement::default();
        bind_record(&mut set, &self.compiler, &desc.columns(), &values);
        set.params.append(&mut stmt.params);
        stmt.params = set.params;
        execute(&mut *self.connection, &Command::text(stmt))
    }

    /// Bulk update of the given fields on every row.
    pub fn update_all<T: Entity>(&mut self, set: &Parameters) -> MapperResult<u64> {
        if set.is_empty() {
            return Err(MapperError::InvalidOperation(
                "bulk update needs at least one field to set".to_string(),
            ));
        }
        let stmt = self.compiler.update(&describe::<T>(), Some(set), None);
        execute(&mut *self.connection, &Command::text(stmt))
    }

    pub fn delete<T: Entity>(&mut self, params: &Parameters) -> MapperResult<u64> {
        let stmt = self.compiler.delete(&describe::<T>(), params);
        execute(&mut *self.connection, &Command::text(stmt))
    }

    /// Describe `T` without touching the connection.
    pub fn describe<T: Entity>(&self) -> EntityDescriptor {
        describe::<T>()
    }

    fn fetch<T: FromRow>(&mut self, stmt: Statement) -> MapperResult<Vec<T>> {
        query(&mut *self.connection, &Command::text(stmt))?
            .iter()
            .map(T::from_row)
            .collect()
    }
}

fn lookup(values: &[(&'static str, Value)], field: &str) -> Value {
    values
        .iter()
        .find(|(name, _)| *name == field)
        .map_or(Value::Null, |(_, value)| value.clone())
}

/// Bind record values for `columns` under `<marker><Field>`; missing values
/// bind as null.
fn bind_record(
    stmt: &mut Statement,
    compiler: &SqlCompiler,
    columns: &[&str],
    values: &[(&'static str, Value)],
) {
    for column in columns {
        stmt.bind(compiler.profile().param_name(column), lookup(values, column));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::EntitySchema;
    use pretty_assertions::assert_eq;

    struct FakeConnection {
        state: ConnectionState,
        opened: usize,
        rows: Vec<Row>,
        executed: Vec<Statement>,
    }

    impl FakeConnection {
        fn new(state: ConnectionState) -> Self {
            Self {
                state,
                opened: 0,
                rows: Vec::new(),
                executed: Vec::new(),
            }
        }
    }

    impl Connection for FakeConnection {
        fn type_name(&self) -> &str {
            "System.Data.SqlClient.SqlConnection"
        }

        fn state(&self) -> ConnectionState {
            self.state
        }

        fn open(&mut self) -> MapperResult<()> {
            self.opened += 1;
            self.state = ConnectionState::Open;
            Ok(())
        }

        fn execute(&mut self, statement: &Statement) -> MapperResult<u64> {
            self.executed.push(statement.clone());
            Ok(1)
        }

        fn query(&mut self, statement: &Statement) -> MapperResult<Vec<Row>> {
            self.executed.push(statement.clone());
            Ok(self.rows.clone())
        }
    }

    #[derive(Debug, PartialEq)]
    struct Activity {
        id: i32,
        name: String,
    }

    impl Entity for Activity {
        fn schema() -> EntitySchema {
            EntitySchema::new("Activity")
                .member::<i32>("Id")
                .member::<String>("Name")
        }

        fn values(&self) -> Vec<(&'static str, Value)> {
            vec![("Id", self.id.into()), ("Name", self.name.clone().into())]
        }
    }

    impl FromRow for Activity {
        fn from_row(row: &Row) -> MapperResult<Self> {
            Ok(Self {
                id: row.try_get("Id")?,
                name: row.try_get("Name")?,
            })
        }
    }

    fn walking(id: i32) -> Row {
        Row::new().with("Id", id).with("Name", "Walking")
    }

    #[test]
    fn test_opens_closed_connection() {
        let mut conn = FakeConnection::new(ConnectionState::Closed);
        execute(&mut conn, &Command::text(Statement::new("SELECT 1"))).unwrap();
        assert_eq!(conn.opened, 1);

        execute(&mut conn, &Command::text(Statement::new("SELECT 1"))).unwrap();
        assert_eq!(conn.opened, 1);
    }

    #[test]
    fn test_rejects_unexpected_state() {
        let mut conn = FakeConnection::new(ConnectionState::Connecting);
        let err = execute(&mut conn, &Command::text(Statement::new("SELECT 1"))).unwrap_err();
        assert!(matches!(
            err,
            MapperError::InvalidState {
                state: ConnectionState::Connecting
            }
        ));
        assert!(conn.executed.is_empty());
    }

    #[test]
    fn test_stored_procedure_not_implemented() {
        let mut conn = FakeConnection::new(ConnectionState::Open);
        let err = execute(&mut conn, &Command::procedure("sp_activity", Vec::new())).unwrap_err();
        assert!(matches!(err, MapperError::NotImplemented(_)));
    }

    #[test]
    fn test_get_single() {
        let mut conn = FakeConnection::new(ConnectionState::Open);
        let key = Parameters::new().with("Id", 3);

        let none: Option<Activity> = Session::new(&mut conn).get_single(&key).unwrap();
        assert_eq!(none, None);

        conn.rows = vec![walking(3)];
        let one: Option<Activity> = Session::new(&mut conn).get_single(&key).unwrap();
        assert_eq!(one.map(|a| a.id), Some(3));

        conn.rows = vec![walking(3), walking(4)];
        let many = Session::new(&mut conn).get_single::<Activity>(&key);
        assert!(matches!(many, Err(MapperError::InvalidOperation(_))));
        assert_eq!(conn.executed[0].sql, "SELECT Id, Name FROM Activity WHERE Id=@pId");
    }

    #[test]
    fn test_insert_reads_identity_back() {
        let mut conn = FakeConnection::new(ConnectionState::Open);
        conn.rows = vec![walking(9)];
        let record = Activity {
            id: 0,
            name: "Walking".into(),
        };

        let inserted = Session::new(&mut conn).insert(&record, Some("Id")).unwrap();
        assert_eq!(inserted.map(|a| a.id), Some(9));

        let stmt = &conn.executed[0];
        assert_eq!(
            stmt.sql,
            "INSERT INTO Activity (Name) VALUES (@Name);SELECT Id, Name FROM Activity WHERE Id = SCOPE_IDENTITY();"
        );
        assert_eq!(stmt.params, vec![Parameter::new("@Name", "Walking")]);
    }

    #[test]
    fn test_insert_without_suffix_executes() {
        let mut conn = FakeConnection::new(ConnectionState::Open);
        let record = Activity {
            id: 1,
            name: "Rowing".into(),
        };
        let inserted = Session::with_dialect(&mut conn, Dialect::Oracle)
            .insert(&record, Some("Id"))
            .unwrap();
        assert_eq!(inserted, None);
        assert_eq!(conn.executed[0].sql, "INSERT INTO Activity (Name) VALUES (:Name)");
    }

    #[test]
    fn test_update_binds_set_then_key() {
        let mut conn = FakeConnection::new(ConnectionState::Open);
        let record = Activity {
            id: 3,
            name: "Hiking".into(),
        };
        Session::new(&mut conn).update(&record, &["Id"]).unwrap();

        let stmt = &conn.executed[0];
        assert_eq!(stmt.sql, "UPDATE Activity SET Id=@Id, Name=@Name WHERE Id=@pId");
        let names: Vec<&str> = stmt.params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["@Id", "@Name", "@pId"]);
    }

    #[test]
    fn test_update_all_needs_fields() {
        let mut conn = FakeConnection::new(ConnectionState::Open);
        let err = Session::new(&mut conn)
            .update_all::<Activity>(&Parameters::new())
            .unwrap_err();
        assert!(matches!(err, MapperError::InvalidOperation(_)));
        assert!(conn.executed.is_empty());

        Session::new(&mut conn)
            .update_all::<Activity>(&Parameters::new().with("Name", "Rest"))
            .unwrap();
        assert_eq!(conn.executed[0].sql, "UPDATE Activity SET Name=@Name");
    }

    #[test]
    fn test_row_lookup_is_case_insensitive() {
        let row = walking(1);
        assert_eq!(row.get("name"), Some(&Value::from("Walking")));
        assert!(row.try_get::<i32>("Missing").is_err());
    }
}
