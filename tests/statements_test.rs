use std::marker::PhantomData;

use chrono::{NaiveDate, NaiveDateTime};
use pretty_assertions::assert_eq;
use sqlweave::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq)]
enum ActivityType {
    Walking = 1,
    Cycling = 2,
}

impl ColumnType for ActivityType {
    const KIND: MemberKind = MemberKind::Enum;
}

impl From<ActivityType> for Value {
    fn from(v: ActivityType) -> Self {
        Value::enumeration(v as i32)
    }
}

struct Activity {
    id: i32,
    name: String,
    level: i32,
    is_active: bool,
    created: NaiveDateTime,
    updated: Option<NaiveDateTime>,
    activity_type: ActivityType,
}

impl Entity for Activity {
    fn schema() -> EntitySchema {
        EntitySchema::new("Activity")
            .member::<i32>("Id")
            .member::<String>("Name")
            .member::<i32>("Level")
            .member::<bool>("IsActive")
            .member::<NaiveDateTime>("Created")
            .member::<Option<NaiveDateTime>>("Updated")
            .member::<ActivityType>("ActivityType")
            .member::<Vec<String>>("Tags")
            .member::<[i32; 4]>("Numbers")
            .member_kind("Owner", MemberKind::Class)
    }

    fn values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("Id", self.id.into()),
            ("Name", self.name.clone().into()),
            ("Level", self.level.into()),
            ("IsActive", self.is_active.into()),
            ("Created", self.created.into()),
            ("Updated", self.updated.into()),
            ("ActivityType", self.activity_type.into()),
        ]
    }
}

impl ColumnType for Activity {
    const KIND: MemberKind = MemberKind::Class;
}

/// Collection wrapper named after the item it holds.
struct Page<T>(PhantomData<T>);

impl<T: ColumnType> Entity for Page<T> {
    fn schema() -> EntitySchema {
        EntitySchema::new("Page")
            .type_argument::<T>()
            .member::<i32>("Number")
            .member_kind("Item", MemberKind::Generic(0))
            .member::<Vec<i32>>("Items")
    }
}

fn created() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 17)
        .unwrap()
        .and_hms_opt(8, 30, 0)
        .unwrap()
}

#[test]
fn test_descriptor_keeps_scalars_in_order() {
    let desc = describe::<Activity>();
    assert_eq!(
        desc.columns(),
        vec!["Id", "Name", "Level", "IsActive", "Created", "Updated", "ActivityType"]
    );
    assert_eq!(desc.field("Updated").unwrap().kind, FieldKind::NullableDateTime);
    assert_eq!(desc.field("ActivityType").unwrap().kind, FieldKind::Enum);
}

#[test]
fn test_select_statement() {
    let sql = SqlCompiler::new(Dialect::MsSql).select(&describe::<Activity>()).sql;
    assert_eq!(
        sql,
        "SELECT Id, Name, Level, IsActive, Created, Updated, ActivityType FROM Activity"
    );
}

#[test]
fn test_where_params_per_dialect() {
    let key = Parameters::new().with("Id", 3);
    let expected = [
        (Dialect::MsSql, " WHERE Id=@pId"),
        (Dialect::MySql, " WHERE Id=?pId"),
        (Dialect::Oracle, " WHERE Id=:pId"),
        (Dialect::Default, " WHERE Id=@pId"),
    ];
    for (dialect, sql) in expected {
        assert_eq!(SqlCompiler::new(dialect).where_params(&key).sql, sql);
    }
}

#[test]
fn test_where_inline_literals() {
    let filters = Filters::new()
        .with("Name", "Walking")
        .with("Updated", Value::Null)
        .with("Created", created())
        .with("ActivityType", ActivityType::Cycling)
        .with("IsActive", false);
    assert_eq!(
        SqlCompiler::default().where_inline(&filters),
        " WHERE Name='Walking' AND Updated is null AND Created='2024-05-17' \
         AND ActivityType=2 AND IsActive=0"
    );
}

#[test]
fn test_delete_statement() {
    let stmt = SqlCompiler::new(Dialect::MsSql)
        .delete(&describe::<Activity>(), &Parameters::new().with("Id", 3));
    assert_eq!(stmt.sql, "DELETE FROM Activity WHERE Id=@pId");
    assert_eq!(stmt.params, vec![Parameter::new("@pId", 3)]);
}

#[test]
fn test_insert_never_lists_identity() {
    let desc = describe::<Activity>();
    for dialect in Dialect::ALL {
        let stmt = SqlCompiler::new(dialect).insert(&desc, Some("Id"), None);
        let (insert, _) = stmt.sql.split_once(';').unwrap_or((stmt.sql.as_str(), ""));
        assert!(!insert.contains("(Id"), "{dialect}: {insert}");
        assert!(!insert.contains("pId"), "{dialect}: {insert}");
    }

    let mssql = SqlCompiler::new(Dialect::MsSql).insert(&desc, Some("Id"), None);
    assert!(mssql.sql.ends_with(
        ";SELECT Id, Name, Level, IsActive, Created, Updated, ActivityType \
         FROM Activity WHERE Id = SCOPE_IDENTITY();"
    ));
}

#[test]
fn test_insert_uses_flagged_identity() {
    let desc = describe::<Activity>().with_identity("Id");
    let stmt = SqlCompiler::new(Dialect::MySql).insert(&desc, None, None);
    assert!(stmt.sql.starts_with("INSERT INTO Activity (Name, Level"));
    assert!(stmt.sql.ends_with("WHERE Id = LAST_INSERT_ID();"));
}

#[test]
fn test_update_with_and_without_filter() {
    let desc = describe::<Activity>();
    let compiler = SqlCompiler::new(Dialect::Oracle);

    let all = compiler.update(&desc, Some(&Parameters::new().with("IsActive", false)), None);
    assert_eq!(all.sql, "UPDATE Activity SET IsActive=:IsActive");

    let keyed = compiler.update(
        &desc,
        Some(&Parameters::new().with("Level", 2)),
        Some(&Parameters::new().with("Id", 3).with("Name", "Walking")),
    );
    assert_eq!(
        keyed.sql,
        "UPDATE Activity SET Level=:Level WHERE Id=:pId AND Name=:pName"
    );
}

#[test]
fn test_generic_wrapper_table_and_fields() {
    assert_eq!(table_name::<Page<Activity>>(), "Activity");
    assert_eq!(describe::<Page<Activity>>().columns(), vec!["Number"]);
    assert_eq!(describe::<Page<i64>>().columns(), vec!["Number", "Item"]);
}

#[test]
fn test_record_values_cover_descriptor() {
    let activity = Activity {
        id: 1,
        name: "Walking".into(),
        level: 3,
        is_active: true,
        created: created(),
        updated: None,
        activity_type: ActivityType::Walking,
    };
    let values = activity.values();
    let desc = describe::<Activity>();
    for column in desc.columns() {
        assert!(values.iter().any(|(name, _)| *name == column), "{column}");
    }
    assert_eq!(values[5].1, Value::Null);
    assert_eq!(values[6].1, Value::Enum(1));
}

#[test]
fn test_schema_file_matches_typed_schema() {
    let schema = EntitySchema::load(concat!(env!("CARGO_MANIFEST_DIR"), "/schemas/activity.toml"))
        .expect("Failed to load schema file");
    assert_eq!(
        EntityDescriptor::from_schema(&schema).columns(),
        describe::<Activity>().columns()
    );
}
