//! INSERT SQL generation.

use crate::compiler::column_list;
use crate::descriptor::EntityDescriptor;
use crate::dialect::DialectProfile;
use crate::params::{Parameters, Statement};

/// Generate `INSERT INTO <table> (f1, f2) VALUES (<m>f1, <m>f2)`.
///
/// The column list drops the identity field and every field named in
/// `explicit`; explicit parameters are still bound, under `<m><Field>`.
/// With an identity field the dialect's identity suffix is appended.
pub fn build_insert(
    desc: &EntityDescriptor,
    profile: &DialectProfile,
    identity: Option<&str>,
    explicit: Option<&Parameters>,
) -> Statement {
    let columns: Vec<&str> = desc
        .columns()
        .into_iter()
        .filter(|c| Some(*c) != identity)
        .filter(|c| explicit.is_none_or(|p| !p.contains(c)))
        .collect();

    let placeholders: Vec<String> = columns.iter().map(|c| profile.param_name(c)).collect();
    let table = profile.quote(desc.table());

    let mut sql = String::from("INSERT INTO ");
    sql.push_str(&table);
    sql.push_str(" (");
    sql.push_str(&column_list(&columns, profile));
    sql.push_str(") VALUES (");
    sql.push_str(&placeholders.join(", "));
    sql.push(')');

    // Read the new row back where the dialect supports it
    if let Some(identity) = identity {
        let all = column_list(&desc.columns(), profile);
        if let Some(suffix) = profile.identity_suffix(&all, &table, &profile.quote(identity)) {
            sql.push_str(&suffix);
        }
    }

    let mut stmt = Statement::new(sql);
    for param in explicit.into_iter().flatten() {
        stmt.bind(profile.param_name(&param.name), param.value.clone());
    }
    stmt
}
