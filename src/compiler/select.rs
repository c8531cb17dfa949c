//! SELECT SQL generation.

use crate::compiler::column_list;
use crate::descriptor::EntityDescriptor;
use crate::dialect::DialectProfile;

/// Generate `SELECT <fields> FROM <table>`.
///
/// A descriptor without fields yields `SELECT  FROM <table>`.
pub fn build_select(desc: &EntityDescriptor, profile: &DialectProfile) -> String {
    let mut sql = String::from("SELECT ");
    sql.push_str(&column_list(&desc.columns(), profile));
    sql.push_str(" FROM ");
    sql.push_str(&profile.quote(desc.table()));
    sql
}
