//! UPDATE SQL generation.

use crate::compiler::filter::build_where_params;
use crate::descriptor::EntityDescriptor;
use crate::dialect::DialectProfile;
use crate::params::{Parameters, Statement};

/// Generate `UPDATE <table> SET a=<m>a, b=<m>b [WHERE ...]`.
///
/// SET fields come from `set` in supplied order, or from the descriptor when
/// `set` is `None` or empty; only supplied values are bound. A missing `filter`
/// leaves the WHERE clause out, updating every row.
pub fn build_update(
    desc: &EntityDescriptor,
    profile: &DialectProfile,
    set: Option<&Parameters>,
    filter: Option<&Parameters>,
) -> Statement {
    let set = set.filter(|params| !params.is_empty());
    let fields: Vec<&str> = match set {
        Some(params) => params.names().collect(),
        None => desc.columns(),
    };

    let assignments: Vec<String> = fields
        .iter()
        .map(|f| format!("{}={}", profile.quote(f), profile.param_name(f)))
        .collect();

    let mut stmt = Statement::new(format!(
        "UPDATE {} SET {}",
        profile.quote(desc.table()),
        assignments.join(", ")
    ));

    for param in set.into_iter().flatten() {
        stmt.bind(profile.param_name(&param.name), param.value.clone());
    }

    if let Some(filter) = filter {
        stmt.append(build_where_params(filter, profile));
    }

    stmt
}
