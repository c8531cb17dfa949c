//! WHERE clause generation.
//!
//! Two forms exist side by side. Inline filters render each value as a
//! literal; typed parameters render `<marker>p<Field>` placeholders and bind
//! the values under those names. Clause order follows the supplied list.

use crate::dialect::DialectProfile;
use crate::literal::{is_null_literal, to_literal};
use crate::params::{Filters, Parameters, Statement};

/// Generate ` WHERE a=1 AND b is null` from inline filters.
pub fn build_where_inline(filters: &Filters, profile: &DialectProfile) -> String {
    if filters.is_empty() {
        return String::new();
    }

    let conditions: Vec<String> = filters
        .iter()
        .map(|(field, value)| {
            let field = profile.quote(field);
            if is_null_literal(value) {
                format!("{field} is {}", to_literal(value))
            } else {
                format!("{field}={}", to_literal(value))
            }
        })
        .collect();

    format!(" WHERE {}", conditions.join(" AND "))
}

/// Generate ` WHERE a=@pa AND b=@pb` and bind each value.
pub fn build_where_params(params: &Parameters, profile: &DialectProfile) -> Statement {
    let mut stmt = Statement::default();
    if params.is_empty() {
        return stmt;
    }

    let mut conditions: Vec<String> = Vec::with_capacity(params.len());
    for param in params {
        let placeholder = profile.where_param_name(&param.name);
        conditions.push(format!("{}={}", profile.quote(&param.name), placeholder));
        stmt.bind(placeholder, param.value.clone());
    }

    stmt.sql = format!(" WHERE {}", conditions.join(" AND "));
    stmt
}
