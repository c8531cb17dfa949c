//! DELETE SQL generation.

use crate::compiler::filter::build_where_params;
use crate::descriptor::EntityDescriptor;
use crate::dialect::DialectProfile;
use crate::params::{Parameters, Statement};

/// Generate `DELETE FROM <table>` followed by the parameter WHERE clause.
pub fn build_delete(
    desc: &EntityDescriptor,
    profile: &DialectProfile,
    filter: &Parameters,
) -> Statement {
    let mut stmt = Statement::new(format!("DELETE FROM {}", profile.quote(desc.table())));
    stmt.append(build_where_params(filter, profile));
    stmt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Dialect;
    use crate::schema::EntitySchema;
    use crate::value::Value;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_delete_by_id() {
        let desc = EntityDescriptor::from_schema(&EntitySchema::new("Activity").member::<i32>("Id"));
        let stmt = build_delete(&desc, Dialect::MsSql.profile(), &Parameters::new().with("Id", 3));
        assert_eq!(stmt.sql, "DELETE FROM Activity WHERE Id=@pId");
        assert_eq!(stmt.params[0].value, Value::Int(3));
    }
}
