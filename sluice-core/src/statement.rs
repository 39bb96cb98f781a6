use crate::{Filter, Parameter, Provider, QueryError, Result, Value};

/// What `build_delete` removes.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Removal {
    /// `DELETE FROM`, optionally filtered.
    #[default]
    Delete,
    /// Every row at once: `TRUNCATE TABLE` on SQL Server, `DROP TABLE [PURGE]` on Oracle.
    Drop { purge: bool },
}

fn require_name<'a>(kind: &str, name: &'a str) -> Result<&'a str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(QueryError::validation(format!("{} name is empty", kind)));
    }
    Ok(name)
}

/// Parameters that carry a value into the statement.
fn inputs(parameters: &[Parameter]) -> Vec<&Parameter> {
    parameters
        .iter()
        .filter(|v| v.direction.is_input())
        .collect()
}

fn require_columns<'a>(table: &str, parameters: &'a [Parameter]) -> Result<Vec<&'a Parameter>> {
    let columns = inputs(parameters);
    if columns.is_empty() {
        return Err(QueryError::validation(format!(
            "No input column to write into `{}`",
            table
        )));
    }
    if let Some(column) = columns.iter().find(|v| v.name.trim().is_empty()) {
        return Err(QueryError::validation(format!(
            "Column with value {} has no name",
            column.value()
        )));
    }
    Ok(columns)
}

/// `INSERT INTO T (c1, c2) VALUES (v1, v2)`
pub fn build_insert(provider: Provider, table: &str, columns: &[Parameter]) -> Result<String> {
    let writer = provider.sql_writer()?;
    let table = require_name("Table", table)?;
    let columns = require_columns(table, columns)?;
    let mut out = String::with_capacity(128);
    writer.write_insert(&mut out, table, &columns)?;
    Ok(out)
}

/// Insert followed by the identity read back, `identity_sql` replaces the
/// dialect expression.
pub fn build_insert_and_get_identity(
    provider: Provider,
    table: &str,
    columns: &[Parameter],
    identity_sql: Option<&str>,
) -> Result<String> {
    let writer = provider.sql_writer()?;
    let table = require_name("Table", table)?;
    let columns = require_columns(table, columns)?;
    let identity_sql = identity_sql.map(str::trim).filter(|v| !v.is_empty());
    let mut out = String::with_capacity(160);
    writer.write_insert_identity(&mut out, table, &columns, identity_sql)?;
    Ok(out)
}

/// `UPDATE T SET c1 = v1 [WHERE ...]`
pub fn build_update(
    provider: Provider,
    table: &str,
    columns: &[Parameter],
    filter: Option<&Filter>,
) -> Result<String> {
    let writer = provider.sql_writer()?;
    let table = require_name("Table", table)?;
    let columns = require_columns(table, columns)?;
    let mut out = String::with_capacity(128);
    writer.write_update(&mut out, table, &columns, filter)?;
    Ok(out)
}

pub fn build_delete(
    provider: Provider,
    table: &str,
    filter: Option<&Filter>,
    removal: Removal,
) -> Result<String> {
    let writer = provider.sql_writer()?;
    let table = require_name("Table", table)?;
    let mut out = String::with_capacity(64);
    match removal {
        Removal::Delete => writer.write_delete(&mut out, table, filter)?,
        Removal::Drop { .. } if filter.is_some() => {
            return Err(QueryError::validation(format!(
                "Dropping `{}` removes every row, a filter cannot be applied",
                table
            )));
        }
        Removal::Drop { purge } => writer.write_drop(&mut out, table, purge)?,
    }
    Ok(out)
}

/// Table valued function call, only input parameters become arguments.
pub fn build_function_call(
    provider: Provider,
    function: &str,
    args: &[Parameter],
) -> Result<String> {
    let writer = provider.sql_writer()?;
    let function = require_name("Function", function)?;
    let args = inputs(args);
    let mut out = String::with_capacity(64);
    writer.write_function_call(&mut out, function, &args)?;
    Ok(out)
}

/// Literal encoding of a single value.
pub fn sqlize(value: &Value, provider: Provider) -> Result<String> {
    let writer = provider.sql_writer()?;
    let mut out = String::new();
    writer.write_value(&mut out, value);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::{Removal, build_delete, build_function_call, build_insert, sqlize};
    use crate::{Direction, Parameter, Provider, Value, query_error};

    #[test]
    fn insert_skips_output_parameters() {
        let columns = [
            Parameter::new("Name", "Sam"),
            Parameter::output("Id", Value::Int32(None)),
            Parameter::new("Age", 42).with_direction(Direction::InputOutput),
        ];
        assert_eq!(
            build_insert(Provider::SqlServer, "Employees", &columns).unwrap(),
            "INSERT INTO Employees (Name, Age) VALUES ('Sam', 42)"
        );
    }

    #[test]
    fn validation() {
        let columns = [Parameter::new("Name", "Sam")];
        for error in [
            build_insert(Provider::Oracle, "  ", &columns).unwrap_err(),
            build_insert(Provider::Oracle, "T", &[]).unwrap_err(),
            build_insert(Provider::Oracle, "T", &[Parameter::new("", 1)]).unwrap_err(),
            build_function_call(Provider::Oracle, "", &[]).unwrap_err(),
            build_delete(Provider::SqlServer, "", None, Removal::Delete).unwrap_err(),
        ] {
            assert!(query_error(&error).unwrap().is_validation(), "{}", error);
        }
    }

    #[test]
    fn unsupported_provider() {
        let error = build_insert(Provider::Neutral, "T", &[Parameter::new("A", 1)]).unwrap_err();
        assert!(query_error(&error).unwrap().is_unsupported_provider());
        assert!(error.to_string().contains("SqlServer, Oracle"));
        let error = sqlize(&Value::Int8(Some(1)), Provider::Neutral).unwrap_err();
        assert!(query_error(&error).unwrap().is_unsupported_provider());
    }

    #[test]
    fn sqlize_nulls() {
        assert_eq!(sqlize(&Value::Null, Provider::Oracle).unwrap(), "NULL");
        assert_eq!(
            sqlize(&Value::Varchar(None), Provider::SqlServer).unwrap(),
            "NULL"
        );
        let mut parameter = Parameter::new("Note", "x");
        parameter.set_value(None::<String>);
        assert_eq!(
            build_insert(Provider::SqlServer, "T", &[parameter]).unwrap(),
            "INSERT INTO T (Note) VALUES (NULL)"
        );
    }
}
