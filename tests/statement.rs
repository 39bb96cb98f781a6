#[cfg(test)]
mod tests {
    use indoc::indoc;
    use rust_decimal::Decimal;
    use sluice::{
        Direction, Filter, LikeMode, Parameter, Provider, Removal, Value, build_delete,
        build_function_call, build_insert, build_insert_and_get_identity, build_update,
        query_error, sqlize,
    };
    use std::str::FromStr;
    use time::macros::{date, datetime};
    use uuid::Uuid;

    fn employee() -> Vec<Parameter> {
        vec![
            Parameter::new("Name", "Sam"),
            Parameter::new("Age", 42),
            Parameter::new("Salary", Decimal::from_str("1250.50").unwrap()),
            Parameter::new("Hired", date!(2021 - 03 - 15)),
            Parameter::output("Id", Value::Int32(None)),
        ]
    }

    #[test]
    fn insert() {
        assert_eq!(
            build_insert(Provider::SqlServer, "Employees", &employee()).unwrap(),
            "INSERT INTO Employees (Name, Age, Salary, Hired) VALUES ('Sam', 42, 1250.50, '2021-03-15')"
        );
        assert_eq!(
            build_insert(Provider::Oracle, "HR.Employees", &employee()).unwrap(),
            "INSERT INTO HR.Employees (Name, Age, Salary, Hired) VALUES ('Sam', 42, 1250.50, DATE '2021-03-15');"
        );
        assert_eq!(
            build_insert(
                Provider::SqlServer,
                "Order Details",
                &[Parameter::new("Unit Price", 3.25), Parameter::new("Paid", true)]
            )
            .unwrap(),
            "INSERT INTO [Order Details] ([Unit Price], Paid) VALUES (3.25, 1)"
        );
    }

    #[test]
    fn insert_and_get_identity() {
        let columns = [Parameter::new("Name", "Sam")];
        assert_eq!(
            build_insert_and_get_identity(Provider::SqlServer, "Employees", &columns, None)
                .unwrap(),
            "INSERT INTO Employees (Name) VALUES ('Sam') SELECT CONVERT(int, SCOPE_IDENTITY())"
        );
        assert_eq!(
            build_insert_and_get_identity(Provider::Oracle, "Employees", &columns, None).unwrap(),
            "INSERT INTO Employees (Name) VALUES ('Sam'); SELECT LAST_INSERT_ID();"
        );
        assert_eq!(
            build_insert_and_get_identity(
                Provider::Oracle,
                "Employees",
                &columns,
                Some("SELECT EMP_SEQ.CURRVAL FROM DUAL;")
            )
            .unwrap(),
            "INSERT INTO Employees (Name) VALUES ('Sam'); SELECT EMP_SEQ.CURRVAL FROM DUAL;"
        );
        assert_eq!(
            build_insert_and_get_identity(Provider::SqlServer, "Employees", &columns, Some("  "))
                .unwrap(),
            "INSERT INTO Employees (Name) VALUES ('Sam') SELECT CONVERT(int, SCOPE_IDENTITY())"
        );
    }

    #[test]
    fn update() {
        let columns = [
            Parameter::new("Name", "O'Neil"),
            Parameter::new("Manager", None::<i32>),
            Parameter::new("Id", 7).with_direction(Direction::ReturnValue),
        ];
        let filter = Filter::and([
            Filter::equals("Id", 7),
            Filter::like("Email", "@example.com", LikeMode::EndsWith),
        ]);
        assert_eq!(
            build_update(Provider::SqlServer, "Employees", &columns, Some(&filter)).unwrap(),
            "UPDATE Employees SET Name = 'O''Neil', Manager = NULL WHERE ( Id = 7 AND Email LIKE '%@example.com' )"
        );
        assert_eq!(
            build_update(Provider::Oracle, "Employees", &columns, None).unwrap(),
            "UPDATE Employees SET Name = 'O''Neil', Manager = NULL;"
        );
    }

    #[test]
    fn update_uses_the_statement_dialect() {
        let filter = Filter::equals("Since", date!(2020 - 01 - 01)).with_provider(Provider::SqlServer);
        assert_eq!(
            build_update(
                Provider::Oracle,
                "T",
                &[Parameter::new("Seen", datetime!(2020-01-01 10:00:00))],
                Some(&filter)
            )
            .unwrap(),
            "UPDATE T SET Seen = TIMESTAMP '2020-01-01 10:00:00' WHERE Since = DATE '2020-01-01';"
        );
    }

    #[test]
    fn delete() {
        let filter = Filter::less_than("Hired", date!(2000 - 01 - 01));
        assert_eq!(
            build_delete(Provider::SqlServer, "Employees", Some(&filter), Removal::Delete)
                .unwrap(),
            "DELETE FROM Employees WHERE Hired < '2000-01-01'"
        );
        assert_eq!(
            build_delete(Provider::Oracle, "Employees", None, Removal::Delete).unwrap(),
            "DELETE FROM Employees;"
        );
        assert_eq!(
            build_delete(
                Provider::SqlServer,
                "Employees",
                None,
                Removal::Drop { purge: true }
            )
            .unwrap(),
            "TRUNCATE TABLE Employees"
        );
        assert_eq!(
            build_delete(Provider::Oracle, "T", None, Removal::Drop { purge: true }).unwrap(),
            "DROP TABLE T PURGE;"
        );
        assert_eq!(
            build_delete(Provider::Oracle, "T", None, Removal::Drop { purge: false }).unwrap(),
            "DROP TABLE T;"
        );
        let error = build_delete(
            Provider::Oracle,
            "T",
            Some(&filter),
            Removal::Drop { purge: false },
        )
        .unwrap_err();
        assert!(query_error(&error).unwrap().is_validation());
    }

    #[test]
    fn function_call() {
        let id = Uuid::from_str("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap();
        let args = [
            Parameter::new("Tenant", id),
            Parameter::new("Since", date!(2024 - 01 - 01)),
            Parameter::output("Count", Value::Int64(None)),
        ];
        assert_eq!(
            build_function_call(Provider::SqlServer, "dbo.ActiveUsers", &args).unwrap(),
            "SELECT * FROM dbo.ActiveUsers('67e55044-10b1-426f-9247-bb680e5fe0c8', '2024-01-01')"
        );
        assert_eq!(
            build_function_call(Provider::Oracle, "ActiveUsers", &args).unwrap(),
            "SELECT * FROM TABLE(ActiveUsers('67e55044-10b1-426f-9247-bb680e5fe0c8', DATE '2024-01-01'));"
        );
        assert_eq!(
            build_function_call(Provider::Oracle, "Now", &[]).unwrap(),
            "SELECT * FROM TABLE(Now());"
        );
    }

    #[test]
    fn literals() {
        assert_eq!(
            sqlize(&Value::Blob(Some([0xca, 0xfe].into())), Provider::SqlServer).unwrap(),
            "0xCAFE"
        );
        assert_eq!(
            sqlize(&Value::Blob(Some([0xca, 0xfe].into())), Provider::Oracle).unwrap(),
            "HEXTORAW('CAFE')"
        );
        assert_eq!(
            sqlize(&Value::Float64(Some(f64::NAN)), Provider::Oracle).unwrap(),
            "BINARY_DOUBLE_NAN"
        );
        assert_eq!(
            sqlize(&Value::Float64(Some(f64::NAN)), Provider::SqlServer).unwrap(),
            "NULL"
        );
        assert_eq!(
            sqlize(
                &Value::TimestampWithTimezone(Some(datetime!(2024-06-01 12:30:00.125 +2))),
                Provider::SqlServer
            )
            .unwrap(),
            "'2024-06-01T12:30:00.125+02:00'"
        );
        assert_eq!(
            sqlize(&Value::Char(Some('x')), Provider::Oracle).unwrap(),
            "'x'"
        );
    }

    #[test]
    fn batch() {
        let mut script = String::new();
        for name in ["Ann", "Bo"] {
            script.push_str(
                &build_insert(Provider::Oracle, "People", &[Parameter::new("Name", name)])
                    .unwrap(),
            );
            script.push('\n');
        }
        script.push_str(
            &build_delete(
                Provider::Oracle,
                "People",
                Some(&Filter::is_null("Name")),
                Removal::Delete,
            )
            .unwrap(),
        );
        assert_eq!(
            script,
            indoc! {"
                INSERT INTO People (Name) VALUES ('Ann');
                INSERT INTO People (Name) VALUES ('Bo');
                DELETE FROM People WHERE Name IS NULL;"}
        );
    }
}
