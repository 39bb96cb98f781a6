#[cfg(test)]
mod tests {
    use sluice_core::{
        Command, CommandBuilder, CommandKind, CommandSpec, Connection, Cursor, Opener, Parameter,
        ResultReader, Value,
    };
    use sluice_memory::{MemoryDatabase, MemoryResult, init_logs};
    use std::time::Duration;

    fn people() -> MemoryResult {
        MemoryResult::new([("Name", Value::Varchar(None)), ("Age", Value::Int32(None))])
            .row([Value::from("Ann"), Value::Int32(Some(31))])
            .row([Value::from("Bo"), Value::Int32(None)])
    }

    #[test]
    fn open_and_close() {
        init_logs();
        let db = MemoryDatabase::new();
        let mut connection = db.opener().open().expect("Could not open");
        assert!(connection.is_open());
        assert_eq!(db.open_connections(), 1);
        connection.close().unwrap();
        connection.close().unwrap();
        assert!(!connection.is_open());
        assert_eq!(db.open_connections(), 0);
        assert_eq!(db.opened_connections(), 1);
    }

    #[test]
    fn reader() {
        init_logs();
        let db = MemoryDatabase::new();
        db.register("SELECT * FROM People", people());
        let mut connection = db.connect();
        let spec = CommandSpec {
            text: "SELECT * FROM People",
            kind: CommandKind::Text,
            parameters: &[],
            timeout: None,
        };
        let mut command = connection.build_command(&spec, None).unwrap();
        let mut reader = connection.execute_reader(&mut command).unwrap();
        assert_eq!(reader.columns().len(), 2);
        assert!(reader.values().is_empty());
        assert!(reader.read().unwrap());
        assert_eq!(reader.get_by_name("age"), Some(&Value::Int32(Some(31))));
        assert!(reader.read().unwrap());
        assert_eq!(reader.position(), 2);
        assert!(!reader.read().unwrap());
        reader.close().unwrap();
        assert!(reader.read().is_err());
        connection.close().unwrap();
    }

    #[test]
    fn output_written_on_completion() {
        init_logs();
        let db = MemoryDatabase::new();
        db.register(
            "CountPeople",
            people().output(Parameter::new("Total", 2)),
        );
        let mut connection = db.connect();
        let parameters = [Parameter::output("total", Value::Int32(None))];
        let spec = CommandSpec {
            text: "CountPeople",
            kind: CommandKind::StoredProcedure,
            parameters: &parameters,
            timeout: None,
        };
        let mut command = connection.build_command(&spec, None).unwrap();
        let mut reader = connection.execute_reader(&mut command).unwrap();
        assert!(reader.read().unwrap());
        assert_eq!(command.output_parameters()[0].value(), &Value::Int32(None));
        while reader.read().unwrap() {}
        assert_eq!(
            command.output_parameters()[0].value(),
            &Value::Int32(Some(2))
        );
    }

    #[test]
    fn failures() {
        init_logs();
        let db = MemoryDatabase::new();
        db.fail("DELETE FROM Locked", "Table is locked");
        db.register(
            "Slow",
            MemoryResult::default().delay(Duration::from_secs(5)),
        );
        let mut connection = db.connect();
        let mut run = |text: &str, timeout: Option<Duration>| -> sluice_core::Result<()> {
            let spec = CommandSpec {
                text,
                kind: CommandKind::Text,
                parameters: &[],
                timeout,
            };
            let mut command = connection.build_command(&spec, None)?;
            connection.execute_reader(&mut command).map(|_| ())
        };
        let error = run("DELETE FROM Locked", None).unwrap_err();
        assert_eq!(error.to_string(), "Table is locked");
        assert!(run("SELECT 42", None).is_err());
        assert!(run("Slow", Some(Duration::from_millis(10))).is_err());
        assert!(run("Slow", None).is_ok());
        assert_eq!(db.executed().len(), 4);
    }

    #[test]
    fn closed_connection() {
        init_logs();
        let db = MemoryDatabase::new();
        let mut connection = db.connect();
        connection.close().unwrap();
        let spec = CommandSpec {
            text: "SELECT 1",
            kind: CommandKind::Text,
            parameters: &[],
            timeout: None,
        };
        assert!(connection.build_command(&spec, None).is_err());
    }

    #[test]
    fn transaction_belongs_to_its_connection() {
        init_logs();
        let db = MemoryDatabase::new();
        let mut first = db.connect();
        let mut second = db.connect();
        let transaction = db.begin(&first);
        let spec = CommandSpec {
            text: "SELECT 1",
            kind: CommandKind::Text,
            parameters: &[],
            timeout: None,
        };
        assert!(first.build_command(&spec, Some(&transaction)).is_ok());
        assert!(second.build_command(&spec, Some(&transaction)).is_err());
    }
}
