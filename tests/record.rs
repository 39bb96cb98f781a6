#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use sluice::{AutoOptions, AutoParser, ColumnInfo, Cursor, FromRecord, Value, query_error};
    use std::str::FromStr;

    #[derive(Default, Debug, PartialEq, FromRecord)]
    struct Employee {
        first_name: String,
        age: Option<i32>,
        #[sluice(name = "Dept")]
        department: Option<String>,
        #[sluice(skip)]
        notes: String,
        r#type: Option<char>,
        _salary: Option<Decimal>,
    }

    #[derive(Default, Debug, PartialEq, FromRecord)]
    struct Wrapper<T: sluice::AsValue + Default> {
        value: T,
    }

    struct Row {
        columns: Vec<ColumnInfo>,
        values: Vec<Value>,
    }

    impl Row {
        fn new(columns: &[&str], values: Vec<Value>) -> Self {
            Self {
                columns: columns
                    .iter()
                    .map(|v| ColumnInfo::new(*v, Value::Null))
                    .collect(),
                values,
            }
        }
    }

    impl Cursor for Row {
        fn columns(&self) -> &[ColumnInfo] {
            &self.columns
        }
        fn values(&self) -> &[Value] {
            &self.values
        }
        fn position(&self) -> usize {
            1
        }
    }

    #[test]
    fn derived_names() {
        let names = Employee::fields()
            .iter()
            .map(|v| v.name)
            .collect::<Vec<_>>();
        assert_eq!(names, ["FirstName", "Age", "Dept", "Type", "Salary"]);
        assert_eq!(Wrapper::<i64>::fields()[0].name, "Value");
    }

    #[test]
    fn derived_setters() {
        let parser = AutoParser::<Employee>::new(AutoOptions::default());
        let row = Row::new(
            &["First Name", "Age", "Dept", "Type", "Salary", "Notes"],
            vec![
                Value::from("Ann"),
                Value::Int64(Some(52)),
                Value::Varchar(None),
                Value::Char(Some('B')),
                Value::Decimal(Some(Decimal::from_str("10.5").unwrap()), 10, 2),
                Value::from("ignored"),
            ],
        );
        assert_eq!(
            parser.parse(&row).unwrap(),
            Employee {
                first_name: "Ann".into(),
                age: Some(52),
                department: None,
                notes: String::new(),
                r#type: Some('B'),
                _salary: Some(Decimal::from_str("10.5").unwrap()),
            }
        );
    }

    #[test]
    fn strict_mapping() {
        let row = Row::new(&["First Name", "Notes"], vec![Value::from("Bo"), Value::from("x")]);
        let strict = AutoParser::<Employee>::new(AutoOptions {
            strict: true,
            ..Default::default()
        });
        let error = strict.parse(&row).unwrap_err();
        assert!(query_error(&error).unwrap().is_mapping());
        assert!(error.to_string().contains("Notes"));
        let row = Row::new(&["First Name", "Age"], vec![Value::from("Bo"), Value::Int32(Some(3))]);
        assert_eq!(strict.parse(&row).unwrap().age, Some(3));
    }

    #[test]
    fn conversion_failure() {
        let parser = AutoParser::<Employee>::new(AutoOptions::default());
        let row = Row::new(&["Age"], vec![Value::Int64(Some(i64::MAX))]);
        let error = parser.parse(&row).unwrap_err();
        assert!(format!("{:#}", error).contains("Age"));
    }
}
