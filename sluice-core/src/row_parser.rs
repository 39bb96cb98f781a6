use crate::{ColumnInfo, Cursor, QueryError, Result, Value, strip_whitespace};
use std::{
    any, fmt,
    sync::{Mutex, PoisonError},
};

type ValuesFn<T> = dyn Fn(&[Value]) -> Result<T> + Send + Sync;
type CursorFn<T> = dyn Fn(&dyn Cursor) -> Result<T> + Send + Sync;

/// Converts the current row into a `T`.
///
/// The variant is the mapping strategy: `Values` receives the row as a value
/// slice, `Cursor` reads from the live cursor itself.
pub enum RowParser<T> {
    Values(Box<ValuesFn<T>>),
    Cursor(Box<CursorFn<T>>),
}

impl<T> RowParser<T> {
    pub fn from_values(f: impl Fn(&[Value]) -> Result<T> + Send + Sync + 'static) -> Self {
        RowParser::Values(Box::new(f))
    }

    pub fn from_cursor(f: impl Fn(&dyn Cursor) -> Result<T> + Send + Sync + 'static) -> Self {
        RowParser::Cursor(Box::new(f))
    }

    pub fn is_values_mode(&self) -> bool {
        matches!(self, RowParser::Values(..))
    }

    pub fn is_cursor_mode(&self) -> bool {
        matches!(self, RowParser::Cursor(..))
    }

    pub fn parse(&self, cursor: &dyn Cursor) -> Result<T> {
        match self {
            RowParser::Values(f) => f(cursor.values()),
            RowParser::Cursor(f) => f(cursor),
        }
    }
}

impl<T> fmt::Debug for RowParser<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RowParser::Values(..) => "RowParser::Values",
            RowParser::Cursor(..) => "RowParser::Cursor",
        })
    }
}

/// Named setter of one field of `T`.
pub struct Field<T> {
    pub name: &'static str,
    pub set: fn(&mut T, Value) -> Result<()>,
}

impl<T> Field<T> {
    pub const fn new(name: &'static str, set: fn(&mut T, Value) -> Result<()>) -> Self {
        Self { name, set }
    }
}

/// Types built column by column from a row, usually through `#[derive(FromRecord)]`.
pub trait FromRecord: Default + Sized {
    fn fields() -> Vec<Field<Self>>;
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AutoOptions {
    /// Fail on a column without a matching field instead of skipping it.
    pub strict: bool,
    pub case_insensitive: bool,
}

/// Column to field table of one result.
struct Mapping {
    columns: Vec<String>,
    fields: Vec<Option<usize>>,
}

impl Mapping {
    fn matches(&self, columns: &[ColumnInfo]) -> bool {
        self.columns.len() == columns.len()
            && self.columns.iter().zip(columns).all(|(a, b)| *a == b.name)
    }
}

/// Name based parser for [`FromRecord`] types.
///
/// Column names are matched to fields on the first row of a result, the
/// table is then reused as long as the rows carry the same columns. A parser
/// reused on a result with different columns matches them again.
pub struct AutoParser<T: FromRecord> {
    options: AutoOptions,
    fields: Vec<Field<T>>,
    mapping: Mutex<Option<Mapping>>,
}

impl<T: FromRecord> AutoParser<T> {
    pub fn new(options: AutoOptions) -> Self {
        Self {
            options,
            fields: T::fields(),
            mapping: Mutex::new(None),
        }
    }

    /// Whether a column table is currently built.
    pub fn is_mapped(&self) -> bool {
        self.mapping
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn build_mapping(&self, columns: &[ColumnInfo]) -> Result<Mapping> {
        let fields = columns
            .iter()
            .map(|column| {
                let name = strip_whitespace(&column.name);
                let found = self.fields.iter().position(|field| {
                    let field = strip_whitespace(field.name);
                    if self.options.case_insensitive {
                        field.eq_ignore_ascii_case(&name)
                    } else {
                        field == name
                    }
                });
                if found.is_none() {
                    if self.options.strict {
                        return Err(QueryError::mapping(&column.name, any::type_name::<T>()));
                    }
                    log::trace!(
                        "Column `{}` has no field in {}, skipped",
                        column.name,
                        any::type_name::<T>()
                    );
                }
                Ok(found)
            })
            .collect::<Result<_>>()?;
        Ok(Mapping {
            columns: columns.iter().map(|v| v.name.clone()).collect(),
            fields,
        })
    }

    pub fn parse(&self, cursor: &dyn Cursor) -> Result<T> {
        let columns = cursor.columns();
        let mut cache = self.mapping.lock().unwrap_or_else(PoisonError::into_inner);
        let mapping = match cache.take() {
            Some(mapping) if mapping.matches(columns) => cache.insert(mapping),
            _ => cache.insert(self.build_mapping(columns)?),
        };
        let mut result = T::default();
        for (value, field) in cursor.values().iter().zip(&mapping.fields) {
            let Some(field) = field else {
                continue;
            };
            if value.is_null() {
                continue;
            }
            let field = &self.fields[*field];
            (field.set)(&mut result, value.clone())
                .map_err(|e| e.context(format!("While setting field `{}`", field.name)))?;
        }
        Ok(result)
    }

    pub fn into_row_parser(self) -> RowParser<T>
    where
        T: 'static,
    {
        RowParser::from_cursor(move |cursor| self.parse(cursor))
    }
}

#[cfg(test)]
mod tests {
    use super::{AutoOptions, AutoParser, Field, FromRecord, RowParser};
    use crate::{AsValue, ColumnInfo, Cursor, Value, query_error};

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

    #[derive(Default, Debug, PartialEq)]
    struct Person {
        first_name: String,
        age: Option<i32>,
    }

    impl FromRecord for Person {
        fn fields() -> Vec<Field<Self>> {
            vec![
                Field::new("FirstName", |r, v| {
                    r.first_name = AsValue::try_from_value(v)?;
                    Ok(())
                }),
                Field::new("Age", |r, v| {
                    r.age = AsValue::try_from_value(v)?;
                    Ok(())
                }),
            ]
        }
    }

    #[test]
    fn modes() {
        let values = RowParser::from_values(|v| Ok(v.len()));
        assert!(values.is_values_mode());
        assert!(!values.is_cursor_mode());
        let cursor = RowParser::from_cursor(|c| Ok(c.position()));
        assert!(cursor.is_cursor_mode());
        let row = Row::new(&["A", "B"], vec![Value::Null, Value::Null]);
        assert_eq!(values.parse(&row).unwrap(), 2);
        assert_eq!(cursor.parse(&row).unwrap(), 1);
    }

    #[test]
    fn auto_mapping() {
        let parser = AutoParser::<Person>::new(AutoOptions::default());
        assert!(!parser.is_mapped());
        let row = Row::new(
            &["First Name", "Age"],
            vec![Value::from("Ann"), Value::Int32(Some(31))],
        );
        assert_eq!(
            parser.parse(&row).unwrap(),
            Person {
                first_name: "Ann".into(),
                age: Some(31),
            }
        );
        assert!(parser.is_mapped());
        let row = Row::new(
            &["First Name", "Age"],
            vec![Value::Varchar(None), Value::Int32(None)],
        );
        assert_eq!(parser.parse(&row).unwrap(), Person::default());
    }

    #[test]
    fn auto_mapping_follows_columns() {
        let parser = AutoParser::<Person>::new(AutoOptions::default()).into_row_parser();
        let row = Row::new(
            &["FirstName", "Age"],
            vec![Value::from("Ann"), Value::Int32(Some(31))],
        );
        assert_eq!(parser.parse(&row).unwrap().first_name, "Ann");
        let row = Row::new(
            &["Age", "FirstName"],
            vec![Value::Int32(Some(44)), Value::from("Dee")],
        );
        assert_eq!(
            parser.parse(&row).unwrap(),
            Person {
                first_name: "Dee".into(),
                age: Some(44),
            }
        );
    }

    #[test]
    fn auto_strict() {
        let row = Row::new(
            &["First Name", "Notes"],
            vec![Value::from("Ann"), Value::from("x")],
        );
        let lenient = AutoParser::<Person>::new(AutoOptions::default());
        assert_eq!(lenient.parse(&row).unwrap().first_name, "Ann");
        let strict = AutoParser::<Person>::new(AutoOptions {
            strict: true,
            ..Default::default()
        });
        let error = strict.parse(&row).unwrap_err();
        assert!(query_error(&error).unwrap().is_mapping());
        assert!(!strict.is_mapped());
    }

    #[test]
    fn auto_case() {
        let row = Row::new(&["FIRST NAME"], vec![Value::from("Bo")]);
        let exact = AutoParser::<Person>::new(AutoOptions::default());
        assert_eq!(exact.parse(&row).unwrap().first_name, "");
        let relaxed = AutoParser::<Person>::new(AutoOptions {
            case_insensitive: true,
            ..Default::default()
        })
        .into_row_parser();
        assert_eq!(relaxed.parse(&row).unwrap().first_name, "Bo");
    }
}
