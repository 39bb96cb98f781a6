use crate::{ColumnInfo, Parameter, Value};

/// Side channel filled by one execution.
///
/// Columns are written once the cursor is open, output parameters once every
/// row was read and the command completed.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Capture {
    pub columns: Vec<ColumnInfo>,
    pub output: Vec<Parameter>,
}

impl Capture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of the output parameter `name`, compared case insensitively.
    pub fn output_value(&self, name: &str) -> Option<&Value> {
        self.output
            .iter()
            .find(|v| v.name.eq_ignore_ascii_case(name))
            .map(Parameter::value)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|v| v.name.as_str())
    }
}
