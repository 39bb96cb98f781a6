use crate::{Provider, Result, SqlWriter};
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};

/// Transact-SQL rendering.
#[derive(Default, Debug, Clone, Copy)]
pub struct SqlServerSqlWriter;

impl SqlServerSqlWriter {
    pub const fn new() -> Self {
        Self
    }
}

impl SqlWriter for SqlServerSqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter {
        self
    }

    fn provider(&self) -> Provider {
        Provider::SqlServer
    }

    fn statement_terminator(&self) -> &'static str {
        ""
    }

    fn identity_expression(&self) -> &'static str {
        "SELECT CONVERT(int, SCOPE_IDENTITY())"
    }

    fn write_identifier_quoted(&self, out: &mut String, value: &str) {
        out.push('[');
        self.write_escaped(out, value, ']', "]]");
        out.push(']');
    }

    fn write_value_bool(&self, out: &mut String, value: bool) {
        out.push(['0', '1'][value as usize]);
    }

    fn write_value_non_finite(&self, out: &mut String, value: f64) {
        log::warn!(
            "SQL Server has no literal for {}, the value is written as NULL",
            value
        );
        self.write_value_none(out);
    }

    fn write_value_blob(&self, out: &mut String, value: &[u8]) {
        out.push_str("0x");
        out.push_str(&hex::encode_upper(value));
    }

    fn write_value_date_literal(&self, out: &mut String, value: &Date) {
        out.push('\'');
        self.write_value_date(out, value);
        out.push('\'');
    }

    fn write_value_time_literal(&self, out: &mut String, value: &Time) {
        out.push('\'');
        self.write_value_time(out, value);
        out.push('\'');
    }

    fn write_value_timestamp_literal(&self, out: &mut String, value: &PrimitiveDateTime) {
        out.push('\'');
        self.write_value_date(out, &value.date());
        out.push('T');
        self.write_value_time(out, &value.time());
        out.push('\'');
    }

    fn write_value_timestamp_with_timezone_literal(
        &self,
        out: &mut String,
        value: &OffsetDateTime,
    ) {
        out.push('\'');
        self.write_value_date(out, &value.date());
        out.push('T');
        self.write_value_time(out, &value.time());
        self.write_value_offset(out, &value.offset());
        out.push('\'');
    }

    fn write_drop(&self, out: &mut String, table: &str, _purge: bool) -> Result<()> {
        out.push_str("TRUNCATE TABLE ");
        self.write_table_name(out, table);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::SqlServerSqlWriter;
    use crate::{SqlWriter, Value};
    use time::macros::{date, datetime};

    fn render(value: &Value) -> String {
        let mut out = String::new();
        SqlServerSqlWriter::new().write_value(&mut out, value);
        out
    }

    #[test]
    fn literals() {
        assert_eq!(render(&Value::Boolean(Some(true))), "1");
        assert_eq!(render(&Value::Boolean(Some(false))), "0");
        assert_eq!(render(&Value::Blob(Some([0xde, 0xad].into()))), "0xDEAD");
        assert_eq!(render(&Value::Date(Some(date!(2023 - 11 - 05)))), "'2023-11-05'");
        assert_eq!(
            render(&Value::Timestamp(Some(datetime!(2023-11-05 17:30:00)))),
            "'2023-11-05T17:30:00'"
        );
        assert_eq!(render(&Value::Float64(Some(f64::NAN))), "NULL");
        assert_eq!(render(&Value::Float32(Some(0.5))), "0.5");
    }

    #[test]
    fn identifiers() {
        let writer = SqlServerSqlWriter::new();
        let mut out = String::new();
        writer.write_column_name(&mut out, "Order Details.Unit]Price");
        assert_eq!(out, "[Order Details].[Unit]]Price]");
    }
}
