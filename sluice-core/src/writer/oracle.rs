use crate::{Parameter, Provider, Result, SqlWriter};
use std::fmt::Write;
use time::Time;

/// Oracle rendering, statements are terminated with `;`.
#[derive(Default, Debug, Clone, Copy)]
pub struct OracleSqlWriter;

impl OracleSqlWriter {
    pub const fn new() -> Self {
        Self
    }
}

impl SqlWriter for OracleSqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter {
        self
    }

    fn provider(&self) -> Provider {
        Provider::Oracle
    }

    fn identity_expression(&self) -> &'static str {
        "SELECT LAST_INSERT_ID();"
    }

    fn write_value_bool(&self, out: &mut String, value: bool) {
        out.push(['0', '1'][value as usize]);
    }

    fn write_value_non_finite(&self, out: &mut String, value: f64) {
        let _ = write!(
            out,
            "{}",
            if value.is_nan() {
                "BINARY_DOUBLE_NAN"
            } else if value.is_sign_negative() {
                "-BINARY_DOUBLE_INFINITY"
            } else {
                "BINARY_DOUBLE_INFINITY"
            }
        );
    }

    fn write_value_blob(&self, out: &mut String, value: &[u8]) {
        out.push_str("HEXTORAW('");
        out.push_str(&hex::encode_upper(value));
        out.push_str("')");
    }

    // No TIME type, times travel as text.
    fn write_value_time_literal(&self, out: &mut String, value: &Time) {
        out.push('\'');
        self.write_value_time(out, value);
        out.push('\'');
    }

    fn write_function_call(
        &self,
        out: &mut String,
        function: &str,
        args: &[&Parameter],
    ) -> Result<()> {
        out.push_str("SELECT * FROM TABLE(");
        self.write_function_invocation(out, function, args)?;
        out.push(')');
        out.push_str(self.statement_terminator());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::OracleSqlWriter;
    use crate::{SqlWriter, Value};
    use time::macros::{date, datetime, time};

    fn render(value: &Value) -> String {
        let mut out = String::new();
        OracleSqlWriter::new().write_value(&mut out, value);
        out
    }

    #[test]
    fn literals() {
        assert_eq!(render(&Value::Boolean(Some(true))), "1");
        assert_eq!(render(&Value::Blob(Some([1, 2, 171].into()))), "HEXTORAW('0102AB')");
        assert_eq!(render(&Value::Date(Some(date!(1999 - 12 - 31)))), "DATE '1999-12-31'");
        assert_eq!(
            render(&Value::Timestamp(Some(datetime!(1999-12-31 23:59:59.5)))),
            "TIMESTAMP '1999-12-31 23:59:59.5'"
        );
        assert_eq!(render(&Value::Time(Some(time!(12:00)))), "'12:00:00'");
        assert_eq!(
            render(&Value::Float64(Some(f64::INFINITY))),
            "BINARY_DOUBLE_INFINITY"
        );
        assert_eq!(render(&Value::Varchar(Some("it's".into()))), "'it''s'");
    }

    #[test]
    fn identifiers() {
        let mut out = String::new();
        OracleSqlWriter::new().write_column_name(&mut out, "HR.Last Name");
        assert_eq!(out, r#"HR."Last Name""#);
    }
}
