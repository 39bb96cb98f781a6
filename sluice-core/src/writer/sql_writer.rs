use crate::{
    Filter, FilterNode, LikeMode, Operator, Parameter, Provider, QueryError, Result, Value,
    possibly_parenthesized, separated_by, try_separated_by,
};
use std::fmt::Write;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

macro_rules! write_integer {
    ($out:ident, $value:expr) => {{
        let mut buffer = itoa::Buffer::new();
        $out.push_str(buffer.format($value));
    }};
}

macro_rules! write_float {
    ($this:ident, $out:ident, $value:expr) => {{
        let value = $value;
        if value.is_finite() {
            let mut buffer = ryu::Buffer::new();
            $out.push_str(buffer.format_finite(value));
        } else {
            $this.write_value_non_finite($out, value as f64);
        }
    }};
}

/// Renders values, predicates and statements for one dialect.
///
/// Default methods produce ANSI SQL, dialects override what differs.
pub trait SqlWriter: Send + Sync {
    fn as_dyn(&self) -> &dyn SqlWriter;

    fn provider(&self) -> Provider;

    /// Fails unless this writer renders a concrete dialect.
    fn require_dialect(&self) -> Result<()> {
        let provider = self.provider();
        if provider.is_supported() {
            Ok(())
        } else {
            Err(QueryError::unsupported_provider(provider))
        }
    }

    /// Appended to every generated statement.
    fn statement_terminator(&self) -> &'static str {
        ";"
    }

    /// Appended after an INSERT to read back the generated key.
    fn identity_expression(&self) -> &'static str;

    fn write_escaped(&self, out: &mut String, value: &str, search: char, replace: &str) {
        let mut position = 0;
        for (i, c) in value.char_indices() {
            if c == search {
                out.push_str(&value[position..i]);
                out.push_str(replace);
                position = i + c.len_utf8();
            }
        }
        out.push_str(&value[position..]);
    }

    fn write_identifier_quoted(&self, out: &mut String, value: &str) {
        out.push('"');
        self.write_escaped(out, value, '"', r#""""#);
        out.push('"');
    }

    /// Whether the identifier can be written without quoting.
    fn is_plain_identifier(&self, value: &str) -> bool {
        let mut chars = value.chars();
        match chars.next() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
            _ => return false,
        }
        chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    }

    /// Column, table or function name, quoted per dotted part when needed.
    fn write_column_name(&self, out: &mut String, value: &str) {
        separated_by(
            out,
            value.split('.'),
            |out, part| {
                if self.is_plain_identifier(part) {
                    out.push_str(part);
                } else {
                    self.write_identifier_quoted(out, part);
                }
            },
            ".",
        );
    }

    fn write_table_name(&self, out: &mut String, value: &str) {
        self.write_column_name(out, value);
    }

    fn write_value(&self, out: &mut String, value: &Value) {
        match value {
            v if v.is_null() => self.write_value_none(out),
            Value::Boolean(Some(v)) => self.write_value_bool(out, *v),
            Value::Int8(Some(v)) => write_integer!(out, *v),
            Value::Int16(Some(v)) => write_integer!(out, *v),
            Value::Int32(Some(v)) => write_integer!(out, *v),
            Value::Int64(Some(v)) => write_integer!(out, *v),
            Value::UInt8(Some(v)) => write_integer!(out, *v),
            Value::UInt16(Some(v)) => write_integer!(out, *v),
            Value::UInt32(Some(v)) => write_integer!(out, *v),
            Value::UInt64(Some(v)) => write_integer!(out, *v),
            Value::Float32(Some(v)) => write_float!(self, out, *v),
            Value::Float64(Some(v)) => write_float!(self, out, *v),
            Value::Decimal(Some(v), ..) => {
                let _ = write!(out, "{}", v);
            }
            Value::Char(Some(v)) => {
                let mut buffer = [0u8; 4];
                self.write_value_string(out, v.encode_utf8(&mut buffer));
            }
            Value::Varchar(Some(v)) => self.write_value_string(out, v),
            Value::Blob(Some(v)) => self.write_value_blob(out, v),
            Value::Date(Some(v)) => self.write_value_date_literal(out, v),
            Value::Time(Some(v)) => self.write_value_time_literal(out, v),
            Value::Timestamp(Some(v)) => self.write_value_timestamp_literal(out, v),
            Value::TimestampWithTimezone(Some(v)) => {
                self.write_value_timestamp_with_timezone_literal(out, v)
            }
            Value::Uuid(Some(v)) => {
                let _ = write!(out, "'{}'", v);
            }
            _ => self.write_value_none(out),
        }
    }

    fn write_value_none(&self, out: &mut String) {
        out.push_str("NULL");
    }

    fn write_value_bool(&self, out: &mut String, value: bool) {
        out.push_str(["FALSE", "TRUE"][value as usize]);
    }

    fn write_value_non_finite(&self, out: &mut String, value: f64) {
        let text = if value.is_nan() {
            "NaN"
        } else if value.is_sign_negative() {
            "-Infinity"
        } else {
            "Infinity"
        };
        let _ = write!(out, "CAST('{}' AS DOUBLE PRECISION)", text);
    }

    fn write_value_string(&self, out: &mut String, value: &str) {
        out.push('\'');
        self.write_escaped(out, value, '\'', "''");
        out.push('\'');
    }

    fn write_value_blob(&self, out: &mut String, value: &[u8]) {
        out.push_str("X'");
        out.push_str(&hex::encode_upper(value));
        out.push('\'');
    }

    fn write_value_date(&self, out: &mut String, value: &Date) {
        let _ = write!(
            out,
            "{:04}-{:02}-{:02}",
            value.year(),
            value.month() as u8,
            value.day()
        );
    }

    /// `HH:MM:SS` with the fractional part only when present, trailing zeros removed.
    fn write_value_time(&self, out: &mut String, value: &Time) {
        let _ = write!(
            out,
            "{:02}:{:02}:{:02}",
            value.hour(),
            value.minute(),
            value.second()
        );
        let mut subsecond = value.nanosecond();
        if subsecond == 0 {
            return;
        }
        let mut width = 9;
        while subsecond % 10 == 0 {
            subsecond /= 10;
            width -= 1;
        }
        let _ = write!(out, ".{:0width$}", subsecond);
    }

    fn write_value_offset(&self, out: &mut String, value: &UtcOffset) {
        let (hours, minutes, _) = value.as_hms();
        let _ = write!(
            out,
            "{}{:02}:{:02}",
            if value.is_negative() { '-' } else { '+' },
            hours.unsigned_abs(),
            minutes.unsigned_abs()
        );
    }

    fn write_value_date_literal(&self, out: &mut String, value: &Date) {
        out.push_str("DATE '");
        self.write_value_date(out, value);
        out.push('\'');
    }

    fn write_value_time_literal(&self, out: &mut String, value: &Time) {
        out.push_str("TIME '");
        self.write_value_time(out, value);
        out.push('\'');
    }

    fn write_value_timestamp_literal(&self, out: &mut String, value: &PrimitiveDateTime) {
        out.push_str("TIMESTAMP '");
        self.write_value_date(out, &value.date());
        out.push(' ');
        self.write_value_time(out, &value.time());
        out.push('\'');
    }

    fn write_value_timestamp_with_timezone_literal(
        &self,
        out: &mut String,
        value: &OffsetDateTime,
    ) {
        out.push_str("TIMESTAMP '");
        self.write_value_date(out, &value.date());
        out.push(' ');
        self.write_value_time(out, &value.time());
        self.write_value_offset(out, &value.offset());
        out.push('\'');
    }

    fn write_filter(&self, out: &mut String, value: &Filter) -> Result<()> {
        match &value.node {
            FilterNode::Literal(sql) => out.push_str(sql),
            FilterNode::Comparison(column, op) => self.write_comparison(out, column, op)?,
            FilterNode::And(children) => self.write_filter_group(out, children, "AND")?,
            FilterNode::Or(children) => self.write_filter_group(out, children, "OR")?,
            FilterNode::Not(child) => {
                out.push_str("NOT ");
                possibly_parenthesized!(out, !child.is_group(), self.write_filter(out, child)?);
            }
        }
        Ok(())
    }

    fn write_filter_group(
        &self,
        out: &mut String,
        children: &[Filter],
        connective: &str,
    ) -> Result<()> {
        if children.is_empty() {
            return Err(QueryError::validation(format!(
                "{} group must contain at least one filter",
                connective
            )));
        }
        out.push_str("( ");
        let mut first = true;
        for child in children {
            if !first {
                out.push(' ');
                out.push_str(connective);
                out.push(' ');
            }
            first = false;
            self.write_filter(out, child)?;
        }
        out.push_str(" )");
        Ok(())
    }

    fn write_comparison(&self, out: &mut String, column: &str, op: &Operator) -> Result<()> {
        if !matches!(op, Operator::IsNull | Operator::IsNotNull) {
            self.require_dialect()?;
        }
        self.write_column_name(out, column);
        match op {
            Operator::Equal(v) if v.is_null() => out.push_str(" IS NULL"),
            Operator::NotEqual(v) if v.is_null() => out.push_str(" IS NOT NULL"),
            Operator::Equal(v) => self.write_binary_operand(out, " = ", v),
            Operator::NotEqual(v) => self.write_binary_operand(out, " <> ", v),
            Operator::Less(v) => self.write_binary_operand(out, " < ", v),
            Operator::LessEqual(v) => self.write_binary_operand(out, " <= ", v),
            Operator::Greater(v) => self.write_binary_operand(out, " > ", v),
            Operator::GreaterEqual(v) => self.write_binary_operand(out, " >= ", v),
            Operator::In(values) => {
                if values.is_empty() {
                    return Err(QueryError::validation(format!(
                        "IN list on `{}` must contain at least one value",
                        column
                    )));
                }
                out.push_str(" IN (");
                separated_by(out, values, |out, v| self.write_value(out, v), ", ");
                out.push(')');
            }
            Operator::Like(pattern, mode) => {
                out.push_str(" LIKE ");
                let pattern = match mode {
                    LikeMode::Contains => format!("%{}%", pattern),
                    LikeMode::StartsWith => format!("{}%", pattern),
                    LikeMode::EndsWith => format!("%{}", pattern),
                };
                self.write_value_string(out, &pattern);
            }
            Operator::Between(low, high) => {
                out.push_str(" BETWEEN ");
                self.write_value(out, low);
                out.push_str(" AND ");
                self.write_value(out, high);
            }
            Operator::IsNull => out.push_str(" IS NULL"),
            Operator::IsNotNull => out.push_str(" IS NOT NULL"),
        }
        Ok(())
    }

    fn write_binary_operand(&self, out: &mut String, op: &str, value: &Value) {
        out.push_str(op);
        self.write_value(out, value);
    }

    fn write_insert(&self, out: &mut String, table: &str, columns: &[&Parameter]) -> Result<()> {
        self.require_dialect()?;
        out.push_str("INSERT INTO ");
        self.write_table_name(out, table);
        out.push_str(" (");
        separated_by(
            out,
            columns,
            |out, v| self.write_column_name(out, &v.name),
            ", ",
        );
        out.push_str(") VALUES (");
        separated_by(out, columns, |out, v| self.write_value(out, v.value()), ", ");
        out.push(')');
        out.push_str(self.statement_terminator());
        Ok(())
    }

    fn write_insert_identity(
        &self,
        out: &mut String,
        table: &str,
        columns: &[&Parameter],
        identity_sql: Option<&str>,
    ) -> Result<()> {
        self.write_insert(out, table, columns)?;
        out.push(' ');
        out.push_str(identity_sql.unwrap_or(self.identity_expression()));
        Ok(())
    }

    fn write_update(
        &self,
        out: &mut String,
        table: &str,
        columns: &[&Parameter],
        filter: Option<&Filter>,
    ) -> Result<()> {
        self.require_dialect()?;
        out.push_str("UPDATE ");
        self.write_table_name(out, table);
        out.push_str(" SET ");
        separated_by(
            out,
            columns,
            |out, v| {
                self.write_column_name(out, &v.name);
                out.push_str(" = ");
                self.write_value(out, v.value());
            },
            ", ",
        );
        self.write_where(out, filter)?;
        out.push_str(self.statement_terminator());
        Ok(())
    }

    fn write_where(&self, out: &mut String, filter: Option<&Filter>) -> Result<()> {
        if let Some(filter) = filter {
            out.push_str(" WHERE ");
            self.write_filter(out, filter)?;
        }
        Ok(())
    }

    fn write_delete(&self, out: &mut String, table: &str, filter: Option<&Filter>) -> Result<()> {
        self.require_dialect()?;
        out.push_str("DELETE FROM ");
        self.write_table_name(out, table);
        self.write_where(out, filter)?;
        out.push_str(self.statement_terminator());
        Ok(())
    }

    /// Removes every row, or the table itself.
    fn write_drop(&self, out: &mut String, table: &str, purge: bool) -> Result<()> {
        self.require_dialect()?;
        out.push_str("DROP TABLE ");
        self.write_table_name(out, table);
        if purge {
            out.push_str(" PURGE");
        }
        out.push_str(self.statement_terminator());
        Ok(())
    }

    fn write_function_call(
        &self,
        out: &mut String,
        function: &str,
        args: &[&Parameter],
    ) -> Result<()> {
        self.require_dialect()?;
        out.push_str("SELECT * FROM ");
        self.write_function_invocation(out, function, args)?;
        out.push_str(self.statement_terminator());
        Ok(())
    }

    fn write_function_invocation(
        &self,
        out: &mut String,
        function: &str,
        args: &[&Parameter],
    ) -> Result<()> {
        self.write_table_name(out, function);
        out.push('(');
        try_separated_by(
            out,
            args,
            |out, v| {
                self.write_value(out, v.value());
                Ok(())
            },
            ", ",
        )?;
        out.push(')');
        Ok(())
    }
}

/// ANSI rendering without a concrete dialect.
///
/// Renders literals and null checks, everything else fails with an
/// unsupported-provider error.
#[derive(Default, Debug, Clone, Copy)]
pub struct NeutralSqlWriter;

impl NeutralSqlWriter {
    pub const fn new() -> Self {
        Self
    }
}

impl SqlWriter for NeutralSqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter {
        self
    }

    fn provider(&self) -> Provider {
        Provider::Neutral
    }

    fn identity_expression(&self) -> &'static str {
        ""
    }
}
