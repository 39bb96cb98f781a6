use crate::{Error, OracleSqlWriter, QueryError, Result, SqlServerSqlWriter, SqlWriter};
use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

/// SQL dialect used to select rendering rules.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    SqlServer,
    Oracle,
    #[default]
    Neutral,
}

impl Provider {
    /// Dialects with a statement renderer.
    pub const SUPPORTED: [Provider; 2] = [Provider::SqlServer, Provider::Oracle];

    pub const fn name(&self) -> &'static str {
        match self {
            Provider::SqlServer => "SqlServer",
            Provider::Oracle => "Oracle",
            Provider::Neutral => "Neutral",
        }
    }

    pub fn is_supported(&self) -> bool {
        Self::SUPPORTED.contains(self)
    }

    /// Explicit override first, then the attached hint, then the configured default.
    pub fn resolve(
        explicit: Option<Provider>,
        attached: Option<Provider>,
        default: Option<Provider>,
    ) -> Option<Provider> {
        explicit.or(attached).or(default)
    }

    /// The writer rendering this dialect.
    pub fn sql_writer(self) -> Result<&'static dyn SqlWriter> {
        static SQL_SERVER: SqlServerSqlWriter = SqlServerSqlWriter::new();
        static ORACLE: OracleSqlWriter = OracleSqlWriter::new();
        match self {
            Provider::SqlServer => Ok(&SQL_SERVER),
            Provider::Oracle => Ok(&ORACLE),
            other => Err(QueryError::unsupported_provider(other)),
        }
    }
}

impl Display for Provider {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Provider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let value = s.trim();
        if value.eq_ignore_ascii_case("sqlserver") || value.eq_ignore_ascii_case("mssql") {
            Ok(Provider::SqlServer)
        } else if value.eq_ignore_ascii_case("oracle") {
            Ok(Provider::Oracle)
        } else if value.eq_ignore_ascii_case("neutral") {
            Ok(Provider::Neutral)
        } else {
            Err(QueryError::validation(format!(
                "`{}` is not a known provider",
                value
            )))
        }
    }
}
