use crate::{Error, Provider, separated_by};

/// Failures raised by this layer before or around execution.
///
/// They travel inside [`Error`](crate::Error), callers recover the kind with
/// `error.downcast_ref::<QueryError>()`. Backend failures are never wrapped
/// into this type, they reach the caller unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    /// Malformed input to a constructor or builder, detected before any I/O.
    #[error("Invalid input: {0}")]
    Validation(String),
    /// The dialect has no renderer.
    #[error("Unsupported provider `{provider}`, expected one of: {}", supported())]
    UnsupportedProvider { provider: Provider },
    /// Strict auto parsing met a column without a target field.
    #[error("Column `{column}` does not match any field of {target}")]
    Mapping { column: String, target: &'static str },
}

fn supported() -> String {
    let mut out = String::new();
    separated_by(&mut out, Provider::SUPPORTED, |out, v| out.push_str(v.name()), ", ");
    out
}

impl QueryError {
    pub fn validation(message: impl Into<String>) -> Error {
        Error::new(QueryError::Validation(message.into()))
    }
    pub fn unsupported_provider(provider: Provider) -> Error {
        Error::new(QueryError::UnsupportedProvider { provider })
    }
    pub fn mapping(column: impl Into<String>, target: &'static str) -> Error {
        Error::new(QueryError::Mapping {
            column: column.into(),
            target,
        })
    }
    pub fn is_validation(&self) -> bool {
        matches!(self, QueryError::Validation(..))
    }
    pub fn is_unsupported_provider(&self) -> bool {
        matches!(self, QueryError::UnsupportedProvider { .. })
    }
    pub fn is_mapping(&self) -> bool {
        matches!(self, QueryError::Mapping { .. })
    }
}

/// Extracts the [`QueryError`] kind carried by an error, if any.
pub fn query_error(error: &Error) -> Option<&QueryError> {
    error.downcast_ref::<QueryError>()
}

#[cfg(test)]
mod tests {
    use super::{QueryError, query_error};
    use crate::{Context, Provider};

    #[test]
    fn messages() {
        let error = QueryError::validation("And needs at least one child");
        assert_eq!(
            error.to_string(),
            "Invalid input: And needs at least one child"
        );
        let error = QueryError::mapping("Notes", "Person");
        assert_eq!(
            error.to_string(),
            "Column `Notes` does not match any field of Person"
        );
        let error = QueryError::unsupported_provider(Provider::Neutral);
        assert!(error.to_string().contains("SqlServer, Oracle"));
    }

    #[test]
    fn kind_survives_context() {
        let error = Err::<(), _>(QueryError::mapping("Notes", "Person"))
            .context("While reading People")
            .unwrap_err();
        let kind = query_error(&error).unwrap();
        assert!(kind.is_mapping());
        assert!(!kind.is_validation());
        assert_eq!(
            *kind,
            QueryError::Mapping {
                column: "Notes".into(),
                target: "Person",
            }
        );
    }
}
