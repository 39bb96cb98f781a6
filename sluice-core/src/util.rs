use crate::Result;

pub fn separated_by<T, F>(
    out: &mut String,
    values: impl IntoIterator<Item = T>,
    mut f: F,
    separator: &str,
) where
    F: FnMut(&mut String, T),
{
    let mut len = out.len();
    for v in values {
        if out.len() > len {
            out.push_str(separator);
        }
        len = out.len();
        f(out, v);
    }
}

/// Like [`separated_by`] but stops at the first error.
pub fn try_separated_by<T, F>(
    out: &mut String,
    values: impl IntoIterator<Item = T>,
    mut f: F,
    separator: &str,
) -> Result<()>
where
    F: FnMut(&mut String, T) -> Result<()>,
{
    let mut len = out.len();
    for v in values {
        if out.len() > len {
            out.push_str(separator);
        }
        len = out.len();
        f(out, v)?;
    }
    Ok(())
}

/// Removes every whitespace character, `First Name` becomes `FirstName`.
pub fn strip_whitespace(value: &str) -> String {
    value.chars().filter(|c| !c.is_whitespace()).collect()
}

#[macro_export]
macro_rules! possibly_parenthesized {
    ($buff:ident, $cond:expr, $v:expr) => {
        if $cond {
            $buff.push('(');
            $v;
            $buff.push(')');
        } else {
            $v;
        }
    };
}

#[macro_export]
macro_rules! truncate_long {
    ($query:expr) => {
        format_args!(
            "{}{}",
            &$query[..$query
                .char_indices()
                .nth(497)
                .map(|(i, _)| i)
                .unwrap_or($query.len())]
                .trim_end(),
            if $query.chars().nth(497).is_some() {
                "..."
            } else {
                ""
            },
        )
    };
}

#[cfg(test)]
mod tests {
    use super::{separated_by, strip_whitespace, try_separated_by};
    use crate::Error;

    #[test]
    fn separated() {
        let mut out = String::from("(");
        separated_by(&mut out, [1, 2, 3], |out, v| out.push_str(&v.to_string()), ", ");
        out.push(')');
        assert_eq!(out, "(1, 2, 3)");
    }

    #[test]
    fn separated_skips_empty_items() {
        let mut out = String::new();
        separated_by(
            &mut out,
            ["a", "", "b"],
            |out, v| out.push_str(v),
            " AND ",
        );
        assert_eq!(out, "a AND b");
    }

    #[test]
    fn try_separated_stops() {
        let mut out = String::new();
        let result = try_separated_by(
            &mut out,
            [1, 2, 3],
            |out, v| {
                if v == 3 {
                    return Err(Error::msg("three"));
                }
                out.push_str(&v.to_string());
                Ok(())
            },
            ",",
        );
        assert!(result.is_err());
        assert_eq!(out, "1,2,");
    }

    #[test]
    fn whitespace() {
        assert_eq!(strip_whitespace("First Name"), "FirstName");
        assert_eq!(strip_whitespace(" a\tb\nc "), "abc");
    }

    #[test]
    fn truncate() {
        let short = "SELECT 1";
        assert_eq!(format!("{}", truncate_long!(short)), "SELECT 1");
        let long = "x".repeat(600);
        let truncated = format!("{}", truncate_long!(long));
        assert_eq!(truncated.len(), 500);
        assert!(truncated.ends_with("..."));
    }
}
