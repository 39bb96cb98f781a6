use crate::{Config, NeutralSqlWriter, Provider, QueryError, Result, SqlWriter, Value};
use std::ops::Bound;

/// Placement of the wildcard in a `LIKE` pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LikeMode {
    /// `'%x%'`
    Contains,
    /// `'x%'`
    StartsWith,
    /// `'%x'`
    EndsWith,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operator {
    Equal(Value),
    NotEqual(Value),
    Less(Value),
    LessEqual(Value),
    Greater(Value),
    GreaterEqual(Value),
    In(Vec<Value>),
    /// The pattern is written as is, wildcards it contains are kept.
    Like(String, LikeMode),
    /// Both ends included.
    Between(Value, Value),
    IsNull,
    IsNotNull,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterNode {
    /// Raw SQL fragment, written verbatim.
    Literal(String),
    Comparison(String, Operator),
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Box<Filter>),
}

/// Portable predicate rendered into a dialect specific `WHERE` fragment.
///
/// A filter is immutable once built, only the provider hint can be attached
/// later. Rendering never mutates it, so rendering the same filter twice
/// yields the same text.
///
/// ```rust
/// use sluice_core::{Config, Filter, Provider};
/// let filter = Filter::and([
///     Filter::equals("Status", "active"),
///     Filter::greater_than("Age", 18),
/// ]);
/// assert_eq!(
///     filter.render(Some(Provider::SqlServer), &Config::default()).unwrap(),
///     "( Status = 'active' AND Age > 18 )"
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub(crate) node: FilterNode,
    provider: Option<Provider>,
}

impl Filter {
    pub fn new(node: FilterNode) -> Self {
        Self {
            node,
            provider: None,
        }
    }

    fn comparison(column: impl Into<String>, op: Operator) -> Self {
        Self::new(FilterNode::Comparison(column.into(), op))
    }

    pub fn literal(sql: impl Into<String>) -> Self {
        Self::new(FilterNode::Literal(sql.into()))
    }

    /// A null operand renders `IS NULL`.
    pub fn equals(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::comparison(column, Operator::Equal(value.into()))
    }

    /// A null operand renders `IS NOT NULL`.
    pub fn not_equals(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::comparison(column, Operator::NotEqual(value.into()))
    }

    pub fn less_than(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::comparison(column, Operator::Less(value.into()))
    }

    pub fn less_than_or_equals(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::comparison(column, Operator::LessEqual(value.into()))
    }

    pub fn greater_than(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::comparison(column, Operator::Greater(value.into()))
    }

    pub fn greater_than_or_equals(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::comparison(column, Operator::GreaterEqual(value.into()))
    }

    /// An empty list fails at render time.
    pub fn in_list<V: Into<Value>>(
        column: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self::comparison(
            column,
            Operator::In(values.into_iter().map(Into::into).collect()),
        )
    }

    pub fn like(column: impl Into<String>, pattern: impl Into<String>, mode: LikeMode) -> Self {
        Self::comparison(column, Operator::Like(pattern.into(), mode))
    }

    /// `low <= column <= high`
    pub fn between(
        column: impl Into<String>,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> Self {
        Self::comparison(column, Operator::Between(low.into(), high.into()))
    }

    /// `low < column < high`
    pub fn between_exclusive<V: Into<Value>>(
        column: impl Into<String>,
        low: V,
        high: V,
    ) -> Self {
        Self::range(column, Bound::Excluded(low), Bound::Excluded(high))
    }

    /// Range with an independent policy per side.
    ///
    /// Both sides included render `BETWEEN`, otherwise each bounded side
    /// becomes a strict or non strict comparison joined by `AND`. Unbounded
    /// sides are left out, leaving both unbounded produces an empty group
    /// that fails at render time.
    pub fn range<V: Into<Value>>(
        column: impl Into<String>,
        low: Bound<V>,
        high: Bound<V>,
    ) -> Self {
        let column = column.into();
        match (low, high) {
            (Bound::Included(low), Bound::Included(high)) => {
                Self::between(column, low, high)
            }
            (low, high) => {
                let mut parts = Vec::with_capacity(2);
                match low {
                    Bound::Included(v) => parts.push(Self::greater_than_or_equals(&*column, v)),
                    Bound::Excluded(v) => parts.push(Self::greater_than(&*column, v)),
                    Bound::Unbounded => {}
                }
                match high {
                    Bound::Included(v) => parts.push(Self::less_than_or_equals(&*column, v)),
                    Bound::Excluded(v) => parts.push(Self::less_than(&*column, v)),
                    Bound::Unbounded => {}
                }
                if parts.len() == 1 {
                    parts.remove(0)
                } else {
                    Self::and(parts)
                }
            }
        }
    }

    pub fn is_null(column: impl Into<String>) -> Self {
        Self::comparison(column, Operator::IsNull)
    }

    pub fn is_not_null(column: impl Into<String>) -> Self {
        Self::comparison(column, Operator::IsNotNull)
    }

    /// An empty group fails at render time.
    pub fn and(children: impl IntoIterator<Item = Filter>) -> Self {
        Self::new(FilterNode::And(children.into_iter().collect()))
    }

    pub fn or(children: impl IntoIterator<Item = Filter>) -> Self {
        Self::new(FilterNode::Or(children.into_iter().collect()))
    }

    /// Negates `child`. A child that is already a negation is rejected, remove
    /// the double negation instead.
    pub fn not(child: Filter) -> Result<Self> {
        if matches!(child.node, FilterNode::Not(..)) {
            return Err(QueryError::validation(
                "NOT cannot wrap another NOT, remove the double negation",
            ));
        }
        Ok(Self::new(FilterNode::Not(Box::new(child))))
    }

    pub fn with_provider(mut self, provider: Provider) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn set_provider(&mut self, provider: Option<Provider>) {
        self.provider = provider;
    }

    pub fn provider(&self) -> Option<Provider> {
        self.provider
    }

    pub fn node(&self) -> &FilterNode {
        &self.node
    }

    /// Whether this is an `AND` / `OR` group, already parenthesized when rendered.
    pub fn is_group(&self) -> bool {
        matches!(self.node, FilterNode::And(..) | FilterNode::Or(..))
    }

    /// Renders the predicate.
    ///
    /// The dialect is the first of `provider`, the attached hint and
    /// `config.provider`. Children always use the dialect resolved here.
    pub fn render(&self, provider: Option<Provider>, config: &Config) -> Result<String> {
        let provider =
            Provider::resolve(provider, self.provider, config.provider).unwrap_or_default();
        let mut out = String::with_capacity(64);
        writer_for(provider).write_filter(&mut out, self)?;
        Ok(out)
    }
}

/// The dialect writer, or the neutral one that only handles dialect free nodes.
fn writer_for(provider: Provider) -> &'static dyn SqlWriter {
    static NEUTRAL: NeutralSqlWriter = NeutralSqlWriter::new();
    provider.sql_writer().unwrap_or(&NEUTRAL)
}
