use std::fmt;
use std::sync::Arc;

/// Relational operator used in a rendered predicate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `=`
    #[default]
    Equal,
    /// `<>`
    NotEqual,
    /// `>`
    GreaterThan,
    /// `>=`
    GreaterThanOrEqual,
    /// `<`
    LessThan,
    /// `<=`
    LessThanOrEqual,
    /// `LIKE`
    Like,
    /// `NOT LIKE`
    NotLike,
    /// `IS NULL`, binds no parameter
    IsNull,
    /// `IS NOT NULL`, binds no parameter
    IsNotNull,
}

impl Operator {
    /// SQL token for the operator.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Equal => "=",
            Self::NotEqual => "<>",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqual => ">=",
            Self::LessThan => "<",
            Self::LessThanOrEqual => "<=",
            Self::Like => "LIKE",
            Self::NotLike => "NOT LIKE",
            Self::IsNull => "IS NULL",
            Self::IsNotNull => "IS NOT NULL",
        }
    }

    /// Whether the rendered predicate references a parameter.
    #[must_use]
    pub const fn takes_parameter(self) -> bool {
        !matches!(self, Self::IsNull | Self::IsNotNull)
    }
}

/// Sort direction of an `ORDER BY` term.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortDirection {
    /// `ASC`
    #[default]
    Ascending,
    /// `DESC`
    Descending,
}

impl SortDirection {
    /// SQL keyword for the direction.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

/// An immutable, pre-rendered `WHERE` fragment.
///
/// Cloning is cheap: clones share the rendered text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Predicate(Arc<str>);

impl Predicate {
    pub(crate) fn new(sql: impl Into<Arc<str>>) -> Self {
        Self(sql.into())
    }

    /// Combine two predicates with a logical `AND`.
    #[must_use]
    pub fn and(&self, other: &Self) -> Self {
        Self::new(format!("{} AND {}", self.0, other.0))
    }

    /// The rendered SQL text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether both values share the same rendered text allocation.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Predicate {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// An immutable, pre-rendered `ORDER BY` term.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SortTerm(Arc<str>);

impl SortTerm {
    pub(crate) fn new(sql: impl Into<Arc<str>>) -> Self {
        Self(sql.into())
    }

    /// Append another sort term as a lower-priority key.
    #[must_use]
    pub fn then(&self, other: &Self) -> Self {
        Self::new(format!("{}, {}", self.0, other.0))
    }

    /// The rendered SQL text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether both values share the same rendered text allocation.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Display for SortTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SortTerm {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
