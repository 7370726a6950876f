use std::fmt::{Display, Formatter};

/// Ordering direction for list queries, rendered directly into the
/// `ORDER BY` clause of a built query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbOrder {
    Asc,
    Desc,
}

impl Display for DbOrder {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Asc => write!(f, "ASC"),
            Self::Desc => write!(f, "DESC"),
        }
    }
}
