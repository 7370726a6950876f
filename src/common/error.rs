use std::fmt::{Debug, Display, Formatter};

/// Syntax sugar type for repository results carrying a single entity
pub type DbResultSingle<T> = Result<T, DbError>;
/// Syntax sugar type for repository results carrying multiple entities
pub type DbResultMultiple<T> = Result<Vec<T>, DbError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusinessLogicErrorKind {
    // User errors
    UserDoesNotExist,
    UserEmailAlreadyExists,
    UserUpdateParametersEmpty,
    // Comment errors
    CommentDoesNotExist,
    CommentTextEmpty,
    ReplyNestingLimitExceeded,
    UserNotOwnerOfComment,
    // Like errors
    LikesDisabledOnReplies,
}

impl Display for BusinessLogicErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UserDoesNotExist => {
                write!(f, "The specified user does not exist!")
            }
            Self::UserEmailAlreadyExists => {
                write!(f, "A user with this email address already exists!")
            }
            Self::UserUpdateParametersEmpty => {
                write!(
                    f,
                    "The provided parameters for User update query are incorrect \
                    (no User field would be changed)."
                )
            }
            Self::CommentDoesNotExist => {
                write!(f, "The specified comment does not exist!")
            }
            Self::CommentTextEmpty => {
                write!(f, "The comment text must not be empty!")
            }
            Self::ReplyNestingLimitExceeded => {
                write!(f, "Replies can only be added to top-level comments!")
            }
            Self::UserNotOwnerOfComment => {
                write!(f, "The user is not the author of this comment!")
            }
            Self::LikesDisabledOnReplies => {
                write!(f, "Likes are disabled on replies!")
            }
        }
    }
}

/// Error type representing a Business Logic Error in the database layer
///
/// Usually, the error is meant to be surfaced to the caller as a rejected
/// request rather than logged as a database failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusinessLogicError {
    pub error: BusinessLogicErrorKind,
}

impl BusinessLogicError {
    /// Business Logic Error constructor
    #[must_use]
    #[inline]
    pub const fn new(error: BusinessLogicErrorKind) -> Self {
        Self { error }
    }
}

impl Display for BusinessLogicError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Business logic error: {}", self.error)
    }
}

impl std::error::Error for BusinessLogicError {}

/// Error encapsulating every failure mode of the database layer: driver and
/// migration errors from sqlx, and business logic violations raised by the
/// repositories themselves
pub struct DbError {
    pub business_error: Option<BusinessLogicError>,
    description: String,
}

impl DbError {
    /// Database Error constructor for errors with no business logic meaning
    #[must_use]
    #[inline]
    pub fn new(description: &str) -> Self {
        Self {
            business_error: None,
            description: description.to_owned(),
        }
    }

    /// Returns true when the error was caused by the given business logic violation
    #[must_use]
    #[inline]
    pub fn is(&self, kind: BusinessLogicErrorKind) -> bool {
        self.business_error
            .is_some_and(|business| business.error == kind)
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[Database Error] {}", self.description)
    }
}

impl Debug for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self}")
    }
}

impl std::error::Error for DbError {}

impl From<BusinessLogicError> for DbError {
    fn from(value: BusinessLogicError) -> Self {
        Self {
            description: value.to_string(),
            business_error: Some(value),
        }
    }
}

impl From<sqlx::Error> for DbError {
    fn from(value: sqlx::Error) -> Self {
        Self::new(&format!("sqlx error: {value}"))
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(value: sqlx::migrate::MigrateError) -> Self {
        Self::new(&format!("Migration error: {value}"))
    }
}
