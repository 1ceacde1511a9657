//! Store Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A store error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("database error")]
    Database,
    #[display("database migration error")]
    Migration,
    /// A stored value could not be converted back into the model.
    #[display("invalid stored data: {_0}")]
    InvalidData(#[error(not(source))] &'static str),
    /// A submitted record failed validation before touching the database.
    #[display("invalid statique record")]
    InvalidRecord,
    /// A lookup that must succeed found nothing (unknown charge point,
    /// unregistered operational unit).
    #[display("object does not exist: {_0}")]
    ObjectDoesNotExist(#[error(not(source))] String),
    /// More than one stored row matches a uniqueness key that should select
    /// at most one. The store is inconsistent.
    #[display("several {entity} rows match {key}")]
    AmbiguousMatch { entity: &'static str, key: String },
    /// The same charge point identifier appears more than once in one submission.
    #[display("duplicate charge points in submission: {}", _0.join(", "))]
    DuplicateSubmission(#[error(not(source))] Vec<String>),
    /// The caller drove an API out of order. Not recoverable by retrying.
    #[display("programming error: {_0}")]
    ProgrammingError(#[error(not(source))] String),
    /// The database refused a write (uniqueness, check or foreign key constraint).
    #[display("integrity error: {_0}")]
    IntegrityError(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // A busy or locked database may free up; everything else is deterministic.
        matches!(self, Self::Database)
    }
}

/// Attaches the right [`ErrorKind`] to a failed sqlx call, telling constraint
/// violations apart from other database failures.
pub(crate) trait SqlxResultExt<T> {
    fn or_classify(self) -> Result<T>;
}
impl<T> SqlxResultExt<T> for std::result::Result<T, sqlx::Error> {
    #[track_caller]
    fn or_classify(self) -> Result<T> {
        match self {
            Ok(value) => Ok(value),
            Err(err) => {
                let kind = classify(&err);
                exn::ResultExt::or_raise(Err(err), || kind)
            },
        }
    }
}

fn classify(err: &sqlx::Error) -> ErrorKind {
    match err {
        sqlx::Error::Database(db)
            if db.is_unique_violation() || db.is_foreign_key_violation() || db.is_check_violation() =>
        {
            ErrorKind::IntegrityError(db.message().to_string())
        },
        _ => ErrorKind::Database,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_database_errors_are_retryable() {
        assert!(ErrorKind::Database.is_retryable());
        assert!(!ErrorKind::IntegrityError("UNIQUE constraint failed".into()).is_retryable());
        assert!(!ErrorKind::DuplicateSubmission(vec!["FR123P000001".into()]).is_retryable());
    }

    #[test]
    fn test_duplicate_submission_lists_identifiers() {
        let kind = ErrorKind::DuplicateSubmission(vec!["FR123P000001".into(), "FR123P000002".into()]);
        assert_eq!(kind.to_string(), "duplicate charge points in submission: FR123P000001, FR123P000002");
    }

    #[test]
    fn test_non_constraint_errors_are_database_errors() {
        let err: Result<()> = Err(sqlx::Error::RowNotFound).or_classify();
        assert!(matches!(&*err.unwrap_err(), ErrorKind::Database));
    }
}
