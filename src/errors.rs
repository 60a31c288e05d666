//! Error types for storefront operations.

use crate::ValidationError;

/// Errors that can occur during catalog store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The requested item, or an item the write refers to, was not found.
    NotFound,
    /// An item with the same unique key already exists.
    AlreadyExists,
    /// The write would break a catalog invariant and was rejected.
    Validation(ValidationError),
    /// An internal storage system error occurred.
    Internal(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(f, "Item not found in catalog"),
            Self::AlreadyExists => write!(f, "Item already exists in catalog"),
            Self::Validation(err) => write!(f, "{}", err),
            Self::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl From<ValidationError> for StoreError {
    fn from(err: ValidationError) -> Self {
        StoreError::Validation(err)
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                StoreError::AlreadyExists
            }
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                StoreError::NotFound
            }
            _ => StoreError::Internal(e.to_string()),
        }
    }
}

impl std::error::Error for StoreError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_is_passed_through() {
        let err = StoreError::from(ValidationError::DuplicateOrder { order: 2 });
        assert_eq!(err.to_string(), "Duplicate value.");
    }

    #[test]
    fn row_not_found_maps_to_not_found() {
        assert_eq!(StoreError::from(sqlx::Error::RowNotFound), StoreError::NotFound);
    }
}
