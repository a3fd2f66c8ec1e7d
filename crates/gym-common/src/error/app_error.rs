//! Application error type shared by the service and API layers

use gym_core::DomainError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Internal server error")]
    Internal(#[source] anyhow::Error),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// HTTP status for a domain error; budget overdraws are 422, not 400
    #[must_use]
    pub fn domain_status(err: &DomainError) -> u16 {
        if err.is_not_found() {
            404
        } else if err.is_unprocessable() {
            422
        } else if err.is_validation() {
            400
        } else if err.is_conflict() {
            409
        } else if err.is_infrastructure() {
            503
        } else {
            500
        }
    }

    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            // Storage is down; the caller may retry
            Self::Database(_) | Self::Cache(_) => 503,
            Self::Internal(_) | Self::Config(_) => 500,
            Self::Domain(e) => Self::domain_status(e),
        }
    }

    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Cache(_) => "CACHE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Domain(e) => e.code(),
        }
    }

    /// Structured numbers the client can use to correct the request
    #[must_use]
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::Domain(e) => e.details(),
            _ => None,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use gym_core::Snowflake;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::Validation("test".to_string()).status_code(), 400);
        assert_eq!(AppError::Database("test".to_string()).status_code(), 503);
        assert_eq!(AppError::Cache("test".to_string()).status_code(), 503);
        assert_eq!(AppError::Config("test".to_string()).status_code(), 500);
    }

    #[test]
    fn test_domain_status_codes() {
        let cases = [
            (DomainError::MemberNotFound(Snowflake::new(1)), 404),
            (DomainError::ValidationError("bad".into()), 400),
            (DomainError::FreezeBudgetExceeded { requested: 10, remaining: 5 }, 422),
            (DomainError::InvoiceNumberExists("INV-1".into()), 409),
            (DomainError::IdempotencyKeyInFlight, 409),
            (DomainError::IdempotencyKeyReused, 422),
            (DomainError::DatabaseError("down".into()), 503),
            (DomainError::InternalError("bug".into()), 500),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from(err).status_code(), status);
        }
    }

    #[test]
    fn test_domain_code_and_details_pass_through() {
        let err = AppError::from(DomainError::FreezeBudgetExceeded {
            requested: 10,
            remaining: 5,
        });

        assert_eq!(err.error_code(), "FREEZE_BUDGET_EXCEEDED");
        let details = err.details().unwrap();
        assert_eq!(details["requested_days"], 10);
        assert_eq!(details["remaining_freeze_days"], 5);
    }

    #[test]
    fn test_plain_errors_have_no_details() {
        let err = AppError::Config("DATABASE_URL missing".to_string());
        assert_eq!(err.error_code(), "CONFIG_ERROR");
        assert_eq!(err.to_string(), "Configuration error: DATABASE_URL missing");
        assert!(err.details().is_none());
    }
}
