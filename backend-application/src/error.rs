use thiserror::Error;

use backend_domain::{EventId, Guest, SouvenirTakeView, StoreError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    SoldOut(String),
    #[error("{0}")]
    NoEligibleGuests(String),
    #[error("souvenir already taken by this guest")]
    AlreadyTaken {
        guest: Box<Guest>,
        history: Vec<SouvenirTakeView>,
    },
    #[error("{0}")]
    Precondition(String),
    #[error("event {expected} is no longer active (active event is {active})")]
    StaleEvent { expected: EventId, active: EventId },
    #[error("conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for AppError {
    fn from(value: StoreError) -> Self {
        match value {
            err @ StoreError::NotFound { .. } => AppError::NotFound(err.to_string()),
            StoreError::NoActiveEvent => AppError::Precondition("no active event".to_string()),
            StoreError::StaleEvent { expected, active } => AppError::StaleEvent { expected, active },
            StoreError::SoldOut => AppError::SoldOut("sold out".to_string()),
            err @ StoreError::GuestIneligible => AppError::Conflict(err.to_string()),
            err @ StoreError::DuplicateGuestId(_) => AppError::Conflict(err.to_string()),
            StoreError::Precondition(message) => AppError::Precondition(message),
            StoreError::Conflict(message) => AppError::Conflict(message),
            StoreError::Internal(err) => AppError::Internal(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_keep_their_meaning() {
        assert!(matches!(
            AppError::from(StoreError::not_found("guest", "G404")),
            AppError::NotFound(message) if message.contains("G404")
        ));
        assert!(matches!(AppError::from(StoreError::SoldOut), AppError::SoldOut(_)));
        assert!(matches!(
            AppError::from(StoreError::StaleEvent {
                expected: EventId(1),
                active: EventId(2)
            }),
            AppError::StaleEvent { .. }
        ));
        assert!(matches!(
            AppError::from(StoreError::DuplicateGuestId("G1".to_string())),
            AppError::Conflict(_)
        ));
    }
}
