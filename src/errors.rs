use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::decimal::Money;
use crate::types::{LoanStatus, RequestStatus, SavingStatus};

/// broad failure categories for transport-layer translation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// entity missing
    NotFound,
    /// operation illegal for the entity's current status
    InvalidState,
    /// uniqueness or append-only rule violated
    ConstraintViolation,
    /// borrowing capacity gate failed
    CapacityExceeded,
    /// malformed input rejected at the boundary
    Validation,
}

#[derive(Error, Debug)]
pub enum CoopError {
    #[error("member not found: {id}")]
    MemberNotFound { id: Uuid },

    #[error("loan not found: {id}")]
    LoanNotFound { id: Uuid },

    #[error("loan request not found: {id}")]
    RequestNotFound { id: Uuid },

    #[error("fixed saving not found: {id}")]
    SavingNotFound { id: Uuid },

    #[error("member {id} is inactive")]
    MemberInactive { id: Uuid },

    #[error("member {id} still has current or overdue loans")]
    MemberHasActiveLoans { id: Uuid },

    #[error("a member with dni {dni} already exists")]
    DuplicateDni { dni: String },

    #[error("member {member_id} already has a pending request")]
    DuplicatePendingRequest { member_id: Uuid },

    #[error("week {week_number} of loan {loan_id} already has a payment")]
    DuplicatePayment { loan_id: Uuid, week_number: u32 },

    #[error("requested {requested} exceeds available capacity {available}")]
    CapacityExceeded { requested: Money, available: Money },

    #[error("loan does not accept payments: current status is {status:?}")]
    LoanNotPayable { status: LoanStatus },

    #[error("loan cannot be cancelled: current status is {status:?}")]
    LoanNotCancellable { status: LoanStatus },

    #[error("request already reviewed: current status is {status:?}")]
    RequestNotPending { status: RequestStatus },

    #[error("saving is not active: current status is {status:?}")]
    SavingNotActive { status: SavingStatus },

    #[error("saving has not reached its end date {end_date}")]
    NotYetMatured { end_date: NaiveDate },

    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

impl CoopError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        CoopError::InvalidInput {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            CoopError::MemberNotFound { .. }
            | CoopError::LoanNotFound { .. }
            | CoopError::RequestNotFound { .. }
            | CoopError::SavingNotFound { .. } => ErrorKind::NotFound,

            CoopError::MemberInactive { .. }
            | CoopError::MemberHasActiveLoans { .. }
            | CoopError::LoanNotPayable { .. }
            | CoopError::LoanNotCancellable { .. }
            | CoopError::RequestNotPending { .. }
            | CoopError::SavingNotActive { .. }
            | CoopError::NotYetMatured { .. } => ErrorKind::InvalidState,

            CoopError::DuplicateDni { .. }
            | CoopError::DuplicatePendingRequest { .. }
            | CoopError::DuplicatePayment { .. } => ErrorKind::ConstraintViolation,

            CoopError::CapacityExceeded { .. } => ErrorKind::CapacityExceeded,

            CoopError::InvalidInput { .. } => ErrorKind::Validation,
        }
    }
}

pub type Result<T> = std::result::Result<T, CoopError>;
