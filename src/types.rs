use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// unique identifier for a member
pub type MemberId = Uuid;

/// unique identifier for a loan
pub type LoanId = Uuid;

/// unique identifier for a loan request
pub type RequestId = Uuid;

/// unique identifier for a payment
pub type PaymentId = Uuid;

/// unique identifier for a fixed-term saving
pub type SavingId = Uuid;

/// loan status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoanStatus {
    /// loan active and on schedule
    Current,
    /// behind on the weekly schedule
    Overdue,
    /// fully repaid
    Paid,
    /// terminated by an administrator
    Cancelled,
}

impl LoanStatus {
    /// terminal loans are immutable
    pub fn is_terminal(self) -> bool {
        matches!(self, LoanStatus::Paid | LoanStatus::Cancelled)
    }

    pub fn accepts_payments(self) -> bool {
        matches!(self, LoanStatus::Current | LoanStatus::Overdue)
    }
}

/// loan request status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestStatus {
    /// awaiting review
    Pending,
    /// reviewed and materialized into a loan
    Approved,
    /// reviewed and declined
    Rejected,
}

impl RequestStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }
}

/// fixed-term saving status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SavingStatus {
    /// accruing toward its end date
    Active,
    /// reached its end date and paid out
    Matured,
    /// closed before maturity
    Cancelled,
}

impl SavingStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, SavingStatus::Active)
    }
}

/// credit rating tier derived from a member's numeric score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CreditRating {
    Green,
    Yellow,
    Red,
}

/// classification of a week in a loan's payment schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduleSlot {
    /// a payment was recorded for this week
    Paid,
    /// due but no payment recorded yet
    Pending,
    /// not yet reached
    Upcoming,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loan_terminal_states() {
        assert!(LoanStatus::Paid.is_terminal());
        assert!(LoanStatus::Cancelled.is_terminal());
        assert!(!LoanStatus::Current.is_terminal());
        assert!(!LoanStatus::Overdue.is_terminal());
    }

    #[test]
    fn test_loan_payment_acceptance() {
        assert!(LoanStatus::Current.accepts_payments());
        assert!(LoanStatus::Overdue.accepts_payments());
        assert!(!LoanStatus::Paid.accepts_payments());
        assert!(!LoanStatus::Cancelled.accepts_payments());
    }

    #[test]
    fn test_request_terminal_states() {
        assert!(!RequestStatus::Pending.is_terminal());
        assert!(RequestStatus::Approved.is_terminal());
        assert!(RequestStatus::Rejected.is_terminal());
    }

    #[test]
    fn test_saving_terminal_states() {
        assert!(!SavingStatus::Active.is_terminal());
        assert!(SavingStatus::Matured.is_terminal());
        assert!(SavingStatus::Cancelled.is_terminal());
    }
}
