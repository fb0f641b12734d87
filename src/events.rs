use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{CreditRating, LoanId, MemberId, PaymentId, RequestId, SavingId};

/// all events emitted by cooperative operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // member registry events
    MemberEnrolled {
        member_id: MemberId,
        dni: String,
        rating: CreditRating,
        timestamp: DateTime<Utc>,
    },
    MemberDeactivated {
        member_id: MemberId,
        timestamp: DateTime<Utc>,
    },
    CreditRatingChanged {
        member_id: MemberId,
        old_rating: CreditRating,
        new_rating: CreditRating,
        score: u8,
        timestamp: DateTime<Utc>,
    },

    // loan lifecycle events
    LoanCreated {
        loan_id: LoanId,
        member_id: MemberId,
        amount: Money,
        weekly_payment: Money,
        total_weeks: u32,
        due_date: NaiveDate,
        timestamp: DateTime<Utc>,
    },
    PaymentReceived {
        loan_id: LoanId,
        payment_id: PaymentId,
        amount: Money,
        week_number: u32,
        remaining_amount: Money,
        timestamp: DateTime<Utc>,
    },
    LoanPaidOff {
        loan_id: LoanId,
        timestamp: DateTime<Utc>,
    },
    LoanFellOverdue {
        loan_id: LoanId,
        weeks_elapsed: u32,
        current_week: u32,
        timestamp: DateTime<Utc>,
    },
    LoanCancelled {
        loan_id: LoanId,
        remaining_amount: Money,
        timestamp: DateTime<Utc>,
    },

    // request workflow events
    RequestSubmitted {
        request_id: RequestId,
        member_id: MemberId,
        amount: Money,
        timestamp: DateTime<Utc>,
    },
    RequestApproved {
        request_id: RequestId,
        loan_id: LoanId,
        reviewed_by: String,
        timestamp: DateTime<Utc>,
    },
    RequestRejected {
        request_id: RequestId,
        reviewed_by: String,
        timestamp: DateTime<Utc>,
    },

    // fixed savings events
    SavingOpened {
        saving_id: SavingId,
        member_id: MemberId,
        amount: Money,
        maturity_amount: Money,
        end_date: NaiveDate,
        timestamp: DateTime<Utc>,
    },
    SavingMatured {
        saving_id: SavingId,
        payout: Money,
        timestamp: DateTime<Utc>,
    },
    SavingCancelled {
        saving_id: SavingId,
        timestamp: DateTime<Utc>,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
