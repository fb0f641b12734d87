use chrono::{DateTime, Utc};
use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cooperative::Cooperative;
use crate::decimal::{Money, Rate};
use crate::errors::{CoopError, Result};
use crate::events::Event;
use crate::members::PaymentCapacity;
use crate::types::{LoanId, MemberId, RequestId, RequestStatus};

use super::NewLoan;

/// loan request record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanRequest {
    pub id: RequestId,
    pub member_id: MemberId,
    pub requested_amount: Money,
    pub purpose: String,
    pub status: RequestStatus,
    pub request_date: DateTime<Utc>,
    pub reviewed_by: Option<String>,
    pub review_date: Option<DateTime<Utc>>,
    /// set once the request is approved and materialized
    pub loan_id: Option<LoanId>,
    pub notes: Option<String>,
}

/// request submission input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRequest {
    pub member_id: MemberId,
    pub amount: Money,
    pub purpose: String,
}

impl NewRequest {
    pub fn validate(&self) -> Result<()> {
        if !self.amount.is_positive() {
            return Err(CoopError::invalid_input(
                "requested amount must be positive",
            ));
        }
        if self.purpose.trim().is_empty() {
            return Err(CoopError::invalid_input("purpose cannot be empty"));
        }
        Ok(())
    }
}

/// terms fixed by the reviewer at approval time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalTerms {
    pub monthly_rate: Rate,
    pub total_weeks: u32,
    pub notes: Option<String>,
}

/// capacity snapshot for a review screen
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapacityReview {
    pub capacity: PaymentCapacity,
    pub requested: Money,
    pub can_approve: bool,
}

impl Cooperative {
    /// submit a request; a member carries at most one pending request
    pub fn submit_request(
        &mut self,
        new: NewRequest,
        time: &SafeTimeProvider,
    ) -> Result<LoanRequest> {
        new.validate()?;

        let member = self
            .store
            .member(new.member_id)
            .ok_or(CoopError::MemberNotFound { id: new.member_id })?;
        if !member.is_active {
            return Err(CoopError::MemberInactive { id: new.member_id });
        }
        if self.store.pending_request_for(new.member_id).is_some() {
            return Err(CoopError::DuplicatePendingRequest {
                member_id: new.member_id,
            });
        }

        let request = LoanRequest {
            id: Uuid::new_v4(),
            member_id: new.member_id,
            requested_amount: new.amount,
            purpose: new.purpose,
            status: RequestStatus::Pending,
            request_date: time.now(),
            reviewed_by: None,
            review_date: None,
            loan_id: None,
            notes: None,
        };

        self.events.emit(Event::RequestSubmitted {
            request_id: request.id,
            member_id: request.member_id,
            amount: request.requested_amount,
            timestamp: time.now(),
        });

        self.store.insert_request(request.clone());
        Ok(request)
    }

    /// fetch a request record
    pub fn request(&self, id: RequestId) -> Result<&LoanRequest> {
        self.store
            .request(id)
            .ok_or(CoopError::RequestNotFound { id })
    }

    /// approve a pending request, materializing the loan
    ///
    /// Capacity is re-validated inside `create_loan` against the store as
    /// it stands now, not as it stood when the request was shown to the
    /// reviewer. The request is only flipped after the loan lands, so a
    /// failed gate leaves it pending and untouched.
    pub fn approve_request(
        &mut self,
        request_id: RequestId,
        terms: ApprovalTerms,
        reviewer: &str,
        time: &SafeTimeProvider,
    ) -> Result<(LoanRequest, super::Loan)> {
        let request = self.request(request_id)?;
        if request.status != RequestStatus::Pending {
            return Err(CoopError::RequestNotPending {
                status: request.status,
            });
        }
        let member_id = request.member_id;
        let amount = request.requested_amount;

        let loan = self.create_loan(
            NewLoan {
                member_id,
                amount,
                monthly_rate: terms.monthly_rate,
                total_weeks: terms.total_weeks,
                start_date: time.now().date_naive(),
                request_id: Some(request_id),
                approved_by: Some(reviewer.to_string()),
                notes: terms.notes.clone(),
            },
            time,
        )?;

        let request = self
            .store
            .request_mut(request_id)
            .ok_or(CoopError::RequestNotFound { id: request_id })?;
        request.status = RequestStatus::Approved;
        request.reviewed_by = Some(reviewer.to_string());
        request.review_date = Some(time.now());
        request.loan_id = Some(loan.id);
        request.notes = terms.notes;
        let approved = request.clone();

        self.events.emit(Event::RequestApproved {
            request_id,
            loan_id: loan.id,
            reviewed_by: reviewer.to_string(),
            timestamp: time.now(),
        });

        Ok((approved, loan))
    }

    /// reject a pending request, recording the reason
    pub fn reject_request(
        &mut self,
        request_id: RequestId,
        reason: &str,
        reviewer: &str,
        time: &SafeTimeProvider,
    ) -> Result<LoanRequest> {
        let request = self
            .store
            .request_mut(request_id)
            .ok_or(CoopError::RequestNotFound { id: request_id })?;
        if request.status != RequestStatus::Pending {
            return Err(CoopError::RequestNotPending {
                status: request.status,
            });
        }

        request.status = RequestStatus::Rejected;
        request.reviewed_by = Some(reviewer.to_string());
        request.review_date = Some(time.now());
        request.notes = Some(reason.to_string());
        let rejected = request.clone();

        self.events.emit(Event::RequestRejected {
            request_id,
            reviewed_by: reviewer.to_string(),
            timestamp: time.now(),
        });

        Ok(rejected)
    }

    /// pending requests, oldest first
    pub fn pending_requests(&self) -> Vec<&LoanRequest> {
        self.store.pending_requests()
    }

    /// capacity snapshot against a request's amount, for review screens
    ///
    /// Advisory only: the binding check re-runs at approval time.
    pub fn request_capacity(&self, request_id: RequestId) -> Result<CapacityReview> {
        let request = self.request(request_id)?;
        let member = self
            .store
            .member(request.member_id)
            .ok_or(CoopError::MemberNotFound {
                id: request.member_id,
            })?;

        let capacity = self.capacity_of(member);
        Ok(CapacityReview {
            capacity,
            requested: request.requested_amount,
            can_approve: capacity.allows(request.requested_amount),
        })
    }
}
