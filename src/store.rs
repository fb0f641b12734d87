use std::collections::HashMap;

use crate::decimal::Money;
use crate::loans::requests::LoanRequest;
use crate::loans::{Loan, Payment};
use crate::members::Member;
use crate::savings::FixedSaving;
use crate::types::{LoanId, MemberId, PaymentId, RequestId, RequestStatus, SavingId};

/// in-memory record store backing the cooperative
///
/// The full query surface the lifecycle operations need, boiled down from
/// the persistence layer they would sit on in production: by-id access,
/// the uniqueness lookups, and the per-member aggregates. All mutation
/// goes through `&mut` methods, so each business operation runs as one
/// exclusive critical section over consistent data.
#[derive(Debug, Default)]
pub struct Store {
    members: HashMap<MemberId, Member>,
    loans: HashMap<LoanId, Loan>,
    requests: HashMap<RequestId, LoanRequest>,
    payments: HashMap<PaymentId, Payment>,
    savings: HashMap<SavingId, FixedSaving>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    // members

    pub fn insert_member(&mut self, member: Member) {
        self.members.insert(member.id, member);
    }

    pub fn member(&self, id: MemberId) -> Option<&Member> {
        self.members.get(&id)
    }

    pub fn member_mut(&mut self, id: MemberId) -> Option<&mut Member> {
        self.members.get_mut(&id)
    }

    pub fn member_by_dni(&self, dni: &str) -> Option<&Member> {
        self.members.values().find(|m| m.dni == dni)
    }

    pub fn members(&self) -> impl Iterator<Item = &Member> {
        self.members.values()
    }

    // loans

    pub fn insert_loan(&mut self, loan: Loan) {
        self.loans.insert(loan.id, loan);
    }

    pub fn loan(&self, id: LoanId) -> Option<&Loan> {
        self.loans.get(&id)
    }

    pub fn loan_mut(&mut self, id: LoanId) -> Option<&mut Loan> {
        self.loans.get_mut(&id)
    }

    pub fn loans(&self) -> impl Iterator<Item = &Loan> {
        self.loans.values()
    }

    pub fn loans_for_member(&self, member_id: MemberId) -> Vec<&Loan> {
        let mut loans: Vec<&Loan> = self
            .loans
            .values()
            .filter(|l| l.member_id == member_id)
            .collect();
        loans.sort_by_key(|l| l.start_date);
        loans
    }

    /// sum of remaining amounts over the member's live loans
    pub fn outstanding_debt(&self, member_id: MemberId) -> Money {
        self.loans
            .values()
            .filter(|l| l.member_id == member_id && l.status.accepts_payments())
            .map(|l| l.remaining_amount)
            .sum()
    }

    /// true when the member holds any loan still accepting payments
    pub fn has_live_loans(&self, member_id: MemberId) -> bool {
        self.loans
            .values()
            .any(|l| l.member_id == member_id && l.status.accepts_payments())
    }

    // payments

    pub fn insert_payment(&mut self, payment: Payment) {
        self.payments.insert(payment.id, payment);
    }

    pub fn payment(&self, id: PaymentId) -> Option<&Payment> {
        self.payments.get(&id)
    }

    /// the uniqueness lookup behind the one-payment-per-week rule
    pub fn payment_for_week(&self, loan_id: LoanId, week_number: u32) -> Option<&Payment> {
        self.payments
            .values()
            .find(|p| p.loan_id == loan_id && p.week_number == week_number)
    }

    pub fn payments_for_loan(&self, loan_id: LoanId) -> Vec<&Payment> {
        let mut payments: Vec<&Payment> = self
            .payments
            .values()
            .filter(|p| p.loan_id == loan_id)
            .collect();
        payments.sort_by_key(|p| p.week_number);
        payments
    }

    // loan requests

    pub fn insert_request(&mut self, request: LoanRequest) {
        self.requests.insert(request.id, request);
    }

    pub fn request(&self, id: RequestId) -> Option<&LoanRequest> {
        self.requests.get(&id)
    }

    pub fn request_mut(&mut self, id: RequestId) -> Option<&mut LoanRequest> {
        self.requests.get_mut(&id)
    }

    /// the uniqueness lookup behind the one-pending-request rule
    pub fn pending_request_for(&self, member_id: MemberId) -> Option<&LoanRequest> {
        self.requests
            .values()
            .find(|r| r.member_id == member_id && r.status == RequestStatus::Pending)
    }

    pub fn pending_requests(&self) -> Vec<&LoanRequest> {
        let mut pending: Vec<&LoanRequest> = self
            .requests
            .values()
            .filter(|r| r.status == RequestStatus::Pending)
            .collect();
        pending.sort_by_key(|r| r.request_date);
        pending
    }

    // fixed savings

    pub fn insert_saving(&mut self, saving: FixedSaving) {
        self.savings.insert(saving.id, saving);
    }

    pub fn saving(&self, id: SavingId) -> Option<&FixedSaving> {
        self.savings.get(&id)
    }

    pub fn saving_mut(&mut self, id: SavingId) -> Option<&mut FixedSaving> {
        self.savings.get_mut(&id)
    }

    pub fn savings(&self) -> impl Iterator<Item = &FixedSaving> {
        self.savings.values()
    }

    pub fn savings_for_member(&self, member_id: MemberId) -> Vec<&FixedSaving> {
        let mut savings: Vec<&FixedSaving> = self
            .savings
            .values()
            .filter(|s| s.member_id == member_id)
            .collect();
        savings.sort_by(|a, b| b.opened_at.cmp(&a.opened_at));
        savings
    }
}
