pub mod amortization;
pub mod requests;

use chrono::NaiveDate;
use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::CoopConfig;
use crate::cooperative::Cooperative;
use crate::decimal::{Money, Rate};
use crate::errors::{CoopError, Result};
use crate::events::Event;
use crate::types::{LoanId, LoanStatus, MemberId, PaymentId, RequestId};

pub use amortization::{PaymentDetail, ScheduleEntry};

/// loan record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub id: LoanId,
    pub member_id: MemberId,
    /// set when the loan was materialized from an approved request
    pub request_id: Option<RequestId>,
    pub original_amount: Money,
    /// only ever decremented by payments, floored at zero
    pub remaining_amount: Money,
    pub monthly_rate: Rate,
    /// computed once at creation, fixed for the life of the loan
    pub weekly_payment: Money,
    pub total_weeks: u32,
    /// highest week number paid so far
    pub current_week: u32,
    pub status: LoanStatus,
    pub start_date: NaiveDate,
    pub due_date: NaiveDate,
    pub approved_by: Option<String>,
    pub notes: Option<String>,
}

/// loan creation input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLoan {
    pub member_id: MemberId,
    pub amount: Money,
    pub monthly_rate: Rate,
    pub total_weeks: u32,
    pub start_date: NaiveDate,
    pub request_id: Option<RequestId>,
    pub approved_by: Option<String>,
    pub notes: Option<String>,
}

impl NewLoan {
    pub fn validate(&self, config: &CoopConfig) -> Result<()> {
        if !self.amount.is_positive() {
            return Err(CoopError::invalid_input("loan amount must be positive"));
        }
        if self.monthly_rate.is_negative() {
            return Err(CoopError::invalid_input("interest rate cannot be negative"));
        }
        if self.total_weeks == 0 || self.total_weeks > config.max_loan_weeks {
            return Err(CoopError::invalid_input(format!(
                "loan term must be between 1 and {} weeks",
                config.max_loan_weeks
            )));
        }
        Ok(())
    }
}

/// immutable payment record, unique per (loan, week)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub loan_id: LoanId,
    pub amount: Money,
    pub week_number: u32,
    pub late_fee: Money,
    pub payment_date: NaiveDate,
    pub notes: Option<String>,
}

/// payment input; the payment date defaults to today
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentInput {
    pub amount: Money,
    pub week_number: u32,
    pub late_fee: Option<Money>,
    pub payment_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl PaymentInput {
    pub fn validate(&self) -> Result<()> {
        if !self.amount.is_positive() {
            return Err(CoopError::invalid_input("payment amount must be positive"));
        }
        if self.week_number == 0 {
            return Err(CoopError::invalid_input("week number starts at 1"));
        }
        if let Some(fee) = self.late_fee {
            if fee.is_negative() {
                return Err(CoopError::invalid_input("late fee cannot be negative"));
            }
        }
        Ok(())
    }
}

/// the single place loan status is derived
///
/// Evaluated on every payment write and on reads; there is no background
/// sweep, so a loan that stops receiving payments keeps its stored status
/// until the next write or summary read.
pub fn derive_status(remaining_amount: Money, current_week: u32, weeks_elapsed: u32) -> LoanStatus {
    if !remaining_amount.is_positive() {
        LoanStatus::Paid
    } else if weeks_elapsed > current_week {
        LoanStatus::Overdue
    } else {
        LoanStatus::Current
    }
}

/// read-side view of a loan with wall-clock-derived fields
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoanSummary {
    pub loan: Loan,
    pub weeks_elapsed: u32,
    /// derived at read time; the stored status may lag behind it
    pub is_overdue: bool,
    pub payments_count: usize,
}

impl LoanSummary {
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("JSON error: {}", e))
    }
}

/// overdue listing entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverdueLoan {
    pub loan: Loan,
    pub weeks_behind: u32,
}

/// portfolio roll-up
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoanStatistics {
    pub total_loans: usize,
    /// remaining amounts across current and overdue loans
    pub outstanding_amount: Money,
    pub overdue_count: usize,
    pub by_status: Vec<StatusBreakdown>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusBreakdown {
    pub status: LoanStatus,
    pub count: usize,
    pub total_amount: Money,
}

impl Cooperative {
    /// create a loan for an active member, gated on borrowing capacity
    ///
    /// The capacity gate re-reads the member's outstanding debt inside
    /// this same exclusive call, so a decision shown earlier (at request
    /// time) can still fail here if other loans landed in between.
    pub fn create_loan(&mut self, new: NewLoan, time: &SafeTimeProvider) -> Result<Loan> {
        new.validate(&self.config)?;

        let member = self
            .store
            .member(new.member_id)
            .ok_or(CoopError::MemberNotFound { id: new.member_id })?;
        if !member.is_active {
            return Err(CoopError::MemberInactive { id: new.member_id });
        }

        let capacity = self.capacity_of(member);
        if !capacity.allows(new.amount) {
            return Err(CoopError::CapacityExceeded {
                requested: new.amount,
                available: capacity.available,
            });
        }

        let weekly_payment =
            amortization::weekly_payment(new.amount, new.monthly_rate, new.total_weeks);
        let due_date = amortization::due_date(new.start_date, new.total_weeks);

        let loan = Loan {
            id: Uuid::new_v4(),
            member_id: new.member_id,
            request_id: new.request_id,
            original_amount: new.amount,
            remaining_amount: new.amount,
            monthly_rate: new.monthly_rate,
            weekly_payment,
            total_weeks: new.total_weeks,
            current_week: 0,
            status: LoanStatus::Current,
            start_date: new.start_date,
            due_date,
            approved_by: new.approved_by,
            notes: new.notes,
        };

        self.events.emit(Event::LoanCreated {
            loan_id: loan.id,
            member_id: loan.member_id,
            amount: loan.original_amount,
            weekly_payment,
            total_weeks: loan.total_weeks,
            due_date,
            timestamp: time.now(),
        });

        self.store.insert_loan(loan.clone());
        Ok(loan)
    }

    /// fetch a loan record
    pub fn loan(&self, id: LoanId) -> Result<&Loan> {
        self.store.loan(id).ok_or(CoopError::LoanNotFound { id })
    }

    /// record a weekly payment and settle the loan's balance and status
    pub fn record_payment(
        &mut self,
        loan_id: LoanId,
        input: PaymentInput,
        time: &SafeTimeProvider,
    ) -> Result<Payment> {
        input.validate()?;
        let today = time.now().date_naive();

        let loan = self
            .store
            .loan(loan_id)
            .ok_or(CoopError::LoanNotFound { id: loan_id })?;
        if !loan.status.accepts_payments() {
            return Err(CoopError::LoanNotPayable {
                status: loan.status,
            });
        }

        // re-checked here, inside the same exclusive mutation that appends
        // the row, so two calls for one week cannot both pass
        if self
            .store
            .payment_for_week(loan_id, input.week_number)
            .is_some()
        {
            return Err(CoopError::DuplicatePayment {
                loan_id,
                week_number: input.week_number,
            });
        }

        let payment = Payment {
            id: Uuid::new_v4(),
            loan_id,
            amount: input.amount,
            week_number: input.week_number,
            late_fee: input.late_fee.unwrap_or(Money::ZERO),
            payment_date: input.payment_date.unwrap_or(today),
            notes: input.notes,
        };
        let recorded = payment.clone();
        self.store.insert_payment(payment);

        let loan = self
            .store
            .loan_mut(loan_id)
            .ok_or(CoopError::LoanNotFound { id: loan_id })?;
        let old_status = loan.status;

        loan.remaining_amount = (loan.remaining_amount - input.amount).max(Money::ZERO);
        loan.current_week = loan.current_week.max(input.week_number);

        let elapsed = amortization::weeks_elapsed(loan.start_date, today);
        loan.status = derive_status(loan.remaining_amount, loan.current_week, elapsed);

        let new_status = loan.status;
        let remaining_amount = loan.remaining_amount;
        let current_week = loan.current_week;

        let now = time.now();
        self.events.emit(Event::PaymentReceived {
            loan_id,
            payment_id: recorded.id,
            amount: recorded.amount,
            week_number: recorded.week_number,
            remaining_amount,
            timestamp: now,
        });
        if new_status != old_status {
            match new_status {
                LoanStatus::Paid => self.events.emit(Event::LoanPaidOff {
                    loan_id,
                    timestamp: now,
                }),
                LoanStatus::Overdue => self.events.emit(Event::LoanFellOverdue {
                    loan_id,
                    weeks_elapsed: elapsed,
                    current_week,
                    timestamp: now,
                }),
                _ => {}
            }
        }

        Ok(recorded)
    }

    /// administrative cancellation; only live loans can be cancelled
    pub fn cancel_loan(&mut self, loan_id: LoanId, time: &SafeTimeProvider) -> Result<Loan> {
        let loan = self
            .store
            .loan_mut(loan_id)
            .ok_or(CoopError::LoanNotFound { id: loan_id })?;
        if !loan.status.accepts_payments() {
            return Err(CoopError::LoanNotCancellable {
                status: loan.status,
            });
        }

        loan.status = LoanStatus::Cancelled;
        let snapshot = loan.clone();

        self.events.emit(Event::LoanCancelled {
            loan_id,
            remaining_amount: snapshot.remaining_amount,
            timestamp: time.now(),
        });

        Ok(snapshot)
    }

    /// read-side view with wall-clock-derived overdue flag
    ///
    /// Does not touch the stored status: overdue detection is lazy and a
    /// loan that stopped receiving payments keeps reading `Current` in
    /// the store until its next write.
    pub fn loan_summary(&self, loan_id: LoanId, time: &SafeTimeProvider) -> Result<LoanSummary> {
        let loan = self.loan(loan_id)?;
        let today = time.now().date_naive();
        let weeks_elapsed = amortization::weeks_elapsed(loan.start_date, today);
        let is_overdue = loan.status == LoanStatus::Overdue
            || (loan.status == LoanStatus::Current && weeks_elapsed > loan.current_week);

        Ok(LoanSummary {
            loan: loan.clone(),
            weeks_elapsed,
            is_overdue,
            payments_count: self.store.payments_for_loan(loan_id).len(),
        })
    }

    /// recorded payments for a loan, ordered by week
    pub fn loan_payments(&self, loan_id: LoanId) -> Result<Vec<&Payment>> {
        self.loan(loan_id)?;
        Ok(self.store.payments_for_loan(loan_id))
    }

    /// derive the weekly schedule from loan state plus payment records
    pub fn schedule(&self, loan_id: LoanId, include_payments: bool) -> Result<Vec<ScheduleEntry>> {
        let loan = self.loan(loan_id)?;
        let payments = self.store.payments_for_loan(loan_id);
        Ok(amortization::build_schedule(loan, &payments, include_payments))
    }

    /// loans currently behind schedule, worst due date first
    ///
    /// Derived from the wall clock at call time, so it also surfaces
    /// loans whose stored status still reads `Current`.
    pub fn overdue_loans(&self, time: &SafeTimeProvider) -> Vec<OverdueLoan> {
        let today = time.now().date_naive();
        let mut overdue: Vec<OverdueLoan> = self
            .store
            .loans()
            .filter(|loan| loan.status.accepts_payments())
            .filter_map(|loan| {
                let elapsed = amortization::weeks_elapsed(loan.start_date, today);
                match derive_status(loan.remaining_amount, loan.current_week, elapsed) {
                    LoanStatus::Overdue => Some(OverdueLoan {
                        loan: loan.clone(),
                        weeks_behind: elapsed - loan.current_week,
                    }),
                    _ => None,
                }
            })
            .collect();
        overdue.sort_by_key(|o| o.loan.due_date);
        overdue
    }

    /// portfolio roll-up across all loans
    pub fn loan_statistics(&self) -> LoanStatistics {
        let all_statuses = [
            LoanStatus::Current,
            LoanStatus::Overdue,
            LoanStatus::Paid,
            LoanStatus::Cancelled,
        ];

        let by_status = all_statuses
            .into_iter()
            .map(|status| {
                let matching = self.store.loans().filter(|l| l.status == status);
                let (count, total_amount) = matching.fold(
                    (0usize, Money::ZERO),
                    |(count, total), loan| (count + 1, total + loan.original_amount),
                );
                StatusBreakdown {
                    status,
                    count,
                    total_amount,
                }
            })
            .collect::<Vec<_>>();

        LoanStatistics {
            total_loans: self.store.loans().count(),
            outstanding_amount: self
                .store
                .loans()
                .filter(|l| l.status.accepts_payments())
                .map(|l| l.remaining_amount)
                .sum(),
            overdue_count: self
                .store
                .loans()
                .filter(|l| l.status == LoanStatus::Overdue)
                .count(),
            by_status,
        }
    }
}
