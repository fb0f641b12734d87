use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::types::{PaymentId, ScheduleSlot};

use super::{Loan, Payment};

/// fixed weekly installment for a loan
///
/// The whole term's interest is charged up front at the monthly rate and
/// spread evenly across the weeks; the result is rounded to cents once
/// and then fixed for the life of the loan.
pub fn weekly_payment(principal: Money, monthly_rate: Rate, total_weeks: u32) -> Money {
    let total = principal.as_decimal() * (Decimal::ONE + monthly_rate.as_decimal());
    Money::from_decimal(total / Decimal::from(total_weeks))
}

/// principal plus the single up-front interest charge
pub fn total_repayable(principal: Money, monthly_rate: Rate) -> Money {
    Money::from_decimal(principal.as_decimal() * (Decimal::ONE + monthly_rate.as_decimal()))
}

/// calendar week arithmetic, no business-day adjustment
pub fn due_date(start_date: NaiveDate, total_weeks: u32) -> NaiveDate {
    start_date + Duration::weeks(total_weeks as i64)
}

/// full calendar weeks between the start date and today, clamped at zero
pub fn weeks_elapsed(start_date: NaiveDate, today: NaiveDate) -> u32 {
    ((today - start_date).num_days() / 7).max(0) as u32
}

/// one week of a loan's payment schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub week_number: u32,
    pub due_date: NaiveDate,
    pub expected_amount: Money,
    pub status: ScheduleSlot,
    pub payment: Option<PaymentDetail>,
}

/// recorded payment attached to a schedule entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentDetail {
    pub id: PaymentId,
    pub amount: Money,
    pub late_fee: Money,
    pub payment_date: NaiveDate,
}

impl PaymentDetail {
    fn from_payment(payment: &Payment) -> Self {
        Self {
            id: payment.id,
            amount: payment.amount,
            late_fee: payment.late_fee,
            payment_date: payment.payment_date,
        }
    }
}

/// derive the full schedule from loan state plus payment records
///
/// Week *i* (1-indexed) falls due `(i-1)*7` days after the start date. A
/// week with a recorded payment is `Paid`; an unpaid week at or below the
/// loan's current week is `Pending`; the rest are `Upcoming`. The result
/// is recomputed on every call and never persisted.
pub fn build_schedule(loan: &Loan, payments: &[&Payment], include_payments: bool) -> Vec<ScheduleEntry> {
    (1..=loan.total_weeks)
        .map(|week| {
            let paid = payments.iter().find(|p| p.week_number == week);

            let status = if paid.is_some() {
                ScheduleSlot::Paid
            } else if week <= loan.current_week {
                ScheduleSlot::Pending
            } else {
                ScheduleSlot::Upcoming
            };

            ScheduleEntry {
                week_number: week,
                due_date: loan.start_date + Duration::days(((week - 1) * 7) as i64),
                expected_amount: loan.weekly_payment,
                status,
                payment: if include_payments {
                    paid.map(|p| PaymentDetail::from_payment(p))
                } else {
                    None
                },
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LoanStatus;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn sample_loan(start: NaiveDate) -> Loan {
        let principal = Money::from_major(1000);
        let rate = Rate::from_percentage(dec!(2.5));
        Loan {
            id: Uuid::new_v4(),
            member_id: Uuid::new_v4(),
            request_id: None,
            original_amount: principal,
            remaining_amount: principal,
            monthly_rate: rate,
            weekly_payment: weekly_payment(principal, rate, 40),
            total_weeks: 40,
            current_week: 0,
            status: LoanStatus::Current,
            start_date: start,
            due_date: due_date(start, 40),
            approved_by: None,
            notes: None,
        }
    }

    #[test]
    fn test_weekly_payment_rounds_to_cents() {
        // 1000 * 1.025 / 40 = 25.625 -> 25.63
        let payment = weekly_payment(
            Money::from_major(1000),
            Rate::from_percentage(dec!(2.5)),
            40,
        );
        assert_eq!(payment, Money::from_str_exact("25.63").unwrap());
    }

    #[test]
    fn test_installments_reconcile_with_total() {
        // per-week rounding drifts by at most half a cent per week
        let principal = Money::from_major(1000);
        let rate = Rate::from_percentage(dec!(2.5));
        let payment = weekly_payment(principal, rate, 40);

        let collected = payment * Decimal::from(40);
        let drift = (collected - total_repayable(principal, rate)).abs();
        assert!(drift.as_decimal() <= dec!(0.005) * Decimal::from(40));
    }

    #[test]
    fn test_weekly_payment_zero_rate() {
        let payment = weekly_payment(Money::from_major(520), Rate::ZERO, 52);
        assert_eq!(payment, Money::from_major(10));
    }

    #[test]
    fn test_total_repayable() {
        let total = total_repayable(Money::from_major(1000), Rate::from_percentage(dec!(2.5)));
        assert_eq!(total, Money::from_major(1025));
    }

    #[test]
    fn test_due_date_is_calendar_weeks() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        assert_eq!(
            due_date(start, 40),
            NaiveDate::from_ymd_opt(2025, 10, 13).unwrap()
        );
    }

    #[test]
    fn test_weeks_elapsed_truncates_and_clamps() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();

        assert_eq!(weeks_elapsed(start, start), 0);
        assert_eq!(weeks_elapsed(start, start + Duration::days(6)), 0);
        assert_eq!(weeks_elapsed(start, start + Duration::days(7)), 1);
        assert_eq!(weeks_elapsed(start, start + Duration::days(20)), 2);

        // start date in the future
        assert_eq!(weeks_elapsed(start, start - Duration::days(10)), 0);
    }

    #[test]
    fn test_schedule_length_and_dates() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        let loan = sample_loan(start);

        let schedule = build_schedule(&loan, &[], false);
        assert_eq!(schedule.len(), 40);
        assert_eq!(schedule[0].due_date, start);
        assert_eq!(schedule[1].due_date, start + Duration::days(7));
        assert_eq!(schedule[39].due_date, start + Duration::days(39 * 7));

        for entry in &schedule {
            assert_eq!(entry.expected_amount, loan.weekly_payment);
        }
    }

    #[test]
    fn test_schedule_slot_classification() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        let mut loan = sample_loan(start);
        loan.current_week = 3;

        let paid_week_2 = Payment {
            id: Uuid::new_v4(),
            loan_id: loan.id,
            amount: loan.weekly_payment,
            week_number: 2,
            late_fee: Money::ZERO,
            payment_date: start + Duration::days(7),
            notes: None,
        };

        let schedule = build_schedule(&loan, &[&paid_week_2], true);

        assert_eq!(schedule[0].status, ScheduleSlot::Pending);
        assert_eq!(schedule[1].status, ScheduleSlot::Paid);
        assert_eq!(schedule[2].status, ScheduleSlot::Pending);
        assert_eq!(schedule[3].status, ScheduleSlot::Upcoming);

        assert!(schedule[1].payment.is_some());
        assert!(schedule[0].payment.is_none());
    }

    #[test]
    fn test_schedule_hides_payment_details_when_not_requested() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        let loan = sample_loan(start);

        let paid_week_1 = Payment {
            id: Uuid::new_v4(),
            loan_id: loan.id,
            amount: loan.weekly_payment,
            week_number: 1,
            late_fee: Money::ZERO,
            payment_date: start,
            notes: None,
        };

        let schedule = build_schedule(&loan, &[&paid_week_1], false);

        // slot still reflects the recorded payment, details stay out
        assert_eq!(schedule[0].status, ScheduleSlot::Paid);
        assert!(schedule[0].payment.is_none());
    }
}
