use banquito_core::chrono::{Duration, TimeZone, Utc};
use banquito_core::{
    Cooperative, Money, NewLoan, NewMember, PaymentInput, Rate, SafeTimeProvider, ScheduleSlot,
    TimeSource,
};
use rust_decimal_macros::dec;

fn main() {
    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2025, 1, 6, 9, 0, 0).unwrap(),
    ));
    let control = time.test_control().unwrap();

    let mut coop = Cooperative::new();
    let member = coop
        .enroll_member(
            NewMember {
                name: "Julio Condori".to_string(),
                dni: "70809010".to_string(),
                shares: 20,
                guarantee: Money::ZERO,
                credit_score: 65,
                phone: None,
                email: None,
                address: None,
            },
            &time,
        )
        .expect("enrollment");

    let loan = coop
        .create_loan(
            NewLoan {
                member_id: member.id,
                amount: Money::from_major(400),
                monthly_rate: Rate::from_percentage(dec!(3)),
                total_weeks: 8,
                start_date: time.now().date_naive(),
                request_id: None,
                approved_by: None,
                notes: None,
            },
            &time,
        )
        .expect("loan");

    // pay the first two weeks on time
    for week in 1..=2 {
        control.advance(Duration::weeks(1));
        coop.record_payment(
            loan.id,
            PaymentInput {
                amount: loan.weekly_payment,
                week_number: week,
                late_fee: None,
                payment_date: None,
                notes: None,
            },
            &time,
        )
        .expect("payment");
    }

    // then fall three weeks behind before paying week 3
    control.advance(Duration::weeks(3));
    coop.record_payment(
        loan.id,
        PaymentInput {
            amount: loan.weekly_payment,
            week_number: 3,
            late_fee: Some(Money::from_major(5)),
            payment_date: None,
            notes: Some("late".to_string()),
        },
        &time,
    )
    .expect("payment");

    let stored = coop.loan(loan.id).expect("loan");
    println!("after falling behind, status: {:?}", stored.status);

    for entry in coop.schedule(loan.id, true).expect("schedule") {
        let marker = match entry.status {
            ScheduleSlot::Paid => "x",
            ScheduleSlot::Pending => "!",
            ScheduleSlot::Upcoming => " ",
        };
        println!(
            "[{}] week {:>2} due {} expected {}",
            marker, entry.week_number, entry.due_date, entry.expected_amount
        );
    }

    for overdue in coop.overdue_loans(&time) {
        println!(
            "overdue: loan {} is {} weeks behind",
            overdue.loan.id, overdue.weeks_behind
        );
    }
}
