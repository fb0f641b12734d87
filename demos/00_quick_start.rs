use banquito_core::chrono::{TimeZone, Utc};
use banquito_core::{
    Cooperative, Money, NewLoan, NewMember, PaymentInput, Rate, SafeTimeProvider, TimeSource,
};
use rust_decimal_macros::dec;

fn main() {
    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2025, 1, 6, 9, 0, 0).unwrap(),
    ));

    let mut coop = Cooperative::new();

    let member = coop
        .enroll_member(
            NewMember {
                name: "Maria Quispe".to_string(),
                dni: "40506070".to_string(),
                shares: 10,
                guarantee: Money::from_major(200),
                credit_score: 72,
                phone: None,
                email: None,
                address: None,
            },
            &time,
        )
        .expect("enrollment");

    println!(
        "enrolled {} with rating {:?}",
        member.name, member.credit_rating
    );

    let capacity = coop.member_capacity(member.id).expect("capacity");
    println!(
        "assets {} -> may borrow up to {}",
        capacity.total_assets,
        capacity.suggested_max()
    );

    let loan = coop
        .create_loan(
            NewLoan {
                member_id: member.id,
                amount: Money::from_major(500),
                monthly_rate: Rate::from_percentage(dec!(2.5)),
                total_weeks: 40,
                start_date: time.now().date_naive(),
                request_id: None,
                approved_by: Some("admin".to_string()),
                notes: None,
            },
            &time,
        )
        .expect("loan");

    println!(
        "loan of {} over {} weeks: {} per week, due {}",
        loan.original_amount, loan.total_weeks, loan.weekly_payment, loan.due_date
    );

    coop.record_payment(
        loan.id,
        PaymentInput {
            amount: loan.weekly_payment,
            week_number: 1,
            late_fee: None,
            payment_date: None,
            notes: None,
        },
        &time,
    )
    .expect("payment");

    let summary = coop.loan_summary(loan.id, &time).expect("summary");
    println!("{}", summary.to_json_pretty());

    for event in coop.take_events() {
        println!("event: {:?}", event);
    }
}
