use banquito_core::chrono::{TimeZone, Utc};
use banquito_core::{
    ApprovalTerms, Cooperative, Money, NewMember, NewRequest, Rate, SafeTimeProvider, TimeSource,
};
use rust_decimal_macros::dec;

fn main() {
    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2025, 3, 3, 9, 0, 0).unwrap(),
    ));

    let mut coop = Cooperative::new();
    let member = coop
        .enroll_member(
            NewMember {
                name: "Carmen Flores".to_string(),
                dni: "30405060".to_string(),
                shares: 6,
                guarantee: Money::from_major(100),
                credit_score: 48,
                phone: None,
                email: None,
                address: None,
            },
            &time,
        )
        .expect("enrollment");

    let request = coop
        .submit_request(
            NewRequest {
                member_id: member.id,
                amount: Money::from_major(350),
                purpose: "sewing machine".to_string(),
            },
            &time,
        )
        .expect("request");

    let review = coop.request_capacity(request.id).expect("review");
    println!(
        "requested {} against available {} -> can approve: {}",
        review.requested, review.capacity.available, review.can_approve
    );

    match coop.approve_request(
        request.id,
        ApprovalTerms {
            monthly_rate: Rate::from_percentage(dec!(2.5)),
            total_weeks: 30,
            notes: Some("first loan".to_string()),
        },
        "admin",
        &time,
    ) {
        Ok((approved, loan)) => {
            println!(
                "request {:?} -> loan {} at {} per week",
                approved.status, loan.id, loan.weekly_payment
            );
        }
        Err(err) => println!("approval failed: {}", err),
    }

    // a second pending request for the same member is refused
    let second = coop.submit_request(
        NewRequest {
            member_id: member.id,
            amount: Money::from_major(100),
            purpose: "fabric stock".to_string(),
        },
        &time,
    );
    println!("second request while none pending: ok = {}", second.is_ok());
}
