pub mod config;
pub mod cooperative;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod loans;
pub mod members;
pub mod savings;
pub mod store;
pub mod types;

// re-export key types
pub use config::CoopConfig;
pub use cooperative::{Cooperative, MemberStatistics, RatingBreakdown};
pub use decimal::{Money, Rate};
pub use errors::{CoopError, ErrorKind, Result};
pub use events::{Event, EventStore};
pub use loans::amortization::{
    build_schedule, due_date, total_repayable, weekly_payment, weeks_elapsed, PaymentDetail,
    ScheduleEntry,
};
pub use loans::requests::{ApprovalTerms, CapacityReview, LoanRequest, NewRequest};
pub use loans::{
    derive_status, Loan, LoanStatistics, LoanSummary, NewLoan, OverdueLoan, Payment, PaymentInput,
    StatusBreakdown,
};
pub use members::{classify, Member, MemberUpdate, NewMember, PaymentCapacity};
pub use savings::{maturity_amount, FixedSaving, NewSaving, SavingsStatistics};
pub use store::Store;
pub use types::{
    CreditRating, LoanId, LoanStatus, MemberId, PaymentId, RequestId, RequestStatus, SavingId,
    SavingStatus, ScheduleSlot,
};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
