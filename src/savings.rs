use chrono::{DateTime, Duration, NaiveDate, Utc};
use hourglass_rs::SafeTimeProvider;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::CoopConfig;
use crate::cooperative::Cooperative;
use crate::decimal::{Money, Rate};
use crate::errors::{CoopError, Result};
use crate::events::Event;
use crate::types::{MemberId, SavingId, SavingStatus};

/// fixed-term saving record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedSaving {
    pub id: SavingId,
    pub member_id: MemberId,
    /// principal deposited
    pub amount: Money,
    pub term_days: u32,
    pub annual_rate: Rate,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// fixed at opening; never revised when rates change later
    pub maturity_amount: Money,
    pub status: SavingStatus,
    pub notes: Option<String>,
    pub opened_at: DateTime<Utc>,
}

/// saving creation input; rate defaults from configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSaving {
    pub member_id: MemberId,
    pub amount: Money,
    pub term_days: u32,
    pub annual_rate: Option<Rate>,
    pub start_date: NaiveDate,
    pub notes: Option<String>,
}

impl NewSaving {
    pub fn validate(&self, config: &CoopConfig) -> Result<()> {
        if !self.amount.is_positive() {
            return Err(CoopError::invalid_input("saving amount must be positive"));
        }
        if self.term_days < config.min_saving_term_days {
            return Err(CoopError::invalid_input(format!(
                "saving term must be at least {} days",
                config.min_saving_term_days
            )));
        }
        if let Some(rate) = self.annual_rate {
            if rate.is_negative() {
                return Err(CoopError::invalid_input("annual rate cannot be negative"));
            }
        }
        Ok(())
    }
}

/// payout at maturity under simple daily-rate interest
pub fn maturity_amount(amount: Money, annual_rate: Rate, term_days: u32) -> Money {
    let growth = Decimal::ONE + annual_rate.daily_rate().as_decimal() * Decimal::from(term_days);
    Money::from_decimal(amount.as_decimal() * growth)
}

/// savings roll-up
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavingsStatistics {
    pub total_savings: usize,
    pub active_count: usize,
    /// principal across active savings
    pub active_principal: Money,
    /// committed payouts across active savings
    pub active_maturity: Money,
}

impl Cooperative {
    /// open a fixed-term saving for an existing member
    pub fn open_saving(&mut self, new: NewSaving, time: &SafeTimeProvider) -> Result<FixedSaving> {
        new.validate(&self.config)?;

        if self.store.member(new.member_id).is_none() {
            return Err(CoopError::MemberNotFound { id: new.member_id });
        }

        let annual_rate = new.annual_rate.unwrap_or(self.config.default_annual_rate);
        let end_date = new.start_date + Duration::days(new.term_days as i64);
        let payout = maturity_amount(new.amount, annual_rate, new.term_days);

        let saving = FixedSaving {
            id: Uuid::new_v4(),
            member_id: new.member_id,
            amount: new.amount,
            term_days: new.term_days,
            annual_rate,
            start_date: new.start_date,
            end_date,
            maturity_amount: payout,
            status: SavingStatus::Active,
            notes: new.notes,
            opened_at: time.now(),
        };

        self.events.emit(Event::SavingOpened {
            saving_id: saving.id,
            member_id: saving.member_id,
            amount: saving.amount,
            maturity_amount: payout,
            end_date,
            timestamp: time.now(),
        });

        self.store.insert_saving(saving.clone());
        Ok(saving)
    }

    /// fetch a saving record
    pub fn saving(&self, id: SavingId) -> Result<&FixedSaving> {
        self.store.saving(id).ok_or(CoopError::SavingNotFound { id })
    }

    /// mature an active saving once its end date has arrived
    pub fn mature_saving(&mut self, id: SavingId, time: &SafeTimeProvider) -> Result<FixedSaving> {
        let today = time.now().date_naive();

        let saving = self
            .store
            .saving_mut(id)
            .ok_or(CoopError::SavingNotFound { id })?;
        if saving.status != SavingStatus::Active {
            return Err(CoopError::SavingNotActive {
                status: saving.status,
            });
        }
        if today < saving.end_date {
            return Err(CoopError::NotYetMatured {
                end_date: saving.end_date,
            });
        }

        saving.status = SavingStatus::Matured;
        let matured = saving.clone();

        self.events.emit(Event::SavingMatured {
            saving_id: id,
            payout: matured.maturity_amount,
            timestamp: time.now(),
        });

        Ok(matured)
    }

    /// cancel an active saving before maturity
    pub fn cancel_saving(&mut self, id: SavingId, time: &SafeTimeProvider) -> Result<FixedSaving> {
        let saving = self
            .store
            .saving_mut(id)
            .ok_or(CoopError::SavingNotFound { id })?;
        if saving.status != SavingStatus::Active {
            return Err(CoopError::SavingNotActive {
                status: saving.status,
            });
        }

        saving.status = SavingStatus::Cancelled;
        let cancelled = saving.clone();

        self.events.emit(Event::SavingCancelled {
            saving_id: id,
            timestamp: time.now(),
        });

        Ok(cancelled)
    }

    /// a member's savings, newest first
    pub fn savings_for_member(&self, member_id: MemberId) -> Result<Vec<&FixedSaving>> {
        self.member(member_id)?;
        Ok(self.store.savings_for_member(member_id))
    }

    /// roll-up across all savings
    pub fn savings_statistics(&self) -> SavingsStatistics {
        let active = || {
            self.store
                .savings()
                .filter(|s| s.status == SavingStatus::Active)
        };
        SavingsStatistics {
            total_savings: self.store.savings().count(),
            active_count: active().count(),
            active_principal: active().map(|s| s.amount).sum(),
            active_maturity: active().map(|s| s.maturity_amount).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::members::NewMember;
    use chrono::{TimeZone, Utc};
    use hourglass_rs::TimeSource;
    use rust_decimal_macros::dec;

    fn test_time() -> SafeTimeProvider {
        SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2025, 1, 1, 8, 0, 0).unwrap(),
        ))
    }

    fn enroll(coop: &mut Cooperative, time: &SafeTimeProvider) -> MemberId {
        coop.enroll_member(
            NewMember {
                name: "Carmen Flores".to_string(),
                dni: "11223344".to_string(),
                shares: 2,
                guarantee: Money::ZERO,
                credit_score: 55,
                phone: None,
                email: None,
                address: None,
            },
            time,
        )
        .unwrap()
        .id
    }

    fn new_saving(member_id: MemberId, time: &SafeTimeProvider) -> NewSaving {
        NewSaving {
            member_id,
            amount: Money::from_major(1000),
            term_days: 365,
            annual_rate: Some(Rate::from_percentage(dec!(2))),
            start_date: time.now().date_naive(),
            notes: None,
        }
    }

    #[test]
    fn test_maturity_amount_full_year() {
        // 1000 at 2% for 365 days: the daily rate re-aggregates to the
        // full annual rate
        let payout = maturity_amount(
            Money::from_major(1000),
            Rate::from_percentage(dec!(2)),
            365,
        );
        assert_eq!(payout, Money::from_major(1020));
    }

    #[test]
    fn test_maturity_amount_partial_term() {
        // 5000 * (1 + 0.03/365 * 90) = 5036.9863... -> 5036.99
        let payout = maturity_amount(
            Money::from_major(5000),
            Rate::from_percentage(dec!(3)),
            90,
        );
        assert_eq!(payout, Money::from_str_exact("5036.99").unwrap());
    }

    #[test]
    fn test_open_saving_fixes_terms() {
        let time = test_time();
        let mut coop = Cooperative::new();
        let member_id = enroll(&mut coop, &time);

        let saving = coop.open_saving(new_saving(member_id, &time), &time).unwrap();

        assert_eq!(saving.status, SavingStatus::Active);
        assert_eq!(saving.maturity_amount, Money::from_major(1020));
        assert_eq!(
            saving.end_date,
            time.now().date_naive() + Duration::days(365)
        );
    }

    #[test]
    fn test_open_saving_defaults_rate_from_config() {
        let time = test_time();
        let mut coop = Cooperative::new();
        let member_id = enroll(&mut coop, &time);

        let saving = coop
            .open_saving(
                NewSaving {
                    annual_rate: None,
                    ..new_saving(member_id, &time)
                },
                &time,
            )
            .unwrap();
        assert_eq!(saving.annual_rate, coop.config.default_annual_rate);
    }

    #[test]
    fn test_open_saving_rejects_short_terms() {
        let time = test_time();
        let mut coop = Cooperative::new();
        let member_id = enroll(&mut coop, &time);

        let err = coop
            .open_saving(
                NewSaving {
                    term_days: 15,
                    ..new_saving(member_id, &time)
                },
                &time,
            )
            .unwrap_err();
        assert!(matches!(err, CoopError::InvalidInput { .. }));
    }

    #[test]
    fn test_open_saving_unknown_member() {
        let time = test_time();
        let mut coop = Cooperative::new();

        let err = coop
            .open_saving(new_saving(Uuid::new_v4(), &time), &time)
            .unwrap_err();
        assert!(matches!(err, CoopError::MemberNotFound { .. }));
    }

    #[test]
    fn test_mature_before_end_date_fails() {
        let time = test_time();
        let control = time.test_control().unwrap();
        let mut coop = Cooperative::new();
        let member_id = enroll(&mut coop, &time);
        let saving = coop.open_saving(new_saving(member_id, &time), &time).unwrap();

        control.advance(Duration::days(200));
        let err = coop.mature_saving(saving.id, &time).unwrap_err();
        assert!(matches!(err, CoopError::NotYetMatured { .. }));

        control.advance(Duration::days(165));
        let matured = coop.mature_saving(saving.id, &time).unwrap();
        assert_eq!(matured.status, SavingStatus::Matured);
    }

    #[test]
    fn test_matured_saving_is_terminal() {
        let time = test_time();
        let control = time.test_control().unwrap();
        let mut coop = Cooperative::new();
        let member_id = enroll(&mut coop, &time);
        let saving = coop.open_saving(new_saving(member_id, &time), &time).unwrap();

        control.advance(Duration::days(365));
        coop.mature_saving(saving.id, &time).unwrap();

        let err = coop.mature_saving(saving.id, &time).unwrap_err();
        assert!(matches!(
            err,
            CoopError::SavingNotActive {
                status: SavingStatus::Matured
            }
        ));
        let err = coop.cancel_saving(saving.id, &time).unwrap_err();
        assert!(matches!(err, CoopError::SavingNotActive { .. }));
    }

    #[test]
    fn test_cancel_active_saving() {
        let time = test_time();
        let mut coop = Cooperative::new();
        let member_id = enroll(&mut coop, &time);
        let saving = coop.open_saving(new_saving(member_id, &time), &time).unwrap();

        let cancelled = coop.cancel_saving(saving.id, &time).unwrap();
        assert_eq!(cancelled.status, SavingStatus::Cancelled);

        // payout commitment is untouched by cancellation
        assert_eq!(cancelled.maturity_amount, Money::from_major(1020));

        let err = coop.cancel_saving(saving.id, &time).unwrap_err();
        assert!(matches!(err, CoopError::SavingNotActive { .. }));
    }

    #[test]
    fn test_savings_statistics() {
        let time = test_time();
        let mut coop = Cooperative::new();
        let member_id = enroll(&mut coop, &time);

        let first = coop.open_saving(new_saving(member_id, &time), &time).unwrap();
        coop.open_saving(
            NewSaving {
                amount: Money::from_major(500),
                term_days: 180,
                ..new_saving(member_id, &time)
            },
            &time,
        )
        .unwrap();
        coop.cancel_saving(first.id, &time).unwrap();

        let stats = coop.savings_statistics();
        assert_eq!(stats.total_savings, 2);
        assert_eq!(stats.active_count, 1);
        assert_eq!(stats.active_principal, Money::from_major(500));
    }
}
