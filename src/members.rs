use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::CoopConfig;
use crate::decimal::Money;
use crate::errors::{CoopError, Result};
use crate::types::{CreditRating, MemberId};

/// lowest and highest accepted credit scores
pub const MIN_CREDIT_SCORE: u8 = 1;
pub const MAX_CREDIT_SCORE: u8 = 90;

/// cooperative member record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    /// national identity document, unique across the registry
    pub dni: String,
    /// cooperative shares held
    pub shares: u32,
    /// cash deposit backing the member's borrowing capacity
    pub guarantee: Money,
    pub credit_score: u8,
    /// denormalized at every score write; never derived at read time
    pub credit_rating: CreditRating,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub is_active: bool,
    pub enrolled_at: DateTime<Utc>,
}

/// enrollment input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMember {
    pub name: String,
    pub dni: String,
    pub shares: u32,
    pub guarantee: Money,
    pub credit_score: u8,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

impl NewMember {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(CoopError::invalid_input("member name cannot be empty"));
        }
        validate_dni(&self.dni)?;
        validate_score(self.credit_score)?;
        if self.guarantee.is_negative() {
            return Err(CoopError::invalid_input("guarantee cannot be negative"));
        }
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        Ok(())
    }
}

/// partial update input; `None` leaves the field untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemberUpdate {
    pub name: Option<String>,
    pub dni: Option<String>,
    pub shares: Option<u32>,
    pub guarantee: Option<Money>,
    pub credit_score: Option<u8>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

impl MemberUpdate {
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(CoopError::invalid_input("member name cannot be empty"));
            }
        }
        if let Some(dni) = &self.dni {
            validate_dni(dni)?;
        }
        if let Some(score) = self.credit_score {
            validate_score(score)?;
        }
        if let Some(guarantee) = self.guarantee {
            if guarantee.is_negative() {
                return Err(CoopError::invalid_input("guarantee cannot be negative"));
            }
        }
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        Ok(())
    }
}

fn validate_dni(dni: &str) -> Result<()> {
    let ok = (8..=12).contains(&dni.len()) && dni.chars().all(|c| c.is_ascii_digit());
    if !ok {
        return Err(CoopError::invalid_input("dni must be 8 to 12 digits"));
    }
    Ok(())
}

fn validate_score(score: u8) -> Result<()> {
    if !(MIN_CREDIT_SCORE..=MAX_CREDIT_SCORE).contains(&score) {
        return Err(CoopError::invalid_input(format!(
            "credit score must be between {} and {}",
            MIN_CREDIT_SCORE, MAX_CREDIT_SCORE
        )));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<()> {
    let well_formed = email.split_once('@').is_some_and(|(local, domain)| {
        !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
    });
    if !well_formed {
        return Err(CoopError::invalid_input("malformed email address"));
    }
    Ok(())
}

/// map a credit score onto its rating tier
pub fn classify(score: u8) -> CreditRating {
    if score >= 70 {
        CreditRating::Green
    } else if score >= 40 {
        CreditRating::Yellow
    } else {
        CreditRating::Red
    }
}

/// a member's borrowing capacity at a point in time
///
/// `available` is left unfloored so review screens can show how far a
/// member is over their limit; `suggested_max` floors it for display as
/// a loan-amount hint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaymentCapacity {
    pub total_assets: Money,
    pub existing_debt: Money,
    pub max_capacity: Money,
    pub available: Money,
}

impl PaymentCapacity {
    pub fn assess(
        shares: u32,
        guarantee: Money,
        existing_debt: Money,
        config: &CoopConfig,
    ) -> Self {
        let total_assets = config.share_value * rust_decimal::Decimal::from(shares) + guarantee;
        let max_capacity = total_assets * config.capacity_ratio;
        let available = max_capacity - existing_debt;
        Self {
            total_assets,
            existing_debt,
            max_capacity,
            available,
        }
    }

    /// largest new loan the member could take, floored at zero
    pub fn suggested_max(&self) -> Money {
        self.available.max(Money::ZERO)
    }

    /// the gate: existing debt plus the requested amount must fit under
    /// the capacity ceiling
    pub fn allows(&self, requested: Money) -> bool {
        self.existing_debt + requested <= self.max_capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_classify_tiers() {
        assert_eq!(classify(90), CreditRating::Green);
        assert_eq!(classify(70), CreditRating::Green);
        assert_eq!(classify(69), CreditRating::Yellow);
        assert_eq!(classify(40), CreditRating::Yellow);
        assert_eq!(classify(39), CreditRating::Red);
        assert_eq!(classify(1), CreditRating::Red);
    }

    #[test]
    fn test_capacity_assessment() {
        let config = CoopConfig::default();

        // 10 shares at 100 each, no guarantee: assets 1000, ceiling 500
        let capacity = PaymentCapacity::assess(10, Money::ZERO, Money::ZERO, &config);
        assert_eq!(capacity.total_assets, Money::from_major(1000));
        assert_eq!(capacity.max_capacity, Money::from_major(500));
        assert_eq!(capacity.available, Money::from_major(500));

        assert!(capacity.allows(Money::from_major(500)));
        assert!(!capacity.allows(Money::from_major(600)));
    }

    #[test]
    fn test_capacity_with_existing_debt() {
        let config = CoopConfig::default();
        let capacity = PaymentCapacity::assess(
            10,
            Money::from_major(200),
            Money::from_major(400),
            &config,
        );

        // assets 1200, ceiling 600, 400 already out
        assert_eq!(capacity.max_capacity, Money::from_major(600));
        assert_eq!(capacity.available, Money::from_major(200));
        assert!(capacity.allows(Money::from_major(200)));
        assert!(!capacity.allows(Money::from_str_exact("200.01").unwrap()));
    }

    #[test]
    fn test_available_capacity_may_go_negative() {
        let config = CoopConfig::default();
        let capacity = PaymentCapacity::assess(1, Money::ZERO, Money::from_major(80), &config);

        assert_eq!(capacity.available, Money::from_major(-30));
        assert_eq!(capacity.suggested_max(), Money::ZERO);
        assert!(!capacity.allows(Money::from_major(1)));
    }

    #[test]
    fn test_capacity_respects_config_ratio() {
        let config = CoopConfig {
            capacity_ratio: dec!(0.25),
            ..CoopConfig::default()
        };
        let capacity = PaymentCapacity::assess(10, Money::ZERO, Money::ZERO, &config);
        assert_eq!(capacity.max_capacity, Money::from_major(250));
    }

    #[test]
    fn test_new_member_validation() {
        let base = NewMember {
            name: "Maria Quispe".to_string(),
            dni: "12345678".to_string(),
            shares: 5,
            guarantee: Money::from_major(100),
            credit_score: 50,
            phone: None,
            email: None,
            address: None,
        };
        assert!(base.validate().is_ok());

        let bad_dni = NewMember {
            dni: "12ab".to_string(),
            ..base.clone()
        };
        assert!(bad_dni.validate().is_err());

        let bad_score = NewMember {
            credit_score: 95,
            ..base.clone()
        };
        assert!(bad_score.validate().is_err());

        let bad_email = NewMember {
            email: Some("not-an-email".to_string()),
            ..base
        };
        assert!(bad_email.validate().is_err());
    }
}
