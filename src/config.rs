use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{CoopError, Result};

/// cooperative-wide financial settings
///
/// Operations read these values through the orchestrator on every call;
/// nothing in the domain logic hardcodes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoopConfig {
    /// monetary value of one cooperative share
    pub share_value: Money,
    /// fraction of a member's assets that may be carried as debt
    pub capacity_ratio: Decimal,
    /// annual rate applied to fixed savings when none is given
    pub default_annual_rate: Rate,
    /// minimum term for a fixed saving
    pub min_saving_term_days: u32,
    /// longest loan term accepted
    pub max_loan_weeks: u32,
}

impl Default for CoopConfig {
    fn default() -> Self {
        Self {
            share_value: Money::from_major(100),
            capacity_ratio: dec!(0.5),
            default_annual_rate: Rate::from_percentage(dec!(2)),
            min_saving_term_days: 30,
            max_loan_weeks: 260,
        }
    }
}

impl CoopConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.share_value.is_positive() {
            return Err(CoopError::invalid_input("share value must be positive"));
        }
        if self.capacity_ratio <= Decimal::ZERO || self.capacity_ratio > Decimal::ONE {
            return Err(CoopError::invalid_input(
                "capacity ratio must be within (0, 1]",
            ));
        }
        if self.default_annual_rate.is_negative() {
            return Err(CoopError::invalid_input(
                "default annual rate cannot be negative",
            ));
        }
        if self.min_saving_term_days == 0 {
            return Err(CoopError::invalid_input(
                "minimum saving term must be at least one day",
            ));
        }
        if self.max_loan_weeks == 0 {
            return Err(CoopError::invalid_input(
                "maximum loan term must be at least one week",
            ));
        }
        Ok(())
    }
}
