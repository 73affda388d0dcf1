use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::{collections::HashMap, fmt};
use thiserror::Error;

use crate::model::Money;

/// Stored shape of the rate table: code -> multiplier into the base currency.
pub type RateMap = IndexMap<CurrencyCode, Decimal>;

/// Upper-cased ISO-style currency code.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "SmolStr", into = "SmolStr")]
pub struct CurrencyCode(SmolStr);

impl CurrencyCode {
    pub fn new(code: &str) -> Self {
        Self(SmolStr::new(code.trim().to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<SmolStr> for CurrencyCode {
    fn from(value: SmolStr) -> Self {
        Self::new(value.as_str())
    }
}

impl From<CurrencyCode> for SmolStr {
    fn from(value: CurrencyCode) -> Self {
        value.0
    }
}

impl From<&str> for CurrencyCode {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RateEditError {
    #[error("the base currency {0} is fixed at 1")]
    BaseCurrencyLocked(CurrencyCode),
    #[error("rate for {code} must be positive (got {rate})")]
    NonPositiveRate { code: CurrencyCode, rate: Decimal },
}

/// Active currencies and their multiplier into the base currency.
///
/// The base code is always present with multiplier 1. Lookups of codes that
/// are not tracked fall back to 1 so that expenses recorded in a currency that
/// was later removed still contribute to balances.
#[derive(Clone, Debug, PartialEq)]
pub struct CurrencyRateTable {
    base: CurrencyCode,
    rates: RateMap,
}

impl CurrencyRateTable {
    pub fn new(base: CurrencyCode) -> Self {
        let mut rates = RateMap::new();
        rates.insert(base.clone(), Decimal::ONE);
        Self { base, rates }
    }

    /// Builds a table from stored rates. A stored base entry is forced back to 1
    /// and non-positive multipliers are dropped.
    pub fn from_rates<I>(base: CurrencyCode, rates: I) -> Self
    where
        I: IntoIterator<Item = (CurrencyCode, Decimal)>,
    {
        let mut table = Self::new(base);
        for (code, rate) in rates {
            if code == table.base || rate <= Decimal::ZERO {
                continue;
            }
            table.rates.insert(code, rate);
        }
        table
    }

    pub fn base(&self) -> &CurrencyCode {
        &self.base
    }

    pub fn rates(&self) -> &RateMap {
        &self.rates
    }

    pub fn to_rate_map(&self) -> RateMap {
        self.rates.clone()
    }

    pub fn rate(&self, code: &CurrencyCode) -> Option<Decimal> {
        self.rates.get(code).copied()
    }

    pub fn effective_rate(&self, code: &CurrencyCode) -> Decimal {
        self.rate(code).unwrap_or(Decimal::ONE)
    }

    pub fn contains(&self, code: &CurrencyCode) -> bool {
        self.rates.contains_key(code)
    }

    pub fn codes(&self) -> impl Iterator<Item = &CurrencyCode> + '_ {
        self.rates.keys()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    pub fn set(&mut self, code: CurrencyCode, multiplier: Decimal) -> Result<(), RateEditError> {
        if code == self.base {
            if multiplier == Decimal::ONE {
                return Ok(());
            }
            return Err(RateEditError::BaseCurrencyLocked(code));
        }
        if multiplier <= Decimal::ZERO {
            return Err(RateEditError::NonPositiveRate {
                code,
                rate: multiplier,
            });
        }
        self.rates.insert(code, multiplier);
        Ok(())
    }

    /// Removes a tracked code. The base code is never removed.
    pub fn remove(&mut self, code: &CurrencyCode) -> Option<Decimal> {
        if *code == self.base {
            return None;
        }
        self.rates.shift_remove(code)
    }

    /// Replaces the multiplier of every tracked non-base code that `external`
    /// knows about. Codes are never added or removed. Returns how many rates
    /// were replaced.
    pub fn refresh(&mut self, external: &HashMap<CurrencyCode, Decimal>) -> usize {
        let mut replaced = 0;
        for (code, rate) in self.rates.iter_mut() {
            if *code == self.base {
                continue;
            }
            if let Some(next) = external.get(code).copied().filter(|r| *r > Decimal::ZERO) {
                *rate = next;
                replaced += 1;
            }
        }
        tracing::debug!(
            tracked = self.rates.len(),
            replaced,
            "Currency table refreshed from external rates"
        );
        replaced
    }

    /// Saturates at the Decimal range; see [`Self::checked_to_base`].
    pub fn to_base(&self, amount: Decimal, code: &CurrencyCode) -> Money {
        Money::from_decimal(amount) * self.effective_rate(code)
    }

    /// `None` when the converted amount does not fit in a Decimal.
    pub fn checked_to_base(&self, amount: Decimal, code: &CurrencyCode) -> Option<Money> {
        Money::from_decimal(amount).checked_mul(self.effective_rate(code))
    }

    /// Converts between two arbitrary currencies through the base currency.
    /// Results beyond the Decimal range saturate.
    pub fn convert(&self, amount: Decimal, from: &CurrencyCode, to: &CurrencyCode) -> Decimal {
        let in_base = amount.saturating_mul(self.effective_rate(from));
        in_base
            .checked_div(self.effective_rate(to))
            .unwrap_or(if in_base.is_sign_negative() {
                Decimal::MIN
            } else {
                Decimal::MAX
            })
    }
}
