use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::{
    collections::BTreeMap,
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign},
};
use uuid::Uuid;

use crate::currency::CurrencyCode;

/// Balances keyed by member. `BTreeMap` keeps iteration order stable, which the
/// planner relies on for deterministic tie-breaks.
pub type MemberBalances = BTreeMap<MemberId, Money>;

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(pub SmolStr);

impl MemberId {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(SmolStr::new(id))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for MemberId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub name: SmolStr,
}

impl Member {
    pub fn new(id: impl AsRef<str>, name: impl AsRef<str>) -> Self {
        Self {
            id: MemberId::new(id),
            name: SmolStr::new(name),
        }
    }
}

/// An amount in the base currency.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn zero() -> Self {
        Self::ZERO
    }

    pub fn new(num: i64, scale: u32) -> Self {
        Self(Decimal::new(num, scale))
    }

    /// `lo * 10^-scale`, usable in constants.
    pub const fn from_parts_scaled(lo: u32, scale: u32) -> Self {
        Self(Decimal::from_parts(lo, 0, 0, false, scale))
    }

    pub fn from_i64(value: i64) -> Self {
        Self(Decimal::from(value))
    }

    pub fn from_decimal(value: Decimal) -> Self {
        Self(value)
    }

    pub fn as_decimal(self) -> Decimal {
        self.0
    }

    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn signum(self) -> i64 {
        if self.0.is_zero() {
            0
        } else if self.0.is_sign_negative() {
            -1
        } else {
            1
        }
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Self)
    }

    pub fn checked_mul(self, rhs: Decimal) -> Option<Self> {
        self.0.checked_mul(rhs).map(Self)
    }

    /// Rounds half away from zero. Only used at the display boundary.
    pub fn round_dp(self, dp: u32) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero),
        )
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

// Operators saturate at the Decimal range instead of panicking. Code that
// must stay zero-sum uses the checked_* methods.
impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Mul<Decimal> for Money {
    type Output = Self;

    fn mul(self, rhs: Decimal) -> Self::Output {
        Self(self.0.saturating_mul(rhs))
    }
}

impl Div<Decimal> for Money {
    type Output = Self;

    fn div(self, rhs: Decimal) -> Self::Output {
        Self(self.0 / rhs)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpenseId(pub u64);

impl fmt::Display for ExpenseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SettlementId(pub Uuid);

impl SettlementId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SettlementId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SettlementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Food,
    Transport,
    Shopping,
    Accommodation,
    Ticket,
    Activity,
    #[serde(other)]
    Others,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Food,
        Category::Transport,
        Category::Shopping,
        Category::Accommodation,
        Category::Ticket,
        Category::Activity,
        Category::Others,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Transport => "Transport",
            Category::Shopping => "Shopping",
            Category::Accommodation => "Accommodation",
            Category::Ticket => "Ticket",
            Category::Activity => "Activity",
            Category::Others => "Others",
        }
    }

    /// Case-insensitive lookup; anything unrecognised lands in `Others`.
    pub fn parse_lenient(value: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(value.trim()))
            .unwrap_or(Category::Others)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: ExpenseId,
    /// Amount in `currency`, always positive.
    pub amount: Decimal,
    pub currency: CurrencyCode,
    pub category: Category,
    pub payer_id: MemberId,
    pub split_with: Vec<MemberId>,
    pub added_by: MemberId,
    pub date: NaiveDate,
    #[serde(default)]
    pub note: String,
    pub created_at: DateTime<Utc>,
}

impl Expense {
    pub fn is_split_with(&self, member: &MemberId) -> bool {
        self.split_with.contains(member)
    }

    pub fn split_count(&self) -> usize {
        self.split_with.len()
    }
}

/// Whether a repayment clears one expense share or a running balance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettlementScope {
    Global,
    Expense(ExpenseId),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchivedSettlement {
    pub id: SettlementId,
    pub from_id: MemberId,
    pub to_id: MemberId,
    pub amount: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expense_id: Option<ExpenseId>,
    pub created_at: DateTime<Utc>,
}

impl ArchivedSettlement {
    pub fn scope(&self) -> SettlementScope {
        match self.expense_id {
            Some(expense_id) => SettlementScope::Expense(expense_id),
            None => SettlementScope::Global,
        }
    }

    pub fn is_global(&self) -> bool {
        self.expense_id.is_none()
    }

    pub fn date(&self) -> NaiveDate {
        self.created_at.date_naive()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub from: MemberId,
    pub to: MemberId,
    pub amount: Money,
}

/// Moves `amount` from a debit on `to` to a credit on `from` for every transfer,
/// i.e. the balance effect of the transfers having been paid.
pub fn apply_transfers(balances: &mut MemberBalances, transfers: &[Transfer]) {
    for transfer in transfers {
        *balances.entry(transfer.from.clone()).or_insert(Money::ZERO) += transfer.amount;
        *balances.entry(transfer.to.clone()).or_insert(Money::ZERO) -= transfer.amount;
    }
}
