use crate::error::StoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use tripledger_domain::{
    ArchivedSettlement, Booking, CurrencyCode, CurrencyRateTable, Expense, ExpenseLedger, Member,
    RateMap, SettlementArchive, SettlementId, ShareStatus,
};

/// One independently stored collection of the trip document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Members,
    Expenses,
    CurrencyRates,
    ArchivedSettlements,
    Bookings,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Members,
        Field::Expenses,
        Field::CurrencyRates,
        Field::ArchivedSettlements,
        Field::Bookings,
    ];

    /// Key of the field in the stored document.
    pub fn key(self) -> &'static str {
        match self {
            Field::Members => "members",
            Field::Expenses => "expenses",
            Field::CurrencyRates => "currencyRates",
            Field::ArchivedSettlements => "archivedSettlements",
            Field::Bookings => "bookings",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// The full value of one field.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Members(Vec<Member>),
    Expenses(Vec<Expense>),
    CurrencyRates(RateMap),
    ArchivedSettlements(Vec<ArchivedSettlement>),
    Bookings(Vec<Booking>),
}

impl FieldValue {
    pub fn field(&self) -> Field {
        match self {
            FieldValue::Members(_) => Field::Members,
            FieldValue::Expenses(_) => Field::Expenses,
            FieldValue::CurrencyRates(_) => Field::CurrencyRates,
            FieldValue::ArchivedSettlements(_) => Field::ArchivedSettlements,
            FieldValue::Bookings(_) => Field::Bookings,
        }
    }

    pub fn empty(field: Field) -> Self {
        match field {
            Field::Members => FieldValue::Members(Vec::new()),
            Field::Expenses => FieldValue::Expenses(Vec::new()),
            Field::CurrencyRates => FieldValue::CurrencyRates(RateMap::new()),
            Field::ArchivedSettlements => FieldValue::ArchivedSettlements(Vec::new()),
            Field::Bookings => FieldValue::Bookings(Vec::new()),
        }
    }
}

/// Serialized shape of the whole trip. Missing fields read as empty.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TripDocument {
    pub members: Vec<Member>,
    pub expenses: Vec<Expense>,
    pub currency_rates: RateMap,
    pub archived_settlements: Vec<ArchivedSettlement>,
    pub bookings: Vec<Booking>,
}

impl TripDocument {
    pub fn get(&self, field: Field) -> FieldValue {
        match field {
            Field::Members => FieldValue::Members(self.members.clone()),
            Field::Expenses => FieldValue::Expenses(self.expenses.clone()),
            Field::CurrencyRates => FieldValue::CurrencyRates(self.currency_rates.clone()),
            Field::ArchivedSettlements => {
                FieldValue::ArchivedSettlements(self.archived_settlements.clone())
            }
            Field::Bookings => FieldValue::Bookings(self.bookings.clone()),
        }
    }

    pub fn set(&mut self, value: FieldValue) {
        match value {
            FieldValue::Members(members) => self.members = members,
            FieldValue::Expenses(expenses) => self.expenses = expenses,
            FieldValue::CurrencyRates(rates) => self.currency_rates = rates,
            FieldValue::ArchivedSettlements(settlements) => {
                self.archived_settlements = settlements
            }
            FieldValue::Bookings(bookings) => self.bookings = bookings,
        }
    }
}

/// The service's working copy of the trip, rebuilt field by field from the
/// store.
#[derive(Clone, Debug, PartialEq)]
pub struct TripSnapshot {
    pub members: Vec<Member>,
    pub ledger: ExpenseLedger,
    pub rates: CurrencyRateTable,
    pub archive: SettlementArchive,
    pub bookings: Vec<Booking>,
}

impl TripSnapshot {
    pub fn new(base: CurrencyCode) -> Self {
        Self {
            members: Vec::new(),
            ledger: ExpenseLedger::new(),
            rates: CurrencyRateTable::new(base),
            archive: SettlementArchive::new(),
            bookings: Vec::new(),
        }
    }

    pub fn apply(&mut self, value: FieldValue) {
        match value {
            FieldValue::Members(members) => self.members = members,
            FieldValue::Expenses(expenses) => self.ledger = ExpenseLedger::from_expenses(expenses),
            FieldValue::CurrencyRates(rates) => {
                self.rates = CurrencyRateTable::from_rates(self.rates.base().clone(), rates)
            }
            FieldValue::ArchivedSettlements(settlements) => {
                self.archive = SettlementArchive::from_settlements(settlements)
            }
            FieldValue::Bookings(bookings) => self.bookings = bookings,
        }
    }

    pub fn field_value(&self, field: Field) -> FieldValue {
        match field {
            Field::Members => FieldValue::Members(self.members.clone()),
            Field::Expenses => FieldValue::Expenses(self.ledger.expenses().to_vec()),
            Field::CurrencyRates => FieldValue::CurrencyRates(self.rates.to_rate_map()),
            Field::ArchivedSettlements => {
                FieldValue::ArchivedSettlements(self.archive.settlements().to_vec())
            }
            Field::Bookings => FieldValue::Bookings(self.bookings.clone()),
        }
    }
}

/// Outcome of the store write that follows a mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WriteStatus {
    Persisted,
    /// The working copy changed but the store did not accept it.
    Failed(StoreError),
    /// Nothing changed, so nothing was written.
    Skipped,
}

impl WriteStatus {
    pub fn is_failed(&self) -> bool {
        matches!(self, WriteStatus::Failed(_))
    }
}

/// Result of a mutation: its value plus whether the store kept up.
#[derive(Clone, Debug, PartialEq)]
pub struct Mutation<T> {
    pub value: T,
    pub write: WriteStatus,
}

impl<T> Mutation<T> {
    pub fn skipped(value: T) -> Self {
        Self {
            value,
            write: WriteStatus::Skipped,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShareToggle {
    Recorded(SettlementId),
    Undone(SettlementId),
    /// The share was not in a togglable state.
    Unchanged(ShareStatus),
}
