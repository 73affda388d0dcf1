use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::{
    currency::{CurrencyCode, CurrencyRateTable},
    model::{Category, Expense, ExpenseId, MemberId},
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpenseValidationError {
    #[error("amount is missing")]
    MissingAmount,
    #[error("amount must be positive (got {0})")]
    NonPositiveAmount(Decimal),
    #[error("payer is missing")]
    MissingPayer,
    #[error("expense must be split with at least one member")]
    EmptySplit,
    #[error("amount {0} is too large to convert into the base currency")]
    AmountTooLarge(Decimal),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpenseEditError {
    #[error(transparent)]
    Validation(#[from] ExpenseValidationError),
    #[error("expense {0} does not exist")]
    NotFound(ExpenseId),
}

/// User-entered expense fields, before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseDraft {
    pub amount: Option<Decimal>,
    pub currency: CurrencyCode,
    pub category: Category,
    pub payer_id: MemberId,
    pub split_with: Vec<MemberId>,
    pub date: NaiveDate,
    pub note: String,
}

struct ValidDraft {
    amount: Decimal,
    split_with: Vec<MemberId>,
}

impl ExpenseDraft {
    /// Rejects an amount whose base-currency value does not fit a Decimal at
    /// the given rates. Balances could not include such an expense.
    pub fn ensure_convertible(
        &self,
        rates: &CurrencyRateTable,
    ) -> Result<(), ExpenseValidationError> {
        match self.amount {
            Some(amount) if rates.checked_to_base(amount, &self.currency).is_none() => {
                Err(ExpenseValidationError::AmountTooLarge(amount))
            }
            _ => Ok(()),
        }
    }

    fn validate(&self) -> Result<ValidDraft, ExpenseValidationError> {
        let amount = self.amount.ok_or(ExpenseValidationError::MissingAmount)?;
        if amount <= Decimal::ZERO {
            return Err(ExpenseValidationError::NonPositiveAmount(amount));
        }
        if self.payer_id.is_empty() {
            return Err(ExpenseValidationError::MissingPayer);
        }

        // The split is a set; keep the first occurrence of each member.
        let mut split_with: Vec<MemberId> = Vec::with_capacity(self.split_with.len());
        for member in &self.split_with {
            if member.is_empty() || split_with.contains(member) {
                continue;
            }
            split_with.push(member.clone());
        }
        if split_with.is_empty() {
            return Err(ExpenseValidationError::EmptySplit);
        }

        Ok(ValidDraft { amount, split_with })
    }
}

/// Append/update/delete store of expense records. Holds no derived state.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExpenseLedger {
    expenses: Vec<Expense>,
}

impl ExpenseLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_expenses(expenses: Vec<Expense>) -> Self {
        Self { expenses }
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn iter(&self) -> impl Iterator<Item = &Expense> + '_ {
        self.expenses.iter()
    }

    pub fn into_expenses(self) -> Vec<Expense> {
        self.expenses
    }

    pub fn len(&self) -> usize {
        self.expenses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty()
    }

    pub fn get(&self, id: ExpenseId) -> Option<&Expense> {
        self.expenses.iter().find(|expense| expense.id == id)
    }

    pub fn contains(&self, id: ExpenseId) -> bool {
        self.get(id).is_some()
    }

    /// Next id for an expense created at `created_at`: its millisecond
    /// timestamp, bumped past every id already in the ledger so that ids stay
    /// strictly increasing and a deleted expense's id is never handed out again
    /// while the clock moves forward.
    pub fn next_id(&self, created_at: DateTime<Utc>) -> ExpenseId {
        let clock = u64::try_from(created_at.timestamp_millis()).unwrap_or(0);
        let after_max = self
            .expenses
            .iter()
            .map(|expense| expense.id.0 + 1)
            .max()
            .unwrap_or(1);
        ExpenseId(clock.max(after_max))
    }

    /// Validates and appends a new expense. The payer is recorded as its author.
    pub fn add(
        &mut self,
        draft: ExpenseDraft,
        created_at: DateTime<Utc>,
    ) -> Result<ExpenseId, ExpenseValidationError> {
        let valid = draft.validate()?;
        let id = self.next_id(created_at);
        self.expenses.push(Expense {
            id,
            amount: valid.amount,
            currency: draft.currency,
            category: draft.category,
            added_by: draft.payer_id.clone(),
            payer_id: draft.payer_id,
            split_with: valid.split_with,
            date: draft.date,
            note: draft.note,
            created_at,
        });
        Ok(id)
    }

    /// Full replacement of an existing expense. Id, author and creation time
    /// are preserved.
    pub fn update(&mut self, id: ExpenseId, draft: ExpenseDraft) -> Result<(), ExpenseEditError> {
        let valid = draft.validate()?;
        let expense = self
            .expenses
            .iter_mut()
            .find(|expense| expense.id == id)
            .ok_or(ExpenseEditError::NotFound(id))?;

        expense.amount = valid.amount;
        expense.currency = draft.currency;
        expense.category = draft.category;
        expense.payer_id = draft.payer_id;
        expense.split_with = valid.split_with;
        expense.date = draft.date;
        expense.note = draft.note;
        Ok(())
    }

    /// Unconditional removal. Settlements referring to the expense are left alone.
    pub fn remove(&mut self, id: ExpenseId) -> Option<Expense> {
        let index = self.expenses.iter().position(|expense| expense.id == id)?;
        Some(self.expenses.remove(index))
    }
}
