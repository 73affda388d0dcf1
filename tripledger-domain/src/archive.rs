use chrono::{DateTime, Utc};
use fxhash::FxHashSet;
use thiserror::Error;

use crate::model::{ArchivedSettlement, ExpenseId, MemberId, Money, SettlementId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettlementRecordError {
    #[error("settlement amount must be positive (got {0})")]
    NonPositiveAmount(Money),
    #[error("{0} cannot settle with themself")]
    SelfTransfer(MemberId),
}

/// A repayment to archive. `expense_id` selects expense scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repayment {
    pub from: MemberId,
    pub to: MemberId,
    pub amount: Money,
    pub expense_id: Option<ExpenseId>,
}

impl Repayment {
    pub fn global(from: MemberId, to: MemberId, amount: Money) -> Self {
        Self {
            from,
            to,
            amount,
            expense_id: None,
        }
    }

    pub fn for_expense(expense_id: ExpenseId, from: MemberId, to: MemberId, amount: Money) -> Self {
        Self {
            from,
            to,
            amount,
            expense_id: Some(expense_id),
        }
    }
}

/// Completed repayments, newest first.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SettlementArchive {
    settlements: Vec<ArchivedSettlement>,
}

impl SettlementArchive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_settlements(settlements: Vec<ArchivedSettlement>) -> Self {
        Self { settlements }
    }

    pub fn settlements(&self) -> &[ArchivedSettlement] {
        &self.settlements
    }

    pub fn into_settlements(self) -> Vec<ArchivedSettlement> {
        self.settlements
    }

    pub fn len(&self) -> usize {
        self.settlements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.settlements.is_empty()
    }

    pub fn get(&self, id: SettlementId) -> Option<&ArchivedSettlement> {
        self.settlements.iter().find(|settlement| settlement.id == id)
    }

    pub fn record(
        &mut self,
        repayment: Repayment,
        created_at: DateTime<Utc>,
    ) -> Result<SettlementId, SettlementRecordError> {
        if repayment.amount <= Money::ZERO {
            return Err(SettlementRecordError::NonPositiveAmount(repayment.amount));
        }
        if repayment.from == repayment.to {
            return Err(SettlementRecordError::SelfTransfer(repayment.from));
        }

        let id = SettlementId::new();
        self.settlements.insert(
            0,
            ArchivedSettlement {
                id,
                from_id: repayment.from,
                to_id: repayment.to,
                amount: repayment.amount,
                expense_id: repayment.expense_id,
                created_at,
            },
        );
        Ok(id)
    }

    pub fn record_global(
        &mut self,
        from: MemberId,
        to: MemberId,
        amount: Money,
        created_at: DateTime<Utc>,
    ) -> Result<SettlementId, SettlementRecordError> {
        self.record(Repayment::global(from, to, amount), created_at)
    }

    /// The amount is stored as given. Balances treat the record as clearing
    /// `from`'s whole share of the expense whatever the amount is.
    pub fn record_for_expense(
        &mut self,
        expense_id: ExpenseId,
        from: MemberId,
        to: MemberId,
        amount: Money,
        created_at: DateTime<Utc>,
    ) -> Result<SettlementId, SettlementRecordError> {
        self.record(Repayment::for_expense(expense_id, from, to, amount), created_at)
    }

    /// Removes a settlement. Unknown ids are ignored.
    pub fn undo(&mut self, id: SettlementId) -> Option<ArchivedSettlement> {
        let index = self
            .settlements
            .iter()
            .position(|settlement| settlement.id == id)?;
        Some(self.settlements.remove(index))
    }

    pub fn globals(&self) -> impl Iterator<Item = &ArchivedSettlement> + '_ {
        self.settlements.iter().filter(|settlement| settlement.is_global())
    }

    /// The expense-scoped settlement clearing `member`'s share of `expense_id`.
    pub fn share_settlement(
        &self,
        expense_id: ExpenseId,
        member: &MemberId,
    ) -> Option<&ArchivedSettlement> {
        self.settlements
            .iter()
            .find(|s| s.expense_id == Some(expense_id) && s.from_id == *member)
    }

    pub fn is_settled(&self, expense_id: ExpenseId, member: &MemberId) -> bool {
        self.share_settlement(expense_id, member).is_some()
    }

    /// Every `(expense, debtor)` pair cleared by an expense-scoped settlement.
    pub fn settled_shares(&self) -> FxHashSet<(ExpenseId, &MemberId)> {
        self.settlements
            .iter()
            .filter_map(|s| s.expense_id.map(|expense_id| (expense_id, &s.from_id)))
            .collect()
    }

    /// Creation time of the newest global settlement paid by `member`.
    pub fn latest_global_from(&self, member: &MemberId) -> Option<DateTime<Utc>> {
        self.globals()
            .filter(|settlement| settlement.from_id == *member)
            .map(|settlement| settlement.created_at)
            .max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, hour, 0, 0).single().expect("timestamp")
    }

    fn alice() -> MemberId {
        MemberId::new("alice")
    }

    fn bob() -> MemberId {
        MemberId::new("bob")
    }

    #[rstest]
    #[case::zero(Repayment::global(bob(), alice(), Money::ZERO), SettlementRecordError::NonPositiveAmount(Money::ZERO))]
    #[case::negative(
        Repayment::global(bob(), alice(), Money::from_i64(-3)),
        SettlementRecordError::NonPositiveAmount(Money::from_i64(-3))
    )]
    #[case::self_transfer(
        Repayment::for_expense(ExpenseId(1), bob(), bob(), Money::from_i64(3)),
        SettlementRecordError::SelfTransfer(bob())
    )]
    fn record_rejects_invalid_repayments(
        #[case] repayment: Repayment,
        #[case] expected: SettlementRecordError,
    ) {
        let mut archive = SettlementArchive::new();
        assert_eq!(archive.record(repayment, at(9)), Err(expected));
        assert!(archive.is_empty());
    }

    #[test]
    fn record_prepends_and_undo_is_idempotent() {
        let mut archive = SettlementArchive::new();
        let first = archive
            .record_global(bob(), alice(), Money::from_i64(100), at(9))
            .expect("first");
        let second = archive
            .record_for_expense(ExpenseId(7), bob(), alice(), Money::from_i64(60), at(10))
            .expect("second");

        assert_eq!(archive.settlements()[0].id, second);
        assert!(archive.undo(first).is_some());
        assert!(archive.undo(first).is_none());
        assert_eq!(archive.len(), 1);
    }

    #[test]
    fn settled_query_only_sees_expense_scope() {
        let mut archive = SettlementArchive::new();
        archive
            .record_global(bob(), alice(), Money::from_i64(100), at(9))
            .expect("global");
        archive
            .record_for_expense(ExpenseId(7), bob(), alice(), Money::from_i64(60), at(10))
            .expect("scoped");

        assert!(archive.is_settled(ExpenseId(7), &bob()));
        assert!(!archive.is_settled(ExpenseId(7), &alice()));
        assert!(!archive.is_settled(ExpenseId(8), &bob()));
        assert_eq!(archive.settled_shares().len(), 1);
    }

    #[test]
    fn latest_global_ignores_scoped_and_other_members() {
        let mut archive = SettlementArchive::new();
        archive
            .record_global(bob(), alice(), Money::from_i64(10), at(9))
            .expect("early");
        archive
            .record_global(bob(), alice(), Money::from_i64(10), at(12))
            .expect("late");
        archive
            .record_for_expense(ExpenseId(1), bob(), alice(), Money::from_i64(10), at(15))
            .expect("scoped");
        archive
            .record_global(alice(), bob(), Money::from_i64(10), at(18))
            .expect("other");

        assert_eq!(archive.latest_global_from(&bob()), Some(at(12)));
        assert_eq!(archive.latest_global_from(&MemberId::new("carol")), None);
    }
}
