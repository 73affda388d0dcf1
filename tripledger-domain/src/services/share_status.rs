use crate::{
    archive::SettlementArchive,
    currency::CurrencyRateTable,
    model::{Expense, MemberBalances, MemberId, Money, SettlementId},
    services::{BalanceCalculator, SETTLEMENT_EPSILON},
};

/// Where one member's share of one expense stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShareStatus {
    NotInSplit,
    Payer,
    /// Cleared by this expense-scoped settlement.
    Settled(SettlementId),
    /// The expense predates the member's latest global settlement.
    CoveredByGlobal,
    /// The member's overall balance no longer shows a debt.
    NoOutstandingDebt,
    Outstanding { share: Money },
}

impl ShareStatus {
    /// Shares nobody needs to act on.
    pub fn is_cleared(&self) -> bool {
        !matches!(self, ShareStatus::Outstanding { .. })
    }
}

pub struct ShareStatusResolver;

impl ShareStatusResolver {
    pub fn status(
        &self,
        expense: &Expense,
        member: &MemberId,
        balances: &MemberBalances,
        rates: &CurrencyRateTable,
        archive: &SettlementArchive,
    ) -> ShareStatus {
        if !expense.is_split_with(member) {
            return ShareStatus::NotInSplit;
        }
        if expense.payer_id == *member {
            return ShareStatus::Payer;
        }
        if let Some(settlement) = archive.share_settlement(expense.id, member) {
            return ShareStatus::Settled(settlement.id);
        }
        if archive
            .latest_global_from(member)
            .is_some_and(|settled_at| expense.created_at < settled_at)
        {
            return ShareStatus::CoveredByGlobal;
        }
        let balance = balances.get(member).copied().unwrap_or(Money::ZERO);
        if balance >= -SETTLEMENT_EPSILON {
            return ShareStatus::NoOutstandingDebt;
        }
        ShareStatus::Outstanding {
            share: BalanceCalculator::share(expense, rates),
        }
    }

    /// Status of every split member, in split order.
    pub fn statuses(
        &self,
        expense: &Expense,
        balances: &MemberBalances,
        rates: &CurrencyRateTable,
        archive: &SettlementArchive,
    ) -> Vec<(MemberId, ShareStatus)> {
        expense
            .split_with
            .iter()
            .map(|member| {
                (
                    member.clone(),
                    self.status(expense, member, balances, rates, archive),
                )
            })
            .collect()
    }
}
