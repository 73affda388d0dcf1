use crate::model::{MemberBalances, MemberId, Money, Transfer};

/// Balances within this distance of zero (in base units) count as settled.
pub const SETTLEMENT_EPSILON: Money = Money::from_parts_scaled(1, 1);

/// Greedy debt simplification.
///
/// Repeatedly pairs the largest remaining creditor with the largest remaining
/// debtor and transfers the smaller of the two magnitudes. Not a global
/// minimum-transaction solver, but at most `creditors + debtors - 1` transfers.
///
/// Members within epsilon of zero are never paired, so a creditor owed only
/// dust by several debtors stays unpaid.
pub struct SettlementPlanner {
    epsilon: Money,
}

impl SettlementPlanner {
    pub fn new() -> Self {
        Self::with_epsilon(SETTLEMENT_EPSILON)
    }

    pub fn with_epsilon(epsilon: Money) -> Self {
        Self { epsilon }
    }

    pub fn plan(&self, balances: &MemberBalances) -> Vec<Transfer> {
        let mut creditors: Vec<(&MemberId, Money)> = balances
            .iter()
            .filter(|(_, balance)| **balance > self.epsilon)
            .map(|(member, balance)| (member, *balance))
            .collect();
        let mut debtors: Vec<(&MemberId, Money)> = balances
            .iter()
            .filter(|(_, balance)| **balance < -self.epsilon)
            .map(|(member, balance)| (member, balance.abs()))
            .collect();

        // Stable sorts over BTreeMap order: ties resolve by member id.
        creditors.sort_by(|a, b| b.1.cmp(&a.1));
        debtors.sort_by(|a, b| b.1.cmp(&a.1));

        let mut transfers = Vec::with_capacity(creditors.len() + debtors.len());
        let (mut c_idx, mut d_idx) = (0, 0);

        while c_idx < creditors.len() && d_idx < debtors.len() {
            let (creditor, credit) = &mut creditors[c_idx];
            let (debtor, debt) = &mut debtors[d_idx];

            let amount = (*credit).min(*debt);
            transfers.push(Transfer {
                from: (*debtor).clone(),
                to: (*creditor).clone(),
                amount,
            });
            *credit -= amount;
            *debt -= amount;

            if *debt < self.epsilon {
                d_idx += 1;
            }
            if *credit < self.epsilon {
                c_idx += 1;
            }
        }

        tracing::debug!(
            creditor_count = creditors.len(),
            debtor_count = debtors.len(),
            transfer_count = transfers.len(),
            "Settlement plan computed"
        );

        transfers
    }
}

impl Default for SettlementPlanner {
    fn default() -> Self {
        Self::new()
    }
}
