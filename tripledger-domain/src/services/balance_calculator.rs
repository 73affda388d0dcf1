use rust_decimal::Decimal;

use crate::{
    archive::SettlementArchive,
    currency::CurrencyRateTable,
    ledger::ExpenseLedger,
    model::{Expense, Member, MemberBalances, MemberId, Money},
};

/// Net position of every member in the base currency.
///
/// Every contribution is booked as a matched credit/debit pair, so the
/// balances sum to zero up to decimal precision:
/// - for each debtor of an expense (a split member other than the payer whose
///   share is not already cleared by an expense-scoped settlement) the payer is
///   credited one share and the debtor debited one share;
/// - every global settlement credits its payer and debits its receiver.
///
/// Members that are referenced by expenses or settlements but no longer on the
/// roster still get an entry, otherwise the map would stop summing to zero.
///
/// A pair that would overflow the Decimal range is skipped whole and logged,
/// so the remaining balances still sum to zero.
pub struct BalanceCalculator;

impl BalanceCalculator {
    pub fn calculate(
        &self,
        members: &[Member],
        ledger: &ExpenseLedger,
        rates: &CurrencyRateTable,
        archive: &SettlementArchive,
    ) -> MemberBalances {
        let mut balances: MemberBalances = members
            .iter()
            .map(|member| (member.id.clone(), Money::ZERO))
            .collect();
        let settled = archive.settled_shares();

        for expense in ledger.iter() {
            let Some(share) = Self::checked_share(expense, rates) else {
                tracing::warn!(
                    expense_id = %expense.id,
                    amount = %expense.amount,
                    currency = %expense.currency,
                    "Expense does not fit the base currency range; left out of balances"
                );
                continue;
            };
            for debtor in &expense.split_with {
                if *debtor == expense.payer_id || settled.contains(&(expense.id, debtor)) {
                    continue;
                }
                if !credit_pair(&mut balances, &expense.payer_id, debtor, share) {
                    tracing::warn!(
                        expense_id = %expense.id,
                        debtor = %debtor,
                        "Share overflows a balance; left out of balances"
                    );
                }
            }
        }

        for settlement in archive.globals() {
            if !credit_pair(
                &mut balances,
                &settlement.from_id,
                &settlement.to_id,
                settlement.amount,
            ) {
                tracing::warn!(
                    settlement_id = %settlement.id,
                    "Settlement overflows a balance; left out of balances"
                );
            }
        }

        tracing::debug!(
            member_count = balances.len(),
            expense_count = ledger.len(),
            settlement_count = archive.len(),
            "Balances recalculated"
        );

        balances
    }

    /// One split member's part of an expense, in base currency, unrounded.
    /// Saturates like [`CurrencyRateTable::to_base`].
    pub fn share(expense: &Expense, rates: &CurrencyRateTable) -> Money {
        split(rates.to_base(expense.amount, &expense.currency), expense)
    }

    /// Like [`Self::share`], `None` when the conversion overflows.
    pub fn checked_share(expense: &Expense, rates: &CurrencyRateTable) -> Option<Money> {
        rates
            .checked_to_base(expense.amount, &expense.currency)
            .map(|base| split(base, expense))
    }
}

fn split(base: Money, expense: &Expense) -> Money {
    match expense.split_count() {
        0 => Money::ZERO,
        count => base / Decimal::from(count as u64),
    }
}

/// Credits `creditor` and debits `debtor` by `amount`, or changes nothing when
/// either side would overflow.
fn credit_pair(
    balances: &mut MemberBalances,
    creditor: &MemberId,
    debtor: &MemberId,
    amount: Money,
) -> bool {
    let current = |member: &MemberId| balances.get(member).copied().unwrap_or(Money::ZERO);
    let (Some(credited), Some(debited)) = (
        current(creditor).checked_add(amount),
        current(debtor).checked_sub(amount),
    ) else {
        return false;
    };
    if creditor == debtor {
        return true;
    }
    balances.insert(creditor.clone(), credited);
    balances.insert(debtor.clone(), debited);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        currency::CurrencyCode,
        model::{Category, ExpenseId},
    };
    use chrono::{NaiveDate, TimeZone, Utc};
    use rstest::{fixture, rstest};
    use rust_decimal_macros::dec;

    #[fixture]
    fn members() -> Vec<Member> {
        vec![
            Member::new("alice", "Alice"),
            Member::new("bob", "Bob"),
            Member::new("carol", "Carol"),
        ]
    }

    #[fixture]
    fn rates() -> CurrencyRateTable {
        CurrencyRateTable::from_rates(CurrencyCode::new("TWD"), [(CurrencyCode::new("FX"), dec!(2))])
    }

    fn expense(id: u64, amount: Decimal, currency: &str, payer: &str, split: &[&str]) -> Expense {
        Expense {
            id: ExpenseId(id),
            amount,
            currency: CurrencyCode::new(currency),
            category: Category::Food,
            payer_id: MemberId::new(payer),
            split_with: split.iter().map(MemberId::new).collect(),
            added_by: MemberId::new(payer),
            date: NaiveDate::from_ymd_opt(2025, 6, 1).expect("date"),
            note: String::new(),
            created_at: Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).single().expect("ts"),
        }
    }

    fn balances(entries: &[(&str, Decimal)]) -> MemberBalances {
        entries
            .iter()
            .map(|(id, amount)| (MemberId::new(id), Money::from_decimal(*amount)))
            .collect()
    }

    #[rstest]
    #[case::even_split_including_payer(
        vec![expense(1, dec!(300), "TWD", "alice", &["alice", "bob", "carol"])],
        balances(&[("alice", dec!(200)), ("bob", dec!(-100)), ("carol", dec!(-100))])
    )]
    #[case::foreign_currency(
        vec![expense(1, dec!(90), "FX", "bob", &["alice", "bob", "carol"])],
        balances(&[("alice", dec!(-60)), ("bob", dec!(120)), ("carol", dec!(-60))])
    )]
    #[case::payer_outside_split(
        vec![expense(1, dec!(100), "TWD", "carol", &["alice", "bob"])],
        balances(&[("alice", dec!(-50)), ("bob", dec!(-50)), ("carol", dec!(100))])
    )]
    #[case::self_split_is_noop(
        vec![expense(1, dec!(999), "TWD", "bob", &["bob"])],
        balances(&[("alice", dec!(0)), ("bob", dec!(0)), ("carol", dec!(0))])
    )]
    #[case::unknown_currency_at_one(
        vec![expense(1, dec!(30), "XYZ", "alice", &["bob", "carol"])],
        balances(&[("alice", dec!(30)), ("bob", dec!(-15)), ("carol", dec!(-15))])
    )]
    #[case::non_member_gets_entry(
        vec![expense(1, dec!(40), "TWD", "dave", &["alice", "dave"])],
        balances(&[("alice", dec!(-20)), ("bob", dec!(0)), ("carol", dec!(0)), ("dave", dec!(20))])
    )]
    fn calculate_cases(
        members: Vec<Member>,
        rates: CurrencyRateTable,
        #[case] expenses: Vec<Expense>,
        #[case] expected: MemberBalances,
    ) {
        let ledger = ExpenseLedger::from_expenses(expenses);
        let result = BalanceCalculator.calculate(&members, &ledger, &rates, &SettlementArchive::new());
        assert_eq!(result, expected);
    }

    #[rstest]
    fn global_settlement_moves_balance(members: Vec<Member>, rates: CurrencyRateTable) {
        let ledger = ExpenseLedger::from_expenses(vec![expense(
            1,
            dec!(300),
            "TWD",
            "alice",
            &["alice", "bob", "carol"],
        )]);
        let mut archive = SettlementArchive::new();
        archive
            .record_global(
                MemberId::new("bob"),
                MemberId::new("alice"),
                Money::from_i64(100),
                Utc::now(),
            )
            .expect("record");

        let result = BalanceCalculator.calculate(&members, &ledger, &rates, &archive);

        assert_eq!(
            result,
            balances(&[("alice", dec!(100)), ("bob", dec!(0)), ("carol", dec!(-100))])
        );
    }

    #[rstest]
    fn expense_scoped_settlement_excludes_share(members: Vec<Member>, rates: CurrencyRateTable) {
        let ledger = ExpenseLedger::from_expenses(vec![expense(
            4,
            dec!(90),
            "FX",
            "bob",
            &["alice", "bob", "carol"],
        )]);
        let mut archive = SettlementArchive::new();
        archive
            .record_for_expense(
                ExpenseId(4),
                MemberId::new("alice"),
                MemberId::new("bob"),
                Money::from_i64(60),
                Utc::now(),
            )
            .expect("record");

        let result = BalanceCalculator.calculate(&members, &ledger, &rates, &archive);

        assert_eq!(
            result,
            balances(&[("alice", dec!(0)), ("bob", dec!(60)), ("carol", dec!(-60))])
        );
    }

    #[rstest]
    fn orphaned_scoped_settlement_is_ignored(members: Vec<Member>, rates: CurrencyRateTable) {
        let mut archive = SettlementArchive::new();
        archive
            .record_for_expense(
                ExpenseId(99),
                MemberId::new("alice"),
                MemberId::new("bob"),
                Money::from_i64(60),
                Utc::now(),
            )
            .expect("record");

        let result =
            BalanceCalculator.calculate(&members, &ExpenseLedger::new(), &rates, &archive);

        assert!(result.values().all(|balance| balance.is_zero()));
    }

    #[rstest]
    fn thirds_accumulate_without_rounding(members: Vec<Member>, rates: CurrencyRateTable) {
        let ledger = ExpenseLedger::from_expenses(vec![
            expense(1, dec!(100), "TWD", "alice", &["alice", "bob", "carol"]),
            expense(2, dec!(100), "TWD", "alice", &["alice", "bob", "carol"]),
            expense(3, dec!(100), "TWD", "alice", &["alice", "bob", "carol"]),
        ]);

        let result = BalanceCalculator.calculate(&members, &ledger, &rates, &SettlementArchive::new());
        let total: Money = result.values().sum();

        assert!(total.abs() < Money::new(1, 6));
        assert_eq!(result[&MemberId::new("bob")].round_dp(6), Money::from_i64(-100));
    }

    #[rstest]
    fn unconvertible_expense_is_left_out(members: Vec<Member>, rates: CurrencyRateTable) {
        let ledger = ExpenseLedger::from_expenses(vec![
            expense(1, Decimal::MAX, "FX", "bob", &["alice", "bob"]),
            expense(2, dec!(90), "FX", "bob", &["alice", "bob", "carol"]),
        ]);

        let result = BalanceCalculator.calculate(&members, &ledger, &rates, &SettlementArchive::new());

        assert_eq!(
            result,
            balances(&[("alice", dec!(-60)), ("bob", dec!(120)), ("carol", dec!(-60))])
        );
    }

    #[rstest]
    fn overflowing_pairs_keep_zero_sum(members: Vec<Member>, rates: CurrencyRateTable) {
        let ledger = ExpenseLedger::from_expenses(
            (1..=3)
                .map(|id| expense(id, Decimal::MAX, "TWD", "alice", &["alice", "bob"]))
                .collect(),
        );

        let result = BalanceCalculator.calculate(&members, &ledger, &rates, &SettlementArchive::new());
        let alice = result[&MemberId::new("alice")];
        let bob = result[&MemberId::new("bob")];

        assert!(alice > Money::ZERO);
        assert_eq!(alice.checked_add(bob), Some(Money::ZERO));
        assert!(result[&MemberId::new("carol")].is_zero());
    }
}
