use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use tripledger_domain::{
    BalanceCalculator, Category, CurrencyCode, CurrencyRateTable, ExpenseDraft, ExpenseLedger,
    Member, MemberBalances, MemberId, Money, SETTLEMENT_EPSILON, SettlementArchive,
    SettlementPlanner,
};

const CURRENCIES: [&str; 3] = ["TWD", "EUR", "XYZ"];

fn roster(count: usize) -> Vec<Member> {
    (0..count)
        .map(|idx| Member::new(format!("m{idx}"), format!("Member {idx}")))
        .collect()
}

fn rates() -> CurrencyRateTable {
    rates_with_eur(Decimal::new(3512, 2))
}

fn rates_with_eur(multiplier: Decimal) -> CurrencyRateTable {
    CurrencyRateTable::from_rates(
        CurrencyCode::new("TWD"),
        [(CurrencyCode::new("EUR"), multiplier)],
    )
}

fn clock(step: i64) -> DateTime<Utc> {
    let start = Utc
        .with_ymd_and_hms(2025, 6, 1, 0, 0, 0)
        .single()
        .expect("start");
    start + Duration::minutes(step)
}

#[derive(Debug, Clone)]
struct ExpenseInput {
    cents: i64,
    currency: usize,
    payer: usize,
    split_mask: usize,
}

fn expense_input() -> impl Strategy<Value = ExpenseInput> {
    (1i64..=1_000_000, 0usize..CURRENCIES.len(), 0usize..=5, 1usize..=63).prop_map(
        |(cents, currency, payer, split_mask)| ExpenseInput {
            cents,
            currency,
            payer,
            split_mask,
        },
    )
}

fn build_ledger(members: &[Member], inputs: &[ExpenseInput]) -> ExpenseLedger {
    let mut ledger = ExpenseLedger::new();
    for (step, input) in inputs.iter().enumerate() {
        let mut split_with: Vec<MemberId> = members
            .iter()
            .enumerate()
            .filter(|(idx, _)| input.split_mask & (1 << idx) != 0)
            .map(|(_, member)| member.id.clone())
            .collect();
        if split_with.is_empty() {
            split_with.push(members[0].id.clone());
        }
        let draft = ExpenseDraft {
            amount: Some(Decimal::new(input.cents, 2)),
            currency: CurrencyCode::new(CURRENCIES[input.currency]),
            category: Category::Others,
            payer_id: members[input.payer % members.len()].id.clone(),
            split_with,
            date: NaiveDate::from_ymd_opt(2025, 6, 1).expect("date"),
            note: String::new(),
        };
        ledger.add(draft, clock(step as i64)).expect("valid draft");
    }
    ledger
}

fn total(balances: &MemberBalances) -> Money {
    balances.values().sum()
}

proptest! {
    #[test]
    fn balances_sum_to_zero(
        member_count in 1usize..=6,
        inputs in prop::collection::vec(expense_input(), 0..=20),
        settlements in prop::collection::vec((0usize..=5, 0usize..=5, 1i64..=100_000), 0..=10),
        removals in prop::collection::vec(any::<prop::sample::Index>(), 0..=5),
    ) {
        let members = roster(member_count);
        let mut ledger = build_ledger(&members, &inputs);
        for removal in removals {
            if ledger.is_empty() {
                break;
            }
            let id = ledger.expenses()[removal.index(ledger.len())].id;
            ledger.remove(id);
        }

        let mut archive = SettlementArchive::new();
        for (step, (from, to, cents)) in settlements.into_iter().enumerate() {
            let from = members[from % member_count].id.clone();
            let to = members[to % member_count].id.clone();
            // Self transfers are rejected; that is fine here.
            let _ = archive.record_global(from, to, Money::new(cents, 2), clock(100 + step as i64));
        }

        let balances = BalanceCalculator.calculate(&members, &ledger, &rates(), &archive);
        prop_assert!(total(&balances).abs() < Money::new(1, 6));
    }

    #[test]
    fn executing_the_plan_converges(
        member_count in 1usize..=6,
        mut inputs in prop::collection::vec(expense_input(), 0..=20),
    ) {
        // Whole multiples of 60 split evenly among up to six members, so no
        // balance lands strictly inside the tolerance band.
        for input in &mut inputs {
            input.cents = (input.cents % 1_000 + 1) * 6_000;
        }
        let members = roster(member_count);
        let ledger = build_ledger(&members, &inputs);
        let rates = rates_with_eur(Decimal::from(35));
        let mut archive = SettlementArchive::new();

        let before = BalanceCalculator.calculate(&members, &ledger, &rates, &archive);
        let plan = SettlementPlanner::new().plan(&before);
        for (step, transfer) in plan.into_iter().enumerate() {
            archive
                .record_global(transfer.from, transfer.to, transfer.amount, clock(1_000 + step as i64))
                .expect("planned transfer is valid");
        }

        let after = BalanceCalculator.calculate(&members, &ledger, &rates, &archive);
        for balance in after.values() {
            prop_assert!(balance.abs() <= SETTLEMENT_EPSILON, "left over {}", balance);
        }
    }

    #[test]
    fn undo_restores_balances(
        member_count in 2usize..=6,
        inputs in prop::collection::vec(expense_input(), 1..=10),
        from in 0usize..=5,
        offset in 1usize..=5,
        cents in 1i64..=100_000,
        scoped in any::<bool>(),
    ) {
        let members = roster(member_count);
        let ledger = build_ledger(&members, &inputs);
        let rates = rates();
        let mut archive = SettlementArchive::new();
        let before = BalanceCalculator.calculate(&members, &ledger, &rates, &archive);

        let from_id = members[from % member_count].id.clone();
        let to_id = members[(from + offset) % member_count].id.clone();
        prop_assume!(from_id != to_id);
        let amount = Money::new(cents, 2);
        let id = if scoped {
            let expense_id = ledger.expenses()[0].id;
            archive.record_for_expense(expense_id, from_id, to_id, amount, clock(500))
        } else {
            archive.record_global(from_id, to_id, amount, clock(500))
        }
        .expect("valid repayment");
        archive.undo(id);

        let after = BalanceCalculator.calculate(&members, &ledger, &rates, &archive);
        prop_assert_eq!(before, after);
    }

    #[test]
    fn self_split_changes_nothing(
        member_count in 1usize..=6,
        inputs in prop::collection::vec(expense_input(), 0..=10),
        payer in 0usize..=5,
        cents in 1i64..=1_000_000,
    ) {
        let members = roster(member_count);
        let rates = rates();
        let archive = SettlementArchive::new();
        let mut ledger = build_ledger(&members, &inputs);
        let before = BalanceCalculator.calculate(&members, &ledger, &rates, &archive);

        let payer_id = members[payer % member_count].id.clone();
        ledger
            .add(
                ExpenseDraft {
                    amount: Some(Decimal::new(cents, 2)),
                    currency: CurrencyCode::new("EUR"),
                    category: Category::Food,
                    payer_id: payer_id.clone(),
                    split_with: vec![payer_id],
                    date: NaiveDate::from_ymd_opt(2025, 6, 2).expect("date"),
                    note: String::new(),
                },
                clock(10_000),
            )
            .expect("valid draft");

        let after = BalanceCalculator.calculate(&members, &ledger, &rates, &archive);
        prop_assert_eq!(before, after);
    }
}
