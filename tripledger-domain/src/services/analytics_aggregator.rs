use fxhash::FxHashSet;
use rust_decimal::Decimal;

use crate::{
    currency::CurrencyRateTable,
    ledger::ExpenseLedger,
    model::{Category, Expense, Member, MemberId, Money},
    services::BalanceCalculator,
};

/// Whose spending a breakdown describes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Viewpoint {
    /// Only expenses shared by the whole roster, at full value.
    Team,
    /// Every expense the member is split into, at their share.
    Member(MemberId),
}

#[derive(Clone, Debug, PartialEq)]
pub struct CategoryShare<'a> {
    pub category: Category,
    pub total: Money,
    /// Percent of the breakdown total, unrounded.
    pub percentage: Decimal,
    /// Sum of the percentages of every larger category before this one.
    pub cumulative_start: Decimal,
    pub items: Vec<&'a Expense>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CategoryBreakdown<'a> {
    pub total: Money,
    /// Non-empty categories, largest first.
    pub categories: Vec<CategoryShare<'a>>,
}

pub struct AnalyticsAggregator;

impl AnalyticsAggregator {
    pub fn by_category<'a>(
        &self,
        viewpoint: &Viewpoint,
        members: &[Member],
        ledger: &'a ExpenseLedger,
        rates: &CurrencyRateTable,
    ) -> CategoryBreakdown<'a> {
        let mut buckets: Vec<(Category, Money, Vec<&'a Expense>)> = Category::ALL
            .into_iter()
            .map(|category| (category, Money::ZERO, Vec::new()))
            .collect();

        for expense in ledger.iter() {
            let Some(value) = Self::counted_value(viewpoint, members, expense, rates) else {
                continue;
            };
            if let Some((_, total, items)) = buckets
                .iter_mut()
                .find(|(category, _, _)| *category == expense.category)
            {
                *total += value;
                items.push(expense);
            }
        }

        buckets.retain(|(_, total, _)| !total.is_zero());
        // Stable: equal totals keep category order.
        buckets.sort_by(|a, b| b.1.cmp(&a.1));

        let total: Money = buckets.iter().map(|(_, total, _)| *total).sum();
        let mut cumulative = Decimal::ZERO;
        let categories = buckets
            .into_iter()
            .map(|(category, category_total, items)| {
                let percentage = if total.is_zero() {
                    Decimal::ZERO
                } else {
                    category_total.as_decimal() / total.as_decimal() * Decimal::ONE_HUNDRED
                };
                let share = CategoryShare {
                    category,
                    total: category_total,
                    percentage,
                    cumulative_start: cumulative,
                    items,
                };
                cumulative += percentage;
                share
            })
            .collect();

        tracing::debug!(?viewpoint, %total, "Category breakdown computed");

        CategoryBreakdown { total, categories }
    }

    /// Full converted value of every expense shared by the whole roster.
    pub fn team_total(
        &self,
        members: &[Member],
        ledger: &ExpenseLedger,
        rates: &CurrencyRateTable,
    ) -> Money {
        ledger
            .iter()
            .filter(|expense| is_team_expense(members, expense))
            .map(|expense| rates.to_base(expense.amount, &expense.currency))
            .sum()
    }

    fn counted_value(
        viewpoint: &Viewpoint,
        members: &[Member],
        expense: &Expense,
        rates: &CurrencyRateTable,
    ) -> Option<Money> {
        match viewpoint {
            Viewpoint::Team => is_team_expense(members, expense)
                .then(|| rates.to_base(expense.amount, &expense.currency)),
            Viewpoint::Member(member) => expense
                .is_split_with(member)
                .then(|| BalanceCalculator::share(expense, rates)),
        }
    }
}

fn is_team_expense(members: &[Member], expense: &Expense) -> bool {
    if members.is_empty() {
        return false;
    }
    let roster: FxHashSet<&MemberId> = members.iter().map(|member| &member.id).collect();
    let split: FxHashSet<&MemberId> = expense.split_with.iter().collect();
    roster == split
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::CurrencyCode;
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
        CurrencyRateTable::from_rates(CurrencyCode::new("TWD"), [(CurrencyCode::new("JPY"), dec!(0.2))])
    }

    fn expense(id: u64, category: Category, amount: Decimal, currency: &str, split: &[&str]) -> Expense {
        Expense {
            id: crate::model::ExpenseId(id),
            amount,
            currency: CurrencyCode::new(currency),
            category,
            payer_id: MemberId::new("alice"),
            split_with: split.iter().map(MemberId::new).collect(),
            added_by: MemberId::new("alice"),
            date: NaiveDate::from_ymd_opt(2025, 6, 1).expect("date"),
            note: String::new(),
            created_at: Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).single().expect("ts"),
        }
    }

    #[fixture]
    fn ledger() -> ExpenseLedger {
        ExpenseLedger::from_expenses(vec![
            expense(1, Category::Food, dec!(300), "TWD", &["alice", "bob", "carol"]),
            expense(2, Category::Transport, dec!(3000), "JPY", &["carol", "bob", "alice"]),
            expense(3, Category::Shopping, dec!(500), "TWD", &["alice", "bob"]),
            expense(4, Category::Food, dec!(150), "TWD", &["bob", "carol", "alice"]),
        ])
    }

    fn summary(breakdown: &CategoryBreakdown<'_>) -> Vec<(Category, Money, usize)> {
        breakdown
            .categories
            .iter()
            .map(|share| (share.category, share.total, share.items.len()))
            .collect()
    }

    #[rstest]
    #[case::team(
        Viewpoint::Team,
        Money::from_i64(1050),
        vec![(Category::Transport, Money::from_i64(600), 1), (Category::Food, Money::from_i64(450), 2)]
    )]
    #[case::member_in_everything(
        Viewpoint::Member(MemberId::new("bob")),
        Money::from_i64(600),
        vec![
            (Category::Shopping, Money::from_i64(250), 1),
            (Category::Transport, Money::from_i64(200), 1),
            (Category::Food, Money::from_i64(150), 2),
        ]
    )]
    #[case::member_without_expenses(Viewpoint::Member(MemberId::new("dave")), Money::ZERO, vec![])]
    fn by_category_cases(
        members: Vec<Member>,
        rates: CurrencyRateTable,
        ledger: ExpenseLedger,
        #[case] viewpoint: Viewpoint,
        #[case] expected_total: Money,
        #[case] expected: Vec<(Category, Money, usize)>,
    ) {
        let breakdown = AnalyticsAggregator.by_category(&viewpoint, &members, &ledger, &rates);

        assert_eq!(breakdown.total, expected_total);
        assert_eq!(summary(&breakdown), expected);
    }

    #[rstest]
    fn percentages_accumulate(members: Vec<Member>, rates: CurrencyRateTable, ledger: ExpenseLedger) {
        let breakdown = AnalyticsAggregator.by_category(
            &Viewpoint::Member(MemberId::new("bob")),
            &members,
            &ledger,
            &rates,
        );

        let shares: Vec<(Decimal, Decimal)> = breakdown
            .categories
            .iter()
            .map(|share| (share.cumulative_start, share.percentage.round_dp(4)))
            .collect();
        assert_eq!(shares[0], (Decimal::ZERO, dec!(41.6667)));
        assert_eq!(shares[1].1, dec!(33.3333));
        assert_eq!(shares[2].1, dec!(25));
        assert_eq!(
            (shares[2].0 + breakdown.categories[2].percentage).round_dp(6),
            dec!(100)
        );
    }

    #[rstest]
    fn equal_totals_keep_category_order(members: Vec<Member>, rates: CurrencyRateTable) {
        let ledger = ExpenseLedger::from_expenses(vec![
            expense(1, Category::Activity, dec!(90), "TWD", &["alice", "bob", "carol"]),
            expense(2, Category::Food, dec!(90), "TWD", &["alice", "bob", "carol"]),
        ]);

        let breakdown = AnalyticsAggregator.by_category(&Viewpoint::Team, &members, &ledger, &rates);
        let order: Vec<Category> = breakdown.categories.iter().map(|s| s.category).collect();

        assert_eq!(order, vec![Category::Food, Category::Activity]);
    }

    #[rstest]
    fn team_total_requires_full_roster(
        members: Vec<Member>,
        rates: CurrencyRateTable,
        ledger: ExpenseLedger,
    ) {
        assert_eq!(
            AnalyticsAggregator.team_total(&members, &ledger, &rates),
            Money::from_i64(1050)
        );
    }

    #[rstest]
    fn same_size_split_with_stranger_is_not_team(members: Vec<Member>, rates: CurrencyRateTable) {
        let ledger = ExpenseLedger::from_expenses(vec![expense(
            1,
            Category::Food,
            dec!(300),
            "TWD",
            &["alice", "bob", "dave"],
        )]);

        assert!(AnalyticsAggregator.team_total(&members, &ledger, &rates).is_zero());
    }
}
