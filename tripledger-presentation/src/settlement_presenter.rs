use crate::{
    format::{format_balance, format_member_label, format_money},
    text_table::{Alignment, TextTableBuilder},
};
use std::borrow::Cow;
use tripledger_application::MemberDirectory;
use tripledger_domain::{ArchivedSettlement, MemberBalances, Transfer};
use tripledger_i18n as i18n;

pub struct SettlementPresenter;

pub struct SettlementView {
    pub balance_table: String,
    /// `None` once everyone is settled.
    pub transfer_table: Option<String>,
}

impl SettlementPresenter {
    pub fn render(
        balances: &MemberBalances,
        transfers: &[Transfer],
        member_directory: &dyn MemberDirectory,
    ) -> SettlementView {
        let balance_table = Self::build_balance_table(balances, member_directory);
        let transfer_table = if transfers.is_empty() {
            None
        } else {
            Some(Self::build_transfer_table(transfers, member_directory))
        };

        SettlementView {
            balance_table,
            transfer_table,
        }
    }

    pub fn build_balance_table(
        balances: &MemberBalances,
        member_directory: &dyn MemberDirectory,
    ) -> String {
        let mut builder = TextTableBuilder::new()
            .alignments(&[Alignment::Left, Alignment::Right])
            .headers(&[Cow::Borrowed(i18n::MEMBER), Cow::Borrowed(i18n::BALANCE)]);

        for (member_id, balance) in balances {
            builder = builder.row([
                format_member_label(member_id, member_directory),
                Cow::Owned(format_balance(*balance)),
            ]);
        }

        builder.build()
    }

    /// Transfers in the order the planner produced them.
    pub fn build_transfer_table(
        transfers: &[Transfer],
        member_directory: &dyn MemberDirectory,
    ) -> String {
        let mut builder = TextTableBuilder::new()
            .alignments(&[Alignment::Left, Alignment::Left, Alignment::Right])
            .headers(&[
                Cow::Borrowed(i18n::FROM),
                Cow::Borrowed(i18n::TO),
                Cow::Borrowed(i18n::AMOUNT),
            ]);

        for transfer in transfers {
            builder = builder.row([
                format_member_label(&transfer.from, member_directory),
                format_member_label(&transfer.to, member_directory),
                Cow::Owned(format_money(transfer.amount)),
            ]);
        }

        builder.build()
    }

    /// Archive rows, newest first.
    pub fn build_history_table(
        history: &[ArchivedSettlement],
        member_directory: &dyn MemberDirectory,
    ) -> String {
        let mut builder = TextTableBuilder::new()
            .alignments(&[
                Alignment::Left,
                Alignment::Left,
                Alignment::Left,
                Alignment::Left,
                Alignment::Right,
                Alignment::Left,
            ])
            .headers(&[
                Cow::Borrowed(i18n::ID),
                Cow::Borrowed(i18n::DATE),
                Cow::Borrowed(i18n::FROM),
                Cow::Borrowed(i18n::TO),
                Cow::Borrowed(i18n::AMOUNT),
                Cow::Borrowed(i18n::SCOPE),
            ]);

        for settlement in history {
            let scope = match settlement.expense_id {
                Some(expense_id) => Cow::Owned(format!("#{expense_id}")),
                None => Cow::Borrowed(i18n::SCOPE_GLOBAL),
            };
            builder = builder.row([
                Cow::Owned(settlement.id.to_string()),
                Cow::Owned(settlement.date().to_string()),
                format_member_label(&settlement.from_id, member_directory),
                format_member_label(&settlement.to_id, member_directory),
                Cow::Owned(format_money(settlement.amount)),
                scope,
            ]);
        }

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rstest::rstest;
    use rust_decimal_macros::dec;
    use tripledger_domain::{ExpenseId, Member, MemberId, Money, SettlementId};

    fn roster() -> Vec<Member> {
        vec![Member::new("a", "Alice"), Member::new("b", "Bob")]
    }

    fn transfer(from: &str, to: &str, amount: Money) -> Transfer {
        Transfer {
            from: MemberId::new(from),
            to: MemberId::new(to),
            amount,
        }
    }

    #[rstest]
    fn settled_group_has_no_transfer_table() {
        let members = roster();
        let balances = MemberBalances::from([
            (MemberId::new("a"), Money::ZERO),
            (MemberId::new("b"), Money::ZERO),
        ]);

        let view = SettlementPresenter::render(&balances, &[], &members.as_slice());

        assert!(view.transfer_table.is_none());
        assert!(view.balance_table.contains("Alice"));
    }

    #[rstest]
    fn transfers_use_display_names() {
        let members = roster();
        let balances = MemberBalances::from([
            (MemberId::new("a"), Money::from_decimal(dec!(150.4))),
            (MemberId::new("b"), Money::from_decimal(dec!(-150.4))),
        ]);
        let transfers = [transfer("b", "a", Money::from_decimal(dec!(150.4)))];

        let view = SettlementPresenter::render(&balances, &transfers, &members.as_slice());
        let Some(table) = view.transfer_table else {
            panic!("expected a transfer table");
        };
        let row = table.lines().nth(2).unwrap_or_default();

        assert!(row.starts_with("Bob"));
        assert!(row.contains("Alice"));
        assert!(row.ends_with("150"));
        assert!(view.balance_table.contains("+150"));
        assert!(view.balance_table.contains("-150"));
    }

    #[rstest]
    fn history_marks_scope() {
        let members = roster();
        let created_at = Utc.with_ymd_and_hms(2024, 5, 2, 9, 0, 0).unwrap();
        let history = [
            ArchivedSettlement {
                id: SettlementId::new(),
                from_id: MemberId::new("b"),
                to_id: MemberId::new("a"),
                amount: Money::from_i64(50),
                expense_id: Some(ExpenseId(42)),
                created_at,
            },
            ArchivedSettlement {
                id: SettlementId::new(),
                from_id: MemberId::new("b"),
                to_id: MemberId::new("a"),
                amount: Money::from_i64(100),
                expense_id: None,
                created_at,
            },
        ];

        let table = SettlementPresenter::build_history_table(&history, &members.as_slice());
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[2].ends_with("#42"));
        assert!(lines[3].ends_with(i18n::SCOPE_GLOBAL));
        assert!(lines[2].contains("2024-05-02"));
    }
}
