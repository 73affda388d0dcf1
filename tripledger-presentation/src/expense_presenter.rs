use crate::{
    format::{category_label, format_member_label, format_money},
    text_table::{Alignment, TextTableBuilder},
};
use std::borrow::Cow;
use tripledger_application::MemberDirectory;
use tripledger_domain::{Expense, MemberId, ShareStatus};
use tripledger_i18n as i18n;

pub struct ExpensePresenter;

impl ExpensePresenter {
    /// One row per expense, amounts in their own currency.
    pub fn build_expense_table(
        expenses: &[Expense],
        member_directory: &dyn MemberDirectory,
    ) -> String {
        if expenses.is_empty() {
            return format!("{}\n", i18n::NO_RECORDS);
        }

        let mut builder = TextTableBuilder::new()
            .alignments(&[
                Alignment::Left,
                Alignment::Left,
                Alignment::Left,
                Alignment::Left,
                Alignment::Right,
                Alignment::Left,
                Alignment::Left,
            ])
            .headers(&[
                Cow::Borrowed(i18n::ID),
                Cow::Borrowed(i18n::DATE),
                Cow::Borrowed(i18n::CATEGORY),
                Cow::Borrowed(i18n::PAYER),
                Cow::Borrowed(i18n::AMOUNT),
                Cow::Borrowed(i18n::SPLIT),
                Cow::Borrowed(i18n::NOTE),
            ]);

        for expense in expenses {
            let split = expense
                .split_with
                .iter()
                .map(|member| format_member_label(member, member_directory))
                .collect::<Vec<_>>()
                .join(", ");
            builder = builder.row([
                Cow::Owned(expense.id.to_string()),
                Cow::Owned(expense.date.to_string()),
                Cow::Borrowed(category_label(expense.category)),
                format_member_label(&expense.payer_id, member_directory),
                Cow::Owned(format!("{} {}", expense.amount.normalize(), expense.currency)),
                Cow::Owned(split),
                Cow::Borrowed(expense.note.as_str()),
            ]);
        }

        builder.build()
    }

    pub fn build_share_table(
        statuses: &[(MemberId, ShareStatus)],
        member_directory: &dyn MemberDirectory,
    ) -> String {
        let mut builder = TextTableBuilder::new()
            .alignments(&[Alignment::Left, Alignment::Left, Alignment::Right])
            .headers(&[
                Cow::Borrowed(i18n::MEMBER),
                Cow::Borrowed(i18n::STATUS),
                Cow::Borrowed(i18n::SHARE),
            ]);

        for (member_id, status) in statuses {
            let share = match status {
                ShareStatus::Outstanding { share } => Cow::Owned(format_money(*share)),
                _ => Cow::Borrowed(""),
            };
            builder = builder.row([
                format_member_label(member_id, member_directory),
                Cow::Borrowed(status_label(status)),
                share,
            ]);
        }

        builder.build()
    }
}

pub fn status_label(status: &ShareStatus) -> &'static str {
    match status {
        ShareStatus::NotInSplit => i18n::STATUS_NOT_IN_SPLIT,
        ShareStatus::Payer => i18n::STATUS_PAYER,
        ShareStatus::Settled(_) => i18n::STATUS_SETTLED,
        ShareStatus::CoveredByGlobal => i18n::STATUS_COVERED,
        ShareStatus::NoOutstandingDebt => i18n::STATUS_NO_DEBT,
        ShareStatus::Outstanding { .. } => i18n::STATUS_OUTSTANDING,
    }
}
