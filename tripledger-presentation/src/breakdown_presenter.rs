use crate::{
    format::{category_label, format_money, format_percent},
    text_table::{Alignment, TextTableBuilder},
};
use std::borrow::Cow;
use tripledger_domain::{CategoryBreakdown, Money};
use tripledger_i18n as i18n;

pub struct BreakdownPresenter;

impl BreakdownPresenter {
    pub fn build_breakdown_table(breakdown: &CategoryBreakdown<'_>) -> String {
        if breakdown.categories.is_empty() {
            return format!("{}\n", i18n::NO_RECORDS);
        }

        let mut builder = TextTableBuilder::new()
            .alignments(&[
                Alignment::Left,
                Alignment::Right,
                Alignment::Right,
                Alignment::Right,
            ])
            .headers(&[
                Cow::Borrowed(i18n::CATEGORY),
                Cow::Borrowed(i18n::TOTAL),
                Cow::Borrowed(i18n::PERCENT),
                Cow::Borrowed(i18n::ITEMS),
            ]);

        for share in &breakdown.categories {
            builder = builder.row([
                Cow::Borrowed(category_label(share.category)),
                Cow::Owned(format_money(share.total)),
                Cow::Owned(format_percent(share.percentage)),
                Cow::Owned(share.items.len().to_string()),
            ]);
        }

        let mut table = builder.build();
        table.push_str(&format!("{}: {}\n", i18n::TOTAL, format_money(breakdown.total)));
        table
    }

    pub fn format_team_total(total: Money) -> String {
        format!("{}: {}", i18n::TEAM_TOTAL, format_money(total))
    }
}
