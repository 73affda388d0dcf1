use rust_decimal::{Decimal, RoundingStrategy};
use std::borrow::Cow;
use tripledger_application::MemberDirectory;
use tripledger_domain::{Category, MemberId, Money};
use tripledger_i18n as i18n;

/// Whole units of the base currency.
pub fn format_money(amount: Money) -> String {
    amount.round_dp(0).to_string()
}

/// Like [`format_money`], with an explicit `+` on credits.
pub fn format_balance(amount: Money) -> String {
    let rounded = amount.round_dp(0);
    if rounded >= Money::ZERO {
        format!("+{rounded}")
    } else {
        rounded.to_string()
    }
}

pub fn format_percent(percentage: Decimal) -> String {
    let rounded = percentage
        .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    format!("{rounded}%")
}

pub fn category_label(category: Category) -> &'static str {
    match category {
        Category::Food => i18n::CATEGORY_FOOD,
        Category::Transport => i18n::CATEGORY_TRANSPORT,
        Category::Shopping => i18n::CATEGORY_SHOPPING,
        Category::Accommodation => i18n::CATEGORY_ACCOMMODATION,
        Category::Ticket => i18n::CATEGORY_TICKET,
        Category::Activity => i18n::CATEGORY_ACTIVITY,
        Category::Others => i18n::CATEGORY_OTHERS,
    }
}

pub fn format_member_label<'a>(
    member_id: &MemberId,
    member_directory: &'a dyn MemberDirectory,
) -> Cow<'a, str> {
    match member_directory.display_name(member_id) {
        Some(name) => Cow::Borrowed(name),
        None => Cow::Owned(format!("<{member_id}>")),
    }
}
