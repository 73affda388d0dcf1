use crate::text_table::{Alignment, TextTableBuilder};
use std::borrow::Cow;
use tripledger_domain::CurrencyRateTable;
use tripledger_i18n as i18n;

pub struct RatesPresenter;

impl RatesPresenter {
    /// The base currency first, then every tracked code in insertion order.
    pub fn build_rates_table(rates: &CurrencyRateTable) -> String {
        let mut builder = TextTableBuilder::new()
            .alignments(&[Alignment::Left, Alignment::Right])
            .headers(&[Cow::Borrowed(i18n::CURRENCY), Cow::Borrowed(i18n::RATE)]);

        builder = builder.row([Cow::Borrowed(rates.base().as_str()), Cow::Borrowed("1")]);
        for (code, multiplier) in rates.rates() {
            if code == rates.base() {
                continue;
            }
            builder = builder.row([
                Cow::Borrowed(code.as_str()),
                Cow::Owned(multiplier.normalize().to_string()),
            ]);
        }

        builder.build()
    }
}
