use crate::{
    format::format_money,
    text_table::{Alignment, TextTableBuilder},
};
use std::borrow::Cow;
use tripledger_domain::{Booking, CurrencyRateTable};
use tripledger_i18n as i18n;

pub struct BookingPresenter;

impl BookingPresenter {
    pub fn build_booking_table(bookings: &[Booking], rates: &CurrencyRateTable) -> String {
        if bookings.is_empty() {
            return format!("{}\n", i18n::NO_RECORDS);
        }

        let mut builder = TextTableBuilder::new()
            .alignments(&[
                Alignment::Left,
                Alignment::Left,
                Alignment::Left,
                Alignment::Left,
                Alignment::Right,
                Alignment::Right,
            ])
            .headers(&[
                Cow::Borrowed(i18n::ID),
                Cow::Borrowed(i18n::DATE),
                Cow::Borrowed(i18n::KIND),
                Cow::Borrowed(i18n::TITLE),
                Cow::Borrowed(i18n::AMOUNT),
                Cow::Borrowed(i18n::BASE_COST),
            ]);

        for booking in bookings {
            builder = builder.row([
                Cow::Borrowed(booking.id.as_str()),
                Cow::Owned(booking.date.to_string()),
                Cow::Borrowed(booking.kind()),
                Cow::Borrowed(booking.title.as_str()),
                Cow::Owned(format!("{} {}", booking.price.normalize(), booking.currency)),
                Cow::Owned(format_money(booking.cost_in_base(rates))),
            ]);
        }

        builder.build()
    }
}
