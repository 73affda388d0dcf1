use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::{
    currency::{CurrencyCode, CurrencyRateTable},
    model::Money,
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: SmolStr,
    pub title: String,
    pub date: NaiveDate,
    pub price: Decimal,
    pub currency: CurrencyCode,
    pub details: BookingDetails,
}

impl Booking {
    pub fn cost_in_base(&self, rates: &CurrencyRateTable) -> Money {
        rates.to_base(self.price, &self.currency)
    }

    pub fn kind(&self) -> &'static str {
        match self.details {
            BookingDetails::Flight(_) => "flight",
            BookingDetails::Hotel(_) => "hotel",
            BookingDetails::Activity(_) => "activity",
            BookingDetails::Ticket(_) => "ticket",
        }
    }
}

/// One shape per booking kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BookingDetails {
    Flight(FlightDetails),
    Hotel(HotelDetails),
    Activity(ActivityDetails),
    Ticket(TicketDetails),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightDetails {
    pub from: String,
    pub to: String,
    pub flight_no: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dep_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arr_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cabin_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seat: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelDetails {
    pub address: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
}

impl HotelDetails {
    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days().max(0)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seat: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voucher_url: Option<String>,
}
