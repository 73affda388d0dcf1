use crate::{
    error::{RateRefreshError, StoreError},
    model::{Field, FieldValue},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::{collections::HashMap, pin::Pin};
use tokio_stream::Stream;
use tripledger_domain::{CurrencyCode, Member, MemberId};

/// Latest values of one field: the current value first, then every change.
pub type FieldStream = Pin<Box<dyn Stream<Item = FieldValue> + Send>>;

/// Field-keyed shared document holding the trip state.
pub trait TripStore: Send + Sync {
    /// Subscribe to a field. Dropping the stream ends the subscription.
    fn subscribe(&self, field: Field) -> Result<FieldStream, StoreError>;

    /// Overwrite one field. Last writer wins.
    fn update(&self, value: FieldValue) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Best-effort source of exchange rates.
pub trait RateSource: Send + Sync {
    /// Multipliers into `base` keyed by code. Codes the source does not know
    /// are simply absent.
    fn fetch(
        &self,
        base: &CurrencyCode,
    ) -> impl Future<Output = Result<HashMap<CurrencyCode, Decimal>, RateRefreshError>> + Send;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Display names for member ids.
pub trait MemberDirectory {
    fn display_name(&self, member_id: &MemberId) -> Option<&str>;
}

impl MemberDirectory for &[Member] {
    fn display_name(&self, member_id: &MemberId) -> Option<&str> {
        self.iter()
            .find(|member| member.id == *member_id)
            .map(|member| member.name.as_str())
    }
}

impl MemberDirectory for HashMap<MemberId, String> {
    fn display_name(&self, member_id: &MemberId) -> Option<&str> {
        self.get(member_id).map(String::as_str)
    }
}
