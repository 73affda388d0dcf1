use reqwest::Client;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Deserialize;
use serde_json::Number;
use std::{collections::HashMap, str::FromStr};
use tripledger_application::{RateRefreshError, RateSource};
use tripledger_domain::CurrencyCode;

pub const DEFAULT_RATE_ENDPOINT: &str = "https://open.er-api.com/v6/latest";

/// Decimal places kept on a refreshed multiplier.
const MULTIPLIER_SCALE: u32 = 4;

#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    #[serde(default)]
    rates: Option<HashMap<String, Number>>,
}

/// Exchange rates from an open.er-api.com style endpoint
/// (`GET {endpoint}/{BASE}` answering `{"rates": {"EUR": 0.028, ..}}`).
pub struct ErApiRateSource {
    client: Client,
    endpoint: String,
}

impl ErApiRateSource {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
        }
    }

    fn url(&self, base: &CurrencyCode) -> String {
        let endpoint = self.endpoint.trim_end_matches('/');
        format!("{endpoint}/{base}")
    }
}

impl Default for ErApiRateSource {
    fn default() -> Self {
        Self::new(DEFAULT_RATE_ENDPOINT)
    }
}

impl RateSource for ErApiRateSource {
    async fn fetch(
        &self,
        base: &CurrencyCode,
    ) -> Result<HashMap<CurrencyCode, Decimal>, RateRefreshError> {
        let url = self.url(base);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| RateRefreshError::Request(err.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| RateRefreshError::Request(err.to_string()))?;
        tracing::debug!(%url, %status, body_len = body.len(), "Rate response received");
        if !status.is_success() {
            return Err(RateRefreshError::Request(format!(
                "{url} responded with status {status}"
            )));
        }

        parse_multipliers(&body)
    }
}

/// Turns a rates body (units of each code per one base unit) into multipliers
/// into the base currency. Zero or unparsable rates are left out.
pub fn parse_multipliers(body: &str) -> Result<HashMap<CurrencyCode, Decimal>, RateRefreshError> {
    let response: LatestRatesResponse =
        serde_json::from_str(body).map_err(|err| RateRefreshError::Decode(err.to_string()))?;
    let rates = response.rates.ok_or(RateRefreshError::MissingRates)?;

    Ok(rates
        .iter()
        .filter_map(|(code, rate)| {
            let multiplier = to_multiplier(parse_number(rate)?)?;
            Some((CurrencyCode::new(code), multiplier))
        })
        .collect())
}

fn parse_number(number: &Number) -> Option<Decimal> {
    let text = number.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

fn to_multiplier(rate: Decimal) -> Option<Decimal> {
    if rate <= Decimal::ZERO {
        return None;
    }
    let multiplier = (Decimal::ONE / rate)
        .round_dp_with_strategy(MULTIPLIER_SCALE, RoundingStrategy::MidpointAwayFromZero);
    (multiplier > Decimal::ZERO).then_some(multiplier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[test]
    fn parses_and_inverts_rates() {
        let body = r#"{
            "result": "success",
            "base_code": "TWD",
            "rates": {"TWD": 1, "EUR": 0.0285, "JPY": 4.76, "usd": 0.03125}
        }"#;

        let multipliers = parse_multipliers(body).expect("rates");

        assert_eq!(multipliers.get(&CurrencyCode::new("TWD")), Some(&dec!(1)));
        assert_eq!(multipliers.get(&CurrencyCode::new("EUR")), Some(&dec!(35.0877)));
        assert_eq!(multipliers.get(&CurrencyCode::new("JPY")), Some(&dec!(0.2101)));
        assert_eq!(multipliers.get(&CurrencyCode::new("USD")), Some(&dec!(32)));
    }

    #[rstest]
    #[case::zero(dec!(0), None)]
    #[case::negative(dec!(-2), None)]
    #[case::rounds_to_nothing(dec!(50000), None)]
    #[case::exact(dec!(0.5), Some(dec!(2)))]
    fn multiplier_cases(#[case] rate: Decimal, #[case] expected: Option<Decimal>) {
        assert_eq!(to_multiplier(rate), expected);
    }

    #[rstest]
    #[case::not_json("<html>", RateRefreshError::Decode(String::new()))]
    #[case::no_rates(r#"{"result": "error"}"#, RateRefreshError::MissingRates)]
    fn invalid_bodies(#[case] body: &str, #[case] expected: RateRefreshError) {
        let err = parse_multipliers(body).expect_err("invalid body");
        assert_eq!(
            std::mem::discriminant(&err),
            std::mem::discriminant(&expected)
        );
    }

    #[test]
    fn scientific_notation_is_accepted() {
        let body = r#"{"rates": {"VND": 8.1e2}}"#;
        let multipliers = parse_multipliers(body).expect("rates");
        assert_eq!(multipliers.get(&CurrencyCode::new("VND")), Some(&dec!(0.0012)));
    }

    #[test]
    fn url_joins_endpoint_and_base() {
        let source = ErApiRateSource::new("https://rates.example/v6/latest/");
        assert_eq!(
            source.url(&CurrencyCode::new("twd")),
            "https://rates.example/v6/latest/TWD"
        );
    }
}
