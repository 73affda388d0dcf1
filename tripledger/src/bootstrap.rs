use std::{env, path::PathBuf};
use tracing_subscriber::EnvFilter;
use tripledger_domain::CurrencyCode;
use tripledger_infrastructure::DEFAULT_RATE_ENDPOINT;

pub const DOCUMENT_ENV: &str = "TRIPLEDGER_DOCUMENT";
pub const BASE_CURRENCY_ENV: &str = "TRIPLEDGER_BASE_CURRENCY";
pub const RATE_ENDPOINT_ENV: &str = "TRIPLEDGER_RATE_ENDPOINT";

const DEFAULT_DOCUMENT: &str = "trip.json";
const DEFAULT_BASE_CURRENCY: &str = "TWD";

/// Where the trip lives and how rates are fetched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub document: PathBuf,
    pub base_currency: CurrencyCode,
    pub rate_endpoint: String,
}

impl AppConfig {
    /// Reads `.env` first, then the process environment.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        Self {
            document: non_empty(DOCUMENT_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DOCUMENT)),
            base_currency: CurrencyCode::new(
                non_empty(BASE_CURRENCY_ENV)
                    .as_deref()
                    .unwrap_or(DEFAULT_BASE_CURRENCY),
            ),
            rate_endpoint: non_empty(RATE_ENDPOINT_ENV)
                .unwrap_or_else(|| DEFAULT_RATE_ENDPOINT.to_string()),
        }
    }

    /// Command line flags win over the environment.
    pub fn with_overrides(
        mut self,
        document: Option<PathBuf>,
        base_currency: Option<&str>,
        rate_endpoint: Option<String>,
    ) -> Self {
        if let Some(document) = document {
            self.document = document;
        }
        if let Some(base_currency) = base_currency {
            self.base_currency = CurrencyCode::new(base_currency);
        }
        if let Some(rate_endpoint) = rate_endpoint {
            self.rate_endpoint = rate_endpoint;
        }
        self
    }
}

/// Initialize logging and tracing. Logs go to stderr so table output stays clean.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}
