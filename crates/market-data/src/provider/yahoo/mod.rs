//! Yahoo Finance quote source.
//!
//! Uses the public v8 chart endpoint, which needs no crumb or API key:
//! - Equities/ETFs (e.g., AAPL, ASML.AS)
//! - Foreign exchange rates (e.g., USDEUR=X)

mod models;

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::StatusCode;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use tracing::{debug, warn};
use urlencoding::encode;

use crate::errors::MarketDataError;
use crate::models::{FetchedQuote, ProviderId};
use crate::provider::QuoteSource;

use models::{YahooChartMeta, YahooChartResponse};

const PROVIDER_ID: &str = "YAHOO";
const BASE_URL: &str = "https://query1.finance.yahoo.com";
const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ============================================================================
// Yahoo Provider
// ============================================================================

/// Yahoo Finance quote source.
///
/// One blocking HTTP request per quote or exchange rate.
pub struct YahooProvider {
    client: Client,
    base_url: String,
}

impl YahooProvider {
    /// Create a new Yahoo Finance provider.
    pub fn new() -> Result<Self, MarketDataError> {
        Self::with_base_url(BASE_URL)
    }

    /// Create a provider talking to a different host (proxies, test servers).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, MarketDataError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to initialize HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn chart_url(&self, symbol: &str) -> String {
        format!(
            "{}/v8/finance/chart/{}?interval=1d&range=1d",
            self.base_url,
            encode(symbol)
        )
    }

    /// Fetch chart metadata for a symbol.
    fn fetch_chart_meta(&self, symbol: &str) -> Result<YahooChartMeta, MarketDataError> {
        let url = self.chart_url(symbol);
        debug!("Fetching Yahoo chart for {} from {}", symbol, url);

        let response = self.client.get(&url).send()?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(MarketDataError::SymbolNotFound(symbol.to_string()));
        }
        if !status.is_success() {
            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("HTTP {} for {}", status, symbol),
            });
        }

        let body = response.text()?;
        parse_chart_meta(symbol, &body)
    }
}

// ============================================================================
// QuoteSource Implementation
// ============================================================================

impl QuoteSource for YahooProvider {
    fn id(&self) -> ProviderId {
        PROVIDER_ID
    }

    fn fetch_quote(&self, symbol: &str) -> Result<FetchedQuote, MarketDataError> {
        let meta = self.fetch_chart_meta(symbol)?;
        quote_from_meta(symbol, &meta)
    }

    fn fetch_fx_rate(&self, from: &str, to: &str) -> Result<Decimal, MarketDataError> {
        let symbol = fx_symbol(from, to);
        let meta = self.fetch_chart_meta(&symbol)?;
        let rate = meta
            .latest_price()
            .and_then(price_to_decimal)
            .ok_or_else(|| MarketDataError::NoPriceData(symbol.clone()))?;

        if rate <= Decimal::ZERO {
            return Err(MarketDataError::InvalidRate {
                from: from.to_string(),
                to: to.to_string(),
                rate: rate.to_string(),
            });
        }
        Ok(rate)
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Chart prices arrive as JSON floats; keep the shortest decimal that
/// round-trips, not the binary expansion.
fn price_to_decimal(value: f64) -> Option<Decimal> {
    Decimal::from_f64(value).map(|d| d.normalize())
}

/// Yahoo symbol for a currency pair.
fn fx_symbol(from: &str, to: &str) -> String {
    format!("{}{}=X", from.to_uppercase(), to.to_uppercase())
}

fn parse_chart_meta(symbol: &str, body: &str) -> Result<YahooChartMeta, MarketDataError> {
    let data: YahooChartResponse =
        serde_json::from_str(body).map_err(|e| MarketDataError::ProviderError {
            provider: PROVIDER_ID.to_string(),
            message: format!("Failed to parse chart response for {}: {}", symbol, e),
        })?;

    if let Some(error) = data.chart.error {
        warn!(
            "Yahoo returned error for {}: {} - {}",
            symbol,
            error.code,
            error.description.as_deref().unwrap_or("no description")
        );
        return Err(MarketDataError::SymbolNotFound(symbol.to_string()));
    }

    data.chart
        .result
        .and_then(|results| results.into_iter().next())
        .map(|result| result.meta)
        .ok_or_else(|| MarketDataError::SymbolNotFound(symbol.to_string()))
}

/// Build a quote from chart metadata.
///
/// London listings are quoted in pence (`GBp`/`GBX`); those are normalized
/// to pounds so FX conversion sees an ISO currency.
fn quote_from_meta(symbol: &str, meta: &YahooChartMeta) -> Result<FetchedQuote, MarketDataError> {
    let price = meta
        .latest_price()
        .and_then(price_to_decimal)
        .ok_or_else(|| MarketDataError::NoPriceData(symbol.to_string()))?;

    match meta.currency.as_deref() {
        Some("GBp") | Some("GBX") => Ok(FetchedQuote::new(price / Decimal::ONE_HUNDRED, "GBP")),
        Some(currency) => Ok(FetchedQuote::new(price, currency)),
        None => Ok(FetchedQuote {
            price,
            currency: None,
        }),
    }
}
