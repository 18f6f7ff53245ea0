//! Yahoo Finance API response models.
//!
//! These models cover the parts of the v8 chart API response the provider
//! reads. Only `meta` is needed for a latest price; the OHLC arrays are
//! ignored.

use serde::Deserialize;

/// Main response wrapper for the chart API
#[derive(Debug, Deserialize)]
pub struct YahooChartResponse {
    pub chart: YahooChart,
}

/// Chart container. Yahoo sets exactly one of `result` / `error`.
#[derive(Debug, Deserialize)]
pub struct YahooChart {
    pub result: Option<Vec<YahooChartResult>>,
    pub error: Option<YahooChartError>,
}

#[derive(Debug, Deserialize)]
pub struct YahooChartResult {
    pub meta: YahooChartMeta,
}

/// Quote metadata for the requested symbol
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YahooChartMeta {
    pub currency: Option<String>,
    pub symbol: Option<String>,
    pub regular_market_price: Option<f64>,
    pub previous_close: Option<f64>,
    pub chart_previous_close: Option<f64>,
}

impl YahooChartMeta {
    /// Latest price, falling back to the previous close outside market hours.
    pub fn latest_price(&self) -> Option<f64> {
        self.regular_market_price
            .or(self.previous_close)
            .or(self.chart_previous_close)
    }
}

#[derive(Debug, Deserialize)]
pub struct YahooChartError {
    pub code: String,
    pub description: Option<String>,
}
