//! CSV exports of the position and aged views.
//!
//! One row per lot (or per disposal record). Price columns are added only
//! when prices were looked up, and are named after the target currency.

use std::path::Path;

use anyhow::{Context, Result};
use csv::Writer;
use rust_decimal::Decimal;
use tracing::info;

use lotwise_core::PortfolioAnalysis;
use lotwise_market_data::QuoteCacheEntry;

use crate::report::DISPLAY_DATE_FORMAT;

const STATUS_CURRENT: &str = "CURRENT";
const STATUS_SOLD: &str = "SOLD";

fn text(value: Option<Decimal>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn price_headers(currency: &str, value_label: &str) -> Vec<String> {
    vec![
        "Ticker".to_string(),
        "Current Price".to_string(),
        "Currency".to_string(),
        format!("Price {}", currency),
        format!("{} {}", value_label, currency),
        "Price Fetch Status".to_string(),
    ]
}

fn price_columns(info: Option<&QuoteCacheEntry>, value: Option<Decimal>) -> Vec<String> {
    match info {
        Some(info) => vec![
            info.resolved_symbol.clone().unwrap_or_default(),
            text(info.native_price),
            info.native_currency.clone().unwrap_or_default(),
            text(info.target_price),
            text(value),
            info.status.as_str().to_string(),
        ],
        None => vec![String::new(); 6],
    }
}

/// Current positions, plus sold positions when disposals were tracked.
///
/// Returns the number of rows written.
pub fn export_positions(analysis: &PortfolioAnalysis, path: &Path) -> Result<usize> {
    let with_prices = analysis.prices_fetched();
    let with_sold = analysis.disposals.is_some();

    let mut headers: Vec<String> = vec!["Stock".into(), "ISIN".into()];
    if with_sold {
        headers.push("Status".into());
    }
    headers.push("Buy Date".into());
    if with_sold {
        headers.push("Sell Date".into());
    }
    headers.push("Quantity".into());
    headers.push("Total Stock Quantity".into());
    if with_prices {
        headers.extend(price_headers(&analysis.target_currency, "Position Value"));
    }

    let mut rows: Vec<Vec<String>> = Vec::new();
    for valued in analysis.open_positions() {
        let key = valued.key();
        for lot in &valued.position.lots {
            let mut row = vec![key.display_name.clone(), key.security_id.clone()];
            if with_sold {
                row.push(STATUS_CURRENT.to_string());
            }
            row.push(lot.opened_date.format(DISPLAY_DATE_FORMAT).to_string());
            if with_sold {
                row.push(String::new());
            }
            row.push(lot.remaining_quantity.to_string());
            row.push(valued.position.total_quantity.to_string());
            if with_prices {
                row.extend(price_columns(valued.price_info.as_ref(), valued.value));
            }
            rows.push(row);
        }
    }
    let current_count = rows.len();

    if let Some(disposals) = &analysis.disposals {
        for (key, records) in disposals {
            for record in records {
                let mut row = vec![
                    key.display_name.clone(),
                    key.security_id.clone(),
                    STATUS_SOLD.to_string(),
                    record.opened_date.format(DISPLAY_DATE_FORMAT).to_string(),
                    record.closed_date.format(DISPLAY_DATE_FORMAT).to_string(),
                    record.quantity.to_string(),
                    String::new(),
                ];
                if with_prices {
                    row.extend(price_columns(None, None));
                }
                rows.push(row);
            }
        }
    }

    write_rows(path, &headers, &rows)?;
    info!("Exported {} position entries to {}", rows.len(), path.display());
    if with_sold {
        info!("  - Current positions: {}", current_count);
        info!("  - Sold positions: {}", rows.len() - current_count);
    }
    Ok(rows.len())
}

/// Lots held past the threshold. Returns the number of rows written.
pub fn export_aged(analysis: &PortfolioAnalysis, path: &Path) -> Result<usize> {
    let with_prices = analysis.prices_fetched();

    let mut headers: Vec<String> = [
        "Stock",
        "ISIN",
        "Buy Date",
        "Quantity",
        "Holding Days",
        "Holding Years",
        "Tax-Free Quantity",
        "Total Stock Quantity",
    ]
    .iter()
    .map(|h| h.to_string())
    .collect();
    if with_prices {
        headers.extend(price_headers(
            &analysis.target_currency,
            "Tax-Free Position Value",
        ));
    }

    let mut rows: Vec<Vec<String>> = Vec::new();
    for position in analysis.aged.iter().flatten() {
        for lot in &position.lots {
            let mut row = vec![
                position.key.display_name.clone(),
                position.key.security_id.clone(),
                lot.opened_date.format(DISPLAY_DATE_FORMAT).to_string(),
                lot.quantity.to_string(),
                lot.holding_days.to_string(),
                format!("{:.2}", lot.holding_years),
                position.qualifying_total.to_string(),
                position.held_total.to_string(),
            ];
            if with_prices {
                row.extend(price_columns(
                    position.price_info.as_ref(),
                    position.aged_value,
                ));
            }
            rows.push(row);
        }
    }

    write_rows(path, &headers, &rows)?;
    info!(
        "Exported {} tax-free position entries to {}",
        rows.len(),
        path.display()
    );
    Ok(rows.len())
}

fn write_rows(path: &Path, headers: &[String], rows: &[Vec<String>]) -> Result<()> {
    let mut writer = Writer::from_path(path)
        .with_context(|| format!("Failed to create export file {}", path.display()))?;
    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to write export file {}", path.display()))?;
    Ok(())
}
