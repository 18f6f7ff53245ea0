//! Terminal report.

use std::collections::BTreeMap;
use std::io::{self, Write};

use rust_decimal::Decimal;

use lotwise_core::aging::AgedPosition;
use lotwise_core::constants::DISPLAY_DECIMAL_PRECISION;
use lotwise_core::ledger::{DisposalRecord, OversellAnomaly};
use lotwise_core::transactions::SecurityKey;
use lotwise_core::valuation::{NotPriced, ValuationSummary, ValuedPosition};
use lotwise_core::PortfolioAnalysis;
use lotwise_market_data::{FetchStatus, QuoteCacheEntry};

pub const DISPLAY_WIDTH: usize = 80;
pub const DISPLAY_DATE_FORMAT: &str = "%Y-%m-%d";
const FETCHED_AT_FORMAT: &str = "%Y-%m-%d %H:%M";

fn rule(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "{}", "=".repeat(DISPLAY_WIDTH))
}

fn money(currency: &str, amount: Decimal) -> String {
    format!(
        "{} {:.prec$}",
        currency,
        amount,
        prec = DISPLAY_DECIMAL_PRECISION as usize
    )
}

pub fn write_banner(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "Lotwise Position Analyzer (FIFO)")?;
    rule(out)
}

/// Current positions, closed securities, sold positions when tracked,
/// ledger anomalies and the not-priced footer.
pub fn write_positions_report(out: &mut impl Write, analysis: &PortfolioAnalysis) -> io::Result<()> {
    let current: Vec<&ValuedPosition> = analysis.open_positions().collect();
    write_current_positions(out, analysis, &current)?;
    write_closed_securities(out, analysis)?;

    if let Some(disposals) = &analysis.disposals {
        write_sold_positions(out, disposals)?;
    }

    write_anomalies(out, &analysis.anomalies)?;
    write_not_priced_footer(out, &analysis.target_currency, &analysis.not_priced())?;
    writeln!(out)
}

/// Lots held past the threshold, ledger anomalies and the not-priced footer.
pub fn write_aged_report(out: &mut impl Write, analysis: &PortfolioAnalysis) -> io::Result<()> {
    let aged: &[AgedPosition] = analysis.aged.as_deref().unwrap_or_default();
    let currency = analysis.target_currency.as_str();

    writeln!(out)?;
    rule(out)?;
    writeln!(
        out,
        "TAX-FREE POSITIONS (held at least {} years, sorted by stock name)",
        analysis.threshold_years
    )?;
    rule(out)?;

    if aged.is_empty() {
        writeln!(out, "\nNo positions eligible for tax-free sale found.")?;
        writeln!(
            out,
            "(No positions have been held for at least {} years)",
            analysis.threshold_years
        )?;
    } else {
        for position in aged {
            write_heading(out, &position.key)?;
            if let Some(info) = &position.price_info {
                write_price_lines(out, currency, info)?;
                if let Some(value) = position.aged_value {
                    writeln!(out, "  Tax-Free Position Value: {}", money(currency, value))?;
                }
            }
            writeln!(
                out,
                "  Tax-Free Shares: {} (out of {} total)",
                position.qualifying_total, position.held_total
            )?;
            writeln!(out, "  Positions eligible for tax-free sale (FIFO order):")?;
            for (i, lot) in position.lots.iter().enumerate() {
                writeln!(
                    out,
                    "    {}. Bought: {}, Quantity: {}, Held: {:.2} years ({} days)",
                    i + 1,
                    lot.opened_date.format(DISPLAY_DATE_FORMAT),
                    lot.quantity,
                    lot.holding_years,
                    lot.holding_days
                )?;
            }
        }

        writeln!(out)?;
        rule(out)?;
        writeln!(
            out,
            "Total different stocks with tax-free positions: {}",
            aged.len()
        )?;
        let total_shares: Decimal = aged.iter().map(|p| p.qualifying_total).sum();
        writeln!(out, "Total tax-free shares across all stocks: {}", total_shares)?;
        writeln!(
            out,
            "Total tax-free position entries: {}",
            aged.iter().map(|p| p.lots.len()).sum::<usize>()
        )?;
        if let Some(summary) = &analysis.aged_summary {
            write_summary(
                out,
                "TAX-FREE PORTFOLIO SUMMARY",
                "Total tax-free position value",
                currency,
                summary,
                analysis,
            )?;
        }
        rule(out)?;
    }

    write_anomalies(out, &analysis.anomalies)?;
    write_not_priced_footer(out, currency, &analysis.aged_not_priced())?;
    writeln!(out)
}

fn write_current_positions(
    out: &mut impl Write,
    analysis: &PortfolioAnalysis,
    current: &[&ValuedPosition],
) -> io::Result<()> {
    let currency = analysis.target_currency.as_str();

    writeln!(out)?;
    rule(out)?;
    writeln!(out, "CURRENT POSITIONS (sorted by stock name)")?;
    rule(out)?;

    if current.is_empty() {
        writeln!(out, "\nNo current positions found.")?;
        return Ok(());
    }

    for valued in current {
        write_heading(out, valued.key())?;
        if let Some(info) = &valued.price_info {
            write_price_lines(out, currency, info)?;
            if let Some(value) = valued.value {
                writeln!(out, "  Position Value: {}", money(currency, value))?;
            }
        }
        writeln!(out, "  Total Shares: {}", valued.position.total_quantity)?;
        writeln!(out, "  Positions (FIFO order):")?;
        for (i, lot) in valued.position.lots.iter().enumerate() {
            writeln!(
                out,
                "    {}. Date: {}, Quantity: {}",
                i + 1,
                lot.opened_date.format(DISPLAY_DATE_FORMAT),
                lot.remaining_quantity
            )?;
        }
    }

    writeln!(out)?;
    rule(out)?;
    writeln!(out, "Total different stocks held: {}", current.len())?;
    writeln!(
        out,
        "Total position entries: {}",
        current.iter().map(|v| v.position.lots.len()).sum::<usize>()
    )?;
    if let Some(summary) = &analysis.summary {
        write_summary(
            out,
            "PORTFOLIO SUMMARY",
            "Total portfolio value",
            currency,
            summary,
            analysis,
        )?;
    }
    rule(out)
}

fn write_closed_securities(out: &mut impl Write, analysis: &PortfolioAnalysis) -> io::Result<()> {
    let closed: Vec<&SecurityKey> = analysis.closed_securities().collect();
    if closed.is_empty() {
        return Ok(());
    }

    writeln!(out, "\nFully sold, zero shares held ({} stocks):", closed.len())?;
    for key in closed {
        writeln!(out, "  • {} (ISIN: {}): 0 shares", key.display_name, key.security_id)?;
    }
    Ok(())
}

fn write_sold_positions(
    out: &mut impl Write,
    disposals: &BTreeMap<SecurityKey, Vec<DisposalRecord>>,
) -> io::Result<()> {
    writeln!(out)?;
    rule(out)?;
    writeln!(out, "SOLD POSITIONS (sorted by stock name)")?;
    rule(out)?;

    if disposals.is_empty() {
        return writeln!(out, "\nNo sold positions found.");
    }

    for (key, records) in disposals {
        write_heading(out, key)?;
        let total_sold: Decimal = records.iter().map(|r| r.quantity).sum();
        writeln!(out, "  Total Sold: {} shares", total_sold)?;
        writeln!(out, "  Sold Positions (chronological):")?;
        for (i, record) in records.iter().enumerate() {
            writeln!(
                out,
                "    {}. Bought: {}, Sold: {}, Quantity: {}",
                i + 1,
                record.opened_date.format(DISPLAY_DATE_FORMAT),
                record.closed_date.format(DISPLAY_DATE_FORMAT),
                record.quantity
            )?;
        }
    }

    writeln!(out)?;
    rule(out)?;
    writeln!(out, "Total different stocks sold: {}", disposals.len())?;
    writeln!(
        out,
        "Total position entries: {}",
        disposals.values().map(Vec::len).sum::<usize>()
    )?;
    rule(out)
}

fn write_heading(out: &mut impl Write, key: &SecurityKey) -> io::Result<()> {
    writeln!(out, "\n{}", key.display_name)?;
    writeln!(out, "  ISIN: {}", key.security_id)
}

fn write_price_lines(out: &mut impl Write, currency: &str, info: &QuoteCacheEntry) -> io::Result<()> {
    if let Some(symbol) = &info.resolved_symbol {
        writeln!(out, "  Ticker: {}", symbol)?;
    }

    let native = info
        .native_price
        .zip(info.native_currency.as_deref())
        .map(|(price, ccy)| money(ccy, price));

    match info.status {
        FetchStatus::Success => {
            let Some(target) = info.target_price else {
                return Ok(());
            };
            let same_currency = info
                .native_currency
                .as_deref()
                .map_or(true, |ccy| ccy.eq_ignore_ascii_case(currency));
            match native {
                Some(native) if !same_currency => writeln!(
                    out,
                    "  Current Price: {} (from {})",
                    money(currency, target),
                    native
                ),
                _ => writeln!(out, "  Current Price: {}", money(currency, target)),
            }
        }
        FetchStatus::SymbolUnresolved => writeln!(out, "  Current Price: N/A (ticker not found)"),
        FetchStatus::SourceError => writeln!(out, "  Current Price: API Error"),
        FetchStatus::ConversionError => writeln!(
            out,
            "  Current Price: {} ({} conversion failed)",
            native.unwrap_or_else(|| "N/A".to_string()),
            currency
        ),
    }
}

fn write_summary(
    out: &mut impl Write,
    title: &str,
    value_label: &str,
    currency: &str,
    summary: &ValuationSummary,
    analysis: &PortfolioAnalysis,
) -> io::Result<()> {
    if summary.priced == 0 {
        return Ok(());
    }
    writeln!(out, "\n{}", title)?;
    writeln!(out, "{}: {}", value_label, money(currency, summary.total_value))?;
    writeln!(
        out,
        "Successfully priced: {}/{} stocks",
        summary.priced,
        summary.securities()
    )?;
    writeln!(
        out,
        "Price data fetched: {}",
        analysis.valuation_time.format(FETCHED_AT_FORMAT)
    )
}

/// Disposals that found no open lot to match, in ledger order.
///
/// Each one points at missing history or an unrecorded corporate action,
/// so the positions above may be understated.
pub fn write_anomalies(out: &mut impl Write, anomalies: &[OversellAnomaly]) -> io::Result<()> {
    if anomalies.is_empty() {
        return Ok(());
    }

    writeln!(out)?;
    rule(out)?;
    writeln!(out, "ANOMALIES: SALES EXCEEDING HELD SHARES ({})", anomalies.len())?;
    rule(out)?;
    writeln!(
        out,
        "Check the transaction history for missing buys, splits or transfers\n"
    )?;
    for anomaly in anomalies {
        writeln!(out, "  • {}", anomaly.key.display_name)?;
        writeln!(
            out,
            "    ISIN: {}, Date: {}, Unmatched quantity: {}",
            anomaly.key.security_id,
            anomaly.date.format(DISPLAY_DATE_FORMAT),
            anomaly.unresolved_quantity
        )?;
    }

    writeln!(out)?;
    rule(out)
}

/// Securities without a value, grouped by why.
pub fn write_not_priced_footer(
    out: &mut impl Write,
    currency: &str,
    groups: &BTreeMap<FetchStatus, Vec<NotPriced>>,
) -> io::Result<()> {
    if groups.is_empty() {
        return Ok(());
    }

    writeln!(out)?;
    rule(out)?;
    writeln!(out, "STOCKS NOT PRICED")?;
    rule(out)?;

    for (status, entries) in groups {
        writeln!(out, "\n{} ({} stocks):", status.describe(), entries.len())?;
        match status {
            FetchStatus::SymbolUnresolved => {
                writeln!(out, "These stocks need ticker symbols added to the ticker mappings file\n")?
            }
            FetchStatus::SourceError => {
                writeln!(out, "Ticker symbols may be incorrect or stock may be delisted\n")?
            }
            FetchStatus::ConversionError => {
                writeln!(out, "Price fetched but could not convert to {}\n", currency)?
            }
            FetchStatus::Success => {}
        }
        for entry in entries {
            writeln!(out, "  • {}", entry.key.display_name)?;
            let symbol = entry.symbol.as_deref().unwrap_or("N/A");
            match status {
                FetchStatus::SymbolUnresolved => {
                    writeln!(out, "    ISIN: {}", entry.key.security_id)?
                }
                FetchStatus::ConversionError => writeln!(
                    out,
                    "    ISIN: {}, Ticker: {}, Currency: {}",
                    entry.key.security_id,
                    symbol,
                    entry.native_currency.as_deref().unwrap_or("N/A")
                )?,
                _ => writeln!(
                    out,
                    "    ISIN: {}, Ticker: {}",
                    entry.key.security_id, symbol
                )?,
            }
        }
    }

    writeln!(out)?;
    rule(out)
}
