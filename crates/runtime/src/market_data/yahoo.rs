use std::time::Duration;

use async_trait::async_trait;
use core_sim::PricePoint;
use serde::Deserialize;
use time::{Date, OffsetDateTime};
use tracing::{debug, info, warn};

use super::{DataUnavailable, PriceProvider, PriceRequest};

pub const DEFAULT_YAHOO_BASE_URL: &str = "https://query1.finance.yahoo.com";
const MONTHLY_INTERVAL: &str = "1mo";
const REQUEST_TIMEOUT_SECS: u64 = 20;
const USER_AGENT: &str = "Mozilla/5.0 (compatible; dji-dashboard/0.1)";

/// Client for the Yahoo Finance v8 chart endpoint.
#[derive(Debug, Clone)]
pub struct YahooChartClient {
    http: reqwest::Client,
    base_url: String,
}

impl YahooChartClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, DataUnavailable> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|err| DataUnavailable::Transport(err.to_string()))?;

        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Ok(Self { http, base_url })
    }

    pub fn chart_url(&self, symbol: &str) -> String {
        format!("{}/v8/finance/chart/{}", self.base_url, encode_symbol(symbol))
    }
}

#[async_trait]
impl PriceProvider for YahooChartClient {
    async fn monthly_closes(
        &self,
        request: &PriceRequest,
    ) -> Result<Vec<PricePoint>, DataUnavailable> {
        let url = self.chart_url(&request.symbol);
        let period1 = unix_midnight(request.start);
        let period2 = unix_midnight(request.end.next_day().unwrap_or(request.end));
        debug!(%url, period1, period2, "requesting monthly closes");

        let response = self
            .http
            .get(&url)
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", MONTHLY_INTERVAL.to_owned()),
                ("events", "history".to_owned()),
            ])
            .send()
            .await
            .map_err(|err| DataUnavailable::Transport(err.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| DataUnavailable::Transport(err.to_string()))?;

        if !status.is_success() {
            return Err(match parse_chart_payload(&body, &request.symbol) {
                Err(provider_error @ DataUnavailable::Provider { .. }) => provider_error,
                _ => DataUnavailable::Status(status.as_u16()),
            });
        }

        let points = parse_chart_payload(&body, &request.symbol)?;
        info!(symbol = %request.symbol, months = points.len(), "loaded monthly closes");
        Ok(points)
    }
}

/// Decodes a chart response into a chronological series with one close per
/// calendar month.
///
/// Rows with a missing or non-positive close are skipped. When a month shows
/// up twice (the running month is often reported next to its first day), the
/// later row wins. Timestamp and close arrays of different length are a
/// decode error.
pub fn parse_chart_payload(raw: &str, symbol: &str) -> Result<Vec<PricePoint>, DataUnavailable> {
    let envelope: ChartEnvelope =
        serde_json::from_str(raw).map_err(|err| DataUnavailable::Decode(err.to_string()))?;

    if let Some(error) = envelope.chart.error {
        return Err(DataUnavailable::Provider {
            code: error.code,
            description: error.description.unwrap_or_default(),
        });
    }

    let result = envelope
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| no_rows(symbol))?;

    let closes = result
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|quote| quote.close)
        .unwrap_or_default();

    if closes.len() != result.timestamp.len() {
        return Err(DataUnavailable::Decode(format!(
            "{} timestamps but {} closes",
            result.timestamp.len(),
            closes.len()
        )));
    }

    let offset = result.meta.gmtoffset;
    let mut rows: Vec<PricePoint> = Vec::with_capacity(result.timestamp.len());
    let mut skipped = 0_usize;

    for (timestamp, close) in result.timestamp.iter().zip(closes.iter()) {
        let Some(close) = close.filter(|close| close.is_finite() && *close > 0.0) else {
            skipped += 1;
            continue;
        };
        let Ok(moment) = OffsetDateTime::from_unix_timestamp(timestamp.saturating_add(offset))
        else {
            skipped += 1;
            continue;
        };
        rows.push(PricePoint::new(moment.date(), close));
    }

    if skipped > 0 {
        warn!(symbol, skipped, "skipped chart rows without a usable close");
    }

    rows.sort_by_key(|point| point.date);
    let mut monthly: Vec<PricePoint> = Vec::with_capacity(rows.len());
    for point in rows {
        match monthly.last_mut() {
            Some(last)
                if last.date.year() == point.date.year()
                    && last.date.month() == point.date.month() =>
            {
                *last = point;
            }
            _ => monthly.push(point),
        }
    }

    if monthly.is_empty() {
        return Err(no_rows(symbol));
    }

    Ok(monthly)
}

fn no_rows(symbol: &str) -> DataUnavailable {
    DataUnavailable::NoRows {
        symbol: symbol.to_owned(),
    }
}

fn unix_midnight(date: Date) -> i64 {
    date.midnight().assume_utc().unix_timestamp()
}

fn encode_symbol(symbol: &str) -> String {
    let mut encoded = String::with_capacity(symbol.len());
    for byte in symbol.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'.' | b'-' | b'_' | b'=') {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{byte:02X}"));
        }
    }
    encoded
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    #[serde(default)]
    indicators: Indicators,
}

#[derive(Debug, Default, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Default, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}
