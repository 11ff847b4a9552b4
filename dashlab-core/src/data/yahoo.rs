//! Yahoo Finance data provider.
//!
//! Fetches daily OHLCV bars from Yahoo's v8 chart API. Handles the request
//! timeout, retries with exponential backoff, response parsing, and the
//! circuit breaker.
//!
//! Yahoo Finance has no official API and is subject to unannounced format
//! changes. The CSV provider is the offline fallback.

use super::circuit_breaker::CircuitBreaker;
use super::provider::{DataError, DataOrigin, DataProvider, FetchResult, RawBar};
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

pub const DEFAULT_BASE_URL: &str = "https://query2.finance.yahoo.com";

/// HTTP behaviour of the Yahoo provider.
#[derive(Debug, Clone)]
pub struct YahooSettings {
    /// Budget for one `fetch`, retries and backoff included. Running out
    /// counts as "no data".
    pub timeout: Duration,
    pub max_retries: u32,
    pub base_delay: Duration,
    pub base_url: String,
}

impl Default for YahooSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            max_retries: 2,
            base_delay: Duration::from_millis(250),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// Yahoo Finance data provider.
pub struct YahooProvider {
    client: reqwest::blocking::Client,
    circuit_breaker: Arc<CircuitBreaker>,
    settings: YahooSettings,
}

impl YahooProvider {
    pub fn new(
        circuit_breaker: Arc<CircuitBreaker>,
        settings: YahooSettings,
    ) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(settings.timeout)
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            circuit_breaker,
            settings,
        })
    }

    /// Build the chart API URL for an inclusive date range.
    fn chart_url(base_url: &str, symbol: &str, start: NaiveDate, end: NaiveDate) -> String {
        let start_ts = start.and_time(NaiveTime::MIN).and_utc().timestamp();
        // period2 is exclusive, so point it at the start of the following day.
        let end_ts = end.and_time(NaiveTime::MIN).and_utc().timestamp() + 86_400;
        format!(
            "{}/v8/finance/chart/{symbol}\
             ?period1={start_ts}&period2={end_ts}&interval=1d",
            base_url.trim_end_matches('/')
        )
    }

    /// Parse the chart API response into RawBars.
    ///
    /// A result with no timestamps means no trading days in the range.
    fn parse_response(symbol: &str, resp: ChartResponse) -> Result<Vec<RawBar>, DataError> {
        let result = resp.chart.result.ok_or_else(|| {
            if let Some(err) = resp.chart.error {
                if err.code == "Not Found" {
                    DataError::SymbolNotFound {
                        symbol: symbol.to_string(),
                    }
                } else {
                    DataError::ResponseFormatChanged(format!("{}: {}", err.code, err.description))
                }
            } else {
                DataError::ResponseFormatChanged("empty result with no error".into())
            }
        })?;

        let Some(data) = result.into_iter().next() else {
            return Ok(Vec::new());
        };

        let Some(timestamps) = data.timestamp else {
            return Ok(Vec::new());
        };

        let quote = data
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("no quote data".into()))?;

        let mut bars = Vec::with_capacity(timestamps.len());

        for (i, &ts) in timestamps.iter().enumerate() {
            let date = chrono::DateTime::from_timestamp(ts, 0)
                .map(|dt| dt.naive_utc().date())
                .ok_or_else(|| {
                    DataError::ResponseFormatChanged(format!("invalid timestamp: {ts}"))
                })?;

            let open = quote.open.get(i).copied().flatten();
            let high = quote.high.get(i).copied().flatten();
            let low = quote.low.get(i).copied().flatten();
            let close = quote.close.get(i).copied().flatten();
            let volume = quote.volume.get(i).copied().flatten();

            // Holidays come back as all-null rows
            if open.is_none()
                && high.is_none()
                && low.is_none()
                && close.is_none()
                && volume.is_none()
            {
                continue;
            }

            bars.push(RawBar {
                date,
                open: open.unwrap_or(f64::NAN),
                high: high.unwrap_or(f64::NAN),
                low: low.unwrap_or(f64::NAN),
                close: close.unwrap_or(f64::NAN),
                volume: volume.unwrap_or(f64::NAN),
            });
        }

        Ok(bars)
    }

    fn timed_out(&self) -> DataError {
        DataError::Timeout {
            secs: self.settings.timeout.as_secs(),
        }
    }

    /// Execute the HTTP request with retry and circuit breaker logic.
    ///
    /// Every attempt and backoff sleep draws on one deadline, so a silent
    /// endpoint costs at most `settings.timeout` in total.
    fn fetch_with_retry(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawBar>, DataError> {
        if !self.circuit_breaker.is_allowed() {
            return Err(DataError::CircuitBreakerTripped);
        }

        let url = Self::chart_url(&self.settings.base_url, symbol, start, end);
        let deadline = Instant::now() + self.settings.timeout;
        let mut last_error = None;

        for attempt in 0..=self.settings.max_retries {
            if attempt > 0 {
                let delay = backoff_delay(self.settings.base_delay, attempt);
                let remaining = deadline.saturating_duration_since(Instant::now());
                if delay >= remaining {
                    tracing::debug!(symbol, attempt, "no time left for another Yahoo attempt");
                    break;
                }
                tracing::debug!(symbol, attempt, ?delay, "retrying Yahoo request");
                std::thread::sleep(delay);
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(last_error.unwrap_or_else(|| self.timed_out()));
            }

            if !self.circuit_breaker.is_allowed() {
                return Err(DataError::CircuitBreakerTripped);
            }

            match self.client.get(&url).timeout(remaining).send() {
                Ok(resp) => {
                    let status = resp.status();

                    if status == reqwest::StatusCode::FORBIDDEN {
                        self.circuit_breaker.trip();
                        return Err(DataError::CircuitBreakerTripped);
                    }

                    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        self.circuit_breaker.record_failure();
                        let retry_after = resp
                            .headers()
                            .get("retry-after")
                            .and_then(|v| v.to_str().ok())
                            .and_then(|v| v.parse::<u64>().ok())
                            .unwrap_or(60);
                        last_error = Some(DataError::RateLimited {
                            retry_after_secs: retry_after,
                        });
                        continue;
                    }

                    if status == reqwest::StatusCode::UNAUTHORIZED {
                        return Err(DataError::AuthenticationRequired(
                            "Yahoo Finance requires authentication".into(),
                        ));
                    }

                    if status == reqwest::StatusCode::NOT_FOUND {
                        return Err(DataError::SymbolNotFound {
                            symbol: symbol.to_string(),
                        });
                    }

                    if !status.is_success() {
                        self.circuit_breaker.record_failure();
                        last_error = Some(DataError::Other(format!("HTTP {status} for {symbol}")));
                        continue;
                    }

                    let chart: ChartResponse = resp.json().map_err(|e| {
                        DataError::ResponseFormatChanged(format!(
                            "failed to parse response for {symbol}: {e}"
                        ))
                    })?;

                    let bars = Self::parse_response(symbol, chart)?;
                    self.circuit_breaker.record_success();
                    return Ok(bars);
                }
                Err(e) if e.is_timeout() => {
                    self.circuit_breaker.record_failure();
                    last_error = Some(self.timed_out());
                }
                Err(e) if e.is_connect() => {
                    self.circuit_breaker.record_failure();
                    last_error = Some(DataError::NetworkUnreachable(e.to_string()));
                }
                Err(e) => return Err(DataError::NetworkUnreachable(e.to_string())),
            }
        }

        Err(last_error.unwrap_or_else(|| DataError::Other("max retries exceeded".into())))
    }
}

/// `base * 2^(attempt - 1)`, saturating instead of overflowing.
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
    base.saturating_mul(factor)
}

impl DataProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn origin(&self) -> DataOrigin {
        DataOrigin::YahooFinance
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        let bars = self.fetch_with_retry(symbol, start, end)?;
        Ok(FetchResult {
            symbol: symbol.to_string(),
            bars,
            origin: DataOrigin::YahooFinance,
        })
    }

    fn is_available(&self) -> bool {
        self.circuit_breaker.is_allowed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<Vec<RawBar>, DataError> {
        let resp: ChartResponse = serde_json::from_str(json).unwrap();
        YahooProvider::parse_response("AAPL", resp)
    }

    #[test]
    fn url_covers_end_date_inclusively() {
        let url = YahooProvider::chart_url(
            DEFAULT_BASE_URL,
            "AAPL",
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        );
        assert!(url.starts_with("https://query2.finance.yahoo.com/v8/finance/chart/AAPL?"));
        assert!(url.contains("period1=1704067200"));
        assert!(url.contains("period2=1704153600"));
    }

    #[test]
    fn parses_bars_and_skips_holidays() {
        let json = r#"{"chart":{"result":[{
            "timestamp":[1704205800,1704292200,1704378600],
            "indicators":{"quote":[{
                "open":[187.15,null,182.15],
                "high":[188.44,null,183.09],
                "low":[183.89,null,180.88],
                "close":[185.64,null,181.91],
                "volume":[82488700,null,71983600]
            }]}
        }],"error":null}}"#;

        let bars = parse(json).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(bars[1].close, 181.91);
        assert_eq!(bars[1].volume, 71_983_600.0);
    }

    #[test]
    fn partial_gap_becomes_nan() {
        let json = r#"{"chart":{"result":[{
            "timestamp":[1704205800],
            "indicators":{"quote":[{
                "open":[187.15],"high":[null],"low":[183.89],"close":[185.64],"volume":[100]
            }]}
        }],"error":null}}"#;

        let bars = parse(json).unwrap();
        assert!(bars[0].high.is_nan());
    }

    #[test]
    fn range_without_trading_days_is_empty_not_error() {
        let json = r#"{"chart":{"result":[{"indicators":{"quote":[{}]}}],"error":null}}"#;
        assert!(parse(json).unwrap().is_empty());
    }

    #[test]
    fn not_found_maps_to_symbol_not_found() {
        let json = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        assert!(matches!(parse(json), Err(DataError::SymbolNotFound { .. })));
    }

    #[test]
    fn unknown_error_maps_to_format_change() {
        let json = r#"{"chart":{"result":null,"error":{"code":"Bad Request","description":"Invalid input"}}}"#;
        assert!(matches!(
            parse(json),
            Err(DataError::ResponseFormatChanged(_))
        ));
    }

    #[test]
    fn open_breaker_refuses_without_network() {
        let breaker = Arc::new(CircuitBreaker::default_provider());
        breaker.trip();
        let provider = YahooProvider::new(breaker, YahooSettings::default()).unwrap();

        assert!(!provider.is_available());
        let result = provider.fetch(
            "AAPL",
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        );
        assert!(matches!(result, Err(DataError::CircuitBreakerTripped)));
    }

    /// Accepts connections and never answers.
    fn silent_endpoint() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            let mut held = Vec::new();
            for stream in listener.incoming().flatten() {
                held.push(stream);
            }
        });
        format!("http://{addr}")
    }

    #[test]
    fn silent_endpoint_is_bounded_by_total_timeout() {
        let settings = YahooSettings {
            timeout: Duration::from_secs(1),
            base_url: silent_endpoint(),
            ..YahooSettings::default()
        };
        let provider =
            YahooProvider::new(Arc::new(CircuitBreaker::default_provider()), settings).unwrap();

        let started = Instant::now();
        let result = provider.fetch(
            "AAPL",
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        );
        let elapsed = started.elapsed();

        assert!(matches!(result, Err(DataError::Timeout { secs: 1 })), "{result:?}");
        assert!(elapsed < Duration::from_millis(1_500), "fetch took {elapsed:?}");
    }

    #[test]
    fn backoff_saturates_for_large_attempts() {
        let base = Duration::from_millis(250);
        assert_eq!(backoff_delay(base, 1), base);
        assert_eq!(backoff_delay(base, 3), Duration::from_secs(1));
        assert!(backoff_delay(base, 40) > Duration::from_secs(86_400));
    }
}
