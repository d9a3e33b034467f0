use anyhow::anyhow;
use std::{fmt::Display, str::FromStr, time::Duration};
use tracing::{info, warn};

const DEFAULT_PORT: usize = 5000;
const DEFAULT_TELEGRAM_API_BASE_URL: &str = "https://api.telegram.org";
const DEFAULT_CALENDAR_FEED_URL: &str = "https://nfs.faireconomy.media/ff_calendar_thisweek.json";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
const DEFAULT_PUSH_LEAD_TIME_MINUTES: i64 = 5;
const DEFAULT_EVENT_RETENTION_HOURS: i64 = 24 * 7;
const DEFAULT_REFRESH_INTERVAL_MINUTES: u64 = 60;
const DEFAULT_PUSH_INTERVAL_MINUTES: u64 = 2;
const DEFAULT_PUSH_CONCURRENCY: usize = 10;

#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the application to run on
    pub port: usize,
    /// Credential used for every call to the chat platform
    pub telegram_bot_token: String,
    pub telegram_api_base_url: String,
    /// Url of the economic calendar feed consulted by the refresh job
    pub calendar_feed_url: String,
    /// Upper bound for a single call to the calendar feed or the chat platform.
    /// A refresh tick whose feed call exceeds it is abandoned until the next tick.
    pub http_timeout: Duration,
    /// Half width in millis of the window around now in which
    /// undelivered events are considered due by the push job
    pub push_lead_time: i64,
    /// Events scheduled longer than this many millis ago are pruned by the refresh job
    pub event_retention: i64,
    /// How often the in-process scheduler triggers the refresh job
    pub refresh_interval: Duration,
    /// How often the in-process scheduler triggers the push job
    pub push_interval: Duration,
    /// Max number of notifications for a single event in flight at once
    pub push_concurrency: usize,
    /// Whether the application should tick the refresh and push jobs itself.
    /// Disable when an external scheduler calls the invoke endpoint instead.
    pub run_job_schedulers: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            telegram_bot_token: String::new(),
            telegram_api_base_url: DEFAULT_TELEGRAM_API_BASE_URL.into(),
            calendar_feed_url: DEFAULT_CALENDAR_FEED_URL.into(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            push_lead_time: DEFAULT_PUSH_LEAD_TIME_MINUTES * 60 * 1000,
            event_retention: DEFAULT_EVENT_RETENTION_HOURS * 60 * 60 * 1000,
            refresh_interval: Duration::from_secs(DEFAULT_REFRESH_INTERVAL_MINUTES * 60),
            push_interval: Duration::from_secs(DEFAULT_PUSH_INTERVAL_MINUTES * 60),
            push_concurrency: DEFAULT_PUSH_CONCURRENCY,
            run_job_schedulers: true,
        }
    }
}

fn parse_or_default<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + Display + Copy,
{
    match lookup(key) {
        None => default,
        Some(value) => match value.trim().parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                warn!(
                    "The given {}: {} is not valid, falling back to the default: {}.",
                    key, value, default
                );
                default
            }
        },
    }
}

impl Config {
    /// Reads the configuration from the process environment.
    /// Should be called once at startup.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let telegram_bot_token = lookup("TELEGRAM_BOT_TOKEN")
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| anyhow!("TELEGRAM_BOT_TOKEN env variable not set"))?;

        let telegram_api_base_url = lookup("TELEGRAM_API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_TELEGRAM_API_BASE_URL.into());
        let calendar_feed_url = match lookup("CALENDAR_FEED_URL") {
            Some(url) => url,
            None => {
                info!(
                    "Did not find CALENDAR_FEED_URL environment variable. Going to use: {}",
                    DEFAULT_CALENDAR_FEED_URL
                );
                DEFAULT_CALENDAR_FEED_URL.into()
            }
        };

        let port = parse_or_default(&lookup, "PORT", DEFAULT_PORT);
        let http_timeout_secs =
            parse_or_default(&lookup, "FEED_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS);
        let push_lead_time_minutes = parse_or_default(
            &lookup,
            "PUSH_LEAD_TIME_MINUTES",
            DEFAULT_PUSH_LEAD_TIME_MINUTES,
        );
        let event_retention_hours = parse_or_default(
            &lookup,
            "EVENT_RETENTION_HOURS",
            DEFAULT_EVENT_RETENTION_HOURS,
        );
        let refresh_interval_minutes = parse_or_default(
            &lookup,
            "REFRESH_INTERVAL_MINUTES",
            DEFAULT_REFRESH_INTERVAL_MINUTES,
        );
        let push_interval_minutes = parse_or_default(
            &lookup,
            "PUSH_INTERVAL_MINUTES",
            DEFAULT_PUSH_INTERVAL_MINUTES,
        );
        let push_concurrency =
            parse_or_default(&lookup, "PUSH_CONCURRENCY", DEFAULT_PUSH_CONCURRENCY);
        let run_job_schedulers = parse_or_default(&lookup, "RUN_JOB_SCHEDULERS", true);

        Ok(Self {
            port,
            telegram_bot_token,
            telegram_api_base_url,
            calendar_feed_url,
            http_timeout: Duration::from_secs(http_timeout_secs.max(1)),
            push_lead_time: push_lead_time_minutes.max(0) * 60 * 1000,
            event_retention: event_retention_hours.max(0) * 60 * 60 * 1000,
            refresh_interval: Duration::from_secs(refresh_interval_minutes.max(1) * 60),
            push_interval: Duration::from_secs(push_interval_minutes.max(1) * 60),
            push_concurrency: push_concurrency.max(1),
            run_job_schedulers,
        })
    }
}
