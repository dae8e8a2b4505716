//! Incremental read windows

use crate::urlbuilder::UrlBuilder;
use chrono::{DateTime, SecondsFormat, Utc};

/// How a provider expects timestamps in query parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeFormat {
    /// `2024-05-13T18:48:05Z`
    #[default]
    Rfc3339,
    /// `2024-05-13T18:48:05.049000000Z`
    Rfc3339Nanos,
    /// `2024-05-13`
    Date,
    /// `2024-05-13..*` or `2024-05-13..2024-06-01`, sent in the `since` parameter
    DateRange,
    UnixSeconds,
    UnixMillis,
}

impl TimeFormat {
    pub fn format(&self, time: DateTime<Utc>) -> String {
        match self {
            TimeFormat::Rfc3339 => time.to_rfc3339_opts(SecondsFormat::Secs, true),
            TimeFormat::Rfc3339Nanos => time.to_rfc3339_opts(SecondsFormat::Nanos, true),
            TimeFormat::Date | TimeFormat::DateRange => time.format("%Y-%m-%d").to_string(),
            TimeFormat::UnixSeconds => time.timestamp().to_string(),
            TimeFormat::UnixMillis => time.timestamp_millis().to_string(),
        }
    }
}

/// Query parameters carrying `since`/`until`
///
/// Providers without a native filter have no `TimeFilter`; their reads run
/// unfiltered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeFilter {
    since_param: String,
    until_param: Option<String>,
    format: TimeFormat,
}

impl TimeFilter {
    pub fn new(since_param: impl Into<String>, format: TimeFormat) -> Self {
        Self {
            since_param: since_param.into(),
            until_param: None,
            format,
        }
    }

    #[must_use]
    pub fn with_until(mut self, until_param: impl Into<String>) -> Self {
        self.until_param = Some(until_param.into());
        self
    }

    /// Add the window to a request URL
    pub fn apply(
        &self,
        url: &mut UrlBuilder,
        since: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
    ) {
        if self.format == TimeFormat::DateRange {
            if since.is_none() && until.is_none() {
                return;
            }
            let start = since.map_or_else(|| "*".to_string(), |t| self.format.format(t));
            let end = until.map_or_else(|| "*".to_string(), |t| self.format.format(t));
            url.with_query(&self.since_param, format!("{start}..{end}"));
            return;
        }

        if let Some(since) = since {
            url.with_query(&self.since_param, self.format.format(since));
        }
        if let (Some(param), Some(until)) = (&self.until_param, until) {
            url.with_query(param, self.format.format(until));
        }
    }
}
