//! Page token: current window plus open session state

use crate::error::{Error, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Progress through one stream of a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamState {
    pub name: String,
    /// Rows already read
    pub offset: u64,
    pub done: bool,
}

/// An open read session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub name: String,
    /// Serialized Arrow schema, base64 as the API returns it
    #[serde(default)]
    pub schema: String,
    pub streams: Vec<StreamState>,
}

impl SessionState {
    pub fn is_done(&self) -> bool {
        self.streams.iter().all(|s| s.done)
    }
}

/// Continuation of a windowed read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageToken {
    pub window_start: DateTime<Utc>,
    /// Exclusive
    pub window_end: DateTime<Utc>,
    /// Exclusive upper bound of the whole read
    pub end: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionState>,
}

impl PageToken {
    /// First window of `[start, end)`, at most `step` wide
    pub fn first(start: DateTime<Utc>, end: DateTime<Utc>, step: Duration) -> Self {
        Self {
            window_start: start,
            window_end: (start + step).min(end),
            end,
            session: None,
        }
    }

    /// The window after this one, or `None` once `end` is reached
    pub fn next_window(&self, step: Duration) -> Option<Self> {
        if self.window_end >= self.end {
            return None;
        }
        Some(Self::first(self.window_end, self.end, step))
    }

    pub fn encode(&self) -> Result<String> {
        Ok(URL_SAFE_NO_PAD.encode(serde_json::to_vec(self)?))
    }

    pub fn decode(token: &str) -> Result<Self> {
        let bytes = URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|e| Error::invalid_param("nextPage", e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| Error::invalid_param("nextPage", e.to_string()))
    }
}
