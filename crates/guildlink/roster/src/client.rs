//! HTTP roster client with bounded retry.

use crate::{RosterError, RosterSource};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use guildlink_types::{Roster, RosterEntry};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Bounded retry with exponential backoff.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    fn next_delay(&self, current: Duration) -> Duration {
        (current * 2).min(self.max_delay)
    }
}

/// One member as the roster API reports it.
#[derive(Debug, Deserialize)]
struct RawRosterMember {
    name: String,
    #[serde(default)]
    rank: Option<String>,
    #[serde(default)]
    joined: Option<DateTime<Utc>>,
}

impl From<RawRosterMember> for RosterEntry {
    fn from(raw: RawRosterMember) -> Self {
        RosterEntry {
            name: raw.name,
            rank: raw.rank.unwrap_or_default(),
            joined: raw.joined,
        }
    }
}

/// Roster Source over HTTP with a bearer credential.
pub struct HttpRosterSource {
    client: reqwest::Client,
    members_url: String,
    bearer_token: String,
    retry: RetryPolicy,
}

impl HttpRosterSource {
    /// `base_url` is the API root; `community_id` selects the roster.
    pub fn new(
        base_url: &str,
        community_id: &str,
        bearer_token: impl Into<String>,
    ) -> Result<Self, RosterError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| RosterError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            members_url: format!(
                "{}/guild/{}/members",
                base_url.trim_end_matches('/'),
                community_id
            ),
            bearer_token: bearer_token.into(),
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    async fn fetch_once(&self) -> Result<Roster, RosterError> {
        let response = self
            .client
            .get(&self.members_url)
            .bearer_auth(&self.bearer_token)
            .send()
            .await
            .map_err(|e| RosterError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RosterError::Status(status.as_u16()));
        }

        let members: Vec<RawRosterMember> = response
            .json()
            .await
            .map_err(|e| RosterError::Malformed(e.to_string()))?;

        debug!(count = members.len(), "fetched roster snapshot");
        Ok(Roster::new(members.into_iter().map(Into::into).collect()))
    }
}

#[async_trait]
impl RosterSource for HttpRosterSource {
    async fn fetch(&self) -> Result<Roster, RosterError> {
        let mut delay = self.retry.base_delay;
        let mut last: Option<RosterError> = None;

        for attempt in 1..=self.retry.max_attempts {
            match self.fetch_once().await {
                Ok(roster) => return Ok(roster),
                Err(err) => {
                    warn!(attempt, error = %err, "roster fetch attempt failed");
                    last = Some(err);
                    if attempt < self.retry.max_attempts {
                        tokio::time::sleep(delay).await;
                        delay = self.retry.next_delay(delay);
                    }
                }
            }
        }

        Err(RosterError::Exhausted {
            attempts: self.retry.max_attempts,
            last: last.map(|e| e.to_string()).unwrap_or_default(),
        })
    }
}
