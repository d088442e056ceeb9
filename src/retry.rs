// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Polling policy for lazily computed statistics.
///
/// The statistics endpoint answers "pending" while GitHub computes the data
/// and "throttled" while the caller is rate limited. Both states are retried
/// after a fixed pause; the number of retries is unbounded unless a cap is
/// configured.
use std::time::Duration;

use serde::{Deserialize, Serialize};

const DEFAULT_PENDING_DELAY_SECS: u64 = 2;
const DEFAULT_THROTTLE_DELAY_SECS: u64 = 10;

/// Configuration for polling the statistics endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize,)]
#[serde(default, deny_unknown_fields)]
pub struct RetryConfig
{
    /// Pause after a "pending" answer, in seconds (default: 2).
    pub pending_delay_secs:  u64,
    /// Pause after a "throttled" answer, in seconds (default: 10).
    pub throttle_delay_secs: u64,
    /// Maximum consecutive retries per repository; `None` retries forever.
    ///
    /// Unbounded retries never end for a repository that is stuck pending or
    /// keeps reporting a rate limit. Only rate-limit 403s are retried, so a
    /// 403 caused by missing permissions fails immediately either way.
    pub max_attempts:        Option<u32,>,
}

impl Default for RetryConfig
{
    fn default() -> Self
    {
        Self {
            pending_delay_secs:  DEFAULT_PENDING_DELAY_SECS,
            throttle_delay_secs: DEFAULT_THROTTLE_DELAY_SECS,
            max_attempts:        None,
        }
    }
}

impl RetryConfig
{
    pub fn pending_delay(&self,) -> Duration
    {
        Duration::from_secs(self.pending_delay_secs,)
    }

    pub fn throttle_delay(&self,) -> Duration
    {
        Duration::from_secs(self.throttle_delay_secs,)
    }

    /// Returns `true` once `retries` retries have used up the configured cap.
    pub fn exhausted(&self, retries: u32,) -> bool
    {
        self.max_attempts.is_some_and(|max| retries >= max,)
    }
}
