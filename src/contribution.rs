// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Value types describing contributor activity.
//!
//! A [`WeeklySample`] is the unit returned by the statistics endpoint. Samples
//! are folded into a [`ContributorRecord`], which keeps all-time totals plus
//! rolling 7, 30 and 365 day windows measured against a fixed reference
//! instant.

use std::ops::{Add, AddAssign};

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

const HOURS_PER_DAY: f64 = 24.0;
const HOURS_PER_WEEK: f64 = 168.0;
const HOURS_PER_MONTH: f64 = 720.0;
const HOURS_PER_YEAR: f64 = 8760.0;

/// Upper bound, in hours, of the seven day window.
pub const WEEK_WINDOW_HOURS: i64 = 168;
/// Upper bound, in hours, of the thirty day window.
pub const MONTH_WINDOW_HOURS: i64 = 720;
/// Upper bound, in hours, of the 365 day window.
pub const YEAR_WINDOW_HOURS: i64 = 8760;

/// Additions, deletions and commits summed over some time range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize,)]
pub struct ContributionWindow
{
    pub additions: i64,
    pub deletions: i64,
    pub commits:   i64,
}

impl ContributionWindow
{
    /// Creates a window from raw counters.
    pub const fn new(additions: i64, deletions: i64, commits: i64,) -> Self
    {
        Self {
            additions,
            deletions,
            commits,
        }
    }

    /// Adds the counters of a single weekly sample.
    pub fn add_sample(&mut self, sample: &WeeklySample,)
    {
        self.additions += sample.additions;
        self.deletions += sample.deletions;
        self.commits += sample.commits;
    }
}

impl Add for ContributionWindow
{
    type Output = Self;

    fn add(self, rhs: Self,) -> Self::Output
    {
        Self::new(
            self.additions + rhs.additions,
            self.deletions + rhs.deletions,
            self.commits + rhs.commits,
        )
    }
}

impl AddAssign for ContributionWindow
{
    fn add_assign(&mut self, rhs: Self,)
    {
        *self = *self + rhs;
    }
}

/// One week of activity for one contributor on one repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize,)]
pub struct WeeklySample
{
    /// Start of the week, as reported by the statistics endpoint.
    pub week_start: DateTime<Utc,>,
    pub additions:  i64,
    pub deletions:  i64,
    pub commits:    i64,
}

impl WeeklySample
{
    pub const fn new(
        week_start: DateTime<Utc,>,
        additions: i64,
        deletions: i64,
        commits: i64,
    ) -> Self
    {
        Self {
            week_start,
            additions,
            deletions,
            commits,
        }
    }
}

/// Aggregated activity of a single contributor across every merged
/// repository.
///
/// Windows are cumulative: each sample is classified once, when it is
/// absorbed, against the reference instant supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize,)]
pub struct ContributorRecord
{
    /// Unique contributor key, usually the GitHub login.
    pub identity:             String,
    /// Profile picture reported alongside the first merged statistics.
    pub avatar_url:           Option<String,>,
    /// All-time totals.
    pub totals:               ContributionWindow,
    pub window_7d:            ContributionWindow,
    pub window_30d:           ContributionWindow,
    pub window_365d:          ContributionWindow,
    /// Earliest observed week, `None` until a sample is absorbed.
    pub earliest_commit_week: Option<DateTime<Utc,>,>,
    /// Latest observed week, `None` until a sample is absorbed.
    pub latest_commit_week:   Option<DateTime<Utc,>,>,
}

impl ContributorRecord
{
    /// Creates an empty record carrying only the identity.
    pub fn new(identity: impl Into<String,>,) -> Self
    {
        Self {
            identity:             identity.into(),
            avatar_url:           None,
            totals:               ContributionWindow::default(),
            window_7d:            ContributionWindow::default(),
            window_30d:           ContributionWindow::default(),
            window_365d:          ContributionWindow::default(),
            earliest_commit_week: None,
            latest_commit_week:   None,
        }
    }

    /// Records `avatar_url` unless one is already known.
    pub fn adopt_avatar(&mut self, avatar_url: Option<&str,>,)
    {
        if self.avatar_url.is_none() {
            self.avatar_url = avatar_url.map(str::to_owned,);
        }
    }

    /// Folds a sample into the totals, the windows it falls into relative to
    /// `as_of`, and the observed week range.
    pub fn absorb(&mut self, sample: &WeeklySample, as_of: DateTime<Utc,>,)
    {
        self.totals.add_sample(sample,);

        let age = as_of - sample.week_start;
        if age < TimeDelta::hours(WEEK_WINDOW_HOURS,) {
            self.window_7d.add_sample(sample,);
        }
        if age < TimeDelta::hours(MONTH_WINDOW_HOURS,) {
            self.window_30d.add_sample(sample,);
        }
        if age < TimeDelta::hours(YEAR_WINDOW_HOURS,) {
            self.window_365d.add_sample(sample,);
        }

        self.earliest_commit_week = Some(match self.earliest_commit_week {
            Some(current,) => current.min(sample.week_start,),
            None => sample.week_start,
        },);
        self.latest_commit_week = Some(match self.latest_commit_week {
            Some(current,) => current.max(sample.week_start,),
            None => sample.week_start,
        },);
    }

    /// Time between the earliest and latest observed week.
    pub fn active_span(&self,) -> Option<TimeDelta,>
    {
        match (self.earliest_commit_week, self.latest_commit_week,) {
            (Some(earliest,), Some(latest,),) => Some(latest - earliest,),
            _ => None,
        }
    }

    pub fn commits_per_day(&self,) -> Option<f64,>
    {
        self.commit_rate(HOURS_PER_DAY,)
    }

    pub fn commits_per_week(&self,) -> Option<f64,>
    {
        self.commit_rate(HOURS_PER_WEEK,)
    }

    pub fn commits_per_month(&self,) -> Option<f64,>
    {
        self.commit_rate(HOURS_PER_MONTH,)
    }

    pub fn commits_per_year(&self,) -> Option<f64,>
    {
        self.commit_rate(HOURS_PER_YEAR,)
    }

    /// Total commits scaled to `period_hours`; `None` when the span is empty.
    fn commit_rate(&self, period_hours: f64,) -> Option<f64,>
    {
        let span = self.active_span()?;
        let span_hours = span.num_seconds() as f64 / 3600.0;
        if span_hours <= 0.0 {
            return None;
        }
        Some(self.totals.commits as f64 / span_hours * period_hours,)
    }
}
