// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// JSON report rendered from a finished collection run.
///
/// Contributors are ordered by total commits, most active first, with ties
/// broken by identity so repeated runs over the same data render identically.
use std::{
    fs,
    io::{self, Write},
    path::Path,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    contribution::{ContributionWindow, ContributorRecord},
    error::{self, Error},
    store::StatsSnapshot,
};

/// Commit rates derived from the active span of a contributor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize,)]
pub struct CommitRates
{
    pub per_day:   Option<f64,>,
    pub per_week:  Option<f64,>,
    pub per_month: Option<f64,>,
    pub per_year:  Option<f64,>,
}

/// Report line for a single contributor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize,)]
pub struct ReportEntry
{
    pub identity:      String,
    pub avatar_url:    Option<String,>,
    pub totals:        ContributionWindow,
    pub last_7_days:   ContributionWindow,
    pub last_30_days:  ContributionWindow,
    pub last_365_days: ContributionWindow,
    pub first_week:    Option<DateTime<Utc,>,>,
    pub last_week:     Option<DateTime<Utc,>,>,
    pub rates:         CommitRates,
}

impl From<&ContributorRecord,> for ReportEntry
{
    fn from(record: &ContributorRecord,) -> Self
    {
        Self {
            identity:      record.identity.clone(),
            avatar_url:    record.avatar_url.clone(),
            totals:        record.totals,
            last_7_days:   record.window_7d,
            last_30_days:  record.window_30d,
            last_365_days: record.window_365d,
            first_week:    record.earliest_commit_week,
            last_week:     record.latest_commit_week,
            rates:         CommitRates {
                per_day:   record.commits_per_day(),
                per_week:  record.commits_per_week(),
                per_month: record.commits_per_month(),
                per_year:  record.commits_per_year(),
            },
        }
    }
}

/// Report document for one organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize,)]
pub struct Report
{
    pub organization: String,
    /// Reference instant the windows were measured against.
    pub generated_at: DateTime<Utc,>,
    pub repositories: u64,
    pub contributors: Vec<ReportEntry,>,
}

impl Report
{
    /// Builds a report from a fully merged snapshot.
    pub fn from_snapshot(organization: &str, snapshot: &StatsSnapshot,) -> Self
    {
        let mut contributors: Vec<ReportEntry,> =
            snapshot.contributors.values().map(ReportEntry::from,).collect();
        contributors.sort_by(|a, b| {
            b.totals.commits.cmp(&a.totals.commits,).then_with(|| a.identity.cmp(&b.identity,),)
        },);

        Self {
            organization: organization.to_owned(),
            generated_at: snapshot.as_of,
            repositories: snapshot.total_repositories,
            contributors,
        }
    }
}

/// Serializes `report` as JSON into `writer`.
///
/// # Errors
///
/// Returns [`Error::Serialize`] when serialization or writing fails.
pub fn write_report_to<W: io::Write,>(writer: W, report: &Report, pretty: bool,) -> Result<(), Error,>
{
    if pretty {
        serde_json::to_writer_pretty(writer, report,)?;
    } else {
        serde_json::to_writer(writer, report,)?;
    }
    Ok((),)
}

/// Writes `report` to `path`, creating missing parent directories.
///
/// # Errors
///
/// Returns [`Error::Io`] when the directory or file cannot be written and
/// [`Error::Serialize`] when serialization fails.
pub fn write_report(path: &Path, report: &Report, pretty: bool,) -> Result<(), Error,>
{
    if let Some(parent,) = path.parent().filter(|parent| !parent.as_os_str().is_empty(),) {
        fs::create_dir_all(parent,).map_err(|source| error::io_error(parent, source,),)?;
    }

    let file = fs::File::create(path,).map_err(|source| error::io_error(path, source,),)?;
    let mut writer = io::BufWriter::new(file,);
    write_report_to(&mut writer, report, pretty,)?;
    writer.flush().map_err(|source| error::io_error(path, source,),)?;

    info!(
        "Wrote report for {} ({} contributors) to {}",
        report.organization,
        report.contributors.len(),
        path.display()
    );
    Ok((),)
}
