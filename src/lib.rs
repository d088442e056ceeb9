//! Organization-wide contributor statistics for GitHub.
//!
//! The library lists every repository of an organization, polls the lazily
//! computed contributor statistics endpoint of each one on a bounded pool of
//! concurrent tasks, and merges the weekly samples into per-contributor
//! records with all-time totals and rolling 7, 30 and 365 day windows.
//!
//! The pipeline is built around the [`StatsSource`] seam; [`GitHubSource`]
//! implements it on top of Octocrab. A run either completes and yields an
//! immutable [`StatsSnapshot`], or fails on the first unrecoverable error
//! without producing one.

pub mod collector;
pub mod config;
pub mod contribution;
mod error;
pub mod fetcher;
pub mod github;
pub mod report;
pub mod retry;
pub mod source;
pub mod store;

pub use collector::OrganizationCollector;
pub use config::{CollectorConfig, load_config, parse_config, validate_organization};
pub use contribution::{ContributionWindow, ContributorRecord, WeeklySample};
pub use error::{Error, io_error};
pub use fetcher::RepositoryStatsFetcher;
pub use github::GitHubSource;
pub use report::{Report, ReportEntry, write_report, write_report_to};
pub use retry::RetryConfig;
pub use source::{ContributorWeeks, RepositoryPage, RepositoryRef, StatsResponse, StatsSource};
pub use store::{Progress, StatsSnapshot, StatsStore};
