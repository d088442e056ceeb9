//! Collector settings and input validation.
//!
//! Settings are read from an optional YAML document. Every field has a
//! default, so an empty document (or no document at all) yields the stock
//! behaviour: 100 repositories per listing page, 30 concurrent fetches, a 2
//! second pause for pending statistics, a 10 second pause when throttled and
//! no retry cap.

use std::{fs, path::Path};

use regex::Regex;
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;

use crate::{
    error::{self, Error},
    retry::RetryConfig,
};

/// Largest page size accepted by the repository listing endpoint.
pub const MAX_PER_PAGE: u8 = 100;
const DEFAULT_MAX_WORKERS: usize = 30;
/// GitHub logins: alphanumerics and single inner hyphens.
const ORGANIZATION_PATTERN: &str = r"^[A-Za-z0-9](?:[A-Za-z0-9]|-[A-Za-z0-9])*$";
const MAX_ORGANIZATION_LEN: usize = 39;

/// Tunables for a collection run.
///
/// # Examples
///
/// ```
/// use orgstats::parse_config;
///
/// let config = parse_config("max_workers: 8\nretry:\n  max_attempts: 50\n",)?;
/// assert_eq!(config.max_workers, 8);
/// assert_eq!(config.per_page, 100);
/// assert_eq!(config.retry.max_attempts, Some(50));
/// # Ok::<(), orgstats::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize,)]
#[serde(default, deny_unknown_fields)]
pub struct CollectorConfig
{
    /// Repositories requested per listing page.
    pub per_page:    u8,
    /// Upper bound on concurrently running repository fetches.
    pub max_workers: usize,
    /// Polling behaviour for the statistics endpoint.
    pub retry:       RetryConfig,
}

impl Default for CollectorConfig
{
    fn default() -> Self
    {
        Self {
            per_page:    MAX_PER_PAGE,
            max_workers: DEFAULT_MAX_WORKERS,
            retry:       RetryConfig::default(),
        }
    }
}

impl CollectorConfig
{
    /// Checks the invariants the collector relies on.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when a value is out of range.
    pub fn validate(&self,) -> Result<(), Error,>
    {
        if self.per_page == 0 || self.per_page > MAX_PER_PAGE {
            return Err(Error::validation(format!(
                "per_page must be between 1 and {MAX_PER_PAGE}"
            ),),);
        }
        if self.max_workers == 0 {
            return Err(Error::validation("max_workers must be at least 1",),);
        }
        if self.max_workers > Semaphore::MAX_PERMITS {
            return Err(Error::validation(format!(
                "max_workers must not exceed {}",
                Semaphore::MAX_PERMITS
            ),),);
        }
        if self.retry.max_attempts == Some(0,) {
            return Err(Error::validation(
                "retry.max_attempts must be positive; omit it to retry forever",
            ),);
        }
        Ok((),)
    }
}

/// Loads and validates collector settings from a YAML file.
///
/// # Errors
///
/// Returns [`Error::Io`] when the file cannot be read, [`Error::Parse`] when
/// the YAML is malformed and [`Error::Validation`] when values are out of
/// range.
pub fn load_config(path: &Path,) -> Result<CollectorConfig, Error,>
{
    let contents = fs::read_to_string(path,).map_err(|source| error::io_error(path, source,),)?;
    parse_config(&contents,)
}

/// Parses and validates collector settings from a YAML string.
///
/// An empty document yields [`CollectorConfig::default`].
///
/// # Errors
///
/// Returns [`Error::Parse`] for malformed YAML and [`Error::Validation`] for
/// out-of-range values.
pub fn parse_config(contents: &str,) -> Result<CollectorConfig, Error,>
{
    let config = if contents.trim().is_empty() {
        CollectorConfig::default()
    } else {
        serde_yaml::from_str::<CollectorConfig,>(contents,)?
    };
    config.validate()?;
    Ok(config,)
}

/// Validates an organization login and returns it trimmed.
///
/// # Errors
///
/// Returns [`Error::Validation`] when the name is not a valid GitHub login.
pub fn validate_organization(name: &str,) -> Result<String, Error,>
{
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::validation("organization cannot be empty",),);
    }

    let pattern = Regex::new(ORGANIZATION_PATTERN,)
        .map_err(|e| Error::validation(format!("invalid organization pattern: {e}"),),)?;
    if trimmed.len() > MAX_ORGANIZATION_LEN || !pattern.is_match(trimmed,) {
        return Err(Error::validation(format!("'{trimmed}' is not a valid organization name"),),);
    }

    Ok(trimmed.to_owned(),)
}
