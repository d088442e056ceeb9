#![allow(non_shorthand_field_patterns)]
#![doc = "Error handling primitives shared across the orgstats crate."]
// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! The derive emitted by [`masterror::Error`] expands pattern matches that
//! trigger the `non_shorthand_field_patterns` lint. The lint is disabled for
//! the module to keep the generated implementations warning-free.
//!
//! Transient remote states (statistics still being computed, rate limiting)
//! never surface as errors; every variant below is fatal to a collection run.

use std::path::{Path, PathBuf};

/// Unified error type returned by the collector, configuration loader and
/// CLI.
#[derive(Debug, masterror::Error)]
pub enum Error {
    /// Wraps I/O errors raised while reading configuration or writing reports.
    #[error("I/O failure at {path:?}: {source}")]
    Io {
        /// Location of the file being accessed.
        path:   PathBuf,
        /// Underlying I/O error.
        source: std::io::Error
    },
    /// Wraps YAML decoding errors.
    #[error("failed to parse configuration: {source}")]
    Parse {
        /// Source decoding error from serde_yaml.
        source: serde_yaml::Error
    },
    /// Wraps JSON encoding and decoding errors.
    #[error("failed to process JSON: {source}")]
    Serialize {
        /// Underlying serde_json error.
        source: serde_json::Error
    },
    /// Returned when configuration or remote payloads violate invariants.
    #[error("invalid input: {message}")]
    Validation {
        /// Human readable message describing the validation problem.
        message: String
    },
    /// Transport or client failures when talking to the remote API.
    #[error("service error: {message}")]
    Service {
        /// Human readable message describing the service error.
        message: String
    },
    /// A page of the organization repository listing could not be fetched.
    #[error("failed to list repositories of {organization} (page {page}): {message}")]
    Listing {
        /// Organization being listed.
        organization: String,
        /// One-based page number that failed.
        page:         u32,
        /// Description of the failure.
        message:      String
    },
    /// The statistics endpoint answered with an unrecoverable status.
    #[error("failed to get stats for repository {repository} ({status}): {body}")]
    Remote {
        /// Repository in `owner/name` form.
        repository: String,
        /// HTTP status code returned by the endpoint.
        status:     u16,
        /// Raw response body.
        body:       String
    },
    /// The configured retry cap was reached while polling a repository.
    #[error("stats for repository {repository} still unavailable after {attempts} retries")]
    RetriesExhausted {
        /// Repository in `owner/name` form.
        repository: String,
        /// Number of retries performed before giving up.
        attempts:   u32
    }
}

impl Error {
    /// Constructs a validation error from the provided displayable value.
    pub fn validation<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Validation {
            message: message.into()
        }
    }

    /// Constructs a service error from the provided displayable value.
    pub fn service<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Service {
            message: message.into()
        }
    }

    /// Formats the error for diagnostics without the variant name.
    ///
    /// The returned string matches the [`std::fmt::Display`] implementation.
    pub fn to_display_string(&self) -> String {
        format!("{self}")
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(source: serde_yaml::Error) -> Self {
        Self::Parse {
            source
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        Self::Serialize {
            source
        }
    }
}

/// Creates an [`Error::Io`] variant capturing the failing path and source.
///
/// # Parameters
///
/// * `path` - Location of the file that triggered the error.
/// * `source` - I/O error reported by the operating system.
pub fn io_error(path: &Path, source: std::io::Error) -> Error {
    Error::Io {
        path: path.to_path_buf(),
        source
    }
}
