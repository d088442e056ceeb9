// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Seam between the collection pipeline and the remote code forge.
//!
//! [`StatsSource`] covers the two remote collaborators the pipeline needs: the
//! paginated repository listing and the lazily computed contributor
//! statistics endpoint.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{contribution::WeeklySample, error::Error};

/// Identifies a remote repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize,)]
pub struct RepositoryRef
{
    pub owner: String,
    pub name:  String,
}

impl RepositoryRef
{
    pub fn new(owner: impl Into<String,>, name: impl Into<String,>,) -> Self
    {
        Self {
            owner: owner.into(), name: name.into(),
        }
    }
}

impl std::fmt::Display for RepositoryRef
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_,>,) -> std::fmt::Result
    {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// One page of the organization repository listing.
#[derive(Debug, Clone, Default, PartialEq, Eq,)]
pub struct RepositoryPage
{
    pub repositories: Vec<RepositoryRef,>,
    /// Next page to request; `None` or `Some(0)` ends the listing.
    pub next_page:    Option<u32,>,
}

/// Weekly samples credited to one contributor on one repository.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct ContributorWeeks
{
    pub identity:   String,
    /// Profile picture of the contributor, when the forge reports one.
    pub avatar_url: Option<String,>,
    pub weeks:      Vec<WeeklySample,>,
}

/// Outcome of a single request to the contributor statistics endpoint.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub enum StatsResponse
{
    /// Statistics are still being computed; ask again shortly.
    Pending,
    /// The caller is rate limited; ask again after a longer pause.
    Throttled,
    /// The repository has no statistics.
    Empty,
    /// Per-contributor weekly samples.
    Ready(Vec<ContributorWeeks,>,),
    /// Any other non-success status.
    Failed
    {
        status: u16,
        body:   String,
    },
}

/// Remote collaborator providing repository listings and contributor
/// statistics.
///
/// Transport failures are reported as `Err`; HTTP-level outcomes of the
/// statistics endpoint are reported through [`StatsResponse`].
#[async_trait]
pub trait StatsSource: Send + Sync
{
    /// Fetches one page of repositories owned by `organization`.
    async fn list_repositories(
        &self,
        organization: &str,
        page: u32,
        per_page: u8,
    ) -> Result<RepositoryPage, Error,>;

    /// Issues one request to the contributor statistics endpoint.
    async fn contributor_stats(&self, repository: &RepositoryRef,)
    -> Result<StatsResponse, Error,>;
}
