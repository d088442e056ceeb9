// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// GitHub-backed [`StatsSource`] built on Octocrab.
///
/// Lists organization repositories through the typed repository API and reads
/// `/repos/{owner}/{repo}/stats/contributors` as a raw response so that the
/// 202/204/403/429 protocol statuses stay visible to the fetcher.
use async_trait::async_trait;
use chrono::DateTime;
use octocrab::Octocrab;
use serde::Deserialize;
use tracing::debug;

use crate::{
    contribution::WeeklySample,
    error::Error,
    source::{ContributorWeeks, RepositoryPage, RepositoryRef, StatsResponse, StatsSource},
};

const STATUS_OK: u16 = 200;
const STATUS_ACCEPTED: u16 = 202;
const STATUS_NO_CONTENT: u16 = 204;
const STATUS_FORBIDDEN: u16 = 403;
const STATUS_TOO_MANY_REQUESTS: u16 = 429;

const RATE_LIMIT_REMAINING_HEADER: &str = "x-ratelimit-remaining";

/// GitHub API contributor statistics response structure.
#[derive(Debug, Clone, Deserialize,)]
struct ContributorStats
{
    #[serde(default)]
    author: Option<Author,>,
    #[serde(default)]
    weeks:  Vec<WeeklyStats,>,
}

/// Weekly contribution statistics as encoded by the API.
#[derive(Debug, Clone, Deserialize,)]
struct WeeklyStats
{
    w: i64,
    a: i64,
    d: i64,
    c: i64,
}

#[derive(Debug, Clone, Deserialize,)]
struct Author
{
    login:      String,
    #[serde(default)]
    avatar_url: Option<String,>,
}

/// Statistics source talking to the GitHub REST API.
#[derive(Debug, Clone,)]
pub struct GitHubSource
{
    octocrab: Octocrab,
}

impl GitHubSource
{
    /// Builds an authenticated client from a personal access token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for a blank token and [`Error::Service`]
    /// when the client cannot be constructed.
    pub fn from_token(token: &str,) -> Result<Self, Error,>
    {
        let token = token.trim();
        if token.is_empty() {
            return Err(Error::validation("GitHub token cannot be empty",),);
        }

        let octocrab = Octocrab::builder()
            .personal_token(token.to_owned(),)
            .build()
            .map_err(|e| Error::service(format!("failed to initialize GitHub client: {e}"),),)?;

        Ok(Self::new(octocrab,),)
    }

    pub fn new(octocrab: Octocrab,) -> Self
    {
        Self {
            octocrab,
        }
    }
}

#[async_trait]
impl StatsSource for GitHubSource
{
    async fn list_repositories(
        &self,
        organization: &str,
        page: u32,
        per_page: u8,
    ) -> Result<RepositoryPage, Error,>
    {
        let listing = self
            .octocrab
            .orgs(organization,)
            .list_repos()
            .per_page(per_page,)
            .page(page,)
            .send()
            .await
            .map_err(|e| Error::Listing {
                organization: organization.to_owned(),
                page,
                message: e.to_string(),
            },)?;

        let repositories = listing
            .items
            .into_iter()
            .map(|repo| {
                let owner = repo
                    .owner
                    .map(|owner| owner.login,)
                    .unwrap_or_else(|| organization.to_owned(),);
                RepositoryRef::new(owner, repo.name,)
            },)
            .collect();

        Ok(RepositoryPage {
            repositories,
            next_page: listing.next.is_some().then_some(page + 1,),
        },)
    }

    async fn contributor_stats(
        &self,
        repository: &RepositoryRef,
    ) -> Result<StatsResponse, Error,>
    {
        let route = format!("/repos/{}/{}/stats/contributors", repository.owner, repository.name);
        debug!("GET {}", route);

        let response = self
            .octocrab
            ._get(route,)
            .await
            .map_err(|e| Error::service(format!("failed to request stats for {repository}: {e}"),),)?;

        let status = response.status().as_u16();
        let rate_limit_remaining = response
            .headers()
            .get(RATE_LIMIT_REMAINING_HEADER,)
            .and_then(|value| value.to_str().ok(),)
            .map(str::to_owned,);
        let body = self
            .octocrab
            .body_to_string(response,)
            .await
            .map_err(|e| Error::service(format!("failed to read stats body for {repository}: {e}"),),)?;

        classify_response(repository, status, rate_limit_remaining.as_deref(), &body,)
    }
}

/// Maps a raw statistics response onto the polling protocol.
///
/// A 429 is always treated as throttling. A 403 is only treated as throttling
/// when `rate_limit_remaining` is `"0"` or the body mentions a rate limit;
/// any other 403, such as a missing permission, is a [`StatsResponse::Failed`].
///
/// # Errors
///
/// Returns [`Error::Serialize`] when a 200 body is not valid JSON and
/// [`Error::Validation`] when an entry lacks a usable author login or week
/// timestamp.
pub fn classify_response(
    repository: &RepositoryRef,
    status: u16,
    rate_limit_remaining: Option<&str,>,
    body: &str,
) -> Result<StatsResponse, Error,>
{
    match status {
        STATUS_OK => parse_contributor_stats(repository, body,).map(StatsResponse::Ready,),
        STATUS_ACCEPTED => Ok(StatsResponse::Pending,),
        STATUS_NO_CONTENT => Ok(StatsResponse::Empty,),
        STATUS_TOO_MANY_REQUESTS => Ok(StatsResponse::Throttled,),
        STATUS_FORBIDDEN if is_rate_limited(rate_limit_remaining, body,) => {
            Ok(StatsResponse::Throttled,)
        }
        _ => Ok(StatsResponse::Failed {
            status,
            body: body.to_owned(),
        },),
    }
}

fn is_rate_limited(rate_limit_remaining: Option<&str,>, body: &str,) -> bool
{
    rate_limit_remaining.is_some_and(|remaining| remaining.trim() == "0",)
        || body.to_ascii_lowercase().contains("rate limit",)
}

fn parse_contributor_stats(
    repository: &RepositoryRef,
    body: &str,
) -> Result<Vec<ContributorWeeks,>, Error,>
{
    if body.trim().is_empty() {
        return Ok(Vec::new(),);
    }

    let stats: Vec<ContributorStats,> = serde_json::from_str(body,)?;
    let mut contributors = Vec::with_capacity(stats.len(),);

    for entry in stats {
        let author = entry
            .author
            .filter(|author| !author.login.trim().is_empty(),)
            .ok_or_else(|| {
                Error::validation(format!("contributor without login in stats for {repository}"),)
            },)?;

        let weeks = entry
            .weeks
            .iter()
            .map(|week| {
                DateTime::from_timestamp(week.w, 0,)
                    .map(|start| WeeklySample::new(start, week.a, week.d, week.c,),)
                    .ok_or_else(|| {
                        Error::validation(format!(
                            "week timestamp {} out of range in stats for {repository}",
                            week.w
                        ),)
                    },)
            },)
            .collect::<Result<Vec<_,>, _,>>()?;

        contributors.push(ContributorWeeks {
            identity:   author.login,
            avatar_url: author.avatar_url,
            weeks,
        },);
    }

    Ok(contributors,)
}

#[cfg(test)]
mod tests
{
    use super::*;

    fn repository() -> RepositoryRef
    {
        RepositoryRef::new("acme", "widgets",)
    }

    const STATS_BODY: &str = r#"[
        {
            "total": 3,
            "author": {
                "login": "alice",
                "id": 1,
                "avatar_url": "https://avatars.githubusercontent.com/u/1?v=4",
                "type": "User"
            },
            "weeks": [
                { "w": 1717286400, "a": 10, "d": 2, "c": 1 },
                { "w": 1717891200, "a": 5, "d": 0, "c": 2 }
            ]
        }
    ]"#;

    #[test]
    fn protocol_statuses_map_to_transient_states()
    {
        assert_eq!(classify_response(&repository(), 202, None, "",).unwrap(), StatsResponse::Pending);
        assert_eq!(classify_response(&repository(), 429, None, "",).unwrap(), StatsResponse::Throttled);
        assert_eq!(classify_response(&repository(), 204, None, "",).unwrap(), StatsResponse::Empty);
    }

    #[test]
    fn forbidden_with_exhausted_quota_is_throttled()
    {
        let response = classify_response(&repository(), 403, Some("0",), "",).unwrap();
        assert_eq!(response, StatsResponse::Throttled);
    }

    #[test]
    fn forbidden_with_rate_limit_body_is_throttled()
    {
        let body = r#"{"message":"You have exceeded a secondary rate limit."}"#;
        let response = classify_response(&repository(), 403, Some("4321",), body,).unwrap();
        assert_eq!(response, StatsResponse::Throttled);
    }

    #[test]
    fn forbidden_without_rate_limit_is_a_failure()
    {
        let body = r#"{"message":"Resource not accessible by personal access token"}"#;
        let response = classify_response(&repository(), 403, Some("4999",), body,).unwrap();
        assert_eq!(response, StatsResponse::Failed {
            status: 403,
            body:   body.to_owned(),
        });

        let response = classify_response(&repository(), 403, None, "",).unwrap();
        assert!(matches!(response, StatsResponse::Failed { status: 403, .. }));
    }

    #[test]
    fn other_statuses_keep_the_raw_body()
    {
        let response = classify_response(&repository(), 502, None, "bad gateway",).unwrap();
        assert_eq!(response, StatsResponse::Failed {
            status: 502,
            body:   "bad gateway".to_owned(),
        });
    }

    #[test]
    fn success_body_is_decoded_into_weekly_samples()
    {
        let response = classify_response(&repository(), 200, None, STATS_BODY,).unwrap();
        let StatsResponse::Ready(contributors,) = response else {
            panic!("expected ready response");
        };

        assert_eq!(contributors.len(), 1);
        assert_eq!(contributors[0].identity, "alice");
        assert_eq!(
            contributors[0].avatar_url.as_deref(),
            Some("https://avatars.githubusercontent.com/u/1?v=4")
        );
        assert_eq!(contributors[0].weeks.len(), 2);
        assert_eq!(contributors[0].weeks[0].week_start.timestamp(), 1_717_286_400);
        assert_eq!(contributors[0].weeks[1].commits, 2);
    }

    #[test]
    fn empty_success_body_yields_no_contributors()
    {
        let response = classify_response(&repository(), 200, None, "",).unwrap();
        assert_eq!(response, StatsResponse::Ready(Vec::new()));
    }

    #[test]
    fn missing_author_is_a_validation_error()
    {
        let body = r#"[{ "author": null, "weeks": [] }]"#;
        let error = classify_response(&repository(), 200, None, body,).unwrap_err();
        match error {
            Error::Validation {
                message,
            } => assert!(message.contains("acme/widgets")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn malformed_body_is_a_serialization_error()
    {
        let error = classify_response(&repository(), 200, None, "not-json",).unwrap_err();
        assert!(matches!(error, Error::Serialize { .. }));
    }

    #[test]
    fn blank_token_is_rejected()
    {
        let error = GitHubSource::from_token("   ",).unwrap_err();
        assert!(matches!(error, Error::Validation { .. }));
    }
}
