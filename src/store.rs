// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Shared aggregate of contributor records for a single collection run.
//!
//! Every mutation, both record merges and progress counters, goes through one
//! mutex. The store is created at the start of a run with a fixed reference
//! instant, so window membership does not depend on when a merge happens.

use std::{
    collections::{BTreeMap, HashMap},
    sync::{Mutex, MutexGuard, PoisonError},
};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    contribution::{ContributorRecord, WeeklySample},
    source::ContributorWeeks,
};

/// Completion counters reported after a repository has been merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq,)]
pub struct Progress
{
    pub completed: u64,
    pub total:     u64,
}

impl Progress
{
    /// Share of completed repositories, in percent.
    pub fn percentage(&self,) -> f64
    {
        if self.total == 0 {
            return 100.0;
        }
        self.completed as f64 / self.total as f64 * 100.0
    }
}

/// Immutable, fully merged view handed to the report renderer.
#[derive(Debug, Clone, PartialEq, Serialize,)]
pub struct StatsSnapshot
{
    /// Reference instant used to classify windows.
    pub as_of:                  DateTime<Utc,>,
    pub total_repositories:     u64,
    pub repositories_completed: u64,
    /// Records keyed by contributor identity, in identity order.
    pub contributors:           BTreeMap<String, ContributorRecord,>,
}

#[derive(Debug, Default,)]
struct StoreState
{
    records:                HashMap<String, ContributorRecord,>,
    total_repositories:     u64,
    repositories_completed: u64,
}

/// Concurrency-safe mapping from contributor identity to
/// [`ContributorRecord`].
#[derive(Debug,)]
pub struct StatsStore
{
    as_of: DateTime<Utc,>,
    state: Mutex<StoreState,>,
}

impl StatsStore
{
    /// Creates an empty store whose windows are measured against `as_of`.
    pub fn new(as_of: DateTime<Utc,>,) -> Self
    {
        Self {
            as_of,
            state: Mutex::new(StoreState::default(),),
        }
    }

    pub fn as_of(&self,) -> DateTime<Utc,>
    {
        self.as_of
    }

    /// Merges weekly samples for `identity`, creating the record on first
    /// sight.
    ///
    /// Merging is additive: the same samples merged twice are counted twice.
    pub fn merge(&self, identity: &str, samples: &[WeeklySample],)
    {
        self.merge_with_avatar(identity, None, samples,);
    }

    /// Merges one repository's worth of samples for a contributor, keeping
    /// the first avatar reported for it.
    pub fn merge_contributor(&self, contributor: &ContributorWeeks,)
    {
        self.merge_with_avatar(
            &contributor.identity,
            contributor.avatar_url.as_deref(),
            &contributor.weeks,
        );
    }

    fn merge_with_avatar(&self, identity: &str, avatar_url: Option<&str,>, samples: &[WeeklySample],)
    {
        let mut state = self.lock();
        let record = state
            .records
            .entry(identity.to_owned(),)
            .or_insert_with(|| ContributorRecord::new(identity,),);

        record.adopt_avatar(avatar_url,);
        for sample in samples {
            record.absorb(sample, self.as_of,);
        }
    }

    pub fn set_total_repositories(&self, total: u64,)
    {
        self.lock().total_repositories = total;
    }

    /// Marks one more repository as merged and returns the new counters.
    pub fn record_completion(&self,) -> Progress
    {
        let mut state = self.lock();
        state.repositories_completed += 1;
        Progress {
            completed: state.repositories_completed,
            total:     state.total_repositories,
        }
    }

    /// Number of distinct contributors merged so far.
    pub fn len(&self,) -> usize
    {
        self.lock().records.len()
    }

    pub fn is_empty(&self,) -> bool
    {
        self.len() == 0
    }

    /// Copies the current state into an immutable snapshot.
    pub fn snapshot(&self,) -> StatsSnapshot
    {
        let state = self.lock();
        StatsSnapshot {
            as_of:                  self.as_of,
            total_repositories:     state.total_repositories,
            repositories_completed: state.repositories_completed,
            contributors:           state
                .records
                .iter()
                .map(|(identity, record,)| (identity.clone(), record.clone(),),)
                .collect(),
        }
    }

    // Poisoning is recovered; merge and counter updates contain no panicking
    // paths.
    fn lock(&self,) -> MutexGuard<'_, StoreState,>
    {
        self.state.lock().unwrap_or_else(PoisonError::into_inner,)
    }
}

#[cfg(test)]
mod tests
{
    use std::{sync::Arc, thread};

    use chrono::{TimeDelta, TimeZone};
    use proptest::prelude::*;

    use super::*;
    use crate::contribution::ContributionWindow;

    fn as_of() -> DateTime<Utc,>
    {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0,).single().expect("valid timestamp",)
    }

    fn sample(days_ago: i64, additions: i64, deletions: i64, commits: i64,) -> WeeklySample
    {
        WeeklySample::new(as_of() - TimeDelta::days(days_ago,), additions, deletions, commits,)
    }

    #[test]
    fn merge_creates_record_for_unknown_identity()
    {
        let store = StatsStore::new(as_of(),);
        assert!(store.is_empty());

        store.merge("alice", &[],);

        let snapshot = store.snapshot();
        let record = snapshot.contributors.get("alice",).expect("record created",);
        assert_eq!(record.totals, ContributionWindow::default());
        assert!(record.earliest_commit_week.is_none());
    }

    #[test]
    fn merging_the_same_samples_twice_accumulates_twice()
    {
        let store = StatsStore::new(as_of(),);
        let samples = [sample(3, 10, 4, 2,), sample(100, 1, 1, 1,),];

        store.merge("alice", &samples,);
        store.merge("alice", &samples,);

        let snapshot = store.snapshot();
        let record = &snapshot.contributors["alice"];
        assert_eq!(record.totals, ContributionWindow::new(22, 10, 6));
        assert_eq!(record.window_7d, ContributionWindow::new(20, 8, 4));
    }

    #[test]
    fn merge_contributor_keeps_avatar_from_any_repository()
    {
        let store = StatsStore::new(as_of(),);
        store.merge_contributor(&ContributorWeeks {
            identity:   "alice".to_owned(),
            avatar_url: None,
            weeks:      vec![sample(3, 1, 0, 1,)],
        },);
        store.merge_contributor(&ContributorWeeks {
            identity:   "alice".to_owned(),
            avatar_url: Some("https://avatars.example/alice.png".to_owned(),),
            weeks:      vec![sample(9, 1, 0, 1,)],
        },);

        let snapshot = store.snapshot();
        let record = &snapshot.contributors["alice"];
        assert_eq!(record.avatar_url.as_deref(), Some("https://avatars.example/alice.png"));
        assert_eq!(record.totals.commits, 2);
    }

    #[test]
    fn completion_counter_reports_progress()
    {
        let store = StatsStore::new(as_of(),);
        store.set_total_repositories(4,);

        store.record_completion();
        let progress = store.record_completion();

        assert_eq!(progress, Progress {
            completed: 2, total: 4
        });
        assert!((progress.percentage() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn concurrent_merges_lose_no_updates()
    {
        let store = Arc::new(StatsStore::new(as_of(),),);
        let handles: Vec<_,> = (0..16)
            .map(|worker| {
                let store = Arc::clone(&store,);
                thread::spawn(move || {
                    for _ in 0..50 {
                        store.merge("shared", &[sample(worker, 1, 1, 1,)],);
                        store.merge(&format!("solo-{worker}"), &[sample(1, 2, 0, 1,)],);
                    }
                    store.record_completion();
                },)
            },)
            .collect();

        for handle in handles {
            handle.join().expect("worker panicked",);
        }

        let snapshot = store.snapshot();
        assert_eq!(snapshot.contributors.len(), 17);
        assert_eq!(snapshot.contributors["shared"].totals, ContributionWindow::new(800, 800, 800));
        assert_eq!(snapshot.contributors["solo-3"].totals.commits, 50);
        assert_eq!(snapshot.repositories_completed, 16);
    }

    fn sample_strategy() -> impl Strategy<Value = WeeklySample,>
    {
        (0i64..800, 0i64..1_000, 0i64..1_000, 0i64..50,).prop_map(
            |(days_ago, additions, deletions, commits,)| {
                sample(days_ago, additions, deletions, commits,)
            },
        )
    }

    proptest! {
        #[test]
        fn merge_order_and_batching_do_not_matter(
            samples in prop::collection::vec(sample_strategy(), 0..40),
            split in 0usize..40,
        ) {
            let forward = StatsStore::new(as_of());
            forward.merge("alice", &samples);

            let mut reversed: Vec<WeeklySample> = samples.clone();
            reversed.reverse();
            let split = split.min(reversed.len());
            let batched = StatsStore::new(as_of());
            batched.merge("alice", &reversed[split..]);
            batched.merge("alice", &reversed[..split]);

            prop_assert_eq!(
                &forward.snapshot().contributors["alice"],
                &batched.snapshot().contributors["alice"]
            );
        }

        #[test]
        fn windows_never_exceed_their_enclosing_window(
            samples in prop::collection::vec(sample_strategy(), 0..40),
        ) {
            let store = StatsStore::new(as_of());
            store.merge("bob", &samples);

            let snapshot = store.snapshot();
            let record = &snapshot.contributors["bob"];
            prop_assert!(record.totals.commits >= record.window_365d.commits);
            prop_assert!(record.window_365d.commits >= record.window_30d.commits);
            prop_assert!(record.window_30d.commits >= record.window_7d.commits);
            if let (Some(earliest), Some(latest)) =
                (record.earliest_commit_week, record.latest_commit_week)
            {
                prop_assert!(earliest <= latest);
            }
        }
    }
}
