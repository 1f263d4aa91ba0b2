// Engine chain tests — MOCK -> FUNCTION -> OUTPUT.
//
// Script the fake API, drive the real orchestrator/mutator/driver, assert on
// the list state and the recorded calls. Nothing here reaches into engine
// internals.

use std::sync::Arc;
use std::time::Duration;

use joblens_common::{FilterCriteria, SyncError};
use joblens_sync::testing::{job, job_for, jobs, MockJobApi};
use joblens_sync::{
    spawn_filter_driver, ErrorSurface, FetchOrchestrator, FilterState, JobList, OptimisticMutator,
    Phase,
};

const PAGE_SIZE: u32 = 20;

struct Harness {
    api: Arc<MockJobApi>,
    list: Arc<JobList>,
    errors: Arc<ErrorSurface>,
    fetcher: Arc<FetchOrchestrator>,
    mutator: OptimisticMutator,
}

fn harness(api: MockJobApi) -> Harness {
    let api = Arc::new(api);
    let list = Arc::new(JobList::new());
    let errors = Arc::new(ErrorSurface::new());
    let fetcher = Arc::new(FetchOrchestrator::new(
        api.clone(),
        list.clone(),
        errors.clone(),
        PAGE_SIZE,
    ));
    let mutator = OptimisticMutator::new(api.clone(), list.clone(), errors.clone());
    Harness {
        api,
        list,
        errors,
        fetcher,
        mutator,
    }
}

fn ids(list: &JobList) -> Vec<String> {
    list.snapshot().into_iter().map(|j| j.id).collect()
}

/// Let spawned tasks run up to the next await point.
async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

async fn wait_for_queries(h: &Harness, count: usize) {
    for _ in 0..1000 {
        if h.api.list_queries().len() >= count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("timed out waiting for {count} list queries");
}

// ---------------------------------------------------------------------------
// Fetching and pagination
// ---------------------------------------------------------------------------

#[tokio::test]
async fn initial_fetch_fills_the_list() {
    let h = harness(MockJobApi::new().on_page(None, jobs(0..20)));

    h.fetcher.reset_and_fetch(&FilterCriteria::default()).await;

    assert_eq!(h.list.snapshot().len(), 20);
    assert_eq!(h.list.phase(), Phase::Loaded);
    assert!(h.list.has_more());
    assert_eq!(h.list.cursor().as_deref(), Some("job-19"));
    assert_eq!(h.errors.current(), None);
}

#[tokio::test]
async fn empty_first_page_is_a_loaded_end() {
    let h = harness(MockJobApi::new().on_page(None, Vec::new()));

    h.fetcher.reset_and_fetch(&FilterCriteria::default()).await;

    assert_eq!(h.list.snapshot().len(), 0);
    assert_eq!(h.list.phase(), Phase::Loaded);
    assert!(!h.list.has_more());
    assert_eq!(h.list.cursor(), None);
}

#[tokio::test]
async fn full_page_then_short_page_ends_pagination() {
    let h = harness(
        MockJobApi::new()
            .on_page(None, jobs(0..20))
            .on_page(Some("job-19"), jobs(20..25)),
    );

    h.fetcher.reset_and_fetch(&FilterCriteria::default()).await;
    h.fetcher.load_more().await;

    assert_eq!(h.list.snapshot().len(), 25);
    assert!(!h.list.has_more());
    assert_eq!(h.list.cursor().as_deref(), Some("job-24"));

    // Nothing left: a further load_more never reaches the API.
    h.fetcher.load_more().await;
    assert_eq!(h.api.list_queries().len(), 2);
}

#[tokio::test]
async fn load_more_appends_without_duplicates() {
    // The second page overlaps the first by one record.
    let h = harness(
        MockJobApi::new()
            .on_page(None, jobs(0..20))
            .on_page(Some("job-19"), jobs(19..25)),
    );

    h.fetcher.reset_and_fetch(&FilterCriteria::default()).await;
    h.fetcher.load_more().await;

    let listed = ids(&h.list);
    assert_eq!(listed.len(), 25);
    let unique: std::collections::HashSet<&String> = listed.iter().collect();
    assert_eq!(unique.len(), listed.len());
}

#[tokio::test]
async fn failed_load_more_keeps_known_good_items() {
    let h = harness(
        MockJobApi::new()
            .on_page(None, jobs(0..20))
            .fail_page(
                Some("job-19"),
                SyncError::Server {
                    status: 503,
                    message: "unavailable".to_string(),
                },
            ),
    );

    h.fetcher.reset_and_fetch(&FilterCriteria::default()).await;
    h.fetcher.load_more().await;

    assert_eq!(h.list.snapshot().len(), 20);
    assert_eq!(h.list.phase(), Phase::Failed);
    assert_eq!(
        h.errors.current(),
        Some(SyncError::Server {
            status: 503,
            message: "unavailable".to_string(),
        })
    );
}

#[tokio::test]
async fn retry_recovers_from_a_failed_fetch() {
    let h = harness(MockJobApi::new().fail_page(
        None,
        SyncError::Network("connection refused".to_string()),
    ));

    h.fetcher.reset_and_fetch(&FilterCriteria::default()).await;
    assert_eq!(h.list.phase(), Phase::Failed);
    assert!(h.errors.current().is_some());

    h.api.script_page(None, Ok(jobs(0..5)));
    h.fetcher.retry().await;

    assert_eq!(h.list.phase(), Phase::Loaded);
    assert_eq!(h.list.snapshot().len(), 5);
    // The retry's fetch start cleared the surfaced error.
    assert_eq!(h.errors.current(), None);
}

#[tokio::test]
async fn stale_response_is_discarded_on_arrival() {
    let api = MockJobApi::new()
        .on_titled_page("old", vec![job("stale-1")])
        .on_titled_page("new", vec![job("fresh-1")]);
    let h = harness(api);

    let gate = h.api.hold_next_list();
    let old_filters = FilterCriteria {
        title: "old".to_string(),
        ..FilterCriteria::default()
    };
    let first = {
        let fetcher = h.fetcher.clone();
        tokio::spawn(async move { fetcher.reset_and_fetch(&old_filters).await })
    };
    settle().await;

    // Filters moved on while the first fetch was in flight.
    let new_filters = FilterCriteria {
        title: "new".to_string(),
        ..FilterCriteria::default()
    };
    h.fetcher.reset_and_fetch(&new_filters).await;
    assert_eq!(ids(&h.list), vec!["fresh-1"]);

    // The superseded response arrives afterwards and changes nothing.
    gate.notify_one();
    first.await.unwrap();
    assert_eq!(ids(&h.list), vec!["fresh-1"]);
    assert_eq!(h.api.list_queries().len(), 2);
}

#[tokio::test]
async fn load_more_is_ignored_while_a_fetch_is_in_flight() {
    let h = harness(
        MockJobApi::new()
            .on_page(None, jobs(0..20))
            .on_page(Some("job-19"), jobs(20..25)),
    );
    h.fetcher.reset_and_fetch(&FilterCriteria::default()).await;

    let gate = h.api.hold_next_list();
    let first = {
        let fetcher = h.fetcher.clone();
        tokio::spawn(async move { fetcher.load_more().await })
    };
    settle().await;

    // Second call while the first is held: dropped, not queued.
    h.fetcher.load_more().await;

    gate.notify_one();
    first.await.unwrap();

    assert_eq!(h.list.snapshot().len(), 25);
    assert_eq!(h.api.list_queries().len(), 2);
}

#[tokio::test]
async fn hidden_job_is_not_resurrected_by_a_late_page() {
    let h = harness(
        MockJobApi::new()
            .on_page(None, jobs(0..20))
            .on_page(Some("job-19"), jobs(19..25)),
    );
    h.fetcher.reset_and_fetch(&FilterCriteria::default()).await;

    h.mutator.hide_job("job-19").await;
    assert_eq!(h.list.snapshot().len(), 19);

    // The next page still contains job-19; the merge must drop it.
    h.fetcher.load_more().await;

    let listed = ids(&h.list);
    assert_eq!(listed.len(), 24);
    assert!(!listed.contains(&"job-19".to_string()));
}

// ---------------------------------------------------------------------------
// Optimistic mutations
// ---------------------------------------------------------------------------

#[tokio::test]
async fn pin_write_failure_rolls_back_the_flag() {
    let h = harness(
        MockJobApi::new()
            .on_page(None, vec![job("job-42")])
            .fail_mutations(SyncError::Server {
                status: 500,
                message: "boom".to_string(),
            }),
    );
    h.fetcher.reset_and_fetch(&FilterCriteria::default()).await;

    h.mutator.toggle_pin("job-42").await;

    let listed = h.list.snapshot();
    assert!(!listed[0].is_pinned);
    assert_eq!(
        h.errors.current(),
        Some(SyncError::Server {
            status: 500,
            message: "boom".to_string(),
        })
    );
    assert_eq!(h.api.recorded_mutations(), vec!["pin job-42 true"]);
}

#[tokio::test]
async fn pin_toggles_both_ways_on_success() {
    let h = harness(MockJobApi::new().on_page(None, vec![job("job-42")]));
    h.fetcher.reset_and_fetch(&FilterCriteria::default()).await;

    h.mutator.toggle_pin("job-42").await;
    assert!(h.list.snapshot()[0].is_pinned);

    h.mutator.toggle_pin("job-42").await;
    assert!(!h.list.snapshot()[0].is_pinned);

    assert_eq!(
        h.api.recorded_mutations(),
        vec!["pin job-42 true", "pin job-42 false"]
    );
    assert_eq!(h.errors.current(), None);
}

#[tokio::test]
async fn hide_failure_restores_the_item_exactly() {
    let h = harness(
        MockJobApi::new()
            .on_page(None, vec![job("job-1"), job("job-2"), job("job-3")])
            .fail_mutations(SyncError::Network("timeout".to_string())),
    );
    h.fetcher.reset_and_fetch(&FilterCriteria::default()).await;
    let before = h.list.snapshot();

    h.mutator.hide_job("job-2").await;

    // Same items, same order, same field values.
    assert_eq!(h.list.snapshot(), before);
    assert_eq!(
        h.errors.current(),
        Some(SyncError::Network("timeout".to_string()))
    );
}

#[tokio::test]
async fn hide_removes_the_item_on_success() {
    let h = harness(MockJobApi::new().on_page(None, vec![job("job-1"), job("job-2")]));
    h.fetcher.reset_and_fetch(&FilterCriteria::default()).await;

    h.mutator.hide_job("job-2").await;

    assert_eq!(ids(&h.list), vec!["job-1"]);
    assert_eq!(h.api.recorded_mutations(), vec!["hide job-2"]);
    assert_eq!(h.errors.current(), None);
}

#[tokio::test]
async fn hide_company_removes_every_match() {
    let h = harness(MockJobApi::new().on_page(
        None,
        vec![
            job_for("job-1", "Acme"),
            job_for("job-2", "Globex"),
            job_for("job-3", "Acme"),
            job_for("job-4", "Globex"),
        ],
    ));
    h.fetcher.reset_and_fetch(&FilterCriteria::default()).await;

    h.mutator.hide_company("Globex").await;

    assert_eq!(ids(&h.list), vec!["job-1", "job-3"]);
    assert_eq!(h.api.recorded_mutations(), vec!["hide_company Globex"]);
}

#[tokio::test]
async fn hide_company_failure_restores_all_matches_in_order() {
    let h = harness(
        MockJobApi::new()
            .on_page(
                None,
                vec![
                    job_for("job-1", "Acme"),
                    job_for("job-2", "Globex"),
                    job_for("job-3", "Acme"),
                    job_for("job-4", "Globex"),
                ],
            )
            .fail_mutations(SyncError::Server {
                status: 500,
                message: "boom".to_string(),
            }),
    );
    h.fetcher.reset_and_fetch(&FilterCriteria::default()).await;
    let before = h.list.snapshot();

    h.mutator.hide_company("Globex").await;

    assert_eq!(h.list.snapshot(), before);
    assert!(h.errors.current().is_some());
}

// ---------------------------------------------------------------------------
// Similarity flow
// ---------------------------------------------------------------------------

#[tokio::test]
async fn find_similar_triggers_then_requeries() {
    let h = harness(MockJobApi::new().on_page(None, jobs(0..3)));
    h.fetcher.reset_and_fetch(&FilterCriteria::default()).await;

    h.api.script_page(None, Ok(vec![job("similar-1")]));
    h.fetcher.find_similar("job-1").await;

    assert_eq!(h.list.similar_to().as_deref(), Some("job-1 title"));
    assert_eq!(ids(&h.list), vec!["similar-1"]);
    assert_eq!(h.list.phase(), Phase::Loaded);
    assert_eq!(h.api.recorded_mutations(), vec!["find_similar job-1"]);
}

#[tokio::test]
async fn failed_similar_trigger_leaves_the_list_alone() {
    let h = harness(
        MockJobApi::new()
            .on_page(None, jobs(0..3))
            .fail_similar(SyncError::Server {
                status: 500,
                message: "no embedding".to_string(),
            }),
    );
    h.fetcher.reset_and_fetch(&FilterCriteria::default()).await;

    h.fetcher.find_similar("job-1").await;

    assert_eq!(h.list.phase(), Phase::Loaded);
    assert_eq!(h.list.similar_to(), None);
    assert_eq!(h.list.snapshot().len(), 3);
    assert!(h.errors.current().is_some());
    // Trigger failed: no re-query happened.
    assert_eq!(h.api.list_queries().len(), 1);
}

#[tokio::test]
async fn clear_similar_returns_to_the_plain_list() {
    let h = harness(MockJobApi::new().on_page(None, jobs(0..3)));
    h.fetcher.reset_and_fetch(&FilterCriteria::default()).await;

    h.api.script_page(None, Ok(vec![job("similar-1")]));
    h.fetcher.find_similar("job-1").await;
    assert_eq!(ids(&h.list), vec!["similar-1"]);

    h.api.script_page(None, Ok(jobs(0..3)));
    h.fetcher.clear_similar().await;

    assert_eq!(h.list.similar_to(), None);
    assert_eq!(h.list.snapshot().len(), 3);

    // Clearing when no marker is set does not refetch.
    let queries = h.api.list_queries().len();
    h.fetcher.clear_similar().await;
    assert_eq!(h.api.list_queries().len(), queries);
}

// ---------------------------------------------------------------------------
// Debounced filter driving
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn one_fetch_per_edit_burst() {
    let api = MockJobApi::new()
        .on_page(None, jobs(0..3))
        .on_titled_page("Eng", vec![job("eng-1")]);
    let h = harness(api);
    let filters = FilterState::new(Duration::from_millis(500));
    let driver = spawn_filter_driver(filters.subscribe(), h.fetcher.clone());

    // The driver fetches once for the initial (empty) snapshot.
    wait_for_queries(&h, 1).await;

    for input in ["E", "En", "Eng"] {
        filters.set_title(input);
        tokio::time::advance(Duration::from_millis(100)).await;
    }

    // Only the settled value fetches.
    wait_for_queries(&h, 2).await;
    let queries = h.api.list_queries();
    assert_eq!(queries.len(), 2);
    assert_eq!(queries[1].title.as_deref(), Some("Eng"));
    assert_eq!(ids(&h.list), vec!["eng-1"]);

    // A wakeup with an unchanged snapshot does not refetch.
    filters.set_title("Eng");
    tokio::time::advance(Duration::from_millis(600)).await;
    settle().await;
    assert_eq!(h.api.list_queries().len(), 2);

    // Dropping the filter state winds the driver down.
    drop(filters);
    driver.await.unwrap();
}
