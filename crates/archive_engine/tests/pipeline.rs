mod common;

use std::sync::{Arc, Mutex};

use archive_core::{Deduplicator, RecordLimit};
use archive_engine::{
    page_url, run_pass, ForumPostExtractor, JobError, JobEvent, JournalExtractor, NoProgress,
    JobProgress, Paginator, PassEnd, ProgressSink, Record, RecordSink, RunContext, StopHandle, Tally,
};
use common::{document, feed_url, journal, post, thread_page, FakeSite};
use engine_logging::JobLogger;
use pretty_assertions::assert_eq;

/// Keeps everything it is given and remembers page boundaries.
#[derive(Default)]
struct CollectingSink {
    records: Vec<String>,
    pages_ended: usize,
}

#[async_trait::async_trait]
impl RecordSink for CollectingSink {
    async fn accept(&mut self, record: Record, _tally: &mut Tally) -> Result<(), JobError> {
        self.records.push(record.content);
        Ok(())
    }

    async fn end_page(&mut self, _tally: &mut Tally) -> Result<(), JobError> {
        self.pages_ended += 1;
        Ok(())
    }
}

/// Requests a stop once `after` pages have been reported.
struct StopAfter {
    after: usize,
    stop: StopHandle,
    seen: Mutex<Vec<usize>>,
}

impl ProgressSink for StopAfter {
    fn emit(&self, event: JobEvent) {
        let JobEvent::Progress(progress) = event;
        self.seen.lock().unwrap().push(progress.page);
        if progress.page >= self.after {
            self.stop.request_stop();
        }
    }
}

/// Records every progress event it sees.
#[derive(Default)]
struct ProgressLog(Mutex<Vec<JobProgress>>);

impl ProgressSink for ProgressLog {
    fn emit(&self, event: JobEvent) {
        let JobEvent::Progress(progress) = event;
        self.0.lock().unwrap().push(progress);
    }
}

impl ProgressLog {
    fn messages(&self) -> Vec<String> {
        self.0.lock().unwrap().iter().map(|p| p.message.clone()).collect()
    }
}

fn context(site: FakeSite, limit: RecordLimit) -> RunContext {
    RunContext::new(
        Arc::new(site),
        JobLogger::global(),
        StopHandle::new(),
        Arc::new(NoProgress),
        limit,
    )
}

fn single_entry_feed(user: &str, pages: usize) -> FakeSite {
    let mut site = FakeSite::new();
    for n in 1..=pages {
        site = site.page(
            feed_url(user, n),
            document(&[journal(&format!("Entry {n}"), &format!("<p>body {n}</p>"))]),
        );
    }
    site.page(feed_url(user, pages + 1), document(&[]))
}

#[test]
fn page_urls_append_the_page_parameter() {
    assert_eq!(page_url("https://s.test/user/a", 3), "https://s.test/user/a?page=3");
    assert_eq!(
        page_url("https://s.test/search?q=x", 2),
        "https://s.test/search?q=x&page=2"
    );
}

#[test]
fn bounded_paginator_is_capped_by_the_maximum() {
    let mut pages = Paginator::bounded("https://s.test/t", 10, Some(3));
    assert_eq!(pages.total(), Some(3));
    let numbers: Vec<_> = std::iter::from_fn(|| pages.next_page().map(|(n, _)| n)).collect();
    assert_eq!(numbers, vec![1, 2, 3]);

    let mut pages = Paginator::bounded("https://s.test/t", 2, None);
    assert_eq!(pages.next_page(), Some((1, "https://s.test/t?page=1".to_string())));
    assert_eq!(pages.next_page(), Some((2, "https://s.test/t?page=2".to_string())));
    assert_eq!(pages.next_page(), None);
}

#[tokio::test]
async fn unbounded_pass_ends_at_the_first_empty_page() {
    let mut ctx = context(single_entry_feed("ann", 3), RecordLimit::unlimited());
    let mut sink = CollectingSink::default();

    let end = run_pass(
        &mut ctx,
        Paginator::unbounded(format!("{}/user/ann", common::SITE)),
        &JournalExtractor,
        &mut sink,
    )
    .await
    .unwrap();

    assert_eq!(end, PassEnd::Exhausted);
    assert_eq!(ctx.pages, 3);
    assert_eq!(sink.records.len(), 3);
    assert_eq!(sink.pages_ended, 3, "the empty page is not a processed page");
    assert_eq!(ctx.limit.count(), 3);
}

#[tokio::test]
async fn duplicate_pages_keep_a_single_record() {
    let page = document(&[journal("Same", "<p>repeated</p>")]);
    let site = FakeSite::new()
        .page(feed_url("bob", 1), page.clone())
        .page(feed_url("bob", 2), page)
        .page(feed_url("bob", 3), document(&[]));
    let mut ctx = context(site, RecordLimit::unlimited());
    ctx.dedup = Some(Deduplicator::new());
    let mut sink = CollectingSink::default();

    let end = run_pass(
        &mut ctx,
        Paginator::unbounded(format!("{}/user/bob", common::SITE)),
        &JournalExtractor,
        &mut sink,
    )
    .await
    .unwrap();

    assert_eq!(end, PassEnd::Exhausted);
    assert_eq!(sink.records.len(), 1);
    assert_eq!(ctx.dedup.as_ref().unwrap().dropped(), 1);
    assert_eq!(ctx.pages, 2);
}

#[tokio::test]
async fn limit_ends_the_pass_mid_page() {
    let site = FakeSite::new().page(
        feed_url("cat", 1),
        document(&[
            journal("a", "<p>1</p>"),
            journal("b", "<p>2</p>"),
            journal("c", "<p>3</p>"),
        ]),
    );
    let mut ctx = context(site, RecordLimit::new(Some(2)));
    let mut sink = CollectingSink::default();

    let end = run_pass(
        &mut ctx,
        Paginator::unbounded(format!("{}/user/cat", common::SITE)),
        &JournalExtractor,
        &mut sink,
    )
    .await
    .unwrap();

    assert_eq!(end, PassEnd::LimitReached);
    assert_eq!(sink.records.len(), 2);
    assert_eq!(sink.pages_ended, 1, "the partial page is still closed");
    assert_eq!(ctx.pages, 1);

    // A reached limit short-circuits any later pass.
    let again = run_pass(
        &mut ctx,
        Paginator::unbounded(format!("{}/user/cat", common::SITE)),
        &JournalExtractor,
        &mut sink,
    )
    .await
    .unwrap();
    assert_eq!(again, PassEnd::LimitReached);
    assert_eq!(ctx.pages, 1);
}

#[tokio::test]
async fn stop_is_honoured_at_the_next_page_boundary() {
    let site = Arc::new(single_entry_feed("dan", 10));
    let stop = StopHandle::new();
    let observer = Arc::new(StopAfter {
        after: 2,
        stop: stop.clone(),
        seen: Mutex::new(Vec::new()),
    });
    let mut ctx = RunContext::new(
        site.clone(),
        JobLogger::global(),
        stop,
        observer.clone(),
        RecordLimit::unlimited(),
    );
    let mut sink = CollectingSink::default();

    let end = run_pass(
        &mut ctx,
        Paginator::unbounded(format!("{}/user/dan", common::SITE)),
        &JournalExtractor,
        &mut sink,
    )
    .await
    .unwrap();

    assert_eq!(end, PassEnd::Stopped);
    assert_eq!(ctx.pages, 2);
    assert_eq!(*observer.seen.lock().unwrap(), vec![1, 2]);
    assert!(!site.requested(&feed_url("dan", 3)));
}

#[tokio::test]
async fn bounded_pass_walks_empty_pages_too() {
    let site = FakeSite::new()
        .page(thread_page(1), document(&[post("a", "#1", "t", "<p>x</p>")]))
        .page(thread_page(2), document(&[]))
        .page(thread_page(3), document(&[post("b", "#3", "t", "<p>y</p>")]));
    let mut ctx = context(site, RecordLimit::unlimited());
    let mut sink = CollectingSink::default();

    let end = run_pass(
        &mut ctx,
        Paginator::bounded(common::THREAD, 3, None),
        &ForumPostExtractor,
        &mut sink,
    )
    .await
    .unwrap();

    assert_eq!(end, PassEnd::Exhausted);
    assert_eq!(ctx.pages, 3);
    assert_eq!(sink.pages_ended, 3);
    assert_eq!(sink.records.len(), 2);
}

#[tokio::test]
async fn fetch_failure_aborts_the_pass() {
    let site = FakeSite::new()
        .page(feed_url("eve", 1), document(&[journal("a", "<p>1</p>")]))
        .status(feed_url("eve", 2), 500);
    let mut ctx = context(site, RecordLimit::unlimited());
    let mut sink = CollectingSink::default();

    let err = run_pass(
        &mut ctx,
        Paginator::unbounded(format!("{}/user/eve", common::SITE)),
        &JournalExtractor,
        &mut sink,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, JobError::Fetch { ref url, .. } if url == &feed_url("eve", 2)));
    assert_eq!(ctx.pages, 1);
    assert_eq!(sink.records.len(), 1);
}

#[tokio::test]
async fn bounded_progress_reports_page_of_total() {
    let mut site = FakeSite::new();
    for n in 1..=3 {
        site = site.page(
            thread_page(n),
            document(&[post("a", &format!("#{n}"), "t", "<p>x</p>")]),
        );
    }
    let log = Arc::new(ProgressLog::default());
    let mut ctx = RunContext::new(
        Arc::new(site),
        JobLogger::global(),
        StopHandle::new(),
        log.clone(),
        RecordLimit::unlimited(),
    );
    let mut sink = CollectingSink::default();

    let end = run_pass(
        &mut ctx,
        Paginator::bounded(common::THREAD, 10, Some(3)),
        &ForumPostExtractor,
        &mut sink,
    )
    .await
    .unwrap();

    assert_eq!(end, PassEnd::Exhausted);
    assert_eq!(
        log.messages(),
        vec!["page 1 of 3", "page 2 of 3", "page 3 of 3"]
    );
    let events = log.0.lock().unwrap();
    assert!(events.iter().all(|p| p.total_pages == Some(3)));
    assert_eq!(events.iter().map(|p| p.page).collect::<Vec<_>>(), vec![1, 2, 3]);
}

#[tokio::test]
async fn unbounded_progress_reports_items_so_far() {
    let log = Arc::new(ProgressLog::default());
    let mut ctx = RunContext::new(
        Arc::new(single_entry_feed("gil", 2)),
        JobLogger::global(),
        StopHandle::new(),
        log.clone(),
        RecordLimit::unlimited(),
    );
    let mut sink = CollectingSink::default();

    run_pass(
        &mut ctx,
        Paginator::unbounded(format!("{}/user/gil", common::SITE)),
        &JournalExtractor,
        &mut sink,
    )
    .await
    .unwrap();

    assert_eq!(log.messages(), vec!["page 1 (1 items)", "page 2 (2 items)"]);
    let events = log.0.lock().unwrap();
    assert!(events.iter().all(|p| p.total_pages.is_none()));
    assert_eq!(events[1].records, 2);
}

#[tokio::test]
async fn stop_after_the_last_bounded_page_leaves_the_pass_exhausted() {
    let site = FakeSite::new()
        .page(thread_page(1), document(&[post("a", "#1", "t", "<p>1</p>")]))
        .page(thread_page(2), document(&[post("b", "#2", "t", "<p>2</p>")]));
    let stop = StopHandle::new();
    let observer = Arc::new(StopAfter {
        after: 2,
        stop: stop.clone(),
        seen: Mutex::new(Vec::new()),
    });
    let mut ctx = RunContext::new(
        Arc::new(site),
        JobLogger::global(),
        stop,
        observer,
        RecordLimit::unlimited(),
    );
    let mut sink = CollectingSink::default();

    let end = run_pass(
        &mut ctx,
        Paginator::bounded(common::THREAD, 2, None),
        &ForumPostExtractor,
        &mut sink,
    )
    .await
    .unwrap();

    assert_eq!(end, PassEnd::Exhausted);
    assert_eq!(ctx.pages, 2);
}
