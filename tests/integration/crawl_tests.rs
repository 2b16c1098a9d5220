//! End-to-end crawl tests
//!
//! These tests drive the orchestrator through scripted collaborators and
//! assert on the JSON artifacts left on disk.

use crate::mock::{post, PageData, PageScript, ScriptedFetcher, ScriptedSession, StubExtractor};
use forage::config::{BrowserConfig, Config, CrawlerConfig, ForumConfig, OutputConfig};
use forage::crawler::Orchestrator;
use forage::state::{Category, ThreadRecord, ThreadSummary};
use std::path::Path;
use std::sync::atomic::Ordering;
use tempfile::TempDir;

/// Crawler config with every delay zeroed so tests run instantly
fn instant_crawler() -> CrawlerConfig {
    CrawlerConfig {
        max_attempts: 3,
        retry_base_delay_ms: 0,
        listing_pages_per_category: 1,
        navigation_timeout_ms: 1000,
        markup_timeout_ms: 1000,
        page_pacing_ms: 0,
        listing_pacing_ms: 0,
        thread_pacing_ms: 0,
        thread_pacing_jitter_ms: 0,
        checkpoint_every: 5,
        recycle_every: 10,
    }
}

fn test_config(dir: &TempDir, crawler: CrawlerConfig) -> Config {
    Config {
        forum: ForumConfig {
            root_url: "root:listing".to_string(),
        },
        crawler,
        browser: BrowserConfig::default(),
        output: OutputConfig {
            directory: dir.path().to_string_lossy().into_owned(),
            prefix: "fibro_forum_data".to_string(),
        },
    }
}

fn read_records(path: &Path) -> Vec<ThreadRecord> {
    let json = std::fs::read_to_string(path).expect("snapshot should exist");
    serde_json::from_str(&json).expect("snapshot should be a record array")
}

#[tokio::test]
async fn test_single_thread_end_to_end() {
    let dir = TempDir::new().unwrap();

    let extractor = StubExtractor::new()
        .page(
            "root:listing",
            PageData {
                categories: vec![Category {
                    name: "Support".to_string(),
                    url: "/community/forums/support/".to_string(),
                }],
                ..PageData::default()
            },
        )
        .page(
            "/community/forums/support/",
            PageData {
                summaries: vec![ThreadSummary {
                    title: Some("Hi".to_string()),
                    thread_url: Some("/community/threads/hi.123/".to_string()),
                    replies: None,
                    views: None,
                }],
                ..PageData::default()
            },
        )
        .page(
            "/community/threads/hi.123/",
            PageData {
                posts: vec![post("alice", "hello everyone"), post("bob", "welcome")],
                ..PageData::default()
            },
        );

    let fetcher = ScriptedFetcher::new(vec![
        ScriptedSession::single("root:listing"),
        ScriptedSession::single("/community/forums/support/"),
        ScriptedSession::single("/community/threads/hi.123/"),
    ]);
    let stats = fetcher.stats();

    let orchestrator = Orchestrator::new(
        test_config(&dir, instant_crawler()),
        Box::new(fetcher),
        Box::new(extractor),
    );
    let state = orchestrator.run().await.expect("crawl should succeed");

    assert_eq!(state.len(), 1);

    let records = read_records(&dir.path().join("fibro_forum_data_full.json"));
    assert_eq!(records.len(), 1);

    let record = &records[0];
    assert_eq!(record.thread_id, "hi.123");
    assert_eq!(record.thread_title.as_deref(), Some("Hi"));
    assert_eq!(record.forum_category, "Support");
    assert_eq!(record.thread_replies, 1);
    assert_eq!(
        record
            .original_post
            .as_ref()
            .and_then(|p| p.username.as_deref()),
        Some("alice")
    );
    assert_eq!(record.replies.len(), 1);
    assert_eq!(record.replies[0].username.as_deref(), Some("bob"));

    // root discovery + listing + thread, one session each
    assert_eq!(stats.sessions_opened.load(Ordering::SeqCst), 3);
    assert_eq!(stats.recycles.load(Ordering::SeqCst), 0);
    // the browser is released exactly once at run end
    assert_eq!(stats.shutdowns.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_multi_page_thread_concatenates_posts() {
    let dir = TempDir::new().unwrap();

    let extractor = StubExtractor::new()
        .page(
            "root:listing",
            PageData {
                categories: vec![Category {
                    name: "Support".to_string(),
                    url: "cat:support".to_string(),
                }],
                ..PageData::default()
            },
        )
        .page(
            "cat:support",
            PageData {
                summaries: vec![ThreadSummary {
                    title: Some("Long".to_string()),
                    thread_url: Some("/community/threads/long.7/".to_string()),
                    replies: Some("5".to_string()),
                    views: Some("old-count".to_string()),
                }],
                ..PageData::default()
            },
        )
        .page(
            "t:long/1",
            PageData {
                posts: vec![post("op", "first"), post("r1", "second")],
                has_next: true,
                views: Some("1204".to_string()),
                ..PageData::default()
            },
        )
        .page(
            "t:long/2",
            PageData {
                posts: vec![post("r2", "third")],
                ..PageData::default()
            },
        );

    let fetcher = ScriptedFetcher::new(vec![
        ScriptedSession::single("root:listing"),
        ScriptedSession::single("cat:support"),
        ScriptedSession::new(vec![PageScript::new("t:long/1"), PageScript::new("t:long/2")]),
    ]);

    let orchestrator = Orchestrator::new(
        test_config(&dir, instant_crawler()),
        Box::new(fetcher),
        Box::new(extractor),
    );
    orchestrator.run().await.expect("crawl should succeed");

    let records = read_records(&dir.path().join("fibro_forum_data_full.json"));
    assert_eq!(records.len(), 1);

    let record = &records[0];
    assert_eq!(record.thread_id, "long.7");
    assert_eq!(record.thread_replies, 2);
    // the thread page's own view count overrides the listing value
    assert_eq!(record.thread_views.as_deref(), Some("1204"));

    let usernames: Vec<_> = record
        .replies
        .iter()
        .filter_map(|p| p.username.as_deref())
        .collect();
    assert_eq!(usernames, vec!["r1", "r2"]);
}

#[tokio::test]
async fn test_aborted_thread_keeps_partial_record() {
    let dir = TempDir::new().unwrap();

    let extractor = StubExtractor::new()
        .page(
            "root:listing",
            PageData {
                categories: vec![Category {
                    name: "Support".to_string(),
                    url: "cat:support".to_string(),
                }],
                ..PageData::default()
            },
        )
        .page(
            "cat:support",
            PageData {
                summaries: vec![ThreadSummary {
                    title: Some("Flaky".to_string()),
                    thread_url: Some("/community/threads/flaky.9/".to_string()),
                    ..ThreadSummary::default()
                }],
                ..PageData::default()
            },
        )
        .page(
            "t:flaky/1",
            PageData {
                posts: vec![post("op", "only page that renders")],
                has_next: true,
                ..PageData::default()
            },
        );

    let fetcher = ScriptedFetcher::new(vec![
        ScriptedSession::single("root:listing"),
        ScriptedSession::single("cat:support"),
        ScriptedSession::new(vec![
            PageScript::new("t:flaky/1"),
            PageScript::new("t:flaky/2").wait_fails(),
        ]),
    ]);

    let orchestrator = Orchestrator::new(
        test_config(&dir, instant_crawler()),
        Box::new(fetcher),
        Box::new(extractor),
    );
    orchestrator.run().await.expect("crawl should succeed");

    let records = read_records(&dir.path().join("fibro_forum_data_full.json"));
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].thread_id, "flaky.9");
    // page 2 never rendered; page 1's post survives
    assert_eq!(records[0].thread_replies, 0);
    assert!(records[0].original_post.is_some());
}

#[tokio::test]
async fn test_records_ordered_across_categories_and_checkpoints_written() {
    let dir = TempDir::new().unwrap();

    let mut extractor = StubExtractor::new().page(
        "root:listing",
        PageData {
            categories: vec![
                Category {
                    name: "Support".to_string(),
                    url: "cat:support".to_string(),
                },
                Category {
                    name: "General".to_string(),
                    url: "cat:general".to_string(),
                },
            ],
            ..PageData::default()
        },
    );

    let mut sessions = vec![ScriptedSession::single("root:listing")];

    for (category_key, ids) in [
        ("cat:support", vec!["s.1", "s.2", "s.3"]),
        ("cat:general", vec!["g.1", "g.2"]),
    ] {
        extractor = extractor.page(
            category_key,
            PageData {
                summaries: ids
                    .iter()
                    .map(|id| ThreadSummary {
                        title: Some(id.to_string()),
                        thread_url: Some(format!("/threads/{id}/")),
                        ..ThreadSummary::default()
                    })
                    .collect(),
                ..PageData::default()
            },
        );
        sessions.push(ScriptedSession::single(category_key));
        for id in &ids {
            let key = format!("/threads/{id}/");
            extractor = extractor.page(
                &key,
                PageData {
                    posts: vec![post(id, "text")],
                    ..PageData::default()
                },
            );
            sessions.push(ScriptedSession::single(&key));
        }
    }

    let fetcher = ScriptedFetcher::new(sessions);

    let orchestrator = Orchestrator::new(
        test_config(&dir, instant_crawler()),
        Box::new(fetcher),
        Box::new(extractor),
    );
    let state = orchestrator.run().await.expect("crawl should succeed");

    // discovery order: category order times listing order
    let ids: Vec<&str> = state
        .records()
        .iter()
        .map(|r| r.thread_id.as_str())
        .collect();
    assert_eq!(ids, vec!["s.1", "s.2", "s.3", "g.1", "g.2"]);

    // 5 processed threads crossed the checkpoint cadence exactly once
    let checkpoint = read_records(&dir.path().join("fibro_forum_data_partial_5.json"));
    assert_eq!(checkpoint.len(), 5);

    let full = read_records(&dir.path().join("fibro_forum_data_full.json"));
    assert_eq!(full.len(), 5);
}

#[tokio::test]
async fn test_exhausted_sessions_fail_threads_but_run_recovers() {
    // The scripted fetcher runs out of sessions after the listing, so every
    // thread fails; the run itself still completes with an empty output.
    let dir = TempDir::new().unwrap();

    let extractor = StubExtractor::new()
        .page(
            "root:listing",
            PageData {
                categories: vec![Category {
                    name: "Support".to_string(),
                    url: "cat:support".to_string(),
                }],
                ..PageData::default()
            },
        )
        .page(
            "cat:support",
            PageData {
                summaries: vec![
                    ThreadSummary {
                        title: Some("A".to_string()),
                        thread_url: Some("/threads/a.1/".to_string()),
                        ..ThreadSummary::default()
                    },
                    ThreadSummary {
                        title: Some("B".to_string()),
                        thread_url: Some("/threads/b.2/".to_string()),
                        ..ThreadSummary::default()
                    },
                ],
                ..PageData::default()
            },
        );

    let fetcher = ScriptedFetcher::new(vec![
        ScriptedSession::single("root:listing"),
        ScriptedSession::single("cat:support"),
    ]);

    let orchestrator = Orchestrator::new(
        test_config(&dir, instant_crawler()),
        Box::new(fetcher),
        Box::new(extractor),
    );
    let state = orchestrator.run().await.expect("run should complete");

    assert_eq!(state.len(), 0);
    assert_eq!(state.processed(), 2);

    let full = read_records(&dir.path().join("fibro_forum_data_full.json"));
    assert!(full.is_empty());
}
