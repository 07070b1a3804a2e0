// Integration tests for scroll-driven pagination sessions
// Drives the full store -> engine -> surface loop through scripted events

use std::sync::Arc;

use backscroll::driver::{Driver, SessionEvent};
use backscroll::engine::trigger::{ScrollFrame, Travel};
use backscroll::engine::PagingConfig;
use backscroll::store::{InMemoryStore, StoreError};
use backscroll::surface::SimSurface;
use backscroll::{Direction, MessageId, Result};

fn older_edge(max_extent: f64) -> SessionEvent {
    // Default orientation is inverted, so older history sits at offset zero
    SessionEvent::Scroll(ScrollFrame::new(0.0, max_extent, Travel::TowardStart))
}

#[tokio::test]
async fn test_scroll_session_accumulates_history_until_exhausted() -> Result<()> {
    let store = Arc::new(InMemoryStore::synthetic_conversation(100));
    let mut driver = Driver::scripted(
        PagingConfig::default(),
        store.clone(),
        SimSurface::default(),
        vec![
            // Each frame reports the extent the surface had after the
            // previous page landed
            older_edge(1600.0),
            older_edge(3600.0),
            older_edge(5600.0),
            older_edge(7600.0),
            older_edge(9600.0),
            // One more frame at the edge after exhaustion must not fetch
            older_edge(9600.0),
        ],
    );
    driver.seed().await?;

    let (paginator, _surface) = driver.run().await;

    // Every fetched message is retained, in strict conversation order
    assert_eq!(paginator.window().len(), 100);
    assert_eq!(
        paginator.window().bounds(),
        Some((MessageId(1), MessageId(100)))
    );
    assert!(paginator
        .window()
        .windows(2)
        .all(|pair| pair[0].id() < pair[1].id()));

    assert!(!paginator.has_more(Direction::Older));
    assert!(!paginator.has_more(Direction::Newer));
    assert_eq!(
        paginator.stats().to_string(),
        "100 messages #1..#100 (older: done, newer: done)"
    );

    // Seed page, four history pages, and the final empty page
    assert_eq!(store.fetch_counts().await.older, 6);
    Ok(())
}

#[tokio::test]
async fn test_fetch_failure_leaves_session_retryable() -> Result<()> {
    let store = Arc::new(InMemoryStore::synthetic_conversation(100));
    let mut driver = Driver::scripted(
        PagingConfig::default(),
        store.clone(),
        SimSurface::default(),
        vec![older_edge(1600.0), older_edge(1600.0)],
    );
    driver.seed().await?;
    store
        .fail_next_fetch(StoreError::Unavailable("connection reset".into()))
        .await;

    let (paginator, _surface) = driver.run().await;

    // The failed page was fetched again by the second scroll event
    assert_eq!(paginator.window().len(), 40);
    assert_eq!(
        paginator.window().bounds(),
        Some((MessageId(61), MessageId(100)))
    );
    assert!(paginator.has_more(Direction::Older));
    assert_eq!(store.fetch_counts().await.older, 2);
    Ok(())
}

#[tokio::test]
async fn test_newer_direction_pages_after_jump_back() -> Result<()> {
    let store = Arc::new(InMemoryStore::synthetic_conversation(200));
    let mut driver = Driver::scripted(
        PagingConfig::default(),
        store.clone(),
        SimSurface::default(),
        vec![
            SessionEvent::Jump(MessageId(100)),
            // Inverted orientation puts newer content at the far end
            SessionEvent::Scroll(ScrollFrame::new(3700.0, 3700.0, Travel::TowardEnd)),
        ],
    );
    driver.seed().await?;

    let (paginator, surface) = driver.run().await;

    // The jump landed around the target and one newer page was appended
    assert_eq!(
        paginator.window().bounds(),
        Some((MessageId(80), MessageId(140)))
    );
    assert!(paginator.has_more(Direction::Newer));
    assert_eq!(surface.last_scroll_target(), Some(MessageId(100)));
    assert_eq!(surface.max_extent(), 5700.0);

    let counts = store.fetch_counts().await;
    assert_eq!(counts.older, 1);
    assert_eq!(counts.newer, 1);
    assert_eq!(counts.around, 1);
    Ok(())
}
