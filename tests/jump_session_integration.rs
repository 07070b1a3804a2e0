// Integration tests for jump-to-message sessions
// Covers window replacement, loaded-target shortcuts, and missing targets

use std::sync::Arc;

use backscroll::driver::{Driver, SessionEvent};
use backscroll::engine::trigger::{ScrollFrame, Travel};
use backscroll::engine::PagingConfig;
use backscroll::store::InMemoryStore;
use backscroll::surface::SimSurface;
use backscroll::{Direction, MessageId, Result};

#[tokio::test]
async fn test_jump_far_from_window_replaces_it_around_target() -> Result<()> {
    let store = Arc::new(InMemoryStore::synthetic_conversation(500));
    let mut driver = Driver::scripted(
        PagingConfig::default(),
        store.clone(),
        SimSurface::default(),
        vec![SessionEvent::Jump(MessageId(100))],
    );
    driver.seed().await?;
    assert_eq!(
        driver.paginator().window().bounds(),
        Some((MessageId(481), MessageId(500)))
    );

    let (paginator, surface) = driver.run().await;

    assert_eq!(
        paginator.window().bounds(),
        Some((MessageId(80), MessageId(120)))
    );
    assert_eq!(paginator.window().len(), 41);
    assert!(paginator.has_more(Direction::Older));
    assert!(paginator.has_more(Direction::Newer));
    assert_eq!(surface.last_scroll_target(), Some(MessageId(100)));
    assert_eq!(store.fetch_counts().await.around, 1);
    Ok(())
}

#[tokio::test]
async fn test_jump_to_loaded_message_skips_the_store() -> Result<()> {
    let store = Arc::new(InMemoryStore::synthetic_conversation(500));
    let mut driver = Driver::scripted(
        PagingConfig::default(),
        store.clone(),
        SimSurface::default(),
        vec![SessionEvent::Jump(MessageId(490))],
    );
    driver.seed().await?;

    let (paginator, surface) = driver.run().await;

    // Window untouched, surface scrolled, no around query issued
    assert_eq!(
        paginator.window().bounds(),
        Some((MessageId(481), MessageId(500)))
    );
    assert_eq!(surface.last_scroll_target(), Some(MessageId(490)));
    assert_eq!(store.fetch_counts().await.around, 0);
    Ok(())
}

#[tokio::test]
async fn test_jump_to_missing_message_leaves_the_window() -> Result<()> {
    let store = Arc::new(InMemoryStore::synthetic_conversation(500));
    let mut driver = Driver::scripted(
        PagingConfig::default(),
        store.clone(),
        SimSurface::default(),
        vec![SessionEvent::Jump(MessageId(9999))],
    );
    driver.seed().await?;

    let (paginator, surface) = driver.run().await;

    assert_eq!(
        paginator.window().bounds(),
        Some((MessageId(481), MessageId(500)))
    );
    assert!(paginator.has_more(Direction::Older));
    assert!(!paginator.has_more(Direction::Newer));
    assert_eq!(surface.last_scroll_target(), None);
    assert_eq!(store.fetch_counts().await.around, 1);
    Ok(())
}

#[tokio::test]
async fn test_jump_near_conversation_start_closes_older_direction() -> Result<()> {
    let store = Arc::new(InMemoryStore::synthetic_conversation(100));
    let mut driver = Driver::scripted(
        PagingConfig::default(),
        store.clone(),
        SimSurface::default(),
        vec![
            SessionEvent::Jump(MessageId(5)),
            // At the older edge, but the around-fetch already reached the
            // conversation start, so nothing more is fetched
            SessionEvent::Scroll(ScrollFrame::new(0.0, 2100.0, Travel::TowardStart)),
        ],
    );
    driver.seed().await?;

    let (paginator, _surface) = driver.run().await;

    assert_eq!(
        paginator.window().bounds(),
        Some((MessageId(1), MessageId(25)))
    );
    assert!(!paginator.has_more(Direction::Older));
    assert!(paginator.has_more(Direction::Newer));
    assert_eq!(store.fetch_counts().await.older, 1);
    Ok(())
}
