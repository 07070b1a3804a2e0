#![deny(warnings)]

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::Result;

use backscroll::{
    cli::Cli,
    config::Config,
    driver::{Driver, SessionEvent},
    engine::trigger::{Orientation, ScrollFrame, Travel},
    store::InMemoryStore,
    surface::SimSurface,
    utils::{initialize_logging, initialize_panic_handler},
    AuthorId, Message, MessageId,
};

/// Fixed tour of a conversation: page into history three times, jump to the
/// oldest message, jump back to the newest, then receive one live message.
fn demo_script(messages: u64, config: &Config) -> Vec<SessionEvent> {
    let page_extent = config.surface.item_extent * config.paging.batch_size as f64;
    let older_edge = match config.paging.orientation {
        Orientation::Inverted => ScrollFrame::new(0.0, page_extent, Travel::TowardStart),
        Orientation::Normal => ScrollFrame::new(page_extent, page_extent, Travel::TowardEnd),
    };

    vec![
        SessionEvent::Scroll(older_edge),
        SessionEvent::Scroll(older_edge),
        SessionEvent::Scroll(older_edge),
        SessionEvent::Jump(MessageId(1)),
        SessionEvent::Jump(MessageId(messages)),
        SessionEvent::Live(Message::new(
            MessageId(messages + 1),
            AuthorId(0),
            chrono::Utc::now().timestamp(),
            "just arrived",
        )),
        SessionEvent::Quit,
    ]
}

async fn tokio_main() -> Result<()> {
    initialize_logging()?;

    initialize_panic_handler()?;

    let args = <Cli as Parser>::parse();

    // Load configuration (file-based)
    let config = Config::new()?;

    let store = Arc::new(
        InMemoryStore::synthetic_conversation(args.messages as usize)
            .with_latency(Duration::from_millis(args.latency_ms)),
    );
    let surface = SimSurface::new(config.surface.item_extent, config.surface.viewport_extent);

    // Replay an event sequence and report where the session ended up
    let script: Vec<SessionEvent> = match &args.script {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => demo_script(args.messages, &config),
    };
    let mut session = Driver::scripted(config.paging, store, surface, script);
    session.seed().await?;
    let (paginator, _surface) = session.run().await;

    println!("{}", paginator.stats());

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = tokio_main().await {
        eprintln!("{} error: Something went wrong", env!("CARGO_PKG_NAME"));
        Err(e)
    } else {
        Ok(())
    }
}
