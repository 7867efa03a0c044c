//! # Memorial Board Binary
//!
//! Composition root: loads settings, installs logging, wires the in-memory
//! store and Argon2 hasher into the board, then drives a short scripted
//! session against it.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use auth_adapters::Argon2Hasher;
use configs::{LogFormat, LogSettings, Settings};
use domains::{Emotion, MemorialId};
use services::{
    Authority, Backends, Draft, Limits, LockRegistry, MemorialBoard, Mutation, PageRequest,
    Paginator, RegistrySettings,
};
use storage_adapters::InMemoryStore;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEMO_PASSCODE: &str = "remember";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut settings = Settings::load().context("loading settings")?;
    init_tracing(&settings.log);

    let board = Arc::new(build_board(&mut settings)?);
    spawn_sweeper(Arc::clone(board.locks()), settings.lock.idle_ttl());

    tracing::info!("memorial board ready");
    run_demo(&board).await?;
    Ok(())
}

fn init_tracing(log: &LogSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));
    let registry = tracing_subscriber::registry().with(filter);
    match log.format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(fmt::layer().pretty()).init(),
    }
}

fn build_board(settings: &mut Settings) -> anyhow::Result<MemorialBoard> {
    let store = Arc::new(InMemoryStore::new());

    let passcode = &mut settings.passcode;
    let hasher = Argon2Hasher::new(
        passcode.memory_kib,
        passcode.iterations,
        passcode.parallelism,
        passcode.pepper.take(),
    )
    .context("building passcode hasher")?;

    let locks = LockRegistry::new(RegistrySettings {
        capacity: settings.lock.capacity,
        idle_ttl: settings.lock.idle_ttl(),
        acquire_timeout: settings.lock.acquire_timeout(),
        sweep_interval: settings.lock.sweep_interval,
    });

    let limits = &settings.limits;
    Ok(MemorialBoard::new(
        Backends::new(store.clone(), store.clone(), store, Arc::new(hasher)),
        Arc::new(locks),
        Limits {
            name_max: limits.name_max,
            content_max: limits.content_max,
            passcode_min: limits.passcode_min,
            passcode_max: limits.passcode_max,
        },
        Paginator::new(
            settings.pagination.default_page_size,
            settings.pagination.max_page_size,
        ),
    ))
}

/// Evicts idle lock entries in the background so a quiet registry shrinks
/// even when no acquisitions trigger the amortized sweep.
fn spawn_sweeper(locks: Arc<LockRegistry<MemorialId>>, idle_ttl: Duration) {
    let period = (idle_ttl / 2).max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            let evicted = locks.evict_expired();
            if evicted > 0 {
                tracing::debug!(evicted, remaining = locks.len(), "lock sweep");
            }
        }
    });
}

async fn run_demo(board: &Arc<MemorialBoard>) -> anyhow::Result<()> {
    let memorial = board
        .create_memorial(Draft::new("Grandma", "Forever in our hearts.", DEMO_PASSCODE))
        .await?;
    let id = memorial.id;

    let mut visitors = Vec::new();
    for n in 0..100 {
        let board = Arc::clone(board);
        let emotion = Emotion::ALL[n % Emotion::ALL.len()];
        visitors.push(tokio::spawn(async move {
            board.mutate(id, Mutation::IncrementEmotion(emotion)).await
        }));
    }
    for visitor in visitors {
        visitor.await??;
    }

    for n in 1..=3 {
        let comment = board
            .create_comment(id, Draft::new(format!("guest{n}"), format!("Comment {n}"), "1234"))
            .await?;
        board
            .create_reply(id, comment.id, Draft::new("family", "Thank you.", "5678"))
            .await?;
    }

    let view = board.memorial(id).await?;
    println!("{}", serde_json::to_string_pretty(&view)?);

    let mut request = PageRequest::first(2).oldest_first();
    loop {
        let page = board.list_comments(id, &request).await?;
        println!("{}", serde_json::to_string_pretty(&page)?);
        match page.next_cursor {
            Some(cursor) => request = request.after(cursor),
            None => break,
        }
    }

    let report = board
        .delete_memorial(id, Authority::passcode(DEMO_PASSCODE))
        .await?;
    tracing::info!(
        comments = report.comments,
        replies = report.replies,
        "demo memorial deleted"
    );
    Ok(())
}
