#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Maze Crawl experience.

mod args;

use anyhow::{Context, Result};
use clap::Parser;
use maze_crawl_chat::{LineTransport, TwitchTransport};
use maze_crawl_rendering::{
    palette, FrameControl, Presentation, RenderingBackend, Scene, TerminalBackend,
};
use maze_crawl_rendering_macroquad::MacroquadBackend;
use maze_crawl_runtime::{
    spawn_engine, Backoff, ChatTransport, GameHandle, Scheduler, Session,
};
use maze_crawl_world::{query, World};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::args::{Cli, RendererKind, TransportKind};

/// Entry point for the Maze Crawl command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = cli.game_config()?;
    let world = World::new(&config).context("failed to create the maze world")?;
    let banner = query::welcome_banner(&world);
    info!(
        seed = config.seed,
        size = query::size(&world),
        tick_period_ms = config.tick_period_ms,
        "{banner}"
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("maze-crawl")
        .build()
        .context("failed to start the async runtime")?;

    let mut scheduler = Scheduler::new(config.tick_period());
    let (handle, engine) = {
        let _context = runtime.enter();
        let (handle, engine) = spawn_engine(world);
        scheduler.start(handle.ticker());
        (handle, engine)
    };

    let channel = cli.channel.clone();
    let _session = match cli.transport {
        TransportKind::Twitch => {
            runtime.spawn(hold_session(TwitchTransport::new(), channel, handle.clone()))
        }
        TransportKind::Stdin => {
            runtime.spawn(hold_session(LineTransport::stdin(), channel, handle.clone()))
        }
    };
    let _interrupt = runtime.spawn(shutdown_on_interrupt(handle.clone()));

    let presented = match cli.renderer {
        RendererKind::Window => present(MacroquadBackend::new().with_vsync(true), banner, &handle),
        RendererKind::Terminal => present(TerminalBackend::default(), banner, &handle),
        RendererKind::Headless => {
            runtime.block_on(wait_for_engine(&handle));
            Ok(())
        }
    };

    scheduler.stop();
    let _ = handle.shutdown();
    let world = runtime
        .block_on(engine)
        .context("the game engine task failed")?;
    info!(
        highest_level = query::highest_level(&world),
        accepted = query::stats(&world).accepted,
        "session finished"
    );

    presented
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Keeps the transport joined, reconnecting until the engine stops.
async fn hold_session<T: ChatTransport + 'static>(
    transport: T,
    channel: String,
    handle: GameHandle,
) {
    let mut session = Session::new(transport, handle);
    session.run(&channel, Backoff::default()).await;
}

async fn wait_for_engine(handle: &GameHandle) {
    let mut snapshots = handle.subscribe();
    while snapshots.changed().await.is_ok() {}
}

async fn shutdown_on_interrupt(handle: GameHandle) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            info!("interrupt received, shutting down");
            let _ = handle.shutdown();
        }
        Err(error) => warn!(%error, "failed to listen for interrupts"),
    }
}

/// Runs `backend` on the current thread, refreshing the scene from engine snapshots.
fn present<B: RenderingBackend>(backend: B, title: &str, handle: &GameHandle) -> Result<()> {
    let mut snapshots = handle.subscribe();
    let scene = Scene::from_snapshot(&snapshots.borrow_and_update());
    let presentation = Presentation::new(title, palette::BACKGROUND, scene);
    let controls = handle.clone();

    backend.run(presentation, move |input, scene| {
        if input.regenerate_maze && controls.regenerate_maze().is_err() {
            return FrameControl::Exit;
        }
        match snapshots.has_changed() {
            Ok(true) => {
                scene.update(&snapshots.borrow_and_update());
                FrameControl::Continue
            }
            Ok(false) => FrameControl::Continue,
            Err(_) => FrameControl::Exit,
        }
    })
}
