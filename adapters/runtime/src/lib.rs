#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Async runtime that hosts the Maze Crawl world.
//!
//! One engine task owns the [`maze_crawl_world::World`]. Chat sessions,
//! the tick scheduler and control surfaces reach it through a cloneable
//! [`GameHandle`]; renderers observe it through published snapshots.

mod engine;
mod scheduler;
mod session;
mod transport;

pub use engine::{spawn_engine, EngineError, GameHandle};
pub use scheduler::{Scheduler, TickOutcome, Ticker};
pub use session::{Backoff, Session, SessionError};
pub use transport::{normalize_channel, ChatSubscription, ChatTransport, TransportError};
