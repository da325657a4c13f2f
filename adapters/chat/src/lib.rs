#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Chat transports that feed Maze Crawl sessions.
//!
//! [`LineTransport`] reads `sender: text` lines from any async reader, which
//! covers stdin and scripted playthroughs. [`TwitchTransport`] joins a Twitch
//! channel anonymously over IRC and relays its chat.

mod irc;
mod line;
mod twitch;

pub use line::{parse_line, LineTransport, ANONYMOUS_SENDER};
pub use twitch::{TwitchTransport, DEFAULT_JOIN_TIMEOUT, TWITCH_IRC_ADDRESS};
