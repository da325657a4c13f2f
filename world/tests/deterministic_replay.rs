use std::time::Instant;

use maze_crawl_core::{Command, Direction, Event, GameConfig, GameSnapshot, MoveCommand};
use maze_crawl_world::{self as world, query, World};

const SENDERS: [&str; 3] = ["ada", "grace", "linus"];

#[test]
fn replaying_a_script_reproduces_events_and_state() {
    let script = chat_script(400);

    let first = replay(0x00c0_ffee, script.clone());
    let second = replay(0x00c0_ffee, script);

    assert_eq!(first.events, second.events, "event streams diverged");
    assert_eq!(first.snapshot, second.snapshot, "final state diverged");
}

#[test]
fn replay_accounts_for_every_submitted_move() {
    let outcome = replay(7, chat_script(250));
    let stats = outcome.snapshot.stats;

    assert_eq!(stats.accepted, 250);
    assert_eq!(
        stats.accepted,
        stats.settled() + outcome.snapshot.queue_len as u64,
        "accepted moves must be applied, blocked, discarded or still queued",
    );
}

#[test]
fn different_seeds_produce_different_mazes() {
    let first = World::new(&GameConfig {
        seed: Some(1),
        ..GameConfig::default()
    })
    .expect("valid configuration");
    let second = World::new(&GameConfig {
        seed: Some(2),
        ..GameConfig::default()
    })
    .expect("valid configuration");

    assert_ne!(query::grid(&first), query::grid(&second));
}

struct ReplayOutcome {
    events: Vec<Event>,
    snapshot: GameSnapshot,
}

fn replay(seed: u64, script: Vec<Command>) -> ReplayOutcome {
    let mut world = World::new(&GameConfig {
        seed: Some(seed),
        level_transition_delay_ms: 0,
        ..GameConfig::default()
    })
    .expect("valid configuration");
    let mut events = Vec::new();

    for command in script {
        world::apply(&mut world, command, &mut events);
    }

    ReplayOutcome {
        events,
        snapshot: query::snapshot(&world),
    }
}

/// Interleaves chat moves with ticks, two moves for every tick.
fn chat_script(moves: usize) -> Vec<Command> {
    let received_at = Instant::now();
    let pattern = [
        Direction::Right,
        Direction::Down,
        Direction::Down,
        Direction::Right,
        Direction::Left,
        Direction::Down,
        Direction::Up,
    ];

    let mut script = vec![Command::BeginSession {
        channel: "replay".to_owned(),
    }];
    for index in 0..moves {
        script.push(Command::SubmitMove {
            command: MoveCommand::new(
                pattern[index % pattern.len()],
                SENDERS[index % SENDERS.len()],
                received_at,
            ),
        });
        if index % 2 == 1 {
            script.push(Command::Tick);
        }
    }
    script.extend(std::iter::repeat(Command::Tick).take(16));
    script
}
