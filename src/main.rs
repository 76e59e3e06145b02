//! Headless game driver (default binary).
//!
//! Reads one command per stdin line (`left`, `right`, `down`, `rotate`,
//! `drop`, `hold`, `restart`), applies gravity on a timer and writes one JSON
//! frame to stdout after every change. `pause` toggles the gravity timer and
//! `quit` exits. Logs go to stderr.
//!
//! With `FALLING_BLOCKS_MULTIPLAYER=1` the board is sent to the hub after each
//! tick and opponent boards are included in every frame.

use std::collections::BTreeMap;
use std::env;
use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use falling_blocks::core::{GameSession, Grid, SessionSnapshot};
use falling_blocks::net::{ClientConfig, NetEvent, NetLink};
use falling_blocks::types::{Command, FALL_INTERVAL_MS};

#[derive(Debug, Clone)]
struct DriverConfig {
    seed: u32,
    tick_ms: u64,
    multiplayer: bool,
    wait_start: bool,
}

impl DriverConfig {
    fn from_env() -> Self {
        let seed = env::var("FALLING_BLOCKS_SEED")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(time_seed);
        let tick_ms = env::var("FALLING_BLOCKS_TICK_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|&ms| ms > 0)
            .unwrap_or(FALL_INTERVAL_MS);

        Self {
            seed,
            tick_ms,
            multiplayer: env_flag("FALLING_BLOCKS_MULTIPLAYER"),
            wait_start: env_flag("FALLING_BLOCKS_WAIT_START"),
        }
    }
}

fn env_flag(name: &str) -> bool {
    env::var(name)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

fn time_seed() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos() ^ d.as_secs() as u32)
        .unwrap_or(1)
}

/// One stdout frame
#[derive(Serialize)]
struct Frame {
    #[serde(flatten)]
    snapshot: SessionSnapshot,
    paused: bool,
    /// Waiting for the hub's START
    waiting: bool,
    opponents: BTreeMap<String, Grid>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .compact()
        .init();

    let config = DriverConfig::from_env();
    info!(seed = config.seed, tick_ms = config.tick_ms, "starting session");

    let link = if config.multiplayer {
        let client_config = ClientConfig::from_env();
        Some(NetLink::connect(&client_config).context("multiplayer mode needs a running hub")?)
    } else {
        None
    };

    run(&config, link)
}

fn run(config: &DriverConfig, mut link: Option<NetLink>) -> Result<()> {
    let commands = spawn_stdin_reader();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let mut session = GameSession::new(config.seed);
    let tick = Duration::from_millis(config.tick_ms);
    let mut last_tick = Instant::now();
    let mut paused = false;
    let mut waiting = link.is_some() && config.wait_start;

    emit(&mut out, &session, paused, waiting, link.as_ref())?;

    loop {
        let mut dirty = false;

        // Input with timeout until next tick.
        let timeout = tick.checked_sub(last_tick.elapsed()).unwrap_or(Duration::ZERO);
        match commands.recv_timeout(timeout) {
            Ok(line) => match line.trim() {
                "" => {}
                "quit" | "exit" => break,
                "pause" => {
                    paused = !paused;
                    last_tick = Instant::now();
                    dirty = true;
                    info!(paused, "pause toggled");
                }
                input => match Command::from_str(input) {
                    Some(cmd) if !paused || cmd == Command::Restart => {
                        dirty |= session.apply(cmd).changed();
                    }
                    Some(_) => {}
                    None => warn!(input, "unknown command"),
                },
            },
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        let mut lost = false;
        if let Some(net) = link.as_mut() {
            for event in net.poll_events() {
                match event {
                    NetEvent::Started => {
                        if waiting {
                            waiting = false;
                            last_tick = Instant::now();
                        }
                        dirty = true;
                    }
                    NetEvent::PlayerJoined(_) => {}
                    NetEvent::PlayerLeft(_) | NetEvent::BoardUpdated(_) => dirty = true,
                    NetEvent::Disconnected => lost = true,
                }
            }
        }
        if lost {
            warn!("lost connection to hub, continuing single player");
            link = None;
            waiting = false;
            dirty = true;
        }

        // Tick.
        if last_tick.elapsed() >= tick {
            last_tick = Instant::now();
            if !paused && !waiting {
                dirty |= session.apply(Command::Tick).changed();
                if let Some(net) = link.as_ref() {
                    net.send_board(session.board());
                }
            }
        }

        if dirty {
            emit(&mut out, &session, paused, waiting, link.as_ref())?;
        }
    }

    if let Some(net) = link {
        net.disconnect();
    }
    info!(score = session.score(), "session ended");
    Ok(())
}

/// Forward stdin lines over a channel so the game loop can wait with a timeout
fn spawn_stdin_reader() -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn emit(
    out: &mut impl Write,
    session: &GameSession,
    paused: bool,
    waiting: bool,
    link: Option<&NetLink>,
) -> Result<()> {
    let opponents = link
        .map(|net| {
            net.opponents()
                .into_iter()
                .map(|(id, opponent)| (id.to_string(), opponent.board.to_grid()))
                .collect()
        })
        .unwrap_or_default();

    let frame = Frame {
        snapshot: session.snapshot(),
        paused,
        waiting,
        opponents,
    };
    serde_json::to_writer(&mut *out, &frame).context("failed to encode frame")?;
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}
