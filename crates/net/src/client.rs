//! Client module - one connection to the hub
//!
//! Holds one connection to the hub. Outbound board payloads go through a
//! writer task; a reader task parses incoming lines, keeps the opponent cache
//! current and calls back into a [`MessageHandler`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use anyhow::Context;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use falling_blocks_core::Board;
use falling_blocks_types::DEFAULT_HUB_PORT;

use crate::protocol::{decode_board, encode_board, Message, PlayerId};

/// Callbacks for hub events
///
/// Invoked from the client's reader task, so implementations must not block.
pub trait MessageHandler: Send + Sync + 'static {
    fn on_start(&self) {}
    fn on_player_joined(&self, _player: &PlayerId) {}
    fn on_player_left(&self, _player: &PlayerId) {}
    fn on_game_state(&self, _player: &PlayerId, _board: &Board) {}
    /// Called once when the read loop ends
    fn on_disconnected(&self) {}
}

impl MessageHandler for () {}

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: DEFAULT_HUB_PORT,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();
        let host = env::var("FALLING_BLOCKS_HOST").unwrap_or(defaults.host);
        let port = env::var("FALLING_BLOCKS_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);

        Self { host, port }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Latest board received from one opponent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpponentBoard {
    pub player: PlayerId,
    pub board: Board,
    /// Snapshots received from this player so far
    pub updates: u64,
}

pub type OpponentMap = HashMap<PlayerId, Arc<OpponentBoard>>;

struct Shared {
    connected: AtomicBool,
    opponents: RwLock<OpponentMap>,
    /// Flips to true once; both tasks stop when they see it
    shutdown: watch::Sender<bool>,
}

impl Shared {
    fn close(&self) {
        self.shutdown.send_replace(true);
    }

    fn store_board(&self, player: &PlayerId, board: Board) {
        let mut opponents = self.opponents.write().unwrap_or_else(PoisonError::into_inner);
        let updates = opponents.get(player).map_or(0, |b| b.updates) + 1;
        opponents.insert(
            player.clone(),
            Arc::new(OpponentBoard {
                player: player.clone(),
                board,
                updates,
            }),
        );
    }

    fn remove_board(&self, player: &PlayerId) {
        self.opponents
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(player);
    }
}

/// Connection to the hub
pub struct NetClient {
    shared: Arc<Shared>,
    outbound: mpsc::UnboundedSender<String>,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
}

impl NetClient {
    /// Connect and start the reader and writer tasks
    pub async fn connect<H: MessageHandler>(
        config: &ClientConfig,
        handler: H,
    ) -> anyhow::Result<Self> {
        let stream = TcpStream::connect((config.host.as_str(), config.port))
            .await
            .with_context(|| format!("failed to connect to hub at {}", config.addr()))?;
        info!(addr = %config.addr(), "connected to hub");

        let (read_half, mut write_half) = stream.into_split();
        let shared = Arc::new(Shared {
            connected: AtomicBool::new(true),
            opponents: RwLock::new(HashMap::new()),
            shutdown: watch::channel(false).0,
        });
        let (outbound, mut rx) = mpsc::unbounded_channel::<String>();

        let writer_shared = Arc::clone(&shared);
        let mut closing = shared.shutdown.subscribe();
        let writer = tokio::spawn(async move {
            loop {
                let line = tokio::select! {
                    line = rx.recv() => line,
                    _ = closed(&mut closing) => None,
                };
                let Some(line) = line else { break };

                let result = async {
                    write_half.write_all(line.as_bytes()).await?;
                    write_half.write_all(b"\n").await?;
                    write_half.flush().await
                }
                .await;
                if let Err(e) = result {
                    warn!(error = %e, "send failed");
                    writer_shared.connected.store(false, Ordering::SeqCst);
                    break;
                }
            }
            if let Err(e) = write_half.shutdown().await {
                debug!(error = %e, "closing write half failed");
            }
        });

        let reader_shared = Arc::clone(&shared);
        let reader = tokio::spawn(async move {
            let mut lines = BufReader::new(read_half);
            match read_loop(&mut lines, &reader_shared, &handler).await {
                Ok(()) => info!("connection closed"),
                Err(e) => warn!(error = %e, "read failed"),
            }
            reader_shared.connected.store(false, Ordering::SeqCst);
            reader_shared.close();
            drop(lines);
            handler.on_disconnected();
        });

        Ok(Self {
            shared,
            outbound,
            reader,
            writer,
        })
    }

    /// Queue one payload line; false when not connected
    pub fn send_game_state(&self, payload: &str) -> bool {
        if !self.is_connected() {
            return false;
        }
        self.outbound.send(payload.to_string()).is_ok()
    }

    pub fn send_board(&self, board: &Board) -> bool {
        self.send_game_state(&encode_board(board))
    }

    pub fn is_connected(&self) -> bool {
        self.shared.connected.load(Ordering::SeqCst)
    }

    /// Stop both tasks and close the socket
    pub fn disconnect(&self) {
        if self.shared.connected.swap(false, Ordering::SeqCst) {
            info!("disconnecting from hub");
        }
        self.shared.close();
    }

    /// Copy of the opponent cache
    pub fn opponents(&self) -> OpponentMap {
        self.shared
            .opponents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn opponent(&self, player: &PlayerId) -> Option<Arc<OpponentBoard>> {
        self.shared
            .opponents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(player)
            .cloned()
    }
}

impl Drop for NetClient {
    fn drop(&mut self) {
        self.reader.abort();
        self.writer.abort();
    }
}

/// Resolve once the shutdown flag is set
async fn closed(rx: &mut watch::Receiver<bool>) {
    let _ = rx.wait_for(|&closed| closed).await;
}

async fn read_loop<R, H>(reader: &mut R, shared: &Shared, handler: &H) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    H: MessageHandler,
{
    let mut closing = shared.shutdown.subscribe();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let bytes_read = tokio::select! {
            read = reader.read_until(b'\n', &mut buf) => read?,
            _ = closed(&mut closing) => return Ok(()),
        };
        if bytes_read == 0 {
            return Ok(());
        }

        let line = match std::str::from_utf8(&buf) {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "dropping non-UTF-8 line");
                continue;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        dispatch(line, shared, handler);
    }
}

fn dispatch<H: MessageHandler>(line: &str, shared: &Shared, handler: &H) {
    let msg = match Message::parse(line) {
        Ok(msg) => msg,
        Err(e) => {
            warn!(error = %e, line = line.trim_end(), "dropping malformed message");
            return;
        }
    };

    match msg {
        Message::Start => {
            info!("game start");
            handler.on_start();
        }
        Message::PlayerJoined(player) => {
            info!(player = %player, "player joined");
            handler.on_player_joined(&player);
        }
        Message::PlayerLeft(player) => {
            info!(player = %player, "player left");
            shared.remove_board(&player);
            handler.on_player_left(&player);
        }
        Message::GameState { player, payload } => match decode_board(&payload) {
            Ok(board) => {
                shared.store_board(&player, board.clone());
                handler.on_game_state(&player, &board);
            }
            Err(e) => {
                warn!(player = %player, error = %e, "dropping bad board payload");
            }
        },
    }
}
