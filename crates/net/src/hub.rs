//! Hub module - accepts clients and relays their lines
//!
//! Accepts client connections, assigns each an id, and fans every line a
//! client sends out to all the others as `GAME_STATE:<id>:<line>`. The hub
//! knows nothing about game rules.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot, Mutex};
use tracing::{debug, info, warn};

use falling_blocks_types::DEFAULT_HUB_PORT;

use crate::protocol::{Message, PlayerId};

const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Hub configuration
#[derive(Debug, Clone)]
pub struct HubConfig {
    pub host: String,
    pub port: u16,
    /// Broadcast `START` once this many clients are connected at the same time
    pub start_quorum: Option<usize>,
    /// Per-client outbound queue length; frames beyond it are dropped
    pub outbound_capacity: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_HUB_PORT,
            start_quorum: None,
            outbound_capacity: 64,
        }
    }
}

impl HubConfig {
    /// Create from `FALLING_BLOCKS_*` environment variables
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();
        let host = env::var("FALLING_BLOCKS_HOST").unwrap_or(defaults.host);
        let port = env::var("FALLING_BLOCKS_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);
        let start_quorum = env::var("FALLING_BLOCKS_START_QUORUM")
            .ok()
            .and_then(|s| s.trim().parse::<usize>().ok())
            .filter(|&n| n > 0);
        let outbound_capacity = env::var("FALLING_BLOCKS_QUEUE")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(defaults.outbound_capacity);

        Self {
            host,
            port,
            start_quorum,
            outbound_capacity,
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

type Outbound = mpsc::Sender<String>;

/// Shared hub state
struct HubState {
    config: HubConfig,
    clients: Mutex<HashMap<PlayerId, Outbound>>,
    started: AtomicBool,
}

impl HubState {
    fn new(config: HubConfig) -> Self {
        Self {
            config,
            clients: Mutex::new(HashMap::new()),
            started: AtomicBool::new(false),
        }
    }

    /// Insert a client and return how many are now connected
    async fn register(&self, id: PlayerId, tx: Outbound) -> usize {
        let mut clients = self.clients.lock().await;
        clients.insert(id, tx);
        clients.len()
    }

    /// Remove a client; false if it was already gone
    async fn unregister(&self, id: &PlayerId) -> bool {
        self.clients.lock().await.remove(id).is_some()
    }

    async fn snapshot_except(&self, skip: Option<&PlayerId>) -> Vec<(PlayerId, Outbound)> {
        let clients = self.clients.lock().await;
        clients
            .iter()
            .filter(|(id, _)| Some(*id) != skip)
            .map(|(id, tx)| (id.clone(), tx.clone()))
            .collect()
    }

    /// Send `msg` to every client except `from`
    async fn broadcast_except(&self, from: &PlayerId, msg: &Message) {
        let line = msg.to_string();
        for (id, tx) in self.snapshot_except(Some(from)).await {
            deliver(&id, &tx, line.clone());
        }
    }

    async fn broadcast_all(&self, msg: &Message) {
        let line = msg.to_string();
        for (id, tx) in self.snapshot_except(None).await {
            deliver(&id, &tx, line.clone());
        }
    }

    /// Broadcast `START` the first time the quorum is reached
    async fn maybe_start(&self, connected: usize) {
        let Some(quorum) = self.config.start_quorum else {
            return;
        };
        if connected >= quorum && !self.started.swap(true, Ordering::SeqCst) {
            info!(connected, quorum, "start quorum reached");
            self.broadcast_all(&Message::Start).await;
        }
    }
}

fn deliver(id: &PlayerId, tx: &Outbound, line: String) {
    match tx.try_send(line) {
        Ok(()) => {}
        Err(TrySendError::Full(_)) => {
            warn!(player = %id, "outbound queue full, dropping frame");
        }
        Err(TrySendError::Closed(_)) => {
            debug!(player = %id, "outbound queue closed");
        }
    }
}

/// Start the hub
///
/// Binds, reports the bound address on `ready_tx`, then accepts connections
/// until the task is cancelled. Only a bind failure is returned as an error.
pub async fn run_hub(
    config: HubConfig,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let addr = config.bind_addr();
    let listener = TcpListener::bind((config.host.as_str(), config.port))
        .await
        .with_context(|| format!("failed to bind hub on {addr}"))?;
    let bound = listener.local_addr()?;
    info!(%bound, "hub listening");
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let state = Arc::new(HubState::new(config));
    let next_id = AtomicU64::new(0);

    loop {
        let (socket, peer) = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                warn!(error = %e, "accept failed");
                tokio::time::sleep(ACCEPT_BACKOFF).await;
                continue;
            }
        };

        let id = PlayerId::new((next_id.fetch_add(1, Ordering::Relaxed) + 1).to_string());
        info!(player = %id, %peer, "client connected");

        // Registered here so join announcements follow accept order
        let (tx, rx) = mpsc::channel::<String>(state.config.outbound_capacity.max(1));
        let connected = state.register(id.clone(), tx).await;
        state
            .broadcast_except(&id, &Message::PlayerJoined(id.clone()))
            .await;
        state.maybe_start(connected).await;

        let state = Arc::clone(&state);
        tokio::spawn(async move {
            if let Err(e) = handle_client(socket, id.clone(), rx, state).await {
                warn!(player = %id, error = %e, "client error");
            }
            info!(player = %id, "client disconnected");
        });
    }
}

/// Serve one registered connection until it closes
async fn handle_client(
    socket: TcpStream,
    id: PlayerId,
    mut rx: mpsc::Receiver<String>,
    state: Arc<HubState>,
) -> anyhow::Result<()> {
    let (reader, mut writer) = socket.into_split();
    let mut reader = BufReader::new(reader);

    let writer_id = id.clone();
    let write_task = tokio::spawn(async move {
        while let Some(line) = rx.recv().await {
            let result = async {
                writer.write_all(line.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await
            }
            .await;
            if let Err(e) = result {
                debug!(player = %writer_id, error = %e, "write failed");
                break;
            }
        }
    });

    let result = relay_lines(&mut reader, &id, &state).await;

    if state.unregister(&id).await {
        state
            .broadcast_except(&id, &Message::PlayerLeft(id.clone()))
            .await;
    }

    // The registry held the only sender; abort in case the peer stalled mid-write
    write_task.abort();
    let _ = write_task.await;

    result
}

async fn relay_lines(
    reader: &mut BufReader<tokio::net::tcp::OwnedReadHalf>,
    id: &PlayerId,
    state: &HubState,
) -> anyhow::Result<()> {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let bytes_read = reader.read_until(b'\n', &mut buf).await?;
        if bytes_read == 0 {
            return Ok(());
        }

        let line = match std::str::from_utf8(&buf) {
            Ok(line) => line,
            Err(e) => {
                warn!(player = %id, error = %e, "dropping non-UTF-8 line");
                continue;
            }
        };
        let payload = line.trim_end_matches(['\n', '\r']);
        if payload.trim().is_empty() {
            continue;
        }

        let msg = Message::GameState {
            player: id.clone(),
            payload: payload.to_string(),
        };
        state.broadcast_except(id, &msg).await;
    }
}
