//! Link module - sync bridge between a blocking game loop and the async client

use anyhow::Context;
use tokio::runtime::Runtime;
use tokio::sync::mpsc;

use falling_blocks_core::Board;

use crate::client::{ClientConfig, MessageHandler, NetClient, OpponentMap};
use crate::protocol::PlayerId;

/// Hub event delivered to the game loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetEvent {
    Started,
    PlayerJoined(PlayerId),
    PlayerLeft(PlayerId),
    /// A new board for this player is in the opponent cache
    BoardUpdated(PlayerId),
    Disconnected,
}

/// Handler that forwards every callback as a [`NetEvent`]
pub struct EventForwarder {
    tx: mpsc::UnboundedSender<NetEvent>,
}

impl EventForwarder {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<NetEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn forward(&self, event: NetEvent) {
        let _ = self.tx.send(event);
    }
}

impl MessageHandler for EventForwarder {
    fn on_start(&self) {
        self.forward(NetEvent::Started);
    }

    fn on_player_joined(&self, player: &PlayerId) {
        self.forward(NetEvent::PlayerJoined(player.clone()));
    }

    fn on_player_left(&self, player: &PlayerId) {
        self.forward(NetEvent::PlayerLeft(player.clone()));
    }

    fn on_game_state(&self, player: &PlayerId, _board: &Board) {
        self.forward(NetEvent::BoardUpdated(player.clone()));
    }

    fn on_disconnected(&self) {
        self.forward(NetEvent::Disconnected);
    }
}

/// Running client plus the runtime that drives it
pub struct NetLink {
    client: NetClient,
    events: mpsc::UnboundedReceiver<NetEvent>,
    // Dropped last so the client's tasks are aborted on a live runtime
    _rt: Runtime,
}

impl NetLink {
    /// Connect to the hub, blocking until the connection is up
    pub fn connect(config: &ClientConfig) -> anyhow::Result<Self> {
        let rt = Runtime::new().context("failed to create tokio runtime")?;
        let (handler, events) = EventForwarder::channel();
        let client = rt.block_on(NetClient::connect(config, handler))?;

        Ok(Self {
            client,
            events,
            _rt: rt,
        })
    }

    pub fn send_board(&self, board: &Board) -> bool {
        self.client.send_board(board)
    }

    /// Drain every event received since the last poll
    pub fn poll_events(&mut self) -> Vec<NetEvent> {
        let mut out = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            out.push(event);
        }
        out
    }

    pub fn opponents(&self) -> OpponentMap {
        self.client.opponents()
    }

    pub fn is_connected(&self) -> bool {
        self.client.is_connected()
    }

    pub fn disconnect(&self) {
        self.client.disconnect();
    }
}
