//! Networking for multiplayer sessions
//!
//! Clients hold one TCP connection each to a broadcast hub and exchange
//! newline-delimited text. Each client periodically sends its whole board;
//! the hub relays it to everyone else tagged with the sender's id.
//!
//! - [`protocol`]: message and board payload codec
//! - [`hub`]: the relay server
//! - [`client`]: async connection with an opponent board cache
//! - [`link`]: blocking wrapper for synchronous game loops

pub mod client;
pub mod hub;
pub mod link;
pub mod protocol;

pub use client::{ClientConfig, MessageHandler, NetClient, OpponentBoard, OpponentMap};
pub use hub::{run_hub, HubConfig};
pub use link::{EventForwarder, NetEvent, NetLink};
pub use protocol::{decode_board, encode_board, Message, PlayerId, ProtocolError};
