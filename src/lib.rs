//! Falling Blocks (workspace facade crate).
//!
//! Re-exports the game rules, the wire protocol and the shared vocabulary as
//! `falling_blocks::{core,net,types}`. The implementation lives in dedicated
//! crates under `crates/`.

pub use falling_blocks_core as core;
pub use falling_blocks_net as net;
pub use falling_blocks_types as types;
