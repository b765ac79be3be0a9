//! Shared protocol crate for the arena viewer.
//!
//! This crate contains:
//! - The typed arena snapshot streamed by the battle server
//! - The columnar (struct-of-arrays) wire codec
//! - Text message decoding

pub mod columnar;
mod error;
mod snapshot;

pub use columnar::{decode, encode};
pub use error::ProtocolError;
pub use snapshot::{
    ARENA_HEIGHT, ARENA_WIDTH, ArenaSnapshot, Missile, Position, Robot, decode_snapshot,
};
