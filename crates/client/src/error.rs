//! Client error types.

use protocol::ProtocolError;
use thiserror::Error;

/// Errors that prevent the viewer from starting or a message from being used.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Required asset {0:?} not found")]
    MissingAsset(String),

    #[error("Asset {name:?} has unusable dimensions {width}x{height}")]
    EmptyAsset {
        name: String,
        width: u32,
        height: u32,
    },

    #[error("Atlas {0:?} has no frames")]
    EmptyAtlas(String),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
