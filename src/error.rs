//! Error taxonomy for the engine.
//!
//! Decode failures never appear here: an undecodable frame renders as empty
//! and playback continues. What does surface as an error is anything the
//! player cannot meaningfully continue through, surface lifecycle failures
//! above all.

use std::path::PathBuf;

use thiserror::Error;

/// Surface lifecycle failure reported by a `SurfaceFactory`. These indicate
/// environment-level problems (resource exhaustion, a dead display
/// connection) and are propagated, never retried.
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("surface limit reached: {live} surfaces live")]
    Exhausted { live: usize },
    #[error("stale surface handle {0}")]
    StaleHandle(u64),
    #[error("surface backend failure: {0}")]
    Backend(String),
}

/// Top-level playback failure.
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("no playable image files found in {0}")]
    EmptyPlaylist(PathBuf),
    #[error("failed to scan playlist folder {path}")]
    PlaylistScan {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error(transparent)]
    Surface(#[from] SurfaceError),
    #[error("frame decomposition task failed")]
    FrameTask(#[from] tokio::task::JoinError),
}
