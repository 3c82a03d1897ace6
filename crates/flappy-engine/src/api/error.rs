use thiserror::Error;

use crate::api::types::LoadTicket;

/// Errors surfaced by the engine's asset pipeline and configuration parsing.
///
/// None of these are fatal: the engine stays stoppable and resettable after any of them.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A `LoadRequest` was malformed (no assets, empty src, zero amount, ...).
    #[error("Invalid load request: {0}")]
    InvalidRequest(String),

    /// An image source failed to fetch or decode.
    #[error("Failed to load asset '{src}' ({ticket}): {reason}")]
    AssetLoad {
        ticket: LoadTicket,
        src: String,
        reason: String,
    },

    /// The host reported a result for a ticket that is not in flight.
    #[error("Unknown load ticket {0}")]
    UnknownTicket(LoadTicket),

    /// A host tried to enter the engine while it was already running a callback.
    #[error("Engine is busy running another callback")]
    Busy,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image decode error: {0}")]
    Decode(#[from] image::ImageError),
}

pub type EngineResult<T> = Result<T, EngineError>;
