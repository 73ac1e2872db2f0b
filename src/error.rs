use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or schema-violating song file. The load is aborted and
    /// player state is unchanged.
    #[error("invalid song format: {0}")]
    InvalidFormat(String),

    /// A save was requested with zero captured events.
    #[error("no recording to save")]
    EmptyRecording,

    /// Audio device or stream setup failure.
    #[error("audio: {0}")]
    Audio(String),

    /// Raw mode / alternate screen failure in live mode.
    #[error("terminal: {0}")]
    Terminal(String),

    #[error("serializing recording: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
