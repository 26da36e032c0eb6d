use std::fmt;

/// Errors surfaced to callers of the local endpoints and bridge constructors.
///
/// Remote failures never show up here; the background loops log them and
/// move on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    /// Send on a write endpoint that has been closed.
    QueueClosed,
    /// Non-blocking send on a full write buffer.
    QueueFull,
    InvalidConfig(String),
    Internal(String), // for any custom internal errors
}

impl std::error::Error for BridgeError {}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BridgeError::QueueClosed => write!(f, "send on closed queue"),
            BridgeError::QueueFull => write!(f, "Queue is full"),
            BridgeError::InvalidConfig(msg) => write!(f, "Invalid config: {msg}"),
            BridgeError::Internal(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

/// Failure of a single remote list operation.
///
/// An empty list is not an error: pops report it as an empty batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Connection, IO or protocol level failure. Outcome unknown.
    Transport(String),
    /// The store answered and refused the command.
    Rejected(String),
}

impl StoreError {
    pub fn is_rejected(&self) -> bool {
        matches!(self, StoreError::Rejected(_))
    }
}

impl std::error::Error for StoreError {}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Transport(msg) => write!(f, "Store transport error: {msg}"),
            StoreError::Rejected(msg) => write!(f, "Store rejected command: {msg}"),
        }
    }
}
