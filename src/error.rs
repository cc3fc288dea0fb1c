//! Construction-time errors
//!
//! Per-step simulation is total; only session setup and file loading fail.

/// Errors surfaced while building or launching a session
#[derive(Debug, thiserror::Error)]
pub enum PlinkoError {
    /// Fewer than two start columns leaves midpoint and parity math undefined
    #[error("Invalid column count {columns}: at least 2 columns are required")]
    InvalidColumnCount { columns: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(&'static str),

    #[error("Start column {column} is outside the board ({columns} columns)")]
    InvalidStartColumn { column: usize, columns: usize },

    #[error("Session has already been launched")]
    AlreadyLaunched,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PlinkoError>;
