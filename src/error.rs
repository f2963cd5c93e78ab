//! Error kinds raised by the material model and the reactor simulator

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ReactorError {
    /// A mutation that the material's kind does not allow (e.g. giving an
    /// auxiliary a product). Raised before any state is touched.
    #[error("invalid operation on '{material}': {reason}")]
    InvalidOperation { material: String, reason: String },

    /// No material with this name is registered.
    #[error("material not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, ReactorError>;
