//! Application error type.
//!
//! Every fallible operation in the crate returns `Result<_, AppError>`. The
//! binary prints the message and exits with the carried code.

use crate::optimize::OptimizeError;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    /// Invalid input, configuration, or I/O.
    pub const INPUT: u8 = 2;
    /// Numerical failure inside an optimizer.
    pub const NUMERIC: u8 = 3;
    /// Plot rendering failure.
    pub const RENDER: u8 = 4;

    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn input(message: impl Into<String>) -> Self {
        Self::new(Self::INPUT, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<OptimizeError> for AppError {
    fn from(err: OptimizeError) -> Self {
        Self::new(Self::NUMERIC, format!("Optimizer failed: {err}"))
    }
}
