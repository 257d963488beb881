//! Application error type.
//!
//! Exit codes:
//! - `2`: input, usage or I/O problems (missing dataset/artifact, bad flag values)
//! - `3`: data validation (bad CSV rows, inconsistent artifact)
//! - `4`: internal/runtime failures (non-finite predictions, terminal errors)

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    /// A precondition file does not exist; `hint` names the command that creates it.
    pub fn missing_file(what: &str, path: &std::path::Path, hint: &str) -> Self {
        Self::new(
            2,
            format!("{what} not found at '{}'. {hint}", path.display()),
        )
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
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
