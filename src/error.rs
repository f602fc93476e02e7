//! Error types for sqlx-mysql-conn

use thiserror::Error;

/// Errors that may occur while configuring, opening or probing a connection pool.
#[derive(Error, Debug)]
pub enum Error {
   /// Required configuration fields are missing. Raised when the connection
   /// string is generated, never when the configuration is built.
   #[error("invalid mysql configuration: missing {}", .missing.join(", "))]
   InvalidConfiguration { missing: Vec<&'static str> },

   /// A connection string could not be parsed
   #[error("invalid mysql connection string: {0}")]
   InvalidDsn(String),

   /// The driver failed to open a pool from the connection string
   #[error("failed to open mysql connection pool: {0}")]
   ConnectionOpen(#[source] sqlx::Error),

   /// A freshly opened pool failed its first liveness probe and was discarded
   #[error("mysql connection validation failed: {0}")]
   ConnectionValidation(#[source] sqlx::Error),

   /// An established pool failed a liveness probe and has been cleared
   #[error("mysql liveness check failed: {0}")]
   Liveness(#[source] sqlx::Error),

   /// IO error when reading a configuration file
   #[error("IO error: {0}")]
   Io(#[from] std::io::Error),

   /// Malformed JSON configuration
   #[error("JSON error: {0}")]
   Json(#[from] serde_json::Error),
}

impl Error {
   /// Extract a structured error code from the error type.
   pub fn error_code(&self) -> &'static str {
      match self {
         Error::InvalidConfiguration { .. } => "INVALID_CONFIGURATION",
         Error::InvalidDsn(_) => "INVALID_DSN",
         Error::ConnectionOpen(_) => "CONNECTION_OPEN",
         Error::ConnectionValidation(_) => "CONNECTION_VALIDATION",
         Error::Liveness(_) => "LIVENESS",
         Error::Io(_) => "IO_ERROR",
         Error::Json(_) => "JSON_ERROR",
      }
   }
}

/// A type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
