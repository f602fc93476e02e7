//! # sqlx-mysql-conn
//!
//! A lazily initialized handle to a MySQL connection pool built on SQLx.
//!
//! ## Core Types
//!
//! - **[`ConnectionHandle`]**: Opens the pool on first use and checks its liveness
//! - **[`MySqlConfig`]**: Credentials and address the connection string is built from
//! - **[`Dsn`]**: The `user:password@method(host:port)/schema?query` connection string
//! - **[`Driver`]** / **[`DatabasePool`]**: Seams to the database library, with
//!   [`MySqlDriver`] as the SQLx implementation
//! - **[`Error`]**: Error type for configuration, connection and liveness failures
//!
//! ## Behavior
//!
//! - **Lazy connect**: Nothing touches the network until [`ConnectionHandle::db`]
//!   or [`ConnectionHandle::ping`] is first called
//! - **Validated pools only**: A freshly opened pool is pinged before it is kept
//! - **Liveness invalidation**: A failed ping drops the pool; the next call reconnects
//! - **No retries**: Every failure is returned to the caller as an [`Error`]
//!
//! ## Example
//!
//! ```no_run
//! use sqlx_mysql_conn::{ConnectionHandle, MySqlConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!    let handle = ConnectionHandle::new(MySqlConfig::from_json_file("mysql.json")?);
//!
//!    let pool = handle.db().await?;
//!    sqlx::query("SELECT 1").execute(&pool).await?;
//!
//!    handle.ping().await?;
//!    Ok(())
//! }
//! ```

mod config;
mod driver;
mod dsn;
mod error;
mod handle;

// Re-export public types
pub use config::MySqlConfig;
pub use driver::{DatabasePool, Driver, MySqlDriver};
pub use dsn::Dsn;
pub use error::{Error, Result};
pub use handle::ConnectionHandle;
