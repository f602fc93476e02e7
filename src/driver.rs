//! Seams between `ConnectionHandle` and the database library
//!
//! [`Driver`] opens a pool from a connection string and [`DatabasePool`] is the
//! opaque pool handle it returns. [`MySqlDriver`] is the SQLx implementation;
//! other implementations exist mainly so the handle can be tested without a
//! server.

use std::future::Future;
use std::time::Duration;

use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions, MySqlSslMode};
use sqlx::{Connection, Pool};
use tracing::{debug, trace};

use crate::dsn::Dsn;

/// A pool handle that can be probed for liveness and closed.
///
/// Clones must share the same underlying pool.
pub trait DatabasePool: Clone + Send + Sync + 'static {
   /// Round trip to the server over one pooled connection.
   fn ping(&self) -> impl Future<Output = Result<(), sqlx::Error>> + Send;

   /// Close the pool and its connections.
   fn close(&self) -> impl Future<Output = Result<(), sqlx::Error>> + Send;
}

/// Opens pool handles from connection strings.
pub trait Driver: Send + Sync + 'static {
   type Pool: DatabasePool;

   /// Name the driver is registered under (e.g. `mysql`)
   fn name(&self) -> &str;

   /// Open a pool for `connection_string`.
   ///
   /// Opening may be lazy: a successful open says nothing about whether the
   /// server is reachable until the pool is pinged.
   fn open(&self, connection_string: &str) -> Result<Self::Pool, sqlx::Error>;
}

impl DatabasePool for MySqlPool {
   async fn ping(&self) -> Result<(), sqlx::Error> {
      let mut conn = self.acquire().await?;
      conn.ping().await
   }

   async fn close(&self) -> Result<(), sqlx::Error> {
      Pool::close(self).await;
      Ok(())
   }
}

/// SQLx MySQL driver.
///
/// Understands the `tcp` and `unix` methods and these query parameters:
///
/// - `timeout`: duration such as `500ms`, `2s` or `1m30s`, used as the pool's
///   acquire timeout
/// - `charset`, `collation`
/// - `tls`: `true` or `skip-verify` (required), `preferred`, `false` (disabled)
/// - `time_zone`: session time zone
///
/// Other parameters are ignored, including the client-side `loc` and
/// `parseTime`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlDriver;

impl MySqlDriver {
   pub const NAME: &'static str = "mysql";

   /// Translate a connection string into SQLx connect and pool options.
   pub fn options(
      &self,
      connection_string: &str,
   ) -> Result<(MySqlConnectOptions, MySqlPoolOptions), sqlx::Error> {
      let dsn =
         Dsn::parse(connection_string).map_err(|e| sqlx::Error::Configuration(Box::new(e)))?;

      let mut connect = MySqlConnectOptions::new()
         .username(&dsn.user)
         .password(&dsn.password)
         .database(&dsn.schema);

      connect = match dsn.method.as_str() {
         "tcp" => {
            let port: u16 = dsn
               .port
               .parse()
               .map_err(|_| config_error(format!("invalid port '{}'", dsn.port)))?;
            connect.host(&dsn.host).port(port)
         }
         "unix" => connect.socket(&dsn.host),
         other => return Err(config_error(format!("unsupported method '{}'", other))),
      };

      let mut pool = MySqlPoolOptions::new();

      for (key, value) in dsn.params() {
         match key {
            "timeout" => pool = pool.acquire_timeout(parse_duration(value)?),
            "charset" => connect = connect.charset(value),
            "collation" => connect = connect.collation(value),
            "tls" => connect = connect.ssl_mode(parse_ssl_mode(value)?),
            "time_zone" => connect = connect.timezone(Some(value.to_string())),
            _ => debug!(param = key, "Ignoring unsupported connection string parameter"),
         }
      }

      Ok((connect, pool))
   }
}

impl Driver for MySqlDriver {
   type Pool = MySqlPool;

   fn name(&self) -> &str {
      Self::NAME
   }

   fn open(&self, connection_string: &str) -> Result<MySqlPool, sqlx::Error> {
      let (connect, pool) = self.options(connection_string)?;
      trace!("Opening lazy MySQL pool");
      Ok(pool.connect_lazy_with(connect))
   }
}

fn config_error(message: String) -> sqlx::Error {
   sqlx::Error::Configuration(message.into())
}

fn parse_ssl_mode(value: &str) -> Result<MySqlSslMode, sqlx::Error> {
   match value {
      "true" | "skip-verify" => Ok(MySqlSslMode::Required),
      "preferred" => Ok(MySqlSslMode::Preferred),
      "false" => Ok(MySqlSslMode::Disabled),
      other => Err(config_error(format!("invalid tls value '{}'", other))),
   }
}

/// Parse a duration written as a sequence of number/unit pairs (`1m30s`).
///
/// Units: `ms`, `s`, `m`, `h`. Numbers may be fractional.
fn parse_duration(value: &str) -> Result<Duration, sqlx::Error> {
   let invalid = || config_error(format!("invalid duration '{}'", value));

   if value.is_empty() {
      return Err(invalid());
   }

   let mut total = Duration::ZERO;
   let mut rest = value;

   while !rest.is_empty() {
      let number_len = rest
         .find(|c: char| !(c.is_ascii_digit() || c == '.'))
         .unwrap_or(rest.len());
      let (number, tail) = rest.split_at(number_len);

      let unit_len = tail
         .find(|c: char| c.is_ascii_digit() || c == '.')
         .unwrap_or(tail.len());
      let (unit, tail) = tail.split_at(unit_len);

      let number: f64 = number.parse().map_err(|_| invalid())?;
      let seconds = match unit {
         "ms" => number / 1000.0,
         "s" => number,
         "m" => number * 60.0,
         "h" => number * 3600.0,
         _ => return Err(invalid()),
      };

      total += Duration::try_from_secs_f64(seconds).map_err(|_| invalid())?;
      rest = tail;
   }

   Ok(total)
}
