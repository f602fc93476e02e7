//! Lazily connected, liveness-checked pool handle

use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::config::MySqlConfig;
use crate::driver::{DatabasePool, Driver, MySqlDriver};
use crate::{Error, Result};

/// Handle to a connection pool that is opened on first use.
///
/// ## State Management
///
/// - **`connection_string`**: generated from the configuration at most once per
///   handle and kept even when the pool is cleared
/// - **`pool`**: absent until the first [`db`](Self::db) or
///   [`ping`](Self::ping), then a pool that passed its latest liveness probe.
///   A failed probe clears only the pool it probed, never one installed by
///   [`set_db`](Self::set_db) or a reconnect in the meantime
///
/// Both live behind one reader/writer lock. Connecting holds the write lock for
/// the whole generate/open/probe/assign sequence, so concurrent first callers
/// wait for a single connection attempt and then share its pool.
///
/// ## Usage Pattern
///
/// ```text
/// 1. Build a MySqlConfig and wrap it in a ConnectionHandle
/// 2. Call db() wherever a pool is needed (connects on first call)
/// 3. Call ping() to check liveness; a failure clears the pool and the next
///    db()/ping() reconnects
/// ```
pub struct ConnectionHandle<D: Driver = MySqlDriver> {
   config: MySqlConfig,
   driver: D,
   state: RwLock<HandleState<D::Pool>>,
}

struct HandleState<P> {
   connection_string: Option<String>,
   pool: Option<P>,
   /// Bumped whenever a pool is installed
   generation: u64,
}

impl<P> HandleState<P> {
   fn install(&mut self, pool: P) {
      self.pool = Some(pool);
      self.generation += 1;
   }
}

impl ConnectionHandle<MySqlDriver> {
   /// Create a handle backed by the SQLx MySQL driver. Does not connect.
   pub fn new(config: MySqlConfig) -> Self {
      Self::with_driver(config, MySqlDriver)
   }
}

impl<D: Driver> ConnectionHandle<D> {
   /// Create a handle that opens pools through `driver`. Does not connect.
   pub fn with_driver(config: MySqlConfig, driver: D) -> Self {
      Self {
         config,
         driver,
         state: RwLock::new(HandleState {
            connection_string: None,
            pool: None,
            generation: 0,
         }),
      }
   }

   pub fn config(&self) -> &MySqlConfig {
      &self.config
   }

   pub fn driver(&self) -> &D {
      &self.driver
   }

   /// Get the pool, connecting first if no pool is held.
   ///
   /// The returned pool shares its connections with every other caller.
   pub async fn db(&self) -> Result<D::Pool> {
      if let Some(pool) = self.state.read().await.pool.clone() {
         return Ok(pool);
      }

      self.connect().await
   }

   /// Replace the pool without generating a connection string or probing.
   ///
   /// Meant for tests and overrides; the caller vouches for `pool`.
   pub async fn set_db(&self, pool: D::Pool) {
      self.state.write().await.install(pool);
   }

   /// Probe the pool, connecting first if no pool is held.
   ///
   /// On failure the pool is cleared so the next [`db`](Self::db) or `ping`
   /// opens a new one, and [`Error::Liveness`] is returned.
   pub async fn ping(&self) -> Result<()> {
      if !self.is_connected().await {
         self.connect().await?;
      }

      let (probe, probed_generation) = {
         let state = self.state.read().await;
         match &state.pool {
            Some(pool) => (pool.ping().await, state.generation),
            // Cleared by a concurrent failed ping
            None => return Err(Error::Liveness(sqlx::Error::PoolClosed)),
         }
      };

      if let Err(e) = probe {
         let mut state = self.state.write().await;

         // Only clear the pool that was probed, not one installed since
         if state.generation == probed_generation {
            state.pool = None;
            warn!(
               host = %self.config.host,
               schema = %self.config.schema,
               error = %e,
               "Liveness probe failed, pool cleared"
            );
         } else {
            debug!(error = %e, "Liveness probe failed on a pool that was already replaced");
         }

         return Err(Error::Liveness(e));
      }

      Ok(())
   }

   /// Whether a pool is currently held.
   pub async fn is_connected(&self) -> bool {
      self.state.read().await.pool.is_some()
   }

   /// Get the connection string, generating and caching it on first call.
   pub async fn connection_string(&self) -> Result<String> {
      if let Some(cached) = self.state.read().await.connection_string.clone() {
         return Ok(cached);
      }

      let mut state = self.state.write().await;
      Self::ensure_connection_string(&self.config, &mut state).map(str::to_owned)
   }

   fn ensure_connection_string<'a>(
      config: &MySqlConfig,
      state: &'a mut HandleState<D::Pool>,
   ) -> Result<&'a str> {
      if state.connection_string.is_none() {
         state.connection_string = Some(config.connection_string()?);
      }

      Ok(state.connection_string.as_deref().unwrap_or_default())
   }

   /// Open and validate a new pool under the write lock.
   async fn connect(&self) -> Result<D::Pool> {
      let mut state = self.state.write().await;

      // Another caller may have connected while we waited for the lock
      if let Some(pool) = &state.pool {
         return Ok(pool.clone());
      }

      let connection_string = Self::ensure_connection_string(&self.config, &mut state)?;

      debug!(
         driver = self.driver.name(),
         method = %self.config.method,
         host = %self.config.host,
         port = %self.config.port,
         schema = %self.config.schema,
         "Opening connection pool"
      );

      let pool = self
         .driver
         .open(connection_string)
         .map_err(Error::ConnectionOpen)?;

      if let Err(e) = pool.ping().await {
         if let Err(close_err) = pool.close().await {
            warn!(error = %close_err, "Failed to close pool that failed validation");
         }

         return Err(Error::ConnectionValidation(e));
      }

      state.install(pool.clone());
      debug!(host = %self.config.host, schema = %self.config.schema, "Connection pool ready");

      Ok(pool)
   }
}
