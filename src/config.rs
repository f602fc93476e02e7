//! Configuration for a MySQL connection handle

use std::path::Path;

use serde::Deserialize;

use crate::dsn::Dsn;
use crate::{Error, Result};

/// Credentials and address of a MySQL database.
///
/// No defaults are applied and nothing is checked until the connection string
/// is generated, so a partially filled configuration can be built freely.
///
/// # Examples
///
/// ```
/// use sqlx_mysql_conn::MySqlConfig;
///
/// let config = MySqlConfig {
///     user: "root".into(),
///     password: "password".into(),
///     method: "tcp".into(),
///     host: "127.0.0.1".into(),
///     port: "3306".into(),
///     schema: "schema".into(),
///     query: Some("timeout=2s&parseTime=true".into()),
/// };
///
/// assert_eq!(
///     config.connection_string().unwrap(),
///     "root:password@tcp(127.0.0.1:3306)/schema?timeout=2s&parseTime=true"
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MySqlConfig {
   pub user: String,
   pub password: String,

   /// Transport, `tcp` or `unix`
   pub method: String,

   /// Host name or address, or the socket path when `method` is `unix`
   pub host: String,
   pub port: String,
   pub schema: String,

   /// Raw query-string suffix, appended after `?` (e.g. `timeout=2s`)
   pub query: Option<String>,
}

impl MySqlConfig {
   /// Parse a configuration from a JSON document.
   pub fn from_json(json: &str) -> Result<Self> {
      Ok(serde_json::from_str(json)?)
   }

   /// Read and parse a JSON configuration file.
   pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
      let contents = std::fs::read_to_string(path)?;
      Self::from_json(&contents)
   }

   /// Check that every field needed to build a connection string is present.
   ///
   /// User and password are required, as are both method and host, and both
   /// port and schema.
   pub fn validate(&self) -> Result<()> {
      let missing: Vec<&'static str> = [
         ("user", &self.user),
         ("password", &self.password),
         ("method", &self.method),
         ("host", &self.host),
         ("port", &self.port),
         ("schema", &self.schema),
      ]
      .into_iter()
      .filter(|(_, value)| value.is_empty())
      .map(|(name, _)| name)
      .collect();

      if missing.is_empty() {
         Ok(())
      } else {
         Err(Error::InvalidConfiguration { missing })
      }
   }

   /// Validate and render the connection string.
   ///
   /// This does not cache; `ConnectionHandle` caches the result per instance.
   pub fn connection_string(&self) -> Result<String> {
      self.validate()?;
      Ok(Dsn::from(self).to_string())
   }
}

impl From<&MySqlConfig> for Dsn {
   fn from(config: &MySqlConfig) -> Self {
      Self {
         user: config.user.clone(),
         password: config.password.clone(),
         method: config.method.clone(),
         host: config.host.clone(),
         port: config.port.clone(),
         schema: config.schema.clone(),
         query: config.query.clone(),
      }
   }
}
