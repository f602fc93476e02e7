//! MySQL connection strings in the `user:password@method(host:port)/schema?query` form

use std::fmt;

use crate::{Error, Result};

/// A connection string split into its parts.
///
/// # Examples
///
/// ```
/// use sqlx_mysql_conn::Dsn;
///
/// let dsn = Dsn::parse("root:password@tcp(127.0.0.1:3306)/schema?timeout=2s").unwrap();
/// assert_eq!(dsn.host, "127.0.0.1");
/// assert_eq!(dsn.query.as_deref(), Some("timeout=2s"));
/// assert_eq!(
///    dsn.to_string(),
///    "root:password@tcp(127.0.0.1:3306)/schema?timeout=2s"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dsn {
   pub user: String,
   pub password: String,
   pub method: String,
   pub host: String,
   pub port: String,
   pub schema: String,
   pub query: Option<String>,
}

impl Dsn {
   /// Parse a connection string.
   ///
   /// The credentials end at the last `@` that is followed by a well-formed
   /// `method(address)/schema`, so both the password and the query may
   /// contain `@`. The first `:` in the credentials ends the user, and inside
   /// the address the last `:` starts the port.
   pub fn parse(s: &str) -> Result<Self> {
      let mut last_err = Error::InvalidDsn("missing '@' after credentials".into());

      for (at, _) in s.rmatch_indices('@') {
         match Self::parse_location(&s[at + 1..]) {
            Ok(mut dsn) => {
               let credentials = &s[..at];
               let (user, password) = credentials.split_once(':').unwrap_or((credentials, ""));
               dsn.user = user.to_string();
               dsn.password = password.to_string();
               return Ok(dsn);
            }
            Err(e) => last_err = e,
         }
      }

      Err(last_err)
   }

   /// Parse everything after the credentials: `method(host:port)/schema?query`.
   fn parse_location(s: &str) -> Result<Self> {
      let (method, rest) = s
         .split_once('(')
         .ok_or_else(|| Error::InvalidDsn("missing '(' after method".into()))?;

      if !method.chars().all(|c| c.is_ascii_alphanumeric()) {
         return Err(Error::InvalidDsn(format!("invalid method '{}'", method)));
      }

      let (address, rest) = rest
         .split_once(')')
         .ok_or_else(|| Error::InvalidDsn("unterminated address".into()))?;

      let (host, port) = address.rsplit_once(':').unwrap_or((address, ""));

      let rest = rest
         .strip_prefix('/')
         .ok_or_else(|| Error::InvalidDsn("missing '/' before schema".into()))?;

      let (schema, query) = match rest.split_once('?') {
         Some((schema, query)) => (schema, Some(query.to_string())),
         None => (rest, None),
      };

      Ok(Self {
         user: String::new(),
         password: String::new(),
         method: method.to_string(),
         host: host.to_string(),
         port: port.to_string(),
         schema: schema.to_string(),
         query,
      })
   }

   /// Iterate the `key=value` pairs of the query suffix.
   ///
   /// A pair without `=` yields an empty value.
   pub fn params(&self) -> impl Iterator<Item = (&str, &str)> {
      self
         .query
         .as_deref()
         .unwrap_or_default()
         .split('&')
         .filter(|pair| !pair.is_empty())
         .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
   }
}

impl fmt::Display for Dsn {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      write!(
         f,
         "{}:{}@{}({}:{})/{}",
         self.user, self.password, self.method, self.host, self.port, self.schema
      )?;

      if let Some(query) = &self.query {
         write!(f, "?{}", query)?;
      }

      Ok(())
   }
}
