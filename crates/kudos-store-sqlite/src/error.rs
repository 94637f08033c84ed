//! Conversions between the driver's error channel and [`kudos_core::Error`].
//!
//! Business errors raised inside a `conn.call` closure are wrapped in
//! [`tokio_rusqlite::Error::Other`] and unwrapped again on the way out, so
//! they cross the store boundary typed. Everything else is an infrastructure
//! fault and becomes [`kudos_core::Error::Storage`].

use kudos_core::Error;

/// Wrap a typed business error for returning out of a `conn.call` closure.
pub(crate) fn domain(err: Error) -> tokio_rusqlite::Error {
  tokio_rusqlite::Error::Other(Box::new(err))
}

/// Recover wrapped business errors; collapse driver errors into `Storage`.
pub(crate) fn to_core(err: tokio_rusqlite::Error) -> Error {
  match err {
    tokio_rusqlite::Error::Other(inner) => match inner.downcast::<Error>() {
      Ok(business) => *business,
      Err(other) => Error::Storage(other.to_string()),
    },
    other => Error::Storage(other.to_string()),
  }
}
