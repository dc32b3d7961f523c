//! Error type for `matchbook-pipeline`.

use thiserror::Error;

/// A pipeline failure: either a domain-rule violation (not-found, merge
/// precondition) or an infrastructure failure bubbled up unchanged from the
/// backing store.
#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Domain(#[from] matchbook_core::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap a backend error without reinterpreting it as a domain error.
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }

  /// The domain-rule violation, if this is one.
  pub fn as_domain(&self) -> Option<&matchbook_core::Error> {
    match self {
      Self::Domain(e) => Some(e),
      Self::Store(_) => None,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
