//! Error type for `constancias-store-sqlite`.

use constancias_core::{ConstraintViolation, Entity};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Constraint violations and missing rows; see [`constancias_core::Error`].
  #[error(transparent)]
  Core(#[from] constancias_core::Error),

  #[error("database error: {0}")]
  Database(#[from] rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),
}

impl Error {
  pub(crate) fn not_found(entity: Entity, id: i64) -> Self {
    Self::Core(constancias_core::Error::NotFound { entity, id })
  }

  /// The violation behind this error, if it was caused by user input.
  pub fn constraint_violation(&self) -> Option<&ConstraintViolation> {
    match self {
      Self::Core(constancias_core::Error::Constraint(v)) => Some(v),
      _ => None,
    }
  }

  pub fn is_constraint_violation(&self) -> bool {
    self.constraint_violation().is_some()
  }

  pub fn is_not_found(&self) -> bool {
    matches!(self, Self::Core(constancias_core::Error::NotFound { .. }))
  }
}

impl From<ConstraintViolation> for Error {
  fn from(v: ConstraintViolation) -> Self {
    Self::Core(constancias_core::Error::Constraint(v))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
