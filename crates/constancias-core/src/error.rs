//! Error types for `constancias-core`.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The kind of record an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Entity {
  Instructor,
  Course,
  Student,
  Certificate,
}

impl fmt::Display for Entity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Entity::Instructor => "instructor",
      Entity::Course => "course",
      Entity::Student => "student",
      Entity::Certificate => "certificate",
    })
  }
}

/// A write rejected because of the data it carried.
///
/// Every variant is user-correctable: the caller should show the message and
/// let the user change their input. Nothing is retried automatically.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstraintViolation {
  /// A unique name or certificate code is already taken.
  #[error("{entity} {value:?} already exists")]
  AlreadyExists { entity: Entity, value: String },

  /// A referenced row does not exist.
  #[error("{entity} {id} does not exist")]
  InvalidReference { entity: Entity, id: i64 },

  #[error("{field} must not be empty")]
  Empty { field: &'static str },
}

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Constraint(#[from] ConstraintViolation),

  /// An update or delete addressed an id that matches no row.
  #[error("{entity} {id} not found")]
  NotFound { entity: Entity, id: i64 },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Trim `value` and reject it if nothing is left.
pub fn non_empty<'a>(
  field: &'static str,
  value: &'a str,
) -> Result<&'a str, ConstraintViolation> {
  let trimmed = value.trim();
  if trimmed.is_empty() {
    return Err(ConstraintViolation::Empty { field });
  }
  Ok(trimmed)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn non_empty_trims_surrounding_whitespace() {
    assert_eq!(non_empty("name", "  Ana \n").unwrap(), "Ana");
  }

  #[test]
  fn non_empty_rejects_blank_input() {
    let err = non_empty("course name", "   ").unwrap_err();
    assert_eq!(err, ConstraintViolation::Empty { field: "course name" });
    assert_eq!(err.to_string(), "course name must not be empty");
  }

  #[test]
  fn violation_messages_name_the_entity() {
    let dup = ConstraintViolation::AlreadyExists {
      entity: Entity::Instructor,
      value:  "Ana".into(),
    };
    assert_eq!(dup.to_string(), "instructor \"Ana\" already exists");

    let missing = ConstraintViolation::InvalidReference {
      entity: Entity::Course,
      id:     7,
    };
    assert_eq!(missing.to_string(), "course 7 does not exist");
  }
}
