//! Typed records for the four entity kinds and their surrogate ids.
//!
//! Ids are assigned by the store, increase monotonically, and are never
//! reused. Each id kind gets its own newtype so a course id cannot be passed
//! where a student id is expected.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// `strftime` pattern for [`Certificate::issued_at`] as stored on disk.
pub const ISSUED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

macro_rules! surrogate_id {
  ($(#[$meta:meta])* $name:ident) => {
    $(#[$meta])*
    #[derive(
      Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
      Deserialize,
    )]
    #[serde(transparent)]
    pub struct $name(pub i64);

    impl $name {
      pub fn get(self) -> i64 { self.0 }
    }

    impl From<i64> for $name {
      fn from(id: i64) -> Self { Self(id) }
    }

    impl fmt::Display for $name {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
      }
    }
  };
}

surrogate_id!(
  /// Row id in the instructor table.
  InstructorId
);
surrogate_id!(
  /// Row id in the course table.
  CourseId
);
surrogate_id!(
  /// Row id in the student table.
  StudentId
);
surrogate_id!(
  /// Row id in the certificate table.
  CertificateId
);

// ─── Entities ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instructor {
  pub id:   InstructorId,
  pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
  pub id:   CourseId,
  pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
  pub id:        StudentId,
  pub full_name: String,
}

/// An issued certificate ("constancia").
///
/// Certificates are never physically deleted. Deactivating one clears
/// `active`, which hides it from listings but keeps the row for history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certificate {
  pub id:          CertificateId,
  pub unique_code: String,
  pub student_id:  StudentId,
  pub course_id:   CourseId,
  /// Wall-clock time of issue in the reference time zone, second precision.
  pub issued_at:   NaiveDateTime,
  pub active:      bool,
}

impl Certificate {
  /// `issued_at` rendered the way it is stored.
  pub fn issued_at_display(&self) -> String {
    self.issued_at.format(ISSUED_AT_FORMAT).to_string()
  }
}

/// One row of the active-certificate listing, joined with the student's full
/// name and the course name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateListing {
  pub id:           CertificateId,
  pub unique_code:  String,
  pub student_name: String,
  pub course_name:  String,
  pub issued_at:    NaiveDateTime,
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::*;

  #[test]
  fn ids_serialize_as_bare_integers() {
    let json = serde_json::to_string(&CourseId(42)).unwrap();
    assert_eq!(json, "42");
    let back: CourseId = serde_json::from_str(&json).unwrap();
    assert_eq!(back, CourseId::from(42));
  }

  #[test]
  fn id_display_honours_width() {
    assert_eq!(format!("{:>4}", CertificateId(3)), "   3");
    assert_eq!(format!("{:<3}|", StudentId(7)), "7  |");
    assert_eq!(InstructorId(12).to_string(), "12");
  }

  #[test]
  fn issued_at_uses_storage_format() {
    let cert = Certificate {
      id:          CertificateId(1),
      unique_code: "E89C-8C98-C0A4-BFA1".into(),
      student_id:  StudentId(1),
      course_id:   CourseId(1),
      issued_at:   NaiveDate::from_ymd_opt(2025, 3, 9)
        .unwrap()
        .and_hms_opt(7, 5, 0)
        .unwrap(),
      active:      true,
    };
    assert_eq!(cert.issued_at_display(), "2025-03-09 07:05:00");
  }
}
