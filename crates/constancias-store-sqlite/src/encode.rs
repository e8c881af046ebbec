//! Encoding and decoding helpers between domain records and the plain
//! column values stored in SQLite.
//!
//! Issue timestamps are stored as `YYYY-MM-DD HH:MM:SS` text in the
//! reference time zone. The `activo` flag is an integer, `1` or `0`.

use chrono::NaiveDateTime;
use constancias_core::record::{
  Certificate, CertificateListing, Course, Instructor, Student,
  ISSUED_AT_FORMAT,
};
use rusqlite::Row;

use crate::{Error, Result};

// ─── Timestamps ──────────────────────────────────────────────────────────────

pub fn encode_issued_at(at: NaiveDateTime) -> String {
  at.format(ISSUED_AT_FORMAT).to_string()
}

pub fn decode_issued_at(s: &str) -> Result<NaiveDateTime> {
  NaiveDateTime::parse_from_str(s, ISSUED_AT_FORMAT)
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Simple rows ─────────────────────────────────────────────────────────────

// Column order for these is always `id, <name column>`.

pub fn instructor_row(row: &Row<'_>) -> rusqlite::Result<Instructor> {
  Ok(Instructor {
    id:   row.get::<_, i64>(0)?.into(),
    name: row.get(1)?,
  })
}

pub fn course_row(row: &Row<'_>) -> rusqlite::Result<Course> {
  Ok(Course {
    id:   row.get::<_, i64>(0)?.into(),
    name: row.get(1)?,
  })
}

pub fn student_row(row: &Row<'_>) -> rusqlite::Result<Student> {
  Ok(Student {
    id:        row.get::<_, i64>(0)?.into(),
    full_name: row.get(1)?,
  })
}

// ─── Certificate rows ────────────────────────────────────────────────────────

/// Raw values read directly from a `constancias` row.
pub struct RawCertificate {
  pub id:            i64,
  pub codigo_unico:  String,
  pub estudiante_id: i64,
  pub curso_id:      i64,
  pub fecha:         String,
  /// NULL in rows written before the column default applied.
  pub activo:        Option<i64>,
}

impl RawCertificate {
  pub const COLUMNS: &'static str =
    "id, codigo_unico, estudiante_id, curso_id, fecha_generacion, activo";

  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:            row.get(0)?,
      codigo_unico:  row.get(1)?,
      estudiante_id: row.get(2)?,
      curso_id:      row.get(3)?,
      fecha:         row.get(4)?,
      activo:        row.get(5)?,
    })
  }

  pub fn into_certificate(self) -> Result<Certificate> {
    Ok(Certificate {
      id:          self.id.into(),
      unique_code: self.codigo_unico,
      student_id:  self.estudiante_id.into(),
      course_id:   self.curso_id.into(),
      issued_at:   decode_issued_at(&self.fecha)?,
      active:      self.activo.unwrap_or(1) != 0,
    })
  }
}

/// Raw values from the active-certificate listing join.
pub struct RawListing {
  pub id:              i64,
  pub codigo_unico:    String,
  pub nombre_completo: String,
  pub curso:           String,
  pub fecha:           String,
}

impl RawListing {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:              row.get(0)?,
      codigo_unico:    row.get(1)?,
      nombre_completo: row.get(2)?,
      curso:           row.get(3)?,
      fecha:           row.get(4)?,
    })
  }

  pub fn into_listing(self) -> Result<CertificateListing> {
    Ok(CertificateListing {
      id:           self.id.into(),
      unique_code:  self.codigo_unico,
      student_name: self.nombre_completo,
      course_name:  self.curso,
      issued_at:    decode_issued_at(&self.fecha)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::*;

  #[test]
  fn issued_at_roundtrips_at_second_precision() {
    let at = NaiveDate::from_ymd_opt(2025, 6, 1)
      .unwrap()
      .and_hms_opt(23, 59, 58)
      .unwrap();
    let s = encode_issued_at(at);
    assert_eq!(s, "2025-06-01 23:59:58");
    assert_eq!(decode_issued_at(&s).unwrap(), at);
  }

  #[test]
  fn malformed_issued_at_is_a_parse_error() {
    let err = decode_issued_at("2025-06-01T23:59:58Z").unwrap_err();
    assert!(matches!(err, Error::DateParse(_)));
  }
}
