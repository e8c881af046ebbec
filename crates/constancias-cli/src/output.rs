//! Rendering of command results as plain text or JSON on stdout.

use constancias_core::{
  Entity,
  code::display_code,
  record::{Certificate, CertificateListing, Course, Instructor, Student},
};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
  Plain,
  Json,
}

/// Print a list, one line per row in plain mode.
pub fn rows<T: Serialize>(
  format: Format,
  rows: &[T],
  line: impl Fn(&T) -> String,
) -> anyhow::Result<()> {
  match format {
    Format::Json => println!("{}", serde_json::to_string_pretty(rows)?),
    Format::Plain => {
      for row in rows {
        println!("{}", line(row));
      }
    }
  }
  Ok(())
}

/// Print a single record.
pub fn one<T: Serialize>(
  format: Format,
  value: &T,
  render: impl Fn(&T) -> String,
) -> anyhow::Result<()> {
  match format {
    Format::Json => println!("{}", serde_json::to_string_pretty(value)?),
    Format::Plain => println!("{}", render(value)),
  }
  Ok(())
}

/// Acknowledge a write, naming the affected row.
pub fn done(format: Format, action: &str, entity: Entity, id: i64) -> anyhow::Result<()> {
  match format {
    Format::Json => println!(
      "{}",
      serde_json::json!({ "action": action, "entity": entity, "id": id })
    ),
    Format::Plain => println!("{entity} {id} {action}"),
  }
  Ok(())
}

pub fn instructor_line(i: &Instructor) -> String { format!("{:>4}  {}", i.id, i.name) }

pub fn course_line(c: &Course) -> String { format!("{:>4}  {}", c.id, c.name) }

pub fn student_line(s: &Student) -> String { format!("{:>4}  {}", s.id, s.full_name) }

pub fn listing_line(c: &CertificateListing) -> String {
  format!(
    "{:>4}  {}  {}  {}  {}",
    c.id,
    display_code(&c.unique_code),
    c.issued_at.format(constancias_core::record::ISSUED_AT_FORMAT),
    c.student_name,
    c.course_name,
  )
}

pub fn certificate_block(c: &Certificate) -> String {
  format!(
    "id:        {}\ncode:      {}\nstudent:   {}\ncourse:    {}\nissued at: {}\nactive:    {}",
    c.id,
    display_code(&c.unique_code),
    c.student_id,
    c.course_id,
    c.issued_at_display(),
    if c.active { "yes" } else { "no" },
  )
}
