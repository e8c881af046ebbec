//! [`SqliteStore`] — the SQLite implementation of [`CertificateStore`].

use std::path::Path;

use chrono::{DateTime, TimeDelta};
use chrono_tz::Tz;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension as _};

use constancias_core::{
  code,
  error::non_empty,
  record::{
    Certificate, CertificateId, CertificateListing, Course, CourseId,
    Instructor, InstructorId, Student, StudentId,
  },
  store::CertificateStore,
  ConstraintViolation, Entity,
};

use crate::{
  encode::{
    course_row, encode_issued_at, instructor_row, student_row, RawCertificate,
    RawListing,
  },
  schema::SCHEMA,
  Error, Result,
};

/// How many codes [`CertificateStore::issue_certificate`] tries before giving
/// up on a collision.
pub const MAX_ISSUE_ATTEMPTS: u32 = 5;

// ─── Store ───────────────────────────────────────────────────────────────────

/// A certificate store backed by a single SQLite file.
///
/// The connection is opened once and owned for the life of the value. Call
/// [`SqliteStore::close`] to shut down explicitly and observe any error;
/// dropping the store closes it too.
pub struct SqliteStore {
  pub(crate) conn: Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let conn = Connection::open(path)?;
    let store = Self::init(conn)?;
    tracing::debug!(path = %path.display(), "opened certificate store");
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub fn open_in_memory() -> Result<Self> { Self::init(Connection::open_in_memory()?) }

  fn init(conn: Connection) -> Result<Self> {
    conn.execute_batch(SCHEMA)?;
    Ok(Self { conn })
  }

  /// Close the underlying connection, surfacing any error SQLite reports.
  pub fn close(self) -> Result<()> {
    self.conn.close().map_err(|(_, e)| Error::Database(e))
  }

  fn certificate_where(
    &self,
    clause: &str,
    params: impl rusqlite::Params,
  ) -> Result<Option<Certificate>> {
    let sql = format!(
      "SELECT {} FROM constancias WHERE {clause}",
      RawCertificate::COLUMNS
    );
    let raw = self
      .conn
      .query_row(&sql, params, RawCertificate::from_row)
      .optional()?;
    raw.map(RawCertificate::into_certificate).transpose()
  }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
  match err {
    rusqlite::Error::SqliteFailure(code, message) => {
      code.code == ErrorCode::ConstraintViolation
        || message.as_deref().is_some_and(|m| {
          m.contains("UNIQUE constraint failed")
            || m.contains("PRIMARY KEY constraint failed")
        })
    }
    _ => false,
  }
}

/// Translate a unique-constraint failure into `AlreadyExists`; pass anything
/// else through as a storage error.
fn map_duplicate(err: rusqlite::Error, entity: Entity, value: &str) -> Error {
  if is_constraint_violation(&err) {
    return ConstraintViolation::AlreadyExists {
      entity,
      value: value.to_owned(),
    }
    .into();
  }
  Error::Database(err)
}

/// `NotFound` when a keyed update or delete touched nothing.
fn require_affected(rows: usize, entity: Entity, id: i64) -> Result<()> {
  if rows == 0 {
    return Err(Error::not_found(entity, id));
  }
  Ok(())
}

/// `InvalidReference` unless `table` has a row with `id`.
fn require_row(
  conn: &Connection,
  table: &'static str,
  entity: Entity,
  id: i64,
) -> Result<()> {
  let exists = conn
    .query_row(
      &format!("SELECT 1 FROM {table} WHERE id = ?1"),
      params![id],
      |_| Ok(()),
    )
    .optional()?
    .is_some();
  if !exists {
    return Err(ConstraintViolation::InvalidReference { entity, id }.into());
  }
  Ok(())
}

/// Sorted, duplicate-free copy of `ids`; join tables reject repeated pairs.
fn distinct<T: Copy + Ord>(ids: &[T]) -> Vec<T> {
  let mut ids = ids.to_vec();
  ids.sort_unstable();
  ids.dedup();
  ids
}

fn link_course_instructors(
  conn: &Connection,
  course_id: CourseId,
  instructor_ids: &[InstructorId],
) -> Result<()> {
  for instructor_id in distinct(instructor_ids) {
    require_row(conn, "instructores", Entity::Instructor, instructor_id.get())?;
    conn.execute(
      "INSERT INTO cursos_instructores (curso_id, instructor_id) VALUES (?1, ?2)",
      params![course_id.get(), instructor_id.get()],
    )?;
  }
  Ok(())
}

fn link_student_courses(
  conn: &Connection,
  student_id: StudentId,
  course_ids: &[CourseId],
) -> Result<()> {
  for course_id in distinct(course_ids) {
    require_row(conn, "cursos", Entity::Course, course_id.get())?;
    conn.execute(
      "INSERT INTO estudiantes_cursos (estudiante_id, curso_id) VALUES (?1, ?2)",
      params![student_id.get(), course_id.get()],
    )?;
  }
  Ok(())
}

/// Trimmed, upper-cased certificate code. Generated codes are upper-case
/// hex, so this keeps hand-entered codes in the same space.
fn normalise_code(raw: &str) -> Result<String> {
  Ok(non_empty("certificate code", raw)?.to_ascii_uppercase())
}

/// `AlreadyExists` if another certificate holds `code` in any letter case.
/// Catches mixed-case rows written before codes were normalised.
fn require_code_free(
  conn: &Connection,
  code: &str,
  except: Option<CertificateId>,
) -> Result<()> {
  let taken = conn
    .query_row(
      "SELECT 1 FROM constancias
       WHERE codigo_unico = ?1 COLLATE NOCASE AND id IS NOT ?2",
      params![code, except.map(CertificateId::get)],
      |_| Ok(()),
    )
    .optional()?
    .is_some();
  if taken {
    return Err(
      ConstraintViolation::AlreadyExists {
        entity: Entity::Certificate,
        value:  code.to_owned(),
      }
      .into(),
    );
  }
  Ok(())
}

fn is_code_collision(err: &Error) -> bool {
  matches!(
    err.constraint_violation(),
    Some(ConstraintViolation::AlreadyExists { entity: Entity::Certificate, .. })
  )
}

// ─── CertificateStore impl ───────────────────────────────────────────────────

impl CertificateStore for SqliteStore {
  type Error = Error;

  // ── Instructors ───────────────────────────────────────────────────────────

  fn list_instructors(&self) -> Result<Vec<Instructor>> {
    let mut stmt = self
      .conn
      .prepare("SELECT id, nombre FROM instructores ORDER BY nombre")?;
    let rows = stmt
      .query_map([], instructor_row)?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
  }

  fn get_instructor(&self, id: InstructorId) -> Result<Option<Instructor>> {
    Ok(
      self
        .conn
        .query_row(
          "SELECT id, nombre FROM instructores WHERE id = ?1",
          params![id.get()],
          instructor_row,
        )
        .optional()?,
    )
  }

  fn create_instructor(&mut self, name: &str) -> Result<InstructorId> {
    let name = non_empty("instructor name", name)?;
    self
      .conn
      .execute("INSERT INTO instructores (nombre) VALUES (?1)", params![name])
      .map_err(|e| map_duplicate(e, Entity::Instructor, name))?;
    let id = InstructorId(self.conn.last_insert_rowid());
    tracing::info!(%id, name, "instructor created");
    Ok(id)
  }

  fn update_instructor(&mut self, id: InstructorId, name: &str) -> Result<()> {
    let name = non_empty("instructor name", name)?;
    let rows = self
      .conn
      .execute(
        "UPDATE instructores SET nombre = ?1 WHERE id = ?2",
        params![name, id.get()],
      )
      .map_err(|e| map_duplicate(e, Entity::Instructor, name))?;
    require_affected(rows, Entity::Instructor, id.get())?;
    tracing::info!(%id, name, "instructor renamed");
    Ok(())
  }

  fn delete_instructor(&mut self, id: InstructorId) -> Result<()> {
    let rows = self
      .conn
      .execute("DELETE FROM instructores WHERE id = ?1", params![id.get()])?;
    require_affected(rows, Entity::Instructor, id.get())?;

    let dangling: i64 = self.conn.query_row(
      "SELECT COUNT(*) FROM cursos_instructores WHERE instructor_id = ?1",
      params![id.get()],
      |r| r.get(0),
    )?;
    if dangling > 0 {
      tracing::warn!(%id, dangling, "instructor deleted; course links left in place");
    }
    tracing::info!(%id, "instructor deleted");
    Ok(())
  }

  // ── Courses ───────────────────────────────────────────────────────────────

  fn list_courses(&self) -> Result<Vec<Course>> {
    let mut stmt = self
      .conn
      .prepare("SELECT id, nombre FROM cursos ORDER BY nombre")?;
    let rows = stmt
      .query_map([], course_row)?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
  }

  fn get_course(&self, id: CourseId) -> Result<Option<Course>> {
    Ok(
      self
        .conn
        .query_row(
          "SELECT id, nombre FROM cursos WHERE id = ?1",
          params![id.get()],
          course_row,
        )
        .optional()?,
    )
  }

  fn create_course(
    &mut self,
    name: &str,
    instructor_ids: &[InstructorId],
  ) -> Result<CourseId> {
    let name = non_empty("course name", name)?;

    let tx = self.conn.transaction()?;
    tx.execute("INSERT INTO cursos (nombre) VALUES (?1)", params![name])
      .map_err(|e| map_duplicate(e, Entity::Course, name))?;
    let id = CourseId(tx.last_insert_rowid());
    link_course_instructors(&tx, id, instructor_ids)?;
    tx.commit()?;

    tracing::info!(%id, name, instructors = instructor_ids.len(), "course created");
    Ok(id)
  }

  fn update_course(
    &mut self,
    id: CourseId,
    name: &str,
    instructor_ids: &[InstructorId],
  ) -> Result<()> {
    let name = non_empty("course name", name)?;

    let tx = self.conn.transaction()?;
    let rows = tx
      .execute(
        "UPDATE cursos SET nombre = ?1 WHERE id = ?2",
        params![name, id.get()],
      )
      .map_err(|e| map_duplicate(e, Entity::Course, name))?;
    require_affected(rows, Entity::Course, id.get())?;
    tx.execute(
      "DELETE FROM cursos_instructores WHERE curso_id = ?1",
      params![id.get()],
    )?;
    link_course_instructors(&tx, id, instructor_ids)?;
    tx.commit()?;

    tracing::info!(%id, name, instructors = instructor_ids.len(), "course updated");
    Ok(())
  }

  fn delete_course(&mut self, id: CourseId) -> Result<()> {
    let tx = self.conn.transaction()?;
    tx.execute(
      "DELETE FROM cursos_instructores WHERE curso_id = ?1",
      params![id.get()],
    )?;
    let rows = tx.execute("DELETE FROM cursos WHERE id = ?1", params![id.get()])?;
    require_affected(rows, Entity::Course, id.get())?;
    tx.commit()?;

    tracing::info!(%id, "course deleted");
    Ok(())
  }

  fn instructors_for_course(&self, course_id: CourseId) -> Result<Vec<Instructor>> {
    let mut stmt = self.conn.prepare(
      "SELECT i.id, i.nombre
       FROM instructores i
       JOIN cursos_instructores ci ON i.id = ci.instructor_id
       WHERE ci.curso_id = ?1
       ORDER BY i.nombre",
    )?;
    let rows = stmt
      .query_map(params![course_id.get()], instructor_row)?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
  }

  // ── Students ──────────────────────────────────────────────────────────────

  fn list_students(&self) -> Result<Vec<Student>> {
    let mut stmt = self.conn.prepare(
      "SELECT id, nombre_completo FROM estudiantes ORDER BY nombre_completo",
    )?;
    let rows = stmt
      .query_map([], student_row)?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
  }

  fn get_student(&self, id: StudentId) -> Result<Option<Student>> {
    Ok(
      self
        .conn
        .query_row(
          "SELECT id, nombre_completo FROM estudiantes WHERE id = ?1",
          params![id.get()],
          student_row,
        )
        .optional()?,
    )
  }

  fn create_student(
    &mut self,
    full_name: &str,
    course_ids: &[CourseId],
  ) -> Result<StudentId> {
    let full_name = non_empty("student name", full_name)?;

    let tx = self.conn.transaction()?;
    tx.execute(
      "INSERT INTO estudiantes (nombre_completo) VALUES (?1)",
      params![full_name],
    )
    .map_err(|e| map_duplicate(e, Entity::Student, full_name))?;
    let id = StudentId(tx.last_insert_rowid());
    link_student_courses(&tx, id, course_ids)?;
    tx.commit()?;

    tracing::info!(%id, full_name, courses = course_ids.len(), "student created");
    Ok(id)
  }

  fn update_student(
    &mut self,
    id: StudentId,
    full_name: &str,
    course_ids: &[CourseId],
  ) -> Result<()> {
    let full_name = non_empty("student name", full_name)?;

    let tx = self.conn.transaction()?;
    let rows = tx
      .execute(
        "UPDATE estudiantes SET nombre_completo = ?1 WHERE id = ?2",
        params![full_name, id.get()],
      )
      .map_err(|e| map_duplicate(e, Entity::Student, full_name))?;
    require_affected(rows, Entity::Student, id.get())?;
    tx.execute(
      "DELETE FROM estudiantes_cursos WHERE estudiante_id = ?1",
      params![id.get()],
    )?;
    link_student_courses(&tx, id, course_ids)?;
    tx.commit()?;

    tracing::info!(%id, full_name, courses = course_ids.len(), "student updated");
    Ok(())
  }

  fn delete_student(&mut self, id: StudentId) -> Result<()> {
    let tx = self.conn.transaction()?;
    tx.execute(
      "DELETE FROM estudiantes_cursos WHERE estudiante_id = ?1",
      params![id.get()],
    )?;
    let rows =
      tx.execute("DELETE FROM estudiantes WHERE id = ?1", params![id.get()])?;
    require_affected(rows, Entity::Student, id.get())?;
    tx.commit()?;

    tracing::info!(%id, "student deleted");
    Ok(())
  }

  fn courses_for_student(&self, student_id: StudentId) -> Result<Vec<Course>> {
    let mut stmt = self.conn.prepare(
      "SELECT c.id, c.nombre
       FROM cursos c
       JOIN estudiantes_cursos ec ON c.id = ec.curso_id
       WHERE ec.estudiante_id = ?1
       ORDER BY c.nombre",
    )?;
    let rows = stmt
      .query_map(params![student_id.get()], course_row)?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
  }

  // ── Certificates ──────────────────────────────────────────────────────────

  fn list_active_certificates(&self) -> Result<Vec<CertificateListing>> {
    let raws: Vec<RawListing> = {
      let mut stmt = self.conn.prepare(
        "SELECT c.id, c.codigo_unico, e.nombre_completo, cu.nombre,
                c.fecha_generacion
         FROM constancias c
         JOIN estudiantes e ON c.estudiante_id = e.id
         JOIN cursos cu     ON c.curso_id      = cu.id
         WHERE c.activo = 1
         ORDER BY c.fecha_generacion DESC, c.id DESC",
      )?;
      stmt
        .query_map([], RawListing::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?
    };
    tracing::debug!(count = raws.len(), "listed active certificates");

    raws.into_iter().map(RawListing::into_listing).collect()
  }

  fn get_certificate(&self, id: CertificateId) -> Result<Option<Certificate>> {
    self.certificate_where("id = ?1", params![id.get()])
  }

  fn find_certificate_by_code(&self, code: &str) -> Result<Option<Certificate>> {
    // An exact match wins over a case variant left by older writes.
    self.certificate_where(
      "codigo_unico = ?1 COLLATE NOCASE
       ORDER BY codigo_unico = ?2 DESC, id
       LIMIT 1",
      params![code.trim(), code.trim().to_ascii_uppercase()],
    )
  }

  fn create_certificate(
    &mut self,
    unique_code: &str,
    student_id: StudentId,
    course_id: CourseId,
  ) -> Result<CertificateId> {
    let unique_code = normalise_code(unique_code)?;
    let issued_at = encode_issued_at(code::now().naive_local());

    let tx = self.conn.transaction()?;
    require_row(&tx, "estudiantes", Entity::Student, student_id.get())?;
    require_row(&tx, "cursos", Entity::Course, course_id.get())?;
    require_code_free(&tx, &unique_code, None)?;
    tx.execute(
      "INSERT INTO constancias
         (codigo_unico, estudiante_id, curso_id, fecha_generacion, activo)
       VALUES (?1, ?2, ?3, ?4, 1)",
      params![unique_code, student_id.get(), course_id.get(), issued_at],
    )
    .map_err(|e| map_duplicate(e, Entity::Certificate, &unique_code))?;
    let id = CertificateId(tx.last_insert_rowid());
    tx.commit()?;

    tracing::info!(%id, %unique_code, %student_id, %course_id, "certificate created");
    Ok(id)
  }

  fn issue_certificate(
    &mut self,
    student_id: StudentId,
    course_id: CourseId,
    at: Option<DateTime<Tz>>,
  ) -> Result<Certificate> {
    let student = self.get_student(student_id)?.ok_or(
      ConstraintViolation::InvalidReference {
        entity: Entity::Student,
        id:     student_id.get(),
      },
    )?;
    let course = self.get_course(course_id)?.ok_or(
      ConstraintViolation::InvalidReference {
        entity: Entity::Course,
        id:     course_id.get(),
      },
    )?;

    let mut at = at.unwrap_or_else(code::now);
    let mut attempt = 1;
    loop {
      let unique_code =
        code::generate_code(&student.full_name, &course.name, Some(at));

      match self.create_certificate(&unique_code, student_id, course_id) {
        Ok(id) => {
          return self
            .get_certificate(id)?
            .ok_or_else(|| Error::not_found(Entity::Certificate, id.get()));
        }
        Err(err) if attempt < MAX_ISSUE_ATTEMPTS && is_code_collision(&err) => {
          tracing::warn!(unique_code, attempt, "certificate code collision; regenerating");
          attempt += 1;
          at += TimeDelta::seconds(1);
        }
        Err(err) => return Err(err),
      }
    }
  }

  fn deactivate_certificate(&mut self, id: CertificateId) -> Result<()> {
    let rows = self.conn.execute(
      "UPDATE constancias SET activo = 0 WHERE id = ?1",
      params![id.get()],
    )?;
    require_affected(rows, Entity::Certificate, id.get())?;
    tracing::info!(%id, "certificate deactivated");
    Ok(())
  }

  fn rename_certificate_code(
    &mut self,
    id: CertificateId,
    new_code: &str,
  ) -> Result<()> {
    let new_code = normalise_code(new_code)?;

    let tx = self.conn.transaction()?;
    require_code_free(&tx, &new_code, Some(id))?;
    let rows = tx
      .execute(
        "UPDATE constancias SET codigo_unico = ?1 WHERE id = ?2",
        params![new_code, id.get()],
      )
      .map_err(|e| map_duplicate(e, Entity::Certificate, &new_code))?;
    require_affected(rows, Entity::Certificate, id.get())?;
    tx.commit()?;

    tracing::info!(%id, %new_code, "certificate code changed");
    Ok(())
  }
}
