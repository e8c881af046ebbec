//! The `CertificateStore` trait.
//!
//! Implemented by storage backends (e.g. `constancias-store-sqlite`). The
//! command-line frontend is written against this abstraction.
//!
//! Every call is synchronous and completes before returning. Writes take
//! `&mut self`: a store has exactly one owner and is never shared between
//! concurrent callers.

use chrono::DateTime;
use chrono_tz::Tz;

use crate::record::{
  Certificate, CertificateId, CertificateListing, Course, CourseId, Instructor,
  InstructorId, Student, StudentId,
};

/// Abstraction over a certificate store backend.
///
/// Names (and certificate codes) are trimmed before they are written and
/// must be non-empty and unique within their table. Writes that break either
/// rule fail with a [`ConstraintViolation`](crate::ConstraintViolation) and
/// leave the store unchanged.
pub trait CertificateStore {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Instructors ───────────────────────────────────────────────────────

  /// All instructors, name ascending.
  fn list_instructors(&self) -> Result<Vec<Instructor>, Self::Error>;

  fn get_instructor(
    &self,
    id: InstructorId,
  ) -> Result<Option<Instructor>, Self::Error>;

  fn create_instructor(&mut self, name: &str) -> Result<InstructorId, Self::Error>;

  fn update_instructor(
    &mut self,
    id: InstructorId,
    name: &str,
  ) -> Result<(), Self::Error>;

  /// Hard delete. Course links that point at the instructor are left in
  /// place.
  fn delete_instructor(&mut self, id: InstructorId) -> Result<(), Self::Error>;

  // ── Courses ───────────────────────────────────────────────────────────

  /// All courses, name ascending.
  fn list_courses(&self) -> Result<Vec<Course>, Self::Error>;

  fn get_course(&self, id: CourseId) -> Result<Option<Course>, Self::Error>;

  /// Create a course taught by `instructor_ids`. Fails if the name is taken
  /// or any instructor id is unknown.
  fn create_course(
    &mut self,
    name: &str,
    instructor_ids: &[InstructorId],
  ) -> Result<CourseId, Self::Error>;

  /// Rename a course and replace its whole instructor set.
  fn update_course(
    &mut self,
    id: CourseId,
    name: &str,
    instructor_ids: &[InstructorId],
  ) -> Result<(), Self::Error>;

  /// Remove the course's instructor links, then the course itself.
  fn delete_course(&mut self, id: CourseId) -> Result<(), Self::Error>;

  /// Instructors linked to `course_id`, name ascending. Empty for an
  /// unknown course.
  fn instructors_for_course(
    &self,
    course_id: CourseId,
  ) -> Result<Vec<Instructor>, Self::Error>;

  // ── Students ──────────────────────────────────────────────────────────

  /// All students, full name ascending.
  fn list_students(&self) -> Result<Vec<Student>, Self::Error>;

  fn get_student(&self, id: StudentId) -> Result<Option<Student>, Self::Error>;

  fn create_student(
    &mut self,
    full_name: &str,
    course_ids: &[CourseId],
  ) -> Result<StudentId, Self::Error>;

  /// Rename a student and replace their whole course set.
  fn update_student(
    &mut self,
    id: StudentId,
    full_name: &str,
    course_ids: &[CourseId],
  ) -> Result<(), Self::Error>;

  fn delete_student(&mut self, id: StudentId) -> Result<(), Self::Error>;

  /// Courses `student_id` is enrolled in, name ascending.
  fn courses_for_student(
    &self,
    student_id: StudentId,
  ) -> Result<Vec<Course>, Self::Error>;

  // ── Certificates ──────────────────────────────────────────────────────

  /// Active certificates only, newest first.
  fn list_active_certificates(
    &self,
  ) -> Result<Vec<CertificateListing>, Self::Error>;

  /// Look up a certificate by id, including deactivated ones.
  fn get_certificate(
    &self,
    id: CertificateId,
  ) -> Result<Option<Certificate>, Self::Error>;

  /// Look up a certificate by its code, ignoring ASCII case and
  /// surrounding whitespace.
  fn find_certificate_by_code(
    &self,
    code: &str,
  ) -> Result<Option<Certificate>, Self::Error>;

  /// Record a certificate with a caller-supplied code, stamped with the
  /// current time. The code is stored upper-cased, so codes differing only
  /// in case collide.
  fn create_certificate(
    &mut self,
    unique_code: &str,
    student_id: StudentId,
    course_id: CourseId,
  ) -> Result<CertificateId, Self::Error>;

  /// Generate a code for the student and course and record the certificate.
  ///
  /// The code is derived from the student's full name, the course name and
  /// `at` (default: now). If the code is already taken the timestamp is
  /// advanced one second and the code regenerated, a bounded number of
  /// times.
  ///
  /// `at` only feeds code derivation. The stored `issued_at` is always the
  /// current time in the reference zone, even when `at` is given.
  fn issue_certificate(
    &mut self,
    student_id: StudentId,
    course_id: CourseId,
    at: Option<DateTime<Tz>>,
  ) -> Result<Certificate, Self::Error>;

  /// Logical delete: the row stays but no longer appears in listings.
  fn deactivate_certificate(&mut self, id: CertificateId) -> Result<(), Self::Error>;

  /// Replace a certificate's code. Stored upper-cased like
  /// [`create_certificate`](Self::create_certificate).
  fn rename_certificate_code(
    &mut self,
    id: CertificateId,
    new_code: &str,
  ) -> Result<(), Self::Error>;
}
