//! Dispatch of parsed subcommands onto a [`CertificateStore`].

use anyhow::Context as _;
use chrono::TimeZone as _;
use constancias_core::{
  Entity,
  code::{self, REFERENCE_TZ},
  record::{CertificateId, CourseId, InstructorId, StudentId},
  store::CertificateStore,
};

use crate::{
  cli::{CertificateCommand, Command, CourseCommand, InstructorCommand, StudentCommand},
  output::{self, Format},
};

pub fn dispatch<S: CertificateStore>(
  store: &mut S,
  command: Command,
  format: Format,
) -> anyhow::Result<()> {
  match command {
    Command::Instructor(cmd) => instructor(store, cmd, format),
    Command::Course(cmd) => course(store, cmd, format),
    Command::Student(cmd) => student(store, cmd, format),
    Command::Certificate(cmd) => certificate(store, cmd, format),
    Command::Code { name, course, at, lower } => {
      let at = at
        .map(|secs| {
          REFERENCE_TZ
            .timestamp_opt(secs, 0)
            .single()
            .with_context(|| format!("timestamp {secs} is out of range"))
        })
        .transpose()?;
      let generated = code::generate_code(&name, &course, at);
      let generated = if lower { code::display_code(&generated) } else { generated };
      output::one(format, &generated, String::clone)
    }
  }
}

fn instructor<S: CertificateStore>(
  store: &mut S,
  cmd: InstructorCommand,
  format: Format,
) -> anyhow::Result<()> {
  match cmd {
    InstructorCommand::List => {
      output::rows(format, &store.list_instructors()?, output::instructor_line)
    }
    InstructorCommand::Add { name } => {
      let id = store.create_instructor(&name)?;
      output::done(format, "created", Entity::Instructor, id.get())
    }
    InstructorCommand::Rename { id, name } => {
      store.update_instructor(InstructorId(id), &name)?;
      output::done(format, "renamed", Entity::Instructor, id)
    }
    InstructorCommand::Delete { id } => {
      store.delete_instructor(InstructorId(id))?;
      output::done(format, "deleted", Entity::Instructor, id)
    }
  }
}

fn course<S: CertificateStore>(
  store: &mut S,
  cmd: CourseCommand,
  format: Format,
) -> anyhow::Result<()> {
  match cmd {
    CourseCommand::List => output::rows(format, &store.list_courses()?, output::course_line),
    CourseCommand::Add { name, instructors } => {
      let ids: Vec<InstructorId> = instructors.into_iter().map(InstructorId).collect();
      let id = store.create_course(&name, &ids)?;
      output::done(format, "created", Entity::Course, id.get())
    }
    CourseCommand::Edit { id, name, instructors } => {
      let ids: Vec<InstructorId> = instructors.into_iter().map(InstructorId).collect();
      store.update_course(CourseId(id), &name, &ids)?;
      output::done(format, "updated", Entity::Course, id)
    }
    CourseCommand::Delete { id } => {
      store.delete_course(CourseId(id))?;
      output::done(format, "deleted", Entity::Course, id)
    }
    CourseCommand::Instructors { id } => output::rows(
      format,
      &store.instructors_for_course(CourseId(id))?,
      output::instructor_line,
    ),
  }
}

fn student<S: CertificateStore>(
  store: &mut S,
  cmd: StudentCommand,
  format: Format,
) -> anyhow::Result<()> {
  match cmd {
    StudentCommand::List => output::rows(format, &store.list_students()?, output::student_line),
    StudentCommand::Add { full_name, courses } => {
      let ids: Vec<CourseId> = courses.into_iter().map(CourseId).collect();
      let id = store.create_student(&full_name, &ids)?;
      output::done(format, "created", Entity::Student, id.get())
    }
    StudentCommand::Edit { id, full_name, courses } => {
      let ids: Vec<CourseId> = courses.into_iter().map(CourseId).collect();
      store.update_student(StudentId(id), &full_name, &ids)?;
      output::done(format, "updated", Entity::Student, id)
    }
    StudentCommand::Delete { id } => {
      store.delete_student(StudentId(id))?;
      output::done(format, "deleted", Entity::Student, id)
    }
    StudentCommand::Courses { id } => output::rows(
      format,
      &store.courses_for_student(StudentId(id))?,
      output::course_line,
    ),
  }
}

fn certificate<S: CertificateStore>(
  store: &mut S,
  cmd: CertificateCommand,
  format: Format,
) -> anyhow::Result<()> {
  match cmd {
    CertificateCommand::List => output::rows(
      format,
      &store.list_active_certificates()?,
      output::listing_line,
    ),
    CertificateCommand::Issue { student, course } => {
      let cert = store.issue_certificate(StudentId(student), CourseId(course), None)?;
      output::one(format, &cert, output::certificate_block)
    }
    CertificateCommand::Create { code, student, course } => {
      if !code::is_well_formed(&code) {
        tracing::warn!(code = %code, "code does not have the generated XXXX-XXXX-XXXX-XXXX shape");
      }
      let id = store.create_certificate(&code, StudentId(student), CourseId(course))?;
      output::done(format, "created", Entity::Certificate, id.get())
    }
    CertificateCommand::Show { id } => {
      let cert = store
        .get_certificate(CertificateId(id))?
        .with_context(|| format!("certificate {id} not found"))?;
      output::one(format, &cert, output::certificate_block)
    }
    CertificateCommand::Verify { code } => match store.find_certificate_by_code(&code)? {
      Some(cert) => output::one(format, &cert, output::certificate_block),
      None => anyhow::bail!("no certificate has code {code:?}"),
    },
    CertificateCommand::Deactivate { id } => {
      store.deactivate_certificate(CertificateId(id))?;
      output::done(format, "deactivated", Entity::Certificate, id)
    }
    CertificateCommand::Recode { id, code } => {
      store.rename_certificate_code(CertificateId(id), &code)?;
      output::done(format, "recoded", Entity::Certificate, id)
    }
  }
}
