//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
  name = "constancias",
  version,
  about = "Manage course completion certificates"
)]
pub struct Args {
  /// Path to a TOML config file.
  #[arg(short, long, value_name = "FILE", default_value = "constancias.toml")]
  pub config: PathBuf,

  /// SQLite database file; overrides the config file and environment.
  #[arg(long, value_name = "PATH")]
  pub database: Option<PathBuf>,

  /// Print results as JSON instead of text.
  #[arg(long, global = true)]
  pub json: bool,

  #[command(subcommand)]
  pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Manage instructors.
  #[command(subcommand)]
  Instructor(InstructorCommand),

  /// Manage courses and who teaches them.
  #[command(subcommand)]
  Course(CourseCommand),

  /// Manage students and their enrolments.
  #[command(subcommand)]
  Student(StudentCommand),

  /// Issue and look up certificates.
  #[command(subcommand)]
  Certificate(CertificateCommand),

  /// Print the code a certificate would get, without storing anything.
  Code {
    /// Student's full name.
    #[arg(long)]
    name:   String,
    /// Course code, e.g. PPFEA2505.
    #[arg(long)]
    course: String,
    /// Unix timestamp in seconds; defaults to now.
    #[arg(long, value_name = "UNIX_SECONDS")]
    at:     Option<i64>,
    /// Print the code in lower case.
    #[arg(long)]
    lower:  bool,
  },
}

#[derive(Subcommand, Debug)]
pub enum InstructorCommand {
  List,
  Add { name: String },
  Rename { id: i64, name: String },
  Delete { id: i64 },
}

#[derive(Subcommand, Debug)]
pub enum CourseCommand {
  List,
  Add {
    name:        String,
    /// Instructor id; repeat for several.
    #[arg(short, long = "instructor", value_name = "ID")]
    instructors: Vec<i64>,
  },
  /// Rename a course and replace its instructors.
  Edit {
    id:          i64,
    name:        String,
    #[arg(short, long = "instructor", value_name = "ID")]
    instructors: Vec<i64>,
  },
  Delete { id: i64 },
  /// List the instructors of a course.
  Instructors { id: i64 },
}

#[derive(Subcommand, Debug)]
pub enum StudentCommand {
  List,
  Add {
    full_name: String,
    /// Course id; repeat for several.
    #[arg(short, long = "course", value_name = "ID")]
    courses:   Vec<i64>,
  },
  /// Rename a student and replace their courses.
  Edit {
    id:        i64,
    full_name: String,
    #[arg(short, long = "course", value_name = "ID")]
    courses:   Vec<i64>,
  },
  Delete { id: i64 },
  /// List the courses a student is enrolled in.
  Courses { id: i64 },
}

#[derive(Subcommand, Debug)]
pub enum CertificateCommand {
  /// List active certificates, newest first.
  List,
  /// Generate a code and record a certificate.
  Issue {
    #[arg(long)]
    student: i64,
    #[arg(long)]
    course:  i64,
  },
  /// Record a certificate with an explicit code.
  Create {
    code:    String,
    #[arg(long)]
    student: i64,
    #[arg(long)]
    course:  i64,
  },
  /// Show one certificate, active or not.
  Show { id: i64 },
  /// Look a certificate up by its printed code.
  Verify { code: String },
  /// Revoke a certificate; the record is kept.
  Deactivate { id: i64 },
  /// Replace a certificate's code.
  Recode { id: i64, code: String },
}

#[cfg(test)]
mod tests {
  use clap::CommandFactory;

  use super::*;

  #[test]
  fn cli_definition_is_consistent() { Args::command().debug_assert(); }

  #[test]
  fn repeated_ids_collect() {
    let args = Args::try_parse_from([
      "constancias", "course", "add", "Math101", "-i", "1", "--instructor", "2",
    ])
    .unwrap();
    match args.command {
      Command::Course(CourseCommand::Add { name, instructors }) => {
        assert_eq!(name, "Math101");
        assert_eq!(instructors, [1, 2]);
      }
      other => panic!("unexpected command: {other:?}"),
    }
  }

  #[test]
  fn json_flag_is_global() {
    let args =
      Args::try_parse_from(["constancias", "certificate", "list", "--json"]).unwrap();
    assert!(args.json);
  }
}
