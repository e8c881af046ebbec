//! Certificate code generation.
//!
//! A code is the SHA-256 digest of `"<name>-<course_code>-<unix_seconds>"`,
//! upper-case hex, truncated to 16 characters and split into four groups of
//! four: `E89C-8C98-C0A4-BFA1`.
//!
//! Sixteen hex characters carry 64 bits, so collisions are possible at large
//! volumes. Nothing here detects them; the store's unique constraint on the
//! code column does.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use sha2::{Digest, Sha256};

/// Time zone in which "now" is evaluated and issue timestamps are recorded.
pub const REFERENCE_TZ: Tz = chrono_tz::America::Monterrey;

/// Length of a generated code, separators included.
pub const CODE_LEN: usize = GROUPS * GROUP_LEN + (GROUPS - 1);

const GROUPS: usize = 4;
const GROUP_LEN: usize = 4;

/// The current instant in [`REFERENCE_TZ`].
pub fn now() -> DateTime<Tz> { Utc::now().with_timezone(&REFERENCE_TZ) }

/// Generate the code for `name` taking `course_code` at `at`, or at
/// [`now`] when `at` is `None`.
pub fn generate_code(
  name: &str,
  course_code: &str,
  at: Option<DateTime<Tz>>,
) -> String {
  let at = at.unwrap_or_else(now);
  code_for_timestamp(name, course_code, at.timestamp())
}

/// Generate the code for an explicit Unix timestamp in seconds.
pub fn code_for_timestamp(name: &str, course_code: &str, timestamp: i64) -> String {
  let base = format!("{name}-{course_code}-{timestamp}");
  let digest = hex::encode_upper(Sha256::digest(base.as_bytes()));

  (0..GROUPS)
    .map(|i| &digest[i * GROUP_LEN..(i + 1) * GROUP_LEN])
    .collect::<Vec<_>>()
    .join("-")
}

/// Whether `code` has the exact shape produced by [`generate_code`].
pub fn is_well_formed(code: &str) -> bool {
  if code.len() != CODE_LEN {
    return false;
  }
  let groups: Vec<&str> = code.split('-').collect();
  groups.len() == GROUPS
    && groups.iter().all(|g| {
      g.len() == GROUP_LEN
        && g.bytes().all(|b| b.is_ascii_digit() || (b'A'..=b'F').contains(&b))
    })
}

/// Lower-case rendering used on printed certificates.
pub fn display_code(code: &str) -> String { code.to_ascii_lowercase() }

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn known_input_produces_known_code() {
    assert_eq!(
      code_for_timestamp("Bob", "Math101", 1_700_000_000),
      "E89C-8C98-C0A4-BFA1"
    );
  }

  #[test]
  fn explicit_instant_is_deterministic() {
    // 2025-01-01T00:00:00Z, which is still New Year's Eve in Monterrey.
    let at = REFERENCE_TZ
      .with_ymd_and_hms(2024, 12, 31, 18, 0, 0)
      .unwrap();
    assert_eq!(at.timestamp(), 1_735_689_600);

    let name = "Claudia Estefania Pacheco Aguirre";
    let first = generate_code(name, "PPFEA2505", Some(at));
    let second = generate_code(name, "PPFEA2505", Some(at));
    assert_eq!(first, second);
    assert_eq!(first, "2B74-795A-BE6B-88FE");
  }

  #[test]
  fn instant_time_zone_does_not_change_the_code() {
    let utc = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
    let local = utc.with_timezone(&REFERENCE_TZ);
    assert_eq!(
      generate_code("Bob", "Math101", Some(local)),
      code_for_timestamp("Bob", "Math101", 1_700_000_000)
    );
  }

  #[test]
  fn one_second_later_gives_a_different_code() {
    let a = code_for_timestamp("Bob", "Math101", 1_700_000_000);
    let b = code_for_timestamp("Bob", "Math101", 1_700_000_001);
    assert_eq!(b, "738C-D85E-3CAA-A8C0");
    assert_ne!(a, b);
  }

  #[test]
  fn generated_codes_are_well_formed() {
    let code = generate_code("Ana María", "Física I", None);
    assert_eq!(code.len(), CODE_LEN);
    assert_eq!(code.matches('-').count(), 3);
    assert!(is_well_formed(&code), "{code}");
  }

  #[test]
  fn malformed_codes_are_rejected() {
    assert!(!is_well_formed("e89c-8c98-c0a4-bfa1"));
    assert!(!is_well_formed("E89C8C98C0A4BFA1"));
    assert!(!is_well_formed("E89C-8C98-C0A4-BFAG"));
    assert!(!is_well_formed("E89C-8C98-C0A4BFA1-"));
  }

  #[test]
  fn display_code_lowercases() {
    assert_eq!(display_code("E89C-8C98-C0A4-BFA1"), "e89c-8c98-c0a4-bfa1");
  }
}
