//! Parser for user seed files.
//!
//! Format, one user per line:
//! - `name::email::age::role`
//! - `age` may be empty; the trailing `::role` may be omitted
//! - blank lines and lines starting with `#` are skipped
//! - every user is validated; failures carry the line number

use crate::error::{RecordError, Result};
use crate::types::UserDraft;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Parse a seed file into user drafts, in file order.
pub fn parse_users(path: &Path) -> Result<Vec<UserDraft>> {
    let content = fs::read_to_string(path).map_err(|err| match err.kind() {
        ErrorKind::NotFound => RecordError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => RecordError::IoError(err),
    })?;

    let file = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    parse_users_str(&content, &file)
}

/// Parse seed content that is already in memory.
///
/// `file` is only used to label parse errors.
pub fn parse_users_str(content: &str, file: &str) -> Result<Vec<UserDraft>> {
    let mut users = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line_trimmed = line.trim();
        if line_trimmed.is_empty() || line_trimmed.starts_with('#') {
            continue;
        }

        let parts: Vec<&str> = line_trimmed.split("::").map(str::trim).collect();
        if parts.len() < 3 || parts.len() > 4 {
            return Err(RecordError::ParseError {
                file: file.to_string(),
                line: line_no,
                reason: format!("expected 3 or 4 fields, found {}", parts.len()),
            });
        }

        let age = match parts[2] {
            "" => None,
            raw => Some(raw.parse::<u32>().map_err(|_| RecordError::ParseError {
                file: file.to_string(),
                line: line_no,
                reason: format!("invalid age '{raw}'"),
            })?),
        };

        let role = parts
            .get(3)
            .filter(|role| !role.is_empty())
            .map(|role| role.to_string());

        let draft = UserDraft {
            name: parts[0].to_string(),
            email: parts[1].to_string(),
            age,
            role,
        };
        draft.validate().map_err(|err| RecordError::ParseError {
            file: file.to_string(),
            line: line_no,
            reason: err.to_string(),
        })?;
        users.push(draft);
    }

    Ok(users)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_users_str() {
        let content = "\
# seed users
Ann Lee::ann@example.com::31::admin

Bob Stone::bob@example.com::
Cara Lee::cara@example.com::45
";
        let users = parse_users_str(content, "users.dat").unwrap();
        assert_eq!(users.len(), 3);
        assert_eq!(users[0].role.as_deref(), Some("admin"));
        assert_eq!(users[0].age, Some(31));
        assert_eq!(users[1].age, None);
        assert_eq!(users[1].role, None);
        assert_eq!(users[2].email, "cara@example.com");
    }

    #[test]
    fn test_parse_error_reports_line() {
        let content = "Ann::ann@example.com::31\nBob::bob@example.com::old\n";
        let err = parse_users_str(content, "users.dat").unwrap_err();
        match err {
            RecordError::ParseError { file, line, .. } => {
                assert_eq!(file, "users.dat");
                assert_eq!(line, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_user_reports_line() {
        let content = "# header\nAnn::ann@example.com::31\nBob::bob.example.com::40\n";
        let err = parse_users_str(content, "users.dat").unwrap_err();
        match err {
            RecordError::ParseError { line, reason, .. } => {
                assert_eq!(line, 3);
                assert!(reason.contains("email"), "reason was: {reason}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_field_count_checked() {
        let err = parse_users_str("just-a-name\n", "users.dat").unwrap_err();
        assert!(matches!(err, RecordError::ParseError { line: 1, .. }));
    }

    #[test]
    fn test_parse_users_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Ann::ann@example.com::31::admin").unwrap();

        let users = parse_users(file.path()).unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].name, "Ann");
    }

    #[test]
    fn test_missing_file() {
        let err = parse_users(Path::new("definitely/not/here/users.dat")).unwrap_err();
        assert!(matches!(err, RecordError::FileNotFound { .. }));
    }
}
