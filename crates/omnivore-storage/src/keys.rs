//! Shared key generation for storage backends.

use uuid::Uuid;

/// Storage path for an upload: `u/{upload_file_id}/{file_name}`.
///
/// Deterministic, so the same upload always maps to the same object.
pub fn generate_upload_file_path_name(upload_file_id: Uuid, file_name: &str) -> String {
    format!("u/{}/{}", upload_file_id, file_name)
}

/// Reject keys that could escape the storage root. Dots inside a file name
/// are fine; only `.` and `..` segments are refused.
pub(crate) fn is_safe_key(storage_key: &str) -> bool {
    !storage_key.is_empty()
        && !storage_key.starts_with('/')
        && !storage_key.contains('\\')
        && !storage_key
            .split('/')
            .any(|segment| segment.is_empty() || segment == "." || segment == "..")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_name_is_deterministic() {
        let id = Uuid::new_v4();
        let first = generate_upload_file_path_name(id, "report.pdf");
        let second = generate_upload_file_path_name(id, "report.pdf");
        assert_eq!(first, second);
        assert_eq!(first, format!("u/{}/report.pdf", id));
    }

    #[test]
    fn test_is_safe_key() {
        assert!(is_safe_key("u/abc/report.pdf"));
        assert!(!is_safe_key("../etc/passwd"));
        assert!(!is_safe_key("/etc/passwd"));
        assert!(!is_safe_key(""));
        assert!(!is_safe_key("u/abc/../../etc/passwd"));
        assert!(!is_safe_key("u/./report.pdf"));
        assert!(!is_safe_key("u//report.pdf"));
        assert!(!is_safe_key("u\\..\\report.pdf"));
    }

    #[test]
    fn test_dots_inside_file_names_are_safe() {
        let id = Uuid::new_v4();
        assert!(is_safe_key(&generate_upload_file_path_name(id, "final..report.pdf")));
        assert!(is_safe_key(&generate_upload_file_path_name(id, "v1..2.pdf")));
        assert!(is_safe_key(&generate_upload_file_path_name(id, "...")));
    }
}
