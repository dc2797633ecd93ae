//! Page slug generation

use chrono::{DateTime, Utc};

const MAX_SLUG_BASE_LEN: usize = 64;

/// Lowercase, replace every non-alphanumeric run with a single `-`, trim `-`.
pub fn slugify(s: &str) -> String {
    let mut slug = String::with_capacity(s.len());
    for c in s.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_matches('-').to_string()
}

/// Slug for a new page: at most 64 characters of the slugified input,
/// suffixed with the current time in hex milliseconds.
pub fn generate_slug(s: &str) -> String {
    generate_slug_at(s, Utc::now())
}

pub fn generate_slug_at(s: &str, now: DateTime<Utc>) -> String {
    let base: String = slugify(s).chars().take(MAX_SLUG_BASE_LEN).collect();
    format!("{}-{:x}", base, now.timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("u/123/My Book.pdf"), "u-123-my-book-pdf");
        assert_eq!(slugify("---"), "");
    }

    #[test]
    fn test_generate_slug_truncates_and_appends_hex_time() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let long = "a".repeat(100);
        let slug = generate_slug_at(&long, now);
        assert_eq!(slug, format!("{}-18bcfe56800", "a".repeat(64)));
    }

    #[test]
    fn test_generate_slug_from_path() {
        let now = Utc.timestamp_millis_opt(255).unwrap();
        assert_eq!(
            generate_slug_at("file:///docs/Report.pdf", now),
            "file-docs-report-pdf-ff"
        );
    }
}
