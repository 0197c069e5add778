//! Stored-name generation for uploaded files.

use chrono::Utc;
use rand::Rng;

/// Longest base-name fragment carried into the stored name.
const MAX_BASE_LEN: usize = 80;

/// Generate a collision-resistant stored name for an upload.
///
/// The name combines the upload timestamp in milliseconds, a random
/// suffix, and a sanitized fragment of the original name so files stay
/// recognizable on disk: `1717000000000-9f3a2c1b-quarterly_report.pdf`.
pub fn generate_stored_name(original_name: &str) -> String {
    let millis = Utc::now().timestamp_millis();
    let nonce: u32 = rand::thread_rng().gen();

    let (base, extension) = split_name(original_name);
    let base = sanitize(base);

    if extension.is_empty() {
        format!("{millis}-{nonce:08x}-{base}")
    } else {
        format!("{millis}-{nonce:08x}-{base}.{extension}")
    }
}

/// Split a filename into base and extension, both without the dot.
fn split_name(name: &str) -> (&str, &str) {
    match name.rsplit_once('.') {
        Some((base, ext)) if !base.is_empty() && !ext.is_empty() => (base, ext),
        _ => (name, ""),
    }
}

/// Keep alphanumerics, dashes, and underscores; everything else becomes
/// an underscore. Truncated so pathological names stay bounded.
fn sanitize(base: &str) -> String {
    let cleaned: String = base
        .chars()
        .take(MAX_BASE_LEN)
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preserves_extension() {
        let name = generate_stored_name("report.pdf");
        assert!(name.ends_with(".pdf"));
        assert!(name.contains("-report."));
    }

    #[test]
    fn test_sanitizes_special_characters() {
        let name = generate_stored_name("my file (final)!.docx");
        assert!(name.ends_with(".docx"));
        assert!(name.contains("my_file__final__"));
        assert!(!name.contains(' '));
    }

    #[test]
    fn test_no_extension() {
        let name = generate_stored_name("README");
        assert!(name.ends_with("-README"));
    }

    #[test]
    fn test_dotfile_treated_as_extensionless() {
        let name = generate_stored_name(".gitignore");
        assert!(name.ends_with("-_gitignore"));
    }

    #[test]
    fn test_empty_name_falls_back() {
        let name = generate_stored_name("");
        assert!(name.ends_with("-file"));
    }

    #[test]
    fn test_two_calls_differ() {
        assert_ne!(generate_stored_name("a.txt"), generate_stored_name("a.txt"));
    }

    #[test]
    fn test_long_base_is_truncated() {
        let long = format!("{}.pdf", "x".repeat(500));
        let name = generate_stored_name(&long);
        assert!(name.len() < 150);
        assert!(name.ends_with(".pdf"));
    }
}
