use std::path::Path;

/// Base name of an uploaded filename, without its final extension, cleaned
/// up for use inside a `Content-Disposition` header.
///
/// Path components are stripped (browsers may send them), and characters
/// that would break the header are dropped.
pub fn base_name(filename: &str) -> String {
    let stem = Path::new(filename)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    let cleaned: String = stem
        .chars()
        .filter(|c| !c.is_control() && *c != '"' && *c != '\\' && *c != '/')
        .collect();

    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}

/// Case-insensitive check that a filename carries the given extension.
pub fn has_extension(filename: &str, ext: &str) -> bool {
    filename
        .to_lowercase()
        .ends_with(&format!(".{}", ext.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_name_strips_extension() {
        assert_eq!(base_name("report.pdf"), "report");
        assert_eq!(base_name("archive.tar.gz"), "archive.tar");
        assert_eq!(base_name("README"), "README");
    }

    #[test]
    fn test_base_name_strips_path_components() {
        assert_eq!(base_name("some/dir/report.pdf"), "report");
    }

    #[test]
    fn test_base_name_drops_header_breaking_chars() {
        assert_eq!(base_name("we\"ird\r\n.pdf"), "weird");
        assert_eq!(base_name("\"\""), "file");
    }

    #[test]
    fn test_has_extension_is_case_insensitive() {
        assert!(has_extension("a.PDF", "pdf"));
        assert!(has_extension("a.pdf", "PDF"));
        assert!(!has_extension("a.pdf.txt", "pdf"));
        assert!(!has_extension("apdf", "pdf"));
    }
}
