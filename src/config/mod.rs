use std::env;
use std::path::PathBuf;

/// Runtime configuration for the conversion API
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Address the HTTP server binds to (default: "127.0.0.1:5000")
    pub bind_addr: String,

    /// Directory where uploads and conversion outputs are staged
    /// (default: `<system tmp>/convert-api`)
    pub tmp_dir: PathBuf,

    /// Maximum upload size in bytes (default: 64 MB)
    pub max_file_size: usize,

    /// Seconds a generated output stays on disk after the response
    /// is dispatched (default: 30)
    pub cleanup_delay_secs: u64,

    /// Hard timeout for external conversion processes in seconds
    /// (default: 120)
    pub subprocess_timeout_secs: u64,

    /// LibreOffice binary used for document conversions (default: "soffice")
    pub office_binary: String,

    /// Ghostscript binary used for PDF compression
    /// (default: "gs", "gswin64c" on Windows)
    pub ghostscript_binary: String,

    /// Background remover type: "rembg" or "noop" (default: "rembg")
    pub remover_type: String,

    /// rembg CLI binary (default: "rembg")
    pub rembg_binary: String,
}

fn default_ghostscript() -> String {
    if cfg!(windows) { "gswin64c" } else { "gs" }.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:5000".to_string(),
            tmp_dir: env::temp_dir().join("convert-api"),
            max_file_size: 64 * 1024 * 1024, // 64 MB
            cleanup_delay_secs: 30,
            subprocess_timeout_secs: 120,
            office_binary: "soffice".to_string(),
            ghostscript_binary: default_ghostscript(),
            remover_type: "rembg".to_string(),
            rembg_binary: "rembg".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            bind_addr: env::var("BIND_ADDR").unwrap_or(default.bind_addr),

            tmp_dir: env::var("TMP_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.tmp_dir),

            max_file_size: env::var("MAX_FILE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_file_size),

            cleanup_delay_secs: env::var("CLEANUP_DELAY_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.cleanup_delay_secs),

            subprocess_timeout_secs: env::var("SUBPROCESS_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.subprocess_timeout_secs),

            office_binary: env::var("OFFICE_BINARY").unwrap_or(default.office_binary),

            ghostscript_binary: env::var("GHOSTSCRIPT_BINARY")
                .unwrap_or(default.ghostscript_binary),

            remover_type: env::var("REMOVER_TYPE").unwrap_or(default.remover_type),

            rembg_binary: env::var("REMBG_BINARY").unwrap_or(default.rembg_binary),
        }
    }

    /// Create config for development and tests (no external model, short delays)
    pub fn development() -> Self {
        Self {
            cleanup_delay_secs: 5,
            remover_type: "noop".to_string(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.max_file_size, 64 * 1024 * 1024);
        assert_eq!(config.cleanup_delay_secs, 30);
        assert_eq!(config.office_binary, "soffice");
        assert!(config.tmp_dir.ends_with("convert-api"));
    }

    #[test]
    fn test_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.remover_type, "noop");
        assert_eq!(config.cleanup_delay_secs, 5);
    }

    #[cfg(not(windows))]
    #[test]
    fn test_ghostscript_binary_name() {
        assert_eq!(AppConfig::default().ghostscript_binary, "gs");
    }
}
