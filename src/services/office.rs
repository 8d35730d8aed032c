use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::process::Command;

use crate::error::AppError;

/// Document conversion via LibreOffice in headless batch mode.
///
/// LibreOffice picks the output file name itself (`<input stem>.<target>`),
/// so every conversion gets its own output directory and success is judged
/// purely by the expected file existing afterwards. Exit status and stderr
/// are not inspected: a crashed process, a missing binary, and an
/// unsupported input format all fail the same way.
pub struct OfficeConverter {
    binary: String,
    timeout: Duration,
}

impl OfficeConverter {
    pub fn new(binary: impl Into<String>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }

    /// Convert `input` to the `target` format ("pdf", "docx", ...), writing
    /// into `outdir`. Returns the path of the produced file.
    pub async fn convert(
        &self,
        input: &Path,
        target: &str,
        outdir: &Path,
    ) -> Result<PathBuf, AppError> {
        tracing::info!(
            "Converting {} to {} via {}",
            input.display(),
            target,
            self.binary
        );

        let run = Command::new(&self.binary)
            .arg("--headless")
            .arg("--convert-to")
            .arg(target)
            .arg("--outdir")
            .arg(outdir)
            .arg(input)
            .kill_on_drop(true)
            .output();

        match tokio::time::timeout(self.timeout, run).await {
            Ok(Ok(output)) => {
                tracing::debug!("{} exited with {}", self.binary, output.status);
            }
            Ok(Err(e)) => {
                // Missing binary or spawn failure; the existence check below
                // turns this into a conversion error.
                tracing::error!("Could not run {}: {}", self.binary, e);
            }
            Err(_) => {
                tracing::error!("{} timed out after {:?}", self.binary, self.timeout);
                return Err(AppError::Conversion(format!(
                    "Conversion timed out after {} seconds",
                    self.timeout.as_secs()
                )));
            }
        }

        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let expected = outdir.join(format!("{}.{}", stem, target));

        if !expected.exists() {
            return Err(AppError::ConversionFailed);
        }

        Ok(expected)
    }
}
