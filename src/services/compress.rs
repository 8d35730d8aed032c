use std::path::Path;
use std::time::Duration;

use tokio::process::Command;

use crate::error::AppError;

/// PDF compression via Ghostscript with a fixed ebook quality profile.
pub struct PdfCompressor {
    binary: String,
    timeout: Duration,
}

impl PdfCompressor {
    pub fn new(binary: impl Into<String>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }

    /// Rewrite `input` into a smaller PDF at `output`.
    ///
    /// Success is judged by the output file existing afterwards, the same
    /// criterion the office converter uses.
    pub async fn compress(&self, input: &Path, output: &Path) -> Result<(), AppError> {
        tracing::info!(
            "Compressing {} -> {} via {}",
            input.display(),
            output.display(),
            self.binary
        );

        let run = Command::new(&self.binary)
            .arg("-sDEVICE=pdfwrite")
            .arg("-dCompatibilityLevel=1.4")
            .arg("-dPDFSETTINGS=/ebook")
            .arg("-dNOPAUSE")
            .arg("-dBATCH")
            .arg(format!("-sOutputFile={}", output.display()))
            .arg(input)
            .kill_on_drop(true)
            .output();

        match tokio::time::timeout(self.timeout, run).await {
            Ok(Ok(out)) => {
                tracing::debug!("{} exited with {}", self.binary, out.status);
            }
            Ok(Err(e)) => {
                tracing::error!("Could not run {}: {}", self.binary, e);
            }
            Err(_) => {
                tracing::error!("{} timed out after {:?}", self.binary, self.timeout);
                return Err(AppError::Conversion(format!(
                    "Compression timed out after {} seconds",
                    self.timeout.as_secs()
                )));
            }
        }

        if !output.exists() {
            return Err(AppError::ConversionFailed);
        }

        Ok(())
    }
}
