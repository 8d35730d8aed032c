use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, anyhow};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Trait for image background-removal implementations
#[async_trait::async_trait]
pub trait BackgroundRemover: Send + Sync {
    /// Takes an encoded PNG, returns a PNG with the background removed
    async fn remove_background(&self, png: &[u8]) -> Result<Vec<u8>>;

    /// Check if the remover is available/healthy
    async fn health_check(&self) -> bool;
}

/// Background removal via the `rembg` CLI, piping the image through
/// stdin/stdout so nothing touches the filesystem.
///
/// ```bash
/// pip install "rembg[cli]"
/// ```
pub struct RembgRemover {
    binary: String,
    timeout: Duration,
}

impl RembgRemover {
    pub fn new(binary: impl Into<String>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }
}

#[async_trait::async_trait]
impl BackgroundRemover for RembgRemover {
    async fn remove_background(&self, png: &[u8]) -> Result<Vec<u8>> {
        let mut child = Command::new(&self.binary)
            .arg("i")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| anyhow!("Failed to start {}: {}", self.binary, e))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| anyhow!("{} stdin not captured", self.binary))?;

        // Feed stdin from a separate task so a full stdout pipe can't
        // deadlock the exchange on large images.
        let input = png.to_vec();
        let writer = tokio::spawn(async move {
            let _ = stdin.write_all(&input).await;
            // stdin drops here, closing the pipe
        });

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| anyhow!("Background removal timed out"))??;
        let _ = writer.await;

        if !output.status.success() {
            return Err(anyhow!("{} exited with {}", self.binary, output.status));
        }
        if output.stdout.is_empty() {
            return Err(anyhow!("{} produced no output", self.binary));
        }

        tracing::debug!(
            input_bytes = png.len(),
            output_bytes = output.stdout.len(),
            "Background removed"
        );
        Ok(output.stdout)
    }

    async fn health_check(&self) -> bool {
        Command::new(&self.binary)
            .arg("--version")
            .output()
            .await
            .map(|o| o.status.success())
            .unwrap_or(false)
    }
}

/// Passthrough remover for development/testing: returns the image unchanged
pub struct PassthroughRemover;

#[async_trait::async_trait]
impl BackgroundRemover for PassthroughRemover {
    async fn remove_background(&self, png: &[u8]) -> Result<Vec<u8>> {
        tracing::warn!("PassthroughRemover: returning image unchanged (development mode)");
        Ok(png.to_vec())
    }

    async fn health_check(&self) -> bool {
        true
    }
}

/// Factory function to create the appropriate remover based on config
pub fn create_remover(
    remover_type: &str,
    binary: &str,
    timeout: Duration,
) -> Arc<dyn BackgroundRemover> {
    match remover_type.to_lowercase().as_str() {
        "rembg" => Arc::new(RembgRemover::new(binary, timeout)),
        "noop" | "none" | "disabled" => Arc::new(PassthroughRemover),
        _ => {
            tracing::warn!(
                "Unknown remover type '{}', using PassthroughRemover",
                remover_type
            );
            Arc::new(PassthroughRemover)
        }
    }
}
