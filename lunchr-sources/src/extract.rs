//! Text extraction from PDF menus and scanned images through external tools.

use std::process::Stdio;

use lunchr_core::SourceError;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Kind of binary document handed to [`extract_text`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractFormat {
    /// PDF, converted with `pdftotext -layout`.
    Pdf,
    /// Scanned image, read with `tesseract` using the Czech model.
    Image,
}

impl ExtractFormat {
    fn command(self) -> (&'static str, &'static [&'static str]) {
        match self {
            ExtractFormat::Pdf => ("pdftotext", &["-layout", "-", "-"]),
            ExtractFormat::Image => ("tesseract", &["stdin", "stdout", "-l", "ces"]),
        }
    }
}

/// Turn a PDF or an image into plain text.
///
/// # Errors
///
/// Returns [`SourceError::Io`] when the tool cannot be started and
/// [`SourceError::Extraction`] when it fails or produces no text.
pub async fn extract_text(bytes: &[u8], format: ExtractFormat) -> Result<String, SourceError> {
    let (program, args) = format.command();
    run_tool(program, args, bytes).await
}

async fn run_tool(program: &str, args: &[&str], input: &[u8]) -> Result<String, SourceError> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()?;

    // Feed stdin while the output is drained, large PDFs fill the pipe otherwise.
    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| SourceError::Extraction(format!("{program}: stdin not captured")))?;
    let owned = input.to_vec();
    let writer = tokio::spawn(async move {
        let written = stdin.write_all(&owned).await;
        drop(stdin);
        written
    });

    let output = child.wait_with_output().await?;
    match writer.await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => tracing::debug!(program, error = %err, "tool closed stdin early"),
        Err(err) => return Err(SourceError::Internal(err.to_string())),
    }

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SourceError::Extraction(format!(
            "{program} exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    let text = String::from_utf8_lossy(&output.stdout).into_owned();
    if text.trim().is_empty() {
        return Err(SourceError::Extraction(format!("{program} returned no text")));
    }
    tracing::debug!(program, chars = text.len(), "text extracted");
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn tool_output_is_returned() {
        let text = run_tool("cat", &[], "1. Guláš 139 Kč\n".as_bytes())
            .await
            .unwrap();
        assert_eq!(text, "1. Guláš 139 Kč\n");
    }

    #[tokio::test]
    async fn empty_output_is_an_error() {
        assert!(matches!(
            run_tool("cat", &[], b"  \n").await,
            Err(SourceError::Extraction(_))
        ));
    }

    #[tokio::test]
    async fn failing_or_missing_tools_are_errors() {
        assert!(matches!(
            run_tool("false", &[], b"").await,
            Err(SourceError::Extraction(_))
        ));
        assert!(matches!(
            run_tool("lunchr-no-such-tool", &[], b"").await,
            Err(SourceError::Io(_))
        ));
    }
}
