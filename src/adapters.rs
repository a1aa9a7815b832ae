//! External OCR and speech-to-text collaborators
//!
//! The processor reaches the outside world only through these two traits. Both are
//! blocking and carry no timeout of their own; callers that need one wrap the adapter.

use crate::error::{ExtractionError, SpeechError};
use serde::Deserialize;
use std::io::Write;
use std::process::{Command, Stdio};
use tracing::debug;

/// Image bytes to text.
pub trait OcrEngine: Send + Sync {
    fn extract_text(&self, image: &[u8]) -> Result<String, ExtractionError>;
}

/// Audio bytes to text.
pub trait SpeechRecognizer: Send + Sync {
    fn transcribe(&self, audio: &[u8]) -> Result<String, SpeechError>;
}

/// Raster formats accepted by [`TesseractOcr`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Bmp,
    Tiff,
    WebP,
    Pnm,
}

impl ImageFormat {
    /// Identify an image by its leading signature bytes.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, ..] => Some(ImageFormat::Png),
            [0xFF, 0xD8, 0xFF, ..] => Some(ImageFormat::Jpeg),
            [b'G', b'I', b'F', b'8', b'7' | b'9', b'a', ..] => Some(ImageFormat::Gif),
            [b'B', b'M', ..] => Some(ImageFormat::Bmp),
            [b'I', b'I', 0x2A, 0x00, ..] | [b'M', b'M', 0x00, 0x2A, ..] => Some(ImageFormat::Tiff),
            [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => {
                Some(ImageFormat::WebP)
            }
            [b'P', b'1'..=b'6', ..] => Some(ImageFormat::Pnm),
            _ => None,
        }
    }
}

/// OCR settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OcrConfig {
    /// Register an OCR engine at all
    pub enabled: bool,
    /// Executable to run
    pub command: String,
    /// Tesseract language code(s), e.g. `eng` or `spa+eng`
    pub language: String,
}

/// Runs the `tesseract` executable, piping the image through stdin.
#[derive(Debug, Clone)]
pub struct TesseractOcr {
    command: String,
    language: String,
}

impl TesseractOcr {
    pub fn new(command: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            language: language.into(),
        }
    }

    pub fn from_config(config: &OcrConfig) -> Self {
        Self::new(&config.command, &config.language)
    }
}

impl OcrEngine for TesseractOcr {
    fn extract_text(&self, image: &[u8]) -> Result<String, ExtractionError> {
        let format = ImageFormat::sniff(image).ok_or(ExtractionError::UnrecognizedImage)?;
        debug!(?format, bytes = image.len(), command = %self.command, "running OCR");

        let mut child = Command::new(&self.command)
            .args(["stdin", "stdout", "-l", self.language.as_str()])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                ExtractionError::Engine(format!("failed to start {}: {}", self.command, e))
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(image) {
                drop(stdin);
                // reap before reporting
                let _ = child.kill();
                let _ = child.wait();
                return Err(ExtractionError::Engine(format!(
                    "failed to send image to {}: {}",
                    self.command, e
                )));
            }
        }

        let output = child
            .wait_with_output()
            .map_err(|e| ExtractionError::Engine(e.to_string()))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractionError::Engine(format!(
                "{} exited with {}: {}",
                self.command,
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_known_formats() {
        assert_eq!(
            ImageFormat::sniff(b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR"),
            Some(ImageFormat::Png)
        );
        assert_eq!(ImageFormat::sniff(b"\xFF\xD8\xFF\xE0"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::sniff(b"GIF89a..."), Some(ImageFormat::Gif));
        assert_eq!(ImageFormat::sniff(b"RIFF\0\0\0\0WEBPVP8 "), Some(ImageFormat::WebP));
        assert_eq!(ImageFormat::sniff(b"P6\n1 1\n255\n"), Some(ImageFormat::Pnm));
    }

    #[test]
    fn test_sniff_rejects_other_data() {
        assert_eq!(ImageFormat::sniff(b"fake image bytes"), None);
        assert_eq!(ImageFormat::sniff(b""), None);
        assert_eq!(ImageFormat::sniff(b"RIFF\0\0\0\0WAVEfmt "), None);
    }

    #[test]
    fn test_tesseract_rejects_non_images_without_spawning() {
        let ocr = TesseractOcr::new("/nonexistent/tesseract", "eng");
        assert_eq!(
            ocr.extract_text(b"fake image bytes"),
            Err(ExtractionError::UnrecognizedImage)
        );
    }

    #[test]
    fn test_engine_that_ignores_stdin() {
        // `true` exits without reading, so the pipe breaks mid-write
        let ocr = TesseractOcr::new("true", "eng");
        let mut image = b"\x89PNG\r\n\x1a\n".to_vec();
        image.resize(8 * 1024 * 1024, 0);
        let err = ocr.extract_text(&image).unwrap_err();
        assert!(
            matches!(err, ExtractionError::Engine(ref m) if m.contains("failed to send image")),
            "{err:?}"
        );
    }

    #[test]
    fn test_tesseract_missing_binary() {
        let ocr = TesseractOcr::new("/nonexistent/tesseract", "eng");
        let err = ocr.extract_text(b"\x89PNG\r\n\x1a\n").unwrap_err();
        assert!(matches!(err, ExtractionError::Engine(ref m) if m.contains("failed to start")));
    }
}
