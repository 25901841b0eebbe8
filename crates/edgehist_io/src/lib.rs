//! I/O utilities for recorded edge-capture streams.
//!
//! Provides functions for reading and writing capture files: sequences of raw
//! 16-bit timer counts taken at successive rising edges. Two encodings are
//! supported, a packed little-endian binary form and a line-oriented text
//! form that is convenient to edit by hand.

use std::path::Path;

use anyhow::Result;

/// Binary capture file loading and writing.
///
/// Handles packed little-endian u16 files, extension-based format detection,
/// and splitting a recording into per-session sample windows.
pub mod loader;

/// Parser for text capture files.
///
/// Parses one decimal timestamp per line, with blank lines and `#` comments
/// ignored, reporting the offending line number on malformed input.
pub mod parser;

/// On-disk encoding of a capture file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureFormat {
    /// Packed little-endian u16 values.
    Binary,
    /// One decimal value per line.
    Text,
}

impl CaptureFormat {
    /// Picks the text encoding for `.txt`/`.csv` files and binary otherwise.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        match path.as_ref().extension().and_then(|ext| ext.to_str()) {
            Some("txt") | Some("csv") => CaptureFormat::Text,
            _ => CaptureFormat::Binary,
        }
    }
}

/// Loads a capture file in whichever format its extension implies.
pub fn load_capture_file<P: AsRef<Path>>(path: P) -> Result<Vec<u16>> {
    match CaptureFormat::from_path(&path) {
        CaptureFormat::Binary => loader::load_binary_file(path),
        CaptureFormat::Text => parser::load_text_file(path),
    }
}

/// Writes `samples` to `path` in the requested format.
pub fn write_capture_file<P: AsRef<Path>>(
    path: P,
    samples: &[u16],
    format: CaptureFormat,
) -> Result<()> {
    match format {
        CaptureFormat::Binary => loader::write_binary_file(path, samples),
        CaptureFormat::Text => parser::write_text_file(path, samples),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_follows_extension() {
        assert_eq!(CaptureFormat::from_path("a.txt"), CaptureFormat::Text);
        assert_eq!(CaptureFormat::from_path("dir/a.csv"), CaptureFormat::Text);
        assert_eq!(CaptureFormat::from_path("a.cap"), CaptureFormat::Binary);
        assert_eq!(CaptureFormat::from_path("noext"), CaptureFormat::Binary);
    }

    #[test]
    fn both_formats_load_back() {
        let samples = [0u16, 1000, 65535, 42];
        let dir = std::env::temp_dir();
        for (name, format) in [
            ("edgehist_io_roundtrip.cap", CaptureFormat::Binary),
            ("edgehist_io_roundtrip.txt", CaptureFormat::Text),
        ] {
            let path = dir.join(format!("{}-{}", std::process::id(), name));
            write_capture_file(&path, &samples, format).unwrap();
            assert_eq!(load_capture_file(&path).unwrap(), samples);
            std::fs::remove_file(&path).unwrap();
        }
    }
}
