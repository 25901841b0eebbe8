use anyhow::{Context, Result, bail};
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

/// Loads a binary capture file (packed little-endian u16 timer counts).
pub fn load_binary_file<P: AsRef<Path>>(path: P) -> Result<Vec<u16>> {
    let mut file = File::open(path.as_ref()).context("Failed to open capture file")?;
    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer)
        .context("Failed to read capture file")?;

    decode_samples(&buffer)
        .with_context(|| format!("Invalid capture file {}", path.as_ref().display()))
}

pub fn decode_samples(bytes: &[u8]) -> Result<Vec<u16>> {
    if bytes.len() % 2 != 0 {
        bail!("odd byte count {} in packed u16 stream", bytes.len());
    }
    Ok(bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect())
}

pub fn write_binary_file<P: AsRef<Path>>(path: P, samples: &[u16]) -> Result<()> {
    let file = File::create(path.as_ref()).context("Failed to create capture file")?;
    let mut writer = BufWriter::new(file);
    for sample in samples {
        writer.write_all(&sample.to_le_bytes())?;
    }
    writer.flush()?;
    Ok(())
}

/// Splits a recording into consecutive windows of `per_session` samples.
///
/// Each window is one complete session's worth of edges. Trailing samples
/// that do not fill a window are returned separately.
pub fn split_sessions(samples: &[u16], per_session: usize) -> (Vec<&[u16]>, &[u16]) {
    if per_session == 0 {
        return (Vec::new(), samples);
    }
    let chunks = samples.chunks_exact(per_session);
    let rest = chunks.remainder();
    (chunks.collect(), rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_little_endian() {
        assert_eq!(
            decode_samples(&[0xE8, 0x03, 0xFF, 0xFF]).unwrap(),
            vec![1000, 65535]
        );
        assert!(decode_samples(&[]).unwrap().is_empty());
    }

    #[test]
    fn rejects_odd_length() {
        assert!(decode_samples(&[1, 2, 3]).is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = load_binary_file("/nonexistent/edgehist.cap").unwrap_err();
        assert!(err.to_string().contains("Failed to open"));
    }

    #[test]
    fn splits_into_windows() {
        let samples: Vec<u16> = (0..7).collect();
        let (windows, rest) = split_sessions(&samples, 3);
        assert_eq!(windows, vec![&[0, 1, 2][..], &[3, 4, 5][..]]);
        assert_eq!(rest, &[6]);

        let (windows, rest) = split_sessions(&samples, 0);
        assert!(windows.is_empty());
        assert_eq!(rest.len(), 7);
    }
}
