//! Parser for text capture files.
//!
//! Each line carries at most one decimal timer count. Leading and trailing
//! whitespace is ignored, as is anything after a `#`:
//!
//! ```text
//! # scope capture, 1 MHz timer
//! 1000
//! 1975   # second edge
//!
//! 2950
//! ```

use anyhow::{Context, Result, anyhow};
use nom::IResult;
use nom::bytes::complete::tag;
use nom::character::complete::{digit1, space0};
use nom::combinator::{all_consuming, map_res, opt, rest};
use nom::sequence::preceded;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

fn timestamp(input: &str) -> IResult<&str, u16> {
    map_res(digit1, str::parse::<u16>)(input)
}

fn comment(input: &str) -> IResult<&str, &str> {
    preceded(tag("#"), rest)(input)
}

fn line(input: &str) -> IResult<&str, Option<u16>> {
    let (input, _) = space0(input)?;
    let (input, value) = opt(timestamp)(input)?;
    let (input, _) = space0(input)?;
    let (input, _) = opt(comment)(input)?;
    Ok((input, value))
}

/// Parses a single line, returning `None` for blank and comment-only lines.
pub fn parse_line(text: &str) -> Result<Option<u16>> {
    let text = text.trim_end_matches('\r');
    all_consuming(line)(text)
        .map(|(_, value)| value)
        .map_err(|e| anyhow!("malformed timestamp {:?}: {}", text, e))
}

pub fn parse_text(text: &str) -> Result<Vec<u16>> {
    let mut samples = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        if let Some(value) = parse_line(raw).with_context(|| format!("line {}", idx + 1))? {
            samples.push(value);
        }
    }
    Ok(samples)
}

/// Loads a text capture file.
pub fn load_text_file<P: AsRef<Path>>(path: P) -> Result<Vec<u16>> {
    let file = File::open(path.as_ref()).context("Failed to open capture file")?;
    let reader = BufReader::new(file);

    let mut samples = Vec::new();
    for (idx, raw) in reader.lines().enumerate() {
        let raw = raw.context("Failed to read capture file")?;
        let parsed = parse_line(&raw).with_context(|| {
            format!("{}:{}", path.as_ref().display(), idx + 1)
        })?;
        if let Some(value) = parsed {
            samples.push(value);
        }
    }
    Ok(samples)
}

pub fn write_text_file<P: AsRef<Path>>(path: P, samples: &[u16]) -> Result<()> {
    let file = File::create(path.as_ref()).context("Failed to create capture file")?;
    let mut writer = BufWriter::new(file);
    for sample in samples {
        writeln!(writer, "{}", sample)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_with_values_and_comments() {
        assert_eq!(parse_line("1000").unwrap(), Some(1000));
        assert_eq!(parse_line("  1975  # second edge").unwrap(), Some(1975));
        assert_eq!(parse_line("65535\r").unwrap(), Some(65535));
        assert_eq!(parse_line("").unwrap(), None);
        assert_eq!(parse_line("   ").unwrap(), None);
        assert_eq!(parse_line("# header").unwrap(), None);
    }

    #[test]
    fn rejects_garbage_and_overflow() {
        assert!(parse_line("12ab").is_err());
        assert!(parse_line("-5").is_err());
        assert!(parse_line("70000").is_err());
        assert!(parse_line("1 2").is_err());
    }

    #[test]
    fn whole_text_reports_line_number() {
        let samples = parse_text("# capture\n1000\n\n1975\n2950\n").unwrap();
        assert_eq!(samples, vec![1000, 1975, 2950]);

        let err = parse_text("1000\nbogus\n").unwrap_err();
        assert!(format!("{:#}", err).contains("line 2"));
    }
}
