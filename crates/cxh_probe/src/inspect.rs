//! Parsers for preprocessor output and the object inspection tools.

use cxh_common::SectionSizes;

use crate::error::ProbeError;
use crate::toolchain::ToolKind;

/// Lines the main unit adds around the measured file.
const WRAPPER_LINES: u64 = 2;

/// Counts preprocessed lines as `(raw, non_trivial)`.
///
/// A line is non-trivial if it contains an ASCII letter, digit or underscore.
/// Both counts exclude the wrapper lines of the main unit.
pub fn count_lines(preprocessed: &[u8]) -> (u64, u64) {
    let mut raw = 0u64;
    let mut non_trivial = 0u64;
    for line in preprocessed.split_inclusive(|b| *b == b'\n') {
        raw += 1;
        if line.iter().any(|b| b.is_ascii_alphanumeric() || *b == b'_') {
            non_trivial += 1;
        }
    }
    (
        raw.saturating_sub(WRAPPER_LINES),
        non_trivial.saturating_sub(WRAPPER_LINES),
    )
}

/// Returns the number of strings and their total length.
pub fn summarize_strings(output: &str) -> (u64, u64) {
    output
        .lines()
        .fold((0, 0), |(count, size), l| (count + 1, size + l.len() as u64))
}

/// Extracts text/data/bss from Berkeley-format `size` output.
///
/// The row for the object is the first line that mentions `object_name`.
pub fn parse_section_sizes(output: &str, object_name: &str) -> Result<SectionSizes, ProbeError> {
    let line = output
        .lines()
        .find(|l| l.contains(object_name))
        .ok_or_else(|| ProbeError::Tool {
            tool: ToolKind::SectionSizes,
            reason: format!("no summary line for '{object_name}'"),
        })?;

    let mut fields = line.split_whitespace().map(|f| {
        f.parse::<u64>().map_err(|e| ProbeError::Tool {
            tool: ToolKind::SectionSizes,
            reason: format!("bad size field '{f}' in line '{line}': {e}"),
        })
    });
    let mut next = || {
        fields.next().unwrap_or_else(|| {
            Err(ProbeError::Tool {
                tool: ToolKind::SectionSizes,
                reason: format!("truncated summary line '{line}'"),
            })
        })
    };

    Ok(SectionSizes {
        text: next()?,
        data: next()?,
        bss: next()?,
    })
}

/// Returns the first line of a version banner.
///
/// Most compilers print to stdout; `cl.exe` prints to stderr. A compiler that
/// prints nothing at all is a [`ProbeError::Tool`] error.
pub fn first_version_line(stdout: &str, stderr: &str) -> Result<String, ProbeError> {
    [stdout, stderr]
        .iter()
        .find_map(|s| s.lines().map(str::trim).find(|l| !l.is_empty()))
        .map(str::to_string)
        .ok_or_else(|| ProbeError::Tool {
            tool: ToolKind::Version,
            reason: "empty version banner".to_string(),
        })
}
