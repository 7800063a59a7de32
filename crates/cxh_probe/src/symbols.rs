//! Symbol table classification.
//!
//! Every `nm` type code maps to exactly one [`SymbolClass`]; codes outside the
//! known sets are reported as [`ProbeError::UnknownSymbolType`] instead of
//! being folded into a catch-all bucket.

use cxh_common::{SymbolClass, SymbolSummary};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ProbeError;
use crate::toolchain::ToolKind;

/// `address size type name`, with address and size optional.
static SYMBOL_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:[0-9a-fA-F]+\s+)?(?:([0-9a-fA-F]+)\s+)?(\S)\s+(.+)$")
        .expect("Invalid regex pattern")
});

/// Maps an `nm` type code to its class.
pub fn classify(code: char, line: &str) -> Result<SymbolClass, ProbeError> {
    match code {
        'U' => Ok(SymbolClass::Undefined),
        'b' | 'B' | 'r' | 'R' | 'd' | 'D' | 'n' | 'g' | 'G' => Ok(SymbolClass::Data),
        't' | 'T' => Ok(SymbolClass::Code),
        'w' | 'W' | 'v' | 'V' | 'u' => Ok(SymbolClass::Weak),
        'N' | 'a' => Ok(SymbolClass::Debug),
        _ => Err(ProbeError::UnknownSymbolType {
            code,
            line: line.to_string(),
        }),
    }
}

/// One parsed line of a symbol dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolLine<'a> {
    /// Symbol size in bytes, zero when the dump has no size column.
    pub size: u64,
    /// The one-letter type code.
    pub code: char,
    /// The symbol name.
    pub name: &'a str,
}

/// Parses one non-empty line of `nm -a -S` output.
pub fn parse_line(line: &str) -> Result<SymbolLine<'_>, ProbeError> {
    let caps = SYMBOL_LINE.captures(line).ok_or_else(|| ProbeError::Tool {
        tool: ToolKind::SymbolDump,
        reason: format!("could not parse line '{line}'"),
    })?;

    let size = match caps.get(1) {
        Some(m) => u64::from_str_radix(m.as_str(), 16).map_err(|e| ProbeError::Tool {
            tool: ToolKind::SymbolDump,
            reason: format!("bad symbol size in line '{line}': {e}"),
        })?,
        None => 0,
    };
    // both groups are mandatory in the pattern
    let code = caps[2].chars().next().unwrap_or_default();
    let name = caps.get(3).map_or("", |m| m.as_str());

    Ok(SymbolLine { size, code, name })
}

/// Aggregates a whole symbol dump, skipping blank lines and `entry_symbol`.
pub fn summarize_symbols(dump: &str, entry_symbol: &str) -> Result<SymbolSummary, ProbeError> {
    let mut summary = SymbolSummary::default();
    for line in dump.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let sym = parse_line(line)?;
        if sym.name == entry_symbol {
            continue;
        }
        let class = classify(sym.code, line)?;
        summary.record(class, sym.size, sym.name.len() as u64);
    }
    Ok(summary)
}
