//! The measured output set for one job.

use serde::{Deserialize, Serialize};

/// Everything the probe measures for one (file, compiler, flags) combination.
///
/// Times are wall-clock seconds, the minimum over repeated runs. Baseline
/// values come from compiling an empty program with the same flags and are
/// stored next to the raw values, not subtracted from them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    /// First line of the compiler's version banner.
    pub compiler_version: String,

    /// Preprocess command line, with scratch paths reduced to file names.
    #[serde(default)]
    pub preproc_cmd: String,

    /// Compile command line, with scratch paths reduced to file names.
    #[serde(default)]
    pub compile_cmd: String,

    /// Seconds to preprocess the main unit.
    pub preprocessing_time: f64,

    /// Seconds to preprocess the baseline unit.
    pub preprocessing_time_base: f64,

    /// Seconds to compile the main unit.
    pub compile_time: f64,

    /// Seconds to compile the baseline unit.
    pub compile_time_base: f64,

    /// Object file size of the main unit in bytes.
    pub object_size: u64,

    /// Object file size of the baseline unit in bytes.
    pub object_size_base: u64,

    /// Preprocessed lines containing at least one identifier character.
    pub line_count: u64,

    /// All preprocessed lines.
    pub line_count_raw: u64,

    /// Symbol table aggregates, one entry per symbol class.
    pub symbols: SymbolSummary,

    /// Number of printable strings in the main object.
    pub string_count: u64,

    /// Total length of those strings.
    pub string_size: u64,

    /// Section sizes of the main object.
    pub sections: SectionSizes,
}

/// The five buckets every symbol type code falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolClass {
    /// Referenced but not defined here (`U`).
    Undefined,
    /// Initialized, read-only, uninitialized and small data.
    Data,
    /// Text (code) section symbols.
    Code,
    /// Weak objects and functions, unique globals.
    Weak,
    /// Debugging and absolute symbols.
    Debug,
}

impl SymbolClass {
    /// All classes in the order they are stored.
    pub const ALL: [SymbolClass; 5] = [
        SymbolClass::Undefined,
        SymbolClass::Data,
        SymbolClass::Code,
        SymbolClass::Weak,
        SymbolClass::Debug,
    ];
}

/// Count, cumulative size and cumulative name length of one symbol class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolStats {
    /// Number of symbols.
    pub count: u64,
    /// Sum of symbol sizes in bytes.
    pub size: u64,
    /// Sum of symbol name lengths in bytes.
    pub name_length: u64,
}

/// Per-class symbol aggregates of one object file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolSummary {
    /// Undefined symbols.
    pub undefined: SymbolStats,
    /// Data symbols.
    pub data: SymbolStats,
    /// Code symbols.
    pub code: SymbolStats,
    /// Weak symbols.
    pub weak: SymbolStats,
    /// Debug symbols.
    pub debug: SymbolStats,
}

impl SymbolSummary {
    /// Adds one symbol to the aggregate of its class.
    pub fn record(&mut self, class: SymbolClass, size: u64, name_length: u64) {
        let stats = self.get_mut(class);
        stats.count += 1;
        stats.size += size;
        stats.name_length += name_length;
    }

    /// Returns the aggregate of one class.
    pub fn get(&self, class: SymbolClass) -> &SymbolStats {
        match class {
            SymbolClass::Undefined => &self.undefined,
            SymbolClass::Data => &self.data,
            SymbolClass::Code => &self.code,
            SymbolClass::Weak => &self.weak,
            SymbolClass::Debug => &self.debug,
        }
    }

    fn get_mut(&mut self, class: SymbolClass) -> &mut SymbolStats {
        match class {
            SymbolClass::Undefined => &mut self.undefined,
            SymbolClass::Data => &mut self.data,
            SymbolClass::Code => &mut self.code,
            SymbolClass::Weak => &mut self.weak,
            SymbolClass::Debug => &mut self.debug,
        }
    }

    /// Total number of symbols across all classes.
    pub fn total_count(&self) -> u64 {
        SymbolClass::ALL.iter().map(|c| self.get(*c).count).sum()
    }

    /// Total name length across all classes.
    pub fn total_name_length(&self) -> u64 {
        SymbolClass::ALL.iter().map(|c| self.get(*c).name_length).sum()
    }
}

/// Text, data and bss section sizes reported by the size tool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionSizes {
    /// Text section size in bytes.
    pub text: u64,
    /// Data section size in bytes.
    pub data: u64,
    /// Bss section size in bytes.
    pub bss: u64,
}
