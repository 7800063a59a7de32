//! Platform-specific command syntax for the four tool capabilities.
//!
//! The probe needs a compiler (preprocess, compile, version query), a symbol
//! dump tool, a string extraction tool and a section size tool. A
//! [`Toolchain`] turns each capability into a [`ToolCommand`]; nothing else in
//! the probe knows whether flags are spelled `-c` or `/c`.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use crate::error::ProbeError;

/// Host platform families with a toolchain variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Platform {
    /// Linux and other Unix systems with binutils-style tools.
    Posix,
    /// macOS: binutils-style tools, Mach-O symbol names carry a leading underscore.
    MacOs,
    /// Windows with `cl.exe`.
    Windows,
}

impl Platform {
    /// Detects the platform this binary was built for.
    pub fn current() -> Result<Self, ProbeError> {
        Self::from_os(std::env::consts::OS, cfg!(unix))
    }

    fn from_os(os: &str, unix: bool) -> Result<Self, ProbeError> {
        match os {
            "windows" => Ok(Platform::Windows),
            "macos" => Ok(Platform::MacOs),
            _ if unix => Ok(Platform::Posix),
            _ => Err(ProbeError::UnsupportedPlatform { os: os.to_string() }),
        }
    }
}

/// The capability a command exercises.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ToolKind {
    /// Compiler in preprocess-only mode.
    Preprocess,
    /// Compiler in compile-to-object mode.
    Compile,
    /// Compiler version banner.
    Version,
    /// Symbol table dump of an object.
    SymbolDump,
    /// Printable strings of an object.
    Strings,
    /// Text/data/bss section sizes of an object.
    SectionSizes,
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ToolKind::Preprocess => "preprocessing",
            ToolKind::Compile => "compilation",
            ToolKind::Version => "version query",
            ToolKind::SymbolDump => "symbol dump",
            ToolKind::Strings => "string extraction",
            ToolKind::SectionSizes => "size summary",
        };
        f.write_str(name)
    }
}

/// A fully-specified tool invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolCommand {
    /// Capability exercised by this command.
    pub kind: ToolKind,
    /// Executable to run.
    pub program: PathBuf,
    /// Arguments, in order.
    pub args: Vec<OsString>,
    /// Working directory, or the current one if `None`.
    pub cwd: Option<PathBuf>,
    /// File read by the command, if any.
    pub input: Option<PathBuf>,
    /// File written by the command, if any.
    pub output: Option<PathBuf>,
    /// Whether a non-zero exit status is a failure.
    pub check_status: bool,
}

impl ToolCommand {
    fn new(kind: ToolKind, program: &Path) -> Self {
        Self {
            kind,
            program: program.to_path_buf(),
            args: Vec::new(),
            cwd: None,
            input: None,
            output: None,
            check_status: true,
        }
    }

    fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    fn input(mut self, path: &Path) -> Self {
        self.input = Some(path.to_path_buf());
        self
    }

    fn output(mut self, path: &Path) -> Self {
        self.output = Some(path.to_path_buf());
        self
    }

    /// Runs the command in `dir` instead of the current directory.
    pub fn in_dir(mut self, dir: Option<&Path>) -> Self {
        self.cwd = dir.map(Path::to_path_buf);
        self
    }

    /// Renders the command line with `scratch_dir` stripped from every argument.
    ///
    /// Used for the reproducible `preproc_cmd`/`compile_cmd` strings, which
    /// should not depend on where the scratch directory lives.
    pub fn display_relative_to(&self, scratch_dir: &Path) -> String {
        let prefix = format!("{}{}", scratch_dir.display(), MAIN_SEPARATOR);
        std::iter::once(self.program.display().to_string())
            .chain(
                self.args
                    .iter()
                    .map(|a| a.to_string_lossy().replace(&prefix, "")),
            )
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Executables used for the object inspection capabilities.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolPaths {
    /// Symbol dump tool.
    pub nm: PathBuf,
    /// String extraction tool.
    pub strings: PathBuf,
    /// Section size tool.
    pub size: PathBuf,
}

impl ToolPaths {
    /// Returns the default tool names for a platform, resolved through `PATH`.
    pub fn for_platform(platform: Platform) -> Self {
        match platform {
            Platform::Posix | Platform::MacOs => Self {
                nm: PathBuf::from("nm"),
                strings: PathBuf::from("strings"),
                size: PathBuf::from("size"),
            },
            Platform::Windows => Self {
                nm: PathBuf::from("llvm-nm"),
                strings: PathBuf::from("llvm-strings"),
                size: PathBuf::from("llvm-size"),
            },
        }
    }
}

/// Command syntax of one platform's compiler and inspection tools.
pub trait Toolchain: Send + Sync {
    /// The platform this toolchain targets.
    fn platform(&self) -> Platform;

    /// Renders an include directory as a compiler flag.
    fn include_arg(&self, dir: &str) -> String;

    /// Name of the entry-point symbol as it appears in the symbol dump.
    fn entry_symbol(&self) -> &str;

    /// Extension of object files, without the dot.
    fn object_extension(&self) -> &str;

    /// Preprocesses `input` into `output`.
    fn preprocess(&self, compiler: &Path, args: &[String], input: &Path, output: &Path)
        -> ToolCommand;

    /// Compiles `input` into the object file `output`.
    fn compile(&self, compiler: &Path, args: &[String], input: &Path, output: &Path)
        -> ToolCommand;

    /// Prints the compiler version banner.
    fn version(&self, compiler: &Path) -> ToolCommand;

    /// Dumps the symbol table of `object`, one `address size type name` line per symbol.
    fn symbol_dump(&self, object: &Path) -> ToolCommand;

    /// Prints the printable strings of `object`, one per line.
    fn strings(&self, object: &Path) -> ToolCommand;

    /// Prints a Berkeley-style `text data bss dec hex filename` summary of `object`.
    fn section_sizes(&self, object: &Path) -> ToolCommand;
}

/// GCC/Clang driver with binutils-compatible inspection tools.
#[derive(Clone, Debug)]
pub struct PosixToolchain {
    tools: ToolPaths,
    platform: Platform,
}

impl PosixToolchain {
    /// Creates a toolchain for ELF objects.
    pub fn new(tools: ToolPaths) -> Self {
        Self {
            tools,
            platform: Platform::Posix,
        }
    }

    /// Creates a toolchain for Mach-O objects.
    pub fn mach_o(tools: ToolPaths) -> Self {
        Self {
            tools,
            platform: Platform::MacOs,
        }
    }
}

impl Toolchain for PosixToolchain {
    fn platform(&self) -> Platform {
        self.platform
    }

    fn include_arg(&self, dir: &str) -> String {
        format!("-I{dir}")
    }

    fn entry_symbol(&self) -> &str {
        match self.platform {
            Platform::MacOs => "_main",
            _ => "main",
        }
    }

    fn object_extension(&self) -> &str {
        "o"
    }

    fn preprocess(
        &self,
        compiler: &Path,
        args: &[String],
        input: &Path,
        output: &Path,
    ) -> ToolCommand {
        ToolCommand::new(ToolKind::Preprocess, compiler)
            .args(args)
            .arg("-E")
            .arg(input)
            .arg("-o")
            .arg(output)
            .input(input)
            .output(output)
    }

    fn compile(&self, compiler: &Path, args: &[String], input: &Path, output: &Path) -> ToolCommand {
        ToolCommand::new(ToolKind::Compile, compiler)
            .args(args)
            .arg("-c")
            .arg(input)
            .arg("-o")
            .arg(output)
            .input(input)
            .output(output)
    }

    fn version(&self, compiler: &Path) -> ToolCommand {
        ToolCommand::new(ToolKind::Version, compiler).arg("--version")
    }

    fn symbol_dump(&self, object: &Path) -> ToolCommand {
        ToolCommand::new(ToolKind::SymbolDump, &self.tools.nm)
            .args(["-a", "-S"])
            .arg(object)
            .input(object)
    }

    fn strings(&self, object: &Path) -> ToolCommand {
        ToolCommand::new(ToolKind::Strings, &self.tools.strings)
            .arg(object)
            .input(object)
    }

    fn section_sizes(&self, object: &Path) -> ToolCommand {
        ToolCommand::new(ToolKind::SectionSizes, &self.tools.size)
            .arg("-B")
            .arg(object)
            .input(object)
    }
}

/// `cl.exe` with LLVM inspection tools, which read COFF objects and print
/// the same formats as binutils.
#[derive(Clone, Debug)]
pub struct MsvcToolchain {
    tools: ToolPaths,
}

impl MsvcToolchain {
    /// Creates a toolchain using the given inspection tools.
    pub fn new(tools: ToolPaths) -> Self {
        Self { tools }
    }
}

impl Toolchain for MsvcToolchain {
    fn platform(&self) -> Platform {
        Platform::Windows
    }

    fn include_arg(&self, dir: &str) -> String {
        format!("/I{dir}")
    }

    fn entry_symbol(&self) -> &str {
        "main"
    }

    fn object_extension(&self) -> &str {
        "obj"
    }

    fn preprocess(
        &self,
        compiler: &Path,
        args: &[String],
        input: &Path,
        output: &Path,
    ) -> ToolCommand {
        let mut fi = OsString::from("/Fi");
        fi.push(output);
        ToolCommand::new(ToolKind::Preprocess, compiler)
            .arg("/nologo")
            .args(args)
            .arg("/P")
            .arg(fi)
            .arg(input)
            .input(input)
            .output(output)
    }

    fn compile(&self, compiler: &Path, args: &[String], input: &Path, output: &Path) -> ToolCommand {
        let mut fo = OsString::from("/Fo");
        fo.push(output);
        ToolCommand::new(ToolKind::Compile, compiler)
            .arg("/nologo")
            .args(args)
            .arg("/c")
            .arg(fo)
            .arg(input)
            .input(input)
            .output(output)
    }

    fn version(&self, compiler: &Path) -> ToolCommand {
        // cl prints its banner on stderr and exits non-zero without inputs.
        let mut cmd = ToolCommand::new(ToolKind::Version, compiler);
        cmd.check_status = false;
        cmd
    }

    fn symbol_dump(&self, object: &Path) -> ToolCommand {
        ToolCommand::new(ToolKind::SymbolDump, &self.tools.nm)
            .args(["-a", "-S"])
            .arg(object)
            .input(object)
    }

    fn strings(&self, object: &Path) -> ToolCommand {
        ToolCommand::new(ToolKind::Strings, &self.tools.strings)
            .arg(object)
            .input(object)
    }

    fn section_sizes(&self, object: &Path) -> ToolCommand {
        ToolCommand::new(ToolKind::SectionSizes, &self.tools.size)
            .arg("-B")
            .arg(object)
            .input(object)
    }
}

/// Returns the toolchain variant for `platform`.
pub fn toolchain_for(platform: Platform, tools: ToolPaths) -> Box<dyn Toolchain> {
    match platform {
        Platform::Posix => Box::new(PosixToolchain::new(tools)),
        Platform::MacOs => Box::new(PosixToolchain::mach_o(tools)),
        Platform::Windows => Box::new(MsvcToolchain::new(tools)),
    }
}
