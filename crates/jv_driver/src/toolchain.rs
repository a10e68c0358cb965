//! The compile capability and the strategy interface it sees.
//!
//! A `Toolchain` is "compile(source, options) -> diagnostics + written
//! outputs". It never touches the store directly: every class file it wants
//! to write goes through `CompileHost::open_output`, and every classpath
//! question it asks goes through `list_package` / `binary_name_of`. That
//! keeps toolchains swappable and lets tests drive the pipeline with a
//! canned double.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use jv_model::{BytecodeArtifact, CompilationUnit, RawDiagnostic};

use crate::host::ClassOutput;

/// Which search space a classpath query targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Location {
    ClassPath,
    PlatformClasses,
}

/// One resolvable class as seen by a toolchain.
#[derive(Clone, Debug)]
pub enum ClassEntry {
    /// Compiled earlier in this run; exists only in the package registry.
    Memory(Arc<BytecodeArtifact>),
    /// A `.class` file under a classpath directory.
    Dir { package: String, path: PathBuf },
    /// A `.class` entry inside a jar on the classpath.
    Jar {
        package: String,
        archive: PathBuf,
        entry: String,
    },
}

impl ClassEntry {
    /// Binary class name of this entry. Memory entries report the name
    /// recorded when the artifact was created; there is no file path to
    /// derive it from.
    pub fn binary_name(&self) -> String {
        match self {
            ClassEntry::Memory(artifact) => artifact.class_name.clone(),
            ClassEntry::Dir { package, path } => {
                let stem = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                join_binary_name(package, &stem)
            }
            ClassEntry::Jar { package, entry, .. } => {
                let file = entry.rsplit('/').next().unwrap_or(entry);
                let stem = file.strip_suffix(".class").unwrap_or(file);
                join_binary_name(package, stem)
            }
        }
    }
}

fn join_binary_name(package: &str, simple: &str) -> String {
    if package.is_empty() {
        simple.to_string()
    } else {
        format!("{package}.{simple}")
    }
}

/// Everything a toolchain needs for one invocation.
pub struct CompileRequest<'a> {
    pub unit: &'a CompilationUnit,
    /// Source file name presented to the toolchain (`Simple.java`).
    pub file_name: String,
    /// Accumulated compiler options (`-proc:none`, `-g`, ...).
    pub options: &'a [String],
    /// On-disk classpath, already expanded through jar manifests.
    pub class_path: &'a [PathBuf],
    /// Generated-namespace packages with registry entries. A toolchain
    /// that cannot resolve memory entries natively can materialize these
    /// through `list_package` before it runs.
    pub memory_packages: &'a [String],
}

/// What one toolchain invocation reported.
#[derive(Debug)]
pub struct ToolchainRun {
    pub success: bool,
    /// Always collected in full, never cut short at the first problem.
    pub diagnostics: Vec<RawDiagnostic>,
}

#[derive(Debug)]
pub enum ToolchainError {
    /// No usable compiler in this runtime. Fatal, not retried.
    Unavailable(String),
    /// The toolchain itself broke partway (scratch IO, wait failure).
    Io(String),
}

impl fmt::Display for ToolchainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolchainError::Unavailable(m) => write!(f, "Compiler unavailable: {m}"),
            ToolchainError::Io(m) => write!(f, "Compiler I/O failure: {m}"),
        }
    }
}

impl std::error::Error for ToolchainError {}

/// The injected compile capability.
pub trait Toolchain {
    fn run(
        &self,
        req: &CompileRequest<'_>,
        host: &dyn CompileHost,
    ) -> Result<ToolchainRun, ToolchainError>;
}

/// Virtual file operations handed to the toolchain: the output sink plus
/// the classpath view.
pub trait CompileHost {
    /// Open a writable channel for one class file. Closing the channel
    /// seals the bytes into an artifact and files it.
    fn open_output(&self, class_name: &str) -> ClassOutput;

    /// Entries available in `package` for `location`. Generated-namespace
    /// packages answer from the registry; everything else is a best-effort
    /// disk listing.
    fn list_package(&self, location: Location, package: &str) -> Vec<ClassEntry>;

    /// Binary name of an entry previously returned by `list_package`.
    fn binary_name_of(&self, entry: &ClassEntry) -> String {
        entry.binary_name()
    }
}
