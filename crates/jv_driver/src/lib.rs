//! Compilation driver for the javelin pipeline.
//!
//! Orchestrates one in-memory compile: builds a source unit, assembles
//! options and classpath, installs the virtual output sink and classpath
//! view around an injected `Toolchain` capability, and either promotes the
//! produced bytecode into the shared store or hands back translated
//! diagnostics.

pub mod classpath;
pub mod diag;
mod driver;
mod host;
mod javac;
mod toolchain;

pub use driver::{CompileError, CompilerConfig, Driver};
pub use host::{ClassOutput, CompileSession};
pub use javac::JavacToolchain;
pub use toolchain::{
    ClassEntry, CompileHost, CompileRequest, Location, Toolchain, ToolchainError, ToolchainRun,
};
