//! Core types for the javelin compilation pipeline.
//!
//! This crate contains the vocabulary types that are independent of any
//! toolchain or store:
//! - class-name utilities for fully qualified (binary) Java class names
//! - `CompilationUnit` - one in-memory source-to-classes compile request
//! - `BytecodeArtifact` - one compiled class's bytes plus its class name
//! - `RawDiagnostic` / `ErrorDetail` - compiler problem reports

pub mod class_name;
mod artifact;
mod diagnostic;
mod unit;

pub use artifact::BytecodeArtifact;
pub use diagnostic::{ErrorDetail, RawDiagnostic, codes};
pub use unit::CompilationUnit;
