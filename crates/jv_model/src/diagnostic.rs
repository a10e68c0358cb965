//! Compiler problem reports.

/// A problem exactly as the compile capability reported it: a message and a
/// 1-based line number in the generated source (0 when the toolchain gave
/// no position).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawDiagnostic {
    pub message: String,
    pub line: u32,
}

impl RawDiagnostic {
    pub fn new(message: impl Into<String>, line: u32) -> Self {
        Self {
            message: message.into(),
            line,
        }
    }
}

/// Uniform error record handed back to the engine.
///
/// `line` is still a generated-source line; the wrapper that owns the page
/// line-map remaps it to a template position before showing it to a user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorDetail {
    pub file_name: String,
    pub message: String,
    pub line: u32,
}

impl ErrorDetail {
    pub fn new(file_name: impl Into<String>, message: impl Into<String>, line: u32) -> Self {
        Self {
            file_name: file_name.into(),
            message: message.into(),
            line,
        }
    }
}

pub mod codes {
    pub const TOOL_UNAVAILABLE: &str = "jv.error.toolchain";
    pub const BAD_ENCODING: &str = "jv.error.encoding";
    pub const IO_FAILURE: &str = "jv.error.io";
}
