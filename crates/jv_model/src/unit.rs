use crate::class_name;

/// One compile request: the binary name of the top-level class and the full
/// generated source text. Lives for a single driver invocation.
#[derive(Clone, Debug)]
pub struct CompilationUnit {
    pub class_name: String,
    pub source: String,
}

impl CompilationUnit {
    pub fn new(class_name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            source: source.into(),
        }
    }

    /// File name the toolchain sees for this unit (`Simple.java`).
    pub fn source_file_name(&self) -> String {
        class_name::source_file_name(&self.class_name)
    }
}
