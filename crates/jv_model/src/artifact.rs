use crate::class_name;

/// One compiled class: its binary name plus the bytes of its class file.
///
/// A single compilation unit can produce several artifacts, one per
/// physical class file (top-level, nested, anonymous).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BytecodeArtifact {
    pub class_name: String,
    pub bytes: Vec<u8>,
}

impl BytecodeArtifact {
    pub fn new(class_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            class_name: class_name.into(),
            bytes,
        }
    }

    /// Package this artifact files under, `""` for the default package.
    pub fn package_name(&self) -> &str {
        class_name::package_of(&self.class_name)
    }
}
