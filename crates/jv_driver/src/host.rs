//! The compile session: virtual output sink + virtual classpath view.

use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use jv_model::BytecodeArtifact;
use jv_store::BytecodeStore;

use crate::classpath;
use crate::toolchain::{ClassEntry, CompileHost, Location};

/// Whether `package` falls under the engine's generated-classes namespace.
pub(crate) fn in_namespace(package: &str, namespace: &str) -> bool {
    package == namespace
        || (package.len() > namespace.len()
            && package.starts_with(namespace)
            && package.as_bytes()[namespace.len()] == b'.')
}

struct SessionShared {
    store: Arc<BytecodeStore>,
    pending: Mutex<Vec<Arc<BytecodeArtifact>>>,
}

/// Per-invocation host installed around the toolchain.
///
/// Output channels file artifacts into the shared store's registry as they
/// close and record them here as pending; the driver later promotes the
/// pending set on success or rolls it back on failure.
pub struct CompileSession {
    shared: Arc<SessionShared>,
    generated_package: String,
    class_path: Vec<PathBuf>,
    extension_dirs: Vec<PathBuf>,
}

impl CompileSession {
    pub fn new(
        store: Arc<BytecodeStore>,
        generated_package: String,
        class_path: Vec<PathBuf>,
        extension_dirs: Vec<PathBuf>,
    ) -> Self {
        Self {
            shared: Arc::new(SessionShared {
                store,
                pending: Mutex::new(Vec::new()),
            }),
            generated_package,
            class_path,
            extension_dirs,
        }
    }

    /// Artifacts produced so far in this invocation.
    pub fn pending(&self) -> Vec<Arc<BytecodeArtifact>> {
        self.shared
            .pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Remove everything this session filed from the registry. Entries a
    /// concurrent compile replaced in the meantime are left alone.
    pub fn rollback(&self) {
        let pending = self.pending();
        for artifact in &pending {
            self.shared.store.unfile(artifact);
        }
        if !pending.is_empty() {
            log::debug!(
                "rolled back {} artifact(s) from a failed compilation",
                pending.len()
            );
        }
    }
}

impl CompileHost for CompileSession {
    fn open_output(&self, class_name: &str) -> ClassOutput {
        ClassOutput {
            class_name: class_name.to_string(),
            buf: Vec::new(),
            shared: self.shared.clone(),
        }
    }

    fn list_package(&self, location: Location, package: &str) -> Vec<ClassEntry> {
        match location {
            Location::ClassPath if in_namespace(package, &self.generated_package) => {
                // Classes from earlier compilations in this run exist only
                // in memory; the disk view is ignored for this namespace.
                self.shared
                    .store
                    .list_package(package)
                    .into_iter()
                    .map(ClassEntry::Memory)
                    .collect()
            }
            Location::ClassPath => classpath::list_disk_package(&self.class_path, package),
            Location::PlatformClasses => {
                classpath::list_extension_package(&self.extension_dirs, package)
            }
        }
    }
}

/// Writable byte channel for one class file.
///
/// `close` seals the accumulated bytes into a `BytecodeArtifact`, files it
/// in the package registry and appends it to the session's pending list.
/// Dropping an unclosed channel discards the bytes.
pub struct ClassOutput {
    class_name: String,
    buf: Vec<u8>,
    shared: Arc<SessionShared>,
}

impl ClassOutput {
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn close(self) -> Arc<BytecodeArtifact> {
        let artifact = Arc::new(BytecodeArtifact::new(self.class_name, self.buf));
        self.shared.store.file(artifact.clone());
        self.shared
            .pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(artifact.clone());
        artifact
    }
}

impl io::Write for ClassOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespace_matching() {
        assert!(in_namespace("org.javelin.pages", "org.javelin.pages"));
        assert!(in_namespace("org.javelin.pages.sub", "org.javelin.pages"));
        assert!(!in_namespace("org.javelin.pagesx", "org.javelin.pages"));
        assert!(!in_namespace("org.javelin", "org.javelin.pages"));
    }
}
