use std::fs;
use std::path::Path;
use std::sync::{Arc, RwLock};

use jv_model::BytecodeArtifact;
use jv_model::class_name::{belongs_to_unit, sibling_class_file};

use crate::clock::{Clock, SystemClock};
use crate::{FastHashMap, fast_map_new};

struct StoredClass {
    artifact: Arc<BytecodeArtifact>,
    born_millis: i64,
}

struct Inner {
    /// Package registry: package -> class -> artifact. Written while a
    /// compilation is still in flight, read by later compilations'
    /// classpath lookups.
    packages: FastHashMap<String, FastHashMap<String, Arc<BytecodeArtifact>>>,
    /// Durable store: only promoted artifacts, with their birth time.
    classes: FastHashMap<String, StoredClass>,
}

/// Shared bytecode store. Registry and durable store live under one lock so
/// promotion replaces a unit's whole class family atomically with respect
/// to concurrent classpath lookups.
pub struct BytecodeStore {
    inner: RwLock<Inner>,
    clock: Box<dyn Clock>,
}

impl BytecodeStore {
    pub fn new() -> Self {
        Self::with_clock(Box::new(SystemClock))
    }

    pub fn with_clock(clock: Box<dyn Clock>) -> Self {
        Self {
            inner: RwLock::new(Inner {
                packages: fast_map_new(),
                classes: fast_map_new(),
            }),
            clock,
        }
    }

    /// File an artifact into the package registry. Called by the output
    /// sink while a compilation is running, before success is known.
    pub fn file(&self, artifact: Arc<BytecodeArtifact>) {
        let pkg = artifact.package_name().to_string();
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        inner
            .packages
            .entry(pkg)
            .or_insert_with(fast_map_new)
            .insert(artifact.class_name.clone(), artifact);
    }

    /// Undo a `file` from a failed compilation.
    ///
    /// Touches the registry entry only when it still holds this exact
    /// artifact (pointer identity), so a concurrent successful compile of
    /// the same class is never clobbered. When the class was promoted
    /// before, the registry entry reverts to the durable artifact instead
    /// of vanishing; registry and durable store must keep agreeing on
    /// which classes exist.
    pub fn unfile(&self, artifact: &Arc<BytecodeArtifact>) {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        let pkg = artifact.package_name();
        let durable = inner
            .classes
            .get(&artifact.class_name)
            .map(|c| c.artifact.clone());
        let now_empty = match inner.packages.get_mut(pkg) {
            Some(entries) => {
                if entries
                    .get(&artifact.class_name)
                    .is_some_and(|held| Arc::ptr_eq(held, artifact))
                {
                    match &durable {
                        Some(kept) => {
                            entries.insert(artifact.class_name.clone(), kept.clone());
                        }
                        None => {
                            entries.remove(&artifact.class_name);
                        }
                    }
                }
                entries.is_empty()
            }
            None => false,
        };
        if now_empty {
            inner.packages.remove(pkg);
        }
    }

    /// Registry entries currently filed under one package.
    pub fn list_package(&self, package: &str) -> Vec<Arc<BytecodeArtifact>> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner
            .packages
            .get(package)
            .map(|entries| entries.values().cloned().collect())
            .unwrap_or_default()
    }

    /// All package names with at least one registry entry.
    pub fn package_names(&self) -> Vec<String> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner.packages.keys().cloned().collect()
    }

    /// Promote a successful compilation's artifacts into the durable store.
    ///
    /// Every prior class belonging to `unit_class` (the top-level class and
    /// any `Outer$Inner` siblings) is dropped first, from the durable map
    /// and from the registry, so stale nested classes from an earlier
    /// version cannot survive a recompile that no longer produces them.
    pub fn promote(&self, unit_class: &str, artifacts: &[Arc<BytecodeArtifact>]) {
        let born = self.clock.unix_millis();
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());

        inner
            .classes
            .retain(|name, _| !belongs_to_unit(name, unit_class));
        for entries in inner.packages.values_mut() {
            entries.retain(|name, _| !belongs_to_unit(name, unit_class));
        }
        inner.packages.retain(|_, entries| !entries.is_empty());

        for artifact in artifacts {
            inner.classes.insert(
                artifact.class_name.clone(),
                StoredClass {
                    artifact: artifact.clone(),
                    born_millis: born,
                },
            );
            inner
                .packages
                .entry(artifact.package_name().to_string())
                .or_insert_with(fast_map_new)
                .insert(artifact.class_name.clone(), artifact.clone());
        }
    }

    /// Promoted bytecode for a class, if any.
    pub fn bytecode(&self, class_name: &str) -> Option<Arc<BytecodeArtifact>> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner.classes.get(class_name).map(|c| c.artifact.clone())
    }

    /// Unix millis at which a class was last promoted, for external
    /// freshness checks.
    pub fn birth_time(&self, class_name: &str) -> Option<i64> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner.classes.get(class_name).map(|c| c.born_millis)
    }

    /// Write a promoted unit's class files to disk: the top-level class to
    /// `target`, nested-class siblings next to it under their simple names.
    pub fn export(&self, unit_class: &str, target: &Path) -> Result<(), String> {
        let family: Vec<Arc<BytecodeArtifact>> = {
            let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
            inner
                .classes
                .values()
                .filter(|c| belongs_to_unit(&c.artifact.class_name, unit_class))
                .map(|c| c.artifact.clone())
                .collect()
        };
        if !family.iter().any(|a| a.class_name == unit_class) {
            return Err(format!("No bytecode stored for {unit_class}"));
        }
        if let Some(dir) = target.parent() {
            fs::create_dir_all(dir)
                .map_err(|e| format!("Failed to create {}: {e}", dir.display()))?;
        }
        for artifact in &family {
            let path = if artifact.class_name == unit_class {
                target.to_path_buf()
            } else {
                sibling_class_file(target, &artifact.class_name)
            };
            fs::write(&path, &artifact.bytes)
                .map_err(|e| format!("Failed to write {}: {e}", path.display()))?;
        }
        Ok(())
    }
}

impl Default for BytecodeStore {
    fn default() -> Self {
        Self::new()
    }
}
