use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use jv_model::{CompilationUnit, ErrorDetail};
use jv_store::BytecodeStore;

use crate::classpath;
use crate::diag;
use crate::host::{CompileSession, in_namespace};
use crate::toolchain::{CompileRequest, Toolchain, ToolchainError};

/// Configuration for one driver. Recognized knobs only; everything else
/// about the runtime (encoding of page templates, dependency checking) is
/// the surrounding engine's business.
#[derive(Clone, Debug)]
pub struct CompilerConfig {
    /// Ordered on-disk classpath entries, expanded through jar manifests
    /// before every compile.
    pub class_path: Vec<PathBuf>,
    /// Extension directories (`-extdirs`).
    pub extension_dirs: Vec<PathBuf>,
    /// Emit debug symbols (`-g`) or strip them (`-g:none`).
    pub debug_info: bool,
    /// Language level of the generated source (`-source`).
    pub source_level: Option<String>,
    /// Bytecode target level (`-target`).
    pub target_level: Option<String>,
    /// Namespace the engine generates page classes into. Classpath lookups
    /// under it resolve from the in-memory registry, never from disk.
    pub generated_package: String,
    /// Character encoding used when persisting generated source to disk.
    pub java_encoding: String,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            class_path: Vec::new(),
            extension_dirs: Vec::new(),
            debug_info: false,
            source_level: None,
            target_level: None,
            generated_package: "org.javelin.pages".to_string(),
            java_encoding: "UTF-8".to_string(),
        }
    }
}

#[derive(Debug)]
pub enum CompileError {
    /// The compile capability cannot be obtained in this runtime.
    ToolUnavailable(String),
    /// The generated source cannot be encoded with the configured
    /// encoding. Only raised by optional disk persistence.
    Encoding { encoding: String, detail: String },
    /// IO failure during explicitly requested persistence or export.
    Io(String),
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::ToolUnavailable(m) => {
                write!(f, "[{}] {m}", jv_model::codes::TOOL_UNAVAILABLE)
            }
            CompileError::Encoding { encoding, detail } => {
                write!(f, "[{}] {encoding}: {detail}", jv_model::codes::BAD_ENCODING)
            }
            CompileError::Io(m) => write!(f, "[{}] {m}", jv_model::codes::IO_FAILURE),
        }
    }
}

impl std::error::Error for CompileError {}

/// The compilation driver: one `compile` call takes generated Java source
/// and either promotes its bytecode into the shared store or returns the
/// full diagnostic list.
pub struct Driver {
    store: Arc<BytecodeStore>,
    toolchain: Box<dyn Toolchain>,
    config: CompilerConfig,
}

impl Driver {
    pub fn new(store: Arc<BytecodeStore>, toolchain: Box<dyn Toolchain>) -> Self {
        Self::with_config(store, toolchain, CompilerConfig::default())
    }

    pub fn with_config(
        store: Arc<BytecodeStore>,
        toolchain: Box<dyn Toolchain>,
        config: CompilerConfig,
    ) -> Self {
        Self {
            store,
            toolchain,
            config,
        }
    }

    pub fn store(&self) -> &Arc<BytecodeStore> {
        &self.store
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compile one unit of generated source. An empty vec means success:
    /// every artifact the unit produced is now resolvable through the
    /// store. A non-empty vec is the complete translated diagnostic list;
    /// nothing was promoted.
    pub fn compile(
        &self,
        class_name: &str,
        source: &str,
    ) -> Result<Vec<ErrorDetail>, CompileError> {
        self.compile_unit(&CompilationUnit::new(class_name, source))
    }

    pub fn compile_unit(&self, unit: &CompilationUnit) -> Result<Vec<ErrorDetail>, CompileError> {
        let class_path = classpath::expand_class_path(&self.config.class_path);
        let options = self.options();
        let memory_packages: Vec<String> = self
            .store
            .package_names()
            .into_iter()
            .filter(|p| in_namespace(p, &self.config.generated_package))
            .collect();

        let session = CompileSession::new(
            self.store.clone(),
            self.config.generated_package.clone(),
            class_path.clone(),
            self.config.extension_dirs.clone(),
        );
        let req = CompileRequest {
            unit,
            file_name: unit.source_file_name(),
            options: &options,
            class_path: &class_path,
            memory_packages: &memory_packages,
        };

        let run = match self.toolchain.run(&req, &session) {
            Ok(run) => run,
            Err(e) => {
                session.rollback();
                return Err(match e {
                    ToolchainError::Unavailable(m) => CompileError::ToolUnavailable(m),
                    ToolchainError::Io(m) => CompileError::Io(m),
                });
            }
        };

        if run.success {
            let produced = session.pending();
            log::debug!(
                "compiled {}: {} class file(s)",
                unit.class_name,
                produced.len()
            );
            self.store.promote(&unit.class_name, &produced);
            return Ok(Vec::new());
        }

        // Compilation errors. Promote nothing, unfile what the failed run
        // wrote, hand back every diagnostic at once.
        session.rollback();
        log::debug!(
            "compilation of {} failed with {} diagnostic(s)",
            unit.class_name,
            run.diagnostics.len()
        );
        Ok(diag::error_details(&req.file_name, &run.diagnostics))
    }

    /// Persist the generated source with the configured encoding. Optional
    /// side capability; compilation never needs it.
    pub fn write_java_file(&self, unit: &CompilationUnit, path: &Path) -> Result<(), CompileError> {
        let encoding = encoding_rs::Encoding::for_label(self.config.java_encoding.as_bytes())
            .ok_or_else(|| CompileError::Encoding {
                encoding: self.config.java_encoding.clone(),
                detail: "unknown encoding label".to_string(),
            })?;
        let (bytes, _, had_unmappable) = encoding.encode(&unit.source);
        if had_unmappable {
            return Err(CompileError::Encoding {
                encoding: self.config.java_encoding.clone(),
                detail: "generated source contains unmappable characters".to_string(),
            });
        }
        fs::write(path, &bytes)
            .map_err(|e| CompileError::Io(format!("Failed to write {}: {e}", path.display())))
    }

    /// Write a previously compiled unit's class files to disk (top-level
    /// class at `target`, nested siblings next to it). Convenience export;
    /// the compile contract never requires it.
    pub fn export_class_files(
        &self,
        class_name: &str,
        target: &Path,
    ) -> Result<(), CompileError> {
        self.store.export(class_name, target).map_err(CompileError::Io)
    }

    fn options(&self) -> Vec<String> {
        // Annotation processing stays off; page classes never need it and
        // processors would pull file-system expectations into the run.
        let mut options = vec!["-proc:none".to_string()];
        options.push(if self.config.debug_info { "-g" } else { "-g:none" }.to_string());
        if let Some(v) = &self.config.source_level {
            options.push("-source".to_string());
            options.push(v.clone());
        }
        if let Some(v) = &self.config.target_level {
            options.push("-target".to_string());
            options.push(v.clone());
        }
        if !self.config.extension_dirs.is_empty() {
            options.push("-extdirs".to_string());
            options.push(join_path_list(&self.config.extension_dirs));
        }
        options
    }
}

fn join_path_list(paths: &[PathBuf]) -> String {
    std::env::join_paths(paths)
        .map(|joined| joined.to_string_lossy().into_owned())
        .unwrap_or_else(|_| {
            paths
                .iter()
                .map(|p| p.to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join(":")
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoToolchain;
    impl Toolchain for NoToolchain {
        fn run(
            &self,
            _req: &CompileRequest<'_>,
            _host: &dyn crate::toolchain::CompileHost,
        ) -> Result<crate::toolchain::ToolchainRun, ToolchainError> {
            Err(ToolchainError::Unavailable("no compiler".to_string()))
        }
    }

    fn driver_with(config: CompilerConfig) -> Driver {
        Driver::with_config(Arc::new(BytecodeStore::new()), Box::new(NoToolchain), config)
    }

    #[test]
    fn default_options_disable_annotation_processing() {
        let driver = driver_with(CompilerConfig::default());
        assert_eq!(driver.options(), vec!["-proc:none", "-g:none"]);
    }

    #[test]
    fn debug_and_levels_are_forwarded() {
        let driver = driver_with(CompilerConfig {
            debug_info: true,
            source_level: Some("17".to_string()),
            target_level: Some("17".to_string()),
            ..CompilerConfig::default()
        });
        assert_eq!(
            driver.options(),
            vec!["-proc:none", "-g", "-source", "17", "-target", "17"]
        );
    }

    #[test]
    fn extension_dirs_become_extdirs() {
        let driver = driver_with(CompilerConfig {
            extension_dirs: vec![PathBuf::from("ext")],
            ..CompilerConfig::default()
        });
        let options = driver.options();
        assert_eq!(options[2], "-extdirs");
        assert_eq!(options[3], "ext");
    }

    #[test]
    fn unavailable_toolchain_is_fatal() {
        let driver = driver_with(CompilerConfig::default());
        let err = driver.compile("p.C", "class C {}").unwrap_err();
        assert!(matches!(err, CompileError::ToolUnavailable(_)), "{err}");
    }
}
