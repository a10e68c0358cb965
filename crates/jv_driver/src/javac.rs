//! Reference toolchain that shells out to a real `javac`.
//!
//! The subprocess cannot see the in-memory registry, so before running it
//! materializes the generated-namespace packages the request names into a
//! scratch classpath directory. Everything it produces flows back through
//! the host's output sink, so the driver's promote/rollback logic is the
//! same for every toolchain.

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::Command;

use jv_model::{RawDiagnostic, class_name};

use crate::toolchain::{
    ClassEntry, CompileHost, CompileRequest, Location, Toolchain, ToolchainError, ToolchainRun,
};

pub struct JavacToolchain {
    program: PathBuf,
}

impl JavacToolchain {
    pub fn new() -> Self {
        Self::with_program("javac")
    }

    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for JavacToolchain {
    fn default() -> Self {
        Self::new()
    }
}

impl Toolchain for JavacToolchain {
    fn run(
        &self,
        req: &CompileRequest<'_>,
        host: &dyn CompileHost,
    ) -> Result<ToolchainRun, ToolchainError> {
        let work = tempfile::tempdir()
            .map_err(|e| ToolchainError::Io(format!("Failed to create scratch dir: {e}")))?;
        let src_path = work.path().join(&req.file_name);
        fs::write(&src_path, &req.unit.source).map_err(|e| {
            ToolchainError::Io(format!("Failed to write {}: {e}", src_path.display()))
        })?;
        let out_dir = work.path().join("classes");
        fs::create_dir_all(&out_dir)
            .map_err(|e| ToolchainError::Io(format!("Failed to create output dir: {e}")))?;

        let mem_dir = work.path().join("mem");
        let mut have_mem = false;
        for package in req.memory_packages {
            for entry in host.list_package(Location::ClassPath, package) {
                let ClassEntry::Memory(artifact) = entry else {
                    continue;
                };
                let path = mem_dir.join(class_name::class_file_rel_path(&artifact.class_name));
                if let Some(dir) = path.parent() {
                    fs::create_dir_all(dir).map_err(|e| {
                        ToolchainError::Io(format!("Failed to create {}: {e}", dir.display()))
                    })?;
                }
                fs::write(&path, &artifact.bytes).map_err(|e| {
                    ToolchainError::Io(format!("Failed to write {}: {e}", path.display()))
                })?;
                have_mem = true;
            }
        }

        let mut class_path: Vec<PathBuf> = req.class_path.to_vec();
        if have_mem {
            class_path.push(mem_dir);
        }

        let mut cmd = Command::new(&self.program);
        cmd.arg("-d").arg(&out_dir);
        if !class_path.is_empty() {
            let joined = std::env::join_paths(&class_path)
                .map_err(|e| ToolchainError::Io(format!("Bad classpath entry: {e}")))?;
            cmd.arg("-cp").arg(joined);
        }
        cmd.args(req.options.iter());
        // The source was written out as UTF-8 regardless of the engine's
        // persistence encoding.
        cmd.arg("-encoding").arg("UTF-8");
        cmd.arg(&src_path);

        let output = cmd.output().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ToolchainError::Unavailable(format!(
                    "{} not found on PATH; install a JDK or inject another toolchain",
                    self.program.display()
                ))
            } else {
                ToolchainError::Io(format!("Failed to run {}: {e}", self.program.display()))
            }
        })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        let diagnostics = parse_stderr(&stderr);
        let success = output.status.success();

        if success {
            for item in walkdir::WalkDir::new(&out_dir) {
                let item = item
                    .map_err(|e| ToolchainError::Io(format!("Failed to list output dir: {e}")))?;
                if !item.file_type().is_file() {
                    continue;
                }
                let rel = item
                    .path()
                    .strip_prefix(&out_dir)
                    .map_err(|e| ToolchainError::Io(e.to_string()))?;
                let Some(name) = class_name::class_name_of_rel_path(rel) else {
                    continue;
                };
                let bytes = fs::read(item.path()).map_err(|e| {
                    ToolchainError::Io(format!("Failed to read {}: {e}", item.path().display()))
                })?;
                let mut out = host.open_output(&name);
                out.write_all(&bytes)
                    .map_err(|e| ToolchainError::Io(e.to_string()))?;
                out.close();
            }
        }

        Ok(ToolchainRun {
            success,
            diagnostics,
        })
    }
}

/// Pull `File.java:12: error: message` lines out of javac's stderr. Caret
/// and summary lines carry no `.java:<line>:` marker and fall through.
fn parse_stderr(stderr: &str) -> Vec<RawDiagnostic> {
    let mut out = Vec::new();
    for line in stderr.lines() {
        let Some(pos) = line.find(".java:") else {
            continue;
        };
        let rest = &line[pos + ".java:".len()..];
        let Some((number, message)) = rest.split_once(':') else {
            continue;
        };
        let Ok(line_no) = number.trim().parse::<u32>() else {
            continue;
        };
        let message = message.trim_start();
        let message = message
            .strip_prefix("error:")
            .or_else(|| message.strip_prefix("warning:"))
            .unwrap_or(message)
            .trim_start();
        out.push(RawDiagnostic::new(message, line_no));
    }
    out
}
