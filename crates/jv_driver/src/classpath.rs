//! On-disk classpath handling: jar-manifest `Class-Path` expansion and
//! best-effort package listings over directories and jars.

use std::collections::VecDeque;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::toolchain::ClassEntry;

pub(crate) fn is_jar(path: &Path) -> bool {
    path.extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("jar") || e.eq_ignore_ascii_case("zip"))
}

/// Expand a classpath through jar manifests.
///
/// Each jar's `Class-Path` manifest attribute names further entries,
/// relative to the jar's own directory; those are appended and expanded in
/// turn. Unreadable jars and missing referenced entries are kept as given
/// (the toolchain decides what to do with them).
pub fn expand_class_path(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut out: Vec<PathBuf> = Vec::new();
    let mut queue: VecDeque<PathBuf> = paths.iter().cloned().collect();

    while let Some(path) = queue.pop_front() {
        if out.contains(&path) {
            continue;
        }
        out.push(path.clone());
        if !is_jar(&path) {
            continue;
        }
        let manifest = match jar_manifest(&path) {
            Ok(Some(text)) => text,
            Ok(None) => continue,
            Err(e) => {
                log::debug!("Skipping manifest of {}: {e}", path.display());
                continue;
            }
        };
        let base = path.parent().unwrap_or(Path::new(""));
        for entry in manifest_class_path(&manifest) {
            queue.push_back(base.join(entry));
        }
    }
    out
}

/// `Class-Path` attribute of a manifest, split into entries. Manifest
/// values wrap at 72 bytes; continuation lines start with a single space.
pub fn manifest_class_path(manifest: &str) -> Vec<String> {
    let mut value: Option<String> = None;
    let mut current: Option<String> = None;

    for line in manifest.lines() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if let Some(cont) = line.strip_prefix(' ') {
            if let Some(v) = current.as_mut() {
                v.push_str(cont);
            }
            continue;
        }
        if let Some(v) = current.take() {
            value.get_or_insert(v);
        }
        if value.is_some() {
            continue;
        }
        if let Some((name, val)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("Class-Path") {
                current = Some(val.trim_start().to_string());
            }
        }
    }
    if let Some(v) = current.take() {
        value.get_or_insert(v);
    }

    value
        .map(|v| v.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}

fn jar_manifest(path: &Path) -> Result<Option<String>, String> {
    let file = fs::File::open(path).map_err(|e| e.to_string())?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| e.to_string())?;
    let mut entry = match archive.by_name("META-INF/MANIFEST.MF") {
        Ok(entry) => entry,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.to_string()),
    };
    let mut text = String::new();
    entry.read_to_string(&mut text).map_err(|e| e.to_string())?;
    Ok(Some(text))
}

/// Best-effort listing of one package's class files across disk classpath
/// entries. IO problems are logged and skipped; listing is advisory.
pub fn list_disk_package(entries: &[PathBuf], package: &str) -> Vec<ClassEntry> {
    let rel = package.replace('.', "/");
    let mut out = Vec::new();
    for root in entries {
        if root.is_dir() {
            list_dir_package(root, &rel, package, &mut out);
        } else if is_jar(root) {
            match list_jar_package(root, &rel, package) {
                Ok(mut found) => out.append(&mut found),
                Err(e) => log::debug!("Skipping classpath jar {}: {e}", root.display()),
            }
        }
    }
    out
}

/// Listing for the platform-classes location: jars inside the configured
/// extension directories.
pub fn list_extension_package(dirs: &[PathBuf], package: &str) -> Vec<ClassEntry> {
    let rel = package.replace('.', "/");
    let mut out = Vec::new();
    for dir in dirs {
        let iter = match fs::read_dir(dir) {
            Ok(iter) => iter,
            Err(e) => {
                log::debug!("Skipping extension dir {}: {e}", dir.display());
                continue;
            }
        };
        for entry in iter.flatten() {
            let path = entry.path();
            if !is_jar(&path) {
                continue;
            }
            match list_jar_package(&path, &rel, package) {
                Ok(mut found) => out.append(&mut found),
                Err(e) => log::debug!("Skipping extension jar {}: {e}", path.display()),
            }
        }
    }
    out
}

fn list_dir_package(root: &Path, rel: &str, package: &str, out: &mut Vec<ClassEntry>) {
    let dir = if rel.is_empty() {
        root.to_path_buf()
    } else {
        root.join(rel)
    };
    let iter = match fs::read_dir(&dir) {
        Ok(iter) => iter,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return,
        Err(e) => {
            log::debug!("Skipping classpath dir {}: {e}", dir.display());
            return;
        }
    };
    for entry in iter.flatten() {
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|e| e == "class") {
            out.push(ClassEntry::Dir {
                package: package.to_string(),
                path,
            });
        }
    }
}

fn list_jar_package(archive: &Path, rel: &str, package: &str) -> Result<Vec<ClassEntry>, String> {
    let file = fs::File::open(archive).map_err(|e| e.to_string())?;
    let zip = zip::ZipArchive::new(file).map_err(|e| e.to_string())?;
    let prefix = if rel.is_empty() {
        String::new()
    } else {
        format!("{rel}/")
    };
    let mut out = Vec::new();
    for name in zip.file_names() {
        let Some(rest) = name.strip_prefix(prefix.as_str()) else {
            continue;
        };
        // Only direct members of the package, not subpackages.
        if rest.ends_with(".class") && !rest.contains('/') {
            out.push(ClassEntry::Jar {
                package: package.to_string(),
                archive: archive.to_path_buf(),
                entry: name.to_string(),
            });
        }
    }
    Ok(out)
}
