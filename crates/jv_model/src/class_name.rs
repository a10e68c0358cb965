//! Helpers for fully qualified (binary) Java class names.
//!
//! A binary name looks like `org.javelin.pages.index_jsp` or, for a nested
//! class, `org.javelin.pages.index_jsp$Helper`. The `$` belongs to the
//! simple name, never to the package.

use std::path::{Path, PathBuf};

/// Package part of a binary class name, `""` for the default package.
pub fn package_of(class_name: &str) -> &str {
    match class_name.rfind('.') {
        Some(i) => &class_name[..i],
        None => "",
    }
}

/// Simple name part of a binary class name (keeps any `$` segments).
pub fn simple_name(class_name: &str) -> &str {
    match class_name.rfind('.') {
        Some(i) => &class_name[i + 1..],
        None => class_name,
    }
}

/// Name of the source file a unit for `class_name` compiles from.
pub fn source_file_name(class_name: &str) -> String {
    format!("{}.java", simple_name(class_name))
}

/// Whether `class_name` is produced by compiling the unit for `unit_class`.
///
/// True for the top-level class itself and for every nested or anonymous
/// class it emits (`Outer`, `Outer$Inner`, `Outer$1`, `Outer$Inner$Deep`).
/// `Outermost` is not a member of the `Outer` unit.
pub fn belongs_to_unit(class_name: &str, unit_class: &str) -> bool {
    class_name == unit_class
        || (class_name.len() > unit_class.len()
            && class_name.starts_with(unit_class)
            && class_name.as_bytes()[unit_class.len()] == b'$')
}

/// Relative path of the class file for a binary name (`a.b.C$D` ->
/// `a/b/C$D.class`).
pub fn class_file_rel_path(class_name: &str) -> PathBuf {
    let mut p: PathBuf = class_name.split('.').collect();
    p.set_extension("class");
    p
}

/// Binary name recovered from a class-file path relative to a classpath
/// root. Returns `None` when the path is not a `.class` file.
pub fn class_name_of_rel_path(rel: &Path) -> Option<String> {
    if rel.extension().is_none_or(|e| e != "class") {
        return None;
    }
    let mut segs: Vec<&str> = Vec::new();
    for c in rel.components() {
        segs.push(c.as_os_str().to_str()?);
    }
    let last = segs.pop()?;
    segs.push(last.strip_suffix(".class")?);
    Some(segs.join("."))
}

/// File a sibling class of a unit should be written to, given where the
/// unit's top-level class file goes.
///
/// A unit can emit several physical class files; only the top-level one has
/// a caller-chosen target. Nested classes take their simple name and land
/// next to it, so they can never overwrite the top-level file.
pub fn sibling_class_file(top_level_target: &Path, class_name: &str) -> PathBuf {
    top_level_target.with_file_name(format!("{}.class", simple_name(class_name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn package_and_simple_name_split() {
        assert_eq!(package_of("a.b.C"), "a.b");
        assert_eq!(simple_name("a.b.C"), "C");
        assert_eq!(package_of("C"), "");
        assert_eq!(simple_name("C"), "C");
    }

    #[test]
    fn nested_class_keeps_dollar_in_simple_name() {
        assert_eq!(package_of("a.b.C$D"), "a.b");
        assert_eq!(simple_name("a.b.C$D"), "C$D");
    }

    #[test]
    fn unit_membership() {
        assert!(belongs_to_unit("a.C", "a.C"));
        assert!(belongs_to_unit("a.C$D", "a.C"));
        assert!(belongs_to_unit("a.C$1", "a.C"));
        assert!(!belongs_to_unit("a.CD", "a.C"));
        assert!(!belongs_to_unit("a.C", "a.C$D"));
    }

    #[test]
    fn rel_path_round_trip() {
        let p = class_file_rel_path("a.b.C$D");
        assert_eq!(p, Path::new("a/b/C$D.class"));
        assert_eq!(class_name_of_rel_path(&p).as_deref(), Some("a.b.C$D"));
        assert_eq!(class_name_of_rel_path(Path::new("a/b/C.java")), None);
    }

    #[test]
    fn sibling_file_lands_next_to_top_level() {
        let target = Path::new("/work/classes/index_jsp.class");
        assert_eq!(
            sibling_class_file(target, "org.javelin.pages.index_jsp$Helper"),
            Path::new("/work/classes/index_jsp$Helper.class")
        );
    }
}
