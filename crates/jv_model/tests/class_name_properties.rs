use std::path::Path;

use jv_model::class_name::{
    belongs_to_unit, class_file_rel_path, class_name_of_rel_path, package_of, simple_name,
};
use proptest::prelude::*;

fn ident() -> impl Strategy<Value = String> {
    "[A-Za-z_][A-Za-z0-9_]{0,11}"
}

fn binary_name() -> impl Strategy<Value = String> {
    prop::collection::vec(ident(), 1..5).prop_map(|segs| segs.join("."))
}

proptest! {
    #[test]
    fn split_reassembles(name in binary_name()) {
        let pkg = package_of(&name);
        let simple = simple_name(&name);
        let rebuilt = if pkg.is_empty() {
            simple.to_string()
        } else {
            format!("{pkg}.{simple}")
        };
        prop_assert_eq!(rebuilt, name);
    }

    #[test]
    fn rel_path_round_trips(name in binary_name()) {
        let rel = class_file_rel_path(&name);
        prop_assert_eq!(class_name_of_rel_path(&rel), Some(name));
    }

    #[test]
    fn nested_belongs_to_its_unit(unit in binary_name(), inner in ident()) {
        let nested = format!("{unit}${inner}");
        prop_assert!(belongs_to_unit(&nested, &unit));
        prop_assert!(!belongs_to_unit(&unit, &nested));
    }

    #[test]
    fn sibling_package_never_matches(unit in binary_name(), other in ident()) {
        let sibling = format!("{unit}{other}");
        // Longer name without a `$` right after the unit prefix.
        prop_assert!(!belongs_to_unit(&sibling, &unit));
    }
}

#[test]
fn non_class_paths_are_rejected() {
    assert_eq!(class_name_of_rel_path(Path::new("a/b/C.jar")), None);
    assert_eq!(class_name_of_rel_path(Path::new("a/b/C")), None);
}
