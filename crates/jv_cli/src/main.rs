use std::path::PathBuf;
use std::sync::Arc;

use jv_driver::diag::render_error_detail;
use jv_driver::{CompilerConfig, Driver, JavacToolchain};
use jv_model::class_name::{belongs_to_unit, package_of, simple_name};
use jv_store::BytecodeStore;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

const USAGE: &str = "Usage: jv <compile|inspect|export> <file.java> [--class FQCN] [--debug] \
[--source V] [--target V] [--cp PATHS] [--extdirs PATHS] [--out FILE] [--javac PROG]";

struct Args {
    file: PathBuf,
    class_name: Option<String>,
    debug: bool,
    source_level: Option<String>,
    target_level: Option<String>,
    class_path: Vec<PathBuf>,
    extension_dirs: Vec<PathBuf>,
    out: Option<PathBuf>,
    javac: Option<PathBuf>,
}

fn take_value(argv: &mut Vec<String>, i: usize, name: &str) -> Result<String, String> {
    if i + 1 < argv.len() {
        Ok(argv.remove(i + 1))
    } else {
        Err(format!("Missing value for {name}"))
    }
}

fn parse_args(mut argv: Vec<String>) -> Result<Args, String> {
    let mut file: Option<PathBuf> = None;
    let mut args = Args {
        file: PathBuf::new(),
        class_name: None,
        debug: false,
        source_level: None,
        target_level: None,
        class_path: Vec::new(),
        extension_dirs: Vec::new(),
        out: None,
        javac: None,
    };

    let mut i = 0;
    while i < argv.len() {
        let a = argv[i].clone();
        if a == "--debug" {
            args.debug = true;
        } else if a == "--class" {
            args.class_name = Some(take_value(&mut argv, i, "--class")?);
        } else if a == "--source" {
            args.source_level = Some(take_value(&mut argv, i, "--source")?);
        } else if a == "--target" {
            args.target_level = Some(take_value(&mut argv, i, "--target")?);
        } else if a == "--cp" {
            let v = take_value(&mut argv, i, "--cp")?;
            args.class_path.extend(std::env::split_paths(&v));
        } else if a == "--extdirs" {
            let v = take_value(&mut argv, i, "--extdirs")?;
            args.extension_dirs.extend(std::env::split_paths(&v));
        } else if a == "--out" {
            args.out = Some(PathBuf::from(take_value(&mut argv, i, "--out")?));
        } else if a == "--javac" {
            args.javac = Some(PathBuf::from(take_value(&mut argv, i, "--javac")?));
        } else if a.starts_with("--") {
            return Err(format!("Unknown option: {a}"));
        } else if file.is_none() {
            file = Some(PathBuf::from(a));
        } else {
            return Err("Only one source file per invocation".to_string());
        }
        i += 1;
    }

    args.file = file.ok_or_else(|| "Missing <file.java>".to_string())?;
    Ok(args)
}

/// Binary name of the top-level class: an explicit --class wins, otherwise
/// the file stem prefixed with the source's `package` declaration.
fn infer_class_name(args: &Args, source: &str) -> Result<String, String> {
    if let Some(name) = &args.class_name {
        return Ok(name.clone());
    }
    let stem = args
        .file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .ok_or_else(|| format!("Cannot derive a class name from {}", args.file.display()))?;
    for line in source.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("package ") {
            if let Some(pkg) = rest.trim().strip_suffix(';') {
                return Ok(format!("{}.{stem}", pkg.trim()));
            }
        }
        if line.starts_with("import ") || line.contains("class ") {
            break;
        }
    }
    Ok(stem)
}

/// Compile the requested file into a fresh store. Exits the process on
/// fatal errors (2) or diagnostics (1).
fn compile_or_exit(args: &Args) -> (Driver, Arc<BytecodeStore>, String) {
    let source = match std::fs::read_to_string(&args.file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to read {}: {e}", args.file.display());
            std::process::exit(2);
        }
    };
    let class_name = match infer_class_name(args, &source) {
        Ok(name) => name,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
    };

    let config = CompilerConfig {
        class_path: args.class_path.clone(),
        extension_dirs: args.extension_dirs.clone(),
        debug_info: args.debug,
        source_level: args.source_level.clone(),
        target_level: args.target_level.clone(),
        generated_package: package_of(&class_name).to_string(),
        ..CompilerConfig::default()
    };
    let toolchain = match &args.javac {
        Some(program) => JavacToolchain::with_program(program.clone()),
        None => JavacToolchain::new(),
    };
    let store = Arc::new(BytecodeStore::new());
    let driver = Driver::with_config(store.clone(), Box::new(toolchain), config);

    let details = match driver.compile(&class_name, &source) {
        Ok(details) => details,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
    };
    if !details.is_empty() {
        for detail in &details {
            eprintln!("{}", render_error_detail(&source, detail));
        }
        eprintln!(
            "{} error(s) compiling {}",
            details.len(),
            args.file.display()
        );
        std::process::exit(1);
    }

    (driver, store, class_name)
}

fn unit_family(store: &BytecodeStore, class_name: &str) -> Vec<String> {
    let mut names: Vec<String> = store
        .list_package(package_of(class_name))
        .into_iter()
        .map(|a| a.class_name.clone())
        .filter(|name| belongs_to_unit(name, class_name))
        .collect();
    names.sort();
    names
}

fn main() {
    env_logger::init();

    let mut argv: Vec<String> = std::env::args().skip(1).collect();
    let Some(cmd) = argv.first().cloned() else {
        eprintln!("{USAGE}");
        std::process::exit(2);
    };
    argv.remove(0);

    if !matches!(cmd.as_str(), "compile" | "inspect" | "export") {
        eprintln!("Unknown command: {cmd}");
        eprintln!("{USAGE}");
        std::process::exit(2);
    }

    let args = match parse_args(argv) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{e}");
            eprintln!("{USAGE}");
            std::process::exit(2);
        }
    };

    let (driver, store, class_name) = compile_or_exit(&args);

    match cmd.as_str() {
        "compile" => {
            let family = unit_family(&store, &class_name);
            println!("Compiled {class_name} ({} class file(s))", family.len());
        }
        "inspect" => {
            for name in unit_family(&store, &class_name) {
                let bytes = store.bytecode(&name).map(|a| a.bytes.len()).unwrap_or(0);
                let born = store.birth_time(&name).unwrap_or(0);
                println!("{name}\t{bytes} bytes\tborn {born}");
            }
        }
        "export" => {
            let target = args
                .out
                .clone()
                .unwrap_or_else(|| PathBuf::from(format!("{}.class", simple_name(&class_name))));
            if let Err(e) = driver.export_class_files(&class_name, &target) {
                eprintln!("{e}");
                std::process::exit(2);
            }
            println!("Exported class files to {}", target.display());
        }
        _ => unreachable!(),
    }
}
