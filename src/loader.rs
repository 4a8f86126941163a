//! # Package loader (C3)
//!
//! Turns one input path into a single merged [`CompilationUnit`] ready for
//! the transform (spec §4.1). A path ending in `.step` is parsed as a lone
//! file; anything else is resolved as a package directory, whose `.step`
//! files are parsed individually and folded into one unit.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::{InstrumentError, SourceError};
use crate::lexer::tokenize;
use crate::parser::ast::CompilationUnit;
use crate::parser::parse_unit;

/// Extension recognised as "this path is a single source file" rather
/// than a package directory.
pub const SOURCE_EXTENSION: &str = "step";

/// The default package name when neither the resolved directory nor the
/// file's parent yields a usable path component (spec §4.1: "fall back
/// to the 'main' package").
pub const DEFAULT_PACKAGE_NAME: &str = "main";

pub struct LoadResult {
    /// The merged AST ready for `crate::transform::transform_unit`.
    pub unit: CompilationUnit,
    /// The original input path, kept for diagnostics and so the CLI can
    /// report what was instrumented.
    pub source_path: PathBuf,
}

/// Load `path` per spec §4.1. Fatal on any parse failure or unresolvable
/// package path — the instrumentor is fail-fast (spec §7).
pub fn load(path: &Path) -> Result<LoadResult, InstrumentError> {
    if is_source_file(path) {
        load_single_file(path)
    } else {
        load_package_dir(path)
    }
}

fn is_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e == SOURCE_EXTENSION)
}

fn load_single_file(path: &Path) -> Result<LoadResult, InstrumentError> {
    let source = std::fs::read_to_string(path).map_err(|source| InstrumentError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let package_name = package_name_for_file(path);
    let filename = path.display().to_string();
    let unit = parse_one(&source, &filename, &package_name)?;

    Ok(LoadResult {
        unit,
        source_path: path.to_path_buf(),
    })
}

fn package_name_for_file(path: &Path) -> String {
    path.parent()
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .unwrap_or(DEFAULT_PACKAGE_NAME)
        .to_string()
}

fn load_package_dir(path: &Path) -> Result<LoadResult, InstrumentError> {
    let metadata = std::fs::metadata(path).map_err(|_| InstrumentError::PathNotFound {
        path: path.display().to_string(),
    })?;
    if !metadata.is_dir() {
        return Err(InstrumentError::PathNotFound {
            path: path.display().to_string(),
        });
    }

    let mut entries: Vec<PathBuf> = std::fs::read_dir(path)
        .map_err(|source| InstrumentError::Io {
            path: path.display().to_string(),
            source,
        })?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| is_source_file(p))
        .collect();
    entries.sort();

    if entries.is_empty() {
        return Err(InstrumentError::NotAPackage {
            path: path.display().to_string(),
        });
    }

    let package_name = package_name_for_dir(path);

    let mut merged_imports: Vec<crate::parser::ast::Import> = Vec::new();
    let mut seen_imports: HashSet<String> = HashSet::new();
    let mut merged_functions: Vec<crate::parser::ast::FunctionDecl> = Vec::new();
    let mut seen_functions: HashSet<String> = HashSet::new();

    for file in &entries {
        let source = std::fs::read_to_string(file).map_err(|source| InstrumentError::Io {
            path: file.display().to_string(),
            source,
        })?;
        let filename = file.display().to_string();
        let unit = parse_one(&source, &filename, &package_name)?;

        for import in unit.imports {
            if seen_imports.insert(import.path.clone()) {
                merged_imports.push(import);
            }
        }
        for func in unit.functions {
            if seen_functions.insert(func.name.clone()) {
                merged_functions.push(func);
            } else {
                tracing::warn!(
                    function = %func.name,
                    package = %package_name,
                    "duplicate function definition across package files, keeping first"
                );
            }
        }
    }

    Ok(LoadResult {
        unit: CompilationUnit {
            package_name,
            imports: merged_imports,
            functions: merged_functions,
        },
        source_path: path.to_path_buf(),
    })
}

fn package_name_for_dir(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .unwrap_or(DEFAULT_PACKAGE_NAME)
        .to_string()
}

fn parse_one(
    source: &str,
    filename: &str,
    package_name: &str,
) -> Result<CompilationUnit, InstrumentError> {
    let lexed = tokenize(source);
    let parsed = parse_unit(&lexed.tokens, filename, package_name);

    let mut errors: Vec<SourceError> = lexed.errors;
    errors.extend(parsed.errors);

    if !errors.is_empty() {
        return Err(InstrumentError::Parse {
            path: filename.to_string(),
            errors,
        });
    }

    Ok(parsed.unit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "simple.step", "func main() { a := 1; }");
        let result = load(&path).unwrap();
        assert_eq!(result.unit.functions.len(), 1);
        assert_eq!(result.unit.functions[0].name, "main");
    }

    #[test]
    fn package_name_falls_back_to_main_for_unnamed_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "simple.step", "func main() { }");
        // Parent directory of a tempdir has *some* name, so this mostly
        // exercises that package_name_for_file never panics.
        let result = load(&path).unwrap();
        assert!(!result.unit.package_name.is_empty());
    }

    #[test]
    fn merges_multiple_files_in_a_package_directory() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "a.step", "func f() { a := 1; }");
        write_file(dir.path(), "b.step", "func g() { b := 2; }");
        let result = load(dir.path()).unwrap();
        let mut names: Vec<&str> = result
            .unit
            .functions
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        names.sort();
        assert_eq!(names, vec!["f", "g"]);
    }

    #[test]
    fn duplicate_function_across_files_is_folded_to_one() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "a.step", "func f() { a := 1; }");
        write_file(dir.path(), "b.step", "func f() { b := 2; }");
        let result = load(dir.path()).unwrap();
        assert_eq!(result.unit.functions.len(), 1);
    }

    #[test]
    fn missing_path_is_fatal() {
        let err = load(Path::new("/no/such/path/at/all")).unwrap_err();
        assert!(matches!(err, InstrumentError::PathNotFound { .. }));
    }

    #[test]
    fn directory_with_no_step_files_is_not_a_package() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(dir.path()).unwrap_err();
        assert!(matches!(err, InstrumentError::NotAPackage { .. }));
    }

    #[test]
    fn parse_failure_is_fatal_and_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "broken.step", "func main() { a := ; }");
        let err = load(&path).unwrap_err();
        match err {
            InstrumentError::Parse { path: p, .. } => assert!(p.ends_with("broken.step")),
            other => panic!("expected Parse error, got {other:?}"),
        }
    }
}
