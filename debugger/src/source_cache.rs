//! # Source cache (C8)
//!
//! Lazy, memoised load of source files into an ordered sequence of text
//! lines for display (spec §3 "Source cache entry", §4.6). Never evicted,
//! never mutated once populated; I/O errors are logged and degrade to an
//! empty file rather than ending the session (spec §7).

use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct SourceCache {
    files: HashMap<String, Vec<String>>,
}

impl SourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached line sequence for `filename`, reading and
    /// splitting it on first reference. A file that ends in a trailing
    /// newline yields one empty trailing element, so 1-based line numbers
    /// line up with what a human expects (spec §4.6).
    pub fn get(&mut self, filename: &str) -> &[String] {
        self.files
            .entry(filename.to_string())
            .or_insert_with(|| match std::fs::read_to_string(filename) {
                Ok(contents) => contents.split('\n').map(str::to_string).collect(),
                Err(err) => {
                    tracing::warn!(%filename, error = %err, "could not read source file, treating as empty");
                    Vec::new()
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_and_caches_on_first_reference() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.step");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "line one").unwrap();
        writeln!(f, "line two").unwrap();
        drop(f);

        let mut cache = SourceCache::new();
        let lines = cache.get(path.to_str().unwrap());
        assert_eq!(lines, &["line one", "line two", ""]);
    }

    #[test]
    fn missing_file_is_logged_and_treated_as_empty() {
        let mut cache = SourceCache::new();
        let lines = cache.get("/no/such/file.step");
        assert!(lines.is_empty());
    }

    #[test]
    fn second_get_does_not_reread_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.step");
        std::fs::write(&path, "one\n").unwrap();

        let mut cache = SourceCache::new();
        let first = cache.get(path.to_str().unwrap()).to_vec();
        std::fs::write(&path, "changed\n").unwrap();
        let second = cache.get(path.to_str().unwrap()).to_vec();
        assert_eq!(first, second);
    }
}
