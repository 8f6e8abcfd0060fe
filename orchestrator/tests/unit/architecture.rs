//! Structural tests for architectural boundary enforcement.
//!
//! These tests scan source files to verify that the domain and application
//! layers never reach into infrastructure.

use std::path::{Path, PathBuf};

/// Collect all `.rs` files under a directory recursively.
fn collect_rs_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                files.extend(collect_rs_files(&path));
            } else if path.extension().and_then(|e| e.to_str()) == Some("rs") {
                files.push(path);
            }
        }
    }
    files
}

/// Track brace depth and return whether a line is inside a `#[cfg(test)]` block.
struct CfgTestTracker {
    in_test_block: bool,
    brace_depth: i32,
    test_block_start_depth: i32,
}

impl CfgTestTracker {
    fn new() -> Self {
        Self {
            in_test_block: false,
            brace_depth: 0,
            test_block_start_depth: 0,
        }
    }

    /// Process a line and return `true` if it's inside a `#[cfg(test)]` block.
    fn process_line(&mut self, line: &str) -> bool {
        if line.trim().contains("#[cfg(test)]") {
            self.in_test_block = true;
            self.test_block_start_depth = self.brace_depth;
        }
        for ch in line.chars() {
            match ch {
                '{' => self.brace_depth += 1,
                '}' => {
                    self.brace_depth -= 1;
                    if self.in_test_block && self.brace_depth <= self.test_block_start_depth {
                        self.in_test_block = false;
                    }
                }
                _ => {}
            }
        }
        self.in_test_block
    }
}

/// Non-test, non-comment lines of every file under `src/<layer>`, with
/// their 1-based line numbers.
fn production_lines(layer: &str) -> Vec<(String, usize, String)> {
    let root = Path::new(env!("CARGO_MANIFEST_DIR"));
    let mut out = Vec::new();
    for file in collect_rs_files(&root.join("src").join(layer)) {
        let Ok(content) = std::fs::read_to_string(&file) else {
            continue;
        };
        let rel = file
            .strip_prefix(root)
            .unwrap_or(&file)
            .display()
            .to_string();
        let mut tracker = CfgTestTracker::new();
        for (i, line) in content.lines().enumerate() {
            let in_test = tracker.process_line(line);
            let trimmed = line.trim();
            if in_test || trimmed.starts_with("//") || trimmed.starts_with("#[cfg(test)]") {
                continue;
            }
            out.push((rel.clone(), i + 1, line.to_string()));
        }
    }
    out
}

fn violations(layer: &str, forbidden: &[&str]) -> Vec<String> {
    production_lines(layer)
        .into_iter()
        .filter(|(_, _, line)| forbidden.iter().any(|f| line.contains(f)))
        .map(|(rel, lineno, line)| format!("{rel}:{lineno}: {}", line.trim()))
        .collect()
}

#[test]
fn domain_has_no_outward_dependencies() {
    let found = violations(
        "domain",
        &["crate::infra", "crate::application", "tokio::", "std::fs", "std::net"],
    );
    assert!(
        found.is_empty(),
        "domain/ must stay pure:\n{}",
        found.join("\n")
    );
}

#[test]
fn application_does_not_import_infra() {
    let found = violations("application", &["crate::infra", "crate::app::"]);
    assert!(
        found.is_empty(),
        "application/ must depend on ports, not adapters:\n{}",
        found.join("\n")
    );
}

#[test]
fn application_does_not_sleep_directly() {
    let found = violations("application", &["tokio::time", "std::thread::sleep"]);
    assert!(
        found.is_empty(),
        "waits must go through the Sleeper port:\n{}",
        found.join("\n")
    );
}

#[test]
fn cfg_test_tracker_skips_test_modules() {
    let source = "fn a() {}\n#[cfg(test)]\nmod tests {\n    use crate::infra;\n}\nfn b() {}\n";
    let mut tracker = CfgTestTracker::new();
    let flags: Vec<bool> = source.lines().map(|l| tracker.process_line(l)).collect();
    assert_eq!(flags, vec![false, true, true, true, false, false]);
}
