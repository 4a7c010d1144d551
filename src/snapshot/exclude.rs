//! Exclusion matching for snapshot walks
//!
//! Decides whether a root-relative path is omitted from a snapshot. Supports
//! literal path/basename matches, directory-prefix matches, and simple `*`
//! wildcards. A baseline list of infrastructure patterns is always unioned
//! with caller-supplied patterns.

use regex::Regex;
use tracing::warn;

/// Patterns excluded from every snapshot regardless of caller input:
/// dependency directories, VCS metadata, build output, local env files,
/// lockfiles and OS artifacts.
pub const BASELINE_EXCLUDES: &[&str] = &[
    "node_modules",
    ".git",
    ".next",
    ".nuxt",
    ".vercel",
    ".turbo",
    "dist",
    "build",
    "out",
    "target",
    "coverage",
    "__pycache__",
    ".venv",
    ".env*",
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    ".DS_Store",
    "Thumbs.db",
];

enum Pattern {
    /// Exact path/basename match or `pattern/` prefix match.
    Literal(String),
    /// Pattern containing `*`, compiled with each `*` as "any sequence".
    Wildcard(Regex),
}

/// Compiled exclusion rules. Pure with respect to its inputs: matching never
/// touches the filesystem.
pub struct ExclusionMatcher {
    patterns: Vec<Pattern>,
    effective: Vec<String>,
}

impl ExclusionMatcher {
    /// Compile the baseline list unioned with `extra` caller patterns.
    /// Patterns that fail to compile are logged and dropped rather than
    /// failing the whole snapshot.
    pub fn new(extra: &[String]) -> Self {
        let mut patterns = Vec::new();
        let mut effective = Vec::new();

        let baseline = BASELINE_EXCLUDES.iter().map(|p| p.to_string());
        for raw in baseline.chain(extra.iter().cloned()) {
            if raw.is_empty() {
                continue;
            }
            if effective.contains(&raw) {
                continue;
            }
            if raw.contains('*') {
                match compile_wildcard(&raw) {
                    Ok(re) => patterns.push(Pattern::Wildcard(re)),
                    Err(e) => {
                        warn!("Dropping unusable exclude pattern {:?}: {}", raw, e);
                        continue;
                    }
                }
            } else {
                patterns.push(Pattern::Literal(raw.clone()));
            }
            effective.push(raw);
        }

        Self {
            patterns,
            effective,
        }
    }

    /// The deduplicated pattern list actually in effect (baseline + caller).
    pub fn effective_patterns(&self) -> &[String] {
        &self.effective
    }

    /// True when any pattern matches the root-relative path or its basename.
    /// First match wins; order carries no precedence beyond that.
    pub fn is_excluded(&self, rel_path: &str, basename: &str) -> bool {
        self.patterns.iter().any(|p| match p {
            Pattern::Literal(lit) => {
                rel_path == lit
                    || basename == lit
                    || rel_path.starts_with(&format!("{}/", lit))
            }
            Pattern::Wildcard(re) => re.is_match(rel_path) || re.is_match(basename),
        })
    }
}

/// Expand `*` to "any sequence of characters", escaping everything else,
/// anchored at both ends.
fn compile_wildcard(pattern: &str) -> Result<Regex, regex::Error> {
    let body: String = pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    Regex::new(&format!("^{}$", body))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher(extra: &[&str]) -> ExclusionMatcher {
        let extra: Vec<String> = extra.iter().map(|s| s.to_string()).collect();
        ExclusionMatcher::new(&extra)
    }

    #[test]
    fn test_literal_path_and_basename() {
        let m = matcher(&["docs/internal.md"]);
        assert!(m.is_excluded("docs/internal.md", "internal.md"));
        assert!(m.is_excluded("any/where/internal.md", "internal.md"));
        assert!(!m.is_excluded("docs/public.md", "public.md"));
    }

    #[test]
    fn test_directory_prefix_is_transitive() {
        let m = matcher(&["secrets"]);
        assert!(m.is_excluded("secrets", "secrets"));
        assert!(m.is_excluded("secrets/deep/key.pem", "key.pem"));
        assert!(!m.is_excluded("secrets.txt", "secrets.txt"));
    }

    #[test]
    fn test_wildcard_matches_path_or_basename() {
        let m = matcher(&["*.log"]);
        assert!(m.is_excluded("app.log", "app.log"));
        assert!(m.is_excluded("nested/dir/app.log", "app.log"));
        assert!(!m.is_excluded("applog.txt", "applog.txt"));
    }

    #[test]
    fn test_baseline_always_applies() {
        let m = matcher(&[]);
        assert!(m.is_excluded("node_modules", "node_modules"));
        assert!(m.is_excluded("node_modules/pkg/index.js", "index.js"));
        assert!(m.is_excluded(".env.local", ".env.local"));
        assert!(m.is_excluded("package-lock.json", "package-lock.json"));
    }

    #[test]
    fn test_wildcard_does_not_anchor_mid_name() {
        let m = matcher(&["test*"]);
        assert!(m.is_excluded("tests", "tests"));
        assert!(m.is_excluded("test_helpers.py", "test_helpers.py"));
        assert!(!m.is_excluded("latest.txt", "latest.txt"));
    }

    #[test]
    fn test_effective_patterns_dedupes() {
        let m = matcher(&["node_modules", "custom"]);
        let count = m
            .effective_patterns()
            .iter()
            .filter(|p| p.as_str() == "node_modules")
            .count();
        assert_eq!(count, 1);
        assert!(m.effective_patterns().contains(&"custom".to_string()));
    }
}
