//! Path and method inclusion rules.
//!
//! Both filters share the same shape: an empty include list admits everything, and any exclude
//! match vetoes regardless of the include result.

use crate::config::ApiConfig;
use regex::Regex;
use tracing::warn;

/// Compile path patterns, skipping blank entries. Invalid patterns are logged and dropped.
#[must_use]
pub fn compile_patterns<S: AsRef<str>>(patterns: &[S]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| p.as_ref().trim())
        .filter(|p| !p.is_empty())
        .filter_map(|p| match Regex::new(p) {
            Ok(re) => Some(re),
            Err(e) => {
                warn!(pattern = %p, error = %e, "ignoring invalid path pattern");
                None
            }
        })
        .collect()
}

/// Unanchored regex match of `path` against the include/exclude patterns.
#[must_use]
pub fn should_include_path(path: &str, include: &[Regex], exclude: &[Regex]) -> bool {
    let included = include.is_empty() || include.iter().any(|re| re.is_match(path));
    included && !exclude.iter().any(|re| re.is_match(path))
}

/// Case-insensitive exact match of `method` against the include/exclude lists.
#[must_use]
pub fn should_include_method<S: AsRef<str>>(method: &str, include: &[S], exclude: &[S]) -> bool {
    let matches = |m: &S| m.as_ref().trim().eq_ignore_ascii_case(method);
    let include: Vec<&S> = include
        .iter()
        .filter(|m| !m.as_ref().trim().is_empty())
        .collect();

    let included = include.is_empty() || include.iter().any(|m| matches(m));
    included && !exclude.iter().any(matches)
}

/// Compiled path and method filters for one tool source.
#[derive(Debug, Clone, Default)]
pub struct OperationFilter {
    include_paths: Vec<Regex>,
    exclude_paths: Vec<Regex>,
    include_methods: Vec<String>,
    exclude_methods: Vec<String>,
}

impl OperationFilter {
    #[must_use]
    pub fn from_config(config: &ApiConfig) -> Self {
        Self {
            include_paths: compile_patterns(&config.include_paths),
            exclude_paths: compile_patterns(&config.exclude_paths),
            include_methods: config.include_methods.clone(),
            exclude_methods: config.exclude_methods.clone(),
        }
    }

    #[must_use]
    pub fn allows(&self, path: &str, method: &str) -> bool {
        should_include_path(path, &self.include_paths, &self.exclude_paths)
            && should_include_method(method, &self.include_methods, &self.exclude_methods)
    }
}
