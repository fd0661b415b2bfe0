//! Module system errors

use aria_parser::ParseError;
use std::path::PathBuf;
use thiserror::Error;
use crate::resolver::ModuleId;

/// Result type for module operations
pub type ModuleResult<T> = Result<T, ModuleError>;

/// Errors that can occur during module resolution and compilation
#[derive(Debug, Error)]
pub enum ModuleError {
    /// A module could not be found
    #[error("module not found: {0}")]
    ModuleNotFound(String),

    /// A file could not be found
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// IO error while reading a module file
    #[error("IO error reading {}: {1}", .0.display())]
    IoError(PathBuf, #[source] std::io::Error),

    /// Parse errors in a module
    #[error("parse errors in {}: {} error(s)", .path.display(), .errors.len())]
    ParseError {
        path: PathBuf,
        errors: Vec<ParseError>,
    },

    /// Circular dependency detected (with module IDs only)
    #[error("circular dependency detected: {}", format_cycle_ids(.0))]
    CircularDependency(Vec<ModuleId>),

    /// Circular dependency detected (with module names for better error messages)
    #[error("circular dependency detected: {}", format_cycle_names(.0))]
    CircularDependencyNamed(Vec<String>),

    /// Import resolution failed
    #[error("failed to resolve import '{0}'")]
    ImportResolutionFailed(String),

    /// Imported item not found in module
    #[error("item '{item}' not found in module '{module}'")]
    ItemNotFound {
        module: String,
        item: String,
    },

    /// Attempted to import a private item
    #[error("item '{item}' is private in module '{module}'")]
    PrivateItem {
        module: String,
        item: String,
    },

    /// Conflicting imports
    #[error("conflicting imports for name '{0}'")]
    ConflictingImports(String),

    /// Module name conflict
    #[error("module name conflict: {0}")]
    NameConflict(String),
}

/// Format a cycle with module IDs for error messages
fn format_cycle_ids(cycle: &[ModuleId]) -> String {
    if cycle.is_empty() {
        return String::from("(empty cycle)");
    }

    let parts: Vec<_> = cycle.iter()
        .map(|id| format!("{:?}", id))
        .collect();

    parts.join(" -> ")
}

/// Format a cycle with module names for error messages
fn format_cycle_names(cycle: &[String]) -> String {
    if cycle.is_empty() {
        return String::from("(empty cycle)");
    }

    cycle.join(" -> ")
}
