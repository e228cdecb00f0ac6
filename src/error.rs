//! Error types for pcquery.

use std::io;
use std::path::PathBuf;

/// Result type alias for pcquery operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving packages and computing flags.
///
/// The message text is part of the crate's compatibility contract: callers
/// (and the test suite) match on substrings of these messages, so the
/// wording is kept aligned with the classic tool rather than restyled.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A requested module could not be located in any search directory.
    #[error("Package \"{name}\" was not found in the PkgConfig searchPath")]
    PackageNotFound { name: String },

    /// A `Requires` / `Requires.private` dependency could not be located.
    #[error("Package '{name}', required by '{required_by}', not found")]
    RequiredPackageNotFound { name: String, required_by: String },

    /// A mandatory field (Name, Version, Description) is missing.
    #[error("Package '{key}' has no {field}: field")]
    MissingField { key: String, field: &'static str },

    /// A single-definition field appeared more than once.
    #[error("{field} field occurs twice in '{}'", path.display())]
    DuplicateField { field: &'static str, path: PathBuf },

    /// A variable was defined more than once in the same file.
    #[error("Duplicate definition of variable '{variable}' in '{}'", path.display())]
    DuplicateVariable { variable: String, path: PathBuf },

    /// A `${...}` reference named a variable with no definition.
    #[error("Variable '{variable}' not defined in '{}'", path.display())]
    UndefinedVariable { variable: String, path: PathBuf },

    /// A flags field could not be split into an argument vector.
    #[error("Couldn't parse {field} field into an argument vector: {source}")]
    ArgvSplit {
        field: &'static str,
        #[source]
        source: Box<Error>,
    },

    /// Splitter input ended while a backslash escape was pending.
    #[error("Text ended just after a '\\' character. (The text was '{text}')")]
    TrailingBackslash { text: String },

    /// Splitter input ended inside a quoted region.
    #[error("Text ended before matching quote was found for {quote}. (The text was '{text}')")]
    UnterminatedQuote { quote: char, text: String },

    /// Splitter input produced no tokens at all.
    #[error("Text was empty (or contained only whitespace)")]
    EmptyText,

    /// A quoted token ended without its closing quote.
    #[error("Unmatched quotation mark in command line or other shell-quoted text")]
    UnmatchedQuote,

    /// The unquoting scanner was handed text not starting with a quote.
    #[error("Quoted text doesn't begin with a quotation mark")]
    NotQuoted,

    /// A module-list entry had separators where a name should be.
    #[error("Empty package name in Requires or Conflicts in file '{}'", path.display())]
    EmptyPackageName { path: PathBuf },

    /// A module-list entry used an operator outside `=`, `!=`, `<`, `<=`, `>`, `>=`.
    #[error("Unknown version comparison operator '{operator}' after package name '{name}' in file '{}'", path.display())]
    UnknownOperator {
        operator: String,
        name: String,
        path: PathBuf,
    },

    /// A module-list entry had an operator but no version after it.
    #[error("Comparison operator but no version after package name '{name}' in file '{}'", path.display())]
    VersionMissing { name: String, path: PathBuf },

    /// A user-supplied module expression was not `NAME` or `NAME OP VERSION`.
    #[error("Could not parse package specification '{spec}'")]
    BadPackageSpec { spec: String },

    /// A user-supplied module expression used an unknown operator.
    #[error("Unknown version comparison operator '{operator}' in '{spec}'")]
    BadSpecOperator { operator: String, spec: String },

    /// The resolved package version did not satisfy the user's predicate.
    #[error("Requested '{spec}' but version of {name} is {version}")]
    RequestedVersion {
        spec: String,
        name: String,
        version: String,
    },

    /// A resolved dependency's version did not satisfy the declared predicate.
    #[error("Package '{key}' requires '{predicate}' but version of {dep} is {dep_version}{}", version_hint(dep, url))]
    RequiresVersion {
        key: String,
        predicate: String,
        dep: String,
        dep_version: String,
        url: Option<String>,
    },

    /// A package in the transitive requires closure matched a conflict predicate.
    #[error("Version '{version}' of {dep} creates a conflict. ({predicate} conflicts with {key} '{key_version}')")]
    Conflict {
        version: String,
        dep: String,
        predicate: String,
        key: String,
        key_version: String,
    },

    /// An I/O error occurred while reading a `.pc` file.
    #[error(transparent)]
    Io(#[from] io::Error),
}

fn version_hint(dep: &str, url: &Option<String>) -> String {
    match url {
        Some(url) => format!("\nYou may find new versions of {dep} at {url}"),
        None => String::new(),
    }
}
