//! Version predicates over named packages.
//!
//! A [`Dependency`] is a `{name, operator, version}` triple constraining
//! which versions of a package are acceptable. Predicates come from two
//! places with different syntax rules: user-supplied module expressions
//! (`"zlib >= 1.2"`) and the `Requires` / `Requires.private` / `Conflicts`
//! module lists inside `.pc` files.
//!
//! Module lists are comma- or whitespace-separated; an operator must be
//! surrounded by whitespace or it is swallowed into the package name
//! (`foo>=1.0` names the package `foo>=1.0`). Entry splitting runs a small
//! character-class state machine, and each entry is then cut into its
//! parts with in-place NUL writes on a [`CharBuf`].

use std::fmt;
use std::path::Path;

use crate::cursor::CharBuf;
use crate::error::{Error, Result};
use crate::version::Comparator;

/// A version predicate against a named package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    /// The package name the predicate applies to.
    pub name: String,
    /// The comparison operator; [`Comparator::Any`] when unconstrained.
    pub comparator: Comparator,
    /// The right-hand version, absent for unconstrained predicates.
    pub version: Option<String>,
}

impl Dependency {
    /// An unconstrained predicate: any version of `name` matches.
    pub fn any(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            comparator: Comparator::Any,
            version: None,
        }
    }

    /// A constrained predicate.
    pub fn with_version(
        name: impl Into<String>,
        comparator: Comparator,
        version: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            comparator,
            version: Some(version.into()),
        }
    }

    /// Test an actual version against this predicate.
    pub fn matches(&self, actual: &str) -> bool {
        match &self.version {
            Some(version) => self.comparator.eval(actual, version),
            None => true,
        }
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{} {} {}", self.name, self.comparator, version),
            None => f.write_str(&self.name),
        }
    }
}

/// Parse a user-supplied module expression.
///
/// One whitespace-separated token is a bare name; three tokens are
/// `NAME OP VERSION`. Anything else fails.
///
/// # Examples
///
/// ```
/// use pcquery::dependency::parse_user_arg;
///
/// let dep = parse_user_arg("zlib >= 1.2.11").unwrap();
/// assert_eq!(dep.name, "zlib");
/// assert!(dep.matches("1.2.13"));
/// ```
pub fn parse_user_arg(text: &str) -> Result<Dependency> {
    let parts: Vec<&str> = text.split_whitespace().collect();
    match parts.as_slice() {
        [name] => Ok(Dependency::any(*name)),
        [name, op, version] => {
            let comparator = Comparator::from_str(op).ok_or_else(|| Error::BadSpecOperator {
                operator: op.to_string(),
                spec: text.to_string(),
            })?;
            Ok(Dependency::with_version(*name, comparator, *version))
        }
        _ => Err(Error::BadPackageSpec {
            spec: text.to_string(),
        }),
    }
}

/// Parse a `Requires` / `Requires.private` / `Conflicts` module list.
/// `path` names the file for error messages.
pub fn parse_module_list(text: &str, path: &Path) -> Result<Vec<Dependency>> {
    split_module_list(text)
        .iter()
        .map(|entry| parse_module(entry, path))
        .collect()
}

fn is_module_separator(c: char) -> bool {
    c == ',' || c.is_ascii_whitespace()
}

fn is_operator_char(c: char) -> bool {
    matches!(c, '<' | '>' | '!' | '=')
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SplitState {
    Outside,
    InName,
    BeforeOp,
    InOp,
    AfterOp,
    InVersion,
}

/// Split a module list into entry substrings. Entries keep their leading
/// separators; [`parse_module`] strips them.
fn split_module_list(text: &str) -> Vec<String> {
    use SplitState::*;

    let buf = CharBuf::new(text);
    let mut p = buf.start();
    let mut start = buf.start();
    let mut state = Outside;
    let mut last_state = Outside;
    let mut entries = Vec::new();

    while buf.peek(p) != '\0' {
        let c = buf.peek(p);
        state = match state {
            Outside => {
                if is_module_separator(c) {
                    Outside
                } else {
                    InName
                }
            }
            InName => {
                if c.is_ascii_whitespace() {
                    // Whitespace either ends the entry or introduces an
                    // operator; look ahead to the next non-blank char.
                    let mut ahead = p;
                    while buf.peek(ahead) != '\0' && buf.peek(ahead).is_ascii_whitespace() {
                        ahead.advance();
                    }
                    let next = buf.peek(ahead);
                    if next != '\0' && !is_module_separator(next) && is_operator_char(next) {
                        BeforeOp
                    } else {
                        Outside
                    }
                } else if is_module_separator(c) {
                    // A comma precludes any operator.
                    Outside
                } else {
                    InName
                }
            }
            BeforeOp => {
                if is_operator_char(c) {
                    InOp
                } else {
                    BeforeOp
                }
            }
            InOp => {
                if is_operator_char(c) {
                    InOp
                } else {
                    AfterOp
                }
            }
            AfterOp => {
                if c.is_ascii_whitespace() {
                    AfterOp
                } else {
                    InVersion
                }
            }
            InVersion => {
                if is_module_separator(c) {
                    Outside
                } else {
                    InVersion
                }
            }
        };

        if state == Outside && last_state != Outside {
            entries.push(buf.slice(start, p.offset_from(start) as usize));
            start = p;
        }
        last_state = state;
        p.advance();
    }

    if p != start {
        entries.push(buf.slice(start, p.offset_from(start) as usize));
    }

    entries
}

/// Parse a single module-list entry into a predicate, cutting the entry
/// into name / operator / version with in-place NUL writes.
fn parse_module(entry: &str, path: &Path) -> Result<Dependency> {
    let mut buf = CharBuf::new(entry);
    let mut p = buf.start();

    while buf.peek(p) != '\0' && is_module_separator(buf.peek(p)) {
        p.advance();
    }
    let name_start = p;
    while buf.peek(p) != '\0' && !buf.peek(p).is_ascii_whitespace() {
        p.advance();
    }
    while buf.peek(p) != '\0' && is_module_separator(buf.peek(p)) {
        buf.write_nul(p);
        p.advance();
    }
    if buf.peek(name_start) == '\0' {
        return Err(Error::EmptyPackageName {
            path: path.to_path_buf(),
        });
    }
    let name = buf.string_from(name_start);

    let op_start = p;
    while buf.peek(p) != '\0' && !buf.peek(p).is_ascii_whitespace() {
        p.advance();
    }
    while buf.peek(p) != '\0' && buf.peek(p).is_ascii_whitespace() {
        buf.write_nul(p);
        p.advance();
    }
    let comparator = if buf.peek(op_start) != '\0' {
        let op = buf.string_from(op_start);
        Comparator::from_str(&op).ok_or_else(|| Error::UnknownOperator {
            operator: op,
            name: name.clone(),
            path: path.to_path_buf(),
        })?
    } else {
        Comparator::Any
    };

    let version_start = p;
    while buf.peek(p) != '\0' && !is_module_separator(buf.peek(p)) {
        p.advance();
    }
    while buf.peek(p) != '\0' && is_module_separator(buf.peek(p)) {
        buf.write_nul(p);
        p.advance();
    }
    let version = if buf.peek(version_start) != '\0' {
        Some(buf.string_from(version_start))
    } else {
        None
    };

    if comparator != Comparator::Any && version.is_none() {
        return Err(Error::VersionMissing {
            name,
            path: path.to_path_buf(),
        });
    }

    Ok(Dependency {
        name,
        comparator,
        version,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pc() -> &'static Path {
        Path::new("/test/sample.pc")
    }

    // ── Dependency ──────────────────────────────────────────────────

    #[test]
    fn unconstrained_matches_everything() {
        let dep = Dependency::any("zlib");
        assert!(dep.matches("0.0.1"));
        assert!(dep.matches("999"));
    }

    #[test]
    fn constrained_matches() {
        let dep = Dependency::with_version("zlib", Comparator::GreaterThanEqual, "1.2");
        assert!(dep.matches("1.2"));
        assert!(dep.matches("1.3"));
        assert!(!dep.matches("1.1"));
    }

    #[test]
    fn display_forms() {
        assert_eq!(Dependency::any("zlib").to_string(), "zlib");
        assert_eq!(
            Dependency::with_version("zlib", Comparator::LessThan, "2.0").to_string(),
            "zlib < 2.0"
        );
    }

    // ── parse_user_arg ──────────────────────────────────────────────

    #[test]
    fn user_arg_bare_name() {
        let dep = parse_user_arg("glib-2.0").unwrap();
        assert_eq!(dep.name, "glib-2.0");
        assert_eq!(dep.comparator, Comparator::Any);
        assert!(dep.version.is_none());
    }

    #[test]
    fn user_arg_with_constraint() {
        let dep = parse_user_arg("glib-2.0 >= 2.50").unwrap();
        assert_eq!(dep.name, "glib-2.0");
        assert_eq!(dep.comparator, Comparator::GreaterThanEqual);
        assert_eq!(dep.version.as_deref(), Some("2.50"));
    }

    #[test]
    fn user_arg_extra_whitespace_is_fine() {
        let dep = parse_user_arg("  zlib   <   1.3  ").unwrap();
        assert_eq!(dep.to_string(), "zlib < 1.3");
    }

    #[test]
    fn user_arg_unknown_operator() {
        let err = parse_user_arg("zlib ~> 1.0").unwrap_err();
        assert!(err.to_string().contains("Unknown version comparison operator '~>'"));
    }

    #[test]
    fn user_arg_wrong_token_count() {
        assert!(parse_user_arg("zlib >=").is_err());
        assert!(parse_user_arg("zlib >= 1.0 extra").is_err());
        assert!(parse_user_arg("").is_err());
        assert!(parse_user_arg("   ").is_err());
    }

    // ── Module lists ────────────────────────────────────────────────

    #[test]
    fn module_list_single_name() {
        let deps = parse_module_list("zlib", pc()).unwrap();
        assert_eq!(deps, vec![Dependency::any("zlib")]);
    }

    #[test]
    fn module_list_comma_separated() {
        let deps = parse_module_list("glib-2.0 >= 2.50, gio-2.0", pc()).unwrap();
        assert_eq!(deps.len(), 2);
        assert_eq!(deps[0].to_string(), "glib-2.0 >= 2.50");
        assert_eq!(deps[1], Dependency::any("gio-2.0"));
    }

    #[test]
    fn module_list_whitespace_separated() {
        let deps = parse_module_list("a b c", pc()).unwrap();
        let names: Vec<&str> = deps.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn module_list_mixed_constraints() {
        let deps = parse_module_list("foo = 1.0 bar != 2 baz", pc()).unwrap();
        assert_eq!(deps.len(), 3);
        assert_eq!(deps[0].to_string(), "foo = 1.0");
        assert_eq!(deps[1].to_string(), "bar != 2");
        assert_eq!(deps[2].to_string(), "baz");
    }

    #[test]
    fn module_list_empty_is_empty() {
        assert!(parse_module_list("", pc()).unwrap().is_empty());
    }

    #[test]
    fn operator_without_spaces_joins_the_name() {
        // Operators require surrounding whitespace; without it the whole
        // run of characters is a package name.
        let deps = parse_module_list("foo>=1.0", pc()).unwrap();
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].name, "foo>=1.0");
        assert_eq!(deps[0].comparator, Comparator::Any);
    }

    #[test]
    fn unknown_operator_in_file() {
        let err = parse_module_list("foo ~= 1.0", pc()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Unknown version comparison operator '~='"));
        assert!(msg.contains("after package name 'foo'"));
        assert!(msg.contains("/test/sample.pc"));
    }

    #[test]
    fn operator_without_version_fails() {
        let err = parse_module_list("foo >=", pc()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Comparison operator but no version after package name 'foo'"));
        assert!(msg.contains("/test/sample.pc"));
    }

    #[test]
    fn trailing_comma_is_an_empty_name() {
        let err = parse_module_list("foo,", pc()).unwrap_err();
        assert!(err
            .to_string()
            .contains("Empty package name in Requires or Conflicts"));
    }

    #[test]
    fn version_with_comma_terminator() {
        let deps = parse_module_list("foo >= 1.0,bar", pc()).unwrap();
        assert_eq!(deps.len(), 2);
        assert_eq!(deps[0].to_string(), "foo >= 1.0");
        assert_eq!(deps[1].name, "bar");
    }
}
