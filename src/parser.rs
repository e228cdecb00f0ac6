//! `.pc` file parsing.
//!
//! The parser consumes the logical lines produced by [`LineReader`] and
//! fills a [`Package`]. Each trimmed line is either blank, a
//! `TAG: VALUE` field, or a `NAME = VALUE` variable definition, where the
//! tag is a run of `[A-Za-z0-9_.]` characters optionally separated from
//! the sign by whitespace. Lines matching neither shape, and fields with
//! unrecognized tags, are skipped for forward compatibility.
//!
//! Values are variable-substituted at assignment time: `$$` yields a
//! literal `$` and `${name}` inlines a variable of this package. Variable
//! definitions substitute against the variables defined so far, so the
//! stored map holds fully-expanded values.

use std::path::Path;

use log::debug;

use crate::argsplit;
use crate::dependency;
use crate::error::{Error, Result};
use crate::fragment::{classify_cflags, classify_libs};
use crate::pkg::Package;
use crate::reader::{LineReader, TextLoader};

/// Parse the `.pc` file at `path` into a package under `key`.
///
/// `ignore_private_reqs` makes the parser drop `Requires.private` lines
/// unparsed; the dynamic-libs query uses it so private transitive
/// requirements are neither loaded nor reported.
pub fn parse_package_file(key: &str, path: &Path, ignore_private_reqs: bool) -> Result<Package> {
    let loader = TextLoader::open(path)?;
    parse_package(key, path, loader, ignore_private_reqs)
}

/// Parse in-memory `.pc` text, with `path` used for `pcfiledir` and error
/// messages.
pub fn parse_package_str(
    key: &str,
    path: &Path,
    text: &str,
    ignore_private_reqs: bool,
) -> Result<Package> {
    parse_package(key, path, TextLoader::from_text(text), ignore_private_reqs)
}

fn parse_package(
    key: &str,
    path: &Path,
    loader: TextLoader,
    ignore_private_reqs: bool,
) -> Result<Package> {
    let mut pkg = Package::new(key, Some(path.to_path_buf()));

    let pcfiledir = path
        .parent()
        .map(|dir| dir.to_string_lossy().into_owned())
        .unwrap_or_default();
    debug!("Variable pcfiledir declared as '{pcfiledir}'");
    pkg.vars.insert("pcfiledir".to_string(), pcfiledir);

    for line in LineReader::new(loader) {
        parse_line(&mut pkg, &line, path, ignore_private_reqs)?;
    }

    Ok(pkg)
}

fn is_tag_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.'
}

fn parse_line(pkg: &mut Package, line: &str, path: &Path, ignore_private_reqs: bool) -> Result<()> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(());
    }

    let tag_end = line.find(|c| !is_tag_char(c)).unwrap_or(line.len());
    let tag = &line[..tag_end];
    if tag.is_empty() {
        return Ok(());
    }

    let rest = line[tag_end..].trim_start();
    let mut chars = rest.chars();
    let sign = chars.next();
    let value = chars.as_str().trim_start();

    match sign {
        Some(':') => parse_field(pkg, tag, value, path, ignore_private_reqs),
        Some('=') => parse_variable(pkg, tag, value, path),
        _ => Ok(()),
    }
}

fn parse_field(
    pkg: &mut Package,
    tag: &str,
    value: &str,
    path: &Path,
    ignore_private_reqs: bool,
) -> Result<()> {
    match tag {
        "Name" => {
            if pkg.name.is_some() {
                return Err(duplicate("Name", path));
            }
            pkg.name = Some(substitute(pkg, value, path)?);
        }
        "Version" => {
            if pkg.version.is_some() {
                return Err(duplicate("Version", path));
            }
            pkg.version = Some(substitute(pkg, value, path)?);
        }
        "Description" => {
            if pkg.description.is_some() {
                return Err(duplicate("Description", path));
            }
            pkg.description = Some(substitute(pkg, value, path)?);
        }
        "URL" => {
            if pkg.url.is_some() {
                return Err(duplicate("URL", path));
            }
            pkg.url = Some(substitute(pkg, value, path)?);
        }
        // Both historical spellings are accepted, case-sensitively.
        "Cflags" | "CFlags" => {
            if !pkg.cflags.is_empty() {
                return Err(duplicate("Cflags", path));
            }
            let trimmed = substitute(pkg, value, path)?;
            if !trimmed.is_empty() {
                let argv = split_field(&trimmed, "Cflags")?;
                pkg.cflags = classify_cflags(&argv);
            }
        }
        "Libs" => {
            if pkg.libs_count > 0 {
                return Err(duplicate("Libs", path));
            }
            let trimmed = substitute(pkg, value, path)?;
            if !trimmed.is_empty() {
                let argv = split_field(&trimmed, "Libs")?;
                let flags = classify_libs(&argv);
                // Public link flags always take part in static queries.
                pkg.libs_private.extend(flags.iter().cloned());
                pkg.libs = flags;
            }
            pkg.libs_count += 1;
        }
        "Libs.private" => {
            if pkg.libs_private_count > 0 {
                return Err(duplicate("Libs.private", path));
            }
            let trimmed = substitute(pkg, value, path)?;
            if !trimmed.is_empty() {
                let argv = split_field(&trimmed, "Libs.private")?;
                pkg.libs_private.extend(classify_libs(&argv));
            }
            pkg.libs_private_count += 1;
        }
        // A later Requires line silently replaces an earlier one: the
        // duplicate check inspects the resolved list, which is still
        // empty at parse time.
        "Requires" => {
            if pkg.requires.is_empty() {
                let trimmed = substitute(pkg, value, path)?;
                pkg.requires_entries = dependency::parse_module_list(&trimmed, path)?;
            }
        }
        "Requires.private" => {
            if !ignore_private_reqs && pkg.requires_private.is_empty() {
                let trimmed = substitute(pkg, value, path)?;
                pkg.requires_private_entries = dependency::parse_module_list(&trimmed, path)?;
            }
        }
        "Conflicts" => {
            let trimmed = substitute(pkg, value, path)?;
            let entries = dependency::parse_module_list(&trimmed, path)?;
            if pkg.conflicts_seen {
                if !entries.is_empty() {
                    return Err(duplicate("Conflicts", path));
                }
                // A trailing empty occurrence is tolerated and keeps the
                // existing entries.
            } else {
                pkg.conflicts_seen = true;
                pkg.conflicts = entries;
            }
        }
        _ => {}
    }
    Ok(())
}

fn parse_variable(pkg: &mut Package, name: &str, value: &str, path: &Path) -> Result<()> {
    if pkg.vars.contains_key(name) {
        return Err(Error::DuplicateVariable {
            variable: name.to_string(),
            path: path.to_path_buf(),
        });
    }
    let expanded = substitute(pkg, value, path)?;
    debug!("Variable '{name}' declared as '{expanded}'");
    pkg.vars.insert(name.to_string(), expanded);
    Ok(())
}

fn duplicate(field: &'static str, path: &Path) -> Error {
    Error::DuplicateField {
        field,
        path: path.to_path_buf(),
    }
}

fn split_field(value: &str, field: &'static str) -> Result<Vec<String>> {
    argsplit::split(value).map_err(|source| Error::ArgvSplit {
        field,
        source: Box::new(source),
    })
}

/// Substitute `$$` and `${name}` references in `value` against the
/// package's variables defined so far. The result is trimmed.
fn substitute(pkg: &Package, value: &str, path: &Path) -> Result<String> {
    let trimmed = value.trim();
    let chars: Vec<char> = trimmed.chars().collect();
    let mut out = String::with_capacity(trimmed.len());
    let mut i = 0;

    while i < chars.len() {
        if chars[i] == '$' && chars.get(i + 1) == Some(&'$') {
            out.push('$');
            i += 2;
        } else if chars[i] == '$' && chars.get(i + 1) == Some(&'{') {
            let name_start = i + 2;
            let mut name_end = name_start;
            while name_end < chars.len() && chars[name_end] != '}' {
                name_end += 1;
            }
            let name: String = chars[name_start..name_end].iter().collect();
            i = if name_end < chars.len() {
                name_end + 1
            } else {
                name_end
            };
            match pkg.vars.get(&name) {
                Some(resolved) => out.push_str(resolved),
                None => {
                    return Err(Error::UndefinedVariable {
                        variable: name,
                        path: path.to_path_buf(),
                    });
                }
            }
        } else {
            out.push(chars[i]);
            i += 1;
        }
    }

    Ok(out)
}
