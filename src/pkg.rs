//! The resolved representation of a `.pc` file.
//!
//! A [`Package`] is produced by the parser, then completed by the resolver:
//! the parser fills metadata, variables, flags, and the *parsed* dependency
//! entries; the resolver fills the *resolved* `requires` /
//! `requires_private` key lists and the declared-predicate map, and finally
//! runs [`Package::verify`] against the cache.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use crate::cache::PackageCache;
use crate::dependency::Dependency;
use crate::error::{Error, Result};
use crate::fragment::Flag;
use crate::merge;

/// A package loaded from a `.pc` file (or synthesized by the cache).
#[derive(Debug, Clone, Default)]
pub struct Package {
    /// Cache identifier: the `.pc` basename without extension.
    pub key: String,

    /// The file this package was read from; `None` only for the
    /// synthetic `pkg-config` entry.
    pub pc_file: Option<PathBuf>,

    /// 1-based index of the search directory the file was found in, or 0
    /// when the module was named by explicit filename (explicit files
    /// sort ahead of every path-resolved package).
    pub path_position: usize,

    /// Variables, fully substituted at definition time. `pcfiledir` is
    /// pre-defined before the first line is parsed.
    pub vars: HashMap<String, String>,

    /// The `Name` field. Mandatory; checked by [`verify`](Self::verify).
    pub name: Option<String>,
    /// The `Version` field. Mandatory.
    pub version: Option<String>,
    /// The `Description` field. Mandatory.
    pub description: Option<String>,
    /// The `URL` field.
    pub url: Option<String>,

    /// Classified `Cflags` flags.
    pub cflags: Vec<Flag>,
    /// Classified `Libs` flags.
    pub libs: Vec<Flag>,
    /// Classified `Libs.private` flags, with every public `Libs` flag
    /// appended as well, in file order.
    pub libs_private: Vec<Flag>,

    /// Parsed `Requires` predicates, as written.
    pub requires_entries: Vec<Dependency>,
    /// Parsed `Requires.private` predicates, as written.
    pub requires_private_entries: Vec<Dependency>,
    /// Parsed `Conflicts` predicates.
    pub conflicts: Vec<Dependency>,

    /// Cache keys of resolved public requires, in declaration order.
    pub requires: Vec<String>,
    /// Cache keys of resolved private requires followed by the public
    /// ones: the union of both edge sets, public after private.
    pub requires_private: Vec<String>,
    /// Declared predicate per required-package name, as written.
    pub required_versions: HashMap<String, Dependency>,

    /// Whether the chosen path contained `uninstalled.pc`.
    pub uninstalled: bool,

    pub(crate) libs_count: u32,
    pub(crate) libs_private_count: u32,
    pub(crate) conflicts_seen: bool,
}

impl Package {
    /// A fresh, unparsed package bound to its key and source file.
    pub(crate) fn new(key: impl Into<String>, pc_file: Option<PathBuf>) -> Self {
        Self {
            key: key.into(),
            pc_file,
            ..Self::default()
        }
    }

    /// The version string, empty until the `Version` field is parsed.
    pub fn version(&self) -> &str {
        self.version.as_deref().unwrap_or("")
    }

    /// Validate this package against the cache it was loaded into.
    ///
    /// Checks, in order: presence of the mandatory fields; every resolved
    /// requirement against the predicate declared for it (suggesting the
    /// requirement's URL on mismatch, when it has one); and every package
    /// in the transitive requires closure — private edges included, this
    /// package itself included — against the `Conflicts` predicates.
    pub(crate) fn verify(&self, cache: &PackageCache<'_>) -> Result<()> {
        if self.name.is_none() {
            return Err(Error::MissingField {
                key: self.key.clone(),
                field: "Name",
            });
        }
        if self.version.is_none() {
            return Err(Error::MissingField {
                key: self.key.clone(),
                field: "Version",
            });
        }
        if self.description.is_none() {
            return Err(Error::MissingField {
                key: self.key.clone(),
                field: "Description",
            });
        }

        for req_key in &self.requires_private {
            let Some(required) = cache.get(req_key) else {
                continue;
            };
            // The predicate map is keyed by the name as written, so a
            // requirement that resolved under a different key (an
            // uninstalled variant) is not checked here.
            if let Some(predicate) = self.required_versions.get(req_key) {
                if !predicate.matches(required.version()) {
                    return Err(Error::RequiresVersion {
                        key: self.key.clone(),
                        predicate: predicate.to_string(),
                        dep: required.key.clone(),
                        dep_version: required.version().to_string(),
                        url: required.url.clone(),
                    });
                }
            }
        }

        if !self.conflicts.is_empty() {
            let mut visited = HashSet::new();
            let mut closure = Vec::new();
            merge::fill_expanded(cache, &self.key, true, &mut visited, &mut closure);
            for req_key in &closure {
                let Some(required) = cache.get(req_key) else {
                    continue;
                };
                for conflict in &self.conflicts {
                    if conflict.name == required.key && conflict.matches(required.version()) {
                        return Err(Error::Conflict {
                            version: required.version().to_string(),
                            dep: required.key.clone(),
                            predicate: conflict.to_string(),
                            key: self.key.clone(),
                            key_version: self.version().to_string(),
                        });
                    }
                }
            }
        }

        Ok(())
    }
}
