//! Lazy package resolution and caching.
//!
//! A [`PackageCache`] lives for a single top-level query. Packages are
//! located on first reference — explicit `.pc` filenames load directly,
//! plain names first probe for a `-uninstalled` variant and then walk the
//! search path — parsed, completed with their resolved requirements, and
//! verified.
//!
//! Lookups use the requested name verbatim while insertion uses the
//! package key (the `.pc` basename). The two only differ for
//! filename-loaded packages, so a later filename load of some basename
//! replaces whatever plain-name load got there first. That asymmetry is
//! load-bearing for compatibility and is deliberately not normalized.
//!
//! Every cache is pre-populated with a synthetic `pkg-config` package so
//! `.pc` files may depend on the tool itself.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::{Error, Result};
use crate::parser;
use crate::pkg::Package;

/// The version the synthetic `pkg-config` package reports.
pub const PKG_CONFIG_VERSION: &str = "0.29.2";

/// A per-query store of resolved packages.
#[derive(Debug)]
pub struct PackageCache<'a> {
    search_paths: &'a [PathBuf],
    ignore_private_reqs: bool,
    packages: HashMap<String, Package>,
}

impl<'a> PackageCache<'a> {
    /// A fresh cache over `search_paths`, holding only the synthetic
    /// `pkg-config` package. `ignore_private_reqs` is handed to the
    /// parser for every file loaded through this cache.
    pub fn new(search_paths: &'a [PathBuf], ignore_private_reqs: bool) -> Self {
        let mut packages = HashMap::new();
        let synthetic = synthetic_pkg_config();
        packages.insert(synthetic.key.clone(), synthetic);
        Self {
            search_paths,
            ignore_private_reqs,
            packages,
        }
    }

    /// Look a package up by its cache key.
    pub fn get(&self, key: &str) -> Option<&Package> {
        self.packages.get(key)
    }

    /// The `pc_file` paths of every package loaded from disk, one entry
    /// per cached package, in no particular order.
    pub fn loaded_files(&self) -> Vec<PathBuf> {
        self.packages
            .values()
            .filter_map(|pkg| pkg.pc_file.clone())
            .collect()
    }

    /// Load a module that must exist, returning its cache key.
    pub fn load(&mut self, name: &str) -> Result<String> {
        self.try_load(name)?.ok_or_else(|| Error::PackageNotFound {
            name: name.to_string(),
        })
    }

    /// Load a module, returning `Ok(None)` when it cannot be located.
    /// Parse and verification failures are errors either way.
    pub fn try_load(&mut self, name: &str) -> Result<Option<String>> {
        if self.packages.contains_key(name) {
            return Ok(Some(name.to_string()));
        }

        debug!("Looking for package '{name}'");

        let location: PathBuf;
        let key: String;
        let path_position: usize;

        if name.ends_with(".pc") {
            debug!("Considering '{name}' to be a filename rather than a package name");
            location = PathBuf::from(name);
            key = Path::new(name)
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| name.to_string());
            path_position = 0;
        } else {
            if !name.ends_with("-uninstalled") {
                if let Some(found) = self.try_load(&format!("{name}-uninstalled"))? {
                    debug!("Preferring uninstalled version of package '{name}'");
                    return Ok(Some(found));
                }
            }

            let mut found = None;
            let mut position = 0;
            for dir in self.search_paths {
                position += 1;
                let candidate = dir.join(format!("{name}.pc"));
                if candidate.is_file() {
                    found = Some(candidate);
                    break;
                }
            }
            let Some(found) = found else {
                return Ok(None);
            };
            location = found;
            key = name.to_string();
            path_position = position;
        }

        debug!("Reading '{}' from file '{}'", name, location.display());
        let mut pkg = parser::parse_package_file(&key, &location, self.ignore_private_reqs)?;
        if location.to_string_lossy().contains("uninstalled.pc") {
            pkg.uninstalled = true;
        }
        pkg.path_position = path_position;

        let key = pkg.key.clone();
        let requires_entries = pkg.requires_entries.clone();
        let requires_private_entries = pkg.requires_private_entries.clone();

        // Insert before resolving requirements so dependency cycles hit
        // the cache instead of recursing forever.
        self.packages.insert(key.clone(), pkg);

        let mut requires = Vec::with_capacity(requires_entries.len());
        let mut requires_private = Vec::with_capacity(requires_private_entries.len());
        let mut required_versions = HashMap::new();

        for dep in &requires_entries {
            debug!("Searching for '{key}' requirement '{}'", dep.name);
            let req_key = self.load_requirement(&dep.name, &key)?;
            required_versions.insert(dep.name.clone(), dep.clone());
            requires.push(req_key);
        }
        for dep in &requires_private_entries {
            debug!("Searching for '{key}' private requirement '{}'", dep.name);
            let req_key = self.load_requirement(&dep.name, &key)?;
            required_versions.insert(dep.name.clone(), dep.clone());
            requires_private.push(req_key);
        }
        // The private list carries the union of both edge sets, public
        // requirements after the private ones.
        requires_private.extend(requires.iter().cloned());

        if let Some(entry) = self.packages.get_mut(&key) {
            entry.requires = requires;
            entry.requires_private = requires_private;
            entry.required_versions = required_versions;
        }

        self.verify(&key)?;
        Ok(Some(key))
    }

    fn load_requirement(&mut self, name: &str, required_by: &str) -> Result<String> {
        match self.try_load(name)? {
            Some(key) => Ok(key),
            None => Err(Error::RequiredPackageNotFound {
                name: name.to_string(),
                required_by: required_by.to_string(),
            }),
        }
    }

    fn verify(&self, key: &str) -> Result<()> {
        match self.packages.get(key) {
            Some(pkg) => pkg.verify(self),
            None => Ok(()),
        }
    }
}

/// The synthetic `pkg-config` package present in every cache.
fn synthetic_pkg_config() -> Package {
    let mut pkg = Package::new("pkg-config", None);
    pkg.name = Some("pkg-config".to_string());
    pkg.version = Some(PKG_CONFIG_VERSION.to_string());
    pkg.description =
        Some("pkg-config is a system for managing compile/link flags for libraries".to_string());
    pkg.url = Some("http://pkg-config.freedesktop.org/".to_string());
    pkg
}
