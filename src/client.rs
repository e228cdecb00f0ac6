//! The query facade.
//!
//! A [`Client`] owns the configured search path and answers the three
//! classic queries: compile flags, dynamic link flags, and static link
//! flags. Each query builds a fresh [`PackageCache`], so concurrent
//! queries against one client never share mutable state, and a query's
//! packages are dropped when it returns.

use std::path::PathBuf;

use log::debug;

use crate::cache::PackageCache;
use crate::dependency;
use crate::error::{Error, Result};
use crate::merge::{self, QuerySpec};

/// Client configuration. The search path is the one recognized option:
/// directories are consulted in order for module-by-name lookups.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub search_paths: Vec<PathBuf>,
}

/// The outcome of a query.
#[derive(Debug, Clone)]
pub struct QueryResult {
    /// The flattened flag tokens, in output order.
    pub flags: Vec<String>,
    /// The `.pc` files read during the query, one entry per loaded
    /// package, in no particular order.
    pub files: Vec<PathBuf>,
}

/// Answers flag queries over a fixed search path.
///
/// # Examples
///
/// ```no_run
/// use pcquery::{Client, Config};
///
/// let client = Client::new(Config {
///     search_paths: vec!["/usr/lib/pkgconfig".into()],
/// });
/// let result = client.cflags(&["glib-2.0 >= 2.50"])?;
/// println!("{}", result.flags.join(" "));
/// # Ok::<(), pcquery::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    search_paths: Vec<PathBuf>,
}

impl Client {
    pub fn new(config: Config) -> Self {
        Self {
            search_paths: config.search_paths,
        }
    }

    /// Compile flags for `modules`.
    pub fn cflags<S: AsRef<str>>(&self, modules: &[S]) -> Result<QueryResult> {
        self.query(modules, QuerySpec::cflags(), false)
    }

    /// Dynamic link flags for `modules`. Private requirements are
    /// dropped at parse time: they are neither loaded nor reported.
    pub fn libs<S: AsRef<str>>(&self, modules: &[S]) -> Result<QueryResult> {
        self.query(modules, QuerySpec::libs(), true)
    }

    /// Static link flags for `modules`: the private flag sequences over
    /// the full private-inclusive dependency closure.
    pub fn static_libs<S: AsRef<str>>(&self, modules: &[S]) -> Result<QueryResult> {
        self.query(modules, QuerySpec::static_libs(), false)
    }

    fn query<S: AsRef<str>>(
        &self,
        modules: &[S],
        spec: QuerySpec,
        ignore_private_reqs: bool,
    ) -> Result<QueryResult> {
        let mut cache = PackageCache::new(&self.search_paths, ignore_private_reqs);
        let mut roots = Vec::with_capacity(modules.len());

        for module in modules {
            let request = dependency::parse_user_arg(module.as_ref())?;
            debug!("Resolving requested module '{request}'");
            let key = cache.load(&request.name)?;
            if let Some(pkg) = cache.get(&key) {
                if !request.matches(pkg.version()) {
                    return Err(Error::RequestedVersion {
                        spec: request.to_string(),
                        name: request.name.clone(),
                        version: pkg.version().to_string(),
                    });
                }
            }
            roots.push(key);
        }

        let flags = merge::merge(&cache, &roots, &spec);
        let files = cache.loaded_files();
        Ok(QueryResult { flags, files })
    }
}
