//! Flag merging across the dependency graph.
//!
//! A query is described declaratively: which flag sequence to read from
//! each package, whether the dependency walk follows private edges, and
//! two selection passes, each with a class mask and an optional
//! path-order sort.
//!
//! Merging first expands the requested packages into an ordered list —
//! roots in reverse request order, each walked post-order so that a
//! package appears after everything it depends on has been prepended —
//! then runs each pass over that list: select flags by class, sort by the
//! owning package's search-path position when asked to (stably, with flag
//! arity as the tiebreaker), drop consecutive duplicates, and flatten the
//! surviving flags into tokens.

use std::collections::HashSet;

use crate::cache::PackageCache;
use crate::fragment::{Flag, FlagMask};

/// Which flag sequence of each package a query reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagSource {
    Cflags,
    Libs,
    PrivateLibs,
}

/// One selection pass over the expanded package list.
#[derive(Debug, Clone, Copy)]
pub struct QueryPass {
    pub mask: FlagMask,
    pub in_path_order: bool,
}

/// The full configuration of a merge query.
#[derive(Debug, Clone, Copy)]
pub struct QuerySpec {
    pub source: FlagSource,
    pub include_private: bool,
    pub passes: [QueryPass; 2],
}

impl QuerySpec {
    /// Compile flags: other flags first in declaration order, then
    /// include flags in search-path order. Private requires contribute
    /// their headers, so the walk follows private edges.
    pub fn cflags() -> Self {
        Self {
            source: FlagSource::Cflags,
            include_private: true,
            passes: [
                QueryPass {
                    mask: FlagMask::CFLAGS_OTHER,
                    in_path_order: false,
                },
                QueryPass {
                    mask: FlagMask::CFLAGS_I,
                    in_path_order: true,
                },
            ],
        }
    }

    /// Dynamic link flags: `-L` first in search-path order, then the
    /// rest. Only public requires take part.
    pub fn libs() -> Self {
        Self {
            source: FlagSource::Libs,
            include_private: false,
            passes: [
                QueryPass {
                    mask: FlagMask::LIBS_L,
                    in_path_order: true,
                },
                QueryPass {
                    mask: FlagMask::LIBS_OTHER.union(FlagMask::LIBS_SMALL_L),
                    in_path_order: false,
                },
            ],
        }
    }

    /// Static link flags: like [`libs`](Self::libs) but reading the
    /// private flag sequence and following private edges.
    pub fn static_libs() -> Self {
        Self {
            source: FlagSource::PrivateLibs,
            include_private: true,
            ..Self::libs()
        }
    }
}

/// Merge flags for `roots` (in request order) under `spec`, returning the
/// flattened token sequence.
pub fn merge(cache: &PackageCache<'_>, roots: &[String], spec: &QuerySpec) -> Vec<String> {
    let mut visited = HashSet::new();
    let mut expanded = Vec::new();
    for root in roots.iter().rev() {
        fill_expanded(cache, root, spec.include_private, &mut visited, &mut expanded);
    }

    let mut out = Vec::new();
    for pass in &spec.passes {
        let mut selected: Vec<(usize, &Flag)> = Vec::new();
        for key in &expanded {
            let Some(pkg) = cache.get(key) else {
                continue;
            };
            let flags = match spec.source {
                FlagSource::Cflags => &pkg.cflags,
                FlagSource::Libs => &pkg.libs,
                FlagSource::PrivateLibs => &pkg.libs_private,
            };
            for flag in flags {
                if pass.mask.contains(flag.class()) {
                    selected.push((pkg.path_position, flag));
                }
            }
        }

        if pass.in_path_order {
            selected.sort_by_key(|(position, flag)| (*position, flag.args().len()));
        }

        let mut previous: Option<&Flag> = None;
        for (_, flag) in selected {
            if previous == Some(flag) {
                continue;
            }
            out.extend(flag.args().iter().cloned());
            previous = Some(flag);
        }
    }

    out
}

/// Post-order expansion of the dependency graph below `key`.
///
/// Dependencies are visited in reverse declaration order and the package
/// itself is prepended afterwards, so the finished list reads "dependents
/// before dependencies" per root while earlier roots stay in front.
/// Already-visited packages are skipped, which also terminates cycles.
pub(crate) fn fill_expanded(
    cache: &PackageCache<'_>,
    key: &str,
    include_private: bool,
    visited: &mut HashSet<String>,
    expanded: &mut Vec<String>,
) {
    if visited.contains(key) {
        return;
    }
    visited.insert(key.to_string());

    let Some(pkg) = cache.get(key) else {
        return;
    };
    let deps = if include_private {
        &pkg.requires_private
    } else {
        &pkg.requires
    };
    for dep in deps.iter().rev() {
        fill_expanded(cache, dep, include_private, visited, expanded);
    }
    expanded.insert(0, key.to_string());
}
