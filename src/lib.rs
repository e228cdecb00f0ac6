//! `pcquery` — compute compiler and linker flags from `.pc` metadata.
//!
//! This crate reproduces the essential behavior of the classic
//! `pkg-config` tool for three queries — compile flags, dynamic link
//! flags, and static link flags — across one or more named modules,
//! honoring transitive requirements, version constraints, and conflict
//! declarations.
//!
//! # Architecture
//!
//! The library is organized into the following modules, leaves first:
//!
//! - [`error`] — Error types and the crate-wide result alias
//! - [`cursor`] — Mutable character buffer with C-string cursor semantics
//! - [`reader`] — Text loading and logical-line assembly
//! - [`argsplit`] — Shell-style tokenizing and unquoting of flag fields
//! - [`version`] — RPM-style version comparison and operators
//! - [`dependency`] — Version predicates and module-list parsing
//! - [`fragment`] — Typed flags and class masks
//! - [`parser`] — `.pc` file parsing into packages
//! - [`pkg`] — The package entity and its verification
//! - [`cache`] — Lazy per-query package resolution and caching
//! - [`merge`] — Dependency expansion and flag merging
//! - [`client`] — The query facade
//!
//! # Example
//!
//! ```no_run
//! use pcquery::{Client, Config};
//!
//! let client = Client::new(Config {
//!     search_paths: vec!["/usr/lib/pkgconfig".into()],
//! });
//!
//! let cflags = client.cflags(&["zlib"])?;
//! let libs = client.libs(&["zlib"])?;
//! println!("{} {}", cflags.flags.join(" "), libs.flags.join(" "));
//! # Ok::<(), pcquery::Error>(())
//! ```

pub mod argsplit;
pub mod cache;
pub mod client;
pub mod cursor;
pub mod dependency;
pub mod error;
pub mod fragment;
pub mod merge;
pub mod parser;
pub mod pkg;
pub mod reader;
pub mod version;

pub use cache::PKG_CONFIG_VERSION;
pub use client::{Client, Config, QueryResult};
pub use error::{Error, Result};
