#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::redundant_pub_crate)]

//! Administrative CLI for interacting with an Eywa server instance.
//!
//! Layout:
//! - `cli.rs`: argument parsing, connection resolution, command dispatch
//! - `commands/`: command handlers grouped by concern
//! - `context.rs`: shared execution context and CLI error types
//! - `resolver.rs`: interactive/strict resolution of missing parameters
//! - `output.rs`: renderers and formatting helpers
//! - `main.rs`: thin entrypoint delegating to `run()`

pub(crate) mod cli;
pub(crate) mod commands;
pub(crate) mod context;
pub(crate) mod output;
pub(crate) mod resolver;

pub use cli::run;
