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

//! HTTP client for the Eywa admin API.
//!
//! Every admin operation funnels through one call path:
//! [`AdminClient::execute`] consumes an immutable [`RequestDescriptor`] built
//! against a logged-in [`Session`] and classifies the result into an
//! [`Outcome`]. The live endpoints (attach, tail) are WebSocket upgrades
//! and go through [`AdminClient::stream`] instead. The client never
//! retries and never terminates the process; exit policy belongs to the
//! embedding CLI.
//!
//! Layout: `client.rs` (session lifecycle and the execute path),
//! `request.rs` (request descriptors), `outcome.rs` (response
//! classification), `ops.rs` (request builders for the admin endpoints),
//! `settings.rs` (dotted-key flattening), `profile.rs` (local connection
//! profiles).

pub mod client;
pub mod error;
pub mod ops;
pub mod outcome;
pub mod profile;
pub mod request;
pub mod settings;

pub use client::{AdminClient, AdminSocket, ConnectOptions, HEADER_AUTH, Scheme, Session};
pub use error::{AuthError, ProfileError, SettingsError, TransportError, TransportErrorKind};
pub use outcome::{Failure, Outcome, Payload};
pub use profile::Profile;
pub use request::{Body, RequestDescriptor};
pub use settings::flatten_settings;
