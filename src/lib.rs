//! resrc: scheme-based resource resolution.
//!
//! An identifier string such as `https://host/config.json`,
//! `file:///etc/app/seed.bin`, `string://inline text` or
//! `bytes://aGVsbG8=` is resolved into a [`resource::Resource`] handle.
//! Handles are cheap: no I/O happens until `exists` or `open` is called.
//! Resolution strategy is an ordered chain of scheme resolvers, first
//! success wins; see [`resolver::MultiResolver`].

pub mod config;
pub mod http_client;
pub mod logging;
pub mod resolver;
pub mod resource;
