//! Textpad: a small networked text-note service.
//!
//! Every pad is addressable by id and editable in the browser. Reads and
//! writes are served out of an in-memory cache; a write-behind flush loop
//! persists dirty pads to SQLite and a refresh loop periodically reloads
//! the cache wholesale from the durable store and the on-disk settings and
//! main text files. Share links expose a pad read-only under a stable
//! token; burn links are destroyed after a single read.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;
