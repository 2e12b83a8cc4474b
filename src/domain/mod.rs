//! Core pad domain: identifier syntax, record types, domain errors.

pub mod entities;
pub mod error;
pub mod ident;
