//! Core types, the store trait and the shared engine for Rolodex.
//!
//! This crate is deliberately free of HTTP and database dependencies. Both
//! protocol surfaces go through [`directory::Directory`]; storage backends
//! implement [`store::PersonStore`].

pub mod age;
pub mod directory;
pub mod error;
pub mod etag;
pub mod person;
pub mod store;
pub mod view;

pub use error::{Error, ErrorKind, Result};
