//! One module per operation. Each decodes its variables, calls the
//! [`Directory`](rolodex_core::directory::Directory) and wraps the result in
//! an [`Answer`](crate::response::Answer).

pub mod create;
pub mod delete;
pub mod people;
pub mod person;
pub mod update;
