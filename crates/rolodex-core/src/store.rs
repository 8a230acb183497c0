//! The `PersonStore` trait: the aggregate repository contract.
//!
//! Implemented by storage backends (e.g. `rolodex-store-sqlite`). The
//! [`Directory`](crate::directory::Directory) is the only caller; protocol
//! surfaces never reach a store directly.

use std::future::Future;

use uuid::Uuid;

use crate::{
  Error,
  person::{NewPerson, PageWindow, Person, PersonPage, PersonUpdate},
};

/// Abstraction over a person store backend.
///
/// Every mutating method is atomic with respect to both the person row and
/// its outgoing contact links: on error nothing is written.
///
/// Backend errors must convert into [`Error`] so the engine can classify them
/// (referential, conflict, ...) without knowing the backend.
pub trait PersonStore: Send + Sync {
  type Error: std::error::Error + Into<Error> + Send + Sync + 'static;

  /// Insert a person and its initial contact links, returning the stored
  /// aggregate.
  ///
  /// Fails if any contact id does not exist or if the email is taken; in
  /// both cases no row is written.
  fn create_person(
    &self,
    input: NewPerson,
  ) -> impl Future<Output = Result<Person, Self::Error>> + Send + '_;

  /// Retrieve a person with its resolved contacts. `None` if not found.
  fn get_person(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_;

  /// Apply a partial update. Returns `None` if the person does not exist;
  /// that check comes first, so an absent id is never reported as a
  /// self-contact.
  ///
  /// A contact set naming the person itself is rejected. When
  /// `update.contacts` is present the outgoing link set is replaced
  /// wholesale; replacing with the same set again is not an error.
  fn update_person(
    &self,
    id: Uuid,
    update: PersonUpdate,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_;

  /// Delete a person. Links where it is either endpoint go with it.
  /// Returns `false` if there was nothing to delete.
  fn delete_person(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// One page of persons ordered by email, with table-wide totals.
  fn list_people(
    &self,
    window: PageWindow,
  ) -> impl Future<Output = Result<PersonPage, Self::Error>> + Send + '_;
}
