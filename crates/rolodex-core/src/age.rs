//! Age derivation. Age is never stored; it is computed on every read from the
//! birthday and an explicitly supplied "today".

use chrono::{Datelike, NaiveDate, Utc};

/// Ages outside this range are treated as corrupt input and dropped.
pub const MAX_AGE: i32 = 150;

/// Whole years elapsed between `birthday` and `today`.
///
/// A birthday whose month/day has not yet come round this year does not
/// count. Returns `None` when there is no birthday or the result falls
/// outside `0..=150`.
pub fn age_on(birthday: Option<NaiveDate>, today: NaiveDate) -> Option<u8> {
  let birthday = birthday?;
  let mut years = today.year() - birthday.year();
  if (today.month(), today.day()) < (birthday.month(), birthday.day()) {
    years -= 1;
  }
  if (0..=MAX_AGE).contains(&years) {
    u8::try_from(years).ok()
  } else {
    None
  }
}

/// Source of the current date for the engine.
pub trait Clock: Send + Sync {
  fn today(&self) -> NaiveDate;
}

/// The UTC calendar date of the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn today(&self) -> NaiveDate { Utc::now().date_naive() }
}

/// Always reports the same date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
  fn today(&self) -> NaiveDate { self.0 }
}
