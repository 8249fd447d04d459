pub mod analysis;
pub mod customer;
pub mod order;
pub mod report;
pub mod sync;
pub mod user;

use chrono::NaiveDate;

pub(crate) fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Millisecond-timestamp ids, bumped until unused.
pub(crate) fn fresh_id(taken: impl Fn(&str) -> bool) -> String {
    let mut stamp = chrono::Utc::now().timestamp_millis();
    while taken(&stamp.to_string()) {
        stamp += 1;
    }
    stamp.to_string()
}
