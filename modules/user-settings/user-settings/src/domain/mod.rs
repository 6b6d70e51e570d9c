pub mod error;
pub mod existence;
pub mod fields;
pub mod guard;
pub mod local_client;
pub mod provisioner;
pub mod repository;
pub mod service;
pub mod store;

/// Current time truncated to whole microseconds, the precision storage keeps.
#[must_use]
pub fn now_utc() -> time::OffsetDateTime {
    let now = time::OffsetDateTime::now_utc();
    now - time::Duration::nanoseconds(i64::from(now.nanosecond() % 1_000))
}

#[cfg(test)]
mod fakes;
