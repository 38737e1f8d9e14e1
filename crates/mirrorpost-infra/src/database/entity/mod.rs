//! SeaORM entities - one table per cached collection.
//!
//! Chain integers are `u64`; PostgreSQL has no unsigned bigint, so they are
//! stored as `i64` and saturate at `i64::MAX`.

pub mod comment;
pub mod notification;
pub mod post;
pub mod sub_community;
pub mod user;

pub(crate) fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

pub(crate) fn to_u64(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}
