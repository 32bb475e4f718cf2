use chrono::{DateTime, Utc};
use diesel::sqlite::Sqlite;
use diesel::{Insertable, Queryable, Selectable};

use crate::database::schema;
use crate::Fingerprint;

/// One cached image, as stored in the `images` table.
///
/// Records are created exactly once, when previously unseen content is
/// written to disk, and are never updated or deleted.
#[derive(Queryable, Selectable)]
#[diesel(table_name = schema::images)]
#[diesel(check_for_backend(Sqlite))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheRecord {
    pub id: i32,
    pub location_path: String,
    pub file_size: i64,
    pub hash_value: String,
    pub date_time: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = schema::images)]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewCacheRecord {
    pub location_path: String,
    pub file_size: i64,
    pub hash_value: String,
    pub date_time: DateTime<Utc>,
}

impl NewCacheRecord {
    /// New record for `fingerprint` stored at `location_path`.
    ///
    /// `date_time` is set to current UTC.
    pub fn new(location_path: &str, file_size: i64, fingerprint: &Fingerprint) -> Self {
        Self {
            location_path: location_path.to_string(),
            file_size,
            hash_value: fingerprint.as_str().to_string(),
            date_time: Utc::now(),
        }
    }
}
