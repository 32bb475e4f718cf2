//! Convenient API to interact with the cache index.
//!
//! Basically just fancy wrappers around transactions on [`Connection`].
//!
//! Lookups match on the fingerprint through bound query parameters only;
//! digest values never end up interpolated into query text.

use diesel::{ExpressionMethods, OptionalExtension, QueryDsl, SelectableHelper};
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::trace;

use crate::database::models::{CacheRecord, NewCacheRecord};
use crate::Fingerprint;

use super::{Connection, DatabaseResult};

/// Add new record to the index.
///
/// The whole record becomes durably visible to subsequent lookups, or
/// none of it does. Inserting a fingerprint that is already recorded
/// fails with a unique violation
/// (see [`DatabaseError::is_unique_violation`](crate::errors::DatabaseError::is_unique_violation)).
pub async fn insert(
    connection: &mut Connection,
    new_record: NewCacheRecord,
) -> DatabaseResult<CacheRecord> {
    connection
        .immediate_transaction(|conn| {
            async {
                trace!("INSERT {:?}", new_record);
                let inserted = diesel::insert_into(crate::database::schema::images::table)
                    .values(&new_record)
                    .get_result::<CacheRecord>(conn)
                    .await?;
                Ok(inserted)
            }
            .scope_boxed()
        })
        .await
}

/// Get record from the index by content fingerprint.
///
/// Absence is a normal result, not an error.
pub async fn find_by_fingerprint(
    connection: &mut Connection,
    fingerprint: &Fingerprint,
) -> DatabaseResult<Option<CacheRecord>> {
    connection
        .transaction(|conn| {
            async {
                let filter =
                    crate::database::schema::images::dsl::hash_value.eq(fingerprint.as_str());
                trace!("SELECT hash_value={}", fingerprint);
                crate::database::schema::images::dsl::images
                    .filter(filter)
                    .select(CacheRecord::as_select())
                    .first(conn)
                    .await
                    .optional()
            }
            .scope_boxed()
        })
        .await
        .map_err(Into::into)
}

/// Get all records from the index.
pub async fn get_all(connection: &mut Connection) -> DatabaseResult<Vec<CacheRecord>> {
    connection
        .transaction(|conn| {
            async {
                trace!("SELECT *");
                crate::database::schema::images::dsl::images
                    .select(CacheRecord::as_select())
                    .get_results(conn)
                    .await
            }
            .scope_boxed()
        })
        .await
        .map_err(Into::into)
}
