use fred::{clients::Pool as RedisPool, interfaces::KeysInterface};
use tracing::warn;

/// Marks the rendered home and stats views as stale, plus the event view
/// when the write was scoped to an event.
///
/// This is a best-effort side channel. A Redis hiccup must never fail the
/// write that triggered the invalidation, so errors are only logged.
pub async fn invalidate_views(redis: &RedisPool, event_id: Option<i32>) {
    let mut keys = vec!["views:home".to_owned(), "views:stats".to_owned()];
    if let Some(event_id) = event_id {
        keys.push(format!("views:event:{event_id}"));
    }

    let result: Result<u64, fred::error::Error> = redis.del(keys).await;
    if let Err(err) = result {
        warn!("Failed to invalidate cached views: {err:?}");
    }
}
