use moka::future::Cache;
use once_cell::sync::Lazy;
use sqlx::PgPool;
use std::time::Duration;
use tracing::info;

use crate::store::{StoreResult, users};

/// Emails known to be taken. Absence says nothing.
static TAKEN_EMAILS: Lazy<Cache<String, ()>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(500_000)
        .time_to_live(Duration::from_secs(86400)) // 24h TTL
        .build()
});

pub async fn mark_taken(email: &str) {
    TAKEN_EMAILS.insert(email.trim().to_lowercase(), ()).await;
}

pub async fn is_taken(email: &str) -> bool {
    TAKEN_EMAILS.contains_key(&email.trim().to_lowercase())
}

async fn batch_mark(emails: Vec<String>) {
    let inserts: Vec<_> = emails
        .into_iter()
        .map(|e| TAKEN_EMAILS.insert(e.trim().to_lowercase(), ()))
        .collect();

    futures::future::join_all(inserts).await;
}

/// Caches emails of users who logged in during the last `days` days.
pub async fn warmup_email_cache(pool: &PgPool, days: i32, batch_size: usize) -> StoreResult<()> {
    let total = users::for_each_email_batch(pool, Some(days), batch_size, batch_mark).await?;

    info!(total, days, "Email cache warmup complete");
    Ok(())
}
