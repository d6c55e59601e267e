use autoscale_cuckoo_filter::CuckooFilter;
use once_cell::sync::Lazy;
use sqlx::PgPool;
use std::sync::RwLock;
use tracing::{info, warn};

use crate::store::{StoreResult, users};

/// Expected capacity and false-positive rate.
const FILTER_CAPACITY: usize = 100_000;
const FALSE_POSITIVE_RATE: f64 = 0.001;

static EMAIL_FILTER: Lazy<RwLock<CuckooFilter<String>>> =
    Lazy::new(|| RwLock::new(CuckooFilter::new(FILTER_CAPACITY, FALSE_POSITIVE_RATE)));

#[inline]
fn normalize(email: &str) -> String {
    email.trim().to_lowercase()
}

/// False means the email is certainly unused; true may be a false positive.
///
/// A poisoned lock answers true so callers fall through to the database.
pub fn might_exist(email: &str) -> bool {
    let email = normalize(email);
    match EMAIL_FILTER.read() {
        Ok(filter) => filter.contains(&email),
        Err(_) => {
            warn!("email filter lock poisoned");
            true
        }
    }
}

pub fn insert(email: &str) {
    insert_batch(&[email.to_string()]);
}

fn insert_batch(emails: &[String]) {
    match EMAIL_FILTER.write() {
        Ok(mut filter) => {
            for email in emails {
                filter.add(&normalize(email));
            }
        }
        Err(_) => warn!("email filter lock poisoned"),
    }
}

/// Loads every stored email into the filter.
pub async fn warmup_email_filter(pool: &PgPool, batch_size: usize) -> StoreResult<()> {
    let total = users::for_each_email_batch(pool, None, batch_size, |batch| async move {
        insert_batch(&batch)
    })
    .await?;
    info!(total, "Email filter warmup complete");
    Ok(())
}
