use std::env;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use dotenvy::dotenv;
use sqlx::PgPool;
use tracing::{info, warn};

use hradmin::auth::password::hash_password;
use hradmin::db::init_db;
use hradmin::model::role::Role;
use hradmin::model::user::NewUser;
use hradmin::store::users;

const ADMIN_EMAIL: &str = "admin@example.com";

#[actix_web::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt().with_target(false).init();

    let database_url = env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
    let employees: u32 = match env::var("SEED_EMPLOYEES") {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("SEED_EMPLOYEES is not a number: {raw}"))?,
        Err(_) => 100,
    };
    let password = env::var("SEED_PASSWORD").unwrap_or_else(|_| "Password123!".to_string());

    let pool = init_db(&database_url, 2, Duration::from_secs(10)).await?;

    let admin_id = seed_admin(&pool, &password).await?;
    info!(admin_id, "Admin user ready");

    let mut created = 0;
    for i in 1..=employees {
        let new = NewUser {
            role: Role::Employee,
            name: format!("Employee {i}"),
            email: format!("employee{i}@example.com"),
            password_hash: hash(&password)?,
            salary: 5_000_000 + i64::from(i) * 10_000,
            actor: Some(admin_id),
        };

        match users::insert_user(&pool, &new).await {
            Ok(_) => created += 1,
            Err(e) if e.is_duplicate_email() => warn!(email = %new.email, "Already seeded, skipping"),
            Err(e) => return Err(e).with_context(|| format!("Failed to insert {}", new.email)),
        }
    }

    info!(created, requested = employees, "Completed seeding employees");
    Ok(())
}

/// Creates the admin, or returns the id of the one seeded earlier.
async fn seed_admin(pool: &PgPool, password: &str) -> Result<i64> {
    let admin = NewUser {
        role: Role::Admin,
        name: "Admin".to_string(),
        email: ADMIN_EMAIL.to_string(),
        password_hash: hash(password)?,
        salary: 0,
        actor: None,
    };

    match users::insert_user(pool, &admin).await {
        Ok(user) => Ok(user.id),
        Err(e) if e.is_duplicate_email() => users::find_credentials(pool, ADMIN_EMAIL)
            .await?
            .map(|creds| creds.id)
            .ok_or_else(|| anyhow!("admin email is taken but the row is missing")),
        Err(e) => Err(e).context("Failed to insert admin"),
    }
}

fn hash(password: &str) -> Result<String> {
    hash_password(password).map_err(|e| anyhow!("Failed to hash password: {e}"))
}
