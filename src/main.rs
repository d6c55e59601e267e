use std::sync::Arc;

use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use anyhow::Context;
use tracing::{error, info};
use tracing_appender::rolling;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

use hradmin::clock::{Clock, SystemClock};
use hradmin::config::Config;
use hradmin::db::init_db;
use hradmin::docs::ApiDoc;
use hradmin::routes;
use hradmin::service::attendance::AttendanceLedger;
use hradmin::service::payroll_period::PayrollPeriodRegistry;
use hradmin::store::postgres::{PgAttendanceStore, PgPayrollPeriodStore};
use hradmin::utils::{email_cache, email_filter};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str())),
        )
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .init();

    info!(
        env = %config.app_env,
        timezone = %config.business_timezone,
        "Server starting..."
    );

    let pool = init_db(
        &config.database_url,
        config.db_max_connections,
        config.store_timeout,
    )
    .await?;

    let pool_for_filter_warmup = pool.clone();
    let pool_for_cache_warmup = pool.clone();

    actix_web::rt::spawn(async move {
        if let Err(e) = email_filter::warmup_email_filter(&pool_for_filter_warmup, 100).await {
            error!(error = %e, "Failed to warmup email filter");
        }
    });

    actix_web::rt::spawn(async move {
        // Warm up last 30 days of recent users in batches of 250
        if let Err(e) = email_cache::warmup_email_cache(&pool_for_cache_warmup, 30, 250).await {
            error!(error = %e, "Failed to warmup email cache");
        }
    });

    let ledger = Data::new(AttendanceLedger::new(
        Arc::new(PgAttendanceStore::new(pool.clone())),
        config.store_timeout,
    ));
    let registry = Data::new(PayrollPeriodRegistry::new(
        Arc::new(PgPayrollPeriodStore::new(pool.clone())),
        config.store_timeout,
    ));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new(config.business_timezone));
    let clock: Data<dyn Clock> = Data::from(clock);

    let server_addr = config.server_addr.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(Data::new(pool.clone()))
            .app_data(Data::new(config.clone()))
            .app_data(ledger.clone())
            .app_data(registry.clone())
            .app_data(clock.clone())
            .configure(|cfg| routes::configure(cfg, &config))
    })
    .bind(&server_addr)
    .with_context(|| format!("Failed to bind {server_addr}"))?
    .run()
    .await
    .context("Server terminated with an error")
}
