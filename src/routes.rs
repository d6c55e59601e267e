use crate::{
    api::{attendance, health, payroll_period},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
    error::json_error,
};
use actix_governor::{
    Governor, GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;
use tracing::warn;

/// Per-route limiter allowing `requests_per_min` with the same burst.
fn build_limiter(requests_per_min: u32) -> Arc<Governor<PeerIpKeyExtractor, NoOpMiddleware>> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / u64::from(requests_per_min)).max(1);

    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .unwrap_or_else(|| {
            warn!(requests_per_min, "Invalid rate limit, falling back to default limiter");
            GovernorConfig::default()
        });

    Arc::new(Governor::new(&cfg))
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    let login_limiter = build_limiter(config.rate_login_per_min);
    let register_limiter = build_limiter(config.rate_register_per_min);
    let refresh_limiter = build_limiter(config.rate_refresh_per_min);
    let protected_limiter = build_limiter(config.rate_protected_per_min);

    cfg.app_data(web::JsonConfig::default().error_handler(json_error));

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(refresh_limiter)
                    .route(web::post().to(handlers::refresh_token)),
            )
            .service(
                web::resource("/logout")
                    .wrap(login_limiter)
                    .route(web::post().to(handlers::logout)),
            ),
    );

    cfg.service(
        web::scope(&config.api_prefix)
            .service(web::resource("/health").route(web::get().to(health::health)))
            // Protected routes
            .service(
                web::scope("")
                    .wrap(from_fn(auth_middleware))
                    .wrap(protected_limiter)
                    .service(
                        web::resource("/users")
                            .wrap(register_limiter)
                            .route(web::post().to(handlers::register)),
                    )
                    .service(
                        web::scope("/attendance")
                            // /attendance/check-in
                            .service(
                                web::resource("/check-in")
                                    .route(web::post().to(attendance::check_in)),
                            )
                            // /attendance/check-out
                            .service(
                                web::resource("/check-out")
                                    .route(web::post().to(attendance::check_out)),
                            ),
                    )
                    .service(
                        web::resource("/payroll-periods")
                            .route(web::post().to(payroll_period::create_payroll_period))
                            .route(web::get().to(payroll_period::list_payroll_periods)),
                    ),
            ),
    );
}
