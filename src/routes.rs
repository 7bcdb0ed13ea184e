use crate::{
    api::{attendance, portal},
    config::Config,
    error::PortalError,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;
use std::sync::Arc;

// Helper to build per-route limiter
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = 60_000 / requests_per_min as u64;
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms.max(1))
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        // period and burst are both non-zero above
        .unwrap_or_default();
    Governor::new(&cfg)
}

// Bad query strings and bodies answer with the same `{ "message" }` shape
fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| PortalError::InvalidRequest(err.to_string()).into())
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| PortalError::InvalidRequest(err.to_string()).into())
}

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    let lookup_limiter = Arc::new(build_limiter(config.rate_lookup_per_min));
    let punch_limiter = Arc::new(build_limiter(config.rate_punch_per_min));

    cfg.service(portal::index);

    cfg.service(
        web::scope(&config.api_prefix).service(
            web::scope("/attendance")
                .app_data(query_config())
                .app_data(json_config())
                // /attendance/today?email=
                .service(
                    web::resource("/today")
                        .wrap(lookup_limiter.clone())
                        .route(web::get().to(attendance::today)),
                )
                // /attendance/punch-in
                .service(
                    web::resource("/punch-in")
                        .wrap(punch_limiter.clone())
                        .route(web::post().to(attendance::punch_in)),
                )
                // /attendance/punch-out
                .service(
                    web::resource("/punch-out")
                        .wrap(punch_limiter.clone())
                        .route(web::post().to(attendance::punch_out)),
                ),
        ),
    );
}
