use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use tracing::info;
use tracing_subscriber::EnvFilter;

use linkpulse::api;
use linkpulse::cache::CacheFactory;
use linkpulse::config::AppConfig;
use linkpulse::repository::{AliasStore, AnalyticsStore, RepositoryFactory, UserStore};
use linkpulse::services::geoip::GeoIpProvider;
use linkpulse::services::{AnalyticsService, LinkService, RedirectService, VisitRecorder};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::load().map_err(|e| std::io::Error::other(e.to_string()))?;

    let repository = RepositoryFactory::create(&config.database)
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    let cache = CacheFactory::create(&config.cache)
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    let geoip = Arc::new(GeoIpProvider::new(&config.geoip));
    info!("GeoIP provider: {}", geoip.provider_name());

    // 组件全部在这里显式构建并注入，没有进程级的隐式状态
    let alias_store: Arc<dyn AliasStore> = repository.clone();
    let analytics_store: Arc<dyn AnalyticsStore> = repository.clone();
    let user_store: Arc<dyn UserStore> = repository.clone();

    let link_service = Arc::new(LinkService::new(
        alias_store.clone(),
        user_store,
        &config.server.base_url,
    ));
    let recorder = Arc::new(VisitRecorder::new(analytics_store.clone(), geoip));
    let redirect_service = Arc::new(RedirectService::new(
        cache,
        alias_store.clone(),
        recorder,
        config.cache.default_ttl,
    ));
    let analytics_service = Arc::new(AnalyticsService::new(
        alias_store,
        analytics_store,
        &config.server.base_url,
    ));

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    info!("Starting server at http://{}", bind_address);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(link_service.clone()))
            .app_data(web::Data::new(redirect_service.clone()))
            .app_data(web::Data::new(analytics_service.clone()))
            .configure(api::configure)
    })
    .bind(bind_address)?
    .run()
    .await
}
