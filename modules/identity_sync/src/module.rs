use std::sync::Arc;

use anyhow::Context;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{debug, info};

use crate::api::rest::routes;
use crate::config::IdentitySyncConfig;
use crate::contract::client::IdentitySyncApi;
use crate::domain::repo::UsersRepository;
use crate::domain::service::{Service, ServiceConfig};
use crate::domain::signature::WebhookVerifier;
use crate::gateways::local::IdentitySyncLocalClient;
use crate::infra::storage::migrations::Migrator;
use crate::infra::storage::sea_orm_repo::SeaOrmUsersRepository;

/// Identity sync module: owns the domain service and exposes it over REST and
/// as an in-process client.
#[derive(Default)]
pub struct IdentitySync {
    // Keep the domain service behind ArcSwap for cheap read-mostly access.
    service: arc_swap::ArcSwapOption<Service>,
    webhook_path: arc_swap::ArcSwapOption<String>,
}

impl IdentitySync {
    pub const MODULE_NAME: &'static str = "identity_sync";

    /// Validate the config and wire the service over a SeaORM connection.
    pub fn init(&self, cfg: &IdentitySyncConfig, db: DatabaseConnection) -> anyhow::Result<()> {
        self.init_with_repo(cfg, Arc::new(SeaOrmUsersRepository::new(db)))
    }

    /// Same as [`IdentitySync::init`] with an arbitrary store.
    pub fn init_with_repo(
        &self,
        cfg: &IdentitySyncConfig,
        repo: Arc<dyn UsersRepository>,
    ) -> anyhow::Result<()> {
        info!("Initializing identity_sync module");
        debug!(config = ?cfg, "Loaded identity_sync config");

        let secret = cfg
            .validate()
            .context("invalid identity_sync configuration")?;
        let verifier = WebhookVerifier::new(&secret, chrono::Duration::seconds(cfg.tolerance_sec))?;

        let service = Service::new(
            repo,
            Arc::new(verifier),
            ServiceConfig {
                default_credits: cfg.default_credits,
            },
        );

        self.service.store(Some(Arc::new(service)));
        self.webhook_path.store(Some(Arc::new(cfg.webhook_path.clone())));
        Ok(())
    }

    pub async fn migrate(&self, db: &DatabaseConnection) -> anyhow::Result<()> {
        info!("Running identity_sync database migrations");
        Migrator::up(db, None)
            .await
            .context("identity_sync migrations failed")?;
        info!("Identity sync database migrations completed successfully");
        Ok(())
    }

    pub fn register_rest(&self, router: axum::Router) -> anyhow::Result<axum::Router> {
        let service = self.loaded_service()?;
        let path = self
            .webhook_path
            .load_full()
            .ok_or_else(|| anyhow::anyhow!("Webhook path not configured"))?;

        info!(path = %path, "Registering identity_sync REST routes");
        Ok(routes::register_routes(router, service, &path))
    }

    /// In-process client over the same service the webhook uses.
    pub fn client(&self) -> anyhow::Result<Arc<dyn IdentitySyncApi>> {
        Ok(Arc::new(IdentitySyncLocalClient::new(self.loaded_service()?)))
    }

    fn loaded_service(&self) -> anyhow::Result<Arc<Service>> {
        self.service
            .load_full()
            .ok_or_else(|| anyhow::anyhow!("Service not initialized"))
    }
}
