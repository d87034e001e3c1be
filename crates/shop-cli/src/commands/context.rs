use anyhow::{Context, Result};
use shop_core::config::ShopConfig;
use shop_core::user::SessionStore;
use shop_infrastructure::{ConfigService, FileTokenStore, ShopPaths};
use shop_interaction::{AuthenticatedRequestGateway, RefreshPolicy, ReqwestTransport, UserApi};
use std::path::Path;
use std::sync::Arc;

/// Everything a command needs, wired from config.
pub struct AppContext {
    pub config: ShopConfig,
    pub api: UserApi,
}

impl AppContext {
    pub async fn load(config_dir: Option<&Path>) -> Result<Self> {
        let paths = match config_dir {
            Some(dir) => ShopPaths::with_base(dir),
            None => ShopPaths::new(),
        };

        let config = ConfigService::new(&paths)?
            .get_config()
            .context("Failed to load configuration")?;

        let token_store = FileTokenStore::new(&paths, &config.session.storage_key)?;
        let session = SessionStore::restore(Arc::new(token_store))
            .await
            .context("Failed to restore session")?;

        let transport = ReqwestTransport::new(&config.api)?;
        tracing::debug!("[CLI] Using API at {}", transport.base_url());

        let gateway = AuthenticatedRequestGateway::new(
            Arc::new(transport),
            session,
            RefreshPolicy::from_config(&config),
        );

        Ok(Self {
            config,
            api: UserApi::new(gateway),
        })
    }
}
