use std::sync::Arc;

use crate::{
    auth::repo::{PgUserStore, UserStore},
    config::AppConfig,
    db,
    products::{pg::PgProductStore, store::ProductStore},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub products: Arc<dyn ProductStore>,
    pub users: Arc<dyn UserStore>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let pool = db::connect(&config.database_url).await?;
        db::migrate(&pool).await;

        let products = Arc::new(PgProductStore::new(pool.clone())) as Arc<dyn ProductStore>;
        let users = Arc::new(PgUserStore::new(pool)) as Arc<dyn UserStore>;

        Ok(Self::from_parts(config, products, users))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        products: Arc<dyn ProductStore>,
        users: Arc<dyn UserStore>,
    ) -> Self {
        Self {
            config,
            products,
            users,
        }
    }
}
