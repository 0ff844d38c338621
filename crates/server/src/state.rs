use std::sync::Arc;

use sea_orm::DatabaseConnection;

use configs::MarketplaceConfig;
use service::auth::AuthConfig;
use service::messaging::MessageGateway;

/// Shared handler state. Cloned per request; everything inside is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub auth: AuthConfig,
    pub market: Arc<MarketplaceConfig>,
    pub gateway: Arc<dyn MessageGateway>,
}
