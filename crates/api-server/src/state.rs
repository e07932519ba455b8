//! Application state

use std::path::PathBuf;
use std::sync::Arc;

use socketioxide::SocketIo;
use tokio::sync::RwLock;

use sv_core::household::FileHouseholdStore;
use sv_core::inventory::{FileItemStore, ItemScope};
use sv_core::prices::{SpotPriceClient, SpotPrices};

use crate::auth::UserStore;
use crate::socket::room_for_scope;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    user_store: UserStore,
    household_store: FileHouseholdStore,
    item_store: FileItemStore,
    price_client: SpotPriceClient,
    prices: RwLock<SpotPrices>,
    socket_io: RwLock<Option<SocketIo>>,
}

impl AppState {
    /// Create a new AppState with the given data directory
    pub async fn new(data_dir: PathBuf) -> sv_core::Result<Self> {
        let user_store = UserStore::new(data_dir.join("users.json"))
            .await
            .map_err(|err| sv_core::Error::Storage(err.to_string()))?;
        let household_store = FileHouseholdStore::new(data_dir.join("households.json")).await?;
        let item_store = FileItemStore::new(data_dir.join("items.json")).await?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                user_store,
                household_store,
                item_store,
                price_client: SpotPriceClient::from_env(),
                prices: RwLock::new(SpotPrices::default()),
                socket_io: RwLock::new(None),
            }),
        })
    }

    pub fn user_store(&self) -> &UserStore {
        &self.inner.user_store
    }

    pub fn household_store(&self) -> &FileHouseholdStore {
        &self.inner.household_store
    }

    pub fn item_store(&self) -> &FileItemStore {
        &self.inner.item_store
    }

    /// Snapshot of the current price cache.
    pub async fn prices(&self) -> SpotPrices {
        self.inner.prices.read().await.clone()
    }

    /// Fetch fresh spot prices and fold them into the cache. Failed
    /// metals keep their previous price.
    pub async fn refresh_prices(&self) -> SpotPrices {
        let current = self.prices().await;
        let next = self.inner.price_client.refresh(&current).await;
        *self.inner.prices.write().await = next.clone();
        next
    }

    /// Set the Socket.IO instance once the socket server is up.
    pub async fn set_socket_io(&self, io: SocketIo) {
        *self.inner.socket_io.write().await = Some(io);
    }

    pub async fn get_socket_io(&self) -> Option<SocketIo> {
        self.inner.socket_io.read().await.clone()
    }

    /// Emit a change event to everyone watching a scope.
    pub async fn notify_scope(&self, scope: &ItemScope, event: &'static str) {
        if let Some(io) = self.get_socket_io().await {
            #[derive(serde::Serialize)]
            #[serde(rename_all = "camelCase")]
            struct ChangePayload {
                scope: String,
            }
            let _ = io.to(room_for_scope(scope)).emit(
                event,
                &ChangePayload {
                    scope: scope.key(),
                },
            );
        }
    }
}
