//! Inventory items: models, coin weight tables, storage and filtering.

pub mod coins;
pub mod file_store;
pub mod filter;
pub mod model;
pub mod store;

pub use file_store::FileItemStore;
pub use filter::ItemFilter;
pub use model::{InventoryItem, ItemCategory, ItemDraft, Metal};
pub use store::{ItemScope, ItemStore};
