pub mod client;
pub mod commands;
pub mod console;
pub mod render;
pub mod rows;
pub mod store;
pub mod types;

pub use client::{AdminService, HttpAdminClient};
pub use console::{AdminConsole, ConsoleError, TagKey};
pub use store::{CategoryTagStore, Snapshot, StoreHandle, StoreMutation};
pub use types::{Category, CategoryId, EntityId, Tag, TagId};
