pub mod client;
pub mod render;
pub mod types;

pub use client::{CatalogClient, Page};
pub use types::{NewProduct, Price, Product, ProductId, ProductPatch};
