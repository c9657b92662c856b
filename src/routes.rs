//! Front-end route table.

use crate::catalog::ProductId;

pub const HOME_PATH: &str = "/";
pub const PRODUCTS_PATH: &str = "/products";
pub const ADMIN_PRODUCTS_PATH: &str = "/admin/products";

#[derive(Debug, Clone, PartialEq)]
pub enum Route {
    /// `/` sends the visitor to the product list.
    Redirect { to: &'static str },
    ProductList,
    ProductDetail(ProductId),
    AdminProducts,
    NotFound(String),
}

impl Route {
    /// Match a path. Query strings and a single trailing slash are ignored.
    pub fn parse(path: &str) -> Route {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        if path == HOME_PATH || path.is_empty() {
            return Route::Redirect { to: PRODUCTS_PATH };
        }

        let trimmed = path.strip_suffix('/').unwrap_or(path);
        let segments: Vec<&str> = trimmed.trim_start_matches('/').split('/').collect();

        match segments.as_slice() {
            ["products"] => Route::ProductList,
            ["products", id] if !id.is_empty() => match id.parse::<ProductId>() {
                Ok(id) => Route::ProductDetail(id),
                Err(never) => match never {},
            },
            ["admin", "products"] => Route::AdminProducts,
            _ => Route::NotFound(path.to_string()),
        }
    }

    /// Follow redirects until a terminal route is reached.
    pub fn resolve(path: &str) -> Route {
        let mut route = Route::parse(path);
        // the table only ever redirects once
        for _ in 0..4 {
            match route {
                Route::Redirect { to } => route = Route::parse(to),
                other => return other,
            }
        }
        route
    }

    pub fn path(&self) -> String {
        match self {
            Route::Redirect { .. } => HOME_PATH.to_string(),
            Route::ProductList => PRODUCTS_PATH.to_string(),
            Route::ProductDetail(id) => format!("{}/{}", PRODUCTS_PATH, id),
            Route::AdminProducts => ADMIN_PRODUCTS_PATH.to_string(),
            Route::NotFound(path) => path.clone(),
        }
    }
}
