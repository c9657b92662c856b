use std::fmt::Write;

use super::types::Product;

/// One line per product, in server order.
pub fn render_list(products: &[Product]) -> String {
    if products.is_empty() {
        return "No products.".to_string();
    }

    let mut out = String::new();
    for product in products {
        let _ = write!(out, "[{}] {}", product.id, product.name);
        if !product.is_active {
            out.push_str(" (inactive)");
        }
        out.push('\n');
    }
    out.pop();
    out
}

pub fn render_detail(product: &Product) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} [{}]", product.name, product.id);

    if let Some(description) = product.description.as_deref().filter(|d| !d.is_empty()) {
        let _ = writeln!(out, "{}", description);
    }

    match &product.discount_price {
        Some(discount) => {
            let _ = writeln!(out, "Price: {} (was {})", discount, product.price);
        }
        None => {
            let _ = writeln!(out, "Price: {}", product.price);
        }
    }

    if let Some(size) = &product.size {
        let _ = writeln!(out, "Size: {}", size);
    }
    let _ = writeln!(out, "Stock: {}", product.stock);

    if let Some(category) = &product.category {
        let _ = writeln!(out, "Category: {}", category.name);
    }
    if !product.tags.is_empty() {
        let names: Vec<&str> = product.tags.iter().map(|t| t.name.as_str()).collect();
        let _ = writeln!(out, "Tags: {}", names.join(", "));
    }
    if let Some(url) = &product.main_image_url {
        let _ = writeln!(out, "Image: {}", url);
    }

    out.pop();
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(json: &str) -> Product {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_list() {
        let products = vec![
            product(r#"{"id": 1, "name": "Cap", "price": "9.99"}"#),
            product(r#"{"id": 2, "name": "Boot", "price": 40, "isActive": false}"#),
        ];
        assert_eq!(render_list(&products), "[1] Cap\n[2] Boot (inactive)");
        assert_eq!(render_list(&[]), "No products.");
    }

    #[test]
    fn test_detail_shows_discount_and_tags() {
        let p = product(
            r#"{"id": 3, "name": "Shoe", "description": "Light", "price": "89.90",
                "discountPrice": "79.90", "stock": 2,
                "category": {"id": 1, "name": "Shoes"},
                "tags": [{"id": 1, "name": "Running"}, {"id": 2, "name": "Trail"}]}"#,
        );
        assert_eq!(
            render_detail(&p),
            "Shoe [3]\nLight\nPrice: 79.90 (was 89.90)\nStock: 2\nCategory: Shoes\nTags: Running, Trail"
        );
    }
}
