//! Ready-made search predicates.
//!
//! Each function has the [`SearchPredicate`](crate::SearchPredicate) shape
//! and can be passed by reference to `search_products`.

use inventory_core::Product;

/// Name contains the query (case-sensitive substring).
pub fn name_contains(query: &str, product: &Product) -> bool {
    product.name.contains(query)
}

/// Category equals the query, ignoring ASCII case.
pub fn category_equals(query: &str, product: &Product) -> bool {
    product.category.eq_ignore_ascii_case(query)
}

/// Any text field, or the rendered size, contains the query, ignoring case.
pub fn matches_any_field(query: &str, product: &Product) -> bool {
    let needle = query.to_lowercase();
    [
        product.id(),
        product.name.as_str(),
        product.color.as_str(),
        product.category.as_str(),
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(&needle))
        || product.size.to_string().to_lowercase().contains(&needle)
}
