use crate::product::{PriceComparator, ProductMap, ProductRecord};
use rust_decimal::Decimal;

/// Find the stored title matching `query` case-insensitively.
pub fn resolve_title<'a>(products: &'a ProductMap, query: &str) -> Option<&'a str> {
    if let Some((title, _)) = products.get_key_value(query) {
        return Some(title.as_str());
    }

    let needle = query.to_lowercase();
    products
        .keys()
        .find(|title| title.to_lowercase() == needle)
        .map(String::as_str)
}

fn keep(record: &ProductRecord, only_in_stock: bool) -> bool {
    !only_in_stock || record.in_stock()
}

/// Products whose title equals (`exact_match`) or contains `query`, ignoring case.
///
/// An exact lookup yields at most one product, the one `resolve_title` picks.
pub fn filter_by_title(
    mut products: ProductMap,
    query: &str,
    exact_match: bool,
    only_in_stock: bool,
) -> ProductMap {
    if exact_match {
        let Some(title) = resolve_title(&products, query).map(str::to_string) else {
            return ProductMap::new();
        };
        return products
            .remove_entry(&title)
            .filter(|(_, record)| keep(record, only_in_stock))
            .into_iter()
            .collect();
    }

    let needle = query.to_lowercase();
    products
        .into_iter()
        .filter(|(title, record)| {
            title.to_lowercase().contains(&needle) && keep(record, only_in_stock)
        })
        .collect()
}

pub fn filter_by_price(
    products: ProductMap,
    query: Decimal,
    comparator: PriceComparator,
    only_in_stock: bool,
) -> ProductMap {
    products
        .into_iter()
        .filter(|(_, record)| {
            comparator.matches(record.price.amount(), query) && keep(record, only_in_stock)
        })
        .collect()
}
