//! Storefront Queries
//!
//! Pure filtering, searching and sorting over a product snapshot. The view
//! layer fetches the snapshot once (and again on feed events) and runs these
//! in memory; nothing here touches the store.

use crate::db::models::{Product, ProductStatus};

/// Which products to keep
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Exact brand name, case-insensitive
    pub brand: Option<String>,
    pub status: Option<ProductStatus>,
    pub featured_only: bool,
    /// Free-text search over name, brand, description and flavour names
    pub search: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProductSort {
    #[default]
    Name,
    Price,
    CreatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// A complete storefront query: filter, then sort
#[derive(Debug, Clone, Default)]
pub struct StorefrontQuery {
    pub filter: ProductFilter,
    pub sort: ProductSort,
    pub direction: SortDirection,
}

impl StorefrontQuery {
    /// Run the query against a snapshot
    pub fn apply(&self, products: &[Product]) -> Vec<Product> {
        let mut matched: Vec<Product> = products
            .iter()
            .filter(|p| self.filter.matches(p))
            .cloned()
            .collect();

        matched.sort_by(|a, b| {
            let ordering = match self.sort {
                ProductSort::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
                ProductSort::Price => a.price.cmp(&b.price),
                ProductSort::CreatedAt => a.created_at.cmp(&b.created_at),
            };
            match self.direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        });
        matched
    }
}

impl ProductFilter {
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(brand) = &self.brand
            && !product.brand.eq_ignore_ascii_case(brand)
        {
            return false;
        }
        if let Some(status) = self.status
            && product.status != status
        {
            return false;
        }
        if self.featured_only && !product.featured {
            return false;
        }
        if let Some(search) = &self.search {
            let needle = search.trim().to_lowercase();
            if !needle.is_empty() && !search_haystack(product).contains(&needle) {
                return false;
            }
        }
        true
    }
}

fn search_haystack(product: &Product) -> String {
    let mut haystack = String::with_capacity(
        product.name.len() + product.brand.len() + product.description.len() + 32,
    );
    haystack.push_str(&product.name.to_lowercase());
    haystack.push(' ');
    haystack.push_str(&product.brand.to_lowercase());
    haystack.push(' ');
    haystack.push_str(&product.description.to_lowercase());
    for entry in &product.flavour {
        haystack.push(' ');
        haystack.push_str(&entry.name().to_lowercase());
    }
    haystack
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::FlavourEntry;
    use rust_decimal::Decimal;

    fn product(name: &str, brand: &str, price: i64, featured: bool) -> Product {
        let mut p = Product::new(name.into());
        p.brand = brand.into();
        p.price = Decimal::new(price, 2);
        p.featured = featured;
        p
    }

    fn snapshot() -> Vec<Product> {
        let mut lava = product("Lava Flow", "Naked 100", 2499, true);
        lava.flavour = vec![FlavourEntry::Entry {
            name: "Coconut Pineapple".into(),
            flavor_id: "F1".into(),
        }];
        lava.created_at = 100;
        let mut pog = product("Hawaiian POG", "Naked 100", 1999, false);
        pog.created_at = 200;
        let mut raz = product("Blue Raz Ice", "Coastal Clouds", 1599, false);
        raz.status = ProductStatus::OutOfStock;
        raz.created_at = 300;
        vec![lava, pog, raz]
    }

    #[test]
    fn brand_filter_is_case_insensitive() {
        let query = StorefrontQuery {
            filter: ProductFilter {
                brand: Some("naked 100".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        let result = query.apply(&snapshot());
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn search_covers_flavour_names() {
        let query = StorefrontQuery {
            filter: ProductFilter {
                search: Some("coconut".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        let result = query.apply(&snapshot());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, "Lava Flow");
    }

    #[test]
    fn status_and_featured_filters_compose() {
        let query = StorefrontQuery {
            filter: ProductFilter {
                status: Some(ProductStatus::OutOfStock),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(query.apply(&snapshot()).len(), 1);

        let query = StorefrontQuery {
            filter: ProductFilter {
                featured_only: true,
                ..Default::default()
            },
            ..Default::default()
        };
        let featured = query.apply(&snapshot());
        assert_eq!(featured.len(), 1);
        assert_eq!(featured[0].name, "Lava Flow");
    }

    #[test]
    fn price_sort_descending() {
        let query = StorefrontQuery {
            sort: ProductSort::Price,
            direction: SortDirection::Descending,
            ..Default::default()
        };
        let result = query.apply(&snapshot());
        let prices: Vec<Decimal> = result.iter().map(|p| p.price).collect();
        assert_eq!(
            prices,
            vec![
                Decimal::new(2499, 2),
                Decimal::new(1999, 2),
                Decimal::new(1599, 2)
            ]
        );
    }

    #[test]
    fn created_at_sort_ascending_is_stable_input_order() {
        let query = StorefrontQuery {
            sort: ProductSort::CreatedAt,
            ..Default::default()
        };
        let result = query.apply(&snapshot());
        let names: Vec<&str> = result.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Lava Flow", "Hawaiian POG", "Blue Raz Ice"]);
    }
}
