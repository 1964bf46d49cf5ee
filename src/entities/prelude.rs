pub use super::catalog_item::Entity as CatalogItem;
pub use super::resolution_cache::Entity as ResolutionCache;
pub use super::source::Entity as Source;
