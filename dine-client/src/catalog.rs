//! Catalog cache
//!
//! Menu items, inventory items and categories for one session. Fetched once,
//! kept until the session ends or [`CatalogCache::refresh`] is called.
//! Lookups return `Option`: an item deleted server-side after the cart or an
//! order referenced it shows up as [`UNKNOWN_ITEM_NAME`] downstream.

use crate::api::OrderApi;
use crate::http::HttpClient;
use crate::{DineError, DineResult};
use parking_lot::RwLock;
use shared::models::{
    CatalogItem, CatalogPayload, Category, InventoryItem, ItemRef, MenuItem,
};
use std::collections::HashMap;
use std::sync::Arc;

/// Display name for a reference the catalog no longer knows
pub const UNKNOWN_ITEM_NAME: &str = "Unknown Item";

/// Menu items of one category, in catalog order
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryGroup {
    /// `None` collects items without (or with a dangling) category
    pub category: Option<Category>,
    pub items: Vec<MenuItem>,
}

/// Immutable catalog snapshot
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    menu_items: Vec<MenuItem>,
    inventory_items: Vec<InventoryItem>,
    categories: Vec<Category>,
    menu_index: HashMap<i64, usize>,
    inventory_index: HashMap<i64, usize>,
    menu_by_category: Vec<CategoryGroup>,
}

impl Catalog {
    pub fn new(payload: CatalogPayload, mut categories: Vec<Category>) -> Self {
        categories.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then(a.id.cmp(&b.id)));

        let menu_index = payload
            .menu_items
            .iter()
            .enumerate()
            .map(|(i, m)| (m.id, i))
            .collect();
        let inventory_index = payload
            .inventory_items
            .iter()
            .enumerate()
            .map(|(i, item)| (item.id, i))
            .collect();
        let menu_by_category = group_by_category(&payload.menu_items, &categories);

        Self {
            menu_items: payload.menu_items,
            inventory_items: payload.inventory_items,
            categories,
            menu_index,
            inventory_index,
            menu_by_category,
        }
    }

    /// Catalog with nothing in it (the degraded state)
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.menu_items.is_empty() && self.inventory_items.is_empty()
    }

    pub fn menu_items(&self) -> &[MenuItem] {
        &self.menu_items
    }

    pub fn inventory_items(&self) -> &[InventoryItem] {
        &self.inventory_items
    }

    /// Categories ordered by `sort_order`
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Menu grouped by category, computed once at load
    pub fn menu_by_category(&self) -> &[CategoryGroup] {
        &self.menu_by_category
    }

    pub fn find_menu_item(&self, id: i64) -> Option<&MenuItem> {
        self.menu_index.get(&id).map(|&i| &self.menu_items[i])
    }

    pub fn find_inventory_item(&self, id: i64) -> Option<&InventoryItem> {
        self.inventory_index
            .get(&id)
            .map(|&i| &self.inventory_items[i])
    }

    /// Resolve a reference to an owned snapshot
    pub fn find(&self, item: ItemRef) -> Option<CatalogItem> {
        match item {
            ItemRef::Menu(id) => self.find_menu_item(id).cloned().map(CatalogItem::Menu),
            ItemRef::Inventory(id) => self
                .find_inventory_item(id)
                .cloned()
                .map(CatalogItem::Inventory),
        }
    }

    /// Current unit price (menu price or inventory unit cost)
    pub fn unit_price(&self, item: ItemRef) -> Option<f64> {
        match item {
            ItemRef::Menu(id) => self.find_menu_item(id).map(|m| m.price),
            ItemRef::Inventory(id) => self.find_inventory_item(id).map(|i| i.unit_cost),
        }
    }

    /// Display name, or [`UNKNOWN_ITEM_NAME`]
    pub fn display_name(&self, item: ItemRef) -> &str {
        let name = match item {
            ItemRef::Menu(id) => self.find_menu_item(id).map(|m| m.name.as_str()),
            ItemRef::Inventory(id) => self.find_inventory_item(id).map(|i| i.name.as_str()),
        };
        name.unwrap_or(UNKNOWN_ITEM_NAME)
    }
}

fn group_by_category(items: &[MenuItem], categories: &[Category]) -> Vec<CategoryGroup> {
    let mut groups: Vec<CategoryGroup> = categories
        .iter()
        .map(|c| CategoryGroup {
            category: Some(c.clone()),
            items: Vec::new(),
        })
        .collect();
    let position: HashMap<i64, usize> = categories
        .iter()
        .enumerate()
        .map(|(i, c)| (c.id, i))
        .collect();
    let mut uncategorized = Vec::new();

    for item in items {
        match item.category_id.and_then(|id| position.get(&id)) {
            Some(&i) => groups[i].items.push(item.clone()),
            None => uncategorized.push(item.clone()),
        }
    }

    groups.retain(|g| !g.items.is_empty());
    if !uncategorized.is_empty() {
        groups.push(CategoryGroup {
            category: None,
            items: uncategorized,
        });
    }
    groups
}

/// Session-scoped catalog slot
#[derive(Debug, Default)]
pub struct CatalogCache {
    slot: RwLock<Option<Arc<Catalog>>>,
    // Serializes fetches so concurrent loaders share one round trip
    fetch_lock: tokio::sync::Mutex<()>,
}

impl CatalogCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached snapshot, if loaded
    pub fn cached(&self) -> Option<Arc<Catalog>> {
        self.slot.read().clone()
    }

    /// Cached snapshot or an empty catalog
    pub fn current(&self) -> Arc<Catalog> {
        self.cached().unwrap_or_else(|| Arc::new(Catalog::empty()))
    }

    /// Load once per session; cache hit issues no request
    pub async fn load<C: HttpClient>(&self, api: &OrderApi<C>) -> DineResult<Arc<Catalog>> {
        if let Some(catalog) = self.cached() {
            tracing::debug!("Catalog cache hit");
            return Ok(catalog);
        }
        let _guard = self.fetch_lock.lock().await;
        if let Some(catalog) = self.cached() {
            return Ok(catalog);
        }
        self.fetch(api).await
    }

    /// Forced refetch, replacing the cached snapshot on success
    pub async fn refresh<C: HttpClient>(&self, api: &OrderApi<C>) -> DineResult<Arc<Catalog>> {
        let _guard = self.fetch_lock.lock().await;
        self.fetch(api).await
    }

    /// [`Self::load`], degrading to an empty catalog on failure
    ///
    /// The failure is not cached; the next load tries again.
    pub async fn load_or_empty<C: HttpClient>(
        &self,
        api: &OrderApi<C>,
    ) -> (Arc<Catalog>, Option<DineError>) {
        match self.load(api).await {
            Ok(catalog) => (catalog, None),
            Err(e) => (Arc::new(Catalog::empty()), Some(e)),
        }
    }

    /// Drop the cached snapshot
    pub fn invalidate(&self) {
        *self.slot.write() = None;
    }

    async fn fetch<C: HttpClient>(&self, api: &OrderApi<C>) -> DineResult<Arc<Catalog>> {
        let (payload, categories) = tokio::try_join!(api.fetch_catalog(), api.fetch_categories())
            .map_err(|e| {
                tracing::warn!(error = %e, "Catalog fetch failed");
                DineError::CatalogUnavailable(e)
            })?;

        let catalog = Arc::new(Catalog::new(payload, categories));
        tracing::info!(
            menu_items = catalog.menu_items().len(),
            inventory_items = catalog.inventory_items().len(),
            categories = catalog.categories().len(),
            "Catalog loaded"
        );
        *self.slot.write() = Some(catalog.clone());
        Ok(catalog)
    }
}
