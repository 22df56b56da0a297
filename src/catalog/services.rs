use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::dto::{MenuFilter, MenuItem};
use crate::api::{ApiError, StorefrontApi};

/// Liveness flag of the view that asked for data; results for a torn-down view are discarded.
#[derive(Debug, Clone)]
pub struct ViewGuard {
    alive: Arc<AtomicBool>,
}

impl ViewGuard {
    pub fn new() -> Self {
        Self {
            alive: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn teardown(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    pub fn is_active(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }
}

impl Default for ViewGuard {
    fn default() -> Self {
        Self::new()
    }
}

/// Fetches the public menu. `Ok(None)` means the view went away before the fetch resolved.
#[instrument(skip(api, guard))]
pub async fn load_menu(
    api: &dyn StorefrontApi,
    guard: &ViewGuard,
) -> Result<Option<Vec<MenuItem>>, ApiError> {
    let result = api.get_menu().await;
    if !guard.is_active() {
        debug!("menu fetch resolved after teardown; discarding");
        return Ok(None);
    }
    let items = result?;
    debug!(count = items.len(), "menu loaded");
    Ok(Some(items))
}

/// Decodes raw menu entries one by one, dropping entries that are not usable dishes.
pub fn normalize_menu(raw: Vec<Value>) -> Vec<MenuItem> {
    raw.into_iter()
        .filter_map(|value| match serde_json::from_value::<MenuItem>(value) {
            Ok(item) if item.name.trim().is_empty() => {
                warn!(id = %item.id, "menu item without a name dropped");
                None
            }
            Ok(item) if !item.price.is_finite() || item.price < 0.0 => {
                warn!(id = %item.id, price = item.price, "menu item with invalid price dropped");
                None
            }
            Ok(item) => Some(item),
            Err(e) => {
                warn!(error = %e, "malformed menu item dropped");
                None
            }
        })
        .collect()
}

/// Distinct categories in first-seen order.
pub fn categories(items: &[MenuItem]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    items
        .iter()
        .filter_map(|i| i.category.as_deref())
        .filter(|c| !c.trim().is_empty())
        .filter(|c| seen.insert(c.to_lowercase()))
        .map(str::to_string)
        .collect()
}

pub fn filter_menu<'a>(items: &'a [MenuItem], filter: &MenuFilter) -> Vec<&'a MenuItem> {
    let category = filter
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("all"));
    let query = filter
        .search
        .as_deref()
        .map(|q| q.trim().to_lowercase())
        .filter(|q| !q.is_empty());

    items
        .iter()
        .filter(|item| match category {
            Some(c) => item
                .category
                .as_deref()
                .is_some_and(|ic| ic.eq_ignore_ascii_case(c)),
            None => true,
        })
        .filter(|item| match &query {
            Some(q) => {
                item.name.to_lowercase().contains(q)
                    || item
                        .description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(q))
                    || item.tags.iter().any(|t| t.to_lowercase().contains(q))
            }
            None => true,
        })
        .collect()
}
