use tracing::{info, instrument, warn};

use super::session::{AdminError, AdminSession};
use crate::catalog::{MenuItem, MenuItemDraft, MenuItemPatch};
use crate::id::EntityId;

fn check_name(name: &str) -> Result<(), AdminError> {
    if name.trim().is_empty() {
        return Err(AdminError::Invalid("Name is required".into()));
    }
    Ok(())
}

fn check_price(price: f64) -> Result<(), AdminError> {
    if !price.is_finite() || price < 0.0 {
        return Err(AdminError::Invalid("Price must be a non-negative number".into()));
    }
    Ok(())
}

impl AdminSession {
    #[instrument(skip(self))]
    pub async fn menu_items(&self) -> Result<Vec<MenuItem>, AdminError> {
        let token = self.require_token()?;
        self.settle(self.api.admin_menu(&token).await)
    }

    #[instrument(skip(self, draft), fields(name = %draft.name))]
    pub async fn create_menu_item(&self, draft: &MenuItemDraft) -> Result<MenuItem, AdminError> {
        check_name(&draft.name)?;
        check_price(draft.price)?;
        let token = self.require_token()?;

        let mut draft = draft.clone();
        draft.name = draft.name.trim().to_string();
        let created = self.settle(self.api.create_menu_item(&token, &draft).await)?;
        info!(id = %created.id, "menu item created");
        Ok(created)
    }

    #[instrument(skip(self, patch))]
    pub async fn update_menu_item(
        &self,
        id: &EntityId,
        patch: &MenuItemPatch,
    ) -> Result<MenuItem, AdminError> {
        if patch.is_empty() {
            warn!("empty menu patch");
            return Err(AdminError::Invalid("Nothing to update".into()));
        }
        if let Some(name) = &patch.name {
            check_name(name)?;
        }
        if let Some(price) = patch.price {
            check_price(price)?;
        }
        let token = self.require_token()?;
        let updated = self.settle(self.api.update_menu_item(&token, id, patch).await)?;
        info!("menu item updated");
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete_menu_item(&self, id: &EntityId) -> Result<(), AdminError> {
        let token = self.require_token()?;
        self.settle(self.api.delete_menu_item(&token, id).await)?;
        info!("menu item deleted");
        Ok(())
    }
}
