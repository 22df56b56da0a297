use std::str::FromStr;

use serde::Serialize;
use tracing::{debug, info, instrument};

use super::session::{AdminError, AdminSession};
use crate::id::EntityId;
use crate::tracking::{OrderRecord, OrderStatus};

/// Status selector for the orders table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(OrderStatus),
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(StatusFilter::All);
        }
        s.parse().map(StatusFilter::Only)
    }
}

#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub status: StatusFilter,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct OrderStats {
    pub total: usize,
    pub pending: usize,
    pub preparing: usize,
    pub ready: usize,
    pub delivered: usize,
    /// Sum of delivered totals.
    pub revenue: f64,
}

/// Local copy of the orders list kept in step with admin actions.
#[derive(Debug, Clone, Default)]
pub struct OrdersBoard {
    orders: Vec<OrderRecord>,
}

impl OrdersBoard {
    pub fn new(orders: Vec<OrderRecord>) -> Self {
        Self { orders }
    }

    pub fn orders(&self) -> &[OrderRecord] {
        &self.orders
    }

    pub fn stats(&self) -> OrderStats {
        let mut stats = OrderStats {
            total: self.orders.len(),
            ..OrderStats::default()
        };
        for order in &self.orders {
            match order.status {
                OrderStatus::Pending => stats.pending += 1,
                OrderStatus::Preparing => stats.preparing += 1,
                OrderStatus::Ready => stats.ready += 1,
                OrderStatus::Delivered => {
                    stats.delivered += 1;
                    stats.revenue += order.total;
                }
                OrderStatus::Unknown => {}
            }
        }
        stats
    }

    /// Search matches id, customer name, phone and tracking code, case-insensitively.
    pub fn filtered(&self, filter: &OrderFilter) -> Vec<&OrderRecord> {
        let needle = filter
            .search
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());

        self.orders
            .iter()
            .filter(|o| match filter.status {
                StatusFilter::All => true,
                StatusFilter::Only(status) => o.status == status,
            })
            .filter(|o| match &needle {
                None => true,
                Some(needle) => search_fields(o).any(|f| f.to_lowercase().contains(needle)),
            })
            .collect()
    }

    /// Swaps in the backend's copy of an order. Returns false if it is not on the board.
    pub fn replace(&mut self, updated: OrderRecord) -> bool {
        match self.orders.iter_mut().find(|o| o.id.same_entity(&updated.id)) {
            Some(slot) => {
                *slot = updated;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: &EntityId) -> Option<OrderRecord> {
        let idx = self.orders.iter().position(|o| o.id.same_entity(id))?;
        Some(self.orders.remove(idx))
    }
}

fn search_fields(order: &OrderRecord) -> impl Iterator<Item = String> + '_ {
    let customer = order.customer.as_ref();
    [
        Some(order.id.to_string()),
        customer.map(|c| c.name.clone()),
        customer.map(|c| c.phone.clone()),
        order.tracking_code.clone(),
    ]
    .into_iter()
    .flatten()
}

impl AdminSession {
    #[instrument(skip(self))]
    pub async fn load_orders(&self) -> Result<OrdersBoard, AdminError> {
        let token = self.require_token()?;
        let orders = self.settle(self.api.list_orders(&token).await)?;
        info!(count = orders.len(), "orders loaded");
        Ok(OrdersBoard::new(orders))
    }

    #[instrument(skip(self, board))]
    pub async fn set_order_status(
        &self,
        board: &mut OrdersBoard,
        id: &EntityId,
        status: OrderStatus,
    ) -> Result<Option<OrderRecord>, AdminError> {
        if status == OrderStatus::Unknown {
            return Err(AdminError::Invalid("Unknown order status".into()));
        }
        let token = self.require_token()?;
        let updated = self.settle(self.api.update_order_status(&token, id, status).await)?;
        match &updated {
            Some(order) => {
                board.replace(order.clone());
                info!(%id, %status, "order status updated");
            }
            None => debug!(%id, "status update returned no order; row left as is"),
        }
        Ok(updated)
    }

    #[instrument(skip(self, board))]
    pub async fn delete_order(
        &self,
        board: &mut OrdersBoard,
        id: &EntityId,
    ) -> Result<(), AdminError> {
        let token = self.require_token()?;
        self.settle(self.api.delete_order(&token, id).await)?;
        board.remove(id);
        info!(%id, "order deleted");
        Ok(())
    }
}
