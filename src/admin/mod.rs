pub mod dto;
mod menu;
mod orders;
mod session;

pub use orders::{OrderFilter, OrderStats, OrdersBoard, StatusFilter};
pub use session::{AdminError, AdminSession};
