mod dto;
mod services;

pub use dto::{OrderLine, OrderRecord, OrderStatus, PhoneLookup, StageView};
pub use services::{lookup_by_phone, progress, track_order, TrackingError};
