pub mod dto;
pub mod services;

pub use dto::{MenuFilter, MenuItem, MenuItemDraft, MenuItemPatch};
pub use services::{categories, filter_menu, load_menu, normalize_menu, ViewGuard};
