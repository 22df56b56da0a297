mod line;
mod store;

pub use line::{rehydrate, CartLine};
pub use store::{CartStore, QtyChange};
