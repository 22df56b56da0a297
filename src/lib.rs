//! Client core of the Mami Food storefront: catalog, cart, pricing, checkout,
//! order tracking, notifications and the admin dashboard, all talking to the
//! REST backend through [`api::StorefrontApi`].

pub mod admin;
pub mod announcements;
pub mod api;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod format;
pub mod id;
pub mod notify;
pub mod pricing;
pub mod state;
pub mod storage;
pub mod storefront;
pub mod tracking;
