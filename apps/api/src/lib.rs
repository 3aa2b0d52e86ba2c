//! Cookbook layout service: paginates a recipe onto a hero page, a two-column
//! content spread and full-width overflow pages.

pub mod config;
pub mod errors;
pub mod layout;
pub mod models;
pub mod routes;
pub mod state;
