//! Domain operations shared by handlers and the CLI
//!
//! Multi-step mutations open their own transaction; read helpers are generic
//! over [`sea_orm::ConnectionTrait`] so they run inside or outside one.

pub mod accounts;
pub mod membership;
pub mod ownership;
pub mod projects;
pub mod teams;
