//! HTTP handlers, grouped by resource

pub mod feedback;
pub mod projects;
pub mod system;
pub mod teams;
pub mod users;
