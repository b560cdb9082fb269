//! Request handlers, one module per resource.

pub mod estimate;
pub mod health;
pub mod history;
pub mod vehicle;
