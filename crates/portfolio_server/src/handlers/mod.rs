//! Route handlers, one module per resource.

pub mod analysis;
pub mod charts;
pub mod projects;
pub mod system;
