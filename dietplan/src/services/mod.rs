//! Services module
//!
//! Business logic services that sit between callers and the repository.

pub mod catalog;
pub mod plans;

pub use catalog::CatalogService;
pub use plans::PlanService;
