//! Diet planner library
//!
//! Manages diets with ordered meal categories and rated foods, and generates
//! weighted-random weekly meal plans that can be saved and revisited.

pub mod app;
pub mod config;
pub mod database;
pub mod error;
pub mod planner;
pub mod services;
