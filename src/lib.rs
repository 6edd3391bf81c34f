pub mod backend;
pub mod bridge;
pub mod config;
pub mod error;
pub mod ops;
pub mod renderer;
pub mod types;
pub mod ui;
