pub mod clip_ops;
pub mod geometry;
pub mod snap;
