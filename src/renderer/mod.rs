pub mod preview_sync;
pub mod scheduler;
