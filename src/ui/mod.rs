pub mod app;
pub mod gesture;
pub mod timeline_widget;
pub mod video_player;
