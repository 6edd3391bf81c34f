pub mod marker;
pub mod media;
pub mod playback_state;
pub mod project;
pub mod selection;
pub mod session;
pub mod task;
pub mod timeline;
pub mod track;
pub mod view_state;
