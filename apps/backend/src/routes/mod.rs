pub mod assets;
pub mod images;
pub mod progress;
pub mod sessions;
pub mod stories;
