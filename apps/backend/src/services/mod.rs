pub mod assets;
pub mod pexels;
pub mod progress;
pub mod sessions;
pub mod stories;
