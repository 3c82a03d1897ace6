pub mod image;
pub mod loader;
pub mod registry;
pub mod request;
