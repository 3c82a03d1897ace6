pub mod entity;
pub mod layer;
