pub mod api;
pub mod core;
pub mod components;
pub mod renderer;
pub mod assets;

// Re-export key types at crate root for convenience
pub use api::engine::{Engine, Headless, FrameCallback, ReadyCallback, ErrorCallback, ClickCallback};
pub use api::config::{EngineConfig, DEFAULT_GRAVITY_Y};
pub use api::error::{EngineError, EngineResult};
pub use api::types::{GameState, LoadTicket, FrameHandle};
pub use components::entity::{Entity, Movement, DEFAULT_NUDGE};
pub use components::layer::RenderLayer;
pub use core::scheduler::{FrameScheduler, ManualScheduler};
pub use renderer::surface::{Surface, DrawCommand, RecordingSurface};
pub use assets::request::{LoadRequest, AssetDescriptor, Offset};
pub use assets::registry::{AssetRegistry, AssetSlot};
pub use assets::loader::{AssetLoader, PendingLoad, Completion};
pub use assets::image::ImageInfo;
