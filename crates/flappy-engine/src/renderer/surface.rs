//! Drawing surface contract.
//!
//! The engine never rasterizes anything itself. It owns three surfaces
//! (one per `RenderLayer`), clears them every rendered frame and hands them
//! to game code, which draws entities and text through this trait.
//! The browser bridge implements it over `CanvasRenderingContext2D`.

use std::cell::RefCell;
use std::rc::Rc;

/// An opaque 2D drawing surface.
pub trait Surface {
    /// Clear the rectangle at (x, y) of size (w, h) to transparent.
    fn clear(&mut self, x: f32, y: f32, w: f32, h: f32);

    /// Draw the image loaded from `src` into the given rectangle.
    fn draw_image(&mut self, src: &str, x: f32, y: f32, w: f32, h: f32);

    /// Draw a line of text with its baseline starting at (x, y).
    fn fill_text(&mut self, text: &str, x: f32, y: f32);
}

/// A recorded call against a `RecordingSurface`.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear { x: f32, y: f32, w: f32, h: f32 },
    Image { src: String, x: f32, y: f32, w: f32, h: f32 },
    Text { text: String, x: f32, y: f32 },
}

/// Headless surface that records every call.
///
/// Clones share the same command log, so a host can keep one clone to
/// inspect what the engine drew after handing the other to `Engine::new`.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    commands: Rc<RefCell<Vec<DrawCommand>>>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of all commands recorded so far.
    pub fn commands(&self) -> Vec<DrawCommand> {
        self.commands.borrow().clone()
    }

    /// Remove and return all recorded commands.
    pub fn take(&self) -> Vec<DrawCommand> {
        std::mem::take(&mut *self.commands.borrow_mut())
    }

    /// Number of `Clear` commands recorded.
    pub fn clear_count(&self) -> usize {
        self.commands
            .borrow()
            .iter()
            .filter(|c| matches!(c, DrawCommand::Clear { .. }))
            .count()
    }

    pub fn len(&self) -> usize {
        self.commands.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.borrow().is_empty()
    }
}

impl Surface for RecordingSurface {
    fn clear(&mut self, x: f32, y: f32, w: f32, h: f32) {
        self.commands.borrow_mut().push(DrawCommand::Clear { x, y, w, h });
    }

    fn draw_image(&mut self, src: &str, x: f32, y: f32, w: f32, h: f32) {
        self.commands.borrow_mut().push(DrawCommand::Image {
            src: src.to_string(),
            x,
            y,
            w,
            h,
        });
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32) {
        self.commands.borrow_mut().push(DrawCommand::Text {
            text: text.to_string(),
            x,
            y,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::entity::Entity;
    use glam::Vec2;

    #[test]
    fn clones_share_the_log() {
        let observer = RecordingSurface::new();
        let mut surface: Box<dyn Surface> = Box::new(observer.clone());
        surface.clear(0.0, 0.0, 10.0, 10.0);
        surface.fill_text("3", 5.0, 5.0);
        assert_eq!(observer.len(), 2);
        assert_eq!(observer.clear_count(), 1);
    }

    #[test]
    fn entity_draws_at_its_position() {
        let mut surface = RecordingSurface::new();
        let e = Entity::new("bird.png", Vec2::new(34.0, 24.0), Vec2::new(60.0, 200.0), 0.0);
        e.draw(&mut surface);
        assert_eq!(
            surface.take(),
            vec![DrawCommand::Image {
                src: "bird.png".into(),
                x: 60.0,
                y: 200.0,
                w: 34.0,
                h: 24.0,
            }]
        );
        assert!(surface.is_empty());
    }
}
