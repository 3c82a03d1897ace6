use glam::Vec2;
use crate::renderer::surface::Surface;

/// Step applied by `Movement` when asked to move with a zero or non-finite speed.
/// Always applied in the requested direction.
pub const DEFAULT_NUDGE: f32 = 0.5;

/// A positioned, sized, gravity-affected game object backed by a loaded image.
///
/// Size comes from the image dimensions and never changes after construction.
/// Gravity is captured by value from the engine configuration when the entity
/// is created; later configuration changes do not reach existing entities.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    /// Image source this entity was created from.
    pub src: String,
    /// Top-left corner in play-area pixels.
    pub pos: Vec2,
    /// Vertical velocity in pixels per frame.
    pub velocity_y: f32,
    size: Vec2,
    offset: Vec2,
    gravity_y: f32,
}

impl Entity {
    /// Create an entity resting at `offset`.
    pub fn new(src: impl Into<String>, size: Vec2, offset: Vec2, gravity_y: f32) -> Self {
        Self {
            src: src.into(),
            pos: offset,
            velocity_y: 0.0,
            size,
            offset,
            gravity_y,
        }
    }

    // -- Builder pattern --

    pub fn with_pos(mut self, pos: Vec2) -> Self {
        self.pos = pos;
        self
    }

    pub fn with_velocity_y(mut self, velocity_y: f32) -> Self {
        self.velocity_y = velocity_y;
        self
    }

    // -- Accessors --

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn width(&self) -> f32 {
        self.size.x
    }

    pub fn height(&self) -> f32 {
        self.size.y
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn gravity_y(&self) -> f32 {
        self.gravity_y
    }

    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    // -- Kinematics --

    /// Put the entity back at its offset, at rest.
    pub fn reset(&mut self) {
        self.pos = self.offset;
        self.velocity_y = 0.0;
    }

    /// One symplectic-Euler step: velocity first, then position.
    /// Called once per rendered frame; velocity is in pixels per frame.
    pub fn fall(&mut self) {
        self.velocity_y -= self.gravity_y;
        self.pos.y += self.velocity_y;
    }

    /// Replace the vertical velocity with an upward impulse of `impulse` pixels per frame.
    pub fn rise(&mut self, impulse: f32) {
        self.velocity_y = -impulse;
    }

    /// Directional steps of `speed` pixels. See `DEFAULT_NUDGE` for the zero-speed case.
    pub fn movement(&mut self, speed: f32) -> Movement<'_> {
        let step = if speed == 0.0 || !speed.is_finite() {
            DEFAULT_NUDGE
        } else {
            speed
        };
        Movement { entity: self, step }
    }

    // -- Queries --

    /// Axis-aligned overlap with the rectangle at (x, y) of size (w, h).
    /// Touching edges count as a collision.
    pub fn is_collision(&self, x: f32, y: f32, w: f32, h: f32) -> bool {
        self.right() >= x
            && self.pos.x <= x + w
            && self.bottom() >= y
            && self.pos.y <= y + h
    }

    /// `is_collision` against another entity's bounding box.
    pub fn collides_with(&self, other: &Entity) -> bool {
        self.is_collision(other.pos.x, other.pos.y, other.width(), other.height())
    }

    /// True once any edge reaches or crosses the bounds.
    /// Boundary-inclusive: an entity exactly touching an edge is out of bounds.
    pub fn is_out_of_bounds(&self, bounds_w: f32, bounds_h: f32) -> bool {
        self.pos.x <= 0.0
            || self.right() >= bounds_w
            || self.pos.y <= 0.0
            || self.bottom() >= bounds_h
    }

    /// True if any part of the entity lies strictly inside a viewport of the given size
    /// anchored at the origin.
    pub fn is_in_view(&self, viewport: Vec2) -> bool {
        self.pos.x < viewport.x
            && self.right() > 0.0
            && self.pos.y < viewport.y
            && self.bottom() > 0.0
    }

    /// True iff the right edge lies strictly left of `coord`.
    pub fn has_passed(&self, coord: f32) -> bool {
        self.right() < coord
    }

    /// Draw this entity's image at its position and size.
    pub fn draw(&self, surface: &mut dyn Surface) {
        surface.draw_image(&self.src, self.pos.x, self.pos.y, self.size.x, self.size.y);
    }
}

/// Directional stepper returned by `Entity::movement`.
pub struct Movement<'a> {
    entity: &'a mut Entity,
    step: f32,
}

impl Movement<'_> {
    pub fn left(&mut self) {
        self.entity.pos.x -= self.step;
    }

    pub fn right(&mut self) {
        self.entity.pos.x += self.step;
    }

    pub fn up(&mut self) {
        self.entity.pos.y -= self.step;
    }

    pub fn down(&mut self) {
        self.entity.pos.y += self.step;
    }

    /// The step this mover applies, after the zero-speed fallback.
    pub fn step(&self) -> f32 {
        self.step
    }
}
