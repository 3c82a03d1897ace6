use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use flappy_engine::Surface;
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

/// Decoded images by src, shared between the loader and every canvas.
pub type ImageCache = Rc<RefCell<HashMap<String, HtmlImageElement>>>;

/// `Surface` over a canvas 2D context.
pub struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
    images: ImageCache,
}

impl CanvasSurface {
    pub fn new(ctx: CanvasRenderingContext2d, images: ImageCache) -> Self {
        Self { ctx, images }
    }

    pub fn context(&self) -> &CanvasRenderingContext2d {
        &self.ctx
    }
}

impl Surface for CanvasSurface {
    fn clear(&mut self, x: f32, y: f32, w: f32, h: f32) {
        self.ctx.clear_rect(x as f64, y as f64, w as f64, h as f64);
    }

    fn draw_image(&mut self, src: &str, x: f32, y: f32, w: f32, h: f32) {
        let images = self.images.borrow();
        let Some(img) = images.get(src) else {
            log::debug!("draw_image: '{}' not loaded yet", src);
            return;
        };
        if let Err(err) = self.ctx.draw_image_with_html_image_element_and_dw_and_dh(
            img, x as f64, y as f64, w as f64, h as f64,
        ) {
            log::warn!("drawImage '{}' failed: {:?}", src, err);
        }
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32) {
        if let Err(err) = self.ctx.fill_text(text, x as f64, y as f64) {
            log::warn!("fillText failed: {:?}", err);
        }
    }
}
