use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use flappy_engine::{
    Engine, EngineConfig, EngineError, ImageInfo, LoadRequest, LoadTicket, PendingLoad,
    RenderLayer, Surface,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlElement, HtmlImageElement, MouseEvent};

use crate::canvas::{CanvasSurface, ImageCache};
use crate::raf::{FrameClosure, RafScheduler};
use crate::report::{HostReport, ReportQueue};

/// State reachable from browser callbacks (animation frames, image loads, clicks).
struct Shared {
    engine: RefCell<Engine>,
    images: ImageCache,
    deferred: RefCell<ReportQueue>,
}

impl Shared {
    /// Run `f` on the engine unless it is already borrowed further up the stack.
    /// Reports parked while the engine was busy are delivered first.
    fn with_engine<R>(&self, f: impl FnOnce(&mut Engine) -> R) -> Option<R> {
        match self.engine.try_borrow_mut() {
            Ok(mut engine) => {
                let backlog = std::mem::take(&mut *self.deferred.borrow_mut());
                backlog.flush(&mut engine);
                Some(f(&mut engine))
            }
            Err(_) => {
                log::error!("Engine busy; browser callback skipped");
                None
            }
        }
    }

    /// Hand a load result to the engine, or park it until the engine is free.
    fn deliver(&self, report: HostReport) {
        if self.with_engine(|engine| log_error(report.apply(engine))).is_none() {
            self.deferred.borrow_mut().defer(report);
        }
    }

    /// Start an `HtmlImageElement` for every load the engine has queued.
    fn pump(self: &Rc<Self>) {
        let pending = self
            .with_engine(Engine::take_pending_loads)
            .unwrap_or_default();
        for load in pending {
            let ticket = load.ticket;
            if let Err(err) = start_image(self, load) {
                self.deliver(HostReport::Failed(ticket, format!("{:?}", err)));
            }
        }
    }

    fn image_loaded(self: &Rc<Self>, ticket: LoadTicket, src: String, img: HtmlImageElement) {
        let info = ImageInfo::new(img.natural_width(), img.natural_height());
        self.images.borrow_mut().insert(src, img);
        self.deliver(HostReport::Loaded(ticket, info));
        self.pump();
    }

    fn image_failed(self: &Rc<Self>, ticket: LoadTicket, src: &str) {
        let reason = format!("browser could not load '{}'", src);
        self.deliver(HostReport::Failed(ticket, reason));
        self.pump();
    }
}

fn log_error(result: Result<(), EngineError>) {
    if let Err(err) = result {
        log::error!("{}", err);
    }
}

fn start_image(shared: &Rc<Shared>, load: PendingLoad) -> Result<(), JsValue> {
    let img = HtmlImageElement::new()?;
    let PendingLoad { ticket, src } = load;

    let onload = {
        let weak: Weak<Shared> = Rc::downgrade(shared);
        let img = img.clone();
        let src = src.clone();
        Closure::once_into_js(move || {
            if let Some(shared) = weak.upgrade() {
                shared.image_loaded(ticket, src, img);
            }
        })
    };
    let onerror = {
        let weak: Weak<Shared> = Rc::downgrade(shared);
        let src = src.clone();
        Closure::once_into_js(move || {
            if let Some(shared) = weak.upgrade() {
                shared.image_failed(ticket, &src);
            }
        })
    };

    img.set_onload(Some(onload.unchecked_ref()));
    img.set_onerror(Some(onerror.unchecked_ref()));
    img.set_src(&src);
    Ok(())
}

fn create_canvas(document: &Document, width: f32, height: f32) -> Result<(HtmlCanvasElement, CanvasRenderingContext2d), JsValue> {
    let canvas = document
        .create_element("canvas")?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| JsValue::from_str("created element is not a canvas"))?;
    canvas.set_width(width as u32);
    canvas.set_height(height as u32);
    canvas.style().set_property("position", "absolute")?;
    let ctx = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|_| JsValue::from_str("context is not CanvasRenderingContext2D"))?;
    Ok((canvas, ctx))
}

/// Browser host for one engine: three stacked canvases inside a container,
/// `requestAnimationFrame` driving the loop, `HtmlImageElement` loading assets.
///
/// Keep the runner alive for as long as the game runs; dropping it detaches
/// the click listener and lets the frame loop die on its next tick.
pub struct WebRunner {
    shared: Rc<Shared>,
    _frame: FrameClosure,
    _click: Closure<dyn FnMut(MouseEvent)>,
}

impl WebRunner {
    /// Mount an engine into `container`.
    ///
    /// The container is measured once; its size overrides `config.width`/`height`.
    pub fn mount(container: &HtmlElement, mut config: EngineConfig) -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;

        let rect = container.get_bounding_client_rect();
        config.width = rect.width() as f32;
        config.height = rect.height() as f32;
        container.style().set_property("position", "relative")?;

        let images: ImageCache = Rc::new(RefCell::new(HashMap::new()));
        let mut surfaces: Vec<Box<dyn Surface>> = Vec::with_capacity(RenderLayer::COUNT);
        for _ in RenderLayer::ALL {
            let (canvas, ctx) = create_canvas(&document, config.width, config.height)?;
            container.append_child(&canvas)?;
            surfaces.push(Box::new(CanvasSurface::new(ctx, images.clone())));
        }
        let surfaces: [Box<dyn Surface>; RenderLayer::COUNT] = surfaces
            .try_into()
            .map_err(|_| JsValue::from_str("wrong number of surfaces"))?;

        let frame: FrameClosure = Rc::new(RefCell::new(None));
        let scheduler = RafScheduler::new(window, frame.clone());
        let engine = Engine::new(config, surfaces, Box::new(scheduler));
        let shared = Rc::new(Shared {
            engine: RefCell::new(engine),
            images,
            deferred: RefCell::new(ReportQueue::default()),
        });

        let weak = Rc::downgrade(&shared);
        *frame.borrow_mut() = Some(Closure::<dyn FnMut(f64)>::new(move |timestamp: f64| {
            if let Some(shared) = weak.upgrade() {
                shared.with_engine(|engine| engine.tick(timestamp));
                shared.pump();
            }
        }));

        let weak = Rc::downgrade(&shared);
        let click = Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
            if let Some(shared) = weak.upgrade() {
                let (x, y) = (event.offset_x() as f32, event.offset_y() as f32);
                shared.with_engine(|engine| engine.handle_click(x, y));
                shared.pump();
            }
        });
        container.add_event_listener_with_callback("click", click.as_ref().unchecked_ref())?;

        log::info!("Mounted {}x{} engine", rect.width(), rect.height());
        Ok(Self {
            shared,
            _frame: frame,
            _click: click,
        })
    }

    /// Run `f` on the engine, then start any image loads it queued.
    ///
    /// Must not be called from inside an engine callback; those already hold `&mut Engine`.
    pub fn with_engine<R>(&self, f: impl FnOnce(&mut Engine) -> R) -> Option<R> {
        let result = self.shared.with_engine(f);
        self.shared.pump();
        result
    }

    /// Accept a batch and start fetching its images.
    pub fn load_assets(&self, request: LoadRequest) -> Result<Vec<LoadTicket>, EngineError> {
        self.with_engine(|engine| engine.load_assets(request))
            .unwrap_or(Err(EngineError::Busy))
    }

    /// Accept a JSON batch and start fetching its images.
    pub fn load_assets_json(&self, json: &str) -> Result<Vec<LoadTicket>, JsValue> {
        let request = LoadRequest::from_json(json).map_err(to_js)?;
        self.load_assets(request).map_err(to_js)
    }

    pub fn start(&self) {
        self.with_engine(Engine::start);
    }

    pub fn stop(&self) {
        self.with_engine(Engine::stop);
    }

    /// Queue failed images again and start fetching them.
    pub fn retry_failed_loads(&self) -> usize {
        self.with_engine(Engine::retry_failed_loads).unwrap_or(0)
    }
}

/// Map an engine error onto the wasm boundary.
pub fn to_js(err: EngineError) -> JsValue {
    JsValue::from_str(&err.to_string())
}
