//! Application shell and event loop.
//!
//! Each frame follows the same order: resolve pointer input, update every
//! entity, advance the camera, render. Asset loads run in the background and
//! land as user events, so a frame is never blocked on IO.

use std::{pin::Pin, sync::Arc};

use instant::Instant;

use winit::{
    application::ApplicationHandler,
    event::{MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    window::Window,
};

use crate::{
    camera::{Camera, Projection},
    context::Context,
    entity::EntityId,
    interaction::InteractionController,
    resources::{load_model_gltf, LoadedAsset},
    scene::Scene,
    sections::ScrollSections,
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// One wheel line in virtual scroll pixels.
const LINE_HEIGHT: f32 = 60.0;

/// Events delivered through the winit proxy: deferred initialization on the
/// web, and finished asset loads on every platform.
pub enum AppEvent {
    Initialized(Box<AppState>),
    AssetLoaded {
        entity: EntityId,
        result: anyhow::Result<LoadedAsset>,
    },
}

impl std::fmt::Debug for AppEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initialized(_) => f.write_str("Initialized"),
            Self::AssetLoaded { entity, result } => f
                .debug_struct("AssetLoaded")
                .field("entity", entity)
                .field("ok", &result.is_ok())
                .finish(),
        }
    }
}

/// Handles the scene constructor gets to build with: GPU access (cheap
/// clones of the internal Arcs) and the window size.
pub struct InitContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub viewport_height: f32,
}

impl From<&Context> for InitContext {
    fn from(ctx: &Context) -> Self {
        Self {
            device: ctx.device.clone(),
            queue: ctx.queue.clone(),
            viewport_height: ctx.config.height as f32,
        }
    }
}

/// What a scene constructor returns: the populated scene, its scroll
/// sections, and optionally a starting camera.
pub struct SceneSetup {
    pub scene: Scene,
    pub sections: ScrollSections,
    pub camera: Option<Camera>,
}

/// Factory building the scene once the GPU context exists.
pub type SceneConstructor =
    Box<dyn FnOnce(InitContext) -> Pin<Box<dyn Future<Output = anyhow::Result<SceneSetup>>>>>;

/// Everything alive after initialization: GPU context, scene and controllers.
pub struct AppState {
    pub(crate) ctx: Context,
    scene: Scene,
    sections: ScrollSections,
    interaction: InteractionController,
    is_surface_configured: bool,
}

impl AppState {
    async fn new(window: Arc<Window>, constructor: SceneConstructor) -> Self {
        let mut ctx = match Context::new(window).await {
            Ok(ctx) => ctx,
            Err(e) => panic!("App initialization failed. Cannot create the main context: {e}"),
        };
        let setup = match constructor((&ctx).into()).await {
            Ok(setup) => setup,
            Err(e) => panic!("App initialization failed. Cannot build the scene: {e}"),
        };
        if let Some(camera) = setup.camera {
            ctx.camera = camera;
        }
        Self {
            ctx,
            scene: setup.scene,
            sections: setup.sections,
            interaction: InteractionController::new(),
            is_surface_configured: false,
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.is_surface_configured = true;
            self.ctx.resize(width, height);
            self.sections.set_viewport_height(height as f32);
        }
    }

    /// One frame: pointer input, entities, camera, then the render pass.
    fn frame(&mut self, dt: f32) -> Result<(), wgpu::SurfaceError> {
        self.ctx.window.request_redraw();
        if !self.is_surface_configured {
            return Ok(());
        }

        advance_tick(
            &self.interaction,
            &mut self.scene,
            &mut self.ctx.camera,
            &self.ctx.projection,
            (self.ctx.config.width, self.ctx.config.height),
            dt,
        );

        self.ctx.render(&mut self.scene)
    }
}

/// One simulation tick, everything that happens before the render pass:
/// pointer input resolves first so a press starts its walk in the same frame,
/// then every entity updates exactly once, then the camera flight advances.
pub fn advance_tick(
    interaction: &InteractionController,
    scene: &mut Scene,
    camera: &mut Camera,
    projection: &Projection,
    (width, height): (u32, u32),
    dt: f32,
) {
    interaction.tick(width, height, camera, projection, scene);
    scene.update(dt, camera);
    camera.update(dt);
}

pub struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    proxy: EventLoopProxy<AppEvent>,
    state: Option<AppState>,
    // Held until the window exists, then consumed.
    constructor: Option<SceneConstructor>,
    last_time: Instant,
}

impl App {
    fn new(event_loop: &EventLoop<AppEvent>, constructor: SceneConstructor) -> Self {
        let proxy = event_loop.create_proxy();
        #[cfg(not(target_arch = "wasm32"))]
        let async_runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
        Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
            proxy,
            state: None,
            constructor: Some(constructor),
            last_time: Instant::now(),
        }
    }

    /// Kick off a background load for every entity spawned since the last
    /// call. Results arrive as [`AppEvent::AssetLoaded`].
    fn start_pending_loads(&mut self) {
        let Some(state) = &mut self.state else {
            return;
        };
        for request in state.scene.take_pending_loads() {
            let device = state.ctx.device.clone();
            let queue = state.ctx.queue.clone();
            let proxy = self.proxy.clone();
            let fut = async move {
                let result =
                    load_model_gltf(&request.file_name, &device, &queue, request.tint).await;
                if proxy
                    .send_event(AppEvent::AssetLoaded {
                        entity: request.entity,
                        result,
                    })
                    .is_err()
                {
                    log::info!("event loop closed before {} finished", request.file_name);
                }
            };
            #[cfg(not(target_arch = "wasm32"))]
            self.async_runtime.spawn(fut);
            #[cfg(target_arch = "wasm32")]
            wasm_bindgen_futures::spawn_local(fut);
        }
    }
}

impl ApplicationHandler<AppEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes();

        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::JsCast;
            use winit::platform::web::WindowAttributesExtWebSys;

            const CANVAS_ID: &str = "canvas";

            let window = web_sys::window().unwrap_throw();
            let document = window.document().unwrap_throw();
            let canvas = document.get_element_by_id(CANVAS_ID).unwrap_throw();
            let html_canvas_element = canvas.unchecked_into();
            window_attributes = window_attributes.with_canvas(Some(html_canvas_element));
        }

        let window = Arc::new(
            event_loop
                .create_window(window_attributes)
                .expect("create window"),
        );

        let constructor = self
            .constructor
            .take()
            .expect("resumed twice without a constructor");
        let init_future = AppState::new(window, constructor);

        #[cfg(not(target_arch = "wasm32"))]
        {
            let state = self.async_runtime.block_on(init_future);
            let size = state.ctx.window.inner_size();
            self.state = Some(state);
            if let Some(state) = &mut self.state {
                state.resize(size.width, size.height);
            }
            self.start_pending_loads();
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let state = init_future.await;
                assert!(proxy
                    .send_event(AppEvent::Initialized(Box::new(state)))
                    .is_ok());
            });
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: AppEvent) {
        match event {
            AppEvent::Initialized(state) => {
                // The message from our wasm `spawn_local`.
                self.state = Some(*state);
                let state = self.state.as_mut().expect("state just set");
                let size = state.ctx.window.inner_size();
                state.resize(size.width, size.height);
                state.ctx.window.request_redraw();
                self.start_pending_loads();
            }
            AppEvent::AssetLoaded { entity, result } => {
                if let Some(state) = &mut self.state {
                    match result {
                        Ok(asset) => state.scene.attach(entity, asset),
                        // The entity stays without geometry; the rest of the
                        // scene keeps running.
                        Err(e) => log::error!("asset load failed for {:?}: {e:?}", entity),
                    }
                }
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::CursorMoved { position, .. } => {
                state.interaction.on_cursor_moved(position);
            }
            WindowEvent::MouseInput {
                state: button_state,
                button: MouseButton::Left,
                ..
            } => {
                if button_state.is_pressed() {
                    state.interaction.on_pointer_down();
                } else {
                    state.interaction.on_pointer_up();
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                // Wheel-down (negative y) scrolls forward through the town.
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => -y * LINE_HEIGHT,
                    MouseScrollDelta::PixelDelta(pos) => -pos.y as f32,
                };
                state.sections.on_scroll(scroll, &mut state.ctx.camera);
            }
            WindowEvent::RedrawRequested => {
                let dt = self.last_time.elapsed().as_secs_f32();
                self.last_time = Instant::now();

                match state.frame(dt) {
                    Ok(_) => {}
                    // Reconfigure the surface if it's lost or outdated
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        let size = state.ctx.window.inner_size();
                        state.resize(size.width, size.height);
                    }
                    Err(e) => {
                        log::error!("Unable to render {}", e);
                    }
                }
            }
            _ => {}
        }
    }
}

pub fn run(constructor: SceneConstructor) -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        console_log::init_with_level(log::Level::Info).unwrap_throw();
    }

    let event_loop: EventLoop<AppEvent> = EventLoop::with_user_event().build()?;
    let mut app = App::new(&event_loop, constructor);
    event_loop.run_app(&mut app)?;

    Ok(())
}
