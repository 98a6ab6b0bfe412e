//! Application event loop.
//!
//! [`run`] opens a window and drives the desk scene from winit's
//! [`ApplicationHandler`] callbacks:
//!
//! 1. `resumed` creates the window, the GPU [`Context`], the wgpu backend and
//!    the [`SceneRenderer`], then prepares the scene
//! 2. `RedrawRequested` pushes the camera, records the scene, replays it into
//!    the surface texture and presents
//! 3. `Resized` follows the window size with surface, depth buffer and projection
//! 4. `CloseRequested` releases the scene's GPU objects and leaves the loop

use std::{iter, sync::Arc};

use anyhow::Context as _;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::Window,
};

use crate::{
    camera::{Camera, Projection, push_camera},
    config::SceneConfig,
    context::Context,
    graphics::HandleAllocator,
    pipelines::scene::SceneShader,
    render::WgpuGraphics,
    resources::FileDecoder,
    scene::SceneRenderer,
};

/// What went wrong while drawing a frame.
#[derive(Debug)]
enum FrameError {
    Surface(wgpu::SurfaceError),
    Scene(anyhow::Error),
}

/// Everything that only exists once a window is up.
struct AppState {
    ctx: Context,
    gfx: WgpuGraphics,
    scene: SceneRenderer<SceneShader>,
    camera: Camera,
    projection: Projection,
}

impl AppState {
    async fn new(window: Arc<Window>, config: &SceneConfig) -> anyhow::Result<Self> {
        let ctx = Context::new(window, config.clear_colour).await?;

        let mut handles = HandleAllocator::new();
        let shader = SceneShader::new(&mut handles)?;
        let mut gfx = WgpuGraphics::new(&ctx.device, &ctx.queue, ctx.config.format, handles)?;

        let mut scene = SceneRenderer::new(shader, config.texture_path());
        let texture = scene
            .prepare(&mut gfx, &FileDecoder)
            .context("failed to prepare the desk scene")?;
        log::info!("desk scene ready, texture {texture:?}");

        let projection = config.projection(ctx.config.width, ctx.config.height);
        Ok(Self {
            ctx,
            gfx,
            scene,
            camera: config.camera(),
            projection,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        if self.ctx.resize(width, height) {
            self.projection.resize(width, height);
        }
    }

    fn render(&mut self) -> Result<(), FrameError> {
        let output = self
            .ctx
            .surface
            .get_current_texture()
            .map_err(FrameError::Surface)?;

        push_camera(&mut self.gfx, self.scene.shader(), &self.camera, &self.projection);
        if let Err(e) = self.scene.render(&mut self.gfx) {
            self.gfx.discard_frame();
            return Err(FrameError::Scene(e));
        }
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        let draws = self.gfx.encode_frame(
            &mut encoder,
            &view,
            &self.ctx.depth_texture.view,
            self.ctx.clear_colour,
        );
        log::trace!("frame with {draws} draws");

        self.ctx.queue.submit(iter::once(encoder.finish()));
        self.ctx.window.pre_present_notify();
        output.present();
        Ok(())
    }
}

pub struct App {
    async_runtime: tokio::runtime::Runtime,
    config: SceneConfig,
    state: Option<AppState>,
}

impl App {
    fn new(config: SceneConfig) -> anyhow::Result<Self> {
        let async_runtime =
            tokio::runtime::Runtime::new().context("failed to start the async runtime")?;
        Ok(Self {
            async_runtime,
            config,
            state: None,
        })
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        let window_attributes = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(PhysicalSize::new(self.config.width, self.config.height));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Unable to create a window: {e}");
                event_loop.exit();
                return;
            }
        };

        match self
            .async_runtime
            .block_on(AppState::new(window, &self.config))
        {
            Ok(state) => {
                state.ctx.window().request_redraw();
                self.state = Some(state);
            }
            Err(e) => {
                log::error!("Unable to start the desk scene: {e:#}");
                event_loop.exit();
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
            WindowEvent::CloseRequested => {
                state.scene.release(&mut state.gfx);
                event_loop.exit();
            }
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::RedrawRequested => {
                match state.render() {
                    Ok(()) => {}
                    // Reconfigure the surface if it's lost or outdated
                    Err(FrameError::Surface(
                        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated,
                    )) => {
                        let size = state.ctx.window.inner_size();
                        state.resize(size.width, size.height);
                    }
                    Err(FrameError::Surface(e)) => log::error!("Unable to render {e}"),
                    Err(FrameError::Scene(e)) => log::error!("Unable to render the scene: {e:#}"),
                }
                state.ctx.window().request_redraw();
            }
            _ => {}
        }
    }
}

/// Opens the desk scene window and blocks until it is closed.
pub fn run(config: SceneConfig) -> anyhow::Result<()> {
    if let Err(e) = env_logger::try_init() {
        println!("Warning: Could not initialize logger: {}", e);
    };

    let event_loop = EventLoop::new().context("failed to create an event loop")?;
    let mut app = App::new(config)?;
    event_loop.run_app(&mut app)?;

    Ok(())
}
