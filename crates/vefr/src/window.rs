//! Window management via winit.
//!
//! Implements [`winit::application::ApplicationHandler`] to drive the event
//! loop: window creation, renderer binding, mouse forwarding, and one app
//! tick per redraw.

use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowId};

use crate::app::App;
use crate::input::{CursorPosition, Input, MouseButton};
use crate::render::{RenderSystem, SoftwareRenderer};

/// The application state that winit drives.
pub(crate) struct WinitApp {
    app: App,
    window: Option<Arc<Window>>,
    title: String,
}

impl WinitApp {
    pub(crate) fn new(app: App, title: String) -> Self {
        Self {
            app,
            window: None,
            title,
        }
    }

    /// Give the render system a renderer if it has none yet. Scenes waiting
    /// on their boot gate pick it up on their next tick.
    fn bind_renderer(&mut self) {
        let world = &mut self.app.world;
        if !world.has_resource::<RenderSystem>() {
            world.insert_resource(RenderSystem::unbound());
        }
        let rs = world.resource_mut::<RenderSystem>();
        if rs.renderer.is_none() {
            rs.bind(Arc::new(SoftwareRenderer::new()));
        }
    }
}

impl ApplicationHandler for WinitApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            let attrs = Window::default_attributes()
                .with_title(&self.title)
                .with_inner_size(winit::dpi::LogicalSize::new(800.0, 600.0));
            match event_loop.create_window(attrs) {
                Ok(window) => self.window = Some(Arc::new(window)),
                Err(err) => {
                    log::error!("cannot create window: {err}");
                    event_loop.exit();
                    return;
                }
            }
        }
        self.bind_renderer();
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let world = &mut self.app.world;
        match event {
            WindowEvent::CloseRequested => {
                log::info!("window close requested, exiting");
                event_loop.exit();
            }

            WindowEvent::MouseInput { button, state, .. } => {
                if let Some(input) = world.get_resource_mut::<Input<MouseButton>>() {
                    match state {
                        ElementState::Pressed => input.press(button),
                        ElementState::Released => input.release(button),
                    }
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                if let Some(cursor) = world.get_resource_mut::<CursorPosition>() {
                    cursor.x = position.x as f32;
                    cursor.y = position.y as f32;
                }
            }

            WindowEvent::RedrawRequested => {
                self.app.update();
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        #[cfg(feature = "diagnostics")]
        crate::diag::send_diagnostics(&mut self.app.world);
    }
}
