//! # Vefr: Asynchronous Widget Assembly
//!
//! Labels, buttons and checkboxes for an ECS game loop, assembled over
//! several ticks as their glyph tables and sprite sheets finish loading.
//! Readiness is a `Ready` marker component; the widget factory polls it
//! every tick within a wall-clock budget and shares bitmap fonts through a
//! content-addressed cache.
//!
//! Start with `use vefr::prelude::*`, add [`WidgetPlugin`](widget::WidgetPlugin)
//! to an [`App`](app::App), and create widgets through
//! [`with_factory`](widget::with_factory).

pub mod app;
pub mod asset;
pub mod cache;
pub mod config;
pub mod ecs;
pub mod font;
pub mod input;
pub mod logging;
pub mod math;
pub mod prelude;
pub mod readiness;
pub mod render;
pub mod scene;
pub mod sprite;
pub mod time;
pub mod widget;
pub mod window;

#[cfg(feature = "diagnostics")]
pub mod diag;
