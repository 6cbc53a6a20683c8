//! Button scene: one Buy button that drifts right every tick, plus a labelled
//! Medium button and a checkbox.
//!
//! Assets are generated in memory, so this runs without game data. Pass
//! `--window` to open a window instead of running 30 headless ticks.

use std::sync::Arc;

use image::{Rgba, RgbaImage};
use vefr::asset::encode_png;
use vefr::font::{Glyph, encode_glyph_table};
use vefr::prelude::*;

const FONT: &str = "/data/local/FONT/ENG/fontexocet10";

struct DemoWidgets {
    buy: Entity,
    medium: Entity,
    checkbox: Entity,
    reported: Vec<Entity>,
}

fn main() {
    init_logger();
    let windowed = std::env::args().any(|a| a == "--window");

    let mut app = App::new()
        .set_title("vefr - button scene")
        .insert_resource(Time::new())
        .insert_resource(AssetLoader::new(demo_assets(), ".tbl"));
    if !windowed {
        app = app.insert_resource(RenderSystem::new(Arc::new(SoftwareRenderer::new())));
    }
    let mut app = app
        .add_plugins(WidgetPlugin)
        .add_startup_system(setup)
        .add_system(drift_buy_button)
        .add_system(report_ready);

    if windowed {
        app.run();
    }
    app.run_for(30);
}

fn setup(world: &mut World) {
    let widgets = with_factory(world, |factory, world| DemoWidgets {
        buy: factory.button(world, 100.0, 100.0, ButtonType::Buy, "Test"),
        medium: factory.button(world, 100.0, 200.0, ButtonType::Medium, "Test"),
        checkbox: factory.checkbox(
            world,
            100.0,
            300.0,
            false,
            true,
            Some(Box::new(|entity: Entity, checked: bool| {
                log::info!("checkbox {entity} is now {}", if checked { "on" } else { "off" });
                true
            })),
        ),
        reported: Vec::new(),
    });
    match widgets {
        Some(widgets) => world.insert_resource(widgets),
        None => log::error!("WidgetPlugin is not installed"),
    }
}

fn drift_buy_button(world: &mut World) {
    let Some(buy) = world.get_resource::<DemoWidgets>().map(|w| w.buy) else {
        return;
    };
    if let Some(transform) = world.get_mut::<Transform>(buy) {
        transform.translate(1.0, 0.0);
    }
}

fn report_ready(world: &mut World) {
    let tick = world.get_resource::<Time>().map_or(0, |t| t.tick_count());
    let Some(w) = world.get_resource::<DemoWidgets>() else {
        return;
    };
    let fresh: Vec<(&str, Entity)> = [("buy button", w.buy), ("medium button", w.medium), ("checkbox", w.checkbox)]
        .into_iter()
        .filter(|&(_, e)| is_ready(world, e) && !w.reported.contains(&e))
        .collect();

    for &(name, entity) in &fresh {
        log::info!("tick {tick}: {name} {entity} is ready");
    }
    if let Some(w) = world.get_resource_mut::<DemoWidgets>() {
        w.reported.extend(fresh.into_iter().map(|(_, e)| e));
    }
}

/// A strip of `cells` square cells, shaded left to right.
fn strip(cells: u32, side: u32) -> Vec<u8> {
    let image = RgbaImage::from_fn(side * cells, side, |x, y| {
        let shade = (x / side * 24) as u8;
        let edge = y == 0 || y == side - 1;
        Rgba([shade, if edge { 255 } else { shade }, 96, 255])
    });
    match encode_png(&image) {
        Ok(bytes) => bytes,
        Err(err) => vefr::logging::fatal(format!("cannot encode demo sprite: {err}")),
    }
}

fn demo_assets() -> MemorySource {
    let glyphs: Vec<(char, Glyph)> = ('A'..='z')
        .enumerate()
        .map(|(i, ch)| (ch, Glyph { width: 8, height: 10, frame: i % 16 }))
        .collect();

    MemorySource::new()
        .with(format!("{FONT}.tbl"), encode_glyph_table(&glyphs))
        .with(format!("{FONT}.dc6"), strip(16, 10))
        .with("/data/global/ui/PANEL/buysellbtn.dc6", strip(10, 32))
        .with("/data/global/ui/FrontEnd/MediumButtonBlank.dc6", strip(4, 35))
        .with("/data/global/ui/FrontEnd/clickbox.dc6", strip(2, 16))
}
