//! # Widget Factory
//!
//! Labels, buttons and checkboxes are assembled over several ticks. A factory
//! call spawns the widget entity at once, asks for the sprites and files it
//! needs, and parks the widget in a load queue. Every tick the factory walks
//! one combined work list:
//!
//! ```text
//!   queued buttons → queued checkboxes → queued labels
//!     → Ready buttons → Ready checkboxes → Ready labels
//! ```
//!
//! Queued widgets advance as far as their prerequisites' `Ready` markers
//! allow. Ready widgets get their textures refreshed. The walk stops when the
//! tick budget is spent and the next tick resumes where it stopped, so a large
//! backlog drains over several ticks without starving anything.
//!
//! Nothing runs until the factory's [`BootGate`] sees a bound renderer.

mod button;
mod checkbox;
mod interactive;
mod label;
mod queue;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

pub use button::{
    Button, ButtonLayout, ButtonType, PRESSED_OFFSET, PRESSED_TOGGLED_OFFSET, StateSprites,
    StateSurfaces, TOGGLED_OFFSET,
};
pub use checkbox::{Checkbox, CheckboxCallback, CheckboxLayout};
pub use interactive::{InteractionCallback, Interactive, process_interactions};
pub use label::Label;
pub use queue::{ButtonEntry, CheckboxEntry, LabelEntry, LoadQueues};

use crate::app::{App, Plugin};
use crate::asset::{AssetLoader, MemorySource, load_assets};
use crate::cache::ResourceCache;
use crate::config::PipelineConfig;
use crate::ecs::{Entity, Filter, Subscription, World, propagate_transforms};
use crate::font::{BitmapFont, FontKey};
use crate::input::{CursorPosition, Input, MouseButton, clear_input};
use crate::readiness::Ready;
use crate::render::RenderSystem;
use crate::scene::{BootGate, SceneState};
use crate::sprite::{SpriteFactory, SpriteSource};
use crate::time::{TickBudget, Time};

/// Shared bitmap-font cache.
pub type FontCache = ResourceCache<FontKey, BitmapFont>;

/// What the last tick got through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TickStats {
    /// Units on the work list at the start of the tick.
    pub units_total: usize,
    pub units_processed: usize,
    /// The tick stopped early.
    pub budget_exhausted: bool,
    #[serde(serialize_with = "serialize_micros")]
    pub elapsed: Duration,
}

fn serialize_micros<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_micros() as u64)
}

/// One unit of tick work. The derived order is the work-list order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Unit {
    ProcessButton(Entity),
    ProcessCheckbox(Entity),
    ProcessLabel(Entity),
    UpdateButton(Entity),
    UpdateCheckbox(Entity),
    UpdateLabel(Entity),
}

/// Resource: creates widgets and drives their assembly.
pub struct WidgetFactory {
    gate: BootGate,
    queues: LoadQueues,
    font_cache: Arc<FontCache>,
    config: PipelineConfig,
    sprites: Box<dyn SpriteSource + Send + Sync>,
    labels_to_update: Subscription,
    buttons_to_update: Subscription,
    checkboxes_to_update: Subscription,
    /// First unit the next tick should run, if the last one stopped early.
    resume: Option<Unit>,
    stats: TickStats,
    fonts_built: u64,
    font_failures: HashSet<FontKey>,
}

impl WidgetFactory {
    pub fn new(config: PipelineConfig) -> Self {
        Self::with_sprite_source(config, SpriteFactory)
    }

    pub fn with_sprite_source(
        config: PipelineConfig,
        sprites: impl SpriteSource + Send + Sync + 'static,
    ) -> Self {
        let font_cache = Arc::new(FontCache::new(config.font_cache_budget));
        Self {
            gate: BootGate::new(),
            queues: LoadQueues::new(),
            font_cache,
            config,
            sprites: Box::new(sprites),
            labels_to_update: Filter::new().require::<Label>().require::<Ready>().build(),
            buttons_to_update: Filter::new().require::<Button>().require::<Ready>().build(),
            checkboxes_to_update: Filter::new().require::<Checkbox>().require::<Ready>().build(),
            resume: None,
            stats: TickStats::default(),
            fonts_built: 0,
            font_failures: HashSet::new(),
        }
    }

    /// Use `cache` instead of a private one, so several factories share fonts.
    pub fn with_font_cache(mut self, cache: Arc<FontCache>) -> Self {
        self.font_cache = cache;
        self
    }

    pub fn state(&self) -> SceneState {
        self.gate.state()
    }

    pub fn queues(&self) -> &LoadQueues {
        &self.queues
    }

    pub fn font_cache(&self) -> &Arc<FontCache> {
        &self.font_cache
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn stats(&self) -> TickStats {
        self.stats
    }

    /// Fonts built from scratch, i.e. cache misses that produced a font.
    pub fn fonts_built(&self) -> u64 {
        self.fonts_built
    }

    /// One tick of widget work.
    pub fn update(&mut self, world: &mut World) {
        if !self.gate.is_booted() {
            self.gate.poll(world, "widget factory");
            return;
        }

        let budget = TickBudget::start(self.config.tick_budget());
        self.prune_dead(world);
        let units = self.work_list(world);

        let mut stats = TickStats {
            units_total: units.len(),
            ..TickStats::default()
        };
        let start = match self.resume.take() {
            Some(resume) => units.partition_point(|u| *u < resume) % units.len().max(1),
            None => 0,
        };
        for step in 0..units.len() {
            let unit = units[(start + step) % units.len()];
            if step > 0 && budget.exhausted() {
                stats.budget_exhausted = true;
                self.resume = Some(unit);
                break;
            }
            self.run_unit(world, unit);
            stats.units_processed += 1;
        }

        stats.elapsed = budget.elapsed();
        if stats.budget_exhausted {
            log::trace!(
                "widget tick stopped after {}/{} units ({:?})",
                stats.units_processed,
                stats.units_total,
                stats.elapsed
            );
        }
        self.stats = stats;
    }

    fn work_list(&self, world: &World) -> Vec<Unit> {
        let mut units = Vec::new();
        units.extend(LoadQueues::sorted_keys(&self.queues.buttons).into_iter().map(Unit::ProcessButton));
        units.extend(
            LoadQueues::sorted_keys(&self.queues.checkboxes)
                .into_iter()
                .map(Unit::ProcessCheckbox),
        );
        units.extend(LoadQueues::sorted_keys(&self.queues.labels).into_iter().map(Unit::ProcessLabel));
        units.extend(self.buttons_to_update.entities(world).into_iter().map(Unit::UpdateButton));
        units.extend(self.checkboxes_to_update.entities(world).into_iter().map(Unit::UpdateCheckbox));
        units.extend(self.labels_to_update.entities(world).into_iter().map(Unit::UpdateLabel));
        units
    }

    fn run_unit(&mut self, world: &mut World, unit: Unit) {
        match unit {
            Unit::ProcessButton(e) => self.process_button(world, e),
            Unit::ProcessCheckbox(e) => self.process_checkbox(world, e),
            Unit::ProcessLabel(e) => self.process_label(world, e),
            Unit::UpdateButton(e) => self.update_button(world, e),
            Unit::UpdateCheckbox(e) => self.update_checkbox(world, e),
            Unit::UpdateLabel(e) => self.update_label(world, e),
        }
    }

    /// Forget queue entries whose widget was despawned before it finished.
    fn prune_dead(&mut self, world: &World) {
        let before = self.queues.len();
        self.queues.labels.retain(|&e, _| world.is_alive(e));
        self.queues.buttons.retain(|&e, _| world.is_alive(e));
        self.queues.checkboxes.retain(|&e, _| world.is_alive(e));
        let dropped = before - self.queues.len();
        if dropped > 0 {
            log::debug!("dropped {dropped} queued widget(s) that were despawned");
        }
    }
}

/// System: run the [`WidgetFactory`] resource for one tick.
pub fn widget_system(world: &mut World) {
    let Some(mut factory) = world.resource_remove::<WidgetFactory>() else {
        return;
    };
    factory.update(world);
    world.insert_resource(factory);
}

/// Borrow the factory resource alongside the world, e.g. to create widgets
/// from a system. `None` without a factory.
pub fn with_factory<R>(world: &mut World, f: impl FnOnce(&mut WidgetFactory, &mut World) -> R) -> Option<R> {
    let mut factory = world.resource_remove::<WidgetFactory>()?;
    let result = f(&mut factory, world);
    world.insert_resource(factory);
    Some(result)
}

/// Registers the widget pipeline.
///
/// Resources already present are kept, the factory included. Without an
/// asset loader an empty in-memory one is installed.
#[derive(Debug, Default)]
pub struct WidgetPlugin;

impl Plugin for WidgetPlugin {
    fn build(&self, app: &mut App) {
        let world = &mut app.world;
        if !world.has_resource::<PipelineConfig>() {
            world.insert_resource(PipelineConfig::default());
        }
        let config = world.resource::<PipelineConfig>().clone();

        if !world.has_resource::<Time>() {
            world.insert_resource(Time::new());
        }
        if !world.has_resource::<Input<MouseButton>>() {
            world.insert_resource(Input::<MouseButton>::new());
        }
        if !world.has_resource::<CursorPosition>() {
            world.insert_resource(CursorPosition::default());
        }
        if !world.has_resource::<RenderSystem>() {
            world.insert_resource(RenderSystem::unbound());
        }
        if !world.has_resource::<AssetLoader>() {
            world.insert_resource(AssetLoader::new(
                MemorySource::new(),
                config.glyph_table_extension.clone(),
            ));
        }
        if !world.has_resource::<WidgetFactory>() {
            world.insert_resource(WidgetFactory::new(config));
        }

        #[cfg(feature = "diagnostics")]
        if !world.has_resource::<crate::diag::DiagSender>() {
            if let Some(sender) = crate::diag::DiagSender::new() {
                world.insert_resource(sender);
            }
        }

        app.systems.add_system(load_assets);
        app.systems.add_system(widget_system);
        app.systems.add_system(process_interactions);
        app.systems.add_system(propagate_transforms);
        app.systems.add_system(clear_input);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{File, encode_png};
    use crate::font::{BitmapFontHandle, Glyph, encode_glyph_table};
    use crate::readiness::{is_ready, mark_ready};
    use crate::render::{SoftwareRenderer, Texture};
    use crate::sprite::{Segments, Sprite, SpriteRequest, SpriteSheet};
    use image::{Rgba, RgbaImage};

    const FONT: &str = "/data/local/FONT/ENG/fontexocet10";
    const PALETTE: &str = "/data/global/palette/units/pal.dat";

    fn config(tick_budget_ms: u64) -> PipelineConfig {
        PipelineConfig {
            tick_budget_ms,
            ..PipelineConfig::default()
        }
    }

    fn booted(config: PipelineConfig) -> (World, WidgetFactory) {
        let mut world = World::new();
        world.insert_resource(RenderSystem::new(Arc::new(SoftwareRenderer::new())));
        let mut factory = WidgetFactory::new(config);
        factory.update(&mut world);
        assert_eq!(factory.state(), SceneState::Booted);
        (world, factory)
    }

    /// A strip of `cells` 8x8 cells, each a different shade.
    fn strip(cells: u32) -> Vec<u8> {
        let image = RgbaImage::from_fn(8 * cells, 8, |x, _| Rgba([(x / 8 * 20) as u8, 0, 0, 255]));
        encode_png(&image).unwrap()
    }

    fn glyphs() -> Vec<u8> {
        let glyph = |frame| Glyph { width: 8, height: 8, frame };
        encode_glyph_table(&[('T', glyph(0)), ('e', glyph(1)), ('s', glyph(2)), ('t', glyph(3))])
    }

    fn assets() -> MemorySource {
        MemorySource::new()
            .with(format!("{FONT}.tbl"), glyphs())
            .with(format!("{FONT}.dc6"), strip(4))
            .with("/data/global/ui/FrontEnd/MediumButtonBlank.dc6", strip(4))
            .with("/data/global/ui/PANEL/buysellbtn.dc6", strip(10))
            .with("/data/global/ui/FrontEnd/clickbox.dc6", strip(2))
    }

    fn with_loader(world: &mut World) {
        world.insert_resource(AssetLoader::new(assets(), ".tbl"));
    }

    fn tick(world: &mut World, factory: &mut WidgetFactory) {
        load_assets(world);
        factory.update(world);
    }

    fn run_until_ready(world: &mut World, factory: &mut WidgetFactory, widget: Entity) -> usize {
        for n in 1..=20 {
            tick(world, factory);
            if is_ready(world, widget) {
                return n;
            }
        }
        panic!("{widget} never became ready");
    }

    #[test]
    fn nothing_runs_before_boot() {
        let mut world = World::new();
        world.insert_resource(RenderSystem::unbound());
        let mut factory = WidgetFactory::new(config(100));
        let label = factory.label(&mut world, "Test", FONT, PALETTE);

        for _ in 0..3 {
            factory.update(&mut world);
        }
        assert_eq!(factory.state(), SceneState::Uninitialized);
        assert!(factory.queues().contains(label));
        assert_eq!(factory.stats(), TickStats::default());

        world.resource_mut::<RenderSystem>().bind(Arc::new(SoftwareRenderer::new()));
        factory.update(&mut world);
        assert_eq!(factory.state(), SceneState::Booted);
    }

    #[test]
    fn label_becomes_ready_in_one_tick_after_prerequisites() {
        let (mut world, mut factory) = booted(config(1_000));
        with_loader(&mut world);

        let label = factory.label(&mut world, "Test", FONT, PALETTE);
        let entry = factory.queues().labels[&label];
        assert!(!is_ready(&world, label));
        assert!(!world.has::<BitmapFontHandle>(label));

        factory.update(&mut world);
        assert!(!is_ready(&world, label));

        load_assets(&mut world);
        assert!(is_ready(&world, entry.table) && is_ready(&world, entry.sprite));
        assert!(factory.font_cache().is_empty());

        factory.update(&mut world);
        assert!(world.has::<BitmapFontHandle>(label));
        assert!(is_ready(&world, label));
        assert!(!world.is_alive(entry.table));
        assert!(!factory.queues().contains(label));

        let key = FontKey::new(format!("{FONT}.tbl"), format!("{FONT}.dc6"), PALETTE);
        assert_eq!(key.to_string(), format!("{FONT}.tbl::{FONT}.dc6::{PALETTE}"));
        assert!(factory.font_cache().contains(&key));
    }

    #[test]
    fn label_waits_for_both_prerequisites() {
        let (mut world, mut factory) = booted(config(1_000));
        let label = factory.label(&mut world, "Test", FONT, PALETTE);
        let entry = factory.queues().labels[&label];

        world.insert(entry.table, crate::font::FontTable { data: glyphs() });
        mark_ready(&mut world, entry.table);
        for _ in 0..3 {
            factory.update(&mut world);
            assert!(!is_ready(&world, label));
        }
        assert!(world.is_alive(entry.table));
    }

    #[test]
    fn labels_with_same_key_share_one_font() {
        let (mut world, mut factory) = booted(config(1_000));
        with_loader(&mut world);

        let a = factory.label(&mut world, "Test", FONT, PALETTE);
        let b = factory.label(&mut world, "est", FONT, PALETTE);
        tick(&mut world, &mut factory);

        fn font(world: &World, label: Entity) -> Arc<BitmapFont> {
            Arc::clone(&world.get::<BitmapFontHandle>(label).unwrap().0)
        }
        assert!(Arc::ptr_eq(&font(&world, a), &font(&world, b)));
        assert_eq!(factory.fonts_built(), 1);
        assert_eq!(factory.font_cache().len(), 1);

        let c = factory.label(&mut world, "set", FONT, "/data/global/palette/act1/pal.dat");
        tick(&mut world, &mut factory);
        assert!(!Arc::ptr_eq(&font(&world, a), &font(&world, c)));
        assert_eq!(factory.fonts_built(), 2);
    }

    #[test]
    fn full_font_cache_still_finalizes_labels() {
        let (mut world, mut factory) = booted(PipelineConfig {
            font_cache_budget: 0,
            ..config(1_000)
        });
        with_loader(&mut world);

        let a = factory.label(&mut world, "Test", FONT, PALETTE);
        let b = factory.label(&mut world, "est", FONT, PALETTE);
        tick(&mut world, &mut factory);

        for label in [a, b] {
            assert!(is_ready(&world, label));
            assert!(world.has::<BitmapFontHandle>(label));
        }
        assert!(factory.font_cache().is_empty());
        assert_eq!(factory.fonts_built(), 2);
        assert!(factory.queues().is_empty());
    }

    #[test]
    fn factories_sharing_a_cache_share_fonts() {
        let (mut world, mut first) = booted(config(1_000));
        with_loader(&mut world);
        let mut second = WidgetFactory::new(config(1_000)).with_font_cache(Arc::clone(first.font_cache()));
        second.update(&mut world);

        let a = first.label(&mut world, "Test", FONT, PALETTE);
        tick(&mut world, &mut first);
        let b = second.label(&mut world, "est", FONT, PALETTE);
        tick(&mut world, &mut second);

        let font = |label| Arc::clone(&world.get::<BitmapFontHandle>(label).unwrap().0);
        assert!(Arc::ptr_eq(&font(a), &font(b)));
        assert_eq!(first.fonts_built() + second.fonts_built(), 1);
    }

    #[test]
    fn plugin_keeps_existing_resources() {
        let mut factory = WidgetFactory::new(config(1_000));
        let label = factory.label(&mut World::new(), "x", FONT, PALETTE);

        let app = App::new()
            .insert_resource(CursorPosition { x: 7.0, y: 0.0 })
            .insert_resource(factory)
            .add_plugins(WidgetPlugin);
        assert_eq!(app.world.resource::<CursorPosition>().x, 7.0);
        assert!(app.world.resource::<WidgetFactory>().queues().contains(label));
        assert!(app.world.has_resource::<Input<MouseButton>>());
        assert!(app.world.has_resource::<AssetLoader>());
    }

    #[test]
    fn ready_label_renders_and_rerenders_on_change() {
        let (mut world, mut factory) = booted(config(1_000));
        with_loader(&mut world);
        let label = factory.label(&mut world, "Test", FONT, PALETTE);
        tick(&mut world, &mut factory);
        factory.update(&mut world);

        let first = world.get::<Texture>(label).and_then(|t| t.surface_id());
        assert!(first.is_some());
        assert_eq!(world.get::<Texture>(label).unwrap().surface.as_ref().unwrap().size(), (32, 8));

        factory.update(&mut world);
        assert_eq!(world.get::<Texture>(label).and_then(|t| t.surface_id()), first);

        world.get_mut::<Label>(label).unwrap().set_text("Tes");
        factory.update(&mut world);
        let second = world.get::<Texture>(label).and_then(|t| t.surface_id());
        assert_ne!(second, first);
    }

    #[test]
    fn button_ready_only_after_all_state_sprites() {
        let (mut world, mut factory) = booted(config(1_000));
        with_loader(&mut world);
        let button = factory.button(&mut world, 10.0, 20.0, ButtonType::Buy, "");

        tick(&mut world, &mut factory);
        let states = world.get::<Button>(button).unwrap().states.unwrap();
        assert!(!is_ready(&world, button));
        assert!(states.all().iter().all(|&s| !is_ready(&world, s)));

        tick(&mut world, &mut factory);
        assert!(states.all().iter().all(|&s| is_ready(&world, s)));
        assert!(is_ready(&world, button));
    }

    #[test]
    fn button_waits_while_a_state_sprite_is_missing() {
        let (mut world, mut factory) = booted(config(1_000));
        // Sheet covers Normal and Pressed only.
        world.insert_resource(AssetLoader::new(
            MemorySource::new().with("/data/global/ui/PANEL/buysellbtn.dc6", strip(4)),
            ".tbl",
        ));
        let button = factory.button(&mut world, 0.0, 0.0, ButtonType::Buy, "");
        for _ in 0..5 {
            tick(&mut world, &mut factory);
        }
        assert!(!is_ready(&world, button));
        assert!(factory.queues().contains(button));
    }

    #[test]
    fn disabled_state_aliases_normal_entity() {
        let (mut world, mut factory) = booted(config(1_000));
        with_loader(&mut world);
        let button = factory.button(&mut world, 0.0, 0.0, ButtonType::Sell, "");
        tick(&mut world, &mut factory);

        let states = world.get::<Button>(button).unwrap().states.unwrap();
        assert_eq!(states.disabled, states.normal);
        assert_ne!(states.pressed, states.normal);
    }

    #[test]
    fn button_links_label_and_sprite_as_children() {
        let (mut world, mut factory) = booted(config(1_000));
        with_loader(&mut world);
        let button = factory.button(&mut world, 0.0, 0.0, ButtonType::Medium, "Test");
        let entry = factory.queues().buttons[&button];
        run_until_ready(&mut world, &mut factory, button);

        let parent = |e| world.get::<crate::ecs::SceneGraphNode>(e).and_then(|n| n.parent);
        assert_eq!(parent(entry.label), Some(button));
        assert_eq!(parent(entry.sprite), Some(button));
        assert!(world.get::<Label>(entry.label).is_some());
    }

    #[test]
    fn same_type_buttons_have_identical_disabled_textures() {
        let (mut world, mut factory) = booted(config(1_000));
        with_loader(&mut world);
        let a = factory.button(&mut world, 0.0, 0.0, ButtonType::Medium, "Test");
        let b = factory.button(&mut world, 0.0, 40.0, ButtonType::Medium, "Test");
        let (ea, eb) = (factory.queues().buttons[&a], factory.queues().buttons[&b]);
        assert_ne!(ea.label, eb.label);
        assert_ne!(ea.sprite, eb.sprite);

        run_until_ready(&mut world, &mut factory, a);
        run_until_ready(&mut world, &mut factory, b);
        factory.update(&mut world);

        let disabled = |e| {
            let b = world.get::<Button>(e).unwrap();
            b.surfaces.as_ref().unwrap().disabled.image.clone()
        };
        assert_eq!(disabled(a), disabled(b));
        assert!(world.get::<Texture>(a).unwrap().surface.is_some());
    }

    #[test]
    fn button_texture_follows_state() {
        let (mut world, mut factory) = booted(config(1_000));
        with_loader(&mut world);
        let button = factory.button(&mut world, 0.0, 0.0, ButtonType::Buy, "");
        run_until_ready(&mut world, &mut factory, button);
        factory.update(&mut world);

        let shown = |world: &World| world.get::<Texture>(button).and_then(|t| t.surface_id());
        let normal = shown(&world);
        world.get_mut::<Button>(button).unwrap().set_pressed(true);
        factory.update(&mut world);
        let pressed = world.get::<Button>(button).unwrap().surfaces.as_ref().unwrap().pressed.id();
        assert_ne!(shown(&world), normal);
        assert_eq!(shown(&world), Some(pressed));
    }

    #[test]
    fn checkbox_becomes_clickable() {
        let (mut world, mut factory) = booted(config(1_000));
        with_loader(&mut world);
        world.insert_resource(CursorPosition { x: 105.0, y: 105.0 });
        world.insert_resource(Input::<MouseButton>::new());

        let checkbox = factory.checkbox(&mut world, 100.0, 100.0, false, true, None);
        run_until_ready(&mut world, &mut factory, checkbox);
        assert!(world.has::<Interactive>(checkbox));
        assert!(world.has::<Texture>(checkbox));

        factory.update(&mut world);
        let unchecked = world.get::<Texture>(checkbox).and_then(|t| t.surface_id());
        assert!(unchecked.is_some());

        world.resource_mut::<Input<MouseButton>>().press(MouseButton::Left);
        process_interactions(&mut world);
        assert!(world.get::<Checkbox>(checkbox).unwrap().is_pressed());

        factory.update(&mut world);
        assert_ne!(world.get::<Texture>(checkbox).and_then(|t| t.surface_id()), unchecked);
    }

    #[test]
    fn zero_budget_processes_one_unit_per_tick() {
        let (mut world, mut factory) = booted(config(0));
        let labels: Vec<_> = (0..5).map(|_| factory.label(&mut world, "x", FONT, PALETTE)).collect();

        factory.update(&mut world);
        let stats = factory.stats();
        assert_eq!(stats.units_total, 5);
        assert_eq!(stats.units_processed, 1);
        assert!(stats.budget_exhausted);
        assert_eq!(factory.queues().len(), labels.len());
    }

    #[test]
    fn backlog_drains_under_a_tight_budget() {
        let (mut world, mut factory) = booted(config(0));
        with_loader(&mut world);
        let labels: Vec<_> = (0..6).map(|i| factory.label(&mut world, &"T".repeat(i + 1), FONT, PALETTE)).collect();
        load_assets(&mut world);

        for _ in 0..labels.len() {
            factory.update(&mut world);
        }
        assert!(labels.iter().all(|&l| is_ready(&world, l)));
        assert_eq!(factory.fonts_built(), 1);
    }

    #[test]
    fn despawned_widgets_leave_the_queue() {
        let (mut world, mut factory) = booted(config(1_000));
        let label = factory.label(&mut world, "x", FONT, PALETTE);
        world.despawn(label);
        factory.update(&mut world);
        assert!(factory.queues().is_empty());
    }

    #[test]
    fn broken_font_is_not_cached() {
        let (mut world, mut factory) = booted(config(1_000));
        let label = factory.label(&mut world, "x", FONT, PALETTE);
        let entry = factory.queues().labels[&label];

        world.insert(entry.table, crate::font::FontTable { data: b"nope".to_vec() });
        let sheet = Arc::new(SpriteSheet::from_strip(&RgbaImage::new(8, 8)));
        let path = world.get::<SpriteRequest>(entry.sprite).unwrap().image_path.clone();
        world.insert(
            entry.sprite,
            Sprite {
                sheet,
                path,
                palette_path: PALETTE.to_string(),
                segments: Segments::SINGLE,
                current_frame: 0,
            },
        );
        mark_ready(&mut world, entry.table);
        mark_ready(&mut world, entry.sprite);

        factory.update(&mut world);
        factory.update(&mut world);
        assert!(!is_ready(&world, label));
        assert!(factory.font_cache().is_empty());
        assert_eq!(factory.fonts_built(), 0);
        assert!(world.get::<File>(entry.table).is_some());
    }

    #[test]
    fn with_factory_reinserts_the_resource() {
        let mut world = World::new();
        assert!(with_factory(&mut world, |_, _| ()).is_none());

        world.insert_resource(WidgetFactory::new(PipelineConfig::default()));
        let label = with_factory(&mut world, |f, w| f.label(w, "x", FONT, PALETTE)).unwrap();
        assert!(world.resource::<WidgetFactory>().queues().contains(label));
    }
}
