//! Diagnostics sender. Ships pipeline snapshots over UDP.
//!
//! Enabled by the `diagnostics` feature flag. [`WidgetPlugin`] inserts a
//! [`DiagSender`] resource and the window loop calls [`send_diagnostics`]
//! once per frame. Sends are throttled to 10 Hz; each one serializes a JSON
//! [`PipelineSnapshot`] and sends it to `127.0.0.1:9100`.
//!
//! [`WidgetPlugin`]: crate::widget::WidgetPlugin

use std::net::UdpSocket;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::app::SystemTimings;
use crate::asset::AssetLoader;
use crate::ecs::{Filter, World};
use crate::logging::{CapturedLog, drain_captured};
use crate::readiness::Ready;
use crate::scene::SceneState;
use crate::time::Time;
use crate::widget::{Button, Checkbox, Label, TickStats, WidgetFactory};

const SEND_INTERVAL: Duration = Duration::from_millis(100);
const LOGS_PER_SNAPSHOT: usize = 50;

/// Resource that owns the outbound UDP socket and throttling state.
pub struct DiagSender {
    socket: UdpSocket,
    last_send: Option<Instant>,
}

impl DiagSender {
    /// Bind an ephemeral port aimed at the collector. `None` if the socket
    /// cannot be set up.
    pub fn new() -> Option<Self> {
        let socket = UdpSocket::bind("127.0.0.1:0").ok()?;
        socket.connect("127.0.0.1:9100").ok()?;
        socket.set_nonblocking(true).ok()?;
        Some(Self {
            socket,
            last_send: None,
        })
    }

    fn due(&mut self, now: Instant) -> bool {
        if self
            .last_send
            .is_some_and(|last| now.duration_since(last) < SEND_INTERVAL)
        {
            return false;
        }
        self.last_send = Some(now);
        true
    }
}

#[derive(Debug, Default, Serialize)]
pub struct WidgetCounts {
    pub labels: usize,
    pub buttons: usize,
    pub checkboxes: usize,
}

#[derive(Debug, Default, Serialize)]
pub struct FontCacheSnapshot {
    pub entries: usize,
    pub weight: usize,
    pub budget: usize,
    pub fonts_built: u64,
}

#[derive(Debug, Serialize)]
pub struct SystemTimingSnapshot {
    pub name: String,
    pub duration_us: u64,
}

#[derive(Debug, Serialize)]
pub struct LogEntrySnapshot {
    pub level: String,
    pub target: String,
    pub message: String,
}

/// Wire format of one diagnostics datagram.
#[derive(Debug, Serialize)]
pub struct PipelineSnapshot {
    pub tick_count: u64,
    pub entity_count: usize,
    pub booted: bool,
    pub queued: WidgetCounts,
    pub ready: WidgetCounts,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_cache: Option<FontCacheSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_tick: Option<TickStats>,
    pub asset_failures: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub system_timings: Vec<SystemTimingSnapshot>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub logs: Vec<LogEntrySnapshot>,
}

impl PipelineSnapshot {
    /// Gather a snapshot from `world`, attaching `logs`.
    pub fn capture(world: &World, logs: Vec<CapturedLog>) -> Self {
        let ready_count = |filter: Filter| world.filtered(&filter.require::<Ready>()).len();
        let ready = WidgetCounts {
            labels: ready_count(Filter::new().require::<Label>()),
            buttons: ready_count(Filter::new().require::<Button>()),
            checkboxes: ready_count(Filter::new().require::<Checkbox>()),
        };

        let factory = world.get_resource::<WidgetFactory>();
        let queued = factory.map_or_else(WidgetCounts::default, |f| WidgetCounts {
            labels: f.queues().labels.len(),
            buttons: f.queues().buttons.len(),
            checkboxes: f.queues().checkboxes.len(),
        });
        let font_cache = factory.map(|f| FontCacheSnapshot {
            entries: f.font_cache().len(),
            weight: f.font_cache().weight(),
            budget: f.font_cache().budget(),
            fonts_built: f.fonts_built(),
        });

        let system_timings = world
            .get_resource::<SystemTimings>()
            .map(|t| {
                t.0.iter()
                    .map(|t| SystemTimingSnapshot {
                        name: t.name.clone(),
                        duration_us: t.duration.as_micros() as u64,
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            tick_count: world.get_resource::<Time>().map_or(0, |t| t.tick_count()),
            entity_count: world.entity_count(),
            booted: factory.is_some_and(|f| f.state() == SceneState::Booted),
            queued,
            ready,
            font_cache,
            last_tick: factory.map(|f| f.stats()),
            asset_failures: world.get_resource::<AssetLoader>().map_or(0, |l| l.failed_count()),
            system_timings,
            logs: logs
                .into_iter()
                .map(|l| LogEntrySnapshot {
                    level: l.level.to_string(),
                    target: l.target,
                    message: l.message,
                })
                .collect(),
        }
    }
}

/// Called once per frame. Throttled to 10 Hz internally.
pub fn send_diagnostics(world: &mut World) {
    let Some(sender) = world.get_resource_mut::<DiagSender>() else {
        return;
    };
    if !sender.due(Instant::now()) {
        return;
    }

    let snapshot = PipelineSnapshot::capture(world, drain_captured(LOGS_PER_SNAPSHOT));
    let json = match serde_json::to_vec(&snapshot) {
        Ok(json) => json,
        Err(err) => {
            log::debug!("cannot serialize diagnostics snapshot: {err}");
            return;
        }
    };
    if let Some(sender) = world.get_resource::<DiagSender>() {
        // Nobody listening is the normal case.
        let _ = sender.socket.send(&json);
    }
}
