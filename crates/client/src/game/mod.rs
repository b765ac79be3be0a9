// Client session - connection, current snapshot, scheduler and scene in one place
//
// Everything the viewer mutates lives here and is reached through `&mut self`;
// drivers only translate between the outside world and `Effect`s.
use crate::atlas::SpriteSet;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::network::{Action, ConnectionManager, EventSource, TransportEvent};
use crate::render::{Renderer, Starfield, Surface};
use crate::scheduler::{RenderScheduler, Tick};
use protocol::ArenaSnapshot;
use std::time::Duration;
use tracing::{debug, info};

/// Work for the driver.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Open a socket to this URL, replacing any previous one.
    Connect(String),
    /// Call [`ArenaClient::reconnect_due`] once after this delay.
    ScheduleReconnect(Duration),
    /// Ask for a display-refresh tick.
    RequestFrame,
}

pub struct ArenaClient<S: Surface> {
    connection: ConnectionManager,
    snapshot: Option<ArenaSnapshot>,
    scheduler: RenderScheduler,
    renderer: Renderer,
    starfield: Starfield,
    surface: S,
}

impl<S: Surface> ArenaClient<S> {
    /// Validates the sprites before anything else happens.
    pub fn new(
        config: &ClientConfig,
        url: impl Into<String>,
        sprites: SpriteSet,
        surface: S,
        star_seed: u64,
    ) -> Result<Self, ClientError> {
        let renderer = Renderer::new(sprites, config.render.clone())?;
        Ok(Self {
            connection: ConnectionManager::new(url, config.reconnect_delay()),
            snapshot: None,
            scheduler: RenderScheduler::new(),
            renderer,
            starfield: Starfield::new(star_seed, config.render.star_depth_step),
            surface,
        })
    }

    pub fn start(&mut self) -> Option<Effect> {
        if self.scheduler.is_stopped() {
            return None;
        }
        let action = self.connection.start();
        Some(self.apply(action))
    }

    /// Feed one transport event through the connection manager.
    pub fn handle_event(&mut self, event: TransportEvent) -> Option<Effect> {
        if self.scheduler.is_stopped() {
            return None;
        }
        let action = self.connection.handle(event)?;
        Some(self.apply(action))
    }

    /// Drain `source` in order.
    pub fn pump<E: EventSource + ?Sized>(&mut self, source: &mut E) -> Vec<Effect> {
        let mut effects = Vec::new();
        while let Some(event) = source.poll_event() {
            effects.extend(self.handle_event(event));
        }
        effects
    }

    /// The reconnect timer fired.
    pub fn reconnect_due(&mut self) -> Option<Effect> {
        if self.scheduler.is_stopped() {
            return None;
        }
        let action = self.connection.reconnect_due();
        Some(self.apply(action))
    }

    /// Display-refresh tick. Draws the current snapshot unless this timestamp
    /// was already drawn or nothing has arrived yet.
    pub fn tick(&mut self, timestamp: f64) -> Tick {
        let tick = self.scheduler.begin(timestamp, self.snapshot.is_some());
        if tick == Tick::Draw {
            if let Some(snapshot) = &self.snapshot {
                self.renderer
                    .draw(&mut self.surface, snapshot, timestamp, &mut self.starfield);
            }
        }
        tick
    }

    /// No further draws, connects or reconnects.
    pub fn stop(&mut self) {
        info!("Viewer stopped");
        self.scheduler.stop();
    }

    pub fn is_stopped(&self) -> bool {
        self.scheduler.is_stopped()
    }

    pub fn snapshot(&self) -> Option<&ArenaSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn connection(&self) -> &ConnectionManager {
        &self.connection
    }

    pub fn scheduler(&self) -> &RenderScheduler {
        &self.scheduler
    }

    pub fn starfield(&self) -> &Starfield {
        &self.starfield
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    fn apply(&mut self, action: Action) -> Effect {
        match action {
            Action::Connect(url) => Effect::Connect(url),
            Action::ScheduleReconnect(delay) => Effect::ScheduleReconnect(delay),
            Action::Publish(snapshot) => {
                self.publish(*snapshot);
                Effect::RequestFrame
            }
        }
    }

    fn publish(&mut self, snapshot: ArenaSnapshot) {
        let previous = self.snapshot.as_ref().and_then(|s| s.winner.as_deref());
        if let Some(winner) = snapshot.winner.as_deref() {
            if previous != Some(winner) {
                info!(winner, "Battle over");
            }
        }
        if snapshot.is_placeholder() {
            debug!(remaining = ?snapshot.remaining, "Waiting for players");
        }
        self.snapshot = Some(snapshot);
    }
}
