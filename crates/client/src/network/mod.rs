// Live-state connection - lifecycle, reconnect policy, snapshot decoding
//
// The manager never touches a socket itself. Drivers (browser glue, the
// native spectator, tests) feed it `TransportEvent`s and carry out the
// `Action`s it returns, which keeps the state machine deterministic.
use protocol::{ArenaSnapshot, decode_snapshot};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Where the live-state stream lives. The scheme mirrors the hosting page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub secure: bool,
    pub host: String,
    pub path: String,
}

impl Endpoint {
    pub fn new(secure: bool, host: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            secure,
            host: host.into(),
            path: path.into(),
        }
    }

    /// Build from `location.protocol` (`"https:"` / `"http:"`) and `location.host`.
    pub fn from_page(page_protocol: &str, host: &str, path: impl Into<String>) -> Self {
        Self::new(page_protocol == "https:", host, path)
    }

    pub fn url(&self) -> String {
        let path = if self.path.starts_with('/') {
            self.path.clone()
        } else {
            format!("/{}", self.path)
        };
        format!("ws{}://{}{}", if self.secure { "s" } else { "" }, self.host, path)
    }
}

/// Something that happened on the transport.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    Open,
    Message(String),
    Closed { code: u16 },
    Error(String),
}

/// Work the driver must carry out on the manager's behalf.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Connect(String),
    ScheduleReconnect(Duration),
    Publish(Box<ArenaSnapshot>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closed,
}

struct ReconnectState {
    delay: Duration,
    scheduled: bool,
}

pub struct ConnectionManager {
    url: String,
    state: ConnectionState,
    reconnect: ReconnectState,
    attempts: u64,
    dropped_messages: u64,
}

impl ConnectionManager {
    pub fn new(url: impl Into<String>, reconnect_delay: Duration) -> Self {
        Self {
            url: url.into(),
            state: ConnectionState::Closed,
            reconnect: ReconnectState {
                delay: reconnect_delay,
                scheduled: false,
            },
            attempts: 0,
            dropped_messages: 0,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    pub fn dropped_messages(&self) -> u64 {
        self.dropped_messages
    }

    pub fn reconnect_pending(&self) -> bool {
        self.reconnect.scheduled
    }

    /// First connection attempt.
    pub fn start(&mut self) -> Action {
        self.connect()
    }

    /// One-shot reconnect timer fired.
    pub fn reconnect_due(&mut self) -> Action {
        self.reconnect.scheduled = false;
        self.connect()
    }

    fn connect(&mut self) -> Action {
        self.state = ConnectionState::Connecting;
        self.attempts += 1;
        info!(url = %self.url, attempt = self.attempts, "Connecting");
        Action::Connect(self.url.clone())
    }

    pub fn handle(&mut self, event: TransportEvent) -> Option<Action> {
        match event {
            TransportEvent::Open => {
                info!(url = %self.url, "Connection open");
                self.state = ConnectionState::Open;
                self.reconnect.scheduled = false;
                None
            }
            TransportEvent::Message(text) => match decode_snapshot(&text) {
                Ok(snapshot) => Some(Action::Publish(Box::new(snapshot))),
                Err(e) => {
                    self.dropped_messages += 1;
                    warn!(error = %e, dropped = self.dropped_messages, "Dropping undecodable snapshot");
                    None
                }
            },
            TransportEvent::Closed { code } => {
                debug!(code, "Connection closed");
                self.on_closed()
            }
            TransportEvent::Error(message) => {
                warn!(error = %message, "Connection error");
                self.on_closed()
            }
        }
    }

    fn on_closed(&mut self) -> Option<Action> {
        self.state = ConnectionState::Closed;
        if self.reconnect.scheduled {
            return None;
        }
        self.reconnect.scheduled = true;
        info!(delay_ms = self.reconnect.delay.as_millis() as u64, "Scheduling reconnect");
        Some(Action::ScheduleReconnect(self.reconnect.delay))
    }
}

/// Ordered source of transport events polled by the render loop.
pub trait EventSource {
    fn poll_event(&mut self) -> Option<TransportEvent>;
}

/// FIFO shared between socket callbacks (producers) and the frame loop.
///
/// Only the newest undelivered message is kept: a snapshot replaces the whole
/// arena, so older ones would be decoded just to be thrown away.
#[derive(Clone, Default)]
pub struct EventQueue {
    events: Rc<RefCell<VecDeque<TransportEvent>>>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: TransportEvent) {
        let mut events = self.events.borrow_mut();
        if matches!(event, TransportEvent::Message(_)) {
            events.retain(|queued| !matches!(queued, TransportEvent::Message(_)));
        }
        events.push_back(event);
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }
}

impl EventSource for EventQueue {
    fn poll_event(&mut self) -> Option<TransportEvent> {
        self.events.borrow_mut().pop_front()
    }
}
