// Browser driver - wires the session to a WebSocket, rAF and setTimeout
//
// Open, close and error events go straight to the session so reconnects are
// scheduled even while rAF is suspended in a background tab. Messages are
// queued (only the newest is kept) and decoded by the frame callback, which
// then draws. A frame is only requested when something arrived, and at most
// one is pending.
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::game::{ArenaClient, Effect};
use crate::network::{Endpoint, EventQueue, TransportEvent};
use crate::render::canvas::CanvasSurface;
use crate::utils;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;
use tracing::{error, info, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CloseEvent, HtmlCanvasElement, MessageEvent, WebSocket};

struct Shared {
    client: RefCell<ArenaClient<CanvasSurface>>,
    queue: EventQueue,
    socket: RefCell<Option<WebSocket>>,
    /// Callbacks installed on `socket`, freed when it is detached.
    handlers: RefCell<Option<SocketHandlers>>,
    frame_pending: Cell<bool>,
    frame_callback: RefCell<Option<Closure<dyn FnMut(f64)>>>,
}

/// Spectator view of a live battle, drawn into the configured canvas.
///
/// Construct it once the page has loaded so every sprite `<img>` is decoded:
///
/// ```js
/// window.onload = () => { viewer = new ArenaViewer({ match_id: 3 }); };
/// ```
struct SocketHandlers {
    _onopen: Closure<dyn FnMut(JsValue)>,
    _onmessage: Closure<dyn FnMut(MessageEvent)>,
    _onclose: Closure<dyn FnMut(CloseEvent)>,
    _onerror: Closure<dyn FnMut(JsValue)>,
}

#[wasm_bindgen]
pub struct ArenaViewer {
    shared: Rc<Shared>,
}

#[wasm_bindgen]
impl ArenaViewer {
    /// `options` is a partial `ClientConfig`; `undefined` keeps every default.
    #[wasm_bindgen(constructor)]
    pub fn new(options: JsValue) -> Result<ArenaViewer, JsValue> {
        utils::init_logging();

        let config: ClientConfig = if options.is_undefined() || options.is_null() {
            ClientConfig::default()
        } else {
            serde_wasm_bindgen::from_value(options)?
        };

        let window = web_sys::window().ok_or("No window")?;
        let document = window.document().ok_or("No document")?;
        let canvas = document
            .get_element_by_id(&config.assets.canvas)
            .ok_or_else(|| fatal(ClientError::MissingAsset(config.assets.canvas.clone())))?
            .dyn_into::<HtmlCanvasElement>()?;

        let mut surface = CanvasSurface::new(&canvas)?;
        let sprites = surface
            .load_sprites(&document, &config.assets)
            .map_err(fatal)?;

        let location = window.location();
        let endpoint = Endpoint::from_page(
            &location.protocol()?,
            &location.host()?,
            config.endpoint_path(),
        );
        let seed = (js_sys::Math::random() * u64::MAX as f64) as u64;
        let client = ArenaClient::new(&config, endpoint.url(), sprites, surface, seed)
            .map_err(fatal)?;

        let shared = Rc::new(Shared {
            client: RefCell::new(client),
            queue: EventQueue::new(),
            socket: RefCell::new(None),
            handlers: RefCell::new(None),
            frame_pending: Cell::new(false),
            frame_callback: RefCell::new(None),
        });
        install_frame_callback(&shared);

        let effect = shared.client.borrow_mut().start();
        if let Some(effect) = effect {
            apply(&shared, effect);
        }

        Ok(ArenaViewer { shared })
    }

    /// Stop drawing and close the socket for good.
    pub fn stop(&self) {
        self.shared.client.borrow_mut().stop();
        if let Some(socket) = detach(&self.shared) {
            let _ = socket.close();
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.shared.client.borrow().is_stopped()
    }

    /// Messages dropped because they could not be decoded.
    pub fn dropped_messages(&self) -> f64 {
        self.shared.client.borrow().connection().dropped_messages() as f64
    }
}

/// Log a startup failure and turn it into the JS exception.
fn fatal(e: ClientError) -> JsValue {
    error!(error = %e, "Viewer cannot start");
    JsValue::from_str(&e.to_string())
}

fn apply(shared: &Rc<Shared>, effect: Effect) {
    match effect {
        Effect::Connect(url) => open_socket(shared, &url),
        Effect::ScheduleReconnect(delay) => schedule_reconnect(shared, delay),
        Effect::RequestFrame => request_frame(shared),
    }
}

fn install_frame_callback(shared: &Rc<Shared>) {
    let weak = Rc::downgrade(shared);
    let callback = Closure::wrap(Box::new(move |timestamp: f64| {
        let Some(shared) = weak.upgrade() else {
            return;
        };
        shared.frame_pending.set(false);

        // The queue may only be drained here, where nothing else holds the session
        let effects = {
            let mut client = shared.client.borrow_mut();
            let effects = client.pump(&mut shared.queue.clone());
            client.tick(timestamp);
            effects
        };

        for effect in effects {
            // This frame already drew the newest snapshot
            if effect != Effect::RequestFrame {
                apply(&shared, effect);
            }
        }
    }) as Box<dyn FnMut(f64)>);
    *shared.frame_callback.borrow_mut() = Some(callback);
}

fn request_frame(shared: &Shared) {
    if shared.frame_pending.get() {
        return;
    }
    if let Ok(client) = shared.client.try_borrow() {
        if client.is_stopped() {
            return;
        }
    }
    let Some(window) = web_sys::window() else {
        return;
    };
    if let Some(callback) = shared.frame_callback.borrow().as_ref() {
        if window
            .request_animation_frame(callback.as_ref().unchecked_ref())
            .is_ok()
        {
            shared.frame_pending.set(true);
        }
    }
}

/// Queue a message and make sure a frame will decode it.
fn enqueue(weak: &Weak<Shared>, event: TransportEvent) {
    if let Some(shared) = weak.upgrade() {
        shared.queue.push(event);
        request_frame(&shared);
    }
}

/// Hand a connection event to the session now, without waiting for a frame.
fn dispatch(weak: &Weak<Shared>, event: TransportEvent) {
    let Some(shared) = weak.upgrade() else {
        return;
    };
    let effect = match shared.client.try_borrow_mut() {
        Ok(mut client) => client.handle_event(event),
        Err(_) => {
            // The frame callback holds the session; it drains the queue next
            shared.queue.push(event);
            request_frame(&shared);
            return;
        }
    };
    if let Some(effect) = effect {
        apply(&shared, effect);
    }
}

/// Unhook the current socket and free its callbacks.
///
/// Never called from inside one of those callbacks: they only ever schedule a
/// reconnect, and the new socket is opened from the timer.
fn detach(shared: &Shared) -> Option<WebSocket> {
    let socket = shared.socket.borrow_mut().take();
    if let Some(socket) = &socket {
        socket.set_onopen(None);
        socket.set_onmessage(None);
        socket.set_onclose(None);
        socket.set_onerror(None);
    }
    shared.handlers.borrow_mut().take();
    socket
}

fn open_socket(shared: &Rc<Shared>, url: &str) {
    // Late events from the old socket must not reach the new connection's state
    if let Some(old) = detach(shared) {
        let _ = old.close();
    }

    let weak = Rc::downgrade(shared);
    let socket = match WebSocket::new(url) {
        Ok(socket) => socket,
        Err(e) => {
            dispatch(&weak, TransportEvent::Error(format!("{:?}", e)));
            return;
        }
    };

    let on_open = weak.clone();
    let onopen = Closure::wrap(Box::new(move |_event: JsValue| {
        dispatch(&on_open, TransportEvent::Open);
    }) as Box<dyn FnMut(JsValue)>);
    socket.set_onopen(Some(onopen.as_ref().unchecked_ref()));

    let on_message = weak.clone();
    let onmessage = Closure::wrap(Box::new(move |event: MessageEvent| {
        match event.data().as_string() {
            Some(text) => enqueue(&on_message, TransportEvent::Message(text)),
            None => warn!("Ignoring non-text message"),
        }
    }) as Box<dyn FnMut(MessageEvent)>);
    socket.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));

    let on_close = weak.clone();
    let onclose = Closure::wrap(Box::new(move |event: CloseEvent| {
        dispatch(&on_close, TransportEvent::Closed { code: event.code() });
    }) as Box<dyn FnMut(CloseEvent)>);
    socket.set_onclose(Some(onclose.as_ref().unchecked_ref()));

    let on_error = weak;
    let onerror = Closure::wrap(Box::new(move |_event: JsValue| {
        dispatch(&on_error, TransportEvent::Error("WebSocket error".to_string()));
    }) as Box<dyn FnMut(JsValue)>);
    socket.set_onerror(Some(onerror.as_ref().unchecked_ref()));

    *shared.socket.borrow_mut() = Some(socket);
    *shared.handlers.borrow_mut() = Some(SocketHandlers {
        _onopen: onopen,
        _onmessage: onmessage,
        _onclose: onclose,
        _onerror: onerror,
    });
}

fn schedule_reconnect(shared: &Rc<Shared>, delay: Duration) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let weak = Rc::downgrade(shared);
    // Freed by wasm-bindgen once it has run
    let callback = Closure::once_into_js(move || {
        let Some(shared) = weak.upgrade() else {
            return;
        };
        let effect = match shared.client.try_borrow_mut() {
            Ok(mut client) => client.reconnect_due(),
            Err(_) => {
                info!("Reconnect deferred: client busy");
                schedule_reconnect(&shared, delay);
                return;
            }
        };
        if let Some(effect) = effect {
            apply(&shared, effect);
        }
    });
    let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
        callback.unchecked_ref(),
        delay.as_millis() as i32,
    );
}
