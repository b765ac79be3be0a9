// Live arena viewer
// Decodes the battle server's snapshot stream and draws it onto a canvas. The
// session logic is platform-independent; the browser driver is wasm32-only.

// Module structure - each module handles a specific concern
pub mod atlas; // Sprite frame selection for strips and frame sets
pub mod config; // Endpoint, reconnect and render settings
mod error; // Client error type
pub mod game; // Session context tying the pieces together
pub mod network; // Connection lifecycle and reconnect policy
pub mod render; // Drawing surface trait, scene layers, starfield
pub mod scheduler; // One draw pass per refresh tick
#[cfg(target_arch = "wasm32")]
mod utils; // Console log sink
#[cfg(target_arch = "wasm32")]
mod viewer; // WebSocket, rAF and timer wiring

pub use error::ClientError;
pub use game::{ArenaClient, Effect};
pub use network::{Action, ConnectionManager, ConnectionState, Endpoint, TransportEvent};

#[cfg(target_arch = "wasm32")]
pub use viewer::ArenaViewer;

/// Initialize panic hook for better error messages in the browser console
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}
