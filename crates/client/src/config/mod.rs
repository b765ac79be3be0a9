// Viewer configuration - endpoint, reconnect policy, render tuning, asset ids
//
// Every field has a default so a partial TOML table or JS options object is
// enough; missing keys fall back to the values the battle server expects.
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientConfig {
    /// Delay before each reconnection attempt, in milliseconds.
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
    /// Live-state endpoint path.
    #[serde(default = "default_watch_path")]
    pub watch_path: String,
    /// Appended to `watch_path` when set (`/api/watch/<id>`).
    #[serde(default)]
    pub match_id: Option<u32>,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub assets: AssetConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            reconnect_delay_ms: default_reconnect_delay_ms(),
            watch_path: default_watch_path(),
            match_id: None,
            render: RenderConfig::default(),
            assets: AssetConfig::default(),
        }
    }
}

impl ClientConfig {
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    /// Endpoint path including the optional match id.
    pub fn endpoint_path(&self) -> String {
        let base = self.watch_path.trim_end_matches('/');
        match self.match_id {
            Some(id) => format!("{}/{}", base, id),
            None => base.to_string(),
        }
    }
}

/// Scene tuning. Rates are per second of display time.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RenderConfig {
    /// Scale applied to robot and missile sprites.
    #[serde(default = "default_sprite_scale")]
    pub sprite_scale: f64,
    /// Track frame changes per second, per unit of robot velocity.
    #[serde(default = "default_track_fps")]
    pub track_frames_per_second: f64,
    /// Missile strip frames per second.
    #[serde(default = "default_missile_fps")]
    pub missile_frames_per_second: f64,
    /// Depth every star loses per rendered frame.
    #[serde(default = "default_star_depth_step")]
    pub star_depth_step: f32,
    /// Opacity of destroyed robots.
    #[serde(default = "default_ghost_alpha")]
    pub ghost_alpha: f64,
    /// Forward turret shift while firing, in unscaled sprite pixels.
    #[serde(default = "default_recoil_offset")]
    pub recoil_offset: f64,
    #[serde(default = "default_label_font")]
    pub label_font: String,
    #[serde(default = "default_label_color")]
    pub label_color: String,
    #[serde(default = "default_banner_font")]
    pub banner_font: String,
    #[serde(default = "default_banner_color")]
    pub banner_color: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            sprite_scale: default_sprite_scale(),
            track_frames_per_second: default_track_fps(),
            missile_frames_per_second: default_missile_fps(),
            star_depth_step: default_star_depth_step(),
            ghost_alpha: default_ghost_alpha(),
            recoil_offset: default_recoil_offset(),
            label_font: default_label_font(),
            label_color: default_label_color(),
            banner_font: default_banner_font(),
            banner_color: default_banner_color(),
        }
    }
}

/// DOM element ids of the sprites supplied by the hosting page.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AssetConfig {
    #[serde(default = "default_canvas")]
    pub canvas: String,
    #[serde(default = "default_background")]
    pub background: String,
    #[serde(default = "default_galaxy")]
    pub galaxy: String,
    #[serde(default = "default_hull")]
    pub hull: String,
    #[serde(default = "default_turret")]
    pub turret: String,
    #[serde(default = "default_barrel")]
    pub barrel: String,
    #[serde(default = "default_tracks")]
    pub tracks: [String; 2],
    #[serde(default = "default_missile")]
    pub missile: AtlasSource,
    #[serde(default = "default_explosion")]
    pub explosion: AtlasSource,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            canvas: default_canvas(),
            background: default_background(),
            galaxy: default_galaxy(),
            hull: default_hull(),
            turret: default_turret(),
            barrel: default_barrel(),
            tracks: default_tracks(),
            missile: default_missile(),
            explosion: default_explosion(),
        }
    }
}

/// Where an animation's frames come from.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum AtlasSource {
    /// One horizontal strip of square frames.
    Strip { strip: String },
    /// One element per frame.
    Frames { frames: Vec<String> },
}

fn default_reconnect_delay_ms() -> u64 {
    1000
}

fn default_watch_path() -> String {
    "/api/watch".to_string()
}

fn default_sprite_scale() -> f64 {
    0.33
}

fn default_track_fps() -> f64 {
    3.0
}

fn default_missile_fps() -> f64 {
    12.0
}

fn default_star_depth_step() -> f32 {
    0.005
}

fn default_ghost_alpha() -> f64 {
    0.35
}

fn default_recoil_offset() -> f64 {
    4.0
}

fn default_label_font() -> String {
    "50px monospace".to_string()
}

fn default_label_color() -> String {
    "red".to_string()
}

fn default_banner_font() -> String {
    "50px monospace".to_string()
}

fn default_banner_color() -> String {
    "red".to_string()
}

fn default_canvas() -> String {
    "canvas".to_string()
}

fn default_background() -> String {
    "background".to_string()
}

fn default_galaxy() -> String {
    "galaxy".to_string()
}

fn default_hull() -> String {
    "hull1".to_string()
}

fn default_turret() -> String {
    "gun1B".to_string()
}

fn default_barrel() -> String {
    "gun1A".to_string()
}

fn default_tracks() -> [String; 2] {
    ["track1A".to_string(), "track1B".to_string()]
}

fn default_missile() -> AtlasSource {
    AtlasSource::Frames {
        frames: vec!["lightShell".to_string()],
    }
}

fn default_explosion() -> AtlasSource {
    AtlasSource::Frames {
        frames: (0..8).map(|i| format!("explosion{}", i)).collect(),
    }
}
