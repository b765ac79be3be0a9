//! Typed arena snapshot, one per server message.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::{ProtocolError, columnar};

/// Width of the arena coordinate space. Positions arrive in pixels, `0..=1000`.
pub const ARENA_WIDTH: f32 = 1000.0;
/// Height of the arena coordinate space.
pub const ARENA_HEIGHT: f32 = 1000.0;

/// One complete state of the battle. Superseded wholesale by the next one.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ArenaSnapshot {
    /// Always sent, empty while the arena is a placeholder.
    pub robots: Vec<Robot>,
    pub missiles: Vec<Missile>,
    /// Present only once the battle has concluded.
    #[serde(default)]
    pub winner: Option<String>,
    /// Simulation ticks left in the match.
    #[serde(default)]
    pub remaining: Option<u32>,
}

impl ArenaSnapshot {
    /// The server streams an empty arena while a match is still gathering players.
    pub fn is_placeholder(&self) -> bool {
        self.robots.is_empty() && self.missiles.is_empty() && self.winner.is_none()
    }
}

/// Arena position in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl From<Position> for glam::Vec2 {
    fn from(p: Position) -> Self {
        glam::Vec2::new(p.x, p.y)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Robot {
    pub name: String,
    pub position: Position,
    /// Heading in degrees. Older servers call it `tank_angle`.
    #[serde(default, alias = "tank_angle")]
    pub hull_angle: f32,
    /// Degrees, relative to the hull.
    #[serde(default)]
    pub turret_angle: f32,
    /// Percentage, 0-100.
    #[serde(default = "full_health")]
    pub health: f32,
    #[serde(default)]
    pub velocity: f32,
    /// Ticks since the last shot, cleared once the recoil animation is over.
    #[serde(default)]
    pub firing_progress: Option<u32>,
    #[serde(default, deserialize_with = "flag")]
    pub fired: bool,
}

impl Robot {
    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    pub fn is_firing(&self) -> bool {
        self.fired || self.firing_progress.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Missile {
    pub position: Position,
    /// Degrees.
    #[serde(default)]
    pub angle: f32,
    #[serde(default)]
    pub energy: f32,
    #[serde(default, deserialize_with = "flag")]
    pub exploding: bool,
    /// Explosion frame chosen by the server. Not guaranteed to be in range.
    #[serde(default)]
    pub explode_progress: i64,
}

fn full_health() -> f32 {
    100.0
}

/// Accepts `true`/`false` as well as the `1`/`0` the server emits.
fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Number(f64),
        Null(()),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Number(n) => n != 0.0,
        Flag::Null(()) => false,
    })
}

/// Parse one text message into a snapshot, undoing the column encoding.
///
/// Anything that is not a record carrying `robots` and `missiles` is a
/// [`ProtocolError::Shape`], so stray messages never stand in for an empty arena.
pub fn decode_snapshot(text: &str) -> Result<ArenaSnapshot, ProtocolError> {
    let raw: Value = serde_json::from_str(text).map_err(ProtocolError::Json)?;
    let rows = columnar::decode(raw)?;
    // serde would also accept the fields as a positional sequence
    if !rows.is_object() {
        return Err(ProtocolError::Shape(serde_json::Error::custom(
            "snapshot must be a record",
        )));
    }
    serde_json::from_value(rows).map_err(ProtocolError::Shape)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Captured from the battle server: two robots, one exploding missile.
    const SERVER_MESSAGE: &str = r#"{"robots":{"name":["pongbot","radarbot"],"position":{"x":[120.5,880],"y":[100,900],"_t":1},"velocity":[1.5,0],"velocity_angle":[0,0],"hull_angle":[90,270.2],"turret_angle":[0,45],"radar_angle":[0,0],"health":[100,0],"weapon_energy":[5,2.1],"radius":[20,20],"radar_ping":[null,312.4],"got_hit":[0,1],"bumped_wall":[0,0],"firing_progress":[null,2],"accelerate_progress":[null,null],"cmd_q_len":[0,0],"_t":1},"missiles":{"position":{"x":[500],"y":[20],"_t":1},"angle":[270],"energy":[2.5],"exploding":[1],"explode_progress":[3],"_t":1},"winner":null,"remaining":5880}"#;

    #[test]
    fn test_decode_server_message() {
        let arena = decode_snapshot(SERVER_MESSAGE).unwrap();
        assert_eq!(arena.robots.len(), 2);
        assert_eq!(arena.remaining, Some(5880));
        assert!(arena.winner.is_none());

        let pong = &arena.robots[0];
        assert_eq!(pong.name, "pongbot");
        assert_eq!(pong.position, Position::new(120.5, 100.0));
        assert_eq!(pong.hull_angle, 90.0);
        assert!(pong.is_alive());
        assert!(!pong.is_firing());

        let radar = &arena.robots[1];
        assert_eq!(radar.turret_angle, 45.0);
        assert!(!radar.is_alive());
        assert_eq!(radar.firing_progress, Some(2));
        assert!(radar.is_firing());

        let missile = &arena.missiles[0];
        assert!(missile.exploding);
        assert_eq!(missile.explode_progress, 3);
        assert_eq!(missile.energy, 2.5);
    }

    #[test]
    fn test_placeholder_arena() {
        let arena =
            decode_snapshot(r#"{"robots":[],"missiles":[],"winner":null,"remaining":6000}"#).unwrap();
        assert!(arena.is_placeholder());
    }

    #[test]
    fn test_row_oriented_legacy_message() {
        let text = r#"{"robots":[{"name":"tank","position":{"x":1,"y":2},"tank_angle":30,"turret_angle":5,"health":80,"velocity":2,"fired":true}],"missiles":[],"winner":"tank"}"#;
        let arena = decode_snapshot(text).unwrap();
        assert_eq!(arena.robots[0].hull_angle, 30.0);
        assert!(arena.robots[0].is_firing());
        assert_eq!(arena.winner.as_deref(), Some("tank"));
        assert_eq!(arena.remaining, None);
    }

    #[test]
    fn test_typed_round_trip_through_columns() {
        let arena = decode_snapshot(SERVER_MESSAGE).unwrap();
        let wire = columnar::encode(&serde_json::to_value(&arena).unwrap());
        let again = decode_snapshot(&wire.to_string()).unwrap();
        assert_eq!(again, arena);
    }

    #[test]
    fn test_malformed_text() {
        assert!(matches!(decode_snapshot("{\"robots\":"), Err(ProtocolError::Json(_))));
    }

    #[test]
    fn test_shape_mismatch() {
        let text = r#"{"robots":{"name":[1,2],"_t":1},"missiles":[]}"#;
        assert!(matches!(decode_snapshot(text), Err(ProtocolError::Shape(_))));
    }

    #[test]
    fn test_non_arena_messages_rejected() {
        for text in [
            "{}",
            r#"{"echo":"pongbot is the winner!"}"#,
            r#"{"status":"error"}"#,
            r#"{"robots":[]}"#,
            "[]",
            "[[],[],null,null]",
        ] {
            assert!(
                matches!(decode_snapshot(text), Err(ProtocolError::Shape(_))),
                "accepted {text}"
            );
        }
    }
}
