// Scene rendering - layered arena frame from one snapshot
//
// Layers, back to front: background and galaxy, starfield, every hull with its
// tracks and label, every turret, missiles and explosions, winner banner.
// Turrets get their own pass so a neighbour's hull never covers them.
use crate::atlas::{Frame, SpriteSet, cyclic_frame};
use crate::config::RenderConfig;
use crate::error::ClientError;
use protocol::{ARENA_HEIGHT, ARENA_WIDTH, ArenaSnapshot, Missile, Robot};
use std::f64::consts::FRAC_PI_2;

#[cfg(target_arch = "wasm32")]
pub mod canvas;
#[cfg(test)]
pub(crate) mod recording;
pub mod starfield;

pub use starfield::{STAR_COUNT, Starfield};

/// Minimal 2-D context the scene is drawn through. Mirrors the subset of
/// `CanvasRenderingContext2d` in use; `save`/`restore` cover the transform
/// and global alpha.
pub trait Surface {
    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, x: f64, y: f64);
    fn rotate(&mut self, radians: f64);
    fn scale(&mut self, sx: f64, sy: f64);
    fn set_global_alpha(&mut self, alpha: f64);
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: &str);
    /// Draw the `frame` source rectangle into the destination rectangle.
    fn draw_frame(&mut self, frame: &Frame, dx: f64, dy: f64, dw: f64, dh: f64);
    /// Text horizontally centered on `x`.
    fn fill_text(&mut self, text: &str, x: f64, y: f64, font: &str, color: &str);
}

/// Label sits this many hull heights away from the robot's center.
const LABEL_OFFSET: f64 = 0.75;
/// Tracks are inset from the hull edge by this fraction of the hull width.
const TRACK_INSET: f64 = 0.38;
/// Missiles and explosions are drawn at half the robot sprite scale.
const MISSILE_SCALE: f64 = 0.5;
/// Smallest share of full size a zero-energy missile keeps.
const MISSILE_MIN_SIZE: f64 = 0.01;

pub struct Renderer {
    sprites: SpriteSet,
    config: RenderConfig,
}

impl Renderer {
    /// Fails when any sprite is unusable; nothing is drawn until all are.
    pub fn new(sprites: SpriteSet, config: RenderConfig) -> Result<Self, ClientError> {
        sprites.validate()?;
        Ok(Self { sprites, config })
    }

    pub fn sprites(&self) -> &SpriteSet {
        &self.sprites
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// One complete frame. `timestamp` is the display-refresh time in
    /// milliseconds; the starfield advances one step per call.
    pub fn draw<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        snapshot: &ArenaSnapshot,
        timestamp: f64,
        starfield: &mut Starfield,
    ) {
        let width = ARENA_WIDTH as f64;
        let height = ARENA_HEIGHT as f64;

        surface.set_global_alpha(1.0);
        surface.fill_rect(0.0, 0.0, width, height, "black");
        self.draw_background(surface, width, height);

        starfield.advance();
        starfield.draw(surface, width, height);

        for robot in &snapshot.robots {
            self.draw_hull(surface, robot, timestamp);
        }
        for robot in &snapshot.robots {
            self.draw_turret(surface, robot);
        }
        for missile in &snapshot.missiles {
            self.draw_missile(surface, missile, timestamp);
        }

        if let Some(winner) = &snapshot.winner {
            surface.fill_text(
                &format!("Winner {}!", winner),
                width / 2.0,
                height / 2.0,
                &self.config.banner_font,
                &self.config.banner_color,
            );
        }
    }

    fn draw_background<S: Surface + ?Sized>(&self, surface: &mut S, width: f64, height: f64) {
        let background = &self.sprites.background;
        surface.draw_frame(&background.full_frame(), 0.0, 0.0, width, height);

        let galaxy = &self.sprites.galaxy;
        let (gw, gh) = (galaxy.width as f64, galaxy.height as f64);
        surface.draw_frame(
            &galaxy.full_frame(),
            (width - gw) / 2.0,
            (height - gh) / 2.0,
            gw,
            gh,
        );
    }

    fn robot_alpha(&self, robot: &Robot) -> f64 {
        if robot.is_alive() {
            1.0
        } else {
            self.config.ghost_alpha
        }
    }

    fn draw_hull<S: Surface + ?Sized>(&self, surface: &mut S, robot: &Robot, timestamp: f64) {
        let hull = &self.sprites.hull;
        let (hw, hh) = (hull.width as f64, hull.height as f64);
        let (x, y) = (robot.position.x as f64, robot.position.y as f64);
        let scale = self.config.sprite_scale;

        surface.save();
        surface.set_global_alpha(self.robot_alpha(robot));
        surface.translate(x, y);
        surface.scale(scale, scale);

        // Upper half gets its label below the hull, lower half above it
        let side = if y < ARENA_HEIGHT as f64 / 2.0 { 1.0 } else { -1.0 };
        surface.fill_text(
            &format!("{} ({}%)", robot.name, robot.health),
            0.0,
            hh * LABEL_OFFSET * side,
            &self.config.label_font,
            &self.config.label_color,
        );

        surface.rotate(FRAC_PI_2 + (robot.hull_angle as f64).to_radians());

        let rate = self.config.track_frames_per_second / 1000.0 * robot.velocity as f64;
        let track = &self.sprites.tracks[cyclic_frame(timestamp, rate, 2)];
        let (tw, th) = (track.width as f64, track.height as f64);
        surface.draw_frame(&track.full_frame(), -hw * TRACK_INSET, -th / 2.0, tw, th);
        surface.draw_frame(&track.full_frame(), hw * TRACK_INSET - tw, -th / 2.0, tw, th);
        surface.draw_frame(&hull.full_frame(), -hw / 2.0, -hh / 2.0, hw, hh);

        surface.restore();
    }

    fn draw_turret<S: Surface + ?Sized>(&self, surface: &mut S, robot: &Robot) {
        let turret = &self.sprites.turret;
        let barrel = &self.sprites.barrel;
        let (tw, th) = (turret.width as f64, turret.height as f64);
        let (bw, bh) = (barrel.width as f64, barrel.height as f64);
        let scale = self.config.sprite_scale;

        surface.save();
        surface.set_global_alpha(self.robot_alpha(robot));
        surface.translate(robot.position.x as f64, robot.position.y as f64);
        surface.scale(scale, scale);
        surface.rotate(FRAC_PI_2 + ((robot.hull_angle + robot.turret_angle) as f64).to_radians());
        if robot.is_firing() {
            surface.translate(0.0, -self.config.recoil_offset);
        }
        surface.draw_frame(&turret.full_frame(), -tw / 2.0, -th / 2.0, tw, th);
        surface.draw_frame(&barrel.full_frame(), -bw / 2.0, -bh / 2.0 - th, bw, bh);
        surface.restore();
    }

    /// Live shells shrink with their remaining energy and face their heading.
    /// Explosions are drawn unrotated at the fixed base scale, whatever energy
    /// the missile had left, so a spent shell still gets a full-size blast.
    fn draw_missile<S: Surface + ?Sized>(&self, surface: &mut S, missile: &Missile, timestamp: f64) {
        let base = self.config.sprite_scale * MISSILE_SCALE;
        let (frame, scale, angle) = if missile.exploding {
            (self.sprites.explosion.discrete(missile.explode_progress), base, None)
        } else {
            let rate = self.config.missile_frames_per_second / 1000.0;
            let energy = (missile.energy as f64).max(0.0);
            let scale = base * (MISSILE_MIN_SIZE + (1.0 - MISSILE_MIN_SIZE) * energy);
            (self.sprites.missile.continuous(timestamp, rate), scale, Some(missile.angle))
        };
        let Some(frame) = frame else {
            return;
        };

        surface.save();
        surface.translate(missile.position.x as f64, missile.position.y as f64);
        surface.scale(scale, scale);
        if let Some(angle) = angle {
            surface.rotate(FRAC_PI_2 + (angle as f64).to_radians());
        }
        surface.draw_frame(&frame, -frame.sw / 2.0, -frame.sh / 2.0, frame.sw, frame.sh);
        surface.restore();
    }
}
