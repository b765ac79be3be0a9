// Parallax starfield - fixed pool of receding points with perspective divide
use super::Surface;
use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const STAR_COUNT: usize = 2000;

/// Fresh stars start somewhere in `(MIN_DEPTH, 1]`.
const MIN_DEPTH: f32 = 0.05;
/// Edge length of a star at depth 1, in canvas units.
const STAR_SIZE: f64 = 1.0;
/// Opacity of a star at depth 1.
const STAR_ALPHA: f64 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Star {
    /// Planar position in the centered unit square `[-1, 1]²`.
    pub position: Vec2,
    pub depth: f32,
}

pub struct Starfield {
    stars: Vec<Star>,
    rng: StdRng,
    depth_step: f32,
    replaced: u64,
}

impl Starfield {
    pub fn new(seed: u64, depth_step: f32) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let stars = (0..STAR_COUNT).map(|_| random_star(&mut rng)).collect();
        Self {
            stars,
            rng,
            depth_step,
            replaced: 0,
        }
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }

    /// Total stars recycled since creation.
    pub fn replaced(&self) -> u64 {
        self.replaced
    }

    /// Move every star one step closer. Stars reaching the viewer are
    /// respawned in place so the pool never shrinks.
    pub fn advance(&mut self) {
        for star in &mut self.stars {
            star.depth -= self.depth_step;
            if star.depth <= 0.0 {
                *star = random_star(&mut self.rng);
                self.replaced += 1;
            }
        }
    }

    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S, width: f64, height: f64) {
        let center = Vec2::new(width as f32 / 2.0, height as f32 / 2.0);
        for star in &self.stars {
            let screen = center + star.position / star.depth * center;
            let (x, y) = (screen.x as f64, screen.y as f64);
            if x < 0.0 || y < 0.0 || x >= width || y >= height {
                continue;
            }
            let depth = star.depth as f64;
            let size = STAR_SIZE / depth;
            let alpha = (STAR_ALPHA / depth).min(1.0);
            surface.fill_rect(
                x - size / 2.0,
                y - size / 2.0,
                size,
                size,
                &format!("rgba(255, 255, 255, {:.3})", alpha),
            );
        }
    }
}

fn random_star(rng: &mut StdRng) -> Star {
    Star {
        position: Vec2::new(rng.random_range(-1.0..=1.0), rng.random_range(-1.0..=1.0)),
        depth: rng.random_range(MIN_DEPTH..=1.0),
    }
}
