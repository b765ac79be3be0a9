// Sprite atlases - frame selection for strip and frame-set animations
//
// A strip is a single image holding square frames side by side, so its frame
// count is always `width / height`. A frame set is one image per frame.
use crate::error::ClientError;

/// Handle to an image owned by the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpriteId(pub usize);

/// An image and its natural size in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sprite {
    pub id: SpriteId,
    pub width: u32,
    pub height: u32,
}

impl Sprite {
    pub const fn new(id: SpriteId, width: u32, height: u32) -> Self {
        Self { id, width, height }
    }

    /// The whole image as a single frame.
    pub fn full_frame(&self) -> Frame {
        Frame {
            sprite: self.id,
            sx: 0.0,
            sy: 0.0,
            sw: self.width as f64,
            sh: self.height as f64,
        }
    }

    fn validate(&self, name: &str) -> Result<(), ClientError> {
        if self.width == 0 || self.height == 0 {
            return Err(ClientError::EmptyAsset {
                name: name.to_string(),
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

/// Source rectangle within a sprite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub sprite: SpriteId,
    pub sx: f64,
    pub sy: f64,
    pub sw: f64,
    pub sh: f64,
}

/// `floor(timestamp * rate) mod frame_count`: time-driven animation.
pub fn continuous_frame(timestamp: f64, rate: f64, frame_count: usize) -> usize {
    if frame_count == 0 {
        return 0;
    }
    ((timestamp * rate).floor() as i64).rem_euclid(frame_count as i64) as usize
}

/// Like [`continuous_frame`] but rounding, for velocity-scaled track cycling.
pub fn cyclic_frame(timestamp: f64, rate: f64, frame_count: usize) -> usize {
    if frame_count == 0 {
        return 0;
    }
    ((timestamp * rate).round() as i64).rem_euclid(frame_count as i64) as usize
}

/// `clamp(progress, 0, frame_count - 1)`: event-driven animation.
pub fn discrete_frame(progress: i64, frame_count: usize) -> usize {
    if frame_count == 0 {
        return 0;
    }
    progress.clamp(0, frame_count as i64 - 1) as usize
}

#[derive(Debug, Clone, PartialEq)]
pub enum Atlas {
    Strip(Sprite),
    Frames(Vec<Sprite>),
}

impl Atlas {
    pub fn frame_count(&self) -> usize {
        match self {
            Atlas::Strip(sprite) if sprite.height > 0 => (sprite.width / sprite.height) as usize,
            Atlas::Strip(_) => 0,
            Atlas::Frames(frames) => frames.len(),
        }
    }

    /// Frame rectangle for `index`, wrapped into range.
    pub fn frame(&self, index: usize) -> Option<Frame> {
        let count = self.frame_count();
        if count == 0 {
            return None;
        }
        let index = index % count;
        match self {
            Atlas::Strip(sprite) => {
                let side = sprite.height as f64;
                Some(Frame {
                    sprite: sprite.id,
                    sx: index as f64 * side,
                    sy: 0.0,
                    sw: side,
                    sh: side,
                })
            }
            Atlas::Frames(frames) => frames.get(index).map(Sprite::full_frame),
        }
    }

    pub fn continuous(&self, timestamp: f64, rate: f64) -> Option<Frame> {
        self.frame(continuous_frame(timestamp, rate, self.frame_count()))
    }

    pub fn discrete(&self, progress: i64) -> Option<Frame> {
        self.frame(discrete_frame(progress, self.frame_count()))
    }

    fn validate(&self, name: &str) -> Result<(), ClientError> {
        match self {
            Atlas::Strip(sprite) => sprite.validate(name)?,
            Atlas::Frames(frames) => {
                for (i, sprite) in frames.iter().enumerate() {
                    sprite.validate(&format!("{}[{}]", name, i))?;
                }
            }
        }
        if self.frame_count() == 0 {
            return Err(ClientError::EmptyAtlas(name.to_string()));
        }
        Ok(())
    }
}

/// Every image the scene needs. Must validate before the first frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteSet {
    pub background: Sprite,
    pub galaxy: Sprite,
    pub hull: Sprite,
    pub turret: Sprite,
    pub barrel: Sprite,
    pub tracks: [Sprite; 2],
    pub missile: Atlas,
    pub explosion: Atlas,
}

impl SpriteSet {
    pub fn validate(&self) -> Result<(), ClientError> {
        self.background.validate("background")?;
        self.galaxy.validate("galaxy")?;
        self.hull.validate("hull")?;
        self.turret.validate("turret")?;
        self.barrel.validate("barrel")?;
        self.tracks[0].validate("tracks[0]")?;
        self.tracks[1].validate("tracks[1]")?;
        self.missile.validate("missile")?;
        self.explosion.validate("explosion")
    }
}
