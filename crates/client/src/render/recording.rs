// Recording surface - replays the transform stack so tests can check where
// things land and in which order
use super::Surface;
use crate::atlas::{Frame, SpriteId};
use glam::{DAffine2, DVec2};

#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Rect {
        /// Canvas-space top-left corner.
        origin: DVec2,
        /// Local units, before scaling.
        size: DVec2,
        color: String,
        alpha: f64,
    },
    Image {
        frame: Frame,
        /// Local destination rectangle.
        dest: DVec2,
        size: DVec2,
        transform: DAffine2,
        /// Uniform scale in effect.
        scale: f64,
        alpha: f64,
    },
    Text {
        text: String,
        at: DVec2,
        alpha: f64,
    },
}

impl Op {
    pub fn alpha(&self) -> f64 {
        match self {
            Op::Rect { alpha, .. } | Op::Image { alpha, .. } | Op::Text { alpha, .. } => *alpha,
        }
    }

    /// Canvas-space center of a drawn image.
    pub fn image_center(&self) -> Option<DVec2> {
        match self {
            Op::Image {
                dest,
                size,
                transform,
                ..
            } => Some(transform.transform_point2(*dest + *size / 2.0)),
            _ => None,
        }
    }
}

pub struct RecordingSurface {
    pub ops: Vec<Op>,
    transform: DAffine2,
    alpha: f64,
    stack: Vec<(DAffine2, f64)>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self {
            ops: Vec::new(),
            transform: DAffine2::IDENTITY,
            alpha: 1.0,
            stack: Vec::new(),
        }
    }

    /// Unmatched `save` calls.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Positions of every image op drawn from `sprite`.
    pub fn indices_of(&self, sprite: SpriteId) -> Vec<usize> {
        self.ops
            .iter()
            .enumerate()
            .filter_map(|(i, op)| match op {
                Op::Image { frame, .. } if frame.sprite == sprite => Some(i),
                _ => None,
            })
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn save(&mut self) {
        self.stack.push((self.transform, self.alpha));
    }

    fn restore(&mut self) {
        if let Some((transform, alpha)) = self.stack.pop() {
            self.transform = transform;
            self.alpha = alpha;
        }
    }

    fn translate(&mut self, x: f64, y: f64) {
        self.transform = self.transform * DAffine2::from_translation(DVec2::new(x, y));
    }

    fn rotate(&mut self, radians: f64) {
        self.transform = self.transform * DAffine2::from_angle(radians);
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        self.transform = self.transform * DAffine2::from_scale(DVec2::new(sx, sy));
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.alpha = alpha;
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: &str) {
        self.ops.push(Op::Rect {
            origin: self.transform.transform_point2(DVec2::new(x, y)),
            size: DVec2::new(width, height),
            color: color.to_string(),
            alpha: self.alpha,
        });
    }

    fn draw_frame(&mut self, frame: &Frame, dx: f64, dy: f64, dw: f64, dh: f64) {
        self.ops.push(Op::Image {
            frame: *frame,
            dest: DVec2::new(dx, dy),
            size: DVec2::new(dw, dh),
            transform: self.transform,
            scale: self.transform.matrix2.x_axis.length(),
            alpha: self.alpha,
        });
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, _font: &str, _color: &str) {
        self.ops.push(Op::Text {
            text: text.to_string(),
            at: self.transform.transform_point2(DVec2::new(x, y)),
            alpha: self.alpha,
        });
    }
}
