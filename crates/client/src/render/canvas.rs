// Canvas surface - `Surface` over a 2d context plus the page's sprite images
use super::Surface;
use crate::atlas::{Atlas, Frame, Sprite, SpriteId, SpriteSet};
use crate::config::{AssetConfig, AtlasSource};
use crate::error::ClientError;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlImageElement};

pub struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
    images: Vec<HtmlImageElement>,
}

impl CanvasSurface {
    pub fn new(canvas: &HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or("Failed to get 2d context")?
            .dyn_into::<CanvasRenderingContext2d>()?;
        ctx.set_text_align("center");

        Ok(Self {
            ctx,
            images: Vec::new(),
        })
    }

    /// Register the `<img>` with the given element id. The image must already
    /// be decoded; its natural size is taken as the sprite size.
    pub fn load_sprite(&mut self, document: &Document, element_id: &str) -> Result<Sprite, ClientError> {
        let image = document
            .get_element_by_id(element_id)
            .and_then(|element| element.dyn_into::<HtmlImageElement>().ok())
            .ok_or_else(|| ClientError::MissingAsset(element_id.to_string()))?;

        let sprite = Sprite::new(
            SpriteId(self.images.len()),
            image.natural_width(),
            image.natural_height(),
        );
        self.images.push(image);
        Ok(sprite)
    }

    pub fn load_atlas(&mut self, document: &Document, source: &AtlasSource) -> Result<Atlas, ClientError> {
        match source {
            AtlasSource::Strip { strip } => Ok(Atlas::Strip(self.load_sprite(document, strip)?)),
            AtlasSource::Frames { frames } => frames
                .iter()
                .map(|id| self.load_sprite(document, id))
                .collect::<Result<Vec<_>, _>>()
                .map(Atlas::Frames),
        }
    }

    pub fn load_sprites(&mut self, document: &Document, assets: &AssetConfig) -> Result<SpriteSet, ClientError> {
        Ok(SpriteSet {
            background: self.load_sprite(document, &assets.background)?,
            galaxy: self.load_sprite(document, &assets.galaxy)?,
            hull: self.load_sprite(document, &assets.hull)?,
            turret: self.load_sprite(document, &assets.turret)?,
            barrel: self.load_sprite(document, &assets.barrel)?,
            tracks: [
                self.load_sprite(document, &assets.tracks[0])?,
                self.load_sprite(document, &assets.tracks[1])?,
            ],
            missile: self.load_atlas(document, &assets.missile)?,
            explosion: self.load_atlas(document, &assets.explosion)?,
        })
    }
}

impl Surface for CanvasSurface {
    #[inline]
    fn save(&mut self) {
        self.ctx.save();
    }

    #[inline]
    fn restore(&mut self) {
        self.ctx.restore();
    }

    #[inline]
    fn translate(&mut self, x: f64, y: f64) {
        let _ = self.ctx.translate(x, y);
    }

    #[inline]
    fn rotate(&mut self, radians: f64) {
        let _ = self.ctx.rotate(radians);
    }

    #[inline]
    fn scale(&mut self, sx: f64, sy: f64) {
        let _ = self.ctx.scale(sx, sy);
    }

    #[inline]
    fn set_global_alpha(&mut self, alpha: f64) {
        self.ctx.set_global_alpha(alpha);
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: &str) {
        self.ctx.set_fill_style_str(color);
        self.ctx.fill_rect(x, y, width, height);
    }

    fn draw_frame(&mut self, frame: &Frame, dx: f64, dy: f64, dw: f64, dh: f64) {
        let Some(image) = self.images.get(frame.sprite.0) else {
            return;
        };
        let _ = self
            .ctx
            .draw_image_with_html_image_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                image, frame.sx, frame.sy, frame.sw, frame.sh, dx, dy, dw, dh,
            );
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, font: &str, color: &str) {
        self.ctx.set_font(font);
        self.ctx.set_fill_style_str(color);
        let _ = self.ctx.fill_text(text, x, y);
    }
}
