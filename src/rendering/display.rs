//! # Display Management
//!
//! Macroquad-backed [`Renderer`] used by the game binary.

use crate::game::Rect;
use crate::rendering::{BackendError, DrawParams, Flip, Renderer, TextureId};
use macroquad::color::WHITE;
use macroquad::math::{vec2, Rect as QuadRect};
use macroquad::texture::{draw_texture_ex, DrawTextureParams, Image, Texture2D};
use std::collections::HashMap;
use std::path::Path;

/// Macroquad renderer.
///
/// Textures are decoded from file bytes and kept here, keyed by handle, so that
/// they are only ever touched from the macroquad thread.
#[derive(Default)]
pub struct MacroquadRenderer {
    textures: HashMap<TextureId, Texture2D>,
    next_texture: u32,
}

impl MacroquadRenderer {
    /// Creates a renderer with no textures loaded.
    pub fn new() -> Self {
        Self::default()
    }

    fn to_quad_rect(rect: Rect) -> QuadRect {
        QuadRect::new(
            rect.x as f32,
            rect.y as f32,
            rect.w as f32,
            rect.h as f32,
        )
    }
}

impl Renderer for MacroquadRenderer {
    fn load_texture(&mut self, path: &Path) -> Result<TextureId, BackendError> {
        let bytes = std::fs::read(path)
            .map_err(|e| BackendError::new(format!("{}: {}", path.display(), e)))?;
        let image = Image::from_file_with_format(&bytes, None)
            .map_err(|e| BackendError::new(format!("{}: {}", path.display(), e)))?;

        let id = TextureId(self.next_texture);
        self.next_texture += 1;
        self.textures.insert(id, Texture2D::from_image(&image));
        Ok(id)
    }

    fn copy_ex(&mut self, texture: TextureId, params: &DrawParams) -> Result<(), BackendError> {
        let quad_texture = self
            .textures
            .get(&texture)
            .ok_or_else(|| BackendError::new(format!("texture {} is not loaded", texture.0)))?;

        let dest = params.dest;
        draw_texture_ex(
            quad_texture,
            dest.x as f32,
            dest.y as f32,
            WHITE,
            DrawTextureParams {
                dest_size: Some(vec2(dest.w as f32, dest.h as f32)),
                source: params.source.map(Self::to_quad_rect),
                rotation: params.rotation.to_radians() as f32,
                flip_x: params.flip == Flip::Horizontal,
                flip_y: params.flip == Flip::Vertical,
                pivot: params.center.map(|c| vec2(c.x as f32, c.y as f32)),
                ..Default::default()
            },
        );
        Ok(())
    }

    fn destroy_texture(&mut self, texture: TextureId) {
        // Dropping the last handle frees the GPU texture
        self.textures.remove(&texture);
    }
}
