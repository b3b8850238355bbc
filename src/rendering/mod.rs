//! # Rendering Module
//!
//! Renderer abstraction used by obstacles, plus the dispatcher that keeps every
//! graphics call on the thread owning the graphics context.

pub mod dispatch;
pub mod display;
pub mod recording;

pub use dispatch::*;
pub use display::*;
pub use recording::*;

use crate::game::Rect;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Opaque handle to a texture owned by a [`Renderer`].
///
/// Textures never leave the graphics thread; only their handles do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextureId(pub u32);

/// Mirroring applied when drawing a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Flip {
    #[default]
    None,
    Horizontal,
    Vertical,
}

/// Rotation centre for a textured draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

/// Parameters of a single textured-rectangle draw.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrawParams {
    /// Region of the texture to sample; `None` samples the full texture
    pub source: Option<Rect>,
    /// Target rectangle in playfield units
    pub dest: Rect,
    /// Rotation in degrees
    pub rotation: f64,
    /// Rotation centre; `None` rotates around the destination centre
    pub center: Option<Point>,
    pub flip: Flip,
}

impl DrawParams {
    /// Full-texture, unrotated draw into `dest`.
    pub fn new(dest: Rect, flip: Flip) -> Self {
        Self {
            source: None,
            dest,
            rotation: 0.0,
            center: None,
            flip,
        }
    }
}

/// Failure reported by a rendering backend.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct BackendError(pub String);

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Drawing surface collaborator.
///
/// Implementations are only ever called on the thread owning the graphics
/// context; see [`GraphicsContext`].
pub trait Renderer {
    /// Loads and decodes an image into a texture.
    fn load_texture(&mut self, path: &Path) -> Result<TextureId, BackendError>;

    /// Draws a texture into a destination rectangle.
    fn copy_ex(&mut self, texture: TextureId, params: &DrawParams) -> Result<(), BackendError>;

    /// Frees a texture. Called at most once per handle.
    fn destroy_texture(&mut self, texture: TextureId);
}
