//! # Recording Renderer
//!
//! Headless backend that records every draw and texture lifecycle event instead
//! of touching a GPU. Used by tests and for running the subsystem without a window.

use crate::rendering::{BackendError, DrawParams, Renderer, TextureId};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// A draw call captured by [`RecordingRenderer`].
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub texture: TextureId,
    pub params: DrawParams,
}

/// Headless renderer that records what it is asked to do.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    next_texture: u32,
    live: HashSet<TextureId>,
    loaded: Vec<PathBuf>,
    destroyed: Vec<TextureId>,
    draws: Vec<DrawCall>,
    fail_loads: bool,
    fail_draw_after: Option<usize>,
}

impl RecordingRenderer {
    /// Creates a renderer that accepts every request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every texture load fail.
    pub fn failing_loads(mut self) -> Self {
        self.fail_loads = true;
        self
    }

    /// Makes every draw fail once `successful` draws have been recorded.
    pub fn failing_draws_after(mut self, successful: usize) -> Self {
        self.fail_draw_after = Some(successful);
        self
    }

    /// All successful draw calls, oldest first.
    pub fn draw_calls(&self) -> &[DrawCall] {
        &self.draws
    }

    /// Forgets recorded draw calls, e.g. between frames.
    pub fn clear_draw_calls(&mut self) {
        self.draws.clear();
    }

    /// Paths passed to successful loads.
    pub fn loaded_paths(&self) -> &[PathBuf] {
        &self.loaded
    }

    /// Textures released so far, in release order.
    pub fn destroyed_textures(&self) -> &[TextureId] {
        &self.destroyed
    }

    /// Number of textures loaded and not yet destroyed.
    pub fn live_textures(&self) -> usize {
        self.live.len()
    }

    pub fn is_live(&self, texture: TextureId) -> bool {
        self.live.contains(&texture)
    }
}

impl Renderer for RecordingRenderer {
    fn load_texture(&mut self, path: &Path) -> Result<TextureId, BackendError> {
        if self.fail_loads {
            return Err(BackendError::new(format!(
                "unsupported image format: {}",
                path.display()
            )));
        }

        let id = TextureId(self.next_texture);
        self.next_texture += 1;
        self.live.insert(id);
        self.loaded.push(path.to_path_buf());
        Ok(id)
    }

    fn copy_ex(&mut self, texture: TextureId, params: &DrawParams) -> Result<(), BackendError> {
        if let Some(limit) = self.fail_draw_after {
            if self.draws.len() >= limit {
                return Err(BackendError::new("invalid renderer state"));
            }
        }
        if !self.live.contains(&texture) {
            return Err(BackendError::new(format!(
                "texture {} is not loaded",
                texture.0
            )));
        }

        self.draws.push(DrawCall {
            texture,
            params: *params,
        });
        Ok(())
    }

    fn destroy_texture(&mut self, texture: TextureId) {
        self.live.remove(&texture);
        self.destroyed.push(texture);
    }
}
