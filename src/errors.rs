//! Error Types
//!
//! Per-surface failures (a surface whose effect yields no valid technique)
//! are not errors: they produce an empty draw-call range and the surface is
//! simply excluded from submission until a rebuild resolves a technique.
//! Only frame-setup failures surface as [`RenderError`].

use thiserror::Error;

/// The main error type for the Mirage rendering core.
#[derive(Error, Debug)]
pub enum RenderError {
    /// No render target could be resolved: no override was passed to
    /// `render`, the renderer has no target of its own, and the context
    /// reports no default backbuffer. The frame is aborted before any
    /// context call is issued.
    #[error("no render target: no override, no renderer target, no default backbuffer")]
    NoRenderTarget,
}

/// Alias for `Result<T, RenderError>`.
pub type Result<T> = std::result::Result<T, RenderError>;
