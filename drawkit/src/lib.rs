// Copyright 2024 the Drawkit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Declarative 2D drawing.
//!
//! A drawing is an ordered list of [`DrawCommand`]s. A [`CanvasSurface`] holds
//! the current list, and a [`Renderer`] walks it in order, turning each command
//! into geometry (via [`PathBuilder`]) and paint (via the gradient evaluator)
//! for any [`RenderContext`] backend.

pub use kurbo;

/// utilities shared by various backends
pub mod util;

mod color;
mod command;
mod error;
mod font;
mod gesture;
mod gradient;
mod image_buf;
mod path;
mod recording;
mod render;
mod render_context;
mod resources;
mod shapes;
mod surface;
mod text;

pub use crate::color::*;
pub use crate::command::*;
pub use crate::error::*;
pub use crate::font::*;
pub use crate::gesture::*;
pub use crate::gradient::*;
pub use crate::image_buf::*;
pub use crate::path::*;
pub use crate::recording::*;
pub use crate::render::*;
pub use crate::render_context::*;
pub use crate::resources::*;
pub use crate::shapes::*;
pub use crate::surface::*;
pub use crate::text::*;
