// Copyright 2024 the Drawkit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The preferred drawkit backend, plus a canvas a host UI can embed.
//!
//! This crate reexports the [drawkit crate][drawkit] alongside the tiny-skia
//! backend, and adds [`Device`]/[`BitmapTarget`] for offscreen rendering and
//! [`Canvas`], which owns a command list and paints it into a bitmap.
//!
//! The intention of this crate is to provide a single dependency that handles
//! the common use-case. If you need to drive your own [`RenderContext`], use
//! [drawkit][] directly.
//!
//! [drawkit]: https://crates.io/crates/drawkit

pub use drawkit::*;

#[path = "skia_back.rs"]
mod backend;

mod canvas;

#[doc(hidden)]
pub use backend::*;

pub use canvas::{Canvas, CanvasConfig};

/// The name of the selected backend.
pub const BACKEND_NAME: &str = "tiny-skia";
