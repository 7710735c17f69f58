// Copyright 2024 the Drawkit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The mutable command list a canvas paints from.

use std::sync::Arc;

use kurbo::Size;

use crate::{Color, DrawCommand};

/// What needs repainting since the last paint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invalidation {
    /// Everything, starting from the background.
    Full,
    /// Only the commands at index `from` and later, painted over the
    /// previous frame.
    Appended { from: usize },
}

impl Invalidation {
    fn merge(self, other: Invalidation) -> Invalidation {
        match (self, other) {
            (Invalidation::Appended { from: a }, Invalidation::Appended { from: b }) => {
                Invalidation::Appended { from: a.min(b) }
            }
            _ => Invalidation::Full,
        }
    }
}

/// An immutable view of the command list at one point in time.
///
/// Taking a snapshot is cheap, and later mutation of the surface never
/// changes a snapshot that was already taken.
#[derive(Debug, Clone)]
pub struct Snapshot {
    commands: Arc<Vec<Arc<DrawCommand>>>,
    size: Size,
    background: Option<Color>,
}

impl Snapshot {
    pub fn commands(&self) -> &[Arc<DrawCommand>] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// `None` means transparent.
    pub fn background(&self) -> Option<Color> {
        self.background
    }
}

/// Owns the current ordered command list, the canvas size and background.
///
/// Every mutation replaces the list as a whole, so a [`Snapshot`] held by a
/// paint in progress keeps seeing the list it started with.
#[derive(Debug, Clone)]
pub struct CanvasSurface {
    commands: Arc<Vec<Arc<DrawCommand>>>,
    size: Size,
    background: Option<Color>,
    invalidation: Option<Invalidation>,
}

impl CanvasSurface {
    pub fn new(size: Size, background: Option<Color>) -> CanvasSurface {
        CanvasSurface {
            commands: Arc::new(Vec::new()),
            size,
            background,
            invalidation: Some(Invalidation::Full),
        }
    }

    /// Replace the whole list. The next paint starts from the background.
    pub fn set_commands(&mut self, commands: impl IntoIterator<Item = DrawCommand>) {
        let commands: Vec<_> = commands.into_iter().map(Arc::new).collect();
        log::debug!("replacing command list with {} commands", commands.len());
        self.commands = Arc::new(commands);
        self.invalidate(Invalidation::Full);
    }

    /// Add one command at the end.
    ///
    /// Existing entries are never touched. While no snapshot is alive the
    /// list grows in place; otherwise the outstanding snapshot keeps the old
    /// list and only the entry pointers are copied.
    pub fn append_command(&mut self, command: DrawCommand) {
        let from = self.commands.len();
        Arc::make_mut(&mut self.commands).push(Arc::new(command));
        self.invalidate(Invalidation::Appended { from });
    }

    /// Empty the list. The next paint shows only the background.
    pub fn clear(&mut self) {
        self.commands = Arc::new(Vec::new());
        self.invalidate(Invalidation::Full);
    }

    pub fn commands(&self) -> &[Arc<DrawCommand>] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn set_size(&mut self, size: Size) {
        if size != self.size {
            self.size = size;
            self.invalidate(Invalidation::Full);
        }
    }

    pub fn background(&self) -> Option<Color> {
        self.background
    }

    pub fn set_background(&mut self, background: Option<Color>) {
        if background != self.background {
            self.background = background;
            self.invalidate(Invalidation::Full);
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            commands: Arc::clone(&self.commands),
            size: self.size,
            background: self.background,
        }
    }

    /// Record that part of the canvas needs repainting.
    pub fn invalidate(&mut self, invalidation: Invalidation) {
        self.invalidation = Some(match self.invalidation {
            Some(pending) => pending.merge(invalidation),
            None => invalidation,
        });
    }

    /// Return and reset the pending invalidation.
    pub fn take_invalidation(&mut self) -> Option<Invalidation> {
        let taken = self.invalidation.take();
        if let Some(inv) = taken {
            log::trace!("taking invalidation {inv:?}");
        }
        taken
    }
}
