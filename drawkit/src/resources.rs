// Copyright 2024 the Drawkit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Named images that `image` commands can refer to.

use std::collections::HashMap;

use crate::{Error, ImageBuf};

/// A registry of decoded images, looked up by the `resource` field of an
/// image command.
///
/// The registry is handed to the [`Renderer`] explicitly; there is no
/// process-wide instance.
///
/// [`Renderer`]: crate::Renderer
#[derive(Debug, Clone, Default)]
pub struct ResourceRegistry {
    images: HashMap<String, ImageBuf>,
}

impl ResourceRegistry {
    pub fn new() -> ResourceRegistry {
        ResourceRegistry::default()
    }

    /// Register an already decoded image, replacing any image of that name.
    pub fn insert_image(&mut self, name: impl Into<String>, image: ImageBuf) -> Option<ImageBuf> {
        self.images.insert(name.into(), image)
    }

    /// Decode and register an encoded image (PNG, JPEG, ...).
    pub fn insert_encoded(&mut self, name: impl Into<String>, bytes: &[u8]) -> Result<(), Error> {
        let image = ImageBuf::from_encoded(bytes)?;
        self.images.insert(name.into(), image);
        Ok(())
    }

    pub fn image(&self, name: &str) -> Option<&ImageBuf> {
        self.images.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<ImageBuf> {
        self.images.remove(name)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ImageFormat;

    #[test]
    fn lookup_by_name() {
        let mut reg = ResourceRegistry::new();
        let img = ImageBuf::from_raw(vec![0u8; 4], ImageFormat::RgbaSeparate, 1, 1).unwrap();
        assert!(reg.insert_image("dot", img).is_none());
        assert_eq!(reg.image("dot").map(|i| i.width()), Some(1));
        assert!(reg.image("missing").is_none());
        assert!(reg.insert_encoded("bad", b"not an image").is_err());
        assert_eq!(reg.len(), 1);
        assert!(reg.remove("dot").is_some());
        assert!(reg.is_empty());
    }
}
