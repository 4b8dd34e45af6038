//! Named image store.

use crate::{OpsError, OpsResult};
use rgbkit_core::PixelBuffer;
use std::collections::HashMap;

/// Map from image names to pixel buffers.
///
/// Names are case-sensitive. Storing under an existing name replaces the
/// previous image; [`Catalog::insert`] hands it back.
#[derive(Debug, Default, Clone)]
pub struct Catalog {
    images: HashMap<String, PixelBuffer>,
}

impl Catalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up an image.
    ///
    /// # Errors
    ///
    /// Returns [`OpsError::NotFound`] for unknown names.
    pub fn get(&self, name: &str) -> OpsResult<&PixelBuffer> {
        self.images
            .get(name)
            .ok_or_else(|| OpsError::NotFound(name.to_string()))
    }

    /// Stores `image` under `name`, returning the image it replaced.
    pub fn insert(&mut self, name: impl Into<String>, image: PixelBuffer) -> Option<PixelBuffer> {
        self.images.insert(name.into(), image)
    }

    /// Returns true if `name` is stored.
    pub fn contains(&self, name: &str) -> bool {
        self.images.contains_key(name)
    }

    /// Stored names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.images.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of stored images.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_get() {
        let mut catalog = Catalog::new();
        assert!(catalog.is_empty());
        let img = PixelBuffer::filled(2, 2, [1, 2, 3]).unwrap();
        assert!(catalog.insert("koala", img.clone()).is_none());
        assert_eq!(catalog.get("koala").unwrap(), &img);
        assert!(catalog.contains("koala"));
        assert!(!catalog.contains("Koala"));
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_last_write_wins() {
        let mut catalog = Catalog::new();
        let a = PixelBuffer::filled(1, 1, [1, 1, 1]).unwrap();
        let b = PixelBuffer::filled(1, 1, [2, 2, 2]).unwrap();
        catalog.insert("x", a.clone());
        assert_eq!(catalog.insert("x", b.clone()), Some(a));
        assert_eq!(catalog.get("x").unwrap(), &b);
    }

    #[test]
    fn test_not_found() {
        let catalog = Catalog::new();
        assert!(matches!(catalog.get("missing"), Err(OpsError::NotFound(n)) if n == "missing"));
    }

    #[test]
    fn test_names_sorted() {
        let mut catalog = Catalog::new();
        for name in ["c", "a", "b"] {
            catalog.insert(name, PixelBuffer::new(1, 1).unwrap());
        }
        assert_eq!(catalog.names(), vec!["a", "b", "c"]);
    }
}
