//! Integration tests for rgbkit crates
//!
//! Exercises file I/O and the named-image engine together.
