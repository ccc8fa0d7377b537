//! Helpers shared by the fragment accessors.

pub mod number;
