//! Utility modules shared by the asset pipeline and the site writer.

pub mod color;
pub mod fs;
pub mod hash;
pub mod mime;
pub mod plural;
