//! Entities of the topology graph.
//!
//! Each entity may carry a compose-declared side, a live side, or both.
//! Cross-links are stored as identity names and resolved through
//! [`Host`](crate::host::Host) lookups.

pub mod build;
pub mod container;
pub mod image;
pub mod network;
pub mod plugin;
pub mod project;
pub mod volume;

pub use build::Build;
pub use container::Container;
pub use image::Image;
pub use network::Network;
pub use plugin::Plugin;
pub use project::Project;
pub use volume::Volume;
