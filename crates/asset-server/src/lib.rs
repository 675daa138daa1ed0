//! OTA asset server: serves firmware binaries and icon images referenced by
//! update descriptors, confined to one root directory per namespace.

pub mod audit;
pub mod config;
pub mod error;
pub mod registry;
pub mod server;

pub use error::{ServerError, ServerResult};
pub use registry::{AssetRegistry, Resolution};
