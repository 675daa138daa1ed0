//! Asset namespaces shared by descriptor URLs and the asset server routes.

/// Icon images referenced by `light_url` / `dark_url`.
pub const IMAGES: &str = "images";

/// Encrypted firmware binaries referenced by `blue_down_url`.
pub const FIRMWARE: &str = "fw";

/// Every namespace the asset server mounts by default.
pub const ALL: [&str; 2] = [IMAGES, FIRMWARE];
