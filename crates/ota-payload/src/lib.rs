//! OTA payload generator: turns firmware binaries and metadata into the
//! update-response document a vehicle's update client consumes.

pub mod checksum;
pub mod cli;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod part;
pub mod payload;
pub mod profile;
pub mod urls;

pub use descriptor::Descriptor;
pub use error::{PayloadError, PayloadResult};
pub use part::{FirmwarePart, PartType};
pub use payload::UpdatePayload;
pub use profile::Endpoint;
pub use urls::AssetUrls;
