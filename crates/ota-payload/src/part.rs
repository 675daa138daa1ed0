//! Firmware parts as read from disk, before descriptor derivation.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use rand::Rng;

use crate::error::{PayloadError, PayloadResult};

/// Updatable component of the vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartType {
    /// Vehicle control unit.
    Vcu,
}

impl PartType {
    /// Tag used on the command line and in config files.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Vcu => "vcu",
        }
    }

    /// Tag the device expects in `part_type`.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Vcu => "VCU",
        }
    }
}

impl FromStr for PartType {
    type Err = PayloadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vcu" => Ok(Self::Vcu),
            other => Err(PayloadError::UnsupportedPartType(other.to_string())),
        }
    }
}

impl fmt::Display for PartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One firmware image plus the metadata the device shows alongside it.
///
/// `raw_bytes` is whatever was on disk (already encrypted upstream).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirmwarePart {
    pub part_type: PartType,
    pub version_code: String,
    pub description: String,
    pub cpu_id: String,
    pub random_code: String,
    pub raw_bytes: Vec<u8>,
}

/// Description used when the operator doesn't supply one.
pub fn default_description(version_code: &str) -> String {
    format!("Firmware version code {version_code}")
}

/// Fresh 4-digit random code, `1000..=9999`.
pub fn random_code() -> String {
    rand::rng().random_range(1000..=9999u32).to_string()
}

/// Read a firmware image into memory.
pub fn read_firmware(path: &Path) -> PayloadResult<Vec<u8>> {
    std::fs::read(path).map_err(|source| PayloadError::File {
        path: path.to_path_buf(),
        source,
    })
}
