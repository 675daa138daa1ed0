//! Update endpoints and the constants each one puts on the wire.
//!
//! An endpoint profile decides which part types it can describe, how each
//! part is presented (name, icons, download path, flags), and the envelope
//! around the descriptor list. None of this depends on firmware content.

use std::fmt;
use std::str::FromStr;

use crate::error::{PayloadError, PayloadResult};
use crate::part::PartType;

/// Device-side update client the payload is generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Endpoint {
    #[default]
    Iot,
}

impl Endpoint {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Iot => "iot",
        }
    }

    /// Part types this endpoint can describe, in no particular order.
    pub const fn parts(self) -> &'static [PartProfile] {
        match self {
            Self::Iot => IOT_PARTS,
        }
    }

    /// Presentation of `part_type` on this endpoint.
    pub fn part(self, part_type: PartType) -> PayloadResult<&'static PartProfile> {
        self.parts()
            .iter()
            .find(|p| p.part_type == part_type)
            .ok_or_else(|| {
                PayloadError::UnsupportedPartType(format!("{part_type} (endpoint {self})"))
            })
    }

    pub const fn envelope(self) -> EnvelopeProfile {
        match self {
            Self::Iot => IOT_ENVELOPE,
        }
    }
}

impl FromStr for Endpoint {
    type Err = PayloadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "iot" => Ok(Self::Iot),
            other => Err(PayloadError::UnknownEndpoint(other.to_string())),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-descriptor flags fixed by the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptorFlags {
    /// Firmware is encrypted; the device must decrypt before flashing.
    pub has_secret: u8,
    pub source: u8,
    pub firmware_type: u8,
}

/// How one part type is presented by an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartProfile {
    pub part_type: PartType,
    pub display_name: &'static str,
    /// Icon path inside the `images` namespace, light theme.
    pub light_icon: &'static str,
    /// Icon path inside the `images` namespace, dark theme.
    pub dark_icon: &'static str,
    /// Binary path inside the `fw` namespace.
    pub firmware: &'static str,
    pub flags: DescriptorFlags,
}

/// Outer document constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvelopeProfile {
    pub response_code: i32,
    pub description: &'static str,
    pub display: DisplayFlags,
}

/// Update-screen switches sent alongside the descriptor list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayFlags {
    pub show_kart_tip: bool,
    pub special_version_status: bool,
    pub forced_status: bool,
    pub forced_content: &'static str,
    pub sub_wnumber: &'static str,
    pub source: u8,
}

const IOT_PARTS: &[PartProfile] = &[PartProfile {
    part_type: PartType::Vcu,
    display_name: "Vehicle controller",
    light_icon: "bright/ic_fw_vcu.png",
    dark_icon: "dark/ic_fw_vcu.png",
    firmware: "zt3pro/vcu.bin.enc",
    flags: DescriptorFlags {
        has_secret: 1,
        source: 1,
        firmware_type: 1,
    },
}];

const IOT_ENVELOPE: EnvelopeProfile = EnvelopeProfile {
    response_code: 1,
    description: "Successfully",
    display: DisplayFlags {
        show_kart_tip: false,
        special_version_status: false,
        forced_status: false,
        forced_content: "",
        sub_wnumber: "",
        source: 1,
    },
};
