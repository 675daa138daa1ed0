//! Per-part descriptor derivation.

use rand::Rng;
use serde::{Serialize, Serializer};

use crate::checksum;
use crate::error::PayloadResult;
use crate::part::{FirmwarePart, PartType};
use crate::profile::{DescriptorFlags, Endpoint};
use crate::urls::AssetUrls;

/// Theme-specific icon locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconUrls {
    pub light: String,
    pub dark: String,
}

/// Everything the device's update client needs to fetch and verify one part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    pub part_type: PartType,
    pub version_label: String,
    pub description_text: String,
    pub part_number: String,
    pub display_name: String,
    pub icon_urls: IconUrls,
    pub download_url: String,
    pub md5_hex: String,
    pub verify_code: u32,
    pub cpu_id: String,
    pub random_code: String,
    pub task_code: String,
    pub flags: DescriptorFlags,
}

/// Derive the descriptor for `part` as presented by `endpoint`.
///
/// Checksums cover `part.raw_bytes` only. The task code is drawn fresh on
/// every call.
pub fn build(
    part: &FirmwarePart,
    endpoint: Endpoint,
    urls: &AssetUrls,
) -> PayloadResult<Descriptor> {
    let profile = endpoint.part(part.part_type)?;

    Ok(Descriptor {
        part_type: part.part_type,
        version_label: part.version_code.clone(),
        description_text: format!("{}\n", part.description),
        part_number: part.cpu_id.clone(),
        display_name: profile.display_name.to_string(),
        icon_urls: IconUrls {
            light: urls.image(profile.light_icon),
            dark: urls.image(profile.dark_icon),
        },
        download_url: urls.firmware(profile.firmware),
        md5_hex: checksum::md5_hex(&part.raw_bytes),
        verify_code: checksum::verify_code(&part.raw_bytes),
        cpu_id: part.cpu_id.clone(),
        random_code: part.random_code.clone(),
        task_code: task_code(),
        flags: profile.flags,
    })
}

/// Random 12-digit delivery-task identifier.
pub fn task_code() -> String {
    rand::rng()
        .random_range(100_000_000_000u64..=999_999_999_999)
        .to_string()
}

/// Field names and order as the update client parses them.
#[derive(Serialize)]
struct DescriptorWire<'a> {
    part_type: &'static str,
    last_version: &'a str,
    version_content: &'a str,
    pn: &'a str,
    part_name: &'a str,
    light_url: &'a str,
    dark_url: &'a str,
    blue_down_url: &'a str,
    md5: &'a str,
    verify_code: u32,
    cpuid: &'a str,
    random_code: &'a str,
    has_secret: u8,
    task_code: &'a str,
    source: u8,
    firmware_type: u8,
}

impl Serialize for Descriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        DescriptorWire {
            part_type: self.part_type.label(),
            last_version: &self.version_label,
            version_content: &self.description_text,
            pn: &self.part_number,
            part_name: &self.display_name,
            light_url: &self.icon_urls.light,
            dark_url: &self.icon_urls.dark,
            blue_down_url: &self.download_url,
            md5: &self.md5_hex,
            verify_code: self.verify_code,
            cpuid: &self.cpu_id,
            random_code: &self.random_code,
            has_secret: self.flags.has_secret,
            task_code: &self.task_code,
            source: self.flags.source,
            firmware_type: self.flags.firmware_type,
        }
        .serialize(serializer)
    }
}
