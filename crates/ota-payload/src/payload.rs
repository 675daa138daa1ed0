//! Update-response assembly.

use serde::{Serialize, Serializer};
use tracing::debug;

use crate::descriptor::{self, Descriptor};
use crate::error::PayloadResult;
use crate::part::FirmwarePart;
use crate::profile::{DisplayFlags, Endpoint};
use crate::urls::AssetUrls;

/// Complete response document for one update check.
///
/// `descriptors` keeps input order; the device lists parts in that order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatePayload {
    pub response_code: i32,
    pub descriptors: Vec<Descriptor>,
    pub display_flags: DisplayFlags,
    pub description_text: String,
}

/// Build one descriptor per part, in order, and wrap them in the endpoint's
/// envelope. Any failing part fails the whole payload.
pub fn assemble(
    endpoint: Endpoint,
    parts: &[FirmwarePart],
    urls: &AssetUrls,
) -> PayloadResult<UpdatePayload> {
    let descriptors = parts
        .iter()
        .map(|part| -> PayloadResult<Descriptor> {
            let d = descriptor::build(part, endpoint, urls)?;
            debug!(
                part_type = %part.part_type,
                version = %d.version_label,
                md5 = %d.md5_hex,
                verify_code = d.verify_code,
                "descriptor built"
            );
            Ok(d)
        })
        .collect::<PayloadResult<Vec<_>>>()?;

    let envelope = endpoint.envelope();
    Ok(UpdatePayload {
        response_code: envelope.response_code,
        descriptors,
        display_flags: envelope.display,
        description_text: envelope.description.to_string(),
    })
}

impl UpdatePayload {
    /// Serialize to JSON, indented with two spaces when `pretty`.
    pub fn to_json(&self, pretty: bool) -> PayloadResult<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }
}

#[derive(Serialize)]
struct EnvelopeWire<'a> {
    code: i32,
    data: DataWire<'a>,
    desc: &'a str,
}

#[derive(Serialize)]
struct DataWire<'a> {
    parts_version: &'a [Descriptor],
    show_kart_tip: bool,
    special_version_status: bool,
    forced_status: bool,
    forced_content: &'a str,
    sub_wnumber: &'a str,
    source: u8,
}

impl Serialize for UpdatePayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let flags = &self.display_flags;
        EnvelopeWire {
            code: self.response_code,
            data: DataWire {
                parts_version: &self.descriptors,
                show_kart_tip: flags.show_kart_tip,
                special_version_status: flags.special_version_status,
                forced_status: flags.forced_status,
                forced_content: flags.forced_content,
                sub_wnumber: flags.sub_wnumber,
                source: flags.source,
            },
            desc: &self.description_text,
        }
        .serialize(serializer)
    }
}
