//! Batch config files: several parts and an optional endpoint in one document.
//!
//! JSON by default; `.yaml` / `.yml` files are read as YAML. Relative
//! `firmware_file` paths are resolved against the config file's directory.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{PayloadError, PayloadResult};
use crate::part::{self, FirmwarePart, PartType};

#[derive(Debug, Deserialize)]
struct ConfigFile {
    endpoint: Option<String>,
    asset_base_url: Option<String>,
    parts: Vec<PartEntry>,
}

#[derive(Debug, Deserialize)]
struct PartEntry {
    part_type: String,
    version_code: Scalar,
    description: Option<String>,
    cpu_id: Scalar,
    firmware_file: Option<PathBuf>,
    rand: Option<Scalar>,
}

/// Identifier fields written either quoted or as bare numbers.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Int(i64),
}

impl From<Scalar> for String {
    fn from(value: Scalar) -> Self {
        match value {
            Scalar::Text(text) => text,
            Scalar::Int(n) => n.to_string(),
        }
    }
}

/// A loaded config with every firmware file already read into memory.
#[derive(Debug)]
pub struct PayloadConfig {
    pub endpoint: Option<String>,
    pub asset_base_url: Option<String>,
    pub parts: Vec<FirmwarePart>,
}

/// Load a config file and read the firmware of every part, in order.
///
/// The first failing part aborts the load.
pub fn load(path: &Path) -> PayloadResult<PayloadConfig> {
    let content = std::fs::read_to_string(path).map_err(|source| PayloadError::File {
        path: path.to_path_buf(),
        source,
    })?;
    let file = parse(path, &content)?;

    let config_dir = path.parent().unwrap_or_else(|| Path::new(""));
    let parts = file
        .parts
        .into_iter()
        .enumerate()
        .map(|(index, entry)| entry.into_part(index, config_dir))
        .collect::<PayloadResult<Vec<_>>>()?;

    Ok(PayloadConfig {
        endpoint: file.endpoint,
        asset_base_url: file.asset_base_url,
        parts,
    })
}

fn parse(path: &Path, content: &str) -> PayloadResult<ConfigFile> {
    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml")
    );
    let parsed: Result<ConfigFile, String> = if is_yaml {
        serde_yaml_ng::from_str(content).map_err(|e| e.to_string())
    } else {
        serde_json::from_str(content).map_err(|e| e.to_string())
    };
    parsed.map_err(|e| PayloadError::Config(format!("parse {}: {e}", path.display())))
}

impl PartEntry {
    fn into_part(self, index: usize, config_dir: &Path) -> PayloadResult<FirmwarePart> {
        let part_type: PartType = self.part_type.parse()?;

        let Some(firmware_file) = self.firmware_file else {
            return Err(PayloadError::Input(format!(
                "part {index}: missing firmware_file"
            )));
        };
        let firmware_file = if firmware_file.is_relative() {
            config_dir.join(firmware_file)
        } else {
            firmware_file
        };
        let raw_bytes = part::read_firmware(&firmware_file)?;

        let version_code = String::from(self.version_code);
        let description = self
            .description
            .unwrap_or_else(|| part::default_description(&version_code));

        Ok(FirmwarePart {
            part_type,
            version_code,
            description,
            cpu_id: self.cpu_id.into(),
            random_code: self.rand.map_or_else(part::random_code, String::from),
            raw_bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, contents: &[u8]) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn load_json_with_relative_firmware() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "vcu.bin", b"\x01\x02");
        let config_path = write(
            dir.path(),
            "config.json",
            br#"{
                "endpoint": "iot",
                "parts": [{
                    "part_type": "vcu",
                    "version_code": "331",
                    "description": "Bug fixes",
                    "cpu_id": "ABC123",
                    "firmware_file": "vcu.bin",
                    "rand": "1234"
                }]
            }"#,
        );

        let config = load(&config_path).unwrap();
        assert_eq!(config.endpoint.as_deref(), Some("iot"));
        assert!(config.asset_base_url.is_none());
        assert_eq!(config.parts.len(), 1);
        let part = &config.parts[0];
        assert_eq!(part.part_type, PartType::Vcu);
        assert_eq!(part.raw_bytes, b"\x01\x02");
        assert_eq!(part.random_code, "1234");
        assert_eq!(part.description, "Bug fixes");
    }

    #[test]
    fn load_yaml_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let firmware = write(dir.path(), "vcu.bin", b"fw");
        let yaml = format!(
            r#"
asset_base_url: https://ota.example.com
parts:
  - part_type: vcu
    version_code: "12"
    cpu_id: CPU9
    firmware_file: {}
"#,
            firmware.display()
        );
        let config_path = write(dir.path(), "parts.yaml", yaml.as_bytes());

        let config = load(&config_path).unwrap();
        assert!(config.endpoint.is_none());
        assert_eq!(
            config.asset_base_url.as_deref(),
            Some("https://ota.example.com")
        );
        let part = &config.parts[0];
        assert_eq!(part.description, "Firmware version code 12");
        assert_eq!(part.random_code.len(), 4);
    }

    #[test]
    fn numeric_identifiers_are_accepted() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "vcu.bin", b"fw");
        let config_path = write(
            dir.path(),
            "config.json",
            br#"{"parts": [{"part_type": "vcu", "version_code": 331, "cpu_id": 42, "firmware_file": "vcu.bin", "rand": 1234}]}"#,
        );

        let config = load(&config_path).unwrap();
        let part = &config.parts[0];
        assert_eq!(part.version_code, "331");
        assert_eq!(part.cpu_id, "42");
        assert_eq!(part.random_code, "1234");
        assert_eq!(part.description, "Firmware version code 331");
    }

    #[test]
    fn numeric_identifiers_are_accepted_in_yaml() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "vcu.bin", b"fw");
        let config_path = write(
            dir.path(),
            "parts.yml",
            b"parts:\n  - part_type: vcu\n    version_code: 12\n    cpu_id: ABC\n    firmware_file: vcu.bin\n    rand: 5678\n",
        );

        let config = load(&config_path).unwrap();
        assert_eq!(config.parts[0].version_code, "12");
        assert_eq!(config.parts[0].random_code, "5678");
    }

    #[test]
    fn missing_parts_field_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = write(dir.path(), "config.json", br#"{"endpoint": "iot"}"#);
        let err = load(&config_path).unwrap_err();
        assert!(matches!(err, PayloadError::Config(_)), "got: {err}");
        assert!(err.to_string().contains("parts"), "got: {err}");
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = write(dir.path(), "config.json", b"{ not json");
        assert!(matches!(
            load(&config_path).unwrap_err(),
            PayloadError::Config(_)
        ));
    }

    #[test]
    fn missing_config_file_is_a_file_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, PayloadError::File { .. }), "got: {err}");
    }

    #[test]
    fn part_without_firmware_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = write(
            dir.path(),
            "config.json",
            br#"{"parts": [{"part_type": "vcu", "version_code": "1", "cpu_id": "X"}]}"#,
        );
        let err = load(&config_path).unwrap_err();
        assert!(matches!(err, PayloadError::Input(_)), "got: {err}");
        assert!(err.to_string().contains("part 0"), "got: {err}");
    }

    #[test]
    fn unsupported_part_type_aborts_load() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "bms.bin", b"x");
        let config_path = write(
            dir.path(),
            "config.json",
            br#"{"parts": [{"part_type": "bms", "version_code": "1", "cpu_id": "X", "firmware_file": "bms.bin"}]}"#,
        );
        let err = load(&config_path).unwrap_err();
        assert!(
            matches!(err, PayloadError::UnsupportedPartType(_)),
            "got: {err}"
        );
    }

    #[test]
    fn missing_firmware_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = write(
            dir.path(),
            "config.json",
            br#"{"parts": [{"part_type": "vcu", "version_code": "1", "cpu_id": "X", "firmware_file": "gone.bin"}]}"#,
        );
        let err = load(&config_path).unwrap_err();
        assert!(matches!(err, PayloadError::File { .. }), "got: {err}");
        assert!(err.to_string().contains("gone.bin"), "got: {err}");
    }
}
