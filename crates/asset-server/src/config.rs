//! `asset-server` command line and startup configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use clap::Parser;
use ota_common::namespace;

use crate::error::ServerResult;
use crate::registry::AssetRegistry;

pub const DEFAULT_PORT: u16 = 5000;

#[derive(Debug, Parser)]
#[command(
    name = "asset-server",
    version,
    about = "Serve OTA firmware binaries and icon images"
)]
pub struct ServeArgs {
    /// Directory holding one sub-directory per namespace (images, fw)
    #[arg(long, env = "OTA_ASSET_ROOT", default_value = ".")]
    pub root_dir: PathBuf,

    /// Address to listen on
    #[arg(long, env = "OTA_ASSET_HOST", default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(long, env = "OTA_ASSET_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,
}

impl ServeArgs {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Mount every default namespace under `root_dir`, creating missing
    /// directories.
    pub async fn registry(&self) -> ServerResult<AssetRegistry> {
        namespace::ALL
            .iter()
            .fold(AssetRegistry::builder(), |builder, ns| {
                builder.mount(*ns, self.root_dir.join(ns))
            })
            .build()
            .await
    }
}
