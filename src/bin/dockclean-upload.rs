//! Push a firmware image to a dock over the network.
//!
//! ```text
//! DOCK_OTA_PASSWORD=... dockclean-upload <host[:port]> <image.bin>
//! ```
//!
//! The dock advertises itself as `_dockclean._tcp` on mDNS; `host` is
//! usually `<hostname>.local`.

use std::net::TcpStream;
use std::time::Duration;

use anyhow::{Context, Result, bail};

use dockclean::config::DockConfig;
use dockclean::ota::client::UpdateClient;

const REPLY_TIMEOUT: Duration = Duration::from_secs(10);

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let (Some(target), Some(path)) = (args.next(), args.next()) else {
        bail!("usage: dockclean-upload <host[:port]> <image.bin>");
    };
    let addr = if target.contains(':') {
        target
    } else {
        format!("{target}:{}", DockConfig::default().ota_port)
    };

    let image = std::fs::read(&path).with_context(|| format!("reading {path}"))?;
    let password = std::env::var("DOCK_OTA_PASSWORD").unwrap_or_default();

    let stream = TcpStream::connect(&addr).with_context(|| format!("connecting to {addr}"))?;
    stream.set_read_timeout(Some(REPLY_TIMEOUT))?;

    println!("Uploading {} ({} bytes) to {}", path, image.len(), addr);
    let mut last_decile = 0;
    UpdateClient::new(stream).upload(&image, password.as_bytes(), |written, total| {
        let decile = u64::from(written) * 10 / u64::from(total);
        if decile > last_decile {
            last_decile = decile;
            println!("  {:>3}%", decile * 10);
        }
    })?;
    println!("Done; the dock is restarting into the new image");
    Ok(())
}
