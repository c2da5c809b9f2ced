//! mDNS advertisement adapter.
//!
//! Publishes `<hostname>.local` and the update service as
//! `_dockclean._tcp` on the OTA port, which `dockclean-upload` connects to.
//! The TXT record names the wire protocol and the HMAC challenge so a
//! browser can tell this apart from ArduinoOTA devices.  Uses raw ESP-IDF
//! mDNS calls on target and is a no-op on simulation targets.

use log::info;

pub const MDNS_SERVICE_TYPE: &str = "_dockclean";
pub const MDNS_SERVICE_PROTO: &str = "_tcp";

/// Fixed TXT items; `version` is appended at registration.
pub const TXT_RECORDS: [(&str, &str); 2] = [("proto", "dockclean-ota/1"), ("auth", "hmac-sha256")];

/// mDNS advertisement adapter.
pub struct MdnsAdapter {
    hostname: heapless::String<32>,
    port: u16,
    active: bool,
}

impl MdnsAdapter {
    pub fn new(hostname: heapless::String<32>, port: u16) -> Self {
        Self {
            hostname,
            port,
            active: false,
        }
    }

    /// Whether mDNS is currently advertising.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Start hostname + service advertisement.
    /// Call after Wi-Fi is connected and has an IP.
    pub fn start(&mut self) {
        if self.active {
            return;
        }
        self.active = self.platform_start();
        if self.active {
            info!(
                "mDNS: advertising {}.local → {}.{}:{}",
                self.hostname, MDNS_SERVICE_TYPE, MDNS_SERVICE_PROTO, self.port
            );
        }
    }

    pub fn stop(&mut self) {
        if !self.active {
            return;
        }
        self.platform_stop();
        self.active = false;
        info!("mDNS: stopped");
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_start(&self) -> bool {
        use esp_idf_svc::sys::*;

        let hostname_buf = nul_terminated::<33>(&self.hostname);

        let svc_type = nul_terminated::<16>(MDNS_SERVICE_TYPE);
        let svc_proto = nul_terminated::<8>(MDNS_SERVICE_PROTO);
        // SAFETY: all strings are NUL-terminated buffers that outlive the
        // calls; mDNS copies them internally.
        unsafe {
            let ret = mdns_init();
            if ret != ESP_OK as i32 {
                log::error!("mDNS: mdns_init failed ({})", ret);
                return false;
            }
            mdns_hostname_set(hostname_buf.as_ptr().cast());
            mdns_instance_name_set(hostname_buf.as_ptr().cast());

            let ret = mdns_service_add(
                core::ptr::null(),
                svc_type.as_ptr().cast(),
                svc_proto.as_ptr().cast(),
                self.port,
                core::ptr::null_mut(),
                0,
            );
            if ret != ESP_OK as i32 {
                log::error!("mDNS: service add failed ({})", ret);
                mdns_free();
                return false;
            }

            let version = ("version", env!("CARGO_PKG_VERSION"));
            for (key, value) in TXT_RECORDS.into_iter().chain([version]) {
                let key = nul_terminated::<16>(key);
                let value = nul_terminated::<32>(value);
                mdns_service_txt_item_set(
                    svc_type.as_ptr().cast(),
                    svc_proto.as_ptr().cast(),
                    key.as_ptr().cast(),
                    value.as_ptr().cast(),
                );
            }
        }
        true
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_start(&self) -> bool {
        info!(
            "mDNS(sim): registered {}.local {}.{}:{} {:?} v={}",
            self.hostname,
            MDNS_SERVICE_TYPE,
            MDNS_SERVICE_PROTO,
            self.port,
            TXT_RECORDS,
            env!("CARGO_PKG_VERSION"),
        );
        true
    }

    #[cfg(target_os = "espidf")]
    fn platform_stop(&self) {
        // SAFETY: mdns_free tears down the responder started in platform_start.
        unsafe {
            esp_idf_svc::sys::mdns_free();
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_stop(&self) {
        info!("mDNS(sim): unregistered");
    }
}

/// Copy `s` into a zeroed buffer, leaving at least one trailing NUL.
#[cfg(target_os = "espidf")]
fn nul_terminated<const N: usize>(s: &str) -> [u8; N] {
    let mut buf = [0u8; N];
    let len = s.len().min(N - 1);
    buf[..len].copy_from_slice(&s.as_bytes()[..len]);
    buf
}
