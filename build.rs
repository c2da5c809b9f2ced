fn main() {
    println!("cargo:rerun-if-env-changed=DOCK_WIFI_SSID");
    println!("cargo:rerun-if-env-changed=DOCK_WIFI_PASSWORD");
    println!("cargo:rerun-if-env-changed=DOCK_OTA_PASSWORD");
    println!("cargo:rerun-if-env-changed=DOCK_HOSTNAME");

    // Host builds (`--no-default-features`) have no ESP-IDF environment.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
