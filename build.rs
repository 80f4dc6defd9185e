fn main() {
    println!("cargo:rerun-if-changed=templates/status.html");
    for var in [
        "GASMETER_CONFIG_JSON",
        "GASMETER_WIFI_SSID",
        "GASMETER_WIFI_PASSWORD",
        "GASMETER_MQTT_HOST",
        "GASMETER_MQTT_PORT",
        "GASMETER_MQTT_USER",
        "GASMETER_MQTT_PASSWORD",
        "GASMETER_DEVICE_ID",
        "GASMETER_PUBLISH_INTERVAL_MS",
    ] {
        println!("cargo:rerun-if-env-changed={var}");
    }

    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
