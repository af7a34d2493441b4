//! logger.rs
//! Configuración del logger usando env_logger.

/// Sin RUST_LOG: info para la app, y chromiumoxide solo warn (es muy ruidoso
/// con eventos CDP que no conoce).
const DEFAULT_FILTER: &str = "info,chromiumoxide=warn,sqlx=warn";

pub fn init_logger() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_FILTER.to_string());

    env_logger::Builder::new()
        .parse_filters(&filter)
        .format_timestamp_secs()
        .format_module_path(false)
        .init();
}
