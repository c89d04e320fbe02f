use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "CareCompanion";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get the application data directory
/// ~/CareCompanion/ on all platforms (user-visible, per design requirement)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("CareCompanion")
}

/// Path of the coordination database.
pub fn database_path() -> PathBuf {
    app_data_dir().join("carecompanion.db")
}

/// Log filter applied when RUST_LOG is not set.
pub fn default_log_filter() -> &'static str {
    "carecompanion=info"
}
