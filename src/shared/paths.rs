use std::path::{Path, PathBuf};

const APP_DIR: &str = "catalog-admin";

/// Get the base storage directory.
/// Returns `$CATALOG_ADMIN_HOME`, `$XDG_DATA_HOME/catalog-admin` or the
/// platform local data dir joined with `catalog-admin`.
pub fn get_storage_dir() -> PathBuf {
    resolve_storage_dir(
        std::env::var_os("CATALOG_ADMIN_HOME").map(PathBuf::from),
        std::env::var_os("XDG_DATA_HOME").map(PathBuf::from),
        dirs::data_local_dir(),
    )
}

fn resolve_storage_dir(
    home_override: Option<PathBuf>,
    xdg_data: Option<PathBuf>,
    platform_data: Option<PathBuf>,
) -> PathBuf {
    if let Some(home) = home_override {
        return home;
    }

    if let Some(xdg) = xdg_data {
        return xdg.join(APP_DIR);
    }

    platform_data
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// Get the logs directory path.
/// Returns `{storage_dir}/logs`.
pub fn get_log_dir() -> PathBuf {
    get_storage_dir().join("logs")
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}
