//! INI parsing: the single place where INI keys are mapped to struct fields.

use std::path::PathBuf;
use std::str::FromStr;

use ini::{Ini, Properties};

use super::file::ConfigFileError;
use super::settings::ConfigFile;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [apt_dat] section
    if let Some(section) = ini.section(Some("apt_dat")) {
        config.apt_dat.files = paths(section, "file");
        config.apt_dat.scenery_paths = paths(section, "scenery_path");
        if let Some(v) = non_empty(section, "fg_root") {
            config.apt_dat.fg_root = Some(expand_tilde(v));
        }
    }

    // [digest] section
    if let Some(section) = ini.section(Some("digest")) {
        if let Some(v) = non_empty(section, "path") {
            config.digest.path = expand_tilde(v);
        }
        if let Some(v) = non_empty(section, "progress_line_interval") {
            config.digest.progress_line_interval =
                positive("digest", "progress_line_interval", v)?;
        }
        if let Some(v) = non_empty(section, "progress_airport_interval") {
            config.digest.progress_airport_interval =
                positive("digest", "progress_airport_interval", v)?;
        }
    }

    // [lookup] section
    if let Some(section) = ini.section(Some("lookup")) {
        if let Some(v) = non_empty(section, "cache_capacity") {
            config.lookup.cache_capacity =
                v.parse().map_err(|_| ConfigFileError::InvalidValue {
                    section: "lookup".to_string(),
                    key: "cache_capacity".to_string(),
                    value: v.to_string(),
                    reason: "must be a non-negative integer".to_string(),
                })?;
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = non_empty(section, "directory") {
            config.logging.directory = expand_tilde(v);
        }
        if let Some(v) = non_empty(section, "file") {
            config.logging.file = v.to_string();
        }
    }

    Ok(config)
}

fn non_empty<'a>(section: &'a Properties, key: &str) -> Option<&'a str> {
    section.get(key).map(str::trim).filter(|v| !v.is_empty())
}

/// All values of a repeatable key, in file order.
fn paths(section: &Properties, key: &str) -> Vec<PathBuf> {
    section
        .get_all(key)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(expand_tilde)
        .collect()
}

fn positive<T>(section: &str, key: &str, value: &str) -> Result<T, ConfigFileError>
where
    T: FromStr + PartialOrd + Default,
{
    match value.parse::<T>() {
        Ok(n) if n > T::default() => Ok(n),
        _ => Err(ConfigFileError::InvalidValue {
            section: section.to_string(),
            key: key.to_string(),
            value: value.to_string(),
            reason: "must be a positive integer".to_string(),
        }),
    }
}

/// Expand ~ to home directory in paths.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
