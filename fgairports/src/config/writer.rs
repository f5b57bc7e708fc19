//! INI serialization: `ConfigFile` to the commented text written to
//! `config.ini`.

use std::fmt::Write as _;
use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let files = repeated("file", &config.apt_dat.files, "/path/to/apt.dat.gz");
    let scenery_paths = repeated(
        "scenery_path",
        &config.apt_dat.scenery_paths,
        "/path/to/TerraSync",
    );
    let fg_root = config
        .apt_dat
        .fg_root
        .as_ref()
        .map(|p| path_to_string(p))
        .unwrap_or_default();

    format!(
        r#"[apt_dat]
; apt.dat files in priority order (repeat the key for each file).
; When the same airport appears in several files, the first one wins.
; Leave unset to discover files from scenery_path and fg_root.
{}
; Scenery directories searched for NavData/apt/*.dat and *.dat.gz
; (repeat the key for each directory, highest priority first)
{}
; FlightGear data directory, provides Airports/apt.dat.gz ($FG_ROOT if empty)
fg_root = {}

[digest]
; Compact airport index rebuilt whenever an apt.dat file changes
path = {}
; Report build progress every N apt.dat lines while reading
progress_line_interval = {}
; Report build progress every N airports while writing
progress_airport_interval = {}

[lookup]
; Number of fully parsed airports kept in memory (0 disables the cache)
cache_capacity = {}

[logging]
directory = {}
file = {}
"#,
        files,
        scenery_paths,
        fg_root,
        path_to_string(&config.digest.path),
        config.digest.progress_line_interval,
        config.digest.progress_airport_interval,
        config.lookup.cache_capacity,
        path_to_string(&config.logging.directory),
        config.logging.file,
    )
}

/// One `key = value` line per path, or a commented example when empty.
fn repeated<P: AsRef<Path>>(key: &str, paths: &[P], example: &str) -> String {
    if paths.is_empty() {
        return format!("; {} = {}", key, example);
    }
    let mut out = String::new();
    for (i, path) in paths.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = write!(out, "{} = {}", key, path_to_string(path.as_ref()));
    }
    out
}

/// Paths under the home directory are written with `~`.
fn path_to_string(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_empty_lists_are_commented_out() {
        let text = to_config_string(&ConfigFile::default());
        assert!(text.contains("; file = /path/to/apt.dat.gz"));
        assert!(text.contains("; scenery_path = /path/to/TerraSync"));
        assert!(text.contains("fg_root = \n"));
    }

    #[test]
    fn test_repeated_keys() {
        let mut config = ConfigFile::default();
        config.apt_dat.files = vec![PathBuf::from("/a.dat"), PathBuf::from("/b.dat.gz")];
        let text = to_config_string(&config);
        assert!(text.contains("file = /a.dat\nfile = /b.dat.gz\n"));
    }
}
