//! FlightGear installation layout.

mod paths;

pub use paths::{
    default_apt_dat_path, resolve_apt_dat_paths, scenery_apt_dat_files, subdirs, FG_ROOT_ENV,
};
