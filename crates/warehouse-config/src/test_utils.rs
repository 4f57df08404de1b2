use std::{
    path::PathBuf,
    sync::PoisonError,
};

use crate::config::CONFIG_PATH;

/// Points [`CONFIG_PATH`] at `path` while `f` runs, then restores it.
#[cfg(test)]
pub fn with_config_path<F>(path: PathBuf, f: F)
where
    F: FnOnce(),
{
    let old_path = std::mem::replace(
        &mut *CONFIG_PATH.write().unwrap_or_else(PoisonError::into_inner),
        path,
    );

    f();

    *CONFIG_PATH.write().unwrap_or_else(PoisonError::into_inner) = old_path;
}
