use std::{env, io, path::PathBuf};

use anyhow::{Context, Result};

const APPLICATION_DIR_NAME: &str = "tapclock";

/// Default location of tapclock data and logs: `%APPDATA%\tapclock` on Windows,
/// `$XDG_STATE_HOME/tapclock` or `$HOME/.local/state/tapclock` elsewhere.
pub fn create_application_default_path() -> Result<PathBuf> {
    let path = {
        #[cfg(windows)]
        {
            let mut path = PathBuf::from(
                env::var("APPDATA").context("APPDATA should be present on Windows")?,
            );
            path.push(APPLICATION_DIR_NAME);
            path
        }
        #[cfg(not(windows))]
        {
            let mut path = env::var("XDG_STATE_HOME")
                .map(PathBuf::from)
                .or_else(|_| {
                    env::var("HOME").map(|home| {
                        let mut path = PathBuf::from(home);
                        path.push(".local/state");
                        path
                    })
                })
                .context("Couldn't find neither XDG_STATE_HOME nor HOME")?;
            path.push(APPLICATION_DIR_NAME);
            path
        }
    };

    create_application_path(path)
}

/// Makes sure an application directory exists, whether it's the default one or passed with `--dir`.
pub fn create_application_path(path: PathBuf) -> Result<PathBuf> {
    match std::fs::create_dir_all(&path) {
        Ok(_) => Ok(path),
        Err(v) if v.kind() == io::ErrorKind::AlreadyExists => Ok(path),
        Err(v) => Err(v).with_context(|| format!("Can't create application directory {path:?}")),
    }
}
