use std::env;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use directories_next::ProjectDirs;

pub const ENV_CONFIG_DIR: &str = "CHAOSCOPE_CONFIG_DIR";
pub const ENV_DATA_DIR: &str = "CHAOSCOPE_DATA_DIR";

const QUALIFIER: &str = "org";
const ORGANISATION: &str = "Chaoscope";
const APPLICATION: &str = "Chaoscope";

#[derive(Debug, Clone)]
pub struct AppPaths {
    config_dir: PathBuf,
    data_dir: PathBuf,
}

impl AppPaths {
    pub fn discover() -> Result<Self> {
        let project_dirs = ProjectDirs::from(QUALIFIER, ORGANISATION, APPLICATION)
            .ok_or_else(|| anyhow!("failed to determine user directories"))?;

        let config_dir = resolve_dir(ENV_CONFIG_DIR, project_dirs.config_dir())
            .context("failed to resolve chaoscope config directory")?;
        let data_dir = resolve_dir(ENV_DATA_DIR, project_dirs.data_dir())
            .context("failed to resolve chaoscope data directory")?;

        Ok(Self {
            config_dir,
            data_dir,
        })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("chaoscope.toml")
    }

    pub fn shader_roots(&self) -> Vec<PathBuf> {
        vec![
            self.config_dir.join("shaders"),
            self.data_dir.join("shaders"),
        ]
    }

    /// Resolves a shader handle to a fragment file.
    ///
    /// Explicit paths are used as-is; bare names are searched in the shader
    /// roots, with and without a `.frag` extension.
    pub fn resolve_shader(&self, handle: &str) -> Result<PathBuf> {
        let direct = Path::new(handle);
        if direct.is_file() {
            return Ok(direct.to_path_buf());
        }
        if direct.is_absolute() || handle.contains(std::path::MAIN_SEPARATOR) {
            bail!("shader file not found at {handle}");
        }

        for root in self.shader_roots() {
            let exact = root.join(handle);
            if exact.is_file() {
                return Ok(exact);
            }
            let with_extension = root.join(format!("{handle}.frag"));
            if with_extension.is_file() {
                return Ok(with_extension);
            }
        }

        let roots = self
            .shader_roots()
            .iter()
            .map(|root| root.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        bail!("shader '{handle}' not found in shader roots ({roots})")
    }
}

#[cfg(test)]
impl AppPaths {
    pub fn from_raw(config_dir: PathBuf, data_dir: PathBuf) -> Self {
        Self {
            config_dir,
            data_dir,
        }
    }
}

fn resolve_dir(env_var: &str, default: &Path) -> Result<PathBuf> {
    if let Some(value) = env_override(env_var) {
        return Ok(value);
    }
    Ok(default.to_path_buf())
}

fn env_override(name: &str) -> Option<PathBuf> {
    match env::var_os(name) {
        Some(value) if !value.as_os_str().is_empty() => Some(PathBuf::from(value)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;
    use std::fs;
    use std::sync::{Mutex, OnceLock};
    use tempfile::TempDir;

    fn env_lock() -> &'static Mutex<()> {
        static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    struct EnvGuard {
        key: &'static str,
        previous: Option<OsString>,
    }

    impl EnvGuard {
        fn set(key: &'static str, value: &Path) -> Self {
            let previous = env::var_os(key);
            env::set_var(key, value);
            Self { key, previous }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            if let Some(value) = self.previous.take() {
                env::set_var(self.key, value);
            } else {
                env::remove_var(self.key);
            }
        }
    }

    #[test]
    fn env_overrides_take_precedence() {
        let _guard = env_lock().lock().unwrap();
        let root = TempDir::new().unwrap();
        let config_dir = root.path().join("config");
        let data_dir = root.path().join("data");

        let _config_guard = EnvGuard::set(ENV_CONFIG_DIR, &config_dir);
        let _data_guard = EnvGuard::set(ENV_DATA_DIR, &data_dir);

        let paths = AppPaths::discover().unwrap();

        assert_eq!(paths.config_dir(), config_dir.as_path());
        assert_eq!(paths.data_dir(), data_dir.as_path());
        assert_eq!(paths.config_file(), config_dir.join("chaoscope.toml"));
    }

    #[test]
    fn resolves_shader_by_name_with_extension_fallback() {
        let root = TempDir::new().unwrap();
        let shaders = root.path().join("config").join("shaders");
        fs::create_dir_all(&shaders).unwrap();
        fs::write(shaders.join("plasma.frag"), "void mainImage() {}").unwrap();

        let paths = AppPaths::from_raw(
            root.path().join("config"),
            root.path().join("data"),
        );

        assert_eq!(
            paths.resolve_shader("plasma").unwrap(),
            shaders.join("plasma.frag")
        );
        assert_eq!(
            paths.resolve_shader("plasma.frag").unwrap(),
            shaders.join("plasma.frag")
        );
    }

    #[test]
    fn resolves_explicit_paths_directly() {
        let root = TempDir::new().unwrap();
        let file = root.path().join("custom.frag");
        fs::write(&file, "void mainImage() {}").unwrap();

        let paths = AppPaths::from_raw(root.path().join("config"), root.path().join("data"));

        assert_eq!(
            paths.resolve_shader(file.to_str().unwrap()).unwrap(),
            file
        );
    }

    #[test]
    fn unknown_shader_is_an_error() {
        let root = TempDir::new().unwrap();
        let paths = AppPaths::from_raw(root.path().join("config"), root.path().join("data"));
        assert!(paths.resolve_shader("missing").is_err());
    }
}
