use std::path::PathBuf;

/// Core configuration for opening the grid database.
#[derive(Clone)]
pub struct Config {
    pub base_path: PathBuf,
}

impl Config {
    pub fn db_path(&self) -> PathBuf {
        self.base_path.join("grid.redb")
    }

    pub fn grid_config_path(&self) -> PathBuf {
        self.base_path.join("grid.toml")
    }
}
