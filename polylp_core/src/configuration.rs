use std::path::PathBuf;
use std::sync::{LazyLock, RwLock};

pub static CONFIGURATION: LazyLock<RwLock<Configuration>> =
    LazyLock::new(|| RwLock::new(Configuration::default()));

pub struct Configuration {
    /// Path of the HiGHS binary invoked by the solve orchestrator
    pub solver_path: PathBuf,
    /// How long to wait for an IIS pass when no time limit was supplied, in seconds
    pub iis_wait: f64,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            solver_path: PathBuf::from("highs"),
            iis_wait: 60.,
        }
    }
}
