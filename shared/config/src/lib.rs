mod args;
mod config;
mod cpu;
mod error;

pub use args::ConfigArgs;
pub use config::Config;
pub use cpu::{CpuInfo, FixedCpuInfo, SystemCpuInfo};
pub use error::ConfigError;
