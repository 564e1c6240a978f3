#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::return_self_not_must_use)]

pub mod bundler;
pub mod config;
pub mod dev;
pub mod device;
pub mod error;
pub mod roots;

pub use config::{load_project_config, Config, ProjectConfig};
pub use device::DeviceType;
pub use error::Error;
pub use roots::{ModuleRoot, RootOptions, RootRegistry};
