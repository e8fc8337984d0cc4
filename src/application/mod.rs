mod application;
pub mod data;
mod logging;
mod runtime_config;

pub use application::{Application, ApplicationError};
pub use logging::{setup_colors, setup_tracing};
pub use runtime_config::{ComparerConfig, ListerConfig};
