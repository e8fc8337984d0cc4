use supports_color::Stream;

use crate::application::data::LogLevel;

/// Installs the stderr subscriber. Stdout is reserved for snapshot text.
pub fn setup_tracing(log_level: LogLevel) {
    if let Some(level) = log_level.to_tracing_level() {
        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_writer(std::io::stderr)
            .without_time()
            .compact()
            .init();
    }
}

/// Enables styled section labels only when stdout can render them.
pub fn setup_colors() {
    colored::control::set_override(supports_color::on(Stream::Stdout).is_some());
}
