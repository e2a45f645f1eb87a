use chrono::Local;
use env_logger::{Builder, Env};
use std::io::Write;

/// Filter used when `RUST_LOG` is unset: this crate at info, dependencies at warn.
pub const DEFAULT_FILTER: &str = "warn,dermograph_tracker=info";

/// `HH:MM:SS.mmm LEVEL module: message`, level colored when the terminal allows.
pub fn init_logger() {
    Builder::from_env(Env::default().default_filter_or(DEFAULT_FILTER))
        .format(|buf, record| {
            let style = buf.default_level_style(record.level());
            writeln!(
                buf,
                "{} {style}{:<5}{style:#} {}: {}",
                Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                short_target(record.target()),
                record.args(),
            )
        })
        .init();
}

/// Drops the crate prefix, `dermograph_tracker::tracker` becomes `tracker`.
fn short_target(target: &str) -> &str {
    target
        .strip_prefix("dermograph_tracker::")
        .unwrap_or(target)
}
