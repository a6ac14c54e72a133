use log::LevelFilter;
use env_logger::Builder;
use std::io::Write;
use chrono::Local;

// HTML parsing and the HTTP client log every node and connection below Warn.
const QUIET_TARGETS: [&str; 4] = ["reqwest", "hyper", "html5ever", "selectors"];

/// `-v` count to level: none is Info, one is Debug, more is Trace.
fn level_for(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Timestamped `[LEVEL] target` lines. `RUST_LOG` overrides both the
/// verbosity and the quieted dependencies.
pub fn init(verbose: u8) {
    let mut builder = Builder::new();
    builder
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{:<5}] {}: {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .filter_level(level_for(verbose));

    for target in QUIET_TARGETS {
        builder.filter_module(target, LevelFilter::Warn);
    }

    builder.parse_default_env().init();
}
