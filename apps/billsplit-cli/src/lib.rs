//! # billsplit CLI
//!
//! Command-line front end for `billsplit-core` and `billsplit-io`.
//!
//! ## Module Organization
//! ```text
//! billsplit_cli/
//! ├── lib.rs          ◄─── You are here (logging setup, exports)
//! ├── commands/       ◄─── clap definitions and one module per subcommand
//! ├── script/         ◄─── bill script language and runner
//! ├── state/
//! │   ├── config.rs   ◄─── AppConfig (file, env, flags)
//! │   └── session.rs  ◄─── BillState: Arc<Mutex<Session>>
//! ├── output.rs       ◄─── table / JSON / CSV rendering
//! └── error.rs        ◄─── CliError and exit codes
//! ```

pub mod commands;
pub mod error;
pub mod output;
pub mod script;
pub mod state;

pub use commands::{Cli, Commands, OutputFormat};
pub use error::{CliError, CliResult, ErrorCode};

use tracing_subscriber::EnvFilter;

/// Initializes the tracing subscriber on stderr.
///
/// ## Log Levels
/// - `RUST_LOG` wins when set
/// - `--verbose`: `info,billsplit=debug`
/// - otherwise: `warn`
pub fn init_tracing(verbose: bool) {
    let default = if verbose { "info,billsplit=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .init();
}
