//! billsplit entry point
//!
//! Usage:
//!   billsplit split --items receipt.csv --participants Alice,Bob --discount 10
//!   billsplit parse-receipt --text receipt.txt --out receipt.csv
//!   billsplit run --script dinner.bill
//!
//! A `.env` file is loaded first; flags override `BILLSPLIT_*` variables,
//! which override the config file.

use billsplit_cli::{commands, init_tracing, output, Cli};
use clap::Parser;

fn main() {
    // Load .env file (ignore if not found)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let format = cli.format;
    if let Err(e) = commands::run(cli) {
        if output::write_error(&mut std::io::stderr(), &e, format).is_err() {
            eprintln!("Error: {}", e);
        }
        std::process::exit(e.exit_code());
    }
}
