mod cli;
mod export_cmd;
mod render_cmd;
mod shared;
mod total_cmd;

use clap::Parser;
use cli::Cli;

fn main() {
    let cli = Cli::parse();
    shared::init_logging(cli.verbose);

    let result = match cli.command {
        cli::Commands::Total {
            ref file,
            ref format,
            ref invoice,
        } => total_cmd::run(file, format, invoice),
        cli::Commands::Render {
            ref file,
            ref output,
            ref invoice,
            ref view,
            ref capture,
        } => render_cmd::run(file, output, invoice, view, capture),
        cli::Commands::Export {
            ref file,
            ref out_dir,
            delay_ms,
            ref invoice,
            ref view,
            ref capture,
        } => export_cmd::run(file, out_dir, delay_ms, invoice, view, capture),
    };

    if let Err(code) = result {
        std::process::exit(code);
    }
}
