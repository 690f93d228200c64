mod cli;
mod error;
mod listing;
mod table;

use cli::Cli;
use error::Result;
use table::OpcodeTable;

use clap::Parser;
use log::debug;

fn main() {
    env_logger::init();
    let args = Cli::parse();
    if let Err(e) = run(&args) {
        debug!("{:?}", e);
        eprintln!("opdump: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Cli) -> Result<()> {
    let table = OpcodeTable::load(&args.input)?;
    // render everything before writing anything, so a bad record leaves stdout empty
    let lines = listing::render(&table, args.section, args.order)?;
    let stdout = std::io::stdout();
    listing::write_lines(&lines, stdout.lock())
}
