use crate::listing::Order;
use crate::table::Section;

use clap::Parser;

use std::path::PathBuf;

const LONG_ABOUT: &str =
    "Formats one section of an SM83 (Game Boy) opcodes.json table as a listing,
one line per opcode:

    <opcode>, \"<mnemonic>\", <bytes>, <cycle>[, <cycle>]

Conditional instructions carry two cycle counts, branch taken first.
Set RUST_LOG=info (or debug) to see what is being read.";

#[derive(Parser, Debug)]
#[command(name = "opdump", version, about = "Formats an SM83 opcode table as a listing", long_about = LONG_ABOUT)]
pub struct Cli {
    /// Which opcode table to format.
    #[arg(value_enum)]
    pub section: Section,

    /// Opcode table to read; `-` reads stdin.
    #[arg(short = 'i', long = "input", value_name = "FILE", default_value = "opcodes.json")]
    pub input: PathBuf,

    /// Output order of the opcodes.
    #[arg(long, value_enum, default_value_t = Order::Numeric)]
    pub order: Order,
}
