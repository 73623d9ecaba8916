//! CLI argument definitions

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "tracesym",
    about = "Map instruction addresses from execution traces to source lines",
    after_help = "\
EXAMPLES:
    tracesym -b ./rsa_1024 0x401136 0x4011a0         Static addresses
    tracesym -b ./rsa_1024 -r rsa_1024.routines < leaks.txt
                                                  Runtime addresses from a trace
    tracesym --line-dump decodedline.txt 0x8b1c0     Use a saved objdump dump

Set RUST_LOG=debug for loading statistics and miss reasons."
)]
pub struct Args {
    /// Binary the addresses belong to (needs DWARF line info unless --line-dump is given)
    #[arg(short, long, value_name = "BINARY")]
    pub binary: Option<PathBuf>,

    /// Routine file from the instrumentation front end; addresses are then runtime addresses
    #[arg(short, long, value_name = "FILE", requires = "binary")]
    pub routines: Option<PathBuf>,

    /// Build the line table from `objdump --dwarf=decodedline` output instead of DWARF
    #[arg(long, value_name = "FILE")]
    pub line_dump: Option<PathBuf>,

    /// Print one JSON object per address
    #[arg(long)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long)]
    pub quiet: bool,

    /// Hex addresses to symbolize (read from stdin, one per line, if omitted)
    #[arg(value_name = "ADDRESS")]
    pub addresses: Vec<String>,
}
