//! Widen the two RAMs of an architecture: the 256 byte register file to 16
//! bit words and the 65536 byte program memory to 32 bit words.
//!
//! The original file is kept alongside as `circuit.data.bak`.

use clap::Parser;
use std::{error, ffi::OsString, fs, path::PathBuf};
use tcsave::{
    fix_rams,
    logging::{init_logging, LogConfig},
    ErrorKind,
};

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// circuit.data file to fix
    circuit_file: PathBuf,

    /// Log more
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<(), Box<dyn error::Error>> {
    let args = Args::parse();
    init_logging(&LogConfig::from_verbosity(args.verbose))?;

    let data = fs::read(&args.circuit_file)?;
    let patched = fix_rams(&data).map_err(|e| match e.kind() {
        ErrorKind::UnsupportedVersion { .. } => format!(
            "{}. Make an edit to the schematic to make the game save it again.",
            e
        )
        .into(),
        _ => Box::<dyn error::Error>::from(e),
    })?;

    let mut backup = OsString::from(args.circuit_file.as_os_str());
    backup.push(".bak");
    fs::rename(&args.circuit_file, &backup)?;
    fs::write(&args.circuit_file, patched)?;
    Ok(())
}
