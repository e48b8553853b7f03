//! Print the record tree of a schematic as JSON for debugging
//!
//! Reads a `circuit.data` file from stdin:
//!
//! ```text
//! dump < circuit.data
//! {
//!   "custom_id": 6329107584107419925,
//!   "hub_id": 0,
//!   "gate": 1234,
//!   ...
//!   "wires": [120, 1, 0, ...]
//! }
//! ```

use std::io::{self, BufWriter, Read, Write};
use tcsave::Schematic;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut data = Vec::new();
    io::stdin().lock().read_to_end(&mut data)?;

    let schematic = Schematic::from_slice(&data)?;

    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    serde_json::to_writer_pretty(&mut writer, schematic.root())?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
