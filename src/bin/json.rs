//! Converts a save to the archive JSON.
//!
//! Usage: `json [--pretty] [save.sav]`. The save is read from stdin when no
//! path is given.

mod common;

use common::read_input;
use raidsave::{json::JsonOptions, ArchiveDecoder};
use std::{
    env, error,
    io::{self, BufWriter, Write},
};

fn main() -> Result<(), Box<dyn error::Error>> {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let pretty = args.iter().any(|x| x == "--pretty");
    let path = args.iter().find(|x| !x.starts_with("--")).map(String::as_str);

    let data = read_input(path)?;
    let decoded = ArchiveDecoder::new().decode(&data)?;
    for field in decoded.skipped() {
        log::warn!("defaulted {}", field);
    }

    let stdout = io::stdout().lock();
    let mut writer = BufWriter::new(stdout);
    decoded
        .archive()
        .json()
        .with_options(JsonOptions::new().with_prettyprint(pretty))
        .to_writer(&mut writer)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
