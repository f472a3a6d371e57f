//! JSON reading and writing. `None` paths mean stdin / stdout.

use crate::error::Result;
use crate::fulfillment::{FulfillmentInput, FulfillmentOutput};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{stdin, stdout, BufReader, BufWriter, Read, Write};
use std::path::Path;

fn open_reader(path: Option<&Path>) -> Result<Box<dyn Read>> {
    Ok(match path {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(stdin().lock()),
    })
}

fn create_write_buffer(path: Option<&Path>) -> Result<BufWriter<Box<dyn Write>>> {
    Ok(match path {
        Some(path) => BufWriter::new(Box::new(File::create(path)?)),
        None => BufWriter::new(Box::new(stdout())),
    })
}

/// Reads and deserializes one JSON document.
pub fn read_json<T: DeserializeOwned>(path: Option<&Path>) -> Result<T> {
    Ok(serde_json::from_reader(open_reader(path)?)?)
}

/// Writes `value` as pretty-printed JSON followed by a newline.
pub fn write_json<T: Serialize>(path: Option<&Path>, value: &T) -> Result<()> {
    let mut writer = create_write_buffer(path)?;
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

pub fn read_input(path: Option<&Path>) -> Result<FulfillmentInput> {
    read_json(path)
}

pub fn read_output(path: Option<&Path>) -> Result<FulfillmentOutput> {
    read_json(path)
}

pub fn write_output(path: Option<&Path>, output: &FulfillmentOutput) -> Result<()> {
    write_json(path, output)
}
