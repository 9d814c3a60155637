use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use anyhow::Context;
use cardstock::{GameRecord, SelectionGroup};
use serde::{Deserialize, Serialize};

/// On-disk shape of the selection file.
#[derive(Serialize, Deserialize)]
struct SelectionFile {
    groups: Vec<SelectionGroup>,
}

/// Read the normalized collection written by the external fetch stage.
pub fn load_collection(path: &Path) -> anyhow::Result<Vec<GameRecord>> {
    let file = File::open(path)
        .with_context(|| format!("Could not open collection file '{}'", path.display()))?;
    let games: Vec<GameRecord> = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Could not parse collection file '{}'", path.display()))?;
    Ok(games)
}

pub fn write_selection(path: &Path, groups: Vec<SelectionGroup>) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Could not create selection file '{}'", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), &SelectionFile { groups })
        .with_context(|| format!("Could not write selection file '{}'", path.display()))?;
    Ok(())
}

pub fn read_selection(path: &Path) -> anyhow::Result<Vec<SelectionGroup>> {
    let file = File::open(path)
        .with_context(|| format!("Could not open selection file '{}'", path.display()))?;
    let selection: SelectionFile = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Could not parse selection file '{}'", path.display()))?;
    Ok(selection.groups)
}
