use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::Context;
use cardstock::{CardLayout, GroupSpec};
use serde::Deserialize;

/// Run configuration, one JSON file for all pipeline stages.
///
/// Every key must be present; there are no baked-in defaults. A missing
/// key aborts the run before any work starts.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Normalized collection, as written by the external fetch stage.
    pub collection: PathBuf,
    /// Where `select` writes the groups and `render` reads them back.
    pub selection_file: PathBuf,
    /// Artwork cache, one `{id}.jpeg` per game, populated externally.
    pub artwork_dir: PathBuf,
    /// Icons and the card-back design.
    pub resources_dir: PathBuf,
    /// Where the finished card images go.
    pub output_dir: PathBuf,
    /// Taxonomy id marking a game as an expansion, filtered before selection.
    pub expansion_category: u64,
    /// Game ids never selected onto a card.
    pub exclude: Vec<u64>,
    /// The groups to fill, in selection order.
    pub groups: Vec<GroupSpec>,
    pub layout: CardLayout,
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Could not open config file '{}'", path.display()))?;
        let mut config: Config = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Could not parse config file '{}'", path.display()))?;

        // Fonts, icons and the back design live in the resources
        // directory unless given as absolute paths.
        let resources = config.resources_dir.clone();
        for file in [
            &mut config.layout.font_main,
            &mut config.layout.font_heading,
            &mut config.layout.back_image,
        ] {
            anchor(file, &resources);
        }
        for icon in &mut config.layout.icons {
            anchor(&mut icon.file, &resources);
        }
        Ok(config)
    }

    pub fn artwork_path(&self, id: u64) -> PathBuf {
        self.artwork_dir.join(format!("{}.jpeg", id))
    }
}

fn anchor(file: &mut PathBuf, directory: &Path) {
    if file.is_relative() {
        *file = directory.join(&*file);
    }
}
