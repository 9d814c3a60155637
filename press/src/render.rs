use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context};
use cardstock::{write_png, CardFace, CardRenderer, FontLibrary, GameRecord, SelectionGroup};
use rayon::prelude::*;
use tracing::{error, info};

use crate::config::Config;

/// One card's worth of work: selection metadata resolved against the
/// collection, plus where its artwork and output live.
struct CardJob<'a> {
    face: CardFace<'a>,
    artwork: PathBuf,
    output: PathBuf,
}

/// Render every selected game to a card image, plus the shared card back.
///
/// Cards are independent of each other, so they render in parallel; the
/// per-card outcomes are collected and reported at the end instead of
/// being lost with their worker. A failed card fails the run only after
/// all other cards have had their chance.
pub fn render_cards(
    config: &Config,
    groups: &[SelectionGroup],
    collection: &[GameRecord],
) -> anyhow::Result<()> {
    let by_id: HashMap<u64, &GameRecord> = collection.iter().map(|game| (game.id, game)).collect();

    std::fs::create_dir_all(&config.output_dir).with_context(|| {
        format!(
            "Could not create output directory '{}'",
            config.output_dir.display()
        )
    })?;

    let fonts = FontLibrary::load(&config.layout.font_main, &config.layout.font_heading)?;
    let renderer = CardRenderer::new(&config.layout, &fonts);

    // Resolve every card up front. A selection entry pointing at a game
    // the collection no longer has is reported but must not stop the rest.
    let mut jobs = Vec::new();
    let mut failures: Vec<(String, anyhow::Error)> = Vec::new();
    let mut total = 0usize;
    for group in groups {
        for selected in &group.games {
            total += 1;
            let id = selected.record.id;
            match by_id.get(&id) {
                Some(record) => {
                    let face = CardFace::with_record(group, selected, record);
                    let artwork = config.artwork_path(id);
                    let output = config.output_dir.join(format!("{}.png", face.file_stem()));
                    jobs.push(CardJob {
                        face,
                        artwork,
                        output,
                    });
                }
                None => failures.push((
                    format!("{}{}", group.label, selected.index),
                    anyhow!("game {} is not in the collection", id),
                )),
            }
        }
    }

    // The artwork cache is populated by the upstream fetch stage, so it
    // is verified sequentially before fanning out; the parallel phase
    // below only ever reads it.
    let (ready, cold): (Vec<CardJob>, Vec<CardJob>) =
        jobs.into_iter().partition(|job| job.artwork.is_file());
    for job in cold {
        failures.push((
            job.face.file_stem(),
            anyhow!(
                "no cached artwork for game {} at '{}'",
                job.face.record.id,
                job.artwork.display()
            ),
        ));
    }

    let outcomes: Vec<(String, anyhow::Result<()>)> = ready
        .par_iter()
        .map(|job| {
            let result = renderer
                .render(&job.face, &job.artwork)
                .map_err(anyhow::Error::from)
                .and_then(|pixmap| Ok(write_png(&pixmap, &job.output)?));
            (job.face.file_stem(), result)
        })
        .collect();

    let mut written = 0usize;
    for (card, result) in outcomes {
        match result {
            Ok(()) => {
                written += 1;
                info!(card = %card, "card written");
            }
            Err(err) => failures.push((card, err)),
        }
    }

    let back = renderer.render_back()?;
    let back_path = config.output_dir.join("back.png");
    write_png(&back, &back_path)?;
    info!(path = %back_path.display(), "card back written");

    if !failures.is_empty() {
        for (card, err) in &failures {
            error!(card = %card, "{:#}", err);
        }
        bail!("{} of {} cards failed", failures.len(), total);
    }
    info!(written, "all cards rendered");
    Ok(())
}
