use std::time::Duration;

use anyhow::{Context, Result};
use glam::Vec2;
use log::info;

use slingshot_siege::game::damage::CollisionEventKind;
use slingshot_siege::game::{LevelDescriptor, LevelStatus, Simulation, SimulationConfig};

/// One 60Hz frame
const FRAME: Duration = Duration::from_micros(16_667);
/// Frames to wait for a shot to play out before loading the next bird
const MAX_FRAMES_PER_SHOT: u32 = 1500;

/// Pulls tried in order, one per bird
const PULLS: [Vec2; 5] = [
    Vec2::new(-120.0, 60.0),
    Vec2::new(-130.0, 40.0),
    Vec2::new(-110.0, 80.0),
    Vec2::new(-140.0, 30.0),
    Vec2::new(-100.0, 100.0),
];

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let number = match std::env::args().nth(1) {
        Some(arg) => arg.parse().with_context(|| format!("level number expected, got '{arg}'"))?,
        None => 1,
    };

    let config = SimulationConfig::default();
    let level = LevelDescriptor::builtin(number, &config.arena)?;
    info!(
        "Starting level {} '{}' (difficulty {:.0})",
        number,
        level.name,
        level.difficulty(&config.arena)
    );

    let mut sim = Simulation::new(config, &level)?;
    let mut shot = 0;

    while sim.status() == LevelStatus::Playing && sim.birds_remaining() > 0 {
        let kind = sim.load_next_bird()?;
        let pull = PULLS[shot % PULLS.len()];
        let preview = sim.aim(pull)?;
        let velocity = sim.release()?;
        info!(
            "Shot {} ({:?}): pull {:?}, velocity {:?}, preview {} points",
            shot + 1,
            kind,
            pull,
            velocity,
            preview.len()
        );
        shot += 1;

        for _ in 0..MAX_FRAMES_PER_SHOT {
            for report in sim.update(FRAME) {
                for event in &report.events {
                    if matches!(
                        event.kind,
                        CollisionEventKind::PigEliminated
                            | CollisionEventKind::PigCrushed
                            | CollisionEventKind::PigFell
                            | CollisionEventKind::BlockCollapsed
                    ) {
                        info!(
                            "{:?} at ({:.0}, {:.0}) +{:.0}",
                            event.kind, event.position.x, event.position.y, event.score_delta
                        );
                    }
                }
            }
            if sim.entities().birds_in_flight() == 0 || sim.status() != LevelStatus::Playing {
                break;
            }
        }

        info!(
            "After shot {}: score {:.0}, x{:.1} combo, {} pigs, {} blocks",
            shot,
            sim.score(),
            sim.combo().multiplier(),
            sim.entities().remaining_pigs(),
            sim.entities().intact_blocks()
        );
    }

    // Let the last shot finish before reporting the outcome
    let mut frames = 0;
    while sim.status() == LevelStatus::Playing && frames < MAX_FRAMES_PER_SHOT {
        sim.update(FRAME);
        frames += 1;
    }

    info!("Level over: {:?}, final score {:.0}", sim.status(), sim.score());
    Ok(())
}
