use std::fs;

use formicary::config::Config;
use formicary::engine::compiler;
use formicary::engine::config::MAX_COLONIES;
use formicary::engine::field::Field;
use formicary::engine::world::{Simulation, TickResult};

fn main() {
    tracing_subscriber::fmt::init();

    let config = Config::load();
    if let Err(err) = run(&config) {
        tracing::error!(error = %err, "run aborted");
        std::process::exit(1);
    }
}

fn run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let field = Field::load(&config.field)
        .map_err(|e| format!("{}: {e}", config.field.display()))?;

    let mut programs = Vec::new();
    for path in config.programs.iter().take(MAX_COLONIES) {
        let source = fs::read_to_string(path).map_err(|e| format!("{}: {e}", path.display()))?;
        let (name, program) =
            compiler::compile(&source).map_err(|e| format!("{}: {e}", path.display()))?;
        tracing::info!(colony = %name, path = %path.display(), "loaded colony program");
        programs.push((name, program));
    }

    let mut sim = Simulation::from_field(&field, programs, config.seed);
    tracing::info!(
        width = field.width(),
        height = field.height(),
        seed = config.seed,
        "simulation starting"
    );

    loop {
        match sim.tick() {
            TickResult::Continue => {}
            TickResult::Won(name) => {
                tracing::info!(winner = %name, tick = sim.tick_count(), "simulation over");
                break;
            }
            TickResult::NoWinner => {
                tracing::info!(tick = sim.tick_count(), "simulation over without a winner");
                break;
            }
        }
    }

    println!("{}", serde_json::to_string_pretty(&sim.standings())?);
    Ok(())
}
