//! Broomsticks headless driver
//!
//! Plays a 2-on-2 robot match on a simulated clock and prints the final
//! state as JSON. Useful for soak-testing the simulation and tuning settings.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::time::{SystemTime, UNIX_EPOCH};

    use broomsticks::Settings;
    use broomsticks::sim::{Action, ActionEvent, GameEvent, GamePhase, GameState, TickInput, tick};

    /// Stop after ten simulated minutes even without a winner
    const TIME_LIMIT_MS: u64 = 10 * 60 * 1000;

    env_logger::init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| Settings::FILE_NAME.to_string());
    let settings = match Settings::load(&path) {
        Ok(settings) => settings,
        Err(e) => {
            log::error!("{}; falling back to defaults", e);
            Settings::default()
        }
    };

    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default();
    log::info!("Broomsticks starting in {} with seed {}", settings.mode.as_str(), seed);

    let mut state = GameState::new(&settings, seed);
    state.set_num_players(4);
    log::debug!("{} entities on the field", state.entities().filter(|e| e.visible()).count());

    let frame_ms = settings.frame_budget_ms().max(1);
    let mut now: u64 = 0;
    // Hand every slot to the robot on the title screen, then kick off
    let kickoff = TickInput {
        actions: (0..state.num_players())
            .map(|player| ActionEvent {
                player,
                action: Action::ToggleAi,
                pressed: true,
            })
            .collect(),
        start: true,
        ..Default::default()
    };
    tick(&mut state, &kickoff, 0.0, now);

    while state.phase == GamePhase::Playing && now < TIME_LIMIT_MS {
        now += u64::from(frame_ms);
        tick(&mut state, &TickInput::default(), frame_ms as f32, now);

        for event in state.drain_events() {
            match event {
                GameEvent::Score { side, points } => {
                    log::info!("{:?} scores {} ({:?})", side, points, state.scores)
                }
                GameEvent::Won { side, scores } => {
                    log::info!("{:?} wins {}-{} at {} ms", side, scores[0], scores[1], now)
                }
                other => log::trace!("{:?}", other),
            }
        }
    }

    if state.phase == GamePhase::Playing {
        log::info!("Time limit reached at {:?}", state.scores);
    }

    match serde_json::to_string_pretty(&state) {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("Failed to serialize final state: {}", e),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Platforms embed the library directly
}
