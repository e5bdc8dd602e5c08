//! Side Scroller headless runner
//!
//! Plays a level with a simple autopilot and prints the outcome.
//!
//! ```text
//! side-scroller [SEED] [--tuning FILE] [--progress FILE] [--seconds N]
//! ```
//!
//! Without a seed the classic course is played; with one, a generated level.

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::io::Result<()> {
    native::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is web::WebSession, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::io;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    use side_scroller::consts::SIM_DT;
    use side_scroller::sim::{GameEvent, GameState, LevelData, TickInput, tick};
    use side_scroller::{Progress, Tuning};

    /// Look-ahead distance for the autopilot
    const PROBE: f32 = 48.0;

    struct Args {
        seed: Option<u64>,
        tuning: Option<PathBuf>,
        progress: Option<PathBuf>,
        seconds: f32,
    }

    fn parse_args() -> io::Result<Args> {
        let mut args = Args {
            seed: None,
            tuning: None,
            progress: None,
            seconds: 120.0,
        };
        let bad = |msg: String| io::Error::new(io::ErrorKind::InvalidInput, msg);

        let mut iter = std::env::args().skip(1);
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--tuning" => args.tuning = iter.next().map(PathBuf::from),
                "--progress" => args.progress = iter.next().map(PathBuf::from),
                "--seconds" => {
                    let value = iter.next().unwrap_or_default();
                    args.seconds = value
                        .parse()
                        .map_err(|_| bad(format!("invalid --seconds value '{value}'")))?;
                }
                other => {
                    args.seed = Some(
                        other
                            .parse()
                            .map_err(|_| bad(format!("unexpected argument '{other}'")))?,
                    );
                }
            }
        }
        Ok(args)
    }

    /// Run right, hop over gaps, walls and enemies, shoot whenever possible
    fn autopilot(state: &GameState) -> TickInput {
        let body = &state.player.body;
        let r = body.rect;
        let ahead = r.right() + PROBE;

        let floor_ahead = state
            .world
            .solids_near(ahead, ahead)
            .any(|(_, s)| s.top() >= r.bottom() - 1.0 && s.left() <= ahead && s.right() >= ahead);
        let wall_ahead = state
            .world
            .solids_near(r.right(), ahead)
            .any(|(_, s)| s.top() < r.bottom() - 1.0 && s.bottom() > r.top() && s.left() >= r.right() - 1.0);
        let enemy_ahead = state.enemies.iter().any(|e| {
            e.is_active()
                && e.is_harmful()
                && e.body.rect.left() > r.left()
                && e.body.rect.left() - r.right() < PROBE * 2.0
        });

        TickInput {
            right: true,
            run: true,
            jump: !floor_ahead || wall_ahead || enemy_ahead,
            fire: true,
            ..Default::default()
        }
    }

    fn now_ms() -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as f64)
            .unwrap_or(0.0)
    }

    pub fn run() -> io::Result<()> {
        env_logger::init();
        let args = parse_args()?;

        let tuning = match &args.tuning {
            Some(path) => Tuning::from_json(&std::fs::read_to_string(path)?)?,
            None => Tuning::default(),
        };
        let level = match args.seed {
            Some(seed) => LevelData::generate(seed),
            None => LevelData::classic(),
        };
        let mut progress = match &args.progress {
            Some(path) => Progress::load(path)?,
            None => Progress::new(),
        };

        log::info!("Side Scroller (native) starting '{}'", level.name);
        let mut state = GameState::new(level, tuning);

        let max_ticks = (args.seconds / SIM_DT) as u64;
        let mut kills = 0;
        while state.is_running() && state.time_ticks < max_ticks {
            let input = autopilot(&state);
            tick(&mut state, &input, SIM_DT);
            for event in &state.events {
                match event {
                    GameEvent::EnemyKilled { .. } => kills += 1,
                    GameEvent::Completed { .. } => {
                        progress.record(event, now_ms());
                    }
                    _ => {}
                }
            }
        }

        let hud = state.hud();
        println!("level:    {}", state.level.name);
        println!("phase:    {:?}", hud.phase);
        println!("ticks:    {}", state.time_ticks);
        println!("x:        {:.0} / {:.0}", state.player.body.rect.x, state.world.width);
        println!("score:    {}", hud.score);
        println!("coins:    {} / {}", hud.coins, hud.required_coins);
        println!("lives:    {}", hud.lives);
        println!("power:    {:?}", hud.power);
        println!("kills:    {kills}");
        if let Some(best) = progress.best_score() {
            println!("best:     {best}");
        }

        if let Some(path) = &args.progress {
            progress.save(path)?;
        }
        Ok(())
    }
}
