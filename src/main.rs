use std::collections::VecDeque;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use yapcisph::sph::*;
use yapcisph::units::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    microprofile::init!();
    microprofile::set_enable_all_groups!(true);

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => SimulationConfig::load_json(&PathBuf::from(path))?,
        None => SimulationConfig::default(),
    };
    let snapshot_path = args.next().map(PathBuf::from);

    let mut state = MainState::new(&config)?;
    for frame in 0..config.num_frames {
        state.update(config.steps_per_frame)?;
        log::info!(
            "frame {:4}: {} steps, sim time {:.4}s, avg step {:.2}ms, {} pressure iterations, density error {:.4}",
            frame,
            state.simulationstep_count,
            state.total_simulation_time.as_secs_f64(),
            state.average_step_duration().as_secs_f64() * 1000.0,
            state.last_stats.map_or(0, |s| s.iterations),
            state.last_stats.map_or(0.0, |s| s.density_error),
        );
    }
    log::info!(
        "simulated {:.3}s in {:.3}s",
        state.total_simulation_time.as_secs_f64(),
        state.total_simulation_processing_time.as_secs_f64()
    );

    if let Some(path) = snapshot_path {
        save_json(&state.fluid_world.snapshot(), &path)?;
        log::info!("wrote snapshot to {}", path.display());
    }
    Ok(())
}

struct MainState {
    fluid_world: FluidParticleWorld<Dim2>,
    sph_solver: Box<dyn Solver<Dim2>>,

    simulation_step_duration_history: VecDeque<Duration>,
    simulationstep_count: u32,
    last_stats: Option<StepStats>,

    time_step: Duration,
    total_simulation_time: Duration,
    total_simulation_processing_time: Duration,
}

const SIMULATION_STEP_HISTORY_LENGTH: usize = 80;

impl MainState {
    pub fn new(config: &SimulationConfig) -> SphResult<MainState> {
        config.validate()?;
        let mut fluid_world = FluidParticleWorld::new(&config.particles)?;
        fluid_world.add_scene(&config.scene, config.solver.rest_density)?;
        let sph_solver = PCISPHSolver::<Dim2, _>::with_laminar_viscosity(config.solver.clone(), &fluid_world.properties)?;

        Ok(MainState {
            fluid_world,
            sph_solver: Box::new(sph_solver),

            simulation_step_duration_history: VecDeque::with_capacity(SIMULATION_STEP_HISTORY_LENGTH),
            simulationstep_count: 0,
            last_stats: None,

            time_step: Duration::from_secs_f64(config.solver.time_step as f64),
            total_simulation_time: Default::default(),
            total_simulation_processing_time: Default::default(),
        })
    }

    fn update(&mut self, num_steps: usize) -> SphResult<()> {
        microprofile::scope!("MainState", "update");

        self.simulationstep_count = 0;
        for _ in 0..num_steps {
            let time_step_start = Instant::now();
            self.last_stats = Some(self.sph_solver.simulation_step(&mut self.fluid_world)?);
            let step_processing_time = Instant::now() - time_step_start;

            self.total_simulation_processing_time += step_processing_time;
            self.total_simulation_time += self.time_step;
            self.simulationstep_count += 1;

            if self.simulation_step_duration_history.len() == SIMULATION_STEP_HISTORY_LENGTH {
                self.simulation_step_duration_history.pop_front();
            }
            self.simulation_step_duration_history.push_back(step_processing_time);
        }

        microprofile::flip!();
        Ok(())
    }

    fn average_step_duration(&self) -> Duration {
        if self.simulation_step_duration_history.is_empty() {
            return Duration::default();
        }
        self.simulation_step_duration_history.iter().sum::<Duration>() / self.simulation_step_duration_history.len() as u32
    }
}
