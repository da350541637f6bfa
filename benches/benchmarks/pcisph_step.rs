use criterion::{criterion_group, Criterion};

use yapcisph::sph::*;
use yapcisph::units::*;

fn bench_pcisph_step(c: &mut Criterion) {
    let config = SimulationConfig {
        solver: SolverConfig {
            // keep the compressed phase of the drop from dominating
            max_pressure_iterations: 50,
            ..Default::default()
        },
        ..Default::default()
    };
    let mut fluid_world = FluidParticleWorld::<Dim2>::new(&config.particles).unwrap();
    fluid_world.add_scene(&config.scene, config.solver.rest_density).unwrap();
    let mut solver = PCISPHSolver::<Dim2, _>::with_laminar_viscosity(config.solver.clone(), &fluid_world.properties).unwrap();

    c.bench_function(
        &format!(
            "pcisph_step - FluidParticleWorld with {} fluid particles and {} boundary particles",
            fluid_world.particles.num_fluid_particles(),
            fluid_world.particles.num_boundary_particles()
        ),
        |b| b.iter(|| solver.simulation_step(&mut fluid_world).unwrap()),
    );
}

fn config() -> Criterion {
    Criterion::default().sample_size(20)
}

criterion_group!(
    name = pcisph_step;
    config = config();
    targets = bench_pcisph_step
);
