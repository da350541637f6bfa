use cgmath::prelude::*;
use more_asserts::*;

use yapcisph::sph::*;
use yapcisph::units::*;

const GRAVITY: Real = -9.81;
const TIME_STEP: Real = 1.0e-4;

fn world_2d() -> FluidParticleWorld<Dim2> {
    FluidParticleWorld::new(&ParticleSystemConfig::default()).unwrap()
}

#[test]
fn viscosity_damps_fall_onto_boundary_particle() {
    let mut world = world_2d();
    // inside the support radius of the boundary particle
    world.particles.push(Point2::new(0.0, 0.15), Vector2::zero(), 1000.0, Material::Fluid);
    world.particles.push(Point2::new(0.0, 0.0), Vector2::zero(), 1000.0, Material::Boundary);
    let mut solver = PCISPHSolver::<Dim2, _>::with_laminar_viscosity(SolverConfig::default(), &world.properties).unwrap();

    let mut previous_speed = 0.0;
    for step in 1..=100 {
        let stats = solver.simulation_step(&mut world).unwrap();
        assert!(stats.converged);
        assert_eq!(world.particles.neighbors.neighbors(0), &[1]);

        let speed = -world.particles.velocities[0].y;
        let free_fall_speed = -GRAVITY * step as Real * TIME_STEP;
        assert_gt!(speed, previous_speed, "step {}", step);
        assert_le!(speed, free_fall_speed * 1.0001, "step {}", step);
        previous_speed = speed;
    }
    assert_lt!(previous_speed, 0.995 * -GRAVITY * 100.0 * TIME_STEP);
    assert_eq!(world.particles.positions[1], Point2::new(0.0, 0.0));
    assert_eq!(world.particles.velocities[1], Vector2::zero());
    assert_lt!(world.particles.positions[0].y, 0.15);
}

#[test]
fn resting_lattice_stays_at_rest() {
    let mut world = world_2d();
    for &(x, y) in &[(0.0, 0.0), (0.1, 0.0), (0.0, 0.1), (0.1, 0.1)] {
        world.particles.push(Point2::new(x, y), Vector2::zero(), 1000.0, Material::Fluid);
    }
    let config = SolverConfig {
        gravity: 0.0,
        ..Default::default()
    };
    let mut solver = PCISPHSolver::<Dim2, _>::with_laminar_viscosity(config, &world.properties).unwrap();
    let initial_positions = world.particles.positions.clone();

    for _ in 0..10 {
        let stats = solver.simulation_step(&mut world).unwrap();
        assert_eq!(stats.iterations, 0);
        assert_eq!(stats.density_error, 0.0);
    }
    assert_eq!(world.particles.positions, initial_positions);
}

#[test]
fn fluid_block_in_3d_stays_finite() {
    let mut world = FluidParticleWorld::<Dim3>::new(&ParticleSystemConfig::default()).unwrap();
    world
        .add_fluid_block(Point3::new(0.0, 0.0, 0.1), Vector3::new(0.4, 0.4, 0.4), Vector3::zero(), 1000.0, 0.0)
        .unwrap();
    world.add_boundary_line(Point3::new(-0.2, 0.2, 0.0), Point3::new(0.6, 0.2, 0.0), 1000.0).unwrap();
    let config = SolverConfig {
        max_pressure_iterations: 20,
        ..Default::default()
    };
    let mut solver = PCISPHSolver::<Dim3, _>::with_laminar_viscosity(config, &world.properties).unwrap();

    for _ in 0..5 {
        let stats = solver.simulation_step(&mut world).unwrap();
        assert!(stats.stiffness.is_finite());
        assert_le!(stats.iterations, 20);
    }
    for (p, v) in world.particles.positions.iter().zip(world.particles.velocities.iter()) {
        assert!(p.x.is_finite() && p.y.is_finite() && p.z.is_finite());
        assert!(v.magnitude().is_finite());
    }
    assert!(world.particles.densities.iter().all(|&d| d >= 1000.0));
}

#[test]
fn dam_drop_scene_runs() {
    let config = SimulationConfig {
        solver: SolverConfig {
            max_pressure_iterations: 10,
            ..Default::default()
        },
        ..Default::default()
    };
    let mut world = FluidParticleWorld::<Dim2>::new(&config.particles).unwrap();
    world.add_scene(&config.scene, config.solver.rest_density).unwrap();
    let num_boundary_particles = world.particles.num_boundary_particles();
    let mut solver = PCISPHSolver::<Dim2, _>::with_laminar_viscosity(config.solver.clone(), &world.properties).unwrap();

    let start_height: Real = world.particles.positions.iter().map(|p| p.y).sum();
    for _ in 0..5 {
        solver.simulation_step(&mut world).unwrap();
    }
    let end_height: Real = world.particles.positions.iter().map(|p| p.y).sum();

    // blocks were dropped with a downward velocity
    assert_lt!(end_height, start_height);
    assert_eq!(world.particles.num_boundary_particles(), num_boundary_particles);
    assert!(world.particles.pressures.iter().all(|p| p.is_finite()));
    assert!(world.particles.densities.iter().all(|&d| d >= config.solver.rest_density));

    let json = serde_json::to_string(&world.snapshot()).unwrap();
    assert!(json.contains("Fluid"));
}
