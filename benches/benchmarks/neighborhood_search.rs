use cgmath::prelude::*;
use criterion::{black_box, criterion_group, Criterion};
use rand::prelude::*;

use yapcisph::sph::{NeighborLists, NeighborhoodSearch};
use yapcisph::units::*;

fn bench_neighborhood_search(c: &mut Criterion) {
    const NUM_POSITIONS: usize = 20000;
    const DENSITY: Real = 10.0;
    let search_radius = black_box(1.0);

    let extent = (NUM_POSITIONS as Real / DENSITY).sqrt();
    let mut rng: rand::rngs::SmallRng = rand::SeedableRng::seed_from_u64(123456789);
    let positions: Vec<Point2> = std::iter::repeat_with(|| Point2::new(rng.gen::<Real>() * extent, rng.gen::<Real>() * extent))
        .take(NUM_POSITIONS)
        .collect();

    let mut neighbor_lists = NeighborLists::new(100);
    let mut searcher = NeighborhoodSearch::<Dim2>::new(search_radius);
    searcher.update_particle_neighbors(&positions, &mut neighbor_lists);

    c.bench_function(
        &format!(
            "neighborhood_search.update (warm), {} positions, {} density, {} search_radius",
            NUM_POSITIONS, DENSITY, search_radius
        ),
        |b| b.iter(|| searcher.update_particle_neighbors(&positions, &mut neighbor_lists)),
    );

    c.bench_function(
        &format!(
            "neighborhood_search.foreach_neighbor, {} positions, {} density, {} search_radius",
            NUM_POSITIONS, DENSITY, search_radius
        ),
        |b| {
            let mut pindex = 0; // cycle through position for a more balanced result
            b.iter(|| {
                let mut accum = Vector2::zero();
                searcher.foreach_neighbor(&positions, positions[pindex], Some(pindex), |j| {
                    accum += positions[j as usize].to_vec();
                });
                pindex = (pindex + 1) % NUM_POSITIONS;
                accum
            })
        },
    );
}

fn config() -> Criterion {
    Criterion::default().warm_up_time(core::time::Duration::new(0, 1000))
}

criterion_group!(
    name = neighborhood_search;
    config = config();
    targets = bench_neighborhood_search
);
