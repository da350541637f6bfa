use cgmath::prelude::*;
use serde::Serialize;
use std::fmt::Debug;
use std::ops::{AddAssign, Neg, SubAssign};

// For simulating
pub type Real = f32;

/// Integer grid cell coordinate. Unused trailing axes are zero.
pub type CellCoord = [i32; 3];

/// Binds the simulation to a spatial dimensionality.
///
/// All solver code is generic over this, the dimension only decides the vector types,
/// the kernel normalization and how lattices and grid cells are enumerated.
pub trait Dimension: Copy + Clone + Default + Debug + Send + Sync + 'static {
    const DIM: usize;

    type Vector: InnerSpace<Scalar = Real> + Array<Element = Real> + Neg<Output = Self::Vector> + AddAssign + SubAssign + Debug + PartialEq + Send + Sync + Serialize;
    type Point: EuclideanSpace<Scalar = Real, Diff = Self::Vector> + AddAssign<Self::Vector> + Debug + PartialEq + Send + Sync + Serialize;

    /// Unit vector along the last axis. Gravity acts along this axis.
    fn up() -> Self::Vector;

    /// Dimension dependent normalization σ of the cubic spline kernel (before division by h^D).
    fn cubic_spline_sigma() -> Real;

    /// Builds a vector from the first `DIM` components. Missing components are zero.
    fn vector_from_slice(components: &[Real]) -> Self::Vector;

    /// Calls `f` with every offset of a regular lattice with the given spacing covering [-n, n]^DIM.
    fn foreach_lattice_offset(n: i32, spacing: Real, f: impl FnMut(Self::Vector));

    fn cell_coord(position: Self::Point, cell_size_inv: Real) -> CellCoord;

    /// Calls `f` with `cell` and all cells sharing a face, edge or corner with it.
    fn foreach_adjacent_cell(cell: CellCoord, f: impl FnMut(CellCoord));

    #[inline]
    fn point_from_slice(components: &[Real]) -> Self::Point {
        Self::Point::from_vec(Self::vector_from_slice(components))
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Dim2;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Dim3;

pub type Vector2 = cgmath::Vector2<Real>;
pub type Point2 = cgmath::Point2<Real>;
pub type Vector3 = cgmath::Vector3<Real>;
pub type Point3 = cgmath::Point3<Real>;

#[inline]
fn component(components: &[Real], i: usize) -> Real {
    components.get(i).copied().unwrap_or(0.0)
}

impl Dimension for Dim2 {
    const DIM: usize = 2;

    type Vector = Vector2;
    type Point = Point2;

    #[inline]
    fn up() -> Vector2 {
        Vector2::unit_y()
    }

    fn cubic_spline_sigma() -> Real {
        40.0 / (7.0 * std::f64::consts::PI as Real)
    }

    fn vector_from_slice(components: &[Real]) -> Vector2 {
        Vector2::new(component(components, 0), component(components, 1))
    }

    fn foreach_lattice_offset(n: i32, spacing: Real, mut f: impl FnMut(Vector2)) {
        for y in -n..=n {
            for x in -n..=n {
                f(Vector2::new(x as Real, y as Real) * spacing);
            }
        }
    }

    #[inline]
    fn cell_coord(position: Point2, cell_size_inv: Real) -> CellCoord {
        [
            (position.x * cell_size_inv).floor() as i32,
            (position.y * cell_size_inv).floor() as i32,
            0,
        ]
    }

    #[inline]
    fn foreach_adjacent_cell(cell: CellCoord, mut f: impl FnMut(CellCoord)) {
        for y in -1..=1 {
            for x in -1..=1 {
                f([cell[0] + x, cell[1] + y, 0]);
            }
        }
    }
}

impl Dimension for Dim3 {
    const DIM: usize = 3;

    type Vector = Vector3;
    type Point = Point3;

    #[inline]
    fn up() -> Vector3 {
        Vector3::unit_z()
    }

    fn cubic_spline_sigma() -> Real {
        8.0 / std::f64::consts::PI as Real
    }

    fn vector_from_slice(components: &[Real]) -> Vector3 {
        Vector3::new(component(components, 0), component(components, 1), component(components, 2))
    }

    fn foreach_lattice_offset(n: i32, spacing: Real, mut f: impl FnMut(Vector3)) {
        for z in -n..=n {
            for y in -n..=n {
                for x in -n..=n {
                    f(Vector3::new(x as Real, y as Real, z as Real) * spacing);
                }
            }
        }
    }

    #[inline]
    fn cell_coord(position: Point3, cell_size_inv: Real) -> CellCoord {
        [
            (position.x * cell_size_inv).floor() as i32,
            (position.y * cell_size_inv).floor() as i32,
            (position.z * cell_size_inv).floor() as i32,
        ]
    }

    #[inline]
    fn foreach_adjacent_cell(cell: CellCoord, mut f: impl FnMut(CellCoord)) {
        for z in -1..=1 {
            for y in -1..=1 {
                for x in -1..=1 {
                    f([cell[0] + x, cell[1] + y, cell[2] + z]);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lattice_offsets_cover_cube() {
        let mut count = 0;
        let mut sum = Vector2::zero();
        Dim2::foreach_lattice_offset(2, 0.5, |offset| {
            count += 1;
            sum += offset;
        });
        assert_eq!(count, 25);
        assert_eq!(sum, Vector2::zero());

        let mut count = 0;
        Dim3::foreach_lattice_offset(1, 1.0, |_| count += 1);
        assert_eq!(count, 27);
    }

    #[test]
    fn cell_coords_floor_negative_positions() {
        assert_eq!(Dim2::cell_coord(Point2::new(-0.1, 0.3), 2.0), [-1, 0, 0]);
        assert_eq!(Dim3::cell_coord(Point3::new(1.0, -1.0, 0.49), 2.0), [2, -2, 0]);
    }

    #[test]
    fn up_is_last_axis() {
        assert_eq!(Dim2::up(), Vector2::new(0.0, 1.0));
        assert_eq!(Dim3::up(), Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(Dim3::point_from_slice(&[1.0, 2.0]), Point3::new(1.0, 2.0, 0.0));
    }
}
