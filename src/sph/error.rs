use crate::units::Real;

/// Errors reported by the fluid world and the solvers.
///
/// Numerical degeneracies (overlapping particles, a pressure solve that does not converge)
/// are not errors, they degrade to bounded approximations.
#[derive(Debug)]
pub enum SphError {
    /// Time step is not a finite positive number.
    InvalidTimeStep(Real),
    /// Rest density is not a finite positive number.
    InvalidRestDensity(Real),
    InvalidConfig(String),
    NeighborCapacityExceeded {
        particle: usize,
        count: usize,
        capacity: usize,
    },
    NeighborIndexOutOfRange {
        particle: usize,
        neighbor: usize,
        num_particles: usize,
    },
    ParticleIndexOutOfRange {
        particle: usize,
        num_particles: usize,
    },
    ParticleCapacityExceeded {
        requested: usize,
        capacity: usize,
    },
    /// Particle attribute arrays disagree in length.
    ParticleCountMismatch {
        expected: usize,
        found: usize,
    },
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for SphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SphError::InvalidTimeStep(dt) => write!(f, "time step must be finite and positive, got {}", dt),
            SphError::InvalidRestDensity(density) => write!(f, "rest density must be finite and positive, got {}", density),
            SphError::InvalidConfig(reason) => write!(f, "invalid configuration: {}", reason),
            SphError::NeighborCapacityExceeded { particle, count, capacity } => write!(
                f,
                "particle {} has {} neighbors, but neighbor lists only hold {}",
                particle, count, capacity
            ),
            SphError::NeighborIndexOutOfRange {
                particle,
                neighbor,
                num_particles,
            } => write!(
                f,
                "particle {} lists neighbor {}, but there are only {} particles",
                particle, neighbor, num_particles
            ),
            SphError::ParticleIndexOutOfRange { particle, num_particles } => {
                write!(f, "particle {} does not exist, there are only {} particles", particle, num_particles)
            }
            SphError::ParticleCapacityExceeded { requested, capacity } => {
                write!(f, "requested {} particles, but capacity is {}", requested, capacity)
            }
            SphError::ParticleCountMismatch { expected, found } => {
                write!(f, "particle attribute has {} entries, expected {}", found, expected)
            }
            SphError::Io(err) => write!(f, "io error: {}", err),
            SphError::Json(err) => write!(f, "json error: {}", err),
        }
    }
}

impl std::error::Error for SphError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SphError::Io(err) => Some(err),
            SphError::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SphError {
    fn from(err: std::io::Error) -> Self {
        SphError::Io(err)
    }
}

impl From<serde_json::Error> for SphError {
    fn from(err: serde_json::Error) -> Self {
        SphError::Json(err)
    }
}

pub type SphResult<T> = Result<T, SphError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_values() {
        let err = SphError::NeighborCapacityExceeded {
            particle: 3,
            count: 120,
            capacity: 100,
        };
        assert_eq!(err.to_string(), "particle 3 has 120 neighbors, but neighbor lists only hold 100");
        assert!(SphError::InvalidTimeStep(-1.0).to_string().contains("-1"));
    }

    #[test]
    fn json_errors_convert() {
        let json_err = serde_json::from_str::<u32>("not a number").unwrap_err();
        let err: SphError = json_err.into();
        assert!(matches!(err, SphError::Json(_)));
        assert!(std::error::Error::source(&err).is_some());
    }
}
