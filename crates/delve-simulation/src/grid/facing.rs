use std::f64::consts::FRAC_PI_4;

use serde::{Deserialize, Serialize};

/// One of the eight compass directions. North is toward smaller `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facing {
    /// Toward smaller `y`.
    North,
    /// Up and right.
    NorthEast,
    /// Toward larger `x`.
    East,
    /// Down and right.
    SouthEast,
    /// Toward larger `y`.
    South,
    /// Down and left.
    SouthWest,
    /// Toward smaller `x`.
    West,
    /// Up and left.
    NorthWest,
}

impl Facing {
    /// All eight directions, clockwise from north.
    pub const ALL: [Facing; 8] = [
        Facing::North,
        Facing::NorthEast,
        Facing::East,
        Facing::SouthEast,
        Facing::South,
        Facing::SouthWest,
        Facing::West,
        Facing::NorthWest,
    ];

    /// Nearest compass direction of the vector `(dx, dy)`. `None` for the zero vector.
    pub fn from_delta(dx: i32, dy: i32) -> Option<Self> {
        if dx == 0 && dy == 0 {
            return None;
        }
        // Sectors counted clockwise from east, since y grows southward.
        let angle = f64::from(dy).atan2(f64::from(dx));
        let sector = (angle / FRAC_PI_4).round() as i32;
        Some(match sector.rem_euclid(8) {
            0 => Facing::East,
            1 => Facing::SouthEast,
            2 => Facing::South,
            3 => Facing::SouthWest,
            4 => Facing::West,
            5 => Facing::NorthWest,
            6 => Facing::North,
            _ => Facing::NorthEast,
        })
    }

    /// Unit step in this direction.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Facing::North => (0, -1),
            Facing::NorthEast => (1, -1),
            Facing::East => (1, 0),
            Facing::SouthEast => (1, 1),
            Facing::South => (0, 1),
            Facing::SouthWest => (-1, 1),
            Facing::West => (-1, 0),
            Facing::NorthWest => (-1, -1),
        }
    }

    /// The direction pointing the other way.
    pub fn opposite(self) -> Self {
        let (dx, dy) = self.delta();
        Facing::from_delta(-dx, -dy).unwrap_or(self)
    }
}

impl std::fmt::Display for Facing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Facing::North => "north",
            Facing::NorthEast => "north-east",
            Facing::East => "east",
            Facing::SouthEast => "south-east",
            Facing::South => "south",
            Facing::SouthWest => "south-west",
            Facing::West => "west",
            Facing::NorthWest => "north-west",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_deltas_round_trip() {
        for facing in Facing::ALL {
            let (dx, dy) = facing.delta();
            assert_eq!(Facing::from_delta(dx, dy), Some(facing));
        }
    }

    #[test]
    fn long_vectors_snap_to_nearest() {
        assert_eq!(Facing::from_delta(5, -1), Some(Facing::East));
        assert_eq!(Facing::from_delta(4, -3), Some(Facing::NorthEast));
        assert_eq!(Facing::from_delta(-1, 9), Some(Facing::South));
        assert_eq!(Facing::from_delta(-7, 0), Some(Facing::West));
    }

    #[test]
    fn zero_vector_has_no_facing() {
        assert_eq!(Facing::from_delta(0, 0), None);
    }

    #[test]
    fn opposite_directions() {
        assert_eq!(Facing::North.opposite(), Facing::South);
        assert_eq!(Facing::SouthWest.opposite(), Facing::NorthEast);
    }
}
