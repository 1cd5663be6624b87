//! Spatial model of a battle: bounds, occupancy and movement cost.

use std::collections::BTreeMap;

use super::types::{CharacterId, GridDimensions, Position};

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GridError {
    #[error("grid dimensions {rows}x{columns} must both be non-zero")]
    InvalidDimensions { rows: u32, columns: u32 },

    #[error("no free cell left on the grid")]
    GridFull,

    #[error("position {0} is outside the grid")]
    OutOfBounds(Position),

    #[error("position {position} is already held by {occupant}")]
    Occupied {
        position: Position,
        occupant: CharacterId,
    },

    #[error("occupancy desync: {actor} is not recorded at {position}")]
    OccupancyDesync {
        actor: CharacterId,
        position: Position,
    },
}

/// Rectangular battle grid with at most one active occupant per cell.
///
/// Only participants that are still in the fight are tracked here; defeated
/// or fled participants are removed so their cells become free again.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Grid {
    rows: u32,
    columns: u32,
    #[cfg_attr(feature = "serde", serde(with = "occupancy_serde"))]
    occupants: BTreeMap<Position, CharacterId>,
}

/// JSON object keys must be strings, so occupancy travels as a list of pairs.
#[cfg(feature = "serde")]
mod occupancy_serde {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Deserializer, Serializer};

    use super::{CharacterId, Position};

    pub fn serialize<S: Serializer>(
        occupants: &BTreeMap<Position, CharacterId>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(occupants.iter())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<Position, CharacterId>, D::Error> {
        let pairs = Vec::<(Position, CharacterId)>::deserialize(deserializer)?;
        Ok(pairs.into_iter().collect())
    }
}

impl Grid {
    pub fn new(dimensions: GridDimensions) -> Result<Self, GridError> {
        if dimensions.rows == 0 || dimensions.columns == 0 {
            return Err(GridError::InvalidDimensions {
                rows: dimensions.rows,
                columns: dimensions.columns,
            });
        }

        Ok(Self {
            rows: dimensions.rows,
            columns: dimensions.columns,
            occupants: BTreeMap::new(),
        })
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn dimensions(&self) -> GridDimensions {
        GridDimensions::new(self.rows, self.columns)
    }

    /// Bounds check only.
    pub fn is_valid_position(&self, position: Position) -> bool {
        position.row < self.rows && position.col < self.columns
    }

    pub fn is_occupied(&self, position: Position) -> bool {
        self.occupants.contains_key(&position)
    }

    pub fn occupant(&self, position: Position) -> Option<CharacterId> {
        self.occupants.get(&position).copied()
    }

    /// Iterates `(position, occupant)` pairs in row-major order.
    pub fn occupants(&self) -> impl Iterator<Item = (Position, CharacterId)> + '_ {
        self.occupants.iter().map(|(pos, id)| (*pos, *id))
    }

    /// AP charged for moving between two cells.
    pub fn movement_cost(&self, from: Position, to: Position) -> u32 {
        from.distance(to)
    }

    /// True when `to` is inside the grid and free.
    pub fn can_move_to(&self, to: Position) -> bool {
        self.is_valid_position(to) && !self.is_occupied(to)
    }

    /// First free cell in row-major order.
    pub fn find_available_position(&self) -> Result<Position, GridError> {
        self.cells()
            .find(|pos| !self.is_occupied(*pos))
            .ok_or(GridError::GridFull)
    }

    /// Free cells reachable from `from` within an AP budget, row-major.
    ///
    /// The cell `from` itself is never included.
    pub fn reachable_positions(&self, from: Position, budget: u32) -> Vec<Position> {
        self.cells()
            .filter(|pos| *pos != from)
            .filter(|pos| !self.is_occupied(*pos))
            .filter(|pos| self.movement_cost(from, *pos) <= budget)
            .collect()
    }

    pub(crate) fn place(&mut self, actor: CharacterId, position: Position) -> Result<(), GridError> {
        if !self.is_valid_position(position) {
            return Err(GridError::OutOfBounds(position));
        }
        if let Some(occupant) = self.occupant(position) {
            return Err(GridError::Occupied { position, occupant });
        }
        self.occupants.insert(position, actor);
        Ok(())
    }

    pub(crate) fn vacate(&mut self, actor: CharacterId, position: Position) -> Result<(), GridError> {
        match self.occupants.get(&position) {
            Some(occupant) if *occupant == actor => {
                self.occupants.remove(&position);
                Ok(())
            }
            _ => Err(GridError::OccupancyDesync { actor, position }),
        }
    }

    /// Moves an occupant, leaving the grid untouched on failure.
    pub(crate) fn relocate(
        &mut self,
        actor: CharacterId,
        from: Position,
        to: Position,
    ) -> Result<(), GridError> {
        if !self.is_valid_position(to) {
            return Err(GridError::OutOfBounds(to));
        }
        if let Some(occupant) = self.occupant(to) {
            return Err(GridError::Occupied {
                position: to,
                occupant,
            });
        }
        self.vacate(actor, from)?;
        self.occupants.insert(to, actor);
        Ok(())
    }

    fn cells(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.rows).flat_map(move |row| (0..self.columns).map(move |col| Position::new(row, col)))
    }
}

impl Default for Grid {
    fn default() -> Self {
        let dims = GridDimensions::default();
        Self {
            rows: dims.rows,
            columns: dims.columns,
            occupants: BTreeMap::new(),
        }
    }
}
