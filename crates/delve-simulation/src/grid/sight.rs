use super::{CombatGrid, GridPosition};

/// Cells on the Bresenham line from `from` to `to`, both ends included.
///
/// Stepping happens in `i64` so far-apart points cannot overflow; every cell
/// lies between the endpoints and fits back into `i32`.
pub fn line_between(from: GridPosition, to: GridPosition) -> Vec<GridPosition> {
    let (x1, y1) = (i64::from(to.x), i64::from(to.y));
    let dx = (x1 - i64::from(from.x)).abs();
    let dy = -(y1 - i64::from(from.y)).abs();
    let sx = if from.x < to.x { 1 } else { -1 };
    let sy = if from.y < to.y { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = (i64::from(from.x), i64::from(from.y));
    let mut cells = vec![from];
    while (x, y) != (x1, y1) {
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
        match (i32::try_from(x), i32::try_from(y)) {
            (Ok(x), Ok(y)) => cells.push(GridPosition::new(x, y)),
            _ => break,
        }
    }
    cells
}

impl CombatGrid {
    /// Whether nothing on the cells strictly between two positions blocks sight.
    /// Off-grid endpoints never see or are seen.
    pub fn line_of_sight(&self, from: GridPosition, to: GridPosition) -> bool {
        if !self.in_bounds(from) || !self.in_bounds(to) {
            return false;
        }
        let line = line_between(from, to);
        let inner = line.len().saturating_sub(1);
        line.iter()
            .take(inner)
            .skip(1)
            .all(|cell| !self.cover_at(*cell).is_some_and(|c| c.blocks_sight()))
    }

    /// Defense bonus the defender gets from intact cover on the cell directly
    /// between it and the attacker. Zero when adjacent or uncovered.
    pub fn cover_bonus_between(&self, attacker: GridPosition, defender: GridPosition) -> i32 {
        if !self.in_bounds(attacker) || !self.in_bounds(defender) {
            return 0;
        }
        let line = line_between(attacker, defender);
        if line.len() < 3 {
            return 0;
        }
        line.get(line.len() - 2)
            .and_then(|cell| self.cover_at(*cell))
            .map_or(0, |cover| cover.defense_bonus())
    }
}
