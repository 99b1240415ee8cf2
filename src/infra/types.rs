use serde::Serialize;

/// A grid cell address. Rows grow downwards, columns grow to the right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    pub fn distance(&self, other: &Position) -> i32 {
        (self.row - other.row).abs() + (self.col - other.col).abs()
    }

    pub fn step(&self, direction: Direction) -> Position {
        let (dr, dc) = direction.offset();
        Position::new(self.row + dr, self.col + dc)
    }

    pub fn neighbors(&self) -> [Position; 4] {
        Direction::ALL.map(|direction| self.step(direction))
    }

    pub fn is_adjacent(&self, other: &Position) -> bool {
        self.distance(other) == 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// (row, col) delta of a single step in this direction.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::North => (-1, 0),
            Direction::East => (0, 1),
            Direction::South => (1, 0),
            Direction::West => (0, -1),
        }
    }

    pub fn reverse(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }
}
