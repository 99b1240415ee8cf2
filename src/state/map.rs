use crate::infra::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tile {
    Empty,
    Wall,
    Trap,
    Key,
    Goal,
}

impl Tile {
    /// Numeric cell code handed to the rendering collaborator.
    pub fn code(self) -> u8 {
        match self {
            Tile::Empty => 0,
            Tile::Wall => 1,
            Tile::Goal => 3,
            Tile::Key => 4,
            Tile::Trap => 5,
        }
    }

    /// Cells the agent may plan through. Traps block planning outright.
    pub fn is_walkable(self) -> bool {
        !matches!(self, Tile::Wall | Tile::Trap)
    }

    /// Cells an enemy may enter. Enemies walk over traps.
    pub fn is_passable(self) -> bool {
        self != Tile::Wall
    }
}

/// Dense row-major grid of tiles with fixed dimensions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Map {
    pub width: i32,
    pub height: i32,
    tiles: Vec<Tile>,
}

impl Map {
    pub fn new(width: i32, height: i32) -> Self {
        Self::filled(width, height, Tile::Empty)
    }

    pub fn filled(width: i32, height: i32, tile: Tile) -> Self {
        Self {
            width,
            height,
            tiles: vec![tile; (width.max(0) * height.max(0)) as usize],
        }
    }

    /// Builds a map from rows of `#` (wall), `T` (trap), `K` (key), `G` (goal)
    /// and anything else as empty. Rows must share one length.
    pub fn from_ascii(rows: &[&str]) -> Self {
        let height = rows.len() as i32;
        let width = rows.first().map_or(0, |row| row.chars().count()) as i32;
        let mut map = Self::new(width, height);
        for (r, row) in rows.iter().enumerate() {
            for (c, ch) in row.chars().enumerate() {
                let tile = match ch {
                    '#' => Tile::Wall,
                    'T' => Tile::Trap,
                    'K' => Tile::Key,
                    'G' => Tile::Goal,
                    _ => Tile::Empty,
                };
                map.insert(Position::new(r as i32, c as i32), tile);
            }
        }
        map
    }

    pub fn in_bounds(&self, pos: &Position) -> bool {
        pos.row >= 0 && pos.row < self.height && pos.col >= 0 && pos.col < self.width
    }

    fn index(&self, pos: &Position) -> Option<usize> {
        self.in_bounds(pos)
            .then(|| (pos.row * self.width + pos.col) as usize)
    }

    pub fn get(&self, pos: &Position) -> Option<Tile> {
        self.index(pos).map(|i| self.tiles[i])
    }

    /// Replaces the tile at `pos`, returning the previous one. Out-of-bounds writes are ignored.
    pub fn insert(&mut self, pos: Position, tile: Tile) -> Option<Tile> {
        let i = self.index(&pos)?;
        Some(std::mem::replace(&mut self.tiles[i], tile))
    }

    pub fn is_walkable(&self, pos: &Position) -> bool {
        self.get(pos).is_some_and(Tile::is_walkable)
    }

    pub fn is_passable(&self, pos: &Position) -> bool {
        self.get(pos).is_some_and(Tile::is_passable)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Position, Tile)> + '_ {
        self.tiles.iter().enumerate().map(|(i, &tile)| {
            let i = i as i32;
            (Position::new(i / self.width, i % self.width), tile)
        })
    }

    /// Positions of interior cells holding `tile`, in row-major order.
    pub fn interior_positions(&self, tile: Tile) -> Vec<Position> {
        self.iter()
            .filter(|(pos, t)| {
                *t == tile
                    && pos.row > 0
                    && pos.row < self.height - 1
                    && pos.col > 0
                    && pos.col < self.width - 1
            })
            .map(|(pos, _)| pos)
            .collect()
    }

    pub fn border_is_wall(&self) -> bool {
        self.iter()
            .filter(|(pos, _)| {
                pos.row == 0
                    || pos.col == 0
                    || pos.row == self.height - 1
                    || pos.col == self.width - 1
            })
            .all(|(_, tile)| tile == Tile::Wall)
    }

    /// Row-major tile codes, one inner vector per row.
    pub fn codes(&self) -> Vec<Vec<u8>> {
        self.tiles
            .chunks(self.width.max(1) as usize)
            .map(|row| row.iter().map(|tile| tile.code()).collect())
            .collect()
    }
}
