//! Tile grid, positions and directions
//!
//! The world is a torus: every step is wrapped back into bounds.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::tile::Tile;

/// Integer grid coordinate `(x, y)`, y growing downwards
pub type Position = IVec2;

/// Movement direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    #[default]
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit offset of one step
    pub fn offset(self) -> IVec2 {
        match self {
            Direction::Up => IVec2::NEG_Y,
            Direction::Down => IVec2::Y,
            Direction::Left => IVec2::NEG_X,
            Direction::Right => IVec2::X,
        }
    }

    /// The two directions perpendicular to this one
    pub fn lateral(self) -> [Direction; 2] {
        match self {
            Direction::Up | Direction::Down => [Direction::Left, Direction::Right],
            Direction::Left | Direction::Right => [Direction::Up, Direction::Down],
        }
    }
}

/// Rectangular tile layout, row-major
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    width: i32,
    height: i32,
    tiles: Vec<Tile>,
}

impl Grid {
    /// Grid filled with a single tile kind
    pub fn filled(width: i32, height: i32, tile: Tile) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            tiles: vec![tile; (width * height) as usize],
        }
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Centre tile (spawn point before walkability checks)
    pub fn center(&self) -> Position {
        IVec2::new(self.width / 2, self.height / 2)
    }

    #[inline]
    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    /// Wrap a position onto the torus
    pub fn wrap(&self, pos: Position) -> Position {
        IVec2::new(pos.x.rem_euclid(self.width), pos.y.rem_euclid(self.height))
    }

    /// One wrapped step from `pos`
    pub fn step(&self, pos: Position, dir: Direction) -> Position {
        self.wrap(pos + dir.offset())
    }

    /// Tile at a position, `None` when out of bounds
    pub fn get(&self, pos: Position) -> Option<Tile> {
        if self.in_bounds(pos) {
            self.tiles.get(self.index(pos)).copied()
        } else {
            None
        }
    }

    /// Tile at a wrapped position
    pub fn tile(&self, pos: Position) -> Tile {
        let pos = self.wrap(pos);
        self.tiles[self.index(pos)]
    }

    /// Set a tile; out-of-bounds writes are ignored
    pub fn set(&mut self, pos: Position, tile: Tile) {
        if self.in_bounds(pos) {
            let idx = self.index(pos);
            self.tiles[idx] = tile;
        }
    }

    /// True when any 4-neighbour inside the bounds (no wrap) is a road.
    /// Generation uses plain bounds so placement never leans on the wrap.
    pub fn touches_road(&self, pos: Position) -> bool {
        Direction::ALL.iter().any(|dir| {
            self.get(pos + dir.offset())
                .is_some_and(|tile| tile == Tile::Road)
        })
    }

    /// All positions in row-major order
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| IVec2::new(x, y)))
    }

    /// Positions holding the given tile, row-major
    pub fn positions_of(&self, tile: Tile) -> Vec<Position> {
        self.positions().filter(|&p| self.tile(p) == tile).collect()
    }

    /// Count of tiles of one kind
    pub fn count(&self, tile: Tile) -> usize {
        self.tiles.iter().filter(|&&t| t == tile).count()
    }

    /// Toroidal Manhattan distance
    pub fn torus_distance(&self, a: Position, b: Position) -> i32 {
        let dx = (a.x - b.x).rem_euclid(self.width);
        let dy = (a.y - b.y).rem_euclid(self.height);
        dx.min(self.width - dx) + dy.min(self.height - dy)
    }

    #[inline]
    fn index(&self, pos: Position) -> usize {
        (pos.y * self.width + pos.x) as usize
    }
}
