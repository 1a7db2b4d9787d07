use ai_path::{Cell, ConfigError, GridConfig};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Static description of one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Terrain {
    /// Movement points needed to enter the cell. Values below 1 are treated as 1.
    pub move_cost: i32,
    pub passable: bool,
    pub water: bool,
    /// Land cell that ships may dock at.
    pub harbor: bool,
    pub owner: Option<u8>,
}

impl Default for Terrain {
    fn default() -> Self {
        Self {
            move_cost: 1,
            passable: true,
            water: false,
            harbor: false,
            owner: None,
        }
    }
}

impl Terrain {
    pub fn land(move_cost: i32) -> Self {
        Self {
            move_cost,
            ..Self::default()
        }
    }

    pub fn water() -> Self {
        Self {
            water: true,
            ..Self::default()
        }
    }

    pub fn blocked() -> Self {
        Self {
            passable: false,
            ..Self::default()
        }
    }

    pub fn with_harbor(mut self) -> Self {
        self.harbor = true;
        self
    }

    pub fn with_owner(mut self, owner: u8) -> Self {
        self.owner = Some(owner);
        self
    }

    #[inline]
    pub fn entry_cost(&self) -> i32 {
        self.move_cost.max(1)
    }
}

/// Terrain for every cell of a grid, with a version counter bumped on every edit.
///
/// Policies report the version through [`ai_path::PathPolicy::signature`], so editing the map
/// is enough to stop a finder from reusing stale searches.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TerrainMap {
    grid: GridConfig,
    cells: Vec<Terrain>,
    version: u64,
}

impl TerrainMap {
    pub fn new(grid: GridConfig) -> Result<Self, ConfigError> {
        Self::filled(grid, Terrain::default())
    }

    pub fn filled(grid: GridConfig, terrain: Terrain) -> Result<Self, ConfigError> {
        grid.validate()?;
        Ok(Self {
            grid,
            cells: vec![terrain; grid.cell_count()],
            version: 0,
        })
    }

    /// Build a map from rows of characters: `.` plain land, `#` impassable, `~` water,
    /// `H` harbour, `1`-`9` land with that move cost.
    pub fn parse(grid: GridConfig, rows: &[&str]) -> Result<Self, ConfigError> {
        let mut map = Self::new(grid)?;
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                let terrain = match ch {
                    '#' => Terrain::blocked(),
                    '~' => Terrain::water(),
                    'H' => Terrain::default().with_harbor(),
                    '1'..='9' => Terrain::land(ch as i32 - '0' as i32),
                    _ => Terrain::default(),
                };
                map.set(Cell::new(x as i32, y as i32), terrain);
            }
        }
        map.version = 0;
        Ok(map)
    }

    #[inline]
    pub fn grid(&self) -> GridConfig {
        self.grid
    }

    #[inline]
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn get(&self, cell: Cell) -> Option<&Terrain> {
        self.cells.get(self.grid.index_of(cell)?)
    }

    /// Terrain at `cell`, or impassable terrain off the map.
    pub fn terrain(&self, cell: Cell) -> Terrain {
        self.get(cell).copied().unwrap_or_else(Terrain::blocked)
    }

    /// Replace the terrain at `cell`. Returns false when the cell is off the map.
    pub fn set(&mut self, cell: Cell, terrain: Terrain) -> bool {
        let Some(index) = self.grid.index_of(cell) else {
            return false;
        };
        if self.cells[index] != terrain {
            self.cells[index] = terrain;
            self.version += 1;
        }
        true
    }

    pub fn update(&mut self, cell: Cell, edit: impl FnOnce(&mut Terrain)) -> bool {
        let mut terrain = match self.get(cell) {
            Some(terrain) => *terrain,
            None => return false,
        };
        edit(&mut terrain);
        self.set(cell, terrain)
    }

    pub fn cells(&self) -> impl Iterator<Item = (Cell, &Terrain)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(|(i, terrain)| (self.grid.cell_at(i), terrain))
    }

    pub fn harbors(&self) -> impl Iterator<Item = Cell> + '_ {
        self.cells()
            .filter(|(_, terrain)| terrain.harbor)
            .map(|(cell, _)| cell)
    }
}
