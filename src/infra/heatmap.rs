use std::cell::RefCell;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use time::{OffsetDateTime, format_description};

use crate::infra::{GameObserver, Position};
use crate::planners::rl::{EpisodeSummary, MacroAction, MacroState};
use crate::state::{Collision, WorldState};

/// Per-cell visit and death counts accumulated over a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heatmap {
    visits: Vec<Vec<u32>>,
    deaths: Vec<Vec<u32>>,
}

impl Heatmap {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            visits: vec![vec![0; width]; height],
            deaths: vec![vec![0; width]; height],
        }
    }

    /// Out-of-range positions are ignored.
    pub fn record_visit(&mut self, pos: Position) {
        if let Some(cell) = cell_mut(&mut self.visits, pos) {
            *cell += 1;
        }
    }

    pub fn record_death(&mut self, pos: Position) {
        if let Some(cell) = cell_mut(&mut self.deaths, pos) {
            *cell += 1;
        }
    }

    pub fn visits(&self) -> &[Vec<u32>] {
        &self.visits
    }

    pub fn deaths(&self) -> &[Vec<u32>] {
        &self.deaths
    }

    pub fn total_deaths(&self) -> u32 {
        self.deaths.iter().flatten().sum()
    }

    /// Writes `heatmap-visits-<stamp>.csv` and `heatmap-deaths-<stamp>.csv` into `folder`.
    pub fn write_report(&self, folder: &Path) -> io::Result<Vec<PathBuf>> {
        if !folder.exists() {
            fs::create_dir_all(folder)?;
        }
        let stamp = timestamp()?;
        let mut written = Vec::with_capacity(2);
        for (name, grid) in [("visits", &self.visits), ("deaths", &self.deaths)] {
            let path = folder.join(format!("heatmap-{}-{}.csv", name, stamp));
            write_csv(&path, grid)?;
            written.push(path);
        }
        Ok(written)
    }
}

fn cell_mut(grid: &mut [Vec<u32>], pos: Position) -> Option<&mut u32> {
    let row = usize::try_from(pos.row).ok()?;
    let col = usize::try_from(pos.col).ok()?;
    grid.get_mut(row)?.get_mut(col)
}

fn timestamp() -> io::Result<String> {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    let format = format_description::parse("[year][month][day]-[hour][minute][second]")
        .map_err(io::Error::other)?;
    now.format(&format).map_err(io::Error::other)
}

fn write_csv(path: &Path, grid: &[Vec<u32>]) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for row in grid {
        let line: Vec<String> = row.iter().map(u32::to_string).collect();
        writeln!(writer, "{}", line.join(","))?;
    }
    writer.flush()
}

/// Feeds agent visits and deaths into a [`Heatmap`] shared with the caller.
pub struct HeatmapObserver {
    heatmap: Rc<RefCell<Heatmap>>,
}

impl HeatmapObserver {
    pub fn new(heatmap: Rc<RefCell<Heatmap>>) -> Self {
        Self { heatmap }
    }
}

impl GameObserver for HeatmapObserver {
    fn on_episode_start(&mut self, _episode: usize, _world: &WorldState) {}

    fn on_strategy_selected(
        &mut self,
        _state: MacroState,
        _action: MacroAction,
        _target: Position,
        _world: &WorldState,
    ) {
    }

    fn on_agent_moved(&mut self, position: Position, _world: &WorldState) {
        self.heatmap.borrow_mut().record_visit(position);
    }

    fn on_agent_died(&mut self, collision: &Collision, _world: &WorldState) {
        self.heatmap.borrow_mut().record_death(collision.position);
    }

    fn on_episode_finished(&mut self, _episode: usize, _summary: &EpisodeSummary) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_and_bounds() {
        let mut heatmap = Heatmap::new(4, 3);
        heatmap.record_visit(Position::new(1, 2));
        heatmap.record_visit(Position::new(1, 2));
        heatmap.record_death(Position::new(2, 3));
        heatmap.record_visit(Position::new(7, 7));
        heatmap.record_death(Position::new(-1, 0));

        assert_eq!(heatmap.visits()[1][2], 2);
        assert_eq!(heatmap.deaths()[2][3], 1);
        assert_eq!(heatmap.total_deaths(), 1);
        assert_eq!(heatmap.visits().iter().flatten().sum::<u32>(), 2);
    }

    #[test]
    fn test_observer_fills_shared_heatmap() {
        use crate::state::{CollisionKind, Map, Maze};

        let maze = Maze {
            map: Map::from_ascii(&["#####", "#..G#", "#####"]),
            start: Position::new(1, 1),
            goal: Position::new(1, 3),
            keys: Vec::new(),
            traps: Vec::new(),
            enemies: Vec::new(),
        };
        let world = WorldState::new(maze);
        let heatmap = Rc::new(RefCell::new(Heatmap::new(5, 3)));
        let mut observer = HeatmapObserver::new(Rc::clone(&heatmap));

        observer.on_agent_moved(Position::new(1, 2), &world);
        observer.on_agent_died(
            &Collision {
                kind: CollisionKind::Swap,
                enemy_index: 0,
                position: Position::new(1, 2),
            },
            &world,
        );

        let heatmap = heatmap.borrow();
        assert_eq!(heatmap.visits()[1][2], 1);
        assert_eq!(heatmap.deaths()[1][2], 1);
        assert_eq!(heatmap.total_deaths(), 1);
    }

    #[test]
    fn test_write_report() {
        let folder = std::env::temp_dir().join(format!("maze_chase_report_{}", std::process::id()));
        let mut heatmap = Heatmap::new(3, 2);
        heatmap.record_visit(Position::new(0, 1));

        let files = heatmap.write_report(&folder).unwrap();
        assert_eq!(files.len(), 2);
        let name = files[0].file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("heatmap-visits-") && name.ends_with(".csv"));
        assert_eq!(fs::read_to_string(&files[0]).unwrap(), "0,1,0\n0,0,0\n");

        fs::remove_dir_all(&folder).ok();
    }
}
