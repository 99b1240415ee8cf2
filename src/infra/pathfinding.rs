use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::infra::Position;
use crate::state::Map;

#[derive(Clone, Eq, PartialEq)]
struct Node {
    pos: Position,
    f_score: i32,
    h_score: i32,
    seq: u64, // Insertion order, last tie-break
}

// BinaryHeap is a max-heap: invert so the lowest f, then lowest h, then oldest entry pops first.
impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f_score
            .cmp(&self.f_score)
            .then_with(|| other.h_score.cmp(&self.h_score))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

pub struct AStar;

impl AStar {
    /// Shortest 4-connected path from `start` to `goal` that never enters a wall or trap.
    ///
    /// The returned path excludes `start` and ends with `goal`; it is empty when
    /// `start == goal`. `None` means the goal is unreachable.
    #[tracing::instrument(level = "trace", skip(map))]
    pub fn find_path(map: &Map, start: Position, goal: Position) -> Option<Vec<Position>> {
        if start == goal {
            return Some(Vec::new());
        }

        let mut open_set = BinaryHeap::new();
        let mut came_from: HashMap<Position, Position> = HashMap::new();
        let mut g_score: HashMap<Position, i32> = HashMap::new();
        let mut closed_set: HashSet<Position> = HashSet::new();
        let mut seq = 0u64;

        g_score.insert(start, 0);
        open_set.push(Node {
            pos: start,
            f_score: heuristic(start, goal),
            h_score: heuristic(start, goal),
            seq,
        });

        while let Some(Node { pos: current, .. }) = open_set.pop() {
            if current == goal {
                return Some(reconstruct_path(&came_from, start, current));
            }

            // A cell may be queued more than once after its g-score improves; only the first pop counts.
            if !closed_set.insert(current) {
                continue;
            }

            let current_g_score = g_score[&current];

            for neighbor in current.neighbors() {
                if closed_set.contains(&neighbor) || !map.is_walkable(&neighbor) {
                    continue;
                }

                let tentative_g = current_g_score + 1;
                if tentative_g < *g_score.get(&neighbor).unwrap_or(&i32::MAX) {
                    came_from.insert(neighbor, current);
                    g_score.insert(neighbor, tentative_g);
                    seq += 1;
                    let h_score = heuristic(neighbor, goal);
                    open_set.push(Node {
                        pos: neighbor,
                        f_score: tentative_g + h_score,
                        h_score,
                        seq,
                    });
                }
            }
        }

        None
    }
}

fn heuristic(a: Position, b: Position) -> i32 {
    a.distance(&b)
}

fn reconstruct_path(
    came_from: &HashMap<Position, Position>,
    start: Position,
    mut current: Position,
) -> Vec<Position> {
    let mut path = vec![current];
    while let Some(&prev) = came_from.get(&current) {
        if prev == start {
            break;
        }
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}
