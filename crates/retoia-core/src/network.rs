//! Network graph - power lines and consumer connectivity.
//!
//! Lines are append-only: nothing deduplicates or removes them during a
//! session. Connectivity is adjacency-only. A consumer is connected when it
//! is the endpoint of some line, not when a path of lines reaches a source.

use retoia_logic::network::{is_inefficient, line_efficiency, manhattan};

use crate::components::{Cell, Consumer, PowerLine};
use crate::error::Rejection;
use crate::grid::GridStore;

#[derive(Debug, Clone, Default)]
pub struct NetworkGraph {
    lines: Vec<PowerLine>,
    consumers: Vec<Consumer>,
}

impl NetworkGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commit a line between two occupied cells.
    pub fn connect(
        &mut self,
        grid: &GridStore,
        from: Cell,
        to: Cell,
    ) -> Result<PowerLine, Rejection> {
        for endpoint in [from, to] {
            if !grid.is_occupied(endpoint) {
                return Err(Rejection::NoEntityAtEndpoint(endpoint));
            }
        }
        let distance = manhattan(from.as_tuple(), to.as_tuple());
        let line = PowerLine {
            from,
            to,
            distance,
            efficiency: line_efficiency(distance),
        };
        self.lines.push(line);
        self.recompute_connectivity();
        Ok(line)
    }

    /// Rebuild every consumer's `connected` flag from the line list.
    pub fn recompute_connectivity(&mut self) {
        let lines = &self.lines;
        for consumer in &mut self.consumers {
            consumer.connected = lines.iter().any(|line| line.touches(consumer.cell));
        }
    }

    /// Efficiency of the first line (in creation order) touching `cell`.
    ///
    /// A producer with several lines uses only the first one found; the
    /// others neither add to nor average with it. The energy economy is
    /// balanced around this rule, so it is kept as is rather than turned
    /// into a real power-flow model.
    pub fn first_line_efficiency(&self, cell: Cell) -> Option<f32> {
        self.lines
            .iter()
            .find(|line| line.touches(cell))
            .map(|line| line.efficiency)
    }

    pub fn add_consumer(&mut self, cell: Cell, demand: u32) {
        let mut consumer = Consumer::new(cell, demand);
        consumer.connected = self.lines.iter().any(|line| line.touches(cell));
        self.consumers.push(consumer);
    }

    /// Total demand of connected consumers.
    pub fn connected_demand(&self) -> u32 {
        self.consumers
            .iter()
            .filter(|c| c.connected)
            .map(|c| c.demand)
            .sum()
    }

    pub fn has_inefficient_lines(&self) -> bool {
        self.lines.iter().any(|line| is_inefficient(line.efficiency))
    }

    pub fn lines(&self) -> &[PowerLine] {
        &self.lines
    }

    pub fn consumers(&self) -> &[Consumer] {
        &self.consumers
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.consumers.clear();
    }
}
