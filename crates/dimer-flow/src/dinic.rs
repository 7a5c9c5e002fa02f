use dimer_core::{checkpoint, Monitor, ProgressEvent, TilingError};
use dimer_graph::{CellId, DimerConfiguration, RegionGraph};
use tracing::debug;

const SOURCE: usize = 0;
const SINK: usize = 1;
const NO_LEVEL: u32 = u32::MAX;

fn node(cell: CellId) -> usize {
    cell as usize + 2
}

/// Unit-capacity flow network `source -> black -> white -> sink`.
///
/// Edges are stored in pairs; edge `e ^ 1` is the residual twin of `e`.
#[derive(Debug, Clone)]
pub(crate) struct FlowNetwork {
    adjacency: Vec<Vec<usize>>,
    to: Vec<usize>,
    capacity: Vec<u8>,
    level: Vec<u32>,
    cursor: Vec<usize>,
}

impl FlowNetwork {
    pub(crate) fn bipartite(graph: &RegionGraph) -> Self {
        let nodes = graph.len() + 2;
        let mut network = Self {
            adjacency: vec![Vec::new(); nodes],
            to: Vec::new(),
            capacity: Vec::new(),
            level: vec![NO_LEVEL; nodes],
            cursor: vec![0; nodes],
        };
        for &black in graph.blacks() {
            network.add_edge(SOURCE, node(black));
            for &white in graph.neighbors(black) {
                network.add_edge(node(black), node(white));
            }
        }
        for &white in graph.whites() {
            network.add_edge(node(white), SINK);
        }
        network
    }

    fn add_edge(&mut self, from: usize, to: usize) {
        self.adjacency[from].push(self.to.len());
        self.to.push(to);
        self.capacity.push(1);
        self.adjacency[to].push(self.to.len());
        self.to.push(from);
        self.capacity.push(0);
    }

    /// Runs Dinic until no augmenting path remains, checkpointing after each phase.
    pub(crate) fn max_flow(
        &mut self,
        target: usize,
        monitor: &dyn Monitor,
    ) -> Result<(usize, usize), TilingError> {
        let mut flow = 0;
        let mut phase = 0;
        while flow < target && self.build_levels() {
            self.cursor.iter_mut().for_each(|cursor| *cursor = 0);
            while self.push_path() {
                flow += 1;
            }
            phase += 1;
            debug!(phase, flow, target, "dinic phase complete");
            checkpoint(monitor, "dinic", ProgressEvent::FlowPhase { phase, flow, target })?;
        }
        Ok((flow, phase))
    }

    fn build_levels(&mut self) -> bool {
        self.level.iter_mut().for_each(|level| *level = NO_LEVEL);
        self.level[SOURCE] = 0;
        let mut queue = std::collections::VecDeque::from([SOURCE]);
        while let Some(current) = queue.pop_front() {
            for &edge in &self.adjacency[current] {
                let next = self.to[edge];
                if self.capacity[edge] > 0 && self.level[next] == NO_LEVEL {
                    self.level[next] = self.level[current] + 1;
                    queue.push_back(next);
                }
            }
        }
        self.level[SINK] != NO_LEVEL
    }

    /// Finds one source-sink path in the level graph and saturates it.
    fn push_path(&mut self) -> bool {
        let mut stack: Vec<usize> = Vec::new();
        let mut current = SOURCE;
        loop {
            if current == SINK {
                for &edge in &stack {
                    self.capacity[edge] -= 1;
                    self.capacity[edge ^ 1] += 1;
                }
                return true;
            }
            let mut advanced = false;
            while self.cursor[current] < self.adjacency[current].len() {
                let edge = self.adjacency[current][self.cursor[current]];
                let next = self.to[edge];
                if self.capacity[edge] > 0 && self.level[next] == self.level[current] + 1 {
                    stack.push(edge);
                    current = next;
                    advanced = true;
                    break;
                }
                self.cursor[current] += 1;
            }
            if advanced {
                continue;
            }
            self.level[current] = NO_LEVEL;
            match stack.pop() {
                Some(edge) => {
                    current = self.to[edge ^ 1];
                    self.cursor[current] += 1;
                }
                None => return false,
            }
        }
    }

    /// Reads the matching off the saturated black-white edges.
    pub(crate) fn matching(&self, graph: &RegionGraph) -> DimerConfiguration {
        let mut config = DimerConfiguration::empty(graph);
        for &black in graph.blacks() {
            let saturated = self.adjacency[node(black)].iter().find(|&&edge| {
                edge % 2 == 0 && self.to[edge] >= 2 && self.capacity[edge] == 0
            });
            if let Some(&edge) = saturated {
                config.pair(black, (self.to[edge] - 2) as CellId);
            }
        }
        config
    }
}
