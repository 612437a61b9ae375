//! Min-cost max-flow via successive shortest augmenting paths
//! (Bellman-Ford/SPFA over the residual graph — correct in the
//! presence of negative-cost arcs, which this graph always has once
//! scores exceed `max_score`'s anchor).
//!
//! Self-contained rather than bound to an external solver: no
//! equivalent of OR-Tools' `SimpleMinCostFlow` exists in the Rust
//! ecosystem corpus available here, and a small SSP routine over a
//! handful of thousand nodes is well within idiomatic hand-rolled
//! systems-Rust territory (see `DESIGN.md`).

#[derive(Clone, Copy, Debug)]
struct Edge {
    to: usize,
    cap: i64,
    cost: i64,
}

/// Classic edge-list + adjacency-index residual graph: `edges[e]` and
/// its paired reverse `edges[e ^ 1]` always sit next to each other.
pub struct MinCostFlow {
    edges: Vec<Edge>,
    adj: Vec<Vec<usize>>,
}

impl MinCostFlow {
    pub fn new(num_nodes: usize) -> Self {
        Self {
            edges: Vec::new(),
            adj: vec![Vec::new(); num_nodes],
        }
    }

    /// Index the next `add_edge` call's forward edge will receive;
    /// callers save this to look up `flow_on` later.
    pub fn edges_len(&self) -> usize {
        self.edges.len()
    }

    pub fn add_edge(&mut self, from: usize, to: usize, cap: i64, cost: i64) {
        let e1 = self.edges.len();
        self.edges.push(Edge { to, cap, cost });
        self.adj[from].push(e1);

        let e2 = self.edges.len();
        self.edges.push(Edge {
            to: from,
            cap: 0,
            cost: -cost,
        });
        self.adj[to].push(e2);
    }

    /// Pushes up to `max_flow` units of flow from `source` to `sink`,
    /// minimizing total cost. Returns `(flow_pushed, total_cost)`.
    ///
    /// Every arc in this graph's construction has capacity 1 (user/opp
    /// arcs) or a small integer capacity (opp->sink), so this terminates
    /// in at most `max_flow` augmentations.
    pub fn min_cost_flow(&mut self, source: usize, sink: usize, max_flow: i64) -> (i64, i64) {
        let n = self.adj.len();
        let mut flow = 0i64;
        let mut cost = 0i64;

        while flow < max_flow {
            let mut dist = vec![i64::MAX; n];
            let mut in_queue = vec![false; n];
            let mut prev_edge: Vec<Option<usize>> = vec![None; n];
            dist[source] = 0;

            let mut queue = std::collections::VecDeque::new();
            queue.push_back(source);
            in_queue[source] = true;

            while let Some(u) = queue.pop_front() {
                in_queue[u] = false;
                for &e in &self.adj[u] {
                    let edge = self.edges[e];
                    if edge.cap <= 0 {
                        continue;
                    }
                    if dist[u] == i64::MAX {
                        continue;
                    }
                    let nd = dist[u] + edge.cost;
                    if nd < dist[edge.to] {
                        dist[edge.to] = nd;
                        prev_edge[edge.to] = Some(e);
                        if !in_queue[edge.to] {
                            queue.push_back(edge.to);
                            in_queue[edge.to] = true;
                        }
                    }
                }
            }

            if dist[sink] == i64::MAX {
                break;
            }

            // Bottleneck capacity along the found shortest path.
            let mut push = max_flow - flow;
            let mut v = sink;
            while v != source {
                let e = prev_edge[v].expect("path reconstruction");
                push = push.min(self.edges[e].cap);
                v = self.edges[e ^ 1].to;
            }

            v = sink;
            while v != source {
                let e = prev_edge[v].expect("path reconstruction");
                self.edges[e].cap -= push;
                self.edges[e ^ 1].cap += push;
                v = self.edges[e ^ 1].to;
            }

            flow += push;
            cost += push * dist[sink];
        }

        (flow, cost)
    }

    /// Flow currently carried on the forward arc `edge_index` (an index
    /// returned implicitly by construction order — callers track arc
    /// indices themselves via `add_edge`'s call order).
    pub fn flow_on(&self, forward_edge_index: usize) -> i64 {
        // Forward edge's residual capacity decreased by exactly the flow
        // pushed; recover it from the paired reverse edge's capacity,
        // which started at 0 and only grows by pushed flow.
        self.edges[forward_edge_index ^ 1].cap
    }
}
