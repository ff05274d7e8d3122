//! Disjoint sets and adjacency grouping over a distance matrix.

/// Disjoint-set forest with path compression and union by rank.
#[derive(Debug, Clone)]
pub struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<usize>,
}

impl UnionFind {
    pub fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
            rank: vec![0; size],
        }
    }

    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    pub fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        // Path compression
        let mut node = x;
        while self.parent[node] != root {
            let next = self.parent[node];
            self.parent[node] = root;
            node = next;
        }
        root
    }

    /// Merge the sets holding `x` and `y`; false if already joined.
    pub fn union(&mut self, x: usize, y: usize) -> bool {
        let px = self.find(x);
        let py = self.find(y);
        if px == py {
            return false;
        }
        // Union by rank
        if self.rank[px] < self.rank[py] {
            self.parent[px] = py;
        } else if self.rank[px] > self.rank[py] {
            self.parent[py] = px;
        } else {
            self.parent[py] = px;
            self.rank[px] += 1;
        }
        true
    }

    /// All sets, each sorted ascending, ordered by their smallest member.
    pub fn groups(&mut self) -> Vec<Vec<usize>> {
        let mut slot_of_root: Vec<Option<usize>> = vec![None; self.len()];
        let mut groups: Vec<Vec<usize>> = Vec::new();
        for i in 0..self.len() {
            let root = self.find(i);
            match slot_of_root[root] {
                Some(slot) => groups[slot].push(i),
                None => {
                    slot_of_root[root] = Some(groups.len());
                    groups.push(vec![i]);
                }
            }
        }
        groups
    }
}

/// Connected components of the graph where `i` and `j` are adjacent iff
/// `distances[i][j] <= threshold`.
///
/// Only the upper triangle of `distances` is read. Components are ordered
/// by their smallest index.
pub fn adjacency_groups(distances: &[Vec<f64>], threshold: f64) -> Vec<Vec<usize>> {
    let n = distances.len();
    let mut uf = UnionFind::new(n);
    for i in 0..n {
        for j in (i + 1)..n {
            if distances[i].get(j).is_some_and(|&d| d <= threshold) {
                uf.union(i, j);
            }
        }
    }
    uf.groups()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_and_find() {
        let mut uf = UnionFind::new(5);
        assert!(uf.union(0, 1));
        assert!(uf.union(3, 4));
        assert!(!uf.union(1, 0));
        assert_eq!(uf.find(0), uf.find(1));
        assert_ne!(uf.find(0), uf.find(3));
        assert!(uf.union(1, 4));
        assert_eq!(uf.find(0), uf.find(3));
        assert_eq!(uf.groups(), vec![vec![0, 1, 3, 4], vec![2]]);
    }

    #[test]
    fn test_path_compression_flattens() {
        let mut uf = UnionFind::new(4);
        uf.union(0, 1);
        uf.union(2, 3);
        uf.union(0, 2);
        let root = uf.find(3);
        for i in 0..4 {
            assert_eq!(uf.parent[i], root);
        }
    }

    #[test]
    fn test_adjacency_groups_matrix() {
        let inf = f64::INFINITY;
        // 0-1 touch, 1-2 touch (so 0-2 join transitively), 3 isolated.
        let m = vec![
            vec![0.0, 0.01, 1.0, inf],
            vec![0.01, 0.0, 0.04, 2.0],
            vec![1.0, 0.04, 0.0, 0.5],
            vec![inf, 2.0, 0.5, 0.0],
        ];
        assert_eq!(adjacency_groups(&m, 0.05), vec![vec![0, 1, 2], vec![3]]);
        assert_eq!(adjacency_groups(&m, 0.005), vec![vec![0], vec![1], vec![2], vec![3]]);
        assert_eq!(adjacency_groups(&m, 0.05 + 1.0), vec![vec![0, 1, 2, 3]]);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let m = vec![vec![0.0, 0.05], vec![0.05, 0.0]];
        assert_eq!(adjacency_groups(&m, 0.05), vec![vec![0, 1]]);
    }

    #[test]
    fn test_empty() {
        assert!(adjacency_groups(&[], 0.05).is_empty());
    }
}
