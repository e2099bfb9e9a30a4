use std::collections::BTreeMap;

use ndarray::Array2;

/// One 4-connected region of a binary mask.
#[derive(Clone, Debug, PartialEq)]
pub struct Region {
    /// Root label of the region (stable for a given mask).
    pub label: u32,
    /// Number of pixels in the region.
    pub area: usize,
    /// Bounding box: (min_row, max_row, min_col, max_col).
    pub bbox: (usize, usize, usize, usize),
}

/// Label the 4-connected regions of `mask` with a two-pass union-find scan.
///
/// Returns regions sorted by area descending, ties broken by label.
pub fn label_regions(mask: &Array2<bool>) -> Vec<Region> {
    let (h, w) = mask.dim();
    if h == 0 || w == 0 {
        return Vec::new();
    }

    let mut labels = Array2::<u32>::zeros((h, w));
    // Label 0 is background; provisional labels start at 1.
    let mut sets = DisjointSet::new();

    for row in 0..h {
        for col in 0..w {
            if !mask[[row, col]] {
                continue;
            }
            let up = if row > 0 { labels[[row - 1, col]] } else { 0 };
            let left = if col > 0 { labels[[row, col - 1]] } else { 0 };

            labels[[row, col]] = match (up, left) {
                (0, 0) => sets.make_set(),
                (n, 0) | (0, n) => n,
                (a, b) => {
                    sets.union(a, b);
                    a.min(b)
                }
            };
        }
    }

    let mut regions = BTreeMap::<u32, Region>::new();
    for ((row, col), &lbl) in labels.indexed_iter() {
        if lbl == 0 {
            continue;
        }
        let root = sets.find(lbl);
        let region = regions.entry(root).or_insert(Region {
            label: root,
            area: 0,
            bbox: (row, row, col, col),
        });
        region.area += 1;
        region.bbox.0 = region.bbox.0.min(row);
        region.bbox.1 = region.bbox.1.max(row);
        region.bbox.2 = region.bbox.2.min(col);
        region.bbox.3 = region.bbox.3.max(col);
    }

    let mut out: Vec<Region> = regions.into_values().collect();
    out.sort_by(|a, b| b.area.cmp(&a.area).then(a.label.cmp(&b.label)));
    out
}

/// Mean region area in pixels, `None` for an empty list.
pub fn mean_region_area(regions: &[Region]) -> Option<f64> {
    if regions.is_empty() {
        return None;
    }
    let total: usize = regions.iter().map(|r| r.area).sum();
    Some(total as f64 / regions.len() as f64)
}

/// Union-find over provisional labels, index 0 unused.
struct DisjointSet {
    parent: Vec<u32>,
}

impl DisjointSet {
    fn new() -> Self {
        Self { parent: vec![0] }
    }

    fn make_set(&mut self) -> u32 {
        let label = self.parent.len() as u32;
        self.parent.push(label);
        label
    }

    fn find(&mut self, mut x: u32) -> u32 {
        let mut root = x;
        while self.parent[root as usize] != root {
            root = self.parent[root as usize];
        }
        // Path compression.
        while self.parent[x as usize] != root {
            let next = self.parent[x as usize];
            self.parent[x as usize] = root;
            x = next;
        }
        root
    }

    fn union(&mut self, a: u32, b: u32) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            // Smaller root wins so labels stay deterministic.
            let (keep, merge) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[merge as usize] = keep;
        }
    }
}
