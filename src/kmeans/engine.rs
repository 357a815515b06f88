use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rayon::prelude::*;

use super::neighbors::Neighborhood;
use super::neighbors::distance;
use super::neighbors::sqdist;
use crate::Energy;

/// weighted seeding gets slow at this scale, fall back to uniform
const UNIFORM_SEED_CLUSTERS: usize = 1000;
const UNIFORM_SEED_OBJECTS: usize = 1_000_000;
/// stop once at most this many objects still move between clusters
const CONVERGED_CHANGES: usize = 2;

/// KMeansEngine partitions feature vectors into clusters by Lloyd
/// iteration with kmeans++ seeding, deterministically from a fixed
/// seed. nearest-centroid search walks the current cluster's sorted
/// neighbor list and stops once the triangle inequality rules out
/// everything further away; a scan the lists cannot certify falls back
/// to an exhaustive pass over live clusters.
///
/// asking for at least as many clusters as objects degenerates to one
/// object per cluster and cluster() becomes a no-op.
pub struct KMeansEngine {
    points: Vec<Vec<Energy>>,
    dims: usize,
    k: usize,
    centroids: Vec<Vec<Energy>>,
    sizes: Vec<usize>,
    assignments: Vec<usize>,
    neighborhood: Neighborhood,
    rng: SmallRng,
    max_iterations: usize,
    degenerate: bool,
}

impl KMeansEngine {
    pub fn new(
        points: Vec<Vec<Energy>>,
        k: usize,
        max_iterations: usize,
        neighbor_threshold: f64,
        seed: u64,
    ) -> Self {
        assert!(k >= 1);
        assert!(!points.is_empty());
        let dims = points[0].len();
        assert!(points.iter().all(|p| p.len() == dims));
        let n = points.len();
        let degenerate = k >= n;
        Self {
            assignments: if degenerate { (0..n).collect() } else { vec![0; n] },
            centroids: if degenerate { points.clone() } else { Vec::new() },
            sizes: if degenerate { vec![1; n] } else { Vec::new() },
            neighborhood: Neighborhood::new(neighbor_threshold),
            rng: SmallRng::seed_from_u64(seed),
            max_iterations,
            degenerate,
            points,
            dims,
            k,
        }
    }

    pub fn cluster(&mut self) {
        if self.degenerate {
            return;
        }
        self.seed();
        for iteration in 0..self.max_iterations {
            let changed = self.assign();
            self.update();
            self.neighborhood.rebuild(&self.centroids, &self.sizes);
            log::info!("{:<32}{:<32}", format!("kmeans iteration {}", iteration), changed);
            if changed <= CONVERGED_CHANGES {
                break;
            }
        }
        self.eliminate_empty();
    }

    pub fn num_clusters(&self) -> usize {
        self.centroids.len()
    }
    pub fn assignments(&self) -> &[usize] {
        &self.assignments
    }
    pub fn centroid(&self, cluster: usize) -> &[Energy] {
        &self.centroids[cluster]
    }
    pub fn size(&self, cluster: usize) -> usize {
        self.sizes[cluster]
    }
    /// within-cluster sum of squared distances
    pub fn distortion(&self) -> f64 {
        self.points
            .iter()
            .zip(self.assignments.iter())
            .map(|(point, cluster)| sqdist(point, &self.centroids[*cluster]))
            .sum()
    }

    fn seed(&mut self) {
        if self.k >= UNIFORM_SEED_CLUSTERS && self.points.len() >= UNIFORM_SEED_OBJECTS {
            self.seed_uniform();
        } else {
            self.seed_weighted();
        }
        // seeds count as live until the first update measures them
        self.sizes = vec![1; self.k];
    }

    fn seed_uniform(&mut self) {
        let mut centroids = Vec::with_capacity(self.k);
        for _ in 0..self.k {
            let pick = self.rng.random_range(0..self.points.len());
            centroids.push(self.points[pick].clone());
        }
        self.centroids = centroids;
    }

    /// kmeans++: each next seed drawn with probability proportional to
    /// its squared distance from the nearest seed so far, by binary
    /// search on the cumulative potential
    fn seed_weighted(&mut self) {
        let n = self.points.len();
        let first = self.rng.random_range(0..n);
        self.centroids = vec![self.points[first].clone()];
        let mut potential = self
            .points
            .iter()
            .map(|point| sqdist(point, &self.centroids[0]))
            .collect::<Vec<f64>>();
        while self.centroids.len() < self.k {
            let cdf = potential
                .iter()
                .scan(0.0, |acc, p| {
                    *acc += p;
                    Some(*acc)
                })
                .collect::<Vec<f64>>();
            let total = cdf.last().copied().unwrap_or(0.0);
            let pick = if total > 0.0 {
                let draw = self.rng.random_range(0.0..total);
                cdf.partition_point(|c| *c <= draw)
            } else {
                // every point coincides with a seed already
                self.rng.random_range(0..n)
            };
            let next = self.points[pick].clone();
            for (p, point) in potential.iter_mut().zip(self.points.iter()) {
                *p = p.min(sqdist(point, &next));
            }
            self.centroids.push(next);
        }
    }

    /// one assignment pass; returns how many objects switched cluster
    fn assign(&mut self) -> usize {
        let next = self
            .points
            .par_iter()
            .zip(self.assignments.par_iter())
            .map(|(point, current)| self.nearest(point, *current))
            .collect::<Vec<usize>>();
        let changed = next
            .iter()
            .zip(self.assignments.iter())
            .filter(|(a, b)| a != b)
            .count();
        self.assignments = next;
        changed
    }

    fn nearest(&self, point: &[Energy], current: usize) -> usize {
        if !self.neighborhood.built() {
            return self.nearest_exhaustive(point);
        }
        let anchor = distance(point, &self.centroids[current]);
        let mut best = current;
        let mut best_d = anchor;
        let mut certified = false;
        for (other, between) in self.neighborhood.of(current) {
            // nothing past this neighbor can undercut the running best
            if *between >= anchor + best_d {
                certified = true;
                break;
            }
            let d = distance(point, &self.centroids[*other]);
            if d < best_d || (d == best_d && *other < best) {
                best = *other;
                best_d = d;
            }
        }
        // an exhausted list only covers out to the threshold; anything
        // that could still win must be rescanned the slow way
        if certified || anchor + best_d <= self.neighborhood.threshold() {
            best
        } else {
            self.nearest_exhaustive(point)
        }
    }

    fn nearest_exhaustive(&self, point: &[Energy]) -> usize {
        self.centroids
            .iter()
            .enumerate()
            .filter(|(cluster, _)| self.sizes[*cluster] > 0)
            .map(|(cluster, centroid)| (cluster, distance(point, centroid)))
            .min_by(|x, y| {
                x.1.partial_cmp(&y.1)
                    .expect("finite point distance")
                    .then(x.0.cmp(&y.0))
            })
            .map(|(cluster, _)| cluster)
            .expect("a live cluster")
    }

    /// recompute centroids as per-dimension means of their members.
    /// emptied clusters get a zero centroid until eliminate_empty runs.
    fn update(&mut self) {
        let k = self.centroids.len();
        let dims = self.dims;
        let zero = || (vec![0.0f64; k * dims], vec![0usize; k]);
        let (sums, sizes) = self
            .points
            .par_iter()
            .zip(self.assignments.par_iter())
            .fold(zero, |(mut sums, mut sizes), (point, cluster)| {
                for (d, x) in point.iter().enumerate() {
                    sums[cluster * dims + d] += *x as f64;
                }
                sizes[*cluster] += 1;
                (sums, sizes)
            })
            .reduce(zero, |(mut sums, mut sizes), (other_sums, other_sizes)| {
                for (a, b) in sums.iter_mut().zip(other_sums) {
                    *a += b;
                }
                for (a, b) in sizes.iter_mut().zip(other_sizes) {
                    *a += b;
                }
                (sums, sizes)
            });
        self.centroids = (0..k)
            .map(|c| match sizes[c] {
                0 => vec![0.0; dims],
                n => sums[c * dims..(c + 1) * dims]
                    .iter()
                    .map(|sum| (sum / n as f64) as Energy)
                    .collect(),
            })
            .collect();
        self.sizes = sizes;
    }

    /// compact cluster ids so the survivors are dense from zero
    fn eliminate_empty(&mut self) {
        let remap = self
            .sizes
            .iter()
            .scan(0usize, |next, size| {
                let id = *next;
                if *size > 0 {
                    *next += 1;
                }
                Some(id)
            })
            .collect::<Vec<usize>>();
        for cluster in self.assignments.iter_mut() {
            *cluster = remap[*cluster];
        }
        self.centroids = self
            .centroids
            .drain(..)
            .zip(self.sizes.iter())
            .filter(|(_, size)| **size > 0)
            .map(|(centroid, _)| centroid)
            .collect();
        self.sizes.retain(|size| *size > 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corner_points() -> Vec<Vec<Energy>> {
        vec![
            vec![0.0, 0.0],
            vec![0.0, 1.0],
            vec![9.0, 9.0],
            vec![9.0, 10.0],
        ]
    }

    #[test]
    fn splits_two_obvious_clusters() {
        let mut engine = KMeansEngine::new(corner_points(), 2, 100, 1e9, 0);
        engine.cluster();
        let a = engine.assignments();
        assert!(engine.num_clusters() == 2);
        assert!(a[0] == a[1]);
        assert!(a[2] == a[3]);
        assert!(a[0] != a[2]);
        let near = engine.centroid(a[0]);
        assert!(near[0] == 0.0 && near[1] == 0.5);
        let far = engine.centroid(a[2]);
        assert!(far[0] == 9.0 && far[1] == 9.5);
    }

    #[test]
    fn accelerated_matches_exhaustive() {
        let mut rng = SmallRng::seed_from_u64(7);
        let points = (0..20)
            .map(|_| vec![rng.random_range(0.0..10.0), rng.random_range(0.0..10.0)])
            .collect::<Vec<Vec<Energy>>>();
        let mut engine = KMeansEngine::new(points, 3, 100, 4.0, 7);
        engine.seed();
        for _ in 0..100 {
            let changed = engine.assign();
            let ref expected = engine
                .points
                .iter()
                .map(|point| engine.nearest_exhaustive(point))
                .collect::<Vec<usize>>();
            assert!(engine.assignments() == expected.as_slice());
            engine.update();
            engine.neighborhood.rebuild(&engine.centroids, &engine.sizes);
            if changed <= CONVERGED_CHANGES {
                break;
            }
        }
    }

    #[test]
    fn distortion_never_increases() {
        let mut rng = SmallRng::seed_from_u64(11);
        let points = (0..50)
            .map(|_| vec![rng.random_range(0.0..100.0)])
            .collect::<Vec<Vec<Energy>>>();
        let mut engine = KMeansEngine::new(points, 4, 100, 1e9, 11);
        engine.seed();
        engine.assign();
        let mut last = engine.distortion();
        for _ in 0..100 {
            engine.update();
            engine.neighborhood.rebuild(&engine.centroids, &engine.sizes);
            let changed = engine.assign();
            let now = engine.distortion();
            assert!(now <= last + 1e-6);
            last = now;
            if changed <= CONVERGED_CHANGES {
                break;
            }
        }
    }

    #[test]
    fn degenerate_is_one_object_per_cluster() {
        let mut engine = KMeansEngine::new(corner_points(), 10, 100, 1e9, 0);
        engine.cluster();
        assert!(engine.num_clusters() == 4);
        assert!(engine.assignments() == [0, 1, 2, 3]);
        assert!((0..4).all(|c| engine.size(c) == 1));
    }

    #[test]
    fn ties_break_to_lowest_id() {
        let mut engine = KMeansEngine::new(vec![vec![1.0]], 1, 1, 1e9, 0);
        engine.centroids = vec![vec![0.0], vec![2.0]];
        engine.sizes = vec![1, 1];
        assert!(engine.nearest_exhaustive(&[1.0]) == 0);
    }
}
