use rayon::prelude::*;

use crate::Energy;

/// squared euclidean distance, accumulated in f64
pub fn sqdist(a: &[Energy], b: &[Energy]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (*x as f64 - *y as f64).powi(2))
        .sum()
}

/// euclidean distance
pub fn distance(a: &[Energy], b: &[Energy]) -> f64 {
    sqdist(a, b).sqrt()
}

/// Neighborhood caches, for every cluster, the other live clusters
/// within a threshold distance, sorted nearest first. the assignment
/// step walks these short lists instead of all k centroids, and the
/// lists are rebuilt after every centroid update.
pub struct Neighborhood {
    threshold: f64,
    lists: Vec<Vec<(usize, f64)>>,
}

impl Neighborhood {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            lists: Vec::new(),
        }
    }

    pub fn rebuild(&mut self, centroids: &[Vec<Energy>], sizes: &[usize]) {
        let threshold = self.threshold;
        self.lists = centroids
            .par_iter()
            .enumerate()
            .map(|(c, centroid)| {
                let mut list = centroids
                    .iter()
                    .enumerate()
                    .filter(|(other, _)| *other != c && sizes[*other] > 0)
                    .map(|(other, around)| (other, distance(centroid, around)))
                    .filter(|(_, d)| *d < threshold)
                    .collect::<Vec<(usize, f64)>>();
                list.sort_by(|x, y| {
                    x.1.partial_cmp(&y.1)
                        .expect("finite centroid distance")
                        .then(x.0.cmp(&y.0))
                });
                list
            })
            .collect();
    }

    /// nearest-first neighbors of a cluster, empty until first rebuild
    pub fn of(&self, cluster: usize) -> &[(usize, f64)] {
        self.lists.get(cluster).map(Vec::as_slice).unwrap_or(&[])
    }

    /// largest centroid distance the lists are guaranteed to cover
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// false until the first rebuild
    pub fn built(&self) -> bool {
        !self.lists.is_empty()
    }
}
