use std::fs::File;
use std::io::BufReader;
use std::io::BufWriter;
use std::path::Path;
use std::path::PathBuf;

use byteorder::LE;
use byteorder::ReadBytesExt;
use byteorder::WriteBytesExt;

use crate::Energy;
use crate::game::Game;

/// Layout derives every artifact path from the game key tuple, so the
/// same (directory, game) pair always round-trips to the same files.
/// artifacts are further keyed by the abstraction names and street that
/// produced them.
pub struct Layout {
    dir: PathBuf,
    stamp: String,
}

impl Layout {
    pub fn new(dir: &Path, game: &Game) -> Self {
        Self {
            dir: dir.to_path_buf(),
            stamp: format!(
                "{}.{}.{}.{}",
                game.name(),
                game.num_ranks(),
                game.num_suits(),
                game.max_street()
            ),
        }
    }

    /// per-hand bucket id array
    pub fn buckets(&self, bucketing: &str, street: usize) -> PathBuf {
        self.dir
            .join(format!("buckets.{}.{}.{}", self.stamp, bucketing, street))
    }
    /// single 32 bit bucket count sidecar
    pub fn num_buckets(&self, bucketing: &str, street: usize) -> PathBuf {
        self.dir
            .join(format!("num_buckets.{}.{}.{}", self.stamp, bucketing, street))
    }
    /// per-hand feature vectors consumed by clustering
    pub fn features(&self, feature: &str, street: usize) -> PathBuf {
        self.dir
            .join(format!("features.{}.{}.{}", self.stamp, feature, street))
    }
    /// accumulated strategy table for one player
    pub fn sumprobs(
        &self,
        cards: &str,
        betting: &str,
        cfr: &str,
        iteration: usize,
        player: usize,
    ) -> PathBuf {
        self.dir.join(format!(
            "sumprobs.{}.{}.{}.{}.{}.p{}",
            self.stamp, cards, betting, cfr, iteration, player
        ))
    }
}

/// Features holds one fixed-width i16 vector per hand, the clustering
/// input. on disk: a u32 dimension header followed by the rows back to
/// back, all little endian.
pub struct Features {
    dims: usize,
    rows: Vec<Vec<i16>>,
}

impl Features {
    pub fn new(dims: usize, rows: Vec<Vec<i16>>) -> Self {
        assert!(dims >= 1);
        assert!(rows.iter().all(|row| row.len() == dims));
        Self { dims, rows }
    }

    pub fn dims(&self) -> usize {
        self.dims
    }
    pub fn len(&self) -> usize {
        self.rows.len()
    }
    pub fn rows(&self) -> &[Vec<i16>] {
        &self.rows
    }
    /// rows widened to the float type the clustering engine works in
    pub fn points(&self) -> Vec<Vec<Energy>> {
        self.rows
            .iter()
            .map(|row| row.iter().map(|x| *x as Energy).collect())
            .collect()
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        log::info!("{:<32}{:<32}", "loading features", path.display());
        let mut reader = BufReader::new(File::open(path)?);
        let dims = reader.read_u32::<LE>()? as usize;
        assert!(dims >= 1, "empty feature header in {}", path.display());
        let mut rows = Vec::new();
        loop {
            let mut row = Vec::with_capacity(dims);
            match reader.read_i16::<LE>() {
                Ok(first) => row.push(first),
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
                Err(e) => return Err(e.into()),
            }
            for _ in 1..dims {
                row.push(reader.read_i16::<LE>()?);
            }
            rows.push(row);
        }
        Ok(Self { dims, rows })
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        log::info!("{:<32}{:<32}", "saving features", path.display());
        let mut writer = BufWriter::new(File::create(path)?);
        writer.write_u32::<LE>(self.dims as u32)?;
        for row in self.rows.iter() {
            for x in row.iter() {
                writer.write_i16::<LE>(*x)?;
            }
        }
        Ok(())
    }
}
