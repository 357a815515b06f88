use std::fs::File;
use std::io::BufReader;
use std::io::BufWriter;
use std::os::unix::fs::FileExt;
use std::path::Path;

use byteorder::ByteOrder;
use byteorder::LE;
use byteorder::ReadBytesExt;
use byteorder::WriteBytesExt;

use crate::board::BoardTree;
use crate::config::CardAbstraction;
use crate::save::Layout;

/// buckets above this count need 4 byte records
const SHORT_LIMIT: u32 = 1 << 16;

enum Table {
    /// street opted out of bucketing, raw hand indices stand in
    None,
    Shorts(Vec<u16>),
    Ints(Vec<u32>),
    /// file handle kept open, one positioned read per lookup
    Seek { file: File, record: u64 },
}

/// Buckets serves the per-(street, hand) bucket id, where the hand
/// index is board index times hole combos plus hole pair index. tables
/// come off disk either wholesale or as an open handle with positioned
/// reads, chosen per load. record width (2 or 4 bytes) is recovered
/// from the file size, which must divide exactly, anything else means
/// the table was built against a different game.
pub struct Buckets {
    tables: Vec<Table>,
    counts: Vec<u32>,
}

impl Buckets {
    pub fn load(
        layout: &Layout,
        abstraction: &CardAbstraction,
        tree: &BoardTree,
        in_memory: bool,
    ) -> anyhow::Result<Self> {
        let game = tree.game();
        let mut tables = Vec::with_capacity(game.max_street() + 1);
        let mut counts = Vec::with_capacity(game.max_street() + 1);
        for street in 0..=game.max_street() {
            let bucketing = abstraction.bucketing(street);
            if bucketing.is_none() {
                tables.push(Table::None);
                counts.push(0);
                continue;
            }
            let hands = tree.num_boards(street) * game.num_hole_card_pairs(street);
            let ref path = layout.buckets(bucketing.name(), street);
            let ref sidecar = layout.num_buckets(bucketing.name(), street);
            counts.push(Self::read_count(sidecar)?);
            tables.push(Self::read_table(path, hands, in_memory)?);
            log::info!("{:<32}{:<32}", format!("loaded buckets street {}", street), hands);
        }
        Ok(Self { tables, counts })
    }

    fn read_count(path: &Path) -> anyhow::Result<u32> {
        let mut reader = File::open(path)?;
        Ok(reader.read_u32::<LE>()?)
    }

    fn read_table(path: &Path, hands: usize, in_memory: bool) -> anyhow::Result<Table> {
        let file = File::open(path)?;
        let size = file.metadata()?.len();
        let record = size / hands as u64;
        assert!(
            size == record * hands as u64 && (record == 2 || record == 4),
            "bucket file {} holds {} bytes for {} hands",
            path.display(),
            size,
            hands
        );
        if !in_memory {
            return Ok(Table::Seek { file, record });
        }
        let mut reader = BufReader::new(file);
        match record {
            2 => {
                let mut ids = vec![0u16; hands];
                reader.read_u16_into::<LE>(&mut ids)?;
                Ok(Table::Shorts(ids))
            }
            _ => {
                let mut ids = vec![0u32; hands];
                reader.read_u32_into::<LE>(&mut ids)?;
                Ok(Table::Ints(ids))
            }
        }
    }

    /// write one street's table and its count sidecar. record width
    /// follows the bucket count so the read side can recover it.
    pub fn write(
        layout: &Layout,
        bucketing: &str,
        street: usize,
        num_buckets: u32,
        ids: &[u32],
    ) -> anyhow::Result<()> {
        assert!(ids.iter().all(|id| *id < num_buckets));
        let mut writer = BufWriter::new(File::create(layout.buckets(bucketing, street))?);
        if num_buckets > SHORT_LIMIT {
            for id in ids.iter() {
                writer.write_u32::<LE>(*id)?;
            }
        } else {
            for id in ids.iter() {
                writer.write_u16::<LE>(*id as u16)?;
            }
        }
        let mut sidecar = File::create(layout.num_buckets(bucketing, street))?;
        sidecar.write_u32::<LE>(num_buckets)?;
        Ok(())
    }

    pub fn no_bucketing(&self, street: usize) -> bool {
        matches!(self.tables[street], Table::None)
    }
    /// zero on streets without bucketing
    pub fn num_buckets(&self, street: usize) -> u32 {
        self.counts[street]
    }

    pub fn bucket(&self, street: usize, hand: usize) -> u32 {
        match &self.tables[street] {
            Table::None => panic!("street {} has no bucketing", street),
            Table::Shorts(ids) => ids[hand] as u32,
            Table::Ints(ids) => ids[hand],
            Table::Seek { file, record } => {
                let mut buf = [0u8; 4];
                let at = hand as u64 * record;
                file.read_exact_at(&mut buf[..*record as usize], at)
                    .expect("positioned bucket read");
                match record {
                    2 => LE::read_u16(&buf[..2]) as u32,
                    _ => LE::read_u32(&buf),
                }
            }
        }
    }
}
