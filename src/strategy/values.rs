use std::io::Read;
use std::io::Write;

use byteorder::LE;
use byteorder::ReadBytesExt;
use byteorder::WriteBytesExt;

/// backing storage for one strategy table. trained tables arrive in
/// whatever width the solver accumulated in; tables we produce are
/// always Doubles. readers go through value() and never branch on the
/// storage kind.
pub enum Values {
    Chars(Vec<u8>),
    Shorts(Vec<u16>),
    Ints(Vec<i32>),
    Doubles(Vec<f64>),
}

impl Values {
    pub fn zeros(n: usize) -> Self {
        Self::Doubles(vec![0.0; n])
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Chars(v) => v.len(),
            Self::Shorts(v) => v.len(),
            Self::Ints(v) => v.len(),
            Self::Doubles(v) => v.len(),
        }
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn value(&self, i: usize) -> f64 {
        match self {
            Self::Chars(v) => v[i] as f64,
            Self::Shorts(v) => v[i] as f64,
            Self::Ints(v) => v[i] as f64,
            Self::Doubles(v) => v[i],
        }
    }

    pub fn set(&mut self, i: usize, x: f64) {
        match self {
            Self::Doubles(v) => v[i] = x,
            _ => panic!("integer backed tables are read only"),
        }
    }
    pub fn add(&mut self, i: usize, x: f64) {
        match self {
            Self::Doubles(v) => v[i] += x,
            _ => panic!("integer backed tables are read only"),
        }
    }

    fn tag(&self) -> u8 {
        match self {
            Self::Chars(_) => 0,
            Self::Shorts(_) => 1,
            Self::Ints(_) => 2,
            Self::Doubles(_) => 3,
        }
    }

    pub fn save<W: Write>(&self, writer: &mut W) -> anyhow::Result<()> {
        writer.write_u8(self.tag())?;
        writer.write_u64::<LE>(self.len() as u64)?;
        match self {
            Self::Chars(v) => writer.write_all(v)?,
            Self::Shorts(v) => {
                for x in v.iter() {
                    writer.write_u16::<LE>(*x)?;
                }
            }
            Self::Ints(v) => {
                for x in v.iter() {
                    writer.write_i32::<LE>(*x)?;
                }
            }
            Self::Doubles(v) => {
                for x in v.iter() {
                    writer.write_f64::<LE>(*x)?;
                }
            }
        }
        Ok(())
    }

    pub fn load<R: Read>(reader: &mut R) -> anyhow::Result<Self> {
        let tag = reader.read_u8()?;
        let len = reader.read_u64::<LE>()? as usize;
        Ok(match tag {
            0 => {
                let mut v = vec![0u8; len];
                reader.read_exact(&mut v)?;
                Self::Chars(v)
            }
            1 => {
                let mut v = vec![0u16; len];
                reader.read_u16_into::<LE>(&mut v)?;
                Self::Shorts(v)
            }
            2 => {
                let mut v = vec![0i32; len];
                reader.read_i32_into::<LE>(&mut v)?;
                Self::Ints(v)
            }
            3 => {
                let mut v = vec![0f64; len];
                reader.read_f64_into::<LE>(&mut v)?;
                Self::Doubles(v)
            }
            tag => panic!("unknown values tag {}", tag),
        })
    }
}
