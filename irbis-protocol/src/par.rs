//! PAR files: where each part of a database lives on the server.
//!
//! Lines are `N=path` with `N` from 1 to 11; anything else is ignored.

use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParFile {
    /// 1: cross-reference (`.xrf`).
    pub xrf: String,
    /// 2: master file (`.mst`).
    pub mst: String,
    /// 3: B-tree control (`.cnt`).
    pub cnt: String,
    pub n01: String,
    pub n02: String,
    pub l01: String,
    pub l02: String,
    /// 8: inverted file (`.ifp`).
    pub ifp: String,
    /// 9: any other database file.
    pub any: String,
    /// 10: format scripts.
    pub pft: String,
    /// 11: external objects.
    pub ext: String,
}

impl ParFile {
    /// All parts in one directory.
    pub fn new(path: &str) -> Self {
        let mut par = Self::default();
        for number in 1..=11 {
            if let Some(slot) = par.slot_mut(number) {
                *slot = path.to_string();
            }
        }
        par
    }

    pub fn parse<S: AsRef<str>>(lines: &[S]) -> Self {
        let mut par = Self::default();
        for line in lines {
            let Some((key, value)) = line.as_ref().split_once('=') else {
                continue;
            };
            let Ok(number) = key.trim().parse::<u8>() else {
                continue;
            };
            if let Some(slot) = par.slot_mut(number) {
                *slot = value.trim().to_string();
            }
        }
        par
    }

    fn slot_mut(&mut self, number: u8) -> Option<&mut String> {
        let slot = match number {
            1 => &mut self.xrf,
            2 => &mut self.mst,
            3 => &mut self.cnt,
            4 => &mut self.n01,
            5 => &mut self.n02,
            6 => &mut self.l01,
            7 => &mut self.l02,
            8 => &mut self.ifp,
            9 => &mut self.any,
            10 => &mut self.pft,
            11 => &mut self.ext,
            _ => return None,
        };
        Some(slot)
    }

    fn slots(&self) -> [&str; 11] {
        [
            &self.xrf, &self.mst, &self.cnt, &self.n01, &self.n02, &self.l01, &self.l02,
            &self.ifp, &self.any, &self.pft, &self.ext,
        ]
    }
}

impl fmt::Display for ParFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, path) in self.slots().iter().enumerate() {
            writeln!(f, "{}={}", index + 1, path)?;
        }
        Ok(())
    }
}
