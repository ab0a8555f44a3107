use log::debug;
use std::io::{Read, Write};

use crate::error::{GpError, Result};
use crate::types::Fitness;
use crate::utils::{Signature, Tokens};

#[derive(Debug, Clone, Default)]
struct Slot {
    hash: Signature,
    fitness: Fitness,
    seal: u32,
}

/// Fitness cache indexed by individual signature.
///
/// The table has `2^bits` slots and no chaining: an insert overwrites
/// whatever occupies the slot. A slot is valid only if its seal matches the
/// table seal, so `clear` invalidates everything by bumping the seal.
#[derive(Debug, Clone)]
pub struct TranspositionTable {
    mask: u64,
    table: Vec<Slot>,
    seal: u32,
    probes: u64,
    hits: u64,
}

impl TranspositionTable {
    /// Table with `2^bits` slots.
    pub fn new(bits: u32) -> Result<Self> {
        if bits == 0 || bits > 30 {
            return Err(GpError::Configuration(format!(
                "cache size exponent must be in [1, 30] (got {})",
                bits
            )));
        }

        let size = 1usize << bits;
        Ok(Self {
            mask: (size - 1) as u64,
            table: vec![Slot::default(); size],
            seal: 1,
            probes: 0,
            hits: 0,
        })
    }

    fn index(&self, h: &Signature) -> usize {
        (h.data[0] & self.mask) as usize
    }

    pub fn bits(&self) -> u32 {
        self.table.len().trailing_zeros()
    }

    pub fn seal(&self) -> u32 {
        self.seal
    }

    /// Number of lookups since the last `clear`.
    pub fn probes(&self) -> u64 {
        self.probes
    }

    /// Number of successful lookups since the last `clear`.
    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn insert(&mut self, h: Signature, fitness: Fitness) {
        let i = self.index(&h);
        self.table[i] = Slot {
            hash: h,
            fitness,
            seal: self.seal,
        };
    }

    pub fn find(&mut self, h: &Signature) -> Option<Fitness> {
        self.probes += 1;

        let slot = &self.table[self.index(h)];
        if slot.seal == self.seal && slot.hash == *h {
            self.hits += 1;
            Some(slot.fitness.clone())
        } else {
            None
        }
    }

    /// Invalidates every entry in constant time.
    pub fn clear(&mut self) {
        self.seal = self.seal.wrapping_add(1);
        if self.seal == 0 {
            // The seal wrapped: stale slots could match again.
            self.table.iter_mut().for_each(|s| *s = Slot::default());
            self.seal = 1;
        }
        self.probes = 0;
        self.hits = 0;
    }

    /// Invalidates the entry of `h` (if still present).
    pub fn clear_hash(&mut self, h: &Signature) {
        let i = self.index(h);
        if self.table[i].hash == *h {
            self.table[i].seal = 0;
        }
    }

    /// Writes the valid entries:
    ///
    /// ```text
    /// bits seal probes hits
    /// n
    /// hash_0 hash_1 fitness seal      (n lines)
    /// ```
    pub fn save<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(out, "{} {} {} {}", self.bits(), self.seal, self.probes, self.hits)?;

        let valid: Vec<&Slot> = self.table.iter().filter(|s| s.seal == self.seal).collect();
        writeln!(out, "{}", valid.len())?;
        for s in valid {
            writeln!(
                out,
                "{} {} {} {}",
                s.hash.data[0],
                s.hash.data[1],
                s.fitness.to_text(),
                s.seal
            )?;
        }
        Ok(())
    }

    /// Reads a table written by `save`. On error `self` is left untouched.
    pub fn load<R: Read>(&mut self, input: &mut R) -> Result<()> {
        let mut text = String::new();
        input.read_to_string(&mut text)?;
        let mut t = Tokens::new(&text);

        let bits: u32 = t.next("table size")?;
        let mut tmp = Self::new(bits).map_err(|e| GpError::Load(e.to_string()))?;
        tmp.seal = t.next("seal")?;
        if tmp.seal == 0 {
            return Err(GpError::Load("seal 0 marks empty slots".to_string()));
        }
        tmp.probes = t.next("probes")?;
        tmp.hits = t.next("hits")?;

        let n: usize = t.next("number of entries")?;
        for _ in 0..n {
            let hash = Signature::new(t.next("hash")?, t.next("hash")?);

            let len: usize = t.next("fitness size")?;
            let mut components = Vec::new();
            for _ in 0..len {
                components.push(t.next::<f64>("fitness")?);
            }

            let seal: u32 = t.next("slot seal")?;
            if seal != tmp.seal {
                return Err(GpError::Load(format!(
                    "entry sealed {} in a table sealed {}",
                    seal, tmp.seal
                )));
            }
            let i = tmp.index(&hash);
            tmp.table[i] = Slot {
                hash,
                fitness: Fitness::new(components),
                seal,
            };
        }

        debug!("Loaded {} cache entries", n);
        *self = tmp;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sig(a: u64, b: u64) -> Signature {
        Signature::new(a, b)
    }

    #[test]
    fn test_insert_find() {
        let mut tt = TranspositionTable::new(8).unwrap();
        let h = sig(123, 456);
        assert_eq!(tt.find(&h), None);

        tt.insert(h, Fitness::from(4.0));
        assert_eq!(tt.find(&h), Some(Fitness::from(4.0)));
        assert_eq!(tt.probes(), 2);
        assert_eq!(tt.hits(), 1);
    }

    #[test]
    fn test_found_value_survives_other_probes() {
        let mut tt = TranspositionTable::new(8).unwrap();
        let h = sig(1, 2);
        tt.insert(h, Fitness::from(-3.5));
        for k in 2..50 {
            let _ = tt.find(&sig(k, k));
        }
        assert_eq!(tt.find(&h), Some(Fitness::from(-3.5)));
    }

    #[test]
    fn test_colliding_slot_is_overwritten() {
        let mut tt = TranspositionTable::new(4).unwrap();
        let a = sig(0x10, 1);
        let b = sig(0x20, 2);
        tt.insert(a, Fitness::from(1.0));
        tt.insert(b, Fitness::from(2.0));
        assert_eq!(tt.find(&a), None);
        assert_eq!(tt.find(&b), Some(Fitness::from(2.0)));
    }

    #[test]
    fn test_clear_invalidates_everything() {
        let mut tt = TranspositionTable::new(8).unwrap();
        let hashes: Vec<Signature> = (0..20).map(|k| sig(k * 7 + 1, k)).collect();
        for h in &hashes {
            tt.insert(*h, Fitness::from(1.0));
        }

        tt.clear();
        assert!(hashes.iter().all(|h| tt.find(h).is_none()));
        assert_eq!(tt.hits(), 0);
    }

    #[test]
    fn test_clear_hash_only_touches_matching_entry() {
        let mut tt = TranspositionTable::new(8).unwrap();
        let a = sig(5, 5);
        tt.insert(a, Fitness::from(1.0));

        // Same slot, different signature: nothing happens.
        tt.clear_hash(&sig(5, 6));
        assert!(tt.find(&a).is_some());

        tt.clear_hash(&a);
        assert!(tt.find(&a).is_none());
    }

    #[test]
    fn test_save_load_round_trip() {
        let mut tt = TranspositionTable::new(6).unwrap();
        tt.insert(sig(1, 11), Fitness::new(vec![-2.5, 3.0]));
        tt.insert(sig(2, 22), Fitness::from(f64::NEG_INFINITY));
        tt.clear();
        tt.insert(sig(3, 33), Fitness::from(0.125));

        let mut buf = Vec::new();
        tt.save(&mut buf).unwrap();

        let mut loaded = TranspositionTable::new(10).unwrap();
        loaded.load(&mut buf.as_slice()).unwrap();
        assert_eq!(loaded.bits(), 6);
        assert_eq!(loaded.find(&sig(3, 33)), Some(Fitness::from(0.125)));
        assert_eq!(loaded.find(&sig(1, 11)), None);
    }

    #[test]
    fn test_failed_load_keeps_table() {
        let mut tt = TranspositionTable::new(6).unwrap();
        tt.insert(sig(9, 9), Fitness::from(7.0));

        let mut bad: &[u8] = b"6 1 0 0\n2\n9 9 1 7 1\n";
        assert!(tt.load(&mut bad).is_err());
        assert_eq!(tt.find(&sig(9, 9)), Some(Fitness::from(7.0)));

        assert!(TranspositionTable::new(0).is_err());
    }

    #[test]
    fn test_load_rejects_empty_slot_seal() {
        let mut tt = TranspositionTable::new(6).unwrap();
        tt.insert(sig(9, 9), Fitness::from(7.0));

        let mut zero_seal: &[u8] = b"8 0 0 0\n0\n";
        assert!(tt.load(&mut zero_seal).is_err());
        assert_eq!(tt.find(&Signature::default()), None);

        let mut stale_entry: &[u8] = b"8 3 0 0\n1\n4 4 1 2.5 2\n";
        assert!(tt.load(&mut stale_entry).is_err());
        assert_eq!(tt.bits(), 6);
        assert_eq!(tt.find(&sig(9, 9)), Some(Fitness::from(7.0)));
    }
}
