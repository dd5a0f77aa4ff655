use crate::util::{valid_units, Unit};

/// Display units offered for one directory and the one in use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitCycle {
    units: Vec<Unit>,
    index: usize,
}

impl UnitCycle {
    pub fn for_size(size: u64) -> Self {
        UnitCycle {
            units: valid_units(size),
            index: 0,
        }
    }

    pub fn current(&self) -> Unit {
        self.units.get(self.index).copied().unwrap_or(Unit::Human)
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    /// Re-derives the valid units after the size changed, keeping the
    /// current unit when it is still readable.
    pub fn resize(&mut self, size: u64) {
        let units = valid_units(size);
        if units == self.units {
            return;
        }
        let current = self.current();
        self.index = units.iter().position(|u| *u == current).unwrap_or(0);
        self.units = units;
    }

    /// Moves to the next valid unit, wrapping back to Human.
    pub fn advance(&mut self) -> Unit {
        self.index = (self.index + 1) % self.units.len().max(1);
        self.current()
    }
}
