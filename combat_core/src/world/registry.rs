//! Generation-checked unit slots

use crate::unit::{Unit, UnitId};

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    unit: Option<Unit>,
}

/// Owning storage for every live unit
///
/// Freed slots are reused with a bumped generation so stale [`UnitId`]s stop
/// resolving. Iteration is in slot order.
#[derive(Debug, Default)]
pub struct UnitRegistry {
    slots: Vec<Slot>,
    free: Vec<u32>,
    len: usize,
}

impl UnitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a slot and build the unit with its final id
    pub fn insert_with(&mut self, build: impl FnOnce(UnitId) -> Unit) -> UnitId {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.slots.push(Slot::default());
                (self.slots.len() - 1) as u32
            }
        };
        let slot = &mut self.slots[index as usize];
        let id = UnitId::new(index, slot.generation);
        slot.unit = Some(build(id));
        self.len += 1;
        id
    }

    pub fn remove(&mut self, id: UnitId) -> Option<Unit> {
        let slot = self.slot_mut(id)?;
        let unit = slot.unit.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index());
        self.len -= 1;
        Some(unit)
    }

    fn slot_mut(&mut self, id: UnitId) -> Option<&mut Slot> {
        self.slots
            .get_mut(id.index() as usize)
            .filter(|slot| slot.generation == id.generation())
    }

    pub fn get(&self, id: UnitId) -> Option<&Unit> {
        self.slots
            .get(id.index() as usize)
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.unit.as_ref())
    }

    pub fn get_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.slot_mut(id).and_then(|slot| slot.unit.as_mut())
    }

    pub fn contains(&self, id: UnitId) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Unit> {
        self.slots.iter().filter_map(|slot| slot.unit.as_ref())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Unit> {
        self.slots.iter_mut().filter_map(|slot| slot.unit.as_mut())
    }

    /// Ids of live units in slot order
    pub fn ids(&self) -> Vec<UnitId> {
        self.iter().map(Unit::id).collect()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
