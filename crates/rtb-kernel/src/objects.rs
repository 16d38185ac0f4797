//! Object tables
//!
//! One table per object class, sized from the budget at start-up. A table
//! enforces two independent caps:
//!
//! - application objects never exceed the declared limit (no cap when the
//!   class is unlimited)
//! - system objects never exceed the reserve the start-up routine asked for
//!
//! Fixed tables are fully pre-allocated and never grow. Unlimited tables
//! start with one block of `increment` slots and add a block whenever every
//! slot is taken.
//!
//! Each slot carries a u32 generation bumped on every delete. A stale id
//! resolves again only after 2^32 reuses of the same slot.

use alloc::vec::Vec;

use rtb_config::{Limit, ObjectClass};

use crate::error::KernelError;
use crate::types::{ObjectId, Owner};

#[derive(Clone, Copy, Debug)]
struct Slot {
    generation: u32,
    owner: Option<Owner>,
}

impl Slot {
    const FREE: Slot = Slot {
        generation: 0,
        owner: None,
    };
}

/// Table for one object class
pub struct ObjectTable {
    class: ObjectClass,
    limit: Limit,
    reserve: u32,
    slots: Vec<Slot>,
    application_live: u32,
    system_live: u32,
    blocks: u32,
}

impl ObjectTable {
    /// Allocate a table for `class`, with `reserve` extra slots for
    /// system objects.
    pub fn new(class: ObjectClass, limit: Limit, reserve: u32) -> Result<Self, KernelError> {
        let mut table = Self {
            class,
            limit,
            reserve,
            slots: Vec::new(),
            application_live: 0,
            system_live: 0,
            blocks: 0,
        };
        let initial = limit
            .initial_capacity()
            .checked_add(reserve)
            .ok_or(KernelError::WorkspaceExhausted { class })?;
        table.grow(initial)?;
        if limit.initial_capacity() > 0 {
            table.blocks = 1;
        }
        Ok(table)
    }

    /// Create an object, returning its id
    pub fn create(&mut self, owner: Owner) -> Result<ObjectId, KernelError> {
        let too_many = KernelError::TooMany { class: self.class };
        match owner {
            Owner::System if self.system_live >= self.reserve => return Err(too_many),
            Owner::Application => match self.limit.cap() {
                Some(cap) if self.application_live >= cap => return Err(too_many),
                _ => {}
            },
            _ => {}
        }

        let index = match self.slots.iter().position(|s| s.owner.is_none()) {
            Some(index) => index,
            None => {
                // Only an unlimited table can be full while under its caps
                let Limit::Unlimited { increment } = self.limit else {
                    return Err(too_many);
                };
                let first_new = self.slots.len();
                self.grow(increment)?;
                self.blocks += 1;
                first_new
            }
        };

        let slot = &mut self.slots[index];
        slot.owner = Some(owner);
        match owner {
            Owner::System => self.system_live += 1,
            Owner::Application => self.application_live += 1,
        }

        Ok(ObjectId {
            class: self.class,
            index: index as u32,
            generation: slot.generation,
        })
    }

    /// Delete an object, invalidating its id
    pub fn delete(&mut self, id: ObjectId) -> Result<(), KernelError> {
        if id.class != self.class {
            return Err(KernelError::InvalidId);
        }
        let slot = self
            .slots
            .get_mut(id.index as usize)
            .filter(|s| s.generation == id.generation)
            .ok_or(KernelError::InvalidId)?;
        let owner = slot.owner.take().ok_or(KernelError::InvalidId)?;
        slot.generation = slot.generation.wrapping_add(1);
        match owner {
            Owner::System => self.system_live -= 1,
            Owner::Application => self.application_live -= 1,
        }
        Ok(())
    }

    /// Check whether `id` names a live object
    pub fn contains(&self, id: ObjectId) -> bool {
        id.class == self.class
            && self
                .slots
                .get(id.index as usize)
                .is_some_and(|s| s.generation == id.generation && s.owner.is_some())
    }

    fn grow(&mut self, additional: u32) -> Result<(), KernelError> {
        let additional = additional as usize;
        self.slots
            .try_reserve_exact(additional)
            .map_err(|_| KernelError::WorkspaceExhausted { class: self.class })?;
        self.slots
            .extend(core::iter::repeat(Slot::FREE).take(additional));
        Ok(())
    }

    // ========================================================================
    // Read-only accessors
    // ========================================================================

    pub fn class(&self) -> ObjectClass {
        self.class
    }

    pub fn limit(&self) -> Limit {
        self.limit
    }

    /// Live application objects
    pub fn live(&self) -> u32 {
        self.application_live
    }

    /// Live system objects
    pub fn system_live(&self) -> u32 {
        self.system_live
    }

    /// Slots currently allocated, free or not
    pub fn capacity(&self) -> u32 {
        self.slots.len() as u32
    }

    /// Allocation blocks taken so far (1 for a declared fixed table)
    pub fn blocks(&self) -> u32 {
        self.blocks
    }
}

/// Tables for every class, indexed by `ObjectClass::index`
pub struct ObjectTables {
    tables: Vec<ObjectTable>,
}

impl ObjectTables {
    /// Size every table. `reserve` gives the system reserve per class.
    pub fn new(
        limit_of: impl Fn(ObjectClass) -> Limit,
        reserve: impl Fn(ObjectClass) -> u32,
    ) -> Result<Self, KernelError> {
        let tables = ObjectClass::ALL
            .into_iter()
            .map(|class| ObjectTable::new(class, limit_of(class), reserve(class)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { tables })
    }

    pub fn get(&self, class: ObjectClass) -> &ObjectTable {
        &self.tables[class.index()]
    }

    pub fn get_mut(&mut self, class: ObjectClass) -> &mut ObjectTable {
        &mut self.tables[class.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &ObjectTable> {
        self.tables.iter()
    }
}
