//! Stack-based container storage.
//!
//! The yard is a map from ground slot `(zone, bay, row)` to a stack of
//! containers, ground tier first. Stacks are strictly LIFO: only the top
//! container can be lifted, so reaching a buried box costs one relocation
//! per container above it (the digging penalty).
//!
//! Empty stacks are dropped from the map, so every stored stack holds at
//! least one container and never more than `max_tiers`.

use std::collections::BTreeMap;

use lantern_types::{Container, ContainerId, ZoneId};
use tracing::debug;

use crate::error::YardError;
use crate::zones::ZoneCapacity;

/// Default stacking height limit.
pub const DEFAULT_MAX_TIERS: usize = 5;

/// A ground slot.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StackKey {
    /// Zone holding the slot.
    pub zone: ZoneId,
    /// Bay number, from 1.
    pub bay: u32,
    /// Row number, from 1.
    pub row: u32,
}

impl StackKey {
    /// Name a ground slot.
    pub const fn new(zone: ZoneId, bay: u32, row: u32) -> Self {
        Self { zone, bay, row }
    }
}

/// Where a container sits: its slot and tier (0 is the ground).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YardLocation {
    /// Ground slot.
    pub key: StackKey,
    /// Tier within the stack.
    pub tier: usize,
}

/// Container yard.
#[derive(Debug, Clone)]
pub struct YardStore {
    stacks: BTreeMap<StackKey, Vec<Container>>,
    max_tiers: usize,
}

impl YardStore {
    /// Create an empty yard with the given stacking limit (at least 1).
    pub fn new(max_tiers: usize) -> Self {
        Self {
            stacks: BTreeMap::new(),
            max_tiers: max_tiers.max(1),
        }
    }

    /// Stacking height limit.
    pub const fn max_tiers(&self) -> usize {
        self.max_tiers
    }

    /// Containers stored across all stacks.
    pub fn len(&self) -> usize {
        self.stacks.values().map(Vec::len).sum()
    }

    /// Whether the yard holds no containers.
    pub fn is_empty(&self) -> bool {
        self.stacks.is_empty()
    }

    // -------------------------------------------------------------------
    // Stack operations
    // -------------------------------------------------------------------

    /// Put a container on top of a stack. Returns the tier it landed on.
    ///
    /// # Errors
    ///
    /// [`YardError::StackFull`] when the stack is at the tier limit.
    pub fn add(&mut self, container: Container, key: StackKey) -> Result<usize, YardError> {
        let height = self.stack_height(&key);
        if height >= self.max_tiers {
            return Err(self.full(&key));
        }
        debug!(container = %container.id, zone = %key.zone, bay = key.bay, row = key.row, tier = height, "Container stacked");
        self.stacks.entry(key).or_default().push(container);
        Ok(height)
    }

    /// Lift the top container off a stack. `None` when the slot is empty.
    pub fn remove(&mut self, key: &StackKey) -> Option<Container> {
        let stack = self.stacks.get_mut(key)?;
        let container = stack.pop();
        if stack.is_empty() {
            self.stacks.remove(key);
        }
        container
    }

    /// Move the top container of `from` onto `to`.
    ///
    /// All checks run before anything is mutated.
    ///
    /// # Errors
    ///
    /// [`YardError::SameStack`], [`YardError::SourceEmpty`], or
    /// [`YardError::StackFull`] for the destination.
    pub fn move_container(&mut self, from: &StackKey, to: &StackKey) -> Result<(), YardError> {
        if from == to {
            return Err(YardError::SameStack);
        }
        if self.stack_height(from) == 0 {
            return Err(YardError::SourceEmpty {
                zone: from.zone.clone(),
                bay: from.bay,
                row: from.row,
            });
        }
        if self.stack_height(to) >= self.max_tiers {
            return Err(self.full(to));
        }
        if let Some(container) = self.remove(from) {
            self.stacks.entry(to.clone()).or_default().push(container);
        }
        Ok(())
    }

    // -------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------

    /// Containers stacked on a slot.
    pub fn stack_height(&self, key: &StackKey) -> usize {
        self.stacks.get(key).map_or(0, Vec::len)
    }

    /// Container at a given tier, if the stack is that tall.
    pub fn container_at(&self, key: &StackKey, tier: usize) -> Option<&Container> {
        self.stacks.get(key).and_then(|s| s.get(tier))
    }

    /// Relocations needed to reach the container at `tier`.
    ///
    /// Returns 0 for a missing stack or an out-of-range tier rather than
    /// signalling an error.
    pub fn digging_penalty(&self, key: &StackKey, tier: usize) -> usize {
        let height = self.stack_height(key);
        if tier >= height {
            return 0;
        }
        height.saturating_sub(1).saturating_sub(tier)
    }

    /// Locate a container by number, ignoring case.
    pub fn find(&self, id: &str) -> Option<(YardLocation, &Container)> {
        self.stacks.iter().find_map(|(key, stack)| {
            stack.iter().enumerate().find_map(|(tier, c)| {
                c.id.matches(id).then(|| {
                    (
                        YardLocation {
                            key: key.clone(),
                            tier,
                        },
                        c,
                    )
                })
            })
        })
    }

    /// Every container in a zone with its location, ordered by bay, row, tier.
    pub fn containers_in_zone(&self, zone: &ZoneId) -> Vec<(YardLocation, &Container)> {
        self.stacks
            .iter()
            .filter(|(key, _)| &key.zone == zone)
            .flat_map(|(key, stack)| {
                stack.iter().enumerate().map(|(tier, c)| {
                    (
                        YardLocation {
                            key: key.clone(),
                            tier,
                        },
                        c,
                    )
                })
            })
            .collect()
    }

    // -------------------------------------------------------------------
    // Zone-level placement
    // -------------------------------------------------------------------

    /// Put a container on the first stack of the zone with room, scanning
    /// bays then rows of the zone's slot grid.
    ///
    /// # Errors
    ///
    /// [`YardError::ZoneFull`] when every slot is at the tier limit.
    pub fn stow(
        &mut self,
        container: Container,
        zone: &ZoneId,
        capacity: ZoneCapacity,
    ) -> Result<YardLocation, YardError> {
        let Some(key) = self.first_open_slot(zone, capacity, None) else {
            return Err(YardError::ZoneFull(zone.clone()));
        };
        let tier = self.add(container, key.clone())?;
        Ok(YardLocation { key, tier })
    }

    /// Dig a container out of its stack.
    ///
    /// Every container above it is relocated to another stack of the same
    /// zone first. Returns the container and how many relocations it took.
    /// Nothing is moved unless the zone has room for every relocation.
    ///
    /// # Errors
    ///
    /// [`YardError::ContainerNotFound`] when the container is not stored and
    /// [`YardError::ZoneFull`] when the relocations do not fit.
    pub fn retrieve(
        &mut self,
        id: &ContainerId,
        capacity: ZoneCapacity,
    ) -> Result<(Container, usize), YardError> {
        let Some((location, _)) = self.find(id.as_str()) else {
            return Err(YardError::ContainerNotFound(id.clone()));
        };
        let source = location.key;
        let digs = self.digging_penalty(&source, location.tier);

        if self.free_slots_excluding(&source, capacity) < digs {
            return Err(YardError::ZoneFull(source.zone));
        }
        for _ in 0..digs {
            let Some(dest) = self.first_open_slot(&source.zone, capacity, Some(&source)) else {
                return Err(YardError::ZoneFull(source.zone));
            };
            self.move_container(&source, &dest)?;
        }
        let container = self
            .remove(&source)
            .ok_or_else(|| YardError::ContainerNotFound(id.clone()))?;
        debug!(container = %container.id, relocations = digs, "Container retrieved from yard");
        Ok((container, digs))
    }

    fn first_open_slot(
        &self,
        zone: &ZoneId,
        capacity: ZoneCapacity,
        skip: Option<&StackKey>,
    ) -> Option<StackKey> {
        (1..=capacity.bays)
            .flat_map(|bay| (1..=capacity.rows).map(move |row| (bay, row)))
            .map(|(bay, row)| StackKey::new(zone.clone(), bay, row))
            .filter(|key| skip != Some(key))
            .find(|key| self.stack_height(key) < self.max_tiers)
    }

    fn free_slots_excluding(&self, source: &StackKey, capacity: ZoneCapacity) -> usize {
        (1..=capacity.bays)
            .flat_map(|bay| (1..=capacity.rows).map(move |row| (bay, row)))
            .map(|(bay, row)| StackKey::new(source.zone.clone(), bay, row))
            .filter(|key| key != source)
            .map(|key| self.max_tiers.saturating_sub(self.stack_height(&key)))
            .fold(0_usize, usize::saturating_add)
    }

    fn full(&self, key: &StackKey) -> YardError {
        YardError::StackFull {
            zone: key.zone.clone(),
            bay: key.bay,
            row: key.row,
            max_tiers: self.max_tiers,
        }
    }
}

impl Default for YardStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TIERS)
    }
}
