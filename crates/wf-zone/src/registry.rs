//! Zone registry: ordered zone storage with name resolution.
//!
//! Zones live in insertion order in a `Vec`; ids are stable indexes into it.
//! Removal keeps slots (a tombstone) so ids handed out earlier never shift.

use std::collections::HashMap;

use wf_core::ZoneId;

use crate::error::{ZoneError, ZoneResult};
use crate::zone::{Zone, ZoneSpec};

/// Owns every zone in the system.
#[derive(Debug, Clone, Default)]
pub struct ZoneRegistry {
    slots: Vec<Option<Zone>>,
    by_name: HashMap<String, ZoneId>,
}

impl ZoneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new zone. Rejects duplicate names and invalid specs.
    pub fn add(&mut self, spec: ZoneSpec) -> ZoneResult<ZoneId> {
        if self.by_name.contains_key(&spec.name) {
            return Err(ZoneError::DuplicateZone { name: spec.name });
        }
        let zone = Zone::new(spec)?;
        let id = ZoneId::from_index(self.slots.len() as u32);
        self.by_name.insert(zone.name.clone(), id);
        self.slots.push(Some(zone));
        Ok(id)
    }

    /// Remove a zone, forcing its heating off first. Returns the zone.
    pub fn remove(&mut self, id: ZoneId) -> ZoneResult<Zone> {
        let slot = self
            .slots
            .get_mut(id.index() as usize)
            .ok_or_else(|| unknown(id))?;
        let mut zone = slot.take().ok_or_else(|| unknown(id))?;
        zone.force_off();
        self.by_name.remove(&zone.name);
        Ok(zone)
    }

    pub fn resolve(&self, name: &str) -> ZoneResult<ZoneId> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| ZoneError::UnknownZone {
                name: name.to_string(),
            })
    }

    pub fn get(&self, id: ZoneId) -> ZoneResult<&Zone> {
        self.slots
            .get(id.index() as usize)
            .and_then(|s| s.as_ref())
            .ok_or_else(|| unknown(id))
    }

    pub fn get_mut(&mut self, id: ZoneId) -> ZoneResult<&mut Zone> {
        self.slots
            .get_mut(id.index() as usize)
            .and_then(|s| s.as_mut())
            .ok_or_else(|| unknown(id))
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Live zones in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (ZoneId, &Zone)> {
        self.slots.iter().enumerate().filter_map(|(i, slot)| {
            slot.as_ref().map(|z| (ZoneId::from_index(i as u32), z))
        })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (ZoneId, &mut Zone)> {
        self.slots.iter_mut().enumerate().filter_map(|(i, slot)| {
            slot.as_mut().map(|z| (ZoneId::from_index(i as u32), z))
        })
    }

    /// Mutable access to the raw slots, for per-zone parallel processing.
    /// Indexes align with `ZoneId::index()`.
    pub fn slots_mut(&mut self) -> &mut [Option<Zone>] {
        &mut self.slots
    }
}

fn unknown(id: ZoneId) -> ZoneError {
    ZoneError::UnknownZone {
        name: format!("#{id}"),
    }
}
