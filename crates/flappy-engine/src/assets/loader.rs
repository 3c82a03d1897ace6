//! Staged asset loading.
//!
//! The loader never fetches anything itself. `begin` turns a validated
//! `LoadRequest` into one ticket per image and queues a `PendingLoad` for the
//! host. The host fetches the images in any order and reports each ticket
//! back exactly once as loaded (with its dimensions) or failed.
//!
//! Readiness is a plain counter comparison: the expected total grows by the
//! number of images in every accepted batch, the completed count grows by one
//! per successful load, and the loader is ready whenever the two are equal.
//! Every completion that brings them level is a threshold crossing, so staged
//! batches each produce their own ready signal.

use std::collections::BTreeMap;

use glam::Vec2;

use crate::api::error::{EngineError, EngineResult};
use crate::api::types::LoadTicket;
use crate::assets::image::ImageInfo;
use crate::assets::registry::{AssetRegistry, AssetSlot};
use crate::assets::request::LoadRequest;
use crate::components::entity::Entity;

/// An image the host should start fetching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingLoad {
    pub ticket: LoadTicket,
    pub src: String,
}

/// Where a completed image goes.
#[derive(Debug, Clone)]
struct InFlight {
    src: String,
    name: Option<String>,
    collection: Option<String>,
    offset: Vec2,
    spawn_count: u32,
}

/// Result of reporting a completed load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    /// Entities created from this image.
    pub spawned: u32,
    /// Whether this completion brought completed == expected.
    pub ready: bool,
}

/// Tracks expected/completed counts and in-flight images.
#[derive(Debug, Default)]
pub struct AssetLoader {
    next_ticket: u32,
    expected: usize,
    completed: usize,
    in_flight: BTreeMap<LoadTicket, InFlight>,
    failed: BTreeMap<LoadTicket, String>,
    queue: Vec<PendingLoad>,
}

impl AssetLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept a batch. The request must already be validated.
    ///
    /// Creates the target collection (once), grows the expected total by
    /// `request.assets.len()` and queues one pending load per image.
    pub fn begin(&mut self, request: &LoadRequest, registry: &mut AssetRegistry) -> Vec<LoadTicket> {
        if let Some(name) = &request.collection_name {
            if registry.ensure_collection(name) {
                log::debug!("Created collection '{}'", name);
            }
        }

        self.expected += request.assets.len();

        let mut tickets = Vec::with_capacity(request.assets.len());
        for asset in &request.assets {
            self.next_ticket += 1;
            let ticket = LoadTicket(self.next_ticket);

            if request.collection_name.is_none() && asset.name.is_none() {
                log::debug!("Asset '{}' has no name; it only counts toward readiness", asset.src);
            }

            self.in_flight.insert(ticket, InFlight {
                src: asset.src.clone(),
                name: asset.name.clone(),
                collection: request.collection_name.clone(),
                offset: asset.offset_vec(),
                spawn_count: request.spawn_count(),
            });
            self.queue.push(PendingLoad {
                ticket,
                src: asset.src.clone(),
            });
            tickets.push(ticket);
        }

        log::debug!(
            "Accepted batch of {} asset(s); expecting {} total",
            tickets.len(),
            self.expected
        );
        tickets
    }

    /// Reject a batch that would put a single asset and a collection under one name.
    ///
    /// Names held by the registry and by single assets still in flight both count.
    /// Collections are created in `begin`, so the registry covers in-flight ones.
    pub fn check_names(&self, request: &LoadRequest, registry: &AssetRegistry) -> EngineResult<()> {
        if let Some(name) = &request.collection_name {
            let single = matches!(registry.slot(name), Some(AssetSlot::Single(_)));
            if single || self.single_in_flight(name) {
                return Err(EngineError::InvalidRequest(format!(
                    "'{name}' is already a single asset"
                )));
            }
            return Ok(());
        }
        for name in request.assets.iter().filter_map(|a| a.name.as_deref()) {
            if let Some(AssetSlot::Collection(_)) = registry.slot(name) {
                return Err(EngineError::InvalidRequest(format!(
                    "'{name}' is already a collection"
                )));
            }
        }
        Ok(())
    }

    fn single_in_flight(&self, name: &str) -> bool {
        self.in_flight
            .values()
            .any(|entry| entry.collection.is_none() && entry.name.as_deref() == Some(name))
    }

    /// Record a successful load and materialize its entities into `registry`.
    ///
    /// Entities capture `gravity_y` by value.
    pub fn complete(
        &mut self,
        ticket: LoadTicket,
        info: ImageInfo,
        gravity_y: f32,
        registry: &mut AssetRegistry,
    ) -> EngineResult<Completion> {
        let entry = self
            .in_flight
            .remove(&ticket)
            .ok_or(EngineError::UnknownTicket(ticket))?;
        self.failed.remove(&ticket);

        let make = || Entity::new(entry.src.clone(), info.size(), entry.offset, gravity_y);
        let spawned = match (&entry.collection, &entry.name) {
            (Some(collection), _) => {
                let mut spawned = 0;
                for _ in 0..entry.spawn_count {
                    if !registry.push_to_collection(collection, make()) {
                        log::error!("Collection '{}' is gone; '{}' spawned nothing", collection, entry.src);
                        break;
                    }
                    spawned += 1;
                }
                spawned
            }
            (None, Some(name)) => {
                if registry.collection(name).is_some() {
                    log::error!("'{}' is a collection; not replacing it with '{}'", name, entry.src);
                    0
                } else {
                    registry.insert_single(name.clone(), make());
                    1
                }
            }
            (None, None) => 0,
        };

        self.completed += 1;
        let ready = self.is_ready();
        log::debug!(
            "Loaded '{}' {} ({}x{}) [{}/{}]",
            entry.src,
            ticket,
            info.width,
            info.height,
            self.completed,
            self.expected
        );
        Ok(Completion { spawned, ready })
    }

    /// Record a failed load. The ticket stays in flight so it can be retried
    /// or completed later. Returns the error to report.
    pub fn fail(&mut self, ticket: LoadTicket, reason: impl Into<String>) -> EngineResult<EngineError> {
        let entry = self
            .in_flight
            .get(&ticket)
            .ok_or(EngineError::UnknownTicket(ticket))?;
        let reason = reason.into();
        self.failed.insert(ticket, reason.clone());
        Ok(EngineError::AssetLoad {
            ticket,
            src: entry.src.clone(),
            reason,
        })
    }

    /// Queue every failed image again under its original ticket.
    /// The expected total is unchanged. Returns how many were queued.
    pub fn retry_failed(&mut self) -> usize {
        let failed = std::mem::take(&mut self.failed);
        let mut count = 0;
        for ticket in failed.into_keys() {
            if let Some(entry) = self.in_flight.get(&ticket) {
                self.queue.push(PendingLoad {
                    ticket,
                    src: entry.src.clone(),
                });
                count += 1;
            }
        }
        count
    }

    /// Queue one failed image again under its ticket.
    /// Returns false if the ticket has not failed.
    pub fn retry(&mut self, ticket: LoadTicket) -> bool {
        if self.failed.remove(&ticket).is_none() {
            return false;
        }
        match self.in_flight.get(&ticket) {
            Some(entry) => {
                self.queue.push(PendingLoad {
                    ticket,
                    src: entry.src.clone(),
                });
                true
            }
            None => false,
        }
    }

    /// Hand all queued loads to the host.
    pub fn take_pending(&mut self) -> Vec<PendingLoad> {
        std::mem::take(&mut self.queue)
    }

    /// Whether the host has loads waiting to be started.
    pub fn has_pending(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Completed equals expected. Vacuously true before any batch.
    pub fn is_ready(&self) -> bool {
        self.completed == self.expected
    }

    pub fn expected(&self) -> usize {
        self.expected
    }

    pub fn completed(&self) -> usize {
        self.completed
    }

    /// Images accepted but not yet completed (including failed ones).
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Failed images awaiting retry, as (ticket, src, reason).
    pub fn failures(&self) -> impl Iterator<Item = (LoadTicket, &str, &str)> {
        self.failed.iter().filter_map(|(ticket, reason)| {
            self.in_flight
                .get(ticket)
                .map(|entry| (*ticket, entry.src.as_str(), reason.as_str()))
        })
    }
}
