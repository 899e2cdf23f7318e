//! Boundary operations over the single pet.
//!
//! Every operation is one critical section: load → advance → [action] → event → save.
//! The lock covers the file round trip as well, so concurrent callers can never interleave
//! and break the monotonic fields (age, stage, runaway).

use chrono::{DateTime, Utc};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use crate::config::Config;
use crate::logutil::escape_log;
use crate::pet::{advance, apply_action, maybe_trigger_event, ActionRequest, EventSource, PetRecord, PetResult};
use crate::storage::PetStore;

pub const SERVICE_NAME: &str = "Virtual Pet Manager";

/// One entry of the discovery descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub method: String,
    pub path: String,
}

/// Static description of the operations the service exposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discovery {
    pub name: String,
    pub endpoints: BTreeMap<String, Endpoint>,
}

impl Discovery {
    pub fn standard() -> Self {
        let endpoints = [
            ("status", "GET", "/pet/status"),
            ("update", "POST", "/pet/update"),
            ("reset", "POST", "/reset"),
            ("discovery", "GET", "/mcp/discovery"),
        ]
        .into_iter()
        .map(|(key, method, path)| {
            (
                key.to_string(),
                Endpoint {
                    method: method.to_string(),
                    path: path.to_string(),
                },
            )
        })
        .collect();
        Discovery {
            name: SERVICE_NAME.to_string(),
            endpoints,
        }
    }
}

struct Inner<R> {
    store: PetStore,
    events: R,
}

/// Owns the store and the event randomness behind one lock.
pub struct PetService<R = StdRng> {
    inner: Mutex<Inner<R>>,
}

impl PetService<StdRng> {
    /// Service wired from configuration; `pet.event_seed` makes events reproducible.
    pub fn from_config(config: &Config) -> Self {
        let store = PetStore::from_config(&config.storage, &config.pet.default_name);
        let rng = match config.pet.event_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        PetService::new(store, rng)
    }
}

impl<R: EventSource> PetService<R> {
    pub fn new(store: PetStore, events: R) -> Self {
        PetService {
            inner: Mutex::new(Inner { store, events }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner<R>> {
        // A panic mid-cycle never saved anything, so the guarded state is still usable
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Advance the pet to `now`, roll for an event, persist and return it.
    pub fn get_status(&self, now: DateTime<Utc>) -> PetResult<PetRecord> {
        let mut guard = self.lock();
        let inner = &mut *guard;
        let mut pet = inner.store.load_or_create(now)?;
        let report = advance(&mut pet, now);
        if let Some(stage) = report.grew_into {
            info!("pet '{}' grew into {}", escape_log(&pet.name), stage);
        }
        if report.ran_away {
            info!("pet '{}' ran away", escape_log(&pet.name));
        }
        if let Some(event) = maybe_trigger_event(&mut pet, &mut inner.events) {
            debug!("random event: {:?}", event);
        }
        inner.store.save(&pet)?;
        Ok(pet)
    }

    /// Advance, apply `request`, roll for an event, persist and return the pet.
    ///
    /// A rejected request returns the error and leaves the stored record untouched.
    pub fn update_status(&self, request: &ActionRequest, now: DateTime<Utc>) -> PetResult<PetRecord> {
        let mut guard = self.lock();
        let inner = &mut *guard;
        let mut pet = inner.store.load_or_create(now)?;
        let report = advance(&mut pet, now);
        if let Some(stage) = report.grew_into {
            info!("pet '{}' grew into {}", escape_log(&pet.name), stage);
        }
        let action = apply_action(&mut pet, request, now).map_err(|e| {
            info!("rejected action '{}': {}", escape_log(&request.action), e);
            e
        })?;
        debug!("applied action {} to '{}'", action, escape_log(&pet.name));
        if let Some(event) = maybe_trigger_event(&mut pet, &mut inner.events) {
            debug!("random event: {:?}", event);
        }
        inner.store.save(&pet)?;
        Ok(pet)
    }

    /// Throw the current pet away and start over with a fresh egg.
    pub fn reset(&self, now: DateTime<Utc>) -> PetResult<PetRecord> {
        let guard = self.lock();
        guard.store.reset(now)
    }

    pub fn discovery_info(&self) -> Discovery {
        Discovery::standard()
    }
}
