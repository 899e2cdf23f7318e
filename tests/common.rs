//! Test utilities & fixtures.
//! Builds stores and services rooted in throwaway temp directories.

use chickpet::config::Config;
use chickpet::pet::EventSource;
use chickpet::service::PetService;
use chickpet::storage::PetStore;
use chrono::{DateTime, Utc};

/// Event source that never fires, so gauge assertions stay exact.
#[allow(dead_code)]
pub struct NoEvents;

impl EventSource for NoEvents {
    fn roll(&mut self) -> f64 {
        0.0
    }
    fn pick(&mut self, _len: usize) -> usize {
        0
    }
}

/// Fixed instant used as "creation time" by the scenario tests.
#[allow(dead_code)]
pub fn t0() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2026-03-01T08:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

/// Config whose data directory lives inside `tmp`, with a fixed event seed.
#[allow(dead_code)]
pub fn temp_config(tmp: &tempfile::TempDir) -> Config {
    let mut config = Config::default();
    config.storage.data_dir = tmp.path().to_string_lossy().to_string();
    config.pet.event_seed = Some(42);
    config
}

/// A quiet service (no random events) plus a handle on its store for inspection.
#[allow(dead_code)]
pub fn quiet_service(tmp: &tempfile::TempDir) -> (PetService<NoEvents>, PetStore) {
    let config = temp_config(tmp);
    let store = PetStore::from_config(&config.storage, &config.pet.default_name);
    (PetService::new(store.clone(), NoEvents), store)
}
