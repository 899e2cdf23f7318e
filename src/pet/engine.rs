//! Time-based state machine for the pet.
//!
//! Three steps, always run in this order by the service layer:
//! 1. [`advance`] - lazy aging and decay from wall-clock time, then at most one stage transition
//! 2. [`apply_action`] - optional user command, validated before anything is touched
//! 3. [`maybe_trigger_event`] - a 30% chance of a random event from [`EVENT_CATALOG`]
//!
//! Nothing here performs I/O. Randomness comes in through [`EventSource`] so tests can script it.

use chrono::{DateTime, Utc};
use rand::Rng;

use super::errors::{PetError, PetResult};
use super::types::{clamp_gauge, Action, ActionRequest, PetRecord, Stage, MAX_NAME_CHARS};

/// Hunger gained per elapsed hour.
pub const HUNGER_PER_HOUR: f64 = 10.0;
/// Energy lost per elapsed hour.
pub const ENERGY_PER_HOUR: f64 = 5.0;
/// Mess gained per elapsed hour.
pub const MESS_PER_HOUR: f64 = 8.0;
/// Health lost per elapsed hour while hunger or mess is above [`SICK_THRESHOLD`].
pub const HEALTH_DECAY_PER_HOUR: f64 = 15.0;
pub const SICK_THRESHOLD: f64 = 80.0;

/// Hours without interaction before the neglect penalty applies.
pub const NEGLECT_HOURS: f64 = 12.0;
pub const NEGLECT_HAPPINESS_PENALTY: f64 = 20.0;
pub const NEGLECT_HEALTH_PENALTY: f64 = 30.0;
/// Hours without interaction after which a sickly pet runs away.
pub const RUNAWAY_HOURS: f64 = 24.0;
pub const RUNAWAY_HEALTH_BELOW: f64 = 20.0;

/// Age (hours) at which the egg hatches, roughly five minutes.
pub const HATCH_AGE: f64 = 0.083;
pub const TEEN_AGE: f64 = 24.0;
pub const ADULT_AGE: f64 = 48.0;

/// Age added by one shake of the egg.
pub const SHAKE_AGE_BONUS: f64 = 0.05;

/// Roll above which a random event fires.
pub const EVENT_THRESHOLD: f64 = 0.7;

/// What a single [`advance`] call did, for logging and tests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdvanceReport {
    pub elapsed_hours: f64,
    pub neglected: bool,
    pub ran_away: bool,
    pub grew_into: Option<Stage>,
}

/// Fractional hours from `from` to `to`, never negative.
pub fn hours_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    let delta = to.signed_duration_since(from);
    let hours = match delta.num_microseconds() {
        Some(us) => us as f64 / 3_600_000_000.0,
        // Spans past ~292k years overflow microseconds
        None => delta.num_milliseconds() as f64 / 3_600_000.0,
    };
    hours.max(0.0)
}

/// Recompute the pet from the time elapsed since `last_updated`.
///
/// Calling this with `now == last_updated` leaves every decay-derived field unchanged.
/// The neglect penalty is not scaled by time: every call made while more than
/// [`NEGLECT_HOURS`] have passed since the last interaction applies it again.
pub fn advance(pet: &mut PetRecord, now: DateTime<Utc>) -> AdvanceReport {
    let elapsed = hours_between(pet.last_updated, now);
    let since_interaction = hours_between(pet.last_interaction, now);
    let mut report = AdvanceReport {
        elapsed_hours: elapsed,
        ..AdvanceReport::default()
    };

    pet.age += elapsed;
    if now > pet.last_updated {
        pet.last_updated = now;
    }

    if pet.stage != Stage::Egg && !pet.runaway {
        pet.hunger = clamp_gauge(pet.hunger + elapsed * HUNGER_PER_HOUR);
        pet.energy = clamp_gauge(pet.energy - elapsed * ENERGY_PER_HOUR);
        pet.mess = clamp_gauge(pet.mess + elapsed * MESS_PER_HOUR);
        if pet.hunger > SICK_THRESHOLD || pet.mess > SICK_THRESHOLD {
            pet.health = clamp_gauge(pet.health - elapsed * HEALTH_DECAY_PER_HOUR);
        }

        if since_interaction > NEGLECT_HOURS {
            pet.happiness = clamp_gauge(pet.happiness - NEGLECT_HAPPINESS_PENALTY);
            pet.health = clamp_gauge(pet.health - NEGLECT_HEALTH_PENALTY);
            pet.last_event = format!("{} feels lonely after being left alone for so long...", pet.name);
            report.neglected = true;
        }

        if since_interaction > RUNAWAY_HOURS && pet.health < RUNAWAY_HEALTH_BELOW {
            pet.runaway = true;
            pet.last_event = format!(
                "{} was ignored for too long and flew away... Game over!",
                pet.name
            );
            report.ran_away = true;
        }
    }

    if !pet.runaway {
        report.grew_into = grow(pet);
    }
    report
}

// First matching transition only; a pet never skips a stage in one call.
fn grow(pet: &mut PetRecord) -> Option<Stage> {
    match pet.stage {
        Stage::Egg if pet.age >= HATCH_AGE => {
            pet.stage = Stage::Baby;
            pet.hunger = 50.0;
            pet.happiness = 50.0;
            pet.energy = 80.0;
            pet.last_event = format!("{} hatched out of the egg! Cheep cheep!", pet.name);
        }
        Stage::Baby if pet.age >= TEEN_AGE => {
            pet.stage = Stage::Teen;
            pet.last_event = format!("{} has grown into a teenager!", pet.name);
        }
        Stage::Teen if pet.age >= ADULT_AGE => {
            pet.stage = Stage::Adult;
            pet.last_event = format!("{} is now a grown-up chicken!", pet.name);
        }
        _ => return None,
    }
    Some(pet.stage)
}

/// Validate `request` against the pet and apply it.
///
/// On `Err` the record has not been modified.
pub fn apply_action(pet: &mut PetRecord, request: &ActionRequest, now: DateTime<Utc>) -> PetResult<Action> {
    if pet.runaway {
        return Err(PetError::GameOver {
            name: pet.name.clone(),
        });
    }
    let parsed = request.action.parse::<Action>();
    if pet.stage == Stage::Egg && !matches!(parsed, Ok(a) if a.allowed_on_egg()) {
        return Err(PetError::NotHatched);
    }
    let action = parsed?;
    let new_name = match action {
        Action::SetName => Some(validate_name(request.name.as_deref())?),
        _ => None,
    };

    let value = request.value_or_default();
    match action {
        Action::SetName => {
            if let Some(name) = new_name {
                pet.last_event = format!("You named your chick {}! Cheep!", name);
                pet.name = name;
            }
        }
        Action::Shake => {
            // Only eggs can be shaken; on a hatched pet this does nothing
            if pet.stage == Stage::Egg {
                pet.age += SHAKE_AGE_BONUS;
                pet.last_event = "You shook the egg, and it seemed to wiggle!".to_string();
            }
        }
        Action::Feed => {
            pet.hunger = clamp_gauge(pet.hunger - value);
            pet.happiness = clamp_gauge(pet.happiness + 10.0);
            pet.last_event = format!("{} ate happily, cheep!", pet.name);
        }
        Action::Play => {
            pet.happiness = clamp_gauge(pet.happiness + value);
            pet.energy = clamp_gauge(pet.energy - 15.0);
            pet.last_event = format!("{} had fun playing and hopping around!", pet.name);
        }
        Action::Rest => {
            pet.energy = clamp_gauge(pet.energy + value);
            pet.happiness = clamp_gauge(pet.happiness - 5.0);
            pet.last_event = format!("{} took a rest with eyes closed.", pet.name);
        }
        Action::Clean => {
            pet.mess = clamp_gauge(pet.mess - value);
            pet.health = clamp_gauge(pet.health + 10.0);
            pet.last_event = format!("You cleaned {}'s nest, it looks comfortable!", pet.name);
        }
        Action::Heal => {
            pet.health = clamp_gauge(pet.health + value);
            pet.happiness = clamp_gauge(pet.happiness + 5.0);
            pet.last_event = format!("{} feels healthy again and is full of energy!", pet.name);
        }
    }

    if action.counts_as_interaction() {
        pet.last_interaction = now;
    }
    Ok(action)
}

/// Check a requested pet name: 1 to [`MAX_NAME_CHARS`] characters.
pub fn validate_name(name: Option<&str>) -> PetResult<String> {
    match name {
        Some(n) if !n.is_empty() && n.chars().count() <= MAX_NAME_CHARS => Ok(n.to_string()),
        _ => Err(PetError::InvalidName {
            max: MAX_NAME_CHARS,
        }),
    }
}

/// Source of randomness for [`maybe_trigger_event`].
///
/// Every [`rand::Rng`] is an event source; tests can implement this directly to script outcomes.
pub trait EventSource {
    /// Uniform sample in `[0, 1)`.
    fn roll(&mut self) -> f64;
    /// Uniform index in `0..len`; `len` is never zero.
    fn pick(&mut self, len: usize) -> usize;
}

impl<R: Rng + ?Sized> EventSource for R {
    fn roll(&mut self) -> f64 {
        self.gen::<f64>()
    }

    fn pick(&mut self, len: usize) -> usize {
        self.gen_range(0..len)
    }
}

/// Random happenings that can befall a hatched pet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PetEvent {
    Illness,
    Mischief,
    Affection,
}

pub const EVENT_CATALOG: [PetEvent; 3] = [PetEvent::Illness, PetEvent::Mischief, PetEvent::Affection];

/// Gauge deltas applied by an event.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GaugeDelta {
    pub hunger: f64,
    pub happiness: f64,
    pub energy: f64,
    pub health: f64,
    pub mess: f64,
}

impl PetEvent {
    pub fn delta(self) -> GaugeDelta {
        match self {
            PetEvent::Illness => GaugeDelta {
                health: -20.0,
                happiness: -10.0,
                ..GaugeDelta::default()
            },
            PetEvent::Mischief => GaugeDelta {
                mess: 20.0,
                happiness: 10.0,
                ..GaugeDelta::default()
            },
            PetEvent::Affection => GaugeDelta {
                happiness: 15.0,
                ..GaugeDelta::default()
            },
        }
    }

    pub fn message(self, name: &str) -> String {
        match self {
            PetEvent::Illness => format!("{} caught a cold, poor thing! Heal it quickly!", name),
            PetEvent::Mischief => format!(
                "{} stomped around the nest and scattered feathers everywhere!",
                name
            ),
            PetEvent::Affection => format!("{} is chirping at you and wants to play!", name),
        }
    }
}

/// Roll for a random event and apply it. Eggs and runaways are left alone.
pub fn maybe_trigger_event<S: EventSource + ?Sized>(pet: &mut PetRecord, source: &mut S) -> Option<PetEvent> {
    if pet.stage == Stage::Egg || pet.runaway {
        return None;
    }
    if source.roll() <= EVENT_THRESHOLD {
        return None;
    }
    let event = EVENT_CATALOG[source.pick(EVENT_CATALOG.len()).min(EVENT_CATALOG.len() - 1)];
    let d = event.delta();
    pet.hunger = clamp_gauge(pet.hunger + d.hunger);
    pet.happiness = clamp_gauge(pet.happiness + d.happiness);
    pet.energy = clamp_gauge(pet.energy + d.energy);
    pet.health = clamp_gauge(pet.health + d.health);
    pet.mess = clamp_gauge(pet.mess + d.mess);
    pet.last_event = event.message(&pet.name);
    Some(event)
}
