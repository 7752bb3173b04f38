//! Presentation assignment
//!
//! Amenity and route text are not persisted. Every load asks a
//! [`PresentationAssigner`] for them; production uses a random pick from fixed
//! option sets, tests use [`FixedAssigner`].

use std::collections::HashMap;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Amenity descriptions a train may be given
pub const AMENITY_OPTIONS: [&str; 3] = [
    "High-Speed Wi-Fi | Bistro Car | AC | Power Outlets",
    "Panoramic Windows | First Class Lounge | Snack Bar",
    "Economy Class | Bike Racks | Pet Friendly | Vending Machine",
];

/// Cities used to build `A -> B` routes
pub const ROUTE_CITIES: [&str; 8] = [
    "Bucuresti N",
    "Cluj-Napoca",
    "Iasi",
    "Timisoara",
    "Constanta",
    "Brasov",
    "Craiova",
    "Suceava",
];

/// Non-persisted display fields of a train
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presentation {
    pub amenities: String,
    pub route: String,
}

/// Supplies presentation fields for each loaded train
pub trait PresentationAssigner: Send + Sync {
    fn assign(&self, train_id: &str) -> Presentation;
}

/// Random choice from [`AMENITY_OPTIONS`] and two distinct [`ROUTE_CITIES`]
pub struct RandomAssigner {
    rng: Mutex<StdRng>,
}

impl RandomAssigner {
    /// Seeded from OS entropy
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Reproducible sequence for a given seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for RandomAssigner {
    fn default() -> Self {
        Self::new()
    }
}

impl PresentationAssigner for RandomAssigner {
    fn assign(&self, _train_id: &str) -> Presentation {
        let mut rng = self.rng.lock();
        let amenities = AMENITY_OPTIONS[rng.gen_range(0..AMENITY_OPTIONS.len())];

        let from = rng.gen_range(0..ROUTE_CITIES.len());
        // Pick from the remaining cities so origin and destination differ
        let mut to = rng.gen_range(0..ROUTE_CITIES.len() - 1);
        if to >= from {
            to += 1;
        }

        Presentation {
            amenities: amenities.to_string(),
            route: format!("{} -> {}", ROUTE_CITIES[from], ROUTE_CITIES[to]),
        }
    }
}

/// Deterministic assignment: one default plus optional per-train overrides
#[derive(Debug, Clone)]
pub struct FixedAssigner {
    default: Presentation,
    overrides: HashMap<String, Presentation>,
}

impl FixedAssigner {
    pub fn new(amenities: impl Into<String>, route: impl Into<String>) -> Self {
        Self {
            default: Presentation {
                amenities: amenities.into(),
                route: route.into(),
            },
            overrides: HashMap::new(),
        }
    }

    /// Give one train its own presentation
    pub fn with_train(
        mut self,
        train_id: impl Into<String>,
        amenities: impl Into<String>,
        route: impl Into<String>,
    ) -> Self {
        self.overrides.insert(
            train_id.into(),
            Presentation {
                amenities: amenities.into(),
                route: route.into(),
            },
        );
        self
    }
}

impl Default for FixedAssigner {
    fn default() -> Self {
        Self::new(AMENITY_OPTIONS[2], format!("{} -> {}", ROUTE_CITIES[0], ROUTE_CITIES[1]))
    }
}

impl PresentationAssigner for FixedAssigner {
    fn assign(&self, train_id: &str) -> Presentation {
        self.overrides
            .get(train_id)
            .cloned()
            .unwrap_or_else(|| self.default.clone())
    }
}
