use serde::{Deserialize, Serialize};

use crate::app::config::PetConfig;

const STAT_MIN: f32 = 0.0;
const STAT_MAX: f32 = 100.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum Species {
    #[default]
    Cat,
    Dog,
    Fish,
}

impl Species {
    pub(crate) fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "cat" => Some(Self::Cat),
            "dog" => Some(Self::Dog),
            "fish" => Some(Self::Fish),
            _ => None,
        }
    }

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Cat => "cat",
            Self::Dog => "dog",
            Self::Fish => "fish",
        }
    }

    pub(crate) fn next(self) -> Self {
        match self {
            Self::Cat => Self::Dog,
            Self::Dog => Self::Fish,
            Self::Fish => Self::Cat,
        }
    }
}

/// Mood shown by the pet picture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Reaction {
    Fear,
    Anger,
    Love,
    Joy,
    Sadness,
}

impl Reaction {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Fear => "fear",
            Self::Anger => "anger",
            Self::Love => "love",
            Self::Joy => "joy",
            Self::Sadness => "sadness",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PetAction {
    Feed,
    Play,
    Rest,
    Clean,
    HealthCheck,
}

impl PetAction {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Feed => "feed",
            Self::Play => "play",
            Self::Rest => "rest",
            Self::Clean => "clean",
            Self::HealthCheck => "health_check",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PetCosts {
    pub(crate) feed: u32,
    pub(crate) clean: u32,
    pub(crate) health_check: u32,
}

impl PetCosts {
    pub(crate) fn from_config(config: &PetConfig) -> Self {
        Self {
            feed: config.feed_cost,
            clean: config.clean_cost,
            health_check: config.health_check_cost,
        }
    }
}

impl Default for PetCosts {
    fn default() -> Self {
        Self::from_config(&PetConfig::default())
    }
}

/// Virtual pet. Stats stay in [0, 100] and money never goes negative; every
/// action either applies fully or leaves the pet untouched.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Pet {
    pub(crate) name: String,
    pub(crate) species: Species,
    hunger: f32,
    happiness: f32,
    energy: f32,
    cleanliness: f32,
    health: f32,
    money: u32,
    expenses_total: u32,
}

impl Default for Pet {
    fn default() -> Self {
        Self::from_record(PetRecord::default())
    }
}

impl Pet {
    pub(crate) fn hunger(&self) -> f32 {
        self.hunger
    }

    pub(crate) fn happiness(&self) -> f32 {
        self.happiness
    }

    pub(crate) fn energy(&self) -> f32 {
        self.energy
    }

    pub(crate) fn cleanliness(&self) -> f32 {
        self.cleanliness
    }

    pub(crate) fn health(&self) -> f32 {
        self.health
    }

    pub(crate) fn money(&self) -> u32 {
        self.money
    }

    pub(crate) fn expenses_total(&self) -> u32 {
        self.expenses_total
    }

    pub(crate) fn apply(&mut self, action: PetAction, costs: PetCosts) -> bool {
        match action {
            PetAction::Feed => self.feed(costs.feed),
            PetAction::Play => self.play(),
            PetAction::Rest => self.rest(),
            PetAction::Clean => self.clean(costs.clean),
            PetAction::HealthCheck => self.health_check(costs.health_check),
        }
    }

    pub(crate) fn feed(&mut self, cost: u32) -> bool {
        if self.money < cost || self.hunger >= STAT_MAX {
            return false;
        }
        self.spend(cost);
        self.hunger = add_stat(self.hunger, 20.0);
        self.happiness = add_stat(self.happiness, 6.0);
        true
    }

    pub(crate) fn play(&mut self) -> bool {
        if self.energy < 12.0 || self.hunger < 8.0 {
            return false;
        }
        self.energy = add_stat(self.energy, -12.0);
        self.hunger = add_stat(self.hunger, -8.0);
        self.happiness = add_stat(self.happiness, 12.0);
        true
    }

    pub(crate) fn rest(&mut self) -> bool {
        self.energy = add_stat(self.energy, 28.0);
        self.hunger = add_stat(self.hunger, -6.0);
        self.happiness = add_stat(self.happiness, 4.0);
        true
    }

    pub(crate) fn clean(&mut self, cost: u32) -> bool {
        if self.money < cost {
            return false;
        }
        self.spend(cost);
        self.cleanliness = add_stat(self.cleanliness, 40.0);
        self.happiness = add_stat(self.happiness, 4.0);
        self.health = add_stat(self.health, 3.0);
        true
    }

    pub(crate) fn health_check(&mut self, cost: u32) -> bool {
        if self.money < cost {
            return false;
        }
        self.spend(cost);
        self.health = add_stat(self.health, 22.0);
        self.happiness = add_stat(self.happiness, 6.0);
        true
    }

    fn spend(&mut self, amount: u32) {
        self.money -= amount;
        self.expenses_total = self.expenses_total.saturating_add(amount);
    }

    /// Passive drift over `seconds` of wall time.
    pub(crate) fn pass_time(&mut self, seconds: f32) {
        if !(seconds.is_finite() && seconds > 0.0) {
            return;
        }
        self.hunger = add_stat(self.hunger, -0.6 * seconds);
        self.cleanliness = add_stat(self.cleanliness, -0.08 * seconds);
        self.energy = add_stat(self.energy, 0.5 * seconds);
        if self.hunger < 25.0 {
            self.happiness = add_stat(self.happiness, -0.4 * seconds);
        }
        if self.cleanliness < 25.0 {
            self.happiness = add_stat(self.happiness, -0.3 * seconds);
        }
        if self.hunger < 15.0 || self.cleanliness < 10.0 {
            self.health = add_stat(self.health, -0.6 * seconds);
        } else if self.happiness > 60.0 && self.cleanliness > 50.0 {
            self.health = add_stat(self.health, 0.2 * seconds);
        }
    }

    /// First matching rule wins.
    pub(crate) fn reaction(&self) -> Reaction {
        if self.health < 30.0 {
            Reaction::Fear
        } else if self.hunger < 20.0 {
            Reaction::Anger
        } else if self.happiness >= 85.0 && self.energy >= 60.0 {
            Reaction::Love
        } else if self.happiness >= 65.0 {
            Reaction::Joy
        } else if self.happiness < 35.0 {
            Reaction::Sadness
        } else {
            Reaction::Joy
        }
    }

    pub(crate) fn to_record(&self) -> PetRecord {
        PetRecord {
            name: self.name.clone(),
            species: self.species.as_str().to_string(),
            hunger: self.hunger,
            happiness: self.happiness,
            energy: self.energy,
            cleanliness: self.cleanliness,
            health: self.health,
            money: self.money,
            expenses_total: self.expenses_total,
        }
    }

    /// Builds a pet from a saved record, clamping stats back into range.
    /// Unknown species fall back to a cat.
    pub(crate) fn from_record(record: PetRecord) -> Self {
        Self {
            name: record.name,
            species: Species::parse(&record.species).unwrap_or_default(),
            hunger: clamp_stat(record.hunger),
            happiness: clamp_stat(record.happiness),
            energy: clamp_stat(record.energy),
            cleanliness: clamp_stat(record.cleanliness),
            health: clamp_stat(record.health),
            money: record.money,
            expenses_total: record.expenses_total,
        }
    }
}

/// Flat on-disk form of a pet. Missing fields take the starting values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct PetRecord {
    pub(crate) name: String,
    pub(crate) species: String,
    pub(crate) hunger: f32,
    pub(crate) happiness: f32,
    pub(crate) energy: f32,
    pub(crate) cleanliness: f32,
    pub(crate) health: f32,
    pub(crate) money: u32,
    pub(crate) expenses_total: u32,
}

impl Default for PetRecord {
    fn default() -> Self {
        Self {
            name: "Buddy".to_string(),
            species: Species::Cat.as_str().to_string(),
            hunger: 60.0,
            happiness: 70.0,
            energy: 80.0,
            cleanliness: 80.0,
            health: 100.0,
            money: 200,
            expenses_total: 0,
        }
    }
}

fn clamp_stat(value: f32) -> f32 {
    if value.is_nan() {
        return STAT_MIN;
    }
    value.clamp(STAT_MIN, STAT_MAX)
}

fn add_stat(value: f32, delta: f32) -> f32 {
    clamp_stat(value + delta)
}
