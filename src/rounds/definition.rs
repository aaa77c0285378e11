use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use crate::core::PlayerId;
use crate::input::{check_binding, InputMap};

/// Index of one board slot. Houses are numbered from zero internally and
/// shown to players starting at one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct House(pub usize);

impl House {
    pub const fn index(self) -> usize {
        self.0
    }

    pub const fn label(self) -> usize {
        self.0 + 1
    }
}

impl fmt::Display for House {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

pub type HouseSet = BTreeSet<House>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combination {
    pub houses: Vec<House>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    pub combinations: Vec<Combination>,
}

/// What happens when both players complete the combination on the same frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimultaneousMatch {
    /// Player 1 is checked first and takes the round.
    #[default]
    FavorPlayerOne,
    /// The round is resolved with no winner.
    Tie,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchDefinition {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub number_of_rounds: usize,
    pub seconds_per_round: f32,
    pub house_count: usize,
    pub rounds: Vec<Round>,
    pub player1_input_map: Vec<String>,
    pub player2_input_map: Vec<String>,
    #[serde(default)]
    pub simultaneous_match: SimultaneousMatch,
}

impl Combination {
    pub fn new<I: IntoIterator<Item = usize>>(houses: I) -> Self {
        Self {
            houses: houses.into_iter().map(House).collect(),
        }
    }

    pub fn house_set(&self) -> HouseSet {
        self.houses.iter().copied().collect()
    }

    pub fn contains(&self, house: House) -> bool {
        self.houses.contains(&house)
    }

    /// Exact match: the active set holds every house of the combination and
    /// nothing else.
    pub fn is_matched_by(&self, active: &HouseSet) -> bool {
        active.len() == self.house_set().len()
            && self.houses.iter().all(|house| active.contains(house))
    }

    pub fn describe(&self) -> String {
        let labels = self.houses
            .iter()
            .map(|house| house.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        format!("Connect houses: {}", labels)
    }

    fn validate(&self, house_count: usize, context: &str) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.houses.is_empty() {
            errors.push(format!("{}: combination has no houses", context));
        }

        let mut seen = HashSet::new();
        for house in &self.houses {
            if house.index() >= house_count {
                errors.push(format!(
                    "{}: house {} is out of range (house_count is {})",
                    context,
                    house.index(),
                    house_count
                ));
            }
            if !seen.insert(house) {
                errors.push(format!("{}: duplicate house {}", context, house.index()));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl Round {
    pub fn new(combinations: Vec<Combination>) -> Self {
        Self { combinations }
    }

    pub fn single(combination: Combination) -> Self {
        Self::new(vec![combination])
    }

    pub fn validate(&self, house_count: usize, round_index: usize) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.combinations.is_empty() {
            errors.push(format!("Round {}: combination list is empty", round_index));
        }

        for (index, combination) in self.combinations.iter().enumerate() {
            let context = format!("Round {} combination {}", round_index, index);
            if let Err(mut combination_errors) = combination.validate(house_count, &context) {
                errors.append(&mut combination_errors);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl MatchDefinition {
    pub fn new<S: Into<String>>(
        id: S,
        title: S,
        seconds_per_round: f32,
        house_count: usize,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            number_of_rounds: 0,
            seconds_per_round,
            house_count,
            rounds: Vec::new(),
            player1_input_map: Vec::new(),
            player2_input_map: Vec::new(),
            simultaneous_match: SimultaneousMatch::default(),
        }
    }

    /// Appends a round and keeps `number_of_rounds` in step with it.
    pub fn add_round(&mut self, round: Round) {
        self.rounds.push(round);
        self.number_of_rounds = self.rounds.len();
    }

    pub fn with_input_maps<S: Into<String>>(
        mut self,
        player1: impl IntoIterator<Item = S>,
        player2: impl IntoIterator<Item = S>,
    ) -> Self {
        self.player1_input_map = player1.into_iter().map(Into::into).collect();
        self.player2_input_map = player2.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_simultaneous_match(mut self, policy: SimultaneousMatch) -> Self {
        self.simultaneous_match = policy;
        self
    }

    pub fn get_round(&self, round_index: usize) -> Option<&Round> {
        self.rounds.get(round_index)
    }

    pub fn is_last_round(&self, round_index: usize) -> bool {
        round_index + 1 >= self.number_of_rounds
    }

    pub fn input_bindings(&self, player: PlayerId) -> &[String] {
        match player {
            PlayerId::One => &self.player1_input_map,
            PlayerId::Two => &self.player2_input_map,
        }
    }

    pub fn input_map(&self, player: PlayerId) -> InputMap {
        InputMap::new(self.input_bindings(player).to_vec())
    }

    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.number_of_rounds == 0 {
            errors.push("number_of_rounds must be at least 1".to_string());
        }

        if !self.seconds_per_round.is_finite() || self.seconds_per_round <= 0.0 {
            errors.push(format!(
                "seconds_per_round must be a positive number (got {})",
                self.seconds_per_round
            ));
        }

        if self.house_count == 0 {
            errors.push("house_count must be at least 1".to_string());
        }

        if self.rounds.len() != self.number_of_rounds {
            errors.push(format!(
                "rounds has {} entries but number_of_rounds is {}",
                self.rounds.len(),
                self.number_of_rounds
            ));
        }

        for (index, round) in self.rounds.iter().enumerate() {
            if let Err(mut round_errors) = round.validate(self.house_count, index) {
                errors.append(&mut round_errors);
            }
        }

        for player in PlayerId::ALL {
            let bindings = self.input_bindings(player);
            if bindings.len() != self.house_count {
                errors.push(format!(
                    "{} input map has {} entries but house_count is {}",
                    player,
                    bindings.len(),
                    self.house_count
                ));
            }

            let mut seen = HashSet::new();
            for binding in bindings {
                if let Err(problem) = check_binding(binding) {
                    errors.push(format!("{} input map binding '{}' {}", player, binding, problem));
                }
                if !seen.insert(binding) {
                    errors.push(format!("{} input map binds '{}' more than once", player, binding));
                }
            }
        }

        let player1_keys: HashSet<&String> = self.player1_input_map.iter().collect();
        for binding in &self.player2_input_map {
            if player1_keys.contains(binding) {
                errors.push(format!("Input '{}' is bound for both players", binding));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
