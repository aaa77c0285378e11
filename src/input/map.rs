use std::collections::HashMap;
use crate::rounds::{House, HouseSet};

/// Checks that a binding is something the terminal host can deliver: one
/// printable, non-whitespace, lowercase character. Space is reserved for the
/// begin/acknowledge signal.
pub fn check_binding(binding: &str) -> Result<(), &'static str> {
    let mut chars = binding.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_whitespace() => Err("is whitespace, which is reserved"),
        (Some(c), None) if c.is_control() => Err("is a control character"),
        (Some(c), None) if c.is_uppercase() => Err("must be lowercase"),
        (Some(_), None) => Ok(()),
        _ => Err("must be exactly one character"),
    }
}

/// One player's binding from house index to input identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputMap {
    bindings: Vec<String>,
    lookup: HashMap<String, House>,
}

impl InputMap {
    pub fn new(bindings: Vec<String>) -> Self {
        let lookup = bindings
            .iter()
            .enumerate()
            .map(|(index, binding)| (binding.clone(), House(index)))
            .collect();

        Self { bindings, lookup }
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn binding(&self, house: House) -> Option<&str> {
        self.bindings.get(house.index()).map(String::as_str)
    }

    pub fn house_for(&self, input: &str) -> Option<House> {
        self.lookup.get(input).copied()
    }

    /// Translates the active identifiers into houses. Identifiers that are not
    /// bound for this player are ignored.
    pub fn active_houses<'a, I>(&self, active: I) -> HouseSet
    where
        I: IntoIterator<Item = &'a str>,
    {
        active
            .into_iter()
            .filter_map(|input| self.house_for(input))
            .collect()
    }
}
