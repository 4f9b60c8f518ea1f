use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::LaptraceError;

/// Identifies one lap of one driver, written as `driver:lap` (e.g. `44:5`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LapKey {
    pub driver_number: String,
    pub lap_number: u32,
}

impl LapKey {
    pub fn new(driver_number: impl Into<String>, lap_number: u32) -> Self {
        Self {
            driver_number: driver_number.into(),
            lap_number,
        }
    }
}

impl fmt::Display for LapKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.driver_number, self.lap_number)
    }
}

impl FromStr for LapKey {
    type Err = LaptraceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || LaptraceError::InvalidLapKey {
            value: s.to_string(),
        };
        let (driver_number, lap_number) = s.split_once(':').ok_or_else(invalid)?;
        let driver_number = driver_number.trim();
        if driver_number.is_empty() {
            return Err(invalid());
        }
        let lap_number = lap_number.trim().parse::<u32>().map_err(|_| invalid())?;
        Ok(Self::new(driver_number, lap_number))
    }
}

/// Laps whose telemetry is displayed, in the order they were selected.
/// Selection order decides which color variant each lap gets.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SelectedLaps {
    keys: Vec<LapKey>,
}

impl SelectedLaps {
    pub fn contains(&self, key: &LapKey) -> bool {
        self.keys.contains(key)
    }

    /// Returns false if the key was already selected
    pub fn insert(&mut self, key: LapKey) -> bool {
        if self.contains(&key) {
            return false;
        }
        self.keys.push(key);
        true
    }

    /// Returns false if the key was not selected
    pub fn remove(&mut self, key: &LapKey) -> bool {
        let before = self.keys.len();
        self.keys.retain(|k| k != key);
        before != self.keys.len()
    }

    pub fn remove_driver(&mut self, driver_number: &str) -> Vec<LapKey> {
        let (removed, kept) = self
            .keys
            .drain(..)
            .partition(|k| k.driver_number == driver_number);
        self.keys = kept;
        removed
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LapKey> {
        self.keys.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lap_key_display_and_parse() {
        let key = LapKey::new("44", 5);
        assert_eq!(key.to_string(), "44:5");
        assert_eq!("44:5".parse::<LapKey>().unwrap(), key);
        assert_eq!(" 44 : 5 ".parse::<LapKey>().unwrap(), key);
        assert!("44".parse::<LapKey>().is_err());
        assert!(":5".parse::<LapKey>().is_err());
        assert!("44:five".parse::<LapKey>().is_err());
    }

    #[test]
    fn test_selected_laps_keep_insertion_order() {
        let mut laps = SelectedLaps::default();
        assert!(laps.insert(LapKey::new("44", 9)));
        assert!(laps.insert(LapKey::new("1", 3)));
        assert!(laps.insert(LapKey::new("44", 2)));
        assert!(!laps.insert(LapKey::new("1", 3)));

        let order: Vec<String> = laps.iter().map(|k| k.to_string()).collect();
        assert_eq!(order, vec!["44:9", "1:3", "44:2"]);

        let removed = laps.remove_driver("44");
        assert_eq!(removed.len(), 2);
        assert_eq!(laps.len(), 1);
        assert!(laps.remove(&LapKey::new("1", 3)));
        assert!(!laps.remove(&LapKey::new("1", 3)));
        assert!(laps.is_empty());
    }
}
