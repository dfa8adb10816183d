use crate::random::RandomSource;
use crate::types::{Availability, Language, Specialty};
use serde::{Deserialize, Serialize};

/// Bed icons shown per ward card.
pub const MAX_BED_ICONS: usize = 10;

// ---------------------------------------------------------------------------
// WardOccupancy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WardOccupancy {
    pub id: Specialty,
    pub name: String,
    pub name_ta: String,
    pub total: u32,
    pub occupied: u32,
    pub reserved: u32,
    pub available: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BedState {
    Occupied,
    Reserved,
    Available,
}

impl WardOccupancy {
    fn new(id: Specialty, name: &str, name_ta: &str, total: u32, occupied: u32, reserved: u32) -> Self {
        Self {
            id,
            name: name.to_string(),
            name_ta: name_ta.to_string(),
            total,
            occupied,
            reserved,
            available: total.saturating_sub(occupied + reserved),
        }
    }

    pub fn availability(&self) -> Availability {
        Availability::from_free_beds(self.available)
    }

    pub fn display_name(&self, lang: Language) -> &str {
        match lang {
            Language::En => &self.name,
            Language::Ta => &self.name_ta,
        }
    }

    /// Icon strip for the ward card: occupied beds first, then reserved,
    /// then free, capped at [`MAX_BED_ICONS`].
    pub fn bed_icons(&self) -> Vec<BedState> {
        let shown = (self.total as usize).min(MAX_BED_ICONS);
        let occupied = self.occupied as usize;
        let reserved = self.reserved as usize;
        (0..shown)
            .map(|i| {
                if i < occupied {
                    BedState::Occupied
                } else if i < occupied + reserved {
                    BedState::Reserved
                } else {
                    BedState::Available
                }
            })
            .collect()
    }
}

pub fn seed_wards() -> Vec<WardOccupancy> {
    vec![
        WardOccupancy::new(Specialty::Trauma, "Trauma ICU", "காயம் ICU", 20, 14, 2),
        WardOccupancy::new(Specialty::Pediatric, "Pediatric ICU", "குழந்தை ICU", 15, 10, 1),
        WardOccupancy::new(Specialty::Cardiac, "Cardiac ICU", "இதய ICU", 18, 16, 0),
        WardOccupancy::new(Specialty::General, "General Ward", "பொது வார்டு", 50, 35, 5),
    ]
}

// ---------------------------------------------------------------------------
// WardTotals
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WardTotals {
    pub total: u32,
    pub occupied: u32,
    pub reserved: u32,
    pub available: u32,
}

// ---------------------------------------------------------------------------
// BedChange
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BedChange {
    Admitted(Specialty),
    Discharged(Specialty),
}

// ---------------------------------------------------------------------------
// WardBoard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WardBoard {
    wards: Vec<WardOccupancy>,
}

impl Default for WardBoard {
    fn default() -> Self {
        Self::new(seed_wards())
    }
}

impl WardBoard {
    pub fn new(wards: Vec<WardOccupancy>) -> Self {
        Self { wards }
    }

    pub fn wards(&self) -> &[WardOccupancy] {
        &self.wards
    }

    pub fn get(&self, id: Specialty) -> Option<&WardOccupancy> {
        self.wards.iter().find(|w| w.id == id)
    }

    pub fn totals(&self) -> WardTotals {
        self.wards.iter().fold(WardTotals::default(), |acc, w| WardTotals {
            total: acc.total + w.total,
            occupied: acc.occupied + w.occupied,
            reserved: acc.reserved + w.reserved,
            available: acc.available + w.available,
        })
    }

    /// One admit-or-discharge step on a random ward.
    ///
    /// Draws the ward, then a coin: above one half admits when a bed is free,
    /// otherwise a patient is discharged if anyone is there. Returns `None`
    /// when the chosen ward can do neither.
    pub fn random_walk(&mut self, rng: &mut dyn RandomSource) -> Option<BedChange> {
        if self.wards.is_empty() {
            return None;
        }
        let i = rng.index(self.wards.len());
        let admit = rng.next_f64() > 0.5;
        let ward = &mut self.wards[i];
        if admit && ward.available > 0 {
            ward.available -= 1;
            ward.occupied += 1;
            Some(BedChange::Admitted(ward.id))
        } else if ward.occupied > 0 {
            ward.available += 1;
            ward.occupied -= 1;
            Some(BedChange::Discharged(ward.id))
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{ScriptedRandom, SeededRandom};

    #[test]
    fn seed_totals() {
        let board = WardBoard::default();
        assert_eq!(
            board.totals(),
            WardTotals {
                total: 103,
                occupied: 75,
                reserved: 8,
                available: 20
            }
        );
    }

    #[test]
    fn bed_icons_cap_at_ten() {
        let board = WardBoard::default();
        let cardiac = board.get(Specialty::Cardiac).unwrap();
        let icons = cardiac.bed_icons();
        assert_eq!(icons.len(), 10);
        assert!(icons.iter().all(|b| *b == BedState::Occupied));

        let small = WardOccupancy::new(Specialty::Trauma, "Step-down", "", 4, 1, 2);
        assert_eq!(
            small.bed_icons(),
            vec![
                BedState::Occupied,
                BedState::Reserved,
                BedState::Reserved,
                BedState::Available
            ]
        );
    }

    #[test]
    fn walk_admits_on_high_coin() {
        let mut board = WardBoard::default();
        // first ward, coin 0.9
        let mut rng = ScriptedRandom::new(vec![0.0, 0.9]);
        assert_eq!(
            board.random_walk(&mut rng),
            Some(BedChange::Admitted(Specialty::Trauma))
        );
        let trauma = board.get(Specialty::Trauma).unwrap();
        assert_eq!((trauma.occupied, trauma.available), (15, 3));
    }

    #[test]
    fn walk_discharges_on_low_coin() {
        let mut board = WardBoard::default();
        // last ward, coin 0.1
        let mut rng = ScriptedRandom::new(vec![0.99, 0.1]);
        assert_eq!(
            board.random_walk(&mut rng),
            Some(BedChange::Discharged(Specialty::General))
        );
        let general = board.get(Specialty::General).unwrap();
        assert_eq!((general.occupied, general.available), (34, 11));
    }

    #[test]
    fn full_ward_discharges_even_on_high_coin() {
        let mut board = WardBoard::new(vec![WardOccupancy::new(
            Specialty::Cardiac,
            "Cardiac ICU",
            "",
            2,
            2,
            0,
        )]);
        let mut rng = ScriptedRandom::new(vec![0.0, 0.9]);
        assert_eq!(
            board.random_walk(&mut rng),
            Some(BedChange::Discharged(Specialty::Cardiac))
        );
    }

    #[test]
    fn walk_preserves_bed_count() {
        let mut board = WardBoard::default();
        let before = board.totals();
        let mut rng = SeededRandom::new(Some(21));
        for _ in 0..1000 {
            board.random_walk(&mut rng);
        }
        let after = board.totals();
        assert_eq!(after.total, before.total);
        assert_eq!(after.reserved, before.reserved);
        assert_eq!(after.occupied + after.available, before.occupied + before.available);
        for w in board.wards() {
            assert!(w.occupied + w.reserved + w.available <= w.total);
        }
    }
}
