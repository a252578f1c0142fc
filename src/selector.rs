use crate::model::{Desk, ModelError};
use rand::Rng;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pick {
    pub desk_id: String,
    pub name: String,
}

impl From<&Desk> for Pick {
    fn from(d: &Desk) -> Self {
        Self {
            desk_id: d.id.clone(),
            name: d.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectorState {
    Idle,
    Cycling {
        remaining: u32,
        shown: Option<Pick>,
    },
    Settled(Pick),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectorEvent {
    /// Shown while cycling.
    Candidate(Pick),
    Settled(Pick),
}

/// The "call on someone" picker: `Idle -> Cycling -> Settled`.
///
/// `start` copies the roster, so edits made while cycling do not affect the
/// result. Each tick samples uniformly; the last tick's sample is the pick.
#[derive(Debug, Clone)]
pub struct Selector {
    state: SelectorState,
    pool: Vec<Pick>,
}

impl Default for Selector {
    fn default() -> Self {
        Self::new()
    }
}

impl Selector {
    pub fn new() -> Self {
        Self {
            state: SelectorState::Idle,
            pool: Vec::new(),
        }
    }

    pub fn state(&self) -> &SelectorState {
        &self.state
    }

    pub fn start(&mut self, roster: &[Desk], ticks: u32) -> Result<(), ModelError> {
        if roster.is_empty() {
            return Err(ModelError::EmptyRoster);
        }
        self.cancel();
        self.pool = roster.iter().map(Pick::from).collect();
        self.state = SelectorState::Cycling {
            remaining: ticks.max(1),
            shown: None,
        };
        Ok(())
    }

    pub fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<SelectorEvent> {
        let SelectorState::Cycling { remaining, .. } = self.state else {
            return None;
        };
        let sample = self.pool[rng.random_range(0..self.pool.len())].clone();
        if remaining <= 1 {
            self.pool.clear();
            self.state = SelectorState::Settled(sample.clone());
            Some(SelectorEvent::Settled(sample))
        } else {
            self.state = SelectorState::Cycling {
                remaining: remaining - 1,
                shown: Some(sample.clone()),
            };
            Some(SelectorEvent::Candidate(sample))
        }
    }

    /// Stops an in-flight cycle without settling.
    pub fn cancel(&mut self) {
        if matches!(self.state, SelectorState::Cycling { .. }) {
            self.pool.clear();
            self.state = SelectorState::Idle;
        }
    }

    pub fn dismiss(&mut self) {
        self.pool.clear();
        self.state = SelectorState::Idle;
    }

    /// Runs a whole cycle. Returns every candidate shown, ending with the pick.
    pub fn pick<R: Rng + ?Sized>(
        &mut self,
        roster: &[Desk],
        ticks: u32,
        rng: &mut R,
    ) -> Result<Vec<Pick>, ModelError> {
        self.start(roster, ticks)?;
        let mut shown = Vec::new();
        while let Some(event) = self.tick(rng) {
            match event {
                SelectorEvent::Candidate(p) => shown.push(p),
                SelectorEvent::Settled(p) => {
                    shown.push(p);
                    break;
                }
            }
        }
        Ok(shown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn roster(names: &[&str]) -> Vec<Desk> {
        names
            .iter()
            .enumerate()
            .map(|(i, n)| Desk::new(format!("id{i}"), *n, 0.0, 0.0))
            .collect()
    }

    #[test]
    fn walks_idle_cycling_settled() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut sel = Selector::new();
        assert_eq!(sel.state(), &SelectorState::Idle);

        sel.start(&roster(&["A", "B"]), 3).expect("start");
        assert!(matches!(
            sel.state(),
            SelectorState::Cycling { remaining: 3, shown: None }
        ));
        assert!(matches!(sel.tick(&mut rng), Some(SelectorEvent::Candidate(_))));
        assert!(matches!(sel.tick(&mut rng), Some(SelectorEvent::Candidate(_))));
        let Some(SelectorEvent::Settled(pick)) = sel.tick(&mut rng) else {
            panic!("expected settle on third tick");
        };
        assert_eq!(sel.state(), &SelectorState::Settled(pick));
        assert_eq!(sel.tick(&mut rng), None);

        sel.dismiss();
        assert_eq!(sel.state(), &SelectorState::Idle);
    }

    #[test]
    fn empty_roster_is_refused() {
        let mut sel = Selector::new();
        assert_eq!(sel.start(&[], 5), Err(ModelError::EmptyRoster));
        assert_eq!(sel.state(), &SelectorState::Idle);
    }

    #[test]
    fn cancel_stops_cycle() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut sel = Selector::new();
        sel.start(&roster(&["A"]), 10).expect("start");
        sel.tick(&mut rng);
        sel.cancel();
        assert_eq!(sel.state(), &SelectorState::Idle);
        assert_eq!(sel.tick(&mut rng), None);
    }

    #[test]
    fn pick_reports_every_tick_and_settles_on_last() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut sel = Selector::new();
        let r = roster(&["A", "B", "C"]);
        let shown = sel.pick(&r, 24, &mut rng).expect("pick");
        assert_eq!(shown.len(), 24);
        let last = shown.last().cloned().expect("last");
        assert_eq!(sel.state(), &SelectorState::Settled(last.clone()));
        assert!(r.iter().any(|d| d.id == last.desk_id));
    }

    #[test]
    fn settled_pick_is_uniform() {
        let mut rng = StdRng::seed_from_u64(12345);
        let mut sel = Selector::new();
        let r = roster(&["A", "B", "C", "D", "E"]);
        let trials = 10_000;
        let mut counts = [0usize; 5];
        for _ in 0..trials {
            let shown = sel.pick(&r, 2, &mut rng).expect("pick");
            let last = shown.last().expect("last");
            let idx: usize = last.desk_id[2..].parse().expect("index");
            counts[idx] += 1;
        }
        for c in counts {
            let freq = c as f64 / trials as f64;
            assert!((freq - 0.2).abs() < 0.03, "skewed frequency {freq}");
        }
    }
}
