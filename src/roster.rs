use crate::config::SeatingConfig;
use crate::layout;
use crate::model::{normalize_name, ClassPeriod, ModelError, RosterSnapshot};
use std::fmt;

pub const ROSTER_KEY: &str = "seating.roster.v1";
pub const CURRENT_KEY: &str = "seating.current";

/// Durable key/value entries the roster is written to.
pub trait SnapshotStorage {
    fn read_entry(&self, key: &str) -> anyhow::Result<Option<String>>;
    fn write_entry(&self, key: &str, value: &str) -> anyhow::Result<()>;
}

#[derive(Debug)]
pub enum StoreError {
    Refused(ModelError),
    Storage(anyhow::Error),
}

impl From<ModelError> for StoreError {
    fn from(e: ModelError) -> Self {
        StoreError::Refused(e)
    }
}

impl From<anyhow::Error> for StoreError {
    fn from(e: anyhow::Error) -> Self {
        StoreError::Storage(e)
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Refused(e) => write!(f, "{e}"),
            StoreError::Storage(e) => write!(f, "storage write failed: {e:#}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Source of truth for every class period and its desks.
///
/// Invariants: at least one period exists, and `current` always names one of
/// them. Each successful mutation rewrites the full snapshot.
#[derive(Debug, Clone)]
pub struct RosterStore {
    snapshot: RosterSnapshot,
    current: String,
}

impl RosterStore {
    /// Restores the roster from `storage`. Missing or corrupt entries fall back
    /// to a single default period; this never fails.
    pub fn load(storage: &dyn SnapshotStorage, cfg: &SeatingConfig) -> Self {
        let mut snapshot = match storage.read_entry(ROSTER_KEY) {
            Ok(Some(text)) => match RosterSnapshot::from_json(&text) {
                Ok(s) => s,
                Err(e) => {
                    tracing::warn!(error = %e, "stored roster is corrupt; starting fresh");
                    RosterSnapshot::default()
                }
            },
            Ok(None) => RosterSnapshot::default(),
            Err(e) => {
                tracing::warn!(error = %e, "roster read failed; starting fresh");
                RosterSnapshot::default()
            }
        };

        if snapshot.periods.is_empty() {
            let name = normalize_name(&cfg.default_class_name)
                .unwrap_or_else(|| "PERIOD 1".to_string());
            snapshot
                .periods
                .insert(name, ClassPeriod::with_teacher_desk(cfg.teacher_desk()));
        }
        let mut repaired = 0;
        for period in snapshot.periods.values_mut() {
            if period.teacher_desk.is_none() {
                period.teacher_desk = Some(cfg.teacher_desk());
            }
            repaired += layout::repair_duplicate_ids(period);
        }

        let stored_current = storage.read_entry(CURRENT_KEY).ok().flatten();
        let current = match stored_current {
            Some(name) if snapshot.periods.contains_key(&name) => name,
            _ => first_key(&snapshot),
        };

        tracing::debug!(
            periods = snapshot.periods.len(),
            current = %current,
            "roster loaded"
        );
        let store = Self { snapshot, current };
        if repaired > 0 {
            tracing::warn!(repaired, "duplicate desk ids replaced");
            if let Err(e) = store.save(storage) {
                tracing::warn!(error = %e, "repaired roster not saved");
            }
        }
        store
    }

    pub fn save(&self, storage: &dyn SnapshotStorage) -> anyhow::Result<()> {
        storage.write_entry(ROSTER_KEY, &self.snapshot.to_json()?)?;
        storage.write_entry(CURRENT_KEY, &self.current)?;
        Ok(())
    }

    /// Saves `next` and adopts it only once the write went through, so a
    /// failed save leaves memory matching what was last stored.
    fn commit(
        &mut self,
        storage: &dyn SnapshotStorage,
        next: RosterStore,
    ) -> Result<(), StoreError> {
        next.save(storage).map_err(|e| {
            tracing::error!(error = %e, "roster save failed");
            StoreError::Storage(e)
        })?;
        *self = next;
        Ok(())
    }

    pub fn snapshot(&self) -> &RosterSnapshot {
        &self.snapshot
    }

    pub fn current_name(&self) -> &str {
        &self.current
    }

    pub fn current(&self) -> &ClassPeriod {
        // `current` is kept pointing at an existing period.
        &self.snapshot.periods[&self.current]
    }

    pub fn period(&self, name: &str) -> Option<&ClassPeriod> {
        self.snapshot.periods.get(name)
    }

    /// Exact key first, then the upper-cased form new periods are stored under.
    fn resolve_name(&self, name: &str) -> Result<String, ModelError> {
        if self.snapshot.periods.contains_key(name) {
            return Ok(name.to_string());
        }
        normalize_name(name)
            .filter(|n| self.snapshot.periods.contains_key(n))
            .ok_or_else(|| ModelError::ClassNotFound(name.to_string()))
    }

    pub fn create_class(
        &mut self,
        storage: &dyn SnapshotStorage,
        cfg: &SeatingConfig,
        name: &str,
    ) -> Result<String, StoreError> {
        self.insert_class(
            storage,
            name,
            ClassPeriod::with_teacher_desk(cfg.teacher_desk()),
        )
    }

    /// Adds a fully formed period and makes it current.
    pub fn insert_class(
        &mut self,
        storage: &dyn SnapshotStorage,
        name: &str,
        period: ClassPeriod,
    ) -> Result<String, StoreError> {
        let name = normalize_name(name).ok_or(ModelError::EmptyName)?;
        if self.snapshot.periods.contains_key(&name) {
            return Err(ModelError::DuplicateClass(name).into());
        }
        let mut next = self.clone();
        next.snapshot.periods.insert(name.clone(), period);
        next.current = name.clone();
        self.commit(storage, next)?;
        tracing::debug!(class = %name, "class created");
        Ok(name)
    }

    /// Removes a period. Returns the key that was removed and the name of the
    /// period that is current afterwards.
    pub fn delete_class(
        &mut self,
        storage: &dyn SnapshotStorage,
        name: &str,
    ) -> Result<(String, String), StoreError> {
        let name = self.resolve_name(name)?;
        if self.snapshot.periods.len() <= 1 {
            return Err(ModelError::LastClass.into());
        }
        let mut next = self.clone();
        next.snapshot.periods.remove(&name);
        if next.current == name {
            next.current = first_key(&next.snapshot);
        }
        self.commit(storage, next)?;
        tracing::debug!(class = %name, current = %self.current, "class deleted");
        Ok((name, self.current.clone()))
    }

    pub fn set_current(
        &mut self,
        storage: &dyn SnapshotStorage,
        name: &str,
    ) -> Result<(), StoreError> {
        let mut next = self.clone();
        next.current = self.resolve_name(name)?;
        self.commit(storage, next)
    }

    /// Applies `edit` to the current period. The edit runs on a copy, so a
    /// refusal or a failed save leaves the store untouched.
    pub fn update_current<T, F>(
        &mut self,
        storage: &dyn SnapshotStorage,
        edit: F,
    ) -> Result<T, StoreError>
    where
        F: FnOnce(&mut ClassPeriod) -> Result<T, ModelError>,
    {
        let mut next = self.clone();
        let period = next
            .snapshot
            .periods
            .get_mut(&self.current)
            .ok_or_else(|| ModelError::ClassNotFound(self.current.clone()))?;
        let out = edit(period)?;
        self.commit(storage, next)?;
        Ok(out)
    }
}

fn first_key(snapshot: &RosterSnapshot) -> String {
    snapshot.periods.keys().next().cloned().unwrap_or_default()
}
