use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const TEACHER_DESK_ID: &str = "teacher";
pub const TEACHER_DESK_NAME: &str = "TEACHER";

/// One placeable, rotatable name-card on the floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Desk {
    #[serde(deserialize_with = "deserialize_desk_id")]
    pub id: String,
    pub name: String,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub rotation: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_color: Option<String>,
}

impl Desk {
    pub fn new(id: impl Into<String>, name: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            x,
            y,
            rotation: 0,
            group_color: None,
        }
    }

    pub fn teacher(x: f64, y: f64) -> Self {
        Self::new(TEACHER_DESK_ID, TEACHER_DESK_NAME, x, y)
    }
}

// Older snapshots used millisecond timestamps as numeric ids.
fn deserialize_desk_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

/// The desks of one class section. The name lives in the roster map key.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassPeriod {
    #[serde(default)]
    pub students: Vec<Desk>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher_desk: Option<Desk>,
}

/// Accepts both the canonical `{ students, teacherDesk }` object and the bare
/// desk array written by older builds.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredPeriod {
    Legacy(Vec<Desk>),
    Full(ClassPeriod),
}

impl From<StoredPeriod> for ClassPeriod {
    fn from(stored: StoredPeriod) -> Self {
        match stored {
            StoredPeriod::Legacy(students) => ClassPeriod {
                students,
                teacher_desk: None,
            },
            StoredPeriod::Full(period) => period,
        }
    }
}

impl ClassPeriod {
    pub fn with_teacher_desk(teacher_desk: Desk) -> Self {
        Self {
            students: Vec::new(),
            teacher_desk: Some(teacher_desk),
        }
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        let stored: StoredPeriod = serde_json::from_str(text)?;
        let mut period = ClassPeriod::from(stored);
        period.normalize_rotations();
        Ok(period)
    }

    pub fn is_teacher_desk(&self, desk_id: &str) -> bool {
        self.teacher_desk
            .as_ref()
            .map(|d| d.id == desk_id)
            .unwrap_or(false)
    }

    pub fn desk(&self, desk_id: &str) -> Option<&Desk> {
        if let Some(t) = self.teacher_desk.as_ref().filter(|d| d.id == desk_id) {
            return Some(t);
        }
        self.students.iter().find(|d| d.id == desk_id)
    }

    pub fn desk_mut(&mut self, desk_id: &str) -> Option<&mut Desk> {
        if let Some(t) = self.teacher_desk.as_mut().filter(|d| d.id == desk_id) {
            return Some(t);
        }
        self.students.iter_mut().find(|d| d.id == desk_id)
    }

    fn normalize_rotations(&mut self) {
        for desk in self
            .students
            .iter_mut()
            .chain(self.teacher_desk.as_mut().into_iter())
        {
            desk.rotation = (desk.rotation - desk.rotation % 90) % 360;
        }
    }
}

/// Everything the roster store persists: class period name -> desks.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct RosterSnapshot {
    pub periods: BTreeMap<String, ClassPeriod>,
}

impl<'de> Deserialize<'de> for RosterSnapshot {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = BTreeMap::<String, StoredPeriod>::deserialize(deserializer)?;
        let periods = raw
            .into_iter()
            .map(|(name, stored)| {
                let mut period = ClassPeriod::from(stored);
                period.normalize_rotations();
                (name, period)
            })
            .collect();
        Ok(RosterSnapshot { periods })
    }
}

impl RosterSnapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

/// Trims and upper-cases a display name. Blank input yields `None`.
pub fn normalize_name(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_uppercase())
    }
}

/// User-facing refusals. None of these modify the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    EmptyName,
    DuplicateClass(String),
    ClassNotFound(String),
    LastClass,
    DeskNotFound(String),
    TeacherDeskLocked,
    InvalidGroupSize(i64),
    EmptyRoster,
}

impl ModelError {
    pub fn code(&self) -> &'static str {
        match self {
            ModelError::EmptyName => "bad_params",
            ModelError::DuplicateClass(_) => "duplicate_class",
            ModelError::ClassNotFound(_) | ModelError::DeskNotFound(_) => "not_found",
            ModelError::LastClass => "last_class",
            ModelError::TeacherDeskLocked => "teacher_desk_locked",
            ModelError::InvalidGroupSize(_) => "invalid_group_size",
            ModelError::EmptyRoster => "empty_roster",
        }
    }
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::EmptyName => write!(f, "name must not be empty"),
            ModelError::DuplicateClass(name) => write!(f, "class {name} already exists"),
            ModelError::ClassNotFound(name) => write!(f, "class {name} not found"),
            ModelError::LastClass => write!(f, "you must have at least one class"),
            ModelError::DeskNotFound(id) => write!(f, "desk {id} not found"),
            ModelError::TeacherDeskLocked => write!(f, "the teacher desk cannot be deleted"),
            ModelError::InvalidGroupSize(n) => write!(f, "group size must be > 0 (got {n})"),
            ModelError::EmptyRoster => write!(f, "class has no students"),
        }
    }
}

impl std::error::Error for ModelError {}
