use std::path::PathBuf;

use rand::rngs::StdRng;
use rusqlite::Connection;
use serde::Deserialize;

use crate::config::SeatingConfig;
use crate::layout::DragSession;
use crate::roster::RosterStore;
use crate::selector::Selector;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub db: Option<Connection>,
    pub config: SeatingConfig,
    pub roster: Option<RosterStore>,
    pub selector: Selector,
    pub drag: Option<DragSession>,
    pub rng: StdRng,
}

/// Borrowed view of an open workspace, split per field so handlers can use
/// the connection and mutate the store at the same time.
pub struct Session<'a> {
    pub conn: &'a Connection,
    pub store: &'a mut RosterStore,
    pub config: &'a SeatingConfig,
    pub selector: &'a mut Selector,
    pub drag: &'a mut Option<DragSession>,
    pub rng: &'a mut StdRng,
}

impl AppState {
    pub fn new(rng: StdRng) -> Self {
        Self {
            workspace: None,
            db: None,
            config: SeatingConfig::default(),
            roster: None,
            selector: Selector::new(),
            drag: None,
            rng,
        }
    }

    pub fn session(&mut self) -> Option<Session<'_>> {
        let AppState {
            db,
            config,
            roster,
            selector,
            drag,
            rng,
            ..
        } = self;
        Some(Session {
            conn: db.as_ref()?,
            store: roster.as_mut()?,
            config,
            selector,
            drag,
            rng,
        })
    }
}
