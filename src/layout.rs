use crate::config::SeatingConfig;
use crate::model::{normalize_name, ClassPeriod, Desk, ModelError, TEACHER_DESK_ID};
use std::collections::HashSet;
use uuid::Uuid;

pub fn new_desk_id() -> String {
    Uuid::new_v4().to_string()
}

/// Splits pasted roster text on newlines and commas, dropping blank tokens.
pub fn parse_names(raw: &str) -> Vec<String> {
    raw.split(|c: char| c == '\n' || c == '\r' || c == ',')
        .filter_map(normalize_name)
        .collect()
}

/// Floor position of the `index`-th slot of the import grid.
pub fn grid_position(cfg: &SeatingConfig, index: usize) -> (f64, f64) {
    let columns = cfg.grid_columns.max(1) as usize;
    let col = index % columns;
    let row = index / columns;
    (
        cfg.grid_origin_x + col as f64 * cfg.column_spacing,
        cfg.grid_origin_y + row as f64 * cfg.row_spacing,
    )
}

pub fn add_student(
    period: &mut ClassPeriod,
    cfg: &SeatingConfig,
    name: &str,
) -> Result<Desk, ModelError> {
    let name = normalize_name(name).ok_or(ModelError::EmptyName)?;
    let (x, y) = grid_position(cfg, period.students.len());
    let desk = Desk::new(new_desk_id(), name, x, y);
    period.students.push(desk.clone());
    Ok(desk)
}

/// Appends one desk per parsed name, continuing the grid after the existing
/// students. Existing desks keep their positions.
pub fn bulk_import(period: &mut ClassPeriod, cfg: &SeatingConfig, raw: &str) -> Vec<Desk> {
    let start = period.students.len();
    let added: Vec<Desk> = parse_names(raw)
        .into_iter()
        .enumerate()
        .map(|(i, name)| {
            let (x, y) = grid_position(cfg, start + i);
            Desk::new(new_desk_id(), name, x, y)
        })
        .collect();
    period.students.extend(added.iter().cloned());
    added
}

pub fn move_desk(
    period: &mut ClassPeriod,
    desk_id: &str,
    x: f64,
    y: f64,
) -> Result<Desk, ModelError> {
    let desk = period
        .desk_mut(desk_id)
        .ok_or_else(|| ModelError::DeskNotFound(desk_id.to_string()))?;
    desk.x = x;
    desk.y = y;
    Ok(desk.clone())
}

pub fn rotate_desk(period: &mut ClassPeriod, desk_id: &str) -> Result<Desk, ModelError> {
    let desk = period
        .desk_mut(desk_id)
        .ok_or_else(|| ModelError::DeskNotFound(desk_id.to_string()))?;
    desk.rotation = (desk.rotation + 90) % 360;
    Ok(desk.clone())
}

pub fn remove_desk(period: &mut ClassPeriod, desk_id: &str) -> Result<Desk, ModelError> {
    if period.is_teacher_desk(desk_id) {
        return Err(ModelError::TeacherDeskLocked);
    }
    let idx = period
        .students
        .iter()
        .position(|d| d.id == desk_id)
        .ok_or_else(|| ModelError::DeskNotFound(desk_id.to_string()))?;
    Ok(period.students.remove(idx))
}

/// Gives every student desk a fresh id, e.g. after importing a layout file.
pub fn reassign_ids(period: &mut ClassPeriod) {
    for desk in period.students.iter_mut() {
        desk.id = new_desk_id();
    }
}

/// Replaces student ids that repeat within the period, or that collide with
/// the teacher desk, so every desk stays addressable. Returns the number of
/// desks that were given a new id.
pub fn repair_duplicate_ids(period: &mut ClassPeriod) -> usize {
    let mut seen: HashSet<String> = HashSet::new();
    seen.insert(TEACHER_DESK_ID.to_string());
    if let Some(t) = &period.teacher_desk {
        seen.insert(t.id.clone());
    }
    let mut repaired = 0;
    for desk in period.students.iter_mut() {
        if !seen.insert(desk.id.clone()) {
            desk.id = new_desk_id();
            seen.insert(desk.id.clone());
            repaired += 1;
        }
    }
    repaired
}

/// Transient position of a desk being dragged. Nothing is written until
/// [`DragSession::commit`] runs on pointer release.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub desk_id: String,
    pub x: f64,
    pub y: f64,
}

impl DragSession {
    pub fn begin(period: &ClassPeriod, desk_id: &str) -> Result<Self, ModelError> {
        let desk = period
            .desk(desk_id)
            .ok_or_else(|| ModelError::DeskNotFound(desk_id.to_string()))?;
        Ok(Self {
            desk_id: desk.id.clone(),
            x: desk.x,
            y: desk.y,
        })
    }

    pub fn drag_by(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
    }

    pub fn commit(&self, period: &mut ClassPeriod) -> Result<Desk, ModelError> {
        move_desk(period, &self.desk_id, self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TEACHER_DESK_ID;
    use std::collections::HashSet;

    fn period() -> ClassPeriod {
        ClassPeriod::with_teacher_desk(SeatingConfig::default().teacher_desk())
    }

    #[test]
    fn parse_collapses_delimiters_and_upper_cases() {
        assert_eq!(
            parse_names("Alice, Bob\nCarol,, Dana"),
            vec!["ALICE", "BOB", "CAROL", "DANA"]
        );
        assert_eq!(parse_names("\r\n, ,\n"), Vec::<String>::new());
        assert_eq!(parse_names("  eve  \r\nfrank"), vec!["EVE", "FRANK"]);
    }

    #[test]
    fn bulk_import_lays_out_a_grid() {
        let cfg = SeatingConfig::default();
        let mut p = period();
        let added = bulk_import(&mut p, &cfg, "a\nb\nc\nd\ne\nf\ng");
        assert_eq!(added.len(), 7);
        assert_eq!((added[0].x, added[0].y), (100.0, 200.0));
        assert_eq!((added[4].x, added[4].y), (820.0, 200.0));
        assert_eq!((added[5].x, added[5].y), (100.0, 330.0));
        assert_eq!((added[6].x, added[6].y), (280.0, 330.0));
        assert!(added.iter().all(|d| d.rotation == 0));
    }

    #[test]
    fn second_import_continues_grid_and_keeps_existing_positions() {
        let cfg = SeatingConfig::default();
        let mut p = period();
        bulk_import(&mut p, &cfg, "a,b");
        let first = p.students[0].id.clone();
        move_desk(&mut p, &first, 5.0, 6.0).expect("move");
        let added = bulk_import(&mut p, &cfg, "c");
        assert_eq!((added[0].x, added[0].y), grid_position(&cfg, 2));
        assert_eq!((p.students[0].x, p.students[0].y), (5.0, 6.0));
        assert_eq!(p.students.len(), 3);
    }

    #[test]
    fn ids_stay_unique_across_adds_and_imports() {
        let cfg = SeatingConfig::default();
        let mut p = period();
        for _ in 0..5 {
            bulk_import(&mut p, &cfg, "x,y,z,x,y,z");
            add_student(&mut p, &cfg, "solo").expect("add");
        }
        let ids: HashSet<_> = p.students.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids.len(), p.students.len());
        assert!(!ids.contains(TEACHER_DESK_ID));
    }

    #[test]
    fn add_student_rejects_blank_names() {
        let cfg = SeatingConfig::default();
        let mut p = period();
        assert_eq!(add_student(&mut p, &cfg, "  "), Err(ModelError::EmptyName));
        let desk = add_student(&mut p, &cfg, "nia").expect("add");
        assert_eq!(desk.name, "NIA");
    }

    #[test]
    fn move_touches_only_the_target_desk() {
        let cfg = SeatingConfig::default();
        let mut p = period();
        bulk_import(&mut p, &cfg, "a,b");
        let before = p.students[1].clone();
        let id = p.students[0].id.clone();
        let moved = move_desk(&mut p, &id, 1234.5, -20.0).expect("move");
        assert_eq!((moved.x, moved.y), (1234.5, -20.0));
        assert_eq!(p.students[1], before);

        let t = move_desk(&mut p, TEACHER_DESK_ID, 10.0, 20.0).expect("move teacher");
        assert_eq!((t.x, t.y), (10.0, 20.0));
        assert_eq!(
            move_desk(&mut p, "ghost", 0.0, 0.0),
            Err(ModelError::DeskNotFound("ghost".to_string()))
        );
    }

    #[test]
    fn rotation_stays_a_multiple_of_ninety() {
        let cfg = SeatingConfig::default();
        let mut p = period();
        let desk = add_student(&mut p, &cfg, "r").expect("add");
        let mut seen = Vec::new();
        for _ in 0..9 {
            let d = rotate_desk(&mut p, &desk.id).expect("rotate");
            assert_eq!(d.rotation % 90, 0);
            assert!(d.rotation < 360);
            assert_eq!((d.x, d.y), (desk.x, desk.y));
            seen.push(d.rotation);
        }
        assert_eq!(&seen[..5], &[90, 180, 270, 0, 90]);
        let t = rotate_desk(&mut p, TEACHER_DESK_ID).expect("rotate teacher");
        assert_eq!(t.rotation, 90);
    }

    #[test]
    fn remove_refuses_teacher_desk() {
        let cfg = SeatingConfig::default();
        let mut p = period();
        bulk_import(&mut p, &cfg, "a,b");
        let id = p.students[0].id.clone();
        let removed = remove_desk(&mut p, &id).expect("remove");
        assert_eq!(removed.name, "A");
        assert_eq!(p.students.len(), 1);
        assert_eq!(
            remove_desk(&mut p, TEACHER_DESK_ID),
            Err(ModelError::TeacherDeskLocked)
        );
        assert!(p.teacher_desk.is_some());
    }

    #[test]
    fn drag_commits_final_position_only() {
        let cfg = SeatingConfig::default();
        let mut p = period();
        let desk = add_student(&mut p, &cfg, "d").expect("add");
        let mut drag = DragSession::begin(&p, &desk.id).expect("begin");
        drag.drag_by(10.0, 5.0);
        drag.drag_by(-2.5, 15.0);
        assert_eq!(p.students[0].x, desk.x);

        let committed = drag.commit(&mut p).expect("commit");
        assert_eq!((committed.x, committed.y), (desk.x + 7.5, desk.y + 20.0));
        assert!(DragSession::begin(&p, "ghost").is_err());
    }

    #[test]
    fn duplicate_ids_are_repaired_keeping_the_first() {
        let mut p = period();
        p.students.push(Desk::new("1712345678901", "ANN", 0.0, 0.0));
        p.students.push(Desk::new("1712345678901", "BEN", 10.0, 0.0));
        p.students.push(Desk::new(TEACHER_DESK_ID, "CAL", 20.0, 0.0));
        p.students.push(Desk::new("7", "DEE", 30.0, 0.0));

        assert_eq!(repair_duplicate_ids(&mut p), 2);
        assert_eq!(p.students[0].id, "1712345678901");
        assert_eq!(p.students[3].id, "7");
        let ids: HashSet<&str> = p.students.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids.len(), 4);
        assert!(!ids.contains(TEACHER_DESK_ID));

        let ben = p.students[1].id.clone();
        remove_desk(&mut p, &ben).expect("remove twin");
        assert!(p.students.iter().any(|d| d.name == "ANN"));
        assert!(p.students.iter().all(|d| d.name != "BEN"));
        assert_eq!(repair_duplicate_ids(&mut p), 0);
    }

    #[test]
    fn reassign_ids_keeps_teacher_desk_id() {
        let cfg = SeatingConfig::default();
        let mut p = period();
        bulk_import(&mut p, &cfg, "a,b");
        let old: Vec<String> = p.students.iter().map(|d| d.id.clone()).collect();
        reassign_ids(&mut p);
        assert!(p.students.iter().all(|d| !old.contains(&d.id)));
        assert_eq!(p.teacher_desk.as_ref().map(|d| d.id.as_str()), Some(TEACHER_DESK_ID));
    }
}
