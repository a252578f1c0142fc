use crate::config::SeatingConfig;
use crate::model::{ClassPeriod, ModelError};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub index: usize,
    pub color: String,
    pub desk_ids: Vec<String>,
}

/// Floor position for member `member` of group `group`.
///
/// Groups sit on a grid of `groups_per_row` cells; inside a cell members fill
/// a `member_columns`-wide sub-grid. Cells are sized from `group_size` so pods
/// never overlap.
pub fn pod_position(
    cfg: &SeatingConfig,
    group_size: usize,
    group: usize,
    member: usize,
) -> (f64, f64) {
    let member_columns = cfg.member_columns.max(1) as usize;
    let groups_per_row = cfg.groups_per_row.max(1) as usize;
    let member_rows = group_size.div_ceil(member_columns);

    let cell_width = member_columns as f64 * cfg.member_spacing_x + cfg.group_gap;
    let cell_height = member_rows as f64 * cfg.member_spacing_y + cfg.group_gap;

    let cell_x = cfg.group_origin_x + (group % groups_per_row) as f64 * cell_width;
    let cell_y = cfg.group_origin_y + (group / groups_per_row) as f64 * cell_height;
    (
        cell_x + (member % member_columns) as f64 * cfg.member_spacing_x,
        cell_y + (member / member_columns) as f64 * cfg.member_spacing_y,
    )
}

/// Shuffles the students of `period` into groups of `group_size` and moves
/// each desk into its pod. The last group may be smaller. Desks keep their
/// list order; rotation is reset and the group colour alternates by parity.
pub fn partition<R: Rng + ?Sized>(
    period: &mut ClassPeriod,
    cfg: &SeatingConfig,
    group_size: i64,
    rng: &mut R,
) -> Result<Vec<Group>, ModelError> {
    if group_size <= 0 {
        return Err(ModelError::InvalidGroupSize(group_size));
    }
    let mut order: Vec<usize> = (0..period.students.len()).collect();
    order.shuffle(rng);

    // A size past the roster length is one group holding everyone.
    let size = usize::try_from(group_size)
        .unwrap_or(usize::MAX)
        .min(order.len().max(1));

    let mut groups: Vec<Group> = Vec::with_capacity(order.len().div_ceil(size));
    for (i, &student_idx) in order.iter().enumerate() {
        let group_index = i / size;
        let member_index = i % size;
        let color = cfg.group_colors[group_index % 2].clone();

        let (x, y) = pod_position(cfg, size, group_index, member_index);
        let desk = &mut period.students[student_idx];
        desk.x = x;
        desk.y = y;
        desk.rotation = 0;
        desk.group_color = Some(color.clone());

        if member_index == 0 {
            groups.push(Group {
                index: group_index,
                color,
                desk_ids: Vec::with_capacity(size),
            });
        }
        if let Some(g) = groups.last_mut() {
            g.desk_ids.push(desk.id.clone());
        }
    }

    tracing::debug!(
        students = order.len(),
        requested = group_size,
        group_size = size,
        groups = groups.len(),
        "groups generated"
    );
    Ok(groups)
}
