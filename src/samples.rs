//! Sample Library - hand-authored drafts for demos and tests.

use once_cell::sync::Lazy;

use crate::model::{CircleShape, ExportSettings, IconDraft, LineShape, PathShape};

static SAMPLES: Lazy<Vec<IconDraft>> = Lazy::new(|| {
    vec![
        draft(
            "home",
            &["M3 9l9-7 9 7v11a2 2 0 0 1-2 2H5a2 2 0 0 1-2-2z", "M9 22V12h6v10"],
        ),
        draft(
            "settings",
            &[
                "M12 15a3 3 0 1 0 0-6 3 3 0 0 0 0 6z",
                "M19.4 15a1.65 1.65 0 0 0 .33 1.82l.06.06a2 2 0 0 1 0 2.83 2 2 0 0 1-2.83 0l-.06-.06a1.65 1.65 0 0 0-1.82-.33 1.65 1.65 0 0 0-1 1.51V21a2 2 0 0 1-2 2 2 2 0 0 1-2-2v-.09A1.65 1.65 0 0 0 9 19.4a1.65 1.65 0 0 0-1.82.33l-.06.06a2 2 0 0 1-2.83 0 2 2 0 0 1 0-2.83l.06-.06a1.65 1.65 0 0 0 .33-1.82 1.65 1.65 0 0 0-1.51-1H3a2 2 0 0 1-2-2 2 2 0 0 1 2-2h.09A1.65 1.65 0 0 0 4.6 9a1.65 1.65 0 0 0-.33-1.82l-.06-.06a2 2 0 0 1 0-2.83 2 2 0 0 1 2.83 0l.06.06a1.65 1.65 0 0 0 1.82.33H9a1.65 1.65 0 0 0 1-1.51V3a2 2 0 0 1 2-2 2 2 0 0 1 2 2v.09a1.65 1.65 0 0 0 1 1.51 1.65 1.65 0 0 0 1.82-.33l.06-.06a2 2 0 0 1 2.83 0 2 2 0 0 1 0 2.83l-.06.06a1.65 1.65 0 0 0-.33 1.82V9a1.65 1.65 0 0 0 1.51 1H21a2 2 0 0 1 2 2 2 2 0 0 1-2 2h-.09a1.65 1.65 0 0 0-1.51 1z",
            ],
        ),
        {
            let mut user = draft("user", &["M20 21v-2a4 4 0 0 0-4-4H8a4 4 0 0 0-4 4v2"]);
            user.geometry.circles.push(CircleShape { cx: 12.0, cy: 7.0, r: 4.0 });
            user
        },
        {
            let mut search = draft("search", &[]);
            search.geometry.circles.push(CircleShape { cx: 11.0, cy: 11.0, r: 8.0 });
            search.geometry.lines.push(LineShape { x1: 21.0, y1: 21.0, x2: 16.65, y2: 16.65 });
            search
        },
        draft(
            "heart",
            &["M20.84 4.61a5.5 5.5 0 0 0-7.78 0L12 5.67l-1.06-1.06a5.5 5.5 0 0 0-7.78 7.78l1.06 1.06L12 21.23l7.78-7.78 1.06-1.06a5.5 5.5 0 0 0 0-7.78z"],
        ),
    ]
});

fn draft(name: &str, paths: &[&str]) -> IconDraft {
    let mut draft = IconDraft::new(name, "outline_rounded");
    draft.geometry.paths = paths.iter().map(|d| PathShape { d: d.to_string() }).collect();
    draft.exports = Some(ExportSettings::default());
    draft
}

/// home, settings, user, search, heart
pub fn sample_icons() -> &'static [IconDraft] {
    &SAMPLES
}

pub fn sample_icon(name: &str) -> Option<&'static IconDraft> {
    SAMPLES.iter().find(|icon| icon.name == name)
}

/// Index wraps around the library.
pub fn sample_icon_by_index(index: usize) -> &'static IconDraft {
    &SAMPLES[index % SAMPLES.len()]
}

pub fn sample_names() -> Vec<&'static str> {
    SAMPLES.iter().map(|icon| icon.name.as_str()).collect()
}
