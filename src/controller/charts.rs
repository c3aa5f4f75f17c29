use hashlink::LinkedHashMap;

use crate::core::Status;
use crate::view::{ChartHandle, ChartKind, ChartPoint, ChartSpec, ChartSurface, MountError, View};
use crate::visual::StatusCounts;
use crate::visual::labels::{category_color, category_short, status_color, status_label};

/// Owns the chart bound to one surface, if any.
#[derive(Debug)]
pub struct ChartSlot {
    surface: ChartSurface,
    handle: Option<ChartHandle>,
}

impl ChartSlot {
    pub fn new(surface: ChartSurface) -> Self {
        Self {
            surface,
            handle: None,
        }
    }

    pub fn is_bound(&self) -> bool {
        self.handle.is_some()
    }

    /// Disposes the current chart, then binds `spec` in its place.
    pub fn replace<V: View>(&mut self, view: &mut V, spec: ChartSpec) -> Result<(), MountError> {
        if let Some(old) = self.handle.take() {
            view.dispose_chart(old);
        }
        self.handle = Some(view.bind_chart(self.surface, spec)?);
        Ok(())
    }
}

pub fn category_chart(categories: &LinkedHashMap<String, f64>) -> ChartSpec {
    ChartSpec {
        kind: ChartKind::Bar { max: 100.0 },
        points: categories
            .iter()
            .enumerate()
            .map(|(idx, (tag, score))| ChartPoint {
                label: category_short(tag).to_string(),
                value: *score,
                color: category_color(idx),
            })
            .collect(),
    }
}

pub fn status_chart(counts: StatusCounts) -> ChartSpec {
    let entries = [
        (Status::Success, counts.success),
        (Status::Warning, counts.warning),
        (Status::Danger, counts.danger),
        (Status::Info, counts.info),
    ];
    ChartSpec {
        kind: ChartKind::Doughnut,
        points: entries
            .into_iter()
            .filter_map(|(status, n)| {
                Some(ChartPoint {
                    label: status_label(&status)?.to_string(),
                    value: n as f64,
                    color: status_color(&status)?,
                })
            })
            .collect(),
    }
}
