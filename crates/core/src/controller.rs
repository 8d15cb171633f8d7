use tracing::{debug, info};
use trail_chart_protocol::{Point, RenderCommand, Viewport};

use crate::config::ChartConfig;
use crate::feed::{ChangeFeed, FeedError};
use crate::model::ChangeBatch;
use crate::store::{BatchReport, MirrorStore};
use crate::views::{ChartState, MarkerKey};

/// Owns the mirror store and the chart, and is the only thing that mutates
/// either.
///
/// Every applied batch is followed by exactly one chart update over the full
/// store contents.
#[derive(Debug, Clone)]
pub struct ChartController {
    config: ChartConfig,
    store: MirrorStore,
    chart: ChartState,
}

impl ChartController {
    pub fn new(config: ChartConfig) -> Self {
        let chart = ChartState::new(&config);
        Self {
            config,
            store: MirrorStore::new(),
            chart,
        }
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    pub fn store(&self) -> &MirrorStore {
        &self.store
    }

    pub fn chart(&self) -> &ChartState {
        &self.chart
    }

    pub fn viewport(&self) -> Viewport {
        self.chart.viewport()
    }

    /// Apply one snapshot transition and redraw.
    pub fn apply_batch(&mut self, batch: ChangeBatch) -> BatchReport {
        let report = self.store.apply_batch(batch);
        self.chart.update(self.store.records());
        report
    }

    /// Drain `feed`, calling `on_batch` after each batch has been applied and
    /// rendered. Stops at the first feed error. Returns the number of batches
    /// applied.
    pub fn run<F, S>(&mut self, feed: &mut F, mut on_batch: S) -> Result<usize, FeedError>
    where
        F: ChangeFeed + ?Sized,
        S: FnMut(&ChartController, &BatchReport),
    {
        let mut applied = 0;
        while let Some(batch) = feed.next_batch() {
            let report = self.apply_batch(batch?);
            applied += 1;
            on_batch(self, &report);
        }
        info!(batches = applied, records = self.store.len(), "change feed drained");
        Ok(applied)
    }

    /// Switch the plotted activity and redraw the current snapshot.
    pub fn select_activity(&mut self, activity: impl Into<String>) {
        let activity = activity.into();
        debug!(%activity, "selecting activity");
        self.config.activity = activity.clone();
        self.chart.set_activity(activity);
        self.chart.update(self.store.records());
    }

    /// Track the pointer at a surface position: hovering a marker starts its
    /// highlight, leaving it ends it. Returns whether the hover target
    /// changed.
    pub fn pointer_moved(&mut self, surface: Point, now_ms: f64) -> bool {
        let target = self
            .chart
            .marker_at(surface, now_ms)
            .map(|m| m.key().clone());
        let current = self.chart.hovered().map(|m| m.key().clone());
        if target == current {
            return false;
        }
        match target {
            Some(key) => {
                self.chart.hover_start(&key, now_ms);
            }
            None => self.pointer_left(now_ms),
        }
        true
    }

    /// The pointer left the chart surface.
    pub fn pointer_left(&mut self, now_ms: f64) {
        if let Some(key) = self.chart.hovered().map(|m| m.key().clone()) {
            self.chart.hover_end(&key, now_ms);
        }
    }

    /// Hover the marker at `index` in plotted order, or clear the hover.
    pub fn hover_index(&mut self, index: Option<usize>, now_ms: f64) {
        let key: Option<MarkerKey> = index
            .and_then(|i| self.chart.markers().as_slice().get(i))
            .map(|m| m.key().clone());
        match key {
            Some(key) => {
                self.chart.hover_start(&key, now_ms);
            }
            None => self.pointer_left(now_ms),
        }
    }

    pub fn is_animating(&self, now_ms: f64) -> bool {
        self.chart.is_animating(now_ms)
    }

    /// Render commands for the chart as it looks at `now_ms`.
    pub fn frame(&self, now_ms: f64) -> Vec<RenderCommand> {
        self.chart.render(now_ms)
    }

    /// Standalone SVG document for the chart at `now_ms`.
    pub fn to_svg(&self, now_ms: f64) -> String {
        crate::svg::render_svg(&self.frame(now_ms), self.viewport())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::IterFeed;
    use crate::model::record::parse_date;
    use crate::model::{ChangeEvent, Record, RecordId};

    fn added(id: &str, date: &str, distance: f64, activity: &str) -> ChangeEvent {
        ChangeEvent::Added(Record::new(id, parse_date(date).unwrap(), distance, activity))
    }

    #[test]
    fn one_update_per_batch() {
        let mut controller = ChartController::new(ChartConfig::default().with_activity("run"));
        let batches = vec![
            ChangeBatch::from_events([
                added("1", "2024-01-02", 5.0, "run"),
                added("2", "2024-01-01", 3.0, "run"),
            ]),
            ChangeBatch::from_events([ChangeEvent::Removed(RecordId::from("2"))]),
        ];
        let mut plotted_after_each = Vec::new();
        let applied = controller
            .run(&mut IterFeed(batches.into_iter()), |c, _| {
                plotted_after_each.push(c.chart().points().len());
            })
            .unwrap();
        assert_eq!(applied, 2);
        assert_eq!(plotted_after_each, vec![2, 1]);
    }

    #[test]
    fn switching_activity_replots_current_snapshot() {
        let mut controller = ChartController::new(ChartConfig::default().with_activity("run"));
        controller.apply_batch(ChangeBatch::from_events([
            added("1", "2024-01-02", 5.0, "run"),
            added("2", "2024-01-01", 3.0, "walk"),
            added("3", "2024-01-03", 9.0, "walk"),
        ]));
        assert_eq!(controller.chart().points().len(), 1);

        controller.select_activity("walk");
        assert_eq!(controller.chart().activity(), "walk");
        assert_eq!(controller.config().activity, "walk");
        assert_eq!(controller.chart().points().len(), 2);
        assert_eq!(controller.chart().scales().y.domain(), (0.0, 9.0));
    }

    #[test]
    fn pointer_hover_enters_and_leaves() {
        let mut controller = ChartController::new(ChartConfig::default().with_activity("run"));
        controller.apply_batch(ChangeBatch::from_events([
            added("1", "2024-01-02", 5.0, "run"),
            added("2", "2024-01-01", 3.0, "run"),
        ]));
        // Record 1 sits at graph (280, 0), i.e. surface (380, 40).
        assert!(controller.pointer_moved(Point::new(380.0, 40.0), 0.0));
        assert!(!controller.pointer_moved(Point::new(381.0, 40.0), 10.0));
        assert!(controller.chart().guides().is_visible());
        assert!(controller.is_animating(100.0));

        assert!(controller.pointer_moved(Point::new(10.0, 10.0), 400.0));
        assert!(!controller.chart().guides().is_visible());
        assert!(controller.chart().hovered().is_none());
    }

    #[test]
    fn hover_index_follows_plotted_order() {
        let mut controller = ChartController::new(ChartConfig::default().with_activity("run"));
        controller.apply_batch(ChangeBatch::from_events([
            added("1", "2024-01-02", 5.0, "run"),
            added("2", "2024-01-01", 3.0, "run"),
        ]));
        controller.hover_index(Some(0), 0.0);
        assert_eq!(
            controller.chart().hovered().map(|m| m.record_id().as_str()),
            Some("2")
        );
        controller.hover_index(None, 10.0);
        assert!(controller.chart().hovered().is_none());
    }
}
