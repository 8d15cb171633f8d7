use chrono::{DateTime, Utc};
use tracing::trace;
use trail_chart_protocol::{Point, Rect, RenderCommand, ThemeToken, Viewport};

use crate::config::ChartConfig;
use crate::model::{Record, RecordId};
use crate::projection::{ActivityFilter, magnitude_of, plotted, time_of};
use crate::scale::ScaleState;
use crate::views::guides::Guides;
use crate::views::markers::{JoinKey, JoinSummary, Marker, MarkerKey, MarkerSet};
use crate::views::{time_axis, value_axis};

const LINE_WIDTH: f64 = 2.0;

/// One record as plotted: its values and its position in graph coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct PlottedPoint {
    pub id: RecordId,
    pub date: DateTime<Utc>,
    pub distance: f64,
    pub position: Point,
}

/// What one update changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateSummary {
    pub plotted: usize,
    pub markers: JoinSummary,
}

/// Distance-over-time line chart for one activity category.
///
/// `update` takes the full record set every time and derives everything
/// from it; only marker hover state survives between updates.
#[derive(Debug, Clone)]
pub struct ChartState {
    viewport: Viewport,
    origin: Point,
    graph_width: f64,
    graph_height: f64,
    filter: ActivityFilter,
    join_key: JoinKey,
    scales: ScaleState,
    points: Vec<PlottedPoint>,
    markers: MarkerSet,
    hovered: Option<MarkerKey>,
    guides: Guides,
}

impl ChartState {
    pub fn new(config: &ChartConfig) -> Self {
        let graph_width = config.graph_width();
        let graph_height = config.graph_height();
        Self {
            viewport: Viewport::new(config.dimensions.width, config.dimensions.height),
            origin: Point::new(config.margins.left, config.margins.top),
            graph_width,
            graph_height,
            filter: ActivityFilter::new(config.activity.clone()),
            join_key: config.join_key,
            scales: ScaleState::fit(&[], graph_width, graph_height),
            points: Vec::new(),
            markers: MarkerSet::new(),
            hovered: None,
            guides: Guides::default(),
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Top-left corner of the graph area on the surface.
    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn activity(&self) -> &str {
        self.filter.activity()
    }

    pub fn set_activity(&mut self, activity: impl Into<String>) {
        self.filter = ActivityFilter::new(activity);
    }

    pub fn scales(&self) -> &ScaleState {
        &self.scales
    }

    pub fn points(&self) -> &[PlottedPoint] {
        &self.points
    }

    pub fn markers(&self) -> &MarkerSet {
        &self.markers
    }

    pub fn guides(&self) -> &Guides {
        &self.guides
    }

    pub fn hovered(&self) -> Option<&Marker> {
        self.hovered.as_ref().and_then(|key| self.markers.get(key))
    }

    /// Filter, sort, rescale and re-join markers against `records`.
    pub fn update(&mut self, records: &[Record]) -> UpdateSummary {
        let selected = plotted(records, &self.filter);
        self.scales = ScaleState::fit(&selected, self.graph_width, self.graph_height);

        self.points = selected
            .iter()
            .map(|r| PlottedPoint {
                id: r.id.clone(),
                date: time_of(r),
                distance: magnitude_of(r),
                position: self.project(r),
            })
            .collect();

        let join: Vec<(RecordId, Point)> = self
            .points
            .iter()
            .map(|p| (p.id.clone(), p.position))
            .collect();
        let summary = self.markers.reconcile(&join, self.join_key);

        match self.hovered().map(Marker::center) {
            Some(anchor) => self.guides.show(anchor),
            None => {
                self.hovered = None;
                self.guides.hide();
            }
        }

        trace!(
            activity = self.filter.activity(),
            plotted = self.points.len(),
            y_max = self.scales.y.domain().1,
            entered = summary.entered,
            exited = summary.exited,
            "chart updated"
        );
        UpdateSummary {
            plotted: self.points.len(),
            markers: summary,
        }
    }

    fn project(&self, record: &Record) -> Point {
        let x = self
            .scales
            .x
            .map_or(self.graph_width / 2.0, |x| x.map(time_of(record)));
        Point::new(x, self.scales.y.map(magnitude_of(record)))
    }

    /// Map a surface position into graph coordinates.
    pub fn to_graph(&self, surface: Point) -> Point {
        Point::new(surface.x - self.origin.x, surface.y - self.origin.y)
    }

    /// Marker under a surface position, if any.
    pub fn marker_at(&self, surface: Point, now_ms: f64) -> Option<&Marker> {
        self.markers.hit_test(self.to_graph(surface), now_ms)
    }

    /// Highlight a marker and point the guides at it. Returns false if no
    /// marker has that key.
    pub fn hover_start(&mut self, key: &MarkerKey, now_ms: f64) -> bool {
        if self.hovered.as_ref() == Some(key) {
            return true;
        }
        if let Some(previous) = self.hovered.take() {
            self.hover_end(&previous, now_ms);
        }
        let Some(marker) = self.markers.get_mut(key) else {
            return false;
        };
        marker.grow(now_ms);
        let anchor = marker.center();
        self.guides.show(anchor);
        self.hovered = Some(key.clone());
        true
    }

    /// Return a marker to rest and hide the guides.
    pub fn hover_end(&mut self, key: &MarkerKey, now_ms: f64) {
        if let Some(marker) = self.markers.get_mut(key) {
            marker.shrink(now_ms);
        }
        if self.hovered.as_ref() == Some(key) {
            self.hovered = None;
        }
        self.guides.hide();
    }

    pub fn is_animating(&self, now_ms: f64) -> bool {
        self.markers.is_animating(now_ms)
    }

    /// Render the whole chart as it looks at `now_ms`.
    pub fn render(&self, now_ms: f64) -> Vec<RenderCommand> {
        let mut commands = Vec::with_capacity(self.points.len() + 64);
        commands.push(RenderCommand::BeginGroup {
            id: "chart".into(),
            opacity: 1.0,
        });
        commands.push(RenderCommand::DrawRect {
            rect: Rect::new(0.0, 0.0, self.viewport.width, self.viewport.height),
            color: ThemeToken::Background,
            border_color: None,
        });
        commands.push(RenderCommand::PushTransform {
            translate: self.origin,
        });

        commands.extend(time_axis::render_time_axis(
            self.scales.x.as_ref(),
            self.graph_width,
            self.graph_height,
        ));
        commands.extend(value_axis::render_value_axis(&self.scales.y));

        if !self.points.is_empty() {
            commands.push(RenderCommand::DrawPolyline {
                points: self.points.iter().map(|p| p.position).collect(),
                color: ThemeToken::ChartLine,
                width: LINE_WIDTH,
            });
        }
        commands.extend(self.guides.render(self.graph_height));
        commands.extend(self.markers.render(now_ms));

        commands.push(RenderCommand::PopTransform);
        commands.push(RenderCommand::EndGroup);
        commands
    }
}
