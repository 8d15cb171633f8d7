use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use trail_chart_protocol::{Paint, Point, RenderCommand, ThemeToken};

use crate::interaction::{HOVER_TRANSITION_MS, Transition};
use crate::model::RecordId;

pub const MARKER_RADIUS: f64 = 4.0;
pub const MARKER_HOVER_RADIUS: f64 = 8.0;

/// How markers are matched to data points from one render to the next.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinKey {
    /// By index in the sorted plotted set. A marker follows whatever point
    /// lands in its slot, so reordering moves marker state between records.
    Position,
    /// By record id. Marker state stays with its record.
    #[default]
    RecordId,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MarkerKey {
    Index(usize),
    Record(RecordId),
}

impl JoinKey {
    pub fn key_for(self, index: usize, id: &RecordId) -> MarkerKey {
        match self {
            JoinKey::Position => MarkerKey::Index(index),
            JoinKey::RecordId => MarkerKey::Record(id.clone()),
        }
    }
}

/// One point marker bound to a plotted record.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    key: MarkerKey,
    record_id: RecordId,
    center: Point,
    /// 0 = at rest, 1 = fully highlighted.
    highlight: Transition,
}

impl Marker {
    fn entered(key: MarkerKey, record_id: RecordId, center: Point) -> Self {
        Self {
            key,
            record_id,
            center,
            highlight: Transition::settled(0.0),
        }
    }

    pub fn key(&self) -> &MarkerKey {
        &self.key
    }

    pub fn record_id(&self) -> &RecordId {
        &self.record_id
    }

    /// Center in graph coordinates.
    pub fn center(&self) -> Point {
        self.center
    }

    pub fn highlight_at(&self, now_ms: f64) -> f64 {
        self.highlight.value_at(now_ms)
    }

    pub fn radius_at(&self, now_ms: f64) -> f64 {
        MARKER_RADIUS + (MARKER_HOVER_RADIUS - MARKER_RADIUS) * self.highlight_at(now_ms)
    }

    pub fn is_animating(&self, now_ms: f64) -> bool {
        self.highlight.is_running(now_ms)
    }

    pub(crate) fn grow(&mut self, now_ms: f64) {
        self.highlight.retarget(1.0, now_ms, HOVER_TRANSITION_MS);
    }

    pub(crate) fn shrink(&mut self, now_ms: f64) {
        self.highlight.retarget(0.0, now_ms, HOVER_TRANSITION_MS);
    }

    pub fn render(&self, now_ms: f64) -> RenderCommand {
        let t = self.highlight_at(now_ms);
        let fill = if t <= 0.0 {
            Paint::Token(ThemeToken::Marker)
        } else if t >= 1.0 {
            Paint::Token(ThemeToken::MarkerHover)
        } else {
            Paint::Blend {
                from: ThemeToken::Marker,
                to: ThemeToken::MarkerHover,
                t,
            }
        };
        RenderCommand::DrawCircle {
            center: self.center,
            radius: self.radius_at(now_ms),
            fill,
            key: Some(self.record_id.to_string()),
        }
    }
}

/// Counts from one reconciliation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JoinSummary {
    pub entered: usize,
    pub updated: usize,
    pub exited: usize,
}

/// The live set of point markers, in plotted order.
#[derive(Debug, Clone, Default)]
pub struct MarkerSet {
    markers: Vec<Marker>,
}

impl MarkerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_slice(&self) -> &[Marker] {
        &self.markers
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn get(&self, key: &MarkerKey) -> Option<&Marker> {
        self.markers.iter().find(|m| &m.key == key)
    }

    pub(crate) fn get_mut(&mut self, key: &MarkerKey) -> Option<&mut Marker> {
        self.markers.iter_mut().find(|m| &m.key == key)
    }

    /// Match markers to `points` (plotted order): exit markers whose key is
    /// gone, move surviving ones, enter new ones at rest.
    pub fn reconcile(&mut self, points: &[(RecordId, Point)], join: JoinKey) -> JoinSummary {
        let mut previous: HashMap<MarkerKey, Marker> = self
            .markers
            .drain(..)
            .map(|m| (m.key.clone(), m))
            .collect();
        let mut summary = JoinSummary::default();

        for (index, (id, center)) in points.iter().enumerate() {
            let key = join.key_for(index, id);
            match previous.remove(&key) {
                Some(mut marker) => {
                    marker.record_id = id.clone();
                    marker.center = *center;
                    summary.updated += 1;
                    self.markers.push(marker);
                }
                None => {
                    summary.entered += 1;
                    self.markers.push(Marker::entered(key, id.clone(), *center));
                }
            }
        }
        summary.exited = previous.len();
        summary
    }

    /// Topmost marker whose current radius covers `point` (graph
    /// coordinates). Later markers draw on top, so they win.
    pub fn hit_test(&self, point: Point, now_ms: f64) -> Option<&Marker> {
        self.markers
            .iter()
            .rev()
            .find(|m| m.center.distance_to(point) <= m.radius_at(now_ms))
    }

    pub fn is_animating(&self, now_ms: f64) -> bool {
        self.markers.iter().any(|m| m.is_animating(now_ms))
    }

    pub fn render(&self, now_ms: f64) -> Vec<RenderCommand> {
        self.markers.iter().map(|m| m.render(now_ms)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(ids: &[&str]) -> Vec<(RecordId, Point)> {
        ids.iter()
            .enumerate()
            .map(|(i, id)| (RecordId::from(*id), Point::new(i as f64 * 10.0, 5.0)))
            .collect()
    }

    #[test]
    fn enter_update_exit() {
        let mut set = MarkerSet::new();
        let first = set.reconcile(&points(&["a", "b"]), JoinKey::RecordId);
        assert_eq!(
            first,
            JoinSummary {
                entered: 2,
                updated: 0,
                exited: 0
            }
        );

        let second = set.reconcile(&points(&["b", "c"]), JoinKey::RecordId);
        assert_eq!(
            second,
            JoinSummary {
                entered: 1,
                updated: 1,
                exited: 1
            }
        );
        let ids: Vec<&str> = set.as_slice().iter().map(|m| m.record_id().as_str()).collect();
        assert_eq!(ids, vec!["b", "c"]);
        assert_eq!(set.as_slice()[0].center(), Point::new(0.0, 5.0));
    }

    #[test]
    fn reconciling_same_points_is_stable() {
        let mut set = MarkerSet::new();
        set.reconcile(&points(&["a", "b", "c"]), JoinKey::Position);
        let again = set.reconcile(&points(&["a", "b", "c"]), JoinKey::Position);
        assert_eq!(again.entered, 0);
        assert_eq!(again.exited, 0);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn position_join_hands_state_to_whatever_lands_in_the_slot() {
        let mut set = MarkerSet::new();
        set.reconcile(&points(&["a", "b"]), JoinKey::Position);
        set.get_mut(&MarkerKey::Index(0)).unwrap().grow(0.0);

        set.reconcile(&points(&["b", "a"]), JoinKey::Position);
        let slot0 = set.get(&MarkerKey::Index(0)).unwrap();
        assert_eq!(slot0.record_id(), &RecordId::from("b"));
        assert_eq!(slot0.highlight_at(1000.0), 1.0);
    }

    #[test]
    fn record_join_keeps_state_with_its_record() {
        let mut set = MarkerSet::new();
        set.reconcile(&points(&["a", "b"]), JoinKey::RecordId);
        set.get_mut(&MarkerKey::Record(RecordId::from("a")))
            .unwrap()
            .grow(0.0);

        set.reconcile(&points(&["b", "a"]), JoinKey::RecordId);
        let a = set.get(&MarkerKey::Record(RecordId::from("a"))).unwrap();
        assert_eq!(a.center(), Point::new(10.0, 5.0));
        assert_eq!(a.highlight_at(1000.0), 1.0);
    }

    #[test]
    fn hover_animation_grows_radius_and_blends_fill() {
        let mut set = MarkerSet::new();
        set.reconcile(&points(&["a"]), JoinKey::RecordId);
        let key = MarkerKey::Record(RecordId::from("a"));
        set.get_mut(&key).unwrap().grow(0.0);

        let marker = set.get(&key).unwrap();
        assert_eq!(marker.radius_at(150.0), 6.0);
        assert!(matches!(
            marker.render(150.0),
            RenderCommand::DrawCircle {
                fill: Paint::Blend { .. },
                ..
            }
        ));
        assert_eq!(marker.radius_at(300.0), MARKER_HOVER_RADIUS);
        assert!(set.is_animating(100.0));
        assert!(!set.is_animating(300.0));
    }

    #[test]
    fn hit_test_uses_current_radius() {
        let mut set = MarkerSet::new();
        set.reconcile(&points(&["a"]), JoinKey::RecordId);
        assert!(set.hit_test(Point::new(3.0, 5.0), 0.0).is_some());
        assert!(set.hit_test(Point::new(6.0, 5.0), 0.0).is_none());
    }
}
