use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, Timelike, Utc};
use trail_chart_protocol::{Point, RenderCommand, TextAlign, ThemeToken};

use crate::scale::{TimeScale, tick_step};

pub const TICK_COUNT: usize = 4;
pub const LABEL_FORMAT: &str = "%b %d";

const TICK_SIZE: f64 = 6.0;
const TICK_PADDING: f64 = 3.0;
const FONT_SIZE: f64 = 10.0;
const LABEL_ROTATION_DEG: f64 = -40.0;

const SECOND_MS: i64 = 1_000;
const MINUTE_MS: i64 = 60 * SECOND_MS;
const HOUR_MS: i64 = 60 * MINUTE_MS;
const DAY_MS: i64 = 24 * HOUR_MS;
const WEEK_MS: i64 = 7 * DAY_MS;
const MONTH_MS: i64 = 30 * DAY_MS;
const YEAR_MS: i64 = 365 * DAY_MS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Millisecond,
    Second,
    Minute,
    Hour,
    Day,
    /// Sunday-based weeks.
    Week,
    Month,
    Year,
}

/// A calendar tick interval: every `step` units, aligned to the unit's
/// field (day of month, month of year, ...), all in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickInterval {
    pub unit: TimeUnit,
    pub step: u32,
}

impl TickInterval {
    const fn new(unit: TimeUnit, step: u32) -> Self {
        Self { unit, step }
    }

    fn floor(&self, t: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let fixed = |unit_ms: i64| {
            let ms = t.timestamp_millis();
            DateTime::from_timestamp_millis(ms - ms.rem_euclid(unit_ms))
        };
        match self.unit {
            TimeUnit::Millisecond => Some(t),
            TimeUnit::Second => fixed(SECOND_MS),
            TimeUnit::Minute => fixed(MINUTE_MS),
            TimeUnit::Hour => fixed(HOUR_MS),
            TimeUnit::Day => fixed(DAY_MS),
            TimeUnit::Week => {
                let day = fixed(DAY_MS)?;
                let back = day.weekday().num_days_from_sunday();
                day.checked_sub_signed(Duration::days(i64::from(back)))
            }
            TimeUnit::Month => midnight(NaiveDate::from_ymd_opt(t.year(), t.month(), 1)?),
            TimeUnit::Year => midnight(NaiveDate::from_ymd_opt(t.year(), 1, 1)?),
        }
    }

    fn advance(&self, t: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self.unit {
            TimeUnit::Millisecond => t.checked_add_signed(Duration::milliseconds(1)),
            TimeUnit::Second => t.checked_add_signed(Duration::seconds(1)),
            TimeUnit::Minute => t.checked_add_signed(Duration::minutes(1)),
            TimeUnit::Hour => t.checked_add_signed(Duration::hours(1)),
            TimeUnit::Day => t.checked_add_signed(Duration::days(1)),
            TimeUnit::Week => t.checked_add_signed(Duration::weeks(1)),
            TimeUnit::Month => t.checked_add_months(Months::new(1)),
            TimeUnit::Year => t.checked_add_months(Months::new(12)),
        }
    }

    /// Whether a unit boundary is also a boundary of this stepped interval.
    fn keeps(&self, t: DateTime<Utc>) -> bool {
        let step = i64::from(self.step.max(1));
        let field = match self.unit {
            TimeUnit::Millisecond => t.timestamp_millis(),
            TimeUnit::Second => i64::from(t.second()),
            TimeUnit::Minute => i64::from(t.minute()),
            TimeUnit::Hour => i64::from(t.hour()),
            TimeUnit::Day => i64::from(t.day0()),
            TimeUnit::Week => 0,
            TimeUnit::Month => i64::from(t.month0()),
            TimeUnit::Year => i64::from(t.year()),
        };
        field.rem_euclid(step) == 0
    }

    /// Every interval boundary in `[start, stop]`.
    pub fn range(&self, start: DateTime<Utc>, stop: DateTime<Utc>) -> Vec<DateTime<Utc>> {
        let mut out = Vec::new();
        let Some(mut t) = self.floor(start) else {
            return out;
        };
        if t < start {
            match self.advance(t) {
                Some(next) => t = next,
                None => return out,
            }
        }
        if self.unit == TimeUnit::Millisecond {
            // Walk multiples of `step` directly.
            let step = i64::from(self.step.max(1));
            let ms = t.timestamp_millis();
            let aligned = ms + (step - ms.rem_euclid(step)) % step;
            let mut ms = aligned;
            while ms <= stop.timestamp_millis() {
                if let Some(tick) = DateTime::from_timestamp_millis(ms) {
                    out.push(tick);
                }
                ms += step;
            }
            return out;
        }
        while t <= stop {
            if self.keeps(t) {
                out.push(t);
            }
            match self.advance(t) {
                Some(next) => t = next,
                None => break,
            }
        }
        out
    }
}

fn midnight(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc())
}

/// Candidate intervals and their nominal lengths, shortest first.
const NICE_INTERVALS: &[(TickInterval, i64)] = &[
    (TickInterval::new(TimeUnit::Second, 1), SECOND_MS),
    (TickInterval::new(TimeUnit::Second, 5), 5 * SECOND_MS),
    (TickInterval::new(TimeUnit::Second, 15), 15 * SECOND_MS),
    (TickInterval::new(TimeUnit::Second, 30), 30 * SECOND_MS),
    (TickInterval::new(TimeUnit::Minute, 1), MINUTE_MS),
    (TickInterval::new(TimeUnit::Minute, 5), 5 * MINUTE_MS),
    (TickInterval::new(TimeUnit::Minute, 15), 15 * MINUTE_MS),
    (TickInterval::new(TimeUnit::Minute, 30), 30 * MINUTE_MS),
    (TickInterval::new(TimeUnit::Hour, 1), HOUR_MS),
    (TickInterval::new(TimeUnit::Hour, 3), 3 * HOUR_MS),
    (TickInterval::new(TimeUnit::Hour, 6), 6 * HOUR_MS),
    (TickInterval::new(TimeUnit::Hour, 12), 12 * HOUR_MS),
    (TickInterval::new(TimeUnit::Day, 1), DAY_MS),
    (TickInterval::new(TimeUnit::Day, 2), 2 * DAY_MS),
    (TickInterval::new(TimeUnit::Week, 1), WEEK_MS),
    (TickInterval::new(TimeUnit::Month, 1), MONTH_MS),
    (TickInterval::new(TimeUnit::Month, 3), 3 * MONTH_MS),
    (TickInterval::new(TimeUnit::Year, 1), YEAR_MS),
];

/// Choose the calendar interval giving roughly `count` ticks over
/// `[start, stop]`.
pub fn nice_interval(start: DateTime<Utc>, stop: DateTime<Utc>, count: usize) -> TickInterval {
    let (a, b) = (start.timestamp_millis(), stop.timestamp_millis());
    let target = (b - a).abs() as f64 / count.max(1) as f64;

    let i = NICE_INTERVALS.partition_point(|&(_, len)| (len as f64) <= target);
    if i == NICE_INTERVALS.len() {
        let step = tick_step(a as f64 / YEAR_MS as f64, b as f64 / YEAR_MS as f64, count);
        return TickInterval::new(TimeUnit::Year, (step.round() as u32).max(1));
    }
    if i == 0 {
        let step = tick_step(a as f64, b as f64, count);
        return TickInterval::new(TimeUnit::Millisecond, (step.round() as u32).max(1));
    }
    let (below, below_len) = NICE_INTERVALS[i - 1];
    let (above, above_len) = NICE_INTERVALS[i];
    if target / (below_len as f64) < (above_len as f64) / target {
        below
    } else {
        above
    }
}

/// Tick instants for a time domain.
pub fn time_ticks(start: DateTime<Utc>, stop: DateTime<Utc>, count: usize) -> Vec<DateTime<Utc>> {
    if count == 0 {
        return Vec::new();
    }
    let (lo, hi) = if start <= stop { (start, stop) } else { (stop, start) };
    if lo == hi {
        return vec![lo];
    }
    nice_interval(lo, hi, count).range(lo, hi)
}

pub fn format_time_label(t: DateTime<Utc>) -> String {
    t.format(LABEL_FORMAT).to_string()
}

/// Render the bottom (time) axis in graph coordinates, with the axis line at
/// `graph_height`. With no scale only the domain line is drawn.
pub fn render_time_axis(
    scale: Option<&TimeScale>,
    graph_width: f64,
    graph_height: f64,
) -> Vec<RenderCommand> {
    let mut commands = Vec::with_capacity(16);
    commands.push(RenderCommand::BeginGroup {
        id: "x-axis".into(),
        opacity: 1.0,
    });
    commands.push(RenderCommand::PushTransform {
        translate: Point::new(0.0, graph_height),
    });

    let (r0, r1) = scale.map_or((0.0, graph_width), TimeScale::range);
    for (from, to) in [
        ((r0, TICK_SIZE), (r0, 0.0)),
        ((r0, 0.0), (r1, 0.0)),
        ((r1, 0.0), (r1, TICK_SIZE)),
    ] {
        commands.push(axis_line(from, to));
    }

    if let Some(scale) = scale {
        let (start, stop) = scale.domain();
        for t in time_ticks(start, stop, TICK_COUNT) {
            let x = scale.map(t);
            commands.push(axis_line((x, 0.0), (x, TICK_SIZE)));
            commands.push(RenderCommand::DrawText {
                position: Point::new(x, TICK_SIZE + TICK_PADDING + FONT_SIZE * 0.71),
                text: format_time_label(t),
                color: ThemeToken::AxisText,
                font_size: FONT_SIZE,
                align: TextAlign::Right,
                rotation: LABEL_ROTATION_DEG,
            });
        }
    }

    commands.push(RenderCommand::PopTransform);
    commands.push(RenderCommand::EndGroup);
    commands
}

fn axis_line(from: (f64, f64), to: (f64, f64)) -> RenderCommand {
    RenderCommand::DrawLine {
        from: Point::new(from.0, from.1),
        to: Point::new(to.0, to.1),
        color: ThemeToken::AxisLine,
        width: 1.0,
        dash: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::record::parse_date;

    fn at(s: &str) -> DateTime<Utc> {
        parse_date(s).unwrap()
    }

    #[test]
    fn nice_interval_selects_reasonable_value() {
        // Ten days over four ticks: 2.5 days per tick, closer to 2 days than a week.
        let interval = nice_interval(at("2024-01-01"), at("2024-01-11"), 4);
        assert_eq!(interval, TickInterval::new(TimeUnit::Day, 2));

        let interval = nice_interval(at("2024-01-01"), at("2024-12-31"), 4);
        assert_eq!(interval, TickInterval::new(TimeUnit::Month, 3));
    }

    #[test]
    fn day_ticks_align_to_day_of_month() {
        let ticks = time_ticks(at("2024-01-01"), at("2024-01-11"), 4);
        let labels: Vec<String> = ticks.into_iter().map(format_time_label).collect();
        assert_eq!(
            labels,
            vec!["Jan 01", "Jan 03", "Jan 05", "Jan 07", "Jan 09", "Jan 11"]
        );
    }

    #[test]
    fn week_ticks_fall_on_sundays() {
        let ticks = time_ticks(at("2024-01-01"), at("2024-02-05"), 4);
        assert!(!ticks.is_empty());
        assert!(ticks
            .iter()
            .all(|t| t.weekday() == chrono::Weekday::Sun && *t >= at("2024-01-01")));
    }

    #[test]
    fn quarter_ticks_start_on_quarter_months() {
        let ticks = time_ticks(at("2024-01-15"), at("2024-12-31"), 4);
        let labels: Vec<String> = ticks.into_iter().map(format_time_label).collect();
        assert_eq!(labels, vec!["Apr 01", "Jul 01", "Oct 01"]);
    }

    #[test]
    fn single_instant_has_one_tick() {
        let day = at("2024-01-02");
        assert_eq!(time_ticks(day, day, 4), vec![day]);
    }

    #[test]
    fn renders_ticks_and_rotated_labels() {
        let scale = TimeScale::new((at("2024-01-01"), at("2024-01-05")), (0.0, 280.0));
        let cmds = render_time_axis(Some(&scale), 280.0, 410.0);

        let texts: Vec<_> = cmds
            .iter()
            .filter_map(|c| match c {
                RenderCommand::DrawText { text, rotation, .. } => Some((text.as_str(), *rotation)),
                _ => None,
            })
            .collect();
        assert_eq!(
            texts,
            vec![
                ("Jan 01", -40.0),
                ("Jan 02", -40.0),
                ("Jan 03", -40.0),
                ("Jan 04", -40.0),
                ("Jan 05", -40.0),
            ]
        );
    }

    #[test]
    fn no_scale_draws_only_the_domain_line() {
        let cmds = render_time_axis(None, 280.0, 410.0);
        assert!(!cmds.iter().any(|c| matches!(c, RenderCommand::DrawText { .. })));
        let lines = cmds
            .iter()
            .filter(|c| matches!(c, RenderCommand::DrawLine { .. }))
            .count();
        assert_eq!(lines, 3);
    }
}
