use trail_chart_protocol::{Dash, Point, RenderCommand, ThemeToken};

/// Dashed lines tying the hovered point to both axes.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Guides {
    /// Hovered point in graph coordinates; `None` hides the guides.
    anchor: Option<Point>,
}

impl Guides {
    pub fn show(&mut self, anchor: Point) {
        self.anchor = Some(anchor);
    }

    pub fn hide(&mut self) {
        self.anchor = None;
    }

    pub fn is_visible(&self) -> bool {
        self.anchor.is_some()
    }

    pub fn anchor(&self) -> Option<Point> {
        self.anchor
    }

    /// Horizontal guide from the y axis to the point.
    pub fn horizontal(&self) -> Option<(Point, Point)> {
        self.anchor
            .map(|p| (Point::new(0.0, p.y), Point::new(p.x, p.y)))
    }

    /// Vertical guide from the point down to the x axis.
    pub fn vertical(&self, graph_height: f64) -> Option<(Point, Point)> {
        self.anchor
            .map(|p| (Point::new(p.x, p.y), Point::new(p.x, graph_height)))
    }

    /// Hidden guides emit an empty group at zero opacity.
    pub fn render(&self, graph_height: f64) -> Vec<RenderCommand> {
        let opacity = if self.is_visible() { 1.0 } else { 0.0 };
        let mut commands = vec![RenderCommand::BeginGroup {
            id: "guides".into(),
            opacity,
        }];
        let lines = [self.horizontal(), self.vertical(graph_height)];
        for (from, to) in lines.into_iter().flatten() {
            commands.push(RenderCommand::DrawLine {
                from,
                to,
                color: ThemeToken::GuideLine,
                width: 1.0,
                dash: Some(Dash::new(2.0, 4.0)),
            });
        }
        commands.push(RenderCommand::EndGroup);
        commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visible_guides_reach_both_axes() {
        let mut guides = Guides::default();
        guides.show(Point::new(120.0, 80.0));
        assert_eq!(
            guides.horizontal(),
            Some((Point::new(0.0, 80.0), Point::new(120.0, 80.0)))
        );
        assert_eq!(
            guides.vertical(410.0),
            Some((Point::new(120.0, 80.0), Point::new(120.0, 410.0)))
        );
        let cmds = guides.render(410.0);
        assert!(matches!(
            cmds[0],
            RenderCommand::BeginGroup { opacity, .. } if opacity == 1.0
        ));
        assert_eq!(cmds.len(), 4);
    }

    #[test]
    fn hidden_guides_render_transparent() {
        let guides = Guides::default();
        let cmds = guides.render(410.0);
        assert!(matches!(
            cmds[0],
            RenderCommand::BeginGroup { opacity, .. } if opacity == 0.0
        ));
        assert_eq!(cmds.len(), 2);
    }
}
