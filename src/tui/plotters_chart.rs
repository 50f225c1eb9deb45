//! Terminal preview of the saved chart.
//!
//! The PNG and this preview share `draw_panels`; only the backend and the
//! `PanelStyle` differ. Plotters output lands in the Ratatui buffer through
//! `plotters-ratatui-backend`.

use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::chart::{PanelData, PanelStyle, draw_panels};

pub struct PanelChart<'a> {
    pub data: &'a PanelData,
    pub style: PanelStyle,
}

impl Widget for PanelChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Three stacked panels need a few rows each.
        if area.width < 20 || area.height < 12 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let data = self.data;
        let style = self.style;
        let widget = widget_fn(move |root| {
            draw_panels(&root, data, &style)?;
            Ok(())
        });

        widget.render(area, buf);
    }
}
