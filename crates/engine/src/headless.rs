//! Terminal stand-in for the chart widget: every surface call becomes a log
//! line.

use chrono::DateTime;
use tracing::{debug, info};

use series::Series;
use session::{ChartConfig, ChartHost, OptionsPatch, RenderSurface};

pub struct HeadlessHost {
    width: Option<u32>,
    observing: bool,
}

impl HeadlessHost {
    pub fn new(width: Option<u32>) -> Self {
        Self {
            width,
            observing: false,
        }
    }
}

impl ChartHost for HeadlessHost {
    type Surface = HeadlessSurface;

    fn container_width(&self) -> Option<u32> {
        self.width
    }

    fn create_surface(&mut self, config: &ChartConfig) -> HeadlessSurface {
        info!(
            width = config.width,
            height = config.height,
            time_visible = config.time_scale.time_visible,
            "surface created"
        );
        HeadlessSurface {
            width: config.width,
            time_visible: config.time_scale.time_visible,
        }
    }

    fn observe_resize(&mut self) {
        self.observing = true;
    }

    fn disconnect_resize(&mut self) {
        self.observing = false;
    }
}

pub struct HeadlessSurface {
    width: u32,
    time_visible: bool,
}

impl RenderSurface for HeadlessSurface {
    fn set_data(&mut self, series: &Series) {
        let Some(last) = series.last() else {
            debug!("surface cleared");
            return;
        };
        let format = if self.time_visible { "%Y-%m-%d %H:%M" } else { "%Y-%m-%d" };
        let at = DateTime::from_timestamp(last.time.0, 0)
            .map(|t| t.format(format).to_string())
            .unwrap_or_else(|| last.time.to_string());

        info!(
            candles = series.len(),
            last = %at,
            open = %last.open,
            high = %last.high,
            low = %last.low,
            close = %last.close,
            "series"
        );
    }

    fn apply_options(&mut self, patch: &OptionsPatch) {
        if let Some(visible) = patch.time_visible {
            self.time_visible = visible;
        }
        debug!(time_visible = self.time_visible, "surface options");
    }

    fn fit_visible_range(&mut self) {
        debug!("fit content");
    }

    fn resize(&mut self, width: u32) {
        self.width = width;
        debug!(width, "surface resized");
    }

    fn destroy(&mut self) {
        debug!(width = self.width, "surface destroyed");
    }
}
