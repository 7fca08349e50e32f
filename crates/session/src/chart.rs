//! Lifecycle of the external chart surface.
//!
//! The binding never owns data: the session hands it the series on every
//! change and it forwards to whatever surface the host built.

use serde::Serialize;
use tracing::debug;

use market_core::Period;
use series::Series;

//
// --- Options -----------------------------------------------------------------
//

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutOptions {
    pub background: &'static str,
    pub text_color: &'static str,
    pub font_size: u32,
    pub font_family: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridOptions {
    pub vert_lines_visible: bool,
    pub horz_lines_visible: bool,
    pub horz_lines_color: &'static str,
    /// 2 = dashed
    pub horz_lines_style: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisOptions {
    pub border_color: &'static str,
    pub time_visible: bool,
    pub seconds_visible: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrosshairOptions {
    /// 1 = normal (free-moving)
    pub mode: u8,
    pub vert_line_color: &'static str,
    pub horz_line_color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandleStyle {
    pub up_color: &'static str,
    pub down_color: &'static str,
    pub wick_up_color: &'static str,
    pub wick_down_color: &'static str,
    pub border_visible: bool,
    pub wick_visible: bool,
}

/// Everything the surface needs at construction time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartConfig {
    pub width: u32,
    pub height: u32,
    pub layout: LayoutOptions,
    pub grid: GridOptions,
    pub price_scale_border: &'static str,
    pub time_scale: AxisOptions,
    pub crosshair: CrosshairOptions,
    pub candles: CandleStyle,
    pub handle_scroll: bool,
    pub handle_scale: bool,
}

mod colors {
    pub const BACKGROUND: &str = "#0b1116";
    pub const TEXT: &str = "#8f9fb1";
    pub const GRID: &str = "#1a2332";
    pub const BORDER: &str = "#1a2332";
    pub const CROSSHAIR_VERTICAL: &str = "#ffffff40";
    pub const CROSSHAIR_HORIZONTAL: &str = "#ffffff20";
    pub const CANDLE_UP: &str = "#158A6E";
    pub const CANDLE_DOWN: &str = "#EB1C36";
}

impl ChartConfig {
    pub fn new(width: u32, height: u32, period: Period) -> Self {
        Self {
            width,
            height,
            layout: LayoutOptions {
                background: colors::BACKGROUND,
                text_color: colors::TEXT,
                font_size: 12,
                font_family: "Inter, Roboto, \"Helvetica Neue\", Arial",
            },
            grid: GridOptions {
                vert_lines_visible: false,
                horz_lines_visible: true,
                horz_lines_color: colors::GRID,
                horz_lines_style: 2,
            },
            price_scale_border: colors::BORDER,
            time_scale: AxisOptions {
                border_color: colors::BORDER,
                time_visible: period.shows_clock_time(),
                seconds_visible: false,
            },
            crosshair: CrosshairOptions {
                mode: 1,
                vert_line_color: colors::CROSSHAIR_VERTICAL,
                horz_line_color: colors::CROSSHAIR_HORIZONTAL,
            },
            candles: CandleStyle {
                up_color: colors::CANDLE_UP,
                down_color: colors::CANDLE_DOWN,
                wick_up_color: colors::CANDLE_UP,
                wick_down_color: colors::CANDLE_DOWN,
                border_visible: true,
                wick_visible: true,
            },
            handle_scroll: true,
            handle_scale: true,
        }
    }
}

/// Partial in-place update of a live surface.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OptionsPatch {
    pub time_visible: Option<bool>,
}

//
// --- Collaborators -----------------------------------------------------------
//

/// External rendering surface. Write-only from our side.
pub trait RenderSurface {
    fn set_data(&mut self, series: &Series);
    fn apply_options(&mut self, patch: &OptionsPatch);
    fn fit_visible_range(&mut self);
    fn resize(&mut self, width: u32);
    fn destroy(&mut self);
}

/// The container the chart lives in: builds surfaces and owns the size
/// observation.
pub trait ChartHost {
    type Surface: RenderSurface;

    /// `None` until the container is laid out.
    fn container_width(&self) -> Option<u32>;
    fn create_surface(&mut self, config: &ChartConfig) -> Self::Surface;
    fn observe_resize(&mut self);
    fn disconnect_resize(&mut self);
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum DisplayMode {
    /// Keep the user's pan/zoom; re-fit only when the candle count moves.
    LiveTailing,
    /// Re-fit on every push.
    HistoricalBrowsing,
}

//
// --- Binding -----------------------------------------------------------------
//

pub struct ChartBinding<H: ChartHost> {
    host: H,
    surface: Option<H::Surface>,
    height: u32,
    period: Period,
    mode: DisplayMode,
    pushed_len: Option<usize>,
}

impl<H: ChartHost> ChartBinding<H> {
    pub fn new(host: H, height: u32, period: Period, mode: DisplayMode) -> Self {
        Self {
            host,
            surface: None,
            height,
            period,
            mode,
            pushed_len: None,
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.surface.is_some()
    }

    #[cfg(test)]
    pub(crate) fn host(&self) -> &H {
        &self.host
    }

    #[cfg(test)]
    pub(crate) fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Builds the surface if the container is ready. Returns the size it was
    /// built with, `None` if already mounted or the container is not ready.
    pub fn mount(&mut self, series: &Series) -> Option<(u32, u32)> {
        if self.surface.is_some() {
            return None;
        }
        let width = self.host.container_width()?;

        let config = ChartConfig::new(width, self.height, self.period);
        let mut surface = self.host.create_surface(&config);
        self.host.observe_resize();

        surface.set_data(series);
        surface.fit_visible_range();
        self.pushed_len = Some(series.len());
        self.surface = Some(surface);

        debug!(width, height = self.height, period = %self.period, "chart mounted");
        Some((width, self.height))
    }

    /// Height is structural: the surface is torn down and rebuilt.
    pub fn set_height(&mut self, height: u32, series: &Series) -> Option<(u32, u32)> {
        if height == self.height {
            return None;
        }
        self.height = height;
        if !self.is_mounted() {
            return None;
        }
        self.teardown();
        self.mount(series)
    }

    pub fn on_container_resized(&mut self, width: u32) {
        if let Some(surface) = self.surface.as_mut() {
            surface.resize(width);
        }
    }

    /// Period only flips axis clock visibility, in place.
    pub fn set_period(&mut self, period: Period) {
        if period == self.period {
            return;
        }
        self.period = period;
        if let Some(surface) = self.surface.as_mut() {
            surface.apply_options(&OptionsPatch {
                time_visible: Some(period.shows_clock_time()),
            });
        }
    }

    pub fn set_mode(&mut self, mode: DisplayMode) {
        self.mode = mode;
    }

    /// Pushes the full series. `reset_view` forces a re-fit (range switch).
    pub fn push(&mut self, series: &Series, reset_view: bool) {
        if self.surface.is_none() {
            // контейнер мог появиться позже
            self.mount(series);
            return;
        }

        let len_changed = self.pushed_len != Some(series.len());
        let refit = reset_view || len_changed || self.mode == DisplayMode::HistoricalBrowsing;

        if let Some(surface) = self.surface.as_mut() {
            surface.set_data(series);
            if refit {
                surface.fit_visible_range();
            }
        }
        self.pushed_len = Some(series.len());
    }

    /// Disconnects the size observer and destroys the surface. Idempotent.
    pub fn teardown(&mut self) -> bool {
        let Some(mut surface) = self.surface.take() else {
            return false;
        };
        self.host.disconnect_resize();
        surface.destroy();
        self.pushed_len = None;
        debug!("chart released");
        true
    }
}

impl<H: ChartHost> Drop for ChartBinding<H> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::{Call, RecordingHost, series_of};

    fn binding(width: Option<u32>, mode: DisplayMode) -> ChartBinding<RecordingHost> {
        ChartBinding::new(RecordingHost::new(width), 360, Period::Daily, mode)
    }

    #[test]
    fn waits_for_container_before_creating() {
        let mut b = binding(None, DisplayMode::LiveTailing);
        assert_eq!(b.mount(&Series::new()), None);
        assert!(!b.is_mounted());

        b.host_mut().set_width(Some(800));
        assert_eq!(b.mount(&series_of(&[0, 60])), Some((800, 360)));
        assert_eq!(b.host().created(), 1);
        assert!(b.host().observing());
        assert_eq!(b.host().calls(), vec![Call::SetData(2), Call::Fit]);
    }

    #[test]
    fn creation_sets_clock_visibility_from_period() {
        let mut b = ChartBinding::new(RecordingHost::new(Some(500)), 300, Period::Yearly, DisplayMode::LiveTailing);
        b.mount(&Series::new());
        let cfg = b.host().last_config().unwrap();
        assert!(!cfg.time_scale.time_visible);
        assert_eq!((cfg.width, cfg.height), (500, 300));
    }

    #[test]
    fn resize_touches_width_only() {
        let mut b = binding(Some(800), DisplayMode::LiveTailing);
        b.mount(&Series::new());
        b.host().clear_calls();

        b.on_container_resized(640);

        assert_eq!(b.host().calls(), vec![Call::Resize(640)]);
        assert_eq!(b.host().created(), 1);
    }

    #[test]
    fn period_change_patches_in_place() {
        let mut b = binding(Some(800), DisplayMode::LiveTailing);
        b.mount(&Series::new());
        b.host().clear_calls();

        b.set_period(Period::SixMonths);
        b.set_period(Period::SixMonths);

        assert_eq!(b.host().calls(), vec![Call::Options(Some(false))]);
        assert_eq!(b.host().created(), 1);
        assert_eq!(b.host().destroyed(), 0);
    }

    #[test]
    fn live_tailing_refits_only_when_count_changes() {
        let mut b = binding(Some(800), DisplayMode::LiveTailing);
        b.mount(&series_of(&[0, 60]));
        b.host().clear_calls();

        b.push(&series_of(&[0, 60]), false);
        b.push(&series_of(&[0, 60, 120]), false);

        assert_eq!(
            b.host().calls(),
            vec![Call::SetData(2), Call::SetData(3), Call::Fit]
        );
    }

    #[test]
    fn historical_browsing_always_refits() {
        let mut b = binding(Some(800), DisplayMode::HistoricalBrowsing);
        b.mount(&series_of(&[0]));
        b.host().clear_calls();

        b.push(&series_of(&[0]), false);

        assert_eq!(b.host().calls(), vec![Call::SetData(1), Call::Fit]);
    }

    #[test]
    fn reset_view_forces_fit_in_live_mode() {
        let mut b = binding(Some(800), DisplayMode::LiveTailing);
        b.mount(&series_of(&[0]));
        b.host().clear_calls();

        b.push(&series_of(&[60]), true);

        assert_eq!(b.host().calls(), vec![Call::SetData(1), Call::Fit]);
    }

    #[test]
    fn height_change_rebuilds_and_releases_old_surface() {
        let mut b = binding(Some(800), DisplayMode::LiveTailing);
        b.mount(&series_of(&[0]));

        assert_eq!(b.set_height(480, &series_of(&[0, 60])), Some((800, 480)));

        assert_eq!(b.host().created(), 2);
        assert_eq!(b.host().destroyed(), 1);
        assert_eq!(b.host().disconnects(), 1);
        assert!(b.host().observing());
        assert_eq!(b.host().last_config().map(|c| c.height), Some(480));
    }

    #[test]
    fn drop_tears_down() {
        let host = RecordingHost::new(Some(800));
        let probe = host.clone();
        {
            let mut b = ChartBinding::new(host, 360, Period::Daily, DisplayMode::LiveTailing);
            b.mount(&Series::new());
            assert!(probe.observing());
        }
        assert_eq!(probe.destroyed(), 1);
        assert!(!probe.observing());
    }

    #[test]
    fn teardown_is_idempotent() {
        let mut b = binding(Some(800), DisplayMode::LiveTailing);
        b.mount(&Series::new());
        assert!(b.teardown());
        assert!(!b.teardown());
        assert_eq!(b.host().destroyed(), 1);
    }
}
