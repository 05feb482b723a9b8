//! Responsive analog filter.
//!
//! Adaptive exponential smoothing for noisy ADC channels, after Damien
//! Clarke's ResponsiveAnalogRead (MIT). Small deltas are eased out
//! aggressively, large deltas pass through almost unfiltered, and an
//! optional sleep mode freezes the output while the error estimate stays
//! under the activity threshold.
//!
//! ```text
//!  raw ──► edge snap ──► error EMA ──► sleeping? ──► snap curve ──► EMA ──► clamp
//! ```

/// Weight of each new delta in the error moving average.
const ERROR_EMA_WEIGHT: f32 = 0.4;

/// Tuning for one [`ResponsiveFilter`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FilterConfig {
    /// Number of distinct raw values the channel produces (4096 for 12 bit).
    pub resolution: u16,
    /// Easing amount in `[0, 1]`. Higher is more responsive and noisier.
    pub snap_multiplier: f32,
    /// Error magnitude below which the filter goes to sleep.
    pub activity_threshold: f32,
    pub sleep_enable: bool,
    pub edge_snap_enable: bool,
}

impl FilterConfig {
    pub const DEFAULT: Self = Self {
        resolution: crate::config::FILTER_RESOLUTION,
        snap_multiplier: crate::config::FILTER_SNAP_MULTIPLIER,
        activity_threshold: crate::config::FILTER_ACTIVITY_THRESHOLD,
        sleep_enable: crate::config::FILTER_SLEEP_ENABLE,
        edge_snap_enable: crate::config::FILTER_EDGE_SNAP_ENABLE,
    };

    /// Clamped into `[0, 1]` when the filter is built.
    pub const fn with_snap_multiplier(mut self, snap_multiplier: f32) -> Self {
        self.snap_multiplier = snap_multiplier;
        self
    }

    pub const fn with_sleep(mut self, enable: bool) -> Self {
        self.sleep_enable = enable;
        self
    }

    pub const fn with_edge_snap(mut self, enable: bool) -> Self {
        self.edge_snap_enable = enable;
        self
    }

    pub const fn with_activity_threshold(mut self, threshold: f32) -> Self {
        self.activity_threshold = threshold;
        self
    }

    pub const fn with_resolution(mut self, resolution: u16) -> Self {
        self.resolution = resolution;
        self
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Per-axis smoothing state machine.
#[derive(Clone, Debug)]
pub struct ResponsiveFilter {
    config: FilterConfig,
    smooth_value: f32,
    error_ema: f32,
    sleeping: bool,
    raw_value: u16,
    responsive_value: u16,
    has_changed: bool,
}

impl ResponsiveFilter {
    pub fn new(config: FilterConfig) -> Self {
        let config = FilterConfig {
            snap_multiplier: clamp_unit(config.snap_multiplier),
            ..config
        };
        Self {
            config,
            smooth_value: 0.0,
            error_ema: 0.0,
            sleeping: false,
            raw_value: 0,
            responsive_value: 0,
            has_changed: false,
        }
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Feed one raw sample.
    pub fn update(&mut self, raw_value: u16) {
        let previous = self.responsive_value;
        self.raw_value = raw_value;
        self.responsive_value = self.next_value(raw_value);
        self.has_changed = self.responsive_value != previous;
    }

    /// Current smoothed output, truncated to whole ADC counts.
    pub fn current_value(&self) -> u16 {
        self.responsive_value
    }

    /// Unrounded smoothed state.
    pub fn smoothed(&self) -> f32 {
        self.smooth_value
    }

    pub fn error_ema(&self) -> f32 {
        self.error_ema
    }

    /// Last sample passed to [`update`](Self::update).
    pub fn raw_value(&self) -> u16 {
        self.raw_value
    }

    /// Whether the last update moved the output.
    pub fn has_changed(&self) -> bool {
        self.has_changed
    }

    pub fn is_sleeping(&self) -> bool {
        self.sleeping
    }

    /// Values outside `[0, 1]` are clamped.
    pub fn set_snap_multiplier(&mut self, multiplier: f32) {
        self.config.snap_multiplier = clamp_unit(multiplier);
    }

    pub fn set_activity_threshold(&mut self, threshold: f32) {
        self.config.activity_threshold = threshold;
    }

    /// Shrinking the resolution pulls the held output inside the new range.
    pub fn set_resolution(&mut self, resolution: u16) {
        self.config.resolution = resolution;
        self.clamp_smooth();
        self.responsive_value = self.smooth_value as u16;
    }

    pub fn enable_sleep(&mut self) {
        self.config.sleep_enable = true;
    }

    pub fn disable_sleep(&mut self) {
        self.config.sleep_enable = false;
    }

    pub fn enable_edge_snap(&mut self) {
        self.config.edge_snap_enable = true;
    }

    pub fn disable_edge_snap(&mut self) {
        self.config.edge_snap_enable = false;
    }

    fn next_value(&mut self, raw_value: u16) -> u16 {
        let threshold = self.config.activity_threshold;
        let resolution = self.config.resolution as f32;
        let mut new_value = raw_value as f32;

        // Drag values near either rail further out so the extremes are
        // reachable and small edge movements still wake the filter.
        if self.config.sleep_enable && self.config.edge_snap_enable {
            if new_value < threshold {
                new_value = new_value * 2.0 - threshold;
            } else if new_value > resolution - threshold {
                new_value = new_value * 2.0 - resolution + threshold;
            }
        }

        // Whole counts only: a sub-count difference is no movement.
        let diff = trunc(abs(new_value - self.smooth_value));

        self.error_ema += ((new_value - self.smooth_value) - self.error_ema) * ERROR_EMA_WEIGHT;

        if self.config.sleep_enable {
            self.sleeping = abs(self.error_ema) < threshold;
        }

        if self.config.sleep_enable && self.sleeping {
            self.clamp_smooth();
            return self.smooth_value as u16;
        }

        let mut snap = snap_curve(diff * self.config.snap_multiplier);

        // Settle harder before sleeping. The factor is currently unity.
        if self.config.sleep_enable {
            snap *= 0.5 + 0.5;
        }

        self.smooth_value += (new_value - self.smooth_value) * snap;
        self.clamp_smooth();

        self.smooth_value as u16
    }

    /// Keep the smoothed value inside `[0, resolution - 1]`.
    fn clamp_smooth(&mut self) {
        let ceiling = self.config.resolution.saturating_sub(1) as f32;
        if self.smooth_value < 0.0 {
            self.smooth_value = 0.0;
        } else if self.smooth_value > ceiling {
            self.smooth_value = ceiling;
        }
    }
}

/// Hyperbola mapping a scaled delta onto `[0, 1]`: `0 -> 0`, large -> 1.
pub fn snap_curve(x: f32) -> f32 {
    let y = 1.0 / (x + 1.0);
    let y = (1.0 - y) * 2.0;
    if y > 1.0 {
        1.0
    } else {
        y
    }
}

fn clamp_unit(x: f32) -> f32 {
    if x > 1.0 {
        1.0
    } else if x < 0.0 {
        0.0
    } else {
        x
    }
}

fn abs(x: f32) -> f32 {
    if x < 0.0 {
        -x
    } else {
        x
    }
}

fn trunc(x: f32) -> f32 {
    (x as i32) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn awake_filter(snap: f32) -> ResponsiveFilter {
        ResponsiveFilter::new(FilterConfig::DEFAULT.with_sleep(false).with_snap_multiplier(snap))
    }

    #[test]
    fn snap_curve_endpoints() {
        assert_eq!(snap_curve(0.0), 0.0);
        assert_eq!(snap_curve(1.0), 1.0);
        assert_eq!(snap_curve(500.0), 1.0);
        assert!((snap_curve(0.5) - 2.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn snap_multiplier_is_clamped() {
        let mut f = awake_filter(2.5);
        assert_eq!(f.config().snap_multiplier, 1.0);
        f.set_snap_multiplier(-0.3);
        assert_eq!(f.config().snap_multiplier, 0.0);
        f.set_snap_multiplier(0.4);
        assert_eq!(f.config().snap_multiplier, 0.4);
    }

    #[test]
    fn large_jump_passes_straight_through() {
        let mut f = awake_filter(0.3);
        f.update(3000);
        assert_eq!(f.current_value(), 3000);
        assert!(f.has_changed());
        assert_eq!(f.raw_value(), 3000);
    }

    #[test]
    fn zero_diff_leaves_output_unchanged() {
        let mut f = awake_filter(1.0);
        f.update(1234);
        assert_eq!(f.current_value(), 1234);
        for _ in 0..10 {
            f.update(1234);
            assert_eq!(f.current_value(), 1234);
            assert!(!f.has_changed());
        }
    }

    #[test]
    fn small_noise_is_eased() {
        let mut f = awake_filter(0.01);
        f.update(2000);
        let settled = f.current_value();
        f.update(settled + 4);
        // snap = 2 * (1 - 1 / 1.04) ~= 0.077, so the step is well under one count
        assert_eq!(f.current_value(), settled);
    }

    #[test]
    fn output_is_clamped_to_resolution() {
        let mut f = ResponsiveFilter::new(
            FilterConfig::DEFAULT
                .with_resolution(1024)
                .with_sleep(false)
                .with_snap_multiplier(1.0),
        );
        f.update(5000);
        assert_eq!(f.current_value(), 1023);
        assert_eq!(f.smoothed(), 1023.0);
    }

    #[test]
    fn shrinking_resolution_while_asleep_stays_in_range() {
        let mut f = ResponsiveFilter::new(FilterConfig::DEFAULT.with_edge_snap(false));
        for _ in 0..8 {
            f.update(2000);
        }
        assert!(f.is_sleeping());
        assert_eq!(f.current_value(), 2000);

        f.set_resolution(1024);
        assert_eq!(f.current_value(), 1023);
        assert_eq!(f.smoothed(), 1023.0);

        for _ in 0..5 {
            f.update(2000);
            assert!(f.current_value() <= 1023);
            assert!(f.smoothed() <= 1023.0);
        }
    }

    #[test]
    fn edge_snap_only_with_sleep() {
        let mut f = ResponsiveFilter::new(FilterConfig::DEFAULT.with_sleep(false));
        f.update(10);
        // No edge snap: error moves toward +10.
        assert!(f.error_ema() > 0.0);

        let mut f = ResponsiveFilter::new(FilterConfig::DEFAULT);
        f.update(10);
        // Edge snap: 2 * 10 - 25 = -5, so the error goes negative.
        assert!(f.error_ema() < 0.0);
        assert_eq!(f.current_value(), 0);
    }

    #[test]
    fn high_edge_is_pushed_to_the_rail() {
        let mut f = ResponsiveFilter::new(FilterConfig::DEFAULT.with_snap_multiplier(1.0));
        // 2 * 4090 - 4096 + 25 = 4109, clamped to 4095.
        f.update(4090);
        assert_eq!(f.current_value(), 4095);
    }

    #[test]
    fn falls_asleep_after_settling() {
        let mut f = ResponsiveFilter::new(FilterConfig::DEFAULT.with_edge_snap(false));
        f.update(2000);
        assert!(!f.is_sleeping());
        let mut slept = false;
        for _ in 0..20 {
            f.update(2000);
            if f.is_sleeping() {
                slept = true;
                break;
            }
        }
        assert!(slept);
        assert_eq!(f.current_value(), 2000);
    }

    #[test]
    fn toggles_reach_config() {
        let mut f = ResponsiveFilter::new(FilterConfig::DEFAULT);
        f.disable_sleep();
        f.disable_edge_snap();
        f.set_activity_threshold(10.0);
        f.set_resolution(1024);
        assert_eq!(
            *f.config(),
            FilterConfig {
                resolution: 1024,
                snap_multiplier: FilterConfig::DEFAULT.snap_multiplier,
                activity_threshold: 10.0,
                sleep_enable: false,
                edge_snap_enable: false,
            }
        );
        f.enable_sleep();
        f.enable_edge_snap();
        assert!(f.config().sleep_enable && f.config().edge_snap_enable);
    }
}
