/*!
 * One duration policy for the whole run.
 *
 * The same budget decides how much audio is downloaded and how long the composed
 * video ends up being, so the two checks can never disagree.
 */

use log::warn;

use crate::app_config::DurationConfig;

/// Duration budget of a run, in seconds
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineBudget {
    target: f64,
    hard_max: f64,
    headroom: f64,
    current: f64,
}

impl TimelineBudget {
    pub fn new(target: f64, hard_max: f64, headroom: f64) -> Self {
        Self {
            target,
            hard_max: hard_max.max(target),
            headroom: headroom.clamp(f64::MIN_POSITIVE, 1.0),
            current: 0.0,
        }
    }

    pub fn from_config(config: &DurationConfig) -> Self {
        Self::new(config.target_secs, config.max_secs, config.download_headroom)
    }

    /// Ceiling used while downloading audio
    pub fn download_budget(&self) -> f64 {
        self.hard_max * self.headroom
    }

    /// Cumulative duration recorded so far
    pub fn current(&self) -> f64 {
        self.current
    }

    /// Record another unit's duration; negative values are ignored
    pub fn record(&mut self, duration: f64) -> f64 {
        if duration.is_finite() && duration > 0.0 {
            self.current += duration;
        }
        self.current
    }

    /// Whether recording `duration` would push the total past the download budget
    pub fn would_exceed(&self, duration: f64) -> bool {
        self.current + duration.max(0.0) > self.download_budget()
    }

    /// Length the composed video will have for a measured audio total
    ///
    /// A total within the hard maximum is kept as is. Anything longer can only
    /// come from a first unit that alone overruns the budget, and is cut to the
    /// target length.
    pub fn composition_length(&self, measured_total: f64) -> f64 {
        if measured_total > self.hard_max {
            warn!(
                "Audio is {:.1}s, above the {:.1}s maximum; trimming to {:.1}s",
                measured_total, self.hard_max, self.target
            );
            self.target
        } else {
            measured_total
        }
    }

    /// Number of units to request when deriving a range from the target
    pub fn estimated_unit_count(&self, secs_per_unit: f64) -> u32 {
        let estimate = (self.target * self.headroom / secs_per_unit).floor();
        (estimate.max(0.0) as u32).clamp(3, 14)
    }
}
