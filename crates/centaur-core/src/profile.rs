use serde::{Deserialize, Serialize};

/// Learned per-rig thresholds supplied by an external profile store.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OpticalProfile {
    pub profile_key: String,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub camera: Option<String>,
    #[serde(default)]
    pub optics: Option<String>,
    /// Used for the plate scale when the header has no `FOCALLEN`.
    #[serde(default)]
    pub focal_length_mm: Option<f64>,
    #[serde(default)]
    pub thresholds: Vec<ProfileThreshold>,
}

/// Warning and critical bounds for one metric. Absent bounds never trigger.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileThreshold {
    pub metric: String,
    #[serde(default)]
    pub warn_min: Option<f64>,
    #[serde(default)]
    pub warn_max: Option<f64>,
    #[serde(default)]
    pub crit_min: Option<f64>,
    #[serde(default)]
    pub crit_max: Option<f64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdStatus {
    Ok,
    Warning,
    Critical,
}

impl std::fmt::Display for ThresholdStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ok => write!(f, "OK"),
            Self::Warning => write!(f, "WARNING"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Outcome of checking one metric against its profile threshold.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProfileCheck {
    pub metric: String,
    pub value: f64,
    pub status: ThresholdStatus,
}

impl ProfileThreshold {
    pub fn evaluate(&self, value: f64) -> ThresholdStatus {
        let outside = |min: Option<f64>, max: Option<f64>| {
            min.is_some_and(|m| value < m) || max.is_some_and(|m| value > m)
        };
        if outside(self.crit_min, self.crit_max) {
            ThresholdStatus::Critical
        } else if outside(self.warn_min, self.warn_max) {
            ThresholdStatus::Warning
        } else {
            ThresholdStatus::Ok
        }
    }
}

impl OpticalProfile {
    pub fn threshold(&self, metric: &str) -> Option<&ProfileThreshold> {
        self.thresholds.iter().find(|t| t.metric == metric)
    }

    /// Status of `value` for `metric`, or `None` if the profile has no
    /// threshold for it.
    pub fn evaluate(&self, metric: &str, value: f64) -> Option<ThresholdStatus> {
        self.threshold(metric).map(|t| t.evaluate(value))
    }

    /// Check every `(metric, value)` pair the profile has a threshold for,
    /// in the order given. Non-finite values are skipped.
    pub fn check_all<'a>(
        &self,
        metrics: impl IntoIterator<Item = (&'a str, f64)>,
    ) -> Vec<ProfileCheck> {
        metrics
            .into_iter()
            .filter(|(_, value)| value.is_finite())
            .filter_map(|(metric, value)| {
                self.evaluate(metric, value).map(|status| ProfileCheck {
                    metric: metric.to_string(),
                    value,
                    status,
                })
            })
            .collect()
    }
}
