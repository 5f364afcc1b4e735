// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use serde::{Deserialize, Serialize};
use shuttle_model::prelude::ObjectiveKind;
use std::time::Duration;

/// Per-run model settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default)]
    pub objective: ObjectiveKind,
    #[serde(default = "ModelConfig::default_time_limit_secs")]
    pub time_limit_secs: f64,
}

impl ModelConfig {
    fn default_time_limit_secs() -> f64 {
        60.0
    }

    #[inline]
    pub fn with_objective(mut self, objective: ObjectiveKind) -> Self {
        self.objective = objective;
        self
    }

    #[inline]
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit_secs = limit.as_secs_f64();
        self
    }

    /// Solve budget; non-finite or negative values fall back to zero.
    #[inline]
    pub fn time_limit(&self) -> Duration {
        Duration::try_from_secs_f64(self.time_limit_secs).unwrap_or(Duration::ZERO)
    }
}

impl Default for ModelConfig {
    #[inline]
    fn default() -> Self {
        Self {
            objective: ObjectiveKind::Linear,
            time_limit_secs: Self::default_time_limit_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_json() {
        let cfg: ModelConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, ModelConfig::default());
        assert_eq!(cfg.time_limit(), Duration::from_secs(60));
    }

    #[test]
    fn test_objective_from_json() {
        let cfg: ModelConfig = serde_json::from_str(
            r#"{"objective":{"kind":"piecewise_square","segments":4},"time_limit_secs":1.5}"#,
        )
        .unwrap();
        assert_eq!(cfg.objective, ObjectiveKind::PiecewiseSquare { segments: 4 });
        assert_eq!(cfg.time_limit(), Duration::from_millis(1500));
    }

    #[test]
    fn test_negative_limit_is_zero() {
        let cfg = ModelConfig {
            time_limit_secs: -3.0,
            ..ModelConfig::default()
        };
        assert_eq!(cfg.time_limit(), Duration::ZERO);
    }
}
