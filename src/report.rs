use std::fmt;

use serde::Serialize;

use crate::{AssessmentResult, Error, MAX_SCORE, MIN_SCORE};

/// 平均点がこの値以下なら緑
const GREEN_UNTIL: f64 = 2.0;
/// 平均点がこの値以下なら黄、超えれば赤
const YELLOW_UNTIL: f64 = 3.5;
const FULL_ANGLE: f64 = 180.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GaugeColor {
    #[serde(rename = "#22c55e")]
    Green,
    #[serde(rename = "#facc15")]
    Yellow,
    #[serde(rename = "#ef4444")]
    Red,
}

impl GaugeColor {
    /// ストレスもパフォーマンスも、平均点が高いほど問題が多いので赤に近づく
    pub fn for_mean(mean: f64) -> Self {
        if mean <= GREEN_UNTIL {
            GaugeColor::Green
        } else if mean <= YELLOW_UNTIL {
            GaugeColor::Yellow
        } else {
            GaugeColor::Red
        }
    }

    pub fn hex(&self) -> &'static str {
        match self {
            GaugeColor::Green => "#22c55e",
            GaugeColor::Yellow => "#facc15",
            GaugeColor::Red => "#ef4444",
        }
    }
}

/// メーター表示用の値
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Gauge {
    /// 0〜100
    pub percentage: f64,
    /// 針の角度。平均点1で0度、5で180度
    pub angle: f64,
    pub color: GaugeColor,
}

impl Gauge {
    pub fn for_mean(mean: f64) -> Self {
        let range = f64::from(MAX_SCORE - MIN_SCORE);
        let ratio = ((mean - f64::from(MIN_SCORE)) / range).clamp(0.0, 1.0);
        Self {
            percentage: ratio * 100.0,
            angle: ratio * FULL_ANGLE,
            color: GaugeColor::for_mean(mean),
        }
    }
}

impl fmt::Display for AssessmentResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Stress level: {} ({:.2})",
            self.stress_level, self.stress_mean
        )?;
        writeln!(
            f,
            "  gauge: {:.0}% {}",
            self.stress_gauge.percentage,
            self.stress_gauge.color.hex()
        )?;
        writeln!(
            f,
            "Performance level: {} ({:.2})",
            self.performance_level, self.performance_mean
        )?;
        writeln!(
            f,
            "  gauge: {:.0}% {}",
            self.performance_gauge.percentage,
            self.performance_gauge.color.hex()
        )?;
        writeln!(f, "Recommendation: {}", self.recommendation)
    }
}

pub fn render_text(result: &AssessmentResult) -> String {
    result.to_string()
}

pub fn render_json(result: &AssessmentResult) -> Result<String, Error> {
    Ok(serde_json::to_string_pretty(result)?)
}
