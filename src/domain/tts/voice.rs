use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Voice requested for a run: a provider voice id, or detection from the document language
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceSelection {
    Auto,
    Named(String),
}

impl VoiceSelection {
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("auto") {
            VoiceSelection::Auto
        } else {
            VoiceSelection::Named(value.to_string())
        }
    }
}

impl std::fmt::Display for VoiceSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VoiceSelection::Auto => write!(f, "auto"),
            VoiceSelection::Named(voice) => write!(f, "{}", voice),
        }
    }
}

/// Signed speaking-rate adjustment in percent, written like `-5%` or `+20%`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateAdjustment(i32);

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("invalid rate adjustment '{0}', expected a signed percentage like -5% or +20%")]
pub struct InvalidRateAdjustment(String);

impl RateAdjustment {
    pub fn from_percent(percent: i32) -> Self {
        Self(percent)
    }

    pub fn percent(&self) -> i32 {
        self.0
    }

    /// Absolute rate as a percentage of normal speed, clamped to `[min, max]`
    pub fn absolute_percent(&self, min: i32, max: i32) -> i32 {
        (100 + self.0).clamp(min, max)
    }

    /// Rate as a speed multiplier, clamped to `[min, max]`
    pub fn speed_factor(&self, min: f32, max: f32) -> f32 {
        (1.0 + self.0 as f32 / 100.0).clamp(min, max)
    }
}

impl FromStr for RateAdjustment {
    type Err = InvalidRateAdjustment;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let digits = trimmed
            .strip_suffix('%')
            .ok_or_else(|| InvalidRateAdjustment(value.to_string()))?;

        if digits.is_empty() || digits == "+" || digits == "-" {
            return Err(InvalidRateAdjustment(value.to_string()));
        }

        digits
            .parse::<i32>()
            .map(RateAdjustment)
            .map_err(|_| InvalidRateAdjustment(value.to_string()))
    }
}

impl std::fmt::Display for RateAdjustment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:+}%", self.0)
    }
}

/// Parameters passed to the provider for every fragment of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceSettings {
    pub voice_id: String,
    pub rate: RateAdjustment,
}

/// A voice offered by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceInfo {
    pub short_name: String,
    pub gender: String,
    pub locale: String,
}
