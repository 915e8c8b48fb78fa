//! Search parameters: radius, per-request result limit, and the radius bands
//! the batch search walks through.
//!
//! The nearby-search endpoint caps how many places a single request returns,
//! so a search over `[0, radius]` is split into [`BAND_COUNT`] concentric
//! rings and each ring is queried separately.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Number of radius bands per search. Fixed regardless of radius.
pub const BAND_COUNT: u32 = 5;

/// Search radius in kilometers, within `0.0..=Radius::MAX_KM`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Radius(f64);

impl Radius {
    pub const MAX_KM: f64 = 10.0;

    /// # Errors
    ///
    /// Returns [`CoreError::InvalidRadius`] for negative, non-finite, or
    /// greater-than-[`Radius::MAX_KM`] values.
    pub fn from_km(km: f64) -> Result<Self, CoreError> {
        if km.is_finite() && (0.0..=Self::MAX_KM).contains(&km) {
            Ok(Self(km))
        } else {
            Err(CoreError::InvalidRadius {
                value: km,
                max: Self::MAX_KM,
            })
        }
    }

    pub fn km(self) -> f64 {
        self.0
    }

    /// Whole meters, the unit the nearby-search endpoint expects.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn meters(self) -> u32 {
        // Bounded by MAX_KM, so the rounded value always fits.
        (self.0 * 1000.0).round() as u32
    }
}

impl TryFrom<f64> for Radius {
    type Error = CoreError;

    fn try_from(km: f64) -> Result<Self, Self::Error> {
        Self::from_km(km)
    }
}

impl From<Radius> for f64 {
    fn from(radius: Radius) -> Self {
        radius.0
    }
}

impl fmt::Display for Radius {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} km", self.0)
    }
}

/// Per-request result limit. Only 20, 40, and 60 are accepted upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum ResultLimit {
    #[default]
    Twenty,
    Forty,
    Sixty,
}

impl ResultLimit {
    pub const ALLOWED: [u32; 3] = [20, 40, 60];

    pub fn value(self) -> u32 {
        match self {
            ResultLimit::Twenty => 20,
            ResultLimit::Forty => 40,
            ResultLimit::Sixty => 60,
        }
    }
}

impl TryFrom<u32> for ResultLimit {
    type Error = CoreError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            20 => Ok(ResultLimit::Twenty),
            40 => Ok(ResultLimit::Forty),
            60 => Ok(ResultLimit::Sixty),
            other => Err(CoreError::InvalidResultLimit(other)),
        }
    }
}

impl From<ResultLimit> for u32 {
    fn from(limit: ResultLimit) -> Self {
        limit.value()
    }
}

/// Half-open distance interval `[start_m, end_m)` in meters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RadiusBand {
    /// Zero-based band position.
    pub index: u32,
    pub start_m: u32,
    pub end_m: u32,
}

impl RadiusBand {
    pub fn width_m(self) -> u32 {
        self.end_m - self.start_m
    }
}

/// Split `[0, radius]` into [`BAND_COUNT`] contiguous equal-width bands.
///
/// Edges are computed in integer meters and the final edge is pinned to the
/// full radius, so the bands always tile the range exactly. A zero radius
/// yields [`BAND_COUNT`] zero-width bands.
pub fn partition_bands(radius: Radius) -> Vec<RadiusBand> {
    let total = radius.meters();
    let edge = |i: u32| -> u32 {
        if i >= BAND_COUNT {
            total
        } else {
            total * i / BAND_COUNT
        }
    };

    (0..BAND_COUNT)
        .map(|index| RadiusBand {
            index,
            start_m: edge(index),
            end_m: edge(index + 1),
        })
        .collect()
}
