//! Brightness temperature to radiance conversion for AVHRR infrared channels.

use atrain_common::{Channel, Platform};
use serde::{Deserialize, Serialize};

/// First radiation constant c1 in mW m⁻² sr⁻¹ (cm⁻¹)⁻⁴.
pub const C1: f64 = 1.1910427e-5;

/// Second radiation constant c2 in K cm.
pub const C2: f64 = 1.4387752;

/// Central wavenumbers (cm⁻¹) of the three infrared channels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CentralWavenumbers {
    pub ch3b: f64,
    pub ch4: f64,
    pub ch5: f64,
}

impl CentralWavenumbers {
    pub fn for_channel(&self, channel: Channel) -> f64 {
        match channel {
            Channel::Ch3B => self.ch3b,
            Channel::Ch4 => self.ch4,
            Channel::Ch5 => self.ch5,
        }
    }
}

/// Converts brightness temperatures to channel radiances.
///
/// Implementations must be pure: the emissivity batch calls them from
/// several threads.
pub trait RadianceConverter: Send + Sync {
    /// Central wavenumbers of the platform's channels, valid around
    /// `reference_temperature` (K).
    fn central_wavenumbers(
        &self,
        platform: Platform,
        reference_temperature: f64,
    ) -> CentralWavenumbers;

    /// Radiance (mW m⁻² sr⁻¹ (cm⁻¹)⁻¹) of a brightness temperature (K).
    fn radiance(
        &self,
        wavenumbers: &CentralWavenumbers,
        temperature: f64,
        platform: Platform,
        channel: Channel,
    ) -> f64;
}

/// Band correction `T* = a + b * T` around a central wavenumber.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandCoefficients {
    pub wavenumber: f64,
    pub a: f64,
    pub b: f64,
}

const fn band(wavenumber: f64, a: f64, b: f64) -> BandCoefficients {
    BandCoefficients { wavenumber, a, b }
}

/// Planck radiance with the AVHRR/3 (NOAA KLM) band correction.
///
/// The coefficients follow the published NOAA KLM user's guide tables for
/// the scene temperature range. They are approximate for NOAA-19 and Metop-A.
#[derive(Debug, Clone, Copy, Default)]
pub struct KlmPlanck;

impl KlmPlanck {
    pub fn new() -> Self {
        Self
    }

    /// Coefficients for channels 3B, 4 and 5, in that order.
    pub fn coefficients(platform: Platform) -> [BandCoefficients; 3] {
        match platform {
            Platform::Noaa17 => [
                band(2669.3554, 1.702380, 0.997378),
                band(926.2947, 0.271683, 0.998794),
                band(839.8246, 0.309180, 0.999012),
            ],
            Platform::Noaa18 => [
                band(2659.7952, 1.698704, 0.996960),
                band(928.1460, 0.436645, 0.998607),
                band(833.2532, 0.253179, 0.999057),
            ],
            Platform::Noaa19 => [
                band(2670.0, 1.67396, 0.997364),
                band(928.9, 0.53959, 0.998534),
                band(831.9, 0.36064, 0.998913),
            ],
            Platform::MetopA => [
                band(2687.0, 2.06699, 0.996577),
                band(927.2, 0.55126, 0.998509),
                band(837.7, 0.34716, 0.998947),
            ],
        }
    }

    fn channel_coefficients(platform: Platform, channel: Channel) -> BandCoefficients {
        let [ch3b, ch4, ch5] = Self::coefficients(platform);
        match channel {
            Channel::Ch3B => ch3b,
            Channel::Ch4 => ch4,
            Channel::Ch5 => ch5,
        }
    }
}

/// Planck radiance at `wavenumber` (cm⁻¹) for temperature `t` (K).
#[inline]
pub fn planck(wavenumber: f64, t: f64) -> f64 {
    if t <= 0.0 {
        return 0.0;
    }
    C1 * wavenumber.powi(3) / ((C2 * wavenumber / t).exp() - 1.0)
}

impl RadianceConverter for KlmPlanck {
    // One central wavenumber per channel covers the whole scene range in the
    // KLM tables, so the reference temperature does not select anything here.
    fn central_wavenumbers(
        &self,
        platform: Platform,
        _reference_temperature: f64,
    ) -> CentralWavenumbers {
        let [ch3b, ch4, ch5] = Self::coefficients(platform);
        CentralWavenumbers {
            ch3b: ch3b.wavenumber,
            ch4: ch4.wavenumber,
            ch5: ch5.wavenumber,
        }
    }

    fn radiance(
        &self,
        wavenumbers: &CentralWavenumbers,
        temperature: f64,
        platform: Platform,
        channel: Channel,
    ) -> f64 {
        if temperature <= 0.0 {
            return 0.0;
        }
        let coeffs = Self::channel_coefficients(platform, channel);
        let effective = coeffs.a + coeffs.b * temperature;
        planck(wavenumbers.for_channel(channel), effective)
    }
}
