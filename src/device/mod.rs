//! Device presets and the acquisition chain.
//!
//! A device preset fixes the analog front end (band edges, notch, ADC bits,
//! input range) and the output sample rate. The chain applies, in order:
//! zero-phase band filtering, the optional mains notch, quantization with
//! hard clipping at the input range, anti-alias filtering plus decimation,
//! age calibration, and the final saturating conversion to microvolt
//! integers.

mod calibration;
mod filter;
mod noise;

pub use calibration::{apply as calibrate, lead_gain};
pub use filter::{decimate, filtfilt, Biquad, Filter, FirstOrder};
pub use noise::{inject as inject_noise, NoiseLevel, NoisePlan};

use std::collections::BTreeMap;

use crate::error::{KardiaError, Result};
use crate::types::{Hertz, LeadSet, Real, SIM_FS, UV_PER_MV};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Acquisition presets, from full-fidelity diagnostic mode to ambulatory
/// monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DeviceMode {
    /// Diagnostic bandwidth, 0.05-150 Hz at 500 Hz output.
    #[default]
    Diagnostic,
    /// Bedside monitor: narrow band, notch on.
    Monitor,
    /// Exercise/stress mode: raised high-pass corner against baseline sway.
    Exercise,
    /// Ambulatory (Holter) recorder: low rate, modest bandwidth.
    Holter,
    /// Research-grade high-resolution capture at the full internal rate.
    HighResolution,
}

/// Resolved front-end configuration of a preset.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeviceConfig {
    /// High-pass corner, Hz.
    pub highpass_hz: Hertz,
    /// Low-pass corner, Hz.
    pub lowpass_hz: Hertz,
    /// Whether the mains notch is in the chain.
    pub notch: bool,
    /// ADC resolution in bits.
    pub adc_bits: u32,
    /// Symmetric analog input range, mV.
    pub input_range_mv: Real,
    /// Output sample rate, Hz.
    pub output_fs: u32,
}

impl DeviceMode {
    /// Human-readable preset label carried into the record targets.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            DeviceMode::Diagnostic => "diagnostic",
            DeviceMode::Monitor => "monitor",
            DeviceMode::Exercise => "exercise",
            DeviceMode::Holter => "holter",
            DeviceMode::HighResolution => "high-resolution",
        }
    }

    /// The preset's front-end configuration.
    #[must_use]
    pub fn config(self) -> DeviceConfig {
        match self {
            DeviceMode::Diagnostic => DeviceConfig {
                highpass_hz: 0.05,
                lowpass_hz: 150.0,
                notch: false,
                adc_bits: 16,
                input_range_mv: 10.0,
                output_fs: 500,
            },
            DeviceMode::Monitor => DeviceConfig {
                highpass_hz: 0.5,
                lowpass_hz: 40.0,
                notch: true,
                adc_bits: 12,
                input_range_mv: 5.0,
                output_fs: 250,
            },
            DeviceMode::Exercise => DeviceConfig {
                highpass_hz: 0.67,
                lowpass_hz: 100.0,
                notch: true,
                adc_bits: 14,
                input_range_mv: 10.0,
                output_fs: 250,
            },
            DeviceMode::Holter => DeviceConfig {
                highpass_hz: 0.05,
                lowpass_hz: 60.0,
                notch: true,
                adc_bits: 12,
                input_range_mv: 5.0,
                output_fs: 125,
            },
            DeviceMode::HighResolution => DeviceConfig {
                highpass_hz: 0.05,
                lowpass_hz: 250.0,
                notch: false,
                adc_bits: 16,
                input_range_mv: 10.0,
                output_fs: 1000,
            },
        }
    }
}

/// The validated acquisition chain for one synthesis call.
pub struct AcquisitionChain {
    config: DeviceConfig,
    mains_hz: Hertz,
    decimation: usize,
}

impl AcquisitionChain {
    /// Validates the configuration. The output rate must be positive, no
    /// greater than the internal simulation rate, and divide it evenly.
    pub fn new(config: DeviceConfig, mains_hz: Hertz) -> Result<Self> {
        if config.output_fs == 0 {
            return Err(KardiaError::InvalidConfiguration(
                "output sample rate must be positive".to_string(),
            ));
        }
        if config.output_fs > SIM_FS {
            return Err(KardiaError::InvalidConfiguration(format!(
                "output rate {} Hz exceeds the internal simulation rate {} Hz",
                config.output_fs, SIM_FS
            )));
        }
        if SIM_FS % config.output_fs != 0 {
            return Err(KardiaError::InvalidConfiguration(format!(
                "output rate {} Hz must divide the simulation rate {} Hz",
                config.output_fs, SIM_FS
            )));
        }
        Ok(Self {
            config,
            mains_hz,
            decimation: (SIM_FS / config.output_fs) as usize,
        })
    }

    /// Output rate of the chain, Hz.
    #[must_use]
    pub fn output_fs(&self) -> u32 {
        self.config.output_fs
    }

    /// Runs the full chain and converts to microvolt integers.
    #[must_use]
    pub fn apply(&self, leads: &LeadSet, age: Real) -> BTreeMap<String, Vec<i16>> {
        let fs = f64::from(SIM_FS);
        let cfg = &self.config;

        // Very low corners behave better as first-order sections.
        let hp_biquad = (cfg.highpass_hz >= 0.5)
            .then(|| Biquad::highpass(fs, cfg.highpass_hz, Biquad::BUTTERWORTH_Q));
        let hp_first = (cfg.highpass_hz < 0.5).then(|| FirstOrder::highpass(fs, cfg.highpass_hz));
        let lp = Biquad::lowpass(fs, cfg.lowpass_hz, Biquad::BUTTERWORTH_Q);
        let notch = cfg.notch.then(|| Biquad::notch(fs, self.mains_hz, 30.0));
        let anti_alias = (self.decimation > 1).then(|| {
            Biquad::lowpass(
                fs,
                0.4 * f64::from(cfg.output_fs),
                Biquad::BUTTERWORTH_Q,
            )
        });

        let mut filtered = LeadSet::new();
        for (name, samples) in leads.iter() {
            let mut x = match (&hp_biquad, &hp_first) {
                (Some(hp), _) => filtfilt(hp, samples),
                (_, Some(hp)) => filtfilt(hp, samples),
                _ => samples.to_vec(),
            };
            x = filtfilt(&lp, &x);
            if let Some(n) = &notch {
                x = filtfilt(n, &x);
            }

            self.quantize(&mut x);

            if let Some(aa) = &anti_alias {
                x = filtfilt(aa, &x);
            }
            let expected = x.len() / self.decimation.max(1);
            let mut x = decimate(&x, self.decimation);
            x.truncate(expected.max(1).min(x.len()));

            filtered.insert(name, x);
        }

        calibrate(&mut filtered, age);

        filtered
            .iter()
            .map(|(name, samples)| {
                let out = samples
                    .iter()
                    .map(|&mv| {
                        let uv = (mv * UV_PER_MV).round();
                        // Saturate, never wrap.
                        uv.clamp(f64::from(i16::MIN), f64::from(i16::MAX)) as i16
                    })
                    .collect();
                (name.to_string(), out)
            })
            .collect()
    }

    /// Quantizes to the ADC's step size and clips at the input range.
    fn quantize(&self, samples: &mut [Real]) {
        let range = self.config.input_range_mv;
        let lsb = 2.0 * range / f64::from(1u32 << self.config.adc_bits.min(24));
        for v in samples.iter_mut() {
            let clipped = v.clamp(-range, range);
            *v = (clipped / lsb).round() * lsb;
        }
    }
}
