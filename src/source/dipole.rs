//! The parametric dipole source model.
//!
//! Each scheduled beat is decomposed into a small stack of 3-D pulses (P,
//! septal Q, dominant R, terminal S, T) whose directions derive from the
//! resolved electrical axes and whose shapes come from the basis toolkit.
//! Diagnosis modifiers superpose further pulses or redirect existing ones,
//! and every beat draws independent jitter. All contributions accumulate
//! additively onto one shared [`Vcg`].

use nalgebra::Vector3;
use smallvec::SmallVec;

use crate::params::{RhythmClass, Side};
use crate::source::{basis, SourceContext, SourceModel};
use crate::types::{sim_len, Millivolts, Real, Seconds, Vcg, SIM_FS};
use crate::utils::Random;

/// Pulse shape selector for one wave component.
#[derive(Debug, Clone, Copy)]
enum Shape {
    Gaussian { width: Seconds },
    Asym { rise: Seconds, decay: Seconds },
    Generalized { width: Seconds, power: Real },
    Hermite { width: Seconds, coeffs: [Real; 5] },
}

impl Shape {
    fn eval(self, t: Seconds, center: Seconds) -> Real {
        match self {
            Shape::Gaussian { width } => basis::gaussian(t, center, width),
            Shape::Asym { rise, decay } => basis::asym_gaussian(t, center, rise, decay),
            Shape::Generalized { width, power } => basis::gen_gaussian(t, center, width, power),
            Shape::Hermite { width, coeffs } => basis::hermite_sum(t, center, width, &coeffs),
        }
    }

    /// Half-width of the support window used when rasterizing.
    fn reach(self) -> Seconds {
        let w = match self {
            Shape::Gaussian { width } | Shape::Generalized { width, .. } => width,
            Shape::Asym { rise, decay } => rise.max(decay),
            Shape::Hermite { width, .. } => width,
        };
        6.0 * w
    }
}

/// One wave component: shape × amplitude × 3-D direction.
#[derive(Debug, Clone, Copy)]
struct Wave {
    center: Seconds,
    amplitude: Millivolts,
    direction: Vector3<Real>,
    shape: Shape,
}

/// Unit-ish direction in the body frame from a frontal-plane axis (degrees)
/// and an anterior (z) component.
fn axis_direction(axis_deg: Real, anterior: Real) -> Vector3<Real> {
    let rad = axis_deg.to_radians();
    Vector3::new(rad.cos(), rad.sin(), anterior).normalize()
}

/// Small random tilt applied to a wave direction.
fn perturb(dir: Vector3<Real>, sigma: Real, rng: &mut Random) -> Vector3<Real> {
    let jittered = Vector3::new(
        dir.x + rng.normal(0.0, sigma),
        dir.y + rng.normal(0.0, sigma),
        dir.z + rng.normal(0.0, sigma),
    );
    if jittered.norm() < 1e-6 {
        dir
    } else {
        jittered.normalize() * dir.norm()
    }
}

/// The default physiologically parameterized source model.
pub struct DipoleSource;

impl SourceModel for DipoleSource {
    fn render(&self, ctx: &SourceContext<'_>, rng: &mut Random) -> Vcg {
        let mut vcg = Vcg::zeros(sim_len(ctx.duration_s));

        for beat in &ctx.schedule.beats {
            let mut waves: SmallVec<[Wave; 10]> = SmallVec::new();

            // Amplitude jitter: baseline ±5 % plus a slow respiratory term.
            let resp = (std::f64::consts::TAU * ctx.schedule.respiratory_hz * beat.time()
                + ctx.schedule.respiratory_phase)
                .sin();
            let beat_gain = ctx.params.voltage_scale * rng.jitter(0.05) * (1.0 + 0.03 * resp);

            if beat.has_p && !ctx.morphology.suppress_p {
                self.push_p_wave(ctx, beat_gain, beat, &mut waves, rng);
            }
            if beat.has_qrs {
                self.push_ventricular_complex(ctx, beat_gain, beat, &mut waves, rng);
            }

            for w in &waves {
                rasterize(&mut vcg, w);
            }
        }

        if ctx.morphology.flutter_wave {
            self.add_flutter_waves(ctx, &mut vcg);
        }

        vcg
    }
}

impl DipoleSource {
    fn push_p_wave(
        &self,
        ctx: &SourceContext<'_>,
        beat_gain: Real,
        beat: &crate::types::BeatEvent,
        waves: &mut SmallVec<[Wave; 10]>,
        rng: &mut Random,
    ) {
        let Some(t_a) = beat.atrial_time else {
            return;
        };
        let onset_jitter = rng.normal(0.0, 0.003);

        // Ectopic atrial foci fire from a different site: shifted axis,
        // slightly peaked shape.
        let axis = if beat.is_ectopic_atrial {
            ctx.params.p_axis_deg - 40.0
        } else {
            ctx.params.p_axis_deg
        };

        waves.push(Wave {
            center: t_a + 0.045 + onset_jitter,
            amplitude: 0.16 * beat_gain,
            direction: perturb(axis_direction(axis, 0.12), 0.03, rng),
            shape: Shape::Asym {
                rise: 0.025,
                decay: 0.020,
            },
        });
    }

    #[allow(clippy::too_many_lines)]
    fn push_ventricular_complex(
        &self,
        ctx: &SourceContext<'_>,
        beat_gain: Real,
        beat: &crate::types::BeatEvent,
        waves: &mut SmallVec<[Wave; 10]>,
        rng: &mut Random,
    ) {
        let Some(t_v) = beat.ventricular_time else {
            return;
        };
        let p = ctx.params;
        let m = ctx.morphology;

        let ectopic = beat.is_ectopic_ventricular;
        let mut qrs = p.qrs_s * rng.jitter(0.05);
        let mut qrs_axis = p.qrs_axis_deg;
        let mut r_amp = 1.25;
        if ectopic {
            qrs = (qrs * 1.9).max(0.13);
            qrs_axis += if rng.chance(0.5) { 120.0 } else { -120.0 };
            r_amp *= 1.1;
        }
        let onset_jitter = rng.normal(0.0, 0.002);
        let t_r = t_v + onset_jitter;
        let qrs_onset = t_r - 0.40 * qrs;

        // Dominant R direction: frontal axis, posterior tilt with left
        // dominance, pulled anterior-rightward by infant RV dominance.
        let mut r_dir = axis_direction(qrs_axis, -0.5 * p.apical_depth);
        let rv_pull = Vector3::new(-0.55, 0.15, 0.80).normalize();
        r_dir = (r_dir + rv_pull * (0.55 * p.rv_dominance)).normalize();

        let left_bbb = m.bundle_branch == Some(Side::Left) && !ectopic;
        let right_bbb = m.bundle_branch == Some(Side::Right) && !ectopic;

        // Septal Q: early left-to-right anterior forces. LBBB reverses
        // septal activation, so the normal Q disappears.
        if !left_bbb && !ectopic {
            waves.push(Wave {
                center: t_r - 0.28 * qrs,
                amplitude: -0.14 * r_amp * beat_gain,
                direction: perturb(
                    axis_direction(qrs_axis + 155.0, p.septal_depth),
                    0.04,
                    rng,
                ),
                shape: Shape::Gaussian { width: qrs * 0.10 },
            });
        }

        // Pre-excitation delta wave: slurred upstroke ahead of the R.
        if m.delta_wave && !ectopic {
            waves.push(Wave {
                center: qrs_onset + 0.02,
                amplitude: 0.30 * r_amp * beat_gain,
                direction: r_dir,
                shape: Shape::Asym {
                    rise: 0.028,
                    decay: 0.012,
                },
            });
        }

        // Main R pulse. LBBB broadens and notches it.
        if left_bbb {
            waves.push(Wave {
                center: t_r,
                amplitude: r_amp * beat_gain,
                direction: perturb(
                    axis_direction(qrs_axis, -0.35),
                    0.03,
                    rng,
                ),
                shape: Shape::Hermite {
                    width: qrs * 0.24,
                    coeffs: [1.0, 0.0, -0.18, 0.0, 0.0],
                },
            });
        } else {
            waves.push(Wave {
                center: t_r,
                amplitude: r_amp * beat_gain,
                direction: perturb(r_dir, 0.03, rng),
                shape: Shape::Gaussian { width: qrs * 0.16 },
            });
        }

        // Terminal S: late forces opposite the dominant vector.
        waves.push(Wave {
            center: t_r + 0.26 * qrs,
            amplitude: -0.30 * r_amp * beat_gain,
            direction: perturb(axis_direction(qrs_axis - 170.0, 0.25), 0.04, rng),
            shape: Shape::Gaussian { width: qrs * 0.12 },
        });

        // RBBB: delayed rightward-anterior terminal deflection (R' in V1).
        if right_bbb {
            waves.push(Wave {
                center: t_r + 0.42 * qrs,
                amplitude: 0.55 * r_amp * beat_gain,
                direction: Vector3::new(-0.50, 0.10, 0.86).normalize(),
                shape: Shape::Asym {
                    rise: 0.018,
                    decay: 0.030,
                },
            });
        }

        // Occasional micro-notch inside the complex.
        if rng.chance(0.05) {
            let offset = rng.uniform_range(-0.15, 0.15) * qrs;
            waves.push(Wave {
                center: t_r + offset,
                amplitude: 0.06 * r_amp * beat_gain,
                direction: r_dir,
                shape: Shape::Hermite {
                    width: 0.008,
                    coeffs: [0.0, 0.0, 0.0, 0.4, 0.0],
                },
            });
        }

        self.push_t_wave(ctx, beat_gain, qrs_onset, qrs, r_dir, ectopic, waves, rng);

        // Pericarditis shelves ride on every conducted beat.
        if m.st_elevation_mv > 0.0 && !ectopic {
            let st_dir = Vector3::new(0.45, 0.45, 0.55).normalize();
            waves.push(Wave {
                center: t_r + 0.45 * qrs + 0.06,
                amplitude: m.st_elevation_mv * beat_gain,
                direction: st_dir,
                shape: Shape::Generalized {
                    width: 0.07,
                    power: 4.0,
                },
            });
        }
        if m.pr_depression_mv > 0.0 && beat.has_p {
            if let Some(t_a) = beat.atrial_time {
                waves.push(Wave {
                    center: (t_a + qrs_onset) / 2.0 + 0.02,
                    amplitude: -m.pr_depression_mv * beat_gain,
                    direction: Vector3::new(0.45, 0.45, 0.40).normalize(),
                    shape: Shape::Generalized {
                        width: 0.03,
                        power: 4.0,
                    },
                });
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn push_t_wave(
        &self,
        ctx: &SourceContext<'_>,
        beat_gain: Real,
        qrs_onset: Seconds,
        qrs: Seconds,
        r_dir: Vector3<Real>,
        ectopic: bool,
        waves: &mut SmallVec<[Wave; 10]>,
        rng: &mut Random,
    ) {
        let p = ctx.params;
        let qt = p.qt_s * rng.jitter(0.03);
        let t_center = qrs_onset + 0.78 * qt;
        let width = (qt - qrs).max(0.08) * 0.22;

        let (amplitude, direction) = if ectopic {
            // Discordant repolarization: reversed against the wide complex,
            // lower amplitude.
            (0.45 * beat_gain, -r_dir * 0.6)
        } else {
            // Juvenile pattern inverts the anterior component; diagnosis may
            // add further inversion weight.
            let anterior = 0.30 - 0.65 * p.juvenile_t;
            let mut dir = axis_direction(p.t_axis_deg, anterior);
            let w = ctx.morphology.t_inversion_weight;
            if w > 0.0 {
                dir *= 1.0 - 2.0 * w;
            }
            (0.38 * beat_gain, dir)
        };

        waves.push(Wave {
            center: t_center + rng.normal(0.0, 0.004),
            amplitude,
            direction: perturb(direction, 0.03, rng),
            shape: Shape::Generalized {
                width,
                power: 1.7,
            },
        });
    }

    /// Continuous flutter sawtooth, independent of the discrete beats.
    fn add_flutter_waves(&self, ctx: &SourceContext<'_>, vcg: &mut Vcg) {
        let RhythmClass::Flutter {
            atrial_rate_bpm, ..
        } = ctx.rhythm
        else {
            return;
        };
        let freq = atrial_rate_bpm / 60.0;
        // Inferior-lead negative sawtooth: direction opposes the normal P.
        let dir = -axis_direction(ctx.params.p_axis_deg, 0.10);
        let amp = 0.12 * ctx.params.voltage_scale;

        let dt = 1.0 / f64::from(SIM_FS);
        for i in 0..vcg.len() {
            let t = i as Real * dt;
            let v = amp * basis::sawtooth(t, freq, 0.72);
            vcg.accumulate(i, v * dir.x, v * dir.y, v * dir.z);
        }
    }
}

/// Adds one wave's samples onto the VCG over its support window.
fn rasterize(vcg: &mut Vcg, wave: &Wave) {
    let reach = wave.shape.reach();
    let fs = f64::from(SIM_FS);
    let first = ((wave.center - reach) * fs).floor().max(0.0) as usize;
    let last = (((wave.center + reach) * fs).ceil() as usize).min(vcg.len());

    for i in first..last {
        let t = i as Real / fs;
        let v = wave.amplitude * wave.shape.eval(t, wave.center);
        vcg.accumulate(
            i,
            v * wave.direction.x,
            v * wave.direction.y,
            v * wave.direction.z,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{resolve, resolve_diagnosis};
    use crate::rhythm::schedule;
    use crate::utils::{Random, Stage};

    fn render(dx_key: &str, age: f64, seed: u64) -> (Vcg, crate::rhythm::Schedule) {
        let params = resolve(age, None, dx_key, seed);
        let dx = resolve_diagnosis(dx_key);
        let mut rhythm_rng = Random::for_stage(seed, Stage::Rhythm);
        let sched = schedule(&params, dx, 10.0, &mut rhythm_rng);

        let ctx = SourceContext {
            schedule: &sched,
            params: &params,
            morphology: &dx.morphology,
            rhythm: dx.rhythm,
            duration_s: 10.0,
        };
        let mut source_rng = Random::for_stage(seed, Stage::Source);
        (DipoleSource.render(&ctx, &mut source_rng), sched)
    }

    fn peak_magnitude(vcg: &Vcg) -> f64 {
        (0..vcg.len())
            .map(|i| (vcg.x[i].powi(2) + vcg.y[i].powi(2) + vcg.z[i].powi(2)).sqrt())
            .fold(0.0, f64::max)
    }

    #[test]
    fn test_render_is_deterministic() {
        let (a, _) = render("Normal sinus", 8.0, 12345);
        let (b, _) = render("Normal sinus", 8.0, 12345);
        assert_eq!(a, b);
    }

    #[test]
    fn test_render_length_and_amplitude() {
        let (vcg, _) = render("Normal sinus", 8.0, 42);
        assert_eq!(vcg.len(), 10_000);
        let peak = peak_magnitude(&vcg);
        assert!(peak > 0.4 && peak < 6.0, "peak dipole {peak} mV");
    }

    #[test]
    fn test_signal_energy_concentrated_at_beats() {
        let (vcg, sched) = render("Normal sinus", 8.0, 7);
        // The sample at a ventricular event should dwarf the quietest point.
        let beat = sched.beats[2].ventricular_time.unwrap();
        let idx = crate::types::sim_index(beat);
        let at_beat = (vcg.x[idx].powi(2) + vcg.y[idx].powi(2) + vcg.z[idx].powi(2)).sqrt();
        assert!(at_beat > 0.3, "dipole at R peak was {at_beat}");
    }

    #[test]
    fn test_lvh_scales_amplitude() {
        let (normal, _) = render("Normal sinus", 12.0, 11);
        let (lvh, _) = render("LVH", 12.0, 11);
        assert!(peak_magnitude(&lvh) > peak_magnitude(&normal) * 1.2);
    }

    #[test]
    fn test_flutter_baseline_never_rests() {
        let (vcg, sched) = render("Atrial flutter", 8.0, 5);
        // Between ventricular beats the sawtooth keeps the baseline moving.
        let t0 = sched.beats[0].time();
        let t1 = sched.beats[1].time();
        let mid = crate::types::sim_index((t0 + t1) / 2.0);
        let window = &vcg.y[mid.saturating_sub(40)..mid + 40];
        let spread = window.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b))
            - window.iter().fold(f64::INFINITY, |a, &b| a.min(b));
        assert!(spread > 0.02, "flutter baseline spread {spread}");
    }

    #[test]
    fn test_axis_direction_normalized() {
        for deg in [-120.0, -30.0, 0.0, 60.0, 150.0] {
            let d = axis_direction(deg, 0.3);
            assert!((d.norm() - 1.0).abs() < 1e-9);
        }
    }
}
