//! Template-bank source model.
//!
//! A simpler alternative to the dipole model: each beat is stamped from one
//! of a small bank of fixed beat templates, scaled to the resolved timing
//! parameters. Template selection avoids immediate repeats through a
//! recently-used ring that lives for exactly one render call: selection
//! state is created here, threaded explicitly, and dropped with the call.

use nalgebra::Vector3;

use crate::source::{basis, SourceContext, SourceModel};
use crate::types::{sim_len, Real, Seconds, Vcg, SIM_FS};
use crate::utils::Random;

/// Nominal QRS duration the template offsets are authored against, seconds.
const NOMINAL_QRS_S: Seconds = 0.08;

/// Nominal QT the repolarization offsets are authored against, seconds.
const NOMINAL_QT_S: Seconds = 0.40;

/// Offsets/widths below this bound (in authored seconds relative to the R
/// peak) scale with the QRS; later waves scale with the QT.
const QRS_WINDOW_S: Seconds = 0.10;

/// A complete beat template: `(offset_s, width_s, amplitude_mv, direction)`
/// authored at nominal adult timing.
struct BeatTemplate {
    waves: &'static [(Real, Real, Real, [Real; 3])],
}

/// Bank of beat variants; slight shape differences keep long strips from
/// looking rubber-stamped.
static BANK: &[BeatTemplate] = &[
    BeatTemplate {
        waves: &[
            (-0.022, 0.010, -0.14, [-0.85, -0.20, 0.30]),
            (0.0, 0.014, 1.20, [0.48, 0.82, -0.15]),
            (0.024, 0.011, -0.32, [-0.70, -0.35, 0.35]),
            (0.30, 0.075, 0.36, [0.60, 0.70, 0.20]),
        ],
    },
    BeatTemplate {
        waves: &[
            (-0.020, 0.009, -0.11, [-0.80, -0.25, 0.35]),
            (0.0, 0.016, 1.10, [0.52, 0.78, -0.20]),
            (0.026, 0.012, -0.26, [-0.65, -0.40, 0.30]),
            (0.29, 0.082, 0.40, [0.55, 0.75, 0.15]),
        ],
    },
    BeatTemplate {
        waves: &[
            (-0.024, 0.011, -0.16, [-0.88, -0.15, 0.25]),
            (0.0, 0.013, 1.30, [0.45, 0.85, -0.10]),
            (0.022, 0.010, -0.36, [-0.72, -0.30, 0.40]),
            (0.31, 0.070, 0.33, [0.62, 0.68, 0.22]),
        ],
    },
];

/// Per-render template selection state.
struct Selection {
    recently_used: [usize; 2],
    cursor: usize,
}

impl Selection {
    fn new() -> Self {
        Self {
            recently_used: [usize::MAX; 2],
            cursor: 0,
        }
    }

    /// Picks a template index, avoiding the two most recent picks when the
    /// bank allows it.
    fn pick(&mut self, rng: &mut Random) -> usize {
        let fresh: Vec<usize> =
            (0..BANK.len()).filter(|i| !self.recently_used.contains(i)).collect();
        let choice = if fresh.is_empty() {
            rng.index(BANK.len())
        } else {
            fresh[rng.index(fresh.len())]
        };
        self.remember(choice);
        choice
    }

    fn remember(&mut self, idx: usize) {
        self.recently_used[self.cursor] = idx;
        self.cursor = (self.cursor + 1) % self.recently_used.len();
    }
}

/// The template-bank source model.
pub struct TemplateSource;

impl SourceModel for TemplateSource {
    fn render(&self, ctx: &SourceContext<'_>, rng: &mut Random) -> Vcg {
        let mut vcg = Vcg::zeros(sim_len(ctx.duration_s));
        let mut selection = Selection::new();

        for beat in &ctx.schedule.beats {
            let gain = ctx.params.voltage_scale * rng.jitter(0.04);

            if beat.has_p && !ctx.morphology.suppress_p {
                if let Some(t_a) = beat.atrial_time {
                    stamp_p(&mut vcg, ctx, t_a, gain);
                }
            }

            if beat.has_qrs {
                if let Some(t_v) = beat.ventricular_time {
                    let template = &BANK[selection.pick(rng)];
                    stamp_template(
                        &mut vcg,
                        ctx,
                        template,
                        t_v,
                        gain,
                        beat.is_ectopic_ventricular,
                    );
                }
            }
        }

        vcg
    }
}

fn stamp_p(vcg: &mut Vcg, ctx: &SourceContext<'_>, t_a: Seconds, gain: Real) {
    let rad = ctx.params.p_axis_deg.to_radians();
    let dir = Vector3::new(rad.cos(), rad.sin(), 0.12).normalize();
    add_gaussian(vcg, t_a + 0.045, 0.022, 0.15 * gain, &dir);
}

fn stamp_template(
    vcg: &mut Vcg,
    ctx: &SourceContext<'_>,
    template: &BeatTemplate,
    t_v: Seconds,
    gain: Real,
    ectopic: bool,
) {
    let stretch = if ectopic { 1.8 } else { 1.0 };
    let qrs_scale = ctx.params.qrs_s * stretch / NOMINAL_QRS_S;
    let qt_scale = ctx.params.qt_s / NOMINAL_QT_S;

    for &(offset_s, width_s, amplitude, d) in template.waves {
        let in_qrs = offset_s.abs() < QRS_WINDOW_S;
        let scale = if in_qrs { qrs_scale } else { qt_scale };
        let center = t_v + offset_s * scale;
        let width = (width_s * scale).max(0.006);

        let mut amp = amplitude * gain;
        let mut dir = Vector3::new(d[0], d[1], d[2]).normalize();
        if ectopic && !in_qrs {
            amp *= 0.6;
            dir = -dir;
        }
        add_gaussian(vcg, center, width, amp, &dir);
    }
}

fn add_gaussian(vcg: &mut Vcg, center: Seconds, width: Seconds, amp: Real, dir: &Vector3<Real>) {
    let fs = f64::from(SIM_FS);
    let reach = 6.0 * width;
    let first = ((center - reach) * fs).floor().max(0.0) as usize;
    let last = (((center + reach) * fs).ceil() as usize).min(vcg.len());
    for i in first..last {
        let t = i as Real / fs;
        let v = amp * basis::gaussian(t, center, width);
        vcg.accumulate(i, v * dir.x, v * dir.y, v * dir.z);
    }
}
