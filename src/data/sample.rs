//! Synthetic student dataset generation.
//!
//! Each record draws its inputs from independent distributions and derives the
//! final CGPA label from a fixed formula:
//!
//! ```text
//! G3 = round2(clamp(0.4*G1 + 0.6*G2 + bonus - penalty + noise, 0, 5))
//! ```
//!
//! where `bonus` rewards study time, health, extracurriculars and further-study
//! intent, `penalty` charges carryovers, absences and going out, and
//! `noise ~ N(0, 0.15)`.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{CGPA_MAX, CGPA_MIN, GenerateConfig, StudentInputs, StudentRecord};
use crate::error::AppError;

/// Standard deviation of the "life happens" noise term.
pub const NOISE_SIGMA: f64 = 0.15;

/// Weight of the year-1 CGPA in the base score.
const W_G1: f64 = 0.4;
/// Weight of the year-2 CGPA in the base score (the more recent period).
const W_G2: f64 = 0.6;

/// Carryover count distribution: `P(0), P(1), P(2), P(3)`.
const FAILURE_PROBS: [f64; 4] = [0.85, 0.10, 0.04, 0.01];

/// Generate `config.count` records deterministically from `config.seed`.
pub fn generate_students(config: &GenerateConfig) -> Result<Vec<StudentRecord>, AppError> {
    if config.count == 0 {
        return Err(AppError::new(2, "Record count must be > 0."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let normal = Normal::new(0.0, NOISE_SIGMA)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let mut records = Vec::with_capacity(config.count);
    for _ in 0..config.count {
        let (inputs, noise) = draw_student(&mut rng, &normal);
        records.push(StudentRecord {
            inputs,
            g3: final_grade(&inputs, noise),
        });
    }

    Ok(records)
}

/// Weighted blend of the two prior-period GPAs.
pub fn base_score(inputs: &StudentInputs) -> f64 {
    W_G1 * inputs.g1 + W_G2 * inputs.g2
}

/// Positive adjustments: +0.15 per study level, +0.05 per health level,
/// +0.1 for extracurriculars, +0.2 for a masters plan.
pub fn bonus(inputs: &StudentInputs) -> f64 {
    0.15 * f64::from(inputs.studytime)
        + 0.05 * f64::from(inputs.health)
        + if inputs.activities { 0.1 } else { 0.0 }
        + if inputs.higher { 0.2 } else { 0.0 }
}

/// Negative adjustments: -0.4 per carryover, -0.02 per absence, -0.08 per outing level.
pub fn penalty(inputs: &StudentInputs) -> f64 {
    0.4 * f64::from(inputs.failures)
        + 0.02 * f64::from(inputs.absences)
        + 0.08 * f64::from(inputs.goout)
}

/// Label formula for one record given its noise draw.
pub fn final_grade(inputs: &StudentInputs, noise: f64) -> f64 {
    let raw = base_score(inputs) + bonus(inputs) - penalty(inputs) + noise;
    round2(raw.clamp(CGPA_MIN, CGPA_MAX))
}

fn draw_student(rng: &mut StdRng, normal: &Normal<f64>) -> (StudentInputs, f64) {
    let inputs = StudentInputs {
        g1: round2(rng.gen_range(1.0..5.0)),
        g2: round2(rng.gen_range(1.0..5.0)),
        failures: sample_failures(rng),
        absences: rng.gen_range(0..20),
        studytime: rng.gen_range(1..=4),
        health: rng.gen_range(1..=5),
        goout: rng.gen_range(1..=5),
        higher: rng.gen_bool(0.5),
        activities: rng.gen_bool(0.5),
    };
    let noise = normal.sample(rng);
    (inputs, noise)
}

fn sample_failures(rng: &mut StdRng) -> u32 {
    let roll: f64 = rng.r#gen();
    let mut acc = 0.0;
    for (count, p) in FAILURE_PROBS.iter().enumerate() {
        acc += p;
        if roll < acc {
            return count as u32;
        }
    }
    (FAILURE_PROBS.len() - 1) as u32
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
