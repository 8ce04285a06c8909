//! Shared fixtures for the integration tests

#![allow(dead_code)]

use polars::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use salary_predictor::data::CHOICE_FIELDS;
use salary_predictor::export::ArtifactBundle;
use salary_predictor::inference::Predictor;
use salary_predictor::training::{ModelType, TrainEngine, TrainingConfig};

/// Category of row `i` for choice field `field`. Each field cycles at its
/// own stride so every option appears in any frame of 40+ rows.
fn category(field: usize, i: usize) -> &'static str {
    const STRIDES: [usize; 5] = [1, 2, 3, 5, 7];
    let options = CHOICE_FIELDS[field].options;
    options[(i / STRIDES[field]) % options.len()]
}

struct Numerics {
    years: Vec<f64>,
    certs: Vec<f64>,
    age: Vec<f64>,
    hours: Vec<f64>,
}

fn numerics(n: usize, seed: u64) -> Numerics {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut out = Numerics {
        years: Vec::with_capacity(n),
        certs: Vec::with_capacity(n),
        age: Vec::with_capacity(n),
        hours: Vec::with_capacity(n),
    };
    for _ in 0..n {
        let years = rng.gen_range(0..30) as f64;
        out.years.push(years);
        out.certs.push(rng.gen_range(0..6) as f64);
        out.age.push(22.0 + years + rng.gen_range(0..10) as f64);
        out.hours.push(rng.gen_range(30..61) as f64);
    }
    out
}

fn assemble(n: usize, nums: Numerics, salary: Vec<f64>) -> DataFrame {
    let col = |field: usize| -> Vec<&'static str> { (0..n).map(|i| category(field, i)).collect() };
    let ids: Vec<i64> = (0..n as i64).collect();

    df!(
        "ID" => ids,
        "Education_Level" => col(0),
        "Years_Experience" => nums.years,
        "Job_Title" => col(1),
        "Industry" => col(2),
        "Location" => col(3),
        "Company_Size" => col(4),
        "Certifications" => nums.certs,
        "Age" => nums.age,
        "Working_Hours" => nums.hours,
        "Salary" => salary
    )
    .unwrap()
}

/// Salary exactly linear in the numeric features; categories carry no signal
pub fn linear_frame(n: usize) -> DataFrame {
    let nums = numerics(n, 7);
    let salary = (0..n)
        .map(|i| {
            30_000.0 + 2_500.0 * nums.years[i] + 1_200.0 * nums.certs[i] + 100.0 * nums.age[i]
                + 150.0 * (nums.hours[i] - 40.0)
        })
        .collect();
    assemble(n, nums, salary)
}

/// Salary driven by experience, education and job title plus seeded noise
pub fn salary_frame(n: usize, seed: u64) -> DataFrame {
    let nums = numerics(n, seed);
    let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(1));
    let salary = (0..n)
        .map(|i| {
            let education = match category(0, i) {
                "PhD" => 25_000.0,
                "Masters" => 15_000.0,
                "Bachelors" => 8_000.0,
                _ => 0.0,
            };
            let job = match category(1, i) {
                "Manager" => 20_000.0,
                "Data Scientist" => 18_000.0,
                "Software Engineer" => 15_000.0,
                _ => 5_000.0,
            };
            35_000.0 + 2_800.0 * nums.years[i] + 1_000.0 * nums.certs[i] + education + job
                + rng.gen_range(-3_000.0..3_000.0)
        })
        .collect();
    assemble(n, nums, salary)
}

/// Linear and ridge only, so fixtures train quickly
pub fn fast_config() -> TrainingConfig {
    TrainingConfig::default()
        .with_candidates(vec![ModelType::LinearRegression, ModelType::RidgeRegression])
}

pub fn trained_bundle() -> ArtifactBundle {
    let df = salary_predictor::data::normalize_headers(&salary_frame(100, 42)).unwrap();
    let outcome = TrainEngine::new(fast_config()).unwrap().fit(&df).unwrap();
    ArtifactBundle::from_outcome(outcome).unwrap()
}

pub fn trained_predictor() -> Predictor {
    Predictor::new(trained_bundle())
}
