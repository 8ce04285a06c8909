use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use polars::prelude::*;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use salary_predictor::data::CHOICE_FIELDS;
use salary_predictor::export::ArtifactBundle;
use salary_predictor::inference::Predictor;
use salary_predictor::training::{ModelType, TrainEngine, TrainingConfig};

fn create_salary_data(n_rows: usize, seed: u64) -> DataFrame {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let mut categorical: Vec<Vec<&'static str>> = vec![Vec::with_capacity(n_rows); 5];
    let mut years = Vec::with_capacity(n_rows);
    let mut certs = Vec::with_capacity(n_rows);
    let mut age = Vec::with_capacity(n_rows);
    let mut hours = Vec::with_capacity(n_rows);
    let mut salary = Vec::with_capacity(n_rows);

    for _ in 0..n_rows {
        let mut bonus = 0.0;
        for (field, column) in CHOICE_FIELDS.iter().zip(categorical.iter_mut()) {
            let idx = rng.gen_range(0..field.options.len());
            bonus += idx as f64 * 4_000.0;
            column.push(field.options[idx]);
        }
        let y = rng.gen_range(0..30) as f64;
        let c = rng.gen_range(0..6) as f64;
        years.push(y);
        certs.push(c);
        age.push(22.0 + y + rng.gen_range(0..10) as f64);
        hours.push(rng.gen_range(30..61) as f64);
        salary.push(35_000.0 + 2_800.0 * y + 1_000.0 * c + bonus + rng.gen::<f64>() * 5_000.0);
    }

    df!(
        "education_level" => &categorical[0],
        "years_experience" => years,
        "job_title" => &categorical[1],
        "industry" => &categorical[2],
        "location" => &categorical[3],
        "company_size" => &categorical[4],
        "certifications" => certs,
        "age" => age,
        "working_hours" => hours,
        "salary" => salary
    )
    .unwrap()
}

fn bench_training(c: &mut Criterion) {
    let mut group = c.benchmark_group("training");
    group.sample_size(10);

    for n_rows in [1000, 5000].iter() {
        let df = create_salary_data(*n_rows, 42);

        group.bench_with_input(BenchmarkId::new("linear_models", n_rows), &df, |b, df| {
            let config = TrainingConfig::default()
                .with_candidates(vec![ModelType::LinearRegression, ModelType::RidgeRegression]);
            let engine = TrainEngine::new(config).unwrap();
            b.iter(|| engine.fit(black_box(df)).unwrap())
        });

        group.bench_with_input(BenchmarkId::new("all_candidates", n_rows), &df, |b, df| {
            let engine = TrainEngine::new(TrainingConfig::default().with_n_estimators(20)).unwrap();
            b.iter(|| engine.fit(black_box(df)).unwrap())
        });
    }

    group.finish();
}

fn bench_prediction(c: &mut Criterion) {
    let mut group = c.benchmark_group("prediction");

    let train_df = create_salary_data(5000, 7);
    let engine = TrainEngine::new(TrainingConfig::default().with_n_estimators(20)).unwrap();
    let outcome = engine.fit(&train_df).unwrap();
    let predictor = Predictor::new(ArtifactBundle::from_outcome(outcome).unwrap());

    for n_rows in [100, 1000, 10000].iter() {
        let mut test_df = create_salary_data(*n_rows, 99);
        let _ = test_df.drop_in_place("salary").unwrap();

        group.bench_with_input(BenchmarkId::new("predict_table", n_rows), &test_df, |b, df| {
            b.iter(|| predictor.predict_table(black_box(df)).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_training, bench_prediction);
criterion_main!(benches);
