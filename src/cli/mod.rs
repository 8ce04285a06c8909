//! Salary Predictor CLI
//!
//! Training, one-off predictions, the web server and the interactive
//! terminal mode.

use clap::{Args, Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::app::{NavEvent, Page, CONTACT_EMAIL, DEVELOPER, FEEDBACK_TEXT, HOME_INTRO};
use crate::data::{
    load_csv, write_csv, EmployeeRecord, CHOICE_FIELDS, NUMERIC_FIELDS, SAMPLE_CSV,
    SAMPLE_FILE_NAME,
};
use crate::export::{ArtifactBundle, ENCODERS_FILE_NAME, MODEL_FILE_NAME};
use crate::inference::{format_currency, Predictor, PREDICTIONS_FILE_NAME};
use crate::preprocessing::{CleaningConfig, ImputeStrategy};
use crate::training::{ModelType, TrainEngine, TrainingConfig, TrainingReport};

// ─── Styling helpers ───────────────────────────────────────────────────────────

const W: usize = 58; // box inner width

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn line_box_top()    { println!("  {}", dim("┌─────────────────────────────────────────────────────────┐")); }
fn line_box_bottom() { println!("  {}", dim("└─────────────────────────────────────────────────────────┘")); }
fn line_box_sep()    { println!("  {}", dim("├─────────────────────────────────────────────────────────┤")); }

fn line_box(content: &str) {
    let visible_len = strip_ansi(content).chars().count();
    let pad = W.saturating_sub(visible_len);
    println!("  {}  {}{} {}", dim("│"), content, " ".repeat(pad), dim("│"));
}

fn line_box_center(content: &str) {
    let visible_len = strip_ansi(content).chars().count();
    let total_pad = W.saturating_sub(visible_len);
    let left = total_pad / 2;
    let right = total_pad - left;
    println!("  {}  {}{}{} {}", dim("│"), " ".repeat(left), content, " ".repeat(right), dim("│"));
}

fn line_box_empty() { line_box(""); }

fn strip_ansi(s: &str) -> String {
    let mut out = String::new();
    let mut in_escape = false;
    for c in s.chars() {
        if c == '\x1b' { in_escape = true; continue; }
        if in_escape { if c == 'm' { in_escape = false; } continue; }
        out.push(c);
    }
    out
}

fn kv(key: &str, val: &str) -> String {
    format!("{} {}", muted(key), val.white())
}

fn step_ok(msg: &str) {
    println!("  {} {}", ok("✓"), msg);
}

fn step_err(msg: &str) {
    println!("  {} {}", "✗".red(), msg.red());
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "salary")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Train salary regression models and serve predictions")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub artifacts: ArtifactArgs,
}

/// Where the saved model and encoders live
#[derive(Args, Debug, Clone)]
pub struct ArtifactArgs {
    /// Model artifact
    #[arg(long = "model", global = true, env = "MODEL_PATH", default_value = MODEL_FILE_NAME)]
    pub model_path: PathBuf,

    /// Encoder artifact
    #[arg(long = "encoders", global = true, env = "ENCODERS_PATH", default_value = ENCODERS_FILE_NAME)]
    pub encoders_path: PathBuf,
}

impl ArtifactArgs {
    pub fn load(&self) -> anyhow::Result<Predictor> {
        step_run("Loading model");
        let start = Instant::now();
        let predictor = Predictor::load(&self.model_path, &self.encoders_path)?;
        step_done(&format!("{} in {:?}", predictor.model_name(), start.elapsed()));
        Ok(predictor)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Train every candidate model and save the best one
    Train {
        /// Training data (CSV with a salary column)
        #[arg(short, long)]
        data: PathBuf,

        /// Directory for best_model.bin and label_encoders.bin
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Seed for the split and the seeded models
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Fraction of rows held out for evaluation
        #[arg(long, default_value = "0.2")]
        test_size: f64,

        #[command(flatten)]
        impute: ImputeArgs,

        /// Restrict the candidates (comma separated, e.g. linear,xgboost)
        #[arg(long, value_delimiter = ',')]
        models: Vec<ModelType>,
    },

    /// Predict salaries for every row of a CSV file
    Predict {
        /// Input CSV
        #[arg(short, long)]
        data: PathBuf,

        /// Output CSV
        #[arg(short, long, default_value = PREDICTIONS_FILE_NAME)]
        output: PathBuf,

        #[command(flatten)]
        impute: ImputeArgs,
    },

    /// Predict the salary of a single employee
    Estimate(EstimateArgs),

    /// Write the sample input CSV
    Sample {
        #[arg(short, long, default_value = SAMPLE_FILE_NAME)]
        output: PathBuf,
    },

    /// Start the web server
    Serve {
        /// Server port
        #[arg(short, long, env = "API_PORT", default_value = "8080")]
        port: u16,

        /// Server host
        #[arg(long, env = "API_HOST", default_value = "0.0.0.0")]
        host: String,

        #[command(flatten)]
        impute: ImputeArgs,
    },
}

/// Missing-value policy flags shared by training and prediction
#[derive(Args, Debug, Clone)]
pub struct ImputeArgs {
    /// Missing numeric values: mean, mode, error or constant=<value>
    #[arg(long, default_value = "mean")]
    pub numeric_impute: ImputeStrategy,

    /// Missing categorical values: mode, error or constant=<value>
    #[arg(long, default_value = "mode")]
    pub categorical_impute: ImputeStrategy,
}

impl ImputeArgs {
    pub fn cleaning(&self) -> CleaningConfig {
        CleaningConfig::default()
            .with_numeric(self.numeric_impute.clone())
            .with_categorical(self.categorical_impute.clone())
    }
}

#[derive(Args, Debug, Clone)]
pub struct EstimateArgs {
    #[arg(long, default_value = "Bachelors")]
    pub education_level: String,
    #[arg(long, default_value = "3")]
    pub years_experience: f64,
    #[arg(long, default_value = "Data Scientist")]
    pub job_title: String,
    #[arg(long, default_value = "IT")]
    pub industry: String,
    #[arg(long, default_value = "New York")]
    pub location: String,
    #[arg(long, default_value = "Medium")]
    pub company_size: String,
    #[arg(long, default_value = "0")]
    pub certifications: f64,
    #[arg(long, default_value = "30")]
    pub age: f64,
    #[arg(long, default_value = "40")]
    pub working_hours: f64,
}

impl From<EstimateArgs> for EmployeeRecord {
    fn from(args: EstimateArgs) -> Self {
        Self {
            education_level: args.education_level,
            years_experience: args.years_experience,
            job_title: args.job_title,
            industry: args.industry,
            location: args.location,
            company_size: args.company_size,
            certifications: args.certifications,
            age: args.age,
            working_hours: args.working_hours,
        }
    }
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_train(
    data_path: &Path,
    output_dir: &Path,
    seed: u64,
    test_size: f64,
    impute: &ImputeArgs,
    models: Vec<ModelType>,
) -> anyhow::Result<()> {
    section("Train");

    step_run("Loading data");
    let start = Instant::now();
    let df = load_csv(data_path)?;
    step_done(&format!("{} rows × {} cols in {:?}", df.height(), df.width(), start.elapsed()));

    let mut config = TrainingConfig::new()
        .with_random_state(seed)
        .with_test_size(test_size)
        .with_cleaning(impute.cleaning());
    if !models.is_empty() {
        config = config.with_candidates(models);
    }

    step_run(&format!("Training {} candidates", config.candidates.len()));
    let start = Instant::now();
    let outcome = TrainEngine::new(config)?.fit(&df)?;
    step_done(&format!("{:?}", start.elapsed()));

    print_report(&outcome.report);

    let bundle = ArtifactBundle::from_outcome(outcome)?;
    let (model_path, encoders_path) = bundle.save_to_dir(output_dir)?;
    step_ok(&format!("Saved {}", model_path.display()));
    step_ok(&format!("Saved {}", encoders_path.display()));
    println!();

    Ok(())
}

fn print_report(report: &TrainingReport) {
    println!();
    println!(
        "  {:<20} {:>12} {:>12} {:>8} {:>9}",
        muted("Model"), muted("MAE"), muted("RMSE"), muted("R²"), muted("Time")
    );
    println!("  {}", dim(&"─".repeat(65)));

    for candidate in &report.candidates {
        match (&candidate.metrics, &candidate.error) {
            (Some(m), _) => println!(
                "  {:<20} {:>12.2} {:>12.2} {:>8.4} {:>8.2}s",
                candidate.model_type.name(),
                m.mae,
                m.rmse,
                m.r2,
                candidate.training_time_secs
            ),
            (None, error) => println!(
                "  {:<20} {}",
                candidate.model_type.name(),
                format!("err: {}", error.as_deref().unwrap_or("unknown")).red()
            ),
        }
    }

    println!("  {}", dim(&"─".repeat(65)));
    println!();
    println!(
        "  {} {} {} {:.4}",
        ok("best"),
        report.best_model.name().white().bold(),
        muted("R²:"),
        report.best_metrics.r2
    );
    println!(
        "  {}",
        dim(&format!(
            "{} train rows · {} test rows · {} features",
            report.n_train, report.n_test, report.n_features
        ))
    );
}

pub fn cmd_predict(
    artifacts: &ArtifactArgs,
    data_path: &Path,
    output: &Path,
    impute: &ImputeArgs,
) -> anyhow::Result<()> {
    section("Predict");

    let predictor = artifacts.load()?.with_cleaning(impute.cleaning())?;

    step_run("Loading data");
    let df = load_csv(data_path)?;
    step_done(&format!("{} rows × {} cols", df.height(), df.width()));

    step_run("Predicting");
    let start = Instant::now();
    let predictions = predictor.predict_table(&df)?;
    step_done(&format!("{:?}", start.elapsed()));

    write_csv(&predictions, output)?;
    step_ok(&format!("Saved {}", output.display()));
    println!();
    Ok(())
}

pub fn cmd_estimate(artifacts: &ArtifactArgs, args: EstimateArgs) -> anyhow::Result<()> {
    section("Estimate");

    let predictor = artifacts.load()?;
    let record = EmployeeRecord::from(args);
    let prediction = predictor.predict_record(&record)?;

    println!();
    println!("  {:<20} {}", muted("Predicted Salary"), format_currency(prediction).white().bold());
    println!();
    Ok(())
}

pub fn cmd_sample(output: &Path) -> anyhow::Result<()> {
    std::fs::write(output, SAMPLE_CSV)?;
    step_ok(&format!("Saved {}", output.display()));
    Ok(())
}

// ─── Serve ─────────────────────────────────────────────────────────────────────

pub async fn cmd_serve(
    artifacts: &ArtifactArgs,
    host: &str,
    port: u16,
    impute: &ImputeArgs,
) -> anyhow::Result<()> {
    use crate::server::{run_server, ServerConfig};

    println!();
    line_box_top();
    line_box_empty();
    line_box_center(&format!("{}", "Salary Predictor".white().bold()));
    line_box_center(&format!("{}", dim(&format!("v{}", env!("CARGO_PKG_VERSION")))));
    line_box_empty();
    line_box_sep();
    line_box_empty();
    line_box(&kv("Web UI ", &format!("http://{}:{}", host, port)));
    line_box(&kv("API    ", &format!("http://{}:{}/api", host, port)));
    line_box(&kv("Health ", &format!("http://{}:{}/api/health", host, port)));
    line_box_empty();
    line_box_sep();
    line_box_empty();
    line_box_center(&format!("{}", dim("ctrl+c to stop")));
    line_box_empty();
    line_box_bottom();
    println!();

    let config = ServerConfig {
        host: host.to_string(),
        port,
        model_path: artifacts.model_path.clone(),
        encoders_path: artifacts.encoders_path.clone(),
        cleaning: impute.cleaning(),
        ..Default::default()
    };

    run_server(config).await
}

// ─── Interactive mode ──────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("       {}", "Salary Predictor".truecolor(120, 170, 255).bold());
    println!("       {}", dim(&format!("v{}  ·  rust", env!("CARGO_PKG_VERSION"))));
    println!();
}

fn theme() -> dialoguer::theme::ColorfulTheme {
    use dialoguer::console::{style, Style};

    dialoguer::theme::ColorfulTheme {
        active_item_prefix: style("  ›".to_string()).for_stderr().cyan(),
        active_item_style: Style::new().for_stderr().white().bold(),
        inactive_item_prefix: style("   ".to_string()).for_stderr(),
        inactive_item_style: Style::new().for_stderr().color256(245),
        prompt_prefix: style("  ?".to_string()).for_stderr().color256(111),
        prompt_style: Style::new().for_stderr().white().bold(),
        ..dialoguer::theme::ColorfulTheme::default()
    }
}

/// Menu-driven terminal front end. The current page lives in the loop.
pub fn cmd_interactive(artifacts: &ArtifactArgs) -> anyhow::Result<()> {
    use dialoguer::Select;

    print_banner();
    let predictor = artifacts.load()?;
    let theme = theme();

    let mut page = Page::Home;
    let mut record = EmployeeRecord::default();

    loop {
        match page {
            Page::Home => show_home(&predictor),
            Page::ManualEntry => {
                if let Some(entered) = run_manual_entry(&theme, &predictor, &record)? {
                    record = entered;
                }
            }
            Page::BulkUpload => run_bulk_upload(&theme, &predictor)?,
            Page::Feedback => show_feedback(),
        }

        let mut items: Vec<String> = Page::ALL
            .iter()
            .map(|p| format!("{:<22}{}", p.title(), p.summary()))
            .collect();
        items.push("Exit".to_string());
        let current = Page::ALL.iter().position(|p| *p == page).unwrap_or(0);

        println!();
        let sel = Select::with_theme(&theme)
            .with_prompt("Menu")
            .items(&items)
            .default(current)
            .interact_opt()?;

        match sel.and_then(|idx| Page::ALL.get(idx).copied()) {
            Some(next) if next == page => page = page.navigate(NavEvent::Submit),
            Some(next) => page = page.navigate(NavEvent::Select(next)),
            None => {
                println!();
                println!("  {}", dim("goodbye"));
                println!();
                break;
            }
        }
    }

    Ok(())
}

fn show_home(predictor: &Predictor) {
    section("Welcome to Salary Predictor");
    println!("  {}", HOME_INTRO);
    println!();
    println!("  {:<14} {}", accent("Manual Entry"), muted("input one employee's details and get a prediction"));
    println!("  {:<14} {}", accent("Bulk Upload"), muted("predict for every row of a CSV file"));
    println!();
    println!("  {:<14} {}", muted("Model"), predictor.model_name());
    println!("  {:<14} {:.4}", muted("R²"), predictor.manifest().report.best_metrics.r2);
    println!("  {:<14} {}", muted("Developed by"), DEVELOPER);
    println!("  {:<14} {}", muted("Contact"), CONTACT_EMAIL);
}

fn show_feedback() {
    section("Feedback / Suggestions");
    println!("  {}", FEEDBACK_TEXT);
    println!();
    println!("  {}", CONTACT_EMAIL.white().bold());
}

/// Prompt for every field, then predict. Returns the entered record.
fn run_manual_entry(
    theme: &dialoguer::theme::ColorfulTheme,
    predictor: &Predictor,
    previous: &EmployeeRecord,
) -> anyhow::Result<Option<EmployeeRecord>> {
    use dialoguer::{Input, Select};

    section("Manual Entry");
    let mut record = previous.clone();

    for field in CHOICE_FIELDS {
        let current = record
            .categorical_values()
            .iter()
            .find(|(name, _)| *name == field.name)
            .and_then(|(_, value)| field.options.iter().position(|o| o == value))
            .unwrap_or(0);
        let Some(idx) = Select::with_theme(theme)
            .with_prompt(field.label)
            .items(field.options)
            .default(current)
            .interact_opt()?
        else {
            return Ok(None);
        };
        let value = field.options[idx].to_string();
        match field.name {
            "education_level" => record.education_level = value,
            "job_title" => record.job_title = value,
            "industry" => record.industry = value,
            "location" => record.location = value,
            _ => record.company_size = value,
        }
    }

    for field in NUMERIC_FIELDS {
        let current = record
            .numeric_values()
            .iter()
            .find(|(name, _)| *name == field.name)
            .map(|(_, value)| *value)
            .unwrap_or(field.default);
        let value: f64 = Input::with_theme(theme)
            .with_prompt(format!("{} ({}–{})", field.label, field.min, field.max))
            .default(current)
            .validate_with(|v: &f64| field.check(*v).map_err(|e| e.to_string()))
            .interact_text()?;
        match field.name {
            "years_experience" => record.years_experience = value,
            "age" => record.age = value,
            "certifications" => record.certifications = value,
            _ => record.working_hours = value,
        }
    }

    println!();
    match predictor.predict_record(&record) {
        Ok(prediction) => println!(
            "  {} {}",
            ok("Predicted Salary:"),
            format_currency(prediction).white().bold()
        ),
        Err(e) => step_err(&e.to_string()),
    }

    Ok(Some(record))
}

fn run_bulk_upload(
    theme: &dialoguer::theme::ColorfulTheme,
    predictor: &Predictor,
) -> anyhow::Result<()> {
    use dialoguer::{Confirm, Input};

    section("Bulk Upload");
    println!("  {}", muted("Predict salaries for every row of a CSV file."));
    println!("  {}", dim(&format!("run `salary sample` to write {}", SAMPLE_FILE_NAME)));
    println!();

    let path: String = Input::with_theme(theme)
        .with_prompt("CSV file")
        .interact_text()?;

    let df = match load_csv(Path::new(path.trim())) {
        Ok(df) => df,
        Err(e) => {
            step_err(&e.to_string());
            return Ok(());
        }
    };

    section("Uploaded CSV Preview");
    println!("{}", df.head(Some(5)));

    if !Confirm::with_theme(theme)
        .with_prompt("Predict for all rows?")
        .default(true)
        .interact()?
    {
        return Ok(());
    }

    let output = match predictor.predict_table(&df) {
        Ok(output) => output,
        Err(e) => {
            match e.column() {
                Some(column) => step_err(&format!(
                    "Value error in column: {}. Please correct input file.",
                    column
                )),
                None => step_err(&e.to_string()),
            }
            return Ok(());
        }
    };
    step_ok("Predictions completed!");
    println!("{}", output.head(Some(10)));

    let out_path: String = Input::with_theme(theme)
        .with_prompt("Save predictions to")
        .default(PREDICTIONS_FILE_NAME.to_string())
        .interact_text()?;
    write_csv(&output, Path::new(out_path.trim()))?;
    step_ok(&format!("Saved {}", out_path.trim()));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_train_flags() {
        let cli = Cli::try_parse_from([
            "salary",
            "train",
            "-d",
            "data.csv",
            "--numeric-impute",
            "constant=0",
            "--models",
            "linear,xgb",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Train { impute, models, seed, .. }) => {
                assert_eq!(impute.numeric_impute, ImputeStrategy::Constant("0".to_string()));
                assert_eq!(impute.categorical_impute, ImputeStrategy::MostFrequent);
                assert_eq!(models, vec![ModelType::LinearRegression, ModelType::XGBoost]);
                assert_eq!(seed, 42);
            }
            _ => panic!("expected train"),
        }
    }

    #[test]
    fn test_predict_accepts_impute_flags() {
        let cli = Cli::try_parse_from([
            "salary",
            "predict",
            "-d",
            "in.csv",
            "--numeric-impute",
            "error",
            "--categorical-impute",
            "constant=Unknown",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Predict { impute, .. }) => {
                let cleaning = impute.cleaning();
                assert_eq!(cleaning.numeric, ImputeStrategy::ErrorOnMissing);
                assert_eq!(
                    cleaning.categorical,
                    ImputeStrategy::Constant("Unknown".to_string())
                );
            }
            _ => panic!("expected predict"),
        }
    }

    #[test]
    fn test_estimate_defaults_are_valid() {
        let cli = Cli::try_parse_from(["salary", "estimate", "--job-title", "Manager"]).unwrap();
        match cli.command {
            Some(Commands::Estimate(args)) => {
                let record = EmployeeRecord::from(args);
                assert_eq!(record.job_title, "Manager");
                assert!(record.validate().is_ok());
            }
            _ => panic!("expected estimate"),
        }
    }
}
