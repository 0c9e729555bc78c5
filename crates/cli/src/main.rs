//! docx-merge - merge field values into a DOCX file

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context};
use chrono::NaiveDateTime;
use clap::Parser;
use mail_merge::{parse_date_value, FieldValues};
use serde_json::Value;
use store::{merge_docx, MergeOptions};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "docx-merge")]
#[command(about = "Replace MERGEFIELD and DATE results in a DOCX file")]
struct Args {
    /// Source DOCX file
    input: PathBuf,

    /// Where to write the merged DOCX file
    output: PathBuf,

    /// JSON object mapping field names to values
    #[arg(long, value_name = "FILE")]
    values: Option<PathBuf>,

    /// A single field value (can be specified multiple times).
    /// Example: --field FirstName=Bill
    #[arg(short, long = "field", value_name = "NAME=VALUE")]
    fields: Vec<String>,

    /// Date shown by DATE fields: `now`, `YYYY-MM-DD` or `YYYY-MM-DDTHH:MM:SS`
    #[arg(short, long)]
    date: Option<String>,

    /// Date picture applied to every DATE field, e.g. "dd/MM/yyyy"
    #[arg(long, value_name = "PICTURE")]
    date_format: Option<String>,

    /// Locale for month and day names, e.g. fr_FR
    #[arg(long)]
    locale: Option<String>,

    /// JSON merge options file; flags override its settings
    #[arg(long, value_name = "FILE")]
    options: Option<PathBuf>,

    /// Only merge the main document, not headers, footers or notes
    #[arg(long)]
    body_only: bool,

    /// Report malformed fields instead of failing
    #[arg(long)]
    allow_malformed: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let mut values = match &args.values {
        Some(path) => load_values(path)?,
        None => FieldValues::new(),
    };
    for field in &args.fields {
        let (name, value) = parse_assignment(field)?;
        values.insert(name, value);
    }

    let options = build_options(&args)?;
    tracing::info!(
        input = %args.input.display(),
        output = %args.output.display(),
        fields = values.len(),
        "Merging document"
    );

    let report = merge_docx(&args.input, &args.output, &values, &options)
        .with_context(|| format!("failed to merge {}", args.input.display()))?;

    for warning in &report.warnings {
        tracing::warn!("{}", warning);
    }
    for field in &report.malformed {
        tracing::warn!("{}", field);
    }
    println!("{}", report.summary);
    Ok(())
}

fn build_options(args: &Args) -> anyhow::Result<MergeOptions> {
    let mut options = match &args.options {
        Some(path) => MergeOptions::load(path)
            .with_context(|| format!("failed to read options from {}", path.display()))?,
        None => MergeOptions::default(),
    };

    if let Some(date) = &args.date {
        options = options.with_date(parse_date_arg(date)?);
    }
    if let Some(picture) = &args.date_format {
        options = options.with_date_format(picture.clone());
    }
    if let Some(locale) = &args.locale {
        options = options.with_locale(locale.clone());
    }
    if args.body_only {
        options = options.with_headers_footers(false);
    }
    if args.allow_malformed {
        options = options.with_fail_on_malformed(false);
    }
    Ok(options)
}

fn parse_date_arg(value: &str) -> anyhow::Result<NaiveDateTime> {
    if value.eq_ignore_ascii_case("now") {
        return Ok(chrono::Local::now().naive_local());
    }
    match parse_date_value(value) {
        Some(date) => Ok(date),
        None => bail!("invalid date `{}`, expected YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS", value),
    }
}

fn parse_assignment(field: &str) -> anyhow::Result<(String, String)> {
    match field.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => bail!("invalid field `{}`, expected NAME=VALUE", field),
    }
}

/// Read a JSON object of field values. Numbers and booleans are used as
/// their JSON text; nulls are skipped.
fn load_values(path: &Path) -> anyhow::Result<FieldValues> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let json: Value = serde_json::from_str(&content)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    let Value::Object(map) = json else {
        bail!("{} must contain a JSON object", path.display());
    };

    let mut values = FieldValues::new();
    for (name, value) in map {
        match value {
            Value::Null => continue,
            Value::String(s) => values.insert(name, s),
            Value::Number(_) | Value::Bool(_) => values.insert(name, value.to_string()),
            Value::Array(_) | Value::Object(_) => {
                bail!("value of `{}` must be a string, number or boolean", name)
            }
        }
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            parse_assignment("City=New York").unwrap(),
            ("City".to_string(), "New York".to_string())
        );
        assert_eq!(
            parse_assignment("Note=a=b").unwrap(),
            ("Note".to_string(), "a=b".to_string())
        );
        assert_eq!(parse_assignment("Empty=").unwrap().1, "");
        assert!(parse_assignment("NoValue").is_err());
        assert!(parse_assignment("=x").is_err());
    }

    #[test]
    fn test_load_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("values.json");
        std::fs::write(
            &path,
            r#"{"FirstName": "Bill", "Age": 42, "Member": true, "Fax": null}"#,
        )
        .unwrap();

        let values = load_values(&path).unwrap();
        assert_eq!(values.get("FirstName"), Some("Bill"));
        assert_eq!(values.get("Age"), Some("42"));
        assert_eq!(values.get("Member"), Some("true"));
        assert_eq!(values.get("Fax"), None);
        assert_eq!(values.len(), 3);
    }

    #[test]
    fn test_load_values_rejects_nested() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("values.json");
        std::fs::write(&path, r#"{"Address": {"City": "Paris"}}"#).unwrap();
        assert!(load_values(&path).is_err());

        std::fs::write(&path, r#"["Bill"]"#).unwrap();
        assert!(load_values(&path).is_err());
    }

    #[test]
    fn test_flags_override_options_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("merge.json");
        std::fs::write(&path, r#"{"locale": "de_DE", "fail_on_malformed": true}"#).unwrap();

        let args = Args::parse_from([
            "docx-merge",
            "in.docx",
            "out.docx",
            "--options",
            path.to_str().unwrap(),
            "--locale",
            "fr_FR",
            "--date",
            "2020-04-01",
            "--allow-malformed",
        ]);
        let options = build_options(&args).unwrap();
        assert_eq!(options.locale, "fr_FR");
        assert!(!options.fail_on_malformed);
        assert!(options.include_headers_footers);
        assert_eq!(options.date, parse_date_value("2020-04-01"));
    }

    #[test]
    fn test_bad_date_is_rejected() {
        assert!(parse_date_arg("April 1st").is_err());
        assert!(parse_date_arg("now").is_ok());
    }
}
