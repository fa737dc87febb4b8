//! Process command - extract data from a single configuration file.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use relayscan_core::{ExtractionBundle, RelayExtractor};

use super::{file_name, read_document};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (PDF text export or .S40 settings file)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Show extraction warnings
    #[arg(long)]
    show_warnings: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

pub fn run(args: ProcessArgs) -> anyhow::Result<()> {
    let start = Instant::now();

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let text = read_document(&args.input)?;
    let extractor = RelayExtractor::new();
    let bundle = extractor.extract(&file_name(&args.input), &text)?;

    let output = format_bundle(&bundle, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{output}");
    }

    if args.show_warnings && !bundle.report.warnings.is_empty() {
        eprintln!("{}", style("Warnings:").yellow());
        for warning in &bundle.report.warnings {
            eprintln!("  - {warning}");
        }
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

pub fn format_bundle(bundle: &ExtractionBundle, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(bundle)?),
        OutputFormat::Csv => format_csv(bundle),
        OutputFormat::Text => format_text(bundle),
    }
}

pub fn csv_header() -> [&'static str; 12] {
    [
        "relay_id",
        "manufacturer",
        "model",
        "relay_type",
        "substation_code",
        "bay_identifier",
        "panel_type",
        "config_date",
        "voltage_class_kv",
        "frequency_hz",
        "enabled_protections",
        "completeness",
    ]
}

pub fn csv_row(bundle: &ExtractionBundle) -> [String; 12] {
    let relay = &bundle.relay;
    let opt = |value: &Option<String>| value.clone().unwrap_or_default();
    [
        relay.relay_id.clone(),
        relay.manufacturer.clone(),
        opt(&relay.model),
        relay.relay_type.clone(),
        opt(&relay.substation_code),
        opt(&relay.bay_identifier),
        opt(&relay.panel_type),
        relay.config_date.map(|date| date.to_string()).unwrap_or_default(),
        relay
            .voltage_class_kv
            .map(|kv| format!("{kv:.2}"))
            .unwrap_or_default(),
        relay
            .frequency_hz
            .map(|hz| format!("{hz}"))
            .unwrap_or_default(),
        bundle.report.enabled_protection_count.to_string(),
        format!("{:.1}", bundle.report.completeness_score),
    ]
}

fn format_csv(bundle: &ExtractionBundle) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(csv_header())?;
    wtr.write_record(csv_row(bundle))?;
    Ok(String::from_utf8(wtr.into_inner()?)?)
}

fn format_text(bundle: &ExtractionBundle) -> anyhow::Result<String> {
    let relay = &bundle.relay;
    let mut output = String::new();

    output.push_str(&format!("Relay: {}\n", relay.relay_id));
    output.push_str(&format!("Manufacturer: {}\n", relay.manufacturer));
    if let Some(model) = &relay.model {
        output.push_str(&format!("Model: {model} ({})\n", relay.relay_type));
    }
    if let Some(date) = relay.config_date {
        output.push_str(&format!("Configured: {date}\n"));
    }
    if let Some(kv) = relay.voltage_class_kv {
        output.push_str(&format!("Voltage class: {kv:.2} kV\n"));
    }
    if let Some(hz) = relay.frequency_hz {
        output.push_str(&format!("Frequency: {hz} Hz\n"));
    }

    output.push('\n');
    output.push_str("Current transformers:\n");
    for ct in &bundle.current_transformers {
        match ct.ratio {
            Some(ratio) => output.push_str(&format!(
                "  {}: {}/{} (ratio {ratio:.1})\n",
                ct.kind.label(),
                ct.primary,
                ct.secondary
            )),
            None => output.push_str(&format!(
                "  {}: {}/{}\n",
                ct.kind.label(),
                ct.primary,
                ct.secondary
            )),
        }
    }
    output.push_str("Voltage transformers:\n");
    for vt in &bundle.voltage_transformers {
        output.push_str(&format!(
            "  {}: {}/{}\n",
            vt.kind.label(),
            vt.primary,
            vt.secondary
        ));
    }

    output.push('\n');
    output.push_str("Protection functions:\n");
    for protection in &bundle.protections {
        let state = if protection.is_enabled { "enabled" } else { "disabled" };
        output.push_str(&format!(
            "  [{}] {} ({state})\n",
            protection.ansi_code, protection.function_label
        ));
    }

    output.push('\n');
    output.push_str(&format!(
        "Parameters: {} (completeness {:.1}%)\n",
        bundle.report.total_parameters, bundle.report.completeness_score
    ));

    Ok(output)
}
