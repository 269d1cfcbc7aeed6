//! periop-risk command-line driver.
//!
//! Usage:
//!   periop-risk analyze [request.json] [--no-ai] [--api-key <key>] [--pretty]
//!   periop-risk check --api-key <key> [--model <id>]
//!
//! The request is read from the given file or stdin. Scores are always
//! computed; the AI analyses run only when an API key is available.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use periop_risk_ai::{AnalysisCache, AnalysisReport, Analyzer, GeminiClient, GenerationConfig, ModelInvoker};
use periop_risk_core::scores::{
    akics_score, ariscat_score, classify_asa, nsqip_proxy, pre_deliric_score, rcri_score,
    stop_bang_score, AkicsInputs, AriscatFactors, NsqipInputs, PreDeliricInputs, RcriFactors,
    StopBangAnswers,
};
use periop_risk_core::{AnalysisPayload, Instrument, PatientProfile, ScoreSet, ScoringResult};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "periop-risk")]
#[command(version)]
#[command(about = "Perioperative risk scores with AI interpretation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute scores and, with an API key, the AI analyses
    Analyze {
        /// Request file (stdin if omitted)
        input: Option<PathBuf>,

        /// Skip the AI analyses
        #[arg(long)]
        no_ai: bool,

        /// API key; overrides the one in the request
        #[arg(long)]
        api_key: Option<String>,

        /// Pretty-print the output
        #[arg(long)]
        pretty: bool,
    },

    /// Check that the model answers a ping
    Check {
        #[arg(long)]
        api_key: String,

        #[arg(long)]
        model: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
struct AsaInput {
    class: String,
    #[serde(default)]
    emergency: bool,
}

/// Inputs for each instrument to compute; absent ones are skipped.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct InstrumentInputs {
    asa: Option<AsaInput>,
    rcri: Option<RcriFactors>,
    ariscat: Option<AriscatFactors>,
    nsqip: Option<NsqipInputs>,
    akics: Option<AkicsInputs>,
    pre_deliric: Option<PreDeliricInputs>,
    stop_bang: Option<StopBangAnswers>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Request {
    patient: PatientProfile,
    inputs: InstrumentInputs,
    generation: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Output {
    scores: ScoreSet,
    /// Validation failures by instrument id
    errors: BTreeMap<&'static str, String>,
    analysis: Option<AnalysisReport>,
}

fn compute_scores(inputs: &InstrumentInputs) -> (ScoreSet, BTreeMap<&'static str, String>) {
    let mut scores = ScoreSet::default();
    let mut errors = BTreeMap::new();

    let mut record = |instrument: Instrument, result: ScoringResult<_>| match result {
        Ok(score) => scores.insert(score),
        Err(e) => {
            warn!(instrument = instrument.id(), error = %e, "invalid score input");
            errors.insert(instrument.id(), e.to_string());
        }
    };

    if let Some(asa) = &inputs.asa {
        record(Instrument::Asa, classify_asa(&asa.class, asa.emergency));
    }
    if let Some(f) = &inputs.rcri {
        record(Instrument::Rcri, Ok(rcri_score(f)));
    }
    if let Some(f) = &inputs.ariscat {
        record(Instrument::Ariscat, Ok(ariscat_score(f)));
    }
    if let Some(i) = &inputs.nsqip {
        record(Instrument::Nsqip, Ok(nsqip_proxy(i)));
    }
    if let Some(i) = &inputs.akics {
        record(Instrument::Akics, akics_score(i));
    }
    if let Some(i) = &inputs.pre_deliric {
        record(Instrument::PreDeliric, pre_deliric_score(i));
    }
    if let Some(a) = &inputs.stop_bang {
        record(Instrument::StopBang, Ok(stop_bang_score(a)));
    }

    (scores, errors)
}

fn read_request(input: Option<&PathBuf>) -> Result<Request> {
    let text = match input {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf).context("reading stdin")?;
            buf
        }
    };
    serde_json::from_str(&text).context("parsing request JSON")
}

fn analyze(input: Option<PathBuf>, no_ai: bool, api_key: Option<String>, pretty: bool) -> Result<()> {
    let request = read_request(input.as_ref())?;
    let (scores, errors) = compute_scores(&request.inputs);
    info!(computed = scores.len(), failed = errors.len(), "scores computed");

    let mut config = request.generation;
    if let Some(key) = api_key {
        config.api_key = Some(key);
    }
    config.validate()?;

    let payload = AnalysisPayload::new(request.patient, scores);
    let has_key = config.api_key.as_deref().is_some_and(|k| !k.is_empty());
    let analysis = if no_ai || !has_key {
        info!("AI analyses skipped");
        None
    } else {
        let analyzer = Analyzer::new(GeminiClient::new(&config), config, Arc::new(AnalysisCache::new()));
        Some(analyzer.analyze_all(&payload))
    };

    let output = Output {
        scores: payload.scores,
        errors,
        analysis,
    };
    let json = if pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{json}");
    Ok(())
}

fn check(api_key: String, model: Option<String>) -> Result<()> {
    let mut config = GenerationConfig::default().with_api_key(api_key);
    if let Some(model) = model {
        config.model = model;
    }
    config.validate()?;

    let invoker = ModelInvoker::new(GeminiClient::new(&config), config);
    if invoker.check_connection() {
        println!("ok");
        Ok(())
    } else {
        anyhow::bail!("model did not answer")
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    match Cli::parse().command {
        Commands::Analyze {
            input,
            no_ai,
            api_key,
            pretty,
        } => analyze(input, no_ai, api_key, pretty),
        Commands::Check { api_key, model } => check(api_key, model),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_parses_and_scores() {
        let request: Request = serde_json::from_str(
            r#"{
                "patient": {"demographics": {"age": 72}},
                "inputs": {
                    "asa": {"class": "III", "emergency": true},
                    "rcri": {"high_risk_surgery": true, "ischemic_heart_disease": true,
                             "congestive_heart_failure": false, "cerebrovascular_disease": false,
                             "insulin_treated_diabetes": false, "creatinine_gt_2mg_dl": false},
                    "akics": {"age": 150, "female": false, "heart_failure": false,
                              "hypertension": false, "emergency": false,
                              "surgery_type": "coronary", "creatinine_mg_dl": 1.0}
                },
                "generation": {"model": "gemini-2.5-flash"}
            }"#,
        )
        .unwrap();

        assert_eq!(request.generation.model, "gemini-2.5-flash");
        let (scores, errors) = compute_scores(&request.inputs);
        assert_eq!(scores.len(), 2);
        assert_eq!(scores.rcri.as_ref().unwrap().score, 2.0);
        assert_eq!(scores.asa.as_ref().unwrap().class_label.as_deref(), Some("III-E"));
        assert!(errors.contains_key("akics"));
    }

    #[test]
    fn test_empty_request() {
        let request: Request = serde_json::from_str("{}").unwrap();
        let (scores, errors) = compute_scores(&request.inputs);
        assert!(scores.is_empty());
        assert!(errors.is_empty());
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from(["periop-risk", "analyze", "req.json", "--no-ai"]).unwrap();
        assert!(matches!(cli.command, Commands::Analyze { no_ai: true, .. }));
    }
}
