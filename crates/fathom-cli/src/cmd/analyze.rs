use anyhow::{Context, Result, bail};
use clap::Args;
use fathom_core::config::resolve_config;
use fathom_core::input::FactBundle;
use fathom_core::model::{Finding, Metrics};
use fathom_detect::pipeline::{DetectorStatus, RunReport};
use fathom_detect::{Detector, run_all};
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

use crate::output::{OutputMode, pretty_kv, pretty_rule, pretty_section};

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Fact bundle JSON produced by extraction (`-` reads stdin).
    #[arg(long, short, value_name = "PATH")]
    pub input: PathBuf,

    /// Detectors to run, comma-separated or repeated (default: all).
    #[arg(long = "detector", value_name = "NAME", value_delimiter = ',')]
    pub detectors: Vec<Detector>,
}

pub fn run_analyze(
    args: &AnalyzeArgs,
    config_path: Option<&Path>,
    working_dir: &Path,
    output: OutputMode,
) -> Result<()> {
    let config = resolve_config(config_path, working_dir).context("resolving analysis config")?;
    let bundle = read_bundle(&args.input)?;
    let facts = bundle.validate();

    let detectors: &[Detector] = if args.detectors.is_empty() {
        &Detector::ALL
    } else {
        &args.detectors
    };

    let started = Instant::now();
    let report = run_all(&facts, &config, detectors);
    info!(
        input = %args.input.display(),
        elapsed_ms = started.elapsed().as_millis(),
        "analyze finished"
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match output {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut out, &report)?;
            writeln!(out)?;
        }
        OutputMode::Text => render_text(&report, &mut out)?,
        OutputMode::Pretty => render_pretty(&report, &mut out)?,
    }
    out.flush()?;

    let failed = report
        .detectors
        .iter()
        .filter(|d| matches!(d.status, DetectorStatus::Failed { .. }))
        .count();
    if failed > 0 {
        bail!("{failed} detector(s) failed; see the report for details");
    }
    Ok(())
}

fn read_bundle(path: &Path) -> Result<FactBundle> {
    if path.as_os_str() == "-" {
        return FactBundle::from_reader(io::stdin().lock()).context("parsing fact bundle from stdin");
    }
    let file = File::open(path).with_context(|| format!("opening fact bundle {}", path.display()))?;
    FactBundle::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing fact bundle {}", path.display()))
}

/// One-line numeric summary of a finding's metrics.
fn metrics_summary(finding: &Finding) -> String {
    match finding.metrics() {
        Metrics::Bridge(m) => format!(
            "centrality={:.4} degree={} documents={}{}",
            m.centrality,
            m.degree,
            m.document_count,
            if m.sampled { " sampled" } else { "" }
        ),
        Metrics::DigitDistribution(m) => {
            let chi = m
                .chi_square
                .map_or_else(|| "skipped".to_string(), |c| format!("{c:.3}"));
            format!(
                "n={} chi2={chi} round={}/{} ({}){}",
                m.sample_size,
                m.round_count,
                m.sample_size,
                m.round_fraction.round_dp(4),
                if m.low_confidence { " low-confidence" } else { "" }
            )
        }
        Metrics::Silence(m) => format!("gap_days={}", m.gap_days),
    }
}

fn render_text(report: &RunReport, w: &mut dyn Write) -> io::Result<()> {
    for f in &report.findings {
        let cites: Vec<String> = f
            .citations()
            .iter()
            .map(|c| format!("{}:{}", c.document_id, c.page_number))
            .collect();
        writeln!(
            w,
            "finding\t{}\t{}\t{}\t{}\t{}",
            f.kind(),
            f.severity(),
            f.subject(),
            metrics_summary(f),
            cites.join(",")
        )?;
    }
    for d in &report.detectors {
        match &d.status {
            DetectorStatus::Completed { findings } => {
                writeln!(w, "detector\t{}\tcompleted\t{findings}", d.detector)?;
            }
            DetectorStatus::Failed { code, error } => {
                writeln!(w, "detector\t{}\tfailed\t{code}\t{error}", d.detector)?;
            }
        }
    }
    for c in &report.ranking {
        writeln!(w, "ranked\t{}\t{:.4}\t{}", c.entity, c.centrality, c.degree)?;
    }
    for r in &report.rejected {
        writeln!(w, "rejected\t{}\t{}\t{}\t{}", r.list.as_str(), r.index, r.code, r.reason)?;
    }
    Ok(())
}

fn render_pretty(report: &RunReport, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, &format!("Findings ({})", report.findings.len()))?;
    if report.findings.is_empty() {
        writeln!(w, "  none")?;
    }
    for f in &report.findings {
        writeln!(w, "[{}] {} :: {}", f.severity(), f.kind(), f.subject())?;
        writeln!(w, "    {}", metrics_summary(f))?;
        for c in f.citations().iter().take(5) {
            writeln!(w, "    - {c}")?;
        }
        if f.citations().len() > 5 {
            writeln!(w, "    ... {} more citation(s)", f.citations().len() - 5)?;
        }
    }
    writeln!(w)?;

    pretty_section(w, "Detectors")?;
    for d in &report.detectors {
        let status = match &d.status {
            DetectorStatus::Completed { findings } => format!("ok, {findings} finding(s)"),
            DetectorStatus::Failed { code, error } => format!("FAILED [{code}] {error}"),
        };
        pretty_kv(w, d.detector.as_str(), status)?;
    }

    if let Some(g) = &report.graph {
        writeln!(w)?;
        pretty_section(w, "Graph")?;
        pretty_kv(w, "nodes", g.nodes.to_string())?;
        pretty_kv(w, "edges", g.edges.to_string())?;
        pretty_kv(w, "density", format!("{:.4}", g.density))?;
        pretty_kv(w, "components", g.components.count.to_string())?;
        pretty_kv(
            w,
            "documents",
            format!("{} used, {} skipped", g.documents_used, g.documents_skipped),
        )?;
        if let Some(method) = &report.centrality {
            let label = if method.is_sampled() { "sampled" } else { "exact" };
            pretty_kv(w, "centrality", label)?;
        }
        pretty_kv(w, "hash", &g.content_hash)?;
    }

    if !report.ranking.is_empty() {
        writeln!(w)?;
        pretty_section(w, "Most central")?;
        for c in report.ranking.iter().take(10) {
            writeln!(w, "  {:<24} {:.4}  degree {}", c.entity, c.centrality, c.degree)?;
        }
    }

    if let Some(t) = &report.timeline {
        writeln!(w)?;
        pretty_section(w, "Timeline")?;
        pretty_kv(w, "dates", t.total.to_string())?;
        if let (Some(first), Some(last)) = (t.first, t.last) {
            pretty_kv(w, "span", format!("{first} .. {last} ({} days)", t.span_days))?;
        }
    }

    if !report.rejected.is_empty() {
        writeln!(w)?;
        pretty_section(w, &format!("Rejected records ({})", report.rejected.len()))?;
        for r in &report.rejected {
            writeln!(w, "  {}[{}] {}: {}", r.list.as_str(), r.index, r.code, r.reason)?;
        }
    }
    pretty_rule(w)
}
