// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use anyhow::{Context, bail};
use rayon::prelude::*;
use shuttle_milp::prelude::{GoodLpSolver, ModelConfig, SolveEngine};
use shuttle_model::prelude::{
    ExpectedCase, InstanceLoader, ObjectiveKind, PayloadMeta, ResultPayload, ScheduleExtractor,
    VerificationReport, Verifier, VerifierConfig,
};
use std::{
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
};
use structopt::StructOpt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "shuttle",
    about = "Solve shuttle bus cases and verify schedules.",
    rename_all = "kebab-case"
)]
enum Command {
    /// Build and solve the model of a case, then write the result payload
    Solve(SolveOptions),
    /// Check result payloads, optionally against a reference case
    Verify(VerifyOptions),
}

#[derive(Debug, StructOpt)]
#[structopt(rename_all = "kebab-case")]
struct SolveOptions {
    /// case file (`T`, `tau`, `c_max`, `w_max`, `B`, `arrivals`)
    #[structopt(long, parse(from_os_str))]
    case: PathBuf,

    /// where to write the result payload
    #[structopt(long, parse(from_os_str))]
    out: PathBuf,

    #[structopt(long, default_value = "linear", possible_values = &["linear", "pwl"])]
    objective: String,

    /// segments of the squared wait surrogate, with `--objective pwl`
    #[structopt(long, default_value = "10")]
    segments: usize,

    /// solver budget in seconds
    #[structopt(long, default_value = "60")]
    time_limit: f64,

    /// drop off-grid arrivals instead of rejecting the case
    #[structopt(long)]
    lenient: bool,

    #[cfg(feature = "highs")]
    /// solve with HiGHS instead of microlp
    #[structopt(long)]
    highs: bool,
}

#[derive(Debug, StructOpt)]
#[structopt(rename_all = "kebab-case")]
struct VerifyOptions {
    /// reference case with expected departures and assignments
    #[structopt(long, parse(from_os_str))]
    case: Option<PathBuf>,

    /// objective tolerance
    #[structopt(long)]
    tolerance: Option<f64>,

    /// result payloads to check
    #[structopt(parse(from_os_str), required = true)]
    results: Vec<PathBuf>,
}

fn enable_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr)
        .init();
}

fn solver(opts: &SolveOptions) -> GoodLpSolver {
    #[cfg(feature = "highs")]
    {
        if opts.highs {
            return GoodLpSolver::new(shuttle_milp::prelude::Backend::Highs);
        }
    }
    let _ = opts;
    GoodLpSolver::default()
}

fn solve(opts: SolveOptions) -> anyhow::Result<bool> {
    let instance = InstanceLoader::new()
        .fail_on_off_grid(!opts.lenient)
        .from_path(&opts.case)
        .with_context(|| format!("Cannot load case {:?}", opts.case))?;

    let objective = match opts.objective.as_str() {
        "linear" => ObjectiveKind::Linear,
        "pwl" => ObjectiveKind::PiecewiseSquare {
            segments: opts.segments,
        },
        other => bail!("Unknown objective {:?}", other),
    };
    if !opts.time_limit.is_finite() || opts.time_limit < 0.0 {
        bail!("Time limit must be a non-negative number of seconds");
    }
    let config = ModelConfig {
        objective,
        time_limit_secs: opts.time_limit,
    };

    tracing::info!(
        case = %opts.case.display(),
        buses = instance.bus_count(),
        passengers = instance.passenger_count(),
        %objective,
        "solving"
    );
    let run = SolveEngine::new(solver(&opts), config).solve(&instance)?;
    let payload = run.to_payload(&instance);

    let file = File::create(&opts.out)
        .with_context(|| format!("Cannot create {:?}", opts.out))?;
    serde_json::to_writer_pretty(BufWriter::new(file), &payload)?;

    println!(
        "{}: {} objective={} ({:.3}s)",
        opts.out.display(),
        run.schedule().status(),
        run.schedule()
            .objective()
            .map(|o| o.to_string())
            .unwrap_or_else(|| "-".into()),
        run.runtime().as_secs_f64()
    );
    Ok(true)
}

fn verify_one(
    path: &Path,
    expected: Option<&ExpectedCase>,
    tolerance: Option<f64>,
) -> anyhow::Result<VerificationReport> {
    let payload =
        ResultPayload::from_path(path).with_context(|| format!("Cannot read {:?}", path))?;
    let (instance, schedule) = ScheduleExtractor::from_payload(&payload)
        .with_context(|| format!("Malformed result {:?}", path))?;

    let objective = payload
        .meta
        .as_ref()
        .map(PayloadMeta::objective_kind)
        .unwrap_or_default();
    let mut config = VerifierConfig::default().with_objective(objective);
    if let Some(t) = tolerance {
        config = config.with_tolerance(t);
    }
    let verifier = Verifier::new(config);

    Ok(match expected {
        Some(case) => verifier.verify_against(&instance, &schedule, case),
        None => verifier.verify(&instance, &schedule),
    })
}

fn verify(opts: VerifyOptions) -> anyhow::Result<bool> {
    let expected = opts
        .case
        .as_ref()
        .map(|p| ExpectedCase::from_path(p).with_context(|| format!("Cannot read case {:?}", p)))
        .transpose()?;

    let outcomes: Vec<_> = opts
        .results
        .par_iter()
        .map(|path| (path, verify_one(path, expected.as_ref(), opts.tolerance)))
        .collect();

    let mut all_good = true;
    for (path, outcome) in outcomes {
        match outcome {
            Ok(report) => {
                println!("{}: {}", path.display(), report);
                all_good &= !report.is_fail();
            }
            Err(err) => {
                println!("{}: ERROR {:#}", path.display(), err);
                all_good = false;
            }
        }
    }
    Ok(all_good)
}

fn main() {
    enable_tracing();

    let outcome = match Command::from_args() {
        Command::Solve(opts) => solve(opts),
        Command::Verify(opts) => verify(opts),
    };

    match outcome {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(err) => {
            for cause in err.chain() {
                eprintln!("{}", cause);
            }
            std::process::exit(1);
        }
    }
}
