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

use chrono::{DateTime, Utc};
use clap::Parser;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};
use tour_opt_core::prelude::Cost;
use tour_opt_engine::prelude::{BaselineEngine, Instance};
use tour_opt_model::prelude::{SolverParams, TourRecord};
use tour_opt_solver::prelude::{FnFactory, RunConfig, WorkerPool};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

/// Trial-based tour optimizer for time-window instances.
#[derive(Parser, Debug)]
#[command(name = "tour-opt", version, about)]
struct Args {
    /// Parameter file in `KEY = VALUE` format.
    param_file: Option<PathBuf>,

    /// Problem instance; overrides PROBLEM_FILE from the parameter file.
    problem_file: Option<PathBuf>,

    /// Trials per worker; 0 only constructs a tour and reports its penalty.
    #[arg(long)]
    max_trials: Option<u32>,

    /// Base random seed; worker i runs with seed + i.
    #[arg(long)]
    seed: Option<u64>,

    /// Wall-clock budget in seconds, checked at trial boundaries.
    #[arg(long, value_name = "SECONDS")]
    time_limit: Option<u64>,

    /// Number of parallel restart workers.
    #[arg(long, default_value_t = 1)]
    workers: usize,

    /// Where to write the best tour in the text tour format.
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Where to write a JSON run record.
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,
}

fn enable_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_span_events(FmtSpan::CLOSE)
        .init();
}

#[derive(Serialize)]
struct RunRecord {
    instance: String,
    workers: usize,
    seeds: Vec<u64>,
    max_trials: u32,
    start_ts: DateTime<Utc>,
    end_ts: DateTime<Utc>,
    runtime_ms: u128,
    penalty: Cost,
    cost: Option<Cost>,
    best_worker: usize,
    best_trial: u32,
    dimension: usize,
}

fn main() -> ExitCode {
    enable_tracing();
    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "run failed");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut params = match &args.param_file {
        Some(path) => SolverParams::from_path(path)?,
        None => SolverParams::default(),
    };
    if let Some(max_trials) = args.max_trials {
        params.max_trials = max_trials;
    }
    if let Some(seed) = args.seed {
        params.seed = seed;
    }
    if let Some(secs) = args.time_limit {
        params.time_limit = Duration::from_secs(secs);
    }

    let problem_path = args
        .problem_file
        .clone()
        .or_else(|| params.problem_file.clone())
        .ok_or("no problem file given on the command line or in the parameter file")?;
    let problem = Instance::from_path(&problem_path)?;
    let instance_name = problem_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("instance")
        .to_string();

    tracing::info!(
        instance = %instance_name,
        nodes = problem.len(),
        workers = args.workers,
        max_trials = params.max_trials,
        "starting solve"
    );

    let seeds: Vec<u64> = (0..args.workers as u64).map(|i| params.seed + i).collect();
    let pool = WorkerPool::new(RunConfig::from(&params));
    let factory = FnFactory(BaselineEngine::new);

    let start_ts = Utc::now();
    let t0 = Instant::now();
    let best = pool.run(&factory, &params, &problem, args.workers, &seeds)?;
    let runtime = t0.elapsed();
    let end_ts = Utc::now();

    let cost = (best.best.cost != Cost::MAX).then_some(best.best.cost);
    match cost {
        Some(cost) => tracing::info!(
            worker = best.worker_id,
            seed = best.seed,
            penalty = best.best.penalty,
            cost,
            runtime_ms = runtime.as_millis() as u64,
            "solve finished"
        ),
        None => tracing::warn!(
            penalty = best.best.penalty,
            runtime_ms = runtime.as_millis() as u64,
            "solve finished without an accepted tour"
        ),
    }

    if let Some(output) = &args.output {
        if best.tour.is_empty() {
            tracing::warn!("no tour to write, skipping {}", output.display());
        } else {
            let record = TourRecord::new(instance_name.clone(), best.best.cost, best.tour.clone());
            record.to_path(output)?;
            tracing::info!(file = %output.display(), "wrote tour file");
        }
    }

    if let Some(report) = &args.report {
        let record = RunRecord {
            instance: instance_name,
            workers: args.workers,
            seeds,
            max_trials: params.max_trials,
            start_ts,
            end_ts,
            runtime_ms: runtime.as_millis(),
            penalty: best.best.penalty,
            cost,
            best_worker: best.worker_id,
            best_trial: best.best_trial,
            dimension: best.dimension,
        };
        let json = serde_json::to_string_pretty(&record)?;
        File::create(report)?.write_all(json.as_bytes())?;
        tracing::info!(file = %report.display(), "wrote run record");
    }

    Ok(())
}
