use anyhow::Context;
use clap::Parser;
use generator::profile::build_trace;
use gui_bridge::bridge::{gui_bind_address, GuiBridge};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::WorkflowConfig;
use workflow::runner::Runner;
use workflow::settings_store::YamlSettingsStore;

mod generator;
mod gui_bridge;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Peak overlay workflow driver")]
struct Args {
    /// Replay a synthetic orientation trace and print the resulting overlay
    #[arg(long, default_value_t = false)]
    offline: bool,
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    /// Samples averaged by each orientation filter
    #[arg(long, default_value_t = 10)]
    window: usize,
    #[arg(long, default_value_t = 1280.0)]
    width: f64,
    #[arg(long, default_value_t = 720.0)]
    height: f64,
    /// Heading of the steady synthetic trace, degrees
    #[arg(long, default_value_t = 30.0)]
    heading: f64,
    #[arg(long, default_value_t = 60)]
    samples: usize,
    /// Override where calibration settings are kept
    #[arg(long)]
    settings: Option<PathBuf>,
    /// JSON peak list to project instead of the synthetic ring
    #[arg(long)]
    peaks: Option<PathBuf>,
    /// Keep the HTTP bridge alive for incoming orientation readings
    #[arg(long, default_value_t = false)]
    serve: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut workflow_config = if let Some(path) = &args.workflow {
        WorkflowConfig::load(path)?
    } else {
        WorkflowConfig::from_args(args.window, args.width, args.height, args.heading, args.samples)
    };
    if args.settings.is_some() {
        workflow_config.settings_path = args.settings.clone();
    }
    if args.peaks.is_some() {
        workflow_config.peaks_path = args.peaks.clone();
    }

    let peaks = Arc::new(workflow_config.load_peaks()?);
    let trace = build_trace(&workflow_config.trace)?;

    let runner = Runner::new(workflow_config.clone());
    let store = YamlSettingsStore::new(workflow_config.settings_path());
    log::info!(
        "settings at {}, replaying {} samples over {} peaks",
        store.path().display(),
        workflow_config.trace.total_samples(),
        peaks.len()
    );
    let session = Arc::new(Mutex::new(runner.open_session(store)?));
    let gui_bridge = GuiBridge::new(session.clone(), peaks.clone(), workflow_config.viewport);

    if args.offline {
        let result = {
            let mut guard = session
                .lock()
                .map_err(|_| anyhow::anyhow!("overlay session lock poisoned"))?;
            runner.execute(&mut *guard, &trace, peaks.as_slice())?
        };

        println!(
            "Offline run -> phase {}, heading {:.1}, variance {}, labels {}",
            result.model.phase,
            result.model.heading_deg,
            result.model.variance,
            result.model.labels.len()
        );
        for note in &result.calibration_notes {
            println!("  calibration: {}", note);
        }

        gui_bridge.publish(&result.model)?;
        gui_bridge.publish_status("Offline overlay ready.");

        let report = format!(
            "phase={} heading={:.1} variance={} labels={} accepted={} dropped={}\n",
            result.model.phase,
            result.model.heading_deg,
            result.model.variance,
            result.model.labels.len(),
            result.metrics.samples_accepted,
            result.metrics.samples_dropped
        );
        let report_path = PathBuf::from("tools/data/offline_overlay.log");
        if let Some(parent) = report_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&report_path)
            .with_context(|| format!("opening report {}", report_path.display()))?;
        file.write_all(report.as_bytes())?;
    }
    if args.serve {
        gui_bridge.refresh();
        gui_bridge.serve(gui_bind_address());
        gui_bridge.publish_status("HTTP bridge running (Ctrl+C to stop)...");
        let runtime = TokioBuilder::new_current_thread()
            .enable_all()
            .build()
            .context("creating runtime for signal handling")?;
        runtime.block_on(async {
            signal::ctrl_c().await.context("awaiting Ctrl+C to exit")?;
            Ok::<(), anyhow::Error>(())
        })?;
    }

    Ok(())
}
