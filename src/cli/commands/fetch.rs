//! Tab and drum MIDI download commands.

use std::thread;

use crate::config::Config;
use crate::pipeline::{DownloadRequest, JobHandle, JobKind, JobOutcome, Pipeline};

/// Start one job per link and relay progress until all have finished.
pub fn cmd_fetch(config: &Config, kind: JobKind, links: &[String]) -> anyhow::Result<bool> {
    let pipeline = Pipeline::from_config(config);
    let destination = config.download_dir();
    println!("Saving to: {}", destination.display());

    let mut jobs = Vec::with_capacity(links.len());
    for link in links {
        let handle = pipeline.spawn(kind, DownloadRequest::new(link.as_str(), &destination))?;
        jobs.push((link.as_str(), handle));
    }

    let outcomes = relay_progress(jobs, config);

    println!();
    let mut all_ok = true;
    for (link, outcome) in &outcomes {
        match outcome {
            JobOutcome::Success(artifacts) => {
                println!("OK      {} -> {}", link, artifacts.tab.path.display());
                if let Some(midi) = &artifacts.drum_midi {
                    println!("        {} -> {}", link, midi.display());
                }
            }
            JobOutcome::Failed(reason) => {
                all_ok = false;
                eprintln!("FAILED  {}: {}", link, reason);
            }
        }
    }
    Ok(all_ok)
}

/// Poll every job's queue: drain until empty, sleep, repeat.
fn relay_progress<'a>(
    mut jobs: Vec<(&'a str, JobHandle)>,
    config: &Config,
) -> Vec<(&'a str, JobOutcome)> {
    let prefix = jobs.len() > 1;
    let mut outcomes = Vec::with_capacity(jobs.len());

    while !jobs.is_empty() {
        let mut still_running = Vec::with_capacity(jobs.len());
        for (link, handle) in jobs {
            // Check before draining so no message sent before exit is missed
            let finished = handle.is_finished();
            for message in handle.poll() {
                if prefix {
                    println!("[job {}] {}", handle.id(), message);
                } else {
                    println!("{}", message);
                }
            }
            if finished {
                outcomes.push((link, handle.wait()));
            } else {
                still_running.push((link, handle));
            }
        }
        jobs = still_running;

        if !jobs.is_empty() {
            thread::sleep(config.poll_interval());
        }
    }
    outcomes
}
