//! Splice - cut-list video exporter
//!
//! Probes the given clips, applies the requested cuts and exports the kept
//! regions through FFmpeg.

mod args;

use anyhow::{Context, Result};
use args::Args;
use splice_media::{EncoderPreference, ExportCompiler, ExportRunner, ExportSettings, MediaProbe};
use splice_timeline::EditSession;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse(std::env::args().skip(1))?;

    let mut session = EditSession::new();
    for path in &args.clips {
        let probe = MediaProbe::probe(path)
            .with_context(|| format!("failed to probe {}", path.display()))?;
        session.add_probed_clip(
            path,
            probe.duration_ms,
            probe.width,
            probe.height,
            probe.has_audio,
        )?;
    }
    info!(
        "Loaded {} clips, {} total",
        session.timeline().len(),
        splice_core::format_clock(session.timeline().total_duration_ms())
    );

    for &(start, end) in &args.cuts {
        session.cut(start, end);
    }
    info!(
        "Keeping {} in {} segments",
        splice_core::format_clock(session.kept_duration_ms()),
        session.segments().len()
    );

    let mut settings = ExportSettings::new(&args.output)?;
    if let Some(mbps) = args.bitrate {
        settings = settings.with_bitrate(ExportSettings::snap_bitrate(mbps));
    }
    if let Some((width, height)) = args.size {
        settings = settings.with_resolution(width, height);
    }
    if let Some(fps) = args.fps {
        settings = settings.with_frame_rate(fps);
    }
    if let Some(audio) = &args.audio {
        settings = settings.with_external_audio(audio);
    }
    if args.hardware {
        settings = settings.with_encoder_preference(EncoderPreference::Hardware);
    }

    let compiler = match &args.ffmpeg {
        Some(path) => ExportCompiler::with_encoder(path),
        None => ExportCompiler::detect(),
    };
    let plan = compiler.compile_session(&session, &settings)?;

    if args.dry_run {
        println!("{}", plan.command().join(" "));
        return Ok(());
    }

    let runner = ExportRunner::new();
    runner.start(plan)?.wait()?;
    info!("Wrote {}", settings.output_path.display());

    Ok(())
}
