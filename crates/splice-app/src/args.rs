//! Command-line parsing.

use anyhow::{bail, Context, Result};
use splice_core::FrameRate;
use std::path::PathBuf;

pub const USAGE: &str = "\
usage: splice -o OUTPUT [options] CLIP...

options:
  -o, --output PATH        output file (.mp4, .mkv or .webm)
  --cut START_MS:END_MS    remove a global time range (repeatable)
  --audio PATH             replace all original audio with this file
  --hw                     prefer a hardware encoder
  --size WxH               output resolution (default 1920x1080)
  --fps N[/D]              output frame rate (default 30)
  --bitrate MBPS           target bitrate, snapped to 5..60 in steps of 5
  --ffmpeg PATH            encoder executable (default: search)
  --dry-run                print the command instead of running it";

/// Parsed command line.
#[derive(Debug, Default, PartialEq)]
pub struct Args {
    pub output: PathBuf,
    pub clips: Vec<PathBuf>,
    pub cuts: Vec<(i64, i64)>,
    pub audio: Option<PathBuf>,
    pub hardware: bool,
    pub size: Option<(u32, u32)>,
    pub fps: Option<FrameRate>,
    pub bitrate: Option<u32>,
    pub ffmpeg: Option<PathBuf>,
    pub dry_run: bool,
}

impl Args {
    pub fn parse(mut argv: impl Iterator<Item = String>) -> Result<Self> {
        let mut args = Args::default();
        let mut output = None;

        while let Some(arg) = argv.next() {
            let mut value = |name: &str| {
                argv.next()
                    .with_context(|| format!("{name} needs a value"))
            };
            match arg.as_str() {
                "-o" | "--output" => output = Some(PathBuf::from(value("--output")?)),
                "--cut" => args.cuts.push(parse_cut(&value("--cut")?)?),
                "--audio" => args.audio = Some(PathBuf::from(value("--audio")?)),
                "--hw" => args.hardware = true,
                "--size" => args.size = Some(parse_size(&value("--size")?)?),
                "--fps" => args.fps = Some(parse_fps(&value("--fps")?)?),
                "--bitrate" => {
                    let raw = value("--bitrate")?;
                    args.bitrate = Some(raw.parse().with_context(|| format!("bad bitrate {raw}"))?);
                }
                "--ffmpeg" => args.ffmpeg = Some(PathBuf::from(value("--ffmpeg")?)),
                "--dry-run" => args.dry_run = true,
                flag if flag.starts_with('-') => bail!("unknown option {flag}\n\n{USAGE}"),
                clip => args.clips.push(PathBuf::from(clip)),
            }
        }

        args.output = output.with_context(|| format!("missing --output\n\n{USAGE}"))?;
        if args.clips.is_empty() {
            bail!("no clips given\n\n{USAGE}");
        }
        Ok(args)
    }
}

fn parse_cut(raw: &str) -> Result<(i64, i64)> {
    let (start, end) = raw
        .split_once(':')
        .with_context(|| format!("cut {raw} is not START_MS:END_MS"))?;
    Ok((
        start.trim().parse().with_context(|| format!("bad cut start {start}"))?,
        end.trim().parse().with_context(|| format!("bad cut end {end}"))?,
    ))
}

fn parse_size(raw: &str) -> Result<(u32, u32)> {
    let (w, h) = raw
        .split_once(['x', 'X'])
        .with_context(|| format!("size {raw} is not WxH"))?;
    Ok((
        w.parse().with_context(|| format!("bad width {w}"))?,
        h.parse().with_context(|| format!("bad height {h}"))?,
    ))
}

fn parse_fps(raw: &str) -> Result<FrameRate> {
    let (num, den) = raw.split_once('/').unwrap_or((raw, "1"));
    Ok(FrameRate::new(
        num.parse().with_context(|| format!("bad frame rate {raw}"))?,
        den.parse().with_context(|| format!("bad frame rate {raw}"))?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Result<Args> {
        Args::parse(line.split_whitespace().map(String::from))
    }

    #[test]
    fn test_full_command_line() {
        let args = parse(
            "-o out.mkv --cut 2000:7000 --cut 100:200 --audio a.wav --hw \
             --size 1280x720 --fps 30000/1001 --bitrate 20 a.mp4 b.mp4",
        )
        .unwrap();
        assert_eq!(args.output, PathBuf::from("out.mkv"));
        assert_eq!(args.clips.len(), 2);
        assert_eq!(args.cuts, vec![(2000, 7000), (100, 200)]);
        assert_eq!(args.audio, Some(PathBuf::from("a.wav")));
        assert!(args.hardware);
        assert_eq!(args.size, Some((1280, 720)));
        assert_eq!(args.fps, Some(FrameRate::FPS_29_97));
        assert_eq!(args.bitrate, Some(20));
    }

    #[test]
    fn test_requires_output_and_clips() {
        assert!(parse("a.mp4").is_err());
        assert!(parse("-o out.mp4").is_err());
        assert!(parse("-o out.mp4 --bogus a.mp4").is_err());
        assert!(parse("-o out.mp4 --cut 5 a.mp4").is_err());
    }
}
