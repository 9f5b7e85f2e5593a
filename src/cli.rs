//! Command line arguments

use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "facepad", version, about = "Play a game with your eyebrows and mouth")]
pub struct Args {
    /// Camera device index
    #[arg(long, default_value_t = 0)]
    pub camera: i32,

    /// Requested capture size, e.g. 640x480
    #[arg(long, value_parser = parse_size)]
    pub size: Option<(u32, u32)>,

    /// Settings file (defaults to the user config directory)
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Detector configuration JSON
    #[arg(long)]
    pub detector_config: Option<PathBuf>,

    /// Haar cascade for face boxes, overrides the detector config
    #[arg(long)]
    pub cascade: Option<PathBuf>,

    /// LBF landmark model, overrides the detector config
    #[arg(long)]
    pub lbf_model: Option<PathBuf>,

    /// Faster, coarser face search (ignored with --detector-config)
    #[arg(long)]
    pub low_power: bool,

    /// Start with a guided calibration
    #[arg(long)]
    pub calibrate: bool,

    /// Samples averaged per calibration stage
    #[arg(long, default_value_t = 15)]
    pub calibration_samples: usize,

    /// Run without a preview window
    #[arg(long)]
    pub headless: bool,

    /// Where `s` saves snapshots
    #[arg(long, default_value = "snapshots")]
    pub snapshot_dir: PathBuf,

    /// Print the effective settings as JSON and exit
    #[arg(long)]
    pub print_settings: bool,
}

impl Args {
    pub fn settings_path(&self) -> PathBuf {
        self.settings.clone().unwrap_or_else(default_settings_path)
    }
}

fn default_settings_path() -> PathBuf {
    match dirs::config_dir() {
        Some(dir) => dir.join("facepad").join("settings.json"),
        None => PathBuf::from("facepad-settings.json"),
    }
}

fn parse_size(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {s:?}"))?;
    let w = w.trim().parse::<u32>().map_err(|e| format!("bad width: {e}"))?;
    let h = h.trim().parse::<u32>().map_err(|e| format!("bad height: {e}"))?;
    if w == 0 || h == 0 {
        return Err("size must be non-zero".into());
    }
    Ok((w, h))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("640x480"), Ok((640, 480)));
        assert_eq!(parse_size("1280X720"), Ok((1280, 720)));
        assert!(parse_size("640").is_err());
        assert!(parse_size("0x480").is_err());
        assert!(parse_size("axb").is_err());
    }

    #[test]
    fn test_args() {
        let args = Args::parse_from(["facepad", "--camera", "2", "--settings", "s.json", "--calibrate"]);
        assert_eq!(args.camera, 2);
        assert!(args.calibrate);
        assert_eq!(args.settings_path(), PathBuf::from("s.json"));
        assert_eq!(args.calibration_samples, 15);
        assert!(!args.low_power);

        let args = Args::parse_from(["facepad", "--low-power", "--size", "320x240"]);
        assert!(args.low_power);
        assert_eq!(args.size, Some((320, 240)));
    }
}
