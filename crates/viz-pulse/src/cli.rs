//! Command-line argument parsing.

use clap::Parser;
use std::path::PathBuf;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "viz-pulse")]
#[command(about = "Turns live or recorded audio into bounded visualizer control signals", long_about = None)]
pub struct Args {
    /// Start capturing from the default microphone
    #[arg(long, conflicts_with = "file")]
    pub mic: bool,

    /// Start playing and analysing a WAV file
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Print input and output devices, then exit
    #[arg(long)]
    pub list_devices: bool,

    /// Log filter, e.g. "debug" or "viz_pulse=trace" (overrides the config file)
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Analysis ticks per second (overrides the config file)
    #[arg(long, value_name = "HZ", value_parser = clap::value_parser!(u32).range(1..=1000))]
    pub tick_rate: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_no_arguments() {
        let args = Args::try_parse_from(["viz-pulse"]).unwrap();
        assert!(!args.mic);
        assert!(args.file.is_none());
        assert!(args.tick_rate.is_none());
    }

    #[test]
    fn test_file_and_rate() {
        let args =
            Args::try_parse_from(["viz-pulse", "--file", "set.wav", "--tick-rate", "30"]).unwrap();
        assert_eq!(args.file, Some(PathBuf::from("set.wav")));
        assert_eq!(args.tick_rate, Some(30));
    }

    #[test]
    fn test_mic_conflicts_with_file() {
        assert!(Args::try_parse_from(["viz-pulse", "--mic", "--file", "a.wav"]).is_err());
    }

    #[test]
    fn test_zero_tick_rate_rejected() {
        assert!(Args::try_parse_from(["viz-pulse", "--tick-rate", "0"]).is_err());
    }
}
