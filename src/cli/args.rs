use clap::Parser;
use std::path::PathBuf;

/// Emulate a receiving bank's responses to uploaded ACH files
#[derive(Parser, Debug)]
#[command(name = "ach-responder")]
#[command(
    about = "Emulate a receiving bank's responses to uploaded ACH files",
    long_about = None
)]
pub struct CliArgs {
    /// Configuration file with storage paths and response rules
    #[arg(value_name = "CONFIG", help = "Path to the JSON configuration file")]
    pub config: PathBuf,

    /// Transform a single file and exit instead of watching
    #[arg(
        long = "input",
        value_name = "FILE",
        help = "Transform this ACH file once and exit"
    )]
    pub input: Option<PathBuf>,

    /// How often to poll the inbound directory in watch mode
    #[arg(
        long = "poll-interval",
        value_name = "SECONDS",
        default_value_t = 5,
        help = "Seconds between inbound directory scans"
    )]
    pub poll_interval: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::watch_mode(&["program", "config.json"], None, 5)]
    #[case::one_shot(&["program", "config.json", "--input", "upload.ach"], Some("upload.ach"), 5)]
    #[case::custom_interval(&["program", "config.json", "--poll-interval", "30"], None, 30)]
    fn test_argument_parsing(
        #[case] args: &[&str],
        #[case] input: Option<&str>,
        #[case] poll_interval: u64,
    ) {
        let parsed = CliArgs::try_parse_from(args).unwrap();
        assert_eq!(parsed.config, PathBuf::from("config.json"));
        assert_eq!(parsed.input, input.map(PathBuf::from));
        assert_eq!(parsed.poll_interval, poll_interval);
    }

    #[rstest]
    #[case::missing_config(&["program"])]
    #[case::bad_interval(&["program", "config.json", "--poll-interval", "soon"])]
    fn test_parsing_errors(#[case] args: &[&str]) {
        assert!(CliArgs::try_parse_from(args).is_err());
    }
}
