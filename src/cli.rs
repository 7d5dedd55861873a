use clap::Parser;
use std::path::PathBuf;

/// hwmon-fand — CPU temperature driven PWM fan control through hwmon
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// YAML config file path (default: search standard locations, else built-in defaults)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Detach from the terminal and run in the background
    #[arg(short = 'd', long = "daemonize", default_value = "false")]
    pub daemonize: bool,

    /// Log every control tick
    #[arg(short = 'v', long = "verbose", default_value = "false")]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_flags() {
        let cli = Cli::parse_from(["hwmon-fand", "-d", "-v", "--config", "/etc/fan.yml"]);
        assert!(cli.daemonize);
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("/etc/fan.yml")));

        let defaults = Cli::parse_from(["hwmon-fand"]);
        assert!(!defaults.daemonize && !defaults.verbose && defaults.config.is_none());
    }
}
