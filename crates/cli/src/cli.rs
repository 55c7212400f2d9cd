use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "shellmir")]
#[command(about = "Replay compositor lifecycle scripts against the shellmir coordinator")]
#[command(version)]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug, -vvv trace)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// Run a JSON-lines script and print the resulting notifications and snapshot
	Replay {
		/// Script file, one step per line
		script: PathBuf,

		/// Lifecycle config file (camelCase JSON)
		#[arg(long, value_name = "FILE")]
		config: Option<PathBuf>,

		/// Stop frame dropping on surfaces of suspended sessions
		#[arg(long)]
		throttle: bool,

		/// Application id exempt from suspension (repeatable)
		#[arg(long = "exempt", value_name = "APP")]
		exempt: Vec<String>,
	},

	/// Validate a lifecycle config file and print it with defaults filled in
	CheckConfig {
		#[arg(value_name = "FILE")]
		file: PathBuf,
	},
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn replay_collects_repeated_exempt_flags() {
		let cli = Cli::try_parse_from(["shellmir", "-vv", "replay", "s.jsonl", "--exempt", "a", "--exempt", "b", "--throttle"]).expect("parse");
		assert_eq!(cli.verbose, 2);
		match cli.command {
			Commands::Replay { exempt, throttle, config, .. } => {
				assert_eq!(exempt, vec!["a", "b"]);
				assert!(throttle);
				assert!(config.is_none());
			}
			other => panic!("unexpected command {other:?}"),
		}
	}

	#[test]
	fn check_config_requires_a_file() {
		assert!(Cli::try_parse_from(["shellmir", "check-config"]).is_err());
	}
}
