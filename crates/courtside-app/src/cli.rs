// Command-line interface for the `courtside` binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use courtside_core::model::TeamId;
use courtside_core::Phase;

/// Pre-game team state compiler for a simulated league
#[derive(Debug, Parser)]
#[command(name = "courtside")]
#[command(about = "Build simulation-ready team states from league records")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Command {
    /// Write league state (season, phase, human-controlled teams)
    Init {
        /// Current season
        #[arg(long)]
        season: i32,

        /// Phase code, -2 (expansion draft) through 8 (free agency)
        #[arg(long, default_value = "1", value_parser = parse_phase, allow_negative_numbers = true)]
        phase: Phase,

        /// Team run by a human; repeat for several
        #[arg(long = "user-tid")]
        user_tids: Vec<TeamId>,
    },
    /// Import teams.csv, team_seasons.csv and players.csv from a directory
    Import {
        /// Directory holding the CSV files
        dir: PathBuf,
    },
    /// Build and print the pre-game state of the given teams
    Load {
        /// Team ids; pass -1 -2 for the exhibition game
        #[arg(required = true, allow_negative_numbers = true)]
        tids: Vec<TeamId>,
    },
}

fn parse_phase(value: &str) -> Result<Phase, String> {
    let code: i8 = value
        .parse()
        .map_err(|_| format!("invalid phase code `{value}`"))?;
    Phase::from_code(code).ok_or_else(|| format!("unknown phase code {code}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Command, clap::Error> {
        Cli::try_parse_from(std::iter::once("courtside").chain(args.iter().copied()))
            .map(|cli| cli.command)
    }

    #[test]
    fn parses_load_with_exhibition_ids() {
        assert_eq!(
            parse(&["load", "-1", "-2"]).unwrap(),
            Command::Load { tids: vec![-1, -2] }
        );
    }

    #[test]
    fn parses_init_flags_in_any_order() {
        let cmd = parse(&["init", "--user-tid", "4", "--phase", "3", "--season", "2025", "--user-tid", "7"])
            .unwrap();
        assert_eq!(
            cmd,
            Command::Init {
                season: 2025,
                phase: Phase::Playoffs,
                user_tids: vec![4, 7],
            }
        );
    }

    #[test]
    fn init_accepts_negative_phase_codes() {
        match parse(&["init", "--season", "2025", "--phase", "-2"]).unwrap() {
            Command::Init { phase, .. } => assert_eq!(phase, Phase::ExpansionDraft),
            other => panic!("expected Init, got {other:?}"),
        }
    }

    #[test]
    fn init_defaults_to_regular_season() {
        match parse(&["init", "--season", "2030"]).unwrap() {
            Command::Init { phase, user_tids, .. } => {
                assert_eq!(phase, Phase::RegularSeason);
                assert!(user_tids.is_empty());
            }
            other => panic!("expected Init, got {other:?}"),
        }
    }

    #[test]
    fn parses_import_dir() {
        assert_eq!(
            parse(&["import", "league/"]).unwrap(),
            Command::Import { dir: PathBuf::from("league/") }
        );
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["load"]).is_err());
        assert!(parse(&["load", "abc"]).is_err());
        assert!(parse(&["init"]).is_err());
        assert!(parse(&["init", "--season"]).is_err());
        assert!(parse(&["init", "--season", "2025", "--phase", "12"]).is_err());
        assert!(parse(&["import"]).is_err());
        assert!(parse(&["import", "a", "b"]).is_err());
        assert!(parse(&["simulate"]).is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
