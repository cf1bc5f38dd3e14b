//! A simple CLI tool for auditing campus stake allocation and elections.
//! It replays a recorded scenario through the same engine the server runs,
//! so its results are by definition those the server would have produced.

use std::fs::File;
use std::io::BufReader;

use clap::{Arg, ArgAction, ArgMatches, Command};
use rocket::serde::json::serde_json;

use campus_stake::error::Error as EngineError;
use campus_stake::model::{
    election::VotingOutcome,
    scenario::{Replay, Scenario},
};

const PROGRAM_NAME: &str = "audit-campus-stake";

const ABOUT_TEXT: &str = "Replay a campus stake scenario and report its outcome.

EXIT CODES:
     0: Replay succeeded.
   255: Ran successfully, but the engine rejected an operation.
 Other: Error.";

const SCENARIO_PATH: &str = "SCENARIO_PATH";

const SCENARIO_PATH_HELP: &str = "The path to a JSON scenario: owner, balances, \
modules, bids and an optional election with its votes";

/// Construct the CLI configuration.
fn cli() -> Command {
    // Make the build dirty when the toml changes.
    include_str!("../Cargo.toml");

    clap::command!(PROGRAM_NAME).about(ABOUT_TEXT).arg(
        Arg::new(SCENARIO_PATH)
            .help(SCENARIO_PATH_HELP)
            .action(ArgAction::Set)
            .required(true),
    )
}

/// Errors that this program may produce.
#[derive(Debug, Eq, PartialEq)]
enum Error {
    /// IO error described by the inner message.
    IO(String),
    /// Failed to decode the JSON scenario.
    Format(String),
    /// The engine rejected one of the recorded operations.
    Replay(EngineError),
}

/// Load and replay a scenario.
fn replay(path: &str) -> Result<Replay, Error> {
    let file = BufReader::new(File::open(path).map_err(|e| Error::IO(e.to_string()))?);
    let scenario: Scenario =
        serde_json::from_reader(file).map_err(|e| Error::Format(e.to_string()))?;
    scenario.replay().map_err(Error::Replay)
}

fn join<T: ToString>(items: &[T]) -> String {
    if items.is_empty() {
        return "-".to_string();
    }
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Render a replay for humans.
fn report(replay: &Replay) -> String {
    let mut lines = vec!["Allocation:".to_string()];
    for module in &replay.allocation {
        lines.push(format!(
            "  {} (quota {}): {} of {} bidders allocated: {}",
            module.code,
            module.quota,
            module.allocated.len(),
            module.bidders.len(),
            join(&module.allocated)
        ));
    }

    if let Some(election) = &replay.election {
        lines.push("Election:".to_string());
        lines.push(format!("  Tally: {}", join(&election.results)));
        lines.push(match &election.outcome {
            VotingOutcome::WinningVote {
                option_index,
                option,
                weight,
            } => format!("  Option {option} (index {option_index}) wins with weight {weight}"),
            VotingOutcome::Draw {
                option_indices,
                weight,
            } => format!(
                "  Draw between indices {} at weight {weight}",
                join(option_indices)
            ),
        });
        if let Some(reward) = &election.reward {
            lines.push(format!(
                "  Reward: {} tokens paid to {}; unpaid: {}",
                reward.total_paid,
                join(&reward.paid),
                join(&reward.unpaid)
            ));
        }
    }

    lines.push("Balances:".to_string());
    for (account, balance) in &replay.balances {
        lines.push(format!("  {account}: {balance}"));
    }
    lines.join("\n")
}

/// Run the replay, report the result, and return the exit code.
fn run(args: &ArgMatches) -> u8 {
    let path: &String = args.get_one(SCENARIO_PATH).unwrap(); // Required argument is guaranteed to be present.
    match replay(path) {
        Ok(replay) => {
            println!("Replay succeeded.");
            println!("{}", report(&replay));
            0
        }
        Err(Error::IO(msg)) => {
            println!("IO error: {}", msg);
            1
        }
        Err(Error::Format(msg)) => {
            println!("Invalid JSON: {}", msg);
            1
        }
        Err(Error::Replay(err)) => {
            println!("Replay rejected ({:?}): {}", err.kind(), err);
            255
        }
    }
}

fn main() {
    let args = cli().get_matches();
    let exit_code = run(&args);
    std::process::exit(exit_code.into())
}

#[cfg(test)]
mod tests {
    use campus_stake::model::common::{AccountId, ModuleCode};

    use super::*;

    fn accounts(names: &[&str]) -> Vec<AccountId> {
        names.iter().copied().map(AccountId::from).collect()
    }

    #[test]
    fn replays() {
        // This test actually enters engine code, so enable logging.
        log4rs_test_utils::test_logging::init_logging_once_for(["campus_stake"], None, None);

        let replayed = replay("scenario_dumps/campus.json").unwrap();
        let codes = replayed
            .allocation
            .iter()
            .map(|module| module.code)
            .collect::<Vec<_>>();
        assert_eq!(
            codes,
            vec![
                "CS1010".parse::<ModuleCode>().unwrap(),
                "MA1101S".parse().unwrap()
            ]
        );
        assert_eq!(replayed.allocation[0].allocated, accounts(&["s2"]));
        assert_eq!(replayed.allocation[1].allocated, accounts(&["s2", "s1"]));

        let election = replayed.election.as_ref().unwrap();
        assert_eq!(election.results, vec![100, 200]);
        let reward = election.reward.as_ref().unwrap();
        assert_eq!(reward.paid, accounts(&["s1", "s2"]));
        assert_eq!(replayed.balances[&AccountId::from("s2")], 201);

        let text = report(&replayed);
        assert!(text.contains("CS1010 (quota 1): 1 of 2 bidders allocated: s2"));
        assert!(text.contains("Option 1 (index 1) wins with weight 200"));
        assert!(text.starts_with("Allocation:\n"));
        assert!(text.contains("\nBalances:\n  "));

        let replayed = replay("scenario_dumps/draw.json").unwrap();
        let election = replayed.election.unwrap();
        assert_eq!(
            election.outcome,
            VotingOutcome::Draw {
                option_indices: vec![0, 1],
                weight: 200
            }
        );
        let reward = election.reward.unwrap();
        assert_eq!(reward.paid, accounts(&["s3"]));
        assert_eq!(reward.unpaid, accounts(&["s4"]));

        assert!(matches!(
            replay("scenario_dumps/campus_short_of_voters.json"),
            Err(Error::Replay(EngineError::InsufficientVoters {
                current: 1,
                minimum: 2
            }))
        ));
        assert!(matches!(
            replay("scenario_dumps/campus_malformed.json"),
            Err(Error::Format(_))
        ));
    }

    #[test]
    fn correct_cli_usage() {
        let command_line = [PROGRAM_NAME, "scenario_dumps/campus.json"];
        let args = cli().try_get_matches_from(command_line).unwrap();
        assert_eq!(run(&args), 0);

        let command_line = [PROGRAM_NAME, "scenario_dumps/campus_short_of_voters.json"];
        let args = cli().try_get_matches_from(command_line).unwrap();
        assert_eq!(run(&args), 255);

        let command_line = [PROGRAM_NAME, "scenario_dumps/campus_malformed.json"];
        let args = cli().try_get_matches_from(command_line).unwrap();
        assert_eq!(run(&args), 1);

        let command_line = [PROGRAM_NAME, "not a real file"];
        let args = cli().try_get_matches_from(command_line).unwrap();
        assert_eq!(run(&args), 1);
    }

    #[test]
    fn bad_cli_usage() {
        // Something very wrong.
        let command_line = [PROGRAM_NAME, "this", "invocation", "is", "incorrect"];
        cli().try_get_matches_from(command_line).unwrap_err();

        // No options at all.
        let command_line = [PROGRAM_NAME];
        cli().try_get_matches_from(command_line).unwrap_err();
    }
}
