use anyhow::{anyhow, Result};
use clap::{arg, Command};
use rand::{rngs::StdRng, SeedableRng};
use sgp_challenge::social_golfer::{Challenge, Solution};
use std::{
    fs,
    io::Read,
    time::{SystemTime, UNIX_EPOCH},
};

fn cli() -> Command {
    Command::new("sgp-scorer")
        .about("Scores candidate schedules for the social golfer problem")
        .arg_required_else_help(true)
        .subcommand(
            Command::new("score")
                .about("Evaluates a candidate schedule against an instance")
                .arg(
                    arg!(<INSTANCE> "Path to an instance definition file")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(
                    arg!(<SOLUTION> "Solution json string, path to json file, or '-' for stdin")
                        .value_parser(clap::value_parser!(String)),
                ),
        )
        .subcommand(
            Command::new("random")
                .about("Generates a random well-formed candidate schedule")
                .arg(
                    arg!(<INSTANCE> "Path to an instance definition file")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(
                    arg!(--seed [SEED] "Seed for the random generator")
                        .value_parser(clap::value_parser!(u64)),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Checks that a candidate schedule is structurally valid")
                .arg(
                    arg!(<INSTANCE> "Path to an instance definition file")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(
                    arg!(<SOLUTION> "Solution json string, path to json file, or '-' for stdin")
                        .value_parser(clap::value_parser!(String)),
                ),
        )
}

fn main() {
    let matches = cli().get_matches();

    if let Err(e) = match matches.subcommand() {
        Some(("score", sub_m)) => score(
            sub_m.get_one::<String>("INSTANCE").unwrap().clone(),
            sub_m.get_one::<String>("SOLUTION").unwrap().clone(),
        ),
        Some(("random", sub_m)) => random(
            sub_m.get_one::<String>("INSTANCE").unwrap().clone(),
            sub_m.get_one::<u64>("seed").cloned(),
        ),
        Some(("check", sub_m)) => check(
            sub_m.get_one::<String>("INSTANCE").unwrap().clone(),
            sub_m.get_one::<String>("SOLUTION").unwrap().clone(),
        ),
        _ => Err(anyhow!("Invalid subcommand")),
    } {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn score(instance: String, solution: String) -> Result<()> {
    let challenge = load_instance(&instance)?;
    let solution = load_solution(&solution)?;
    println!("{}", challenge.evaluate_solution(&solution));
    Ok(())
}

fn random(instance: String, seed: Option<u64>) -> Result<()> {
    let challenge = load_instance(&instance)?;
    let mut rng = StdRng::seed_from_u64(seed.unwrap_or_else(time));
    let solution = challenge.random_solution(&mut rng);
    println!("{}", serde_json::to_string(&solution)?);
    Ok(())
}

fn check(instance: String, solution: String) -> Result<()> {
    let challenge = load_instance(&instance)?;
    let solution = load_solution(&solution)?;
    challenge.verify_solution(&solution)?;
    println!("Solution is valid");
    Ok(())
}

fn time() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis() as u64
}

fn load_instance(path: &str) -> Result<Challenge> {
    let contents = fs::read_to_string(path)
        .map_err(|e| anyhow!("Failed to read instance file '{}': {}", path, e))?;
    Challenge::from_instance_str(&contents)
}

fn load_solution(solution: &str) -> Result<Solution> {
    let solution = if solution == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| anyhow!("Failed to read solution from stdin: {}", e))?;
        buffer
    } else if solution.ends_with(".json") {
        fs::read_to_string(solution)
            .map_err(|e| anyhow!("Failed to read solution file '{}': {}", solution, e))?
    } else {
        solution.to_string()
    };

    let map = serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(&solution)
        .map_err(|e| anyhow!("Failed to parse solution: {}", e))?;
    Solution::try_from(map).map_err(|e| anyhow!("Failed to parse solution: {}", e))
}
