use std::env;
use std::fs;
use std::io::{self, BufRead, Write};

use chrono::Utc;
use simplechain::pow::DEFAULT_PROGRESS_EVERY;
use simplechain::{Block, Blockchain, CancelToken, ProofOfWork, SolveObserver, SolveOutcome};

/// Spinner-style liveness feedback while the puzzle search runs.
struct SpinnerObserver;

impl SolveObserver for SpinnerObserver {
    fn started(&self, difficulty: &str) {
        print!(
            "Computing proof of work ({} leading zeros) ",
            difficulty.len()
        );
        let _ = io::stdout().flush();
    }

    fn progress(&self, _attempts: u64) {
        print!(".");
        let _ = io::stdout().flush();
    }

    fn finished(&self, outcome: &SolveOutcome) {
        match outcome {
            SolveOutcome::Solved { nonce } => println!("\nProblem solved!\nNonce: {nonce}"),
            SolveOutcome::Cancelled => println!("\nSearch cancelled."),
        }
    }
}

fn main() {
    let _ = dotenvy::dotenv();
    env_logger::init();

    let progress_every: u64 = env::var("PROGRESS_EVERY")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_PROGRESS_EVERY);

    let mut pow = ProofOfWork::new();
    pow.set_progress_every(progress_every);
    let mut bc = Blockchain::with_engine(pow);

    println!("⛓️ simplechain ready");

    let stdin = io::stdin();
    loop {
        print_menu();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break, // EOF
            Ok(_) => {}
            Err(err) => {
                eprintln!("Failed to read input: {err}");
                break;
            }
        }
        println!();

        let input = line.trim();
        if let Some(path) = input.strip_prefix("replace ") {
            replace(&mut bc, path.trim());
            continue;
        }

        match input.to_lowercase().as_str() {
            "print" => println!("Blockchain as of: {}\n\n{}", Utc::now(), bc.render()),
            "mine" => mine(&mut bc),
            "quit" => {
                println!("Quitting...");
                break;
            }
            "" => {}
            _ => println!("Invalid command. Please try again.\n"),
        }
    }
}

fn print_menu() {
    print!(
        "Simplechain functions:\n\
         Type 'print' to print the current blockchain\n\
         Type 'mine' to mine a new block\n\
         Type 'replace <file>' to adopt a longer chain from a JSON file\n\
         Type 'quit' to quit\n> "
    );
    let _ = io::stdout().flush();
}

fn mine(bc: &mut Blockchain) {
    print!("Enter payload for block\n> ");
    let _ = io::stdout().flush();

    let mut payload = String::new();
    if io::stdin().lock().read_line(&mut payload).is_err() {
        println!("Failed to read payload.\n");
        return;
    }
    let payload = payload.trim_end_matches(['\r', '\n']).to_string();

    match bc.append_payload_with(payload, &CancelToken::new(), &SpinnerObserver) {
        Ok(height) => println!("Block successfully added. (height: {height})\n"),
        Err(err) => println!("Error occurred mining new block: {err}\n"),
    }
}

fn replace(bc: &mut Blockchain, path: &str) {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) => {
            println!("Failed to read {path}: {err}\n");
            return;
        }
    };
    let candidate: Vec<Block> = match serde_json::from_str(&raw) {
        Ok(chain) => chain,
        Err(err) => {
            println!("Failed to parse {path}: {err}\n");
            return;
        }
    };

    match bc.replace_with(candidate) {
        Ok(()) => println!("Blockchain successfully replaced. Fork resolved.\n"),
        Err(err) => println!("Incoming blockchain rejected: {err}\n"),
    }
}
