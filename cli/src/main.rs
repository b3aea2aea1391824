use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use encoding_rs::Encoding;
use kendo_engine::{
    action_weights, decide_cpu_action, parse_config, resolve_distance, ActionProfile, AnyArbiter,
    Catalog, ConfigFormat, DecisionContext, Dice, Distance, MatchConfig, MatchSession, MatchState,
    Movement, PlayerWindow, Referee, Stance,
};
use serde_json::json;
use std::io::{self, BufRead, Write};
use std::{fs, path::Path, path::PathBuf};
use tokio::runtime::Runtime;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Copy, Clone, ValueEnum)]
enum StanceArg {
    #[value(alias = "chudan")]
    Defensive,
    #[value(alias = "jodan")]
    Aggressive,
}

impl From<StanceArg> for Stance {
    fn from(s: StanceArg) -> Stance {
        match s {
            StanceArg::Defensive => Stance::Defensive,
            StanceArg::Aggressive => Stance::Aggressive,
        }
    }
}

#[derive(Copy, Clone, ValueEnum)]
enum DistanceArg {
    #[value(alias = "toh-ma")]
    Far,
    #[value(alias = "issoku-itto")]
    Mid,
    #[value(alias = "chika-ma")]
    Close,
}

impl From<DistanceArg> for Distance {
    fn from(d: DistanceArg) -> Distance {
        match d {
            DistanceArg::Far => Distance::Far,
            DistanceArg::Mid => Distance::Mid,
            DistanceArg::Close => Distance::Close,
        }
    }
}

#[derive(Subcommand)]
enum Cmd {
    /// Fight a match against the CPU in the terminal
    Play {
        /// Match config (.yaml, .yml or .json)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Player stance; overrides the config file
        #[arg(long, value_enum)]
        stance: Option<StanceArg>,
        /// RNG seed for the CPU and the Ippon roll; overrides the config file
        #[arg(long)]
        seed: Option<u64>,
    },
    /// List every selectable action
    Catalog {
        /// Print JSON instead of a table
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Resolve the distance after one exchange of movements
    Distance {
        #[arg(long, value_enum)]
        current: DistanceArg,
        /// Player action id
        #[arg(long)]
        player: String,
        /// CPU action id
        #[arg(long)]
        cpu: String,
    },
    /// Show the CPU weight table for a context and draw one action
    Decide {
        #[arg(long, value_enum, default_value_t = DistanceArg::Mid)]
        distance: DistanceArg,
        #[arg(long, value_enum, default_value_t = StanceArg::Defensive)]
        player_stance: StanceArg,
        #[arg(long, value_enum, default_value_t = StanceArg::Aggressive)]
        cpu_stance: StanceArg,
        /// Player's recent action ids, oldest first (comma separated)
        #[arg(long, value_delimiter = ',')]
        recent: Vec<String>,
        /// RNG seed for the draw
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
}

#[derive(Parser)]
#[command(name = "kendo")]
#[command(about = "Kendo duel against an adaptive CPU")]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("kendo=info,kendo_engine=info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Play {
            config,
            stance,
            seed,
        } => {
            let mut cfg = match config {
                Some(path) => read_config(&path)?,
                None => MatchConfig::default(),
            };
            if let Some(stance) = stance {
                cfg.player_stance = stance.into();
            }
            if seed.is_some() {
                cfg.seed = seed;
            }
            play(cfg)?;
        }
        Cmd::Catalog { json } => {
            let catalog = Catalog::builtin()?;
            if json {
                let movements: Vec<_> = Movement::ALL
                    .iter()
                    .map(|m| json!({ "id": m.id(), "name": m.name() }))
                    .collect();
                let out = json!({ "techniques": catalog.techniques(), "movements": movements });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                for t in catalog.techniques() {
                    println!(
                        "{:<14} {} ({}) [{:?}]",
                        t.id, t.name, t.japanese, t.category
                    );
                    println!("{:<14} {}", "", t.description);
                }
                for m in Movement::ALL {
                    println!("{:<14} {}", m.id(), m.name());
                }
            }
        }
        Cmd::Distance {
            current,
            player,
            cpu,
        } => {
            let catalog = Catalog::builtin()?;
            let Some(p) = catalog.parse_action(&player) else {
                bail!("unknown player action: {}", player);
            };
            let Some(c) = catalog.parse_action(&cpu) else {
                bail!("unknown cpu action: {}", cpu);
            };
            let current: Distance = current.into();
            let next = resolve_distance(current, &p, &c);
            println!("{} -> {}", current.label(), next.label());
        }
        Cmd::Decide {
            distance,
            player_stance,
            cpu_stance,
            recent,
            seed,
        } => {
            let catalog = Catalog::builtin()?;
            let window = PlayerWindow::from(recent);
            let ctx = DecisionContext {
                distance: distance.into(),
                player_stance: player_stance.into(),
                cpu_stance: cpu_stance.into(),
                recent_player_actions: &window,
            };
            for (id, weight) in action_weights(&catalog, &ctx) {
                println!("{:<14} {:>4}", id, weight);
            }
            let mut dice = Dice::from_seed(seed);
            let action = decide_cpu_action(&catalog, &ctx, &mut dice);
            println!("cpu: {}", action.id());
        }
    }
    Ok(())
}

fn play(cfg: MatchConfig) -> Result<()> {
    let rt = Runtime::new()?;
    let catalog = cfg.catalog()?;
    let arbiter = AnyArbiter::from_env(&cfg.arbiter.clone().with_env_overrides());
    if !arbiter.is_available() {
        println!("No arbiter configured (set ARBITER_API_KEY); exchanges will be voided.");
    }
    let dice = match cfg.seed {
        Some(seed) => Dice::from_seed(seed),
        None => Dice::from_entropy(),
    };

    let ids: Vec<String> = catalog.action_ids().map(String::from).collect();
    let profiles: Vec<ActionProfile> = ids
        .iter()
        .filter_map(|id| catalog.parse_action(id))
        .map(|a| catalog.profile(&a))
        .collect();
    info!(
        player = cfg.player_stance.label(),
        cpu = cfg.cpu_stance.label(),
        seed = ?cfg.seed,
        "match started"
    );
    let session = MatchSession::new(
        Referee::new(catalog, arbiter, dice),
        MatchState::from_config(&cfg),
    );

    print_actions(&profiles);
    print_state(&session.snapshot());

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input == "quit" || input == "q" {
            break;
        }
        if input == "help" || input == "?" {
            print_actions(&profiles);
            continue;
        }
        if let Some(rest) = input.strip_prefix("reset") {
            let stance = Stance::parse(rest).unwrap_or(cfg.player_stance);
            match session.reset(stance) {
                Ok(fresh) => print_state(&fresh),
                Err(e) => println!("{}", e),
            }
            continue;
        }

        let id = match input.parse::<usize>() {
            Ok(n) if (1..=ids.len()).contains(&n) => ids[n - 1].as_str(),
            _ => input,
        };
        match rt.block_on(session.submit(id)) {
            Ok(report) => {
                println!(
                    "You: {}  |  CPU: {}",
                    report.outcome.player_action, report.outcome.cpu_action
                );
                println!("{}", report.outcome.reason);
                print_state(&report.state);
                if let Some(side) = report.state.winner() {
                    println!(
                        "{} wins the match. `reset` to fight again, `quit` to leave.",
                        side.name()
                    );
                }
            }
            Err(e) => println!("{}", e),
        }
    }
    Ok(())
}

fn print_actions(profiles: &[ActionProfile]) {
    for (i, p) in profiles.iter().enumerate() {
        println!("{:>2}. {:<14} {}", i + 1, p.id, p.name);
    }
    println!("Enter a number or id; `reset [chudan|jodan]`, `help`, `quit`.");
}

fn print_state(state: &MatchState) {
    println!(
        "[Player {} - {} CPU] distance: {}  ({} vs {})",
        state.player_score,
        state.cpu_score,
        state.distance.label(),
        state.player_stance.label(),
        state.cpu_stance.label()
    );
}

fn read_config(path: &Path) -> Result<MatchConfig> {
    let format = ConfigFormat::from_path(path)?;
    let text = read_text_auto(path)
        .with_context(|| format!("failed to read match config: {}", path.display()))?;
    parse_config(&text, format)
        .with_context(|| format!("failed to parse match config: {}", path.display()))
}

fn read_text_auto(path: &Path) -> Result<String> {
    let bytes = fs::read(path)?;
    if let Some((enc, bom_len)) = Encoding::for_bom(&bytes) {
        let (cow, _, _) = enc.decode(&bytes[bom_len..]);
        Ok(cow.into_owned())
    } else {
        Ok(String::from_utf8(bytes)?)
    }
}
