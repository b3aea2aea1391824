use clap::Parser;
use indexmap::IndexMap;
use kendo_engine::{
    action_weights, decide_cpu_action, Catalog, DecisionContext, Dice, Distance, PlayerWindow,
    Stance,
};

#[derive(Parser)]
#[command(name = "cpu-profile")]
#[command(about = "Monte Carlo sampling of the CPU decision engine")]
struct Args {
    /// Distance: far | mid | close (kendo names accepted)
    #[arg(long, default_value = "mid")]
    distance: String,

    /// Player stance: defensive | aggressive
    #[arg(long, default_value = "defensive")]
    player_stance: String,

    /// CPU stance: defensive | aggressive
    #[arg(long, default_value = "aggressive")]
    cpu_stance: String,

    /// Player's recent action ids, oldest first (comma separated)
    #[arg(long, value_delimiter = ',')]
    recent: Vec<String>,

    /// Number of decisions to draw
    #[arg(long, default_value_t = 10_000)]
    samples: u32,

    /// RNG base seed (sample i uses seed+i)
    #[arg(long, default_value_t = 12345)]
    seed: u64,

    /// Techniques JSON replacing the built-in catalog
    #[arg(long)]
    techniques: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let catalog = match args.techniques.as_deref() {
        Some(path) => kendo_engine::config::load_catalog(path)?,
        None => Catalog::builtin()?,
    };
    let Some(distance) = Distance::parse(&args.distance) else {
        anyhow::bail!("unknown distance: {}", args.distance);
    };
    let Some(player_stance) = Stance::parse(&args.player_stance) else {
        anyhow::bail!("unknown stance: {}", args.player_stance);
    };
    let Some(cpu_stance) = Stance::parse(&args.cpu_stance) else {
        anyhow::bail!("unknown stance: {}", args.cpu_stance);
    };
    for id in &args.recent {
        if catalog.parse_action(id).is_none() {
            anyhow::bail!("unknown action in --recent: {}", id);
        }
    }

    let window = PlayerWindow::from(args.recent.clone());
    let ctx = DecisionContext {
        distance,
        player_stance,
        cpu_stance,
        recent_player_actions: &window,
    };

    let weights = action_weights(&catalog, &ctx);
    let total: i64 = weights.values().map(|w| (*w).max(0) as i64).sum();

    let mut counts: IndexMap<String, u32> =
        weights.keys().map(|id| (id.to_string(), 0)).collect();
    for i in 0..args.samples {
        let mut dice = Dice::from_seed(args.seed.wrapping_add(i as u64));
        let action = decide_cpu_action(&catalog, &ctx, &mut dice);
        *counts.entry(action.id().to_string()).or_insert(0) += 1;
    }

    println!(
        "context: {} | player {} | cpu {} | recent [{}]",
        distance.label(),
        player_stance.label(),
        cpu_stance.label(),
        args.recent.join(", ")
    );
    println!("samples: {}", args.samples);
    println!("{:<14} {:>6} {:>8} {:>8}", "action", "weight", "expected", "observed");
    for (id, weight) in &weights {
        let expected = if total > 0 {
            (*weight).max(0) as f64 / total as f64
        } else {
            0.0
        };
        let observed = if args.samples > 0 {
            counts.get(*id).copied().unwrap_or(0) as f64 / args.samples as f64
        } else {
            0.0
        };
        println!(
            "{:<14} {:>6} {:>7.1}% {:>7.1}%",
            id,
            weight,
            expected * 100.0,
            observed * 100.0
        );
    }
    Ok(())
}
