mod config;
use anyhow::Result;
use clap::Parser;
use config::DemoConfig;
use log::info;
use replay_core::{
    get_replay_buffer_with,
    replay_buffer::{Transition, TransitionBatch},
    ReplayBuffer, ReplayBufferArgs,
};
use std::path::PathBuf;

/// Build a replay buffer for a policy, fill it and sample a batch
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// YAML file with the policy and the environment
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(flatten)]
    rb: ReplayBufferArgs,

    /// Number of transitions pushed into the buffer
    #[arg(long, default_value_t = 10)]
    n_transitions: usize,

    /// Number of transitions sampled
    #[arg(long, default_value_t = 10)]
    batch_size: usize,

    /// Random seed for sampling, overriding the configuration file
    #[arg(long)]
    seed: Option<u64>,

    /// Show the configuration and exit
    #[arg(long, default_value_t = false)]
    show_config: bool,

    /// Save the configuration to the given YAML file
    #[arg(long)]
    save_config: Option<PathBuf>,
}

fn load_config(args: &Args) -> Result<DemoConfig> {
    let mut config = match &args.config {
        Some(path) => DemoConfig::load(path)?,
        None => DemoConfig::new()?,
    };
    if let Some(seed) = args.seed {
        config.selector = config.selector.seed(seed);
    }
    Ok(config)
}

/// Pushes transitions whose elements all equal the step index, then samples a batch.
fn run(args: &Args, config: &DemoConfig) -> Result<TransitionBatch> {
    let mut buffer = get_replay_buffer_with(&config.policy, &config.env, &args.rb, &config.selector)?;
    let (obs_dim, act_dim) = (buffer.obs_dim(), buffer.act_dim());

    for i in 0..args.n_transitions {
        let v = i as f32;
        let tr = Transition::new(
            vec![v; obs_dim],
            vec![v; act_dim],
            vec![v; obs_dim],
            v,
            false,
        );
        buffer.push(tr)?;
    }
    buffer.on_episode_end()?;
    info!("{:?}", buffer);

    buffer.batch(args.batch_size)
}

fn print_batch(batch: &TransitionBatch) {
    println!("obs:\n{}", batch.obs);
    println!("act:\n{}", batch.act);
    println!("next_obs:\n{}", batch.next_obs);
    println!("reward: {:?}", batch.reward);
    println!("is_done: {:?}", batch.is_done);
    if let Some(weight) = &batch.weight {
        println!("weight: {:?}", weight);
    }
    if let Some(discount) = &batch.discount {
        println!("discount: {:?}", discount);
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = load_config(&args)?;

    if let Some(path) = &args.save_config {
        config.save(path)?;
        info!("Saved configuration to {}", path.display());
    }

    if args.show_config {
        println!("{}", serde_yaml::to_string(&config)?);
        println!("{}", serde_yaml::to_string(&args.rb)?);
        return Ok(());
    }

    let batch = run(&args, &config)?;
    print_batch(&batch);

    Ok(())
}
