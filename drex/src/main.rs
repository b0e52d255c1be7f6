use anyhow::Result;
use clap::Parser;
use drex::{run, Args, EvalConfig};
use drex_py_gym_env::GymEnvMaker;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = EvalConfig::from_args(&args)?;
    if args.show_config {
        print!("{}", serde_yaml::to_string(&config)?);
        return Ok(());
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run(&config, &GymEnvMaker, &mut out)?;

    Ok(())
}
