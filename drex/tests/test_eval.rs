use anyhow::Result;
use clap::Parser;
use drex::{run, Args, EvalConfig};
use drex_candle_agent::{PolicyAgent, PolicyAgentConfig};
use drex_core::{
    dummy::{ScriptLog, ScriptedEnv},
    error::DrexError,
    Act, EnvComposerConfig, EnvStats, EnvType, RunningMeanStd, Space, VecEnv,
};
use std::{cell::RefCell, path::Path, rc::Rc};
use tempdir::TempDir;

fn config(args: &[&str]) -> Result<EvalConfig> {
    let args = Args::parse_from(std::iter::once("drex-eval").chain(args.iter().copied()));
    EvalConfig::from_args(&args)
}

fn maker(
    log: Rc<RefCell<ScriptLog>>,
    obs_shape: Vec<usize>,
    action_space: Space,
) -> impl Fn(&EnvComposerConfig) -> Result<Box<dyn VecEnv>> {
    move |_: &EnvComposerConfig| {
        let env = ScriptedEnv::new(vec![1.0, 2.0, 3.0])
            .obs_shape(obs_shape.clone())
            .action_space(action_space.clone())
            .log_to(log.clone());
        Ok(Box::new(env) as Box<dyn VecEnv>)
    }
}

fn box_space() -> Space {
    Space::Box {
        low: vec![-1.0; 2],
        high: vec![1.0; 2],
        shape: vec![2],
    }
}

/// Saves a freshly initialized mujoco policy and unit statistics for 4-dimensional observations.
fn save_mujoco_model(model_path: &Path) -> Result<()> {
    let config = PolicyAgentConfig::default()
        .env_type(EnvType::Mujoco)
        .use_gpu(false);
    PolicyAgent::build(config, &[4], &box_space())?.save(model_path)?;
    EnvStats {
        ob_rms: RunningMeanStd {
            mean: vec![0.0; 4],
            var: vec![1.0; 4],
            count: 10.0,
        },
        ret_rms: None,
    }
    .save(model_path)
}

#[test]
fn test_random_agent() -> Result<()> {
    let log = Rc::new(RefCell::new(ScriptLog::default()));
    let config = config(&["--env_name", "pong", "--random", "--episode_count", "2"])?;
    let mut out = Vec::new();

    let results = run(
        &config,
        &maker(log.clone(), vec![8, 8], Space::Discrete { n: 6 }),
        &mut out,
    )?;

    assert_eq!(String::from_utf8(out)?, "3 6\n3 6\n");
    assert_eq!(results.len(), 2);
    assert_eq!(log.borrow().resets, 2);
    assert_eq!(log.borrow().closed, 1);
    Ok(())
}

#[test]
fn test_no_op_takes_precedence_over_random() -> Result<()> {
    let log = Rc::new(RefCell::new(ScriptLog::default()));
    let config = config(&[
        "--env_name",
        "pong",
        "--random",
        "--no_op",
        "--episode_count",
        "1",
    ])?;
    let mut out = Vec::new();

    run(
        &config,
        &maker(log.clone(), vec![8, 8], Space::Discrete { n: 6 }),
        &mut out,
    )?;

    assert_eq!(String::from_utf8(out)?, "3 6\n");
    assert_eq!(log.borrow().actions, vec![Act::Discrete(0); 3]);
    Ok(())
}

#[test]
fn test_missing_model_closes_env() -> Result<()> {
    let tmp = TempDir::new("eval")?;
    let model_path = tmp.path().join("missing.safetensors");
    let log = Rc::new(RefCell::new(ScriptLog::default()));
    let config = config(&[
        "--env_name",
        "pong",
        "--cpu",
        "--model_path",
        model_path.to_str().unwrap(),
    ])?;
    let mut out = Vec::new();

    let err = run(
        &config,
        &maker(log.clone(), vec![84, 84], Space::Discrete { n: 6 }),
        &mut out,
    )
    .err()
    .unwrap();

    assert!(matches!(
        err.downcast_ref::<DrexError>(),
        Some(DrexError::Load { .. })
    ));
    assert!(out.is_empty());
    assert_eq!(log.borrow().closed, 1);
    Ok(())
}

#[test]
fn test_mujoco_policy_agent() -> Result<()> {
    let tmp = TempDir::new("eval")?;
    let model_path = tmp.path().join("hopper.safetensors");
    save_mujoco_model(&model_path)?;

    let log = Rc::new(RefCell::new(ScriptLog::default()));
    let config = config(&[
        "--env_name",
        "hopper",
        "--env_type",
        "mujoco",
        "--cpu",
        "--episode_count",
        "1",
        "--model_path",
        model_path.to_str().unwrap(),
    ])?;
    let mut out = Vec::new();

    run(&config, &maker(log.clone(), vec![4], box_space()), &mut out)?;

    assert_eq!(String::from_utf8(out)?, "3 6\n");
    let log = log.borrow();
    assert_eq!(log.actions.len(), 3);
    assert!(log
        .actions
        .iter()
        .all(|a| matches!(a, Act::Continuous(v) if v.len() == 2)));
    Ok(())
}

#[test]
fn test_mujoco_isolated_agent() -> Result<()> {
    let tmp = TempDir::new("eval")?;
    let model_path = tmp.path().join("hopper.safetensors");
    save_mujoco_model(&model_path)?;

    let log = Rc::new(RefCell::new(ScriptLog::default()));
    let config = config(&[
        "--env_name",
        "hopper",
        "--env_type",
        "mujoco",
        "--cpu",
        "--isolated",
        "--episode_count",
        "1",
        "--model_path",
        model_path.to_str().unwrap(),
    ])?;
    let mut out = Vec::new();

    run(&config, &maker(log, vec![4], box_space()), &mut out)?;
    assert_eq!(String::from_utf8(out)?, "3 6\n");
    Ok(())
}

#[test]
fn test_mujoco_missing_stats() -> Result<()> {
    let tmp = TempDir::new("eval")?;
    let model_path = tmp.path().join("hopper.safetensors");
    let agent_config = PolicyAgentConfig::default()
        .env_type(EnvType::Mujoco)
        .use_gpu(false);
    PolicyAgent::build(agent_config, &[4], &box_space())?.save(&model_path)?;

    let log = Rc::new(RefCell::new(ScriptLog::default()));
    let config = config(&[
        "--env_name",
        "hopper",
        "--env_type",
        "mujoco",
        "--cpu",
        "--model_path",
        model_path.to_str().unwrap(),
    ])?;
    let mut out = Vec::new();

    let err = run(&config, &maker(log.clone(), vec![4], box_space()), &mut out)
        .err()
        .unwrap();
    assert!(matches!(
        err.downcast_ref::<DrexError>(),
        Some(DrexError::Load { .. })
    ));
    assert_eq!(log.borrow().closed, 1);
    Ok(())
}
