//! Agent taking uniformly random actions.
use crate::{error::DrexError, Act, Agent, Obs, Space};
use anyhow::Result;
use rand::{rngs::SmallRng, SeedableRng};

/// Samples actions from the action space of the base environment.
///
/// Observations, rewards and episode ends are ignored.
pub struct RandomAgent {
    space: Space,
    rng: SmallRng,
}

impl RandomAgent {
    /// Constructs an agent sampling from `space`.
    ///
    /// A discrete space without actions is a [`DrexError::Config`].
    pub fn new(space: Space, seed: u64) -> Result<Self> {
        if let Space::Discrete { n } = &space {
            if *n <= 0 {
                return Err(DrexError::config(format!(
                    "cannot sample from a discrete space of {} actions",
                    n
                ))
                .into());
            }
        }
        Ok(Self {
            space,
            rng: SmallRng::seed_from_u64(seed),
        })
    }
}

impl Agent for RandomAgent {
    fn act(&mut self, _obs: &Obs, _reward: f32, _done: bool) -> Result<Act> {
        Ok(self.space.sample(&mut self.rng))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_actions_in_space() -> Result<()> {
        let space = Space::Discrete { n: 6 };
        let mut agent = RandomAgent::new(space.clone(), 42)?;
        let obs = Obs::dummy(&[1, 4]);
        let mut seen = [false; 6];

        for _ in 0..200 {
            let act = agent.act(&obs, 0.0, false)?;
            assert!(space.contains(&act));
            if let Act::Discrete(a) = act {
                seen[a as usize] = true;
            }
        }
        assert!(seen.iter().all(|&s| s));
        Ok(())
    }

    #[test]
    fn test_same_seed_same_actions() -> Result<()> {
        let space = Space::Box {
            low: vec![-1.0; 2],
            high: vec![1.0; 2],
            shape: vec![2],
        };
        let obs = Obs::dummy(&[1, 4]);
        let mut a1 = RandomAgent::new(space.clone(), 3)?;
        let mut a2 = RandomAgent::new(space, 3)?;
        for _ in 0..10 {
            assert_eq!(a1.act(&obs, 0.0, false)?, a2.act(&obs, 1.0, true)?);
        }
        Ok(())
    }

    #[test]
    fn test_wide_box_actions_in_space() -> Result<()> {
        let space = Space::Box {
            low: vec![-f32::MAX],
            high: vec![f32::MAX],
            shape: vec![1],
        };
        let mut agent = RandomAgent::new(space.clone(), 0)?;
        let obs = Obs::dummy(&[1, 4]);

        for _ in 0..100 {
            let act = agent.act(&obs, 0.0, false)?;
            assert!(space.contains(&act), "{:?}", act);
        }
        Ok(())
    }

    #[test]
    fn test_empty_discrete_space_rejected() {
        for n in [0, -1].iter() {
            let err = RandomAgent::new(Space::Discrete { n: *n }, 0).err().unwrap();
            assert!(matches!(
                err.downcast_ref::<DrexError>(),
                Some(DrexError::Config(_))
            ));
        }
    }
}
