use trigforge_core::condition::Condition;
use trigforge_core::effect::Effect;
use trigforge_core::graph::{GraphError, TriggerGraph};
use trigforge_core::id::TriggerId;
use trigforge_core::trigger::TriggerSpec;

/// Whether the step function produced a reaction. Arguments: `[reaction]`.
pub const DID_REACT: &str = "didReact";
/// Plays a reaction's sound/taunt. Arguments: `[reaction]`.
pub const PLAY_REACTION: &str = "playReaction";

/// Feedback events the step function can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reaction {
    Tetris,
    Move,
    Hold,
    HoldFail,
    Lock,
    GameOver,
    /// Alternative game-over taunt, chosen by the step function.
    GameOverEasterEgg,
}

impl Reaction {
    /// Reactions with their own per-tick trigger. Game over is played by the
    /// game-over phase itself; its easter egg is armed by that phase.
    pub const PER_TICK: [Reaction; 5] = [
        Reaction::Tetris,
        Reaction::Move,
        Reaction::Hold,
        Reaction::HoldFail,
        Reaction::Lock,
    ];

    pub fn code(self) -> i32 {
        match self {
            Reaction::Tetris => 1,
            Reaction::Move => 2,
            Reaction::Hold => 3,
            Reaction::HoldFail => 4,
            Reaction::Lock => 5,
            Reaction::GameOver => 6,
            Reaction::GameOverEasterEgg => 7,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Reaction::Tetris => "Tetris",
            Reaction::Move => "Move",
            Reaction::Hold => "Hold",
            Reaction::HoldFail => "Hold Fail",
            Reaction::Lock => "Lock",
            Reaction::GameOver => "Game Over",
            Reaction::GameOverEasterEgg => "Game Over Easter Egg",
        }
    }

    pub fn play_effect(self) -> Effect {
        Effect::script(PLAY_REACTION, [self.code()])
    }
}

fn declare_guarded(graph: &mut TriggerGraph, reaction: Reaction) -> Result<TriggerId, GraphError> {
    let id = graph.declare(format!("React {}", reaction.name()), TriggerSpec::ONE_SHOT)?;
    graph.add_condition(id, Condition::script(DID_REACT, [reaction.code()]))?;
    graph.add_effect(id, reaction.play_effect())?;
    Ok(id)
}

#[derive(Debug, Clone, Default)]
pub struct Reactions {
    nodes: Vec<(Reaction, TriggerId)>,
    easter_egg: Option<TriggerId>,
}

impl Reactions {
    /// Declare and wire one guarded one-shot trigger per reaction.
    pub fn declare(graph: &mut TriggerGraph) -> Result<Self, GraphError> {
        let mut nodes = Vec::new();
        for reaction in Reaction::PER_TICK {
            nodes.push((reaction, declare_guarded(graph, reaction)?));
        }
        Ok(Self {
            nodes,
            easter_egg: None,
        })
    }

    /// Declare the game-over easter egg. It must follow the game-over phase
    /// in declaration order so it fires in the tick that phase arms it.
    pub fn declare_easter_egg(&mut self, graph: &mut TriggerGraph) -> Result<TriggerId, GraphError> {
        let id = declare_guarded(graph, Reaction::GameOverEasterEgg)?;
        self.easter_egg = Some(id);
        Ok(id)
    }

    pub fn node(&self, reaction: Reaction) -> Option<TriggerId> {
        match reaction {
            Reaction::GameOverEasterEgg => self.easter_egg,
            _ => self.nodes.iter().find(|(r, _)| *r == reaction).map(|&(_, id)| id),
        }
    }

    pub fn easter_egg(&self) -> Option<TriggerId> {
        self.easter_egg
    }

    /// Per-tick reaction triggers; the easter egg is not among them.
    pub fn triggers(&self) -> impl Iterator<Item = TriggerId> + '_ {
        self.nodes.iter().map(|&(_, id)| id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn game_over_has_no_per_tick_trigger() {
        let mut graph = TriggerGraph::new();
        let reactions = Reactions::declare(&mut graph).unwrap();
        assert_eq!(reactions.triggers().count(), 5);
        assert!(reactions.node(Reaction::GameOver).is_none());
        let lock = reactions.node(Reaction::Lock).unwrap();
        assert_eq!(graph.name(lock), "React Lock");
        assert_eq!(graph.effects(lock).unwrap(), &[Effect::script(PLAY_REACTION, [5])]);
    }

    #[test]
    fn easter_egg_is_declared_on_request() {
        let mut graph = TriggerGraph::new();
        let mut reactions = Reactions::declare(&mut graph).unwrap();
        assert!(reactions.easter_egg().is_none());
        let egg = reactions.declare_easter_egg(&mut graph).unwrap();
        assert_eq!(reactions.node(Reaction::GameOverEasterEgg), Some(egg));
        assert_eq!(graph.name(egg), "React Game Over Easter Egg");
        assert_eq!(graph.conditions(egg).unwrap(), &[Condition::script(DID_REACT, [7])]);
        assert_eq!(graph.effects(egg).unwrap(), &[Effect::script(PLAY_REACTION, [7])]);
        assert!(!reactions.triggers().any(|id| id == egg));
        assert_eq!(graph.order().last(), Some(&egg));
    }
}
