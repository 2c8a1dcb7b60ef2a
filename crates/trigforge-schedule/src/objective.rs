use trigforge_core::effect::Effect;
use trigforge_core::graph::{GraphError, TriggerGraph};
use trigforge_core::id::TriggerId;
use trigforge_core::trigger::Objective;

/// Player-facing texts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectiveTexts {
    pub new_game: String,
    pub game_over: String,
    /// May reference registers as `<Name>`.
    pub stats: String,
}

impl Default for ObjectiveTexts {
    fn default() -> Self {
        Self {
            new_game: "Press \"Select all Universities\" to begin a new game.".into(),
            game_over: "Game Over! Press \"Select all Universities\" to play again.".into(),
            stats: "Score: <Score>\nLevel: <Level>\nLines: <Lines>".into(),
        }
    }
}

/// The three objective displays. Only the new-game instructions start
/// visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Objectives {
    pub new_game: TriggerId,
    pub game_over: TriggerId,
    pub stats: TriggerId,
}

impl Objectives {
    pub fn declare(graph: &mut TriggerGraph, texts: &ObjectiveTexts) -> Result<Self, GraphError> {
        let objective = |description: &str, order| Objective {
            description: description.to_string(),
            order,
        };
        let game_over = graph.declare_objective("Game Over Objective", objective(&texts.game_over, 100), false)?;
        let new_game = graph.declare_objective(
            "New Game Instructions Objective",
            objective(&texts.new_game, 50),
            true,
        )?;
        let stats = graph.declare_objective("Stats Objective", objective(&texts.stats, 0), false)?;
        Ok(Self {
            new_game,
            game_over,
            stats,
        })
    }

    /// Hide the round-start prompts and show the stats.
    pub fn round_start_effects(&self) -> Vec<Effect> {
        vec![
            Effect::Deactivate(self.new_game),
            Effect::Deactivate(self.game_over),
            Effect::Activate(self.stats),
        ]
    }
}

/// Substitute `<Name>` placeholders with register values.
pub fn render_description(description: &str, lookup: impl Fn(&str) -> Option<i32>) -> String {
    let mut out = String::with_capacity(description.len());
    let mut rest = description;
    while let Some(start) = rest.find('<') {
        out.push_str(&rest[..start]);
        let tail = &rest[start + 1..];
        match tail.find('>') {
            Some(end) => {
                let name = &tail[..end];
                match lookup(name) {
                    Some(value) => out.push_str(&value.to_string()),
                    None => {
                        out.push('<');
                        out.push_str(name);
                        out.push('>');
                    }
                }
                rest = &tail[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_instructions_start_visible() {
        let mut graph = TriggerGraph::new();
        let o = Objectives::declare(&mut graph, &ObjectiveTexts::default()).unwrap();
        assert!(graph.trigger(o.new_game).unwrap().initially_enabled);
        assert!(!graph.trigger(o.game_over).unwrap().initially_enabled);
        assert!(!graph.trigger(o.stats).unwrap().initially_enabled);
        assert!(graph.trigger(o.stats).unwrap().is_objective());
    }

    #[test]
    fn stats_text_substitutes_registers() {
        let text = ObjectiveTexts::default().stats;
        let rendered = render_description(&text, |name| match name {
            "Score" => Some(1200),
            "Level" => Some(3),
            "Lines" => Some(21),
            _ => None,
        });
        assert_eq!(rendered, "Score: 1200\nLevel: 3\nLines: 21");
    }

    #[test]
    fn unknown_and_unclosed_placeholders_are_kept() {
        assert_eq!(render_description("a <Nope> b", |_| None), "a <Nope> b");
        assert_eq!(render_description("x <open", |_| Some(1)), "x <open");
    }
}
