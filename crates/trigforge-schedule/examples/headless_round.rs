//! Headless round: compiles the default scenario, drives it with a toy game
//! host for a few rounds and prints what the trigger graph did.
//!
//! Run with: `RUST_LOG=debug cargo run --package trigforge-schedule --example headless_round`

use trigforge_core::engine::Engine;
use trigforge_core::host::ScriptHost;
use trigforge_core::id::{ObjectId, RegisterId, VisualId};
use trigforge_core::register::RegisterBank;
use trigforge_core::rng::SimRng;
use trigforge_core::script::{SWAP_SLOTS, ScriptCall};
use trigforge_render::preview::{IS_HELD_PIECE, IS_NEXT_PIECE};
use trigforge_render::{Cell, Facing, GroundTruth, Occupant, Tetromino};
use trigforge_schedule::objective::render_description;
use trigforge_schedule::scheduler::calls;
use trigforge_schedule::{ScenarioConfig, SequentialLayout, compile};
use tracing_subscriber::EnvFilter;

const ROUND_LENGTH: u32 = 12;
const TICKS: u64 = 40;

/// A falling-piece toy: each update drops the current piece one row in
/// column 4 and ends the round after a fixed number of updates.
struct ToyGame {
    truth: GroundTruth,
    updates: u32,
    rounds: u32,
    row: u32,
    replaced: usize,
    score: RegisterId,
}

impl ToyGame {
    fn new(score: RegisterId) -> Self {
        Self {
            truth: GroundTruth::new(),
            updates: 0,
            rounds: 0,
            row: 10,
            replaced: 0,
            score,
        }
    }

    fn current_piece(registers: &RegisterBank) -> Tetromino {
        let slot = registers
            .lookup("Sequence A 0")
            .and_then(|id| registers.get(id))
            .unwrap_or(0);
        Tetromino::ALL[usize::try_from(slot).unwrap_or(0) % Tetromino::ALL.len()]
    }

    fn paint(&mut self, occupant: Occupant) {
        for facing in Facing::ALL {
            self.truth.set(Cell::new(self.row, 4), facing, occupant);
        }
    }
}

impl ScriptHost for ToyGame {
    fn evaluate(&mut self, call: &ScriptCall, registers: &RegisterBank) -> bool {
        if let Some(answer) = self.truth.evaluate(call) {
            return answer;
        }
        match call.function.as_str() {
            calls::CAN_BEGIN_GAME => self.rounds < 2,
            calls::IS_GAME_OVER => self.updates >= ROUND_LENGTH,
            calls::SHOULD_SHUFFLE => self.updates % 7 == 6,
            IS_NEXT_PIECE => match call.args[..] {
                [k, piece] => {
                    let name = format!("Sequence B {k}");
                    registers
                        .lookup(&name)
                        .and_then(|id| registers.get(id))
                        .is_some_and(|slot| slot + 1 == piece)
                }
                _ => false,
            },
            IS_HELD_PIECE => call.args == [Occupant::Empty.code()],
            _ => false,
        }
    }

    fn invoke(&mut self, call: &ScriptCall, registers: &mut RegisterBank) {
        match call.function.as_str() {
            SWAP_SLOTS => {
                if let [a, b] = call.args[..] {
                    if let (Some(a), Some(b)) = (RegisterId::from_arg(a), RegisterId::from_arg(b)) {
                        let _ = registers.swap(a, b);
                    }
                }
            }
            calls::BEGIN_GAME => {
                self.rounds += 1;
                self.updates = 0;
                self.row = 10;
                self.truth = GroundTruth::new();
            }
            calls::UPDATE => {
                self.updates += 1;
                self.paint(Occupant::Empty);
                self.row = if self.row >= 19 { 10 } else { self.row + 1 };
                self.paint(Occupant::Piece(Self::current_piece(registers)));
                let score = registers.get(self.score).unwrap_or(0);
                let _ = registers.set(self.score, score + 10);
            }
            _ => {}
        }
    }

    fn is_selected(&mut self, _object: ObjectId) -> bool {
        false
    }

    fn replace_object(&mut self, _object: ObjectId, _visual: VisualId) {
        self.replaced += 1;
    }
}

fn print_objectives(engine: &Engine) {
    let registers = engine.registers();
    for (_, objective) in engine.visible_objectives() {
        let text = render_description(&objective.description, |name| {
            registers.lookup(name).and_then(|id| registers.get(id))
        });
        println!("      objective: {}", text.replace('\n', " | "));
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = ScenarioConfig::default();
    let layout = SequentialLayout::new(&config);
    let scenario = match compile(&config, &layout) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("compile failed: {e}");
            std::process::exit(1);
        }
    };
    println!(
        "Compiled {} triggers, {} registers ({} board renders, {} preview renders)",
        scenario.graph.len(),
        scenario.registers.len(),
        scenario.board.len(),
        scenario.previews.len()
    );

    let mut engine = scenario.engine();
    let mut game = ToyGame::new(scenario.stats.score);
    let mut rng = SimRng::new(2024);

    for _ in 0..TICKS {
        let before = game.replaced;
        let report = engine.step(&mut game, &mut rng);
        println!(
            "--- tick {:>3}: fired {:>3}, flips {:>2}, replaced {:>3}, hash {:#018x}",
            report.tick,
            report.fired.len(),
            report.flips,
            game.replaced - before,
            report.state_hash
        );
        if report.did_fire(scenario.phases.begin_round) || report.did_fire(scenario.phases.game_over) {
            print_objectives(&engine);
        }
    }

    let sequence = scenario.round_start.buffer().values(engine.registers());
    println!("Sequence A after {TICKS} ticks: {sequence:?}");
}
