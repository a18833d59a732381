//! Compiler for the ant behavior language.
//!
//! A program is plain text: a `colony <name>` declaration, then one
//! statement per line. `#` starts a comment, blank lines are skipped,
//! `name:` declares a jump label. Compilation runs two passes: the
//! first parses statements and records the instruction index of every
//! label, the second rewrites `goto`/`if` targets to absolute indices.
//! Label lines never reach the emitted program.
//!
//! Compilation is deterministic: the same source always produces the
//! same [`Program`], which keeps whole runs reproducible.

use thiserror::Error;

/// Sensed predicate an `if` statement can branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    /// Poison or an enemy insect on the square the ant faces.
    SmellDangerAhead,
    /// Own-colony pheromone on the square the ant faces.
    SmellPheromoneAhead,
    /// Bitten since the ant last moved.
    WasBitten,
    CarryingFood,
    /// Energy at or below the hunger threshold.
    Hungry,
    /// Standing on the ant's own colony's hill.
    OnMyHill,
    OnFood,
    /// An enemy insect shares the ant's square.
    EnemyHere,
    /// The last movement attempt hit a rock.
    WasBlocked,
    LastRandomWasZero,
}

/// One resolved instruction. Jump targets are absolute indices into
/// the owning [`Program`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    MoveForward,
    EatFood,
    DropFood,
    Bite,
    PickupFood,
    EmitPheromone,
    FaceRandom,
    RotateCw,
    RotateCcw,
    /// Draw a random number in `0..bound` into the ant's register
    /// (always 0 when `bound` is 0).
    Random { bound: u32 },
    Goto { target: usize },
    If { cond: Condition, target: usize },
}

impl Op {
    /// World-affecting opcodes consume the ant's single action for the
    /// tick; control flow does not.
    pub fn is_action(&self) -> bool {
        !matches!(self, Op::Random { .. } | Op::Goto { .. } | Op::If { .. })
    }
}

/// A compiled, label-resolved behavior program. Shared read-only by
/// every ant of one colony.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Program {
    instrs: Vec<Op>,
}

impl Program {
    pub fn get(&self, ip: usize) -> Option<Op> {
        self.instrs.get(ip).copied()
    }

    pub fn len(&self) -> usize {
        self.instrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instrs.is_empty()
    }
}

/// Compilation failure, carrying the 1-based source line.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompileError {
    #[error("line {line}: unknown label `{label}`")]
    UnknownLabel { line: u32, label: String },
    #[error("line {line}: unknown instruction `{mnemonic}`")]
    InvalidOpcode { line: u32, mnemonic: String },
    #[error("line {line}: unknown condition `{name}`")]
    InvalidCondition { line: u32, name: String },
    #[error("line {line}: {message}")]
    Syntax { line: u32, message: String },
}

/// Statement parsed in the first pass; jumps still name labels.
enum Pending {
    Ready(Op),
    Goto { label: String, line: u32 },
    If { cond: Condition, label: String, line: u32 },
}

/// Compile one behavior source into its colony display name and
/// resolved program.
pub fn compile(source: &str) -> Result<(String, Program), CompileError> {
    let mut colony_name: Option<String> = None;
    let mut pending: Vec<Pending> = Vec::new();
    let mut labels: std::collections::HashMap<String, usize> = std::collections::HashMap::new();

    for (idx, raw) in source.lines().enumerate() {
        let line = idx as u32 + 1;
        let text = raw.split('#').next().unwrap_or("").trim();
        if text.is_empty() {
            continue;
        }
        let tokens: Vec<&str> = text.split_whitespace().collect();

        // The first meaningful line must declare the colony name.
        let Some(name) = &colony_name else {
            if tokens[0] != "colony" {
                return Err(CompileError::Syntax {
                    line,
                    message: "expected `colony <name>` declaration".into(),
                });
            }
            if tokens.len() != 2 {
                return Err(CompileError::Syntax {
                    line,
                    message: "`colony` takes exactly one name".into(),
                });
            }
            colony_name = Some(tokens[1].to_string());
            continue;
        };
        let _ = name;

        if tokens[0] == "colony" {
            return Err(CompileError::Syntax {
                line,
                message: "duplicate `colony` declaration".into(),
            });
        }

        // Label definition: `name:` on its own line.
        if tokens.len() == 1 && tokens[0].ends_with(':') {
            let label = tokens[0].trim_end_matches(':');
            if label.is_empty() {
                return Err(CompileError::Syntax {
                    line,
                    message: "empty label name".into(),
                });
            }
            if labels.insert(label.to_string(), pending.len()).is_some() {
                return Err(CompileError::Syntax {
                    line,
                    message: format!("duplicate label `{label}`"),
                });
            }
            continue;
        }

        pending.push(parse_statement(&tokens, line)?);
    }

    let Some(name) = colony_name else {
        return Err(CompileError::Syntax {
            line: source.lines().count() as u32,
            message: "missing `colony <name>` declaration".into(),
        });
    };

    // Second pass: rewrite label references to absolute indices.
    let mut instrs = Vec::with_capacity(pending.len());
    for stmt in pending {
        let op = match stmt {
            Pending::Ready(op) => op,
            Pending::Goto { label, line } => Op::Goto {
                target: resolve(&labels, &label, line)?,
            },
            Pending::If { cond, label, line } => Op::If {
                cond,
                target: resolve(&labels, &label, line)?,
            },
        };
        instrs.push(op);
    }

    Ok((name, Program { instrs }))
}

fn resolve(
    labels: &std::collections::HashMap<String, usize>,
    label: &str,
    line: u32,
) -> Result<usize, CompileError> {
    labels.get(label).copied().ok_or_else(|| CompileError::UnknownLabel {
        line,
        label: label.to_string(),
    })
}

fn parse_statement(tokens: &[&str], line: u32) -> Result<Pending, CompileError> {
    let mnemonic = tokens[0];
    let operands = &tokens[1..];

    let expect_operands = |n: usize| -> Result<(), CompileError> {
        if operands.len() == n {
            Ok(())
        } else {
            Err(CompileError::Syntax {
                line,
                message: format!(
                    "`{mnemonic}` takes {n} operand(s), found {}",
                    operands.len()
                ),
            })
        }
    };

    let op = match mnemonic {
        "move_forward" => {
            expect_operands(0)?;
            Op::MoveForward
        }
        "eat_food" => {
            expect_operands(0)?;
            Op::EatFood
        }
        "drop_food" => {
            expect_operands(0)?;
            Op::DropFood
        }
        "bite" => {
            expect_operands(0)?;
            Op::Bite
        }
        "pickup_food" => {
            expect_operands(0)?;
            Op::PickupFood
        }
        "emit_pheromone" => {
            expect_operands(0)?;
            Op::EmitPheromone
        }
        "face_random" => {
            expect_operands(0)?;
            Op::FaceRandom
        }
        "rotate_cw" => {
            expect_operands(0)?;
            Op::RotateCw
        }
        "rotate_ccw" => {
            expect_operands(0)?;
            Op::RotateCcw
        }
        "random" => {
            expect_operands(1)?;
            let bound = operands[0].parse::<u32>().map_err(|_| CompileError::Syntax {
                line,
                message: format!("`random` bound must be a non-negative integer, found `{}`", operands[0]),
            })?;
            Op::Random { bound }
        }
        "goto" => {
            expect_operands(1)?;
            return Ok(Pending::Goto {
                label: operands[0].to_string(),
                line,
            });
        }
        "if" => {
            expect_operands(2)?;
            let cond = parse_condition(operands[0], line)?;
            return Ok(Pending::If {
                cond,
                label: operands[1].to_string(),
                line,
            });
        }
        other => {
            return Err(CompileError::InvalidOpcode {
                line,
                mnemonic: other.to_string(),
            })
        }
    };
    Ok(Pending::Ready(op))
}

fn parse_condition(name: &str, line: u32) -> Result<Condition, CompileError> {
    Ok(match name {
        "smell_danger_ahead" => Condition::SmellDangerAhead,
        "smell_pheromone_ahead" => Condition::SmellPheromoneAhead,
        "was_bitten" => Condition::WasBitten,
        "carrying_food" => Condition::CarryingFood,
        "hungry" => Condition::Hungry,
        "on_my_hill" => Condition::OnMyHill,
        "on_food" => Condition::OnFood,
        "enemy_here" => Condition::EnemyHere,
        "was_blocked" => Condition::WasBlocked,
        "last_random_was_zero" => Condition::LastRandomWasZero,
        other => {
            return Err(CompileError::InvalidCondition {
                line,
                name: other.to_string(),
            })
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compiles_minimal_program() {
        let src = "colony Walkers\nmove_forward\n";
        let (name, program) = compile(src).unwrap();
        assert_eq!(name, "Walkers");
        assert_eq!(program.len(), 1);
        assert_eq!(program.get(0), Some(Op::MoveForward));
        assert_eq!(program.get(1), None);
    }

    #[test]
    fn test_labels_resolve_and_are_elided() {
        let src = "\
colony Loopers
start:
  if on_food grab
  move_forward
  goto start
grab:
  pickup_food
  goto start
";
        let (_, program) = compile(src).unwrap();
        // 5 real instructions; both labels elided.
        assert_eq!(program.len(), 5);
        assert_eq!(
            program.get(0),
            Some(Op::If { cond: Condition::OnFood, target: 3 })
        );
        assert_eq!(program.get(2), Some(Op::Goto { target: 0 }));
        assert_eq!(program.get(3), Some(Op::PickupFood));
        assert_eq!(program.get(4), Some(Op::Goto { target: 0 }));
    }

    #[test]
    fn test_forward_reference_resolves() {
        let src = "colony C\ngoto end\nmove_forward\nend:\nbite\n";
        let (_, program) = compile(src).unwrap();
        assert_eq!(program.get(0), Some(Op::Goto { target: 2 }));
        assert_eq!(program.get(2), Some(Op::Bite));
    }

    #[test]
    fn test_compile_is_deterministic() {
        let src = "\
colony Twice
loop:
  random 8
  if last_random_was_zero rest
  move_forward
  goto loop
rest:
  emit_pheromone
  goto loop
";
        let first = compile(src).unwrap();
        let second = compile(src).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unknown_label_fails() {
        let src = "colony C\ngoto nowhere\n";
        let err = compile(src).unwrap_err();
        assert_eq!(
            err,
            CompileError::UnknownLabel { line: 2, label: "nowhere".into() }
        );
    }

    #[test]
    fn test_unknown_opcode_fails() {
        let src = "colony C\nfly_away\n";
        assert_eq!(
            compile(src).unwrap_err(),
            CompileError::InvalidOpcode { line: 2, mnemonic: "fly_away".into() }
        );
    }

    #[test]
    fn test_unknown_condition_fails() {
        let src = "colony C\nx:\nif feeling_lucky x\n";
        assert_eq!(
            compile(src).unwrap_err(),
            CompileError::InvalidCondition { line: 3, name: "feeling_lucky".into() }
        );
    }

    #[test]
    fn test_malformed_random_bound_fails() {
        let src = "colony C\nrandom lots\n";
        assert!(matches!(
            compile(src).unwrap_err(),
            CompileError::Syntax { line: 2, .. }
        ));
    }

    #[test]
    fn test_operand_count_checked() {
        let src = "colony C\nmove_forward now\n";
        assert!(matches!(
            compile(src).unwrap_err(),
            CompileError::Syntax { line: 2, .. }
        ));
        let src = "colony C\nx:\nif hungry\n";
        assert!(matches!(
            compile(src).unwrap_err(),
            CompileError::Syntax { line: 3, .. }
        ));
    }

    #[test]
    fn test_duplicate_label_fails() {
        let src = "colony C\na:\nmove_forward\na:\nbite\n";
        assert!(matches!(
            compile(src).unwrap_err(),
            CompileError::Syntax { line: 4, .. }
        ));
    }

    #[test]
    fn test_duplicate_colony_declaration_fails() {
        let src = "colony C\ncolony D\n";
        assert!(matches!(
            compile(src).unwrap_err(),
            CompileError::Syntax { line: 2, .. }
        ));
    }

    #[test]
    fn test_missing_colony_declaration_fails() {
        assert!(matches!(
            compile("move_forward\n").unwrap_err(),
            CompileError::Syntax { line: 1, .. }
        ));
        assert!(matches!(
            compile("").unwrap_err(),
            CompileError::Syntax { .. }
        ));
    }

    #[test]
    fn test_comments_and_blank_lines_ignored() {
        let src = "\
# a foraging program
colony Commented   # trailing comment

  # indented comment
move_forward
";
        let (name, program) = compile(src).unwrap();
        assert_eq!(name, "Commented");
        assert_eq!(program.len(), 1);
    }

    #[test]
    fn test_empty_body_compiles_to_empty_program() {
        let (_, program) = compile("colony Idle\n").unwrap();
        assert!(program.is_empty());
    }

    #[test]
    fn test_action_classification() {
        assert!(Op::MoveForward.is_action());
        assert!(Op::EmitPheromone.is_action());
        assert!(!Op::Goto { target: 0 }.is_action());
        assert!(!Op::Random { bound: 4 }.is_action());
        assert!(!Op::If { cond: Condition::Hungry, target: 0 }.is_action());
    }
}
