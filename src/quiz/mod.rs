//! Curvature quiz.
//!
//! The quiz draws random expressions over the variables `x y z u v w`, asks
//! for their curvature and grades the answer against what the grammar parser
//! reports for the root. Five right answers in a row raise the difficulty,
//! five wrong ones lower it.

use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

use clap::ValueEnum;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;
use tracing::debug;

use crate::ast::{Expr, Span, Statement};
use crate::atoms::AtomRegistry;
use crate::cli::output::{print_error, print_heading, print_statement};
use crate::dcp::{Curvature, Sign};
use crate::diagnostics::{DcpError, SyntaxErrorKind};
use crate::syntax::{parse_line, Line, SymbolTable};

pub mod generator;
pub mod operators;

pub use generator::{Generator, Node};
pub use operators::{QuizOperator, Shape, OPERATORS, QUIZ_VARIABLES};

// Using a concrete, seedable PRNG so a seed replays the same quiz.
type QuizRng = Xoshiro256StarStar;

const STREAK_TO_LEVEL_UP: usize = 5;
const STREAK_TO_LEVEL_DOWN: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    const LEVELS: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// `(prob_terminate, prob_increase)` for the generator.
    pub fn params(self) -> (f64, f64) {
        match self {
            Difficulty::Easy => (0.05, 20.0),
            Difficulty::Medium => (0.01, 10.0),
            Difficulty::Hard => (0.01, 5.0),
        }
    }

    fn level(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        };
        f.write_str(name)
    }
}

/// Kinds of expression a question may ask about; the last one is built to
/// break the composition rules.
const QUESTION_KINDS: [(Shape, bool); 3] = [
    (
        Shape {
            positive: false,
            negative: false,
            convex: true,
            concave: false,
        },
        true,
    ),
    (
        Shape {
            positive: false,
            negative: false,
            convex: false,
            concave: true,
        },
        true,
    ),
    (
        Shape {
            positive: false,
            negative: false,
            convex: false,
            concave: false,
        },
        false,
    ),
];

#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    pub expression: String,
    pub statement: Statement,
}

impl Question {
    /// The curvature the analyzer assigns to the whole expression.
    pub fn curvature(&self) -> Curvature {
        match &self.statement {
            Statement::Expr(expr) => expr.curvature(),
            Statement::Constraint(_) => Curvature::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grade {
    pub expected: Curvature,
    pub answered: Curvature,
}

impl Grade {
    pub fn is_correct(&self) -> bool {
        self.expected == self.answered
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_correct() {
            write!(f, "Correct! The expression is {}.", display_name(self.expected))
        } else {
            write!(
                f,
                "Incorrect! The expression is {}, but you answered {}.",
                display_name(self.expected),
                display_name(self.answered)
            )
        }
    }
}

/// Name shown to the player; an unknown curvature is "non-DCP".
pub fn display_name(curvature: Curvature) -> &'static str {
    match curvature {
        Curvature::Unknown => "non-DCP",
        other => other.label(),
    }
}

/// Reads a typed answer. Accepts every curvature label plus `non-dcp`.
pub fn parse_answer(text: &str) -> Option<Curvature> {
    let text = text.trim().to_ascii_lowercase();
    match text.as_str() {
        "non-dcp" | "non-convex" | "nondcp" => Some(Curvature::Unknown),
        _ => Curvature::ALL
            .into_iter()
            .find(|curvature| curvature.label() == text),
    }
}

pub struct Quiz {
    generator: Generator<QuizRng>,
    atoms: Arc<AtomRegistry>,
    symbols: SymbolTable,
    level: usize,
    right_streak: usize,
    wrong_streak: usize,
}

impl Quiz {
    pub fn new(atoms: Arc<AtomRegistry>) -> Self {
        Self::with_rng(atoms, QuizRng::from_entropy())
    }

    /// A quiz that asks the same questions for the same seed.
    pub fn seeded(atoms: Arc<AtomRegistry>, seed: u64) -> Self {
        Self::with_rng(atoms, QuizRng::seed_from_u64(seed))
    }

    fn with_rng(atoms: Arc<AtomRegistry>, rng: QuizRng) -> Self {
        let mut symbols = SymbolTable::new();
        for name in QUIZ_VARIABLES {
            symbols.insert(name.to_string(), Expr::variable(name, Sign::Unknown));
        }
        Self {
            generator: Generator::new(rng),
            atoms,
            symbols,
            level: 0,
            right_streak: 0,
            wrong_streak: 0,
        }
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.level = difficulty.level();
        self
    }

    pub fn difficulty(&self) -> Difficulty {
        Difficulty::LEVELS[self.level.min(Difficulty::LEVELS.len() - 1)]
    }

    /// Draws a new expression and classifies it.
    pub fn next_question(&mut self) -> Result<Question, DcpError> {
        let (prob_terminate, prob_increase) = self.difficulty().params();
        let kind = self.generator.rng().gen_range(0..QUESTION_KINDS.len());
        let (shape, dcp) = QUESTION_KINDS[kind];
        let expression = self
            .generator
            .expression(&[shape], prob_terminate, prob_increase, dcp);
        debug!(%expression, difficulty = %self.difficulty(), "generated question");

        match parse_line(&expression, &mut self.symbols, &self.atoms)? {
            Line::Statement(statement) => Ok(Question {
                expression,
                statement,
            }),
            Line::Empty | Line::Declaration { .. } => Err(DcpError::syntax(
                SyntaxErrorKind::NoStatement,
                Span::new(0, expression.len()),
            )),
        }
    }

    /// Grades an answer and moves the difficulty after a long enough streak.
    pub fn grade(&mut self, question: &Question, answer: Curvature) -> Grade {
        let grade = Grade {
            expected: question.curvature(),
            answered: answer,
        };

        if grade.is_correct() {
            self.right_streak += 1;
            self.wrong_streak = 0;
        } else {
            self.right_streak = 0;
            self.wrong_streak += 1;
        }
        if self.right_streak >= STREAK_TO_LEVEL_UP {
            self.right_streak = 0;
            self.level = (self.level + 1).min(Difficulty::LEVELS.len() - 1);
        } else if self.wrong_streak >= STREAK_TO_LEVEL_DOWN {
            self.wrong_streak = 0;
            self.level = self.level.saturating_sub(1);
        }
        grade
    }
}

/// Interactive quiz loop on stdin/stdout.
pub fn run_quiz(mut quiz: Quiz) {
    println!("dcp-analyzer quiz v{}", env!("CARGO_PKG_VERSION"));
    println!("Answer constant, affine, convex, concave or non-dcp. :quit to exit.");
    println!();

    'questions: loop {
        let question = match quiz.next_question() {
            Ok(question) => question,
            Err(e) => {
                print_error(e);
                break;
            }
        };
        print_heading(&format!("[{}] {}", quiz.difficulty(), question.expression));

        loop {
            print!("answer> ");
            if io::stdout().flush().is_err() {
                break 'questions;
            }
            let mut line = String::new();
            match io::stdin().read_line(&mut line) {
                Ok(0) => {
                    println!("\nGoodbye!");
                    break 'questions;
                }
                Ok(_) => {}
                Err(e) => {
                    eprintln!("Error reading input: {}", e);
                    break 'questions;
                }
            }

            let line = line.trim();
            if matches!(line, ":quit" | ":q") {
                println!("Goodbye!");
                break 'questions;
            }
            match parse_answer(line) {
                Some(answer) => {
                    let grade = quiz.grade(&question, answer);
                    println!("{grade}");
                    print_statement(&question.statement);
                    println!();
                    break;
                }
                None => println!(
                    "Unknown answer: {}. Try constant, affine, convex, concave or non-dcp.",
                    line
                ),
            }
        }
    }
}
