//! Operator table the quiz generator draws from.
//!
//! Every entry is a template: `prefix`, the children joined by `infix`, then
//! `suffix`. Terminals render as their prefix alone. The `shape` of an entry
//! says what kind of expression it produces; each entry in `arguments` is one
//! admissible shape for the child at `position`.

/// Sign and curvature flags of a generated expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shape {
    pub positive: bool,
    pub negative: bool,
    pub convex: bool,
    pub concave: bool,
}

impl Shape {
    /// Whether an operator producing `self` may stand where `wanted` is
    /// requested. A set flag on the operator matches anything.
    pub fn satisfies(self, wanted: Shape) -> bool {
        (self.positive == wanted.positive || self.positive)
            && (self.negative == wanted.negative || self.negative)
            && (self.convex == wanted.convex || self.convex)
            && (self.concave == wanted.concave || self.concave)
    }
}

/// One admissible shape for the argument at `position`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgumentShape {
    pub position: usize,
    pub shape: Shape,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuizOperator {
    pub prefix: &'static str,
    pub infix: &'static str,
    pub suffix: &'static str,
    pub terminal: bool,
    pub num_args: usize,
    pub weight: f64,
    pub shape: Shape,
    pub arguments: &'static [ArgumentShape],
}

impl QuizOperator {
    /// Admissible shapes for the child at `position`.
    pub fn argument_shapes(&self, position: usize) -> Vec<Shape> {
        self.arguments
            .iter()
            .filter(|argument| argument.position == position)
            .map(|argument| argument.shape)
            .collect()
    }
}

pub const DEFAULT_WEIGHT: f64 = 1000.0;

const fn shape(positive: bool, negative: bool, convex: bool, concave: bool) -> Shape {
    Shape {
        positive,
        negative,
        convex,
        concave,
    }
}

const fn arg(position: usize, shape: Shape) -> ArgumentShape {
    ArgumentShape { position, shape }
}

const AFFINE: Shape = shape(false, false, true, true);
const CONVEX: Shape = shape(false, false, true, false);
const CONCAVE: Shape = shape(false, false, false, true);
const POSITIVE_CONVEX: Shape = shape(true, false, true, false);
const POSITIVE_CONCAVE: Shape = shape(true, false, false, true);
const NEGATIVE_CONCAVE: Shape = shape(false, true, false, true);

/// Arguments of an even, sign-dependent atom such as `abs` or `square`.
const EVEN_ARGUMENT: [ArgumentShape; 3] = [
    arg(0, POSITIVE_CONVEX),
    arg(0, NEGATIVE_CONCAVE),
    arg(0, AFFINE),
];

const NORM_ARGUMENTS: [ArgumentShape; 6] = [
    arg(0, POSITIVE_CONVEX),
    arg(0, NEGATIVE_CONCAVE),
    arg(0, AFFINE),
    arg(1, POSITIVE_CONVEX),
    arg(1, NEGATIVE_CONCAVE),
    arg(1, AFFINE),
];

const fn terminal(prefix: &'static str, weight: f64) -> QuizOperator {
    QuizOperator {
        prefix,
        infix: "",
        suffix: "",
        terminal: true,
        num_args: 0,
        weight,
        shape: AFFINE,
        arguments: &[],
    }
}

const fn call(
    prefix: &'static str,
    num_args: usize,
    weight: f64,
    shape: Shape,
    arguments: &'static [ArgumentShape],
) -> QuizOperator {
    QuizOperator {
        prefix,
        infix: ", ",
        suffix: ")",
        terminal: false,
        num_args,
        weight,
        shape,
        arguments,
    }
}

const fn binary(
    infix: &'static str,
    weight: f64,
    shape: Shape,
    arguments: &'static [ArgumentShape],
) -> QuizOperator {
    QuizOperator {
        prefix: "",
        infix,
        suffix: "",
        terminal: false,
        num_args: 2,
        weight,
        shape,
        arguments,
    }
}

const CONVEX_ARGUMENT: [ArgumentShape; 1] = [arg(0, CONVEX)];
const CONCAVE_ARGUMENT: [ArgumentShape; 1] = [arg(0, CONCAVE)];
const AFFINE_ARGUMENT: [ArgumentShape; 1] = [arg(0, AFFINE)];
const CONVEX_PAIR: [ArgumentShape; 2] = [arg(0, CONVEX), arg(1, CONVEX)];
const CONCAVE_PAIR: [ArgumentShape; 2] = [arg(0, CONCAVE), arg(1, CONCAVE)];
const AFFINE_PAIR: [ArgumentShape; 2] = [arg(0, AFFINE), arg(1, AFFINE)];
const CONVEX_MINUS_CONCAVE: [ArgumentShape; 2] = [arg(0, CONVEX), arg(1, CONCAVE)];
const CONCAVE_MINUS_CONVEX: [ArgumentShape; 2] = [arg(0, CONCAVE), arg(1, CONVEX)];
const QUAD_OVER_LIN_ARGUMENTS: [ArgumentShape; 4] = [
    arg(0, POSITIVE_CONVEX),
    arg(0, NEGATIVE_CONCAVE),
    arg(0, AFFINE),
    arg(1, CONCAVE),
];

/// Variables the generated expressions refer to.
pub const QUIZ_VARIABLES: [&str; 6] = ["x", "y", "z", "u", "v", "w"];

const VARIABLE_WEIGHT: f64 = 0.1 * DEFAULT_WEIGHT / 6.0;
const AFFINE_TERM_WEIGHT: f64 = 0.1 * DEFAULT_WEIGHT / 3.0;
const HALF_WEIGHT: f64 = DEFAULT_WEIGHT / 2.0;
const NORM_WEIGHT: f64 = 0.33 * DEFAULT_WEIGHT;

pub static OPERATORS: [QuizOperator; 31] = [
    terminal("x", VARIABLE_WEIGHT),
    terminal("y", VARIABLE_WEIGHT),
    terminal("z", VARIABLE_WEIGHT),
    terminal("u", VARIABLE_WEIGHT),
    terminal("v", VARIABLE_WEIGHT),
    terminal("w", VARIABLE_WEIGHT),
    terminal("x / 2", AFFINE_TERM_WEIGHT),
    terminal("y - 42", AFFINE_TERM_WEIGHT),
    terminal("364 * z", AFFINE_TERM_WEIGHT),
    binary(" + ", HALF_WEIGHT, CONVEX, &CONVEX_PAIR),
    binary(" + ", HALF_WEIGHT, CONCAVE, &CONCAVE_PAIR),
    binary(" - ", HALF_WEIGHT, CONVEX, &CONVEX_MINUS_CONCAVE),
    binary(" - ", HALF_WEIGHT, CONCAVE, &CONCAVE_MINUS_CONVEX),
    call("max(", 2, DEFAULT_WEIGHT, CONVEX, &CONVEX_PAIR),
    call("min(", 2, DEFAULT_WEIGHT, CONCAVE, &CONCAVE_PAIR),
    call("log(", 1, DEFAULT_WEIGHT, CONCAVE, &CONCAVE_ARGUMENT),
    call("abs(", 1, DEFAULT_WEIGHT, POSITIVE_CONVEX, &EVEN_ARGUMENT),
    call("entr(", 1, 0.5 * DEFAULT_WEIGHT, CONCAVE, &AFFINE_ARGUMENT),
    call("exp(", 1, DEFAULT_WEIGHT, POSITIVE_CONVEX, &CONVEX_ARGUMENT),
    call("geo_mean(", 2, DEFAULT_WEIGHT, POSITIVE_CONCAVE, &CONCAVE_PAIR),
    call("huber(", 1, DEFAULT_WEIGHT, POSITIVE_CONVEX, &EVEN_ARGUMENT),
    call("inv_pos(", 1, DEFAULT_WEIGHT, POSITIVE_CONVEX, &CONCAVE_ARGUMENT),
    call("kl_div(", 2, 0.25 * DEFAULT_WEIGHT, POSITIVE_CONVEX, &AFFINE_PAIR),
    call("log_sum_exp(", 2, DEFAULT_WEIGHT, CONVEX, &CONVEX_PAIR),
    call("norm2(", 2, NORM_WEIGHT, POSITIVE_CONVEX, &NORM_ARGUMENTS),
    call("norm1(", 2, NORM_WEIGHT, POSITIVE_CONVEX, &NORM_ARGUMENTS),
    call("norm_inf(", 2, NORM_WEIGHT, POSITIVE_CONVEX, &NORM_ARGUMENTS),
    call("sqrt(", 1, DEFAULT_WEIGHT, POSITIVE_CONCAVE, &CONCAVE_ARGUMENT),
    call("pos(", 1, DEFAULT_WEIGHT, POSITIVE_CONVEX, &CONVEX_ARGUMENT),
    call("square(", 1, DEFAULT_WEIGHT, POSITIVE_CONVEX, &EVEN_ARGUMENT),
    call("quad_over_lin(", 2, DEFAULT_WEIGHT, POSITIVE_CONVEX, &QUAD_OVER_LIN_ARGUMENTS),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atoms::AtomRegistry;

    #[test]
    fn test_every_call_is_a_known_atom() {
        let registry = AtomRegistry::standard();
        for operator in OPERATORS.iter().filter(|op| op.suffix == ")") {
            let name = operator.prefix.trim_end_matches('(');
            let atom = registry.get(name).unwrap_or_else(|| panic!("missing atom {name}"));
            assert!(atom.accepts(operator.num_args), "{name} arity");
        }
    }

    #[test]
    fn test_every_position_has_a_shape() {
        for operator in &OPERATORS {
            for position in 0..operator.num_args {
                assert!(
                    !operator.argument_shapes(position).is_empty(),
                    "{}{} position {position}",
                    operator.prefix,
                    operator.infix
                );
            }
        }
    }

    #[test]
    fn test_shape_matching() {
        assert!(AFFINE.satisfies(CONVEX));
        assert!(AFFINE.satisfies(CONCAVE));
        assert!(POSITIVE_CONVEX.satisfies(CONVEX));
        assert!(!CONCAVE.satisfies(CONVEX));
        assert!(!CONVEX.satisfies(POSITIVE_CONVEX));
    }
}
