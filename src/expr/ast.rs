//! Syntax tree of boolean expressions

use std::collections::BTreeSet;
use std::fmt;

use fxhash::FxHashMap;
use volute::Lut;

use crate::circuit::GateType;

/// Binary operators of the expression language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    /// Conjunction
    And,
    /// Disjunction
    Or,
    /// Exclusive or
    Xor,
    /// Negated conjunction
    Nand,
    /// Negated disjunction
    Nor,
}

impl BinaryOp {
    /// Apply the operator
    pub fn apply(self, a: bool, b: bool) -> bool {
        self.gate_type().eval(&[a, b])
    }

    /// Keyword of the operator
    pub fn name(self) -> &'static str {
        self.gate_type().name()
    }

    /// Gate implementing the operator
    pub fn gate_type(self) -> GateType {
        match self {
            BinaryOp::And => GateType::And,
            BinaryOp::Or => GateType::Or,
            BinaryOp::Xor => GateType::Xor,
            BinaryOp::Nand => GateType::Nand,
            BinaryOp::Nor => GateType::Nor,
        }
    }

    fn apply_lut(self, a: Lut, b: Lut) -> Lut {
        match self {
            BinaryOp::And => a & b,
            BinaryOp::Or => a | b,
            BinaryOp::Xor => a ^ b,
            BinaryOp::Nand => !(a & b),
            BinaryOp::Nor => !(a | b),
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Boolean expression
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    /// Named variable
    Variable(String),
    /// Constant value
    Constant(bool),
    /// Negation
    Not(Box<Expr>),
    /// Binary operation
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
}

impl Expr {
    /// Create a variable
    pub fn var(name: &str) -> Expr {
        Expr::Variable(name.to_string())
    }

    /// Create a negation
    #[allow(clippy::should_implement_trait)]
    pub fn not(e: Expr) -> Expr {
        Expr::Not(Box::new(e))
    }

    /// Create a binary operation
    pub fn binary(op: BinaryOp, a: Expr, b: Expr) -> Expr {
        Expr::Binary(op, Box::new(a), Box::new(b))
    }

    /// Create an And
    pub fn and(a: Expr, b: Expr) -> Expr {
        Expr::binary(BinaryOp::And, a, b)
    }

    /// Create an Or
    pub fn or(a: Expr, b: Expr) -> Expr {
        Expr::binary(BinaryOp::Or, a, b)
    }

    /// Create a Xor
    pub fn xor(a: Expr, b: Expr) -> Expr {
        Expr::binary(BinaryOp::Xor, a, b)
    }

    /// Distinct variable names, sorted
    pub fn variables(&self) -> Vec<String> {
        let mut names = BTreeSet::new();
        self.collect_variables(&mut names);
        names.into_iter().map(|s| s.to_string()).collect()
    }

    fn collect_variables<'a>(&'a self, names: &mut BTreeSet<&'a str>) {
        match self {
            Expr::Variable(v) => {
                names.insert(v);
            }
            Expr::Constant(_) => (),
            Expr::Not(e) => e.collect_variables(names),
            Expr::Binary(_, a, b) => {
                a.collect_variables(names);
                b.collect_variables(names);
            }
        }
    }

    /// Number of operators in the expression
    pub fn nb_operators(&self) -> usize {
        match self {
            Expr::Variable(_) | Expr::Constant(_) => 0,
            Expr::Not(e) => 1 + e.nb_operators(),
            Expr::Binary(_, a, b) => 1 + a.nb_operators() + b.nb_operators(),
        }
    }

    /// Number of nested operators on the longest path
    pub fn depth(&self) -> usize {
        match self {
            Expr::Variable(_) | Expr::Constant(_) => 0,
            Expr::Not(e) => 1 + e.depth(),
            Expr::Binary(_, a, b) => 1 + a.depth().max(b.depth()),
        }
    }

    /// Evaluate with a value for each variable
    pub fn eval_with<F: Fn(&str) -> bool + Copy>(&self, value: F) -> bool {
        match self {
            Expr::Variable(v) => value(v),
            Expr::Constant(c) => *c,
            Expr::Not(e) => !e.eval_with(value),
            Expr::Binary(op, a, b) => op.apply(a.eval_with(value), b.eval_with(value)),
        }
    }

    /// Evaluate with an assignment; missing variables read as false
    pub fn eval(&self, assignment: &FxHashMap<String, bool>) -> bool {
        self.eval_with(|v| assignment.get(v).copied().unwrap_or(false))
    }

    /// Truth table over the given variables, the first variable being the most significant bit
    pub fn truth_table(&self, variables: &[String]) -> Vec<bool> {
        let n = variables.len();
        (0..1usize << n)
            .map(|row| {
                self.eval_with(|v| {
                    variables
                        .iter()
                        .position(|name| name.eq_ignore_ascii_case(v))
                        .is_some_and(|j| (row >> (n - j - 1)) & 1 != 0)
                })
            })
            .collect()
    }

    /// Function of the expression over the given variables; variable i of the Lut is variables\[i\]
    ///
    /// Variables missing from the list read as false.
    pub fn to_lut(&self, variables: &[String]) -> Lut {
        let n = variables.len();
        match self {
            Expr::Variable(v) => {
                match variables.iter().position(|name| name.eq_ignore_ascii_case(v)) {
                    Some(i) => Lut::nth_var(n, i),
                    None => Lut::zero(n),
                }
            }
            Expr::Constant(true) => Lut::one(n),
            Expr::Constant(false) => Lut::zero(n),
            Expr::Not(e) => !e.to_lut(variables),
            Expr::Binary(op, a, b) => op.apply_lut(a.to_lut(variables), b.to_lut(variables)),
        }
    }

    /// Apply the algebraic identities: double negation, idempotence of And/Or, self-Xor
    ///
    /// Operands are simplified first, so the result is a fixed point.
    pub fn simplify(&self) -> Expr {
        match self {
            Expr::Variable(_) | Expr::Constant(_) => self.clone(),
            Expr::Not(e) => match e.simplify() {
                Expr::Not(inner) => *inner,
                s => Expr::not(s),
            },
            Expr::Binary(op, a, b) => {
                let a = a.simplify();
                let b = b.simplify();
                match op {
                    BinaryOp::And | BinaryOp::Or if a == b => a,
                    BinaryOp::Xor if a == b => Expr::Constant(false),
                    _ => Expr::binary(*op, a, b),
                }
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Variable(v) => write!(f, "{}", v),
            Expr::Constant(c) => write!(f, "{}", *c as u8),
            Expr::Not(e) => write!(f, "NOT {}", e),
            Expr::Binary(op, a, b) => write!(f, "({} {} {})", a, op, b),
        }
    }
}
