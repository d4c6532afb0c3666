//! Conditional breakpoint predicates.
//!
//! A predicate is compiled once, when it is attached to a breakpoint, and evaluated on every
//! trace of that breakpoint. Compilation parses the text into an [`Expression`] tree, checks
//! that every free identifier is known and folds constant bindings into the tree.
//! Evaluation walks the tree in `f64` and truncates the result toward zero.

mod parser;

use indexmap::IndexMap;
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompileError {
    #[error("syntax error: {0}")]
    Syntax(String),
    #[error("unknown symbol `{0}`")]
    UnknownSymbol(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    And,
    Or,
}

impl BinaryOp {
    fn apply(self, lhs: f64, rhs: f64) -> f64 {
        let flag = |b: bool| if b { 1.0 } else { 0.0 };
        match self {
            BinaryOp::Add => lhs + rhs,
            BinaryOp::Sub => lhs - rhs,
            BinaryOp::Mul => lhs * rhs,
            BinaryOp::Div => lhs / rhs,
            BinaryOp::Rem => lhs % rhs,
            BinaryOp::Lt => flag(lhs < rhs),
            BinaryOp::Le => flag(lhs <= rhs),
            BinaryOp::Gt => flag(lhs > rhs),
            BinaryOp::Ge => flag(lhs >= rhs),
            BinaryOp::Eq => flag(lhs == rhs),
            BinaryOp::Ne => flag(lhs != rhs),
            BinaryOp::And => flag(lhs != 0.0 && rhs != 0.0),
            BinaryOp::Or => flag(lhs != 0.0 || rhs != 0.0),
        }
    }
}

/// Predicate expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Constant(f64),
    Symbol(String),
    Unary(UnaryOp, Box<Expression>),
    Binary(BinaryOp, Box<Expression>, Box<Expression>),
}

impl Expression {
    pub fn parse(text: &str) -> Result<Self, CompileError> {
        parser::parse(text)
    }

    pub fn binary(op: BinaryOp, lhs: Expression, rhs: Expression) -> Self {
        Expression::Binary(op, Box::new(lhs), Box::new(rhs))
    }

    /// Free identifiers of expression.
    pub fn identifiers(&self) -> BTreeSet<&str> {
        let mut names = BTreeSet::new();
        self.collect_identifiers(&mut names);
        names
    }

    fn collect_identifiers<'a>(&'a self, names: &mut BTreeSet<&'a str>) {
        match self {
            Expression::Constant(_) => {}
            Expression::Symbol(name) => {
                names.insert(name.as_str());
            }
            Expression::Unary(_, expr) => expr.collect_identifiers(names),
            Expression::Binary(_, lhs, rhs) => {
                lhs.collect_identifiers(names);
                rhs.collect_identifiers(names);
            }
        }
    }

    /// Replace constant symbols with their values. Subtrees without symbols are
    /// collapsed into a single constant.
    fn fold(self, constants: &HashMap<String, i64>) -> Self {
        match self {
            Expression::Symbol(name) => match constants.get(&name) {
                Some(value) => Expression::Constant(*value as f64),
                None => Expression::Symbol(name),
            },
            Expression::Unary(op, expr) => match expr.fold(constants) {
                Expression::Constant(v) => Expression::Constant(apply_unary(op, v)),
                expr => Expression::Unary(op, Box::new(expr)),
            },
            Expression::Binary(op, lhs, rhs) => {
                match (lhs.fold(constants), rhs.fold(constants)) {
                    (Expression::Constant(l), Expression::Constant(r)) => {
                        Expression::Constant(op.apply(l, r))
                    }
                    (lhs, rhs) => Expression::binary(op, lhs, rhs),
                }
            }
            constant @ Expression::Constant(_) => constant,
        }
    }

    fn eval(&self, values: &HashMap<String, i64>) -> f64 {
        match self {
            Expression::Constant(v) => *v,
            Expression::Symbol(name) => values.get(name).copied().unwrap_or_default() as f64,
            Expression::Unary(op, expr) => apply_unary(*op, expr.eval(values)),
            Expression::Binary(op, lhs, rhs) => op.apply(lhs.eval(values), rhs.eval(values)),
        }
    }
}

fn apply_unary(op: UnaryOp, v: f64) -> f64 {
    match op {
        UnaryOp::Neg => -v,
        UnaryOp::Not => {
            if v == 0.0 {
                1.0
            } else {
                0.0
            }
        }
    }
}

/// Interpret evaluation result as a condition. NaN is false, infinities saturate.
pub fn truthy(raw: f64) -> bool {
    (raw.trunc() as i64) != 0
}

/// Expression checked against a set of known symbols with constants folded in.
#[derive(Debug, Clone)]
pub struct CompiledExpression {
    source: String,
    root: Expression,
    variables: BTreeSet<String>,
}

impl CompiledExpression {
    /// Compile predicate text.
    ///
    /// # Arguments
    ///
    /// * `text`: predicate source
    /// * `symbols`: names rebound before every evaluation
    /// * `constants`: names with values fixed at compile time
    pub fn compile<S: AsRef<str>>(
        text: &str,
        symbols: &[S],
        constants: &HashMap<String, i64>,
    ) -> Result<Self, CompileError> {
        let expr = Expression::parse(text)?;

        let mut variables = BTreeSet::new();
        for ident in expr.identifiers() {
            if constants.contains_key(ident) {
                continue;
            }
            if !symbols.iter().any(|s| s.as_ref() == ident) {
                return Err(CompileError::UnknownSymbol(ident.to_string()));
            }
            variables.insert(ident.to_string());
        }

        Ok(Self {
            source: text.to_string(),
            root: expr.fold(constants),
            variables,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Symbols that must be supplied on evaluation.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(String::as_str)
    }

    /// Evaluate with live values, a missing value reads as zero.
    pub fn evaluate(&self, values: &HashMap<String, i64>) -> bool {
        truthy(self.root.eval(values))
    }
}

/// What a free identifier of a predicate stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    /// Canonical name of a simulator signal.
    Live(String),
    /// Current simulation time.
    Time,
    /// Value fixed when the predicate was attached.
    Constant(i64),
}

#[derive(Debug, Clone, Default)]
pub struct SymbolEnvironment {
    bindings: IndexMap<String, Binding>,
}

impl SymbolEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a name. First binding of a name wins, return false if name already bound.
    pub fn bind(&mut self, name: impl Into<String>, binding: Binding) -> bool {
        let name = name.into();
        if self.bindings.contains_key(&name) {
            return false;
        }
        self.bindings.insert(name, binding);
        true
    }

    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Binding)> {
        self.bindings.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    fn constants(&self) -> HashMap<String, i64> {
        self.bindings
            .iter()
            .filter_map(|(name, b)| match b {
                Binding::Constant(v) => Some((name.clone(), *v)),
                _ => None,
            })
            .collect()
    }

    fn symbols(&self) -> Vec<&str> {
        self.bindings
            .iter()
            .filter(|(_, b)| !matches!(b, Binding::Constant(_)))
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

/// Compiled breakpoint condition together with its symbol bindings.
#[derive(Debug, Clone)]
pub struct Predicate {
    expression: CompiledExpression,
    environment: SymbolEnvironment,
}

impl Predicate {
    pub fn compile(text: &str, environment: SymbolEnvironment) -> Result<Self, CompileError> {
        let expression =
            CompiledExpression::compile(text, &environment.symbols(), &environment.constants())?;
        Ok(Self {
            expression,
            environment,
        })
    }

    pub fn source(&self) -> &str {
        self.expression.source()
    }

    pub fn environment(&self) -> &SymbolEnvironment {
        &self.environment
    }

    /// Evaluate predicate, reading every live and time binding with `read`.
    ///
    /// If any binding can't be read predicate is considered true.
    pub fn evaluate_with(&self, mut read: impl FnMut(&str, &Binding) -> Option<i64>) -> bool {
        let mut values = HashMap::new();
        for name in self.expression.variables() {
            let Some(binding) = self.environment.get(name) else {
                continue;
            };
            match read(name, binding) {
                Some(value) => {
                    values.insert(name.to_string(), value);
                }
                None => return true,
            }
        }
        self.expression.evaluate(&values)
    }
}
