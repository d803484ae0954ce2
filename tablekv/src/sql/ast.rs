use crate::sql::value::Value;

/// One parsed statement.
#[derive(Clone, Debug, PartialEq)]
pub enum Statement {
    Select(Select),
    Update(Update),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Select {
    pub projections: Vec<Projection>,
    pub from: Option<String>,
    pub filter: Option<Predicate>,
}

/// A projected expression with its optional `AS` alias. A bare column
/// reference is addressable by its own name; anything else needs an alias to
/// be addressable at all.
#[derive(Clone, Debug, PartialEq)]
pub struct Projection {
    pub expr: Expr,
    pub alias: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Update {
    pub table: String,
    pub assignments: Vec<Assignment>,
    pub filter: Option<Predicate>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Assignment {
    pub column: String,
    pub value: Expr,
}

/// A scalar expression. The grammar admits arithmetic; the planner refuses
/// it, so only literal and column primaries survive planning.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Literal(Value),
    Column(String),
    Neg(Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
        }
    }
}

/// A boolean filter tree. `NOT` binds tighter than `AND`, `AND` tighter
/// than `OR`; both are left-associative.
#[derive(Clone, Debug, PartialEq)]
pub enum Predicate {
    Compare(CompareOp, Expr, Expr),
    IsNull { expr: Expr, negated: bool },
    And(Box<Predicate>, Box<Predicate>),
    Or(Box<Predicate>, Box<Predicate>),
    Not(Box<Predicate>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    NotEq,
    Lt,
    Lte,
    Gt,
    Gte,
}
