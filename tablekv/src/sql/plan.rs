use std::cmp::Ordering;
use std::collections::HashMap;

use log::debug;

use crate::error::{CResult, Error};
use crate::sql::ast::{CompareOp, Expr, Predicate, Select, Update};
use crate::sql::catalog::{Catalog, ResultRecord, SqlRow, TableMeta};
use crate::sql::value::Value;

/// A column reference resolved to its canonical spelling, or a constant.
/// The only expression forms that survive planning; arithmetic is refused
/// with `NotImplemented` before any transaction is opened.
#[derive(Clone, Debug)]
pub(crate) enum BoundExpr {
    Literal(Value),
    Column(&'static str),
}

impl BoundExpr {
    pub(crate) fn evaluate(&self, row: &dyn SqlRow) -> Value {
        match self {
            BoundExpr::Literal(value) => value.clone(),
            // Planning resolved the name; a missing attribute reads as NULL.
            BoundExpr::Column(name) => row.attribute(name).unwrap_or(Value::Null),
        }
    }
}

/// A compiled filter. Comparisons involving NULL or mismatched kinds are
/// never satisfied, and `IS NULL` is the only way to observe a NULL.
#[derive(Clone, Debug)]
pub(crate) enum BoundPredicate {
    Compare(CompareOp, BoundExpr, BoundExpr),
    IsNull { expr: BoundExpr, negated: bool },
    And(Box<BoundPredicate>, Box<BoundPredicate>),
    Or(Box<BoundPredicate>, Box<BoundPredicate>),
    Not(Box<BoundPredicate>),
}

impl BoundPredicate {
    pub(crate) fn matches(&self, row: &dyn SqlRow) -> bool {
        match self {
            BoundPredicate::Compare(op, left, right) => {
                let ord = left.evaluate(row).compare(&right.evaluate(row));
                match op {
                    CompareOp::Eq => ord == Some(Ordering::Equal),
                    CompareOp::NotEq => matches!(ord, Some(o) if o != Ordering::Equal),
                    CompareOp::Lt => ord == Some(Ordering::Less),
                    CompareOp::Lte => {
                        matches!(ord, Some(Ordering::Less | Ordering::Equal))
                    }
                    CompareOp::Gt => ord == Some(Ordering::Greater),
                    CompareOp::Gte => {
                        matches!(ord, Some(Ordering::Greater | Ordering::Equal))
                    }
                }
            }
            BoundPredicate::IsNull { expr, negated } => {
                expr.evaluate(row).is_null() != *negated
            }
            BoundPredicate::And(left, right) => left.matches(row) && right.matches(row),
            BoundPredicate::Or(left, right) => left.matches(row) || right.matches(row),
            BoundPredicate::Not(inner) => !inner.matches(row),
        }
    }
}

/// The SET list and filter of a compiled UPDATE.
pub(crate) struct BoundUpdate {
    assignments: Vec<(&'static str, BoundExpr)>,
    filter: Option<BoundPredicate>,
}

impl BoundUpdate {
    pub(crate) fn matches(&self, row: &dyn SqlRow) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter.matches(row))
    }

    pub(crate) fn assignments(&self) -> &[(&'static str, BoundExpr)] {
        &self.assignments
    }
}

/// A compiled SELECT: which table to scan, how to fill each result column,
/// and the filter to apply. Reusable across transactions.
pub(crate) struct SelectPlan {
    pub(crate) table: usize,
    bindings: Vec<(&'static str, BoundExpr)>,
    filter: Option<BoundPredicate>,
}

/// A compiled UPDATE.
pub(crate) struct UpdatePlan {
    pub(crate) table: usize,
    pub(crate) update: BoundUpdate,
}

/// Compiles a SELECT for result type `R`: resolves the table and every
/// column, then binds each of `R`'s columns to a projected expression
/// (matching by alias, or by name for a bare column projection) or to a
/// same-named entity attribute as a pass-through.
pub(crate) fn plan_select<S: 'static, R: ResultRecord>(
    catalog: &Catalog<S>,
    select: &Select,
) -> CResult<SelectPlan> {
    let Some(from) = &select.from else {
        return Err(Error::NotImplemented("SELECT without FROM".into()));
    };
    let (slot, meta) = catalog
        .resolve_table(from)
        .ok_or_else(|| Error::UnknownTable(from.clone()))?;

    // Resolve the projection list first so an unknown column is reported
    // even when no result column ends up using it.
    let mut projected: Vec<(Option<&str>, BoundExpr)> = Vec::new();
    for projection in &select.projections {
        let expr = bind_expr(meta, from, &projection.expr)?;
        let name = match (&projection.alias, &projection.expr) {
            (Some(alias), _) => Some(alias.as_str()),
            (None, Expr::Column(column)) => Some(column.as_str()),
            (None, _) => None,
        };
        projected.push((name, expr));
    }

    let mut bindings = Vec::with_capacity(R::columns().len());
    for column in R::columns() {
        let source = projected
            .iter()
            .find(|(name, _)| name.is_some_and(|n| n.eq_ignore_ascii_case(column)))
            .map(|(_, expr)| expr.clone())
            .or_else(|| meta.resolve_column(column).map(BoundExpr::Column));
        let Some(expr) = source else {
            return Err(Error::ColumnBinding(column.to_string()));
        };
        bindings.push((*column, expr));
    }

    let filter = select.filter.as_ref().map(|p| bind_predicate(meta, from, p)).transpose()?;
    debug!("planned SELECT on {} with {} result columns", meta.name(), bindings.len());
    Ok(SelectPlan { table: slot, bindings, filter })
}

/// Compiles an UPDATE: resolves the table, every SET target, and the filter.
pub(crate) fn plan_update<S: 'static>(catalog: &Catalog<S>, update: &Update) -> CResult<UpdatePlan> {
    let (slot, meta) = catalog
        .resolve_table(&update.table)
        .ok_or_else(|| Error::UnknownTable(update.table.clone()))?;

    let mut assignments = Vec::with_capacity(update.assignments.len());
    for assignment in &update.assignments {
        let column = meta.resolve_column(&assignment.column).ok_or_else(|| {
            Error::UnknownColumn {
                table: update.table.clone(),
                column: assignment.column.clone(),
            }
        })?;
        let expr = bind_expr(meta, &update.table, &assignment.value)?;
        assignments.push((column, expr));
    }

    let filter = update.filter.as_ref().map(|p| bind_predicate(meta, &update.table, p)).transpose()?;
    debug!("planned UPDATE on {} with {} assignments", meta.name(), assignments.len());
    Ok(UpdatePlan { table: slot, update: BoundUpdate { assignments, filter } })
}

/// Runs a compiled SELECT against one snapshot. Scan order is the table's
/// primary-key order, and the result list preserves it.
pub(crate) fn run_select<S: 'static, R: ResultRecord>(
    catalog: &Catalog<S>,
    plan: &SelectPlan,
    schema: &S,
) -> CResult<Vec<R>> {
    let meta = &catalog.tables()[plan.table];
    let mut out = Vec::new();
    for row in meta.rows(schema) {
        if let Some(filter) = &plan.filter {
            if !filter.matches(row) {
                continue;
            }
        }
        let mut values = HashMap::with_capacity(plan.bindings.len());
        for (column, expr) in &plan.bindings {
            values.insert(*column, expr.evaluate(row));
        }
        out.push(R::from_values(&values)?);
    }
    Ok(out)
}

fn bind_expr<S: 'static>(meta: &TableMeta<S>, table: &str, expr: &Expr) -> CResult<BoundExpr> {
    match expr {
        Expr::Literal(value) => Ok(BoundExpr::Literal(value.clone())),
        Expr::Column(name) => {
            meta.resolve_column(name).map(BoundExpr::Column).ok_or_else(|| {
                Error::UnknownColumn { table: table.to_string(), column: name.clone() }
            })
        }
        Expr::Neg(_) => Err(Error::NotImplemented("unary minus over a column".into())),
        Expr::Binary(op, _, _) => {
            Err(Error::NotImplemented(format!("arithmetic expression '{}'", op.symbol())))
        }
    }
}

fn bind_predicate<S: 'static>(
    meta: &TableMeta<S>,
    table: &str,
    predicate: &Predicate,
) -> CResult<BoundPredicate> {
    Ok(match predicate {
        Predicate::Compare(op, left, right) => BoundPredicate::Compare(
            *op,
            bind_expr(meta, table, left)?,
            bind_expr(meta, table, right)?,
        ),
        Predicate::IsNull { expr, negated } => BoundPredicate::IsNull {
            expr: bind_expr(meta, table, expr)?,
            negated: *negated,
        },
        Predicate::And(left, right) => BoundPredicate::And(
            Box::new(bind_predicate(meta, table, left)?),
            Box::new(bind_predicate(meta, table, right)?),
        ),
        Predicate::Or(left, right) => BoundPredicate::Or(
            Box::new(bind_predicate(meta, table, left)?),
            Box::new(bind_predicate(meta, table, right)?),
        ),
        Predicate::Not(inner) => {
            BoundPredicate::Not(Box::new(bind_predicate(meta, table, inner)?))
        }
    })
}
