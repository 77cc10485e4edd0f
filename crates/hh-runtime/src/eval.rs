use hh_core::{format_number, HhValue, HiHippoError};
use hh_parser::{parse_arith, quoted_literal, top_level_segments, ArithExpr, BinaryOp, Segment};
use tracing::trace;

use crate::store::VariableStore;

/// Evaluates arithmetic over the fixed operator grammar. Identifiers resolve
/// to numeric variables; anything else is an error for the caller to absorb.
pub fn eval_arith(text: &str, variables: &VariableStore) -> Result<f64, HiHippoError> {
    let expr = parse_arith(text)?;
    let value = eval_arith_expr(&expr, variables)?;
    if !value.is_finite() {
        return Err(HiHippoError::new(
            "ARITH_NOT_FINITE",
            format!("Expression \"{}\" has no finite value.", text.trim()),
        ));
    }
    Ok(value)
}

fn eval_arith_expr(expr: &ArithExpr, variables: &VariableStore) -> Result<f64, HiHippoError> {
    match expr {
        ArithExpr::Number(value) => Ok(*value),
        ArithExpr::Variable(name) => variables
            .lookup(name)
            .and_then(HhValue::as_arith_number)
            .ok_or_else(|| {
                HiHippoError::new(
                    "ARITH_UNDEFINED",
                    format!("\"{}\" is not a numeric variable.", name),
                )
            }),
        ArithExpr::Neg(inner) => Ok(-eval_arith_expr(inner, variables)?),
        ArithExpr::Binary { op, left, right } => {
            let left = eval_arith_expr(left, variables)?;
            let right = eval_arith_expr(right, variables)?;
            match op {
                BinaryOp::Add => Ok(left + right),
                BinaryOp::Sub => Ok(left - right),
                BinaryOp::Mul => Ok(left * right),
                BinaryOp::Div => {
                    if right == 0.0 {
                        return Err(HiHippoError::new("ARITH_DIV_ZERO", "Division by zero."));
                    }
                    Ok(left / right)
                }
                BinaryOp::Pow => Ok(left.powf(right)),
            }
        }
    }
}

/// Integer argument for drawing statements; fractions truncate toward zero.
pub fn eval_int_arg(text: &str, variables: &VariableStore) -> Option<i64> {
    eval_arith(text, variables).ok().map(|value| value.trunc() as i64)
}

/// String-concatenating evaluation used by `print` and `draw_text`.
///
/// The expression is split on `+` outside quotes. Quoted parts contribute
/// their contents. Adjacent unquoted parts are tried together as one
/// arithmetic expression first (`x + 1`); if that fails each part is
/// resolved on its own as a variable, then as arithmetic, then as the
/// literal text.
pub fn evaluate(expr: &str, variables: &VariableStore) -> String {
    let segments = top_level_segments(expr, '+');
    let mut out = String::new();
    let mut index = 0usize;
    while index < segments.len() {
        if let Some(literal) = quoted_literal(segments[index].text) {
            out.push_str(literal);
            index += 1;
            continue;
        }

        let run_start = index;
        while index < segments.len() && quoted_literal(segments[index].text).is_none() {
            index += 1;
        }
        out.push_str(&evaluate_run(expr, &segments[run_start..index], variables));
    }
    out
}

fn evaluate_run(expr: &str, run: &[Segment<'_>], variables: &VariableStore) -> String {
    if let [single] = run {
        return evaluate_part(single.text, variables);
    }
    let (Some(first), Some(last)) = (run.first(), run.last()) else {
        return String::new();
    };
    let joined = &expr[first.start..last.end];
    match eval_arith(joined, variables) {
        Ok(value) => format_number(value),
        Err(_) => run
            .iter()
            .map(|segment| evaluate_part(segment.text, variables))
            .collect(),
    }
}

fn evaluate_part(part: &str, variables: &VariableStore) -> String {
    let part = part.trim();
    if let Some(value) = variables.lookup(part) {
        return value.to_text();
    }
    if let Some(literal) = quoted_literal(part) {
        return literal.to_string();
    }
    match eval_arith(part, variables) {
        Ok(value) => format_number(value),
        Err(error) => {
            trace!(part, code = %error.code, "expression kept as literal text");
            part.to_string()
        }
    }
}
