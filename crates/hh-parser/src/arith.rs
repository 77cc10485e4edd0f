use hh_core::HiHippoError;

/// Nesting limit for parentheses and unary chains.
pub const MAX_ARITH_DEPTH: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArithExpr {
    Number(f64),
    Variable(String),
    Neg(Box<ArithExpr>),
    Binary {
        op: BinaryOp,
        left: Box<ArithExpr>,
        right: Box<ArithExpr>,
    },
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Op(char),
    LParen,
    RParen,
}

fn arith_error(message: impl Into<String>) -> HiHippoError {
    HiHippoError::new("ARITH_PARSE", message)
}

fn tokenize(text: &str) -> Result<Vec<Token>, HiHippoError> {
    let chars = text.chars().collect::<Vec<_>>();
    let mut tokens = Vec::new();
    let mut index = 0usize;
    while index < chars.len() {
        let ch = chars[index];
        match ch {
            ' ' | '\t' => index += 1,
            '+' | '-' | '*' | '/' | '^' => {
                tokens.push(Token::Op(ch));
                index += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                index += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                index += 1;
            }
            '0'..='9' | '.' => {
                let start = index;
                let mut seen_dot = false;
                while index < chars.len() {
                    match chars[index] {
                        '0'..='9' => index += 1,
                        '.' if !seen_dot => {
                            seen_dot = true;
                            index += 1;
                        }
                        _ => break,
                    }
                }
                let literal = chars[start..index].iter().collect::<String>();
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| arith_error(format!("Invalid number \"{}\".", literal)))?;
                tokens.push(Token::Number(value));
            }
            ch if ch.is_ascii_alphabetic() || ch == '_' => {
                let start = index;
                while index < chars.len()
                    && (chars[index].is_ascii_alphanumeric() || chars[index] == '_')
                {
                    index += 1;
                }
                tokens.push(Token::Ident(chars[start..index].iter().collect()));
            }
            other => {
                return Err(arith_error(format!("Unexpected character '{}'.", other)));
            }
        }
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn eat_op(&mut self, ops: &[char]) -> Option<char> {
        match self.peek() {
            Some(Token::Op(op)) if ops.contains(op) => {
                let op = *op;
                self.pos += 1;
                Some(op)
            }
            _ => None,
        }
    }

    fn enter(&mut self) -> Result<(), HiHippoError> {
        self.depth += 1;
        if self.depth > MAX_ARITH_DEPTH {
            return Err(arith_error("Expression nests too deeply."));
        }
        Ok(())
    }

    fn expr(&mut self) -> Result<ArithExpr, HiHippoError> {
        let mut left = self.term()?;
        while let Some(op) = self.eat_op(&['+', '-']) {
            let right = self.term()?;
            let op = if op == '+' { BinaryOp::Add } else { BinaryOp::Sub };
            left = ArithExpr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn term(&mut self) -> Result<ArithExpr, HiHippoError> {
        let mut left = self.unary()?;
        while let Some(op) = self.eat_op(&['*', '/']) {
            let right = self.unary()?;
            let op = if op == '*' { BinaryOp::Mul } else { BinaryOp::Div };
            left = ArithExpr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<ArithExpr, HiHippoError> {
        if let Some(op) = self.eat_op(&['-', '+']) {
            self.enter()?;
            let operand = self.unary()?;
            self.depth -= 1;
            return Ok(if op == '-' {
                ArithExpr::Neg(Box::new(operand))
            } else {
                operand
            });
        }
        self.power()
    }

    // `^` is right-associative and binds tighter than a leading minus.
    fn power(&mut self) -> Result<ArithExpr, HiHippoError> {
        let base = self.atom()?;
        if self.eat_op(&['^']).is_some() {
            self.enter()?;
            let exponent = self.unary()?;
            self.depth -= 1;
            return Ok(ArithExpr::Binary {
                op: BinaryOp::Pow,
                left: Box::new(base),
                right: Box::new(exponent),
            });
        }
        Ok(base)
    }

    fn atom(&mut self) -> Result<ArithExpr, HiHippoError> {
        match self.next() {
            Some(Token::Number(value)) => Ok(ArithExpr::Number(value)),
            Some(Token::Ident(name)) => Ok(ArithExpr::Variable(name)),
            Some(Token::LParen) => {
                self.enter()?;
                let inner = self.expr()?;
                self.depth -= 1;
                match self.next() {
                    Some(Token::RParen) => Ok(inner),
                    _ => Err(arith_error("Missing closing parenthesis.")),
                }
            }
            Some(token) => Err(arith_error(format!("Unexpected token {:?}.", token))),
            None => Err(arith_error("Unexpected end of expression.")),
        }
    }
}

/// Parses `+ - * / ^`, unary signs, parentheses, decimal numbers and
/// identifiers. Anything else is an error.
pub fn parse_arith(text: &str) -> Result<ArithExpr, HiHippoError> {
    let tokens = tokenize(text)?;
    if tokens.is_empty() {
        return Err(arith_error("Empty expression."));
    }
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let expr = parser.expr()?;
    if let Some(token) = parser.peek() {
        return Err(arith_error(format!("Unexpected trailing token {:?}.", token)));
    }
    Ok(expr)
}

#[cfg(test)]
mod arith_tests {
    use super::*;

    fn num(value: f64) -> Box<ArithExpr> {
        Box::new(ArithExpr::Number(value))
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let expr = parse_arith("1 + 2 * 3").expect("parse");
        assert_eq!(
            expr,
            ArithExpr::Binary {
                op: BinaryOp::Add,
                left: num(1.0),
                right: Box::new(ArithExpr::Binary {
                    op: BinaryOp::Mul,
                    left: num(2.0),
                    right: num(3.0),
                }),
            }
        );
    }

    #[test]
    fn power_is_right_associative_and_above_negation() {
        let expr = parse_arith("-2^3^2").expect("parse");
        assert_eq!(
            expr,
            ArithExpr::Neg(Box::new(ArithExpr::Binary {
                op: BinaryOp::Pow,
                left: num(2.0),
                right: Box::new(ArithExpr::Binary {
                    op: BinaryOp::Pow,
                    left: num(3.0),
                    right: num(2.0),
                }),
            }))
        );
    }

    #[test]
    fn identifiers_and_parentheses_parse() {
        let expr = parse_arith("(x_1 - 4) / y").expect("parse");
        let ArithExpr::Binary { op, left, right } = expr else {
            panic!("expected binary expression");
        };
        assert_eq!(op, BinaryOp::Div);
        assert_eq!(*right, ArithExpr::Variable("y".to_string()));
        assert!(matches!(*left, ArithExpr::Binary { op: BinaryOp::Sub, .. }));
    }

    #[test]
    fn rejects_foreign_syntax() {
        for source in [
            "",
            "2 %% 3",
            "__import__('os')",
            "1 +",
            "(1 + 2",
            "1 2",
            "2 ** 3",
            "1.2.3",
            "a.b",
            "\"x\"",
        ] {
            let error = parse_arith(source).expect_err(source);
            assert_eq!(error.code, "ARITH_PARSE", "{}", source);
        }
    }

    #[test]
    fn deep_nesting_is_rejected_instead_of_overflowing() {
        let source = format!("{}1{}", "(".repeat(1000), ")".repeat(1000));
        assert!(parse_arith(&source).is_err());
        let negations = format!("{}1", "-".repeat(1000));
        assert!(parse_arith(&negations).is_err());
    }
}
