use crate::error::{CResult, Error};
use crate::sql::ast::{
    Assignment, BinaryOp, CompareOp, Expr, Predicate, Projection, Select, Statement, Update,
};
use crate::sql::token_kind::TokenKind;
use crate::sql::tokenizer::{tokenize_sql, Token};
use crate::sql::value::Value;

/// Parses one statement. The whole input must be consumed.
pub fn parse(sql: &str) -> CResult<Statement> {
    Parser::new(tokenize_sql(sql)?).statement()
}

/// Recursive descent over the token vector. `tokenize_sql` guarantees a
/// trailing EOI token, so the cursor never runs off the end.
struct Parser<'a> {
    tokens: Vec<Token<'a>>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: Vec<Token<'a>>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> &Token<'a> {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.peek().kind == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> CResult<Token<'a>> {
        let token = self.peek().clone();
        if token.kind != kind {
            return Err(self.error_here(format!("expected {what}")));
        }
        self.advance();
        Ok(token)
    }

    fn error_here(&self, msg: impl Into<String>) -> Error {
        let token = self.peek();
        let mut msg = msg.into();
        if token.kind == TokenKind::EOI {
            msg.push_str(", found end of input");
        } else {
            msg.push_str(&format!(", found '{}'", token.text()));
        }
        Error::parse(token.span.start, msg)
    }

    fn statement(&mut self) -> CResult<Statement> {
        let statement = match self.peek().kind {
            TokenKind::SELECT => Statement::Select(self.select()?),
            TokenKind::UPDATE => Statement::Update(self.update()?),
            _ => return Err(self.error_here("expected SELECT or UPDATE")),
        };
        if self.peek().kind != TokenKind::EOI {
            return Err(self.error_here("expected end of statement"));
        }
        Ok(statement)
    }

    fn select(&mut self) -> CResult<Select> {
        self.expect(TokenKind::SELECT, "SELECT")?;
        let mut projections = vec![self.projection()?];
        while self.eat(TokenKind::Comma) {
            projections.push(self.projection()?);
        }
        let mut from = None;
        let mut filter = None;
        if self.eat(TokenKind::FROM) {
            from = Some(self.ident()?);
            if self.eat(TokenKind::WHERE) {
                filter = Some(self.predicate()?);
            }
        }
        Ok(Select { projections, from, filter })
    }

    fn projection(&mut self) -> CResult<Projection> {
        let expr = self.expr()?;
        let alias = if self.eat(TokenKind::AS) { Some(self.ident()?) } else { None };
        Ok(Projection { expr, alias })
    }

    fn update(&mut self) -> CResult<Update> {
        self.expect(TokenKind::UPDATE, "UPDATE")?;
        let table = self.ident()?;
        self.expect(TokenKind::SET, "SET")?;
        let mut assignments = vec![self.assignment()?];
        while self.eat(TokenKind::Comma) {
            assignments.push(self.assignment()?);
        }
        let filter =
            if self.eat(TokenKind::WHERE) { Some(self.predicate()?) } else { None };
        Ok(Update { table, assignments, filter })
    }

    fn assignment(&mut self) -> CResult<Assignment> {
        let column = self.ident()?;
        self.expect(TokenKind::Eq, "'='")?;
        let value = self.expr()?;
        Ok(Assignment { column, value })
    }

    fn ident(&mut self) -> CResult<String> {
        let token = self.expect(TokenKind::Ident, "identifier")?;
        Ok(token.text().to_string())
    }

    // Predicate precedence, loosest first: OR, AND, NOT, comparison.

    fn predicate(&mut self) -> CResult<Predicate> {
        let mut left = self.and_predicate()?;
        while self.eat(TokenKind::OR) {
            left = Predicate::Or(Box::new(left), Box::new(self.and_predicate()?));
        }
        Ok(left)
    }

    fn and_predicate(&mut self) -> CResult<Predicate> {
        let mut left = self.not_predicate()?;
        while self.eat(TokenKind::AND) {
            left = Predicate::And(Box::new(left), Box::new(self.not_predicate()?));
        }
        Ok(left)
    }

    fn not_predicate(&mut self) -> CResult<Predicate> {
        if self.eat(TokenKind::NOT) {
            return Ok(Predicate::Not(Box::new(self.not_predicate()?)));
        }
        self.comparison()
    }

    fn comparison(&mut self) -> CResult<Predicate> {
        // A parenthesis in predicate position groups a nested predicate;
        // parentheses around arithmetic live further down, in primary().
        if self.peek().kind == TokenKind::LParen {
            self.advance();
            let inner = self.predicate()?;
            self.expect(TokenKind::RParen, "')'")?;
            return Ok(inner);
        }
        let left = self.expr()?;
        if self.eat(TokenKind::IS) {
            let negated = self.eat(TokenKind::NOT);
            self.expect(TokenKind::NULL, "NULL")?;
            return Ok(Predicate::IsNull { expr: left, negated });
        }
        let op = match self.peek().kind {
            TokenKind::Eq => CompareOp::Eq,
            TokenKind::NotEq => CompareOp::NotEq,
            TokenKind::Lt => CompareOp::Lt,
            TokenKind::Lte => CompareOp::Lte,
            TokenKind::Gt => CompareOp::Gt,
            TokenKind::Gte => CompareOp::Gte,
            _ => return Err(self.error_here("expected comparison operator")),
        };
        self.advance();
        let right = self.expr()?;
        Ok(Predicate::Compare(op, left, right))
    }

    // Arithmetic precedence: additive over multiplicative over unary minus.

    fn expr(&mut self) -> CResult<Expr> {
        let mut left = self.term()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            left = Expr::Binary(op, Box::new(left), Box::new(self.term()?));
        }
        Ok(left)
    }

    fn term(&mut self) -> CResult<Expr> {
        let mut left = self.factor()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Multiply => BinaryOp::Mul,
                TokenKind::Divide => BinaryOp::Div,
                _ => break,
            };
            self.advance();
            left = Expr::Binary(op, Box::new(left), Box::new(self.factor()?));
        }
        Ok(left)
    }

    fn factor(&mut self) -> CResult<Expr> {
        if self.eat(TokenKind::Minus) {
            // A negated numeric literal is folded into the literal itself,
            // so `-3` survives planning while `-Id` stays a Neg node.
            return Ok(match self.factor()? {
                Expr::Literal(Value::Int(i)) => Expr::Literal(Value::Int(-i)),
                Expr::Literal(Value::Float(f)) => Expr::Literal(Value::Float(-f)),
                expr => Expr::Neg(Box::new(expr)),
            });
        }
        self.primary()
    }

    fn primary(&mut self) -> CResult<Expr> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::LiteralInteger => {
                self.advance();
                let i = token
                    .text()
                    .parse::<i64>()
                    .map_err(|_| Error::parse(token.span.start, "integer literal out of range"))?;
                Ok(Expr::Literal(Value::Int(i)))
            }
            TokenKind::LiteralFloat => {
                self.advance();
                let f = token
                    .text()
                    .parse::<f64>()
                    .map_err(|_| Error::parse(token.span.start, "malformed float literal"))?;
                Ok(Expr::Literal(Value::Float(f)))
            }
            TokenKind::Ident => {
                self.advance();
                Ok(Expr::Column(token.text().to_string()))
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.expr()?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(expr)
            }
            _ => Err(self.error_here("expected expression")),
        }
    }
}
