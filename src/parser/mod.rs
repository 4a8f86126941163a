//! # `.step` Parser
//!
//! Parses tokenized `.step` source code into the AST of `parser::ast`.
//!
//! ## Architecture
//!
//! A straightforward recursive-descent parser over the token stream, with
//! `expect_token!`/`expect_ident!` macros (see `macros.rs`) factoring out
//! the "consume this token or produce a span-anchored error" boilerplate
//! the way the teacher's `parse_reg_reg_or_imm!` family did for LC-3
//! operand patterns.
//!
//! The grammar is intentionally small (see SPEC_FULL.md §0): a compilation
//! unit is zero or more `import "path";` lines followed by `func` decls;
//! a block is `{` stmt* `}`; statements are assignment, bare expression
//! (most importantly bare calls), `if`/`else`, `for`, `switch`, `select`,
//! and `return`.

#[macro_use]
mod macros;
pub mod ast;

#[cfg(test)]
mod tests;

use crate::error::{ErrorKind, SourceError};
use crate::lexer::token::{Token, TokenKind};
use crate::position::Position;
use ast::{
    Block, CompilationUnit, Expr, FunctionDecl, Import, SelectCase, Stmt, StmtKind, SwitchCase,
};

pub struct ParseResult {
    pub unit: CompilationUnit,
    pub errors: Vec<SourceError>,
}

/// Parse a full `.step` file's tokens into a `CompilationUnit`.
///
/// `package_name` is supplied by the caller (the loader derives it from the
/// file or directory name — see `crate::loader`), since `.step` has no
/// `package` declaration of its own.
#[must_use]
pub fn parse_unit(tokens: &[Token], filename: &str, package_name: &str) -> ParseResult {
    let mut parser = Parser {
        tokens,
        pos: 0,
        filename: filename.to_string(),
        errors: Vec::new(),
    };

    let mut imports = Vec::new();
    let mut functions = Vec::new();

    while !parser.at_eof() {
        match parser.peek_kind() {
            TokenKind::KwImport => match parser.parse_import() {
                Ok(import) => imports.push(import),
                Err(err) => {
                    parser.errors.push(err);
                    parser.synchronize();
                }
            },
            TokenKind::KwFunc => match parser.parse_function() {
                Ok(func) => functions.push(func),
                Err(err) => {
                    parser.errors.push(err);
                    parser.synchronize();
                }
            },
            _ => {
                parser.errors.push(SourceError::new(
                    ErrorKind::ExpectedToken,
                    "expected 'import' or 'func' at top level",
                    parser.peek_span(),
                ));
                parser.synchronize();
            }
        }
    }

    ParseResult {
        unit: CompilationUnit {
            package_name: package_name.to_string(),
            imports,
            functions,
        },
        errors: parser.errors,
    }
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    filename: String,
    errors: Vec<SourceError>,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    fn peek_span(&self) -> crate::position::Span {
        self.peek().span
    }

    fn peek_position(&self) -> Position {
        self.peek_span().to_position(&self.filename)
    }

    fn at_eof(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    fn advance(&mut self) -> &Token {
        let tok = &self.tokens[self.pos.min(self.tokens.len() - 1)];
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    /// Recover from a parse error by skipping to the next token that could
    /// plausibly start a new top-level declaration or statement.
    fn synchronize(&mut self) {
        while !self.at_eof() {
            match self.peek_kind() {
                TokenKind::KwFunc | TokenKind::KwImport => return,
                TokenKind::Semi | TokenKind::RBrace => {
                    self.advance();
                    return;
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    fn parse_import(&mut self) -> Result<Import, SourceError> {
        expect_token!(
            self,
            TokenKind::KwImport,
            ErrorKind::ExpectedToken,
            "expected 'import'"
        );
        let path = match self.peek_kind().clone() {
            TokenKind::StringLiteral(s) => {
                self.advance();
                s
            }
            _ => {
                return Err(SourceError::new(
                    ErrorKind::ExpectedToken,
                    "expected a string literal after 'import'",
                    self.peek_span(),
                ))
            }
        };
        if matches!(self.peek_kind(), TokenKind::Semi) {
            self.advance();
        }
        Ok(Import { path })
    }

    fn parse_function(&mut self) -> Result<FunctionDecl, SourceError> {
        expect_token!(
            self,
            TokenKind::KwFunc,
            ErrorKind::ExpectedToken,
            "expected 'func'"
        );
        let name = expect_ident!(self, "expected a function name");
        expect_token!(
            self,
            TokenKind::LParen,
            ErrorKind::ExpectedToken,
            "expected '(' after function name"
        );
        let mut params = Vec::new();
        if !matches!(self.peek_kind(), TokenKind::RParen) {
            loop {
                params.push(expect_ident!(self, "expected a parameter name"));
                if matches!(self.peek_kind(), TokenKind::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        expect_token!(
            self,
            TokenKind::RParen,
            ErrorKind::ExpectedToken,
            "expected ')' after parameter list"
        );
        let body = self.parse_block()?;
        Ok(FunctionDecl { name, params, body })
    }

    fn parse_block(&mut self) -> Result<Block, SourceError> {
        expect_token!(
            self,
            TokenKind::LBrace,
            ErrorKind::ExpectedBlock,
            "expected '{'"
        );
        let mut stmts = Vec::new();
        while !matches!(self.peek_kind(), TokenKind::RBrace | TokenKind::Eof) {
            match self.parse_stmt() {
                Ok(stmt) => stmts.push(stmt),
                Err(err) => {
                    self.errors.push(err);
                    self.synchronize();
                }
            }
        }
        expect_token!(
            self,
            TokenKind::RBrace,
            ErrorKind::ExpectedBlock,
            "expected '}'"
        );
        Ok(stmts)
    }

    fn parse_stmt(&mut self) -> Result<Stmt, SourceError> {
        let position = self.peek_position();
        match self.peek_kind() {
            TokenKind::KwIf => self.parse_if(position),
            TokenKind::KwFor => self.parse_for(position),
            TokenKind::KwSwitch => self.parse_switch(position),
            TokenKind::KwSelect => self.parse_select(position),
            TokenKind::KwReturn => self.parse_return(position),
            TokenKind::Ident(_) if self.is_assignment_ahead() => self.parse_assign(position),
            _ => self.parse_expr_stmt(position),
        }
    }

    /// Look ahead past a comma-separated identifier list to see whether it
    /// is followed by `:=` or `=` — the only thing that distinguishes an
    /// assignment's target list from an ordinary expression statement that
    /// happens to start with an identifier.
    fn is_assignment_ahead(&self) -> bool {
        let mut i = self.pos;
        loop {
            match self.tokens.get(i).map(|t| &t.kind) {
                Some(TokenKind::Ident(_)) => i += 1,
                _ => return false,
            }
            match self.tokens.get(i).map(|t| &t.kind) {
                Some(TokenKind::Comma) => {
                    i += 1;
                    continue;
                }
                Some(TokenKind::Define | TokenKind::Assign) => return true,
                _ => return false,
            }
        }
    }

    fn parse_assign(&mut self, position: Position) -> Result<Stmt, SourceError> {
        let mut targets = Vec::new();
        loop {
            targets.push(expect_ident!(self, "expected an assignment target"));
            if matches!(self.peek_kind(), TokenKind::Comma) {
                self.advance();
            } else {
                break;
            }
        }
        let define = match self.peek_kind() {
            TokenKind::Define => {
                self.advance();
                true
            }
            TokenKind::Assign => {
                self.advance();
                false
            }
            _ => {
                return Err(SourceError::new(
                    ErrorKind::ExpectedToken,
                    "expected ':=' or '=' in assignment",
                    self.peek_span(),
                ))
            }
        };
        let value = self.parse_expr()?;
        self.expect_semi()?;
        Ok(Stmt::new(
            StmtKind::Assign {
                targets,
                define,
                value,
            },
            position,
        ))
    }

    fn parse_expr_stmt(&mut self, position: Position) -> Result<Stmt, SourceError> {
        let expr = self.parse_expr()?;
        self.expect_semi()?;
        Ok(Stmt::new(StmtKind::Expr(expr), position))
    }

    fn parse_if(&mut self, position: Position) -> Result<Stmt, SourceError> {
        self.advance(); // 'if'
        let cond = self.parse_expr()?;
        let then_block = self.parse_block()?;
        let else_block = if matches!(self.peek_kind(), TokenKind::KwElse) {
            self.advance();
            Some(self.parse_block()?)
        } else {
            None
        };
        Ok(Stmt::new(
            StmtKind::If {
                cond,
                then_block,
                else_block,
            },
            position,
        ))
    }

    fn parse_for(&mut self, position: Position) -> Result<Stmt, SourceError> {
        self.advance(); // 'for'
        let cond = if matches!(self.peek_kind(), TokenKind::LBrace) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        let body = self.parse_block()?;
        Ok(Stmt::new(StmtKind::For { cond, body }, position))
    }

    fn parse_switch(&mut self, position: Position) -> Result<Stmt, SourceError> {
        self.advance(); // 'switch'
        let tag = self.parse_expr()?;
        expect_token!(
            self,
            TokenKind::LBrace,
            ErrorKind::ExpectedBlock,
            "expected '{' to start switch body"
        );
        let mut cases = Vec::new();
        while !matches!(self.peek_kind(), TokenKind::RBrace | TokenKind::Eof) {
            cases.push(self.parse_switch_case()?);
        }
        expect_token!(
            self,
            TokenKind::RBrace,
            ErrorKind::ExpectedBlock,
            "expected '}' to close switch body"
        );
        Ok(Stmt::new(StmtKind::Switch { tag, cases }, position))
    }

    fn parse_switch_case(&mut self) -> Result<SwitchCase, SourceError> {
        let is_default = matches!(self.peek_kind(), TokenKind::KwDefault);
        let mut values = Vec::new();
        if is_default {
            self.advance();
        } else {
            expect_token!(
                self,
                TokenKind::KwCase,
                ErrorKind::ExpectedToken,
                "expected 'case' or 'default'"
            );
            loop {
                values.push(self.parse_expr()?);
                if matches!(self.peek_kind(), TokenKind::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        expect_token!(
            self,
            TokenKind::Colon,
            ErrorKind::ExpectedToken,
            "expected ':' after case label"
        );
        let mut body = Vec::new();
        while !matches!(
            self.peek_kind(),
            TokenKind::KwCase | TokenKind::KwDefault | TokenKind::RBrace | TokenKind::Eof
        ) {
            match self.parse_stmt() {
                Ok(stmt) => body.push(stmt),
                Err(err) => {
                    self.errors.push(err);
                    self.synchronize();
                }
            }
        }
        Ok(SwitchCase {
            values,
            is_default,
            body,
        })
    }

    fn parse_select(&mut self, position: Position) -> Result<Stmt, SourceError> {
        self.advance(); // 'select'
        expect_token!(
            self,
            TokenKind::LBrace,
            ErrorKind::ExpectedBlock,
            "expected '{' to start select body"
        );
        let mut cases = Vec::new();
        while !matches!(self.peek_kind(), TokenKind::RBrace | TokenKind::Eof) {
            cases.push(self.parse_select_case()?);
        }
        expect_token!(
            self,
            TokenKind::RBrace,
            ErrorKind::ExpectedBlock,
            "expected '}' to close select body"
        );
        Ok(Stmt::new(StmtKind::Select { cases }, position))
    }

    fn parse_select_case(&mut self) -> Result<SelectCase, SourceError> {
        let is_default = matches!(self.peek_kind(), TokenKind::KwDefault);
        let comm = if is_default {
            self.advance();
            "default".to_string()
        } else {
            expect_token!(
                self,
                TokenKind::KwCase,
                ErrorKind::ExpectedToken,
                "expected 'case' or 'default'"
            );
            // The communication clause's internal shape is not modeled;
            // collect its raw token text up to the ':' that ends the label.
            let mut text = String::new();
            while !matches!(self.peek_kind(), TokenKind::Colon | TokenKind::Eof) {
                text.push_str(&self.advance().lexeme);
                text.push(' ');
            }
            text.trim().to_string()
        };
        expect_token!(
            self,
            TokenKind::Colon,
            ErrorKind::ExpectedToken,
            "expected ':' after case label"
        );
        let mut body = Vec::new();
        while !matches!(
            self.peek_kind(),
            TokenKind::KwCase | TokenKind::KwDefault | TokenKind::RBrace | TokenKind::Eof
        ) {
            match self.parse_stmt() {
                Ok(stmt) => body.push(stmt),
                Err(err) => {
                    self.errors.push(err);
                    self.synchronize();
                }
            }
        }
        Ok(SelectCase { comm, body })
    }

    fn parse_return(&mut self, position: Position) -> Result<Stmt, SourceError> {
        self.advance(); // 'return'
        let value = if matches!(self.peek_kind(), TokenKind::Semi) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect_semi()?;
        Ok(Stmt::new(StmtKind::Return(value), position))
    }

    fn expect_semi(&mut self) -> Result<(), SourceError> {
        expect_token!(
            self,
            TokenKind::Semi,
            ErrorKind::ExpectedToken,
            "expected ';' to end statement"
        );
        Ok(())
    }

    /// Expressions: identifiers, numbers, strings, `.`-selectors and calls.
    /// No binary operators — the transform only ever needs to recognize
    /// "is this a call" and "what is its rightmost callee name".
    fn parse_expr(&mut self) -> Result<Expr, SourceError> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.peek_kind() {
                TokenKind::Dot => {
                    self.advance();
                    let sel = expect_ident!(self, "expected a field/method name after '.'");
                    expr = Expr::Selector {
                        base: Box::new(expr),
                        sel,
                    };
                }
                TokenKind::LParen => {
                    self.advance();
                    let mut args = Vec::new();
                    if !matches!(self.peek_kind(), TokenKind::RParen) {
                        loop {
                            args.push(self.parse_expr()?);
                            if matches!(self.peek_kind(), TokenKind::Comma) {
                                self.advance();
                            } else {
                                break;
                            }
                        }
                    }
                    expect_token!(
                        self,
                        TokenKind::RParen,
                        ErrorKind::ExpectedToken,
                        "expected ')' to close call arguments"
                    );
                    expr = Expr::Call {
                        callee: Box::new(expr),
                        args,
                    };
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr, SourceError> {
        match self.peek_kind().clone() {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(Expr::Ident(name))
            }
            TokenKind::Number(n) => {
                self.advance();
                Ok(Expr::Number(n))
            }
            TokenKind::StringLiteral(s) => {
                self.advance();
                Ok(Expr::Str(s))
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                expect_token!(
                    self,
                    TokenKind::RParen,
                    ErrorKind::ExpectedToken,
                    "expected ')' to close parenthesized expression"
                );
                Ok(inner)
            }
            _ => Err(SourceError::new(
                ErrorKind::ExpectedToken,
                "expected an expression",
                self.peek_span(),
            )),
        }
    }
}
