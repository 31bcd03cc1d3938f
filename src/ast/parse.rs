//! Source reader for the normalized language subset.
//!
//! This exists so tests and debug tooling can drive the pass from source
//! strings the same way the surrounding compiler does from its real AST. It
//! accepts only the normalized shape the pass operates on (one binding per
//! declaration, plain identifier patterns) and rejects anything else rather
//! than guessing.

use super::*;
use crate::error::{Error, Result};

pub fn parse_program(src: &str) -> Result<Program> {
    let mut parser = Parser::new(src)?;
    let body = parser.stmt_list_until(None)?;
    Ok(Program { body })
}

/// Parse a single function declaration or expression.
pub fn parse_function(src: &str) -> Result<Function> {
    let program = parse_program(src)?;
    for stmt in program.body {
        match stmt {
            Stmt::FnDecl(func) => return Ok(func),
            Stmt::Expr(Expr::Fn(func)) => return Ok(*func),
            _ => {}
        }
    }
    Err(Error::parse(0, "expected a function"))
}

/// Parse a bare statement list (a function body without its wrapper).
pub fn parse_stmts(src: &str) -> Result<Vec<Stmt>> {
    Ok(parse_program(src)?.body)
}

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Ident(String),
    Number(f64),
    Str(String),
    Punct(&'static str),
    Eof,
}

impl Tok {
    fn is(&self, p: &str) -> bool {
        matches!(self, Tok::Punct(q) if *q == p)
    }

    fn is_kw(&self, kw: &str) -> bool {
        matches!(self, Tok::Ident(name) if name == kw)
    }
}

const PUNCTS: &[&str] = &[
    // longest first so maximal munch works
    "===", "!==", "=>", "==", "!=", "<=", ">=", "&&", "||", "++", "--", "+=", "-=", "*=", "/=",
    "(", ")", "{", "}", "[", "]", ";", ",", ":", "?", ".", "=", "<", ">", "+", "-", "*", "/", "%",
    "!",
];

const RESERVED: &[&str] = &[
    "var", "let", "const", "function", "return", "if", "else", "for", "while", "do", "switch",
    "case", "default", "break", "continue", "try", "catch", "finally", "in", "of", "true",
    "false", "null", "this", "typeof", "void", "new",
];

fn lex(src: &str) -> Result<Vec<(Tok, usize)>> {
    let bytes = src.as_bytes();
    let mut toks = Vec::new();
    let mut i = 0;
    'outer: while i < bytes.len() {
        let c = bytes[i];
        if c.is_ascii_whitespace() {
            i += 1;
            continue;
        }
        if c == b'/' && i + 1 < bytes.len() {
            if bytes[i + 1] == b'/' {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
                continue;
            }
            if bytes[i + 1] == b'*' {
                let mut j = i + 2;
                while j + 1 < bytes.len() {
                    if bytes[j] == b'*' && bytes[j + 1] == b'/' {
                        i = j + 2;
                        continue 'outer;
                    }
                    j += 1;
                }
                return Err(Error::parse(i, "unterminated comment"));
            }
        }
        if c.is_ascii_alphabetic() || c == b'_' || c == b'$' {
            let start = i;
            while i < bytes.len()
                && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_' || bytes[i] == b'$')
            {
                i += 1;
            }
            toks.push((Tok::Ident(src[start..i].to_string()), start));
            continue;
        }
        if c.is_ascii_digit() {
            let start = i;
            while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
                i += 1;
            }
            let text = &src[start..i];
            let value: f64 = text
                .parse()
                .map_err(|_| Error::parse(start, format!("bad number literal `{text}`")))?;
            toks.push((Tok::Number(value), start));
            continue;
        }
        if c == b'\'' || c == b'"' {
            let quote = c;
            let start = i;
            i += 1;
            let mut s = String::new();
            while i < bytes.len() && bytes[i] != quote {
                if bytes[i] == b'\\' && i + 1 < bytes.len() {
                    i += 1;
                    s.push(match bytes[i] {
                        b'n' => '\n',
                        b't' => '\t',
                        other => other as char,
                    });
                } else {
                    s.push(bytes[i] as char);
                }
                i += 1;
            }
            if i >= bytes.len() {
                return Err(Error::parse(start, "unterminated string"));
            }
            i += 1;
            toks.push((Tok::Str(s), start));
            continue;
        }
        let rest = &src[i..];
        if let Some(&p) = PUNCTS.iter().find(|p| rest.starts_with(**p)) {
            toks.push((Tok::Punct(p), i));
            i += p.len();
            continue;
        }
        return Err(Error::parse(i, format!("unexpected character `{}`", c as char)));
    }
    toks.push((Tok::Eof, src.len()));
    Ok(toks)
}

struct Parser {
    toks: Vec<(Tok, usize)>,
    pos: usize,
    /// Suppresses the `in` relational operator inside classic for-heads.
    no_in: bool,
}

impl Parser {
    fn new(src: &str) -> Result<Self> {
        Ok(Parser {
            toks: lex(src)?,
            pos: 0,
            no_in: false,
        })
    }

    fn peek(&self) -> &Tok {
        &self.toks[self.pos].0
    }

    fn peek2(&self) -> &Tok {
        &self.toks[(self.pos + 1).min(self.toks.len() - 1)].0
    }

    fn offset(&self) -> usize {
        self.toks[self.pos].1
    }

    fn bump(&mut self) -> Tok {
        let tok = self.toks[self.pos].0.clone();
        if self.pos + 1 < self.toks.len() {
            self.pos += 1;
        }
        tok
    }

    fn eat(&mut self, p: &str) -> bool {
        if self.peek().is(p) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn eat_kw(&mut self, kw: &str) -> bool {
        if self.peek().is_kw(kw) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, p: &str) -> Result<()> {
        if self.eat(p) {
            Ok(())
        } else {
            Err(Error::parse(
                self.offset(),
                format!("expected `{p}`, found {:?}", self.peek()),
            ))
        }
    }

    fn ident(&mut self) -> Result<String> {
        match self.peek() {
            Tok::Ident(name) if !RESERVED.contains(&name.as_str()) => {
                let name = name.clone();
                self.bump();
                Ok(name)
            }
            other => Err(Error::parse(
                self.offset(),
                format!("expected identifier, found {other:?}"),
            )),
        }
    }

    fn stmt_list_until(&mut self, close: Option<&str>) -> Result<Vec<Stmt>> {
        let mut stmts = Vec::new();
        loop {
            match (close, self.peek()) {
                (None, Tok::Eof) => break,
                (Some(p), tok) if tok.is(p) => break,
                (Some(_), Tok::Eof) => {
                    return Err(Error::parse(self.offset(), "unexpected end of input"))
                }
                _ => stmts.push(self.stmt()?),
            }
        }
        Ok(stmts)
    }

    fn block(&mut self) -> Result<Vec<Stmt>> {
        self.expect("{")?;
        let stmts = self.stmt_list_until(Some("}"))?;
        self.expect("}")?;
        Ok(stmts)
    }

    fn stmt(&mut self) -> Result<Stmt> {
        if self.eat(";") {
            return Ok(Stmt::Empty);
        }
        if self.peek().is("{") {
            return Ok(Stmt::Block(self.block()?));
        }
        if let Some(kind) = self.peek_decl_kind() {
            self.bump();
            let decl = self.var_decl(kind)?;
            self.eat(";");
            return Ok(Stmt::Decl(decl));
        }
        if self.peek().is_kw("function") {
            self.bump();
            let func = self.function_rest(true)?;
            return Ok(Stmt::FnDecl(func));
        }
        if self.eat_kw("return") {
            let value = if self.peek().is(";") || self.peek().is("}") || *self.peek() == Tok::Eof {
                None
            } else {
                Some(self.expr()?)
            };
            self.eat(";");
            return Ok(Stmt::Return(value));
        }
        if self.eat_kw("if") {
            self.expect("(")?;
            let test = self.expr()?;
            self.expect(")")?;
            let cons = Box::new(self.stmt()?);
            let alt = if self.eat_kw("else") {
                Some(Box::new(self.stmt()?))
            } else {
                None
            };
            return Ok(Stmt::If { test, cons, alt });
        }
        if self.eat_kw("while") {
            self.expect("(")?;
            let test = self.expr()?;
            self.expect(")")?;
            let body = Box::new(self.stmt()?);
            return Ok(Stmt::While { test, body });
        }
        if self.eat_kw("do") {
            let body = Box::new(self.stmt()?);
            if !self.eat_kw("while") {
                return Err(Error::parse(self.offset(), "expected `while` after do-body"));
            }
            self.expect("(")?;
            let test = self.expr()?;
            self.expect(")")?;
            self.eat(";");
            return Ok(Stmt::DoWhile { body, test });
        }
        if self.eat_kw("for") {
            return self.for_stmt();
        }
        if self.eat_kw("switch") {
            return self.switch_stmt();
        }
        if self.eat_kw("break") {
            let label = self.opt_label();
            self.eat(";");
            return Ok(Stmt::Break(label));
        }
        if self.eat_kw("continue") {
            let label = self.opt_label();
            self.eat(";");
            return Ok(Stmt::Continue(label));
        }
        if self.eat_kw("try") {
            let body = self.block()?;
            let catch = if self.eat_kw("catch") {
                let param = if self.eat("(") {
                    let name = self.ident()?;
                    self.expect(")")?;
                    Some(name)
                } else {
                    None
                };
                Some(CatchClause {
                    param,
                    body: self.block()?,
                })
            } else {
                None
            };
            let finally = if self.eat_kw("finally") {
                Some(self.block()?)
            } else {
                None
            };
            if catch.is_none() && finally.is_none() {
                return Err(Error::parse(self.offset(), "try without catch or finally"));
            }
            return Ok(Stmt::Try {
                body,
                catch,
                finally,
            });
        }
        // `label: stmt`
        if let Tok::Ident(name) = self.peek() {
            if !RESERVED.contains(&name.as_str()) && self.peek2().is(":") {
                let label = name.clone();
                self.bump();
                self.bump();
                let body = Box::new(self.stmt()?);
                return Ok(Stmt::Labeled { label, body });
            }
        }
        let expr = self.expr()?;
        self.eat(";");
        Ok(Stmt::Expr(expr))
    }

    fn peek_decl_kind(&self) -> Option<DeclKind> {
        match self.peek() {
            tok if tok.is_kw("var") => Some(DeclKind::Var),
            tok if tok.is_kw("let") => Some(DeclKind::Let),
            tok if tok.is_kw("const") => Some(DeclKind::Const),
            _ => None,
        }
    }

    fn var_decl(&mut self, kind: DeclKind) -> Result<VarDecl> {
        let name = self.ident()?;
        let init = if self.eat("=") {
            Some(self.assign_expr()?)
        } else {
            None
        };
        if self.peek().is(",") {
            // Normalization splits multi-binding declarations upstream.
            return Err(Error::parse(
                self.offset(),
                "multiple declarators in one declaration (input is not normalized)",
            ));
        }
        Ok(VarDecl { kind, name, init })
    }

    fn opt_label(&mut self) -> Option<String> {
        if let Tok::Ident(name) = self.peek() {
            if !RESERVED.contains(&name.as_str()) {
                let name = name.clone();
                self.bump();
                return Some(name);
            }
        }
        None
    }

    fn for_stmt(&mut self) -> Result<Stmt> {
        self.expect("(")?;
        // for-head declaration, possibly a for-in/for-of binding
        if let Some(kind) = self.peek_decl_kind() {
            self.bump();
            let name = self.ident()?;
            if self.eat_kw("in") {
                return self.for_each_rest(ForHead::Decl { kind, name }, IterationKind::In);
            }
            if self.eat_kw("of") {
                return self.for_each_rest(ForHead::Decl { kind, name }, IterationKind::Of);
            }
            let init = if self.eat("=") {
                self.no_in = true;
                let e = self.assign_expr();
                self.no_in = false;
                Some(e?)
            } else {
                None
            };
            if self.peek().is(",") {
                return Err(Error::parse(
                    self.offset(),
                    "multiple declarators in for-head (input is not normalized)",
                ));
            }
            self.expect(";")?;
            return self.for_classic_rest(Some(ForInit::Decl(VarDecl { kind, name, init })));
        }
        if self.eat(";") {
            return self.for_classic_rest(None);
        }
        self.no_in = true;
        let first = self.expr();
        self.no_in = false;
        let first = first?;
        let iteration = if self.eat_kw("in") {
            Some(IterationKind::In)
        } else if self.eat_kw("of") {
            Some(IterationKind::Of)
        } else {
            None
        };
        if let Some(iteration) = iteration {
            let head = match first {
                Expr::Ident(name) => ForHead::Ident(name),
                _ => {
                    return Err(Error::parse(
                        self.offset(),
                        "for-in/for-of target must be a plain identifier",
                    ))
                }
            };
            return self.for_each_rest(head, iteration);
        }
        self.expect(";")?;
        self.for_classic_rest(Some(ForInit::Expr(first)))
    }

    fn for_classic_rest(&mut self, init: Option<ForInit>) -> Result<Stmt> {
        let test = if self.peek().is(";") {
            None
        } else {
            Some(self.expr()?)
        };
        self.expect(";")?;
        let update = if self.peek().is(")") {
            None
        } else {
            Some(self.expr()?)
        };
        self.expect(")")?;
        let body = Box::new(self.stmt()?);
        Ok(Stmt::For {
            init,
            test,
            update,
            body,
        })
    }

    fn for_each_rest(&mut self, head: ForHead, iteration: IterationKind) -> Result<Stmt> {
        let object = self.expr()?;
        self.expect(")")?;
        let body = Box::new(self.stmt()?);
        Ok(Stmt::ForEach {
            head,
            iteration,
            object,
            body,
        })
    }

    fn switch_stmt(&mut self) -> Result<Stmt> {
        self.expect("(")?;
        let discriminant = self.expr()?;
        self.expect(")")?;
        self.expect("{")?;
        let mut cases = Vec::new();
        while !self.eat("}") {
            let test = if self.eat_kw("case") {
                let e = self.expr()?;
                self.expect(":")?;
                Some(e)
            } else if self.eat_kw("default") {
                self.expect(":")?;
                None
            } else {
                return Err(Error::parse(self.offset(), "expected `case` or `default`"));
            };
            let mut body = Vec::new();
            while !self.peek().is("}")
                && !self.peek().is_kw("case")
                && !self.peek().is_kw("default")
            {
                body.push(self.stmt()?);
            }
            cases.push(SwitchCase { test, body });
        }
        Ok(Stmt::Switch {
            discriminant,
            cases,
        })
    }

    fn function_rest(&mut self, named: bool) -> Result<Function> {
        let name = if named || matches!(self.peek(), Tok::Ident(n) if !RESERVED.contains(&n.as_str()))
        {
            Some(self.ident()?)
        } else {
            None
        };
        let params = self.param_list()?;
        let body = self.block()?;
        Ok(Function {
            name,
            params,
            body,
            arrow: false,
        })
    }

    fn param_list(&mut self) -> Result<Vec<String>> {
        self.expect("(")?;
        let mut params = Vec::new();
        if !self.peek().is(")") {
            loop {
                params.push(self.ident()?);
                if !self.eat(",") {
                    break;
                }
            }
        }
        self.expect(")")?;
        Ok(params)
    }

    fn expr(&mut self) -> Result<Expr> {
        let first = self.assign_expr()?;
        if !self.peek().is(",") {
            return Ok(first);
        }
        let mut exprs = vec![first];
        while self.eat(",") {
            exprs.push(self.assign_expr()?);
        }
        Ok(Expr::Seq(exprs))
    }

    fn assign_expr(&mut self) -> Result<Expr> {
        // `x => …` arrow with a bare parameter
        if let Tok::Ident(name) = self.peek() {
            if !RESERVED.contains(&name.as_str()) && self.peek2().is("=>") {
                let param = name.clone();
                self.bump();
                self.bump();
                return self.arrow_body(vec![param]);
            }
        }
        let lhs = self.cond_expr()?;
        let op = match self.peek() {
            tok if tok.is("=") => Some(AssignOp::Assign),
            tok if tok.is("+=") => Some(AssignOp::Add),
            tok if tok.is("-=") => Some(AssignOp::Sub),
            tok if tok.is("*=") => Some(AssignOp::Mul),
            tok if tok.is("/=") => Some(AssignOp::Div),
            _ => None,
        };
        let Some(op) = op else { return Ok(lhs) };
        let offset = self.offset();
        self.bump();
        let target = match lhs {
            Expr::Ident(name) => AssignTarget::Ident(name),
            Expr::Member { object, prop } => AssignTarget::Member { object, prop },
            _ => return Err(Error::parse(offset, "invalid assignment target")),
        };
        let value = Box::new(self.assign_expr()?);
        Ok(Expr::Assign { op, target, value })
    }

    fn arrow_body(&mut self, params: Vec<String>) -> Result<Expr> {
        let body = if self.peek().is("{") {
            self.block()?
        } else {
            // Expression bodies normalize to an explicit return.
            vec![Stmt::Return(Some(self.assign_expr()?))]
        };
        Ok(Expr::Fn(Box::new(Function {
            name: None,
            params,
            body,
            arrow: true,
        })))
    }

    fn cond_expr(&mut self) -> Result<Expr> {
        let test = self.binary_expr(0)?;
        if !self.eat("?") {
            return Ok(test);
        }
        let cons = self.assign_expr()?;
        self.expect(":")?;
        let alt = self.assign_expr()?;
        Ok(Expr::Cond {
            test: Box::new(test),
            cons: Box::new(cons),
            alt: Box::new(alt),
        })
    }

    fn peek_binary_op(&self) -> Option<(BinaryOp, u8)> {
        let op = match self.peek() {
            tok if tok.is("||") => (BinaryOp::Or, 1),
            tok if tok.is("&&") => (BinaryOp::And, 2),
            tok if tok.is("==") => (BinaryOp::Eq, 3),
            tok if tok.is("!=") => (BinaryOp::NotEq, 3),
            tok if tok.is("===") => (BinaryOp::StrictEq, 3),
            tok if tok.is("!==") => (BinaryOp::StrictNotEq, 3),
            tok if tok.is("<") => (BinaryOp::Lt, 4),
            tok if tok.is(">") => (BinaryOp::Gt, 4),
            tok if tok.is("<=") => (BinaryOp::Le, 4),
            tok if tok.is(">=") => (BinaryOp::Ge, 4),
            tok if tok.is_kw("in") && !self.no_in => (BinaryOp::In, 4),
            tok if tok.is("+") => (BinaryOp::Add, 5),
            tok if tok.is("-") => (BinaryOp::Sub, 5),
            tok if tok.is("*") => (BinaryOp::Mul, 6),
            tok if tok.is("/") => (BinaryOp::Div, 6),
            tok if tok.is("%") => (BinaryOp::Rem, 6),
            _ => return None,
        };
        Some(op)
    }

    fn binary_expr(&mut self, min_prec: u8) -> Result<Expr> {
        let mut left = self.unary_expr()?;
        while let Some((op, prec)) = self.peek_binary_op() {
            if prec < min_prec {
                break;
            }
            self.bump();
            let right = self.binary_expr(prec + 1)?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn unary_expr(&mut self) -> Result<Expr> {
        let op = match self.peek() {
            tok if tok.is("!") => Some(UnaryOp::Not),
            tok if tok.is("-") => Some(UnaryOp::Neg),
            tok if tok.is_kw("typeof") => Some(UnaryOp::TypeOf),
            tok if tok.is_kw("void") => Some(UnaryOp::Void),
            _ => None,
        };
        if let Some(op) = op {
            self.bump();
            let arg = Box::new(self.unary_expr()?);
            return Ok(Expr::Unary { op, arg });
        }
        if self.peek().is("++") || self.peek().is("--") {
            let op = if self.bump().is("++") {
                UpdateOp::Incr
            } else {
                UpdateOp::Decr
            };
            let name = self.ident()?;
            return Ok(Expr::Update {
                op,
                prefix: true,
                name,
            });
        }
        self.postfix_expr()
    }

    fn postfix_expr(&mut self) -> Result<Expr> {
        let expr = self.call_member_expr()?;
        if self.peek().is("++") || self.peek().is("--") {
            if let Expr::Ident(name) = expr {
                let op = if self.bump().is("++") {
                    UpdateOp::Incr
                } else {
                    UpdateOp::Decr
                };
                return Ok(Expr::Update {
                    op,
                    prefix: false,
                    name,
                });
            }
            return Err(Error::parse(
                self.offset(),
                "update target must be a plain identifier",
            ));
        }
        Ok(expr)
    }

    fn call_member_expr(&mut self) -> Result<Expr> {
        let mut expr = self.primary_expr()?;
        loop {
            if self.eat(".") {
                let name = match self.bump() {
                    Tok::Ident(name) => name,
                    other => {
                        return Err(Error::parse(
                            self.offset(),
                            format!("expected property name, found {other:?}"),
                        ))
                    }
                };
                expr = Expr::Member {
                    object: Box::new(expr),
                    prop: MemberProp::Name(name),
                };
            } else if self.eat("[") {
                let saved = self.no_in;
                self.no_in = false;
                let index = self.expr();
                self.no_in = saved;
                expr = Expr::Member {
                    object: Box::new(expr),
                    prop: MemberProp::Computed(Box::new(index?)),
                };
                self.expect("]")?;
            } else if self.peek().is("(") {
                let args = self.arg_list()?;
                expr = Expr::Call {
                    callee: Box::new(expr),
                    args,
                };
            } else {
                return Ok(expr);
            }
        }
    }

    fn arg_list(&mut self) -> Result<Vec<Expr>> {
        self.expect("(")?;
        let saved = self.no_in;
        self.no_in = false;
        let mut args = Vec::new();
        if !self.peek().is(")") {
            loop {
                args.push(self.assign_expr()?);
                if !self.eat(",") {
                    break;
                }
            }
        }
        self.no_in = saved;
        self.expect(")")?;
        Ok(args)
    }

    /// Whether a `(` at the current position opens an arrow parameter list.
    fn paren_starts_arrow(&self) -> bool {
        debug_assert!(self.peek().is("("));
        let mut depth = 0usize;
        let mut i = self.pos;
        while i < self.toks.len() {
            match &self.toks[i].0 {
                tok if tok.is("(") => depth += 1,
                tok if tok.is(")") => {
                    depth -= 1;
                    if depth == 0 {
                        return self
                            .toks
                            .get(i + 1)
                            .map(|(tok, _)| tok.is("=>"))
                            .unwrap_or(false);
                    }
                }
                Tok::Eof => return false,
                _ => {}
            }
            i += 1;
        }
        false
    }

    fn primary_expr(&mut self) -> Result<Expr> {
        match self.peek().clone() {
            Tok::Number(n) => {
                self.bump();
                Ok(Expr::Number(n))
            }
            Tok::Str(s) => {
                self.bump();
                Ok(Expr::Str(s))
            }
            tok if tok.is("(") => {
                if self.paren_starts_arrow() {
                    let params = self.param_list()?;
                    self.expect("=>")?;
                    return self.arrow_body(params);
                }
                self.bump();
                let saved = self.no_in;
                self.no_in = false;
                let expr = self.expr();
                self.no_in = saved;
                self.expect(")")?;
                expr
            }
            tok if tok.is("{") => {
                self.bump();
                let mut props = Vec::new();
                while !self.eat("}") {
                    let key = match self.bump() {
                        Tok::Ident(name) => name,
                        Tok::Str(s) => s,
                        other => {
                            return Err(Error::parse(
                                self.offset(),
                                format!("expected property key, found {other:?}"),
                            ))
                        }
                    };
                    self.expect(":")?;
                    props.push((key, self.assign_expr()?));
                    if !self.eat(",") && !self.peek().is("}") {
                        return Err(Error::parse(self.offset(), "expected `,` or `}`"));
                    }
                }
                Ok(Expr::Object(props))
            }
            tok if tok.is("[") => {
                self.bump();
                let mut items = Vec::new();
                while !self.eat("]") {
                    items.push(self.assign_expr()?);
                    if !self.eat(",") && !self.peek().is("]") {
                        return Err(Error::parse(self.offset(), "expected `,` or `]`"));
                    }
                }
                Ok(Expr::Array(items))
            }
            tok if tok.is_kw("function") => {
                self.bump();
                Ok(Expr::Fn(Box::new(self.function_rest(false)?)))
            }
            tok if tok.is_kw("this") => {
                self.bump();
                Ok(Expr::This)
            }
            tok if tok.is_kw("true") => {
                self.bump();
                Ok(Expr::Bool(true))
            }
            tok if tok.is_kw("false") => {
                self.bump();
                Ok(Expr::Bool(false))
            }
            tok if tok.is_kw("null") => {
                self.bump();
                Ok(Expr::Null)
            }
            Tok::Ident(name) => {
                if RESERVED.contains(&name.as_str()) {
                    return Err(Error::parse(
                        self.offset(),
                        format!("unexpected keyword `{name}`"),
                    ));
                }
                self.bump();
                Ok(Expr::Ident(name))
            }
            other => Err(Error::parse(
                self.offset(),
                format!("unexpected token {other:?}"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::print::program_to_string;

    fn roundtrip(src: &str) -> String {
        program_to_string(&parse_program(src).expect("parse failed"))
    }

    #[test]
    fn roundtrips_declarations_and_assignments() {
        assert_eq!(roundtrip("var x = 1; x += 2; x;"), "var x = 1; x += 2; x;");
        assert_eq!(roundtrip("let y;"), "let y;");
    }

    #[test]
    fn roundtrips_control_flow() {
        assert_eq!(
            roundtrip("if (x) { y = 1; } else y = 2;"),
            "if (x) { y = 1; } else y = 2;"
        );
        assert_eq!(
            roundtrip("for (var i = 0; i < 10; i++) { f(i); }"),
            "for (var i = 0; i < 10; i++) { f(i); }"
        );
        assert_eq!(roundtrip("for (x in k) x;"), "for (x in k) x;");
        assert_eq!(
            roundtrip("switch (x) { case 1: y; break; default: z; }"),
            "switch (x) { case 1: y; break; default: z; }"
        );
    }

    #[test]
    fn comma_and_compound_expressions() {
        assert_eq!(roundtrip("x = 1, y = 2, y;"), "x = 1, y = 2, y;");
        assert_eq!(roundtrip("f(bar(x = x + 1));"), "f(bar(x = x + 1));");
    }

    #[test]
    fn arrows_normalize_expression_bodies() {
        assert_eq!(
            roundtrip("var f = () => x + 1;"),
            "var f = () => { return x + 1; };"
        );
        assert_eq!(
            roundtrip("var f = (a) => { return a; };"),
            "var f = (a) => { return a; };"
        );
    }

    #[test]
    fn rejects_unnormalized_declarations() {
        assert!(parse_program("var x = 1, y = 2;").is_err());
    }

    #[test]
    fn in_operator_only_outside_for_heads() {
        assert_eq!(roundtrip("x = 'a' in obj;"), "x = 'a' in obj;");
        assert_eq!(
            roundtrip("for (k in ref = commands) { v; }"),
            "for (k in ref = commands) { v; }"
        );
    }
}
