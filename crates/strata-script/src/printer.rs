//! Deterministic pretty printer.
//!
//! Two-space indentation, one statement per line, objects with properties
//! broken one per line. The same tree always prints the same text.

use std::fmt::Write as _;

use strata_core::utils::is_identifier;

use crate::ast::{Expr, Function, Script, Stmt};

const INDENT: &str = "  ";

pub fn print_script(script: &Script) -> String {
    let mut printer = Printer::default();
    if script.strict {
        printer.out.push_str("\"use strict\";\n");
    }
    printer.stmts(&script.stmts);
    printer.out
}

pub fn print_expr(expr: &Expr) -> String {
    let mut printer = Printer::default();
    printer.expr(expr);
    printer.out
}

/// Script string literal, double-quoted.
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{2028}' | '\u{2029}' => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[derive(Default)]
struct Printer {
    out: String,
    depth: usize,
}

impl Printer {
    fn indent(&mut self) {
        for _ in 0..self.depth {
            self.out.push_str(INDENT);
        }
    }

    fn stmts(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            self.stmt(stmt);
        }
    }

    fn block(&mut self, stmts: &[Stmt]) {
        if stmts.is_empty() {
            self.out.push_str("{}");
            return;
        }
        self.out.push_str("{\n");
        self.depth += 1;
        self.stmts(stmts);
        self.depth -= 1;
        self.indent();
        self.out.push('}');
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Blank => self.out.push('\n'),
            Stmt::Raw(text) => self.raw(text),
            _ => {
                self.indent();
                self.stmt_body(stmt);
                self.out.push('\n');
            }
        }
    }

    fn raw(&mut self, text: &str) {
        for line in text.lines() {
            if line.trim().is_empty() {
                self.out.push('\n');
                continue;
            }
            self.indent();
            self.out.push_str(line);
            self.out.push('\n');
        }
    }

    fn stmt_body(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Expr(expr) => {
                // Statement-leading `function`/`{` would parse as a declaration/block.
                if matches!(expr, Expr::Function(_) | Expr::Object(_)) {
                    self.parenthesized(expr);
                } else {
                    self.expr(expr);
                }
                self.out.push(';');
            }
            Stmt::Var(name, init) => {
                self.out.push_str("var ");
                self.out.push_str(name);
                if let Some(init) = init {
                    self.out.push_str(" = ");
                    self.expr(init);
                }
                self.out.push(';');
            }
            Stmt::Return(value) => {
                self.out.push_str("return");
                if let Some(value) = value {
                    self.out.push(' ');
                    self.expr(value);
                }
                self.out.push(';');
            }
            Stmt::If {
                cond,
                then,
                otherwise,
            } => {
                self.out.push_str("if (");
                self.expr(cond);
                self.out.push_str(") ");
                self.block(then);
                if !otherwise.is_empty() {
                    self.out.push_str(" else ");
                    self.block(otherwise);
                }
            }
            Stmt::Try {
                body,
                param,
                handler,
            } => {
                self.out.push_str("try ");
                self.block(body);
                self.out.push_str(" catch (");
                self.out.push_str(param);
                self.out.push_str(") ");
                self.block(handler);
            }
            Stmt::Comment(text) => {
                self.out.push_str("// ");
                self.out.push_str(text);
            }
            Stmt::Blank | Stmt::Raw(_) => {}
        }
    }

    fn expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Ident(name) => self.out.push_str(name),
            Expr::Str(value) => self.out.push_str(&quote(value)),
            Expr::Num(n) => {
                let _ = write!(self.out, "{n}");
            }
            Expr::Bool(b) => self.out.push_str(if *b { "true" } else { "false" }),
            Expr::Null => self.out.push_str("null"),
            Expr::Raw(text) => self.out.push_str(text),
            Expr::Member(object, name) => {
                self.operand(object);
                if is_identifier(name) {
                    self.out.push('.');
                    self.out.push_str(name);
                } else {
                    self.out.push('[');
                    self.out.push_str(&quote(name));
                    self.out.push(']');
                }
            }
            Expr::Index(object, key) => {
                self.operand(object);
                self.out.push('[');
                self.expr(key);
                self.out.push(']');
            }
            Expr::Call(callee, args) => {
                self.operand(callee);
                self.out.push('(');
                self.list(args);
                self.out.push(')');
            }
            Expr::Array(items) => {
                self.out.push('[');
                self.list(items);
                self.out.push(']');
            }
            Expr::Object(props) => self.object(props),
            Expr::Function(function) => self.function(function),
            Expr::Assign(target, value) => {
                self.expr(target);
                self.out.push_str(" = ");
                self.expr(value);
            }
        }
    }

    /// Left-hand side of a member access or call.
    fn operand(&mut self, expr: &Expr) {
        match expr {
            Expr::Function(_) | Expr::Assign(..) | Expr::Num(_) | Expr::Object(_) => {
                self.parenthesized(expr)
            }
            _ => self.expr(expr),
        }
    }

    fn parenthesized(&mut self, expr: &Expr) {
        self.out.push('(');
        self.expr(expr);
        self.out.push(')');
    }

    fn list(&mut self, items: &[Expr]) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.expr(item);
        }
    }

    fn object(&mut self, props: &[(String, Expr)]) {
        if props.is_empty() {
            self.out.push_str("{}");
            return;
        }
        self.out.push_str("{\n");
        self.depth += 1;
        for (i, (key, value)) in props.iter().enumerate() {
            self.indent();
            if is_identifier(key) {
                self.out.push_str(key);
            } else {
                self.out.push_str(&quote(key));
            }
            self.out.push_str(": ");
            self.expr(value);
            if i + 1 < props.len() {
                self.out.push(',');
            }
            self.out.push('\n');
        }
        self.depth -= 1;
        self.indent();
        self.out.push('}');
    }

    fn function(&mut self, function: &Function) {
        self.out.push_str("function ");
        if let Some(name) = &function.name {
            self.out.push_str(name);
        }
        self.out.push('(');
        self.out.push_str(&function.params.join(", "));
        self.out.push_str(") ");
        self.block(&function.body);
    }
}
