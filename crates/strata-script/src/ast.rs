//! Syntax tree for the generated scripts.
//!
//! Only the constructs the bundle back end emits. Method
//! bodies arrive already translated and are carried as [`Stmt::Raw`].

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Ident(String),
    Str(String),
    Num(i64),
    Bool(bool),
    Null,
    /// `object.name`, or `object["name"]` when `name` is not an identifier.
    Member(Box<Expr>, String),
    Index(Box<Expr>, Box<Expr>),
    Call(Box<Expr>, Vec<Expr>),
    Function(Box<Function>),
    Array(Vec<Expr>),
    /// Properties in insertion order.
    Object(Vec<(String, Expr)>),
    Assign(Box<Expr>, Box<Expr>),
    /// Pre-rendered expression text.
    Raw(String),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Function {
    pub name: Option<String>,
    pub params: Vec<String>,
    pub body: Vec<Stmt>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    Expr(Expr),
    Var(String, Option<Expr>),
    Return(Option<Expr>),
    If {
        cond: Expr,
        then: Vec<Stmt>,
        otherwise: Vec<Stmt>,
    },
    Try {
        body: Vec<Stmt>,
        param: String,
        handler: Vec<Stmt>,
    },
    /// Pre-rendered statements, re-indented line by line.
    Raw(String),
    Comment(String),
    Blank,
}

/// A whole generated file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Script {
    pub strict: bool,
    pub stmts: Vec<Stmt>,
}

impl Expr {
    pub fn ident(name: impl Into<String>) -> Self {
        Self::Ident(name.into())
    }

    pub fn str(value: impl Into<String>) -> Self {
        Self::Str(value.into())
    }

    pub fn function(params: &[&str], body: Vec<Stmt>) -> Self {
        Self::Function(Box::new(Function {
            name: None,
            params: params.iter().map(|p| (*p).to_owned()).collect(),
            body,
        }))
    }

    /// Zero-argument function returning `value`.
    pub fn thunk(value: Expr) -> Self {
        Self::function(&[], vec![Stmt::Return(Some(value))])
    }

    pub fn object<K: Into<String>>(props: impl IntoIterator<Item = (K, Expr)>) -> Self {
        Self::Object(props.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn member(self, name: impl Into<String>) -> Self {
        Self::Member(Box::new(self), name.into())
    }

    pub fn index(self, key: Expr) -> Self {
        Self::Index(Box::new(self), Box::new(key))
    }

    pub fn call(self, args: Vec<Expr>) -> Self {
        Self::Call(Box::new(self), args)
    }

    pub fn assign(self, value: Expr) -> Self {
        Self::Assign(Box::new(self), Box::new(value))
    }

    /// Wrap as an expression statement.
    pub fn stmt(self) -> Stmt {
        Stmt::Expr(self)
    }
}

impl Stmt {
    pub fn var(name: impl Into<String>, init: Expr) -> Self {
        Self::Var(name.into(), Some(init))
    }

    pub fn comment(text: impl Into<String>) -> Self {
        Self::Comment(text.into())
    }
}

impl Script {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    pub fn push(&mut self, stmt: Stmt) {
        self.stmts.push(stmt);
    }

    pub fn extend(&mut self, stmts: impl IntoIterator<Item = Stmt>) {
        self.stmts.extend(stmts);
    }

    pub fn is_empty(&self) -> bool {
        self.stmts.is_empty()
    }
}
