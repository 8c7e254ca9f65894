//! Structural checks that run before any cost is computed.

use strata_core::{MethodDef, Program, QualifiedName};

use crate::attributes;

/// Why a method can never be inlined.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Rejection {
    Unknown,
    Virtual,
    Abstract,
    InterfaceMethod,
    RuntimeSpecial,
    NeedsReflection,
    EntryPoint,
    Constructor,
    Interop,
    Empty,
    SourceReturns,
    TargetReturns,
    SelfRecursive,
    /// Closes a call cycle found while computing costs.
    MutualRecursion,
}

impl Rejection {
    pub fn reason(self) -> &'static str {
        match self {
            Self::Unknown => "call target does not exist",
            Self::Virtual => "virtual",
            Self::Abstract => "abstract",
            Self::InterfaceMethod => "interface method",
            Self::RuntimeSpecial => "implemented by the runtime",
            Self::NeedsReflection => "needs reflection metadata",
            Self::EntryPoint => "entry point",
            Self::Constructor => "constructor",
            Self::Interop => "import or export boundary",
            Self::Empty => "empty body",
            Self::SourceReturns => "more than one return path",
            Self::TargetReturns => "no single result expression after translation",
            Self::SelfRecursive => "self-recursive",
            Self::MutualRecursion => "mutually recursive",
        }
    }
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.reason())
    }
}

/// What the analyzer needs to know about the program.
pub trait CallGraph {
    fn method(&self, name: &QualifiedName) -> Option<&MethodDef>;

    fn is_interface_method(&self, name: &QualifiedName) -> bool;

    fn is_entry_point(&self, name: &QualifiedName) -> bool;

    /// Local instruction weight, callees excluded.
    fn weight(&self, method: &MethodDef) -> u32 {
        method.weight()
    }

    /// Call targets in instruction order, duplicates kept.
    fn callees<'m>(&self, method: &'m MethodDef) -> &'m [QualifiedName] {
        method.calls()
    }
}

impl CallGraph for Program {
    fn method(&self, name: &QualifiedName) -> Option<&MethodDef> {
        Program::method(self, name)
    }

    fn is_interface_method(&self, name: &QualifiedName) -> bool {
        Program::is_interface_method(self, name)
    }

    fn is_entry_point(&self, name: &QualifiedName) -> bool {
        self.entry_point() == Some(name)
    }
}

/// Run every structural check on `name`, in order. All must pass.
pub fn check<'g, G: CallGraph + ?Sized>(
    graph: &'g G,
    name: &QualifiedName,
) -> Result<&'g MethodDef, Rejection> {
    let Some(method) = graph.method(name) else {
        return Err(Rejection::Unknown);
    };
    let flags = &method.flags;

    if flags.is_virtual {
        return Err(Rejection::Virtual);
    }
    if flags.is_abstract {
        return Err(Rejection::Abstract);
    }
    if graph.is_interface_method(name) {
        return Err(Rejection::InterfaceMethod);
    }
    if flags.is_runtime_special {
        return Err(Rejection::RuntimeSpecial);
    }
    if attributes::has(method, &attributes::NEEDS_REFLECTION) {
        return Err(Rejection::NeedsReflection);
    }
    if graph.is_entry_point(name) {
        return Err(Rejection::EntryPoint);
    }
    if method.is_any_constructor() {
        return Err(Rejection::Constructor);
    }
    if flags.is_extern
        || attributes::has(method, &attributes::IMPORT)
        || attributes::has(method, &attributes::EXPORT)
    {
        return Err(Rejection::Interop);
    }

    let Some(body) = &method.body else {
        return Err(Rejection::Empty);
    };
    if method.weight() == 0 {
        return Err(Rejection::Empty);
    }
    if body.source_returns != 1 {
        return Err(Rejection::SourceReturns);
    }
    if body.target_returns != 1 {
        return Err(Rejection::TargetReturns);
    }
    if graph.callees(method).contains(name) {
        return Err(Rejection::SelfRecursive);
    }

    Ok(method)
}
