use std::collections::HashMap;
use std::path::Path;

use indexmap::{IndexMap, IndexSet};
use strata_core::utils::file_stem;
use strata_core::{NameKind, Program, QualifiedName};

use super::manifest::{Claim, Directive, parse_manifest};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::{Error, SourceId, SourceMap, Span};

/// Name of the anonymous catch-all trace.
pub const REMAINDER: &str = "$remainder";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TraceId(u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TraceFlavor {
    /// Merged into the always-loaded bootstrap.
    Initial,
    /// A separate bundle loaded on first use.
    OnDemand,
    /// The implicit catch-all for everything never claimed.
    Remainder,
}

/// What a trace claims of one type.
///
/// The structure and the methods are claimed independently: a type can
/// belong to one trace while some of its methods belong to others.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TypeTrace {
    pub structure: bool,
    pub methods: IndexSet<QualifiedName>,
}

#[derive(Clone, Debug)]
pub struct Trace {
    pub id: TraceId,
    pub name: String,
    pub flavor: TraceFlavor,
    assemblies: IndexSet<String>,
    types: IndexMap<QualifiedName, TypeTrace>,
    methods: IndexSet<QualifiedName>,
}

impl Trace {
    fn new(id: TraceId, name: String, flavor: TraceFlavor) -> Self {
        Self {
            id,
            name,
            flavor,
            assemblies: IndexSet::new(),
            types: IndexMap::new(),
            methods: IndexSet::new(),
        }
    }

    /// Whether the trace's definitions load with the bootstrap.
    pub fn is_bootstrap(&self) -> bool {
        self.flavor != TraceFlavor::OnDemand
    }

    pub fn assemblies(&self) -> impl Iterator<Item = &str> {
        self.assemblies.iter().map(String::as_str)
    }

    pub fn types(&self) -> impl Iterator<Item = (&QualifiedName, &TypeTrace)> {
        self.types.iter()
    }

    pub fn type_trace(&self, ty: &QualifiedName) -> Option<&TypeTrace> {
        self.types.get(ty)
    }

    pub fn methods(&self) -> impl Iterator<Item = &QualifiedName> {
        self.methods.iter()
    }

    pub fn claims(&self, name: &QualifiedName) -> bool {
        match name.kind() {
            NameKind::Assembly => self.assemblies.contains(&name.assembly),
            NameKind::Type => self.types.get(name).is_some_and(|t| t.structure),
            NameKind::Member => self.methods.contains(name),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.assemblies.is_empty() && self.types.is_empty() && self.methods.is_empty()
    }

    fn record(&mut self, name: &QualifiedName) {
        match name.kind() {
            NameKind::Assembly => {
                self.assemblies.insert(name.assembly.clone());
            }
            NameKind::Type => {
                self.types.entry(name.clone()).or_default().structure = true;
            }
            NameKind::Member => {
                self.methods.insert(name.clone());
                if let Some(ty) = name.declaring_type() {
                    self.types.entry(ty).or_default().methods.insert(name.clone());
                }
            }
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Owner {
    trace: TraceId,
    /// Index into `claim_spans`; sweeps have no span.
    claimed_at: Option<usize>,
}

/// Every trace of a session and the single owner of each definition.
#[derive(Clone, Debug, Default)]
pub struct TraceRegistry {
    traces: Vec<Trace>,
    owners: HashMap<QualifiedName, Owner>,
    claim_spans: Vec<Span>,
    finalized: bool,
}

impl TraceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load one manifest as a new trace named after the manifest's file stem.
    ///
    /// Unknown targets and malformed statements abort; conflicting claims are
    /// reported and ignored.
    pub fn load(
        &mut self,
        program: &Program,
        sources: &SourceMap,
        source: SourceId,
        flavor: TraceFlavor,
        diags: &mut Diagnostics,
    ) -> Result<TraceId, Error> {
        if self.finalized {
            return Err(Error::Internal("trace loaded after finalization".into()));
        }
        let Some(manifest) = sources.get(source) else {
            return Err(Error::Internal(format!("manifest source {source:?} is not registered")));
        };

        let name = trace_name(&manifest.name);
        let directives = parse_manifest(sources, source)?;
        for directive in &directives {
            resolve(program, directive, &manifest.name)?;
        }

        let id = self.add_trace(name.clone(), flavor)?;
        for directive in &directives {
            self.apply(program, id, directive, diags);
        }

        if directives.is_empty() {
            diags
                .report(DiagnosticKind::EmptyManifest)
                .message(&name)
                .emit();
        }

        log::debug!(
            "trace `{name}` ({flavor:?}): {} directive(s) from {}",
            directives.len(),
            manifest.name
        );
        Ok(id)
    }

    /// Sweep everything unclaimed into the catch-all trace.
    ///
    /// With a name, the catch-all is an ordinary on-demand trace; without one it is
    /// the anonymous remainder, loaded with the bootstrap.
    pub fn finalize_remainder(
        &mut self,
        program: &Program,
        name: Option<&str>,
    ) -> Result<TraceId, Error> {
        if self.finalized {
            return Err(Error::Internal("trace registry finalized twice".into()));
        }

        let (name, flavor) = match name {
            Some(name) => (name.to_owned(), TraceFlavor::OnDemand),
            None => (REMAINDER.to_owned(), TraceFlavor::Remainder),
        };
        let id = self.add_trace(name, flavor)?;

        for asm in program.assemblies() {
            self.claim_unowned(id, asm.qualified_name(), None);
            for ty in asm.types() {
                self.claim_unowned(id, ty.name.clone(), None);
                for method in ty.used_methods() {
                    self.claim_unowned(id, method.name.clone(), None);
                }
            }
        }

        self.finalized = true;
        let trace = self.trace(id);
        log::debug!(
            "remainder `{}`: {} assembly(ies), {} type(s), {} method(s)",
            trace.name,
            trace.assemblies.len(),
            trace.types.values().filter(|t| t.structure).count(),
            trace.methods.len()
        );
        Ok(id)
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// The trace owning `name`. Total over the program once finalized.
    pub fn assignment_of(&self, name: &QualifiedName) -> Option<&Trace> {
        self.owners.get(name).map(|o| self.trace(o.trace))
    }

    pub fn trace(&self, id: TraceId) -> &Trace {
        &self.traces[id.0 as usize]
    }

    pub fn by_name(&self, name: &str) -> Option<&Trace> {
        self.traces.iter().find(|t| t.name == name)
    }

    pub fn traces(&self) -> impl Iterator<Item = &Trace> {
        self.traces.iter()
    }

    fn add_trace(&mut self, name: String, flavor: TraceFlavor) -> Result<TraceId, Error> {
        if self.by_name(&name).is_some() {
            return Err(Error::DuplicateTrace(name));
        }
        if flavor == TraceFlavor::OnDemand {
            let path = artifact_path(&name);
            let clash = self
                .traces
                .iter()
                .find(|t| t.flavor == TraceFlavor::OnDemand && artifact_path(&t.name) == path);
            if let Some(first) = clash {
                return Err(Error::TraceArtifactCollision {
                    first: first.name.clone(),
                    second: name,
                    path,
                });
            }
        }
        let id = TraceId(self.traces.len() as u32);
        self.traces.push(Trace::new(id, name, flavor));
        Ok(id)
    }

    fn apply(&mut self, program: &Program, id: TraceId, directive: &Directive, diags: &mut Diagnostics) {
        let span = self.claim_spans.len();
        self.claim_spans.push(directive.span.clone());

        match &directive.claim {
            Claim::Assembly(assembly) => {
                let name = QualifiedName::assembly(assembly.clone());
                if !self.claim_explicit(id, name, span, diags) {
                    return;
                }
                let Some(asm) = program.assembly(assembly) else {
                    return;
                };
                for ty in asm.types() {
                    self.claim_unowned(id, ty.name.clone(), Some(span));
                    for method in ty.used_methods() {
                        self.claim_unowned(id, method.name.clone(), Some(span));
                    }
                }
            }
            Claim::Type { assembly, ty } => {
                let name = QualifiedName::of_type(assembly.clone(), ty.clone());
                if !self.claim_explicit(id, name.clone(), span, diags) {
                    return;
                }
                let Some(ty) = program.type_def(&name) else {
                    return;
                };
                for method in ty.used_methods() {
                    self.claim_unowned(id, method.name.clone(), Some(span));
                }
            }
            Claim::Method {
                assembly,
                ty,
                method,
            } => {
                let name = QualifiedName::of_member(assembly.clone(), ty.clone(), method.clone());
                self.claim_explicit(id, name, span, diags);
            }
        }
    }

    /// First claim wins. Returns whether `id` owns `name` afterwards.
    fn claim_explicit(
        &mut self,
        id: TraceId,
        name: QualifiedName,
        span: usize,
        diags: &mut Diagnostics,
    ) -> bool {
        let Some(owner) = self.owners.get(&name).copied() else {
            self.claim_unowned(id, name, Some(span));
            return true;
        };
        if owner.trace == id {
            return true;
        }

        let original = &self.trace(owner.trace).name;
        let claimant = &self.trace(id).name;
        let mut report = diags
            .report(DiagnosticKind::DuplicateClaim)
            .message(format!(
                "`{name}` is already claimed by trace `{original}`; claim in trace `{claimant}` ignored"
            ))
            .at(self.claim_spans[span].clone());
        if let Some(first) = owner.claimed_at {
            report = report.related_to(
                format!("first claimed by `{original}` here"),
                self.claim_spans[first].clone(),
            );
        }
        report.emit();
        false
    }

    fn claim_unowned(&mut self, id: TraceId, name: QualifiedName, claimed_at: Option<usize>) {
        if self.owners.contains_key(&name) {
            return;
        }
        self.traces[id.0 as usize].record(&name);
        self.owners.insert(name, Owner { trace: id, claimed_at });
    }
}

/// Check that a directive names definitions that exist.
fn resolve(program: &Program, directive: &Directive, manifest: &str) -> Result<(), Error> {
    let at = || directive.location(manifest);
    let (assembly, ty, method) = match &directive.claim {
        Claim::Assembly(a) => (a, None, None),
        Claim::Type { assembly, ty } => (assembly, Some(ty), None),
        Claim::Method {
            assembly,
            ty,
            method,
        } => (assembly, Some(ty), Some(method)),
    };

    let Some(asm) = program.assembly(assembly) else {
        return Err(Error::UnknownAssembly {
            at: at(),
            name: assembly.clone(),
        });
    };
    let Some(ty) = ty else {
        return Ok(());
    };
    let Some(type_def) = asm.type_def(ty) else {
        return Err(Error::UnknownType {
            at: at(),
            name: QualifiedName::of_type(assembly.clone(), ty.clone()),
        });
    };
    if let Some(method) = method
        && type_def.method(method).is_none()
    {
        return Err(Error::UnknownMethod {
            at: at(),
            name: QualifiedName::of_member(assembly.clone(), ty.clone(), method.clone()),
        });
    }
    Ok(())
}

/// Artifact of an on-demand trace, relative to the output directory.
pub fn artifact_path(trace: &str) -> String {
    format!("traces/{}.js", file_stem(trace))
}

/// `traces/core.trace` → `core`
fn trace_name(manifest: &str) -> String {
    Path::new(manifest)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(manifest)
        .to_owned()
}
