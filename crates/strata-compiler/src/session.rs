//! The compilation session.
//!
//! Owns every cache of one run: slot scopes, the trace registry, the inlining
//! analysis and the diagnostics. Nothing here is shared between sessions.

use std::collections::HashSet;

use indexmap::{IndexMap, IndexSet};
use strata_core::{Program, QualifiedName};

use crate::config::{CompileMode, CompileOptions};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::emit::{self, BuildOutput};
use crate::inline::{self, Decision, InlineAnalyzer};
use crate::slots::{AssemblyScope, TypeScope};
use crate::traces::{TraceFlavor, TraceId, TraceRegistry};
use crate::{Error, PassResult, Result, SourceMap};

pub struct Session<'p> {
    program: &'p Program,
    options: CompileOptions,
    sources: SourceMap,
    registry: TraceRegistry,
    analyzer: InlineAnalyzer,
    diagnostics: Diagnostics,
    inlined: IndexSet<QualifiedName>,
    assembly_scopes: IndexMap<String, AssemblyScope>,
    type_scopes: IndexMap<QualifiedName, TypeScope>,
    prepared: bool,
}

impl<'p> Session<'p> {
    pub fn new(program: &'p Program, options: CompileOptions) -> Self {
        let analyzer = InlineAnalyzer::new(options.inline_threshold, options.inlining);
        Self {
            program,
            options,
            sources: SourceMap::new(),
            registry: TraceRegistry::new(),
            analyzer,
            diagnostics: Diagnostics::new(),
            inlined: IndexSet::new(),
            assembly_scopes: IndexMap::new(),
            type_scopes: IndexMap::new(),
            prepared: false,
        }
    }

    /// Load a trace manifest. `name` is the manifest's path; its stem names the trace.
    pub fn add_trace(
        &mut self,
        name: impl Into<String>,
        text: impl Into<String>,
        initial: bool,
    ) -> Result<TraceId> {
        if self.prepared {
            return Err(Error::Internal("trace added after the session was prepared".into()));
        }
        let source = self.sources.add(name, text);
        let flavor = if initial {
            TraceFlavor::Initial
        } else {
            TraceFlavor::OnDemand
        };
        self.registry.load(
            self.program,
            &self.sources,
            source,
            flavor,
            &mut self.diagnostics,
        )
    }

    /// Run every analysis emission depends on. Idempotent.
    pub fn prepare(&mut self) -> Result<()> {
        if self.prepared {
            return Ok(());
        }

        self.check_entry_point()?;
        inline::report_unresolved_calls(self.program, &mut self.diagnostics);
        crate::attributes::validate(self.program, &mut self.diagnostics);
        self.analyze_inlining();
        self.report_unused();

        if self.options.mode == CompileMode::Traced {
            self.registry
                .finalize_remainder(self.program, self.options.remainder_name.as_deref())?;
        }

        self.build_scopes();
        self.prepared = true;
        Ok(())
    }

    pub fn compile(self) -> PassResult<BuildOutput> {
        self.compile_skipping(&HashSet::new())
    }

    /// Compile, leaving out the artifacts of the named, already up-to-date assemblies.
    ///
    /// Traced builds always emit every artifact.
    pub fn compile_skipping(mut self, up_to_date: &HashSet<String>) -> PassResult<BuildOutput> {
        self.prepare()?;
        let skip = match self.options.mode {
            CompileMode::Traced => HashSet::new(),
            _ => up_to_date.clone(),
        };
        let output = emit::emit(&self, &skip)?;
        Ok((output, self.diagnostics))
    }

    /// Per-assembly fingerprints, in program order.
    pub fn fingerprints(&self) -> IndexMap<String, u32> {
        emit::fingerprints(self.program, &self.options)
    }

    pub fn program(&self) -> &'p Program {
        self.program
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    pub fn sources(&self) -> &SourceMap {
        &self.sources
    }

    pub fn registry(&self) -> &TraceRegistry {
        &self.registry
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn is_inlined(&self, method: &QualifiedName) -> bool {
        self.inlined.contains(method)
    }

    pub fn inlined(&self) -> impl Iterator<Item = &QualifiedName> {
        self.inlined.iter()
    }

    /// Inlining decision for one method; answered from the analyzer's cache.
    pub fn inline_decision(&mut self, method: &QualifiedName) -> Decision {
        self.analyzer.decide(self.program, method)
    }

    pub fn assembly_scope(&self, assembly: &str) -> Result<&AssemblyScope> {
        self.assembly_scopes
            .get(assembly)
            .ok_or_else(|| Error::Internal(format!("no slot scope for assembly `{assembly}`")))
    }

    pub fn type_scope(&self, ty: &QualifiedName) -> Result<&TypeScope> {
        self.type_scopes
            .get(ty)
            .ok_or_else(|| Error::Internal(format!("no slot scope for type `{ty}`")))
    }

    fn check_entry_point(&self) -> Result<()> {
        let Some(entry) = self.program.entry_point() else {
            return Ok(());
        };
        let invalid = |reason| {
            Err(Error::InvalidEntryPoint {
                name: entry.clone(),
                reason,
            })
        };

        let Some(method) = self.program.method(entry) else {
            return invalid("method does not exist");
        };
        if !method.is_static {
            return invalid("entry point must be static");
        }
        if method.params > 0 {
            return invalid("entry point must take no arguments");
        }
        if self.program.type_def(entry).is_some_and(|t| t.is_generic()) {
            return invalid("entry point must not belong to a generic type");
        }
        if !method.used {
            return invalid("entry point is not marked used");
        }
        if self.program.type_def(entry).is_some_and(|t| !t.used) {
            return invalid("entry point belongs to a type not marked used");
        }
        Ok(())
    }

    fn analyze_inlining(&mut self) {
        for asm in self.program.assemblies() {
            for ty in asm.used_types() {
                for method in ty.used_methods() {
                    if !self.analyzer.is_inlinable(self.program, &method.name) {
                        continue;
                    }
                    self.diagnostics
                        .report(DiagnosticKind::InlinedDefinition)
                        .message(method.name.to_string())
                        .emit();
                    self.inlined.insert(method.name.clone());
                }
            }
        }
        log::debug!("{} method(s) inlined", self.inlined.len());
    }

    fn report_unused(&mut self) {
        for asm in self.program.assemblies() {
            for ty in asm.types() {
                if !ty.used {
                    self.diagnostics
                        .report(DiagnosticKind::UnusedDefinition)
                        .message(ty.name.to_string())
                        .emit();
                    continue;
                }
                for method in ty.methods().filter(|m| !m.used) {
                    self.diagnostics
                        .report(DiagnosticKind::UnusedDefinition)
                        .message(method.name.to_string())
                        .emit();
                }
            }
        }
    }

    fn build_scopes(&mut self) {
        let style = self.options.scope_style();
        let friendly = self.options.friendly_len();
        let inlined = &self.inlined;

        for asm in self.program.assemblies() {
            let scope = AssemblyScope::build(self.program, asm, style, friendly);
            self.assembly_scopes.insert(asm.name.clone(), scope);

            for ty in asm.used_types() {
                let scope = TypeScope::build(self.program, ty, style, friendly, |m| {
                    !inlined.contains(&m.name)
                });
                self.type_scopes.insert(ty.name.clone(), scope);
            }
        }
    }
}
