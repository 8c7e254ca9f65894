//! One walk over assemblies, types and methods, shared by every mode.
//!
//! Every assembly artifact binds `$a.$refs` (referenced-assembly builders),
//! `$a.$types` (type builders) and, in the entry assembly, `$a.$entry`.

use std::collections::HashSet;

use indexmap::{IndexMap, IndexSet};
use strata_core::utils::file_stem;
use strata_core::{Assembly, MethodDef, QualifiedName, TypeDef};
use strata_script::{Expr, Function, Stmt};

use super::artifacts::{self, Artifact, BuildOutput, INITIAL_PATH};
use super::strategy::{
    Bundle, Definition, Monolithic, OnDemand, Placement, PlacementStrategy, Traced,
};
use super::units::{TypeReport, UnitReport, fingerprints};
use crate::attributes;
use crate::config::CompileMode;
use crate::session::Session;
use crate::slots::{AssemblyScope, Intrinsic, TypeScope};
use crate::traces::{Trace, TraceFlavor, artifact_path};
use crate::{Error, Result};

pub fn emit(session: &Session<'_>, skip: &HashSet<String>) -> Result<BuildOutput> {
    let orchestrator = Orchestrator { session };
    let mut output = match session.options().get_mode() {
        CompileMode::Monolithic => orchestrator.per_assembly(&Monolithic, skip)?,
        CompileMode::OnDemand => orchestrator.per_assembly(&OnDemand, skip)?,
        CompileMode::Traced => orchestrator.traced()?,
    };
    output.units = orchestrator.units()?;
    Ok(output)
}

fn runtime() -> Expr {
    Expr::ident("$")
}

fn assembly_var() -> Expr {
    Expr::ident("$a")
}

fn this_type() -> Expr {
    Expr::ident("t")
}

fn slot_list(slots: Vec<String>) -> Expr {
    Expr::Array(slots.into_iter().map(Expr::Str).collect())
}

fn assembly_path(asm: &Assembly) -> String {
    format!("{}.js", file_stem(&asm.name))
}

struct Orchestrator<'s, 'p> {
    session: &'s Session<'p>,
}

impl Orchestrator<'_, '_> {
    /// Monolithic and on-demand builds: one artifact per assembly.
    fn per_assembly(
        &self,
        strategy: &dyn PlacementStrategy,
        skip: &HashSet<String>,
    ) -> Result<BuildOutput> {
        let program = self.session.program();
        let mut output = BuildOutput::default();
        output.artifacts.push(artifacts::runtime());
        let mut order = Vec::new();

        for asm in program.dependency_order() {
            let path = assembly_path(asm);
            order.push(path.clone());
            if skip.contains(&asm.name) {
                log::debug!("[{}] is up to date", asm.name);
                continue;
            }

            let scope = self.session.assembly_scope(&asm.name)?;
            let mut body = self.header(asm, scope)?;
            let mut direct = Vec::new();
            let mut cached = Vec::new();

            for ty in asm.used_types() {
                let slot = scope.type_slot(&ty.name)?;
                let definition = self.type_definition(asm, scope, ty, strategy)?;
                match strategy.place(Definition::Type(&ty.name))? {
                    Placement::Inline => direct.push((slot.to_owned(), definition)),
                    Placement::Cache => cached.push(
                        runtime()
                            .member("lazy")
                            .call(vec![
                                assembly_var().member("$types"),
                                Expr::str(slot),
                                Expr::thunk(definition),
                            ])
                            .stmt(),
                    ),
                    Placement::Redirect(trace) => {
                        return Err(Error::Internal(format!(
                            "`{}` redirected to trace `{trace}` outside a traced build",
                            ty.name
                        )));
                    }
                }
            }

            body.push(
                assembly_var()
                    .member("$types")
                    .assign(Expr::Object(direct))
                    .stmt(),
            );
            body.extend(cached);
            body.extend(self.entry(asm, scope)?);
            output.artifacts.push(Artifact::new(path, artifacts::wrap([body])));
        }

        self.finish(&mut output, &order, false, &IndexMap::new());
        Ok(output)
    }

    /// Traced builds: the bootstrap (assembly fragments, per-type fragments of the
    /// remainder, `initial.js`), then one artifact per on-demand trace.
    fn traced(&self) -> Result<BuildOutput> {
        let program = self.session.program();
        let registry = self.session.registry();
        let bootstrap = Traced::new(registry, Bundle::Bootstrap);

        let mut output = BuildOutput::default();
        output.artifacts.push(artifacts::runtime());
        let mut order = Vec::new();
        let mut initial = Vec::new();

        for asm in program.dependency_order() {
            let scope = self.session.assembly_scope(&asm.name)?;
            let path = assembly_path(asm);
            order.push(path.clone());

            let mut body = self.header(asm, scope)?;
            body.push(
                assembly_var()
                    .member("$types")
                    .assign(Expr::Object(Vec::new()))
                    .stmt(),
            );
            let mut redirects: IndexMap<String, Vec<String>> = IndexMap::new();
            let mut orphans = Vec::new();
            let mut fragments = Vec::new();
            let mut initial_section = Vec::new();

            for ty in asm.used_types() {
                let slot = scope.type_slot(&ty.name)?;
                match bootstrap.place(Definition::Type(&ty.name))? {
                    Placement::Inline => {
                        let definition = self.type_definition(asm, scope, ty, &bootstrap)?;
                        let bind = assembly_var()
                            .member("$types")
                            .member(slot)
                            .assign(definition)
                            .stmt();
                        if self.owner(&ty.name)?.flavor == TraceFlavor::Initial {
                            initial_section.push(bind);
                        } else {
                            let fragment = format!("{}/{slot}.js", file_stem(&asm.name));
                            order.push(fragment.clone());
                            fragments.push(Artifact::new(
                                fragment,
                                artifacts::wrap([vec![assembly_binding(asm), bind]]),
                            ));
                        }
                    }
                    Placement::Redirect(trace) => {
                        redirects.entry(trace).or_default().push(slot.to_owned());
                        for (owner, stmt) in self.orphans(asm, scope, ty, &bootstrap)? {
                            if owner.flavor == TraceFlavor::Initial {
                                initial_section.push(stmt);
                            } else {
                                orphans.push(stmt);
                            }
                        }
                    }
                    Placement::Cache => {
                        return Err(Error::Internal(format!(
                            "`{}` cached in a traced build",
                            ty.name
                        )));
                    }
                }
            }

            let prefix = format!("{}/", asm.name);
            for (trace, slots) in redirects {
                body.push(redirect(assembly_var().member("$types"), &trace, &prefix, slots));
            }
            body.extend(orphans);
            body.extend(self.entry(asm, scope)?);

            output.artifacts.push(Artifact::new(path, artifacts::wrap([body])));
            output.artifacts.extend(fragments);
            if !initial_section.is_empty() {
                let mut section = vec![assembly_binding(asm)];
                section.extend(initial_section);
                initial.push(section);
            }
        }

        let has_initial = !initial.is_empty();
        if has_initial {
            output
                .artifacts
                .push(Artifact::new(INITIAL_PATH, artifacts::wrap(initial)));
        }

        let mut locations = IndexMap::new();
        for trace in registry
            .traces()
            .filter(|t| t.flavor == TraceFlavor::OnDemand)
        {
            let artifact = self.trace_artifact(trace)?;
            locations.insert(trace.name.clone(), artifact.path.clone());
            output.artifacts.push(artifact);
        }

        self.finish(&mut output, &order, has_initial, &locations);
        Ok(output)
    }

    /// Builders for everything one on-demand trace owns.
    fn trace_artifact(&self, trace: &Trace) -> Result<Artifact> {
        let strategy = Traced::new(self.session.registry(), Bundle::Trace(trace.id));
        let mut sections = Vec::new();

        for asm in self.session.program().dependency_order() {
            let scope = self.session.assembly_scope(&asm.name)?;
            let mut section = Vec::new();

            for ty in asm.used_types() {
                if strategy.place(Definition::Type(&ty.name))? != Placement::Inline {
                    section.extend(
                        self.orphans(asm, scope, ty, &strategy)?
                            .into_iter()
                            .map(|(_, stmt)| stmt),
                    );
                    continue;
                }
                let key = format!("{}/{}", asm.name, scope.type_slot(&ty.name)?);
                let definition = self.type_definition(asm, scope, ty, &strategy)?;
                section.push(builder(&trace.name, key, vec![Stmt::Return(Some(definition))]));
            }

            if !section.is_empty() {
                section.insert(0, assembly_binding(asm));
                sections.push(section);
            }
        }

        log::debug!("trace `{}`: {} assembly section(s)", trace.name, sections.len());
        Ok(Artifact::new(
            artifact_path(&trace.name),
            artifacts::wrap(sections),
        ))
    }

    fn finish(
        &self,
        output: &mut BuildOutput,
        order: &[String],
        has_initial: bool,
        locations: &IndexMap<String, String>,
    ) {
        let options = self.session.options();
        let entry_assembly = self
            .session
            .program()
            .entry_point()
            .map(|e| e.assembly.as_str());
        output
            .artifacts
            .push(artifacts::startup(entry_assembly, locations, options.is_debug()));
        output
            .artifacts
            .push(artifacts::load_order(order, has_initial));
    }

    fn owner(&self, name: &QualifiedName) -> Result<&Trace> {
        self.session
            .registry()
            .assignment_of(name)
            .ok_or_else(|| Error::Internal(format!("`{name}` is not assigned to any trace")))
    }

    /// `$a`, intrinsics and referenced-assembly builders.
    fn header(&self, asm: &Assembly, scope: &AssemblyScope) -> Result<Vec<Stmt>> {
        let mut stmts = vec![assembly_binding(asm)];

        if asm.defines_metadata {
            for intrinsic in Intrinsic::ALL {
                let value = runtime()
                    .member("intrinsic")
                    .call(vec![Expr::str(intrinsic.runtime_name())]);
                stmts.push(
                    assembly_var()
                        .member(scope.intrinsic_slot(intrinsic)?)
                        .assign(value)
                        .stmt(),
                );
            }
        }

        let mut refs = Vec::new();
        for reference in self.session.program().transitive_references(&asm.name) {
            let load = runtime()
                .member("assembly")
                .call(vec![Expr::str(reference)]);
            refs.push((scope.reference_slot(reference)?.to_owned(), Expr::thunk(load)));
        }
        stmts.push(assembly_var().member("$refs").assign(Expr::Object(refs)).stmt());
        Ok(stmts)
    }

    /// `$a.$entry`, in the assembly defining the entry point.
    fn entry(&self, asm: &Assembly, scope: &AssemblyScope) -> Result<Option<Stmt>> {
        let program = self.session.program();
        let Some(entry) = program.entry_point() else {
            return Ok(None);
        };
        if entry.assembly != asm.name {
            return Ok(None);
        }

        let (Some(ty), Some(method)) = (entry.declaring_type(), program.method(entry)) else {
            return Err(Error::Internal(format!("entry point `{entry}` vanished")));
        };
        let slot = self.session.type_scope(&ty)?.method_slot(method)?;
        let call = self
            .type_ref(scope, &ty)?
            .call(vec![])
            .member(slot)
            .call(vec![]);
        Ok(Some(
            assembly_var()
                .member("$entry")
                .assign(Expr::thunk(call))
                .stmt(),
        ))
    }

    /// Builder expression of `ty` as seen from `from`.
    fn type_ref(&self, from: &AssemblyScope, ty: &QualifiedName) -> Result<Expr> {
        if ty.assembly == from.assembly() {
            return Ok(assembly_var().member("$types").member(from.type_slot(ty)?));
        }
        let reference = from.reference_slot(&ty.assembly)?;
        let target = self.session.assembly_scope(&ty.assembly)?;
        Ok(assembly_var()
            .member("$refs")
            .member(reference)
            .call(vec![])
            .member("$types")
            .member(target.type_slot(ty)?))
    }

    /// `$.type($a, slot, name, base, function (t) { ... })`
    fn type_definition(
        &self,
        asm: &Assembly,
        scope: &AssemblyScope,
        ty: &TypeDef,
        strategy: &dyn PlacementStrategy,
    ) -> Result<Expr> {
        let slot = scope.type_slot(&ty.name)?;
        let base = match &ty.base {
            Some(base) => Expr::thunk(self.type_ref(scope, base)?.call(vec![])),
            None if asm.defines_metadata && !ty.is_interface => {
                assembly_var().member(scope.intrinsic_slot(Intrinsic::Object)?)
            }
            None => Expr::Null,
        };

        let key = format!("{}/{slot}/", asm.name);
        let init = self.type_init(ty, &key, strategy)?;
        Ok(runtime().member("type").call(vec![
            assembly_var(),
            Expr::str(slot),
            Expr::str(ty.reflection_name()),
            base,
            Expr::function(&["t"], init),
        ]))
    }

    fn type_init(
        &self,
        ty: &TypeDef,
        key_prefix: &str,
        strategy: &dyn PlacementStrategy,
    ) -> Result<Vec<Stmt>> {
        let scope = self.session.type_scope(&ty.name)?;
        let target = |is_static: bool| {
            if is_static {
                this_type()
            } else {
                this_type().member("prototype")
            }
        };
        let mut body = Vec::new();

        if scope.has_literals() {
            let table = Expr::object(scope.literals().map(|(value, slot)| (slot, Expr::str(value))));
            body.push(this_type().member("$s").assign(table).stmt());
        }

        if self.session.options().is_debug() {
            body.push(self.names(ty, scope)?);
        }

        for member in ty.used_members() {
            let slot = scope.member_slot(&member.name)?;
            body.push(target(member.is_static).member(slot).assign(Expr::Null).stmt());
        }

        let mut redirects: IndexMap<(bool, String), Vec<String>> = IndexMap::new();
        let mut exports = Vec::new();
        for method in self.emitted_methods(ty) {
            let slot = scope.method_slot(method)?;
            match strategy.place(Definition::Method(&method.name))? {
                Placement::Inline => body.push(
                    target(method.is_static)
                        .member(slot)
                        .assign(self.method_function(scope, method))
                        .stmt(),
                ),
                Placement::Cache => body.push(
                    runtime()
                        .member("lazy")
                        .call(vec![
                            target(method.is_static),
                            Expr::str(slot),
                            Expr::thunk(self.method_function(scope, method)),
                        ])
                        .stmt(),
                ),
                Placement::Redirect(trace) => redirects
                    .entry((method.is_static, trace))
                    .or_default()
                    .push(slot.to_owned()),
            }

            if let Some(name) = attributes::export_name(method) {
                let value = target(method.is_static).member(slot);
                exports.push(
                    runtime()
                        .member("export")
                        .call(vec![Expr::str(name), value])
                        .stmt(),
                );
            }
        }

        for ((is_static, trace), slots) in redirects {
            body.push(redirect(target(is_static), &trace, key_prefix, slots));
        }
        body.extend(exports);
        Ok(body)
    }

    /// Debug-only table from slot back to source name.
    fn names(&self, ty: &TypeDef, scope: &TypeScope) -> Result<Stmt> {
        let mut names = Vec::new();
        for member in ty.used_members() {
            let slot = scope.member_slot(&member.name)?;
            names.push((slot.to_owned(), Expr::str(member.short_name.as_str())));
        }
        for method in self.emitted_methods(ty) {
            let slot = scope.method_slot(method)?;
            names.push((slot.to_owned(), Expr::str(method.signature())));
        }
        Ok(this_type().member("$names").assign(Expr::Object(names)).stmt())
    }

    /// Builders for methods owned by the current bundle whose type lives elsewhere.
    fn orphans(
        &self,
        asm: &Assembly,
        scope: &AssemblyScope,
        ty: &TypeDef,
        strategy: &dyn PlacementStrategy,
    ) -> Result<Vec<(&Trace, Stmt)>> {
        let type_scope = self.session.type_scope(&ty.name)?;
        let type_slot = scope.type_slot(&ty.name)?;
        let mut out = Vec::new();

        for method in self.emitted_methods(ty) {
            if strategy.place(Definition::Method(&method.name))? != Placement::Inline {
                continue;
            }
            let owner = self.owner(&method.name)?;
            let key = format!(
                "{}/{type_slot}/{}",
                asm.name,
                type_scope.method_slot(method)?
            );
            let body = vec![
                Stmt::var("t", self.type_ref(scope, &ty.name)?.call(vec![])),
                Stmt::Return(Some(self.method_function(type_scope, method))),
            ];
            out.push((owner, builder(&owner.name, key, body)));
        }
        Ok(out)
    }

    /// Used methods with a slot and something to bind: inlined and abstract ones are skipped.
    fn emitted_methods<'t>(&self, ty: &'t TypeDef) -> impl Iterator<Item = &'t MethodDef> {
        let session = self.session;
        ty.used_methods().filter(move |m| {
            !session.is_inlined(&m.name)
                && (m.body.is_some() || m.flags.is_extern || attributes::import_of(m).is_some())
        })
    }

    fn method_function(&self, scope: &TypeScope, method: &MethodDef) -> Expr {
        let params = (0..method.params).map(|i| format!("a{i}")).collect();
        let mut body = Vec::new();

        let import = attributes::import_of(method).or_else(|| {
            method
                .flags
                .is_extern
                .then(|| ("global".to_owned(), method.short_name.clone()))
        });

        if let Some((module, name)) = import {
            let forward = runtime()
                .member("import")
                .call(vec![Expr::str(module), Expr::str(name)])
                .member("apply")
                .call(vec![Expr::ident("this"), Expr::ident("arguments")]);
            body.push(Stmt::Return(Some(forward)));
        } else if let Some(code) = &method.body {
            if !code.strings.is_empty() {
                let strings = code
                    .strings
                    .iter()
                    .map(|value| match scope.literal_slot(value) {
                        Some(slot) => this_type().member("$s").member(slot),
                        None => Expr::str(value.as_str()),
                    })
                    .collect();
                body.push(Stmt::var("$S", Expr::Array(strings)));
            }
            if !code.script.trim().is_empty() {
                body.push(Stmt::Raw(code.script.clone()));
            }
        }

        Expr::Function(Box::new(Function {
            name: None,
            params,
            body,
        }))
    }

    fn units(&self) -> Result<Vec<UnitReport>> {
        let program = self.session.program();
        let options = self.session.options();
        let traced = options.get_mode() == CompileMode::Traced;
        let fingerprints = fingerprints(program, options);
        let mut units = Vec::new();

        for asm in program.assemblies() {
            let scope = self.session.assembly_scope(&asm.name)?;
            let mut types = Vec::new();
            let mut traces = IndexSet::new();

            if traced {
                traces.insert(self.owner(&asm.qualified_name())?.name.clone());
            }
            for ty in asm.used_types() {
                let trace = if traced {
                    let owner = self.owner(&ty.name)?.name.clone();
                    traces.insert(owner.clone());
                    for method in self.emitted_methods(ty) {
                        traces.insert(self.owner(&method.name)?.name.clone());
                    }
                    Some(owner)
                } else {
                    None
                };
                types.push(TypeReport {
                    name: ty.reflection_name().to_owned(),
                    slot: scope.type_slot(&ty.name)?.to_owned(),
                    trace,
                });
            }

            let inlined = self
                .session
                .inlined()
                .filter(|m| m.assembly == asm.name)
                .map(ToString::to_string)
                .collect();

            units.push(UnitReport {
                assembly: asm.name.clone(),
                fingerprint: fingerprints.get(&asm.name).copied().unwrap_or_default(),
                artifact: assembly_path(asm),
                types,
                traces: traces.into_iter().collect(),
                inlined,
            });
        }
        Ok(units)
    }
}

fn assembly_binding(asm: &Assembly) -> Stmt {
    Stmt::var(
        "$a",
        runtime()
            .member("assembly")
            .call(vec![Expr::str(asm.name.as_str())]),
    )
}

/// `$.redirect(target, trace, prefix, [slots])`, one call per target bundle.
fn redirect(target: Expr, trace: &str, prefix: &str, slots: Vec<String>) -> Stmt {
    runtime()
        .member("redirect")
        .call(vec![target, Expr::str(trace), Expr::str(prefix), slot_list(slots)])
        .stmt()
}

/// `$.builder(trace, key, function () { ... })`
fn builder(trace: &str, key: String, body: Vec<Stmt>) -> Stmt {
    runtime()
        .member("builder")
        .call(vec![Expr::str(trace), Expr::Str(key), Expr::function(&[], body)])
        .stmt()
}
