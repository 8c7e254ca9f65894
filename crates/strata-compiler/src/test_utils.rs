//! In-memory program builders for tests.

use strata_core::{
    Attribute, MethodBody, MethodFlag, Program, QualifiedName, RawAssembly, RawMember, RawMethod,
    RawProgram, RawType, RawTypeRef,
};

#[derive(Default)]
pub struct ProgramBuilder {
    raw: RawProgram,
}

pub struct AssemblyBuilder {
    raw: RawAssembly,
}

pub struct TypeBuilder {
    raw: RawType,
}

pub struct MethodBuilder {
    raw: RawMethod,
}

impl ProgramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assembly(mut self, name: &str, f: impl FnOnce(AssemblyBuilder) -> AssemblyBuilder) -> Self {
        let builder = AssemblyBuilder {
            raw: RawAssembly {
                name: name.into(),
                ..Default::default()
            },
        };
        self.raw.assemblies.push(f(builder).raw);
        self
    }

    pub fn entry(mut self, assembly: &str, ty: &str, signature: &str) -> Self {
        self.raw.entry_point = Some(QualifiedName::of_member(assembly, ty, signature));
        self
    }

    pub fn build(self) -> Program {
        Program::from_raw(self.raw).expect("test program is valid")
    }
}

impl AssemblyBuilder {
    pub fn reference(mut self, name: &str) -> Self {
        self.raw.references.push(name.into());
        self
    }

    pub fn defines_metadata(mut self) -> Self {
        self.raw.defines_metadata = true;
        self
    }

    pub fn ty(mut self, name: &str, f: impl FnOnce(TypeBuilder) -> TypeBuilder) -> Self {
        let builder = TypeBuilder {
            raw: RawType {
                name: name.into(),
                used: true,
                ..Default::default()
            },
        };
        self.raw.types.push(f(builder).raw);
        self
    }
}

fn member(name: &str, is_static: bool) -> RawMember {
    RawMember {
        name: name.into(),
        is_static,
        used: true,
    }
}

impl TypeBuilder {
    pub fn base(mut self, assembly: &str, ty: &str) -> Self {
        self.raw.base = Some(RawTypeRef {
            assembly: assembly.into(),
            type_name: ty.into(),
        });
        self
    }

    pub fn interface(mut self) -> Self {
        self.raw.interface = true;
        self
    }

    pub fn generic(mut self, arity: u32) -> Self {
        self.raw.generic_arity = arity;
        self
    }

    pub fn unused(mut self) -> Self {
        self.raw.used = false;
        self
    }

    pub fn field(mut self, name: &str) -> Self {
        self.raw.fields.push(member(name, false));
        self
    }

    pub fn static_field(mut self, name: &str) -> Self {
        self.raw.fields.push(member(name, true));
        self
    }

    pub fn event(mut self, name: &str) -> Self {
        self.raw.events.push(member(name, false));
        self
    }

    pub fn property(mut self, name: &str) -> Self {
        self.raw.properties.push(member(name, false));
        self
    }

    pub fn method(mut self, signature: &str, f: impl FnOnce(MethodBuilder) -> MethodBuilder) -> Self {
        let builder = MethodBuilder {
            raw: RawMethod {
                signature: signature.into(),
                name: short_name(signature).into(),
                used: true,
                ..Default::default()
            },
        };
        self.raw.methods.push(f(builder).raw);
        self
    }
}

/// `Int32 Add(Int32, Int32)` → `Add`
fn short_name(signature: &str) -> &str {
    let head = signature.split('(').next().unwrap_or(signature);
    head.rsplit(' ').next().unwrap_or(head)
}

impl MethodBuilder {
    pub fn is_static(mut self) -> Self {
        self.raw.is_static = true;
        self
    }

    pub fn flag(mut self, flag: MethodFlag) -> Self {
        self.raw.flags.push(flag);
        self
    }

    pub fn params(mut self, count: u32) -> Self {
        self.raw.params = count;
        self
    }

    pub fn unused(mut self) -> Self {
        self.raw.used = false;
        self
    }

    pub fn overrides(mut self, assembly: &str, ty: &str, signature: &str) -> Self {
        self.raw.overrides = Some(QualifiedName::of_member(assembly, ty, signature));
        self
    }

    pub fn attr(mut self, name: &str, args: &[&str]) -> Self {
        self.raw.attributes.push(Attribute {
            name: name.into(),
            args: args.iter().map(|a| (*a).to_owned()).collect(),
            named: Default::default(),
        });
        self
    }

    pub fn attr_named(mut self, name: &str, named: &[(&str, &str)]) -> Self {
        self.raw.attributes.push(Attribute {
            name: name.into(),
            args: Vec::new(),
            named: named
                .iter()
                .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                .collect(),
        });
        self
    }

    fn body(&mut self) -> &mut MethodBody {
        self.raw.body.get_or_insert_with(MethodBody::default)
    }

    pub fn weight(mut self, weight: u32) -> Self {
        self.body().weight = weight;
        self
    }

    pub fn calls(mut self, assembly: &str, ty: &str, signature: &str) -> Self {
        self.body()
            .calls
            .push(QualifiedName::of_member(assembly, ty, signature));
        self
    }

    pub fn returns(mut self, source: u32, target: u32) -> Self {
        let body = self.body();
        body.source_returns = source;
        body.target_returns = target;
        self
    }

    pub fn string(mut self, value: &str) -> Self {
        self.body().strings.push(value.into());
        self
    }

    pub fn script(mut self, text: &str) -> Self {
        self.body().script = text.into();
        self
    }
}

/// Qualified method name shorthand.
pub fn method(assembly: &str, ty: &str, signature: &str) -> QualifiedName {
    QualifiedName::of_member(assembly, ty, signature)
}
