use std::collections::HashSet;

use indexmap::IndexMap;
use strata_core::{Assembly, MethodDef, Program, QualifiedName, TypeDef};

use super::{Intrinsic, SlotAllocator, SlotKey, SlotStyle, UnregisteredSlot};

/// Slots of one assembly: its used types and every transitively referenced assembly.
#[derive(Clone, Debug)]
pub struct AssemblyScope {
    assembly: String,
    slots: SlotAllocator,
}

impl AssemblyScope {
    pub fn build(
        program: &Program,
        assembly: &Assembly,
        style: SlotStyle,
        friendly_len: Option<usize>,
    ) -> Self {
        let mut slots = SlotAllocator::new(style, friendly_len);

        if assembly.defines_metadata {
            for intrinsic in Intrinsic::ALL {
                slots.reserve(SlotKey::Intrinsic(intrinsic), intrinsic.slot());
            }
        }

        for ty in assembly.used_types() {
            slots.register(SlotKey::Type(ty.name.clone()), ty.reflection_name());
        }

        for reference in program.transitive_references(&assembly.name) {
            slots.register(SlotKey::AssemblyRef(reference.to_owned()), reference);
        }

        log::debug!(
            "assembly scope [{}]: {} slot(s)",
            assembly.name,
            slots.len()
        );

        Self {
            assembly: assembly.name.clone(),
            slots,
        }
    }

    pub fn assembly(&self) -> &str {
        &self.assembly
    }

    pub fn type_slot(&self, ty: &QualifiedName) -> Result<&str, UnregisteredSlot> {
        self.slots.resolve(&SlotKey::Type(ty.clone()))
    }

    pub fn reference_slot(&self, assembly: &str) -> Result<&str, UnregisteredSlot> {
        self.slots
            .resolve(&SlotKey::AssemblyRef(assembly.to_owned()))
    }

    pub fn intrinsic_slot(&self, intrinsic: Intrinsic) -> Result<&str, UnregisteredSlot> {
        self.slots.resolve(&SlotKey::Intrinsic(intrinsic))
    }

    pub fn slots(&self) -> &SlotAllocator {
        &self.slots
    }
}

/// Slots of one type: inherited and own members, plus promoted literals.
#[derive(Clone, Debug)]
pub struct TypeScope {
    ty: QualifiedName,
    members: SlotAllocator,
    /// Created on first promotion only.
    literals: Option<SlotAllocator>,
    friendly_len: Option<usize>,
}

impl TypeScope {
    /// Register ancestor members root first, then the type's own.
    ///
    /// `emitted` selects methods that are emitted as standalone units; the others
    /// (inlined everywhere) never get a slot.
    pub fn build(
        program: &Program,
        ty: &TypeDef,
        style: SlotStyle,
        friendly_len: Option<usize>,
        emitted: impl Fn(&MethodDef) -> bool,
    ) -> Self {
        let mut members = SlotAllocator::new(style, friendly_len);
        for owner in program.ancestors(ty).into_iter().chain(std::iter::once(ty)) {
            for member in owner.used_members() {
                members.register(SlotKey::Member(member.name.clone()), &member.short_name);
            }
            for method in owner.used_methods().filter(|&m| emitted(m)) {
                members.register(
                    SlotKey::Member(method.slot_identity().clone()),
                    &method.short_name,
                );
            }
        }

        let mut scope = Self {
            ty: ty.name.clone(),
            members,
            literals: None,
            friendly_len,
        };

        for value in shared_literals(ty, &emitted) {
            scope.promote_literal(&value);
        }

        log::debug!(
            "type scope {}: {} member slot(s), {} literal slot(s)",
            scope.ty,
            scope.members.len(),
            scope.literals.as_ref().map_or(0, SlotAllocator::len)
        );
        scope
    }

    pub fn type_name(&self) -> &QualifiedName {
        &self.ty
    }

    pub fn member_slot(&self, name: &QualifiedName) -> Result<&str, UnregisteredSlot> {
        self.members.resolve(&SlotKey::Member(name.clone()))
    }

    /// Slot of a method, shared with the method it overrides.
    pub fn method_slot(&self, method: &MethodDef) -> Result<&str, UnregisteredSlot> {
        self.member_slot(method.slot_identity())
    }

    pub fn members(&self) -> &SlotAllocator {
        &self.members
    }

    /// Move a literal into type scope, creating the literal allocator on first use.
    pub fn promote_literal(&mut self, value: &str) -> &str {
        let friendly_len = self.friendly_len;
        let literals = self
            .literals
            .get_or_insert_with(|| SlotAllocator::new(SlotStyle::CaseSensitive, friendly_len));
        literals.register(SlotKey::Literal(value.to_owned()), value)
    }

    pub fn literal_slot(&self, value: &str) -> Option<&str> {
        let literals = self.literals.as_ref()?;
        literals.resolve(&SlotKey::Literal(value.to_owned())).ok()
    }

    pub fn has_literals(&self) -> bool {
        self.literals.is_some()
    }

    /// `(value, slot)` for every promoted literal, in promotion order.
    pub fn literals(&self) -> impl Iterator<Item = (&str, &str)> {
        self.literals
            .iter()
            .flat_map(SlotAllocator::iter)
            .filter_map(|(key, slot)| match key {
                SlotKey::Literal(value) => Some((value.as_str(), slot)),
                _ => None,
            })
    }
}

/// Literals referenced by two or more emitted methods of `ty`, in first-use order.
fn shared_literals(ty: &TypeDef, emitted: &impl Fn(&MethodDef) -> bool) -> Vec<String> {
    let mut users: IndexMap<&str, usize> = IndexMap::new();
    for method in ty.used_methods().filter(|&m| emitted(m)) {
        let Some(body) = &method.body else {
            continue;
        };
        let mut seen = HashSet::new();
        for value in &body.strings {
            if seen.insert(value.as_str()) {
                *users.entry(value.as_str()).or_insert(0) += 1;
            }
        }
    }

    users
        .into_iter()
        .filter(|&(_, count)| count >= 2)
        .map(|(value, _)| value.to_owned())
        .collect()
}
