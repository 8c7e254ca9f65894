use std::collections::HashMap;

use strata_core::QualifiedName;

use super::gate::{CallGraph, Rejection, check};
use crate::attributes;

/// Outcome of analyzing one method.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Rejected(Rejection),
    /// Own weight plus the folded cost of every inlinable callee.
    Cost(u32),
}

#[derive(Clone, Copy, Debug)]
enum Entry {
    /// On the current analysis stack.
    Computing,
    Done(Decision),
}

/// Memoized per-method inlining analysis.
///
/// Results are cached for the lifetime of the analyzer and never evicted.
#[derive(Clone, Debug)]
pub struct InlineAnalyzer {
    threshold: u32,
    enabled: bool,
    entries: HashMap<QualifiedName, Entry>,
}

impl InlineAnalyzer {
    pub fn new(threshold: u32, enabled: bool) -> Self {
        Self {
            threshold,
            enabled,
            entries: HashMap::new(),
        }
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Whether every call to `name` can be replaced by its body.
    pub fn is_inlinable<G: CallGraph + ?Sized>(&mut self, graph: &G, name: &QualifiedName) -> bool {
        match self.decide(graph, name) {
            Decision::Cost(cost) => self.admits(graph, name, cost),
            Decision::Rejected(_) => false,
        }
    }

    /// Cost of a method that passes the structural gate.
    pub fn cost_of<G: CallGraph + ?Sized>(&mut self, graph: &G, name: &QualifiedName) -> Option<u32> {
        match self.decide(graph, name) {
            Decision::Cost(cost) => Some(cost),
            Decision::Rejected(_) => None,
        }
    }

    pub fn decide<G: CallGraph + ?Sized>(&mut self, graph: &G, name: &QualifiedName) -> Decision {
        match self.entries.get(name) {
            Some(Entry::Done(decision)) => return *decision,
            // Only reachable through a direct query made while `name` is in flight.
            Some(Entry::Computing) => return Decision::Rejected(Rejection::MutualRecursion),
            None => {}
        }

        let method = match check(graph, name) {
            Ok(method) => method,
            Err(rejection) => return self.finish(name, Decision::Rejected(rejection)),
        };

        self.entries.insert(name.clone(), Entry::Computing);
        let mut cost = graph.weight(method);
        for callee in graph.callees(method) {
            if matches!(self.entries.get(callee), Some(Entry::Computing)) {
                log::debug!("{name} closes a call cycle through {callee}");
                return self.finish(name, Decision::Rejected(Rejection::MutualRecursion));
            }
            if let Decision::Cost(callee_cost) = self.decide(graph, callee)
                && self.admits(graph, callee, callee_cost)
            {
                cost = cost.saturating_add(callee_cost.saturating_sub(1));
            }
        }

        self.finish(name, Decision::Cost(cost))
    }

    /// Size check, bypassed by `ForceInline`.
    fn admits<G: CallGraph + ?Sized>(&self, graph: &G, name: &QualifiedName, cost: u32) -> bool {
        if !self.enabled {
            return false;
        }
        cost <= self.threshold
            || graph
                .method(name)
                .is_some_and(|m| attributes::has(m, &attributes::FORCE_INLINE))
    }

    fn finish(&mut self, name: &QualifiedName, decision: Decision) -> Decision {
        log::trace!("inline {name}: {decision:?}");
        self.entries.insert(name.clone(), Entry::Done(decision));
        decision
    }
}
