//! Trigger/action partition of declared events
//!
//! - action events: the non-negated action of some rule branch (primary, default or
//!   exception)
//! - trigger events: used in some rule or exception condition, but never an action
//! - windowed events: the primary action of a rule with a `within` bound; the window
//!   is the largest bound among those rules
//!
//! All names are case-folded. Lists keep declaration order so the output is
//! deterministic.

use crate::sleec::ast::Program;
use crate::sleec::encoding::asp::normalize;
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// How an event's occurrences are represented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timing {
    /// `happens(e, T, T)`
    Instant,
    /// `happens(e, T, T2)` with `T <= T2 <= T + window`
    Window(u64),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPartition {
    declared: Vec<String>,
    triggers: Vec<String>,
    actions: Vec<String>,
    windows: HashMap<String, u64>,
}

impl EventPartition {
    pub fn from_program(program: &Program) -> Self {
        let mut declared: Vec<String> = Vec::new();
        for event in &program.events {
            let name = normalize(&event.name);
            if !declared.contains(&name) {
                declared.push(name);
            }
        }

        let mut action_names = HashSet::new();
        let mut windows: HashMap<String, u64> = HashMap::new();
        let mut condition_names = HashSet::new();

        for rule in &program.rules {
            for action in rule.actions().filter(|a| !a.negated) {
                action_names.insert(normalize(&action.event));
            }
            if let (Some(within), false) = (rule.within, rule.action.negated) {
                let window = windows.entry(normalize(&rule.action.event)).or_insert(0);
                *window = (*window).max(within);
            }
            for condition in rule.conditions() {
                for name in condition.names() {
                    condition_names.insert(normalize(name));
                }
            }
        }

        for name in condition_names.intersection(&action_names) {
            if declared.contains(name) {
                warn!(event = %name, "event is both a condition and an action; it only gets an action choice rule");
            }
        }

        let triggers = declared
            .iter()
            .filter(|name| condition_names.contains(*name) && !action_names.contains(*name))
            .cloned()
            .collect();
        let actions = declared
            .iter()
            .filter(|name| action_names.contains(*name))
            .cloned()
            .collect();
        windows.retain(|name, _| declared.contains(name));

        Self {
            declared,
            triggers,
            actions,
            windows,
        }
    }

    /// Timing of a declared event; `None` for names that are not declared events
    pub fn timing(&self, name: &str) -> Option<Timing> {
        let name = normalize(name);
        if !self.declared.contains(&name) {
            return None;
        }
        Some(match self.windows.get(&name) {
            Some(&window) => Timing::Window(window),
            None => Timing::Instant,
        })
    }

    pub fn declared(&self) -> &[String] {
        &self.declared
    }

    pub fn triggers(&self) -> &[String] {
        &self.triggers
    }

    pub fn actions(&self) -> &[String] {
        &self.actions
    }

    /// Action events that occur at the trigger instant
    pub fn instant_actions(&self) -> impl Iterator<Item = &str> {
        self.actions
            .iter()
            .filter(|name| !self.windows.contains_key(*name))
            .map(String::as_str)
    }

    /// Action events with their window, in declaration order
    pub fn windowed_actions(&self) -> impl Iterator<Item = (&str, u64)> {
        self.actions
            .iter()
            .filter_map(|name| self.windows.get(name).map(|&w| (name.as_str(), w)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sleec::parsing::parse;

    fn partition(rules: &str) -> EventPartition {
        let source = format!(
            "def_start\nevent A\nevent B\nevent C\nevent D\nevent Unused\ndef_end\nrule_start\n{}\nrule_end",
            rules
        );
        EventPartition::from_program(&parse(&source).expect("valid source"))
    }

    #[test]
    fn test_simple_partition() {
        let p = partition("R1 when A then B");
        assert_eq!(p.triggers(), ["a"]);
        assert_eq!(p.actions(), ["b"]);
        assert_eq!(p.timing("A"), Some(Timing::Instant));
        assert_eq!(p.timing("unused"), Some(Timing::Instant));
        assert_eq!(p.timing("ghost"), None);
    }

    #[test]
    fn test_negated_actions_are_not_actions() {
        let p = partition("R1 when A then not B unless (C) then D");
        assert_eq!(p.triggers(), ["a", "c"]);
        assert_eq!(p.actions(), ["d"]);
    }

    #[test]
    fn test_windows_take_the_largest_bound() {
        let p = partition("R1 when A then B within 5 seconds\nR2 when C then B within 8 seconds\nR3 when A then D");
        assert_eq!(p.timing("b"), Some(Timing::Window(8)));
        assert_eq!(p.windowed_actions().collect::<Vec<_>>(), vec![("b", 8)]);
        assert_eq!(p.instant_actions().collect::<Vec<_>>(), vec!["d"]);
    }

    #[test]
    fn test_otherwise_action_is_instant() {
        let p = partition("R1 when A then B within 5 seconds otherwise C");
        assert_eq!(p.timing("c"), Some(Timing::Instant));
        assert_eq!(p.actions(), ["b", "c"]);
    }

    #[test]
    fn test_self_referential_event_is_only_an_action() {
        let p = partition("R1 when A then B\nR2 when B then C");
        assert_eq!(p.triggers(), ["a"]);
        assert_eq!(p.actions(), ["b", "c"]);
    }

    #[test]
    fn test_trigger_and_action_sets_are_disjoint() {
        let p = partition("R1 when A and B then C unless (D) then A");
        for trigger in p.triggers() {
            assert!(!p.actions().contains(trigger));
        }
        assert_eq!(p.triggers(), ["b", "d"]);
    }
}
