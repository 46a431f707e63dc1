//! Per-rule antecedent/consequent encoding
//!
//! A rule without exceptions yields the branch `rN`, plus `rN_otherwise` when it has a
//! default action. The default branch fires on the negated trigger condition.
//!
//! A rule with exceptions `E1..En` yields `rN_primary` and `rN_unless1..rN_unlessn`:
//!
//! ```text
//! primary:   C, not E1, ..., not En
//! unless k:  C, Ek, not E(k+1), ..., not En
//! ```
//!
//! so a later exception overrides an earlier one and at most one branch fires for any
//! valuation of the exception conditions.
//!
//! A branch whose action is negated is not registered at all. Its condition still
//! shapes the cascade: the other branches keep negating it, so when it fires none of
//! them apply and the rule asks for nothing.

use crate::sleec::ast::{Action, Condition, Rule};
use crate::sleec::encoding::asp::{self, Atom, Term, T, T2};
use crate::sleec::encoding::translate::{close, negate, Fragment, Translator};
use tracing::debug;

/// One registered branch of a rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub id: String,
    pub antecedent: String,
    pub consequent: String,
}

impl Branch {
    /// `None` when the action is negated
    fn new(id: String, antecedent: String, action: &Action, within: Option<u64>) -> Option<Self> {
        if action.negated {
            debug!(branch = %id, "skipping branch with a negated action");
            return None;
        }
        Some(Self {
            id,
            antecedent,
            consequent: consequent(action, within),
        })
    }

    fn render(&self, out: &mut Vec<String>) {
        out.push(asp::fact(&Atom::new("exp", vec![Term::Constant(self.id.clone())])));
        out.push(asp::rule(
            &Atom::of_branch("antecedent", &self.id),
            &[self.antecedent.as_str()],
        ));
        out.push(asp::rule(
            &Atom::of_branch("consequent", &self.id),
            &[self.consequent.as_str()],
        ));
    }
}

/// Encoding of one source rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleEncoding {
    pub rule_id: String,
    pub branches: Vec<Branch>,
}

impl RuleEncoding {
    pub fn branch_ids(&self) -> impl Iterator<Item = &str> {
        self.branches.iter().map(|b| b.id.as_str())
    }

    /// The statements for this rule, headed by a comment naming it
    pub fn render(&self, source: &Rule) -> String {
        let mut lines = vec![format!(
            "% {}: {} -> {}",
            source.id, source.condition, source.action
        )];
        for branch in &self.branches {
            branch.render(&mut lines);
        }
        lines.join("\n")
    }
}

pub struct RuleEncoder<'a> {
    translator: &'a Translator<'a>,
}

impl<'a> RuleEncoder<'a> {
    pub fn new(translator: &'a Translator<'a>) -> Self {
        Self { translator }
    }

    pub fn encode(&self, rule: &Rule) -> RuleEncoding {
        let id = asp::normalize(&rule.id);
        let trigger = self.translator.translate(&rule.condition);

        let branches = if rule.exceptions.is_empty() {
            self.plain(&id, rule, &trigger)
        } else {
            self.cascade(&id, rule, &trigger)
        };
        debug!(rule = %rule.id, branches = branches.len(), "encoded rule");

        RuleEncoding {
            rule_id: rule.id.clone(),
            branches,
        }
    }

    fn plain(&self, id: &str, rule: &Rule, trigger: &Fragment) -> Vec<Branch> {
        let primary = Branch::new(
            id.to_string(),
            close(std::slice::from_ref(trigger)),
            &rule.action,
            rule.within,
        );
        let default = rule.otherwise.as_ref().and_then(|default| {
            Branch::new(
                format!("{}_otherwise", id),
                close(&[negate(trigger)]),
                default,
                None,
            )
        });
        primary.into_iter().chain(default).collect()
    }

    fn cascade(&self, id: &str, rule: &Rule, trigger: &Fragment) -> Vec<Branch> {
        let exceptions: Vec<Fragment> = rule
            .exceptions
            .iter()
            .map(|e| self.translate(&e.condition))
            .collect();
        let negated: Vec<Fragment> = exceptions.iter().map(negate).collect();

        let mut primary = vec![trigger.clone()];
        primary.extend(negated.iter().cloned());
        let mut branches: Vec<Branch> = Branch::new(
            format!("{}_primary", id),
            close(&primary),
            &rule.action,
            rule.within,
        )
        .into_iter()
        .collect();

        for (index, exception) in rule.exceptions.iter().enumerate() {
            let mut parts = vec![trigger.clone(), exceptions[index].clone()];
            parts.extend(negated[index + 1..].iter().cloned());
            branches.extend(Branch::new(
                format!("{}_unless{}", id, index + 1),
                close(&parts),
                &exception.action,
                None,
            ));
        }
        branches
    }

    fn translate(&self, condition: &Condition) -> Fragment {
        self.translator.translate(condition)
    }
}

/// The consequent body for a non-negated action
fn consequent(action: &Action, within: Option<u64>) -> String {
    let time = Atom::time(T).to_string();
    match within {
        None => format!("{}, {}", time, Atom::happens(&action.event, false)),
        Some(window) => format!(
            "{}, {}, {T2} >= {T}, {T2} <= {T} + {}, {}",
            time,
            Atom::happens(&action.event, true),
            window,
            Atom::time(T2),
        ),
    }
}
