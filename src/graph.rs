//! Cache topics and the declarative graph of which topics derive from which.
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

/// A named cache partition, one per entity family or derived view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    Accounts,
    AccountForecast,
    Banks,
    Budgets,
    CalculationRules,
    Calculator,
    Contributions,
    ContributionRules,
    DescriptionHistory,
    ErrorLevels,
    ExpenseGraph,
    LogEntries,
    Messages,
    Notes,
    Options,
    PayGraph,
    Payees,
    Reminders,
    RetirementForecast,
    TagGraph,
    TagTransactions,
    TagTypes,
    Tags,
    TransactionStatuses,
    TransactionTypes,
    Transactions,
    Version,
}

impl Topic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::Accounts => "accounts",
            Topic::AccountForecast => "account_forecast",
            Topic::Banks => "banks",
            Topic::Budgets => "budgets",
            Topic::CalculationRules => "calculation_rules",
            Topic::Calculator => "calculator",
            Topic::Contributions => "contributions",
            Topic::ContributionRules => "contribution_rules",
            Topic::DescriptionHistory => "description_history",
            Topic::ErrorLevels => "error_levels",
            Topic::ExpenseGraph => "expense_graph",
            Topic::LogEntries => "log_entries",
            Topic::Messages => "messages",
            Topic::Notes => "notes",
            Topic::Options => "options",
            Topic::PayGraph => "pay_graph",
            Topic::Payees => "payees",
            Topic::Reminders => "reminders",
            Topic::RetirementForecast => "retirement_forecast",
            Topic::TagGraph => "tag_graph",
            Topic::TagTransactions => "tag_transactions",
            Topic::TagTypes => "tag_types",
            Topic::Tags => "tags",
            Topic::TransactionStatuses => "transaction_statuses",
            Topic::TransactionTypes => "transaction_types",
            Topic::Transactions => "transactions",
            Topic::Version => "version",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Edges `topic -> topics derived from it`. A write declares only its root
/// topic; everything reachable from the root goes stale with it.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    edges: HashMap<Topic, Vec<Topic>>,
}

impl Default for DependencyGraph {
    fn default() -> Self {
        use Topic::*;
        let mut graph = Self::empty();
        graph.add_dependents(
            Transactions,
            &[Accounts, AccountForecast, TagGraph, TagTransactions, DescriptionHistory],
        );
        graph.add_dependents(
            Accounts,
            &[Transactions, AccountForecast, TagGraph, RetirementForecast],
        );
        // Forecast rows are generated from reminders.
        graph.add_dependents(Reminders, &[Transactions]);
        graph.add_dependents(Options, &[TagGraph]);
        graph.add_dependents(Tags, &[TagGraph, TagTransactions]);
        graph.add_dependents(CalculationRules, &[Calculator]);
        graph.add_dependents(ContributionRules, &[Contributions]);
        graph
    }
}

impl DependencyGraph {
    pub fn empty() -> Self {
        Self {
            edges: HashMap::new(),
        }
    }

    pub fn add_dependents(&mut self, topic: Topic, dependents: &[Topic]) {
        let entry = self.edges.entry(topic).or_default();
        for dep in dependents {
            if *dep != topic && !entry.contains(dep) {
                entry.push(*dep);
            }
        }
    }

    /// Merge configured edges into this graph.
    pub fn extend(&mut self, overrides: &HashMap<Topic, Vec<Topic>>) {
        for (topic, deps) in overrides {
            self.add_dependents(*topic, deps);
        }
    }

    pub fn dependents(&self, topic: Topic) -> &[Topic] {
        self.edges.get(&topic).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every topic that must go stale after a write on `root`, root first.
    pub fn invalidation_set(&self, root: Topic) -> Vec<Topic> {
        let mut seen = HashSet::from([root]);
        let mut order = vec![root];
        let mut queue = VecDeque::from([root]);
        while let Some(topic) = queue.pop_front() {
            for dep in self.dependents(topic) {
                if seen.insert(*dep) {
                    order.push(*dep);
                    queue.push_back(*dep);
                }
            }
        }
        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_topic_invalidates_only_itself() {
        let graph = DependencyGraph::default();
        assert_eq!(graph.invalidation_set(Topic::Budgets), vec![Topic::Budgets]);
        assert_eq!(graph.invalidation_set(Topic::Notes), vec![Topic::Notes]);
    }

    #[test]
    fn account_writes_reach_forecasts_and_graphs() {
        let set = DependencyGraph::default().invalidation_set(Topic::Accounts);
        assert_eq!(set[0], Topic::Accounts);
        for topic in [
            Topic::Transactions,
            Topic::AccountForecast,
            Topic::TagGraph,
            Topic::RetirementForecast,
        ] {
            assert!(set.contains(&topic), "missing {topic}");
        }
    }

    #[test]
    fn walk_is_transitive_and_cycle_safe() {
        let set = DependencyGraph::default().invalidation_set(Topic::Reminders);
        for topic in [
            Topic::Reminders,
            Topic::Transactions,
            Topic::Accounts,
            Topic::AccountForecast,
            Topic::TagGraph,
        ] {
            assert!(set.contains(&topic), "missing {topic}");
        }
        let unique: HashSet<_> = set.iter().collect();
        assert_eq!(unique.len(), set.len());
    }

    #[test]
    fn overrides_add_edges() {
        let mut graph = DependencyGraph::default();
        graph.extend(&HashMap::from([(
            Topic::Budgets,
            vec![Topic::ExpenseGraph, Topic::Budgets],
        )]));
        assert_eq!(graph.dependents(Topic::Budgets), &[Topic::ExpenseGraph]);
        assert_eq!(
            graph.invalidation_set(Topic::Budgets),
            vec![Topic::Budgets, Topic::ExpenseGraph]
        );
    }

    #[test]
    fn names_match_serde() {
        let json = serde_json::to_string(&Topic::AccountForecast).unwrap();
        assert_eq!(json, format!("\"{}\"", Topic::AccountForecast.as_str()));
        let back: Topic = serde_json::from_str("\"tag_graph\"").unwrap();
        assert_eq!(back, Topic::TagGraph);
    }
}
