//! Directive index built from entity attribute schemas.
//!
//! Each script-structure level (play, role, block, task) declares the
//! attributes it accepts. The index maps every public attribute name to the
//! levels declaring it, then a short override table is applied on top.

use ansible_data_shared::DirectiveIndex;
use tracing::{debug, info, instrument};

/// Directive binding a task to a module.
pub const ACTION_DIRECTIVE: &str = "action";

/// Alias of [`ACTION_DIRECTIVE`] that runs the module on the controller.
pub const LOCAL_ACTION_DIRECTIVE: &str = "local_action";

/// Prefix of the `with_<lookup>` looping keywords.
pub const LOOP_PREFIX_DIRECTIVE: &str = "with_";

// ---------------------------------------------------------------------------
// Schema types
// ---------------------------------------------------------------------------

/// One declared attribute of an entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeSpec {
    pub name: &'static str,
    /// Internal attribute, not usable as a directive.
    pub private: bool,
}

const fn public(name: &'static str) -> AttributeSpec {
    AttributeSpec {
        name,
        private: false,
    }
}

const fn private(name: &'static str) -> AttributeSpec {
    AttributeSpec {
        name,
        private: true,
    }
}

/// A script-structure level and the attribute groups it is built from.
#[derive(Debug, Clone, Copy)]
pub struct EntityKind {
    pub name: &'static str,
    pub groups: &'static [&'static [AttributeSpec]],
}

impl EntityKind {
    /// Declared attributes in group order. Names repeated across groups repeat here.
    pub fn attributes(&self) -> impl Iterator<Item = &'static AttributeSpec> {
        self.groups.iter().flat_map(|group| group.iter())
    }
}

/// Replaces the bucket for `key` once aggregation is done.
#[derive(Debug, Clone, Copy)]
pub struct DirectiveOverride {
    pub key: &'static str,
    pub kinds: &'static [&'static str],
}

// ---------------------------------------------------------------------------
// Attribute groups
// ---------------------------------------------------------------------------

const BASE: &[AttributeSpec] = &[
    public("name"),
    public("connection"),
    public("port"),
    public("remote_user"),
    public("vars"),
    public("environment"),
    public("no_log"),
    public("always_run"),
    public("run_once"),
    public("ignore_errors"),
    public("check_mode"),
    public("diff"),
    public("any_errors_fatal"),
];

const BECOME: &[AttributeSpec] = &[
    public("become"),
    public("become_method"),
    public("become_user"),
    public("become_flags"),
];

const CONDITIONAL: &[AttributeSpec] = &[public("when")];

const TAGGABLE: &[AttributeSpec] = &[public("tags")];

const DELEGATABLE: &[AttributeSpec] = &[public("delegate_to"), public("delegate_facts")];

const PLAY_ATTRIBUTES: &[AttributeSpec] = &[
    public("accelerate"),
    public("accelerate_ipv6"),
    public("accelerate_port"),
    public("fact_path"),
    public("gather_facts"),
    public("gather_subset"),
    public("gather_timeout"),
    public("hosts"),
    public("handlers"),
    public("pre_tasks"),
    public("post_tasks"),
    public("tasks"),
    public("roles"),
    public("vars_files"),
    public("vars_prompt"),
    public("vault_password"),
    public("force_handlers"),
    public("max_fail_percentage"),
    public("serial"),
    public("strategy"),
    public("order"),
];

const BLOCK_ATTRIBUTES: &[AttributeSpec] = &[public("block"), public("rescue"), public("always")];

const TASK_ATTRIBUTES: &[AttributeSpec] = &[
    public("action"),
    public("args"),
    public("async"),
    public("changed_when"),
    public("delay"),
    public("failed_when"),
    private("loop"),
    private("loop_args"),
    public("loop_control"),
    public("notify"),
    public("poll"),
    public("register"),
    public("retries"),
    public("until"),
];

// ---------------------------------------------------------------------------
// Entity kinds
// ---------------------------------------------------------------------------

pub const PLAY: EntityKind = EntityKind {
    name: "Play",
    groups: &[BASE, TAGGABLE, BECOME, PLAY_ATTRIBUTES],
};

pub const ROLE: EntityKind = EntityKind {
    name: "Role",
    groups: &[BASE, BECOME, CONDITIONAL, TAGGABLE, DELEGATABLE],
};

pub const BLOCK: EntityKind = EntityKind {
    name: "Block",
    groups: &[BASE, BECOME, CONDITIONAL, TAGGABLE, BLOCK_ATTRIBUTES, DELEGATABLE],
};

pub const TASK: EntityKind = EntityKind {
    name: "Task",
    groups: &[BASE, CONDITIONAL, TAGGABLE, BECOME, TASK_ATTRIBUTES, DELEGATABLE],
};

/// Entity kinds in processing order.
pub const ENTITY_KINDS: [EntityKind; 4] = [PLAY, ROLE, BLOCK, TASK];

/// Applied after aggregation; each rule replaces its bucket outright.
pub const DIRECTIVE_OVERRIDES: [DirectiveOverride; 1] = [DirectiveOverride {
    key: LOOP_PREFIX_DIRECTIVE,
    kinds: &["Task"],
}];

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Accumulates directive buckets one entity kind at a time.
#[derive(Debug, Default)]
pub struct DirectiveAggregator {
    index: DirectiveIndex,
}

impl DirectiveAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `kind` to the bucket of each of its public attributes.
    pub fn add_kind(&mut self, kind: &EntityKind) {
        for attr in kind.attributes().filter(|attr| !attr.private) {
            self.push(attr.name, kind.name);
            if attr.name == ACTION_DIRECTIVE {
                self.push(LOCAL_ACTION_DIRECTIVE, kind.name);
            }
        }
        debug!(kind = kind.name, directives = self.index.len(), "entity kind aggregated");
    }

    /// Apply `overrides` and return the finished index.
    pub fn finish(mut self, overrides: &[DirectiveOverride]) -> DirectiveIndex {
        for rule in overrides {
            let kinds = rule.kinds.iter().map(|k| k.to_string()).collect();
            if let Some(previous) = self.index.insert(rule.key.to_string(), kinds) {
                debug!(key = rule.key, ?previous, "directive bucket replaced");
            }
        }
        self.index
    }

    fn push(&mut self, directive: &str, kind: &str) {
        self.index
            .entry(directive.to_string())
            .or_default()
            .push(kind.to_string());
    }
}

/// Build the directive index for `kinds`, then apply `overrides`.
#[instrument(skip_all, fields(kinds = kinds.len()))]
pub fn aggregate_directives(kinds: &[EntityKind], overrides: &[DirectiveOverride]) -> DirectiveIndex {
    let mut aggregator = DirectiveAggregator::new();
    for kind in kinds {
        aggregator.add_kind(kind);
    }
    let index = aggregator.finish(overrides);

    info!(directives = index.len(), "directive index built");
    index
}
