//! View state of the dashboard as seen by a client, and the patches a refresh
//! applies to it.
//!
//! Cards are keyed by network and node url, since the same url may be listed
//! under more than one network. A refresh only touches text and status; the
//! expand/collapse choice on an identity survives unless the info block itself
//! is removed and later recreated.

use crate::core::ent::*;

/// Identifies one card on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CardKey {
    pub network: String,
    pub url: String,
}

impl CardKey {
    pub fn new(network: impl Into<String>, url: impl Into<String>) -> CardKey {
        CardKey {
            network: network.into(),
            url: url.into(),
        }
    }

    fn of(node: &NodeStatusSummary) -> CardKey {
        CardKey::new(node.network.clone(), node.url.clone())
    }

    fn matches(&self, network: &str, url: &str) -> bool {
        self.network == network && self.url == url
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityField {
    full: String,
    expanded: bool,
}

impl IdentityField {
    fn collapsed(full: String) -> IdentityField {
        IdentityField { full, expanded: false }
    }

    pub fn full(&self) -> &str {
        &self.full
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// The text currently on screen.
    pub fn text(&self) -> String {
        if self.expanded {
            self.full.clone()
        } else {
            short_identity(&self.full)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoBlock {
    pub version_text: String,
    pub identity: IdentityField,
    toggle_bound: bool,
}

impl InfoBlock {
    fn fresh(version_text: String, identity: String) -> InfoBlock {
        InfoBlock {
            version_text,
            identity: IdentityField::collapsed(identity),
            toggle_bound: false,
        }
    }

    pub fn toggle_bound(&self) -> bool {
        self.toggle_bound
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardView {
    pub name: String,
    pub url: String,
    pub network: String,
    pub state: NodeState,
    pub response_text: String,
    pub info: Option<InfoBlock>,
    copy_bound: bool,
}

impl CardView {
    pub fn copy_bound(&self) -> bool {
        self.copy_bound
    }
}

/// What the dashboard currently shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardView {
    cards: Vec<CardView>,
    last_updated: Option<String>,
}

/// A change to one card, produced by [`diff`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardPatch {
    pub key: CardKey,
    pub change: CardChange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardChange {
    SetState(NodeState),
    SetResponseTime(String),
    /// Refresh the texts of an existing info block, keeping its toggle state.
    UpdateInfo { version_text: String, identity: String },
    /// Build a new, collapsed info block.
    CreateInfo { version_text: String, identity: String },
    RemoveInfo,
}

impl DashboardView {
    /// The view a freshly loaded page presents for `statuses`.
    pub fn from_statuses(statuses: &[NodeStatusSummary]) -> DashboardView {
        let cards = statuses
            .iter()
            .map(|node| CardView {
                name: node.name.clone(),
                url: node.url.clone(),
                network: node.network.clone(),
                state: node.status,
                response_text: response_label(node),
                info: node
                    .status
                    .is_online()
                    .then(|| InfoBlock::fresh(summary_version(node), summary_identity(node))),
                copy_bound: false,
            })
            .collect();
        DashboardView { cards, last_updated: None }
    }

    pub fn cards(&self) -> &[CardView] {
        &self.cards
    }

    pub fn card(&self, network: &str, url: &str) -> Option<&CardView> {
        self.cards.iter().find(|card| card.network == network && card.url == url)
    }

    fn card_mut(&mut self, key: &CardKey) -> Option<&mut CardView> {
        self.cards
            .iter_mut()
            .find(|card| key.matches(&card.network, &card.url))
    }

    pub fn last_updated(&self) -> Option<&str> {
        self.last_updated.as_deref()
    }

    pub fn set_last_updated(&mut self, when: String) {
        self.last_updated = Some(when);
    }

    /// Flips the identity of a card between short and full form. Returns the
    /// new expanded state, or `None` if there is nothing to toggle.
    pub fn toggle_identity(&mut self, network: &str, url: &str) -> Option<bool> {
        let info = self.card_mut(&CardKey::new(network, url))?.info.as_mut()?;
        info.identity.expanded = !info.identity.expanded;
        Some(info.identity.expanded)
    }

    pub fn apply(&mut self, patches: &[CardPatch]) {
        for patch in patches {
            let Some(card) = self.card_mut(&patch.key) else {
                continue;
            };
            match &patch.change {
                CardChange::SetState(state) => card.state = *state,
                CardChange::SetResponseTime(text) => card.response_text = text.clone(),
                CardChange::UpdateInfo { version_text, identity } => {
                    if let Some(info) = card.info.as_mut() {
                        info.version_text = version_text.clone();
                        info.identity.full = identity.clone();
                    }
                }
                CardChange::CreateInfo { version_text, identity } => {
                    card.info = Some(InfoBlock::fresh(version_text.clone(), identity.clone()));
                }
                CardChange::RemoveInfo => card.info = None,
            }
        }
    }

    /// Attaches click handlers to every element that does not have one yet.
    /// Returns how many handlers were attached.
    pub fn bind_interactions(&mut self) -> usize {
        let mut bound = 0;
        for card in &mut self.cards {
            if !card.copy_bound {
                card.copy_bound = true;
                bound += 1;
            }
            if let Some(info) = card.info.as_mut() {
                if !info.toggle_bound {
                    info.toggle_bound = true;
                    bound += 1;
                }
            }
        }
        bound
    }
}

/// Computes the patches that bring `view` in line with `statuses`. Nodes
/// without a card in the view are ignored.
pub fn diff(view: &DashboardView, statuses: &[NodeStatusSummary]) -> Vec<CardPatch> {
    let mut patches = Vec::new();
    for node in statuses {
        let Some(card) = view.card(&node.network, &node.url) else {
            continue;
        };
        let key = CardKey::of(node);
        let mut push = |change: CardChange| {
            patches.push(CardPatch {
                key: key.clone(),
                change,
            })
        };
        if card.state != node.status {
            push(CardChange::SetState(node.status));
        }
        let response_text = response_label(node);
        if card.response_text != response_text {
            push(CardChange::SetResponseTime(response_text));
        }
        match (&card.info, node.status.is_online()) {
            (Some(info), true) => {
                let version_text = summary_version(node);
                let identity = summary_identity(node);
                if info.version_text != version_text || info.identity.full != identity {
                    push(CardChange::UpdateInfo { version_text, identity });
                }
            }
            (None, true) => push(CardChange::CreateInfo {
                version_text: summary_version(node),
                identity: summary_identity(node),
            }),
            (Some(_), false) => push(CardChange::RemoveInfo),
            (None, false) => {}
        }
    }
    patches
}

fn response_label(node: &NodeStatusSummary) -> String {
    format!("Response: {}", response_time_label(node.response_time))
}

fn summary_version(node: &NodeStatusSummary) -> String {
    version_label(node.version.as_deref(), node.version_name.as_deref())
}

fn summary_identity(node: &NodeStatusSummary) -> String {
    node.identity.clone().unwrap_or_else(|| UNKNOWN.to_string())
}
