//! Catalog hierarchy construction.
//!
//! Walks tournament → event → market, normalizes each market's selections,
//! groups markets into categories and decides whether a line layer is
//! needed. A node that fails to build is logged, counted and skipped; its
//! siblings are unaffected, so a single malformed upstream record never
//! blanks the catalog.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::fields;
use super::normalize::{self, NormalizedMarket};
use crate::domain::odds;
use crate::domain::selection::{LineKey, MarketClass, SelectionGroup};
use crate::domain::tree::{EventData, LineData, MarketData, NodeData, NodeKind, SelectionData, TreeNode};

/// Category assigned to markets that do not declare one.
pub const DEFAULT_CATEGORY: &str = "Other";

/// Raw catalog as fetched from the venue, one level per request.
#[derive(Debug, Clone, Default)]
pub struct RawCatalog {
    pub tournaments: Vec<RawTournament>,
}

#[derive(Debug, Clone)]
pub struct RawTournament {
    pub data: Value,
    pub events: Vec<RawEvent>,
}

#[derive(Debug, Clone)]
pub struct RawEvent {
    pub data: Value,
    pub markets: Vec<Value>,
}

/// Which empty subtrees survive the build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    pub keep_empty_markets: bool,
    pub keep_empty_events: bool,
    pub keep_empty_tournaments: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            keep_empty_markets: true,
            keep_empty_events: false,
            keep_empty_tournaments: false,
        }
    }
}

/// Why a single node could not be built.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("{kind:?} record is a {found}, expected an object")]
    NotAnObject { kind: NodeKind, found: &'static str },

    #[error("{kind:?} record has no id")]
    MissingId { kind: NodeKind },
}

/// Counters describing one build, for logs and operator diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BuildDiagnostics {
    pub built: HashMap<NodeKind, usize>,
    pub skipped: HashMap<NodeKind, usize>,
    pub dropped_empty: HashMap<NodeKind, usize>,
    pub normalize_failures: usize,
    pub ineligible_selections: usize,
}

impl BuildDiagnostics {
    #[must_use]
    pub fn built(&self, kind: NodeKind) -> usize {
        self.built.get(&kind).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn skipped(&self, kind: NodeKind) -> usize {
        self.skipped.get(&kind).copied().unwrap_or(0)
    }

    fn record_built(&mut self, kind: NodeKind) {
        *self.built.entry(kind).or_default() += 1;
    }

    fn record_skipped(&mut self, kind: NodeKind, error: &BuildError) {
        warn!(kind = ?kind, error = %error, "Skipping catalog node");
        *self.skipped.entry(kind).or_default() += 1;
    }

    fn record_dropped(&mut self, kind: NodeKind) {
        *self.dropped_empty.entry(kind).or_default() += 1;
    }
}

/// Result of a build: always a (possibly partial) tree.
#[derive(Debug, Clone, Default)]
pub struct BuildOutput {
    pub tree: Vec<TreeNode>,
    pub diagnostics: BuildDiagnostics,
}

/// Builds the canonical tree from a [`RawCatalog`].
#[derive(Debug, Clone, Default)]
pub struct HierarchyBuilder {
    options: BuildOptions,
}

impl HierarchyBuilder {
    #[must_use]
    pub fn new(options: BuildOptions) -> Self {
        Self { options }
    }

    #[must_use]
    pub fn options(&self) -> BuildOptions {
        self.options
    }

    /// Build the tree. Never fails as a whole.
    #[must_use]
    pub fn build(&self, catalog: &RawCatalog) -> BuildOutput {
        let mut diagnostics = BuildDiagnostics::default();
        let mut tree = Vec::with_capacity(catalog.tournaments.len());

        for raw in &catalog.tournaments {
            match self.build_tournament(raw, &mut diagnostics) {
                Ok(Some(node)) => tree.push(node),
                Ok(None) => {}
                Err(err) => diagnostics.record_skipped(NodeKind::Tournament, &err),
            }
        }

        info!(
            tournaments = diagnostics.built(NodeKind::Tournament),
            events = diagnostics.built(NodeKind::Event),
            markets = diagnostics.built(NodeKind::Market),
            selections = diagnostics.built(NodeKind::Selection),
            ineligible = diagnostics.ineligible_selections,
            normalize_failures = diagnostics.normalize_failures,
            "Catalog hierarchy built"
        );

        BuildOutput { tree, diagnostics }
    }

    fn build_tournament(
        &self,
        raw: &RawTournament,
        diagnostics: &mut BuildDiagnostics,
    ) -> Result<Option<TreeNode>, BuildError> {
        let id = node_id(&raw.data, NodeKind::Tournament, &["tournament_id", "tournamentId"])?;
        let name = fields::text(&raw.data, fields::NAME_KEYS).unwrap_or_else(|| id.clone());

        let mut events = Vec::with_capacity(raw.events.len());
        for event in &raw.events {
            match self.build_event(event, diagnostics) {
                Ok(Some(node)) => events.push(node),
                Ok(None) => {}
                Err(err) => diagnostics.record_skipped(NodeKind::Event, &err),
            }
        }

        if events.is_empty() && !self.options.keep_empty_tournaments {
            debug!(tournament = %id, "Dropping tournament without events");
            diagnostics.record_dropped(NodeKind::Tournament);
            return Ok(None);
        }

        diagnostics.record_built(NodeKind::Tournament);
        Ok(Some(
            TreeNode::new(id, name, NodeData::Tournament).with_children(events),
        ))
    }

    fn build_event(
        &self,
        raw: &RawEvent,
        diagnostics: &mut BuildDiagnostics,
    ) -> Result<Option<TreeNode>, BuildError> {
        let id = node_id(&raw.data, NodeKind::Event, &["event_id", "eventId"])?;
        let name = event_name(&raw.data).unwrap_or_else(|| id.clone());
        let data = EventData {
            starts_at: fields::timestamp(&raw.data, fields::START_KEYS),
            status: fields::text(&raw.data, fields::STATUS_KEYS),
        };

        // Category order follows the first market seen in each category.
        let mut categories: Vec<(String, Vec<TreeNode>)> = Vec::new();
        for market in &raw.markets {
            let node = match self.build_market(market, diagnostics) {
                Ok(Some(node)) => node,
                Ok(None) => continue,
                Err(err) => {
                    diagnostics.record_skipped(NodeKind::Market, &err);
                    continue;
                }
            };
            let label = category_label(market);
            match categories.iter_mut().find(|(l, _)| *l == label) {
                Some((_, markets)) => markets.push(node),
                None => categories.push((label, vec![node])),
            }
        }

        let children: Vec<TreeNode> = categories
            .into_iter()
            .map(|(label, markets)| {
                diagnostics.record_built(NodeKind::Category);
                TreeNode::new(format!("{id}:{label}"), label, NodeData::Category)
                    .with_children(markets)
            })
            .collect();

        if children.is_empty() && !self.options.keep_empty_events {
            debug!(event = %id, "Dropping event without markets");
            diagnostics.record_dropped(NodeKind::Event);
            return Ok(None);
        }

        diagnostics.record_built(NodeKind::Event);
        Ok(Some(
            TreeNode::new(id, name, NodeData::Event(data)).with_children(children),
        ))
    }

    fn build_market(
        &self,
        raw: &Value,
        diagnostics: &mut BuildDiagnostics,
    ) -> Result<Option<TreeNode>, BuildError> {
        let id = node_id(raw, NodeKind::Market, &["market_id", "marketId"])?;
        let name = fields::text(raw, fields::NAME_KEYS).unwrap_or_else(|| id.clone());

        let normalized = normalize::normalize_market(raw).unwrap_or_else(|err| {
            warn!(market = %id, error = %err, "Failed to normalize market selections");
            diagnostics.normalize_failures += 1;
            NormalizedMarket::empty(normalize::classify(raw, &[]))
        });

        let mut counter = 0usize;
        let children = if normalized.groups.len() > 1 {
            normalized
                .groups
                .iter()
                .map(|group| {
                    let key = LineKey::canonical(normalized.class, group.line.as_ref());
                    let selections =
                        self.build_selections(&id, normalized.class, group, &mut counter, diagnostics);
                    diagnostics.record_built(NodeKind::Line);
                    TreeNode::new(
                        format!("{id}:{key}"),
                        key.to_string(),
                        NodeData::Line(LineData {
                            line: group.line.clone(),
                            key,
                        }),
                    )
                    .with_children(selections)
                })
                .collect()
        } else {
            normalized
                .groups
                .iter()
                .flat_map(|group| {
                    self.build_selections(&id, normalized.class, group, &mut counter, diagnostics)
                })
                .collect::<Vec<_>>()
        };

        if children.is_empty() && !self.options.keep_empty_markets {
            debug!(market = %id, "Dropping market without selections");
            diagnostics.record_dropped(NodeKind::Market);
            return Ok(None);
        }

        diagnostics.record_built(NodeKind::Market);
        let data = MarketData {
            status: fields::text(raw, fields::STATUS_KEYS),
            class: normalized.class,
        };
        Ok(Some(
            TreeNode::new(id, name, NodeData::Market(data)).with_children(children),
        ))
    }

    fn build_selections(
        &self,
        market_id: &str,
        class: MarketClass,
        group: &SelectionGroup,
        counter: &mut usize,
        diagnostics: &mut BuildDiagnostics,
    ) -> Vec<TreeNode> {
        group
            .selections
            .iter()
            .map(|record| {
                *counter += 1;
                let node = selection_node(market_id, class, group, record, *counter);
                if let NodeData::Selection(ref data) = node.data {
                    if data.external_id.is_none() {
                        diagnostics.ineligible_selections += 1;
                    }
                }
                diagnostics.record_built(NodeKind::Selection);
                node
            })
            .collect()
    }
}

fn selection_node(
    market_id: &str,
    class: MarketClass,
    group: &SelectionGroup,
    record: &Value,
    position: usize,
) -> TreeNode {
    let external_id = fields::external_id(record);
    let id = fields::text(record, fields::ID_KEYS)
        .or_else(|| fields::text(record, &["selection_id", "selectionId"]))
        .unwrap_or_else(|| format!("{market_id}:{position}"));
    let name = fields::text(record, fields::NAME_KEYS)
        .or_else(|| external_id.as_ref().map(ToString::to_string))
        .unwrap_or_else(|| format!("Selection {position}"));
    let display_name = fields::text(record, fields::DISPLAY_NAME_KEYS).unwrap_or_else(|| name.clone());

    let odds = fields::number(record, fields::ODDS_KEYS)
        .filter(|o| *o > 1.0)
        .or_else(|| {
            fields::number(record, fields::SIGNED_ODDS_KEYS).and_then(|signed| odds::to_alt(signed).ok())
        });
    let display_odds = fields::text(record, &["display_odds", "displayOdds"])
        .or_else(|| odds.and_then(|o| odds::format_display(o).ok()));

    let line = group.line.clone().or_else(|| fields::line(record));
    let line_key = LineKey::canonical(class, line.as_ref());

    TreeNode::new(
        id,
        name,
        NodeData::Selection(SelectionData {
            external_id,
            display_name,
            odds,
            display_odds,
            stake: fields::number(record, fields::STAKE_KEYS),
            line,
            line_key,
            raw: record.clone(),
        }),
    )
}

fn node_id(raw: &Value, kind: NodeKind, aliases: &[&str]) -> Result<String, BuildError> {
    if !raw.is_object() {
        return Err(BuildError::NotAnObject {
            kind,
            found: fields::kind_name(raw),
        });
    }
    fields::text(raw, fields::ID_KEYS)
        .or_else(|| fields::text(raw, aliases))
        .ok_or(BuildError::MissingId { kind })
}

fn event_name(raw: &Value) -> Option<String> {
    fields::text(raw, fields::NAME_KEYS).or_else(|| {
        let home = fields::text(raw, &["home", "home_team", "homeTeam"])?;
        let away = fields::text(raw, &["away", "away_team", "awayTeam"])?;
        Some(format!("{home} vs {away}"))
    })
}

fn category_label(market: &Value) -> String {
    fields::text(market, fields::CATEGORY_KEYS)
        .or_else(|| {
            fields::CATEGORY_KEYS
                .iter()
                .find_map(|key| market.get(key).filter(|v| v.is_object()))
                .and_then(|category| fields::text(category, fields::NAME_KEYS))
        })
        .unwrap_or_else(|| DEFAULT_CATEGORY.to_string())
}
