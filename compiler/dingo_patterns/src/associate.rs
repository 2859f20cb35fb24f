//! Marker-to-construct association.
//!
//! Markers have positions but are not guaranteed nested, so association is
//! distance-based: a marker binds to the *nearest subsequent* candidate
//! within [`ASSOCIATION_THRESHOLD`] position units. Ties are broken by
//! minimum forward distance (and source order among equals). Markers with no
//! candidate in range are dropped with a warning.

use dingo_diagnostic::{diagnostic, Sink};
use dingo_ir::ast::{SourceFile, StmtKind};
use dingo_ir::{walk_file, NodeRef, Span, StmtId, SyntaxArena};

use crate::marker::{scan_markers, Marker, MarkerKind};
use crate::parse::{parse_arity, parse_pattern, parse_tuple_arm, ParsedPattern};

/// Maximum forward distance, in position units, for marker association.
pub const ASSOCIATION_THRESHOLD: u32 = 100;

/// One arm of a marker-tagged match: pattern and optional guard text, bound
/// to a case clause of the switch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarkerArm {
    /// Index of the case clause within the switch.
    pub case_index: usize,
    pub pattern: ParsedPattern,
    /// Guard condition text, preserved verbatim.
    pub guard: Option<String>,
    pub span: Span,
}

/// A switch identified as a lowered match construct.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchSite {
    pub switch: StmtId,
    /// Scrutinee text from the `DINGO_MATCH_START` marker, verbatim.
    pub scrutinee: Option<String>,
    /// Arms in case order.
    pub arms: Vec<MarkerArm>,
    pub span: Span,
}

/// One arm of a marker-tagged tuple match.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TupleArm {
    pub case_index: usize,
    pub patterns: Vec<ParsedPattern>,
    pub span: Span,
}

/// A switch identified as a lowered tuple match.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TupleSite {
    pub switch: StmtId,
    pub arity: usize,
    pub arms: Vec<TupleArm>,
    pub span: Span,
}

/// Collect marker-tagged match and tuple-match sites from a file.
///
/// Unassociated markers warn with E4001; malformed payloads warn with E4002.
pub fn collect_sites(
    arena: &SyntaxArena,
    file: &SourceFile,
    sink: &mut Sink,
) -> (Vec<MatchSite>, Vec<TupleSite>) {
    let markers = scan_markers(file);
    if markers.is_empty() {
        return (Vec::new(), Vec::new());
    }

    // Candidate targets: switch statements and their case clauses.
    let mut switches: Vec<(StmtId, Span)> = Vec::new();
    let mut cases: Vec<(StmtId, usize, Span)> = Vec::new();
    walk_file(arena, file, &mut |node| {
        if let NodeRef::Stmt(id) = node {
            if let StmtKind::Switch { cases: clauses, .. } = &arena.stmt(id).kind {
                switches.push((id, arena.stmt(id).span));
                for (i, clause) in clauses.iter().enumerate() {
                    cases.push((id, i, clause.span));
                }
            }
        }
    });
    switches.sort_by_key(|(_, span)| span.start);
    cases.sort_by_key(|(_, _, span)| span.start);

    let mut sites: Vec<MatchSite> = Vec::new();
    let mut tuple_sites: Vec<TupleSite> = Vec::new();

    for marker in &markers {
        match marker.kind {
            MarkerKind::MatchStart => {
                let Some(switch) = nearest_switch(&switches, marker.span) else {
                    report_unassociated(sink, marker);
                    continue;
                };
                site_for(&mut sites, switch, switch_span(&switches, switch)).scrutinee =
                    Some(marker.payload.clone());
            }
            MarkerKind::Pattern => {
                let Some(pattern) = parse_pattern(&marker.payload) else {
                    sink.report(diagnostic::marker_malformed(marker.span, &marker.payload));
                    continue;
                };
                let Some((switch, case_index, span)) = nearest_case(&cases, marker.span) else {
                    report_unassociated(sink, marker);
                    continue;
                };
                site_for(&mut sites, switch, switch_span(&switches, switch))
                    .arms
                    .push(MarkerArm {
                        case_index,
                        pattern,
                        guard: None,
                        span,
                    });
            }
            MarkerKind::Guard => {
                let Some((switch, case_index, _)) = nearest_case(&cases, marker.span) else {
                    report_unassociated(sink, marker);
                    continue;
                };
                let site = site_for(&mut sites, switch, switch_span(&switches, switch));
                match site.arms.iter_mut().find(|a| a.case_index == case_index) {
                    Some(arm) => arm.guard = Some(marker.payload.clone()),
                    // A guard with no pattern on its arm has nothing to
                    // attach to; treat like any other unassociated marker.
                    None => report_unassociated(sink, marker),
                }
            }
            MarkerKind::TuplePattern => {
                let Some(arity) = parse_arity(&marker.payload) else {
                    sink.report(diagnostic::marker_malformed(marker.span, &marker.payload));
                    continue;
                };
                let Some(switch) = nearest_switch(&switches, marker.span) else {
                    report_unassociated(sink, marker);
                    continue;
                };
                tuple_site_for(&mut tuple_sites, switch, switch_span(&switches, switch)).arity =
                    arity;
            }
            MarkerKind::TupleArm => {
                let Some(patterns) = parse_tuple_arm(&marker.payload) else {
                    sink.report(diagnostic::marker_malformed(marker.span, &marker.payload));
                    continue;
                };
                let Some((switch, case_index, span)) = nearest_case(&cases, marker.span) else {
                    report_unassociated(sink, marker);
                    continue;
                };
                tuple_site_for(&mut tuple_sites, switch, switch_span(&switches, switch))
                    .arms
                    .push(TupleArm {
                        case_index,
                        patterns,
                        span,
                    });
            }
        }
    }

    for site in &mut sites {
        site.arms.sort_by_key(|a| a.case_index);
    }
    for site in &mut tuple_sites {
        site.arms.sort_by_key(|a| a.case_index);
    }

    tracing::debug!(
        sites = sites.len(),
        tuple_sites = tuple_sites.len(),
        "marker association complete"
    );
    (sites, tuple_sites)
}

fn report_unassociated(sink: &mut Sink, marker: &Marker) {
    let text = format!("{} {}", marker.kind.prefix(), marker.payload);
    sink.report(diagnostic::marker_unassociated(marker.span, &text));
}

/// Nearest subsequent switch within the threshold.
fn nearest_switch(switches: &[(StmtId, Span)], marker: Span) -> Option<StmtId> {
    switches
        .iter()
        .filter_map(|&(id, span)| {
            marker
                .forward_distance_to(span)
                .filter(|&d| d <= ASSOCIATION_THRESHOLD)
                .map(|d| (d, id))
        })
        .min_by_key(|&(d, _)| d)
        .map(|(_, id)| id)
}

/// Nearest subsequent case clause within the threshold.
fn nearest_case(cases: &[(StmtId, usize, Span)], marker: Span) -> Option<(StmtId, usize, Span)> {
    cases
        .iter()
        .filter_map(|&(switch, index, span)| {
            marker
                .forward_distance_to(span)
                .filter(|&d| d <= ASSOCIATION_THRESHOLD)
                .map(|d| (d, (switch, index, span)))
        })
        .min_by_key(|&(d, _)| d)
        .map(|(_, target)| target)
}

fn switch_span(switches: &[(StmtId, Span)], switch: StmtId) -> Span {
    switches
        .iter()
        .find(|(id, _)| *id == switch)
        .map_or(Span::DUMMY, |(_, span)| *span)
}

fn site_for<'s>(sites: &'s mut Vec<MatchSite>, switch: StmtId, span: Span) -> &'s mut MatchSite {
    if let Some(pos) = sites.iter().position(|s| s.switch == switch) {
        return &mut sites[pos];
    }
    sites.push(MatchSite {
        switch,
        scrutinee: None,
        arms: Vec::new(),
        span,
    });
    let last = sites.len() - 1;
    &mut sites[last]
}

fn tuple_site_for<'s>(
    sites: &'s mut Vec<TupleSite>,
    switch: StmtId,
    span: Span,
) -> &'s mut TupleSite {
    if let Some(pos) = sites.iter().position(|s| s.switch == switch) {
        return &mut sites[pos];
    }
    sites.push(TupleSite {
        switch,
        arity: 0,
        arms: Vec::new(),
        span,
    });
    let last = sites.len() - 1;
    &mut sites[last]
}
