//! Taffy layout pass producing hit regions and semantics nodes.
//!
//! There is no renderer: the pass only computes rectangles. Units are dp,
//! mapped 1:1 to the viewport size handed in by the host.

use std::collections::HashMap;

use ripple_core::{HitRegion, Rect, Role, SemNode, View, ViewId, ViewKind};
use taffy::TaffyError;
use taffy::prelude::*;
use unicode_segmentation::UnicodeSegmentation;

const GLYPH_WIDTH_EM: f32 = 0.6;
const LINE_HEIGHT_EM: f32 = 1.3;
const BUTTON_FONT_DP: f32 = 16.0;
const BUTTON_HEIGHT_DP: f32 = 36.0;
const BUTTON_PADDING_X_DP: f32 = 12.0;

#[derive(Clone)]
enum NodeCtx {
    Text { graphemes: usize, font_dp: f32 },
    Button { graphemes: usize },
}

/// Lays `root` out in a `size` viewport. On a layout failure the error is
/// logged and the frame gets no hit regions.
pub fn layout(root: &View, size: (u32, u32)) -> (Vec<HitRegion>, Vec<SemNode>) {
    match try_layout(root, size) {
        Ok(out) => out,
        Err(e) => {
            log::error!("layout failed: {e}");
            (Vec::new(), Vec::new())
        }
    }
}

fn try_layout(root: &View, size: (u32, u32)) -> Result<(Vec<HitRegion>, Vec<SemNode>), TaffyError> {
    // Assign ids
    let mut id = 1u64;
    fn stamp(mut v: View, id: &mut u64) -> View {
        v.id = *id;
        *id += 1;
        v.children = v.children.into_iter().map(|c| stamp(c, id)).collect();
        v
    }
    let root = stamp(root.clone(), &mut id);

    let mut taffy: TaffyTree<NodeCtx> = TaffyTree::new();
    let mut nodes = HashMap::new();
    let root_node = build_node(&root, &mut taffy, &mut nodes)?;

    let mut rs = taffy.style(root_node)?.clone();
    rs.size.width = length(size.0 as f32);
    rs.size.height = length(size.1 as f32);
    taffy.set_style(root_node, rs)?;

    let available = Size {
        width: AvailableSpace::Definite(size.0 as f32),
        height: AvailableSpace::Definite(size.1 as f32),
    };
    taffy.compute_layout_with_measure(root_node, available, |known, _avail, _node, ctx, _style| {
        measure(known, ctx)
    })?;

    let mut hits = Vec::new();
    let mut sems = Vec::new();
    walk(&root, &taffy, &nodes, (0.0, 0.0), &mut hits, &mut sems)?;
    log::trace!("layout: {} hit region(s), {} semantics node(s)", hits.len(), sems.len());
    Ok((hits, sems))
}

fn style_for(v: &View) -> Style {
    let m = &v.modifier;
    let mut s = Style {
        display: Display::Flex,
        ..Default::default()
    };
    s.flex_direction = match v.kind {
        ViewKind::Row => FlexDirection::Row,
        _ => FlexDirection::Column,
    };
    s.align_items = Some(if m.center_children {
        AlignItems::Center
    } else {
        AlignItems::FlexStart
    });
    s.justify_content = Some(JustifyContent::FlexStart);

    let pad = m.padding.unwrap_or(0.0);
    let pad_v = m.padding_vertical.unwrap_or(pad);
    s.padding = taffy::geometry::Rect {
        left: length(pad),
        right: length(pad),
        top: length(pad_v),
        bottom: length(pad_v),
    };
    if let Some(g) = m.gap {
        s.gap = Size {
            width: length(g),
            height: length(g),
        };
    }

    if m.fill_max_size {
        s.size = Size {
            width: percent(1.0),
            height: percent(1.0),
        };
    } else if m.fill_max_width {
        s.size.width = percent(1.0);
    }

    if matches!(v.kind, ViewKind::Divider) {
        s.size = Size {
            width: percent(1.0),
            height: length(1.0),
        };
    }
    s
}

fn build_node(
    v: &View,
    t: &mut TaffyTree<NodeCtx>,
    nodes: &mut HashMap<ViewId, NodeId>,
) -> Result<NodeId, TaffyError> {
    let style = style_for(v);
    let node = match &v.kind {
        ViewKind::Text {
            text, font_size, ..
        } => t.new_leaf_with_context(
            style,
            NodeCtx::Text {
                graphemes: text.graphemes(true).count(),
                font_dp: *font_size,
            },
        )?,
        ViewKind::Button { text, .. } => t.new_leaf_with_context(
            style,
            NodeCtx::Button {
                graphemes: text.graphemes(true).count(),
            },
        )?,
        ViewKind::Divider => t.new_leaf(style)?,
        _ => {
            let children = v
                .children
                .iter()
                .map(|c| build_node(c, t, nodes))
                .collect::<Result<Vec<_>, _>>()?;
            t.new_with_children(style, &children)?
        }
    };
    nodes.insert(v.id, node);
    Ok(node)
}

fn measure(known: Size<Option<f32>>, ctx: Option<&mut NodeCtx>) -> Size<f32> {
    match ctx {
        Some(NodeCtx::Text { graphemes, font_dp }) => Size {
            width: known
                .width
                .unwrap_or(*graphemes as f32 * *font_dp * GLYPH_WIDTH_EM),
            height: known.height.unwrap_or(*font_dp * LINE_HEIGHT_EM),
        },
        Some(NodeCtx::Button { graphemes }) => Size {
            width: known.width.unwrap_or(
                *graphemes as f32 * BUTTON_FONT_DP * GLYPH_WIDTH_EM + 2.0 * BUTTON_PADDING_X_DP,
            ),
            height: known.height.unwrap_or(BUTTON_HEIGHT_DP),
        },
        None => Size::ZERO,
    }
}

fn walk(
    v: &View,
    t: &TaffyTree<NodeCtx>,
    nodes: &HashMap<ViewId, NodeId>,
    parent_offset: (f32, f32),
    hits: &mut Vec<HitRegion>,
    sems: &mut Vec<SemNode>,
) -> Result<(), TaffyError> {
    let Some(node) = nodes.get(&v.id) else {
        return Ok(());
    };
    let l = t.layout(*node)?;
    let rect = Rect {
        x: parent_offset.0 + l.location.x,
        y: parent_offset.1 + l.location.y,
        w: l.size.width,
        h: l.size.height,
    };

    match &v.kind {
        ViewKind::Text { text, .. } => sems.push(SemNode {
            id: v.id,
            role: Role::Text,
            label: Some(text.clone()),
            rect,
            enabled: true,
        }),
        ViewKind::Button {
            text,
            on_click,
            enabled,
        } => {
            if *enabled {
                hits.push(HitRegion {
                    id: v.id,
                    rect,
                    on_click: on_click.clone(),
                    enabled: true,
                });
            }
            sems.push(SemNode {
                id: v.id,
                role: Role::Button,
                label: Some(text.clone()),
                rect,
                enabled: *enabled,
            });
        }
        ViewKind::Divider => sems.push(SemNode {
            id: v.id,
            role: Role::Divider,
            label: None,
            rect,
            enabled: true,
        }),
        _ => {}
    }

    for c in &v.children {
        walk(c, t, nodes, (rect.x, rect.y), hits, sems)?;
    }
    Ok(())
}
