//! Layout Module - Dialog geometry via Taffy.
//!
//! Builds a small flexbox tree for an open dialog and returns absolute
//! rectangles for every part the painter draws:
//!
//! ```text
//! screen (center/center)
//! └── card (column, border, padding)
//!     ├── title, subtitle
//!     ├── email label, email field       (PatientAccess only)
//!     ├── code label                     (when the variant has one)
//!     ├── cells row (row, gap 1, centered)
//!     ├── helper text
//!     ├── error line                     (after a rejected submit)
//!     └── buttons row (row, gap 2, end-aligned)
//! ```
//!
//! Text nodes carry their string as Taffy node context and are measured by
//! word wrapping to the width Taffy offers.
//!
//! # Example
//!
//! ```ignore
//! use vault_pin_tui::layout::compute_dialog_layout;
//!
//! if let Some(view) = dialog.view() {
//!     let layout = compute_dialog_layout(&view, 80, 24)?;
//! }
//! ```

mod text_measure;

pub use text_measure::*;

use taffy::{
    AlignItems, AvailableSpace, Dimension, FlexDirection, JustifyContent, LengthPercentage,
    NodeId, Rect as TaffyRect, Size, Style, TaffyTree,
};

use crate::error::LayoutError;
use crate::primitives::DialogView;
use crate::types::Rect;

/// Widest the card gets on large terminals.
pub const CARD_MAX_WIDTH: u16 = 60;
/// Bordered digit cell.
pub const CELL_WIDTH: u16 = 5;
pub const CELL_HEIGHT: u16 = 3;
/// Bordered single-line field.
pub const FIELD_HEIGHT: u16 = 3;

/// Button width for a label: `[ label ]`.
pub fn button_width(label: &str) -> u16 {
    string_width(label) + 4
}

/// Absolute rectangles for one frame of an open dialog.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DialogLayout {
    pub card: Rect,
    pub title: Rect,
    pub subtitle: Rect,
    pub email_label: Option<Rect>,
    pub email: Option<Rect>,
    pub code_label: Option<Rect>,
    pub cells: Vec<Rect>,
    pub helper: Rect,
    pub error: Option<Rect>,
    pub reset: Rect,
    pub submit: Rect,
}

// =============================================================================
// STYLE HELPERS
// =============================================================================

fn length(n: u16) -> Dimension {
    Dimension::Length(n as f32)
}

fn lp(n: u16) -> LengthPercentage {
    LengthPercentage::Length(n as f32)
}

fn fixed(width: u16, height: u16) -> Style {
    Style {
        size: Size {
            width: length(width),
            height: length(height),
        },
        flex_shrink: 0.0,
        ..Default::default()
    }
}

fn text_style() -> Style {
    Style {
        flex_shrink: 0.0,
        ..Default::default()
    }
}

fn row(gap: u16, justify: JustifyContent) -> Style {
    Style {
        flex_direction: FlexDirection::Row,
        justify_content: Some(justify),
        gap: Size {
            width: lp(gap),
            height: lp(0),
        },
        flex_shrink: 0.0,
        ..Default::default()
    }
}

/// Wrapped height of a text node at the width Taffy offers.
fn measure_text(
    text: &str,
    known: Size<Option<f32>>,
    available: Size<AvailableSpace>,
) -> Size<f32> {
    let full = string_width(text);
    let width = match (known.width, available.width) {
        (Some(w), _) => w as u16,
        (None, AvailableSpace::Definite(w)) => (w as u16).min(full),
        (None, AvailableSpace::MinContent) => text
            .split_whitespace()
            .map(string_width)
            .max()
            .unwrap_or(0),
        (None, AvailableSpace::MaxContent) => full,
    };
    Size {
        width: known.width.unwrap_or(width as f32),
        height: known
            .height
            .unwrap_or(measure_text_height(text, width.max(1)) as f32),
    }
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Compute the dialog's geometry centered on a `width` x `height` screen.
pub fn compute_dialog_layout(
    view: &DialogView,
    width: u16,
    height: u16,
) -> Result<DialogLayout, LayoutError> {
    let mut tree: TaffyTree<String> = TaffyTree::new();

    let text_leaf = |tree: &mut TaffyTree<String>, text: &str| {
        tree.new_leaf_with_context(text_style(), text.to_string())
    };

    let title = text_leaf(&mut tree, view.title)?;
    let subtitle = text_leaf(&mut tree, view.subtitle)?;
    let mut children = vec![title, subtitle];

    let email_nodes = match (view.email_label, &view.email) {
        (Some(label), Some(_)) => {
            let label = text_leaf(&mut tree, label)?;
            let field = tree.new_leaf(Style {
                size: Size {
                    width: Dimension::Auto,
                    height: length(FIELD_HEIGHT),
                },
                flex_shrink: 0.0,
                ..Default::default()
            })?;
            children.extend([label, field]);
            Some((label, field))
        }
        _ => None,
    };

    let code_label = match view.code_label {
        Some(label) => {
            let node = text_leaf(&mut tree, label)?;
            children.push(node);
            Some(node)
        }
        None => None,
    };

    let cells = view
        .cells
        .iter()
        .map(|_| tree.new_leaf(fixed(CELL_WIDTH, CELL_HEIGHT)))
        .collect::<Result<Vec<NodeId>, _>>()?;
    let cells_row = tree.new_with_children(row(1, JustifyContent::Center), &cells)?;
    children.push(cells_row);

    let helper = text_leaf(&mut tree, view.helper)?;
    children.push(helper);

    let error = match &view.error {
        Some(message) => {
            let node = text_leaf(&mut tree, message)?;
            children.push(node);
            Some(node)
        }
        None => None,
    };

    let reset = tree.new_leaf(fixed(button_width(view.reset.label), 1))?;
    let submit = tree.new_leaf(fixed(button_width(view.submit.label), 1))?;
    let buttons = tree.new_with_children(row(2, JustifyContent::FlexEnd), &[reset, submit])?;
    children.push(buttons);

    let card = tree.new_with_children(
        Style {
            flex_direction: FlexDirection::Column,
            size: Size {
                width: length(CARD_MAX_WIDTH.min(width)),
                height: Dimension::Auto,
            },
            border: TaffyRect {
                top: lp(1),
                right: lp(1),
                bottom: lp(1),
                left: lp(1),
            },
            padding: TaffyRect {
                top: lp(0),
                right: lp(2),
                bottom: lp(0),
                left: lp(2),
            },
            gap: Size {
                width: lp(0),
                height: lp(1),
            },
            flex_shrink: 0.0,
            ..Default::default()
        },
        &children,
    )?;

    let screen = tree.new_with_children(
        Style {
            size: Size {
                width: length(width),
                height: length(height),
            },
            justify_content: Some(JustifyContent::Center),
            align_items: Some(AlignItems::Center),
            ..Default::default()
        },
        &[card],
    )?;

    tree.compute_layout_with_measure(
        screen,
        Size {
            width: AvailableSpace::Definite(width as f32),
            height: AvailableSpace::Definite(height as f32),
        },
        |known, available, _node, context, _style| match context {
            Some(text) => measure_text(text, known, available),
            None => Size::ZERO,
        },
    )?;

    // Taffy locations are relative to the parent
    let place = |node: NodeId, parent: Rect| -> Result<Rect, LayoutError> {
        let layout = tree.layout(node)?;
        Ok(Rect::new(
            parent.x.saturating_add(layout.location.x.round().max(0.0) as u16),
            parent.y.saturating_add(layout.location.y.round().max(0.0) as u16),
            layout.size.width.round().max(0.0) as u16,
            layout.size.height.round().max(0.0) as u16,
        ))
    };

    let screen_rect = Rect::new(0, 0, width, height);
    let card_rect = place(card, screen_rect)?;
    let cells_rect = place(cells_row, card_rect)?;
    let buttons_rect = place(buttons, card_rect)?;

    let (email_label, email) = match email_nodes {
        Some((label, field)) => (Some(place(label, card_rect)?), Some(place(field, card_rect)?)),
        None => (None, None),
    };

    Ok(DialogLayout {
        card: card_rect,
        title: place(title, card_rect)?,
        subtitle: place(subtitle, card_rect)?,
        email_label,
        email,
        code_label: code_label.map(|n| place(n, card_rect)).transpose()?,
        cells: cells
            .into_iter()
            .map(|n| place(n, cells_rect))
            .collect::<Result<_, _>>()?,
        helper: place(helper, card_rect)?,
        error: error.map(|n| place(n, card_rect)).transpose()?,
        reset: place(reset, buttons_rect)?,
        submit: place(submit, buttons_rect)?,
    })
}

// =============================================================================
// Tests
// =============================================================================
