/// Display list built from the card layout

use crate::region::ImageRef;
use crate::rendering::layout::{ElementType, LayoutNode};
use crate::rendering::Viewport;

pub const BACKGROUND: (u8, u8, u8, u8) = (255, 255, 255, 255);
pub const CARD_FILL: (u8, u8, u8, u8) = (243, 244, 246, 255);
pub const CARD_BORDER: (u8, u8, u8, u8) = (209, 213, 219, 255);
pub const INK: (u8, u8, u8, u8) = (0, 0, 0, 255);

#[derive(Debug, Clone, PartialEq)]
pub enum PaintCommand {
    SolidRect {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        rgba: (u8, u8, u8, u8),
    },
    Text {
        x: i32,
        y: i32,
        text: String,
        scale: usize,
    },
    Image {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        source: ImageRef,
    },
}

pub fn build_display_list(nodes: &[LayoutNode], viewport: Viewport) -> Vec<PaintCommand> {
    let mut cmds = vec![PaintCommand::SolidRect {
        x: 0,
        y: 0,
        width: viewport.width,
        height: viewport.height,
        rgba: BACKGROUND,
    }];

    for node in nodes {
        let r = &node.lb.rect;
        let pad = node.lb.box_model.padding as i32;
        match node.elem_type {
            ElementType::Card => {
                let border = node.lb.box_model.border;
                cmds.push(PaintCommand::SolidRect { x: r.x, y: r.y, width: r.width, height: r.height, rgba: CARD_BORDER });
                cmds.push(PaintCommand::SolidRect {
                    x: r.x + border as i32,
                    y: r.y + border as i32,
                    width: r.width.saturating_sub(border * 2),
                    height: r.height.saturating_sub(border * 2),
                    rgba: CARD_FILL,
                });
            }
            ElementType::Title | ElementType::Paragraph => {
                if !node.text.is_empty() {
                    cmds.push(PaintCommand::Text { x: r.x + pad, y: r.y + pad, text: node.text.clone(), scale: node.scale });
                }
            }
            ElementType::Image => {
                if let Some(source) = &node.image {
                    cmds.push(PaintCommand::Image {
                        x: r.x,
                        y: r.y,
                        width: r.width,
                        height: r.height,
                        source: source.clone(),
                    });
                }
            }
        }
    }

    cmds
}
