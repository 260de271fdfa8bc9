/// Block layout for the post card: a card box holding a title, the content
/// paragraphs and an optional image, stacked vertically.

use crate::region::ImageRef;
use crate::rendering::Viewport;
use crate::{Error, Result};
use scraper::{Html, Selector};

/// Width and height of one glyph cell at text scale 1
pub const CELL: u32 = 8;

const CARD_INSET: u32 = 16;
const CARD_PADDING: u32 = 16;

#[derive(Debug, Clone, PartialEq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoxModel {
    pub margin: u32,
    pub border: u32,
    pub padding: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutBox {
    pub rect: Rect,
    pub box_model: BoxModel,
}

impl LayoutBox {
    pub fn content_width(&self) -> u32 {
        self.rect.width.saturating_sub(self.box_model.border * 2 + self.box_model.padding * 2)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementType {
    Card,
    Title,
    Paragraph,
    Image,
}

#[derive(Debug, Clone)]
pub struct LayoutNode {
    pub lb: LayoutBox,
    pub text: String,
    pub elem_type: ElementType,
    pub scale: usize,
    pub image: Option<ImageRef>,
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| Error::RenderError(format!("bad selector {}: {:?}", css, e)))
}

/// Greedy word wrap; `chars_per_line` is clamped to at least 1
pub fn wrap_text(text: &str, chars_per_line: usize) -> Vec<String> {
    let limit = chars_per_line.max(1);
    let mut lines = Vec::new();
    let mut cur = String::new();
    for word in text.split_whitespace() {
        let cur_len = cur.chars().count();
        if cur_len + word.chars().count() + 1 > limit && !cur.is_empty() {
            lines.push(std::mem::take(&mut cur));
            cur.push_str(word);
        } else {
            if !cur.is_empty() {
                cur.push(' ');
            }
            cur.push_str(word);
        }
    }
    if !cur.is_empty() {
        lines.push(cur);
    }
    lines
}

fn text_block(text: &str, x: u32, y: u32, width: u32, scale: usize, box_model: BoxModel, elem_type: ElementType) -> LayoutNode {
    let cell = CELL * scale as u32;
    let inset = box_model.border + box_model.padding;
    let chars_per_line = (width.saturating_sub(inset * 2) / cell).max(1) as usize;
    let lines = wrap_text(text, chars_per_line);
    let lines_count = (lines.len() as u32).max(1);
    let box_h = lines_count * cell + inset * 2;
    LayoutNode {
        lb: LayoutBox {
            rect: Rect { x: x as i32, y: y as i32, width, height: box_h },
            box_model,
        },
        text: lines.join("\n"),
        elem_type,
        scale,
        image: None,
    }
}

/// Spacing around a text block: `padding` inside, `margin` below
fn spacing(padding: u32, margin: u32) -> BoxModel {
    BoxModel { margin, border: 0, padding }
}

/// Lay out a parsed post card within `viewport`.
///
/// Blocks that would start below the card's bottom edge are dropped.
pub fn layout_region(document: &Html, viewport: Viewport) -> Result<Vec<LayoutNode>> {
    let card_w = viewport.width.saturating_sub(CARD_INSET * 2);
    let card_h = viewport.height.saturating_sub(CARD_INSET * 2);
    let inner_x = CARD_INSET + CARD_PADDING;
    let inner_w = card_w.saturating_sub(CARD_PADDING * 2);
    let bottom = CARD_INSET + card_h.saturating_sub(CARD_PADDING);

    let mut nodes = vec![LayoutNode {
        lb: LayoutBox {
            rect: Rect { x: CARD_INSET as i32, y: CARD_INSET as i32, width: card_w, height: card_h },
            box_model: BoxModel { margin: CARD_INSET, border: 1, padding: CARD_PADDING },
        },
        text: String::new(),
        elem_type: ElementType::Card,
        scale: 1,
        image: None,
    }];
    let mut y = CARD_INSET + CARD_PADDING;

    let title_text = document
        .select(&selector(".og-title")?)
        .next()
        .map(|n| n.text().collect::<String>())
        .unwrap_or_default();
    if !title_text.trim().is_empty() {
        let node = text_block(title_text.trim(), inner_x, y, inner_w, 2, spacing(8, 8), ElementType::Title);
        y += node.lb.rect.height + node.lb.box_model.margin;
        nodes.push(node);
    }

    let block_sel = selector(
        ".og-content p, .og-content h1, .og-content h2, .og-content h3, \
         .og-content li, .og-content blockquote, .og-content pre",
    )?;
    let mut paragraphs: Vec<String> = document
        .select(&block_sel)
        .map(|n| n.text().collect::<String>())
        .filter(|t| !t.trim().is_empty())
        .collect();
    if paragraphs.is_empty() {
        // Plain text without block markup
        let whole = document
            .select(&selector(".og-content")?)
            .next()
            .map(|n| n.text().collect::<String>())
            .unwrap_or_default();
        if !whole.trim().is_empty() {
            paragraphs.push(whole);
        }
    }
    for txt in paragraphs {
        if y >= bottom {
            break;
        }
        let node = text_block(&txt, inner_x, y, inner_w, 1, spacing(6, 6), ElementType::Paragraph);
        y += node.lb.rect.height + node.lb.box_model.margin;
        nodes.push(node);
    }

    if let Some(img) = document.select(&selector("img.og-image")?).next() {
        let src = img.value().attr("src").unwrap_or_default();
        if !src.is_empty() && y + CELL < bottom {
            nodes.push(LayoutNode {
                lb: LayoutBox {
                    rect: Rect { x: inner_x as i32, y: y as i32, width: inner_w, height: bottom - y },
                    box_model: BoxModel { margin: 0, border: 0, padding: 0 },
                },
                text: String::new(),
                elem_type: ElementType::Image,
                scale: 1,
                image: Some(ImageRef::linked(src, img.value().attr("crossorigin").is_some())),
            });
        }
    }

    Ok(nodes)
}
