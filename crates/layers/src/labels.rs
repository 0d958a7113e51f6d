//! Tag placement for stations, sources and contour labels.
//!
//! Tags are laid out in request order on a coarse occupancy grid; a tag
//! whose box touches an occupied cell is dropped.

use foundation::math::Vec2;
use scene::components::{Color, TagPosition, colors};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagStyle {
    pub font_size_px: f64,
    pub color: Color,
    pub padding_px: f64,
    pub cell_px: f64,
    pub max_tags: usize,
}

impl Default for TagStyle {
    fn default() -> Self {
        Self {
            font_size_px: 12.0,
            color: colors::BLACK,
            padding_px: 2.0,
            cell_px: 8.0,
            max_tags: 2_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TagRequest {
    pub text: String,
    /// Device position of the tagged symbol.
    pub anchor: Vec2,
    pub position: TagPosition,
    /// Symbol size the tag keeps clear of.
    pub clearance_px: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedTag {
    pub text: String,
    /// Top-left corner of the text box.
    pub at: Vec2,
    pub size: [f64; 2],
}

pub fn layout_tags(requests: &[TagRequest], viewport: [f64; 2], style: &TagStyle) -> Vec<PlacedTag> {
    let mut out = Vec::new();
    let mut occupied: HashSet<u64> = HashSet::new();

    for tag in requests {
        if out.len() >= style.max_tags {
            break;
        }
        let text = tag.text.trim();
        if text.is_empty() || tag.position == TagPosition::Hidden {
            continue;
        }
        if !tag.anchor.x.is_finite() || !tag.anchor.y.is_finite() {
            continue;
        }

        let size = estimate_text_size(text, style.font_size_px);
        let center = tag_center(tag, size, style.padding_px);
        let half_w = size[0] * 0.5 + style.padding_px;
        let half_h = size[1] * 0.5 + style.padding_px;

        if center.x + half_w < 0.0
            || center.y + half_h < 0.0
            || center.x - half_w > viewport[0]
            || center.y - half_h > viewport[1]
        {
            continue;
        }

        if !try_place(&mut occupied, center, [half_w, half_h], style.cell_px) {
            continue;
        }

        out.push(PlacedTag {
            text: text.to_owned(),
            at: Vec2::new(center.x - size[0] * 0.5, center.y - size[1] * 0.5),
            size,
        });
    }

    out
}

fn tag_center(tag: &TagRequest, size: [f64; 2], padding: f64) -> Vec2 {
    let gap = tag.clearance_px * 0.5 + padding;
    let (dx, dy) = match tag.position {
        TagPosition::Right => (gap + size[0] * 0.5, 0.0),
        TagPosition::Left => (-(gap + size[0] * 0.5), 0.0),
        TagPosition::Above => (0.0, -(gap + size[1] * 0.5)),
        TagPosition::Below => (0.0, gap + size[1] * 0.5),
        TagPosition::Hidden => (0.0, 0.0),
    };
    Vec2::new(tag.anchor.x + dx, tag.anchor.y + dy)
}

pub fn estimate_text_size(text: &str, font_size_px: f64) -> [f64; 2] {
    let count = text.chars().count().max(1) as f64;
    [font_size_px * 0.6 * count, font_size_px]
}

fn try_place(occupied: &mut HashSet<u64>, center: Vec2, half_size: [f64; 2], cell_px: f64) -> bool {
    let cell_px = cell_px.max(1.0);
    let min_x = ((center.x - half_size[0]) / cell_px).floor() as i32;
    let max_x = ((center.x + half_size[0]) / cell_px).floor() as i32;
    let min_y = ((center.y - half_size[1]) / cell_px).floor() as i32;
    let max_y = ((center.y + half_size[1]) / cell_px).floor() as i32;

    for cy in min_y..=max_y {
        for cx in min_x..=max_x {
            if occupied.contains(&cell_key(cx, cy)) {
                return false;
            }
        }
    }

    for cy in min_y..=max_y {
        for cx in min_x..=max_x {
            occupied.insert(cell_key(cx, cy));
        }
    }

    true
}

fn cell_key(cx: i32, cy: i32) -> u64 {
    ((cx as u64) << 32) ^ (cy as u32 as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(text: &str, x: f64, y: f64, position: TagPosition) -> TagRequest {
        TagRequest {
            text: text.into(),
            anchor: Vec2::new(x, y),
            position,
            clearance_px: 8.0,
        }
    }

    #[test]
    fn tags_sit_on_the_requested_side() {
        let style = TagStyle::default();
        let placed = layout_tags(
            &[
                request("EAST", 100.0, 100.0, TagPosition::Right),
                request("WEST", 300.0, 100.0, TagPosition::Left),
                request("TOP", 100.0, 300.0, TagPosition::Above),
            ],
            [500.0, 500.0],
            &style,
        );
        assert_eq!(placed.len(), 3);
        assert!(placed[0].at.x > 100.0);
        assert!(placed[1].at.x + placed[1].size[0] < 300.0);
        assert!(placed[2].at.y + placed[2].size[1] < 300.0);
    }

    #[test]
    fn overlapping_tags_are_dropped() {
        let placed = layout_tags(
            &[
                request("ALPHA", 50.0, 50.0, TagPosition::Right),
                request("BETA", 50.0, 50.0, TagPosition::Right),
            ],
            [200.0, 200.0],
            &TagStyle::default(),
        );
        assert_eq!(placed.len(), 1);
        assert_eq!(placed[0].text, "ALPHA");
    }

    #[test]
    fn hidden_blank_and_offscreen_tags_are_skipped() {
        let placed = layout_tags(
            &[
                request("A", 50.0, 50.0, TagPosition::Hidden),
                request("   ", 80.0, 80.0, TagPosition::Right),
                request("FAR", 5_000.0, 50.0, TagPosition::Right),
            ],
            [200.0, 200.0],
            &TagStyle::default(),
        );
        assert!(placed.is_empty());
    }
}
