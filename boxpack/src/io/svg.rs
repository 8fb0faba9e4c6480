use std::fmt::{Display, Formatter};

use itertools::Itertools;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use svg::Document;
use svg::node::element::{Group, Rectangle, Text, Title};

use crate::entities::BPSolution;
use crate::geometry::PlacedRect;
use crate::io::debug::DebugVisualizer;

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize, Copy)]
pub struct SvgDrawOptions {
    ///The theme to use for the svg
    #[serde(default)]
    pub theme: SvgTheme,
    ///Draw the intersection of overlapping boxes on top
    #[serde(default)]
    pub highlight_overlap: bool,
    ///Draw whatever the optimizer sent to its debug visualizer on top
    #[serde(default)]
    pub debug_overlay: bool,
}

impl Default for SvgDrawOptions {
    fn default() -> Self {
        Self {
            theme: SvgTheme::default(),
            highlight_overlap: true,
            debug_overlay: false,
        }
    }
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize, Copy)]
pub struct SvgTheme {
    pub stroke_width_multiplier: f32,
    pub container_fill: Color,
    pub box_fill: Color,
    pub overlap_highlight_color: Color,
    pub debug_color: Color,
}

impl Default for SvgTheme {
    fn default() -> Self {
        SvgTheme::EARTH_TONES
    }
}

impl SvgTheme {
    pub const EARTH_TONES: SvgTheme = SvgTheme {
        stroke_width_multiplier: 2.0,
        container_fill: Color(0xCC, 0x82, 0x4A),
        box_fill: Color(0xFF, 0xC8, 0x79),
        overlap_highlight_color: Color(0x00, 0xFF, 0x00), // LIME
        debug_color: Color(0x00, 0x5F, 0xFF),
    };

    pub const GRAY: SvgTheme = SvgTheme {
        stroke_width_multiplier: 2.5,
        container_fill: Color(0xD3, 0xD3, 0xD3),
        box_fill: Color(0x7A, 0x7A, 0x7A),
        overlap_highlight_color: Color(0xD0, 0x00, 0x00), // RED
        debug_color: Color(0x00, 0x00, 0x00),
    };
}

/// Renders container `ci` of `solution`.
/// The optional overlay of `debug` is only drawn if enabled in `options`.
pub fn container_to_svg(
    solution: &BPSolution,
    ci: usize,
    options: SvgDrawOptions,
    debug: &dyn DebugVisualizer,
) -> Document {
    let size = solution.container_size as f32;
    let boxes = &solution.containers[ci];
    let theme = &options.theme;
    let margin = size * 0.025;
    let stroke_width = size * 0.001 * theme.stroke_width_multiplier;

    let container_group = Group::new()
        .set("id", format!("container_{ci}"))
        .add(
            Rectangle::new()
                .set("width", size)
                .set("height", size)
                .set("fill", format!("{}", theme.container_fill))
                .set("stroke", "black")
                .set("stroke-width", 2.0 * stroke_width),
        )
        .add(Title::new(format!(
            "container {ci}, size: {size}, density: {:.3}",
            solution.container_density(ci)
        )));

    let boxes_group = boxes.iter().enumerate().fold(
        Group::new().set("id", "boxes"),
        |group, (i, b)| {
            group.add(
                rect_element(b)
                    .set("fill", format!("{}", theme.box_fill))
                    .set("stroke", "black")
                    .set("stroke-width", stroke_width)
                    .set("opacity", 0.9)
                    .add(Title::new(format!("box {i}: {b}"))),
            )
        },
    );

    let overlap_group = match options.highlight_overlap {
        false => None,
        true => {
            let group = boxes
                .iter()
                .tuple_combinations()
                .filter_map(|(a, b)| a.intersection_rect(b))
                .fold(Group::new().set("id", "overlap"), |group, r| {
                    group.add(
                        rect_element(&r)
                            .set("fill", format!("{}", theme.overlap_highlight_color))
                            .set("fill-opacity", 0.8),
                    )
                });
            Some(group)
        }
    };

    let debug_group = match options.debug_overlay {
        false => None,
        true => debug.overlay(ci, theme.debug_color, stroke_width),
    };

    let label = Text::new(format!(
        "#{ci}: {} boxes, density {:.3}",
        boxes.len(),
        solution.container_density(ci)
    ))
    .set("x", 0)
    .set("y", -margin * 0.3)
    .set("font-size", margin * 0.6)
    .set("font-family", "monospace");

    let optionals = [overlap_group, debug_group]
        .into_iter()
        .flatten()
        .fold(Group::new().set("id", "optionals"), |g, opt| g.add(opt));

    let vbox = (-margin, -margin, size + 2.0 * margin, size + 2.0 * margin);

    Document::new()
        .set("viewBox", vbox)
        .add(container_group)
        .add(boxes_group)
        .add(optionals)
        .add(label)
}

pub fn rect_element(r: &PlacedRect) -> Rectangle {
    Rectangle::new()
        .set("x", r.x)
        .set("y", r.y)
        .set("width", r.w)
        .set("height", r.h)
}

#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Color(u8, u8, u8);

impl Display for Color {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

impl TryFrom<&str> for Color {
    type Error = anyhow::Error;

    fn try_from(s: &str) -> anyhow::Result<Self> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        anyhow::ensure!(hex.len() == 6 && hex.is_ascii(), "invalid color: {s}");
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);
        Ok(Color(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl Serialize for Color {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{self}"))
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Color::try_from(s.as_str()).map_err(serde::de::Error::custom)
    }
}
