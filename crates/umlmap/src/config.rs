//! Configuration types for model rendering.
//!
//! This module provides configuration structures that control how the
//! force-directed layout behaves and how the result is styled. All types
//! implement [`serde::Deserialize`] for loading from external sources; every
//! field has a default, so a partial file only overrides what it names.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining layout and style settings.
//! - [`LayoutConfig`] - Force constants, cooling schedule, canvas and timing.
//! - [`StyleConfig`] - Background, stereotype palette and node sizing.
//!
//! # Example
//!
//! ```
//! # use umlmap::config::AppConfig;
//! let config = AppConfig::default();
//! assert!(config.style().background_color().is_ok());
//! assert!(config.layout().sticky());
//! ```

use std::time::Duration;

use serde::Deserialize;

use umlmap_core::{
    color::{Color, Palette},
    geometry::Size,
};

/// Top-level application configuration combining layout and style settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Layout configuration section.
    #[serde(default)]
    layout: LayoutConfig,

    /// Style configuration section.
    #[serde(default)]
    style: StyleConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] with the specified layout and style configurations.
    pub fn new(layout: LayoutConfig, style: StyleConfig) -> Self {
        Self { layout, style }
    }

    /// Returns the layout configuration.
    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Returns the style configuration.
    pub fn style(&self) -> &StyleConfig {
        &self.style
    }
}

/// Force constants and simulation schedule.
///
/// Distances are in canvas units. Strengths follow the usual velocity-Verlet
/// conventions: a negative charge repels, link strength is derived from node
/// degree unless overridden.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    width: f32,
    height: f32,
    margin: f32,

    link_distance: f32,
    same_parent_distance: f32,
    nested_package_distance: f32,
    link_strength: Option<f32>,
    group_strength: f32,

    charge_strength: f32,
    distance_min: f32,

    collide_margin: f32,
    collide_strength: f32,
    collide_iterations: usize,

    center_strength: f32,

    alpha_min: f32,
    alpha_decay: Option<f32>,
    velocity_decay: f32,
    filter_reheat: f32,
    drag_alpha_target: f32,

    sticky: bool,
    tick_interval_ms: u64,
    debounce_ms: u64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            margin: 20.0,
            link_distance: 120.0,
            same_parent_distance: 40.0,
            nested_package_distance: 80.0,
            link_strength: None,
            group_strength: 0.3,
            charge_strength: -30.0,
            distance_min: 1.0,
            collide_margin: 10.0,
            collide_strength: 0.7,
            collide_iterations: 3,
            center_strength: 1.0,
            alpha_min: 0.001,
            alpha_decay: None,
            velocity_decay: 0.4,
            filter_reheat: 0.3,
            drag_alpha_target: 0.3,
            sticky: true,
            tick_interval_ms: 16,
            debounce_ms: 100,
        }
    }
}

impl LayoutConfig {
    /// Returns a copy with the canvas set to `size`.
    pub fn with_canvas(mut self, size: Size) -> Self {
        self.width = size.width();
        self.height = size.height();
        self
    }

    /// Returns a copy with sticky mode set.
    pub fn with_sticky(mut self, sticky: bool) -> Self {
        self.sticky = sticky;
        self
    }

    /// Returns a copy with collision settings replaced.
    pub fn with_collide(mut self, margin: f32, strength: f32, iterations: usize) -> Self {
        self.collide_margin = margin;
        self.collide_strength = strength;
        self.collide_iterations = iterations;
        self
    }

    /// Canvas the simulation lays out into.
    pub fn canvas(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Gap kept between node boxes and the canvas edge.
    pub fn margin(&self) -> f32 {
        self.margin
    }

    pub fn link_distance(&self) -> f32 {
        self.link_distance
    }

    /// Target distance of links whose ends share a parent package.
    pub fn same_parent_distance(&self) -> f32 {
        self.same_parent_distance
    }

    /// Target distance between a package anchor and its parent package.
    pub fn nested_package_distance(&self) -> f32 {
        self.nested_package_distance
    }

    /// Fixed link strength; `None` derives it from node degree.
    pub fn link_strength(&self) -> Option<f32> {
        self.link_strength
    }

    pub fn group_strength(&self) -> f32 {
        self.group_strength
    }

    pub fn charge_strength(&self) -> f32 {
        self.charge_strength
    }

    pub fn distance_min(&self) -> f32 {
        self.distance_min
    }

    pub fn collide_margin(&self) -> f32 {
        self.collide_margin
    }

    pub fn collide_strength(&self) -> f32 {
        self.collide_strength
    }

    pub fn collide_iterations(&self) -> usize {
        self.collide_iterations
    }

    pub fn center_strength(&self) -> f32 {
        self.center_strength
    }

    /// Energy below which the simulation stops.
    pub fn alpha_min(&self) -> f32 {
        self.alpha_min
    }

    /// Per-tick cooling factor.
    ///
    /// Defaults to the rate that reaches [`alpha_min`](Self::alpha_min) in
    /// 300 ticks.
    pub fn alpha_decay(&self) -> f32 {
        self.alpha_decay
            .unwrap_or_else(|| 1.0 - self.alpha_min.powf(1.0 / 300.0))
    }

    /// Fraction of velocity lost per tick.
    pub fn velocity_decay(&self) -> f32 {
        self.velocity_decay
    }

    /// Energy the simulation is reheated to when the visible set changes.
    pub fn filter_reheat(&self) -> f32 {
        self.filter_reheat
    }

    /// Energy the simulation is held at while a node is dragged.
    pub fn drag_alpha_target(&self) -> f32 {
        self.drag_alpha_target
    }

    /// Whether nodes are pinned in place once the first layout settles.
    pub fn sticky(&self) -> bool {
        self.sticky
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Quiet period before a burst of filter toggles is applied.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Visual styling configuration for rendered diagrams.
///
/// Fields that are not set fall back to renderer defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    /// Background color for diagrams, as a color string.
    background_color: Option<String>,

    /// Stereotype palette as color strings; empty means the built-in palette.
    palette: Vec<String>,

    font_size: f32,
    char_width: f32,
    line_height: f32,
    padding: f32,
    max_members: usize,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            background_color: None,
            palette: Vec::new(),
            font_size: 12.0,
            char_width: 7.0,
            line_height: 16.0,
            padding: 6.0,
            max_members: 12,
        }
    }
}

impl StyleConfig {
    /// Returns the parsed background [`Color`], or `None` if no color is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string cannot be parsed
    /// into a valid [`Color`].
    pub fn background_color(&self) -> Result<Option<Color>, String> {
        self.background_color
            .as_ref()
            .map(|color| Color::new(color))
            .transpose()
            .map_err(|err| format!("Invalid background color in config: {err}"))
    }

    /// Returns the stereotype [`Palette`].
    ///
    /// # Errors
    ///
    /// Returns an error if any configured palette entry is not a valid color.
    pub fn palette(&self) -> Result<Palette, String> {
        if self.palette.is_empty() {
            return Ok(Palette::default());
        }
        Palette::from_strings(&self.palette)
            .map_err(|err| format!("Invalid palette in config: {err}"))
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    /// Approximate advance of one character, used to size class boxes.
    pub fn char_width(&self) -> f32 {
        self.char_width
    }

    pub fn line_height(&self) -> f32 {
        self.line_height
    }

    pub fn padding(&self) -> f32 {
        self.padding
    }

    /// Members listed in a class box before the rest are elided.
    pub fn max_members(&self) -> usize {
        self.max_members
    }
}
