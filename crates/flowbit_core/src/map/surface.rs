//! Rendering-sink contract for the map widget.
//!
//! # Responsibility
//! - Define the one-way drawing interface the adapter renders through.
//! - Provide a command-recording implementation for the UI bridge and for
//!   tests.
//!
//! # Invariants
//! - Handles are issued by the surface and are only meaningful to the
//!   surface that issued them; the adapter's side table is rebuilt from
//!   scratch on every re-sync.

use geojson::Feature;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Opaque identifier for one rendered layer (marker or vector shape).
pub type LayerHandle = u64;

/// Drawing tools exposed by the toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawTool {
    Marker,
    Polygon,
    Polyline,
    Rectangle,
}

impl DrawTool {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Marker => "marker",
            Self::Polygon => "polygon",
            Self::Polyline => "polyline",
            Self::Rectangle => "rectangle",
        }
    }

    /// Parses the stable tool id used across the FFI boundary.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "marker" => Some(Self::Marker),
            "polygon" => Some(Self::Polygon),
            "polyline" => Some(Self::Polyline),
            "rectangle" => Some(Self::Rectangle),
            _ => None,
        }
    }
}

impl Display for DrawTool {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Surface-level failure, always recoverable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    /// The widget's drawing toolkit has no handler for this tool.
    ToolUnavailable(DrawTool),
    /// The shape payload could not be rendered.
    InvalidShape(String),
}

impl Display for SurfaceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ToolUnavailable(tool) => write!(f, "draw tool `{tool}` is unavailable"),
            Self::InvalidShape(message) => write!(f, "shape cannot be rendered: {message}"),
        }
    }
}

impl Error for SurfaceError {}

/// One-way rendering sink over the map widget.
///
/// Implementations never report widget state back; gestures arrive through
/// the adapter's event entry points instead.
pub trait MapSurface {
    /// Removes every marker and vector layer.
    fn clear_layers(&mut self);
    /// Renders a marker with a popup label; infallible by contract.
    fn add_marker(&mut self, lat: f64, lng: f64, label: &str) -> LayerHandle;
    /// Renders a vector shape from its GeoJSON feature.
    fn add_shape(&mut self, feature: &Feature) -> Result<LayerHandle, SurfaceError>;
    /// Re-centers the view.
    fn set_view(&mut self, lat: f64, lng: f64, zoom: u8);
    /// Enables the toolkit's native gesture handler for a tool.
    fn arm_draw_tool(&mut self, tool: DrawTool) -> Result<(), SurfaceError>;
    /// Enables the tool through the toolkit's internal toolbar handler, the
    /// fallback path when native handler construction is unavailable.
    fn arm_draw_tool_via_toolbar(&mut self, tool: DrawTool) -> Result<(), SurfaceError> {
        Err(SurfaceError::ToolUnavailable(tool))
    }
}

/// Typed drawing command recorded by [`BufferedSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCommand {
    ClearLayers,
    AddMarker {
        handle: LayerHandle,
        lat: f64,
        lng: f64,
        label: String,
    },
    AddShape {
        handle: LayerHandle,
        geojson: String,
    },
    SetView {
        lat: f64,
        lng: f64,
        zoom: u8,
    },
    ArmDrawTool {
        tool: DrawTool,
    },
}

/// Command-recording surface.
///
/// The FFI shell drains the buffer and replays it onto the real widget;
/// tests assert on it directly. Handles are issued sequentially and never
/// reused within one surface.
#[derive(Debug, Default)]
pub struct BufferedSurface {
    commands: Vec<SurfaceCommand>,
    next_handle: LayerHandle,
}

impl BufferedSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands recorded since the last drain.
    pub fn commands(&self) -> &[SurfaceCommand] {
        &self.commands
    }

    /// Takes the recorded commands, leaving the buffer empty.
    pub fn drain(&mut self) -> Vec<SurfaceCommand> {
        std::mem::take(&mut self.commands)
    }

    fn issue_handle(&mut self) -> LayerHandle {
        self.next_handle += 1;
        self.next_handle
    }
}

impl MapSurface for BufferedSurface {
    fn clear_layers(&mut self) {
        self.commands.push(SurfaceCommand::ClearLayers);
    }

    fn add_marker(&mut self, lat: f64, lng: f64, label: &str) -> LayerHandle {
        let handle = self.issue_handle();
        self.commands.push(SurfaceCommand::AddMarker {
            handle,
            lat,
            lng,
            label: label.to_string(),
        });
        handle
    }

    fn add_shape(&mut self, feature: &Feature) -> Result<LayerHandle, SurfaceError> {
        if feature.geometry.is_none() {
            return Err(SurfaceError::InvalidShape("feature has no geometry".into()));
        }
        let handle = self.issue_handle();
        self.commands.push(SurfaceCommand::AddShape {
            handle,
            geojson: feature.to_string(),
        });
        Ok(handle)
    }

    fn set_view(&mut self, lat: f64, lng: f64, zoom: u8) {
        self.commands.push(SurfaceCommand::SetView { lat, lng, zoom });
    }

    fn arm_draw_tool(&mut self, tool: DrawTool) -> Result<(), SurfaceError> {
        self.commands.push(SurfaceCommand::ArmDrawTool { tool });
        Ok(())
    }
}
