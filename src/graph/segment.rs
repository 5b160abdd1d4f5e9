use super::vertex::VertexId;

slotmap::new_key_type! {
    /// Unique identifier for a segment in the trace graph.
    pub struct SegmentId;
}

/// Board layer an object is drawn on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Layer {
    TopCopper,
    BottomCopper,
    Inner1,
    Inner2,
    SilkTop,
    SilkBottom,
}

/// Curve type of a drawn segment.
///
/// Copper traces are always [`SegmentStyle::Straight`]; the arc styles are
/// meaningful for outline lines only.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SegmentStyle {
    #[default]
    Straight,
    ArcCw,
    ArcCcw,
}

/// Drawing attributes shared by trace segments and outline lines.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SegmentAttrs {
    /// Board layer.
    pub layer: Layer,
    /// Stroke width in board units (positive).
    pub width: i32,
    /// Curve type.
    pub style: SegmentStyle,
}

impl SegmentAttrs {
    /// Creates straight-line attributes on the given layer and width.
    ///
    /// # Panics
    ///
    /// Debug builds panic when `width` is not positive.
    #[must_use]
    pub fn new(layer: Layer, width: i32) -> Self {
        debug_assert!(width > 0, "width must be positive, got {width}");
        Self {
            layer,
            width,
            style: SegmentStyle::Straight,
        }
    }

    /// Returns a copy with a different curve type.
    #[must_use]
    pub fn with_style(self, style: SegmentStyle) -> Self {
        Self { style, ..self }
    }
}

/// Data associated with a trace segment: an edge between two distinct
/// vertices plus its drawing attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentData {
    /// First endpoint.
    pub v1: VertexId,
    /// Second endpoint.
    pub v2: VertexId,
    /// Layer, width and curve type.
    pub attrs: SegmentAttrs,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "width must be positive")]
    #[cfg(debug_assertions)]
    fn zero_width_attrs_are_rejected() {
        let _ = SegmentAttrs::new(Layer::TopCopper, 0);
    }
}
