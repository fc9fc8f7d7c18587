//! The closed set of element and attribute names that the parser understands.
//!
//! Names are matched exactly, with their case.  Anything else is either skipped
//! together with its subtree (for elements) or dropped (for attributes).

/// Element names.
///
/// `Unknown` never appears in a document tree; the parser uses it to decide that
/// an element and all of its descendants are to be skipped.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ElementName {
    Circle,
    ClipPath,
    Defs,
    Ellipse,
    G,
    Image,
    Line,
    LinearGradient,
    Path,
    Polygon,
    Polyline,
    RadialGradient,
    Rect,
    Stop,
    Svg,
    Symbol,
    Use,
    Unknown,
}

impl ElementName {
    pub fn from_name(name: &str) -> ElementName {
        use ElementName::*;

        match name {
            "circle" => Circle,
            "clipPath" => ClipPath,
            "defs" => Defs,
            "ellipse" => Ellipse,
            "g" => G,
            "image" => Image,
            "line" => Line,
            "linearGradient" => LinearGradient,
            "path" => Path,
            "polygon" => Polygon,
            "polyline" => Polyline,
            "radialGradient" => RadialGradient,
            "rect" => Rect,
            "stop" => Stop,
            "svg" => Svg,
            "symbol" => Symbol,
            "use" => Use,
            _ => Unknown,
        }
    }

    pub fn name(self) -> &'static str {
        use ElementName::*;

        match self {
            Circle => "circle",
            ClipPath => "clipPath",
            Defs => "defs",
            Ellipse => "ellipse",
            G => "g",
            Image => "image",
            Line => "line",
            LinearGradient => "linearGradient",
            Path => "path",
            Polygon => "polygon",
            Polyline => "polyline",
            RadialGradient => "radialGradient",
            Rect => "rect",
            Stop => "stop",
            Svg => "svg",
            Symbol => "symbol",
            Use => "use",
            Unknown => "unknown",
        }
    }

    pub fn is_gradient(self) -> bool {
        matches!(self, ElementName::LinearGradient | ElementName::RadialGradient)
    }
}

/// Attribute names, including the presentation attributes that may also
/// appear as declarations inside `style=""`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AttributeId {
    ClipPath,
    ClipPathUnits,
    ClipRule,
    Color,
    Cx,
    Cy,
    D,
    Display,
    Fill,
    FillOpacity,
    FillRule,
    Fx,
    Fy,
    GradientTransform,
    GradientUnits,
    Height,
    Href,
    Id,
    Offset,
    Opacity,
    Points,
    PreserveAspectRatio,
    R,
    Rx,
    Ry,
    SpreadMethod,
    StopColor,
    StopOpacity,
    Stroke,
    StrokeDasharray,
    StrokeDashoffset,
    StrokeLinecap,
    StrokeLinejoin,
    StrokeMiterlimit,
    StrokeOpacity,
    StrokeWidth,
    Style,
    Transform,
    ViewBox,
    Visibility,
    Width,
    X,
    X1,
    X2,
    Y,
    Y1,
    Y2,
}

impl AttributeId {
    /// Looks up the name of a markup attribute.  `xlink:href` is the same as `href`.
    pub fn from_attribute_name(name: &str) -> Option<AttributeId> {
        use AttributeId::*;

        let id = match name {
            "clipPathUnits" => ClipPathUnits,
            "cx" => Cx,
            "cy" => Cy,
            "d" => D,
            "fx" => Fx,
            "fy" => Fy,
            "gradientTransform" => GradientTransform,
            "gradientUnits" => GradientUnits,
            "height" => Height,
            "href" | "xlink:href" => Href,
            "id" => Id,
            "offset" => Offset,
            "points" => Points,
            "preserveAspectRatio" => PreserveAspectRatio,
            "r" => R,
            "rx" => Rx,
            "ry" => Ry,
            "spreadMethod" => SpreadMethod,
            "style" => Style,
            "transform" => Transform,
            "viewBox" => ViewBox,
            "width" => Width,
            "x" => X,
            "x1" => X1,
            "x2" => X2,
            "y" => Y,
            "y1" => Y1,
            "y2" => Y2,
            _ => return AttributeId::from_property_name(name),
        };

        Some(id)
    }

    /// Looks up the name of a declaration inside a `style` attribute.
    ///
    /// Only presentation attributes are accepted here; geometry like `x` or
    /// `width` cannot be set from `style`.
    pub fn from_property_name(name: &str) -> Option<AttributeId> {
        use AttributeId::*;

        let id = match name {
            "clip-path" => ClipPath,
            "clip-rule" => ClipRule,
            "color" => Color,
            "display" => Display,
            "fill" => Fill,
            "fill-opacity" => FillOpacity,
            "fill-rule" => FillRule,
            "opacity" => Opacity,
            "stop-color" => StopColor,
            "stop-opacity" => StopOpacity,
            "stroke" => Stroke,
            "stroke-dasharray" => StrokeDasharray,
            "stroke-dashoffset" => StrokeDashoffset,
            "stroke-linecap" => StrokeLinecap,
            "stroke-linejoin" => StrokeLinejoin,
            "stroke-miterlimit" => StrokeMiterlimit,
            "stroke-opacity" => StrokeOpacity,
            "stroke-width" => StrokeWidth,
            "visibility" => Visibility,
            _ => return None,
        };

        Some(id)
    }

    pub fn name(self) -> &'static str {
        use AttributeId::*;

        match self {
            ClipPath => "clip-path",
            ClipPathUnits => "clipPathUnits",
            ClipRule => "clip-rule",
            Color => "color",
            Cx => "cx",
            Cy => "cy",
            D => "d",
            Display => "display",
            Fill => "fill",
            FillOpacity => "fill-opacity",
            FillRule => "fill-rule",
            Fx => "fx",
            Fy => "fy",
            GradientTransform => "gradientTransform",
            GradientUnits => "gradientUnits",
            Height => "height",
            Href => "href",
            Id => "id",
            Offset => "offset",
            Opacity => "opacity",
            Points => "points",
            PreserveAspectRatio => "preserveAspectRatio",
            R => "r",
            Rx => "rx",
            Ry => "ry",
            SpreadMethod => "spreadMethod",
            StopColor => "stop-color",
            StopOpacity => "stop-opacity",
            Stroke => "stroke",
            StrokeDasharray => "stroke-dasharray",
            StrokeDashoffset => "stroke-dashoffset",
            StrokeLinecap => "stroke-linecap",
            StrokeLinejoin => "stroke-linejoin",
            StrokeMiterlimit => "stroke-miterlimit",
            StrokeOpacity => "stroke-opacity",
            StrokeWidth => "stroke-width",
            Style => "style",
            Transform => "transform",
            ViewBox => "viewBox",
            Visibility => "visibility",
            Width => "width",
            X => "x",
            X1 => "x1",
            X2 => "x2",
            Y => "y",
            Y1 => "y1",
            Y2 => "y2",
        }
    }
}
