use serde::{Deserialize, Serialize};

/// Pixel dimensions of the analysed image. Echoed into the scene untouched,
/// so integers stay integers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub w: serde_json::Number,
    pub h: serde_json::Number,
}

impl ImageSize {
    pub fn new(w: u64, h: u64) -> Self {
        Self {
            w: w.into(),
            h: h.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Furniture,
    Food,
    Plant,
    Electric,
    Other,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Furniture => "furniture",
            Category::Food => "food",
            Category::Plant => "plant",
            Category::Electric => "electric",
            Category::Other => "other",
        }
    }

    /// Hazardous terrain, suitable for enemy placement.
    pub fn is_enemy_anchor(self) -> bool {
        matches!(self, Category::Plant | Category::Electric)
    }
}

/// Axis-aligned box in normalized image coordinates, origin top-left, y down.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Bounds {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.w / 2.0
    }

    /// Open-interval overlap of the horizontal extents.
    pub fn overlaps_x(&self, other: &Bounds) -> bool {
        self.x < other.right() && other.x < self.right()
    }

    /// Clamp into the unit square so that the box never leaves the image.
    /// Non-finite components collapse to 0.
    pub fn clamped_to_unit(&self) -> Bounds {
        let x = finite_or_zero(self.x).clamp(0.0, 1.0);
        let y = finite_or_zero(self.y).clamp(0.0, 1.0);
        let w = finite_or_zero(self.w).clamp(0.0, 1.0 - x);
        let h = finite_or_zero(self.h).clamp(0.0, 1.0 - y);
        Bounds { x, y, w, h }
    }
}

pub(crate) fn finite_or_zero(v: f32) -> f32 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub label: String,
    pub category: Category,
    pub confidence: f32,
    #[serde(rename = "bounds_normalized", alias = "bounds")]
    pub bounds: Bounds,
}

/// What the perception service returns for one image.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectionResponse {
    pub image: ImageSize,
    #[serde(default)]
    pub detections: Vec<Detection>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_perception_payload() {
        let json = r#"{
            "image": { "w": 640, "h": 480 },
            "detections": [
                { "label": "sofa", "category": "furniture", "confidence": 0.9,
                  "bounds_normalized": { "x": 0.1, "y": 0.6, "w": 0.4, "h": 0.3 } },
                { "label": "apple", "category": "food", "confidence": 0.7,
                  "bounds_normalized": { "x": 0.5, "y": 0.5, "w": 0.05, "h": 0.05 } }
            ]
        }"#;
        let resp: DetectionResponse = serde_json::from_str(json).expect("parse");
        assert_eq!(resp.image, ImageSize::new(640, 480));
        assert_eq!(resp.detections.len(), 2);
        assert_eq!(resp.detections[0].category, Category::Furniture);
        assert_eq!(resp.detections[1].category, Category::Food);
        assert_eq!(resp.detections[0].bounds.w, 0.4);
    }

    #[test]
    fn image_size_echoes_exactly() {
        let big = r#"{"w":33554433,"h":480}"#;
        let size: ImageSize = serde_json::from_str(big).expect("parse");
        assert_eq!(serde_json::to_string(&size).expect("serialize"), big);

        let fractional: ImageSize = serde_json::from_str(r#"{"w":640.5,"h":480}"#).expect("parse");
        assert_eq!(fractional.w.as_f64(), Some(640.5));
    }

    #[test]
    fn unknown_category_is_rejected() {
        let json = r#"{ "label": "x", "category": "vehicle", "confidence": 0.5,
                        "bounds_normalized": { "x": 0, "y": 0, "w": 0, "h": 0 } }"#;
        assert!(serde_json::from_str::<Detection>(json).is_err());
    }

    #[test]
    fn overlap_is_open_interval() {
        let a = Bounds::new(0.0, 0.5, 0.2, 0.03);
        let touching = Bounds::new(0.2, 0.5, 0.2, 0.03);
        let inside = Bounds::new(0.1, 0.5, 0.2, 0.03);
        assert!(!a.overlaps_x(&touching));
        assert!(a.overlaps_x(&inside));
    }

    #[test]
    fn unit_clamp_keeps_box_inside_image() {
        let b = Bounds::new(0.9, -0.2, 0.5, f32::NAN).clamped_to_unit();
        assert_eq!(b.x, 0.9);
        assert_eq!(b.y, 0.0);
        assert!((b.right() - 1.0).abs() < 1e-6);
        assert_eq!(b.h, 0.0);
    }

    #[test]
    fn anchor_categories() {
        assert!(Category::Plant.is_enemy_anchor());
        assert!(Category::Electric.is_enemy_anchor());
        assert!(!Category::Furniture.is_enemy_anchor());
        assert!(!Category::Other.is_enemy_anchor());
    }
}
