//! Garment model settings: 3D preview parameters, fabric presets and
//! which template parts can be recolored.

use serde::{Deserialize, Serialize};

use crate::element::GarmentColors;

/// Neckline style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CollarType {
    /// Round neck.
    Round,
    /// V-neck.
    VNeck,
    /// Polo collar.
    Polo,
    /// Henley placket.
    Henley,
    /// Crew neck.
    #[default]
    Crew,
}

/// Sleeve style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SleeveType {
    /// Short sleeves.
    #[default]
    Short,
    /// Long sleeves.
    Long,
    /// No sleeves.
    Sleeveless,
    /// Raglan sleeves.
    Raglan,
}

/// Garment fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitType {
    /// Regular fit.
    #[default]
    Regular,
    /// Slim fit.
    Slim,
    /// Oversized fit.
    Oversized,
    /// Relaxed fit.
    Relaxed,
}

/// Recolorable garment part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GarmentPart {
    /// Main body panel.
    Body,
    /// Sleeves.
    Sleeves,
    /// Collar.
    Collar,
    /// Decorative stripes.
    StripesColor,
}

/// Material descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FabricProperties {
    /// Display name.
    pub name: String,
    /// Texture key.
    pub texture: String,
    /// Surface roughness (0-1).
    pub roughness: f32,
    /// Surface metalness (0-1).
    pub metalness: f32,
}

impl FabricProperties {
    /// Look up a named fabric preset. Unknown names fall back to cotton.
    #[must_use]
    pub fn preset(name: &str) -> Self {
        let (name, texture, roughness, metalness) = match name {
            "Polyester" => ("Polyester", "polyester", 0.5, 0.2),
            "Linen" => ("Linen", "linen", 0.9, 0.05),
            "Bamboo" => ("Bamboo", "bamboo", 0.6, 0.15),
            _ => ("Cotton", "cotton", 0.8, 0.1),
        };
        Self {
            name: name.to_string(),
            texture: texture.to_string(),
            roughness,
            metalness,
        }
    }
}

impl Default for FabricProperties {
    fn default() -> Self {
        Self::preset("Cotton")
    }
}

/// Parameters of the 3D garment preview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelSettings {
    /// Per-part colors.
    pub colors: GarmentColors,
    /// Texture map reference.
    pub texture: Option<String>,
    /// Normal map reference.
    pub normal: Option<String>,
    /// Surface roughness.
    pub roughness: f32,
    /// Surface metalness.
    pub metalness: f32,
    /// Neckline style.
    pub collar_type: CollarType,
    /// Sleeve style.
    pub sleeve_type: SleeveType,
    /// Fit.
    pub fit_type: FitType,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            colors: GarmentColors::default(),
            texture: None,
            normal: None,
            roughness: 0.5,
            metalness: 0.1,
            collar_type: CollarType::default(),
            sleeve_type: SleeveType::default(),
            fit_type: FitType::default(),
        }
    }
}

/// Partial update for [`ModelSettings`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ModelSettingsPatch {
    /// New colors.
    pub colors: Option<GarmentColors>,
    /// New texture reference.
    pub texture: Option<String>,
    /// New normal map reference.
    pub normal: Option<String>,
    /// New roughness.
    pub roughness: Option<f32>,
    /// New metalness.
    pub metalness: Option<f32>,
    /// New collar type.
    pub collar_type: Option<CollarType>,
    /// New sleeve type.
    pub sleeve_type: Option<SleeveType>,
    /// New fit type.
    pub fit_type: Option<FitType>,
}

impl ModelSettings {
    /// Merge a partial update.
    pub fn update(&mut self, patch: ModelSettingsPatch) {
        if let Some(colors) = patch.colors {
            self.colors = colors;
        }
        if patch.texture.is_some() {
            self.texture = patch.texture;
        }
        if patch.normal.is_some() {
            self.normal = patch.normal;
        }
        if let Some(roughness) = patch.roughness {
            self.roughness = roughness;
        }
        if let Some(metalness) = patch.metalness {
            self.metalness = metalness;
        }
        if let Some(collar_type) = patch.collar_type {
            self.collar_type = collar_type;
        }
        if let Some(sleeve_type) = patch.sleeve_type {
            self.sleeve_type = sleeve_type;
        }
        if let Some(fit_type) = patch.fit_type {
            self.fit_type = fit_type;
        }
    }

    /// Recolor one garment part.
    pub fn set_part_color(&mut self, part: GarmentPart, color: impl Into<String>) {
        let color = color.into();
        tracing::debug!(?part, %color, "Updated part color");
        match part {
            GarmentPart::Body => self.colors.body = color,
            GarmentPart::Sleeves => self.colors.sleeves = color,
            GarmentPart::Collar => self.colors.collar = color,
            GarmentPart::StripesColor => self.colors.stripes_color = Some(color),
        }
    }

    /// Change the neckline.
    pub fn set_collar_type(&mut self, collar_type: CollarType) {
        tracing::debug!(?collar_type, "Changed collar");
        self.collar_type = collar_type;
    }

    /// Change the sleeves.
    pub fn set_sleeve_type(&mut self, sleeve_type: SleeveType) {
        tracing::debug!(?sleeve_type, "Changed sleeves");
        self.sleeve_type = sleeve_type;
    }

    /// Change the fit.
    pub fn set_fit_type(&mut self, fit_type: FitType) {
        tracing::debug!(?fit_type, "Changed fit");
        self.fit_type = fit_type;
    }
}

/// Which parts of a garment template can be recolored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
#[serde(rename_all = "camelCase")]
pub struct GarmentParts {
    /// Body is recolorable.
    pub body: bool,
    /// Sleeves are recolorable.
    pub sleeves: bool,
    /// Collar is recolorable.
    pub collar: bool,
    /// Stripes are recolorable.
    pub stripes_color: bool,
}

impl GarmentParts {
    const BODY_ONLY: Self = Self {
        body: true,
        sleeves: false,
        collar: false,
        stripes_color: false,
    };
    const NO_SLEEVES: Self = Self {
        body: true,
        sleeves: false,
        collar: true,
        stripes_color: false,
    };
    const STANDARD: Self = Self {
        body: true,
        sleeves: true,
        collar: true,
        stripes_color: false,
    };
    const STRIPED: Self = Self {
        body: true,
        sleeves: true,
        collar: true,
        stripes_color: true,
    };

    /// Part availability for a template id. Unknown templates get
    /// body, sleeves and collar.
    #[must_use]
    pub fn for_template(template_id: &str) -> Self {
        match template_id {
            "patterned-track-female" | "yoga-pants-female" => Self::BODY_ONLY,
            "joggers-male" | "cargo-pants-male" | "stripes-short-basic-female" => Self::STRIPED,
            "tank-top-basic-male" | "tank-top-basic-female" | "crop-top-female" => {
                Self::NO_SLEEVES
            }
            _ => Self::STANDARD,
        }
    }

    /// Whether a given part is available.
    #[must_use]
    pub fn has(&self, part: GarmentPart) -> bool {
        match part {
            GarmentPart::Body => self.body,
            GarmentPart::Sleeves => self.sleeves,
            GarmentPart::Collar => self.collar,
            GarmentPart::StripesColor => self.stripes_color,
        }
    }
}

/// Canvas background.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum BackgroundSettings {
    /// Solid color.
    Color(String),
    /// CSS-style gradient description.
    Gradient(String),
}

impl Default for BackgroundSettings {
    fn default() -> Self {
        Self::Color("#ffffff".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_fabric_falls_back_to_cotton() {
        let fabric = FabricProperties::preset("Velvet");
        assert_eq!(fabric, FabricProperties::preset("Cotton"));
        assert_eq!(fabric.texture, "cotton");
    }

    #[test]
    fn linen_preset_values() {
        let linen = FabricProperties::preset("Linen");
        assert!((linen.roughness - 0.9).abs() < f32::EPSILON);
        assert!((linen.metalness - 0.05).abs() < f32::EPSILON);
    }

    #[test]
    fn model_defaults() {
        let settings = ModelSettings::default();
        assert_eq!(settings.collar_type, CollarType::Crew);
        assert_eq!(settings.sleeve_type, SleeveType::Short);
        assert_eq!(settings.fit_type, FitType::Regular);
        assert_eq!(settings.colors.body, "#ffffff");
    }

    #[test]
    fn partial_update_keeps_other_fields() {
        let mut settings = ModelSettings::default();
        settings.update(ModelSettingsPatch {
            roughness: Some(0.9),
            fit_type: Some(FitType::Oversized),
            ..ModelSettingsPatch::default()
        });
        assert!((settings.roughness - 0.9).abs() < f32::EPSILON);
        assert!((settings.metalness - 0.1).abs() < f32::EPSILON);
        assert_eq!(settings.fit_type, FitType::Oversized);
        assert_eq!(settings.collar_type, CollarType::Crew);
    }

    #[test]
    fn set_part_color_targets_one_part() {
        let mut settings = ModelSettings::default();
        settings.set_part_color(GarmentPart::Sleeves, "#ff0000");
        settings.set_part_color(GarmentPart::StripesColor, "#00ff00");
        assert_eq!(settings.colors.sleeves, "#ff0000");
        assert_eq!(settings.colors.body, "#ffffff");
        assert_eq!(settings.colors.stripes_color.as_deref(), Some("#00ff00"));
    }

    #[test]
    fn template_part_availability() {
        assert!(!GarmentParts::for_template("yoga-pants-female").has(GarmentPart::Sleeves));
        assert!(GarmentParts::for_template("joggers-male").has(GarmentPart::StripesColor));
        let tank = GarmentParts::for_template("tank-top-basic-male");
        assert!(tank.collar && !tank.sleeves);
        assert_eq!(
            GarmentParts::for_template("no-such-template"),
            GarmentParts::for_template("zip-hoodie-female")
        );
    }

    #[test]
    fn collar_type_uses_kebab_case() {
        let json = serde_json::to_string(&CollarType::VNeck).expect("serialize");
        assert_eq!(json, "\"v-neck\"");
    }

    #[test]
    fn background_serializes_tagged() {
        let json = serde_json::to_value(BackgroundSettings::default()).expect("serialize");
        assert_eq!(json["type"], "color");
        assert_eq!(json["value"], "#ffffff");
    }
}
