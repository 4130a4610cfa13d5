use serde::{Deserialize, Serialize};

/// A defect category the sampler can draw from.
///
/// The three texture subtypes (contamination, cloudy, splay) collapse into
/// the single `Texture` category here; the concrete subtype is selected
/// separately because they are mutually exclusive on one object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefectKind {
    MissingTeeth,
    BentTeeth,
    Warping,
    EjectorMarks,
    Gloss,
    Discoloration,
    Texture,
}

/// Mutually exclusive shading-level texture defects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextureDefect {
    Contamination,
    Cloudy,
    Splay,
}

/// Which defect categories are enabled for a generation run.
///
/// Immutable process input. `num_ejector_marks` must be 2 or 3; the
/// sampler validates this at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefectConfig {
    #[serde(default)]
    pub missing_teeth: bool,
    #[serde(default)]
    pub bent_teeth: bool,
    #[serde(default)]
    pub warping: bool,
    #[serde(default)]
    pub ejector_marks: bool,
    #[serde(default)]
    pub gloss: bool,
    #[serde(default)]
    pub discoloration: bool,
    #[serde(default)]
    pub contamination: bool,
    #[serde(default)]
    pub cloudy: bool,
    #[serde(default)]
    pub splay: bool,
    #[serde(default = "default_ejector_marks")]
    pub num_ejector_marks: u8,
}

fn default_ejector_marks() -> u8 {
    2
}

impl Default for DefectConfig {
    fn default() -> Self {
        Self {
            missing_teeth: false,
            bent_teeth: false,
            warping: false,
            ejector_marks: false,
            gloss: false,
            discoloration: false,
            contamination: false,
            cloudy: false,
            splay: false,
            num_ejector_marks: default_ejector_marks(),
        }
    }
}

impl DefectConfig {
    /// The enabled categories, with the texture subtypes collapsed into
    /// one composite `Texture` entry.
    pub fn enabled_kinds(&self) -> Vec<DefectKind> {
        let mut kinds = Vec::new();
        if self.missing_teeth {
            kinds.push(DefectKind::MissingTeeth);
        }
        if self.bent_teeth {
            kinds.push(DefectKind::BentTeeth);
        }
        if self.warping {
            kinds.push(DefectKind::Warping);
        }
        if self.ejector_marks {
            kinds.push(DefectKind::EjectorMarks);
        }
        if self.gloss {
            kinds.push(DefectKind::Gloss);
        }
        if self.discoloration {
            kinds.push(DefectKind::Discoloration);
        }
        if self.contamination || self.cloudy || self.splay {
            kinds.push(DefectKind::Texture);
        }
        kinds
    }

    /// The enabled texture subtypes.
    pub fn enabled_textures(&self) -> Vec<TextureDefect> {
        let mut subtypes = Vec::new();
        if self.contamination {
            subtypes.push(TextureDefect::Contamination);
        }
        if self.cloudy {
            subtypes.push(TextureDefect::Cloudy);
        }
        if self.splay {
            subtypes.push(TextureDefect::Splay);
        }
        subtypes
    }
}

/// The defect state of exactly one object instance.
///
/// Produced by the sampler, consumed by the builder (geometry defects) and
/// the shading collaborator (gloss, discoloration, texture defects).
/// Immutable until the next resample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefectInstance {
    pub missing_teeth: bool,
    pub bent_teeth: bool,
    pub warping: bool,
    /// 0 when no ejector marks, otherwise the configured 2 or 3.
    pub ejector_marks: u8,
    pub gloss: bool,
    pub discoloration: bool,
    pub tex_defect: Option<TextureDefect>,
}

impl DefectInstance {
    /// The defect-free instance.
    pub fn none() -> Self {
        Self {
            missing_teeth: false,
            bent_teeth: false,
            warping: false,
            ejector_marks: 0,
            gloss: false,
            discoloration: false,
            tex_defect: None,
        }
    }

    /// True if any defect category is active.
    pub fn has_any(&self) -> bool {
        self.missing_teeth
            || self.bent_teeth
            || self.warping
            || self.ejector_marks > 0
            || self.gloss
            || self.discoloration
            || self.tex_defect.is_some()
    }

    pub fn contamination(&self) -> bool {
        self.tex_defect == Some(TextureDefect::Contamination)
    }

    pub fn cloudy(&self) -> bool {
        self.tex_defect == Some(TextureDefect::Cloudy)
    }

    pub fn splay(&self) -> bool {
        self.tex_defect == Some(TextureDefect::Splay)
    }
}

impl Default for DefectInstance {
    fn default() -> Self {
        Self::none()
    }
}
