use comb_types::DefectInstance;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Ground-truth label for one rendered image. All images of one object
/// share an `object_id` and carry the same defect flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelRecord {
    pub object_id: Uuid,
    /// Global image index within the run, starting at 0.
    pub image: u64,
    pub missing_teeth: bool,
    pub bent_teeth: bool,
    pub warped: bool,
    /// 0 when absent, otherwise the number of marks cut.
    pub ejector_marks: u8,
    pub low_gloss: bool,
    pub discoloration: bool,
    pub contamination: bool,
    pub cloudy: bool,
    pub splay: bool,
}

impl LabelRecord {
    pub fn from_instance(object_id: Uuid, image: u64, defects: &DefectInstance) -> Self {
        Self {
            object_id,
            image,
            missing_teeth: defects.missing_teeth,
            bent_teeth: defects.bent_teeth,
            warped: defects.warping,
            ejector_marks: defects.ejector_marks,
            low_gloss: defects.gloss,
            discoloration: defects.discoloration,
            contamination: defects.contamination(),
            cloudy: defects.cloudy(),
            splay: defects.splay(),
        }
    }

    /// True if the image shows a defect-free object.
    pub fn is_good(&self) -> bool {
        !(self.missing_teeth
            || self.bent_teeth
            || self.warped
            || self.ejector_marks > 0
            || self.low_gloss
            || self.discoloration
            || self.contamination
            || self.cloudy
            || self.splay)
    }
}
