use crate::models::PrincipalId;

pub type SubjectRef = String;

/// A crop lot as recorded by the subject store.
#[derive(Clone, Debug, PartialEq)]
pub struct Subject {
    pub subject_ref: SubjectRef,
    pub crop_type:   String,
    pub district:    String,
    pub village:     Option<String>,
    pub area_acres:  Option<f64>,
    pub owner_id:    PrincipalId,
}

/// Display attributes of a lot. Every field is empty when the lot could not be resolved.
#[derive(Clone, Debug, PartialEq)]
pub struct SubjectSummary {
    pub subject_ref: SubjectRef,
    pub crop_type:   Option<String>,
    pub district:    Option<String>,
    pub village:     Option<String>,
    pub area_acres:  Option<f64>,
    pub owner_id:    Option<PrincipalId>,
}

impl SubjectSummary {
    pub fn unresolved(subject_ref: SubjectRef) -> Self {
        Self {
            subject_ref,
            crop_type: None,
            district: None,
            village: None,
            area_acres: None,
            owner_id: None,
        }
    }
}

impl From<Subject> for SubjectSummary {
    fn from(subject: Subject) -> Self {
        Self {
            subject_ref: subject.subject_ref,
            crop_type:   Some(subject.crop_type),
            district:    Some(subject.district),
            village:     subject.village,
            area_acres:  subject.area_acres,
            owner_id:    Some(subject.owner_id),
        }
    }
}
