use {
    crate::subject::entities::SubjectSummary,
    strum::{
        Display,
        EnumString,
    },
};

pub type PrincipalId = String;

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Role {
    Farmer,
    Trader,
    Admin,
}

/// The authenticated caller. Name and email populate the bids it places.
#[derive(Clone, Debug)]
pub struct Principal {
    pub id:    PrincipalId,
    pub name:  String,
    pub email: String,
    pub role:  Role,
}

impl Principal {
    /// Admins manage every lot, farmers only the lots they own.
    pub fn may_manage(&self, subject: &SubjectSummary) -> bool {
        match self.role {
            Role::Admin => true,
            Role::Farmer => subject.owner_id.as_deref() == Some(self.id.as_str()),
            Role::Trader => false,
        }
    }

    pub fn is_trader(&self) -> bool {
        self.role == Role::Trader
    }
}
