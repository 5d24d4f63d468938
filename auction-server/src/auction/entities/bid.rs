use {
    super::Amount,
    std::fmt::{
        Display,
        Formatter,
    },
    time::OffsetDateTime,
    uuid::Uuid,
};

pub type BidId = Uuid;

/// The trader placing a bid, as identified by the caller's principal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bidder {
    pub name:  String,
    pub email: String,
}

impl Bidder {
    pub fn new(name: &str, email: &str) -> Self {
        Self {
            name:  name.trim().to_string(),
            email: normalize_email(email),
        }
    }
}

/// Emails key the "my bids" scoping, so they are compared in a normalized form.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Clone, Debug, PartialEq)]
pub struct Bid {
    pub id:              BidId,
    pub bidder_name:     String,
    pub bidder_email:    String,
    pub amount_per_unit: Amount,
    pub submitted_at:    OffsetDateTime,
    pub revised_at:      Option<OffsetDateTime>,
}

impl Bid {
    pub fn new(bidder: Bidder, amount_per_unit: Amount, submitted_at: OffsetDateTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            bidder_name: bidder.name,
            bidder_email: bidder.email,
            amount_per_unit,
            submitted_at,
            revised_at: None,
        }
    }

    pub fn is_placed_by(&self, email: &str) -> bool {
        self.bidder_email == normalize_email(email)
    }
}

pub struct BidContainerTracing<'a>(pub &'a [Bid]);
impl Display for BidContainerTracing<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:?}",
            self.0
                .iter()
                .map(|x| x.id.to_string())
                .collect::<Vec<String>>()
        )
    }
}
