use {
    crate::Amount,
    serde::{
        Deserialize,
        Serialize,
    },
    time::OffsetDateTime,
    utoipa::{
        ToResponse,
        ToSchema,
    },
    uuid::Uuid,
};

pub type BidId = Uuid;

#[derive(Serialize, Deserialize, ToSchema, Clone, Debug, PartialEq)]
pub struct Bid {
    /// The unique id created to identify the bid. It can be used to revise the bid later.
    #[schema(example = "beedbeed-58cc-4372-a567-0e02b2c3d479", value_type = String)]
    pub id:              BidId,
    /// Name of the trader who placed the bid.
    #[schema(example = "Ravi Traders")]
    pub bidder_name:     String,
    /// Email of the trader who placed the bid.
    #[schema(example = "ravi@example.com")]
    pub bidder_email:    String,
    /// Offered price per unit, in the smallest currency unit.
    #[schema(example = 2150)]
    pub amount_per_unit: Amount,
    /// The time the server accepted the bid.
    #[schema(example = "2025-03-02T11:26:57.329954Z", value_type = String)]
    #[serde(with = "time::serde::rfc3339")]
    pub submitted_at:    OffsetDateTime,
    /// The time of the last revision, if the bid was ever revised.
    #[schema(example = "2025-03-02T12:01:11.013211Z", value_type = Option<String>)]
    #[serde(default, with = "crate::serde::nullable_datetime")]
    pub revised_at:      Option<OffsetDateTime>,
}

#[derive(Serialize, Deserialize, ToSchema, Clone, Debug)]
pub struct BidCreate {
    /// Offered price per unit, in the smallest currency unit.
    #[schema(example = 2150)]
    pub amount_per_unit: Amount,
}

/// Revise one of the caller's bids.
///
/// The bid is located by the amount it currently carries. If `bid_id` is given, the id must match as well.
/// A revision fails with a not found error when the bid was changed concurrently.
#[derive(Serialize, Deserialize, ToSchema, Clone, Debug)]
pub struct BidRevise {
    #[schema(example = "beedbeed-58cc-4372-a567-0e02b2c3d479", value_type = Option<String>)]
    #[serde(default)]
    pub bid_id:          Option<BidId>,
    #[schema(example = 2150)]
    pub previous_amount: Amount,
    #[schema(example = 2300)]
    pub new_amount:      Amount,
}

#[derive(Serialize, Deserialize, ToResponse, ToSchema, Clone, Debug)]
pub struct BidResult {
    #[schema(example = "OK")]
    pub status: String,
    pub bid:    Bid,
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        time::macros::datetime,
    };

    #[test]
    fn test_bid_without_revision_time() {
        let bid: Bid = serde_json::from_str(
            r#"{
                "id": "beedbeed-58cc-4372-a567-0e02b2c3d479",
                "bidder_name": "Ravi Traders",
                "bidder_email": "ravi@example.com",
                "amount_per_unit": 2150,
                "submitted_at": "2025-03-02T11:26:57Z"
            }"#,
        )
        .unwrap();
        assert_eq!(bid.revised_at, None);
        assert_eq!(bid.submitted_at, datetime!(2025-03-02 11:26:57 UTC));
    }
}
