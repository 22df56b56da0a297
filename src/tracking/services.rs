use thiserror::Error;
use tracing::{debug, instrument};

use super::dto::{OrderRecord, OrderStatus, PhoneLookup, StageView};
use crate::api::{ApiError, StorefrontApi};

#[derive(Debug, Error)]
pub enum TrackingError {
    #[error("Order ID and tracking code are required")]
    MissingIdOrCode,
    #[error("Phone number is required")]
    MissingPhone,
    #[error("{0}")]
    Lookup(#[from] ApiError),
}

/// Looks an order up by id and tracking code. Inputs are trimmed, the code upper-cased.
#[instrument(skip(api, code))]
pub async fn track_order(
    api: &dyn StorefrontApi,
    order_id: &str,
    code: &str,
) -> Result<OrderRecord, TrackingError> {
    let order_id = order_id.trim();
    let code = code.trim().to_uppercase();
    if order_id.is_empty() || code.is_empty() {
        return Err(TrackingError::MissingIdOrCode);
    }
    let order = api.track_order(order_id, &code).await?;
    debug!(status = %order.status, "order tracked");
    Ok(order)
}

#[instrument(skip(api, phone))]
pub async fn lookup_by_phone(
    api: &dyn StorefrontApi,
    phone: &str,
) -> Result<PhoneLookup, TrackingError> {
    let phone = phone.trim();
    if phone.is_empty() {
        return Err(TrackingError::MissingPhone);
    }
    let orders = api.lookup_orders(phone).await?;
    debug!(matches = orders.len(), "phone lookup");
    Ok(if orders.is_empty() {
        PhoneLookup::NoMatches
    } else {
        PhoneLookup::Matches(orders)
    })
}

/// Stages of the lifecycle, marking those at or before the current status.
/// An unrecognised status reaches nothing.
pub fn progress(status: OrderStatus) -> Vec<StageView> {
    let index = status.position();
    OrderStatus::SEQUENCE
        .iter()
        .enumerate()
        .map(|(i, s)| StageView {
            status: *s,
            reached: index.is_some_and(|idx| i <= idx),
            current: *s == status,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeBackend;
    use crate::checkout::CustomerDetails;
    use crate::id::EntityId;

    fn order(id: i64, code: &str, phone: &str, status: OrderStatus) -> OrderRecord {
        OrderRecord {
            id: EntityId::Int(id),
            tracking_code: Some(code.into()),
            status,
            customer: Some(CustomerDetails {
                name: "Sara".into(),
                phone: phone.into(),
                address: "Piassa".into(),
                notes: None,
            }),
            items: Vec::new(),
            subtotal: Some(300.0),
            delivery_fee: Some(50.0),
            discount: Some(0.0),
            promo_code: None,
            total: 350.0,
            created_at: None,
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn tracks_with_normalized_code() {
        let backend = FakeBackend::new();
        backend.seed_order(order(11, "9F4QK2", "0911000000", OrderStatus::Preparing));

        let found = track_order(&backend, " 11 ", "9f4qk2 ").await.unwrap();
        assert_eq!(found.status, OrderStatus::Preparing);
    }

    #[tokio::test]
    async fn wrong_code_is_a_failure() {
        let backend = FakeBackend::new();
        backend.seed_order(order(11, "9F4QK2", "0911000000", OrderStatus::Pending));

        let err = track_order(&backend, "11", "WRONG").await.unwrap_err();
        assert!(matches!(err, TrackingError::Lookup(ApiError::Status { status: 404, .. })));
    }

    #[tokio::test]
    async fn missing_inputs_fail_locally() {
        let backend = FakeBackend::new();
        assert!(matches!(
            track_order(&backend, "", "").await,
            Err(TrackingError::MissingIdOrCode)
        ));
        assert!(matches!(
            track_order(&backend, "11", "   ").await,
            Err(TrackingError::MissingIdOrCode)
        ));
        assert!(matches!(
            lookup_by_phone(&backend, " ").await,
            Err(TrackingError::MissingPhone)
        ));
        assert_eq!(backend.calls("track_order"), 0);
        assert_eq!(backend.calls("lookup_orders"), 0);
    }

    #[tokio::test]
    async fn phone_lookup_no_matches_is_not_an_error() {
        let backend = FakeBackend::new();
        backend.seed_order(order(1, "AAA111", "0911000000", OrderStatus::Ready));
        backend.seed_order(order(2, "BBB222", "0911000000", OrderStatus::Delivered));

        match lookup_by_phone(&backend, "0911000000").await.unwrap() {
            PhoneLookup::Matches(orders) => assert_eq!(orders.len(), 2),
            PhoneLookup::NoMatches => panic!("expected matches"),
        }
        assert_eq!(
            lookup_by_phone(&backend, "0922000000").await.unwrap(),
            PhoneLookup::NoMatches
        );
    }

    #[test]
    fn progress_marks_reached_stages() {
        let stages = progress(OrderStatus::Ready);
        let reached: Vec<bool> = stages.iter().map(|s| s.reached).collect();
        assert_eq!(reached, vec![true, true, true, false]);
        assert!(stages[2].current);
        assert_eq!(stages.iter().filter(|s| s.current).count(), 1);

        assert!(progress(OrderStatus::Unknown).iter().all(|s| !s.reached && !s.current));
    }

    #[test]
    fn status_parsing_and_wire_format() {
        assert_eq!("Delivered".parse::<OrderStatus>(), Ok(OrderStatus::Delivered));
        assert!("shipped".parse::<OrderStatus>().is_err());
        let st: OrderStatus = serde_json::from_str(r#""cancelled""#).unwrap();
        assert_eq!(st, OrderStatus::Unknown);
        assert_eq!(serde_json::to_string(&OrderStatus::Ready).unwrap(), r#""ready""#);
    }
}
