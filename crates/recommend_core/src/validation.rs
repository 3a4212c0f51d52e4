use shared::protocol::RecommendRequest;
use thiserror::Error;

use crate::form::FormState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("select at least one location.")]
    NoDistrict,
    #[error("minimum price must not exceed maximum price.")]
    PriceOrder,
    #[error("select at least one ramen type.")]
    NoRamenType,
}

/// Checks `form` and, on success, builds the request payload from it.
pub fn validate(form: &FormState) -> Result<RecommendRequest, ValidationError> {
    if form.districts.is_empty() {
        return Err(ValidationError::NoDistrict);
    }
    if !form.price_range.is_ordered() {
        return Err(ValidationError::PriceOrder);
    }
    if form.ramen_types.is_empty() {
        return Err(ValidationError::NoRamenType);
    }

    Ok(RecommendRequest {
        districts: form.districts.to_vec(),
        ramen_types: form.ramen_types.to_vec(),
        min_price: form.price_range.min(),
        max_price: form.price_range.max(),
    })
}

#[cfg(test)]
mod tests {
    use shared::domain::{District, RamenType};

    use super::*;
    use crate::price::PriceRange;

    fn filled() -> FormState {
        FormState::default()
            .toggle_district(District::Shibuya)
            .toggle_ramen_type(RamenType::Miso)
    }

    #[test]
    fn empty_form_reports_location_first() {
        let form = FormState::default().with_price_range(PriceRange::new(1000, 500));
        assert_eq!(validate(&form), Err(ValidationError::NoDistrict));
        assert_eq!(
            ValidationError::NoDistrict.to_string(),
            "select at least one location."
        );
    }

    #[test]
    fn price_order_checked_before_ramen_type() {
        let form = FormState::default()
            .toggle_district(District::Koto)
            .with_price_range(PriceRange::new(1900, 800));
        assert_eq!(validate(&form), Err(ValidationError::PriceOrder));
    }

    #[test]
    fn missing_ramen_type_is_last_rule() {
        let form = FormState::default().toggle_district(District::Koto);
        assert_eq!(validate(&form), Err(ValidationError::NoRamenType));
    }

    #[test]
    fn equal_bounds_pass() {
        let form = filled().with_price_range(PriceRange::new(1500, 1500));
        let request = validate(&form).expect("equal bounds are valid");
        assert_eq!((request.min_price, request.max_price), (1500, 1500));
    }

    #[test]
    fn payload_keeps_selection_order() {
        let form = filled()
            .toggle_district(District::Adachi)
            .toggle_district(District::Chiyoda)
            .toggle_ramen_type(RamenType::Shoyu);
        let request = validate(&form).expect("valid");
        assert_eq!(
            request.districts,
            vec![District::Shibuya, District::Adachi, District::Chiyoda]
        );
        assert_eq!(request.ramen_types, vec![RamenType::Miso, RamenType::Shoyu]);
        assert_eq!((request.min_price, request.max_price), (500, 2000));
    }
}
