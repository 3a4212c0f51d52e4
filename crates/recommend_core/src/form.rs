use serde::{Deserialize, Serialize};
use shared::domain::{District, RamenType};

use crate::{price::PriceRange, selection::SelectionSet};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormState {
    pub districts: SelectionSet<District>,
    pub ramen_types: SelectionSet<RamenType>,
    pub price_range: PriceRange,
}

impl FormState {
    #[must_use]
    pub fn toggle_district(&self, district: District) -> Self {
        Self {
            districts: self.districts.toggle(district),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn toggle_ramen_type(&self, ramen_type: RamenType) -> Self {
        Self {
            ramen_types: self.ramen_types.toggle(ramen_type),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_price_range(&self, price_range: PriceRange) -> Self {
        Self {
            price_range,
            ..self.clone()
        }
    }
}
