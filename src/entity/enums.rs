use std::{fmt, str::FromStr};

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Dietary category of a menu item.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum Category {
    #[sea_orm(string_value = "veg")]
    #[serde(rename = "veg")]
    Veg,
    #[sea_orm(string_value = "non-veg")]
    #[serde(rename = "non-veg")]
    NonVeg,
}

/// Payment methods offered at checkout.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[sea_orm(string_value = "paytm")]
    Paytm,
    #[sea_orm(string_value = "gpay")]
    Gpay,
    #[sea_orm(string_value = "phonepe")]
    Phonepe,
    #[sea_orm(string_value = "upi")]
    Upi,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 4] = [
        PaymentMethod::Paytm,
        PaymentMethod::Gpay,
        PaymentMethod::Phonepe,
        PaymentMethod::Upi,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Paytm => "paytm",
            PaymentMethod::Gpay => "gpay",
            PaymentMethod::Phonepe => "phonepe",
            PaymentMethod::Upi => "upi",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PaymentMethod::Paytm => "Paytm",
            PaymentMethod::Gpay => "Google Pay",
            PaymentMethod::Phonepe => "PhonePe",
            PaymentMethod::Upi => "UPI",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PaymentMethod::ALL
            .into_iter()
            .find(|method| method.as_str() == s)
            .ok_or_else(|| format!("unsupported payment method '{s}'"))
    }
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "failed")]
    Failed,
}
