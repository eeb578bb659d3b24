//! Enumerations for roles, catalog, orders, and audit actions.
//!
//! Every enum has a canonical wire string shared by serde, `Display`,
//! `FromStr`, and (with the `postgres` feature) the database enum type.

use serde::{Deserialize, Serialize};

/// Implements `as_str`, `Display`, and `FromStr` from a variant/string table.
macro_rules! string_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            /// All variants, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The canonical wire representation.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(format!(concat!("invalid ", $kind, ": {}"), s)),
                }
            }
        }
    };
}

/// Admin role with different permission levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "admin.admin_role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    /// Store management plus management of other admin accounts.
    SuperAdmin,
    /// Store management (products, orders, audit trail).
    Admin,
}

string_enum!(AdminRole, "admin role", {
    SuperAdmin => "super_admin",
    Admin => "admin",
});

impl AdminRole {
    /// Whether this role may manage admin accounts.
    #[must_use]
    pub const fn is_privileged(&self) -> bool {
        matches!(self, Self::SuperAdmin)
    }
}

/// Product category in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "admin.product_category", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum ProductCategory {
    Pajamas,
    Slippers,
    Aprons,
    Bedding,
    Accessories,
}

string_enum!(ProductCategory, "product category", {
    Pajamas => "pajamas",
    Slippers => "slippers",
    Aprons => "aprons",
    Bedding => "bedding",
    Accessories => "accessories",
});

/// Sales status of a product.
///
/// Only `OnSale` products are visible in the public catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "admin.product_status", rename_all = "kebab-case")
)]
#[serde(rename_all = "kebab-case")]
pub enum ProductStatus {
    #[default]
    OnSale,
    SoldOut,
    Discontinued,
}

string_enum!(ProductStatus, "product status", {
    OnSale => "on-sale",
    SoldOut => "sold-out",
    Discontinued => "discontinued",
});

/// Order fulfillment status.
///
/// Transitions are not constrained: any status may follow any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "admin.order_status", rename_all = "kebab-case")
)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    #[default]
    OrderConfirmed,
    Shipping,
    Delivered,
    Canceled,
}

string_enum!(OrderStatus, "order status", {
    OrderConfirmed => "order-confirmed",
    Shipping => "shipping",
    Delivered => "delivered",
    Canceled => "canceled",
});

/// Kind of action recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "admin.activity_action", rename_all = "SCREAMING_SNAKE_CASE")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityAction {
    Login,
    Logout,
    LoginFailed,
    CreateAdmin,
    UpdateAdmin,
    DeleteAdmin,
    CreateProduct,
    UpdateProduct,
    DeleteProduct,
    UpdateOrder,
}

string_enum!(ActivityAction, "activity action", {
    Login => "LOGIN",
    Logout => "LOGOUT",
    LoginFailed => "LOGIN_FAILED",
    CreateAdmin => "CREATE_ADMIN",
    UpdateAdmin => "UPDATE_ADMIN",
    DeleteAdmin => "DELETE_ADMIN",
    CreateProduct => "CREATE_PRODUCT",
    UpdateProduct => "UPDATE_PRODUCT",
    DeleteProduct => "DELETE_PRODUCT",
    UpdateOrder => "UPDATE_ORDER",
});

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_role_roundtrip() {
        assert_eq!("super_admin".parse::<AdminRole>().unwrap(), AdminRole::SuperAdmin);
        assert_eq!(AdminRole::Admin.to_string(), "admin");
        assert!("viewer".parse::<AdminRole>().is_err());
        assert!(AdminRole::SuperAdmin.is_privileged());
        assert!(!AdminRole::Admin.is_privileged());
    }

    #[test]
    fn test_display_matches_serde() {
        for status in OrderStatus::ALL {
            let json = serde_json::to_string(status).unwrap();
            assert_eq!(json, format!("\"{status}\""));
        }
        for action in ActivityAction::ALL {
            let json = serde_json::to_string(action).unwrap();
            assert_eq!(json, format!("\"{action}\""));
        }
        for category in ProductCategory::ALL {
            let json = serde_json::to_string(category).unwrap();
            assert_eq!(json, format!("\"{category}\""));
        }
        for status in ProductStatus::ALL {
            let json = serde_json::to_string(status).unwrap();
            assert_eq!(json, format!("\"{status}\""));
        }
    }

    #[test]
    fn test_unknown_values_rejected() {
        let err = "teleported".parse::<OrderStatus>().unwrap_err();
        assert_eq!(err, "invalid order status: teleported");
        assert!("LOGIN_SUCCEEDED".parse::<ActivityAction>().is_err());
        assert!("shoes".parse::<ProductCategory>().is_err());
    }

    #[test]
    fn test_defaults() {
        assert_eq!(OrderStatus::default(), OrderStatus::OrderConfirmed);
        assert_eq!(ProductStatus::default(), ProductStatus::OnSale);
    }
}
