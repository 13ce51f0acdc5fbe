//! Static status translation table.
//!
//! Both schema generations report a status code: the extended schema uses
//! string codes such as `InTransit`, the legacy schema numeric codes such as
//! `10`. Codes missing from the table are shown verbatim.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShipmentStatus {
    NotFound,
    InfoReceived,
    InTransit,
    Expired,
    AvailableForPickup,
    OutForDelivery,
    DeliveryFailure,
    Delivered,
    Exception,
}

impl ShipmentStatus {
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        let status = match code {
            "NotFound" => Self::NotFound,
            "InfoReceived" => Self::InfoReceived,
            "InTransit" => Self::InTransit,
            "Expired" => Self::Expired,
            "AvailableForPickup" => Self::AvailableForPickup,
            "OutForDelivery" => Self::OutForDelivery,
            "DeliveryFailure" => Self::DeliveryFailure,
            "Delivered" => Self::Delivered,
            "Exception" => Self::Exception,
            _ => return None,
        };
        Some(status)
    }

    #[must_use]
    pub fn from_legacy_code(code: i64) -> Option<Self> {
        let status = match code {
            0 => Self::NotFound,
            10 => Self::InTransit,
            20 => Self::Expired,
            30 => Self::AvailableForPickup,
            35 => Self::DeliveryFailure,
            40 => Self::Delivered,
            50 => Self::Exception,
            _ => return None,
        };
        Some(status)
    }

    #[must_use]
    pub fn display(self) -> &'static str {
        match self {
            Self::NotFound => "Not found",
            Self::InfoReceived => "Info received",
            Self::InTransit => "In Transit",
            Self::Expired => "Expired",
            Self::AvailableForPickup => "Available for pickup",
            Self::OutForDelivery => "Out for delivery",
            Self::DeliveryFailure => "Delivery failed",
            Self::Delivered => "Delivered",
            Self::Exception => "Exception",
        }
    }
}

/// Display string for a string status code, passing unknown codes through.
#[must_use]
pub fn translate_status(code: &str) -> String {
    ShipmentStatus::from_code(code)
        .map_or_else(|| code.to_string(), |status| status.display().to_string())
}

/// Display string for a legacy numeric status code, passing unknown codes through.
#[must_use]
pub fn translate_legacy_status(code: i64) -> String {
    ShipmentStatus::from_legacy_code(code)
        .map_or_else(|| code.to_string(), |status| status.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_are_translated() {
        assert_eq!(translate_status("InTransit"), "In Transit");
        assert_eq!(translate_status("OutForDelivery"), "Out for delivery");
        assert_eq!(translate_legacy_status(40), "Delivered");
    }

    #[test]
    fn unknown_codes_pass_through() {
        assert_eq!(translate_status("Teleported"), "Teleported");
        assert_eq!(translate_status("In Transit"), "In Transit");
        assert_eq!(translate_legacy_status(77), "77");
    }
}
